// src/sync/parsers/pkgcheck.rs

//! pkgcheck XML reports
//!
//! A flat `<checks>` list of `<result>` nodes. Each result may name a
//! category, package and version; `class` is required.

use super::parse_xml_tree;
use crate::error::Result;
use tracing::{debug, warn};

/// One check result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub category: Option<String>,
    pub package: Option<String>,
    pub version: Option<String>,
    pub class: String,
    pub message: String,
}

/// Parse a pkgcheck report
pub fn parse_checks(body: &str) -> Result<Vec<CheckResult>> {
    let root = parse_xml_tree(body, "checks")?;

    let mut results = Vec::new();
    for node in &root.children {
        if node.name != "result" {
            debug!("Skipping unknown <{}> in <checks>", node.name);
            continue;
        }

        let mut result = CheckResult::default();
        let mut class = None;
        for child in &node.children {
            match child.name.as_str() {
                "category" => result.category = child.trimmed_text(),
                "package" => result.package = child.trimmed_text(),
                "version" => result.version = child.trimmed_text(),
                "class" => class = child.trimmed_text(),
                "msg" => result.message = child.trimmed_text().unwrap_or_default(),
                other => debug!("Skipping unknown <{}> in <result>", other),
            }
        }

        match class {
            Some(class) => {
                result.class = class;
                results.push(result);
            }
            None => warn!("Discarding pkgcheck result without class"),
        }
    }
    Ok(results)
}
