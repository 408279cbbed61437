// src/sync/parsers/projects.rs

//! The `projects.xml` project hierarchy
//!
//! ```xml
//! <projects>
//!   <project>
//!     <email>toolchain@gentoo.org</email>
//!     <name>Toolchain</name>
//!     <url>https://wiki.gentoo.org/wiki/Project:Toolchain</url>
//!     <description>...</description>
//!     <member is-lead="1"><email>lead@gentoo.org</email><name>Lead</name></member>
//!     <subproject ref="llvm@gentoo.org" inherit-members="1"/>
//!   </project>
//! </projects>
//! ```

use super::{XmlNode, parse_flag, parse_xml_tree};
use crate::db::models::normalize_email;
use crate::error::Result;
use tracing::{debug, warn};

/// A project node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Lowercased
    pub email: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub members: Vec<MemberRecord>,
    pub subprojects: Vec<SubprojectRef>,
}

/// A person listed as member of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub email: String,
    pub name: Option<String>,
    pub is_lead: bool,
}

/// A reference from a project to one of its subprojects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprojectRef {
    pub email: String,
    /// Parsed but not acted upon: membership is never expanded transitively
    pub inherit_members: bool,
}

/// Parse the project hierarchy document
pub fn parse_projects(body: &str) -> Result<Vec<ProjectRecord>> {
    let root = parse_xml_tree(body, "projects")?;

    let mut projects = Vec::new();
    for node in &root.children {
        if node.name != "project" {
            debug!("Skipping unknown <{}> in <projects>", node.name);
            continue;
        }
        match parse_project(node) {
            Some(project) => projects.push(project),
            None => warn!("Discarding <project> without email"),
        }
    }
    Ok(projects)
}

fn parse_project(node: &XmlNode) -> Option<ProjectRecord> {
    let mut project = ProjectRecord::default();

    for child in &node.children {
        match child.name.as_str() {
            "email" => {
                if let Some(email) = child.trimmed_text() {
                    project.email = normalize_email(&email);
                }
            }
            "name" => project.name = child.trimmed_text(),
            "url" => project.url = child.trimmed_text(),
            "description" => project.description = child.trimmed_text(),
            "member" => match parse_member(child) {
                Some(member) => project.members.push(member),
                None => warn!("Discarding <member> without email"),
            },
            "subproject" => match child.attr("ref").map(str::trim).filter(|r| !r.is_empty()) {
                Some(reference) => project.subprojects.push(SubprojectRef {
                    email: normalize_email(reference),
                    inherit_members: parse_flag(child.attr("inherit-members")),
                }),
                None => warn!("Discarding <subproject> without ref"),
            },
            other => debug!("Skipping unknown <{}> in <project>", other),
        }
    }

    if project.email.is_empty() {
        return None;
    }
    Some(project)
}

fn parse_member(node: &XmlNode) -> Option<MemberRecord> {
    let mut email = None;
    let mut name = None;

    for child in &node.children {
        match child.name.as_str() {
            "email" => email = child.trimmed_text(),
            "name" => name = child.trimmed_text(),
            other => debug!("Skipping unknown <{}> in <member>", other),
        }
    }

    Some(MemberRecord {
        email: normalize_email(&email?),
        name,
        is_lead: parse_flag(node.attr("is-lead")),
    })
}
