// src/sync/parsers/catalog.rs

//! packages.gentoo.org JSON documents
//!
//! Unknown JSON fields are ignored everywhere. Maintainer entries of a
//! package detail are strict: a missing `email` or `type` rejects the whole
//! package document with [`Error::DataContract`].

use super::MaintainerKind;
use crate::db::models::normalize_email;
use crate::error::{Error, Result};
use serde::Deserialize;

/// One entry of the categories list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A maintainer reference from a package detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintainerRecord {
    /// Lowercased
    pub email: String,
    pub kind: MaintainerKind,
    pub name: Option<String>,
}

/// One version of a package detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
    pub keywords: Vec<String>,
}

/// A validated package detail document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDetail {
    pub description: Option<String>,
    pub maintainers: Vec<MaintainerRecord>,
    pub versions: Vec<VersionRecord>,
}

#[derive(Deserialize)]
struct RawPackageList {
    packages: Vec<RawPackageName>,
}

#[derive(Deserialize)]
struct RawPackageName {
    name: String,
}

#[derive(Deserialize)]
struct RawPackageDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    maintainers: Option<Vec<RawMaintainer>>,
    #[serde(default)]
    versions: Option<Vec<RawVersion>>,
}

#[derive(Deserialize)]
struct RawMaintainer {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawVersion {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

fn from_json<'a, T: Deserialize<'a>>(body: &'a str, what: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::ParseError(format!("Invalid {what}: {e}")))
}

/// Parse the categories list (root must be an array)
pub fn parse_categories(body: &str) -> Result<Vec<CategoryRecord>> {
    from_json(body, "categories list")
}

/// Parse one category's package list into package names
pub fn parse_package_list(body: &str) -> Result<Vec<String>> {
    let list: RawPackageList = from_json(body, "package list")?;
    Ok(list.packages.into_iter().map(|p| p.name).collect())
}

/// Parse and validate one package detail document
///
/// `{}` and `null` carry no data and are reported as a failed fetch, so the
/// package is skipped instead of being emptied and marked fresh.
pub fn parse_package_detail(body: &str) -> Result<PackageDetail> {
    let value: serde_json::Value = from_json(body, "package detail")?;
    let is_empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(Error::DownloadError("empty package detail document".to_string()));
    }

    let raw: RawPackageDetail = serde_json::from_value(value)
        .map_err(|e| Error::ParseError(format!("Invalid package detail: {e}")))?;
    if raw.maintainers.is_none() && raw.versions.is_none() {
        return Err(Error::ParseError(
            "Package detail has neither maintainers nor versions".to_string(),
        ));
    }

    let maintainers = raw
        .maintainers
        .unwrap_or_default()
        .into_iter()
        .map(|m| -> Result<MaintainerRecord> {
            let email = m
                .email
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| Error::DataContract("maintainer entry without email".to_string()))?;
            let kind_value = m.kind.ok_or_else(|| {
                Error::DataContract(format!("maintainer {email} has no type"))
            })?;
            let kind = MaintainerKind::parse(&kind_value).ok_or_else(|| {
                Error::DataContract(format!("maintainer {email} has unknown type {kind_value:?}"))
            })?;

            Ok(MaintainerRecord {
                email: normalize_email(&email),
                kind,
                name: m.name.filter(|n| !n.trim().is_empty()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let versions = raw
        .versions
        .unwrap_or_default()
        .into_iter()
        .map(|v| -> Result<VersionRecord> {
            let version = v
                .version
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::DataContract("version entry without version".to_string()))?;
            Ok(VersionRecord {
                version,
                keywords: v.keywords,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PackageDetail {
        description: raw.description,
        maintainers,
        versions,
    })
}
