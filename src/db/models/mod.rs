// src/db/models/mod.rs

//! Data models for the mirrored catalog
//!
//! Each struct corresponds to a database table and provides the queries the
//! reconcilers and the read side need. Relationships are loaded through
//! explicit functions (`Package::list_for_category`, `Maintainer::members`)
//! rather than on access.

mod category;
mod keyword;
mod maintainer;
mod package;
mod package_version;
mod quality_violation;

pub use category::Category;
pub use keyword::{Keyword, UNSTABLE_PREFIX};
pub use maintainer::{Maintainer, MemberEdge, normalize_email};
pub use package::Package;
pub use package_version::PackageVersion;
pub use quality_violation::QualityViolation;
