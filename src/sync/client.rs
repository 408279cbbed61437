// src/sync/client.rs

//! Fetching remote catalog documents
//!
//! Reconcilers never talk to the network directly: they receive a
//! [`Fetch`] implementation for the duration of a run. [`HttpFetcher`] holds
//! a single blocking reqwest session; [`StaticFetcher`] serves canned
//! documents for offline replays and tests.
//!
//! Every fetch is a single attempt. A non-2xx status, a transport error or
//! an empty body is reported as [`Error::DownloadError`], which callers
//! treat as the failure signal for that document.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent sent with every request
pub const USER_AGENT: &str = concat!("grumpy/", env!("CARGO_PKG_VERSION"));

/// Capability to retrieve one remote document as text
pub trait Fetch {
    /// Fetch `url` once, without retrying
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetch a document, treating a blank body as a failed fetch
pub fn fetch_document(fetcher: &dyn Fetch, url: &str) -> Result<String> {
    let body = fetcher.fetch(url)?;
    if body.trim().is_empty() {
        return Err(Error::DownloadError(format!("Empty response from {url}")));
    }
    Ok(body)
}

/// Blocking HTTP fetcher reusing one client session
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout and user agent
    pub fn new() -> Result<Self> {
        Self::with_options(HTTP_TIMEOUT, USER_AGENT)
    }

    /// Create a fetcher with an explicit timeout and user agent
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .map_err(|e| Error::DownloadError(format!("Failed to read response from {url}: {e}")))
    }
}

/// Serves documents from memory, keyed by URL
///
/// Unknown URLs fail like an HTTP 404. Every request is recorded so callers
/// can check what a run actually fetched.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the document served for `url`
    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.documents.insert(url.into(), body.into());
    }

    /// Stop serving `url`
    pub fn remove(&mut self, url: &str) {
        self.documents.remove(url);
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Forget recorded requests
    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }
}

impl Fetch for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found from {url}")))
    }
}

/// Locations of every remote document
///
/// `category_packages` and `package` are templates: `{category}` and
/// `{package}` are substituted per request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sources {
    #[serde(default = "default_categories")]
    pub categories: String,

    #[serde(default = "default_category_packages")]
    pub category_packages: String,

    #[serde(default = "default_package")]
    pub package: String,

    #[serde(default = "default_projects")]
    pub projects: String,

    #[serde(default = "default_pkgcheck")]
    pub pkgcheck: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            category_packages: default_category_packages(),
            package: default_package(),
            projects: default_projects(),
            pkgcheck: default_pkgcheck(),
        }
    }
}

fn default_categories() -> String {
    "https://packages.gentoo.org/categories.json".to_string()
}

fn default_category_packages() -> String {
    "https://packages.gentoo.org/categories/{category}.json".to_string()
}

fn default_package() -> String {
    "https://packages.gentoo.org/packages/{category}/{package}.json".to_string()
}

fn default_projects() -> String {
    "https://api.gentoo.org/metastructure/projects.xml".to_string()
}

fn default_pkgcheck() -> String {
    "https://qa-reports.gentoo.org/output/gentoo-ci/output.xml".to_string()
}

impl Sources {
    /// Serve every document from a different host, keeping the paths
    ///
    /// Used to point a run at a local mirror (`http://localhost:8000`).
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            categories: format!("{base}/categories.json"),
            category_packages: format!("{base}/categories/{{category}}.json"),
            package: format!("{base}/packages/{{category}}/{{package}}.json"),
            projects: format!("{base}/projects.xml"),
            pkgcheck: format!("{base}/output.xml"),
        }
    }

    /// URL of one category's package list
    pub fn category_packages_url(&self, category: &str) -> String {
        self.category_packages.replace("{category}", category)
    }

    /// URL of one package's detail document
    pub fn package_url(&self, category: &str, package: &str) -> String {
        self.package
            .replace("{category}", category)
            .replace("{package}", package)
    }

    /// Reject templates that could never address a single document
    pub fn validate(&self) -> Result<()> {
        if !self.category_packages.contains("{category}") {
            return Err(Error::ConfigError(
                "sources.category_packages must contain {category}".to_string(),
            ));
        }
        if !self.package.contains("{category}") || !self.package.contains("{package}") {
            return Err(Error::ConfigError(
                "sources.package must contain {category} and {package}".to_string(),
            ));
        }
        Ok(())
    }
}
