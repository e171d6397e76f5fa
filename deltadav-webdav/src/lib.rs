//! DeltaDAV WebDAV/DeltaV Protocol Layer
//!
//! Implements the DeltaV version-tree report, lock capability
//! advertisement and multi-status documents on top of `deltadav-core`.

pub mod depth;
pub mod info;
pub mod lock;
pub mod report;
pub mod version_tree;
pub mod xml;

pub use depth::Depth;
pub use info::{ReportInfo, VERSION_TREE};
pub use lock::{
    DefaultLockEntry, LockEntry, LockScope, LockType, SessionScopedLockEntry, SupportedLock,
};
pub use report::{Report, ReportError, ReportState};
pub use version_tree::VersionTreeReport;
pub use xml::{Multistatus, XmlError};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Depth used when a request carries no Depth header
    pub default_depth: Depth,
    /// Accept `Depth: infinity`
    pub allow_infinite_depth: bool,
    /// Largest finite depth accepted
    pub max_depth: Option<u32>,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_depth: Depth::ZERO,
            allow_infinite_depth: true,
            max_depth: None,
            debug: false,
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, WebDavError> {
        toml::from_str(s).map_err(|e| WebDavError::Config(e.to_string()))
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, WebDavError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| WebDavError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        Self::from_toml_str(&text)
    }
}

/// WebDAV errors
#[derive(Debug, thiserror::Error)]
pub enum WebDavError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] XmlError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl WebDavError {
    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            WebDavError::Xml(_) | WebDavError::InvalidRequest(_) => 400,
            WebDavError::NotFound(_) => 404,
            WebDavError::Report(e) => e.status_code(),
            WebDavError::Config(_) | WebDavError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.default_depth, Depth::ZERO);
        assert!(config.allow_infinite_depth);
        assert!(config.max_depth.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml_str(
            r#"
default_depth = "infinity"
allow_infinite_depth = true
max_depth = 8
"#,
        )
        .unwrap();
        assert_eq!(config.default_depth, Depth::Infinity);
        assert_eq!(config.max_depth, Some(8));
        assert!(!config.debug);

        let config = Config::from_toml_str("default_depth = 1").unwrap();
        assert_eq!(config.default_depth, Depth::ONE);

        assert!(matches!(
            Config::from_toml_str("default_depth = \"deep\""),
            Err(WebDavError::Config(_))
        ));
    }

    #[test]
    fn test_config_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_infinite_depth = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(!config.allow_infinite_depth);

        let missing = Config::load(Path::new("/nonexistent/deltadav.toml"));
        assert!(matches!(missing, Err(WebDavError::Config(_))));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(WebDavError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(WebDavError::from(ReportError::Cancelled).status_code(), 500);
        assert_eq!(
            WebDavError::from(ReportError::InvalidArgument("x".into())).status_code(),
            400
        );
    }
}
