//! Versioning engine interface
//!
//! The report layer never touches storage directly. It walks resources and
//! version histories through the `VersionStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frozen::{FrozenPropertyError, PersistentProperty};
use crate::properties::PropertySet;

/// Result type for versioning operations
pub type Result<T> = std::result::Result<T, VersionError>;

/// Errors that can occur while reading or writing version data
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Version history not found: {0}")]
    HistoryNotFound(HistoryId),

    #[error("Resource {0} is not version-controlled")]
    NotVersionControlled(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot freeze property: {0}")]
    Frozen(#[from] FrozenPropertyError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Identifier of a version history
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoryId(String);

impl HistoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versioning capability of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Checkpointed into the given history
    VersionControlled { history: HistoryId },
    /// One checkpoint inside the given history
    Version { history: HistoryId },
    /// No versioning support
    Plain,
}

impl ResourceKind {
    /// The history this resource belongs to, if any
    pub fn history(&self) -> Option<&HistoryId> {
        match self {
            ResourceKind::VersionControlled { history } | ResourceKind::Version { history } => {
                Some(history)
            }
            ResourceKind::Plain => None,
        }
    }

    pub fn is_versioned(&self) -> bool {
        !matches!(self, ResourceKind::Plain)
    }
}

/// A resource in the repository tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub href: String,
    pub kind: ResourceKind,
}

impl ResourceNode {
    pub fn new(href: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            href: href.into(),
            kind,
        }
    }
}

/// One version entry of a history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord {
    /// Href of the version resource
    pub href: String,
    /// Version label (DAV:version-name)
    pub label: String,
    /// Check-in ordinal assigned by the engine; unique within a store
    pub sequence: u64,
    pub created: DateTime<Utc>,
    /// Properties the version resource answers with
    pub properties: PropertySet,
    /// Property snapshots taken at check-in
    pub frozen: Vec<PersistentProperty>,
}

/// Read access to resources and their version histories
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Look up a resource by href
    async fn resource(&self, href: &str) -> Result<ResourceNode>;

    /// Direct members of a resource, in a stable order
    async fn members(&self, resource: &ResourceNode) -> Result<Vec<ResourceNode>>;

    /// Every version in a history
    async fn versions(&self, history: &HistoryId) -> Result<Vec<VersionRecord>>;
}
