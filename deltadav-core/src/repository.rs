//! In-memory version store
//!
//! Keeps a resource tree, version histories and checked-in versions in
//! memory. Used by the CLI fixtures and the test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::frozen::{PersistentProperty, PropertyState};
use crate::name::QualifiedName;
use crate::properties::{dav_props, DavProperty, PropertySet};
use crate::version::{
    HistoryId, ResourceKind, ResourceNode, Result, VersionError, VersionRecord, VersionStore,
};

/// Href prefix for version history resources
pub const HISTORY_PREFIX: &str = "/!deltav/vh";

/// Href prefix for version resources
pub const VERSION_PREFIX: &str = "/!deltav/ver";

/// In-memory repository of versioned resources
pub struct MemoryVersionStore {
    /// Href -> resource
    resources: Arc<RwLock<HashMap<String, ResourceNode>>>,

    /// Parent href -> member hrefs, in insertion order
    members: Arc<RwLock<HashMap<String, Vec<String>>>>,

    /// History -> versions, in check-in order
    histories: Arc<RwLock<HashMap<HistoryId, Vec<VersionRecord>>>>,

    /// Last assigned check-in ordinal
    sequence: Arc<RwLock<u64>>,
}

impl MemoryVersionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            resources: Arc::new(RwLock::new(HashMap::new())),
            members: Arc::new(RwLock::new(HashMap::new())),
            histories: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(RwLock::new(0)),
        }
    }

    /// Register a resource, optionally as a member of `parent`
    pub async fn add_resource(
        &self,
        parent: Option<&str>,
        href: &str,
        kind: ResourceKind,
    ) -> Result<ResourceNode> {
        let mut resources = self.resources.write().await;
        if resources.contains_key(href) {
            return Err(VersionError::AlreadyExists(href.to_string()));
        }
        if let Some(parent) = parent {
            if !resources.contains_key(parent) {
                return Err(VersionError::NotFound(parent.to_string()));
            }
        }

        if let ResourceKind::VersionControlled { history } = &kind {
            let mut histories = self.histories.write().await;
            histories.entry(history.clone()).or_default();
        }

        let node = ResourceNode::new(href, kind);
        resources.insert(href.to_string(), node.clone());
        drop(resources);

        if let Some(parent) = parent {
            let mut members = self.members.write().await;
            members
                .entry(parent.to_string())
                .or_default()
                .push(href.to_string());
        }

        tracing::debug!("Registered resource {}", href);
        Ok(node)
    }

    /// Register a new version-controlled resource with an empty history
    pub async fn add_version_controlled(
        &self,
        parent: Option<&str>,
        href: &str,
    ) -> Result<HistoryId> {
        let history = HistoryId::generate();
        self.add_resource(
            parent,
            href,
            ResourceKind::VersionControlled {
                history: history.clone(),
            },
        )
        .await?;
        Ok(history)
    }

    /// Check in the current state of a version-controlled resource
    ///
    /// Every `(state, multiple)` pair is frozen into the new version. The
    /// version is registered as a version resource of its own.
    pub async fn check_in(
        &self,
        href: &str,
        label: &str,
        states: &[(PropertyState, bool)],
    ) -> Result<VersionRecord> {
        let history = match self.resource(href).await?.kind {
            ResourceKind::VersionControlled { history } => history,
            _ => return Err(VersionError::NotVersionControlled(href.to_string())),
        };

        let frozen = states
            .iter()
            .map(|(state, multiple)| PersistentProperty::new(state, *multiple))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let sequence = {
            let mut seq = self.sequence.write().await;
            *seq += 1;
            *seq
        };

        let created = Utc::now();
        let mut histories = self.histories.write().await;
        let versions = histories
            .get_mut(&history)
            .ok_or_else(|| VersionError::HistoryNotFound(history.clone()))?;
        let version_href = format!("{}/{}/{}", VERSION_PREFIX, history, versions.len() + 1);

        let mut properties: PropertySet = frozen.iter().map(|p| p.to_dav_property()).collect();
        properties.add(DavProperty::new(QualifiedName::dav(dav_props::VERSION_NAME), label));
        properties.add(DavProperty::new(
            QualifiedName::dav(dav_props::CREATION_DATE),
            created.to_rfc3339(),
        ));
        properties.add(DavProperty::new(
            QualifiedName::dav(dav_props::VERSION_HISTORY),
            history_href(&history),
        ));

        let record = VersionRecord {
            href: version_href.clone(),
            label: label.to_string(),
            sequence,
            created,
            properties,
            frozen,
        };
        versions.push(record.clone());
        drop(histories);

        let mut resources = self.resources.write().await;
        resources.insert(
            version_href.clone(),
            ResourceNode::new(version_href, ResourceKind::Version { history }),
        );

        tracing::debug!("Checked in {} as {} (seq {})", href, record.href, sequence);
        Ok(record)
    }

    /// Number of registered resources, version resources included
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

impl Default for MemoryVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Href of a version history resource
pub fn history_href(history: &HistoryId) -> String {
    format!("{}/{}", HISTORY_PREFIX, history)
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn resource(&self, href: &str) -> Result<ResourceNode> {
        let resources = self.resources.read().await;
        resources
            .get(href)
            .cloned()
            .ok_or_else(|| VersionError::NotFound(href.to_string()))
    }

    async fn members(&self, resource: &ResourceNode) -> Result<Vec<ResourceNode>> {
        let members = self.members.read().await;
        let Some(hrefs) = members.get(&resource.href) else {
            return Ok(Vec::new());
        };
        let resources = self.resources.read().await;
        hrefs
            .iter()
            .map(|href| {
                resources
                    .get(href)
                    .cloned()
                    .ok_or_else(|| VersionError::NotFound(href.clone()))
            })
            .collect()
    }

    async fn versions(&self, history: &HistoryId) -> Result<Vec<VersionRecord>> {
        let histories = self.histories.read().await;
        histories
            .get(history)
            .cloned()
            .ok_or_else(|| VersionError::HistoryNotFound(history.clone()))
    }
}
