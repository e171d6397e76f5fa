//! Repository fixtures
//!
//! A fixture is a JSON description of a resource tree with checked-in
//! versions. Resources are created in file order, so a parent must appear
//! before its members.

use anyhow::{Context, Result};
use deltadav_core::{MemoryVersionStore, PropertyState, ResourceKind};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub resources: Vec<FixtureResource>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureResource {
    pub href: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Create as version-controlled; plain otherwise
    #[serde(default)]
    pub versioned: bool,
    #[serde(default)]
    pub versions: Vec<FixtureVersion>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureVersion {
    pub label: String,
    #[serde(default)]
    pub properties: Vec<FixtureProperty>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureProperty {
    #[serde(flatten)]
    pub state: PropertyState,
    #[serde(default)]
    pub multiple: bool,
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid fixture")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {:?}", path))?;
        Self::from_json(&text)
    }

    /// Build an in-memory store holding every resource and version
    pub async fn into_store(self) -> Result<MemoryVersionStore> {
        let store = MemoryVersionStore::new();
        for resource in self.resources {
            let parent = resource.parent.as_deref();
            if resource.versioned {
                store.add_version_controlled(parent, &resource.href).await?;
            } else {
                if !resource.versions.is_empty() {
                    anyhow::bail!("Plain resource {} cannot carry versions", resource.href);
                }
                store
                    .add_resource(parent, &resource.href, ResourceKind::Plain)
                    .await?;
            }

            for version in resource.versions {
                let states: Vec<(PropertyState, bool)> = version
                    .properties
                    .into_iter()
                    .map(|p| (p.state, p.multiple))
                    .collect();
                store
                    .check_in(&resource.href, &version.label, &states)
                    .await
                    .with_context(|| {
                        format!("Failed to check in {} {}", resource.href, version.label)
                    })?;
            }
        }
        tracing::debug!("Fixture loaded: {} resources", store.len().await);
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltadav_core::{VersionStore, JCR_NS};

    const FIXTURE: &str = r#"{
  "resources": [
    { "href": "/r", "versioned": true, "versions": [
      { "label": "1.0", "properties": [
        { "name": { "namespace": "http://www.day.com/jcr/webdav/1.0", "local_name": "tags" },
          "type": "string",
          "values": [ { "type": "string", "value": "x" }, { "type": "string", "value": "y" } ],
          "multiple": true }
      ] },
      { "label": "1.1" }
    ] },
    { "href": "/r/docs", "parent": "/r" }
  ]
}"#;

    #[tokio::test]
    async fn test_fixture_into_store() {
        let store = Fixture::from_json(FIXTURE).unwrap().into_store().await.unwrap();

        let root = store.resource("/r").await.unwrap();
        let history = root.kind.history().cloned().unwrap();
        let versions = store.versions(&history).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions[0].frozen[0].is_multiple());
        assert_eq!(
            versions[0].properties.get_ns("tags", JCR_NS).unwrap().value.as_deref(),
            Some("x\ny")
        );

        let members = store.members(&root).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].kind, ResourceKind::Plain);
    }

    #[tokio::test]
    async fn test_plain_resource_with_versions_rejected() {
        let fixture = Fixture::from_json(
            r#"{ "resources": [ { "href": "/p", "versions": [ { "label": "1" } ] } ] }"#,
        )
        .unwrap();
        assert!(fixture.into_store().await.is_err());
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(Fixture::from_json("{}").is_err());
    }
}
