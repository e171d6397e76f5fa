//! DAV:version-tree report
//!
//! Lists every version of the target resource's history and, when the
//! requested depth allows, of each member resource below it. Each version
//! yields one response block: a bare 200 status when no properties were
//! requested, otherwise a propstat split into found and not-found names.
//!
//! Versions of one history are emitted in check-in order (the engine's
//! sequence number), ties broken by href. Members are visited depth-first
//! in the order the store returns them.

use async_trait::async_trait;
use deltadav_core::{QualifiedName, ResourceNode, VersionRecord, VersionStore};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::depth::Depth;
use crate::info::{ReportInfo, VERSION_TREE};
use crate::report::{Report, ReportError, ReportState};
use crate::xml::Multistatus;
use crate::Config;

/// Version-tree report over a `VersionStore`
///
/// One instance serves one request. `execute` succeeds at most once.
pub struct VersionTreeReport {
    store: Arc<dyn VersionStore>,
    config: Config,
    span: tracing::Span,
    resource: Option<ResourceNode>,
    info: Option<ReportInfo>,
    executed: bool,
}

impl VersionTreeReport {
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self::with_config(store, Config::default())
    }

    pub fn with_config(store: Arc<dyn VersionStore>, config: Config) -> Self {
        Self {
            store,
            config,
            span: tracing::info_span!("version_tree_report"),
            resource: None,
            info: None,
            executed: false,
        }
    }

    /// Log under `span` instead of the default report span
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    fn reject(&self, msg: String) -> ReportError {
        self.span.in_scope(|| tracing::warn!("{}", msg));
        ReportError::InvalidArgument(msg)
    }

    fn check_depth(&self, depth: Depth) -> Result<(), ReportError> {
        match depth {
            Depth::Infinity if !self.config.allow_infinite_depth => Err(self.reject(
                "DAV:version-tree report does not accept infinite depth".to_string(),
            )),
            Depth::Finite(n) if self.config.max_depth.is_some_and(|max| n > max) => {
                Err(self.reject(format!("Depth {} exceeds the configured maximum", n)))
            }
            _ => Ok(()),
        }
    }

    /// Walk the resource tree from `root`, emitting every version found
    async fn build_response(
        &self,
        root: &ResourceNode,
        info: &ReportInfo,
        cancel: &CancellationToken,
    ) -> Result<Multistatus, ReportError> {
        let mut multistatus = Multistatus::new();
        let mut pending = vec![(root.clone(), info.depth())];

        while let Some((node, depth)) = pending.pop() {
            let versions = self.versions(&node, cancel).await?;
            tracing::debug!("{}: {} versions, depth {}", node.href, versions.len(), depth);

            for version in &versions {
                if info.property_names().is_empty() {
                    multistatus.add_resource_status(&version.href, 200);
                } else {
                    multistatus.add_resource_properties(
                        &version.href,
                        &version.properties,
                        info.property_names(),
                    );
                }
            }

            if let Some(next) = depth.descend() {
                let members = guarded(cancel, self.store.members(&node))
                    .await
                    .map_err(|e| with_context(e, "members", &node.href))?;
                // Reversed so the first member is visited next
                pending.extend(members.into_iter().rev().map(|m| (m, next)));
            }
        }

        Ok(multistatus)
    }

    /// Versions of the history owned by `node`, in report order
    async fn versions(
        &self,
        node: &ResourceNode,
        cancel: &CancellationToken,
    ) -> Result<Vec<VersionRecord>, ReportError> {
        let Some(history) = node.kind.history() else {
            return Ok(Vec::new());
        };

        let mut versions = guarded(cancel, self.store.versions(history))
            .await
            .map_err(|e| with_context(e, "version history", &node.href))?;
        versions.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.href.cmp(&b.href)));
        Ok(versions)
    }
}

#[async_trait]
impl Report for VersionTreeReport {
    fn report_element(&self) -> QualifiedName {
        QualifiedName::dav(VERSION_TREE)
    }

    fn state(&self) -> ReportState {
        match (&self.resource, &self.info, self.executed) {
            (_, _, true) => ReportState::Executed,
            (None, None, _) => ReportState::Unconfigured,
            (Some(_), None, _) => ReportState::ResourceSet,
            (None, Some(_), _) => ReportState::InfoSet,
            (Some(_), Some(_), _) => ReportState::FullyConfigured,
        }
    }

    fn set_resource(&mut self, resource: ResourceNode) -> Result<(), ReportError> {
        if self.executed {
            return Err(self.reject("Report has already been executed".to_string()));
        }
        if !resource.kind.is_versioned() {
            return Err(self.reject(format!(
                "DAV:version-tree report can only be created for version-controlled \
                 resources and version resources, not {}",
                resource.href
            )));
        }
        self.resource = Some(resource);
        Ok(())
    }

    fn set_info(&mut self, info: ReportInfo) -> Result<(), ReportError> {
        if self.executed {
            return Err(self.reject("Report has already been executed".to_string()));
        }
        if info.element() != &self.report_element() {
            return Err(self.reject(format!(
                "DAV:version-tree element expected, found {}",
                info.element()
            )));
        }
        self.check_depth(info.depth())?;
        self.info = Some(info);
        Ok(())
    }

    async fn execute(&mut self, cancel: &CancellationToken) -> Result<Multistatus, ReportError> {
        if self.executed {
            return Err(ReportError::Server("Report has already been executed".to_string()));
        }
        let (Some(resource), Some(info)) = (&self.resource, &self.info) else {
            return Err(ReportError::Server(
                "Error while running DAV:version-tree report: report not fully initialized"
                    .to_string(),
            ));
        };

        let span = self.span.clone();
        let result = self
            .build_response(resource, info, cancel)
            .instrument(span.clone())
            .await;

        let multistatus = match result {
            Ok(ms) => ms,
            Err(e) => {
                span.in_scope(|| tracing::error!("version-tree report on {} failed: {}", resource.href, e));
                return Err(e);
            }
        };

        span.in_scope(|| {
            tracing::info!(
                "version-tree report on {}: {} entries",
                resource.href,
                multistatus.len()
            )
        });
        self.executed = true;
        Ok(multistatus)
    }
}

/// Run a store call unless `cancel` fires first
async fn guarded<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ReportError>
where
    F: Future<Output = deltadav_core::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReportError::Cancelled),
        res = fut => res.map_err(|e| ReportError::Server(e.to_string())),
    }
}

fn with_context(err: ReportError, what: &str, href: &str) -> ReportError {
    match err {
        ReportError::Server(msg) => {
            ReportError::Server(format!("Cannot read {} of {}: {}", what, href, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltadav_core::{HistoryId, MemoryVersionStore, ResourceKind};

    fn report() -> VersionTreeReport {
        VersionTreeReport::new(Arc::new(MemoryVersionStore::new()))
    }

    fn versioned(href: &str) -> ResourceNode {
        ResourceNode::new(
            href,
            ResourceKind::VersionControlled {
                history: HistoryId::new("h"),
            },
        )
    }

    #[test]
    fn test_state_transitions_resource_first() {
        let mut report = report();
        assert_eq!(report.state(), ReportState::Unconfigured);

        report.set_resource(versioned("/a")).unwrap();
        assert_eq!(report.state(), ReportState::ResourceSet);

        report.set_info(ReportInfo::version_tree(Depth::ZERO)).unwrap();
        assert_eq!(report.state(), ReportState::FullyConfigured);
    }

    #[test]
    fn test_state_transitions_info_first() {
        let mut report = report();
        report.set_info(ReportInfo::version_tree(Depth::ONE)).unwrap();
        assert_eq!(report.state(), ReportState::InfoSet);

        let version = ResourceNode::new(
            "/!deltav/ver/h/1",
            ResourceKind::Version {
                history: HistoryId::new("h"),
            },
        );
        report.set_resource(version).unwrap();
        assert_eq!(report.state(), ReportState::FullyConfigured);
    }

    #[test]
    fn test_plain_resource_rejected() {
        let mut report = report();
        let err = report
            .set_resource(ResourceNode::new("/plain", ResourceKind::Plain))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
        assert_eq!(report.state(), ReportState::Unconfigured);
    }

    #[test]
    fn test_rejected_resource_keeps_previous() {
        let mut report = report();
        report.set_resource(versioned("/a")).unwrap();
        assert!(report.set_resource(ResourceNode::new("/plain", ResourceKind::Plain)).is_err());
        assert_eq!(report.resource.as_ref().map(|r| r.href.as_str()), Some("/a"));
        assert_eq!(report.state(), ReportState::ResourceSet);
    }

    #[test]
    fn test_wrong_report_element_rejected() {
        let mut report = report();
        let info = ReportInfo::new(QualifiedName::dav("expand-property"), Depth::ZERO);
        assert!(matches!(report.set_info(info), Err(ReportError::InvalidArgument(_))));

        // Same local name, wrong namespace
        let info = ReportInfo::new(QualifiedName::new("urn:x", VERSION_TREE), Depth::ZERO);
        assert!(matches!(report.set_info(info), Err(ReportError::InvalidArgument(_))));
        assert_eq!(report.state(), ReportState::Unconfigured);
    }

    #[test]
    fn test_depth_limits_from_config() {
        let config = Config {
            allow_infinite_depth: false,
            max_depth: Some(2),
            ..Config::default()
        };
        let mut report =
            VersionTreeReport::with_config(Arc::new(MemoryVersionStore::new()), config);

        assert!(report.set_info(ReportInfo::version_tree(Depth::Infinity)).is_err());
        assert!(report.set_info(ReportInfo::version_tree(Depth::Finite(3))).is_err());
        assert!(report.set_info(ReportInfo::version_tree(Depth::Finite(2))).is_ok());
    }

    #[tokio::test]
    async fn test_execute_requires_configuration() {
        let cancel = CancellationToken::new();

        let mut report = report();
        assert!(matches!(report.execute(&cancel).await, Err(ReportError::Server(_))));

        report.set_resource(versioned("/a")).unwrap();
        let err = report.execute(&cancel).await.unwrap_err();
        assert!(matches!(err, ReportError::Server(ref msg) if msg.contains("not fully initialized")));
        assert_eq!(report.state(), ReportState::ResourceSet);

        let mut report = self::report();
        report.set_info(ReportInfo::version_tree(Depth::ZERO)).unwrap();
        assert!(matches!(report.to_xml(&cancel).await, Err(ReportError::Server(_))));
    }
}
