//! DeltaV REPORT framework
//!
//! A report is configured with a target resource and a request body, then
//! run once to produce a multi-status document.

use async_trait::async_trait;
use deltadav_core::{QualifiedName, ResourceNode};
use tokio_util::sync::CancellationToken;

use crate::info::ReportInfo;
use crate::xml::{Multistatus, XmlError};

/// Report failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    /// Wrong resource or request body; the report is left unchanged
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The report could not be produced; no partial result is returned
    #[error("Report failed: {0}")]
    Server(String),

    /// The surrounding request was aborted mid-traversal
    #[error("Report cancelled")]
    Cancelled,
}

impl ReportError {
    /// HTTP status for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::InvalidArgument(_) => 400,
            ReportError::Server(_) | ReportError::Cancelled => 500,
        }
    }
}

impl From<XmlError> for ReportError {
    fn from(e: XmlError) -> Self {
        ReportError::Server(e.to_string())
    }
}

/// Configuration progress of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportState {
    Unconfigured,
    ResourceSet,
    InfoSet,
    FullyConfigured,
    Executed,
}

/// A DeltaV report
#[async_trait]
pub trait Report: Send {
    /// Root element of the request bodies this report answers
    fn report_element(&self) -> QualifiedName;

    fn state(&self) -> ReportState;

    fn set_resource(&mut self, resource: ResourceNode) -> Result<(), ReportError>;

    fn set_info(&mut self, info: ReportInfo) -> Result<(), ReportError>;

    /// Run the report
    async fn execute(&mut self, cancel: &CancellationToken) -> Result<Multistatus, ReportError>;

    /// Run the report and serialize the result
    async fn to_xml(&mut self, cancel: &CancellationToken) -> Result<String, ReportError> {
        let multistatus = self.execute(cancel).await?;
        Ok(multistatus.to_xml()?)
    }
}
