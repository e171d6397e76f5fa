//! DeltaDAV Core Library
//!
//! Core data model shared by the DeltaV protocol layer:
//! - Qualified names (namespace + local name)
//! - Property sets keyed by qualified name
//! - Typed values and frozen property snapshots taken at check-in
//! - The versioning engine interface (resources, histories, versions)
//! - An in-memory version store

pub mod name;
pub mod properties;
pub mod value;
pub mod frozen;
pub mod version;
pub mod repository;

pub use name::{QualifiedName, DAV_NS, JCR_NS};
pub use properties::{dav_props, DavProperty, PropIter, PropertySet};
pub use value::{InternalValue, PropertyType};
pub use frozen::{FrozenPropertyError, PersistentProperty, PropertyState};
pub use version::{
    HistoryId, ResourceKind, ResourceNode, Result, VersionError, VersionRecord, VersionStore,
};
pub use repository::{history_href, MemoryVersionStore};
