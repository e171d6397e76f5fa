//! WebDAV Property Sets
//!
//! Maps qualified names to properties for one resource representation.
//! Backed by a `BTreeMap`, so iteration order is deterministic (sorted by
//! namespace, then local name) even though callers must not rely on any
//! particular order.
//!
//! A `PropertySet` carries no internal synchronization. Share it across
//! threads only behind your own lock, or keep it owned by one request.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::iter::FusedIterator;

use crate::name::{QualifiedName, DAV_NS};

/// A single named property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DavProperty {
    pub name: QualifiedName,
    /// Text content; `None` for a property without a value
    #[serde(default)]
    pub value: Option<String>,
    /// `value` is a serialized XML fragment written as child elements
    /// rather than escaped text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub xml: bool,
}

impl DavProperty {
    pub fn new(name: QualifiedName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            xml: false,
        }
    }

    /// A property whose content is the XML fragment `xml`
    pub fn xml(name: QualifiedName, xml: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(xml.into()),
            xml: true,
        }
    }

    /// A property carrying only its name
    pub fn empty(name: QualifiedName) -> Self {
        Self {
            name,
            value: None,
            xml: false,
        }
    }
}

/// Property set for a single resource
///
/// At most one entry exists per name; adding a property with a name that
/// is already present replaces the old entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DavProperty>", into = "Vec<DavProperty>")]
pub struct PropertySet {
    properties: BTreeMap<QualifiedName, DavProperty>,
}

impl PropertySet {
    /// Create a new empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, returning the entry it replaced
    pub fn add(&mut self, property: DavProperty) -> Option<DavProperty> {
        self.properties.insert(property.name.clone(), property)
    }

    /// Add every property of `other`; entries of `other` win on collision
    pub fn add_all(&mut self, other: &PropertySet) {
        for property in other.iter() {
            self.add(property.clone());
        }
    }

    /// Get a property by qualified name
    pub fn get(&self, name: &QualifiedName) -> Option<&DavProperty> {
        self.properties.get(name)
    }

    /// Get a property by local name in the `DAV:` namespace
    pub fn get_local(&self, local_name: &str) -> Option<&DavProperty> {
        self.get_ns(local_name, DAV_NS)
    }

    /// Get a property by local name and namespace
    pub fn get_ns(&self, local_name: &str, namespace: &str) -> Option<&DavProperty> {
        self.get(&QualifiedName::new(namespace, local_name))
    }

    /// Remove a property by qualified name
    pub fn remove(&mut self, name: &QualifiedName) -> Option<DavProperty> {
        self.properties.remove(name)
    }

    /// Remove a property by local name in the `DAV:` namespace
    pub fn remove_local(&mut self, local_name: &str) -> Option<DavProperty> {
        self.remove_ns(local_name, DAV_NS)
    }

    /// Remove a property by local name and namespace
    pub fn remove_ns(&mut self, local_name: &str, namespace: &str) -> Option<DavProperty> {
        self.remove(&QualifiedName::new(namespace, local_name))
    }

    /// Check if a property exists
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.properties.contains_key(name)
    }

    /// Check if a property with the given local name exists in `DAV:`
    pub fn contains_local(&self, local_name: &str) -> bool {
        self.contains(&QualifiedName::dav(local_name))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Names of all properties present in this set
    pub fn names(&self) -> Vec<QualifiedName> {
        self.properties.keys().cloned().collect()
    }

    /// Iterate over every property
    ///
    /// The iterator borrows the set, so the set cannot be modified while a
    /// pass is in progress. Each call starts a fresh pass.
    pub fn iter(&self) -> PropIter<'_> {
        PropIter {
            namespace: None,
            inner: self.properties.values(),
        }
    }

    /// Iterate over the properties whose name is in `namespace`
    pub fn iter_namespace<'a>(&'a self, namespace: &'a str) -> PropIter<'a> {
        PropIter {
            namespace: Some(namespace),
            inner: self.properties.values(),
        }
    }
}

/// Single-pass iterator over a `PropertySet`, optionally restricted to one
/// namespace
#[derive(Debug, Clone)]
pub struct PropIter<'a> {
    namespace: Option<&'a str>,
    inner: btree_map::Values<'a, QualifiedName, DavProperty>,
}

impl<'a> Iterator for PropIter<'a> {
    type Item = &'a DavProperty;

    fn next(&mut self) -> Option<Self::Item> {
        match self.namespace {
            None => self.inner.next(),
            Some(ns) => self.inner.by_ref().find(|p| p.name.namespace() == ns),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        match self.namespace {
            None => (lower, upper),
            Some(_) => (0, upper),
        }
    }
}

impl FusedIterator for PropIter<'_> {}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a DavProperty;
    type IntoIter = PropIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<DavProperty> for PropertySet {
    fn extend<I: IntoIterator<Item = DavProperty>>(&mut self, iter: I) {
        for property in iter {
            self.add(property);
        }
    }
}

impl FromIterator<DavProperty> for PropertySet {
    fn from_iter<I: IntoIterator<Item = DavProperty>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<DavProperty>> for PropertySet {
    fn from(properties: Vec<DavProperty>) -> Self {
        properties.into_iter().collect()
    }
}

impl From<PropertySet> for Vec<DavProperty> {
    fn from(set: PropertySet) -> Self {
        set.properties.into_values().collect()
    }
}

/// Live DeltaV property names carried by version resources
pub mod dav_props {
    /// Human-readable version label
    pub const VERSION_NAME: &str = "version-name";

    /// Creation timestamp (RFC 3339)
    pub const CREATION_DATE: &str = "creationdate";

    /// Display name
    pub const DISPLAY_NAME: &str = "displayname";

    /// Href of the owning version history
    pub const VERSION_HISTORY: &str = "version-history";

    /// Advertised lock capabilities
    pub const SUPPORTED_LOCK: &str = "supportedlock";
}
