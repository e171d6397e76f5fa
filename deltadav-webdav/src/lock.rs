//! Lock capabilities
//!
//! A resource advertises the (scope, type) combinations it supports through
//! the `DAV:supportedlock` property. `DAV:exclusive` and `DAV:shared` locks
//! are open-scoped: they outlive the session that created them and must be
//! removed with UNLOCK. An exclusive-session lock belongs to the session
//! that created it, can only be released by that session, and disappears
//! when the session ends.

use deltadav_core::{dav_props, DavProperty, QualifiedName, JCR_NS};
use quick_xml::writer::Writer;
use std::io::Cursor;

use crate::xml::XmlError;

/// Lock scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// `DAV:exclusive`, open-scoped
    Exclusive,
    /// `DAV:shared`, open-scoped
    Shared,
    /// Exclusive lock bound to the creating session
    ExclusiveSession,
}

impl LockScope {
    pub fn name(self) -> QualifiedName {
        match self {
            LockScope::Exclusive => QualifiedName::dav("exclusive"),
            LockScope::Shared => QualifiedName::dav("shared"),
            LockScope::ExclusiveSession => QualifiedName::new(JCR_NS, "exclusive-session"),
        }
    }

    /// True if the lock ends with the session that created it
    pub fn is_session_bound(self) -> bool {
        matches!(self, LockScope::ExclusiveSession)
    }
}

/// Lock type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockType {
    Write,
}

impl LockType {
    pub fn name(self) -> QualifiedName {
        match self {
            LockType::Write => QualifiedName::dav("write"),
        }
    }
}

/// One advertised lock capability
pub trait LockEntry: Send + Sync {
    fn scope(&self) -> LockScope;

    fn lock_type(&self) -> LockType;
}

/// Write lock scoped to the creating session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionScopedLockEntry;

impl LockEntry for SessionScopedLockEntry {
    fn scope(&self) -> LockScope {
        LockScope::ExclusiveSession
    }

    fn lock_type(&self) -> LockType {
        LockType::Write
    }
}

/// Any fixed (scope, type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultLockEntry {
    scope: LockScope,
    lock_type: LockType,
}

impl DefaultLockEntry {
    pub fn new(scope: LockScope, lock_type: LockType) -> Self {
        Self { scope, lock_type }
    }
}

impl LockEntry for DefaultLockEntry {
    fn scope(&self) -> LockScope {
        self.scope
    }

    fn lock_type(&self) -> LockType {
        self.lock_type
    }
}

/// The set of lock capabilities a resource supports
///
/// Entries are kept in insertion order; an entry with a (scope, type) pair
/// already present is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedLock {
    entries: Vec<DefaultLockEntry>,
}

impl SupportedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capability; returns false if it was already advertised
    pub fn add_entry(&mut self, entry: &dyn LockEntry) -> bool {
        let entry = DefaultLockEntry::new(entry.scope(), entry.lock_type());
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn with_entry(mut self, entry: &dyn LockEntry) -> Self {
        self.add_entry(entry);
        self
    }

    pub fn supports(&self, scope: LockScope, lock_type: LockType) -> bool {
        self.entries.contains(&DefaultLockEntry::new(scope, lock_type))
    }

    pub fn entries(&self) -> impl Iterator<Item = &dyn LockEntry> {
        self.entries.iter().map(|e| e as &dyn LockEntry)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the `DAV:supportedlock` property
    ///
    /// The value holds one `DAV:lockentry` fragment per capability.
    pub fn to_property(&self) -> Result<DavProperty, XmlError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            writer
                .create_element("D:lockentry")
                .write_inner_content(|w| {
                    w.create_element("D:lockscope")
                        .write_inner_content(|w| write_name(w, &entry.scope().name()))?;
                    w.create_element("D:locktype")
                        .write_inner_content(|w| write_name(w, &entry.lock_type().name()))?;
                    Ok(())
                })
                .map_err(|e| XmlError::Serialization(e.to_string()))?;
        }

        let value = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| XmlError::Serialization(e.to_string()))?;
        Ok(DavProperty::xml(
            QualifiedName::dav(dav_props::SUPPORTED_LOCK),
            value,
        ))
    }
}

fn write_name<W: std::io::Write>(w: &mut Writer<W>, name: &QualifiedName) -> std::io::Result<()> {
    if name.is_dav() {
        w.create_element(format!("D:{}", name.local_name())).write_empty()?;
    } else {
        w.create_element(name.local_name())
            .with_attribute(("xmlns", name.namespace()))
            .write_empty()?;
    }
    Ok(())
}
