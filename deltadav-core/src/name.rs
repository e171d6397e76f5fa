//! Qualified property and element names
//!
//! A name is a (namespace, local name) pair. Two names are the same key
//! iff both parts match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// WebDAV XML namespace
pub const DAV_NS: &str = "DAV:";

/// Namespace for repository-specific (JCR) properties and lock scopes
pub const JCR_NS: &str = "http://www.day.com/jcr/webdav/1.0";

/// A namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    namespace: String,
    local_name: String,
}

impl QualifiedName {
    /// Create a name in the given namespace
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name in the `DAV:` namespace
    pub fn dav(local_name: impl Into<String>) -> Self {
        Self::new(DAV_NS, local_name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// True if this name lives in the `DAV:` namespace
    pub fn is_dav(&self) -> bool {
        self.namespace == DAV_NS
    }

    /// Parse Clark notation (`{namespace}local`); a bare name lands in `DAV:`
    pub fn parse(s: &str) -> Option<Self> {
        match s.strip_prefix('{') {
            Some(rest) => {
                let (ns, local) = rest.split_once('}')?;
                if local.is_empty() {
                    return None;
                }
                Some(Self::new(ns, local))
            }
            None if !s.is_empty() && !s.contains('}') => Some(Self::dav(s)),
            None => None,
        }
    }
}

/// Clark notation
impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality() {
        let a = QualifiedName::new("urn:x", "propA");
        let b = QualifiedName::new(String::from("urn:x"), String::from("propA"));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&QualifiedName::dav("propA")));
    }

    #[test]
    fn test_parse_clark_notation() {
        let name = QualifiedName::parse("{urn:x}propA").unwrap();
        assert_eq!(name.namespace(), "urn:x");
        assert_eq!(name.local_name(), "propA");
        assert_eq!(name.to_string(), "{urn:x}propA");

        assert_eq!(QualifiedName::parse("displayname"), Some(QualifiedName::dav("displayname")));
        assert!(QualifiedName::parse("{urn:x}").is_none());
        assert!(QualifiedName::parse("{urn:x").is_none());
        assert!(QualifiedName::parse("").is_none());
    }
}
