//! REPORT request bodies
//!
//! A `ReportInfo` carries the report element named by the request body,
//! the requested depth, and the property names listed under `DAV:prop`.

use deltadav_core::QualifiedName;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::depth::Depth;
use crate::xml::XmlError;

/// Element name of the DeltaV version-tree report
pub const VERSION_TREE: &str = "version-tree";

/// Parsed REPORT request
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInfo {
    element: QualifiedName,
    depth: Depth,
    property_names: Vec<QualifiedName>,
}

impl ReportInfo {
    pub fn new(element: QualifiedName, depth: Depth) -> Self {
        Self {
            element,
            depth,
            property_names: Vec::new(),
        }
    }

    /// A `DAV:version-tree` request
    pub fn version_tree(depth: Depth) -> Self {
        Self::new(QualifiedName::dav(VERSION_TREE), depth)
    }

    /// Request one more property; duplicates are ignored
    pub fn with_property(mut self, name: QualifiedName) -> Self {
        self.add_property(name);
        self
    }

    pub fn add_property(&mut self, name: QualifiedName) {
        if !self.property_names.contains(&name) {
            self.property_names.push(name);
        }
    }

    /// Name of the report element in the request body
    pub fn element(&self) -> &QualifiedName {
        &self.element
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Requested property names, in request order; empty means existence only
    pub fn property_names(&self) -> &[QualifiedName] {
        &self.property_names
    }

    /// Parse a REPORT body
    ///
    /// The root element names the report. Children of a top-level
    /// `DAV:prop` element are the requested property names.
    pub fn from_xml(body: &str, depth: Depth) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut info: Option<ReportInfo> = None;
        let mut stack: Vec<QualifiedName> = Vec::new();
        let prop = QualifiedName::dav("prop");

        loop {
            let (ns, event) = reader
                .read_resolved_event()
                .map_err(|e| XmlError::Parse(e.to_string()))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = qualify(ns, e)?;
                    match info.as_mut() {
                        None => info = Some(ReportInfo::new(name.clone(), depth)),
                        Some(info) if stack.len() == 2 && stack[1] == prop => {
                            info.add_property(name.clone());
                        }
                        Some(_) => {}
                    }
                    if matches!(event, Event::Start(_)) {
                        stack.push(name);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        info.ok_or_else(|| XmlError::InvalidStructure("empty REPORT body".to_string()))
    }
}

fn qualify(ns: ResolveResult<'_>, e: &BytesStart<'_>) -> Result<QualifiedName, XmlError> {
    let namespace = match ns {
        ResolveResult::Bound(Namespace(uri)) => String::from_utf8_lossy(uri).into_owned(),
        ResolveResult::Unbound => String::new(),
        ResolveResult::Unknown(prefix) => {
            return Err(XmlError::InvalidStructure(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )))
        }
    };
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    Ok(QualifiedName::new(namespace, local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltadav_core::JCR_NS;

    #[test]
    fn test_parse_version_tree_with_props() {
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<D:version-tree xmlns:D="DAV:" xmlns:J="{}">
  <D:prop>
    <D:version-name/>
    <D:creator-displayname/>
    <J:title/>
    <D:version-name/>
  </D:prop>
</D:version-tree>"#,
            JCR_NS
        );

        let info = ReportInfo::from_xml(&body, Depth::ONE).unwrap();
        assert_eq!(info.element(), &QualifiedName::dav(VERSION_TREE));
        assert_eq!(info.depth(), Depth::ONE);
        assert_eq!(
            info.property_names(),
            &[
                QualifiedName::dav("version-name"),
                QualifiedName::dav("creator-displayname"),
                QualifiedName::new(JCR_NS, "title"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_version_tree() {
        let info = ReportInfo::from_xml(r#"<version-tree xmlns="DAV:"/>"#, Depth::ZERO).unwrap();
        assert_eq!(info.element(), &QualifiedName::dav(VERSION_TREE));
        assert!(info.property_names().is_empty());
    }

    #[test]
    fn test_nested_prop_is_not_a_request() {
        let body = r#"<D:expand-property xmlns:D="DAV:">
  <D:property name="version-history"><D:prop><D:displayname/></D:prop></D:property>
</D:expand-property>"#;
        let info = ReportInfo::from_xml(body, Depth::ZERO).unwrap();
        assert_eq!(info.element(), &QualifiedName::dav("expand-property"));
        assert!(info.property_names().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ReportInfo::from_xml("", Depth::ZERO),
            Err(XmlError::InvalidStructure(_))
        ));
        assert!(matches!(
            ReportInfo::from_xml("<X:version-tree/>", Depth::ZERO),
            Err(XmlError::InvalidStructure(_))
        ));
        assert!(matches!(
            ReportInfo::from_xml(
                r#"<D:version-tree xmlns:D="DAV:"><D:prop></D:version-tree>"#,
                Depth::ZERO
            ),
            Err(XmlError::Parse(_))
        ));
    }

    #[test]
    fn test_builder_dedups() {
        let info = ReportInfo::version_tree(Depth::ZERO)
            .with_property(QualifiedName::dav("a"))
            .with_property(QualifiedName::dav("a"));
        assert_eq!(info.property_names().len(), 1);
    }
}
