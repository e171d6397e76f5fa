//! WebDAV XML parsing and generation utilities
//!
//! Multi-status documents: the response container every REPORT emits into.

use deltadav_core::{DavProperty, PropertySet, QualifiedName};
use quick_xml::events::{BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Cursor;

pub use deltadav_core::{DAV_NS, JCR_NS};

/// HTTP status line for a propstat or response block
pub fn status_line(code: u16) -> String {
    let reason = match code {
        200 => "OK",
        207 => "Multi-Status",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    format!("HTTP/1.1 {} {}", code, reason).trim_end().to_string()
}

/// WebDAV multistatus response
#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<Response>,
}

impl Multistatus {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
        }
    }

    /// Append a bare status block for `href`
    pub fn add_resource_status(&mut self, href: &str, status: u16) {
        self.responses.push(Response {
            href: href.to_string(),
            status: Some(status_line(status)),
            propstats: Vec::new(),
        });
    }

    /// Append a property-scoped block for `href`
    ///
    /// Names present in `properties` go into a 200 propstat with their
    /// values; the rest are reported in a 404 propstat.
    pub fn add_resource_properties(
        &mut self,
        href: &str,
        properties: &PropertySet,
        names: &[QualifiedName],
    ) {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match properties.get(name) {
                Some(prop) => found.push(prop.clone()),
                None => missing.push(DavProperty::empty(name.clone())),
            }
        }

        let mut propstats = Vec::new();
        if !found.is_empty() {
            propstats.push(PropStat {
                props: found,
                status: status_line(200),
            });
        }
        if !missing.is_empty() {
            propstats.push(PropStat {
                props: missing,
                status: status_line(404),
            });
        }

        self.responses.push(Response {
            href: href.to_string(),
            status: None,
            propstats,
        });
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .create_element("D:multistatus")
            .with_attribute(("xmlns:D", DAV_NS))
            .write_inner_content(|w| {
                for response in &self.responses {
                    if let Err(e) = response.write_xml(w) {
                        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
                    }
                }
                Ok(())
            })
            .map_err(|e| XmlError::Serialization(e.to_string()))?;

        let body = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| XmlError::Serialization(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{}", body))
    }
}

/// WebDAV response element
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub href: String,
    /// Response-level status; set for bare status blocks
    pub status: Option<String>,
    pub propstats: Vec<PropStat>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_xml<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        writer
            .create_element("D:response")
            .write_inner_content(|w| {
                w.create_element("D:href")
                    .write_text_content(BytesText::new(&self.href))?;

                if let Some(status) = &self.status {
                    w.create_element("D:status")
                        .write_text_content(BytesText::new(status))?;
                }

                for propstat in &self.propstats {
                    if let Err(e) = propstat.write_xml(w) {
                        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
                    }
                }

                Ok(())
            })
            .map_err(|e| XmlError::Serialization(e.to_string()))?;

        Ok(())
    }
}

/// WebDAV propstat element
#[derive(Debug, Clone, Default)]
pub struct PropStat {
    pub props: Vec<DavProperty>,
    pub status: String,
}

impl PropStat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_xml<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        writer
            .create_element("D:propstat")
            .write_inner_content(|w| {
                w.create_element("D:prop").write_inner_content(|w| {
                    for prop in &self.props {
                        write_property(w, prop)?;
                    }
                    Ok(())
                })?;

                w.create_element("D:status")
                    .write_text_content(BytesText::new(&self.status))?;

                Ok(())
            })
            .map_err(|e| XmlError::Serialization(e.to_string()))?;

        Ok(())
    }
}

/// `DAV:` properties use the `D:` prefix, others declare a default namespace
///
/// XML-fragment values are copied into the element unescaped.
fn write_property<W: std::io::Write>(w: &mut Writer<W>, prop: &DavProperty) -> std::io::Result<()> {
    let element = if prop.name.is_dav() {
        w.create_element(format!("D:{}", prop.name.local_name()))
    } else {
        w.create_element(prop.name.local_name())
            .with_attribute(("xmlns", prop.name.namespace()))
    };

    match &prop.value {
        Some(value) if !value.is_empty() && prop.xml => {
            element.write_inner_content(|w| w.get_mut().write_all(value.as_bytes()))?;
        }
        Some(value) if !value.is_empty() => {
            element.write_text_content(BytesText::new(value))?;
        }
        _ => {
            element.write_empty()?;
        }
    }
    Ok(())
}

/// Parse a WebDAV multistatus response
///
/// Element names are matched on their local part; property elements are
/// collected by local name with the namespace left empty.
pub fn parse_multistatus(xml: &str) -> Result<Multistatus, XmlError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut multistatus = Multistatus::new();
    let mut current_response: Option<Response> = None;
    let mut current_propstat: Option<PropStat> = None;
    let mut in_prop = false;
    let mut current_prop: Option<DavProperty> = None;
    let mut text_target: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"response" => current_response = Some(Response::new()),
                b"propstat" => current_propstat = Some(PropStat::new()),
                b"prop" => in_prop = true,
                b"href" if !in_prop => text_target = Some("href"),
                b"status" if !in_prop => text_target = Some("status"),
                other if in_prop => {
                    let local = String::from_utf8_lossy(other).into_owned();
                    current_prop = Some(DavProperty::empty(QualifiedName::new("", local)));
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if in_prop => {
                if let Some(ref mut propstat) = current_propstat {
                    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    propstat.props.push(DavProperty::empty(QualifiedName::new("", local)));
                }
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlError::Parse(e.to_string()))?
                    .into_owned();
                if let Some(ref mut prop) = current_prop {
                    prop.value = Some(text);
                } else {
                    match text_target.take() {
                        Some("href") => {
                            if let Some(ref mut resp) = current_response {
                                resp.href = text;
                            }
                        }
                        Some("status") => {
                            if let Some(ref mut propstat) = current_propstat {
                                propstat.status = text;
                            } else if let Some(ref mut resp) = current_response {
                                resp.status = Some(text);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"response" => {
                    if let Some(resp) = current_response.take() {
                        multistatus.responses.push(resp);
                    }
                }
                b"propstat" => {
                    if let Some(ref mut resp) = current_response {
                        if let Some(propstat) = current_propstat.take() {
                            resp.propstats.push(propstat);
                        }
                    }
                }
                b"prop" if current_prop.is_none() => in_prop = false,
                _ if in_prop => {
                    if let (Some(prop), Some(propstat)) = (current_prop.take(), current_propstat.as_mut()) {
                        propstat.props.push(prop);
                    }
                }
                _ => text_target = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlError::Parse(e.to_string())),
            _ => {}
        }
    }

    Ok(multistatus)
}

/// XML parsing errors
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid XML structure: {0}")]
    InvalidStructure(String),
}
