//! Typed property values
//!
//! Values stored in property states. The type codes follow the JCR
//! property type numbering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::name::QualifiedName;

/// Property type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Binary,
    Long,
    Double,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
}

impl PropertyType {
    /// Numeric type code
    pub fn code(self) -> u8 {
        match self {
            PropertyType::String => 1,
            PropertyType::Binary => 2,
            PropertyType::Long => 3,
            PropertyType::Double => 4,
            PropertyType::Date => 5,
            PropertyType::Boolean => 6,
            PropertyType::Name => 7,
            PropertyType::Path => 8,
            PropertyType::Reference => 9,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => PropertyType::String,
            2 => PropertyType::Binary,
            3 => PropertyType::Long,
            4 => PropertyType::Double,
            5 => PropertyType::Date,
            6 => PropertyType::Boolean,
            7 => PropertyType::Name,
            8 => PropertyType::Path,
            9 => PropertyType::Reference,
            _ => return None,
        })
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyType::String => "String",
            PropertyType::Binary => "Binary",
            PropertyType::Long => "Long",
            PropertyType::Double => "Double",
            PropertyType::Date => "Date",
            PropertyType::Boolean => "Boolean",
            PropertyType::Name => "Name",
            PropertyType::Path => "Path",
            PropertyType::Reference => "Reference",
        };
        f.write_str(s)
    }
}

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InternalValue {
    String(String),
    Binary(Vec<u8>),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
    Boolean(bool),
    Name(QualifiedName),
    Path(String),
    Reference(uuid::Uuid),
}

impl InternalValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            InternalValue::String(_) => PropertyType::String,
            InternalValue::Binary(_) => PropertyType::Binary,
            InternalValue::Long(_) => PropertyType::Long,
            InternalValue::Double(_) => PropertyType::Double,
            InternalValue::Date(_) => PropertyType::Date,
            InternalValue::Boolean(_) => PropertyType::Boolean,
            InternalValue::Name(_) => PropertyType::Name,
            InternalValue::Path(_) => PropertyType::Path,
            InternalValue::Reference(_) => PropertyType::Reference,
        }
    }
}

impl From<&str> for InternalValue {
    fn from(s: &str) -> Self {
        InternalValue::String(s.to_string())
    }
}

impl From<i64> for InternalValue {
    fn from(n: i64) -> Self {
        InternalValue::Long(n)
    }
}

impl From<bool> for InternalValue {
    fn from(b: bool) -> Self {
        InternalValue::Boolean(b)
    }
}

/// Text form; binary values are base64-encoded
impl fmt::Display for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use base64::Engine;
        match self {
            InternalValue::String(s) | InternalValue::Path(s) => f.write_str(s),
            InternalValue::Binary(b) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            InternalValue::Long(n) => write!(f, "{}", n),
            InternalValue::Double(d) => write!(f, "{}", d),
            InternalValue::Date(d) => f.write_str(&d.to_rfc3339()),
            InternalValue::Boolean(b) => write!(f, "{}", b),
            InternalValue::Name(n) => write!(f, "{}", n),
            InternalValue::Reference(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_round_trip() {
        for code in 1..=9u8 {
            let ty = PropertyType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert!(PropertyType::from_code(0).is_none());
        assert!(PropertyType::from_code(10).is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(InternalValue::from("x").to_string(), "x");
        assert_eq!(InternalValue::from(42i64).to_string(), "42");
        assert_eq!(InternalValue::Binary(b"hi".to_vec()).to_string(), "aGk=");
        assert_eq!(
            InternalValue::Name(QualifiedName::dav("href")).to_string(),
            "{DAV:}href"
        );
    }

    #[test]
    fn test_value_serde_tagged() {
        let json = serde_json::to_string(&InternalValue::Long(7)).unwrap();
        assert_eq!(json, r#"{"type":"long","value":7}"#);
        let back: InternalValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InternalValue::Long(7));
    }
}
