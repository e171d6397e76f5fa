//! Depth values for REPORT traversal
//!
//! `Depth` accepts "0", "1", any other non-negative integer, and
//! "infinity". `Infinity` is the sentinel for unbounded descent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::WebDavError;

/// How far below the target resource a report descends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DepthRepr", into = "DepthRepr")]
pub enum Depth {
    Finite(u32),
    Infinity,
}

impl Depth {
    pub const ZERO: Depth = Depth::Finite(0);
    pub const ONE: Depth = Depth::Finite(1);

    /// Depth for the members one level down, or `None` once exhausted
    pub fn descend(self) -> Option<Depth> {
        match self {
            Depth::Finite(0) => None,
            Depth::Finite(n) => Some(Depth::Finite(n - 1)),
            Depth::Infinity => Some(Depth::Infinity),
        }
    }

    /// Parse an optional `Depth` header, falling back to `default`
    pub fn from_header(value: Option<&str>, default: Depth) -> Result<Depth, WebDavError> {
        match value {
            Some(v) => v.parse(),
            None => Ok(default),
        }
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth::ZERO
    }
}

impl FromStr for Depth {
    type Err = WebDavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("infinity") {
            return Ok(Depth::Infinity);
        }
        s.parse::<u32>()
            .map(Depth::Finite)
            .map_err(|_| WebDavError::InvalidRequest(format!("Invalid depth: {}", s)))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Finite(n) => write!(f, "{}", n),
            Depth::Infinity => f.write_str("infinity"),
        }
    }
}

/// Wire form: an integer or a string
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DepthRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<DepthRepr> for Depth {
    type Error = WebDavError;

    fn try_from(repr: DepthRepr) -> Result<Self, Self::Error> {
        match repr {
            DepthRepr::Number(n) => Ok(Depth::Finite(n)),
            DepthRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Depth> for DepthRepr {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Finite(n) => DepthRepr::Number(n),
            Depth::Infinity => DepthRepr::Text("infinity".to_string()),
        }
    }
}
