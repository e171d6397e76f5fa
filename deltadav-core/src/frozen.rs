//! Frozen property snapshots
//!
//! When a version is checked in, every live property of the resource is
//! captured as a `PersistentProperty`. The snapshot never changes after
//! construction.
//!
//! `PersistentProperty::new` copies the values out of the borrowed
//! `PropertyState`, so later changes to the live state do not reach the
//! snapshot. `values()` hands out a shared slice; `to_values()` returns an
//! owned copy the caller may modify freely.

use serde::{Deserialize, Serialize};

use crate::name::QualifiedName;
use crate::properties::DavProperty;
use crate::value::{InternalValue, PropertyType};

/// Errors raised when freezing a property state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrozenPropertyError {
    #[error("single-valued property {name} has {count} values")]
    SingleValueCount { name: QualifiedName, count: usize },

    #[error("property {name} is declared {expected} but holds a {found} value")]
    TypeMismatch {
        name: QualifiedName,
        expected: PropertyType,
        found: PropertyType,
    },
}

/// Live persisted state of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    pub name: QualifiedName,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub values: Vec<InternalValue>,
}

impl PropertyState {
    pub fn new(name: QualifiedName, property_type: PropertyType, values: Vec<InternalValue>) -> Self {
        Self {
            name,
            property_type,
            values,
        }
    }

    /// Single string value
    pub fn string(name: QualifiedName, value: &str) -> Self {
        Self::new(name, PropertyType::String, vec![InternalValue::from(value)])
    }
}

/// Immutable snapshot of one property taken at check-in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistentProperty {
    name: QualifiedName,
    property_type: PropertyType,
    values: Box<[InternalValue]>,
    multiple: bool,
}

impl PersistentProperty {
    /// Freeze `state`
    ///
    /// A single-valued property must carry exactly one value, and every
    /// value must match the declared type.
    pub fn new(state: &PropertyState, multiple: bool) -> Result<Self, FrozenPropertyError> {
        if !multiple && state.values.len() != 1 {
            return Err(FrozenPropertyError::SingleValueCount {
                name: state.name.clone(),
                count: state.values.len(),
            });
        }
        if let Some(bad) = state
            .values
            .iter()
            .find(|v| v.property_type() != state.property_type)
        {
            return Err(FrozenPropertyError::TypeMismatch {
                name: state.name.clone(),
                expected: state.property_type,
                found: bad.property_type(),
            });
        }

        Ok(Self {
            name: state.name.clone(),
            property_type: state.property_type,
            values: state.values.clone().into_boxed_slice(),
            multiple,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Read-only view of the frozen values
    pub fn values(&self) -> &[InternalValue] {
        &self.values
    }

    /// Owned copy of the frozen values
    pub fn to_values(&self) -> Vec<InternalValue> {
        self.values.to_vec()
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Render into the DAV property space
    ///
    /// Multi-valued properties are joined with newlines.
    pub fn to_dav_property(&self) -> DavProperty {
        let text = self
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        DavProperty::new(self.name.clone(), text)
    }
}
