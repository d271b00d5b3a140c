//! Constructed entity instances.
//!
//! An instance owns one slot per declared attribute and a shared handle to
//! its kind. Equality and inspection walk the kind's registry in declaration
//! order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::engine::ConstructionEngine;
use crate::error::{AttributeError, Result};
use crate::kind::EntityKind;
use crate::value::{FromValue, Value};

/// A populated instance of an entity kind
#[derive(Clone)]
pub struct Instance {
    kind: EntityKind,
    slots: IndexMap<String, Value>,
}

impl Instance {
    pub(crate) fn from_parts(kind: EntityKind, slots: IndexMap<String, Value>) -> Self {
        Self { kind, slots }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Read a slot.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.slots.get(name).ok_or_else(|| self.unknown(name))
    }

    /// Read a slot as a concrete Rust type.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name)?;
        T::from_value(value).ok_or_else(|| AttributeError::TypeMismatch {
            kind: self.kind.name().to_string(),
            attribute: name.to_string(),
            expected: T::EXPECTED.to_string(),
            actual: value.type_name().to_string(),
        })
    }

    /// Overwrite a slot, returning the previous value.
    ///
    /// Not re-validated; only the name must be declared.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value> {
        let kind = self.kind.name().to_string();
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| AttributeError::UnknownAttribute {
                kind,
                attribute: name.to_string(),
            })?;
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Overwrite a slot after running the nil-policy and type checks
    /// construction would apply.
    pub fn set_validated(&mut self, name: &str, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        let decl = self
            .kind
            .registry()
            .get(name)
            .ok_or_else(|| self.unknown(name))?;
        ConstructionEngine::new().validate_value(&self.kind, decl, &value)?;
        self.set(name, value)
    }

    /// Slots in declaration order.
    pub fn slots(&self) -> &IndexMap<String, Value> {
        &self.slots
    }

    pub fn into_slots(self) -> IndexMap<String, Value> {
        self.slots
    }

    fn unknown(&self, name: &str) -> AttributeError {
        AttributeError::UnknownAttribute {
            kind: self.kind.name().to_string(),
            attribute: name.to_string(),
        }
    }
}

/// Same kind, and every declared attribute equal in declaration order.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.kind.same_kind(&other.kind)
            && self
                .kind
                .registry()
                .names()
                .all(|name| self.slots.get(name) == other.slots.get(name))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.kind.name());
        for name in self.kind.registry().names() {
            if let Some(value) = self.slots.get(name) {
                s.field(name, value);
            }
        }
        s.finish()
    }
}

/// `Kind { a: 1, b: "x" }`
impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if self.slots.is_empty() {
            return Ok(());
        }
        write!(f, " {{ ")?;
        for (i, name) in self.kind.registry().names().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let value = self.slots.get(name).unwrap_or(&Value::Nil);
            write!(f, "{name}: {value}")?;
        }
        write!(f, " }}")
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.slots.serialize(serializer)
    }
}
