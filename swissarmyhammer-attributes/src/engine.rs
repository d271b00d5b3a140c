//! Construction and validation engine.
//!
//! Turns a kind plus caller-supplied fields into a validated `Instance`.
//! Checks run in a fixed order:
//!
//! 1. every supplied key must be declared
//! 2. per declared attribute, in registry order: supplied value, else
//!    default, else `MissingAttribute`
//! 3. nil policy
//! 4. type constraint (nil always passes)
//!
//! The supplied fields are only ever borrowed; slots receive clones.

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{AttributeError, Result};
use crate::instance::Instance;
use crate::kind::EntityKind;
use crate::types::AttributeDecl;
use crate::value::{Fields, Value};

/// Instance construction engine
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstructionEngine;

impl ConstructionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Construct an instance of `kind` from `supplied`.
    pub fn construct(&self, kind: &EntityKind, supplied: &Fields) -> Result<Instance> {
        let registry = kind.registry();

        if let Some(unknown) = supplied.keys().find(|key| !registry.contains(key)) {
            return Err(AttributeError::UnknownAttribute {
                kind: kind.name().to_string(),
                attribute: unknown.clone(),
            });
        }

        let mut slots = IndexMap::with_capacity(registry.len());
        for decl in registry.iter() {
            let value = self.resolve_value(kind, decl, supplied)?;
            self.validate_value(kind, decl, &value)?;
            slots.insert(decl.name().to_string(), value);
        }

        trace!(
            kind = kind.name(),
            supplied = supplied.len(),
            attributes = slots.len(),
            "constructed instance"
        );

        Ok(Instance::from_parts(kind.clone(), slots))
    }

    /// Supplied value (even nil) wins; otherwise the default; otherwise missing.
    fn resolve_value(
        &self,
        kind: &EntityKind,
        decl: &AttributeDecl,
        supplied: &Fields,
    ) -> Result<Value> {
        if let Some(value) = supplied.get(decl.name()) {
            return Ok(value.clone());
        }
        match decl.default_spec() {
            Some(spec) => {
                trace!(kind = kind.name(), attribute = decl.name(), "applying default");
                Ok(spec.resolve())
            }
            None => Err(AttributeError::MissingAttribute {
                kind: kind.name().to_string(),
                attribute: decl.name().to_string(),
            }),
        }
    }

    /// Nil policy, then type constraint. Applies to any value regardless of origin.
    pub fn validate_value(
        &self,
        kind: &EntityKind,
        decl: &AttributeDecl,
        value: &Value,
    ) -> Result<()> {
        if value.is_nil() {
            if !decl.allows_nil() {
                return Err(AttributeError::DisallowedValue {
                    kind: kind.name().to_string(),
                    attribute: decl.name().to_string(),
                });
            }
            return Ok(());
        }

        if !decl.type_constraint().admits(value) {
            return Err(AttributeError::TypeMismatch {
                kind: kind.name().to_string(),
                attribute: decl.name().to_string(),
                expected: decl.type_constraint().describe(),
                actual: value.type_name().to_string(),
            });
        }

        Ok(())
    }
}
