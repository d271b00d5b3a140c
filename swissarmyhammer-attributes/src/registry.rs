//! AttributeRegistry — the ordered set of declarations owned by an entity kind.
//!
//! A sub-kind's registry starts as an independent copy of its parent's full
//! registry; its own declarations are appended after the inherited ones.
//! Names are unique across the whole inherited set.

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{AttributeError, Result};
use crate::types::{AttributeDecl, AttributeOptions, TypeConstraint, TypeSlot};

/// Ordered mapping from attribute name to declaration
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    attributes: IndexMap<String, AttributeDecl>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sub-kind registry from the parent's full set.
    pub fn inherit(parent: &AttributeRegistry) -> Self {
        parent.clone()
    }

    /// Record a new declaration for `kind`, resolving its type slot.
    pub fn declare(
        &mut self,
        kind: &str,
        name: &str,
        options: AttributeOptions,
    ) -> Result<&AttributeDecl> {
        if !is_identifier(name) {
            return Err(AttributeError::configuration(
                kind,
                format!("'{name}' is not a valid attribute name"),
            ));
        }
        if self.attributes.contains_key(name) {
            return Err(AttributeError::configuration(
                kind,
                format!("attribute '{name}' is already declared"),
            ));
        }

        let type_constraint = match options.type_slot {
            TypeSlot::None => TypeConstraint::Unconstrained,
            TypeSlot::Primitive(tag) => TypeConstraint::Primitive(tag),
            TypeSlot::Kind(target) => TypeConstraint::Kind(target),
            TypeSlot::Tag(tag) => match tag.parse() {
                Ok(tag) => TypeConstraint::Primitive(tag),
                Err(tag) => {
                    return Err(AttributeError::configuration(
                        kind,
                        format!("attribute '{name}' has unrecognized type tag '{tag}'"),
                    ))
                }
            },
        };

        trace!(kind, attribute = name, constraint = %type_constraint.describe(), "declared attribute");

        let decl = AttributeDecl {
            name: name.to_string(),
            type_constraint,
            default: options.default,
            nil_policy: options.nil_policy,
        };
        let (index, _) = self.attributes.insert_full(name.to_string(), decl);
        Ok(&self.attributes[index])
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
