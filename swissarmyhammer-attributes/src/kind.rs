//! Entity kinds — named owners of an attribute registry.
//!
//! An `EntityKind` is a cheap, shareable handle. Its registry is fixed when
//! `EntityKindBuilder::build` returns, so kinds can be defined once in a
//! `LazyLock` static and used from any thread:
//!
//! ```rust
//! use std::sync::LazyLock;
//! use swissarmyhammer_attributes::{AttributeOptions, EntityKind, Fields};
//!
//! static NOTE: LazyLock<EntityKind> = LazyLock::new(|| {
//!     EntityKind::define("Note")
//!         .attribute("title", AttributeOptions::new().tag("string").disallow_nil())
//!         .attribute("pinned", AttributeOptions::new().tag("boolean").default(false))
//!         .build()
//!         .expect("Note kind is well-formed")
//! });
//!
//! let note = NOTE
//!     .construct(&Fields::from([("title".to_string(), "groceries".into())]))
//!     .unwrap();
//! assert!(!note.get_as::<bool>("pinned").unwrap());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::ConstructionEngine;
use crate::error::{AttributeError, Result};
use crate::instance::Instance;
use crate::registry::AttributeRegistry;
use crate::types::AttributeOptions;
use crate::value::Fields;

struct KindInner {
    name: String,
    parent: Option<EntityKind>,
    registry: AttributeRegistry,
}

/// Handle to a defined entity kind.
///
/// Equality is identity: two handles are equal only if they came from the
/// same `build` call.
#[derive(Clone)]
pub struct EntityKind {
    inner: Arc<KindInner>,
}

impl EntityKind {
    /// Start defining a kind.
    pub fn define(name: impl Into<String>) -> EntityKindBuilder {
        EntityKindBuilder {
            name: name.into(),
            parent: None,
            declarations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&EntityKind> {
        self.inner.parent.as_ref()
    }

    /// Full registry, inherited declarations first.
    pub fn registry(&self) -> &AttributeRegistry {
        &self.inner.registry
    }

    /// Same kind (identity).
    pub fn same_kind(&self, other: &EntityKind) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// True if `self` is `ancestor` or descends from it.
    pub fn is_kind_of(&self, ancestor: &EntityKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind.same_kind(ancestor) {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Build a validated instance from caller-supplied fields.
    pub fn construct(&self, supplied: &Fields) -> Result<Instance> {
        ConstructionEngine::new().construct(self, supplied)
    }

    /// Build an instance relying entirely on defaults.
    pub fn construct_empty(&self) -> Result<Instance> {
        self.construct(&Fields::new())
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        self.same_kind(other)
    }
}

impl fmt::Debug for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityKind")
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(EntityKind::name))
            .field("attributes", &self.registry().names().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder for `EntityKind`. Created by `EntityKind::define()`.
pub struct EntityKindBuilder {
    name: String,
    parent: Option<EntityKind>,
    declarations: Vec<(String, AttributeOptions)>,
}

impl EntityKindBuilder {
    /// Inherit every declaration of `parent`.
    pub fn extends(mut self, parent: &EntityKind) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare an attribute. Declarations are processed in call order by `build`.
    pub fn attribute(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        self.declarations.push((name.into(), options));
        self
    }

    /// Resolve every declaration and freeze the registry.
    pub fn build(self) -> Result<EntityKind> {
        if self.name.trim().is_empty() {
            return Err(AttributeError::configuration(
                self.name,
                "kind name cannot be empty",
            ));
        }

        let mut registry = match &self.parent {
            Some(parent) => AttributeRegistry::inherit(parent.registry()),
            None => AttributeRegistry::new(),
        };
        let inherited = registry.len();

        for (attribute, options) in self.declarations {
            registry.declare(&self.name, &attribute, options)?;
        }

        debug!(
            kind = %self.name,
            parent = self.parent.as_ref().map(EntityKind::name),
            inherited,
            attributes = registry.len(),
            "entity kind defined"
        );

        Ok(EntityKind {
            inner: Arc::new(KindInner {
                name: self.name,
                parent: self.parent,
                registry,
            }),
        })
    }
}
