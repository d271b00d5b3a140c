//! Declarative attribute definitions for entity kinds
//!
//! `swissarmyhammer-attributes` lets an entity kind declare named, typed
//! attributes once and then construct validated instances from loose field
//! maps.
//!
//! # Architecture
//!
//! - **Registry**: each kind owns an ordered [`AttributeRegistry`]; sub-kinds
//!   start from an independent copy of their parent's full registry
//! - **Engine**: [`ConstructionEngine`] checks unknown keys, resolves
//!   supplied values and defaults, then applies nil policy and type checks
//! - **Instances**: slots are independently settable; equality and display
//!   walk the registry in declaration order
//! - **Catalog**: [`KindCatalog`] defines kinds from YAML and resolves
//!   kind-name type references
//!
//! ```rust
//! use swissarmyhammer_attributes::{AttributeOptions, EntityKind, Fields, Value};
//!
//! let foo = EntityKind::define("Foo")
//!     .attribute("bar", AttributeOptions::new().tag("string").default("my default"))
//!     .build()?;
//! let sub = EntityKind::define("SubFoo")
//!     .extends(&foo)
//!     .attribute("lollipop", AttributeOptions::new().tag("integer").default(1))
//!     .build()?;
//!
//! let instance = sub.construct(&Fields::new())?;
//! assert_eq!(instance.get("bar")?, &Value::from("my default"));
//! assert_eq!(instance.get_as::<i64>("lollipop")?, 1);
//! # Ok::<(), swissarmyhammer_attributes::AttributeError>(())
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod instance;
pub mod kind;
pub mod logging;
pub mod registry;
pub mod types;
pub mod value;

pub use catalog::{AttributeDef, KindCatalog, KindDef};
pub use engine::ConstructionEngine;
pub use error::{AttributeError, Result};
pub use instance::Instance;
pub use kind::{EntityKind, EntityKindBuilder};
pub use registry::AttributeRegistry;
pub use types::{
    AttributeDecl, AttributeOptions, DefaultFn, DefaultSpec, NilPolicy, PrimitiveTag,
    TypeConstraint,
};
pub use value::{Fields, FromValue, Value};
