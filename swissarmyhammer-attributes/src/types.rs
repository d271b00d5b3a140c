//! Attribute declaration types.
//!
//! A declaration pairs a name with a type constraint, an optional default and
//! a nil policy. `AttributeOptions` is the definition-time builder; the
//! registry resolves it into an immutable `AttributeDecl`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::kind::EntityKind;
use crate::value::Value;

/// Symbolic primitive type tags usable as a type constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    String,
    Boolean,
    /// Whole numbers only
    Integer,
    /// Fractional numbers only
    Float,
    /// Integers or floats
    Numeric,
    Symbol,
    Sequence,
    Mapping,
}

impl PrimitiveTag {
    pub const ALL: [PrimitiveTag; 8] = [
        PrimitiveTag::String,
        PrimitiveTag::Boolean,
        PrimitiveTag::Integer,
        PrimitiveTag::Float,
        PrimitiveTag::Numeric,
        PrimitiveTag::Symbol,
        PrimitiveTag::Sequence,
        PrimitiveTag::Mapping,
    ];

    /// Get the string representation of this tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveTag::String => "string",
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Integer => "integer",
            PrimitiveTag::Float => "float",
            PrimitiveTag::Numeric => "numeric",
            PrimitiveTag::Symbol => "symbol",
            PrimitiveTag::Sequence => "sequence",
            PrimitiveTag::Mapping => "mapping",
        }
    }

    /// Whether a non-nil value belongs to this tag's category.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PrimitiveTag::String => matches!(value, Value::String(_)),
            PrimitiveTag::Boolean => matches!(value, Value::Boolean(_)),
            PrimitiveTag::Integer => matches!(value, Value::Integer(_)),
            PrimitiveTag::Float => matches!(value, Value::Float(_)),
            PrimitiveTag::Numeric => matches!(value, Value::Integer(_) | Value::Float(_)),
            PrimitiveTag::Symbol => matches!(value, Value::Symbol(_)),
            PrimitiveTag::Sequence => matches!(value, Value::Sequence(_)),
            PrimitiveTag::Mapping => matches!(value, Value::Mapping(_)),
        }
    }
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveTag {
    /// The unrecognized input
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.to_lowercase().as_str() {
            "string" | "str" => PrimitiveTag::String,
            "boolean" | "bool" => PrimitiveTag::Boolean,
            "integer" | "int" => PrimitiveTag::Integer,
            "float" => PrimitiveTag::Float,
            "numeric" | "number" => PrimitiveTag::Numeric,
            "symbol" => PrimitiveTag::Symbol,
            "sequence" | "array" | "list" => PrimitiveTag::Sequence,
            "mapping" | "map" | "hash" => PrimitiveTag::Mapping,
            _ => return Err(s.to_string()),
        };
        Ok(tag)
    }
}

/// A resolved type constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TypeConstraint {
    /// No type check
    #[default]
    Unconstrained,
    /// Value must belong to a primitive category
    Primitive(PrimitiveTag),
    /// Value must be an instance of this kind or one of its descendants
    Kind(EntityKind),
}

impl TypeConstraint {
    /// Whether `value` satisfies the constraint. Nil always does.
    pub fn admits(&self, value: &Value) -> bool {
        if value.is_nil() {
            return true;
        }
        match self {
            TypeConstraint::Unconstrained => true,
            TypeConstraint::Primitive(tag) => tag.matches(value),
            TypeConstraint::Kind(kind) => value
                .as_instance()
                .is_some_and(|instance| instance.kind().is_kind_of(kind)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TypeConstraint::Unconstrained => "any value".to_string(),
            TypeConstraint::Primitive(tag) => tag.as_str().to_string(),
            TypeConstraint::Kind(kind) => format!("instance of {}", kind.name()),
        }
    }
}

/// Zero-argument default computation.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// How an omitted attribute gets its value.
#[derive(Clone)]
pub enum DefaultSpec {
    /// Cloned as-is into every instance
    Static(Value),
    /// Invoked once per construction that omits the attribute
    Computed(DefaultFn),
}

impl DefaultSpec {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultSpec::Static(value) => value.clone(),
            DefaultSpec::Computed(compute) => compute(),
        }
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Whether nil is an acceptable resolved value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NilPolicy {
    #[default]
    AllowNil,
    DisallowNil,
}

/// Type slot as written at definition time, before resolution.
#[derive(Debug, Clone, Default)]
pub(crate) enum TypeSlot {
    #[default]
    None,
    Tag(String),
    Primitive(PrimitiveTag),
    Kind(EntityKind),
}

/// Definition-time options for one attribute.
///
/// ```rust
/// use swissarmyhammer_attributes::{AttributeOptions, PrimitiveTag};
///
/// let options = AttributeOptions::new()
///     .primitive(PrimitiveTag::String)
///     .default("my default")
///     .disallow_nil();
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    pub(crate) type_slot: TypeSlot,
    pub(crate) default: Option<DefaultSpec>,
    pub(crate) nil_policy: NilPolicy,
}

impl AttributeOptions {
    /// Unconstrained, required, nil permitted.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Constrain by symbolic tag name. Unrecognized names fail when the kind is built.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.type_slot = TypeSlot::Tag(tag.into());
        self
    }

    pub fn primitive(mut self, tag: PrimitiveTag) -> Self {
        self.type_slot = TypeSlot::Primitive(tag);
        self
    }

    /// Require instances of `kind` (descendants included).
    pub fn kind_of(mut self, kind: &EntityKind) -> Self {
        self.type_slot = TypeSlot::Kind(kind.clone());
        self
    }

    /// Static default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultSpec::Static(value.into()));
        self
    }

    /// Computed default, re-evaluated on every construction that omits the attribute.
    pub fn default_with<F>(mut self, compute: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultSpec::Computed(Arc::new(compute)));
        self
    }

    pub fn disallow_nil(mut self) -> Self {
        self.nil_policy = NilPolicy::DisallowNil;
        self
    }

    pub fn nil_policy(mut self, policy: NilPolicy) -> Self {
        self.nil_policy = policy;
        self
    }
}

/// A resolved attribute declaration, owned by a registry.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    pub(crate) name: String,
    pub(crate) type_constraint: TypeConstraint,
    pub(crate) default: Option<DefaultSpec>,
    pub(crate) nil_policy: NilPolicy,
}

impl AttributeDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_constraint(&self) -> &TypeConstraint {
        &self.type_constraint
    }

    pub fn default_spec(&self) -> Option<&DefaultSpec> {
        self.default.as_ref()
    }

    pub fn nil_policy(&self) -> NilPolicy {
        self.nil_policy
    }

    /// No default: the caller must supply a value.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn allows_nil(&self) -> bool {
        self.nil_policy == NilPolicy::AllowNil
    }
}
