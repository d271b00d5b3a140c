//! KindCatalog — named entity kinds defined from YAML documents.
//!
//! A kind definition looks like:
//!
//! ```yaml
//! name: Widget
//! extends: Thing
//! attributes:
//!   - name: bar
//!     type: string
//!     default: my default
//!   - name: owner
//!     type: Person
//!     disallow: nil
//! ```
//!
//! `type` is a primitive tag if it parses as one, otherwise the name of a
//! kind already in the catalog. Kind names that parse as a primitive tag
//! (`List`, `Hash`, `Int`, ...) are rejected so every kind stays
//! referenceable. `extends` must name a kind already in the
//! catalog, so documents listing several kinds are processed in order.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::error::{AttributeError, Result};
use crate::kind::EntityKind;
use crate::logging::Pretty;
use crate::types::{AttributeOptions, PrimitiveTag};
use crate::value::Value;

/// Textual definition of one attribute.
///
/// Defaults keep their YAML form until the kind is defined, so `.inf` and
/// `.nan` stay floats. YAML has no symbol scalar; write a symbol default
/// with the `!symbol` tag (`default: !symbol backlog`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// `Some(Null)` is an explicit nil default; `None` means required.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<serde_yaml_ng::Value>,
    /// Only nil (`nil`, `null` or `~`) is a recognized sentinel.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub disallow: Option<serde_yaml_ng::Value>,
}

/// Textual definition of one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KindDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

/// Distinguish an explicit `null` from an absent key.
fn present<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<serde_yaml_ng::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_yaml_ng::Value::deserialize(deserializer).map(Some)
}

/// Convert a YAML default into a slot value.
///
/// Mapping keys must be strings, integers must fit in `i64`, and the only
/// accepted tag is `!symbol` on a string.
fn yaml_to_value(kind: &str, attribute: &str, yaml: serde_yaml_ng::Value) -> Result<Value> {
    use serde_yaml_ng::Value as Yaml;

    let invalid = |message: String| {
        AttributeError::configuration(kind, format!("attribute '{attribute}' default {message}"))
    };

    let value = match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Boolean(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.as_u64().is_some() {
                return Err(invalid(format!("{n} does not fit in a 64-bit signed integer")));
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| yaml_to_value(kind, attribute, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut entries = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let Yaml::String(key) = key else {
                    return Err(invalid(format!("has non-string mapping key {key:?}")));
                };
                entries.insert(key, yaml_to_value(kind, attribute, item)?);
            }
            Value::Mapping(entries)
        }
        Yaml::Tagged(tagged) => {
            let serde_yaml_ng::value::TaggedValue { tag, value } = *tagged;
            match value {
                Yaml::String(name) if tag == "symbol" => Value::Symbol(name),
                other => {
                    return Err(invalid(format!(
                        "has unsupported tagged value {tag} {other:?}"
                    )))
                }
            }
        }
    };
    Ok(value)
}

/// A kind name that reads as a primitive tag could never be referenced by `type`.
fn check_kind_name(name: &str) -> Result<()> {
    if let Ok(tag) = name.parse::<PrimitiveTag>() {
        return Err(AttributeError::configuration(
            name,
            format!("kind name collides with primitive type tag '{tag}'"),
        ));
    }
    Ok(())
}

/// Named kinds, in definition order
#[derive(Debug, Default)]
pub struct KindCatalog {
    kinds: IndexMap<String, EntityKind>,
}

impl KindCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-built kind so definitions can reference it by name.
    pub fn register(&mut self, kind: EntityKind) -> Result<()> {
        check_kind_name(kind.name())?;
        if self.kinds.contains_key(kind.name()) {
            return Err(AttributeError::configuration(
                kind.name(),
                "kind is already defined",
            ));
        }
        self.kinds.insert(kind.name().to_string(), kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EntityKind> {
        self.kinds.get(name)
    }

    /// All kinds, in definition order.
    pub fn kinds(&self) -> impl Iterator<Item = &EntityKind> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Build and register a kind from its textual definition.
    pub fn define(&mut self, def: &KindDef) -> Result<EntityKind> {
        trace!("defining kind: {}", Pretty(def));

        check_kind_name(&def.name)?;
        if self.kinds.contains_key(&def.name) {
            return Err(AttributeError::configuration(
                &def.name,
                "kind is already defined",
            ));
        }

        let mut builder = EntityKind::define(&def.name);
        if let Some(parent) = &def.extends {
            let parent = self.kinds.get(parent).ok_or_else(|| {
                AttributeError::configuration(&def.name, format!("unknown parent kind '{parent}'"))
            })?;
            builder = builder.extends(parent);
        }

        for attr in &def.attributes {
            builder = builder.attribute(&attr.name, self.options_for(&def.name, attr)?);
        }

        let kind = builder.build()?;
        self.register(kind.clone())?;
        Ok(kind)
    }

    /// Define a single kind from a YAML document.
    pub fn define_yaml(&mut self, yaml: &str) -> Result<EntityKind> {
        let def: KindDef = serde_yaml_ng::from_str(yaml)?;
        self.define(&def)
    }

    /// Define every kind in a YAML list, in order.
    ///
    /// Stops at the first failure; kinds defined before it stay registered.
    pub fn load_yaml(&mut self, yaml: &str) -> Result<Vec<EntityKind>> {
        let defs: Vec<KindDef> = serde_yaml_ng::from_str(yaml)?;
        let kinds = defs
            .iter()
            .map(|def| self.define(def))
            .collect::<Result<Vec<_>>>()?;
        debug!(kinds = kinds.len(), "loaded kind definitions");
        Ok(kinds)
    }

    /// Read a YAML list of kind definitions from disk.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<EntityKind>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!(?path, "reading kind definitions");
        self.load_yaml(&content)
    }

    fn options_for(&self, kind: &str, attr: &AttributeDef) -> Result<AttributeOptions> {
        let mut options = AttributeOptions::new();

        if let Some(type_name) = &attr.type_ {
            options = match type_name.parse::<PrimitiveTag>() {
                Ok(tag) => options.primitive(tag),
                Err(_) => match self.kinds.get(type_name) {
                    Some(target) => options.kind_of(target),
                    None => {
                        return Err(AttributeError::configuration(
                            kind,
                            format!(
                                "attribute '{}' has unrecognized type '{type_name}'",
                                attr.name
                            ),
                        ))
                    }
                },
            };
        }

        if let Some(default) = &attr.default {
            options = options.default(yaml_to_value(kind, &attr.name, default.clone())?);
        }

        match &attr.disallow {
            None => {}
            Some(serde_yaml_ng::Value::Null) => options = options.disallow_nil(),
            Some(serde_yaml_ng::Value::String(s)) if s == "nil" || s == "null" => {
                options = options.disallow_nil()
            }
            Some(other) => {
                return Err(AttributeError::configuration(
                    kind,
                    format!(
                        "attribute '{}' has unsupported disallow value {other:?}",
                        attr.name
                    ),
                ))
            }
        }

        Ok(options)
    }
}
