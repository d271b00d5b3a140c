//! Integration tests for kind definition and instance construction
//!
//! Each test defines its own kinds so tests stay independent, except for the
//! shared `COUNTED` kind which exercises one-time static definition.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::LazyLock;

use indexmap::IndexMap;
use swissarmyhammer_attributes::{
    AttributeError, AttributeOptions, EntityKind, Fields, Instance, PrimitiveTag, Value,
};

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn foo_kind() -> EntityKind {
    EntityKind::define("Foo")
        .attribute("bar", AttributeOptions::new().default("my default"))
        .build()
        .unwrap()
}

#[test_log::test]
fn test_missing_required_attribute() {
    let kind = EntityKind::define("Foo")
        .attribute("bar", AttributeOptions::new())
        .build()
        .unwrap();

    let result = kind.construct_empty();
    match result {
        Err(AttributeError::MissingAttribute { kind, attribute }) => {
            assert_eq!(kind, "Foo");
            assert_eq!(attribute, "bar");
        }
        other => panic!("expected MissingAttribute, got {other:?}"),
    }
}

#[test_log::test]
fn test_explicit_nil_is_allowed_by_default() {
    let kind = EntityKind::define("Foo")
        .attribute("bar", AttributeOptions::new().tag("string"))
        .build()
        .unwrap();

    let instance = kind.construct(&fields([("bar", Value::Nil)])).unwrap();
    assert_eq!(instance.get("bar").unwrap(), &Value::Nil);
    assert_eq!(instance.get_as::<Option<String>>("bar").unwrap(), None);
}

#[test_log::test]
fn test_explicit_nil_overrides_default() {
    let instance = foo_kind()
        .construct(&fields([("bar", Value::Nil)]))
        .unwrap();
    assert!(instance.get("bar").unwrap().is_nil());
}

#[test_log::test]
fn test_explicit_nil_is_rejected_when_disallowed() {
    let kind = EntityKind::define("Foo")
        .attribute("bar", AttributeOptions::new().disallow_nil())
        .build()
        .unwrap();

    let err = kind.construct(&fields([("bar", Value::Nil)])).unwrap_err();
    assert!(matches!(err, AttributeError::DisallowedValue { .. }));
    assert_eq!(err.attribute(), Some("bar"));
}

#[test_log::test]
fn test_static_default() {
    let kind = foo_kind();

    let defaulted = kind.construct_empty().unwrap();
    assert_eq!(defaulted.get_as::<String>("bar").unwrap(), "my default");

    let supplied = kind
        .construct(&fields([("bar", Value::from("supplied"))]))
        .unwrap();
    assert_eq!(supplied.get_as::<String>("bar").unwrap(), "supplied");
}

static COUNTER: AtomicI64 = AtomicI64::new(0);

static COUNTED: LazyLock<EntityKind> = LazyLock::new(|| {
    EntityKind::define("Counted")
        .attribute(
            "sequence",
            AttributeOptions::new()
                .primitive(PrimitiveTag::Integer)
                .default_with(|| Value::Integer(COUNTER.fetch_add(1, Ordering::SeqCst) + 1)),
        )
        .build()
        .unwrap()
});

#[test_log::test]
fn test_computed_default_reevaluates_per_construction() {
    let first = COUNTED.construct_empty().unwrap();
    let second = COUNTED.construct_empty().unwrap();

    assert_eq!(first.get_as::<i64>("sequence").unwrap(), 1);
    assert_eq!(second.get_as::<i64>("sequence").unwrap(), 2);
}

#[test_log::test]
fn test_unknown_attribute() {
    let err = foo_kind()
        .construct(&fields([("baz", Value::from("nope"))]))
        .unwrap_err();
    match err {
        AttributeError::UnknownAttribute { attribute, .. } => assert_eq!(attribute, "baz"),
        other => panic!("expected UnknownAttribute, got {other:?}"),
    }
}

#[test_log::test]
fn test_inherited_attributes() {
    let parent = foo_kind();
    let child = EntityKind::define("SubFoo")
        .extends(&parent)
        .attribute("lollipop", AttributeOptions::new().default("lolli"))
        .build()
        .unwrap();

    let instance = child.construct_empty().unwrap();
    assert_eq!(instance.get_as::<String>("bar").unwrap(), "my default");
    assert_eq!(instance.get_as::<String>("lollipop").unwrap(), "lolli");

    // Parent instances don't gain the child's attribute
    let parent_instance = parent.construct_empty().unwrap();
    assert!(parent_instance.get("lollipop").is_err());
    assert!(parent
        .construct(&fields([("lollipop", Value::from("x"))]))
        .is_err());
}

#[test_log::test]
fn test_input_fields_are_not_mutated() {
    let kind = EntityKind::define("Foo")
        .attribute("tags", AttributeOptions::new().tag("sequence"))
        .build()
        .unwrap();

    let input = fields([("tags", Value::from(vec!["a", "b"]))]);
    let snapshot = input.clone();

    let mut instance = kind.construct(&input).unwrap();
    instance.set("tags", vec!["changed"]).unwrap();

    assert_eq!(input, snapshot);
    assert_ne!(instance.get("tags").unwrap(), snapshot.get("tags").unwrap());
}

fn assert_type_mismatch(tag: PrimitiveTag, bad: Value, good: Value) {
    let kind = EntityKind::define("Typed")
        .attribute("value", AttributeOptions::new().primitive(tag))
        .build()
        .unwrap();

    let err = kind
        .construct(&fields([("value", bad.clone())]))
        .unwrap_err();
    assert!(
        matches!(err, AttributeError::TypeMismatch { ref attribute, .. } if attribute == "value"),
        "{tag} should reject {bad:?}, got {err:?}"
    );

    assert!(
        kind.construct(&fields([("value", good.clone())])).is_ok(),
        "{tag} should accept {good:?}"
    );
    assert!(
        kind.construct(&fields([("value", Value::Nil)])).is_ok(),
        "{tag} should accept nil"
    );
}

#[test_log::test]
fn test_primitive_type_checks() {
    assert_type_mismatch(PrimitiveTag::String, Value::Integer(1), Value::from("s"));
    assert_type_mismatch(PrimitiveTag::Boolean, Value::from("true"), Value::Boolean(true));
    assert_type_mismatch(PrimitiveTag::Integer, Value::Float(1.5), Value::Integer(1));
    assert_type_mismatch(PrimitiveTag::Float, Value::Integer(1), Value::Float(1.0));
    assert_type_mismatch(PrimitiveTag::Numeric, Value::from("1"), Value::Float(0.5));
    assert_type_mismatch(PrimitiveTag::Symbol, Value::from("sym"), Value::symbol("sym"));
    assert_type_mismatch(
        PrimitiveTag::Sequence,
        Value::from("a,b"),
        Value::from(vec![1i64, 2]),
    );
    assert_type_mismatch(
        PrimitiveTag::Mapping,
        Value::from(vec![1i64]),
        Value::Mapping(IndexMap::new()),
    );
}

#[test_log::test]
fn test_numeric_accepts_integer_and_float() {
    let kind = EntityKind::define("Measure")
        .attribute("amount", AttributeOptions::new().tag("numeric"))
        .build()
        .unwrap();

    for value in [Value::Integer(3), Value::Float(3.25)] {
        let instance = kind.construct(&fields([("amount", value.clone())])).unwrap();
        assert_eq!(instance.get("amount").unwrap(), &value);
    }
}

#[test_log::test]
fn test_nil_never_fails_type_check_but_may_fail_policy() {
    let kind = EntityKind::define("Foo")
        .attribute("loose", AttributeOptions::new().tag("integer"))
        .attribute("strict", AttributeOptions::new().tag("integer").disallow_nil())
        .build()
        .unwrap();

    let err = kind
        .construct(&fields([("loose", Value::Nil), ("strict", Value::Nil)]))
        .unwrap_err();
    assert!(matches!(err, AttributeError::DisallowedValue { ref attribute, .. } if attribute == "strict"));

    let instance = kind
        .construct(&fields([("loose", Value::Nil), ("strict", Value::Integer(1))]))
        .unwrap();
    assert!(instance.get("loose").unwrap().is_nil());
}

#[test_log::test]
fn test_kind_reference_constraint() {
    let animal = EntityKind::define("Animal")
        .attribute("name", AttributeOptions::new().tag("string"))
        .build()
        .unwrap();
    let dog = EntityKind::define("Dog").extends(&animal).build().unwrap();
    let rock = EntityKind::define("Rock").build().unwrap();
    let owner = EntityKind::define("Owner")
        .attribute("pet", AttributeOptions::new().kind_of(&animal))
        .build()
        .unwrap();

    let rex = dog.construct(&fields([("name", Value::from("Rex"))])).unwrap();
    let owned = owner.construct(&fields([("pet", Value::from(rex.clone()))])).unwrap();
    assert_eq!(owned.get_as::<Instance>("pet").unwrap(), rex);

    let pebble = rock.construct_empty().unwrap();
    match owner.construct(&fields([("pet", Value::from(pebble))])) {
        Err(AttributeError::TypeMismatch { expected, actual, .. }) => {
            assert_eq!(expected, "instance of Animal");
            assert_eq!(actual, "Rock");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }

    assert!(owner.construct(&fields([("pet", Value::from("Rex"))])).is_err());
    assert!(owner.construct(&fields([("pet", Value::Nil)])).is_ok());
}

#[test_log::test]
fn test_equality() {
    let kind = EntityKind::define("Pair")
        .attribute("left", AttributeOptions::new())
        .attribute("right", AttributeOptions::new())
        .build()
        .unwrap();

    let a = kind
        .construct(&fields([("left", Value::Integer(1)), ("right", Value::from("x"))]))
        .unwrap();
    let b = kind
        .construct(&fields([("right", Value::from("x")), ("left", Value::Integer(1))]))
        .unwrap();
    let c = kind
        .construct(&fields([("left", Value::Integer(1)), ("right", Value::from("y"))]))
        .unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);

    let mut d = b.clone();
    d.set("left", 2).unwrap();
    assert_ne!(a, d);
}

#[test_log::test]
fn test_parent_and_child_instances_are_never_equal() {
    let parent = foo_kind();
    let child = EntityKind::define("SubFoo").extends(&parent).build().unwrap();

    let p = parent.construct_empty().unwrap();
    let c = child.construct_empty().unwrap();
    assert_eq!(p.slots(), c.slots());
    assert_ne!(p, c);
    assert_ne!(Value::from(p), Value::from("my default"));
}

#[test_log::test]
fn test_unrecognized_tag_fails_at_definition() {
    let result = EntityKind::define("Foo")
        .attribute("bar", AttributeOptions::new().tag("not_a_type"))
        .build();
    match result {
        Err(AttributeError::Configuration { kind, message }) => {
            assert_eq!(kind, "Foo");
            assert!(message.contains("not_a_type"));
        }
        other => panic!("expected Configuration error, got {other:?}"),
    }
}

/// Hand-written typed facade over a kind, the way consumers wrap instances.
struct Task(Instance);

impl Task {
    fn kind() -> EntityKind {
        EntityKind::define("Task")
            .attribute("title", AttributeOptions::new().tag("string").disallow_nil())
            .attribute("done", AttributeOptions::new().tag("boolean").default(false))
            .build()
            .unwrap()
    }

    fn title(&self) -> String {
        self.0.get_as("title").unwrap()
    }

    fn done(&self) -> bool {
        self.0.get_as("done").unwrap()
    }

    fn complete(&mut self) {
        self.0.set("done", true).unwrap();
    }
}

#[test_log::test]
fn test_typed_facade() {
    let kind = Task::kind();
    let mut task = Task(
        kind.construct(&fields([("title", Value::from("write tests"))]))
            .unwrap(),
    );
    assert_eq!(task.title(), "write tests");
    assert!(!task.done());
    task.complete();
    assert!(task.done());
    assert_eq!(task.0.to_string(), r#"Task { title: "write tests", done: true }"#);
}

#[test_log::test]
fn test_construct_from_json_fields() {
    let kind = EntityKind::define("Config")
        .attribute("retries", AttributeOptions::new().tag("integer"))
        .attribute("ratio", AttributeOptions::new().tag("float").default(0.5))
        .attribute("labels", AttributeOptions::new().tag("mapping").default(Value::Nil))
        .build()
        .unwrap();

    let json = serde_json::json!({"retries": 3, "labels": {"env": "prod"}});
    let supplied = Value::from(json).as_mapping().cloned().unwrap();
    let instance = kind.construct(&supplied).unwrap();

    assert_eq!(instance.get_as::<i64>("retries").unwrap(), 3);
    assert_eq!(instance.get_as::<f64>("ratio").unwrap(), 0.5);
    assert_eq!(
        serde_json::to_value(&instance).unwrap(),
        serde_json::json!({"retries": 3, "ratio": 0.5, "labels": {"env": "prod"}})
    );
}

#[test_log::test]
fn test_concurrent_construction() {
    let kind = foo_kind();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let kind = kind.clone();
            std::thread::spawn(move || {
                kind.construct(&fields([("bar", Value::Integer(i))]))
                    .unwrap()
                    .get_as::<i64>("bar")
                    .unwrap()
            })
        })
        .collect();

    let mut seen: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}
