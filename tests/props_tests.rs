//! Integration tests for the property schema and container

use std::sync::Arc;

use propschema::{
    Error, ErrorKind, Instance, Kind, Model, Registry, Slot, TypeTag, Value,
};

fn address_kind() -> Arc<Kind> {
    Kind::builder("Address")
        .slot("street", Slot::new().with_types([TypeTag::Str]))
        .slot("city", Slot::new().with_types([TypeTag::Str]).with_default("nowhere"))
        .build()
        .unwrap()
}

fn kind_of(err: &Error) -> ErrorKind {
    err.as_validation().expect("expected a validation error").kind()
}

#[test]
fn non_nullable_slot_rejects_null() {
    let kind = Kind::builder("Doc")
        .slot("title", Slot::new().nullable(false).with_types([TypeTag::Str]))
        .build()
        .unwrap();
    let mut instance = kind.instantiate().unwrap();

    let err = instance.set("title", Value::Null).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::NullValue);

    // anything valid never trips the null check
    instance.set("title", "hello").unwrap();
    assert_eq!(instance.get("title").unwrap(), Value::from("hello"));
}

#[test]
fn unset_non_nullable_slot_fails_on_get() {
    let kind = Kind::builder("Doc")
        .slot("title", Slot::new().nullable(false))
        .build()
        .unwrap();
    let instance = kind.instantiate().unwrap();
    let err = instance.get("title").unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::NullValue);
}

#[test]
fn unset_nullable_slot_reads_null() {
    let kind = Kind::builder("Doc").slot("note", Slot::new()).build().unwrap();
    let instance = kind.instantiate().unwrap();
    assert_eq!(instance.get("note").unwrap(), Value::Null);
}

#[test]
fn read_only_slot_accepts_exactly_one_write() {
    let kind = Kind::builder("Doc")
        .slot("id", Slot::new().read_only(true).with_types([TypeTag::Int]))
        .build()
        .unwrap();
    let mut first = kind.instantiate().unwrap();

    first.set("id", 1).unwrap();
    let err = first.set("id", 2).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::ReadOnly);
    assert_eq!(first.get("id").unwrap(), Value::from(1));

    // a different instance of the same kind is unaffected
    let mut second = kind.instantiate().unwrap();
    second.set("id", 7).unwrap();
    assert_eq!(second.get("id").unwrap(), Value::from(7));
}

#[test]
fn read_only_slot_writable_again_after_reset() {
    let kind = Kind::builder("Doc")
        .slot("id", Slot::new().read_only(true))
        .build()
        .unwrap();
    let mut instance = kind.instantiate().unwrap();
    instance.set("id", 1).unwrap();
    instance.reset("id").unwrap();
    instance.set("id", 2).unwrap();
    assert_eq!(instance.get("id").unwrap(), Value::from(2));
}

#[test]
fn schema_binds_once_across_instances() {
    let kind = address_kind();
    let instances: Vec<Instance> = (0..5).map(|_| kind.instantiate().unwrap()).collect();
    assert_eq!(kind.bind_passes(), 1);

    for instance in &instances {
        let names: Vec<&str> = instance.schema().iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["street", "city"]);
        assert!(Arc::ptr_eq(instance.schema(), instances[0].schema()));
    }
}

#[test]
fn instances_have_independent_storage() {
    let kind = address_kind();
    let mut a = kind.instantiate().unwrap();
    let mut b = kind.instantiate().unwrap();

    a.set("street", "main").unwrap();
    b.set("street", "side").unwrap();
    assert_eq!(a.get("street").unwrap(), Value::from("main"));
    assert_eq!(b.get("street").unwrap(), Value::from("side"));
}

#[test]
fn primitive_type_check() {
    let kind = address_kind();
    let mut instance = kind.instantiate().unwrap();
    let err = instance.set("street", 5).unwrap_err();
    let verr = err.as_validation().unwrap();
    assert_eq!(verr.kind(), ErrorKind::BadType);
    assert_eq!(verr.field("type"), Some(&Value::from("int")));
}

#[test]
fn base_kind_check() {
    let address = address_kind();
    let other = Kind::builder("NotAnAddress").build().unwrap();
    let kind = Kind::builder("Person")
        .slot("home", Slot::new().with_kinds(["Address"]))
        .build()
        .unwrap();
    let mut person = kind.instantiate().unwrap();

    let home = address.instantiate().unwrap();
    person.set("home", home).unwrap();

    let stranger = other.instantiate().unwrap();
    let err = person.set("home", stranger).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::BadInstance);

    let err = person.set("home", 5).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::BadInstance);
}

#[test]
fn custom_validator_wraps_reason() {
    let kind = Kind::builder("Doc")
        .slot(
            "even",
            Slot::new().with_validator(|value: &Value| match value.as_int() {
                Some(i) if i % 2 == 0 => Ok(()),
                _ => Err("value must be an even integer".to_string()),
            }),
        )
        .build()
        .unwrap();
    let mut instance = kind.instantiate().unwrap();

    instance.set("even", 4).unwrap();
    let err = instance.set("even", 3).unwrap_err();
    let verr = err.as_validation().unwrap();
    assert_eq!(verr.kind(), ErrorKind::Validator);
    assert_eq!(
        verr.field("reason"),
        Some(&Value::from("value must be an even integer"))
    );
}

#[test]
fn model_slot_builds_nested_instance_from_raw_data() {
    let address = address_kind();
    let kind = Kind::builder("Person")
        .slot("home", Slot::new().with_model(Model::of_kind(&address)))
        .build()
        .unwrap();
    let mut person = kind.instantiate().unwrap();

    // instantiation already produced a nested default instance
    let initial = person.get("home").unwrap();
    let nested = initial.as_instance().unwrap();
    assert_eq!(nested.kind_name(), "Address");
    assert_eq!(nested.get("city").unwrap(), Value::from("nowhere"));

    // raw data goes through construct-and-import
    let raw: serde_json::Value =
        serde_json::from_str(r#"{"street": "main", "city": "springfield"}"#).unwrap();
    person.set("home", Value::from_json(&raw)).unwrap();
    let home = person.get("home").unwrap();
    let home = home.as_instance().unwrap();
    assert_eq!(home.get("street").unwrap(), Value::from("main"));
    assert_eq!(home.get("city").unwrap(), Value::from("springfield"));
}

#[test]
fn model_slot_accepts_already_typed_instance() {
    let address = address_kind();
    let kind = Kind::builder("Person")
        .slot("home", Slot::new().with_model(Model::of_kind(&address)))
        .build()
        .unwrap();
    let mut person = kind.instantiate().unwrap();

    let mut home = address.instantiate().unwrap();
    home.set("street", "main").unwrap();
    person.set("home", home.clone()).unwrap();
    assert_eq!(person.get("home").unwrap(), Value::Instance(home));
}

#[test]
fn model_import_rejects_bad_raw_data() {
    let address = address_kind();
    let kind = Kind::builder("Person")
        .slot("home", Slot::new().with_model(Model::of_kind(&address)))
        .build()
        .unwrap();
    let mut person = kind.instantiate().unwrap();

    let err = person.set("home", 5).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::BadInstance);
}

#[test]
fn model_without_import_capability_is_rejected() {
    let kind = Kind::builder("Holder")
        .slot("thing", Slot::new().with_model(Model::from_fn(|| Ok(Value::from(0)))))
        .build()
        .unwrap();
    // reset during instantiation goes construct -> set -> import, and the
    // product of this model cannot import raw data
    let err = kind.instantiate().unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::BadInstance);
}

#[test]
fn model_takes_precedence_over_default_on_reset() {
    let address = address_kind();
    let kind = Kind::builder("Person")
        .slot(
            "home",
            Slot::new()
                .with_model(Model::of_kind(&address))
                .with_default("ignored"),
        )
        .build()
        .unwrap();
    let person = kind.instantiate().unwrap();
    assert!(person.get("home").unwrap().as_instance().is_some());
}

#[test]
fn reset_round_trip_satisfies_slot_constraints() {
    let kind = Kind::builder("Doc")
        .slot(
            "state",
            Slot::new()
                .nullable(false)
                .with_types([TypeTag::Str])
                .with_default("draft"),
        )
        .build()
        .unwrap();
    let mut instance = kind.instantiate().unwrap();
    instance.set("state", "published").unwrap();
    instance.reset("state").unwrap();

    // the reset value independently passes the slot's own set constraints
    let value = instance.get("state").unwrap();
    let mut other = kind.instantiate().unwrap();
    other.set("state", value.clone()).unwrap();
    assert_eq!(other.get("state").unwrap(), value);
}

#[test]
fn invalid_default_fails_at_instantiation() {
    let kind = Kind::builder("Doc")
        .slot("n", Slot::new().with_types([TypeTag::Int]).with_default("five"))
        .build()
        .unwrap();
    let err = kind.instantiate().unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::BadType);
}

#[test]
fn unknown_slot_access() {
    let kind = address_kind();
    let mut instance = kind.instantiate().unwrap();

    let err = instance.get("ghost").unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::UnknownSlot);
    let err = instance.set("ghost", 1).unwrap_err();
    assert_eq!(kind_of(&err), ErrorKind::UnknownSlot);
}

#[test]
fn slot_metadata_is_queryable() {
    let kind = Kind::builder("Doc")
        .slot(
            "title",
            Slot::new()
                .with_doc("Document title")
                .nullable(false)
                .read_only(true)
                .with_default("untitled"),
        )
        .build()
        .unwrap();
    let schema = kind.schema().unwrap();
    let slot = schema.slot("title").unwrap();
    assert_eq!(slot.name(), Some("title"));
    assert_eq!(slot.doc(), "Document title");
    assert!(!slot.is_nullable());
    assert!(slot.is_read_only());
    assert_eq!(slot.default_value(), Some(&Value::from("untitled")));
    assert!(slot.model().is_none());
}

#[test]
fn registry_round_trip() {
    let mut registry = Registry::new();
    registry.register(address_kind()).unwrap();

    let mut instance = registry.instantiate("Address").unwrap();
    instance.set("street", "main").unwrap();
    assert_eq!(instance.kind_name(), "Address");
    assert!(registry.instantiate("Person").is_err());
}

#[test]
fn instance_snapshot_and_json_export() {
    let kind = address_kind();
    let mut instance = kind.instantiate().unwrap();
    instance.set("street", "main").unwrap();

    let map = instance.to_map().unwrap();
    assert_eq!(map["street"], Value::from("main"));
    assert_eq!(map["city"], Value::from("nowhere"));

    let json = Value::Instance(instance).to_json().unwrap();
    assert_eq!(json["street"], serde_json::json!("main"));
}
