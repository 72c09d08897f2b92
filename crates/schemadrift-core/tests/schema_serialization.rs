use schemadrift_core::schema::{SchemaEntity, Table};
use schemadrift_core::{InterimSchema, SCHEMA_VERSION};

#[test]
fn empty_schema_serializes_deterministically() {
    let schema = InterimSchema::empty();
    let json = serde_json::to_string(&schema).expect("serialize schema");
    assert_eq!(
        json,
        r#"{"schemas":[],"tables":[],"columns":[],"indexes":[],"primary_keys":[],"foreign_keys":[],"unique_constraints":[],"check_constraints":[],"sequences":[],"roles":[],"privileges":[],"policies":[],"views":[],"view_columns":[],"enums":[]}"#
    );
}

#[test]
fn snapshot_round_trips_through_serde() {
    let mut schema = InterimSchema::empty();
    schema.schemas.push(SchemaEntity {
        name: "app".to_string(),
    });
    schema.tables.push(Table {
        schema: "app".to_string(),
        name: "users".to_string(),
        is_rls_enabled: false,
    });

    let json = serde_json::to_string(&schema).expect("serialize schema");
    let back: InterimSchema = serde_json::from_str(&json).expect("deserialize schema");
    assert_eq!(serde_json::to_string(&back).expect("re-serialize"), json);
}

#[test]
fn snapshot_contract_version_is_stable() {
    assert_eq!(SCHEMA_VERSION, "0.1");
}

#[test]
fn json_schema_covers_every_entity_sequence() {
    let generated = schemars::schema_for!(InterimSchema);
    let value = serde_json::to_value(&generated).expect("serialize json schema");
    let properties = value
        .get("properties")
        .and_then(|props| props.as_object())
        .expect("object schema");
    for key in [
        "schemas",
        "tables",
        "columns",
        "indexes",
        "primary_keys",
        "foreign_keys",
        "unique_constraints",
        "check_constraints",
        "sequences",
        "roles",
        "privileges",
        "policies",
        "views",
        "view_columns",
        "enums",
    ] {
        assert!(properties.contains_key(key), "missing property {key}");
    }
}
