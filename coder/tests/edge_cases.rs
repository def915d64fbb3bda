//! Edge case tests for strata-coder
//!
//! These tests cover custom date formats, raw JSON substring fields,
//! conversion modes, polymorphic nested objects, and cycle safety.

use serde_json::json;
use strata_coder::{
    ConversionMode, CustomizationRegistry, DateFormat, Error, JsonCoder, TypeCustomization,
};
use strata_store::{
    CreationRecord, FieldDescriptor, FieldKind, FieldValue, ObjectSchema, ObjectStore,
    SchemaRegistry, UpdatePolicy, Value,
};

// ============================================================================
// Custom Date Format + Raw JSON Substring
// ============================================================================

fn farm_coder() -> JsonCoder {
    let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
        "farm",
        vec![
            FieldDescriptor::primary_key("obj_id", FieldKind::String),
            FieldDescriptor::scalar("updated", FieldKind::Date),
            FieldDescriptor::scalar("name", FieldKind::String),
            FieldDescriptor::scalar("area", FieldKind::Double),
            FieldDescriptor::scalar("centroid", FieldKind::String),
        ],
    ));
    let customs = CustomizationRegistry::new().with_customization(
        "farm",
        TypeCustomization::new()
            .rename("obj_id", "uuid")
            .rename("updated", "updated_at")
            .raw_json("centroid"),
    );
    JsonCoder::new(ObjectStore::new(registry))
        .with_customizations(customs)
        .with_date_format(DateFormat::custom("%a, %d %b %Y %H:%M:%S GMT"))
}

fn farm_json() -> serde_json::Value {
    json!({
        "uuid": "ae0ab025-6471-46b1-b008-b01ba95556bf",
        "updated_at": "Fri, 18 May 2018 14:53:37 GMT",
        "name": "Stardew Valley",
        "area": 71_435.715,
        "centroid": {
            "type": "Point",
            "coordinates": [-2, 52],
            "crs": {"type": "name", "properties": {"name": "EPSG:4326"}}
        }
    })
}

#[test]
fn provider_date_format_decodes_to_epoch() {
    let mut coder = farm_coder();
    let id = coder.decode_value("farm", &farm_json()).unwrap();

    let farm = coder.store().get("farm", id).unwrap();
    let updated = farm.get("updated").unwrap().as_date().unwrap();
    // Friday, May 18, 2018 2:53:37 PM GMT
    assert_eq!(updated.timestamp(), 1_526_655_217);
}

#[test]
fn provider_date_format_reencodes_identically() {
    let mut coder = farm_coder();
    let id = coder.decode_value("farm", &farm_json()).unwrap();

    let encoded = coder.encode_value("farm", id, false).unwrap().unwrap();
    assert_eq!(encoded["updated_at"], json!("Fri, 18 May 2018 14:53:37 GMT"));
}

#[test]
fn raw_json_field_stores_canonical_text() {
    let mut coder = farm_coder();
    let id = coder.decode_value("farm", &farm_json()).unwrap();

    let farm = coder.store().get("farm", id).unwrap();
    let expected = concat!(
        r#"{"coordinates":[-2,52],"#,
        r#""crs":{"properties":{"name":"EPSG:4326"},"type":"name"},"#,
        r#""type":"Point"}"#,
    );
    assert_eq!(farm.get("centroid").unwrap().as_str(), Some(expected));
    assert_eq!(farm.get("area"), Some(&Value::Double(71_435.715)));
    assert_eq!(
        farm.get("name"),
        Some(&Value::String("Stardew Valley".into()))
    );
}

#[test]
fn raw_json_field_reencodes_structurally_equal() {
    let mut coder = farm_coder();
    let id = coder.decode_value("farm", &farm_json()).unwrap();

    let encoded = coder.encode_value("farm", id, false).unwrap().unwrap();
    assert_eq!(encoded["centroid"], farm_json()["centroid"]);
    assert_eq!(encoded, farm_json());
}

#[test]
fn unparseable_raw_json_is_omitted_on_encode() {
    let mut coder = farm_coder();

    // Bypass the decoder to plant a stored string that is not JSON
    let mut record = CreationRecord::new("farm");
    record.insert("obj_id", FieldValue::Scalar(Value::String("f1".into())));
    record.insert(
        "centroid",
        FieldValue::Scalar(Value::String("not json at all".into())),
    );
    let store = coder.store_mut();
    store.begin_write().unwrap();
    let id = store
        .upsert("farm", record, UpdatePolicy::MergeByKey)
        .unwrap();
    store.commit_write().unwrap();

    let encoded = coder.encode_value("farm", id, false).unwrap().unwrap();
    assert_eq!(encoded.get("centroid"), None);
    assert_eq!(encoded["uuid"], json!("f1"));
}

// ============================================================================
// Conversion Modes
// ============================================================================

fn ranked_coder(mode: ConversionMode) -> JsonCoder {
    let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
        "player",
        vec![
            FieldDescriptor::primary_key("obj_id", FieldKind::String),
            FieldDescriptor::scalar("rank", FieldKind::Int),
        ],
    ));
    JsonCoder::new(ObjectStore::new(registry)).with_mode(mode)
}

#[test]
fn tolerant_mode_skips_mismatched_fields() {
    let mut coder = ranked_coder(ConversionMode::Tolerant);
    let id = coder
        .decode_value("player", &json!({"obj_id": "p1", "rank": "four"}))
        .unwrap();

    let player = coder.store().get("player", id).unwrap();
    assert_eq!(player.get("obj_id"), Some(&Value::String("p1".into())));
    assert_eq!(player.get("rank"), None);
}

#[test]
fn strict_mode_fails_on_mismatch() {
    let mut coder = ranked_coder(ConversionMode::Strict);
    let result = coder.decode_value("player", &json!({"obj_id": "p1", "rank": "four"}));

    assert_eq!(
        result,
        Err(Error::TypeMismatch {
            field: "rank".into(),
            expected: "Int".into(),
            got: "String".into(),
        })
    );
    // Nothing was written
    assert_eq!(coder.store().len("player"), 0);
}

#[test]
fn tolerant_mode_skips_float_tokens_for_int_fields() {
    let mut coder = ranked_coder(ConversionMode::Tolerant);
    let id = coder
        .decode_value("player", &json!({"obj_id": "p1", "rank": 4.5}))
        .unwrap();
    assert_eq!(coder.store().get("player", id).unwrap().get("rank"), None);
}

// ============================================================================
// Opaque Any Fields
// ============================================================================

fn event_coder() -> JsonCoder {
    let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
        "event",
        vec![
            FieldDescriptor::scalar("label", FieldKind::String),
            FieldDescriptor::scalar("data", FieldKind::Any),
        ],
    ));
    JsonCoder::new(ObjectStore::new(registry))
}

#[test]
fn any_field_roundtrips_scalars() {
    for data in [json!(true), json!(42), json!(2.5), json!("text")] {
        let mut coder = event_coder();
        let payload = json!({"label": "e", "data": data});
        let id = coder.decode_value("event", &payload).unwrap();
        let encoded = coder.encode_value("event", id, false).unwrap().unwrap();
        assert_eq!(encoded, payload);
    }
}

#[test]
fn any_field_rejects_containers() {
    let mut coder = event_coder();
    let id = coder
        .decode_value("event", &json!({"label": "e", "data": {"nested": 1}}))
        .unwrap();
    // Tolerant skip: the event decodes from its label alone
    assert_eq!(coder.store().get("event", id).unwrap().get("data"), None);
}

// ============================================================================
// Polymorphic Nested Objects
// ============================================================================

fn garage_coder() -> JsonCoder {
    let mut registry = SchemaRegistry::new()
        .with_schema(ObjectSchema::new(
            "garage",
            vec![
                FieldDescriptor::primary_key("obj_id", FieldKind::String),
                FieldDescriptor::object_list("vehicles", "vehicle"),
            ],
        ))
        .with_schema(ObjectSchema::new(
            "vehicle",
            vec![FieldDescriptor::scalar("make", FieldKind::String)],
        ))
        .with_schema(ObjectSchema::new(
            "car",
            vec![
                FieldDescriptor::scalar("make", FieldKind::String),
                FieldDescriptor::scalar("door_count", FieldKind::Int),
            ],
        ));
    registry.set_discriminator("vehicle", "kind");
    registry.register_subtype("vehicle", "car", "car");

    JsonCoder::new(ObjectStore::new(registry))
}

#[test]
fn discriminator_resolves_concrete_subtype() {
    let mut coder = garage_coder();
    let payload = json!({
        "obj_id": "g1",
        "vehicles": [
            {"kind": "car", "make": "honda", "door_count": 2},
            {"make": "generic"}
        ]
    });
    let id = coder.decode_value("garage", &payload).unwrap();

    // First element decoded with the car schema, second fell back
    assert_eq!(coder.store().len("car"), 1);
    assert_eq!(coder.store().len("vehicle"), 1);

    let garage = coder.store().get("garage", id).unwrap();
    let links = garage.get("vehicles").unwrap().as_link_list().unwrap();
    assert_eq!(links.len(), 2);

    let car = coder.store().objects("car").next().unwrap();
    assert_eq!(car.get("door_count"), Some(&Value::Int(2)));
}

#[test]
fn unknown_discriminator_falls_back_to_declared() {
    let mut coder = garage_coder();
    let payload = json!({
        "obj_id": "g1",
        "vehicles": [{"kind": "boat", "make": "chris-craft"}]
    });
    coder.decode_value("garage", &payload).unwrap();

    assert_eq!(coder.store().len("vehicle"), 1);
    assert_eq!(coder.store().len("car"), 0);
}

#[test]
fn subtype_links_encode_with_their_own_schema() {
    let mut coder = garage_coder();
    let payload = json!({
        "obj_id": "g1",
        "vehicles": [{"kind": "car", "make": "honda", "door_count": 2}]
    });
    let id = coder.decode_value("garage", &payload).unwrap();

    let encoded = coder.encode_value("garage", id, false).unwrap().unwrap();
    // The element was stored as a car, so it encodes car fields
    assert_eq!(
        encoded["vehicles"],
        json!([{"make": "honda", "door_count": 2}])
    );
}

// ============================================================================
// Nested Single Objects and Cycles
// ============================================================================

fn node_coder() -> JsonCoder {
    let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
        "node",
        vec![
            FieldDescriptor::primary_key("obj_id", FieldKind::String),
            FieldDescriptor::object("next", "node"),
        ],
    ));
    JsonCoder::new(ObjectStore::new(registry))
}

#[test]
fn nested_single_object_decodes_and_encodes() {
    let mut coder = node_coder();
    let id = coder
        .decode_value("node", &json!({"obj_id": "a", "next": {"obj_id": "b"}}))
        .unwrap();

    assert_eq!(coder.store().len("node"), 2);

    let encoded = coder.encode_value("node", id, false).unwrap().unwrap();
    assert_eq!(encoded, json!({"obj_id": "a", "next": {"obj_id": "b"}}));
}

#[test]
fn absent_reference_omits_the_key() {
    let mut coder = node_coder();
    let id = coder.decode_value("node", &json!({"obj_id": "a"})).unwrap();

    let encoded = coder.encode_value("node", id, false).unwrap().unwrap();
    assert_eq!(encoded, json!({"obj_id": "a"}));
}

#[test]
fn cyclic_graph_fails_fast_on_encode() {
    let mut coder = node_coder();
    // a -> b, then b -> a via merge: the stored graph is now cyclic
    let a = coder
        .decode_value("node", &json!({"obj_id": "a", "next": {"obj_id": "b"}}))
        .unwrap();
    coder
        .decode_value("node", &json!({"obj_id": "b", "next": {"obj_id": "a"}}))
        .unwrap();
    assert_eq!(coder.store().len("node"), 2);

    let result = coder.encode_value("node", a, false);
    assert!(matches!(result, Err(Error::CyclicReference(t)) if t == "node"));
}

#[test]
fn shared_references_are_not_cycles() {
    let registry = SchemaRegistry::new()
        .with_schema(ObjectSchema::new(
            "pair",
            vec![
                FieldDescriptor::primary_key("obj_id", FieldKind::String),
                FieldDescriptor::object("left", "node"),
                FieldDescriptor::object("right", "node"),
            ],
        ))
        .with_schema(ObjectSchema::new(
            "node",
            vec![FieldDescriptor::primary_key("obj_id", FieldKind::String)],
        ));
    let mut coder = JsonCoder::new(ObjectStore::new(registry));

    // Both sides carry the same key, so they merge into one shared object
    let id = coder
        .decode_value(
            "pair",
            &json!({"obj_id": "p", "left": {"obj_id": "n"}, "right": {"obj_id": "n"}}),
        )
        .unwrap();
    assert_eq!(coder.store().len("node"), 1);

    let encoded = coder.encode_value("pair", id, false).unwrap().unwrap();
    assert_eq!(
        encoded,
        json!({"obj_id": "p", "left": {"obj_id": "n"}, "right": {"obj_id": "n"}})
    );
}

#[test]
fn nested_validation_failure_aborts_whole_decode() {
    let mut coder = node_coder();
    // The nested node is missing its primary key
    let result = coder.decode_value("node", &json!({"obj_id": "a", "next": {}}));
    assert!(matches!(result, Err(Error::PrimaryKeyMissing { .. })));
    assert_eq!(coder.store().len("node"), 0);
}

// ============================================================================
// Ignored Fields (encode-only)
// ============================================================================

#[test]
fn ignored_fields_decode_but_never_encode() {
    let registry = SchemaRegistry::new().with_schema(ObjectSchema::new(
        "account",
        vec![
            FieldDescriptor::primary_key("obj_id", FieldKind::String),
            FieldDescriptor::scalar("email", FieldKind::String),
            FieldDescriptor::scalar("secret_token", FieldKind::String),
        ],
    ));
    let customs = CustomizationRegistry::new().with_customization(
        "account",
        TypeCustomization::new().ignore("secret_token"),
    );
    let mut coder = JsonCoder::new(ObjectStore::new(registry)).with_customizations(customs);

    let id = coder
        .decode_value(
            "account",
            &json!({"obj_id": "a1", "email": "x@example.com", "secret_token": "s3cr3t"}),
        )
        .unwrap();

    // The ignored field was still ingested
    let account = coder.store().get("account", id).unwrap();
    assert_eq!(
        account.get("secret_token"),
        Some(&Value::String("s3cr3t".into()))
    );

    // But it never appears in encoded output
    let encoded = coder.encode_value("account", id, false).unwrap().unwrap();
    assert_eq!(
        encoded,
        json!({"obj_id": "a1", "email": "x@example.com"})
    );
}

// ============================================================================
// Mismatched Nested Shapes
// ============================================================================

#[test]
fn non_array_for_list_field_is_skipped() {
    let mut coder = garage_coder();
    let id = coder
        .decode_value(
            "garage",
            &json!({"obj_id": "g1", "vehicles": {"make": "honda"}}),
        )
        .unwrap();

    let garage = coder.store().get("garage", id).unwrap();
    assert_eq!(garage.get("vehicles"), None);
    assert_eq!(coder.store().len("vehicle"), 0);
}

#[test]
fn non_object_element_skips_the_whole_list_field() {
    let mut coder = garage_coder();
    let id = coder
        .decode_value(
            "garage",
            &json!({"obj_id": "g1", "vehicles": [{"make": "honda"}, "junk"]}),
        )
        .unwrap();

    let garage = coder.store().get("garage", id).unwrap();
    assert_eq!(garage.get("vehicles"), None);
    assert_eq!(coder.store().len("vehicle"), 0);
}
