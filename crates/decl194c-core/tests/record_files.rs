use decl194c_core::{Capacity, DeclarationRecord};
use jsonschema::JSONSchema;
use schemars::schema_for;

#[test]
fn partial_toml_record_loads_with_empty_defaults() {
    let record: DeclarationRecord = toml::from_str(
        r#"
payer_company_name = "Acme Logistics Pvt Ltd"
declarant_capacity = "director"
"#,
    )
    .expect("parse record");

    assert_eq!(record.payer_company_name, "Acme Logistics Pvt Ltd");
    assert_eq!(record.declarant_capacity, Some(Capacity::Director));
    assert!(record.place.is_empty());
}

#[test]
fn unset_capacity_is_written_as_empty_string() {
    let encoded = toml::to_string(&DeclarationRecord::default()).expect("encode");
    assert!(encoded.contains("declarant_capacity = \"\""));

    let decoded: DeclarationRecord = toml::from_str(&encoded).expect("decode");
    assert_eq!(decoded.declarant_capacity, None);
}

#[test]
fn unknown_capacity_is_rejected_on_load() {
    let err = toml::from_str::<DeclarationRecord>("declarant_capacity = \"Manager\"")
        .expect_err("bad capacity");
    assert!(err.to_string().contains("invalid capacity"));
}

#[test]
fn record_json_matches_generated_schema() {
    let schema = serde_json::to_value(schema_for!(DeclarationRecord)).expect("schema json");
    let compiled = JSONSchema::compile(&schema).expect("compile schema");

    let record = DeclarationRecord::default().with_capacity(Some(Capacity::Partner));
    let instance = serde_json::to_value(&record).expect("record json");
    assert!(compiled.is_valid(&instance));

    let properties = schema["properties"].as_object().expect("properties");
    assert_eq!(properties.len(), 10);
    assert!(properties.contains_key("contractor_pan"));
}
