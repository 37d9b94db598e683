use gravel_config::json_schema;

#[test]
fn schema_describes_both_sections() {
    let value = serde_json::to_value(json_schema()).expect("schema serializes");

    assert!(value.pointer("/properties/logging").is_some());
    assert!(value.pointer("/properties/parser").is_some());
    assert_eq!(
        value
            .pointer("/definitions/ParserConfig/properties/prediction_window/minimum")
            .and_then(|v| v.as_f64()),
        Some(1.0)
    );
    assert_eq!(
        value
            .pointer("/definitions/LoggingConfig/additionalProperties")
            .and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn schema_log_file_is_an_optional_string() {
    let value = serde_json::to_value(json_schema()).expect("schema serializes");
    let file = value
        .pointer("/definitions/LoggingConfig/properties/file")
        .expect("file property");
    let types = file.get("type").expect("type");
    assert_eq!(types, &serde_json::json!(["string", "null"]));
}
