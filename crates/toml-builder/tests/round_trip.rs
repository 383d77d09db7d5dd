//! Builder round-trip scenarios: build TOML text, then feed it back through
//! `toml-parser` to check the two crates agree.

use indoc::indoc;
use pretty_assertions::assert_eq;
use toml_builder::{Builder, ErrorKind, Value};

#[test]
fn redefining_a_table_is_a_duplicate_table_key_error() {
    let mut builder = Builder::new(0);
    builder.add_table("a").unwrap();
    builder.add_value("x", Value::Integer(1), "").unwrap();
    let err = builder.add_table("a").unwrap_err();
    assert_eq!(err, ErrorKind::DuplicateTableKey("a".to_string()));
}

#[test]
fn an_array_of_tables_implicit_parent_cannot_be_redeclared_as_an_array() {
    let mut builder = Builder::new(0);
    builder.add_array_of_table("albums.songs").unwrap();
    builder.add_value("name", Value::String("Glory Days".into()), "").unwrap();
    let err = builder.add_array_of_table("albums").unwrap_err();
    match err {
        ErrorKind::KeyDefinedAsImplicitTable(path) => assert_eq!(path, "albums"),
        other => panic!("expected KeyDefinedAsImplicitTable, got {other:?}"),
    }
}

#[test]
fn an_at_prefixed_string_round_trips_through_a_literal_string() {
    let mut builder = Builder::new(0);
    builder.add_value("regex", Value::String(r"@<\i\c*\s*>".into()), "").unwrap();
    let text = builder.build();
    assert_eq!(text, "regex = '<\\i\\c*\\s*>'\n");

    let parsed = toml_parser::parse(text.as_bytes(), false).unwrap().unwrap();
    let table = parsed.as_table().unwrap();
    assert_eq!(table["regex"], Value::String(r"<\i\c*\s*>".into()));
}

#[test]
fn a_document_built_from_nested_tables_and_arrays_parses_back_to_the_same_tree() {
    let mut builder = Builder::new(0);
    builder.add_value("title", Value::String("TOML Example".into()), "").unwrap();
    builder.add_table("owner").unwrap();
    builder.add_value("name", Value::String("Tom".into()), "").unwrap();
    builder.add_array_of_table("products").unwrap();
    builder.add_value("name", Value::String("Hammer".into()), "").unwrap();
    builder.add_value("sku", Value::Integer(1), "").unwrap();
    builder.add_array_of_table("products").unwrap();
    builder.add_value("name", Value::String("Nail".into()), "").unwrap();
    builder.add_value("sku", Value::Integer(2), "").unwrap();
    let text = builder.build();
    assert_eq!(
        text,
        indoc! {r#"
            title = "TOML Example"

            [owner]
            name = "Tom"

            [[products]]
            name = "Hammer"
            sku = 1

            [[products]]
            name = "Nail"
            sku = 2
        "#}
    );

    let parsed = toml_parser::parse(text.as_bytes(), false).unwrap().unwrap();
    let root = parsed.as_table().unwrap();
    assert_eq!(root["title"], Value::String("TOML Example".into()));
    assert_eq!(root["owner"].as_table().unwrap()["name"], Value::String("Tom".into()));
    let products = match &root["products"] {
        Value::Array(a) => a,
        other => panic!("expected array, got {other:?}"),
    };
    assert_eq!(products[0].as_table().unwrap()["sku"], Value::Integer(1));
    assert_eq!(products[1].as_table().unwrap()["sku"], Value::Integer(2));
}

#[test]
fn an_array_value_with_mixed_element_types_is_rejected_before_anything_is_written() {
    let mut builder = Builder::new(0);
    let err = builder
        .add_value(
            "mixed",
            Value::Array(vec![Value::Integer(1), Value::Boolean(true)]),
            "",
        )
        .unwrap_err();
    assert!(matches!(err, ErrorKind::MixedArrayTypes { .. }));
    assert_eq!(builder.build(), "");
}

#[test]
fn a_table_segment_needing_quotes_is_rejected_with_unquoted_key_required() {
    let mut builder = Builder::new(0);
    let err = builder.add_table("server.long name").unwrap_err();
    match err {
        ErrorKind::UnquotedKeyRequired(segment, path) => {
            assert_eq!(segment, "long name");
            assert_eq!(path, "server.long name");
        }
        other => panic!("expected UnquotedKeyRequired, got {other:?}"),
    }
}
