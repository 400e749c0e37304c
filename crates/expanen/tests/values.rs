//! Tests for `FieldValue`: Python-style rendering, conversions and serialization.

use expanen::{ConversionError, FieldValue};
use pretty_assertions::assert_eq;

// =============================================================================
// 1. Rendering
// =============================================================================

/// `Display` writes strings raw and everything else in repr form.
#[test]
fn display_matches_python_str() {
    assert_eq!(FieldValue::None.to_string(), "None");
    assert_eq!(FieldValue::Bool(false).to_string(), "False");
    assert_eq!(FieldValue::Int(-7).to_string(), "-7");
    assert_eq!(FieldValue::Float(3.0).to_string(), "3.0");
    assert_eq!(FieldValue::Float(1e-7).to_string(), "1e-07");
    assert_eq!(FieldValue::from("plain").to_string(), "plain");
    assert_eq!(FieldValue::Bytes(b"a'b\x00".to_vec()).to_string(), "b\"a'b\\x00\"");
    assert_eq!(
        FieldValue::List(vec![FieldValue::from("x"), FieldValue::Float(0.5)]).to_string(),
        "['x', 0.5]"
    );
    assert_eq!(FieldValue::Tuple(vec![FieldValue::Int(1)]).to_string(), "(1,)");
    assert_eq!(FieldValue::Tuple(vec![]).to_string(), "()");
}

/// `py_repr` quotes strings.
#[test]
fn repr_quotes_strings() {
    assert_eq!(FieldValue::from("472: dropped").py_repr(), "'472: dropped'");
    assert_eq!(FieldValue::Int(472).py_repr(), "472");
}

// =============================================================================
// 2. Conversions
// =============================================================================

/// Rust values convert into the matching variant.
#[test]
fn from_rust_values() {
    assert!(matches!(FieldValue::from(true), FieldValue::Bool(true)));
    assert!(matches!(FieldValue::from(5_i32), FieldValue::Int(5)));
    assert!(matches!(FieldValue::from(5_u32), FieldValue::Int(5)));
    assert!(matches!(FieldValue::from(()), FieldValue::None));
    assert!(matches!(FieldValue::from(None::<i64>), FieldValue::None));
    assert!(matches!(FieldValue::from(Some("s")), FieldValue::String(s) if s == "s"));
    assert!(matches!(FieldValue::from(vec![1_u8, 2]), FieldValue::Bytes(b) if b == [1, 2]));
}

/// Values convert back out when the variant matches.
#[test]
fn try_from_field_values() {
    assert_eq!(i64::try_from(&FieldValue::Int(12)), Ok(12));
    assert_eq!(f64::try_from(&FieldValue::Int(2)), Ok(2.0));
    assert_eq!(String::try_from(&FieldValue::from("x")), Ok("x".to_owned()));
    assert_eq!(bool::try_from(&FieldValue::Bool(true)), Ok(true));

    let err = i64::try_from(&FieldValue::from("12")).unwrap_err();
    assert_eq!(err, ConversionError::new("int", "str"));
    assert_eq!(err.to_string(), "expected int, got str");

    assert_eq!(
        bool::try_from(&FieldValue::Int(1)),
        Err(ConversionError::new("bool", "int"))
    );
}

/// Python type names are reported for every variant.
#[test]
fn type_names() {
    assert_eq!(FieldValue::None.type_name(), "NoneType");
    assert_eq!(FieldValue::Bytes(vec![]).type_name(), "bytes");
    assert_eq!(FieldValue::List(vec![]).type_name(), "list");
}

// =============================================================================
// 3. Serialization
// =============================================================================

/// Values serialize externally tagged and accept Python-style variant names.
#[test]
fn json_serialization() {
    let value = FieldValue::List(vec![FieldValue::Int(1), FieldValue::from("two"), FieldValue::None]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"List":[{"Int":1},{"String":"two"},"None"]}"#);

    let aliased: FieldValue = serde_json::from_str(r#"{"tuple":[{"int":1},{"str":"a"},{"bool":true}]}"#).unwrap();
    assert_eq!(
        aliased,
        FieldValue::Tuple(vec![FieldValue::Int(1), FieldValue::from("a"), FieldValue::Bool(true)])
    );

    let none: FieldValue = serde_json::from_str(r#""NoneType""#).unwrap();
    assert_eq!(none, FieldValue::None);
}

/// Values survive a compact binary encoding, including nested containers.
#[test]
fn postcard_serialization() {
    let value = FieldValue::Tuple(vec![
        FieldValue::from("472: Connection has been dropped"),
        FieldValue::Float(1.5),
        FieldValue::Bytes(vec![0, 255]),
    ]);
    let bytes = postcard::to_allocvec(&value).unwrap();
    let back: FieldValue = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(back, value);
}
