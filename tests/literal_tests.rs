// Literal Tests
//
// Encoding of right-hand side values and pattern escaping.

use ftrack_query::literal::{encode, escape_wildcards, quote};
use ftrack_query::{EntityRef, Value};
use rust_decimal::Decimal;

// ============================================================================
// Section: Numbers
// ============================================================================

#[test]
fn numbers_are_unquoted() {
    assert_eq!(encode(&Value::Integer(-3)), "-3");
    assert_eq!(encode(&Value::Float(1.5)), "1.5");
    assert_eq!(encode(&Value::Float(2.0)), "2.0");
    assert_eq!(encode(&Value::Decimal(Decimal::new(1050, 2))), "10.50");
}

#[test]
fn floats_never_use_exponents() {
    assert_eq!(encode(&Value::Float(1e-7)), "0.0000001");
    assert_eq!(encode(&Value::Float(1e21)), "1000000000000000000000.0");
    assert_eq!(encode(&Value::Float(-2.5e3)), "-2500.0");
}

#[test]
fn non_finite_floats_encode_as_none() {
    assert_eq!(encode(&Value::Float(f64::NAN)), "none");
    assert_eq!(encode(&Value::Float(f64::INFINITY)), "none");
    assert_eq!(encode(&Value::Float(f64::NEG_INFINITY)), "none");
}

#[test]
fn booleans_use_server_spelling() {
    assert_eq!(encode(&Value::Boolean(true)), "True");
    assert_eq!(encode(&Value::Boolean(false)), "False");
}

// ============================================================================
// Section: Text
// ============================================================================

#[test]
fn quotes_and_backslashes_are_escaped() {
    assert_eq!(quote("plain"), "\"plain\"");
    assert_eq!(quote("say \"hi\""), r#""say \"hi\"""#);
    assert_eq!(quote(r"C:\"), r#""C:\\""#);
    assert_eq!(quote(r#"\""#), r#""\\\"""#);
}

#[test]
fn entity_encodes_its_identifier() {
    let entity = EntityRef::new("Task", "abc-123");
    assert_eq!(encode(&Value::Entity(entity)), "\"abc-123\"");
    let numeric = EntityRef::new("Job", 7);
    assert_eq!(encode(&Value::Entity(numeric)), "\"7\"");
}

#[test]
fn wildcards_are_escaped() {
    assert_eq!(escape_wildcards("%abc%"), r"\%abc\%");
    assert_eq!(escape_wildcards("plain"), "plain");
}

#[test]
fn backslashes_are_escaped_before_wildcards() {
    assert_eq!(escape_wildcards(r"C:\"), r"C:\\");
    assert_eq!(escape_wildcards(r"\%"), r"\\\%");
}
