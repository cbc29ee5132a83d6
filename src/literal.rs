//! Literal encoding for the query grammar.
//!
//! Every right-hand side of a predicate passes through [`encode()`]. The
//! output is deterministic: the same value always produces the same text.
//!
//! # Examples
//!
//! ```
//! use ftrack_query::Value;
//! use ftrack_query::literal::encode;
//!
//! assert_eq!(encode(&Value::Null), "none");
//! assert_eq!(encode(&Value::Integer(5)), "5");
//! assert_eq!(encode(&Value::from("The \"Thing\"")), r#""The \"Thing\"""#);
//! assert_eq!(encode(&Value::from(r"C:\")), r#""C:\\""#);
//! ```

use crate::value::Value;

/// Keyword the grammar uses for a missing value.
pub const NONE: &str = "none";

/// Wildcard character of `like`/`not_like` patterns.
pub const WILDCARD: char = '%';

/// Converts a value to its literal form.
///
/// - null → `none`
/// - numbers → unquoted decimal text
/// - non-finite floats → `none`
/// - text → double quoted, inner quotes and backslashes escaped
/// - entity references → their identifier, quoted like text
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => NONE.to_string(),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => float(*n),
        Value::Decimal(n) => n.to_string(),
        Value::Text(s) => quote(s),
        Value::Entity(entity) => quote(&entity.id.to_string()),
    }
}

/// Plain decimal notation, never exponents; whole numbers keep a `.0`.
fn float(n: f64) -> String {
    if !n.is_finite() {
        return NONE.to_string();
    }
    let text = n.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Wraps text in double quotes, escaping backslashes and quotes inside it.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Wraps an already escaped `like` pattern in double quotes.
///
/// Backslashes in a pattern are escapes for the pattern itself, so only
/// quotes are escaped here.
pub fn quote_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('"');
    for c in pattern.chars() {
        if c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Encodes the right-hand side of `like`/`not_like`.
///
/// Text is treated as a pattern (see [`quote_pattern`]); anything else
/// encodes as usual.
pub fn encode_pattern(value: &Value) -> String {
    match value {
        Value::Text(s) => quote_pattern(s),
        other => encode(other),
    }
}

/// Escapes backslashes and wildcards so the text matches literally inside
/// a pattern.
pub fn escape_wildcards(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == WILDCARD {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
