//! Parse `--where` arguments into expressions

use crate::error::{Error, Result};
use crate::{attr, Expr, Value};
use regex::Regex;
use std::sync::LazyLock;

static FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<key>[\w.\[\]]+)\s*(?P<op>!=|>=|<=|=|>|<|~)\s*(?P<value>.*?)\s*$")
        .expect("valid filter regex")
});

/// Interpret a command line literal.
///
/// `none` is null, `True`/`False` are booleans, numbers are numbers and
/// double quotes force text. Anything else is text as written.
pub fn parse_value(text: &str) -> Value {
    let text = text.trim();
    match text {
        "none" => return Value::Null,
        "True" | "true" => return Value::Boolean(true),
        "False" | "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(n) = text.parse::<f64>()
        && n.is_finite()
    {
        return Value::Float(n);
    }
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(quoted) => Value::Text(quoted.to_string()),
        None => Value::Text(text.to_string()),
    }
}

/// Parse `key<op>value`, where op is one of `=`, `!=`, `>`, `>=`, `<`,
/// `<=` or `~` (like).
///
/// # Example
/// ```
/// use ftrack_query::cli::parse_filter;
///
/// let expr = parse_filter("parent.name~sh%").unwrap();
/// assert_eq!(expr.to_string(), "parent.name like \"sh%\"");
/// ```
pub fn parse_filter(filter: &str) -> Result<Expr> {
    let caps = FILTER
        .captures(filter)
        .ok_or_else(|| Error::InvalidFilter(filter.to_string()))?;
    let path = attr(&caps["key"]);
    let value = parse_value(&caps["value"]);
    Ok(match &caps["op"] {
        "=" => path.is(value),
        "!=" => path.is_not(value),
        ">" => path.gt(value),
        ">=" => path.ge(value),
        "<" => path.lt(value),
        "<=" => path.le(value),
        "~" => path.like(value),
        op => return Err(Error::InvalidFilter(op.to_string())),
    })
}
