//! Boolean combinators over heterogeneous filter inputs.
//!
//! [`and_`], [`or_`] and [`not_`] accept anything convertible into a
//! [`Criterion`]: built expressions, raw query text, `(key, value)` pairs,
//! maps of pairs, entity references (rejected) and `Option`s (dropped when
//! `None`). The [`and!`](crate::and), [`or!`](crate::or),
//! [`not!`](crate::not) macros add the `name = value` keyword form.
//!
//! # Examples
//!
//! ```
//! use ftrack_query::{and, attr, not, or};
//!
//! let expr = and!(attr("version").gt(3), version = 1).unwrap();
//! assert_eq!(expr.to_string(), "version > 3 and version is 1");
//!
//! let expr = or!(attr("version").gt(3), version = 1).unwrap();
//! assert_eq!(expr.to_string(), "(version > 3 or version is 1)");
//!
//! let expr = not!(attr("version").is(5), version = 6).unwrap();
//! assert_eq!(expr.to_string(), "not (version is 5 or version is 6)");
//! ```

use crate::ast::{attr, Expr, Operand};
use crate::error::{Error, Result};
use crate::value::{EntityRef, HasIdentifier};
use std::collections::BTreeMap;

/// One input to a combinator, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Already built expression
    Expr(Expr),
    /// Query text used verbatim
    Raw(String),
    /// Equality between a named attribute and an operand
    Field { key: String, operand: Operand },
    /// Several equalities, in order
    Fields(Vec<(String, Operand)>),
    /// Entity reference with no attribute name; always rejected
    Entity(EntityRef),
    /// No constraint
    Skip,
}

impl Criterion {
    /// Equality on `key`, which may be a dotted path.
    pub fn field(key: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Criterion::Field {
            key: key.into(),
            operand: operand.into(),
        }
    }

    pub fn entity(entity: &(impl HasIdentifier + ?Sized)) -> Self {
        Criterion::Entity(EntityRef::of(entity))
    }
}

impl From<Expr> for Criterion {
    fn from(expr: Expr) -> Self {
        Criterion::Expr(expr)
    }
}

impl From<&str> for Criterion {
    fn from(text: &str) -> Self {
        Criterion::Raw(text.to_string())
    }
}

impl From<String> for Criterion {
    fn from(text: String) -> Self {
        Criterion::Raw(text)
    }
}

impl From<EntityRef> for Criterion {
    fn from(entity: EntityRef) -> Self {
        Criterion::Entity(entity)
    }
}

impl From<&EntityRef> for Criterion {
    fn from(entity: &EntityRef) -> Self {
        Criterion::Entity(entity.clone())
    }
}

impl<K: Into<String>, V: Into<Operand>> From<(K, V)> for Criterion {
    fn from((key, value): (K, V)) -> Self {
        Criterion::field(key, value)
    }
}

impl<K: Into<String>, V: Into<Operand>> From<Vec<(K, V)>> for Criterion {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Criterion::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Operand>> From<BTreeMap<K, V>> for Criterion {
    fn from(map: BTreeMap<K, V>) -> Self {
        Criterion::Fields(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<T: Into<Criterion>> From<Option<T>> for Criterion {
    fn from(item: Option<T>) -> Self {
        item.map_or(Criterion::Skip, Into::into)
    }
}

fn field_expr(key: String, operand: Operand) -> Result<Expr> {
    match operand {
        Operand::Value(value) => Ok(attr(&key).is(value)),
        Operand::Subquery(_) => Err(Error::SubqueryComparison(key)),
    }
}

/// Normalize combinator inputs into expressions, in input order.
pub fn criteria<I>(items: I) -> Result<Vec<Expr>>
where
    I: IntoIterator,
    I::Item: Into<Criterion>,
{
    let mut exprs = Vec::new();
    for item in items {
        match item.into() {
            Criterion::Expr(expr) => exprs.push(expr),
            Criterion::Raw(text) => exprs.push(Expr::Raw(text)),
            Criterion::Field { key, operand } => exprs.push(field_expr(key, operand)?),
            Criterion::Fields(fields) => {
                for (key, operand) in fields {
                    exprs.push(field_expr(key, operand)?);
                }
            }
            Criterion::Entity(entity) => return Err(Error::AmbiguousEntity(entity.to_string())),
            Criterion::Skip => {}
        }
    }
    Ok(exprs)
}

/// Every criterion must hold.
pub fn and_<I>(items: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: Into<Criterion>,
{
    Ok(Expr::all(criteria(items)?))
}

/// At least one criterion must hold. Bracketed when more than one remains.
pub fn or_<I>(items: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: Into<Criterion>,
{
    Ok(Expr::any(criteria(items)?))
}

/// None of the criteria may hold: the negation of [`or_`].
pub fn not_<I>(items: I) -> Result<Expr>
where
    I: IntoIterator,
    I::Item: Into<Criterion>,
{
    Ok(!or_(items)?)
}

/// Collect combinator inputs into a `Vec<Criterion>`.
///
/// Accepts expressions and `name = value` pairs, separated by commas.
#[macro_export]
macro_rules! criteria {
    () => {
        ::std::vec::Vec::<$crate::Criterion>::new()
    };
    ($($tt:tt)+) => {{
        let mut items: ::std::vec::Vec<$crate::Criterion> = ::std::vec::Vec::new();
        $crate::__criteria!(items; $($tt)+);
        items
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __criteria {
    ($items:ident;) => {};
    ($items:ident; $key:ident = $value:expr, $($rest:tt)*) => {
        $items.push($crate::Criterion::field(stringify!($key), $value));
        $crate::__criteria!($items; $($rest)*);
    };
    ($items:ident; $key:ident = $value:expr) => {
        $items.push($crate::Criterion::field(stringify!($key), $value));
    };
    ($items:ident; $item:expr, $($rest:tt)*) => {
        $items.push($crate::Criterion::from($item));
        $crate::__criteria!($items; $($rest)*);
    };
    ($items:ident; $item:expr) => {
        $items.push($crate::Criterion::from($item));
    };
}

/// [`and_`] with keyword arguments.
#[macro_export]
macro_rules! and {
    ($($tt:tt)*) => {
        $crate::and_($crate::criteria!($($tt)*))
    };
}

/// [`or_`] with keyword arguments.
#[macro_export]
macro_rules! or {
    ($($tt:tt)*) => {
        $crate::or_($crate::criteria!($($tt)*))
    };
}

/// [`not_`] with keyword arguments.
#[macro_export]
macro_rules! not {
    ($($tt:tt)*) => {
        $crate::not_($crate::criteria!($($tt)*))
    };
}
