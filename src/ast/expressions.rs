use crate::ast::{Attr, Clauses, Comparison, Connective, Membership, Relation, Select, SortKey, NOT};
use crate::combinators::{and_, Criterion};
use crate::error::{Error, Result};
use crate::literal::{encode, encode_pattern, escape_wildcards, WILDCARD};
use crate::value::{EntityRef, Identifier, Value};
use rust_decimal::Decimal;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Filter expression tree.
///
/// Expressions are immutable values: every operation returns a new tree
/// and rendering (through [`Display`](fmt::Display)) has no side effects.
/// Negation is a tree rewrite, so negating twice gives back the original.
///
/// # Example
/// ```
/// use ftrack_query::attr;
///
/// let expr = attr("version").is(5);
/// assert_eq!(expr.to_string(), "version is 5");
/// assert_eq!((!expr.clone()).to_string(), "not version is 5");
/// assert_eq!(!!expr.clone(), expr);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Attribute compared against a literal
    ///
    /// # Example
    /// ```text
    /// parent.name is "abc"
    /// ```
    Compare {
        path: Attr,
        op: Comparison,
        value: Value,
    },

    /// Relationship test over a nested condition
    ///
    /// # Example
    /// ```text
    /// children any (name is "abc")
    /// ```
    Relation {
        path: Attr,
        op: Relation,
        condition: Box<Expr>,
    },

    /// Membership in a literal list or a subquery
    ///
    /// # Example
    /// ```text
    /// id in (1, 2, 3)
    /// parent.id in (select id from Shot)
    /// ```
    Membership {
        path: Attr,
        op: Membership,
        members: Members,
    },

    /// Every term must hold
    And(Vec<Expr>),

    /// At least one term must hold
    Or(Vec<Expr>),

    /// Logical negation
    Not(Box<Expr>),

    /// Query text passed through untouched
    Raw(String),
}

/// Right-hand side of a membership test.
#[derive(Debug, Clone, PartialEq)]
pub enum Members {
    Values(Vec<Value>),
    Subquery(Box<Clauses>),
}

impl fmt::Display for Members {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `in ()` is rejected by the server
            Members::Values(values) if values.is_empty() => f.write_str("\"\""),
            Members::Values(values) => {
                let items: Vec<String> = values.iter().map(encode).collect();
                f.write_str(&items.join(", "))
            }
            Members::Subquery(clauses) => write!(f, "{}", clauses.render(true)),
        }
    }
}

impl Expr {
    /// Wrap already-valid query text.
    pub fn raw(text: impl Into<String>) -> Expr {
        Expr::Raw(text.into())
    }

    /// Join with `and`, dropping empty terms. A single term is returned as is.
    pub fn all(items: Vec<Expr>) -> Expr {
        Expr::group(Connective::And, items)
    }

    /// Join with `or`, dropping empty terms. A single term is returned as is.
    pub fn any(items: Vec<Expr>) -> Expr {
        Expr::group(Connective::Or, items)
    }

    fn group(connective: Connective, items: Vec<Expr>) -> Expr {
        let mut items: Vec<Expr> = items.into_iter().filter(|e| !e.is_empty()).collect();
        if items.len() == 1 {
            return items.remove(0);
        }
        match connective {
            Connective::And => Expr::And(items),
            Connective::Or => Expr::Or(items),
        }
    }

    /// An expression that places no constraint at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(items) | Expr::Or(items) => items.iter().all(Expr::is_empty),
            Expr::Raw(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Logical inverse. `not` of a `not` removes both.
    pub fn negate(self) -> Expr {
        match self {
            Expr::Not(inner) => *inner,
            expr if expr.is_empty() => expr,
            expr => Expr::Not(Box::new(expr)),
        }
    }

    /// Push every negation down to the leaves using De Morgan's laws.
    ///
    /// The result matches the same rows; only the text changes, e.g.
    /// `not (a or b)` becomes `not a and not b`.
    pub fn negation_normal_form(self) -> Expr {
        match self {
            Expr::Not(inner) => match *inner {
                Expr::And(items) => Expr::any(
                    items
                        .into_iter()
                        .map(|e| e.negate().negation_normal_form())
                        .collect(),
                ),
                Expr::Or(items) => Expr::all(
                    items
                        .into_iter()
                        .map(|e| e.negate().negation_normal_form())
                        .collect(),
                ),
                Expr::Not(expr) => expr.negation_normal_form(),
                leaf => Expr::Not(Box::new(leaf)),
            },
            Expr::And(items) => Expr::all(items.into_iter().map(Expr::negation_normal_form).collect()),
            Expr::Or(items) => Expr::any(items.into_iter().map(Expr::negation_normal_form).collect()),
            leaf => leaf,
        }
    }

    /// Whether this term must be bracketed when joined with others by
    /// `connective`. Connectives bind left to right, so an `and` group
    /// inside an `or` is bracketed.
    fn needs_brackets_in(&self, connective: Connective) -> bool {
        match self {
            Expr::And(items) => {
                connective == Connective::Or && items.iter().filter(|e| !e.is_empty()).count() > 1
            }
            Expr::Raw(text) => has_top_level_connective(text),
            _ => false,
        }
    }

    /// Whether a leading `not` must be followed by brackets to keep the
    /// meaning of this expression.
    fn needs_brackets_when_negated(&self) -> bool {
        match self {
            Expr::And(items) | Expr::Or(items) => {
                let terms: Vec<&Expr> = items.iter().filter(|e| !e.is_empty()).collect();
                match terms.as_slice() {
                    [single] => single.needs_brackets_when_negated(),
                    // an `or` group already carries its own brackets
                    _ => matches!(self, Expr::And(_)),
                }
            }
            Expr::Raw(text) => has_top_level_connective(text),
            _ => false,
        }
    }
}

/// Scans raw query text for an `and`/`or` outside brackets and quotes.
fn has_top_level_connective(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ' ' if !quoted && depth == 0 => {
                let rest = &text[i..];
                if rest.starts_with(" and ") || rest.starts_with(" or ") {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn write_group(f: &mut fmt::Formatter<'_>, connective: Connective, items: &[Expr]) -> fmt::Result {
    let items: Vec<&Expr> = items.iter().filter(|e| !e.is_empty()).collect();
    let terms: Vec<String> = items
        .iter()
        .map(|e| {
            if items.len() > 1 && e.needs_brackets_in(connective) {
                format!("({})", e)
            } else {
                e.to_string()
            }
        })
        .collect();
    let joined = terms.join(&format!(" {} ", connective.keyword()));
    if connective.brackets() && terms.len() > 1 {
        write!(f, "({})", joined)
    } else {
        f.write_str(&joined)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { path, op, value } => {
                let literal = match op {
                    Comparison::Like | Comparison::NotLike => encode_pattern(value),
                    _ => encode(value),
                };
                write!(f, "{} {} {}", path, op.keyword(), literal)
            }
            Expr::Relation { path, op, condition } => {
                write!(f, "{} {} ({})", path, op.keyword(), condition)
            }
            Expr::Membership { path, op, members } => {
                write!(f, "{} {} ({})", path, op.keyword(), members)
            }
            Expr::And(items) => write_group(f, Connective::And, items),
            Expr::Or(items) => write_group(f, Connective::Or, items),
            Expr::Not(inner) if inner.needs_brackets_when_negated() => {
                write!(f, "{} ({})", NOT, inner)
            }
            Expr::Not(inner) => write!(f, "{} {}", NOT, inner),
            Expr::Raw(text) => f.write_str(text),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.negate()
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::all(vec![self, rhs])
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::any(vec![self, rhs])
    }
}

/// A value or nested select used as an operand.
///
/// Membership tests accept both; plain comparisons reject subqueries.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Subquery(Box<Clauses>),
}

macro_rules! operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Value(value.into())
                }
            }
        )*
    };
}

operand_from_value!(
    Value, bool, i32, i64, u32, f32, f64, Decimal, &str, String, &String, EntityRef,
    &EntityRef, Identifier,
);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        Operand::Value(value.into())
    }
}

impl From<Select<'_>> for Operand {
    fn from(select: Select<'_>) -> Self {
        Operand::Subquery(Box::new(select.into_clauses()))
    }
}

impl From<&Select<'_>> for Operand {
    fn from(select: &Select<'_>) -> Self {
        Operand::Subquery(Box::new(select.clauses().clone()))
    }
}

/// Result of calling an attribute like a function.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Filter(Expr),
    Sort(SortKey),
}

impl Attr {
    fn compare(self, op: Comparison, value: impl Into<Value>) -> Expr {
        match value.into() {
            Value::Entity(entity) => Expr::Compare {
                path: self.id_path(),
                op,
                value: entity.id.into(),
            },
            value => Expr::Compare {
                path: self,
                op,
                value,
            },
        }
    }

    pub fn is(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::Is, value)
    }

    /// Alias of [`Attr::is`].
    pub fn is_(self, value: impl Into<Value>) -> Expr {
        self.is(value)
    }

    pub fn is_not(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::IsNot, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::GreaterThan, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::GreaterEqual, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::LessThan, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::LessEqual, value)
    }

    /// Wildcard pattern match; `%` in the pattern is a wildcard.
    pub fn like(self, pattern: impl Into<Value>) -> Expr {
        self.compare(Comparison::Like, pattern)
    }

    pub fn not_like(self, pattern: impl Into<Value>) -> Expr {
        self.compare(Comparison::NotLike, pattern)
    }

    /// Text starts with `prefix`, matched literally.
    pub fn startswith(self, prefix: &str) -> Expr {
        self.like(format!("{}{}", escape_wildcards(prefix), WILDCARD))
    }

    /// Text ends with `suffix`, matched literally.
    pub fn endswith(self, suffix: &str) -> Expr {
        self.like(format!("{}{}", WILDCARD, escape_wildcards(suffix)))
    }

    /// Text contains `needle`, matched literally.
    pub fn contains(self, needle: &str) -> Expr {
        self.like(format!("{}{}{}", WILDCARD, escape_wildcards(needle), WILDCARD))
    }

    pub fn after(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::After, value)
    }

    pub fn before(self, value: impl Into<Value>) -> Expr {
        self.compare(Comparison::Before, value)
    }

    fn relation<I>(self, op: Relation, criteria: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Criterion>,
    {
        Ok(Expr::Relation {
            path: self,
            op,
            condition: Box::new(and_(criteria)?),
        })
    }

    /// A scalar relationship matching every criterion.
    pub fn has<I>(self, criteria: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Criterion>,
    {
        self.relation(Relation::Has, criteria)
    }

    /// A collection with at least one item matching every criterion.
    pub fn any<I>(self, criteria: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Criterion>,
    {
        self.relation(Relation::Any, criteria)
    }

    fn membership<I>(self, op: Membership, items: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let mut values = Vec::new();
        let mut subqueries = Vec::new();
        for item in items {
            match item.into() {
                Operand::Value(value) => values.push(value),
                Operand::Subquery(clauses) => subqueries.push(clauses),
            }
        }

        if subqueries.len() > 1 {
            return Err(Error::MultipleSubqueries);
        }
        if let Some(clauses) = subqueries.pop() {
            if !values.is_empty() {
                return Err(Error::MixedMembership);
            }
            return Ok(Expr::Membership {
                path: self,
                op,
                members: Members::Subquery(Box::new(clauses.into_subquery())),
            });
        }

        let entities = values.iter().filter(|v| v.as_entity().is_some()).count();
        if entities == 0 {
            return Ok(Expr::Membership {
                path: self,
                op,
                members: Members::Values(values),
            });
        }
        if entities != values.len() {
            return Err(Error::MixedMembership);
        }
        let ids = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Entity(entity) => Some(Value::from(entity.id)),
                _ => None,
            })
            .collect();
        Ok(Expr::Membership {
            path: self.id_path(),
            op,
            members: Members::Values(ids),
        })
    }

    /// Attribute is one of the given values, entities or subquery results.
    ///
    /// An empty list still renders valid syntax: `id in ("")`.
    pub fn in_<I>(self, items: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        self.membership(Membership::In, items)
    }

    pub fn not_in<I>(self, items: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        self.membership(Membership::NotIn, items)
    }

    /// Call-style sugar: equality, or a sort key when the path ends in a
    /// direction keyword (`name.desc`).
    pub fn invoke(self, value: impl Into<Value>) -> Invocation {
        match self.sort_key() {
            Some(key) => Invocation::Sort(key),
            None => Invocation::Filter(self.is(value)),
        }
    }
}
