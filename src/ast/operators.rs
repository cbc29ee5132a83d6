/// Comparison operators between an attribute and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    // Equality
    /// Equal (`is`)
    Is,
    /// Not equal (`is_not`)
    IsNot,

    // Ordering
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,

    // Patterns
    /// Wildcard match (`like`)
    Like,
    /// Negated wildcard match (`not_like`)
    NotLike,

    // Temporal
    /// Later than a date (`after`)
    After,
    /// Earlier than a date (`before`)
    Before,
}

impl Comparison {
    pub fn keyword(self) -> &'static str {
        match self {
            Comparison::Is => "is",
            Comparison::IsNot => "is_not",
            Comparison::GreaterThan => ">",
            Comparison::GreaterEqual => ">=",
            Comparison::LessThan => "<",
            Comparison::LessEqual => "<=",
            Comparison::Like => "like",
            Comparison::NotLike => "not_like",
            Comparison::After => "after",
            Comparison::Before => "before",
        }
    }
}

/// Relationship tests over a nested condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Scalar relationship matches (`has`)
    Has,
    /// Any item of a collection matches (`any`)
    Any,
}

impl Relation {
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Has => "has",
            Relation::Any => "any",
        }
    }
}

/// Membership tests against a literal list or subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    In,
    NotIn,
}

impl Membership {
    pub fn keyword(self) -> &'static str {
        match self {
            Membership::In => "in",
            Membership::NotIn => "not_in",
        }
    }
}

/// Boolean connectives joining several expressions.
///
/// The grammar evaluates connectives left to right with no precedence, so
/// an `or` group of more than one term is always bracketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn keyword(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }

    pub fn brackets(self) -> bool {
        matches!(self, Connective::Or)
    }
}

/// Keyword that negates the expression following it.
pub const NOT: &str = "not";
