use crate::ast::{Expr, SortKey};

/// Field used when a subquery has no projection of its own.
pub const IDENTIFIER_FIELD: &str = "id";

/// Clause set shared by select, update and delete statements.
///
/// Rendering order is fixed: projection, entity, predicate, group by,
/// sort, offset, limit. Two clause sets with equal fields render equally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clauses {
    /// Entity type the statement targets
    pub entity_type: String,

    /// Predicate groups, joined with `and`
    pub filters: Vec<Expr>,

    /// Attributes fetched with each result
    pub projection: Vec<String>,

    /// Attributes results are grouped by
    pub group_by: Vec<String>,

    /// Ordered sort keys
    pub sort: Vec<SortKey>,

    /// Number of results skipped (`0` renders nothing)
    pub offset: u64,

    /// Maximum number of results
    pub limit: Option<u64>,
}

impl Clauses {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Clauses {
            entity_type: entity_type.into(),
            ..Clauses::default()
        }
    }

    /// The combined `where` condition.
    pub fn predicate(&self) -> Expr {
        Expr::all(self.filters.clone())
    }

    /// Renders the clauses. The projection is only emitted when asked for,
    /// since update and delete statements never carry one.
    pub fn render(&self, with_projection: bool) -> String {
        let mut query: Vec<String> = Vec::new();
        if with_projection && !self.projection.is_empty() {
            query.push("select".to_string());
            query.push(self.projection.join(", "));
            query.push("from".to_string());
        }
        query.push(self.entity_type.clone());

        let predicate = self.predicate().to_string();
        if !predicate.is_empty() {
            query.push("where".to_string());
            query.push(predicate);
        }
        if !self.group_by.is_empty() {
            query.push("group by".to_string());
            query.push(self.group_by.join(", "));
        }
        if !self.sort.is_empty() {
            query.push("order by".to_string());
            let keys: Vec<String> = self.sort.iter().map(SortKey::clause).collect();
            query.push(keys.join(", "));
        }
        if self.offset > 0 {
            query.push(format!("offset {}", self.offset));
        }
        if let Some(limit) = self.limit {
            query.push(format!("limit {}", limit));
        }

        query.retain(|part| !part.is_empty());
        query.join(" ")
    }

    /// Shape used inside `in (...)`: the projection as given, defaulting
    /// to the identifier.
    pub(crate) fn into_subquery(mut self) -> Clauses {
        if self.projection.is_empty() {
            self.projection.push(IDENTIFIER_FIELD.to_string());
        }
        self
    }
}
