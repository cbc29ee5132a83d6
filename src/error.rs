use thiserror::Error;

/// Error reported by a session collaborator.
///
/// The crate never inspects these, it only carries them back to the caller.
pub type SessionError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or executing statements.
///
/// Every failure is raised synchronously by the call that caused it; the
/// receiver of a builder method is consumed or borrowed, never left half
/// modified.
#[derive(Debug, Error)]
pub enum Error {
    /// Execution was requested but no session is bound or supplied.
    #[error("statement has no session bound to it")]
    UnboundSession,

    /// An entity was passed where an attribute name is needed to compare it.
    #[error("keyword required for entity {0}")]
    AmbiguousEntity(String),

    /// `populate` was called on a statement kind that cannot project.
    #[error("unable to use projections during {0}")]
    ProjectionNotAllowed(&'static str),

    /// `group_by` was called on a statement kind that cannot group.
    #[error("unable to group results during {0}")]
    GroupByNotAllowed(&'static str),

    /// `in_`/`not_in` received entities mixed with plain values.
    #[error("membership tests cannot mix entities with other values")]
    MixedMembership,

    /// `in_`/`not_in` received more than one nested select.
    #[error("only one subquery is supported per membership test")]
    MultipleSubqueries,

    /// A sort direction other than asc/ascending/desc/descending.
    #[error("unknown sorting method: {0:?}")]
    UnknownSortDirection(String),

    /// A nested select was compared directly instead of through `in_`.
    #[error("cannot compare {0} against a subquery, use in_() instead")]
    SubqueryComparison(String),

    /// `select("A.x", "B.y")` with more than one base entity type.
    #[error("selecting multiple base types is not supported ({0} and {1})")]
    MixedEntityTypes(String, String),

    /// A textual filter could not be understood.
    #[error("invalid filter: {0:?}")]
    InvalidFilter(String),

    /// Lookup by primary key on an entity type that has none.
    #[error("{0} has no primary key other than its identifier")]
    NoPrimaryKey(String),

    /// `one()` found nothing.
    #[error("no result found for query: {0}")]
    NoResultFound(String),

    /// `one()` found more than a single row.
    #[error("multiple results found for query: {0}")]
    MultipleResultsFound(String),

    /// Failure reported by the session collaborator.
    #[error("session error: {0}")]
    Session(#[source] SessionError),
}

impl Error {
    pub fn session(err: impl Into<SessionError>) -> Self {
        Error::Session(err.into())
    }
}
