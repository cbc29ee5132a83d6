//! Boundary to the remote session that runs rendered statements.
//!
//! The crate never talks to a server itself. Statements render to text and
//! hand it to a [`Session`] implementation, which owns transport,
//! authentication, caching and paging.

use crate::ast::{
    attr, delete, insert, select, update, Delete, Insert, Select, Update, IDENTIFIER_FIELD,
};
use crate::combinators::Criterion;
use crate::error::{Error, Result, SessionError};
use crate::value::{HasIdentifier, Identifier, Value};
use std::fmt;

/// A stored entity as returned by a session.
///
/// Entities behave like shared handles: assigning a field records the
/// change in the owning session until it is committed.
pub trait Entity: HasIdentifier + fmt::Debug {
    fn set(&self, field: &str, value: Value) -> std::result::Result<(), SessionError>;

    fn get(&self, field: &str) -> Option<Value> {
        let _ = field;
        None
    }
}

/// One result row.
pub type Row = Box<dyn Entity>;

/// Remote session collaborator.
pub trait Session {
    /// Run a query, returning rows lazily.
    fn query(
        &self,
        query: &str,
        page_size: Option<u32>,
    ) -> std::result::Result<QueryResult<'_>, SessionError>;

    /// Create a new entity from field values.
    fn create(
        &self,
        entity_type: &str,
        values: &[(String, Value)],
    ) -> std::result::Result<Row, SessionError>;

    /// Fetch a single entity by identifier.
    ///
    /// The default runs `<type> where id is <id>`; sessions with a local
    /// cache should answer from it first.
    fn get(
        &self,
        entity_type: &str,
        id: &Identifier,
    ) -> std::result::Result<Option<Row>, SessionError> {
        let query = select(entity_type)
            .filter(attr(IDENTIFIER_FIELD).is(id.clone()))
            .to_string();
        Ok(self.query(&query, None)?.first()?)
    }

    /// Fetch the entity matching every field value, creating it if none
    /// does.
    fn ensure(
        &self,
        entity_type: &str,
        values: &[(String, Value)],
    ) -> std::result::Result<Row, SessionError> {
        let criteria = values
            .iter()
            .map(|(key, value)| Criterion::field(key.as_str(), value.clone()));
        let query = select(entity_type).where_(criteria)?.to_string();
        match self.query(&query, None)?.first()? {
            Some(row) => Ok(row),
            None => self.create(entity_type, values),
        }
    }

    /// Mark an entity for deletion.
    fn delete_entity(&self, entity: &dyn Entity) -> std::result::Result<(), SessionError>;

    /// Toggle automatic fetching of missing attributes, returning the
    /// previous setting.
    fn set_auto_populate(&self, enabled: bool) -> bool;

    /// Default page size for queries that do not set their own.
    fn page_size(&self) -> Option<u32> {
        None
    }

    /// Remove a component from every location holding it.
    fn remove_components(&self, component: &dyn Entity) -> std::result::Result<(), SessionError> {
        let _ = component;
        Ok(())
    }
}

/// Statement constructors bound to a session.
pub trait SessionExt: Session + Sized {
    fn select(&self, path: &str) -> Select<'_> {
        select(path).bind(self)
    }

    fn insert(&self, entity_type: &str) -> Insert<'_> {
        insert(entity_type).bind(self)
    }

    fn update(&self, entity_type: &str) -> Update<'_> {
        update(entity_type).bind(self)
    }

    fn delete(&self, entity_type: &str) -> Delete<'_> {
        delete(entity_type).bind(self)
    }
}

impl<S: Session> SessionExt for S {}

/// Disables auto-population for as long as it is alive.
pub struct AutoPopulateGuard<'a> {
    session: &'a dyn Session,
    previous: bool,
}

impl<'a> AutoPopulateGuard<'a> {
    pub fn disable(session: &'a dyn Session) -> Self {
        let previous = session.set_auto_populate(false);
        AutoPopulateGuard { session, previous }
    }
}

impl Drop for AutoPopulateGuard<'_> {
    fn drop(&mut self) {
        self.session.set_auto_populate(self.previous);
    }
}

/// Lazily fetched rows of one query.
pub struct QueryResult<'a> {
    query: String,
    rows: Box<dyn Iterator<Item = std::result::Result<Row, SessionError>> + 'a>,
}

impl<'a> QueryResult<'a> {
    pub fn new(
        query: impl Into<String>,
        rows: impl Iterator<Item = std::result::Result<Row, SessionError>> + 'a,
    ) -> Self {
        QueryResult {
            query: query.into(),
            rows: Box::new(rows),
        }
    }

    pub fn from_rows(query: impl Into<String>, rows: Vec<Row>) -> Self {
        QueryResult::new(query, rows.into_iter().map(Ok))
    }

    /// Query text these rows came from.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Exactly one row, or an error.
    pub fn one(mut self) -> Result<Row> {
        let row = match self.next() {
            Some(row) => row?,
            None => return Err(Error::NoResultFound(self.query)),
        };
        match self.next() {
            None => Ok(row),
            Some(Err(e)) => Err(e),
            Some(Ok(_)) => Err(Error::MultipleResultsFound(self.query)),
        }
    }

    /// The first row, if any.
    pub fn first(mut self) -> Result<Option<Row>> {
        self.next().transpose()
    }

    /// Every row.
    pub fn all(self) -> Result<Vec<Row>> {
        self.collect()
    }
}

impl Iterator for QueryResult<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| row.map_err(Error::Session))
    }
}

impl fmt::Debug for QueryResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
