use crate::ast::{attr, Clauses, Expr, SortKey};
use crate::combinators::{and_, Criterion};
use crate::error::{Error, Result};
use crate::literal::encode;
use crate::session::{AutoPopulateGuard, QueryResult, Row, Session};
use crate::value::{Identifier, Value};
use std::fmt;
use std::ops::BitOr;
use tracing::debug;

/// Relation populated before components are removed from their locations.
pub const COMPONENT_LOCATIONS: &str = "component_locations.location";

/// Entity types with a unique field besides `id`, and that field.
pub const PRIMARY_KEYS: &[(&str, &str)] = &[
    ("Disk", "name"),
    ("Location", "name"),
    ("NoteLabel", "name"),
    ("Priority", "name"),
    ("Project", "name"),
    ("ProjectSchema", "name"),
    ("SecurityRole", "name"),
    ("Setting", "name"),
    ("State", "name"),
    ("Status", "name"),
    ("Type", "name"),
    ("User", "username"),
];

/// Unique field of an entity type, if it has one.
pub fn primary_key(entity_type: &str) -> Option<&'static str> {
    PRIMARY_KEYS
        .iter()
        .find(|(name, _)| *name == entity_type)
        .map(|(_, key)| *key)
}

/// Execution options that do not change the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Rows fetched per server round trip
    pub page_size: Option<u32>,

    /// Delete only: remove components from their locations first
    pub remove_components: Option<bool>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn remove_components(mut self, remove: bool) -> Self {
        self.remove_components = Some(remove);
        self
    }
}

/// Ordered field assignments of insert and update statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValues(Vec<(String, Value)>);

impl FieldValues {
    /// Sets each field, replacing earlier values of the same field in place.
    fn extend<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in values {
            let key = key.into();
            let value = value.into();
            match self.0.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => self.0.push((key, value)),
            }
        }
    }

    pub fn as_slice(&self) -> &[(String, Value)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode(value)))
            .collect();
        f.write_str(&fields.join(", "))
    }
}

fn session_debug(session: Option<&dyn Session>) -> &'static str {
    if session.is_some() { "bound" } else { "unbound" }
}

/// Builder methods shared by every statement that filters existing rows.
macro_rules! filter_builders {
    ($stmt:ident) => {
        impl<'s> $stmt<'s> {
            pub fn clauses(&self) -> &Clauses {
                &self.clauses
            }

            pub fn into_clauses(self) -> Clauses {
                self.clauses
            }

            pub fn entity_type(&self) -> &str {
                &self.clauses.entity_type
            }

            /// Add a predicate group; every criterion must hold.
            pub fn where_<I>(mut self, criteria: I) -> Result<Self>
            where
                I: IntoIterator,
                I::Item: Into<Criterion>,
            {
                let group = and_(criteria)?;
                if !group.is_empty() {
                    self.clauses.filters.push(group);
                }
                Ok(self)
            }

            /// Add an already built expression as a predicate group.
            pub fn filter(mut self, expr: Expr) -> Self {
                if !expr.is_empty() {
                    self.clauses.filters.push(expr);
                }
                self
            }

            /// Append a sort key given as `path` or `path <direction>`.
            pub fn sort(self, key: &str) -> Result<Self> {
                Ok(self.sort_by(key.parse::<SortKey>()?))
            }

            /// Alias of `sort`.
            pub fn order_by(self, key: &str) -> Result<Self> {
                self.sort(key)
            }

            pub fn sort_by(mut self, key: SortKey) -> Self {
                self.clauses.sort.push(key);
                self
            }

            /// Drop every sort key.
            pub fn clear_sort(mut self) -> Self {
                self.clauses.sort.clear();
                self
            }

            /// Flip the direction of the sort keys added so far.
            pub fn reverse(mut self) -> Self {
                self.clauses.sort = self
                    .clauses
                    .sort
                    .into_iter()
                    .map(SortKey::reversed)
                    .collect();
                self
            }

            pub fn offset(mut self, offset: u64) -> Self {
                self.clauses.offset = offset;
                self
            }

            pub fn limit(mut self, limit: u64) -> Self {
                self.clauses.limit = Some(limit);
                self
            }

            pub fn clear_limit(mut self) -> Self {
                self.clauses.limit = None;
                self
            }

            pub fn page_size(mut self, page_size: u32) -> Self {
                self.page_size = Some(page_size);
                self
            }

            pub fn session(&self) -> Option<&'s dyn Session> {
                self.session
            }

            /// Attach a session used by `execute`.
            pub fn bind<'a>(self, session: &'a dyn Session) -> $stmt<'a>
            where
                's: 'a,
            {
                let mut stmt: $stmt<'a> = self;
                stmt.session = Some(session);
                stmt
            }

            pub fn unbind(mut self) -> Self {
                self.session = None;
                self
            }

            fn bound_session(&self) -> Result<&'s dyn Session> {
                self.session.ok_or(Error::UnboundSession)
            }

            fn effective_page_size(&self, session: &dyn Session) -> Option<u32> {
                self.page_size.or_else(|| session.page_size())
            }
        }

        impl PartialEq for $stmt<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.to_string() == other.to_string() && self.page_size == other.page_size
            }
        }
    };
}

/// Query for entities.
///
/// # Example
/// ```
/// use ftrack_query::select;
///
/// let stmt = select("Task")
///     .where_([("name", "Test")])
///     .unwrap()
///     .populate(["type_id"])
///     .limit(2);
/// assert_eq!(stmt.to_string(), "select type_id from Task where name is \"Test\" limit 2");
/// ```
#[derive(Clone)]
pub struct Select<'s> {
    clauses: Clauses,
    page_size: Option<u32>,
    session: Option<&'s dyn Session>,
}

filter_builders!(Select);

/// Start a select. `Entity.field` also projects `field`.
pub fn select(path: &str) -> Select<'static> {
    let (entity_type, projection) = match path.split_once('.') {
        Some((entity_type, field)) => (entity_type, Some(field)),
        None => (path, None),
    };
    let stmt = Select::new(entity_type);
    match projection {
        Some(field) => stmt.populate([field]),
        None => stmt,
    }
}

impl<'s> Select<'s> {
    pub fn new(entity_type: impl Into<String>) -> Select<'s> {
        Select {
            clauses: Clauses::new(entity_type),
            page_size: None,
            session: None,
        }
    }

    /// Select from several `Entity.field` paths sharing one entity type.
    pub fn from_paths<I, P>(paths: I) -> Result<Select<'s>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut entity_type: Option<String> = None;
        let mut projection = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let (base, field) = match path.split_once('.') {
                Some((base, field)) => (base, Some(field)),
                None => (path, None),
            };
            match &entity_type {
                None => entity_type = Some(base.to_string()),
                Some(existing) if existing != base => {
                    return Err(Error::MixedEntityTypes(existing.clone(), base.to_string()));
                }
                Some(_) => {}
            }
            projection.extend(field.map(str::to_string));
        }
        Ok(Select::new(entity_type.unwrap_or_default()).populate(projection))
    }

    /// Fetch these attributes with every result. Empty names are ignored.
    pub fn populate<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses.projection.extend(
            attributes
                .into_iter()
                .map(Into::<String>::into)
                .filter(|a| !a.is_empty()),
        );
        self
    }

    pub fn group_by<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses.group_by.extend(
            attributes
                .into_iter()
                .map(Into::<String>::into)
                .filter(|a| !a.is_empty()),
        );
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        if let Some(page_size) = options.page_size {
            self.page_size = Some(page_size);
        }
        self
    }

    /// The form embedded by `in_`: the projection as given, `id` by default.
    pub fn subquery(mut self) -> Self {
        self.clauses = self.clauses.into_subquery();
        self
    }

    /// Run through the bound session.
    pub fn execute(&self) -> Result<QueryResult<'s>> {
        self.execute_in(self.bound_session()?)
    }

    pub fn execute_in<'a>(&self, session: &'a dyn Session) -> Result<QueryResult<'a>> {
        let query = self.to_string();
        let page_size = self.effective_page_size(session);
        debug!(%query, ?page_size, "query");
        session.query(&query, page_size).map_err(Error::Session)
    }

    /// Exactly one result.
    pub fn one(&self) -> Result<Row> {
        self.execute()?.one()
    }

    /// The first result, if any.
    pub fn first(&self) -> Result<Option<Row>> {
        self.execute()?.first()
    }

    pub fn all(&self) -> Result<Vec<Row>> {
        self.execute()?.all()
    }

    /// Number of results. Runs the query and fetches every row.
    pub fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    /// Fetch one entity of this type by identifier. Filters, sorting and
    /// paging of the statement are not applied.
    pub fn get(&self, id: impl Into<Identifier>) -> Result<Option<Row>> {
        let id = id.into();
        let entity_type = self.entity_type();
        debug!(entity_type, %id, "get");
        self.bound_session()?
            .get(entity_type, &id)
            .map_err(Error::Session)
    }

    /// Fetch the entity of this type matching every value, creating it if
    /// none does.
    pub fn ensure<I, K, V>(&self, values: I) -> Result<Row>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut fields = FieldValues::default();
        fields.extend(values);
        let entity_type = self.entity_type();
        debug!(entity_type, values = %fields, "ensure");
        self.bound_session()?
            .ensure(entity_type, fields.as_slice())
            .map_err(Error::Session)
    }

    /// Look up one entity by its unique field (`name` for most types,
    /// `username` for users), on top of any filters already set.
    ///
    /// Returns `None` when nothing matches and fails with
    /// [`Error::NoPrimaryKey`] for types without such a field.
    pub fn by_primary_key(&self, value: impl Into<Value>) -> Result<Option<Row>> {
        let entity_type = self.entity_type();
        let key = primary_key(entity_type)
            .ok_or_else(|| Error::NoPrimaryKey(entity_type.to_string()))?;
        debug!(entity_type, key, "primary key lookup");
        match self.clone().filter(attr(key).is(value)).one() {
            Ok(row) => Ok(Some(row)),
            Err(Error::NoResultFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for Select<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clauses.render(true))
    }
}

impl fmt::Debug for Select<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("clauses", &self.clauses)
            .field("page_size", &self.page_size)
            .field("session", &session_debug(self.session))
            .finish()
    }
}

/// Either select matches: `or(and(lhs), and(rhs))`.
impl<'s> BitOr for Select<'s> {
    type Output = Select<'s>;

    fn bitor(mut self, rhs: Select<'s>) -> Select<'s> {
        let lhs = Expr::all(std::mem::take(&mut self.clauses.filters));
        let rhs = Expr::all(rhs.clauses.filters);
        // an unfiltered side already matches everything
        if !lhs.is_empty() && !rhs.is_empty() {
            self.clauses.filters.push(Expr::any(vec![lhs, rhs]));
        }
        self
    }
}

/// Create one entity.
///
/// # Example
/// ```
/// use ftrack_query::insert;
///
/// let stmt = insert("Task").values([("name", "New Task")]);
/// assert_eq!(stmt.to_string(), "create Task(name=\"New Task\")");
/// ```
#[derive(Clone)]
pub struct Insert<'s> {
    entity_type: String,
    values: FieldValues,
    session: Option<&'s dyn Session>,
}

pub fn insert(entity_type: &str) -> Insert<'static> {
    Insert {
        entity_type: entity_type.to_string(),
        values: FieldValues::default(),
        session: None,
    }
}

impl<'s> Insert<'s> {
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn field_values(&self) -> &[(String, Value)] {
        self.values.as_slice()
    }

    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values.extend(values);
        self
    }

    pub fn bind<'a>(self, session: &'a dyn Session) -> Insert<'a>
    where
        's: 'a,
    {
        let mut stmt: Insert<'a> = self;
        stmt.session = Some(session);
        stmt
    }

    pub fn unbind(mut self) -> Self {
        self.session = None;
        self
    }

    pub fn session(&self) -> Option<&'s dyn Session> {
        self.session
    }

    /// Create the entity through the bound session. Nothing is committed.
    pub fn execute(&self) -> Result<Row> {
        self.execute_in(self.session.ok_or(Error::UnboundSession)?)
    }

    pub fn execute_in(&self, session: &dyn Session) -> Result<Row> {
        debug!(entity_type = %self.entity_type, values = %self.values, "create");
        session
            .create(&self.entity_type, self.values.as_slice())
            .map_err(Error::Session)
    }
}

impl fmt::Display for Insert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "create {}({})", self.entity_type, self.values)
    }
}

impl fmt::Debug for Insert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Insert")
            .field("entity_type", &self.entity_type)
            .field("values", &self.values)
            .field("session", &session_debug(self.session))
            .finish()
    }
}

impl PartialEq for Insert<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.values == other.values
    }
}

/// Assign field values on every matching entity.
///
/// # Example
/// ```
/// use ftrack_query::update;
///
/// let stmt = update("Task")
///     .where_([("name", "Old Task")])
///     .unwrap()
///     .values([("name", "New Task")]);
/// assert_eq!(stmt.to_string(), "update Task where name is \"Old Task\" set (name=\"New Task\")");
/// ```
#[derive(Clone)]
pub struct Update<'s> {
    clauses: Clauses,
    values: FieldValues,
    page_size: Option<u32>,
    session: Option<&'s dyn Session>,
}

filter_builders!(Update);

pub fn update(entity_type: &str) -> Update<'static> {
    Update {
        clauses: Clauses::new(entity_type),
        values: FieldValues::default(),
        page_size: None,
        session: None,
    }
}

impl<'s> Update<'s> {
    pub fn field_values(&self) -> &[(String, Value)] {
        self.values.as_slice()
    }

    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values.extend(values);
        self
    }

    /// Updates cannot project; always fails.
    pub fn populate<I, S>(self, _attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Err(Error::ProjectionNotAllowed("updates"))
    }

    /// Updates cannot group; always fails.
    pub fn group_by<I, S>(self, _attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Err(Error::GroupByNotAllowed("updates"))
    }

    pub fn options(mut self, options: Options) -> Self {
        if let Some(page_size) = options.page_size {
            self.page_size = Some(page_size);
        }
        self
    }

    /// Assign the values on every match. Returns how many entities changed.
    /// Nothing is committed.
    pub fn execute(&self) -> Result<usize> {
        self.execute_in(self.bound_session()?)
    }

    pub fn execute_in(&self, session: &dyn Session) -> Result<usize> {
        let query = self.clauses.render(false);
        let page_size = self.effective_page_size(session);
        let _auto_populate = AutoPopulateGuard::disable(session);
        debug!(%query, ?page_size, "query");
        let rows = session.query(&query, page_size).map_err(Error::Session)?;

        let mut count = 0;
        for row in rows {
            let row = row?;
            for (key, value) in self.values.as_slice() {
                row.set(key, value.clone()).map_err(Error::Session)?;
            }
            count += 1;
        }
        debug!(count, "updated");
        Ok(count)
    }
}

impl fmt::Display for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update {} set ({})", self.clauses.render(false), self.values)
    }
}

impl fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("clauses", &self.clauses)
            .field("values", &self.values)
            .field("page_size", &self.page_size)
            .field("session", &session_debug(self.session))
            .finish()
    }
}

/// Delete every matching entity.
///
/// # Example
/// ```
/// use ftrack_query::delete;
///
/// let stmt = delete("Task").where_([("name", "My Task")]).unwrap().limit(1);
/// assert_eq!(stmt.to_string(), "delete Task where name is \"My Task\" limit 1");
/// ```
#[derive(Clone)]
pub struct Delete<'s> {
    clauses: Clauses,
    page_size: Option<u32>,
    remove_components: bool,
    session: Option<&'s dyn Session>,
}

filter_builders!(Delete);

pub fn delete(entity_type: &str) -> Delete<'static> {
    Delete {
        clauses: Clauses::new(entity_type),
        page_size: None,
        remove_components: false,
        session: None,
    }
}

impl<'s> Delete<'s> {
    /// Deletes cannot project; always fails.
    pub fn populate<I, S>(self, _attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Err(Error::ProjectionNotAllowed("deletes"))
    }

    /// Deletes cannot group; always fails.
    pub fn group_by<I, S>(self, _attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Err(Error::GroupByNotAllowed("deletes"))
    }

    /// Remove components from their locations before deleting them.
    pub fn clean_components(mut self, remove: bool) -> Self {
        self.remove_components = remove;
        self
    }

    pub fn removes_components(&self) -> bool {
        self.remove_components
    }

    pub fn options(mut self, options: Options) -> Self {
        if let Some(page_size) = options.page_size {
            self.page_size = Some(page_size);
        }
        if let Some(remove) = options.remove_components {
            self.remove_components = remove;
        }
        self
    }

    /// Delete every match. Returns how many entities were deleted.
    /// Nothing is committed.
    pub fn execute(&self) -> Result<usize> {
        self.execute_in(self.bound_session()?)
    }

    pub fn execute_in(&self, session: &dyn Session) -> Result<usize> {
        let query = if self.remove_components {
            let mut clauses = self.clauses.clone();
            clauses.projection = vec![COMPONENT_LOCATIONS.to_string()];
            clauses.render(true)
        } else {
            self.clauses.render(false)
        };
        let page_size = self.effective_page_size(session);
        let _auto_populate = AutoPopulateGuard::disable(session);
        debug!(%query, ?page_size, "query");
        let rows = session.query(&query, page_size).map_err(Error::Session)?;

        let mut count = 0;
        for row in rows {
            let row = row?;
            if self.remove_components {
                session.remove_components(row.as_ref()).map_err(Error::Session)?;
            }
            debug!(entity = ?row, "delete");
            session.delete_entity(row.as_ref()).map_err(Error::Session)?;
            count += 1;
        }
        debug!(count, "deleted");
        Ok(count)
    }
}

impl fmt::Display for Delete<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delete {}", self.clauses.render(false))
    }
}

impl fmt::Debug for Delete<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delete")
            .field("clauses", &self.clauses)
            .field("page_size", &self.page_size)
            .field("remove_components", &self.remove_components)
            .field("session", &session_debug(self.session))
            .finish()
    }
}

/// Any of the four statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'s> {
    Select(Select<'s>),
    Insert(Insert<'s>),
    Update(Update<'s>),
    Delete(Delete<'s>),
}

/// What executing a statement produced.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Rows of a select
    Rows(QueryResult<'a>),
    /// Entity made by an insert
    Created(Row),
    /// Entities touched by an update or delete
    Count(usize),
}

impl<'s> Statement<'s> {
    pub fn session(&self) -> Option<&'s dyn Session> {
        match self {
            Statement::Select(stmt) => stmt.session(),
            Statement::Insert(stmt) => stmt.session(),
            Statement::Update(stmt) => stmt.session(),
            Statement::Delete(stmt) => stmt.session(),
        }
    }

    pub fn execute(&self) -> Result<Outcome<'s>> {
        let session = self.session().ok_or(Error::UnboundSession)?;
        self.execute_in(session)
    }

    pub fn execute_in<'a>(&self, session: &'a dyn Session) -> Result<Outcome<'a>> {
        Ok(match self {
            Statement::Select(stmt) => Outcome::Rows(stmt.execute_in(session)?),
            Statement::Insert(stmt) => Outcome::Created(stmt.execute_in(session)?),
            Statement::Update(stmt) => Outcome::Count(stmt.execute_in(session)?),
            Statement::Delete(stmt) => Outcome::Count(stmt.execute_in(session)?),
        })
    }
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(stmt) => stmt.fmt(f),
            Statement::Insert(stmt) => stmt.fmt(f),
            Statement::Update(stmt) => stmt.fmt(f),
            Statement::Delete(stmt) => stmt.fmt(f),
        }
    }
}

impl<'s> From<Select<'s>> for Statement<'s> {
    fn from(stmt: Select<'s>) -> Self {
        Statement::Select(stmt)
    }
}

impl<'s> From<Insert<'s>> for Statement<'s> {
    fn from(stmt: Insert<'s>) -> Self {
        Statement::Insert(stmt)
    }
}

impl<'s> From<Update<'s>> for Statement<'s> {
    fn from(stmt: Update<'s>) -> Self {
        Statement::Update(stmt)
    }
}

impl<'s> From<Delete<'s>> for Statement<'s> {
    fn from(stmt: Delete<'s>) -> Self {
        Statement::Delete(stmt)
    }
}
