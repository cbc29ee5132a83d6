use rust_decimal::Decimal;
use std::fmt;

/// A value that can appear on the right-hand side of a predicate.
///
/// Numbers keep the distinction between integers, floats and exact
/// decimals so each renders in its natural textual form.
///
/// # Examples
///
/// ```
/// use ftrack_query::Value;
///
/// assert_eq!(Value::from(5), Value::Integer(5));
/// assert_eq!(Value::from("abc"), Value::Text("abc".to_string()));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value (`none`)
    Null,

    /// Boolean, rendered with the server's `True`/`False` spelling
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// Exact decimal number
    Decimal(Decimal),

    /// UTF-8 text, rendered quoted
    Text(String),

    /// Reference to a stored entity
    Entity(EntityRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Build a reference value from anything that knows its identifier.
    pub fn entity(entity: &(impl HasIdentifier + ?Sized)) -> Self {
        Value::Entity(EntityRef::of(entity))
    }
}

/// Unique identifier of a stored entity.
///
/// Most entity types use text identifiers (UUIDs) but a few use numbers,
/// and the literal form follows whichever it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Text(String),
    Integer(i64),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Text(id) => f.write_str(id),
            Identifier::Integer(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier::Text(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Identifier::Text(id)
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Identifier::Integer(id)
    }
}

impl From<i32> for Identifier {
    fn from(id: i32) -> Self {
        Identifier::Integer(id.into())
    }
}

impl From<Identifier> for Value {
    fn from(id: Identifier) -> Self {
        match id {
            Identifier::Text(id) => Value::Text(id),
            Identifier::Integer(id) => Value::Integer(id),
        }
    }
}

/// Capability of any entity object to expose its unique identifier.
///
/// Implement this for the entity type of whatever session integration is
/// in use; the query builders only ever look at the identifier.
pub trait HasIdentifier {
    fn id(&self) -> Identifier;

    /// Entity type name, when known. Only used for display.
    fn entity_type(&self) -> Option<&str> {
        None
    }
}

/// Detached reference to an entity: its identifier and, optionally, type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub entity_type: Option<String>,
    pub id: Identifier,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<Identifier>) -> Self {
        EntityRef {
            entity_type: Some(entity_type.into()),
            id: id.into(),
        }
    }

    pub fn of(entity: &(impl HasIdentifier + ?Sized)) -> Self {
        EntityRef {
            entity_type: entity.entity_type().map(str::to_string),
            id: entity.id(),
        }
    }
}

impl HasIdentifier for EntityRef {
    fn id(&self) -> Identifier {
        self.id.clone()
    }

    fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity_type {
            Some(entity_type) => write!(f, "<{}({})>", entity_type, self.id),
            None => write!(f, "<Entity({})>", self.id),
        }
    }
}

impl From<EntityRef> for Value {
    fn from(entity: EntityRef) -> Self {
        Value::Entity(entity)
    }
}

impl From<&EntityRef> for Value {
    fn from(entity: &EntityRef) -> Self {
        Value::Entity(entity.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Decimal(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// JSON scalars map onto their natural counterpart; arrays and objects
/// have no literal form and are passed as their JSON text.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}
