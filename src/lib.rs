pub mod ast;
pub mod combinators;
pub mod error;
pub mod literal;
pub mod session;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    attr, delete, insert, select, update, Attr, Clauses, Delete, Expr, Insert, Invocation,
    Members, Operand, Options, Outcome, Select, SortDirection, SortKey, Statement, Update,
    primary_key,
};
pub use combinators::{and_, criteria, not_, or_, Criterion};
pub use error::{Error, Result, SessionError};
pub use session::{AutoPopulateGuard, Entity, QueryResult, Row, Session, SessionExt};
pub use value::{EntityRef, HasIdentifier, Identifier, Value};
