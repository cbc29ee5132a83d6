//! # ftrack Query Language - Statement Tree
//!
//! This module defines the values that render to ftrack query text. Nothing
//! here parses queries; every type is built through methods and rendered
//! with [`Display`](std::fmt::Display).
//!
//! ## Architecture Overview
//!
//! The module is organized into focused submodules:
//!
//! - **[path]** - Dotted attribute paths and sort keys
//! - **[operators]** - Comparison, relationship and membership keywords
//! - **[expressions]** - Filter expression tree and negation
//! - **[query]** - Clause set shared by select, update and delete
//! - **[statements]** - The four statement kinds and their execution
//!
//! ## Quick Start
//!
//! ```text
//! select name from Task where parent.name is "Shot 1" order by name descending limit 5
//! ```
//!
//! This query fetches the names of the last five tasks under a shot.
//!
//! ## Core Concepts
//!
//! ### Predicates
//!
//! Every filter is an attribute path, an operator and a literal:
//!
//! ```text
//! path operator literal
//! ```
//!
//! Relationships nest a whole condition in brackets:
//!
//! ```text
//! children any (name is "abc" and status.name is "Done")
//! ```
//!
//! ### Connectives
//!
//! The query grammar has no operator precedence, so every `or` group of
//! more than one term is bracketed and `and` groups never are. Negation
//! brackets a group only when it would otherwise bind to the first term.
//!
//! ### Entities
//!
//! Comparing a relation against an entity compares identifiers:
//!
//! ```text
//! project.id is "0f3a..."
//! ```
//!
//! ### Immutability
//!
//! Builder methods consume the statement and return a new one. Clone a
//! statement to branch it; the original is never changed.
//!
//! ## Examples
//!
//! ### Select With Projection
//!
//! ```text
//! select id, name from Task where name like "%Test%"
//! ```
//!
//! ### Subquery Membership
//!
//! ```text
//! parent.id in (select id from Shot where name is "sh010")
//! ```
//!
//! ### Update
//!
//! ```text
//! update Task where name is "Old Task" set (name="New Task")
//! ```
pub mod path;
pub mod operators;
pub mod expressions;
pub mod query;
pub mod statements;

pub use path::{attr, Attr, SortDirection, SortKey};
pub use operators::{Comparison, Connective, Membership, Relation, NOT};
pub use expressions::{Expr, Invocation, Members, Operand};
pub use query::{Clauses, IDENTIFIER_FIELD};
pub use statements::{
    delete, insert, primary_key, select, update, Delete, FieldValues, Insert, Options, Outcome,
    Select, Statement, Update, COMPONENT_LOCATIONS, PRIMARY_KEYS,
};
