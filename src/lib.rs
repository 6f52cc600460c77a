//! Declarative composition of Elasticsearch boolean queries.
//!
//! A [`Definition`] maps request parameter names to [`Field`]s. A
//! [`QueryBuilder`] binds one request's parameters to a definition,
//! normalizes them, renders each into a clause and groups the clauses by
//! logic operator into `{"query": {"bool": {...}}}`.

pub mod error;
pub mod fields;
pub mod parser;
pub mod query;
pub mod schema;

pub use error::{CoercionError, QueryError, Result};
pub use fields::{Field, FieldKind};
pub use query::{BoolQuery, QueryBuilder};
pub use schema::{AdditionalQueries, Definition, InputType, LogicOperator, Params};
