//! Query module - assembles rendered clauses into a search document

mod builder;
mod document;

pub use builder::QueryBuilder;
pub use document::{concatenate, BoolQuery};
