//! Schema module - parameter types, coercion rules and builder definitions

mod definition;
pub mod loader;
mod types;
pub mod validator;

pub use definition::{AdditionalQueryHook, Definition};
pub use loader::{create_default_definition, load_definition, parse_definition};
pub use types::*;
