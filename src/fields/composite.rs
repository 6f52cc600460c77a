//! Wrapper fields that route to a child field instead of rendering their own
//! clause

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Field;
use crate::error::{QueryError, Result};
use crate::query::concatenate;
use crate::schema::validator::loosely_equal;
use crate::schema::AdditionalQueries;

/// Renders the child only for values in a fixed allow-list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceField {
    pub choices: Vec<Value>,
    pub child: Box<Field>,
}

impl ChoiceField {
    pub fn new(choices: Vec<Value>, child: Field) -> Self {
        ChoiceField {
            choices,
            child: Box::new(child),
        }
    }

    pub fn is_allowed(&self, value: &Value) -> bool {
        self.choices.iter().any(|choice| loosely_equal(choice, value))
    }

    pub(super) fn validate(&self) -> Result<()> {
        self.child.validate()
    }

    pub(super) fn render(
        &self,
        value: &Value,
        scope: Option<&str>,
        additional: AdditionalQueries,
    ) -> Option<Value> {
        if !self.is_allowed(value) {
            log::debug!("choice rejected value {}", value);
            return None;
        }
        self.child.render_scoped(value, scope, additional)
    }
}

/// Scopes the child clause under a nested document path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedField {
    pub path: String,
    pub child: Box<Field>,
}

impl NestedField {
    pub fn new(path: impl Into<String>, child: Field) -> Self {
        NestedField {
            path: path.into(),
            child: Box::new(child),
        }
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(QueryError::configuration("nested field requires a path"));
        }
        self.child.validate()
    }

    /// Clauses registered under this field's path in `additional` are AND-ed
    /// inside the nested query; everything else is handed to the child.
    pub(super) fn render(&self, value: &Value, mut additional: AdditionalQueries) -> Option<Value> {
        let scoped = additional.take_nested(&self.path);

        let query = self.child.render_scoped(value, Some(&self.path), additional)?;
        let query = if scoped.is_empty() {
            query
        } else {
            concatenate(query, scoped)
        };

        Some(json!({
            "nested": {
                "path": self.path,
                "query": query
            }
        }))
    }
}
