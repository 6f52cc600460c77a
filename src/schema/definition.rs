//! Builder definitions - which request parameters map to which fields

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{AdditionalQueries, Params};
use crate::error::{QueryError, Result};
use crate::fields::Field;

/// Computes extra clauses for one parameter from the normalized parameters
pub type AdditionalQueryHook = Arc<dyn Fn(&Params) -> Option<AdditionalQueries> + Send + Sync>;

/// The fields a search endpoint accepts, keyed by request parameter name.
///
/// A definition is declared once and shared read-only between builders.
#[derive(Clone, Default)]
pub struct Definition {
    fields: IndexMap<String, Field>,
    hooks: HashMap<String, AdditionalQueryHook>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `field` under request parameter `param`
    pub fn with_field(mut self, param: impl Into<String>, field: Field) -> Self {
        self.insert_field(param, field);
        self
    }

    pub fn insert_field(&mut self, param: impl Into<String>, field: Field) -> Option<Field> {
        self.fields.insert(param.into(), field)
    }

    /// Register a hook contributing additional clauses for `param`
    pub fn with_additional<F>(mut self, param: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Params) -> Option<AdditionalQueries> + Send + Sync + 'static,
    {
        self.hooks.insert(param.into(), Arc::new(hook));
        self
    }

    /// Register a fixed set of additional clauses for `param`
    pub fn with_static_additional(self, param: impl Into<String>, additional: AdditionalQueries) -> Self {
        self.with_additional(param, move |_| Some(additional.clone()))
    }

    pub fn field(&self, param: &str) -> Option<&Field> {
        self.fields.get(param)
    }

    pub fn field_mut(&mut self, param: &str) -> Option<&mut Field> {
        self.fields.get_mut(param)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> indexmap::map::Iter<'_, String, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_additional(&self, param: &str) -> bool {
        self.hooks.contains_key(param)
    }

    /// Validate every declared field
    pub fn validate(&self) -> Result<()> {
        for (param, field) in &self.fields {
            field.validate().map_err(|err| match err {
                QueryError::Configuration(msg) => {
                    QueryError::configuration(format!("parameter '{}': {}", param, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Keep only the parameters this definition declares, in input order.
    ///
    /// Unknown names are dropped without error.
    pub fn bind(&self, params: Params) -> Params {
        params
            .into_iter()
            .filter(|(name, _)| {
                let known = self.fields.contains_key(name);
                if !known {
                    log::debug!("ignoring undeclared parameter '{}'", name);
                }
                known
            })
            .collect()
    }

    /// Additional clauses for `param`; empty when no hook is registered
    pub fn additional_queries(&self, param: &str, params: &Params) -> AdditionalQueries {
        self.hooks
            .get(param)
            .and_then(|hook| hook(params))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&String> = self.hooks.keys().collect();
        hooks.sort();
        f.debug_struct("Definition")
            .field("fields", &self.fields)
            .field("hooks", &hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputType;
    use serde_json::json;

    fn definition() -> Definition {
        Definition::new()
            .with_field("q", Field::match_field("title", InputType::Str).unwrap())
            .with_field("tag", Field::terms("tags").unwrap())
    }

    #[test]
    fn test_bind_drops_unknown_and_keeps_order() {
        let params = Params::new()
            .with("tag", json!(["a"]))
            .with("page", 2)
            .with("q", "fox");

        let bound = definition().bind(params);

        let names: Vec<&str> = bound.names().collect();
        assert_eq!(names, vec!["tag", "q"]);
    }

    #[test]
    fn test_additional_queries_default_empty() {
        let def = definition();
        assert!(def.additional_queries("q", &Params::new()).is_empty());
        assert!(!def.has_additional("q"));
    }

    #[test]
    fn test_additional_hook_sees_params() {
        let def = definition().with_additional("q", |params| {
            params
                .get("tag")
                .map(|tag| AdditionalQueries::new().with_clause(json!({"terms": {"tags": tag}})))
        });

        let params = Params::new().with("tag", json!(["x"]));
        let additional = def.additional_queries("q", &params);
        assert_eq!(additional.clauses, vec![json!({"terms": {"tags": ["x"]}})]);
        assert!(def.additional_queries("q", &Params::new()).is_empty());
    }

    #[test]
    fn test_validate_names_parameter() {
        let unchecked: Field = serde_json::from_value(json!({"type": "match", "input_type": "str"})).unwrap();
        let def = definition().with_field("q", unchecked);

        let err = def.validate().unwrap_err();
        assert!(err.to_string().contains("parameter 'q'"));
    }
}
