//! Term-level fields: term, terms, range, exists and ids

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::object;
use crate::error::{QueryError, Result};
use crate::schema::validator::is_falsy;
use crate::schema::{InputType, LookupExpr};

/// `{"term": {field: value}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermField {
    pub input_type: InputType,
}

impl TermField {
    pub fn new(input_type: InputType) -> Self {
        TermField { input_type }
    }

    pub(super) fn validate(&self) -> Result<()> {
        match self.input_type {
            InputType::Bool | InputType::Str | InputType::Int => Ok(()),
            other => Err(QueryError::configuration(format!(
                "term fields accept bool, str or int input, not {}",
                other
            ))),
        }
    }
}

/// `{"range": {field: {lookup_expr: value}}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeField {
    pub input_type: InputType,
    pub lookup_expr: LookupExpr,
}

impl RangeField {
    pub fn new(input_type: InputType, lookup_expr: LookupExpr) -> Self {
        RangeField {
            input_type,
            lookup_expr,
        }
    }

    /// Like [`RangeField::new`], with the lookup expression given by name
    pub fn parse(input_type: InputType, lookup_expr: &str) -> Result<Self> {
        Ok(Self::new(input_type, lookup_expr.parse()?))
    }

    pub(super) fn validate(&self) -> Result<()> {
        match self.input_type {
            InputType::Int | InputType::Float => Ok(()),
            other => Err(QueryError::configuration(format!(
                "range fields accept int or float input, not {}",
                other
            ))),
        }
    }

    pub(super) fn render(&self, target: &str, value: &Value) -> Option<Value> {
        if is_falsy(value) {
            return None;
        }
        Some(object(
            "range",
            object(target, object(self.lookup_expr.as_str(), value.clone())),
        ))
    }
}

pub(super) fn render_term(target: &str, value: &Value) -> Value {
    object("term", object(target, value.clone()))
}

pub(super) fn render_terms(target: &str, value: &Value) -> Option<Value> {
    if is_falsy(value) {
        return None;
    }
    Some(object("terms", object(target, value.clone())))
}

pub(super) fn render_exists(target: &str, value: &Value) -> Option<Value> {
    if value.is_null() {
        return None;
    }
    Some(json!({ "exists": { "field": target } }))
}

pub(super) fn render_ids(value: &Value) -> Option<Value> {
    if is_falsy(value) {
        return None;
    }
    Some(json!({ "ids": { "values": value } }))
}
