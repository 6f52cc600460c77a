//! Full-text fields: match, match_bool_prefix, match_phrase(_prefix),
//! multi_match and query_string

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{construct, object};
use crate::error::{QueryError, Result};
use crate::schema::validator::is_falsy;
use crate::schema::{InputType, MultiMatchType};

fn string_attr(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|s| Value::String(s.clone()))
}

/// `{"match": {field: {"query": value, ...}}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchField {
    pub input_type: InputType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
}

impl MatchField {
    pub fn new(input_type: InputType) -> Self {
        MatchField {
            input_type,
            operator: None,
            fuzziness: None,
            minimum_should_match: None,
        }
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn minimum_should_match(mut self, minimum_should_match: impl Into<String>) -> Self {
        self.minimum_should_match = Some(minimum_should_match.into());
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        match self.input_type {
            InputType::Int | InputType::Str => Ok(()),
            other => Err(QueryError::configuration(format!(
                "match fields accept int or str input, not {}",
                other
            ))),
        }
    }

    pub(super) fn render(&self, target: &str, value: &Value) -> Option<Value> {
        if is_falsy(value) {
            return None;
        }

        let body = construct(
            vec![("query", value.clone())],
            vec![
                ("operator", string_attr(&self.operator)),
                ("fuzziness", string_attr(&self.fuzziness)),
                ("minimum_should_match", string_attr(&self.minimum_should_match)),
            ],
        );
        Some(object("match", object(target, body)))
    }
}

/// `{"match_bool_prefix": {field: {"query": value, ...}}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchBoolPrefixField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
}

impl MatchBoolPrefixField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn minimum_should_match(mut self, minimum_should_match: impl Into<String>) -> Self {
        self.minimum_should_match = Some(minimum_should_match.into());
        self
    }

    pub(super) fn render(&self, target: &str, value: &Value) -> Option<Value> {
        if is_falsy(value) {
            return None;
        }

        let body = construct(
            vec![("query", value.clone())],
            vec![
                ("operator", string_attr(&self.operator)),
                ("minimum_should_match", string_attr(&self.minimum_should_match)),
            ],
        );
        Some(object("match_bool_prefix", object(target, body)))
    }
}

/// match_phrase and match_phrase_prefix render even for an empty value
pub(super) fn render_phrase(query_kind: &str, target: &str, value: &Value) -> Value {
    object(query_kind, object(target, json!({ "query": value })))
}

/// `{"multi_match": {"query": value, "type": ..., "fields": [...], ...}}`
///
/// Which optional attributes are emitted depends on the query type;
/// attributes the type does not accept are left out even when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiMatchField {
    pub query_type: MultiMatchType,

    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,
}

impl MultiMatchField {
    pub fn new(query_type: MultiMatchType, fields: Vec<String>) -> Self {
        MultiMatchField {
            query_type,
            fields,
            operator: None,
            minimum_should_match: None,
            tie_breaker: None,
            fuzziness: None,
        }
    }

    /// Like [`MultiMatchField::new`], with the type given by name
    pub fn parse(query_type: &str, fields: Vec<String>) -> Result<Self> {
        Ok(Self::new(query_type.parse()?, fields))
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn minimum_should_match(mut self, minimum_should_match: impl Into<String>) -> Self {
        self.minimum_should_match = Some(minimum_should_match.into());
        self
    }

    pub fn tie_breaker(mut self, tie_breaker: f64) -> Self {
        self.tie_breaker = Some(tie_breaker);
        self
    }

    pub fn fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub(super) fn validate(&self) -> Result<()> {
        match self.tie_breaker {
            Some(t) if !t.is_finite() => Err(QueryError::configuration(format!(
                "multi_match tie_breaker must be a finite number, got {}",
                t
            ))),
            _ => Ok(()),
        }
    }

    fn attrs(&self) -> Vec<(&'static str, Option<Value>)> {
        let operator = ("operator", string_attr(&self.operator));
        let minimum_should_match = ("minimum_should_match", string_attr(&self.minimum_should_match));
        let fuzziness = ("fuzziness", string_attr(&self.fuzziness));

        match self.query_type {
            MultiMatchType::BestFields => vec![
                operator,
                minimum_should_match,
                fuzziness,
                ("tie_breaker", self.tie_breaker.map(Value::from)),
            ],
            MultiMatchType::MostFields => vec![operator, minimum_should_match, fuzziness],
            MultiMatchType::Phrase | MultiMatchType::PhrasePrefix => vec![],
            MultiMatchType::CrossFields | MultiMatchType::BoolPrefix => {
                vec![operator, minimum_should_match]
            }
        }
    }

    pub(super) fn render(&self, value: &Value) -> Value {
        let body = construct(
            vec![
                ("query", value.clone()),
                ("type", Value::from(self.query_type.as_str())),
                ("fields", Value::from(self.fields.clone())),
            ],
            self.attrs(),
        );
        object("multi_match", body)
    }
}

/// `{"query_string": {"query": value, ...}}`
///
/// Targets either one `default_field` or a list of `fields`, never both.
/// With neither configured the field's own name is the default field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStringField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<String>,
}

impl QueryStringField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_field(mut self, default_field: impl Into<String>) -> Self {
        self.default_field = Some(default_field.into());
        self
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn default_operator(mut self, default_operator: impl Into<String>) -> Self {
        self.default_operator = Some(default_operator.into());
        self
    }

    pub fn minimum_should_match(mut self, minimum_should_match: impl Into<String>) -> Self {
        self.minimum_should_match = Some(minimum_should_match.into());
        self
    }

    fn explicit_default_field(&self) -> Option<&str> {
        self.default_field.as_deref().filter(|f| !f.is_empty())
    }

    fn explicit_fields(&self) -> Option<&[String]> {
        self.fields.as_deref().filter(|f| !f.is_empty())
    }

    pub(super) fn validate(&self, own_name: Option<&str>) -> Result<()> {
        match (self.explicit_default_field(), self.explicit_fields()) {
            (Some(_), Some(_)) => Err(QueryError::configuration(
                "query_string accepts either default_field or fields, not both",
            )),
            (None, None) if own_name.map_or(true, str::is_empty) => Err(QueryError::configuration(
                "query_string needs default_field, fields or a field name",
            )),
            _ => Ok(()),
        }
    }

    /// The target attribute appended after the optional ones
    fn target_attr(&self, own_name: Option<&str>) -> (&'static str, Option<Value>) {
        if let Some(default_field) = self.explicit_default_field() {
            ("default_field", Some(Value::from(default_field)))
        } else if let Some(fields) = self.explicit_fields() {
            ("fields", Some(Value::from(fields.to_vec())))
        } else {
            ("default_field", own_name.map(Value::from))
        }
    }

    pub(super) fn render(&self, own_name: Option<&str>, value: &Value) -> Option<Value> {
        if is_falsy(value) {
            return None;
        }

        let body = construct(
            vec![("query", value.clone())],
            vec![
                ("fuzziness", string_attr(&self.fuzziness)),
                ("default_operator", string_attr(&self.default_operator)),
                ("minimum_should_match", string_attr(&self.minimum_should_match)),
                self.target_attr(own_name),
            ],
        );
        Some(object("query_string", body))
    }
}
