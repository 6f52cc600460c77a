//! Fields module - the clause renderers a builder definition is made of
//!
//! A [`Field`] owns three things: the document field it addresses, the
//! boolean occurrence its clause lands under, and a [`FieldKind`] holding the
//! variant-specific configuration. Every field can `normalize` a raw
//! parameter value and `render` a normalized value into a clause.
//!
//! Choice and Nested fields wrap another field. Nesting rewrites the child's
//! field name to `"{path}.{name}"`; the rewritten name is passed down the
//! render call rather than stored, so a field is never mutated while
//! rendering and one definition can serve many threads at once.

mod composite;
mod term;
mod text;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use composite::{ChoiceField, NestedField};
pub use term::{RangeField, TermField};
pub use text::{MatchBoolPrefixField, MatchField, MultiMatchField, QueryStringField};

use crate::error::{CoercionError, QueryError, Result};
use crate::query::concatenate;
use crate::schema::validator::{coerce, coerce_bool, coerce_sequence, coerce_str};
use crate::schema::{AdditionalQueries, InputType, LogicOperator};

/// Variant-specific configuration of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Match(MatchField),
    MatchBoolPrefix(MatchBoolPrefixField),
    MatchPhrase,
    MatchPhrasePrefix,
    MultiMatch(MultiMatchField),
    QueryString(QueryStringField),
    Term(TermField),
    Terms,
    Range(RangeField),
    Exists,
    Ids,
    Choice(ChoiceField),
    Nested(NestedField),
}

impl FieldKind {
    /// Name of the variant as used in definition files
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Match(_) => "match",
            FieldKind::MatchBoolPrefix(_) => "match_bool_prefix",
            FieldKind::MatchPhrase => "match_phrase",
            FieldKind::MatchPhrasePrefix => "match_phrase_prefix",
            FieldKind::MultiMatch(_) => "multi_match",
            FieldKind::QueryString(_) => "query_string",
            FieldKind::Term(_) => "term",
            FieldKind::Terms => "terms",
            FieldKind::Range(_) => "range",
            FieldKind::Exists => "exists",
            FieldKind::Ids => "ids",
            FieldKind::Choice(_) => "choice",
            FieldKind::Nested(_) => "nested",
        }
    }

    /// Whether the clause is addressed by the field's own name
    fn requires_name(&self) -> bool {
        matches!(
            self,
            FieldKind::Match(_)
                | FieldKind::MatchBoolPrefix(_)
                | FieldKind::MatchPhrase
                | FieldKind::MatchPhrasePrefix
                | FieldKind::Term(_)
                | FieldKind::Terms
                | FieldKind::Range(_)
                | FieldKind::Exists
        )
    }
}

macro_rules! impl_into_kind {
    ($($config:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$config> for FieldKind {
                fn from(config: $config) -> Self {
                    FieldKind::$variant(config)
                }
            }
        )*
    };
}

impl_into_kind! {
    MatchField => Match,
    MatchBoolPrefixField => MatchBoolPrefix,
    MultiMatchField => MultiMatch,
    QueryStringField => QueryString,
    TermField => Term,
    RangeField => Range,
    ChoiceField => Choice,
    NestedField => Nested,
}

/// A declared search field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Document field the clause targets
    #[serde(default, rename = "field", skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Bucket of the boolean query the clause is placed in
    #[serde(default, rename = "logic")]
    logic_operator: LogicOperator,

    #[serde(flatten)]
    kind: FieldKind,
}

impl Field {
    /// Create a validated field
    pub fn new(name: Option<String>, kind: impl Into<FieldKind>) -> Result<Self> {
        let field = Field {
            name,
            logic_operator: LogicOperator::default(),
            kind: kind.into(),
        };
        field.validate()?;
        Ok(field)
    }

    /// Create a field addressing document field `name`
    pub fn named(name: impl Into<String>, kind: impl Into<FieldKind>) -> Result<Self> {
        Self::new(Some(name.into()), kind)
    }

    /// Create a field that addresses no single document field
    pub fn unnamed(kind: impl Into<FieldKind>) -> Result<Self> {
        Self::new(None, kind)
    }

    pub fn match_field(name: impl Into<String>, input_type: InputType) -> Result<Self> {
        Self::named(name, MatchField::new(input_type))
    }

    pub fn match_phrase(name: impl Into<String>) -> Result<Self> {
        Self::named(name, FieldKind::MatchPhrase)
    }

    pub fn match_phrase_prefix(name: impl Into<String>) -> Result<Self> {
        Self::named(name, FieldKind::MatchPhrasePrefix)
    }

    pub fn term(name: impl Into<String>, input_type: InputType) -> Result<Self> {
        Self::named(name, TermField::new(input_type))
    }

    pub fn terms(name: impl Into<String>) -> Result<Self> {
        Self::named(name, FieldKind::Terms)
    }

    pub fn exists(name: impl Into<String>) -> Result<Self> {
        Self::named(name, FieldKind::Exists)
    }

    pub fn ids() -> Result<Self> {
        Self::unnamed(FieldKind::Ids)
    }

    /// Gate `child` behind a fixed allow-list of values
    pub fn choice(choices: Vec<Value>, child: Field) -> Result<Self> {
        Self::unnamed(ChoiceField::new(choices, child))
    }

    /// Scope `child` under nested document `path`
    pub fn nested(path: impl Into<String>, child: Field) -> Result<Self> {
        Self::unnamed(NestedField::new(path, child))
    }

    /// Replace the logic operator chosen by default
    pub fn with_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rename the addressed document field.
    ///
    /// The field is re-validated; on failure the previous name is kept.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let previous = self.name.replace(name.into());
        if let Err(err) = self.validate() {
            self.name = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn logic_operator(&self) -> LogicOperator {
        self.logic_operator
    }

    pub fn set_logic_operator(&mut self, logic_operator: LogicOperator) {
        self.logic_operator = logic_operator;
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Check construction invariants, recursing into wrapped fields
    pub fn validate(&self) -> Result<()> {
        if self.kind.requires_name() && self.name.as_deref().map_or(true, str::is_empty) {
            return Err(QueryError::configuration(format!(
                "{} field requires a field name",
                self.kind.type_name()
            )));
        }

        match &self.kind {
            FieldKind::Match(config) => config.validate(),
            FieldKind::MultiMatch(config) => config.validate(),
            FieldKind::QueryString(config) => config.validate(self.name.as_deref()),
            FieldKind::Term(config) => config.validate(),
            FieldKind::Range(config) => config.validate(),
            FieldKind::Choice(config) => config.validate(),
            FieldKind::Nested(config) => config.validate(),
            FieldKind::MatchBoolPrefix(_)
            | FieldKind::MatchPhrase
            | FieldKind::MatchPhrasePrefix
            | FieldKind::Terms
            | FieldKind::Exists
            | FieldKind::Ids => Ok(()),
        }
    }

    /// Coerce a raw parameter value into the type this field renders.
    ///
    /// Failures are reported against `param`, the request parameter name.
    pub fn normalize(&self, raw: &Value, param: &str) -> Result<Value> {
        self.coerce(raw)
            .map_err(|source| QueryError::validation(param, source))
    }

    fn coerce(&self, raw: &Value) -> std::result::Result<Value, CoercionError> {
        match &self.kind {
            FieldKind::Match(config) => coerce(raw, config.input_type),
            FieldKind::Term(config) => coerce(raw, config.input_type),
            FieldKind::Range(config) => coerce(raw, config.input_type),
            FieldKind::MatchBoolPrefix(_)
            | FieldKind::MatchPhrase
            | FieldKind::MatchPhrasePrefix
            | FieldKind::MultiMatch(_)
            | FieldKind::QueryString(_) => coerce_str(raw).map(Value::String),
            FieldKind::Terms | FieldKind::Ids => coerce_sequence(raw).map(Value::Array),
            FieldKind::Exists => coerce_bool(raw).map(Value::Bool),
            FieldKind::Choice(config) => config.child.coerce(raw),
            FieldKind::Nested(config) => config.child.coerce(raw),
        }
    }

    /// Render a normalized value into a clause.
    ///
    /// Returns `None` when the value produces no clause. Non-empty
    /// `additional.clauses` are AND-ed with the field's own clause.
    pub fn render(&self, value: &Value, additional: AdditionalQueries) -> Option<Value> {
        self.render_scoped(value, None, additional)
    }

    /// Render with the field name prefixed by an enclosing nesting path
    pub(crate) fn render_scoped(
        &self,
        value: &Value,
        scope: Option<&str>,
        additional: AdditionalQueries,
    ) -> Option<Value> {
        match &self.kind {
            FieldKind::Choice(config) => config.render(value, scope, additional),
            FieldKind::Nested(config) => config.render(value, additional),
            _ => {
                let own = self.render_own(value, scope)?;
                let extra = additional.clauses;
                if extra.is_empty() {
                    Some(own)
                } else {
                    Some(concatenate(own, extra))
                }
            }
        }
    }

    fn render_own(&self, value: &Value, scope: Option<&str>) -> Option<Value> {
        let target = self.target(scope);
        match &self.kind {
            FieldKind::Match(config) => config.render(&target, value),
            FieldKind::MatchBoolPrefix(config) => config.render(&target, value),
            FieldKind::MatchPhrase => Some(text::render_phrase("match_phrase", &target, value)),
            FieldKind::MatchPhrasePrefix => {
                Some(text::render_phrase("match_phrase_prefix", &target, value))
            }
            FieldKind::MultiMatch(config) => Some(config.render(value)),
            FieldKind::QueryString(config) => config.render(self.name.as_deref(), value),
            FieldKind::Term(_) => Some(term::render_term(&target, value)),
            FieldKind::Terms => term::render_terms(&target, value),
            FieldKind::Range(config) => config.render(&target, value),
            FieldKind::Exists => term::render_exists(&target, value),
            FieldKind::Ids => term::render_ids(value),
            FieldKind::Choice(_) | FieldKind::Nested(_) => None,
        }
    }

    /// Effective field name, prefixed by the nesting scope if any
    fn target(&self, scope: Option<&str>) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match scope {
            Some(path) => format!("{}.{}", path, name),
            None => name.to_string(),
        }
    }

    /// Bucket the rendered clause for `value` belongs to.
    ///
    /// Exists fields route on their own value: `true` requires the field to
    /// exist (`must`), `false` requires it to be missing (`must_not`).
    pub fn bucket(&self, value: &Value) -> LogicOperator {
        match (&self.kind, value) {
            (FieldKind::Exists, Value::Bool(true)) => LogicOperator::Must,
            (FieldKind::Exists, Value::Bool(false)) => LogicOperator::MustNot,
            _ => self.logic_operator,
        }
    }
}

/// `{key: value}`
pub(crate) fn object(key: impl Into<String>, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}

/// Start from the required `base` entries, then append every configured
/// attribute in declaration order, skipping the unset ones.
pub(crate) fn construct(base: Vec<(&str, Value)>, attrs: Vec<(&str, Option<Value>)>) -> Value {
    let mut map = Map::new();
    for (key, value) in base {
        map.insert(key.to_string(), value);
    }
    for (key, value) in attrs {
        if let Some(value) = value {
            map.insert(key.to_string(), value);
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_construct_keeps_declaration_order() {
        let value = construct(
            vec![("query", json!("text"))],
            vec![
                ("operator", Some(json!("and"))),
                ("fuzziness", None),
                ("minimum_should_match", Some(json!("75%"))),
            ],
        );

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["query", "operator", "minimum_should_match"]);
    }

    #[test]
    fn test_named_kind_without_name_is_rejected() {
        let err = Field::unnamed(FieldKind::Terms).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));

        let err = Field::new(Some(String::new()), FieldKind::Exists).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_normalize_wraps_coercion_error() {
        let field = Field::term("term_field_test", InputType::Int).unwrap();

        let err = field.normalize(&json!("test-text"), "term_field").unwrap_err();
        assert_eq!(err.param(), Some("term_field"));
        assert!(matches!(err, QueryError::Validation { .. }));
    }

    #[test]
    fn test_additional_clauses_precede_own_clause() {
        let field = Field::term("status", InputType::Str)
            .unwrap()
            .with_logic_operator(LogicOperator::Should);
        let additional = AdditionalQueries::from_clauses(vec![
            json!({"term": {"owner": "alice"}}),
            json!({"exists": {"field": "published_at"}}),
        ]);

        let rendered = field.render(&json!("draft"), additional).unwrap();

        assert_eq!(
            rendered,
            json!({
                "bool": {
                    "must": [
                        {"term": {"owner": "alice"}},
                        {"exists": {"field": "published_at"}},
                        {"term": {"status": "draft"}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_empty_clause_ignores_additional_clauses() {
        let field = Field::match_field("title", InputType::Str).unwrap();
        let additional = AdditionalQueries::from_clauses(vec![json!({"term": {"a": 1}})]);

        assert!(field.render(&json!(""), additional).is_none());
    }

    #[test]
    fn test_set_name_revalidates() {
        let mut field = Field::match_field("title", InputType::Str).unwrap();

        let err = field.set_name("").unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
        assert_eq!(field.name(), Some("title"));
        assert_eq!(
            field.render(&json!("lamp"), AdditionalQueries::default()),
            Some(json!({"match": {"title": {"query": "lamp"}}}))
        );

        field.set_name("headline").unwrap();
        assert_eq!(field.name(), Some("headline"));
    }

    #[test]
    fn test_exists_bucket_follows_value() {
        let field = Field::exists("exists_test")
            .unwrap()
            .with_logic_operator(LogicOperator::Should);

        assert_eq!(field.bucket(&json!(true)), LogicOperator::Must);
        assert_eq!(field.bucket(&json!(false)), LogicOperator::MustNot);
        assert_eq!(field.bucket(&json!(null)), LogicOperator::Should);
        assert_eq!(field.logic_operator(), LogicOperator::Should);
    }

    #[test]
    fn test_deserialize_field_declaration() {
        let field: Field = serde_json::from_value(json!({
            "type": "match",
            "field": "title",
            "logic": "filter",
            "input_type": "str",
            "fuzziness": "AUTO"
        }))
        .unwrap();

        assert_eq!(field.name(), Some("title"));
        assert_eq!(field.logic_operator(), LogicOperator::Filter);
        assert_eq!(field.kind().type_name(), "match");
        field.validate().unwrap();
    }
}
