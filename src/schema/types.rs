//! Schema type definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Boolean query occurrence a field's clause is placed under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOperator {
    #[default]
    Must,
    Filter,
    Should,
    MustNot,
}

impl LogicOperator {
    pub const ALL: [LogicOperator; 4] = [
        LogicOperator::Must,
        LogicOperator::Filter,
        LogicOperator::Should,
        LogicOperator::MustNot,
    ];

    /// Key used inside the `bool` query node
    pub fn as_str(self) -> &'static str {
        match self {
            LogicOperator::Must => "must",
            LogicOperator::Filter => "filter",
            LogicOperator::Should => "should",
            LogicOperator::MustNot => "must_not",
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::configuration(format!("unknown logic operator '{}'", s)))
    }
}

/// Scalar type a field coerces its input to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Int,
    Float,
    Str,
    Bool,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Int => "int",
            InputType::Float => "float",
            InputType::Str => "str",
            InputType::Bool => "bool",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison used by a range clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupExpr {
    Gte,
    Lte,
    Gt,
    Lt,
}

impl LookupExpr {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupExpr::Gte => "gte",
            LookupExpr::Lte => "lte",
            LookupExpr::Gt => "gt",
            LookupExpr::Lt => "lt",
        }
    }
}

impl FromStr for LookupExpr {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gte" => Ok(LookupExpr::Gte),
            "lte" => Ok(LookupExpr::Lte),
            "gt" => Ok(LookupExpr::Gt),
            "lt" => Ok(LookupExpr::Lt),
            _ => Err(QueryError::configuration(format!(
                "unknown lookup expression '{}', expected one of gte, lte, gt, lt",
                s
            ))),
        }
    }
}

/// `type` of a multi_match query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    BestFields,
    MostFields,
    Phrase,
    PhrasePrefix,
    CrossFields,
    BoolPrefix,
}

impl MultiMatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MultiMatchType::BestFields => "best_fields",
            MultiMatchType::MostFields => "most_fields",
            MultiMatchType::Phrase => "phrase",
            MultiMatchType::PhrasePrefix => "phrase_prefix",
            MultiMatchType::CrossFields => "cross_fields",
            MultiMatchType::BoolPrefix => "bool_prefix",
        }
    }
}

impl FromStr for MultiMatchType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best_fields" => Ok(MultiMatchType::BestFields),
            "most_fields" => Ok(MultiMatchType::MostFields),
            "phrase" => Ok(MultiMatchType::Phrase),
            "phrase_prefix" => Ok(MultiMatchType::PhrasePrefix),
            "cross_fields" => Ok(MultiMatchType::CrossFields),
            "bool_prefix" => Ok(MultiMatchType::BoolPrefix),
            _ => Err(QueryError::configuration(format!("unknown multi_match type: {}", s))),
        }
    }
}

/// Request parameters, kept in insertion order
///
/// The order of insertion decides the order of clauses inside each
/// boolean bucket of the resulting query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`Params::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter from any iterator, draining it immediately.
    ///
    /// One-shot iterators are consumed exactly once; the items are stored as
    /// an array in iteration order.
    pub fn insert_iter<I, T>(&mut self, name: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        self.0.insert(name.into(), Value::Array(items));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Merge `other` into `self`; values from `other` win
    pub fn extend(&mut self, other: Params) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extra clauses to AND together with a field's own clause.
///
/// Two separate namespaces: `clauses` apply to the field itself, `nested`
/// entries are keyed by nesting path and are only picked up by a nested
/// field whose path matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalQueries {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clauses: Vec<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nested: IndexMap<String, Vec<Value>>,
}

impl AdditionalQueries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clauses(clauses: Vec<Value>) -> Self {
        AdditionalQueries {
            clauses,
            ..Default::default()
        }
    }

    pub fn with_clause(mut self, clause: Value) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn with_nested(mut self, path: impl Into<String>, clauses: Vec<Value>) -> Self {
        self.nested.entry(path.into()).or_default().extend(clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.nested.values().all(Vec::is_empty)
    }

    /// Remove and return the clauses scoped to nesting `path`
    pub fn take_nested(&mut self, path: &str) -> Vec<Value> {
        self.nested.shift_remove(path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logic_operator_round_trip() {
        for op in LogicOperator::ALL {
            assert_eq!(op.as_str().parse::<LogicOperator>().unwrap(), op);
        }
        assert!("and".parse::<LogicOperator>().is_err());
        assert_eq!(serde_json::to_value(LogicOperator::MustNot).unwrap(), json!("must_not"));
    }

    #[test]
    fn test_lookup_expr_rejects_unknown() {
        assert_eq!("gt".parse::<LookupExpr>().unwrap(), LookupExpr::Gt);
        let err = "eq".parse::<LookupExpr>().unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_multi_match_type_rejects_unknown() {
        assert_eq!(
            "cross_fields".parse::<MultiMatchType>().unwrap(),
            MultiMatchType::CrossFields
        );
        assert!("fuzzy_fields".parse::<MultiMatchType>().is_err());
    }

    #[test]
    fn test_params_keep_insertion_order() {
        let params = Params::new()
            .with("zeta", 1)
            .with("alpha", "a")
            .with("mid", true);

        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_iter_drains_one_shot_iterator() {
        let mut counter = 0;
        let one_shot = std::iter::from_fn(|| {
            counter += 1;
            if counter <= 3 { Some(counter) } else { None }
        });

        let mut params = Params::new();
        params.insert_iter("ids", one_shot);

        assert_eq!(params.get("ids"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_take_nested_removes_entry() {
        let mut additional = AdditionalQueries::new()
            .with_clause(json!({"term": {"a": 1}}))
            .with_nested("comments", vec![json!({"term": {"comments.b": 2}})]);

        assert_eq!(additional.take_nested("comments").len(), 1);
        assert!(additional.take_nested("comments").is_empty());
        assert_eq!(additional.clauses.len(), 1);
        assert!(!additional.is_empty());
    }
}
