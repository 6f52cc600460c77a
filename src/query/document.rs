//! Boolean query document assembly

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::{QueryError, Result};
use crate::schema::LogicOperator;

/// AND together pre-built clauses with a field's own clause.
///
/// The additional clauses come first; the conjunction is always `must`,
/// whatever bucket the combined clause ends up in.
pub fn concatenate(own: Value, additional: Vec<Value>) -> Value {
    let mut must = additional;
    must.push(own);
    json!({ "bool": { "must": must } })
}

/// Rendered clauses grouped by logic operator
///
/// Buckets appear in the order they first received a clause; clauses keep
/// the order they were pushed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    buckets: IndexMap<LogicOperator, Vec<Value>>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rendered clause, or every clause of a rendered list
    pub fn push(&mut self, operator: LogicOperator, rendered: Value) -> Result<()> {
        match rendered {
            Value::Object(_) => {
                self.buckets.entry(operator).or_default().push(rendered);
                Ok(())
            }
            Value::Array(items) => {
                if let Some(bad) = items.iter().find(|item| !item.is_object()) {
                    return Err(QueryError::assembly(format!(
                        "clause list for '{}' contains a non-object entry: {}",
                        operator, bad
                    )));
                }
                self.buckets.entry(operator).or_default().extend(items);
                Ok(())
            }
            other => Err(QueryError::assembly(format!(
                "rendered clause for '{}' must be an object or a list of objects, got {}",
                operator, other
            ))),
        }
    }

    pub fn clauses(&self, operator: LogicOperator) -> &[Value] {
        self.buckets.get(&operator).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Number of clauses across all buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// `{"query": {"bool": {...}}}`, or `{}` if no clause was added
    pub fn into_document(self) -> Value {
        if self.is_empty() {
            return Value::Object(Map::new());
        }

        let mut bool_node = Map::new();
        for (operator, clauses) in self.buckets {
            if !clauses.is_empty() {
                bool_node.insert(operator.as_str().to_string(), Value::Array(clauses));
            }
        }
        json!({ "query": { "bool": bool_node } })
    }
}
