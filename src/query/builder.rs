//! Query builder - turns request parameters into a boolean search document

use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

use super::BoolQuery;
use crate::error::{QueryError, Result};
use crate::schema::{Definition, LogicOperator, Params};

/// Builds the search document for one request.
///
/// The document is computed on first access and cached; later calls return
/// the same value even if the caller reads it many times.
#[derive(Debug)]
pub struct QueryBuilder {
    definition: Arc<Definition>,
    params: Params,
    query: OnceCell<Value>,
}

impl QueryBuilder {
    /// Bind `params` to `definition`, dropping undeclared parameters
    pub fn new(definition: Arc<Definition>, params: Params) -> Self {
        let params = definition.bind(params);
        QueryBuilder {
            definition,
            params,
            query: OnceCell::new(),
        }
    }

    /// A builder with no parameters; renders `{}`
    pub fn empty(definition: Arc<Definition>) -> Self {
        Self::new(definition, Params::new())
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Bound parameters, as given
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The search document, built on first access
    pub fn query(&self) -> Result<&Value> {
        self.query.get_or_try_init(|| self.build())
    }

    /// Consume the builder, returning the search document
    pub fn into_query(self) -> Result<Value> {
        if let Some(query) = self.query.get() {
            return Ok(query.clone());
        }
        self.build()
    }

    /// Coerce every bound parameter before any clause is rendered, so a
    /// hook always sees the full normalized parameter set.
    pub fn normalize(&self) -> Result<Params> {
        let mut normalized = Params::new();
        for (name, raw) in &self.params {
            let field = self.definition.field(name).ok_or_else(|| {
                QueryError::assembly(format!("parameter '{}' has no declared field", name))
            })?;
            normalized.insert(name.as_str(), field.normalize(raw, name)?);
        }
        Ok(normalized)
    }

    fn build(&self) -> Result<Value> {
        let normalized = self.normalize()?;
        let mut query = BoolQuery::new();
        let mut skipped = 0usize;

        for (name, value) in &normalized {
            let field = self.definition.field(name).ok_or_else(|| {
                QueryError::assembly(format!("parameter '{}' has no declared field", name))
            })?;

            let additional = self.definition.additional_queries(name, &normalized);
            match field.render(value, additional) {
                Some(rendered) => {
                    let bucket = field.bucket(value);
                    log::trace!("parameter '{}' -> {}: {}", name, bucket, rendered);
                    query.push(bucket, rendered)?;
                }
                None => {
                    log::debug!("parameter '{}' produced no clause", name);
                    skipped += 1;
                }
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            let counts: Vec<String> = LogicOperator::ALL
                .iter()
                .map(|op| format!("{}={}", op, query.clauses(*op).len()))
                .collect();
            log::debug!(
                "built query from {} parameter(s), {} skipped ({})",
                normalized.len(),
                skipped,
                counts.join(", ")
            );
        }
        Ok(query.into_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Field, RangeField};
    use crate::schema::{AdditionalQueries, InputType, LookupExpr};
    use serde_json::json;

    fn term_definition() -> Arc<Definition> {
        Arc::new(
            Definition::new()
                .with_field("term_field", Field::term("term_field_test", InputType::Str).unwrap()),
        )
    }

    #[test]
    fn test_single_term() {
        let builder = QueryBuilder::new(term_definition(), Params::new().with("term_field", "1"));

        assert_eq!(
            builder.query().unwrap(),
            &json!({"query": {"bool": {"must": [{"term": {"term_field_test": "1"}}]}}})
        );
    }

    #[test]
    fn test_int_term_coerces_string_input() {
        let definition = Arc::new(
            Definition::new()
                .with_field("term_field", Field::term("term_field_test", InputType::Int).unwrap()),
        );
        let builder = QueryBuilder::new(definition, Params::new().with("term_field", "1"));

        assert_eq!(
            builder.query().unwrap(),
            &json!({"query": {"bool": {"must": [{"term": {"term_field_test": 1}}]}}})
        );
    }

    #[test]
    fn test_exists_false_lands_in_must_not() {
        let definition = Arc::new(
            Definition::new().with_field("exists", Field::exists("exists_test").unwrap()),
        );
        let builder = QueryBuilder::new(definition, Params::new().with("exists", "false"));

        assert_eq!(
            builder.query().unwrap(),
            &json!({"query": {"bool": {"must_not": [{"exists": {"field": "exists_test"}}]}}})
        );
    }

    #[test]
    fn test_terms_from_one_shot_iterator() {
        let definition = Arc::new(Definition::new().with_field("tags", Field::terms("tags").unwrap()));
        let mut params = Params::new();
        params.insert_iter("tags", vec!["b", "a"].into_iter().map(str::to_uppercase));

        let query = QueryBuilder::new(definition, params).into_query().unwrap();
        assert_eq!(
            query["query"]["bool"]["must"],
            json!([{"terms": {"tags": ["B", "A"]}}])
        );
    }

    #[test]
    fn test_no_params_is_empty_document() {
        let builder = QueryBuilder::empty(term_definition());
        assert_eq!(builder.query().unwrap(), &json!({}));
    }

    #[test]
    fn test_unknown_params_are_dropped() {
        let builder = QueryBuilder::new(
            term_definition(),
            Params::new().with("page", 3).with("term_field", "x"),
        );

        assert_eq!(builder.params().len(), 1);
        assert_eq!(
            builder.query().unwrap()["query"]["bool"]["must"],
            json!([{"term": {"term_field_test": "x"}}])
        );
    }

    #[test]
    fn test_query_is_memoized() {
        let builder = QueryBuilder::new(term_definition(), Params::new().with("term_field", "1"));

        let first = builder.query().unwrap();
        let second = builder.query().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_copy_on_write_definition_is_isolated() {
        let mut definition = term_definition();
        let builder = QueryBuilder::new(definition.clone(), Params::new().with("term_field", "1"));

        // Shared with the builder, so make_mut edits a private copy
        Arc::make_mut(&mut definition)
            .field_mut("term_field")
            .unwrap()
            .set_name("renamed")
            .unwrap();

        assert_eq!(
            builder.query().unwrap()["query"]["bool"]["must"],
            json!([{"term": {"term_field_test": "1"}}])
        );
        let renamed = QueryBuilder::new(definition, Params::new().with("term_field", "1"));
        assert_eq!(
            renamed.query().unwrap()["query"]["bool"]["must"],
            json!([{"term": {"renamed": "1"}}])
        );
    }

    #[test]
    fn test_validation_error_names_parameter() {
        let definition = Arc::new(
            Definition::new().with_field("age", Field::term("age", InputType::Int).unwrap()),
        );
        let builder = QueryBuilder::new(definition, Params::new().with("age", "old"));

        let err = builder.query().unwrap_err();
        assert_eq!(err.param(), Some("age"));
        assert!(matches!(err, QueryError::Validation { .. }));
    }

    #[test]
    fn test_exists_routes_on_value() {
        let definition = Arc::new(
            Definition::new()
                .with_field("has_photo", Field::exists("photo").unwrap())
                .with_field("archived", Field::exists("archived_at").unwrap()),
        );
        let params = Params::new().with("has_photo", "true").with("archived", "false");

        let query = QueryBuilder::new(definition, params).into_query().unwrap();

        assert_eq!(
            query,
            json!({
                "query": {
                    "bool": {
                        "must": [{"exists": {"field": "photo"}}],
                        "must_not": [{"exists": {"field": "archived_at"}}]
                    }
                }
            })
        );
    }

    #[test]
    fn test_clauses_follow_param_order_within_bucket() {
        let definition = Arc::new(
            Definition::new()
                .with_field("title", Field::match_field("title", InputType::Str).unwrap())
                .with_field(
                    "min_price",
                    Field::named("price", RangeField::new(InputType::Float, LookupExpr::Gte))
                        .unwrap()
                        .with_logic_operator(LogicOperator::Filter),
                )
                .with_field("tags", Field::terms("tags").unwrap()),
        );
        let params = Params::new()
            .with("tags", json!(["a", "b"]))
            .with("min_price", "10")
            .with("title", "lamp");

        let query = QueryBuilder::new(definition, params).into_query().unwrap();

        let bool_node = query["query"]["bool"].as_object().unwrap();
        let buckets: Vec<&String> = bool_node.keys().collect();
        assert_eq!(buckets, vec!["must", "filter"]);
        assert_eq!(
            bool_node["must"],
            json!([
                {"terms": {"tags": ["a", "b"]}},
                {"match": {"title": {"query": "lamp"}}}
            ])
        );
        assert_eq!(bool_node["filter"], json!([{"range": {"price": {"gte": 10.0}}}]));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let definition = Arc::new(
            Definition::new()
                .with_field("title", Field::match_field("title", InputType::Str).unwrap())
                .with_field("tags", Field::terms("tags").unwrap()),
        );
        let params = Params::new().with("title", "").with("tags", json!([]));

        assert_eq!(QueryBuilder::new(definition, params).into_query().unwrap(), json!({}));
    }

    #[test]
    fn test_additional_hook_sees_normalized_params() {
        let definition = Arc::new(
            Definition::new()
                .with_field("status", Field::term("status", InputType::Str).unwrap())
                .with_field("owner_id", Field::term("owner_id", InputType::Int).unwrap())
                .with_additional("status", |params| {
                    params.get("owner_id").map(|owner| {
                        AdditionalQueries::new().with_clause(json!({"term": {"owner_id": owner}}))
                    })
                }),
        );
        let params = Params::new().with("status", "draft").with("owner_id", "7");

        let query = QueryBuilder::new(definition, params).into_query().unwrap();

        assert_eq!(
            query["query"]["bool"]["must"],
            json!([
                {"bool": {"must": [{"term": {"owner_id": 7}}, {"term": {"status": "draft"}}]}},
                {"term": {"owner_id": 7}}
            ])
        );
    }

    #[test]
    fn test_nested_and_choice_in_one_query() {
        let definition = Arc::new(
            Definition::new()
                .with_field(
                    "reviewer",
                    Field::nested("reviews", Field::term("author", InputType::Str).unwrap()).unwrap(),
                )
                .with_field(
                    "size",
                    Field::choice(
                        vec![json!("s"), json!("m"), json!("l")],
                        Field::term("size", InputType::Str).unwrap(),
                    )
                    .unwrap()
                    .with_logic_operator(LogicOperator::Filter),
                ),
        );
        let params = Params::new().with("reviewer", "ana").with("size", "xl");

        let query = QueryBuilder::new(definition.clone(), params).into_query().unwrap();
        assert_eq!(
            query,
            json!({
                "query": {
                    "bool": {
                        "must": [{
                            "nested": {"path": "reviews", "query": {"term": {"reviews.author": "ana"}}}
                        }]
                    }
                }
            })
        );

        let query = QueryBuilder::new(definition, Params::new().with("size", "m"))
            .into_query()
            .unwrap();
        assert_eq!(query, json!({"query": {"bool": {"filter": [{"term": {"size": "m"}}]}}}));
    }

    #[test]
    fn test_builders_share_definition_across_threads() {
        let definition = term_definition();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let definition = definition.clone();
                std::thread::spawn(move || {
                    let params = Params::new().with("term_field", format!("v{}", i));
                    QueryBuilder::new(definition, params).into_query().unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap()["query"]["bool"]["must"][0],
                json!({"term": {"term_field_test": format!("v{}", i)}})
            );
        }
    }
}
