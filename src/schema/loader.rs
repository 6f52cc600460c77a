//! Definition loader - parses builder definition files

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

use super::{AdditionalQueries, Definition};
use crate::fields::Field;

/// On-disk shape of a definition file
#[derive(Debug, Default, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    fields: IndexMap<String, Field>,

    /// Static extra clauses, keyed by parameter name
    #[serde(default)]
    additional_queries: IndexMap<String, AdditionalQueries>,
}

/// Parse a definition from YAML text
pub fn parse_definition(contents: &str) -> Result<Definition> {
    let file: DefinitionFile = serde_yaml::from_str(contents)?;

    let mut definition = Definition::new();
    for (param, field) in file.fields {
        definition.insert_field(param, field);
    }

    for (param, additional) in file.additional_queries {
        if definition.field(&param).is_none() {
            anyhow::bail!("additional_queries entry '{}' has no matching field", param);
        }
        definition = definition.with_static_additional(param, additional);
    }

    definition.validate()?;
    Ok(definition)
}

/// Load a definition from a YAML file
pub fn load_definition(path: &Path) -> Result<Definition> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read definition file: {}", path.display()))?;

    let definition = parse_definition(&contents)
        .with_context(|| format!("Failed to load definition file: {}", path.display()))?;

    log::debug!(
        "loaded {} field(s) from {}",
        definition.len(),
        path.display()
    );
    Ok(definition)
}

/// Write a sample definition file
pub fn create_default_definition(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Definition file already exists: {}", path.display());
    }

    let default_definition = r#"# Query builder definition
# Each entry under `fields` maps a request parameter to a search field.
#
# Common keys:
#   type:  match | match_bool_prefix | match_phrase | match_phrase_prefix |
#          multi_match | query_string | term | terms | range | exists | ids |
#          choice | nested
#   field: document field the clause targets
#   logic: must (default) | filter | should | must_not

fields:
  q:
    type: multi_match
    query_type: best_fields
    fields: [title, description]
    operator: and

  title:
    type: match
    field: title
    input_type: str
    fuzziness: AUTO

  status:
    type: choice
    choices: [draft, published]
    child:
      type: term
      field: status
      input_type: str
    logic: filter

  tags:
    type: terms
    field: tags
    logic: filter

  min_price:
    type: range
    field: price
    input_type: float
    lookup_expr: gte
    logic: filter

  has_image:
    type: exists
    field: image

  reviewer:
    type: nested
    path: reviews
    child:
      type: term
      field: author
      input_type: str

# Extra clauses AND-ed with a parameter's own clause
# additional_queries:
#   title:
#     clauses:
#       - term: { visible: true }
#   reviewer:
#     nested:
#       reviews:
#         - range: { reviews.stars: { gte: 4 } }
"#;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    std::fs::write(path, default_definition)
        .with_context(|| format!("Failed to write definition file: {}", path.display()))?;

    Ok(())
}
