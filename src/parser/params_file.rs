//! Parameter files - JSON or YAML mappings of request parameters

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::schema::Params;

/// Load parameters from a `.json`, `.yaml` or `.yml` file.
///
/// Files with any other extension are tried as JSON first, then YAML.
pub fn load_params_file(path: &Path) -> Result<Params> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read params file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let params = match extension.as_deref() {
        Some("json") => parse_json_params(&contents),
        Some("yaml") | Some("yml") => parse_yaml_params(&contents),
        _ => parse_json_params(&contents).or_else(|_| parse_yaml_params(&contents)),
    }
    .with_context(|| format!("Failed to parse params file: {}", path.display()))?;

    Ok(params)
}

pub fn parse_json_params(contents: &str) -> Result<Params> {
    let value: Value = serde_json::from_str(contents)?;
    into_params(value)
}

pub fn parse_yaml_params(contents: &str) -> Result<Params> {
    let value: Value = serde_yaml::from_str(contents)?;
    into_params(value)
}

fn into_params(value: Value) -> Result<Params> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(Params::new()),
        other => anyhow::bail!("expected a mapping of parameters, got {}", other),
    }
}
