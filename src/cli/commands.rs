//! CLI command implementations

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use elastic_query_builder::fields::{Field, FieldKind};
use elastic_query_builder::parser::{load_params_file, parse_param_args};
use elastic_query_builder::schema::{create_default_definition, load_definition, Definition};
use elastic_query_builder::QueryBuilder;

/// Write a sample definition file
pub fn init(path: &Path) -> Result<()> {
    create_default_definition(path)?;

    println!("✓ Created {}", path.display());
    println!("\nEdit the fields, then try: eqb build --definition {} q=lamp", path.display());

    Ok(())
}

/// Outcome of checking definition files
#[derive(Debug, Default)]
pub struct CheckReport {
    pub checked: usize,
    pub failures: Vec<(PathBuf, String)>,
}

/// Validate one definition file, or every YAML file under a directory
pub fn check_definitions(path: &Path) -> Result<CheckReport> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .map_or(false, |ext| ext == "yaml" || ext == "yml")
            })
            .map(|e| e.into_path())
            .collect()
    } else if path.exists() {
        vec![path.to_path_buf()]
    } else {
        anyhow::bail!("No such file or directory: {}", path.display());
    };

    let mut report = CheckReport::default();
    for file in files {
        report.checked += 1;
        if let Err(e) = load_definition(&file) {
            report.failures.push((file, format!("{:#}", e)));
        }
    }

    Ok(report)
}

pub fn check(path: &Path) -> Result<()> {
    println!("Checking definitions: {}", path.display());

    let report = check_definitions(path)?;
    for (file, error) in &report.failures {
        let relative = file.strip_prefix(path).unwrap_or(file);
        let shown = if relative.as_os_str().is_empty() { file.as_path() } else { relative };
        println!("ERROR: {} - {}", shown.display(), error);
    }

    println!();
    if report.failures.is_empty() {
        println!("✓ No issues found in {} file(s).", report.checked);
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} definition file(s) failed validation",
            report.failures.len(),
            report.checked
        )
    }
}

/// One table row per declared parameter
pub fn describe_fields(definition: &Definition) -> Vec<String> {
    definition
        .fields()
        .map(|(param, field)| {
            format!(
                "{:<20} {:<20} {:<30} {}",
                param,
                field.kind().type_name(),
                describe_target(field),
                field.logic_operator()
            )
        })
        .collect()
}

fn describe_target(field: &Field) -> String {
    match field.kind() {
        FieldKind::Choice(choice) => format!("{} (choice)", describe_target(&choice.child)),
        FieldKind::Nested(nested) => format!("{}.{}", nested.path, describe_target(&nested.child)),
        FieldKind::MultiMatch(multi) => multi.fields.join(","),
        FieldKind::Ids => "_id".to_string(),
        _ => field.name().unwrap_or("-").to_string(),
    }
}

/// List declared parameters
pub fn fields(definition_path: &Path) -> Result<()> {
    let definition = load_definition(definition_path)?;

    if definition.is_empty() {
        println!("No fields declared in {}", definition_path.display());
        return Ok(());
    }

    println!("{:<20} {:<20} {:<30} {}", "PARAMETER", "TYPE", "FIELD", "LOGIC");
    for line in describe_fields(&definition) {
        println!("{}", line);
    }

    Ok(())
}

/// Build the query document; arguments override values from the params file
pub fn build_query(
    definition_path: &Path,
    params_file: Option<&Path>,
    args: &[String],
) -> Result<Value> {
    let definition = Arc::new(load_definition(definition_path)?);

    let mut params = match params_file {
        Some(path) => load_params_file(path)?,
        None => Default::default(),
    };
    params.extend(parse_param_args(args)?);

    let builder = QueryBuilder::new(definition, params);
    let query = builder.into_query().context("Failed to build query")?;
    Ok(query)
}

pub fn build(
    definition_path: &Path,
    params_file: Option<&Path>,
    args: &[String],
    pretty: bool,
) -> Result<()> {
    let query = build_query(definition_path, params_file, args)?;

    let output = if pretty {
        serde_json::to_string_pretty(&query)?
    } else {
        serde_json::to_string(&query)?
    };
    println!("{}", output);

    Ok(())
}
