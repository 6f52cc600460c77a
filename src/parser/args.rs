//! Argument parser - parses `name=value` command-line parameters

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::Value;

use crate::schema::Params;

lazy_static::lazy_static! {
    // Matches name=value, value may be empty
    static ref PARAM_ARG_REGEX: Regex = Regex::new(
        r"^([A-Za-z_][\w.\-]*)=(.*)$"
    ).unwrap();
}

/// Parse a list of `name=value` arguments into parameters.
///
/// Later arguments replace earlier ones with the same name, keeping the
/// position of the first occurrence.
pub fn parse_param_args<S: AsRef<str>>(args: &[S]) -> Result<Params> {
    let mut params = Params::new();
    for arg in args {
        let (name, value) = parse_param_arg(arg.as_ref())?;
        params.insert(name, value);
    }
    Ok(params)
}

/// Parse a single `name=value` argument
pub fn parse_param_arg(arg: &str) -> Result<(String, Value)> {
    let caps = match PARAM_ARG_REGEX.captures(arg.trim()) {
        Some(c) => c,
        None => bail!("Invalid parameter '{}', expected name=value", arg),
    };

    let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
    let raw = caps.get(2).map_or("", |m| m.as_str());

    Ok((name, parse_value(raw)?))
}

/// Parse a single value.
///
/// Scalars stay strings, typed later by the field they are bound to. Only
/// `[a, b]` lists and surrounding double quotes are interpreted here.
pub fn parse_value(s: &str) -> Result<Value> {
    let s = s.trim();

    // Array
    if s.starts_with('[') && s.ends_with(']') {
        let inner = &s[1..s.len() - 1];
        return Ok(Value::Array(parse_array_items(inner)?));
    }

    // Quoted string, e.g. to keep a literal leading '['
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return Ok(Value::String(s[1..s.len() - 1].to_string()));
    }

    Ok(Value::String(s.to_string()))
}

/// Parse comma-separated array items, respecting quotes and nested brackets
fn parse_array_items(s: &str) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0i32;
    let mut in_quotes = false;

    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                bracket_depth += 1;
                current.push(c);
            }
            ']' if !in_quotes => {
                bracket_depth -= 1;
                if bracket_depth < 0 {
                    bail!("Unbalanced brackets in array: [{}]", s);
                }
                current.push(c);
            }
            ',' if !in_quotes && bracket_depth == 0 => {
                push_item(&mut items, &current)?;
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes || bracket_depth != 0 {
        bail!("Unterminated array item in: [{}]", s);
    }

    push_item(&mut items, &current)?;

    Ok(items)
}

/// Blank items, as in `[a, , b]` or `[]`, are skipped
fn push_item(items: &mut Vec<Value>, raw: &str) -> Result<()> {
    if !raw.trim().is_empty() {
        items.push(parse_value(raw)?);
    }
    Ok(())
}
