// crates/conduit-core/src/reference.rs
// ============================================================================
// Module: Reference Substitution
// Description: Parses and resolves `$input.*` and `$steps.<id>.output.<path>` references.
// Purpose: Give the Task Extractor (reference discovery) and the Agent Invoker
//          (reference substitution) one shared implementation of the traversal rule.
// Dependencies: serde_json, crate::ids
// ============================================================================

//! ## Overview
//! The design note this module fixes: reference resolution is a path walk
//! that must (a) recurse into nested objects and arrays, not just the
//! top-level `inputs` object, and (b) treat the literal segment `output` in
//! `$steps.<id>.output.<rest>` as a traversal marker to skip, never as a
//! field name to look up. Both [`find_references`] and [`substitute`] share
//! [`parse_reference`] so the two can never disagree about what counts as a
//! reference.

use serde_json::Value;

use crate::ids::TaskId;

/// A parsed `$input.*` or `$steps.<id>.output.<path>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `$input.<path>`, resolved against the Run's input bag.
    Input {
        /// Path segments after `input`.
        path: Vec<String>,
    },
    /// `$steps.<id>.output.<path>`, resolved against a prior task's output value.
    Step {
        /// Identifier of the producing task.
        task_id: TaskId,
        /// Path segments after the literal `output` marker.
        path: Vec<String>,
    },
}

/// Parses a string as a reference. Returns `None` when `raw` is not one of
/// the two recognized forms (in which case it is a literal value).
#[must_use]
pub fn parse_reference(raw: &str) -> Option<Reference> {
    let rest = raw.strip_prefix('$')?;
    let mut parts = rest.split('.');
    match parts.next()? {
        "input" => Some(Reference::Input { path: parts.map(str::to_string).collect() }),
        "steps" => {
            let task_id = parts.next()?;
            if parts.next()? != "output" {
                return None;
            }
            Some(Reference::Step {
                task_id: TaskId::new(task_id),
                path: parts.map(str::to_string).collect(),
            })
        }
        _ => None,
    }
}

/// Walks `value` recursively (through objects and arrays) and calls `visit`
/// for every string scalar that parses as a reference.
pub fn find_references(value: &Value, visit: &mut impl FnMut(Reference)) {
    match value {
        Value::String(raw) => {
            if let Some(reference) = parse_reference(raw) {
                visit(reference);
            }
        }
        Value::Array(items) => {
            for item in items {
                find_references(item, visit);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                find_references(item, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Looks up a dotted path inside a JSON value, treating numeric segments as
/// array indices and everything else as object keys.
#[must_use]
pub fn get_path<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Substitutes every reference found in `value` using `resolve`, returning a
/// new value with the same shape but references replaced by their resolved
/// value. A string that is not a reference passes through unchanged; an
/// unresolvable reference yields `Err` with the raw path for the caller to
/// report as `reference_unresolved`.
///
/// # Errors
///
/// Returns the list of unresolved reference descriptions when one or more
/// references could not be resolved.
pub fn substitute(
    value: &Value,
    resolve: &impl Fn(&Reference) -> Option<Value>,
) -> Result<Value, Vec<String>> {
    let mut unresolved = Vec::new();
    let result = substitute_inner(value, resolve, &mut unresolved);
    if unresolved.is_empty() { Ok(result) } else { Err(unresolved) }
}

fn substitute_inner(
    value: &Value,
    resolve: &impl Fn(&Reference) -> Option<Value>,
    unresolved: &mut Vec<String>,
) -> Value {
    match value {
        Value::String(raw) => match parse_reference(raw) {
            Some(reference) => match resolve(&reference) {
                Some(resolved) => resolved,
                None => {
                    unresolved.push(raw.clone());
                    Value::Null
                }
            },
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items.iter().map(|item| substitute_inner(item, resolve, unresolved)).collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), substitute_inner(item, resolve, unresolved)))
                .collect(),
        ),
        other => other.clone(),
    }
}
