use crate::backend::{BackendError, Query, Result};
use crate::models::DocumentList;
use serde_json::Value;
use std::cmp::Ordering;

/// Page size the hosted service applies when a listing carries no limit.
pub const DEFAULT_LIMIT: usize = 25;

/// Insertion counter stamped on every stored document; breaks ordering ties.
pub const SEQUENCE: &str = "$sequence";

/// Evaluate `queries` against `documents` the way the remote database does:
/// filters first, then ordering, then cursor and limit. `total` counts every
/// document that passed the filters.
pub fn apply(mut documents: Vec<Value>, queries: &[Query]) -> Result<DocumentList<Value>> {
    let mut orders: Vec<(&str, bool)> = Vec::new();
    let mut limit = DEFAULT_LIMIT;
    let mut cursor = None;

    for query in queries {
        match query {
            Query::Equal(attribute, values) => {
                documents.retain(|doc| doc.get(attribute).is_some_and(|v| equals_any(v, values)))
            }
            Query::Search(attribute, term) => {
                documents.retain(|doc| doc.get(attribute).is_some_and(|v| contains_terms(v, term)))
            }
            Query::OrderDesc(attribute) => orders.push((attribute.as_str(), true)),
            Query::OrderAsc(attribute) => orders.push((attribute.as_str(), false)),
            Query::Limit(n) => limit = *n,
            Query::CursorAfter(id) => cursor = Some(id.as_str()),
        }
    }

    let tie_desc = orders.first().is_some_and(|(_, desc)| *desc);
    documents.sort_by(|a, b| {
        orders
            .iter()
            .map(|(attribute, desc)| {
                let ordering = compare(a.get(*attribute), b.get(*attribute));
                if *desc { ordering.reverse() } else { ordering }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| {
                let ordering = compare(a.get(SEQUENCE), b.get(SEQUENCE));
                if tie_desc { ordering.reverse() } else { ordering }
            })
    });

    let total = documents.len() as u64;
    let start = match cursor {
        Some(id) => documents
            .iter()
            .position(|doc| doc.get("$id").and_then(Value::as_str) == Some(id))
            .map(|index| index + 1)
            .ok_or_else(|| {
                BackendError::BadRequest(format!(
                    "Document '{id}' for the 'cursor' value not found."
                ))
            })?,
        None => 0,
    };

    Ok(DocumentList {
        total,
        documents: documents.into_iter().skip(start).take(limit).collect(),
    })
}

fn equals_any(value: &Value, values: &[String]) -> bool {
    match value {
        Value::String(s) => values.iter().any(|v| v == s),
        Value::Number(n) => values.contains(&n.to_string()),
        Value::Bool(b) => values.contains(&b.to_string()),
        // Expanded relationship
        Value::Object(map) => map.get("$id").is_some_and(|id| equals_any(id, values)),
        Value::Array(items) => items.iter().any(|item| equals_any(item, values)),
        Value::Null => false,
    }
}

fn contains_terms(value: &Value, term: &str) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    let text = text.to_lowercase();
    term.split_whitespace()
        .all(|word| text.contains(&word.to_lowercase()))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
