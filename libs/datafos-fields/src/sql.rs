//! SQL fragment helpers shared by the field adapters and the search engine.
//!
//! Fragments use `$N` placeholders numbered by position in a shared bind
//! list, so clauses produced by different adapters can be combined into one
//! statement.

use serde::{Deserialize, Serialize};

/// Bind values for parameterized queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

pub fn push_text(bind_params: &mut Vec<BindValue>, value: impl Into<String>) -> usize {
    bind_params.push(BindValue::Text(value.into()));
    bind_params.len()
}

pub fn push_int(bind_params: &mut Vec<BindValue>, value: i64) -> usize {
    bind_params.push(BindValue::Int(value));
    bind_params.len()
}

/// Bind `ids` as one JSON array and return the `(...)` operand of an `IN`
/// predicate, so the statement uses a single variable however many ids
/// there are.
///
/// An empty slice yields `(-1)` so the predicate can never match.
pub fn push_id_list(bind_params: &mut Vec<BindValue>, ids: &[i64]) -> String {
    if ids.is_empty() {
        return "(-1)".to_string();
    }
    let array = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    let idx = push_text(bind_params, format!("[{}]", array));
    format!("(SELECT value FROM json_each(${}))", idx)
}

/// Escape SQL LIKE meta-characters so user input is treated literally.
///
/// Patterns built from the result must use `ESCAPE '\'`.
pub fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Join clauses with `AND`/`OR`, parenthesising when more than one.
pub fn join_clauses(mut parts: Vec<String>, operator: &str) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => Some(parts.remove(0)),
        _ => Some(format!("({})", parts.join(&format!(" {} ", operator)))),
    }
}

/// An owned predicate together with its bind values.
///
/// An empty `sql` is the no-op fragment: it constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl SqlFragment {
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.sql.trim().is_empty()
    }
}
