//! Search criteria and the raw request values they are parsed from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key of one criterion: a field id or one of the reserved pseudo-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionKey {
    Field(i64),
    TimeModified,
    FirstName,
    LastName,
    Approved,
    Tags,
}

impl CriterionKey {
    pub const TIME_MODIFIED: i64 = 0;
    pub const FIRST_NAME: i64 = -1;
    pub const LAST_NAME: i64 = -2;
    pub const APPROVED: i64 = -3;
    pub const TAGS: i64 = -5;

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            Self::TIME_MODIFIED => Some(Self::TimeModified),
            Self::FIRST_NAME => Some(Self::FirstName),
            Self::LAST_NAME => Some(Self::LastName),
            Self::APPROVED => Some(Self::Approved),
            Self::TAGS => Some(Self::Tags),
            id if id > 0 => Some(Self::Field(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Field(id) => *id,
            Self::TimeModified => Self::TIME_MODIFIED,
            Self::FirstName => Self::FIRST_NAME,
            Self::LastName => Self::LAST_NAME,
            Self::Approved => Self::APPROVED,
            Self::Tags => Self::TAGS,
        }
    }
}

/// Parsed search value of a field criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchValue {
    /// Free text or a single exact option.
    Text(String),
    /// Options of a multi-valued field.
    Selection {
        selected: Vec<String>,
        all_required: bool,
    },
    /// Inclusive bounds in unix seconds.
    DateRange { from: Option<i64>, to: Option<i64> },
}

/// One constraint of an advanced search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchCriterion {
    Field(SearchValue),
    TimeModified(i64),
    FirstName(String),
    LastName(String),
    Approved(bool),
    Tags(Vec<String>),
}

/// Criteria keyed by field or pseudo-field, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaMap {
    entries: Vec<(CriterionKey, SearchCriterion)>,
}

impl CriteriaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: CriterionKey, criterion: SearchCriterion) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = criterion;
        } else {
            self.entries.push((key, criterion));
        }
    }

    pub fn with(mut self, key: CriterionKey, criterion: SearchCriterion) -> Self {
        self.insert(key, criterion);
        self
    }

    pub fn get(&self, key: CriterionKey) -> Option<&SearchCriterion> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| c)
    }

    /// Parsed value of a field criterion, if any.
    pub fn field_value(&self, field_id: i64) -> Option<&SearchValue> {
        match self.get(CriterionKey::Field(field_id)) {
            Some(SearchCriterion::Field(value)) => Some(value),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: CriterionKey) -> Option<SearchCriterion> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CriterionKey, &SearchCriterion)> {
        self.entries.iter().map(|(k, c)| (k, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw request parameters (`name -> values`), as decoded by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: HashMap<String, Vec<String>>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `name=value` pairs; `name[]` style names collect into one list.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key.as_ref(), value);
        }
        params
    }

    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        let name = name.strip_suffix("[]").unwrap_or(name);
        self.values
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Boolean parameter: `1`, `true`, `on`, `yes` are true.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.first(name).map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        })
    }
}

/// Remove markup from user input, keeping the text between tags.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
