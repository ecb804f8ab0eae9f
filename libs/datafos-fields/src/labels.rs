//! Locale-specific option labels and the context threaded through rendering.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::FieldDefinition;

type LabelTable = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// Translated labels: `field name -> option value -> locale -> label`.
///
/// Stored option values are never translated; only their display is.
/// Keys are matched case-insensitively, since configuration sources
/// lowercase table keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LabelTable", into = "LabelTable")]
pub struct OptionLabels {
    fields: LabelTable,
}

impl From<LabelTable> for OptionLabels {
    fn from(table: LabelTable) -> Self {
        let mut labels = Self::new();
        for (field_name, options) in table {
            for (option, locales) in options {
                for (locale, label) in locales {
                    labels.insert(field_name.as_str(), option.as_str(), locale, label);
                }
            }
        }
        labels
    }
}

impl From<OptionLabels> for LabelTable {
    fn from(labels: OptionLabels) -> Self {
        labels.fields
    }
}

fn fold(key: &str) -> String {
    key.trim().to_lowercase()
}

impl OptionLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field_name: impl AsRef<str>,
        option: impl AsRef<str>,
        locale: impl AsRef<str>,
        label: impl Into<String>,
    ) {
        self.fields
            .entry(fold(field_name.as_ref()))
            .or_default()
            .entry(fold(option.as_ref()))
            .or_default()
            .insert(fold(locale.as_ref()), label.into());
    }

    pub fn lookup(&self, field_name: &str, option: &str, locale: &str) -> Option<&str> {
        self.fields
            .get(&fold(field_name))?
            .get(&fold(option))?
            .get(&fold(locale))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-call rendering inputs that used to come from ambient session state.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub locale: &'a str,
    pub labels: &'a OptionLabels,
}

impl<'a> RenderContext<'a> {
    pub fn new(locale: &'a str, labels: &'a OptionLabels) -> Self {
        Self { locale, labels }
    }

    /// Display label of `option`, falling back to the option itself.
    pub fn label<'o>(&self, field: &FieldDefinition, option: &'o str) -> Cow<'o, str> {
        match self.labels.lookup(&field.name, option, self.locale) {
            Some(label) => Cow::Owned(label.to_string()),
            None => Cow::Borrowed(option),
        }
    }
}
