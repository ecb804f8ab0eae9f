//! Data model shared by the adapters, the template renderer and storage.

use serde::{Deserialize, Serialize};

/// Separator used to join the selected options of multi-valued fields.
pub const MULTI_VALUE_SEPARATOR: &str = "##";

/// Number of type-specific parameter slots on a field definition.
pub const PARAM_SLOTS: usize = 10;

/// Known field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Checkbox,
    Multimenu,
    Date,
    Latlong,
    Menu,
    Number,
    Picture,
    Radiobutton,
    Url,
    File,
}

impl FieldType {
    pub const ALL: [FieldType; 12] = [
        Self::Text,
        Self::Textarea,
        Self::Checkbox,
        Self::Multimenu,
        Self::Date,
        Self::Latlong,
        Self::Menu,
        Self::Number,
        Self::Picture,
        Self::Radiobutton,
        Self::Url,
        Self::File,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "checkbox" => Some(Self::Checkbox),
            "multimenu" => Some(Self::Multimenu),
            "date" => Some(Self::Date),
            "latlong" => Some(Self::Latlong),
            "menu" => Some(Self::Menu),
            "number" => Some(Self::Number),
            "picture" => Some(Self::Picture),
            "radiobutton" => Some(Self::Radiobutton),
            "url" => Some(Self::Url),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Multimenu => "multimenu",
            Self::Date => "date",
            Self::Latlong => "latlong",
            Self::Menu => "menu",
            Self::Number => "number",
            Self::Picture => "picture",
            Self::Radiobutton => "radiobutton",
            Self::Url => "url",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured column of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: i64,
    pub form_id: i64,
    /// Raw type tag as stored; may name a type this build does not know.
    pub field_type: String,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub params: [Option<String>; PARAM_SLOTS],
}

impl FieldDefinition {
    pub fn new(form_id: i64, field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            form_id,
            field_type: field_type.into(),
            name: name.into(),
            description: String::new(),
            required: false,
            params: Default::default(),
        }
    }

    pub fn kind(&self) -> Option<FieldType> {
        FieldType::from_tag(&self.field_type)
    }

    /// Parameter slot `n` (1-based, `param1`..`param10`).
    pub fn param(&self, n: usize) -> Option<&str> {
        if n == 0 || n > PARAM_SLOTS {
            return None;
        }
        self.params[n - 1].as_deref()
    }

    pub fn set_param(&mut self, n: usize, value: impl Into<String>) {
        if n == 0 || n > PARAM_SLOTS {
            return;
        }
        self.params[n - 1] = Some(value.into());
    }

    pub fn with_param(mut self, n: usize, value: impl Into<String>) -> Self {
        self.set_param(n, value);
        self
    }

    /// Options of choice fields: one per line of `param1`, trimmed, blanks skipped.
    pub fn options(&self) -> Vec<String> {
        self.param(1)
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One submitted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub form_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub approved: bool,
    pub created_at: i64,
    pub modified_at: i64,
}

/// Stored value of one field for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContent {
    pub id: i64,
    pub field_id: i64,
    pub record_id: i64,
    pub content: Option<String>,
    pub content1: Option<String>,
    pub content2: Option<String>,
    pub content3: Option<String>,
    pub content4: Option<String>,
}

impl RecordContent {
    pub fn new(field_id: i64, record_id: i64, content: Option<String>) -> Self {
        Self {
            field_id,
            record_id,
            content,
            ..Default::default()
        }
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Owner of a record as needed for rendering and sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
}

impl UserSummary {
    pub fn fullname(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

/// A value submitted through an add/edit form for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmittedValue {
    Single(String),
    /// Keyed items of a multi-valued control, in submission order.
    Multiple(Vec<(String, String)>),
}

/// Key of the hidden placeholder item multi-select controls submit for
/// an empty selection.
pub const EMPTY_SELECTION_SENTINEL: &str = "xxx";

impl SubmittedValue {
    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiple(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.into()))
                .collect(),
        )
    }

    /// Submitted values with the empty-selection sentinel removed.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(items) => items
                .iter()
                .filter(|(key, _)| key != EMPTY_SELECTION_SENTINEL)
                .map(|(_, v)| v.as_str())
                .collect(),
        }
    }

    pub fn first(&self) -> &str {
        self.values().first().copied().unwrap_or_default()
    }
}
