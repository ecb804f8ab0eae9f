//! Field type adapters.
//!
//! Each adapter encapsulates one field type's behaviour: edit and browse
//! markup, the advanced-search control, search input parsing, the SQL
//! predicate for a parsed criterion, stored-content formatting and preview
//! fabrication. Adapters are stateless; the field definition is passed in.

use crate::criteria::{RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::{escape_like_pattern, push_text, BindValue, SqlFragment};

mod choice;
mod date;
mod file;
pub mod latlong;
mod multi;
mod number;
mod text;
mod unknown;
mod url;

pub use choice::SingleChoiceAdapter;
pub use date::{parse_date, DateAdapter};
pub use file::{FileAdapter, PLUGINFILE_PLACEHOLDER};
pub use latlong::LatLongAdapter;
pub use multi::{join_selection, split_selection, MultiChoiceAdapter};
pub use number::NumberAdapter;
pub use text::TextAdapter;
pub use unknown::UnknownAdapter;
pub use url::UrlAdapter;

/// What an edit control is pre-filled with.
#[derive(Debug, Clone, Copy)]
pub enum EditInput<'a> {
    Empty,
    Stored(&'a RecordContent),
    Submitted(&'a SubmittedValue),
}

impl<'a> EditInput<'a> {
    /// A submitted draft wins over stored content.
    pub fn from_parts(
        stored: Option<&'a RecordContent>,
        submitted: Option<&'a SubmittedValue>,
    ) -> Self {
        match (submitted, stored) {
            (Some(value), _) => Self::Submitted(value),
            (None, Some(content)) => Self::Stored(content),
            (None, None) => Self::Empty,
        }
    }

    /// Single text value of the input.
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Stored(content) => content.content_str().to_string(),
            Self::Submitted(value) => value.first().to_string(),
        }
    }
}

/// Behaviour of one field type.
pub trait FieldAdapter: Send + Sync {
    /// Field type handled, `None` for the unknown adapter.
    fn kind(&self) -> Option<FieldType>;

    /// Input control for the add/edit form.
    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String>;

    /// Read-only display of stored content.
    fn render_browse(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String;

    /// Advanced-search control, or an empty string when there is nothing to offer.
    ///
    /// `used_values` holds the distinct stored `content` strings of this
    /// field; it is only consulted when [`needs_used_values`](Self::needs_used_values).
    fn render_for_search(
        &self,
        _field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        _current: Option<&SearchValue>,
        _used_values: &[String],
    ) -> String {
        String::new()
    }

    /// Parse submitted search input; `None` means no constraint.
    fn parse_search_input(
        &self,
        _field: &FieldDefinition,
        _request: &RequestParams,
        _defaults: Option<&SearchValue>,
    ) -> Option<SearchValue> {
        None
    }

    /// Predicate over the content table aliased `alias`; `None` is a no-op.
    fn generate_sql(
        &self,
        _field: &FieldDefinition,
        _alias: &str,
        _value: &SearchValue,
        _bind_params: &mut Vec<BindValue>,
    ) -> Option<String> {
        None
    }

    /// Value to store in `content`; `None` clears the column.
    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        let cleaned = crate::criteria::strip_tags(submitted.first());
        if cleaned.trim().is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    /// Value to store in `content1`, for types that use a second column.
    fn format_secondary_content(
        &self,
        _field: &FieldDefinition,
        _submitted: &SubmittedValue,
    ) -> Option<String> {
        None
    }

    /// Whether the user supplied anything for this field.
    fn is_value_present(&self, submitted: &SubmittedValue) -> bool {
        submitted.values().iter().any(|v| !v.trim().is_empty())
    }

    /// Plain-text projection of stored content.
    fn plain_text(&self, content: &RecordContent) -> String {
        trim_plain(content.content_str())
    }

    fn supports_preview(&self) -> bool {
        false
    }

    /// Example content for preset previews. Never touches storage.
    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        no_preview_content(field, record_id)
    }

    /// Check a field definition before it is saved.
    fn validate_config(&self, _field: &FieldDefinition) -> Result<()> {
        Ok(())
    }

    /// Content column used for sorting.
    fn sort_column(&self) -> &'static str {
        "content"
    }

    /// Expression used as `sortorder` for the given column reference.
    fn sort_expression(&self, column: &str) -> String {
        column.to_string()
    }

    /// Whether [`render_for_search`](Self::render_for_search) needs the stored values.
    fn needs_used_values(&self) -> bool {
        false
    }
}

/// Owned `(sql, params)` predicate for one criterion.
pub fn generate_search_sql(
    adapter: &dyn FieldAdapter,
    field: &FieldDefinition,
    alias: &str,
    value: &SearchValue,
) -> SqlFragment {
    let mut params = Vec::new();
    match adapter.generate_sql(field, alias, value, &mut params) {
        Some(sql) => SqlFragment { sql, params },
        None => SqlFragment::noop(),
    }
}

pub(crate) fn no_preview_content(field: &FieldDefinition, record_id: i64) -> RecordContent {
    let message = format!("No preview available for {}", field.name);
    RecordContent {
        id: 0,
        field_id: field.id,
        record_id,
        content: Some(format!(
            "<span class=\"nopreview\">{}</span>",
            escape_text(&message)
        )),
        ..Default::default()
    }
}

pub(crate) fn trim_plain(s: &str) -> String {
    s.trim_matches(|c| c == '\r' || c == '\n' || c == ' ')
        .to_string()
}

pub(crate) fn escape_attr(s: &str) -> String {
    html_escape::encode_quoted_attribute(s).into_owned()
}

pub(crate) fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Accessible label shared by the edit controls.
pub(crate) fn edit_label(field: &FieldDefinition) -> String {
    let mut out = format!(
        "<label for=\"field_{}\"><span class=\"accesshide\">{}</span>",
        field.id,
        escape_text(&field.name)
    );
    if field.required {
        out.push_str("<div class=\"inline-req\" title=\"Required\">*</div>");
    }
    out.push_str("</label>");
    out
}

pub(crate) fn search_label(field: &FieldDefinition) -> String {
    format!(
        "<label class=\"accesshide\" for=\"f_{}\">{}</label>",
        field.id,
        escape_text(&field.name)
    )
}

/// Plain text search box named `f_<id>`.
pub(crate) fn text_search_control(field: &FieldDefinition, current: Option<&SearchValue>) -> String {
    let value = match current {
        Some(SearchValue::Text(v)) => v.as_str(),
        _ => "",
    };
    format!(
        "{}<input type=\"text\" size=\"16\" id=\"f_{id}\" name=\"f_{id}\" value=\"{}\" class=\"form-control\" />",
        search_label(field),
        escape_attr(value),
        id = field.id,
    )
}

/// Request value `f_<id>` or the previous default, tags stripped.
pub(crate) fn parse_text_input(
    field: &FieldDefinition,
    request: &RequestParams,
    defaults: Option<&SearchValue>,
) -> Option<SearchValue> {
    let name = format!("f_{}", field.id);
    let raw = match request.first(&name) {
        Some(v) => v.to_string(),
        None => match defaults {
            Some(SearchValue::Text(v)) => v.clone(),
            _ => return None,
        },
    };
    let value = crate::criteria::strip_tags(&raw).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(SearchValue::Text(value))
    }
}

/// Case-insensitive substring match on one or more content columns.
pub(crate) fn contains_clause(
    field: &FieldDefinition,
    alias: &str,
    columns: &[&str],
    value: &SearchValue,
    bind_params: &mut Vec<BindValue>,
) -> Option<String> {
    let SearchValue::Text(text) = value else {
        return None;
    };
    if text.is_empty() {
        return None;
    }
    let idx = push_text(bind_params, format!("%{}%", escape_like_pattern(text)));
    let matches: Vec<String> = columns
        .iter()
        .map(|column| {
            format!(
                "LOWER({alias}.{column}) LIKE LOWER(${idx}) ESCAPE '\\'",
                alias = alias,
                column = column,
                idx = idx
            )
        })
        .collect();
    let matches = if matches.len() == 1 {
        matches.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", matches.join(" OR "))
    };
    Some(format!(
        "({alias}.fieldid = {id} AND {matches})",
        alias = alias,
        id = field.id,
        matches = matches
    ))
}

/// Exact equality on the content column.
pub(crate) fn equals_clause(
    field: &FieldDefinition,
    alias: &str,
    value: &SearchValue,
    bind_params: &mut Vec<BindValue>,
) -> Option<String> {
    let SearchValue::Text(text) = value else {
        return None;
    };
    if text.is_empty() {
        return None;
    }
    let idx = push_text(bind_params, text.clone());
    Some(format!(
        "({alias}.fieldid = {id} AND {alias}.content = ${idx})",
        alias = alias,
        id = field.id,
        idx = idx
    ))
}
