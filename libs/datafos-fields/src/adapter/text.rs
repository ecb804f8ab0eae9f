use super::{
    contains_clause, edit_label, escape_attr, escape_text, parse_text_input, text_search_control,
    EditInput, FieldAdapter,
};
use crate::criteria::{RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent};
use crate::sql::BindValue;

/// Free text: single-line `text` and multi-line `textarea`.
///
/// `param1` of a text field is the input size; `param2`/`param3` of a
/// textarea are its columns and rows.
#[derive(Debug)]
pub struct TextAdapter {
    multiline: bool,
}

impl TextAdapter {
    pub const fn single_line() -> Self {
        Self { multiline: false }
    }

    pub const fn multi_line() -> Self {
        Self { multiline: true }
    }
}

impl FieldAdapter for TextAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(if self.multiline {
            FieldType::Textarea
        } else {
            FieldType::Text
        })
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let value = input.text();
        let mut out = edit_label(field);
        if self.multiline {
            let cols = field.param(2).and_then(|v| v.parse::<u32>().ok()).unwrap_or(60);
            let rows = field.param(3).and_then(|v| v.parse::<u32>().ok()).unwrap_or(35);
            out.push_str(&format!(
                "<textarea id=\"field_{id}\" name=\"field_{id}\" cols=\"{cols}\" rows=\"{rows}\" class=\"form-control\">{}</textarea>",
                escape_text(&value),
                id = field.id,
                cols = cols,
                rows = rows,
            ));
        } else {
            let size = field.param(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(60);
            out.push_str(&format!(
                "<input type=\"text\" id=\"field_{id}\" name=\"field_{id}\" size=\"{size}\" value=\"{}\" class=\"form-control\" />",
                escape_attr(&value),
                id = field.id,
                size = size,
            ));
        }
        Ok(out)
    }

    fn render_browse(
        &self,
        _field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        let Some(text) = content.and_then(|c| c.content.as_deref()) else {
            return String::new();
        };
        let escaped = escape_text(text);
        if self.multiline {
            escaped.replace("\r\n", "<br />").replace('\n', "<br />")
        } else {
            escaped
        }
    }

    fn render_for_search(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        current: Option<&SearchValue>,
        _used_values: &[String],
    ) -> String {
        text_search_control(field, current)
    }

    fn parse_search_input(
        &self,
        field: &FieldDefinition,
        request: &RequestParams,
        defaults: Option<&SearchValue>,
    ) -> Option<SearchValue> {
        parse_text_input(field, request, defaults)
    }

    fn generate_sql(
        &self,
        field: &FieldDefinition,
        alias: &str,
        value: &SearchValue,
        bind_params: &mut Vec<BindValue>,
    ) -> Option<String> {
        contains_clause(field, alias, &["content"], value, bind_params)
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        let text = if self.multiline {
            format!("{} example text\nline two", field.name)
        } else {
            format!("{} {}", field.name, record_id)
        };
        RecordContent::new(field.id, record_id, Some(text))
    }
}
