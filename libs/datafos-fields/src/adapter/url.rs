use super::{
    contains_clause, edit_label, escape_attr, escape_text, parse_text_input, text_search_control,
    EditInput, FieldAdapter,
};
use crate::criteria::{strip_tags, RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::BindValue;

/// Link field. `content` is the URL, `content1` an optional link text.
///
/// `param1` set means "autolink" (the URL itself is the text), `param3` set
/// opens links in a new window.
#[derive(Debug)]
pub struct UrlAdapter;

fn has_scheme(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => url.starts_with("mailto:"),
    }
}

impl FieldAdapter for UrlAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(FieldType::Url)
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let (url, text) = match input {
            EditInput::Stored(content) => (
                content.content_str().to_string(),
                content.content1.clone().unwrap_or_default(),
            ),
            EditInput::Submitted(value) => {
                let values = value.values();
                (
                    values.first().copied().unwrap_or_default().to_string(),
                    values.get(1).copied().unwrap_or_default().to_string(),
                )
            }
            EditInput::Empty => (String::new(), String::new()),
        };
        let mut out = edit_label(field);
        out.push_str(&format!(
            "<input type=\"url\" id=\"field_{id}_0\" name=\"field_{id}_0\" value=\"{}\" size=\"60\" class=\"form-control\" />",
            escape_attr(&url),
            id = field.id,
        ));
        if field.param(1).map_or(true, str::is_empty) {
            out.push_str(&format!(
                "<input type=\"text\" id=\"field_{id}_1\" name=\"field_{id}_1\" value=\"{}\" size=\"60\" class=\"form-control\" />",
                escape_attr(&text),
                id = field.id,
            ));
        }
        Ok(out)
    }

    fn render_browse(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        let Some(content) = content else {
            return String::new();
        };
        let url = content.content_str().trim();
        if url.is_empty() || url == "http://" {
            return String::new();
        }
        let href = if has_scheme(url) {
            url.to_string()
        } else {
            format!("http://{}", url)
        };
        let text = match content.content1.as_deref() {
            Some(text) if !text.trim().is_empty() && field.param(1).map_or(true, str::is_empty) => {
                text.trim()
            }
            _ => url,
        };
        let target = if field.param(3).is_some_and(|v| !v.is_empty()) {
            " target=\"_blank\""
        } else {
            ""
        };
        format!(
            "<a href=\"{}\"{}>{}</a>",
            escape_attr(&href),
            target,
            escape_text(text)
        )
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

    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        let url = strip_tags(submitted.first()).trim().to_string();
        if url.is_empty() || url == "http://" {
            None
        } else {
            Some(url)
        }
    }

    fn format_secondary_content(
        &self,
        field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        if field.param(1).is_some_and(|v| !v.is_empty()) {
            return None;
        }
        let values = submitted.values();
        let text = strip_tags(values.get(1).copied().unwrap_or_default());
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        let mut content = RecordContent::new(
            field.id,
            record_id,
            Some(format!("https://example.org/entry/{}", record_id)),
        );
        content.content1 = Some(field.name.clone());
        content
    }
}
