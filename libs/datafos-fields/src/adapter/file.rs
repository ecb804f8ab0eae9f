use super::{
    contains_clause, edit_label, escape_attr, escape_text, parse_text_input, text_search_control,
    EditInput, FieldAdapter,
};
use crate::criteria::{strip_tags, RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::BindValue;

/// Placeholder the host replaces with the real file-serving URL.
pub const PLUGINFILE_PLACEHOLDER: &str = "@@PLUGINFILE@@";

/// Uploaded `file` or `picture`. Only the file name is stored here; the
/// blob itself lives in the host's file storage. Pictures keep their alt
/// text in `content1`.
#[derive(Debug)]
pub struct FileAdapter {
    picture: bool,
}

impl FileAdapter {
    pub const fn file() -> Self {
        Self { picture: false }
    }

    pub const fn picture() -> Self {
        Self { picture: true }
    }
}

fn file_url(record_id: i64, name: &str) -> String {
    let encoded: String = name
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '"' => "%22".to_string(),
            '#' => "%23".to_string(),
            '?' => "%3F".to_string(),
            c => c.to_string(),
        })
        .collect();
    format!("{}/{}/{}", PLUGINFILE_PLACEHOLDER, record_id, encoded)
}

impl FieldAdapter for FileAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(if self.picture {
            FieldType::Picture
        } else {
            FieldType::File
        })
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let current = input.text();
        let accept = if self.picture { " accept=\"image/*\"" } else { "" };
        let mut out = edit_label(field);
        if !current.is_empty() {
            out.push_str(&format!(
                "<span class=\"currentfile\">{}</span>",
                escape_text(&current)
            ));
        }
        out.push_str(&format!(
            "<input type=\"file\" id=\"field_{id}_file\" name=\"field_{id}_file\"{} />",
            accept,
            id = field.id
        ));
        if self.picture {
            let alt = match input {
                EditInput::Stored(content) => content.content1.clone().unwrap_or_default(),
                _ => String::new(),
            };
            out.push_str(&format!(
                "<input type=\"text\" id=\"field_{id}_alttext\" name=\"field_{id}_alttext\" value=\"{}\" class=\"form-control\" />",
                escape_attr(&alt),
                id = field.id
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
        let Some(content) = content else {
            return String::new();
        };
        let name = content.content_str().trim();
        if name.is_empty() {
            return String::new();
        }
        let url = file_url(content.record_id, name);
        if self.picture {
            let alt = content
                .content1
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or(name);
            format!(
                "<img src=\"{}\" alt=\"{}\" class=\"list_picture\" />",
                escape_attr(&url),
                escape_attr(alt)
            )
        } else {
            format!(
                "<a href=\"{}\">{}</a>",
                escape_attr(&url),
                escape_text(name)
            )
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

    fn format_secondary_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        if !self.picture {
            return None;
        }
        let alt = strip_tags(submitted.values().get(1).copied().unwrap_or_default());
        let alt = alt.trim();
        (!alt.is_empty()).then(|| alt.to_string())
    }
}
