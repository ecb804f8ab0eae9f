use super::{edit_label, equals_clause, escape_attr, escape_text, search_label, EditInput, FieldAdapter};
use crate::criteria::{strip_tags, RequestParams, SearchValue};
use crate::error::{Error, Result};
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue, MULTI_VALUE_SEPARATOR};
use crate::sql::BindValue;

/// Single choice from the `param1` option list: `menu` or `radiobutton`.
#[derive(Debug)]
pub struct SingleChoiceAdapter {
    radio: bool,
}

impl SingleChoiceAdapter {
    pub const fn menu() -> Self {
        Self { radio: false }
    }

    pub const fn radio() -> Self {
        Self { radio: true }
    }
}

pub(crate) fn validate_options(field: &FieldDefinition) -> Result<()> {
    let options = field.options();
    if options.is_empty() {
        return Err(Error::InvalidFieldConfig {
            name: field.name.clone(),
            reason: "at least one option is required".to_string(),
        });
    }
    if let Some(bad) = options.iter().find(|o| o.contains(MULTI_VALUE_SEPARATOR)) {
        return Err(Error::InvalidFieldConfig {
            name: field.name.clone(),
            reason: format!("option {:?} contains the reserved sequence {}", bad, MULTI_VALUE_SEPARATOR),
        });
    }
    Ok(())
}

impl FieldAdapter for SingleChoiceAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(if self.radio {
            FieldType::Radiobutton
        } else {
            FieldType::Menu
        })
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let current = input.text();
        let current = current.trim();
        let mut out = edit_label(field);
        if self.radio {
            out.push_str(&format!("<fieldset id=\"field_{}\" class=\"radiogroup\">", field.id));
            for (i, option) in field.options().iter().enumerate() {
                let checked = if option == current { " checked=\"checked\"" } else { "" };
                out.push_str(&format!(
                    "<input type=\"radio\" id=\"field_{id}_{i}\" name=\"field_{id}\" value=\"{}\"{} />\
                     <label for=\"field_{id}_{i}\">{}</label><br />",
                    escape_attr(option),
                    checked,
                    escape_text(&ctx.label(field, option)),
                    id = field.id,
                    i = i,
                ));
            }
            out.push_str("</fieldset>");
        } else {
            out.push_str(&format!(
                "<select id=\"field_{id}\" name=\"field_{id}\" class=\"custom-select\"><option value=\"\">Choose...</option>",
                id = field.id
            ));
            for option in field.options() {
                let selected = if option == current { " selected=\"selected\"" } else { "" };
                out.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>",
                    escape_attr(&option),
                    selected,
                    escape_text(&ctx.label(field, &option))
                ));
            }
            out.push_str("</select>");
        }
        Ok(out)
    }

    fn render_browse(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        match content.and_then(|c| c.content.as_deref()) {
            Some(value) if !value.is_empty() => escape_text(&ctx.label(field, value)),
            _ => String::new(),
        }
    }

    fn render_for_search(
        &self,
        field: &FieldDefinition,
        ctx: &RenderContext<'_>,
        current: Option<&SearchValue>,
        _used_values: &[String],
    ) -> String {
        let options = field.options();
        if options.is_empty() {
            return String::new();
        }
        let current = match current {
            Some(SearchValue::Text(v)) => v.as_str(),
            _ => "",
        };
        let mut out = search_label(field);
        out.push_str(&format!(
            "<select id=\"f_{id}\" name=\"f_{id}\" class=\"custom-select\"><option value=\"\">Choose...</option>",
            id = field.id
        ));
        for option in &options {
            let selected = if option == current { " selected=\"selected\"" } else { "" };
            out.push_str(&format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_attr(option),
                selected,
                escape_text(&ctx.label(field, option))
            ));
        }
        out.push_str("</select>");
        out
    }

    fn parse_search_input(
        &self,
        field: &FieldDefinition,
        request: &RequestParams,
        defaults: Option<&SearchValue>,
    ) -> Option<SearchValue> {
        let raw = match request.first(&format!("f_{}", field.id)) {
            Some(v) => v.trim().to_string(),
            None => match defaults {
                Some(SearchValue::Text(v)) => v.clone(),
                _ => return None,
            },
        };
        (!raw.is_empty()).then_some(SearchValue::Text(raw))
    }

    fn generate_sql(
        &self,
        field: &FieldDefinition,
        alias: &str,
        value: &SearchValue,
        bind_params: &mut Vec<BindValue>,
    ) -> Option<String> {
        equals_clause(field, alias, value, bind_params)
    }

    fn format_stored_content(
        &self,
        field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        let value = strip_tags(submitted.first()).trim().to_string();
        field.options().into_iter().find(|option| *option == value)
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        let options = field.options();
        let value = if options.is_empty() {
            None
        } else {
            let index = record_id.rem_euclid(options.len() as i64) as usize;
            Some(options[index].clone())
        };
        RecordContent::new(field.id, record_id, value)
    }

    fn validate_config(&self, field: &FieldDefinition) -> Result<()> {
        validate_options(field)
    }
}
