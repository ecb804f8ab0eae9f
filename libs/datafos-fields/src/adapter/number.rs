use super::{
    edit_label, equals_clause, escape_attr, escape_text, parse_text_input, text_search_control,
    EditInput, FieldAdapter,
};
use crate::criteria::{RequestParams, SearchValue};
use crate::error::{Error, Result};
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::BindValue;

/// Numeric field; `param1` is the number of decimals shown when browsing.
#[derive(Debug)]
pub struct NumberAdapter;

fn decimals(field: &FieldDefinition) -> Option<usize> {
    field
        .param(1)
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse::<usize>().ok())
}

impl FieldAdapter for NumberAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(FieldType::Number)
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        Ok(format!(
            "{}<input type=\"number\" step=\"any\" id=\"field_{id}\" name=\"field_{id}\" value=\"{}\" class=\"form-control\" />",
            edit_label(field),
            escape_attr(&input.text()),
            id = field.id,
        ))
    }

    fn render_browse(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        let Some(raw) = content.and_then(|c| c.content.as_deref()) else {
            return String::new();
        };
        let raw = raw.trim();
        match (decimals(field), raw.parse::<f64>()) {
            (Some(places), Ok(number)) => format!("{:.*}", places, number),
            _ => escape_text(raw),
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
        equals_clause(field, alias, value, bind_params)
    }

    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        let raw = submitted.first().trim();
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|_| raw.to_string())
    }

    fn is_value_present(&self, submitted: &SubmittedValue) -> bool {
        !submitted.first().trim().is_empty()
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        RecordContent::new(field.id, record_id, Some(record_id.to_string()))
    }

    fn validate_config(&self, field: &FieldDefinition) -> Result<()> {
        match field.param(1).map(str::trim) {
            Some(v) if !v.is_empty() && v.parse::<usize>().is_err() => Err(Error::InvalidFieldConfig {
                name: field.name.clone(),
                reason: format!("decimals must be a whole number, got {:?}", v),
            }),
            _ => Ok(()),
        }
    }

    fn sort_expression(&self, column: &str) -> String {
        format!("CAST({} AS REAL)", column)
    }
}
