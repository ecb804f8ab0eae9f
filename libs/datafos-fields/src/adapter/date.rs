use chrono::{DateTime, NaiveDate, Utc};

use super::{edit_label, escape_attr, search_label, EditInput, FieldAdapter};
use crate::criteria::{RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::{push_int, BindValue};

/// Calendar date stored as unix seconds (UTC midnight).
#[derive(Debug)]
pub struct DateAdapter;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse unix seconds or `YYYY-MM-DD` into unix seconds.
///
/// Seconds outside the range chrono can represent are rejected.
pub fn parse_date(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(seconds) = input.parse::<i64>() {
        return to_datetime(seconds).map(|_| seconds);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

fn to_datetime(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

fn iso_date(seconds: i64) -> String {
    to_datetime(seconds)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl DateAdapter {
    fn bound(
        field: &FieldDefinition,
        request: &RequestParams,
        suffix: &str,
        default: Option<i64>,
    ) -> Option<i64> {
        match request.first(&format!("f_{}_{}", field.id, suffix)) {
            Some(raw) => parse_date(raw),
            None => default,
        }
    }
}

impl FieldAdapter for DateAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(FieldType::Date)
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let value = parse_date(&input.text()).map(iso_date).unwrap_or_default();
        Ok(format!(
            "{}<input type=\"date\" id=\"field_{id}\" name=\"field_{id}\" value=\"{}\" class=\"form-control\" />",
            edit_label(field),
            escape_attr(&value),
            id = field.id,
        ))
    }

    fn render_browse(
        &self,
        _field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        content
            .and_then(|c| c.content.as_deref())
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(to_datetime)
            .map(|dt| dt.format("%-d %B %Y").to_string())
            .unwrap_or_default()
    }

    fn render_for_search(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        current: Option<&SearchValue>,
        _used_values: &[String],
    ) -> String {
        let (from, to) = match current {
            Some(SearchValue::DateRange { from, to }) => (*from, *to),
            _ => (None, None),
        };
        format!(
            "{label}<input type=\"date\" id=\"f_{id}\" name=\"f_{id}_from\" value=\"{}\" class=\"form-control\" /> \
             <input type=\"date\" name=\"f_{id}_to\" value=\"{}\" class=\"form-control\" />",
            from.map(iso_date).unwrap_or_default(),
            to.map(iso_date).unwrap_or_default(),
            label = search_label(field),
            id = field.id,
        )
    }

    fn parse_search_input(
        &self,
        field: &FieldDefinition,
        request: &RequestParams,
        defaults: Option<&SearchValue>,
    ) -> Option<SearchValue> {
        let (default_from, default_to) = match defaults {
            Some(SearchValue::DateRange { from, to }) => (*from, *to),
            _ => (None, None),
        };
        let from = Self::bound(field, request, "from", default_from);
        let to = Self::bound(field, request, "to", default_to);
        if from.is_none() && to.is_none() {
            None
        } else {
            Some(SearchValue::DateRange { from, to })
        }
    }

    fn generate_sql(
        &self,
        field: &FieldDefinition,
        alias: &str,
        value: &SearchValue,
        bind_params: &mut Vec<BindValue>,
    ) -> Option<String> {
        let SearchValue::DateRange { from, to } = value else {
            return None;
        };
        let mut parts = vec![format!("{}.fieldid = {}", alias, field.id)];
        if let Some(from) = from {
            let idx = push_int(bind_params, *from);
            parts.push(format!("CAST({}.content AS INTEGER) >= ${}", alias, idx));
        }
        if let Some(to) = to {
            // The upper bound covers the whole day.
            let idx = push_int(bind_params, to.saturating_add(SECONDS_PER_DAY - 1));
            parts.push(format!("CAST({}.content AS INTEGER) <= ${}", alias, idx));
        }
        if parts.len() == 1 {
            return None;
        }
        Some(format!("({})", parts.join(" AND ")))
    }

    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        parse_date(submitted.first()).map(|seconds| seconds.to_string())
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        // 2024-01-01 plus one day per record.
        let seconds = 1_704_067_200 + record_id.rem_euclid(365) * SECONDS_PER_DAY;
        RecordContent::new(field.id, record_id, Some(seconds.to_string()))
    }

    fn sort_expression(&self, column: &str) -> String {
        format!("CAST({} AS INTEGER)", column)
    }
}
