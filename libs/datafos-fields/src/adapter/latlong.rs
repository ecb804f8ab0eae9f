//! Geographic coordinates: latitude in `content`, longitude in `content1`.
//!
//! Besides the usual adapter behaviour this module produces KML placemarks
//! for exporting entries to map viewers. `param2` selects the placemark
//! name: a positive value is the id of another field whose content names
//! the entry, `-2` uses the coordinates, anything else `Entry #<id>`.

use super::{
    contains_clause, edit_label, escape_attr, escape_text, parse_text_input, text_search_control,
    EditInput, FieldAdapter,
};
use crate::criteria::{RequestParams, SearchValue};
use crate::error::Result;
use crate::labels::RenderContext;
use crate::model::{FieldDefinition, FieldType, RecordContent, SubmittedValue};
use crate::sql::BindValue;

#[derive(Debug)]
pub struct LatLongAdapter;

/// `param2` value naming placemarks by their coordinates.
pub const NAME_BY_COORDINATES: i64 = -2;

fn coordinates(content: &RecordContent) -> Option<(f64, f64)> {
    let lat = content.content.as_deref()?.trim().parse::<f64>().ok()?;
    let long = content.content1.as_deref()?.trim().parse::<f64>().ok()?;
    Some((lat, long))
}

fn parse_coordinate(raw: &str, limit: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
}

fn format_coordinates(lat: f64, long: f64) -> String {
    format!(
        "{:.4}°{} {:.4}°{}",
        lat.abs(),
        if lat < 0.0 { 'S' } else { 'N' },
        long.abs(),
        if long < 0.0 { 'W' } else { 'E' }
    )
}

impl FieldAdapter for LatLongAdapter {
    fn kind(&self) -> Option<FieldType> {
        Some(FieldType::Latlong)
    }

    fn render_for_edit(
        &self,
        field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        input: EditInput<'_>,
    ) -> Result<String> {
        let (lat, long) = match input {
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
        Ok(format!(
            "{}<input type=\"text\" id=\"field_{id}_0\" name=\"field_{id}_0\" value=\"{}\" size=\"10\" class=\"form-control\" />°N \
             <input type=\"text\" id=\"field_{id}_1\" name=\"field_{id}_1\" value=\"{}\" size=\"10\" class=\"form-control\" />°E",
            edit_label(field),
            escape_attr(&lat),
            escape_attr(&long),
            id = field.id,
        ))
    }

    fn render_browse(
        &self,
        _field: &FieldDefinition,
        _ctx: &RenderContext<'_>,
        content: Option<&RecordContent>,
    ) -> String {
        match content.and_then(coordinates) {
            Some((lat, long)) => format!(
                "<span class=\"latlong\">{}</span>",
                escape_text(&format_coordinates(lat, long))
            ),
            None => String::new(),
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
        contains_clause(field, alias, &["content", "content1"], value, bind_params)
    }

    fn format_stored_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        parse_coordinate(submitted.values().first()?, 90.0).map(|v| v.to_string())
    }

    fn format_secondary_content(
        &self,
        _field: &FieldDefinition,
        submitted: &SubmittedValue,
    ) -> Option<String> {
        parse_coordinate(submitted.values().get(1)?, 180.0).map(|v| v.to_string())
    }

    fn is_value_present(&self, submitted: &SubmittedValue) -> bool {
        let values = submitted.values();
        values.len() >= 2 && values.iter().take(2).all(|v| !v.trim().is_empty())
    }

    fn plain_text(&self, content: &RecordContent) -> String {
        match coordinates(content) {
            Some((lat, long)) => format!("{} {}", lat, long),
            None => String::new(),
        }
    }

    fn supports_preview(&self) -> bool {
        true
    }

    fn preview_content(&self, field: &FieldDefinition, record_id: i64) -> RecordContent {
        let offset = record_id.rem_euclid(10) as f64;
        let mut content = RecordContent::new(field.id, record_id, Some(format!("{}", 51.5 + offset)));
        content.content1 = Some(format!("{}", -0.12 + offset));
        content
    }
}

/// One KML placemark.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Placemark {
    /// Placemark for one record, or `None` when the coordinates are unusable.
    ///
    /// `name_source` is the content of the field `param2` points at, if any.
    pub fn for_record(
        field: &FieldDefinition,
        record_id: i64,
        content: &RecordContent,
        name_source: Option<&RecordContent>,
        description: impl Into<String>,
    ) -> Option<Self> {
        let (latitude, longitude) = coordinates(content)?;
        let selector = field
            .param(2)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let name = match (selector, name_source) {
            (id, Some(source)) if id > 0 && !source.content_str().trim().is_empty() => {
                source.content_str().trim().to_string()
            }
            (NAME_BY_COORDINATES, _) => format!("{}, {}", latitude, longitude),
            _ => format!("Entry #{}", record_id),
        };
        Some(Self {
            name,
            description: description.into(),
            latitude,
            longitude,
        })
    }

    /// Id of the field naming placemarks, when `param2` points at one.
    pub fn name_field_id(field: &FieldDefinition) -> Option<i64> {
        field
            .param(2)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
    }

    fn to_kml(&self) -> String {
        format!(
            "<Placemark><name>{}</name><description><![CDATA[{}]]></description>\
             <Point><coordinates>{},{},0</coordinates></Point></Placemark>",
            escape_text(&self.name),
            self.description.replace("]]>", "]]]]><![CDATA[>"),
            self.longitude,
            self.latitude
        )
    }
}

/// Complete KML document for a set of placemarks.
pub fn kml_document(document_name: &str, placemarks: &[Placemark]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<kml xmlns=\"http://earth.google.com/kml/2.1\">\n<Document>\n",
    );
    out.push_str(&format!("<name>{}</name>\n", escape_text(document_name)));
    for placemark in placemarks {
        out.push_str(&placemark.to_kml());
        out.push('\n');
    }
    out.push_str("</Document>\n</kml>\n");
    out
}
