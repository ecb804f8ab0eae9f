//! KML export of latlong fields.

use datafos_fields::{kml_document, FieldType, Placemark};

use super::FormManager;
use crate::db::RecordStore;
use crate::models::RecordFilter;
use crate::{Error, Result};

impl<S: RecordStore> FormManager<S> {
    /// KML document with one placemark per record that has usable coordinates.
    ///
    /// With `record_id` only that record is exported.
    pub async fn export_kml(&self, form_id: i64, field_id: i64, record_id: Option<i64>) -> Result<String> {
        let form = self.form(form_id).await?;
        let field = self.field(field_id).await?;
        if field.form_id != form_id {
            return Err(Error::FieldNotFound(field_id));
        }
        if field.kind() != Some(FieldType::Latlong) {
            return Err(Error::Validation(format!(
                "Field \"{}\" is not a latlong field",
                field.name
            )));
        }

        let record_ids = match record_id {
            Some(id) => {
                let record = self.record(id).await?;
                if record.form_id != form_id {
                    return Err(Error::RecordNotFound(id));
                }
                vec![id]
            }
            None => self.engine.candidate_ids(form_id, &RecordFilter::all()).await?,
        };

        let name_field = Placemark::name_field_id(&field);
        let contents = self.store.contents_for_records(&record_ids).await?;
        let mut placemarks = Vec::new();
        for record_id in &record_ids {
            let Some(content) = contents
                .iter()
                .find(|c| c.record_id == *record_id && c.field_id == field.id)
            else {
                continue;
            };
            let name_source = name_field.and_then(|name_field| {
                contents
                    .iter()
                    .find(|c| c.record_id == *record_id && c.field_id == name_field)
            });
            let description = format!("Item #{} in {}", record_id, form.name);
            if let Some(placemark) = Placemark::for_record(&field, *record_id, content, name_source, description) {
                placemarks.push(placemark);
            }
        }

        tracing::debug!(form_id, field_id, placemarks = placemarks.len(), "KML exported");
        Ok(kml_document(&form.name, &placemarks))
    }
}
