//! Entries: creation, content updates, submissions, approval and tags.

use std::collections::{BTreeMap, HashMap};

use datafos_fields::{field_adapter, FieldType, Record, RecordContent, SubmittedValue};
use serde::Serialize;

use super::{now, FormManager};
use crate::db::RecordStore;
use crate::{Error, Result};

/// Outcome of validating an add/edit submission.
///
/// Validation problems are reported here rather than as errors so the caller
/// can redisplay the form with inline messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub general_notifications: Vec<String>,
    /// Messages keyed by field name.
    pub field_notifications: BTreeMap<String, Vec<String>>,
    pub validated: bool,
}

impl SubmissionResult {
    fn notify_field(&mut self, field_name: &str, message: impl Into<String>) {
        self.field_notifications
            .entry(field_name.to_string())
            .or_default()
            .push(message.into());
    }
}

impl<S: RecordStore> FormManager<S> {
    pub async fn record(&self, record_id: i64) -> Result<Record> {
        self.store
            .get_record(record_id)
            .await?
            .ok_or(Error::RecordNotFound(record_id))
    }

    /// Create an empty entry owned by `user_id`.
    ///
    /// Entries of forms that require approval start unapproved.
    pub async fn add_record(&self, form_id: i64, user_id: i64, group_id: i64) -> Result<Record> {
        let form = self.form(form_id).await?;
        let timestamp = now();
        let record = self
            .store
            .insert_record(&Record {
                id: 0,
                form_id,
                user_id,
                group_id,
                approved: !form.approval,
                created_at: timestamp,
                modified_at: timestamp,
            })
            .await?;
        tracing::info!(form_id, record_id = record.id, user_id, "Record added");
        Ok(record)
    }

    /// Store one submitted value. Nothing left after formatting clears the content.
    pub async fn update_content(
        &self,
        record_id: i64,
        field_id: i64,
        submitted: &SubmittedValue,
    ) -> Result<RecordContent> {
        let mut record = self.record(record_id).await?;
        let field = self.field(field_id).await?;
        if field.form_id != record.form_id {
            return Err(Error::Validation(format!(
                "Field {} does not belong to the form of record {}",
                field_id, record_id
            )));
        }

        let adapter = field_adapter(&field);
        let mut content = RecordContent::new(field_id, record_id, adapter.format_stored_content(&field, submitted));
        content.content1 = adapter.format_secondary_content(&field, submitted);
        self.store.upsert_content(&content).await?;

        record.modified_at = now();
        self.store.update_record(&record).await?;

        tracing::debug!(record_id, field_id, stored = content.content.is_some(), "Content updated");
        Ok(content)
    }

    /// Validate a submission without storing anything.
    pub async fn process_submission(
        &self,
        form_id: i64,
        submitted: &HashMap<i64, SubmittedValue>,
    ) -> Result<SubmissionResult> {
        let fields = self.fields(form_id).await?;
        let mut result = SubmissionResult::default();
        let mut any_present = false;

        for field in &fields {
            let adapter = field_adapter(field);
            let value = submitted.get(&field.id);
            let present = value.map(|v| adapter.is_value_present(v)).unwrap_or(false);
            any_present |= present;

            if field.required && !present {
                result.notify_field(&field.name, "You must supply a value here.");
                continue;
            }

            let needs_parse = matches!(
                field.kind(),
                Some(FieldType::Number | FieldType::Date | FieldType::Latlong)
            );
            if let Some(value) = value.filter(|_| present && needs_parse) {
                if adapter.format_stored_content(field, value).is_none() {
                    result.notify_field(&field.name, "The value is not valid.");
                }
            }
        }

        if !any_present {
            result
                .general_notifications
                .push("You did not fill out any fields!".to_string());
        }

        result.validated = result.general_notifications.is_empty() && result.field_notifications.is_empty();
        if !result.validated {
            tracing::debug!(
                form_id,
                general = result.general_notifications.len(),
                fields = result.field_notifications.len(),
                "Submission rejected"
            );
        }
        Ok(result)
    }

    /// Validate and store a submission, creating the record when `record_id` is `None`.
    ///
    /// The record is returned only when the submission validated.
    pub async fn save_submission(
        &self,
        form_id: i64,
        user_id: i64,
        record_id: Option<i64>,
        submitted: &HashMap<i64, SubmittedValue>,
    ) -> Result<(SubmissionResult, Option<Record>)> {
        let result = self.process_submission(form_id, submitted).await?;
        if !result.validated {
            return Ok((result, None));
        }

        let record = match record_id {
            Some(id) => {
                let record = self.record(id).await?;
                if record.form_id != form_id {
                    return Err(Error::RecordNotFound(id));
                }
                record
            }
            None => self.add_record(form_id, user_id, 0).await?,
        };

        for field in self.fields(form_id).await? {
            if let Some(value) = submitted.get(&field.id) {
                self.update_content(record.id, field.id, value).await?;
            }
        }

        let record = self.record(record.id).await?;
        Ok((result, Some(record)))
    }

    pub async fn delete_record(&self, record_id: i64) -> Result<()> {
        if !self.store.delete_record(record_id).await? {
            return Err(Error::RecordNotFound(record_id));
        }
        tracing::info!(record_id, "Record deleted");
        Ok(())
    }

    pub async fn approve_record(&self, record_id: i64, approved: bool) -> Result<Record> {
        let mut record = self.record(record_id).await?;
        record.approved = approved;
        self.store.update_record(&record).await?;
        tracing::info!(record_id, approved, "Record approval changed");
        Ok(record)
    }

    /// Replace the tags of a record.
    pub async fn tag_record(&self, record_id: i64, tags: &[String]) -> Result<()> {
        self.record(record_id).await?;
        self.store.set_record_tags(record_id, tags).await
    }
}
