//! Storage trait for datafos forms, fields, records and content

use async_trait::async_trait;
use datafos_fields::{BindValue, FieldDefinition, Record, RecordContent, UserSummary};

use crate::models::{Form, RecordRow};
use crate::Result;

/// Storage backend for datafos
///
/// Lookups return `Ok(None)` for missing rows; only storage failures are
/// errors. Cascading deletes are atomic.
#[async_trait]
pub trait RecordStore: Send + Sync + Clone {
    /// Create a form with empty templates
    async fn create_form(&self, name: &str, approval: bool) -> Result<Form>;

    async fn get_form(&self, form_id: i64) -> Result<Option<Form>>;

    /// Persist the form's name, approval flag and templates
    async fn update_form(&self, form: &Form) -> Result<()>;

    /// Delete a form with its fields, records, content and tag instances
    ///
    /// # Returns
    /// `false` when no such form exists
    async fn delete_form(&self, form_id: i64) -> Result<bool>;

    /// Insert a field definition
    ///
    /// # Returns
    /// The definition with its assigned id
    async fn insert_field(&self, field: &FieldDefinition) -> Result<FieldDefinition>;

    async fn update_field(&self, field: &FieldDefinition) -> Result<()>;

    async fn get_field(&self, field_id: i64) -> Result<Option<FieldDefinition>>;

    /// Field definitions of a form in creation order
    async fn fields_for_form(&self, form_id: i64) -> Result<Vec<FieldDefinition>>;

    /// Delete a field and every content row stored for it
    ///
    /// When this removes the last field of a form, every record of that
    /// form is purged as well.
    ///
    /// # Returns
    /// Number of records purged
    async fn delete_field(&self, field_id: i64) -> Result<u64>;

    /// Insert a record and an empty content row for each field of its form
    ///
    /// # Returns
    /// The record with its assigned id
    async fn insert_record(&self, record: &Record) -> Result<Record>;

    async fn get_record(&self, record_id: i64) -> Result<Option<Record>>;

    /// Persist approval, group and timestamps of a record
    async fn update_record(&self, record: &Record) -> Result<()>;

    /// Delete a record with its content and tag instances
    ///
    /// # Returns
    /// `false` when no such record exists
    async fn delete_record(&self, record_id: i64) -> Result<bool>;

    /// Delete every record of a form, keeping fields and templates
    ///
    /// # Returns
    /// Number of records deleted
    async fn delete_records_for_form(&self, form_id: i64) -> Result<u64>;

    /// Insert or overwrite the content row of `(field_id, record_id)`
    ///
    /// Concurrent writers to the same pair are last-writer-wins.
    async fn upsert_content(&self, content: &RecordContent) -> Result<()>;

    async fn contents_for_record(&self, record_id: i64) -> Result<Vec<RecordContent>>;

    async fn contents_for_records(&self, record_ids: &[i64]) -> Result<Vec<RecordContent>>;

    /// Distinct non-empty `content` values stored for a field
    async fn used_values(&self, field_id: i64) -> Result<Vec<String>>;

    async fn upsert_user(&self, user: &UserSummary) -> Result<()>;

    async fn get_user(&self, user_id: i64) -> Result<Option<UserSummary>>;

    /// Replace the tags of a record with the given raw names
    async fn set_record_tags(&self, record_id: i64, raw_names: &[String]) -> Result<()>;

    /// Raw tag names of a record, alphabetically
    async fn tags_for_record(&self, record_id: i64) -> Result<Vec<String>>;

    /// Raw names of every tag in use
    async fn all_tags(&self) -> Result<Vec<String>>;

    /// Run a query whose first column is a record id
    async fn query_ids(&self, sql: &str, bind_params: &[BindValue]) -> Result<Vec<i64>>;

    /// Run a presentation query
    ///
    /// The query must select `id, dataid, userid, groupid, approved,
    /// timecreated, timemodified, owner_id, firstname, lastname`.
    async fn query_records(&self, sql: &str, bind_params: &[BindValue]) -> Result<Vec<RecordRow>>;

    /// Run a query returning a single count
    async fn count(&self, sql: &str, bind_params: &[BindValue]) -> Result<i64>;
}
