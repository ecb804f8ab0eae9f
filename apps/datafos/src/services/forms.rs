use super::FormManager;
use crate::db::RecordStore;
use crate::models::Form;
use crate::{Error, Result};

impl<S: RecordStore> FormManager<S> {
    pub async fn create_form(&self, name: &str, approval: bool) -> Result<Form> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Form name must not be empty".into()));
        }
        let form = self.store.create_form(name, approval).await?;
        tracing::info!(form_id = form.id, name = %form.name, approval, "Form created");
        Ok(form)
    }

    pub async fn form(&self, form_id: i64) -> Result<Form> {
        self.store
            .get_form(form_id)
            .await?
            .ok_or(Error::FormNotFound(form_id))
    }

    /// Delete a form together with its fields, records and content.
    pub async fn delete_form(&self, form_id: i64) -> Result<()> {
        if !self.store.delete_form(form_id).await? {
            return Err(Error::FormNotFound(form_id));
        }
        tracing::info!(form_id, "Form deleted");
        Ok(())
    }

    /// Delete every record of a form, keeping its fields and templates.
    pub async fn reset_records(&self, form_id: i64) -> Result<u64> {
        self.form(form_id).await?;
        let deleted = self.store.delete_records_for_form(form_id).await?;
        tracing::info!(form_id, deleted, "Form records reset");
        Ok(deleted)
    }
}
