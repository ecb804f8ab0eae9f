//! Field design: creation, changes and removal, with template upkeep.

use datafos_fields::{field_adapter, FieldDefinition, MULTI_VALUE_SEPARATOR};
use datafos_template::{append_field_tokens, rename_field_tokens, TemplateKind};

use super::FormManager;
use crate::db::RecordStore;
use crate::{Error, Result};

impl<S: RecordStore> FormManager<S> {
    /// Field definitions of a form in creation order.
    pub async fn fields(&self, form_id: i64) -> Result<Vec<FieldDefinition>> {
        self.store.fields_for_form(form_id).await
    }

    pub async fn field(&self, field_id: i64) -> Result<FieldDefinition> {
        self.store
            .get_field(field_id)
            .await?
            .ok_or(Error::FieldNotFound(field_id))
    }

    /// Check a definition against its adapter and the other fields of the form.
    async fn check_field_design(&self, field: &FieldDefinition) -> Result<()> {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Field name must not be empty".into()));
        }
        if name.contains(MULTI_VALUE_SEPARATOR) || name.contains("[[") || name.contains("]]") {
            return Err(Error::Validation(format!(
                "Field name \"{}\" must not contain \"{}\", \"[[\" or \"]]\"",
                name, MULTI_VALUE_SEPARATOR
            )));
        }

        field_adapter(field).validate_config(field)?;

        let taken = self
            .store
            .fields_for_form(field.form_id)
            .await?
            .iter()
            .any(|other| other.id != field.id && other.name.trim().eq_ignore_ascii_case(name));
        if taken {
            return Err(datafos_fields::Error::DuplicateFieldName(name.to_string()).into());
        }
        Ok(())
    }

    /// Add a field to a form.
    ///
    /// Single, add and RSS templates that list their fields explicitly get
    /// a block for the new field appended.
    pub async fn create_field(&self, field: FieldDefinition) -> Result<FieldDefinition> {
        let mut form = self.form(field.form_id).await?;
        let mut field = field;
        field.id = 0;
        field.name = field.name.trim().to_string();
        self.check_field_design(&field).await?;

        let field = self.store.insert_field(&field).await?;

        let mut changed = false;
        for kind in TemplateKind::APPEND_TARGETS {
            if let Some(updated) = append_field_tokens(form.template(kind), &field.name) {
                form.set_template(kind, updated);
                changed = true;
            }
        }
        if changed {
            self.store.update_form(&form).await?;
        }

        tracing::info!(
            form_id = field.form_id,
            field_id = field.id,
            field_type = %field.field_type,
            name = %field.name,
            "Field created"
        );
        Ok(field)
    }

    /// Change a field; a rename rewrites its tokens in every template.
    pub async fn update_field(&self, field: FieldDefinition) -> Result<FieldDefinition> {
        let existing = self.field(field.id).await?;
        let mut field = field;
        field.form_id = existing.form_id;
        field.name = field.name.trim().to_string();
        self.check_field_design(&field).await?;

        self.store.update_field(&field).await?;

        if existing.name != field.name {
            let mut form = self.form(field.form_id).await?;
            for kind in TemplateKind::ALL {
                let rewritten = rename_field_tokens(form.template(kind), &existing.name, Some(&field.name));
                form.set_template(kind, rewritten);
            }
            self.store.update_form(&form).await?;
            tracing::info!(
                field_id = field.id,
                old_name = %existing.name,
                new_name = %field.name,
                "Field renamed"
            );
        }
        Ok(field)
    }

    /// Delete a field, its content and its template tokens.
    ///
    /// Returns the number of records purged because the form has no fields left.
    pub async fn delete_field(&self, field_id: i64) -> Result<u64> {
        let field = self.field(field_id).await?;
        let purged = self.store.delete_field(field_id).await?;

        if let Some(mut form) = self.store.get_form(field.form_id).await? {
            for kind in TemplateKind::ALL {
                let stripped = rename_field_tokens(form.template(kind), &field.name, None);
                form.set_template(kind, stripped);
            }
            self.store.update_form(&form).await?;
        }

        if purged > 0 {
            tracing::warn!(form_id = field.form_id, purged, "Last field deleted, records purged");
        }
        tracing::info!(form_id = field.form_id, field_id, name = %field.name, "Field deleted");
        Ok(purged)
    }
}
