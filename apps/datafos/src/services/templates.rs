//! Template storage and rendering.

use std::collections::HashMap;

use datafos_fields::{field_adapter, CriteriaMap, FieldDefinition, Record, RecordContent, SubmittedValue};
use datafos_template::{
    default_template, duplicate_tokens, render_entry_template, render_search_template, EntryMode,
    EntryView, SearchView, TemplateKind,
};

use super::{now, FormManager};
use crate::db::RecordStore;
use crate::models::{Form, RecordRow};
use crate::Result;

/// Stored template, or the default one when none has been written.
fn effective_template(form: &Form, kind: TemplateKind, fields: &[FieldDefinition]) -> String {
    let template = form.template(kind);
    if template.trim().is_empty() {
        default_template(kind, fields)
    } else {
        template.to_string()
    }
}

impl<S: RecordStore> FormManager<S> {
    /// Save a template.
    ///
    /// Returns one notification per field whose value token is repeated;
    /// the template is saved regardless.
    pub async fn save_template(&self, form_id: i64, kind: TemplateKind, template: &str) -> Result<Vec<String>> {
        let mut form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;

        let notifications: Vec<String> = duplicate_tokens(template, &fields)
            .into_iter()
            .map(|name| format!("Field \"{}\" appears more than once in the {} template", name, kind))
            .collect();

        form.set_template(kind, template);
        self.store.update_form(&form).await?;

        tracing::info!(form_id, template = %kind, duplicates = notifications.len(), "Template saved");
        Ok(notifications)
    }

    /// Replace a template with the default for the current fields.
    pub async fn reset_template(&self, form_id: i64, kind: TemplateKind) -> Result<String> {
        let mut form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;
        let template = default_template(kind, &fields);

        form.set_template(kind, template.clone());
        self.store.update_form(&form).await?;

        tracing::info!(form_id, template = %kind, "Template reset to default");
        Ok(template)
    }

    async fn render_stored_entry(
        &self,
        template: &str,
        fields: &[FieldDefinition],
        row: &RecordRow,
        contents: &[RecordContent],
        mode: EntryMode<'_>,
    ) -> Result<String> {
        let tags = self.store.tags_for_record(row.record.id).await?;
        let view = EntryView {
            fields,
            record: Some(&row.record),
            owner: row.owner.as_ref(),
            contents,
            tags: &tags,
        };
        Ok(render_entry_template(template, &view, mode, &self.render_context())?)
    }

    /// Render records with the list template, one after another.
    pub async fn render_list(&self, form_id: i64, rows: &[RecordRow]) -> Result<String> {
        let form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;
        let template = effective_template(&form, TemplateKind::List, &fields);

        let ids: Vec<i64> = rows.iter().map(|row| row.record.id).collect();
        let mut by_record: HashMap<i64, Vec<RecordContent>> = HashMap::new();
        for content in self.store.contents_for_records(&ids).await? {
            by_record.entry(content.record_id).or_default().push(content);
        }

        let mut out = String::new();
        for row in rows {
            let contents = by_record.get(&row.record.id).map(Vec::as_slice).unwrap_or(&[]);
            out.push_str(
                &self
                    .render_stored_entry(&template, &fields, row, contents, EntryMode::Browse)
                    .await?,
            );
        }
        Ok(out)
    }

    /// Render one record with the single template.
    pub async fn render_single(&self, record_id: i64) -> Result<String> {
        let record = self.record(record_id).await?;
        let form = self.form(record.form_id).await?;
        let fields = self.fields(record.form_id).await?;
        let template = effective_template(&form, TemplateKind::Single, &fields);

        let row = RecordRow {
            owner: self.store.get_user(record.user_id).await?,
            record,
        };
        let contents = self.store.contents_for_record(record_id).await?;
        self.render_stored_entry(&template, &fields, &row, &contents, EntryMode::Browse)
            .await
    }

    /// Render the advanced search form pre-filled with `criteria`.
    pub async fn render_search_form(&self, form_id: i64, criteria: &CriteriaMap) -> Result<String> {
        let form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;
        let template = effective_template(&form, TemplateKind::AdvancedSearch, &fields);

        let mut used_values = HashMap::new();
        for field in &fields {
            if field_adapter(field).needs_used_values() {
                used_values.insert(field.id, self.store.used_values(field.id).await?);
            }
        }
        let available_tags = self.store.all_tags().await?;

        let view = SearchView {
            fields: &fields,
            criteria,
            used_values: &used_values,
            available_tags: &available_tags,
        };
        Ok(render_search_template(&template, &view, &self.render_context()))
    }

    /// Render the add/edit form.
    ///
    /// Controls show the submitted draft when there is one, otherwise the
    /// stored content of `record_id`, otherwise nothing.
    pub async fn render_add_form(
        &self,
        form_id: i64,
        record_id: Option<i64>,
        submitted: &HashMap<i64, SubmittedValue>,
    ) -> Result<String> {
        let form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;
        let template = effective_template(&form, TemplateKind::AddEntry, &fields);
        let mode = EntryMode::Edit { submitted };

        match record_id {
            Some(record_id) => {
                let record = self.record(record_id).await?;
                let row = RecordRow {
                    owner: self.store.get_user(record.user_id).await?,
                    record,
                };
                let contents = self.store.contents_for_record(record_id).await?;
                self.render_stored_entry(&template, &fields, &row, &contents, mode).await
            }
            None => {
                let view = EntryView {
                    fields: &fields,
                    record: None,
                    owner: None,
                    contents: &[],
                    tags: &[],
                };
                Ok(render_entry_template(&template, &view, mode, &self.render_context())?)
            }
        }
    }

    /// Render a template with fabricated example content; nothing is read
    /// from stored records.
    pub async fn render_preview(&self, form_id: i64, kind: TemplateKind, record_id: i64) -> Result<String> {
        let form = self.form(form_id).await?;
        let fields = self.fields(form_id).await?;
        let template = effective_template(&form, kind, &fields);
        let ctx = self.render_context();

        match kind {
            TemplateKind::AdvancedSearch => {
                let view = SearchView {
                    fields: &fields,
                    criteria: &CriteriaMap::new(),
                    used_values: &HashMap::new(),
                    available_tags: &[],
                };
                Ok(render_search_template(&template, &view, &ctx))
            }
            TemplateKind::AddEntry => {
                let view = EntryView {
                    fields: &fields,
                    record: None,
                    owner: None,
                    contents: &[],
                    tags: &[],
                };
                let submitted = HashMap::new();
                Ok(render_entry_template(&template, &view, EntryMode::Edit { submitted: &submitted }, &ctx)?)
            }
            TemplateKind::List | TemplateKind::Single | TemplateKind::Rss => {
                let timestamp = now();
                let record = Record {
                    id: record_id,
                    form_id,
                    user_id: 0,
                    group_id: 0,
                    approved: true,
                    created_at: timestamp,
                    modified_at: timestamp,
                };
                let view = EntryView {
                    fields: &fields,
                    record: Some(&record),
                    owner: None,
                    contents: &[],
                    tags: &[],
                };
                Ok(render_entry_template(&template, &view, EntryMode::Preview, &ctx)?)
            }
        }
    }
}
