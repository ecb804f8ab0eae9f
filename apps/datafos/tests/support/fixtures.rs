use datafos::db::RecordStore;
use datafos::Form;
use datafos_fields::{FieldDefinition, Record, SubmittedValue, UserSummary};

use super::builders::FieldBuilder;
use super::TestApp;

/// Common test constants
pub mod constants {
    pub const COLOURS: [&str; 3] = ["Red", "Green", "Blue"];
    pub const ALICE: i64 = 10;
    pub const BOB: i64 = 11;
    pub const CAROL: i64 = 12;
}

/// A form with a text field and a multi-select colour field.
pub struct ColourForm {
    pub form: Form,
    pub name: FieldDefinition,
    pub tags: FieldDefinition,
}

pub async fn colour_form(app: &TestApp) -> anyhow::Result<ColourForm> {
    let form = app.manager.create_form("Paint samples", false).await?;
    let name = app
        .manager
        .create_field(FieldBuilder::new(form.id, "text", "Name").build())
        .await?;
    let tags = app
        .manager
        .create_field(
            FieldBuilder::new(form.id, "multimenu", "Tags")
                .options(&constants::COLOURS)
                .build(),
        )
        .await?;
    let form = app.manager.form(form.id).await?;
    Ok(ColourForm { form, name, tags })
}

pub async fn add_user(app: &TestApp, id: i64, firstname: &str, lastname: &str) -> anyhow::Result<()> {
    app.store()
        .upsert_user(&UserSummary {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
        })
        .await?;
    Ok(())
}

/// Alice Zimmer, Bob Young and Carol Xu.
pub async fn add_users(app: &TestApp) -> anyhow::Result<()> {
    add_user(app, constants::ALICE, "Alice", "Zimmer").await?;
    add_user(app, constants::BOB, "Bob", "Young").await?;
    add_user(app, constants::CAROL, "Carol", "Xu").await?;
    Ok(())
}

/// Create a record and store each value without submission validation.
pub async fn add_entry(
    app: &TestApp,
    form_id: i64,
    user_id: i64,
    values: &[(i64, SubmittedValue)],
) -> anyhow::Result<Record> {
    let record = app.manager.add_record(form_id, user_id, 0).await?;
    for (field_id, value) in values {
        app.manager.update_content(record.id, *field_id, value).await?;
    }
    Ok(app.manager.record(record.id).await?)
}

/// Entry of a [`ColourForm`] with a name and a colour selection.
pub async fn add_colour_entry(
    app: &TestApp,
    colour_form: &ColourForm,
    user_id: i64,
    name: &str,
    colours: &[&str],
) -> anyhow::Result<Record> {
    add_entry(
        app,
        colour_form.form.id,
        user_id,
        &[
            (colour_form.name.id, SubmittedValue::Single(name.to_string())),
            (
                colour_form.tags.id,
                SubmittedValue::multiple(colours.iter().copied()),
            ),
        ],
    )
    .await
}

/// Overwrite a record's modification time.
pub async fn set_modified(app: &TestApp, record_id: i64, modified_at: i64) -> anyhow::Result<()> {
    let mut record = app.manager.record(record_id).await?;
    record.modified_at = modified_at;
    app.store().update_record(&record).await?;
    Ok(())
}
