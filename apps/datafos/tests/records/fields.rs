use crate::support::constants::*;
use crate::support::*;
use datafos::db::RecordStore;
use datafos::Error;
use datafos_template::TemplateKind;

#[tokio::test]
async fn field_names_are_unique_per_form() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;

            let err = app
                .manager
                .create_field(FieldBuilder::new(colours.form.id, "textarea", " name ").build())
                .await
                .expect_err("duplicate name");
            assert!(matches!(
                err,
                Error::Field(datafos_fields::Error::DuplicateFieldName(ref name)) if name == "name"
            ));

            // Another form may reuse the name.
            let other = app.manager.create_form("Other", false).await?;
            app.manager
                .create_field(FieldBuilder::new(other.id, "text", "Name").build())
                .await?;

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn field_design_is_validated() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let form = app.manager.create_form("Checks", false).await?;

            for bad in ["", "A##B", "[[Name]]"] {
                let err = app
                    .manager
                    .create_field(FieldBuilder::new(form.id, "text", bad).build())
                    .await
                    .expect_err("invalid name");
                assert!(matches!(err, Error::Validation(_)), "{:?}: {:?}", bad, err);
            }

            let err = app
                .manager
                .create_field(
                    FieldBuilder::new(form.id, "menu", "Sizes")
                        .options(&["Small", "Medium##Large"])
                        .build(),
                )
                .await
                .expect_err("separator in options");
            assert!(matches!(
                err,
                Error::Field(datafos_fields::Error::InvalidFieldConfig { .. })
            ));

            assert!(app.manager.fields(form.id).await?.is_empty());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn new_fields_are_appended_to_listing_templates() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let form_id = colours.form.id;
            app.manager
                .save_template(form_id, TemplateKind::Single, "<p>[[Name]]</p>")
                .await?;
            app.manager
                .save_template(form_id, TemplateKind::List, "<li>[[Name]]</li>")
                .await?;
            app.manager
                .save_template(form_id, TemplateKind::Rss, "<p>[[Name]]</p>##otherfields##")
                .await?;

            app.manager
                .create_field(FieldBuilder::new(form_id, "textarea", "Notes").build())
                .await?;

            let form = app.manager.form(form_id).await?;
            assert_contains_in_order(&form.single_template, &["<p>[[Name]]</p>", "[[Notes#name]]", "[[Notes]]"]);
            assert_eq!(form.list_template, "<li>[[Name]]</li>");
            assert_eq!(form.rss_template, "<p>[[Name]]</p>##otherfields##");
            assert_eq!(form.add_template, "", "empty templates keep using the default");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn renaming_rewrites_every_token_form() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let form_id = colours.form.id;
            app.manager
                .save_template(
                    form_id,
                    TemplateKind::Single,
                    "[[Name#name]]: [[Name]] ([[name#ID]]) [[Tags]]",
                )
                .await?;
            app.manager
                .save_template(form_id, TemplateKind::AdvancedSearch, "[[Name]] [[Tags]]")
                .await?;

            let mut renamed = colours.name.clone();
            renamed.name = "Title".to_string();
            app.manager.update_field(renamed).await?;

            let form = app.manager.form(form_id).await?;
            assert_eq!(form.single_template, "[[Title#name]]: [[Title]] ([[Title#id]]) [[Tags]]");
            assert_eq!(form.asearch_template, "[[Title]] [[Tags]]");
            assert_eq!(app.manager.field(colours.name.id).await?.name, "Title");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_a_field_strips_its_tokens_and_content() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let form_id = colours.form.id;
            let record = add_colour_entry(app, &colours, ALICE, "Kept", &["Red"]).await?;
            app.manager
                .save_template(form_id, TemplateKind::Single, "<p>[[Name]]</p><p>[[Tags#name]] [[Tags]]</p>")
                .await?;

            let purged = app.manager.delete_field(colours.tags.id).await?;
            assert_eq!(purged, 0);

            let form = app.manager.form(form_id).await?;
            assert_eq!(form.single_template, "<p>[[Name]]</p><p> </p>");
            assert!(matches!(
                app.manager.field(colours.tags.id).await,
                Err(Error::FieldNotFound(_))
            ));

            let contents = app.store().contents_for_record(record.id).await?;
            assert_eq!(contents.len(), 1);
            assert_eq!(contents[0].field_id, colours.name.id);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_the_last_field_purges_entries() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let first = add_colour_entry(app, &colours, ALICE, "One", &["Red"]).await?;
            let second = add_colour_entry(app, &colours, BOB, "Two", &["Blue"]).await?;
            app.manager.tag_record(first.id, &["keep".to_string()]).await?;

            assert_eq!(app.manager.delete_field(colours.name.id).await?, 0);
            assert_eq!(app.manager.delete_field(colours.tags.id).await?, 2);

            for id in [first.id, second.id] {
                assert!(app.store().get_record(id).await?.is_none());
                assert_eq!(app.content_rows(id).await?, 0);
            }
            assert!(app.store().tags_for_record(first.id).await?.is_empty());

            // The form itself survives.
            assert_eq!(app.manager.form(colours.form.id).await?.name, "Paint samples");
            Ok(())
        })
    })
    .await
}
