use std::collections::HashMap;

use crate::support::constants::*;
use crate::support::*;
use datafos::db::RecordStore;
use datafos::Error;
use datafos_fields::{
    CriteriaMap, CriterionKey, FieldDefinition, SearchCriterion, SearchValue, SubmittedValue,
};
use datafos_template::TemplateKind;

#[tokio::test]
async fn single_view_shows_selected_options_in_stored_order() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let record = add_colour_entry(app, &colours, ALICE, "Sunrise", &["Red", "Blue"]).await?;
            app.manager
                .save_template(colours.form.id, TemplateKind::Single, "<p>[[Name]]: [[Tags]]</p>")
                .await?;

            let html = app.manager.render_single(record.id).await?;
            assert_contains_in_order(&html, &["<p>", "Sunrise", "Red", "Blue", "</p>"]);
            assert!(!html.contains("Green"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_form_offers_only_used_options() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let form = app.manager.create_form("Letters", false).await?;
            let letters = app
                .manager
                .create_field(
                    FieldBuilder::new(form.id, "checkbox", "Letters")
                        .options(&["A", "B", "C"])
                        .build(),
                )
                .await?;
            let unused = app
                .manager
                .create_field(
                    FieldBuilder::new(form.id, "multimenu", "Unused")
                        .options(&["X", "Y"])
                        .build(),
                )
                .await?;
            add_entry(app, form.id, ALICE, &[(letters.id, SubmittedValue::multiple(["A"]))]).await?;

            let html = app.manager.render_search_form(form.id, &CriteriaMap::new()).await?;
            assert!(html.contains("<option value=\"A\">A</option>"), "{}", html);
            assert!(!html.contains("value=\"B\""));
            assert!(!html.contains("value=\"C\""));
            assert!(!html.contains(&format!("name=\"f_{}[]\"", unused.id)));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_form_is_prefilled_with_criteria() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let record = add_colour_entry(app, &colours, ALICE, "Sunrise", &["Red", "Blue"]).await?;
            app.manager.tag_record(record.id, &["Warm".to_string()]).await?;

            let criteria = CriteriaMap::new()
                .with(
                    CriterionKey::Field(colours.name.id),
                    SearchCriterion::Field(SearchValue::Text("Sun\"rise".into())),
                )
                .with(
                    CriterionKey::Field(colours.tags.id),
                    SearchCriterion::Field(SearchValue::Selection {
                        selected: vec!["Blue".into()],
                        all_required: true,
                    }),
                )
                .with(CriterionKey::FirstName, SearchCriterion::FirstName("Ali".into()))
                .with(CriterionKey::Tags, SearchCriterion::Tags(vec!["warm".into()]));

            let html = app.manager.render_search_form(colours.form.id, &criteria).await?;
            assert!(html.contains("value=\"Sun&quot;rise\""), "{}", html);
            assert!(html.contains("<option value=\"Blue\" selected=\"selected\">Blue</option>"));
            assert!(html.contains("<option value=\"Red\">Red</option>"));
            assert!(html.contains(&format!("name=\"f_{}_allreq\" value=\"1\" class=\"mr-1\" checked=\"checked\"", colours.tags.id)));
            assert!(html.contains("name=\"u_fn\" value=\"Ali\""));
            assert!(html.contains("<option value=\"Warm\" selected=\"selected\">Warm</option>"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn fields_of_unknown_type_degrade_quietly() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            // Stored by an older build; field design would refuse the type.
            let mystery = app
                .store()
                .insert_field(&FieldDefinition::new(colours.form.id, "bogus", "Mystery"))
                .await?;
            let record = add_colour_entry(app, &colours, ALICE, "Sunrise", &["Red"]).await?;

            let html = app.manager.render_single(record.id).await?;
            assert!(html.contains("Sunrise"));
            assert!(html.contains("Mystery"), "the name still renders");

            let html = app.manager.render_search_form(colours.form.id, &CriteriaMap::new()).await?;
            assert!(html.contains(&format!("name=\"f_{}\"", colours.name.id)));
            assert!(!html.contains(&format!("f_{}", mystery.id)));

            let html = app
                .manager
                .render_preview(colours.form.id, TemplateKind::Single, 1)
                .await?;
            assert!(html.contains("No preview available for Mystery"));
            assert!(html.contains("Name 1"));

            let err = app
                .manager
                .render_add_form(colours.form.id, None, &HashMap::new())
                .await
                .expect_err("unknown type cannot be edited");
            assert!(matches!(
                err,
                Error::Field(datafos_fields::Error::UnknownFieldType { .. })
            ));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_renders_search_results_in_order() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            add_users(app).await?;
            let colours = colour_form(app).await?;
            add_colour_entry(app, &colours, CAROL, "Third", &["Red"]).await?;
            add_colour_entry(app, &colours, ALICE, "First", &["Blue"]).await?;
            add_colour_entry(app, &colours, BOB, "Second", &["Green"]).await?;
            app.manager
                .save_template(colours.form.id, TemplateKind::List, "<li>[[Name]] by ##firstname##</li>")
                .await?;

            let request = SearchParamsBuilder::new().sort(-1, "ASC").build();
            let result = app.search(colours.form.id, &request).await?;
            let html = app.manager.render_list(colours.form.id, &result.records).await?;
            assert_eq!(
                html,
                "<li>First by Alice</li><li>Second by Bob</li><li>Third by Carol</li>"
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn empty_templates_fall_back_to_defaults() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            add_users(app).await?;
            let colours = colour_form(app).await?;
            let record = add_colour_entry(app, &colours, ALICE, "Sunrise", &["Red"]).await?;
            app.manager.tag_record(record.id, &["Morning".to_string()]).await?;

            let html = app.manager.render_single(record.id).await?;
            assert_contains_in_order(
                &html,
                &["defaulttemplate-single", "Name", "Sunrise", "Tags", "Red", "Morning", "Alice Zimmer"],
            );

            let template = app.manager.reset_template(colours.form.id, TemplateKind::List).await?;
            assert!(template.contains("[[Name]]"));
            assert_eq!(app.manager.form(colours.form.id).await?.list_template, template);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn saving_reports_repeated_tokens() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let notifications = app
                .manager
                .save_template(colours.form.id, TemplateKind::Single, "[[Name]] [[Tags]] [[name]]")
                .await?;
            assert_eq!(notifications.len(), 1);
            assert!(notifications[0].contains("\"Name\""));

            // Saved all the same.
            let form = app.manager.form(colours.form.id).await?;
            assert_eq!(form.single_template, "[[Name]] [[Tags]] [[name]]");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn add_form_prefers_the_submitted_draft() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let record = add_colour_entry(app, &colours, ALICE, "Stored", &["Red"]).await?;
            app.manager
                .save_template(colours.form.id, TemplateKind::AddEntry, "[[Name]]")
                .await?;

            let blank = app
                .manager
                .render_add_form(colours.form.id, None, &HashMap::new())
                .await?;
            assert!(blank.contains(&format!("name=\"field_{}\"", colours.name.id)), "{}", blank);
            assert!(blank.contains("value=\"\""));

            let stored = app
                .manager
                .render_add_form(colours.form.id, Some(record.id), &HashMap::new())
                .await?;
            assert!(stored.contains("value=\"Stored\""), "{}", stored);

            let draft = SubmissionBuilder::new().text(colours.name.id, "Draft").build();
            let redisplayed = app
                .manager
                .render_add_form(colours.form.id, Some(record.id), &draft)
                .await?;
            assert!(redisplayed.contains("value=\"Draft\""));
            assert!(!redisplayed.contains("Stored"));

            Ok(())
        })
    })
    .await
}
