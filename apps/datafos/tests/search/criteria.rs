use crate::support::constants::*;
use crate::support::*;
use datafos::db::search::{Pagination, SortSpec};
use datafos::RecordFilter;
use datafos_fields::{CriteriaMap, CriterionKey, SearchCriterion, SearchValue, SubmittedValue};

#[tokio::test]
async fn all_required_needs_every_selected_option() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let red = add_colour_entry(app, &colours, ALICE, "Only red", &["Red"]).await?;
            let red_blue = add_colour_entry(app, &colours, ALICE, "Red and blue", &["Red", "Blue"]).await?;
            let blue_green_red =
                add_colour_entry(app, &colours, BOB, "Blue green red", &["Blue", "Green", "Red"]).await?;
            let _green = add_colour_entry(app, &colours, BOB, "Only green", &["Green"]).await?;

            let request = SearchParamsBuilder::new()
                .selection(colours.tags.id, &["Red", "Blue"], true)
                .build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[red_blue.id, blue_green_red.id], "all required");

            let request = SearchParamsBuilder::new()
                .selection(colours.tags.id, &["Red", "Blue"], false)
                .build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(
                &result,
                &[red.id, red_blue.id, blue_green_red.id],
                "any selected",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn selection_matches_whole_options_only() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let form = app.manager.create_form("Trees", false).await?;
            let kinds = app
                .manager
                .create_field(
                    FieldBuilder::new(form.id, "checkbox", "Kinds")
                        .options(&["Oak", "Red Oak", "Oak_1"])
                        .build(),
                )
                .await?;

            let red_oak = add_entry(app, form.id, ALICE, &[(kinds.id, SubmittedValue::multiple(["Red Oak"]))]).await?;
            let oak_1 = add_entry(app, form.id, ALICE, &[(kinds.id, SubmittedValue::multiple(["Oak_1"]))]).await?;
            let oak = add_entry(
                app,
                form.id,
                ALICE,
                &[(kinds.id, SubmittedValue::multiple(["Red Oak", "Oak"]))],
            )
            .await?;

            let request = SearchParamsBuilder::new()
                .selection(kinds.id, &["Oak"], false)
                .build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[oak.id], "whole option");

            let request = SearchParamsBuilder::new()
                .selection(kinds.id, &["Oak_1"], false)
                .build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[oak_1.id], "underscore is literal");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unmatched_criterion_returns_nothing() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            add_colour_entry(app, &colours, ALICE, "Sunset", &["Red"]).await?;
            add_colour_entry(app, &colours, BOB, "Sea", &["Blue"]).await?;

            // The name matches, but nobody ever picked green.
            let request = SearchParamsBuilder::new()
                .field(colours.name.id, "Sunset")
                .selection(colours.tags.id, &["Green"], false)
                .param("u_fn", "Alice")
                .build();
            let result = app.search(colours.form.id, &request).await?;
            assert!(result.records.is_empty());
            assert_eq!(result.total_count, 0);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn text_search_is_case_insensitive_substring() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let crimson = add_colour_entry(app, &colours, ALICE, "Crimson Tide", &["Red"]).await?;
            add_colour_entry(app, &colours, ALICE, "Navy", &["Blue"]).await?;

            let request = SearchParamsBuilder::new()
                .field(colours.name.id, "crimson")
                .build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[crimson.id], "lower case query");

            let request = SearchParamsBuilder::new()
                .field(colours.name.id, "<b>TIDE</b>")
                .build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[crimson.id], "markup stripped");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn like_wildcards_in_input_are_literal() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let percent = add_colour_entry(app, &colours, ALICE, "50% off", &["Red"]).await?;
            add_colour_entry(app, &colours, ALICE, "500 off", &["Red"]).await?;
            let underscore = add_colour_entry(app, &colours, ALICE, "a_b", &["Red"]).await?;
            add_colour_entry(app, &colours, ALICE, "axb", &["Red"]).await?;

            let request = SearchParamsBuilder::new().field(colours.name.id, "50%").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[percent.id], "percent");

            let request = SearchParamsBuilder::new().field(colours.name.id, "a_b").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[underscore.id], "underscore");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn number_and_date_criteria() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let form = app.manager.create_form("Trips", false).await?;
            let nights = app
                .manager
                .create_field(FieldBuilder::new(form.id, "number", "Nights").build())
                .await?;
            let departure = app
                .manager
                .create_field(FieldBuilder::new(form.id, "date", "Departure").build())
                .await?;

            let march = add_entry(
                app,
                form.id,
                ALICE,
                &[
                    (nights.id, SubmittedValue::Single("3".into())),
                    (departure.id, SubmittedValue::Single("2024-03-10".into())),
                ],
            )
            .await?;
            let june = add_entry(
                app,
                form.id,
                BOB,
                &[
                    (nights.id, SubmittedValue::Single("7".into())),
                    (departure.id, SubmittedValue::Single("2024-06-01".into())),
                ],
            )
            .await?;

            let request = SearchParamsBuilder::new().field(nights.id, "7").build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[june.id], "number equality");

            let request = SearchParamsBuilder::new()
                .param(format!("f_{}_from", departure.id), "2024-03-01")
                .param(format!("f_{}_to", departure.id), "2024-03-10")
                .build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[march.id], "upper bound covers the whole day");

            let request = SearchParamsBuilder::new()
                .param(format!("f_{}_from", departure.id), "2024-04-01")
                .build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[june.id], "open upper bound");

            // Seconds beyond the calendar are not a bound.
            let request = SearchParamsBuilder::new()
                .param(format!("f_{}_from", departure.id), "2024-04-01")
                .param(format!("f_{}_to", departure.id), i64::MAX.to_string())
                .build();
            let result = app.search(form.id, &request).await?;
            assert_matches(&result, &[june.id], "out of range upper bound");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn criteria_for_unknown_fields_are_ignored() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let first = add_colour_entry(app, &colours, ALICE, "One", &["Red"]).await?;
            let second = add_colour_entry(app, &colours, BOB, "Two", &["Blue"]).await?;

            let criteria = CriteriaMap::new().with(
                CriterionKey::Field(9_999),
                SearchCriterion::Field(SearchValue::Text("anything".into())),
            );
            let result = app
                .manager
                .search(
                    colours.form.id,
                    &criteria,
                    SortSpec::default(),
                    Pagination::unbounded(),
                    &RecordFilter::all(),
                )
                .await?;
            assert_matches(&result, &[first.id, second.id], "stale criterion");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn previous_criteria_apply_until_overridden() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let form_id = colours.form.id;

            let first = app
                .manager
                .parse_search_request(
                    form_id,
                    &SearchParamsBuilder::new()
                        .field(colours.name.id, "Sunset")
                        .selection(colours.tags.id, &["Red"], true)
                        .build(),
                    None,
                )
                .await?;
            assert_eq!(first.criteria.len(), 2);

            // Nothing in the request: the previous search carries over.
            let carried = app
                .manager
                .parse_search_request(form_id, &SearchParamsBuilder::new().build(), Some(&first.criteria))
                .await?;
            assert_eq!(carried.criteria, first.criteria);

            // An empty text parameter clears that criterion only.
            let cleared = app
                .manager
                .parse_search_request(
                    form_id,
                    &SearchParamsBuilder::new().field(colours.name.id, "").build(),
                    Some(&first.criteria),
                )
                .await?;
            assert!(cleared.criteria.field_value(colours.name.id).is_none());
            assert_eq!(
                cleared.criteria.field_value(colours.tags.id),
                Some(&SearchValue::Selection {
                    selected: vec!["Red".to_string()],
                    all_required: true,
                })
            );

            Ok(())
        })
    })
    .await
}
