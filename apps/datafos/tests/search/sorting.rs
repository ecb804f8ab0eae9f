use crate::support::constants::*;
use crate::support::*;
use datafos::db::search::SortKey;
use datafos_fields::SubmittedValue;

async fn numbered_form(app: &TestApp, values: &[&str]) -> anyhow::Result<(i64, i64, Vec<i64>)> {
    let form = app.manager.create_form("Scores", false).await?;
    let score = app
        .manager
        .create_field(FieldBuilder::new(form.id, "number", "Score").build())
        .await?;
    let mut ids = Vec::new();
    for value in values {
        let record = add_entry(app, form.id, ALICE, &[(score.id, SubmittedValue::Single(value.to_string()))]).await?;
        ids.push(record.id);
    }
    Ok((form.id, score.id, ids))
}

#[tokio::test]
async fn sort_by_owner_names() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            add_users(app).await?;
            let colours = colour_form(app).await?;
            let carol = add_colour_entry(app, &colours, CAROL, "C", &["Red"]).await?;
            let alice = add_colour_entry(app, &colours, ALICE, "A", &["Red"]).await?;
            let bob = add_colour_entry(app, &colours, BOB, "B", &["Red"]).await?;

            let request = SearchParamsBuilder::new().sort(SortKey::FIRST_NAME, "ASC").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_ordered(&result, &[alice.id, bob.id, carol.id], "first name ascending");

            // Zimmer, Young, Xu
            let request = SearchParamsBuilder::new().sort(SortKey::LAST_NAME, "desc").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_ordered(&result, &[alice.id, bob.id, carol.id], "last name descending");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn number_fields_sort_numerically() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (form_id, score_id, ids) = numbered_form(app, &["10", "9", "100"]).await?;

            let request = SearchParamsBuilder::new().sort(score_id, "ASC").build();
            let result = app.search(form_id, &request).await?;
            assert_ordered(&result, &[ids[1], ids[0], ids[2]], "numeric order");

            let request = SearchParamsBuilder::new().sort(score_id, "DESC").build();
            let result = app.search(form_id, &request).await?;
            assert_ordered(&result, &[ids[2], ids[0], ids[1]], "numeric order descending");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn pages_share_one_total_count() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (form_id, score_id, ids) = numbered_form(app, &["1", "2", "3", "4", "5"]).await?;

            let request = SearchParamsBuilder::new()
                .sort(score_id, "ASC")
                .page(1, 2)
                .build();
            let result = app.search(form_id, &request).await?;
            assert_ordered(&result, &[ids[2], ids[3]], "second page");
            assert_eq!(result.total_count, 5);

            let request = SearchParamsBuilder::new()
                .sort(score_id, "ASC")
                .page(2, 2)
                .build();
            let result = app.search(form_id, &request).await?;
            assert_ordered(&result, &[ids[4]], "last page");
            assert_eq!(result.total_count, 5);

            let request = SearchParamsBuilder::new()
                .sort(score_id, "ASC")
                .page(9, 2)
                .build();
            let result = app.search(form_id, &request).await?;
            assert!(result.records.is_empty());
            assert_eq!(result.total_count, 5);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn per_page_is_capped_by_configuration() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.search.max_per_page = 2,
        |app| {
            Box::pin(async move {
                let (form_id, _score_id, _ids) = numbered_form(app, &["1", "2", "3"]).await?;

                let request = SearchParamsBuilder::new().page(0, 50).build();
                let result = app.search(form_id, &request).await?;
                assert_eq!(result.records.len(), 2);
                assert_eq!(result.total_count, 3);

                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn unknown_sort_field_falls_back_to_time_added() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (form_id, _score_id, ids) = numbered_form(app, &["1", "2"]).await?;

            let request = SearchParamsBuilder::new().sort(9_999, "ASC").build();
            let result = app.search(form_id, &request).await?;
            assert_matches(&result, &ids, "fallback sort");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn entries_without_sort_content_are_kept() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (form_id, score_id, mut ids) = numbered_form(app, &["4"]).await?;
            let blank = app.manager.add_record(form_id, ALICE, 0).await?;
            ids.push(blank.id);

            let request = SearchParamsBuilder::new().sort(score_id, "DESC").build();
            let result = app.search(form_id, &request).await?;
            // NULL sorts last when descending.
            assert_ordered(&result, &ids, "empty content last");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn large_forms_are_searchable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let pool = app.store().pool();
            sqlx::query(
                "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 33000)
                 INSERT INTO datafos_records (dataid, userid, groupid, approved, timecreated, timemodified)
                 SELECT $1, $2, 0, 1, i, i FROM n",
            )
            .bind(colours.form.id)
            .bind(ALICE)
            .execute(pool)
            .await?;
            sqlx::query(
                "INSERT INTO datafos_content (fieldid, recordid, content)
                 SELECT $1, id, 'Row ' || timecreated FROM datafos_records WHERE dataid = $2",
            )
            .bind(colours.name.id)
            .bind(colours.form.id)
            .execute(pool)
            .await?;

            let result = app.search(colours.form.id, &SearchParamsBuilder::new().build()).await?;
            assert_eq!(result.total_count, 33_000);
            assert_eq!(result.records.len(), app.config.search.default_per_page as usize);

            let request = SearchParamsBuilder::new().field(colours.name.id, "Row 12345").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_eq!(result.total_count, 1);

            Ok(())
        })
    })
    .await
}
