use crate::support::constants::*;
use crate::support::*;
use datafos::RecordFilter;

#[tokio::test]
async fn owner_names_match_case_insensitively() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            add_users(app).await?;
            let colours = colour_form(app).await?;
            let alice = add_colour_entry(app, &colours, ALICE, "Dawn", &["Red"]).await?;
            let bob = add_colour_entry(app, &colours, BOB, "Dusk", &["Blue"]).await?;

            let request = SearchParamsBuilder::new().param("u_fn", "ALI").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[alice.id], "first name");

            let request = SearchParamsBuilder::new().param("u_ln", "young").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[bob.id], "last name");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn entries_of_deleted_users_never_match_names() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            add_users(app).await?;
            let colours = colour_form(app).await?;
            add_colour_entry(app, &colours, 999, "Orphan", &["Red"]).await?;
            let carol = add_colour_entry(app, &colours, CAROL, "Owned", &["Red"]).await?;

            let request = SearchParamsBuilder::new().param("u_fn", "a").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[carol.id], "orphans have no name");

            // Without name criteria the orphan is still listed, with no owner.
            let result = app.search(colours.form.id, &SearchParamsBuilder::new().build()).await?;
            assert_eq!(result.total_count, 2);
            let orphan = result
                .records
                .iter()
                .find(|row| row.record.user_id == 999)
                .expect("orphaned entry listed");
            assert!(orphan.owner.is_none());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn tags_must_all_be_present() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let both = add_colour_entry(app, &colours, ALICE, "Both", &["Red"]).await?;
            let one = add_colour_entry(app, &colours, ALICE, "One", &["Red"]).await?;
            add_colour_entry(app, &colours, ALICE, "None", &["Red"]).await?;

            app.manager
                .tag_record(both.id, &["Urgent".to_string(), "Review".to_string()])
                .await?;
            app.manager.tag_record(one.id, &["urgent".to_string()]).await?;

            let request = SearchParamsBuilder::new().tags(&["URGENT"]).build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[both.id, one.id], "single tag");

            let request = SearchParamsBuilder::new().tags(&["urgent", "review"]).build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[both.id], "every tag");

            let request = SearchParamsBuilder::new().tags(&["missing"]).build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[], "unknown tag");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn approval_and_modification_time() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let colours = colour_form(app).await?;
            let old = add_colour_entry(app, &colours, ALICE, "Old", &["Red"]).await?;
            let recent = add_colour_entry(app, &colours, ALICE, "Recent", &["Red"]).await?;
            set_modified(app, old.id, 1_000).await?;
            set_modified(app, recent.id, 5_000).await?;
            app.manager.approve_record(old.id, false).await?;

            let request = SearchParamsBuilder::new().param("u_timemodified", "5000").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[recent.id], "modified since");

            let request = SearchParamsBuilder::new().param("u_approved", "0").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[old.id], "unapproved");

            let request = SearchParamsBuilder::new().param("u_approved", "1").build();
            let result = app.search(colours.form.id, &request).await?;
            assert_matches(&result, &[recent.id], "approved");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn visibility_filter_applies_before_criteria() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let form = app.manager.create_form("Moderated", true).await?;
            let name = app
                .manager
                .create_field(FieldBuilder::new(form.id, "text", "Name").build())
                .await?;

            let mine = app.manager.add_record(form.id, ALICE, 1).await?;
            let theirs = app.manager.add_record(form.id, BOB, 1).await?;
            let approved = app.manager.add_record(form.id, BOB, 2).await?;
            assert!(!mine.approved, "moderated forms start unapproved");
            app.manager.approve_record(approved.id, true).await?;
            for record in [&mine, &theirs, &approved] {
                app.manager
                    .update_content(record.id, name.id, &datafos_fields::SubmittedValue::Single("Entry".into()))
                    .await?;
            }

            let request = SearchParamsBuilder::new().field(name.id, "entry").build();

            let result = app
                .search_as(form.id, &request, &RecordFilter::all().visible_to(ALICE))
                .await?;
            assert_matches(&result, &[mine.id, approved.id], "approved or own");

            let result = app
                .search_as(form.id, &request, &RecordFilter::all().in_group(1))
                .await?;
            assert_matches(&result, &[mine.id, theirs.id], "group");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_is_scoped_to_one_form() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = colour_form(app).await?;
            let second = colour_form(app).await?;
            let ours = add_colour_entry(app, &first, ALICE, "Shared name", &["Red"]).await?;
            add_colour_entry(app, &second, ALICE, "Shared name", &["Red"]).await?;

            let request = SearchParamsBuilder::new().param("u_approved", "1").build();
            let result = app.search(first.form.id, &request).await?;
            assert_matches(&result, &[ours.id], "other form excluded");

            Ok(())
        })
    })
    .await
}
