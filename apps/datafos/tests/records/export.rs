use crate::support::constants::*;
use crate::support::*;
use datafos::Error;
use datafos_fields::{FieldDefinition, SubmittedValue};

struct Places {
    form_id: i64,
    name: FieldDefinition,
    location: FieldDefinition,
}

async fn places(app: &TestApp) -> anyhow::Result<Places> {
    let form = app.manager.create_form("Places", false).await?;
    let name = app
        .manager
        .create_field(FieldBuilder::new(form.id, "text", "Name").build())
        .await?;
    let location = app
        .manager
        .create_field(
            FieldBuilder::new(form.id, "latlong", "Location")
                .param(2, name.id.to_string())
                .build(),
        )
        .await?;
    Ok(Places {
        form_id: form.id,
        name,
        location,
    })
}

async fn add_place(app: &TestApp, places: &Places, name: &str, coordinates: &[&str]) -> anyhow::Result<i64> {
    let record = add_entry(
        app,
        places.form_id,
        ALICE,
        &[
            (places.name.id, SubmittedValue::Single(name.to_string())),
            (
                places.location.id,
                SubmittedValue::multiple(coordinates.iter().copied()),
            ),
        ],
    )
    .await?;
    Ok(record.id)
}

#[tokio::test]
async fn kml_lists_entries_with_coordinates() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let places = places(app).await?;
            let london = add_place(app, &places, "London", &["51.5", "-0.12"]).await?;
            let paris = add_place(app, &places, "Paris", &["48.85", "2.35"]).await?;
            add_place(app, &places, "Nowhere", &["", ""]).await?;
            add_place(app, &places, "Off the map", &["95", "10"]).await?;

            let kml = app
                .manager
                .export_kml(places.form_id, places.location.id, None)
                .await?;

            assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
            assert!(kml.contains("<name>Places</name>"));
            assert_eq!(kml.matches("<Placemark>").count(), 2, "{}", kml);
            assert_contains_in_order(
                &kml,
                &[
                    "<Placemark><name>London</name>",
                    &format!("Item #{} in Places", london),
                    "<coordinates>-0.12,51.5,0</coordinates>",
                    "<Placemark><name>Paris</name>",
                    &format!("Item #{} in Places", paris),
                    "<coordinates>2.35,48.85,0</coordinates>",
                ],
            );
            assert!(!kml.contains("Nowhere"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn kml_for_one_entry() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let places = places(app).await?;
            add_place(app, &places, "London", &["51.5", "-0.12"]).await?;
            let paris = add_place(app, &places, "Paris", &["48.85", "2.35"]).await?;

            let kml = app
                .manager
                .export_kml(places.form_id, places.location.id, Some(paris))
                .await?;
            assert_eq!(kml.matches("<Placemark>").count(), 1);
            assert!(kml.contains("<name>Paris</name>"));
            assert!(!kml.contains("London"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn kml_needs_a_latlong_field_of_the_form() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let places = places(app).await?;
            let other = places_in_other_form(app).await?;

            let err = app
                .manager
                .export_kml(places.form_id, places.name.id, None)
                .await
                .expect_err("text field");
            assert!(matches!(err, Error::Validation(_)), "{:?}", err);

            let err = app
                .manager
                .export_kml(places.form_id, other, None)
                .await
                .expect_err("field of another form");
            assert!(matches!(err, Error::FieldNotFound(id) if id == other));

            Ok(())
        })
    })
    .await
}

async fn places_in_other_form(app: &TestApp) -> anyhow::Result<i64> {
    let other = places(app).await?;
    Ok(other.location.id)
}
