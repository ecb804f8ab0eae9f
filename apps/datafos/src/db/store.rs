//! SQLite implementation of [`RecordStore`]

use std::str::FromStr;

use async_trait::async_trait;
use datafos_fields::{
    push_id_list, BindValue, FieldDefinition, Record, RecordContent, UserSummary, PARAM_SLOTS,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::schema::ensure_schema;
use super::traits::RecordStore;
use crate::config::DatabaseConfig;
use crate::models::{Form, RecordRow};
use crate::{Error, Result};

const FIELD_COLUMNS: &str = "id, dataid, type, name, description, required, \
     param1, param2, param3, param4, param5, param6, param7, param8, param9, param10";

const RECORD_COLUMNS: &str = "id, dataid, userid, groupid, approved, timecreated, timemodified";

const CONTENT_COLUMNS: &str = "id, fieldid, recordid, content, content1, content2, content3, content4";

/// Record store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the configured database and create the schema if needed.
    ///
    /// In-memory databases live as long as their connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .pragma("case_sensitive_like", "ON");

        let pool = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?
        };

        ensure_schema(&pool).await?;
        tracing::info!(url = %config.url, "Connected to record store");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn field_from_row(row: &SqliteRow) -> Result<FieldDefinition> {
    let mut field = FieldDefinition::new(
        row.try_get::<i64, _>("dataid")?,
        row.try_get::<String, _>("type")?,
        row.try_get::<String, _>("name")?,
    );
    field.id = row.try_get("id")?;
    field.description = row.try_get("description")?;
    field.required = row.try_get("required")?;
    for n in 1..=PARAM_SLOTS {
        field.params[n - 1] = row.try_get::<Option<String>, _>(format!("param{}", n).as_str())?;
    }
    Ok(field)
}

fn record_from_row(row: &SqliteRow) -> Result<Record> {
    Ok(Record {
        id: row.try_get("id")?,
        form_id: row.try_get("dataid")?,
        user_id: row.try_get("userid")?,
        group_id: row.try_get("groupid")?,
        approved: row.try_get("approved")?,
        created_at: row.try_get("timecreated")?,
        modified_at: row.try_get("timemodified")?,
    })
}

fn content_from_row(row: &SqliteRow) -> Result<RecordContent> {
    Ok(RecordContent {
        id: row.try_get("id")?,
        field_id: row.try_get("fieldid")?,
        record_id: row.try_get("recordid")?,
        content: row.try_get("content")?,
        content1: row.try_get("content1")?,
        content2: row.try_get("content2")?,
        content3: row.try_get("content3")?,
        content4: row.try_get("content4")?,
    })
}

fn form_from_row(row: &SqliteRow) -> Result<Form> {
    Ok(Form {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        approval: row.try_get("approval")?,
        list_template: row.try_get("listtemplate")?,
        single_template: row.try_get("singletemplate")?,
        asearch_template: row.try_get("asearchtemplate")?,
        add_template: row.try_get("addtemplate")?,
        rss_template: row.try_get("rsstemplate")?,
    })
}

fn record_row_from_row(row: &SqliteRow) -> Result<RecordRow> {
    let record = record_from_row(row)?;
    let owner = match row.try_get::<Option<i64>, _>("owner_id")? {
        Some(id) => Some(UserSummary {
            id,
            firstname: row.try_get::<Option<String>, _>("firstname")?.unwrap_or_default(),
            lastname: row.try_get::<Option<String>, _>("lastname")?.unwrap_or_default(),
        }),
        None => None,
    };
    Ok(RecordRow { record, owner })
}

/// Delete every record of a form together with its content and tag instances.
async fn purge_records(conn: &mut SqliteConnection, form_id: i64) -> Result<u64> {
    sqlx::query(
        "DELETE FROM tag_instances
         WHERE itemid IN (SELECT id FROM datafos_records WHERE dataid = $1)",
    )
    .bind(form_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "DELETE FROM datafos_content
         WHERE recordid IN (SELECT id FROM datafos_records WHERE dataid = $1)",
    )
    .bind(form_id)
    .execute(&mut *conn)
    .await?;

    let purged = sqlx::query("DELETE FROM datafos_records WHERE dataid = $1")
        .bind(form_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(purged)
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create_form(&self, name: &str, approval: bool) -> Result<Form> {
        let id = sqlx::query("INSERT INTO datafos (name, approval) VALUES ($1, $2)")
            .bind(name)
            .bind(approval)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        let mut form = Form::new(name);
        form.id = id;
        form.approval = approval;
        Ok(form)
    }

    async fn get_form(&self, form_id: i64) -> Result<Option<Form>> {
        let row = sqlx::query(
            "SELECT id, name, approval, listtemplate, singletemplate, asearchtemplate,
                    addtemplate, rsstemplate
             FROM datafos
             WHERE id = $1",
        )
        .bind(form_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(form_from_row).transpose()
    }

    async fn update_form(&self, form: &Form) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE datafos
             SET name = $2, approval = $3, listtemplate = $4, singletemplate = $5,
                 asearchtemplate = $6, addtemplate = $7, rsstemplate = $8
             WHERE id = $1",
        )
        .bind(form.id)
        .bind(&form.name)
        .bind(form.approval)
        .bind(&form.list_template)
        .bind(&form.single_template)
        .bind(&form.asearch_template)
        .bind(&form.add_template)
        .bind(&form.rss_template)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(Error::FormNotFound(form.id));
        }
        Ok(())
    }

    async fn delete_form(&self, form_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let purged = purge_records(&mut *tx, form_id).await?;
        sqlx::query("DELETE FROM datafos_fields WHERE dataid = $1")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM datafos WHERE id = $1")
            .bind(form_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::debug!(form_id, purged, "Form deleted");
        Ok(deleted > 0)
    }

    async fn insert_field(&self, field: &FieldDefinition) -> Result<FieldDefinition> {
        let mut query = sqlx::query(
            "INSERT INTO datafos_fields
                (dataid, type, name, description, required,
                 param1, param2, param3, param4, param5, param6, param7, param8, param9, param10)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(field.form_id)
        .bind(&field.field_type)
        .bind(&field.name)
        .bind(&field.description)
        .bind(field.required);
        for param in &field.params {
            query = query.bind(param.as_deref());
        }
        let mut tx = self.pool.begin().await?;
        let id = query.execute(&mut *tx).await?.last_insert_rowid();

        sqlx::query(
            "INSERT INTO datafos_content (fieldid, recordid)
             SELECT $1, id FROM datafos_records WHERE dataid = $2",
        )
        .bind(id)
        .bind(field.form_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut stored = field.clone();
        stored.id = id;
        Ok(stored)
    }

    async fn update_field(&self, field: &FieldDefinition) -> Result<()> {
        let mut query = sqlx::query(
            "UPDATE datafos_fields
             SET type = $2, name = $3, description = $4, required = $5,
                 param1 = $6, param2 = $7, param3 = $8, param4 = $9, param5 = $10,
                 param6 = $11, param7 = $12, param8 = $13, param9 = $14, param10 = $15
             WHERE id = $1",
        )
        .bind(field.id)
        .bind(&field.field_type)
        .bind(&field.name)
        .bind(&field.description)
        .bind(field.required);
        for param in &field.params {
            query = query.bind(param.as_deref());
        }
        let updated = query.execute(&self.pool).await?.rows_affected();

        if updated == 0 {
            return Err(Error::FieldNotFound(field.id));
        }
        Ok(())
    }

    async fn get_field(&self, field_id: i64) -> Result<Option<FieldDefinition>> {
        let sql = format!("SELECT {} FROM datafos_fields WHERE id = $1", FIELD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(field_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(field_from_row).transpose()
    }

    async fn fields_for_form(&self, form_id: i64) -> Result<Vec<FieldDefinition>> {
        let sql = format!(
            "SELECT {} FROM datafos_fields WHERE dataid = $1 ORDER BY id",
            FIELD_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(form_id).fetch_all(&self.pool).await?;

        rows.iter().map(field_from_row).collect()
    }

    async fn delete_field(&self, field_id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let form_id: Option<i64> =
            sqlx::query_scalar("SELECT dataid FROM datafos_fields WHERE id = $1")
                .bind(field_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(form_id) = form_id else {
            return Err(Error::FieldNotFound(field_id));
        };

        sqlx::query("DELETE FROM datafos_content WHERE fieldid = $1")
            .bind(field_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM datafos_fields WHERE id = $1")
            .bind(field_id)
            .execute(&mut *tx)
            .await?;

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datafos_fields WHERE dataid = $1")
            .bind(form_id)
            .fetch_one(&mut *tx)
            .await?;
        let purged = if remaining == 0 {
            purge_records(&mut *tx, form_id).await?
        } else {
            0
        };

        tx.commit().await?;
        Ok(purged)
    }

    async fn insert_record(&self, record: &Record) -> Result<Record> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO datafos_records (dataid, userid, groupid, approved, timecreated, timemodified)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.form_id)
        .bind(record.user_id)
        .bind(record.group_id)
        .bind(record.approved)
        .bind(record.created_at)
        .bind(record.modified_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        // Narrowing queries start from content rows, so every record gets one per field.
        sqlx::query(
            "INSERT INTO datafos_content (fieldid, recordid)
             SELECT id, $1 FROM datafos_fields WHERE dataid = $2",
        )
        .bind(id)
        .bind(record.form_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut stored = record.clone();
        stored.id = id;
        Ok(stored)
    }

    async fn get_record(&self, record_id: i64) -> Result<Option<Record>> {
        let sql = format!("SELECT {} FROM datafos_records WHERE id = $1", RECORD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE datafos_records
             SET userid = $2, groupid = $3, approved = $4, timecreated = $5, timemodified = $6
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.group_id)
        .bind(record.approved)
        .bind(record.created_at)
        .bind(record.modified_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(Error::RecordNotFound(record.id));
        }
        Ok(())
    }

    async fn delete_record(&self, record_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM datafos_content WHERE recordid = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tag_instances WHERE itemid = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM datafos_records WHERE id = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn delete_records_for_form(&self, form_id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let purged = purge_records(&mut *tx, form_id).await?;
        tx.commit().await?;
        Ok(purged)
    }

    async fn upsert_content(&self, content: &RecordContent) -> Result<()> {
        sqlx::query(
            "INSERT INTO datafos_content
                (fieldid, recordid, content, content1, content2, content3, content4)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (fieldid, recordid) DO UPDATE SET
                content = excluded.content,
                content1 = excluded.content1,
                content2 = excluded.content2,
                content3 = excluded.content3,
                content4 = excluded.content4",
        )
        .bind(content.field_id)
        .bind(content.record_id)
        .bind(content.content.as_deref())
        .bind(content.content1.as_deref())
        .bind(content.content2.as_deref())
        .bind(content.content3.as_deref())
        .bind(content.content4.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn contents_for_record(&self, record_id: i64) -> Result<Vec<RecordContent>> {
        let sql = format!(
            "SELECT {} FROM datafos_content WHERE recordid = $1 ORDER BY fieldid",
            CONTENT_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(record_id).fetch_all(&self.pool).await?;

        rows.iter().map(content_from_row).collect()
    }

    async fn contents_for_records(&self, record_ids: &[i64]) -> Result<Vec<RecordContent>> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut bind_params = Vec::with_capacity(record_ids.len());
        let in_list = push_id_list(&mut bind_params, record_ids);
        let sql = format!(
            "SELECT {} FROM datafos_content WHERE recordid IN {} ORDER BY recordid, fieldid",
            CONTENT_COLUMNS, in_list
        );

        let mut query = sqlx::query(&sql);
        for value in &bind_params {
            query = match value {
                BindValue::Text(v) => query.bind(v.as_str()),
                BindValue::Int(v) => query.bind(*v),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(content_from_row).collect()
    }

    async fn used_values(&self, field_id: i64) -> Result<Vec<String>> {
        let values = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT content
             FROM datafos_content
             WHERE fieldid = $1 AND content IS NOT NULL AND content <> ''
             ORDER BY content",
        )
        .bind(field_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    async fn upsert_user(&self, user: &UserSummary) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, firstname, lastname) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                firstname = excluded.firstname,
                lastname = excluded.lastname",
        )
        .bind(user.id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserSummary>> {
        let row = sqlx::query("SELECT id, firstname, lastname FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserSummary {
                id: row.try_get("id")?,
                firstname: row.try_get("firstname")?,
                lastname: row.try_get("lastname")?,
            })),
            None => Ok(None),
        }
    }

    async fn set_record_tags(&self, record_id: i64, raw_names: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tag_instances WHERE itemid = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        for raw in raw_names {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let name = raw.to_lowercase();
            sqlx::query("INSERT INTO tags (name, rawname) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
                .bind(&name)
                .bind(raw)
                .execute(&mut *tx)
                .await?;
            let tag_id: i64 = sqlx::query_scalar("SELECT id FROM tags WHERE name = $1")
                .bind(&name)
                .fetch_one(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO tag_instances (tagid, itemid) VALUES ($1, $2)
                 ON CONFLICT (tagid, itemid) DO NOTHING",
            )
            .bind(tag_id)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tags_for_record(&self, record_id: i64) -> Result<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            "SELECT t.rawname
             FROM tags t
             INNER JOIN tag_instances ti ON ti.tagid = t.id
             WHERE ti.itemid = $1
             ORDER BY t.name",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn all_tags(&self) -> Result<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            "SELECT t.rawname
             FROM tags t
             WHERE EXISTS (SELECT 1 FROM tag_instances ti WHERE ti.tagid = t.id)
             ORDER BY t.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn query_ids(&self, sql: &str, bind_params: &[BindValue]) -> Result<Vec<i64>> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in bind_params {
            query = match value {
                BindValue::Text(v) => query.bind(v.as_str()),
                BindValue::Int(v) => query.bind(*v),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn query_records(&self, sql: &str, bind_params: &[BindValue]) -> Result<Vec<RecordRow>> {
        let mut query = sqlx::query(sql);
        for value in bind_params {
            query = match value {
                BindValue::Text(v) => query.bind(v.as_str()),
                BindValue::Int(v) => query.bind(*v),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(record_row_from_row).collect()
    }

    async fn count(&self, sql: &str, bind_params: &[BindValue]) -> Result<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in bind_params {
            query = match value {
                BindValue::Text(v) => query.bind(v.as_str()),
                BindValue::Int(v) => query.bind(*v),
            };
        }

        Ok(query.fetch_one(&self.pool).await?)
    }
}
