//! SQL for the candidate and presentation queries.
//!
//! All statements share one bind list with `$N` placeholders numbered by
//! position, so predicates produced by field adapters can be spliced in.

use datafos_fields::{field_adapter, push_id_list, push_int, BindValue, FieldDefinition};
use serde::{Deserialize, Serialize};

use crate::models::{RecordFilter, Visibility};

const RECORD_SELECT: &str = "r.id, r.dataid, r.userid, r.groupid, r.approved, r.timecreated, \
     r.timemodified, u.id AS owner_id, u.firstname, u.lastname";

/// What records are ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    TimeAdded,
    FirstName,
    LastName,
    Approved,
    TimeModified,
    Field(i64),
}

impl SortKey {
    pub const TIME_ADDED: i64 = 0;
    pub const FIRST_NAME: i64 = -1;
    pub const LAST_NAME: i64 = -2;
    pub const APPROVED: i64 = -3;
    pub const TIME_MODIFIED: i64 = -4;

    /// Any id that is neither a field nor a reserved column sorts by time added.
    pub fn from_id(id: i64) -> Self {
        match id {
            Self::FIRST_NAME => Self::FirstName,
            Self::LAST_NAME => Self::LastName,
            Self::APPROVED => Self::Approved,
            Self::TIME_MODIFIED => Self::TimeModified,
            id if id > 0 => Self::Field(id),
            _ => Self::TimeAdded,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::TimeAdded => Self::TIME_ADDED,
            Self::FirstName => Self::FIRST_NAME,
            Self::LastName => Self::LAST_NAME,
            Self::Approved => Self::APPROVED,
            Self::TimeModified => Self::TIME_MODIFIED,
            Self::Field(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `DESC` (any case) is descending, everything else ascending.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Zero-based page of results; `per_page = None` returns everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: Option<u32>,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page: Some(per_page),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u64 {
        self.per_page
            .map(|per_page| u64::from(self.page) * u64::from(per_page))
            .unwrap_or(0)
    }
}

/// A sort spec checked against the form's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSort {
    /// SQL expression selected as `sortorder`.
    pub expression: String,
    /// Field whose content is joined as `s` for sorting.
    pub content_field: Option<i64>,
    pub direction: SortDirection,
}

impl ResolvedSort {
    /// A field key naming no field of the form falls back to time added.
    pub fn resolve(spec: SortSpec, fields: &[FieldDefinition]) -> Self {
        let reserved = |expression: &str| Self {
            expression: expression.to_string(),
            content_field: None,
            direction: spec.direction,
        };
        match spec.key {
            SortKey::TimeAdded => reserved("r.timecreated"),
            SortKey::FirstName => reserved("u.firstname"),
            SortKey::LastName => reserved("u.lastname"),
            SortKey::Approved => reserved("r.approved"),
            SortKey::TimeModified => reserved("r.timemodified"),
            SortKey::Field(id) => match fields.iter().find(|f| f.id == id) {
                Some(field) => {
                    let adapter = field_adapter(field);
                    Self {
                        expression: adapter
                            .sort_expression(&format!("s.{}", adapter.sort_column())),
                        content_field: Some(id),
                        direction: spec.direction,
                    }
                }
                None => {
                    tracing::warn!(field_id = id, "Sort field not found, sorting by time added");
                    reserved("r.timecreated")
                }
            },
        }
    }
}

/// Query listing every record id of a form that passes `filter`.
pub fn build_candidate_sql(form_id: i64, filter: &RecordFilter) -> (String, Vec<BindValue>) {
    let mut bind_params = Vec::new();
    let form = push_int(&mut bind_params, form_id);
    let mut sql = format!("SELECT r.id FROM datafos_records r WHERE r.dataid = ${}", form);

    if let Some(group_id) = filter.group_id {
        let idx = push_int(&mut bind_params, group_id);
        sql.push_str(&format!(" AND r.groupid = ${}", idx));
    }
    if let Visibility::ApprovedOrOwnedBy(user_id) = filter.visibility {
        let idx = push_int(&mut bind_params, user_id);
        sql.push_str(&format!(" AND (r.approved = 1 OR r.userid = ${})", idx));
    }
    sql.push_str(" ORDER BY r.id");

    (sql, bind_params)
}

/// Final query over a narrowed candidate set.
#[derive(Debug, Clone)]
pub struct PresentationQuery<'a> {
    form_id: i64,
    record_ids: &'a [i64],
    sort: ResolvedSort,
    pagination: Pagination,
}

impl<'a> PresentationQuery<'a> {
    pub fn new(form_id: i64, record_ids: &'a [i64], sort: ResolvedSort, pagination: Pagination) -> Self {
        Self {
            form_id,
            record_ids,
            sort,
            pagination,
        }
    }

    /// `FROM ... WHERE ...` shared by the page and count queries.
    ///
    /// An empty candidate set yields `IN (-1)` so the query can never match.
    fn push_from_clause(&self, bind_params: &mut Vec<BindValue>, with_sort_join: bool) -> String {
        let form = push_int(bind_params, self.form_id);
        let mut sql = String::from(" FROM datafos_records r LEFT JOIN users u ON u.id = r.userid");
        if with_sort_join {
            if let Some(field_id) = self.sort.content_field {
                let idx = push_int(bind_params, field_id);
                sql.push_str(&format!(
                    " LEFT JOIN datafos_content s ON s.recordid = r.id AND s.fieldid = ${}",
                    idx
                ));
            }
        }
        let in_list = push_id_list(bind_params, self.record_ids);
        sql.push_str(&format!(" WHERE r.dataid = ${} AND r.id IN {}", form, in_list));
        sql
    }

    /// Build the page query. Rows with equal `sortorder` come back in whatever
    /// order SQLite produces.
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let from = self.push_from_clause(&mut bind_params, true);
        let mut sql = format!(
            "SELECT {}, {} AS sortorder{} ORDER BY sortorder {}",
            RECORD_SELECT,
            self.sort.expression,
            from,
            self.sort.direction.as_sql()
        );

        if let Some(per_page) = self.pagination.per_page {
            let limit = push_int(&mut bind_params, i64::from(per_page));
            let offset = push_int(&mut bind_params, self.pagination.offset() as i64);
            sql.push_str(&format!(" LIMIT ${} OFFSET ${}", limit, offset));
        }

        (sql, bind_params)
    }

    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let from = self.push_from_clause(&mut bind_params, false);
        (format!("SELECT COUNT(*){}", from), bind_params)
    }
}
