//! Search request parsing.
//!
//! Field criteria come from the field adapters (`f_<id>...`); the reserved
//! pseudo-fields use `u_fn`, `u_ln`, `u_tags[]`, `u_timemodified` and
//! `u_approved`. A parameter present in the request replaces the previous
//! default, even when it is empty.

use datafos_fields::{
    field_adapter, strip_tags, CriteriaMap, CriterionKey, FieldDefinition, RequestParams,
    SearchCriterion,
};

use super::query_builder::{Pagination, SortDirection, SortKey, SortSpec};
use crate::config::SearchConfig;

fn text_param(request: &RequestParams, name: &str) -> Option<String> {
    request
        .first(name)
        .map(|v| strip_tags(v).trim().to_string())
}

/// Assemble the criteria of an advanced search.
pub fn build_search_criteria(
    fields: &[FieldDefinition],
    request: &RequestParams,
    defaults: Option<&CriteriaMap>,
) -> CriteriaMap {
    let mut criteria = CriteriaMap::new();

    for field in fields {
        let previous = defaults.and_then(|d| d.field_value(field.id));
        if let Some(value) = field_adapter(field).parse_search_input(field, request, previous) {
            criteria.insert(CriterionKey::Field(field.id), SearchCriterion::Field(value));
        }
    }

    let default_of = |key: CriterionKey| defaults.and_then(|d| d.get(key)).cloned();

    match text_param(request, "u_fn") {
        Some(v) if !v.is_empty() => {
            criteria.insert(CriterionKey::FirstName, SearchCriterion::FirstName(v))
        }
        Some(_) => {}
        None => {
            if let Some(c) = default_of(CriterionKey::FirstName) {
                criteria.insert(CriterionKey::FirstName, c);
            }
        }
    }

    match text_param(request, "u_ln") {
        Some(v) if !v.is_empty() => {
            criteria.insert(CriterionKey::LastName, SearchCriterion::LastName(v))
        }
        Some(_) => {}
        None => {
            if let Some(c) = default_of(CriterionKey::LastName) {
                criteria.insert(CriterionKey::LastName, c);
            }
        }
    }

    if request.contains("u_tags") {
        let tags: Vec<String> = request
            .all("u_tags")
            .iter()
            .map(|t| strip_tags(t).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            criteria.insert(CriterionKey::Tags, SearchCriterion::Tags(tags));
        }
    } else if let Some(c) = default_of(CriterionKey::Tags) {
        criteria.insert(CriterionKey::Tags, c);
    }

    match request.first("u_timemodified") {
        Some(v) => {
            if let Ok(bound) = v.trim().parse::<i64>() {
                if bound > 0 {
                    criteria.insert(CriterionKey::TimeModified, SearchCriterion::TimeModified(bound));
                }
            }
        }
        None => {
            if let Some(c) = default_of(CriterionKey::TimeModified) {
                criteria.insert(CriterionKey::TimeModified, c);
            }
        }
    }

    match request.first("u_approved").map(str::trim) {
        Some("") => {}
        Some(_) => {
            let approved = request.flag("u_approved").unwrap_or(false);
            criteria.insert(CriterionKey::Approved, SearchCriterion::Approved(approved));
        }
        None => {
            if let Some(c) = default_of(CriterionKey::Approved) {
                criteria.insert(CriterionKey::Approved, c);
            }
        }
    }

    criteria
}

/// Sort from `sort` (field id or reserved negative id) and `order`.
pub fn parse_sort(request: &RequestParams) -> SortSpec {
    let key = request
        .first("sort")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(SortKey::from_id)
        .unwrap_or_default();
    let direction = request
        .first("order")
        .map(SortDirection::from_param)
        .unwrap_or_default();
    SortSpec::new(key, direction)
}

/// Page from `page` (zero-based) and `perpage`, clamped to the configured maximum.
pub fn parse_pagination(request: &RequestParams, config: &SearchConfig) -> Pagination {
    let page = request
        .first("page")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let per_page = request
        .first("perpage")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(config.default_per_page)
        .min(config.max_per_page);
    Pagination::new(page, per_page)
}
