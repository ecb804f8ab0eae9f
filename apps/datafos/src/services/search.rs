use datafos_fields::{CriteriaMap, RequestParams};

use super::FormManager;
use crate::db::search::{build_search_criteria, parse_pagination, parse_sort, Pagination, SortSpec};
use crate::db::{RecordStore, SearchResult};
use crate::models::RecordFilter;
use crate::Result;

/// A parsed search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub criteria: CriteriaMap,
    pub sort: SortSpec,
    pub pagination: Pagination,
}

impl<S: RecordStore> FormManager<S> {
    /// Run an advanced search over a form.
    pub async fn search(
        &self,
        form_id: i64,
        criteria: &CriteriaMap,
        sort: SortSpec,
        pagination: Pagination,
        filter: &RecordFilter,
    ) -> Result<SearchResult> {
        self.form(form_id).await?;
        self.engine
            .run_advanced_search(form_id, criteria, sort, pagination, filter)
            .await
    }

    /// Parse request parameters into criteria, sort and page.
    ///
    /// `defaults` are the criteria of the previous search, used for every
    /// parameter the request does not carry.
    pub async fn parse_search_request(
        &self,
        form_id: i64,
        request: &RequestParams,
        defaults: Option<&CriteriaMap>,
    ) -> Result<SearchRequest> {
        let fields = self.fields(form_id).await?;
        Ok(SearchRequest {
            criteria: build_search_criteria(&fields, request, defaults),
            sort: parse_sort(request),
            pagination: parse_pagination(request, &self.search_config),
        })
    }
}
