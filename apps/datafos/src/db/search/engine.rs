//! Advanced search execution
//!
//! The SearchEngine is responsible for:
//! - Computing the visible candidate record ids of a form
//! - Narrowing them one criterion at a time, stopping once nothing is left
//! - Running the sorted, paginated presentation query and its count

use datafos_fields::{CriteriaMap, FieldDefinition};
use serde::Serialize;

use super::narrow::{plan_narrowing, Narrowing};
use super::query_builder::{build_candidate_sql, Pagination, PresentationQuery, ResolvedSort, SortSpec};
use crate::db::traits::RecordStore;
use crate::models::{RecordFilter, RecordRow};
use crate::Result;

/// One page of matching records and the number of matches overall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub records: Vec<RecordRow>,
    pub total_count: i64,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn record_ids(&self) -> Vec<i64> {
        self.records.iter().map(|row| row.record.id).collect()
    }
}

/// Search engine running advanced searches against a record store
#[derive(Clone)]
pub struct SearchEngine<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every record id of the form visible under `filter`.
    pub async fn candidate_ids(&self, form_id: i64, filter: &RecordFilter) -> Result<Vec<i64>> {
        let (sql, bind_params) = build_candidate_sql(form_id, filter);
        self.store.query_ids(&sql, &bind_params).await
    }

    /// Narrow `candidates` by each criterion in insertion order.
    ///
    /// Returns as soon as the set becomes empty.
    pub async fn narrow(
        &self,
        form_id: i64,
        fields: &[FieldDefinition],
        criteria: &CriteriaMap,
        mut candidates: Vec<i64>,
    ) -> Result<Vec<i64>> {
        for (key, criterion) in criteria.iter() {
            if candidates.is_empty() {
                break;
            }
            match plan_narrowing(form_id, *key, criterion, fields, &candidates) {
                Narrowing::Query { sql, params } => {
                    candidates = self.store.query_ids(&sql, &params).await?;
                }
                Narrowing::Empty => candidates.clear(),
                Narrowing::Unconstrained => continue,
            }
            tracing::debug!(criterion = key.id(), remaining = candidates.len(), "Narrowed candidates");
        }
        Ok(candidates)
    }

    /// Run an advanced search over one form.
    ///
    /// Records with equal sort values are returned in database order, which
    /// is not guaranteed to be stable between calls.
    pub async fn run_advanced_search(
        &self,
        form_id: i64,
        criteria: &CriteriaMap,
        sort: SortSpec,
        pagination: Pagination,
        filter: &RecordFilter,
    ) -> Result<SearchResult> {
        let fields = self.store.fields_for_form(form_id).await?;
        let candidates = self.candidate_ids(form_id, filter).await?;
        let initial = candidates.len();
        let candidates = self.narrow(form_id, &fields, criteria, candidates).await?;

        if candidates.is_empty() {
            tracing::debug!(form_id, criteria = criteria.len(), "Advanced search matched nothing");
            return Ok(SearchResult::empty());
        }

        let sort = ResolvedSort::resolve(sort, &fields);
        let query = PresentationQuery::new(form_id, &candidates, sort, pagination);

        let (sql, bind_params) = query.build_sql();
        let records = self.store.query_records(&sql, &bind_params).await?;

        let (count_sql, count_params) = query.build_count_sql();
        let total_count = self.store.count(&count_sql, &count_params).await?;

        tracing::debug!(
            form_id,
            criteria = criteria.len(),
            initial,
            matched = total_count,
            returned = records.len(),
            "Advanced search complete"
        );

        Ok(SearchResult {
            records,
            total_count,
        })
    }
}
