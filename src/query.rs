//! Listing queries over submitted records: merge with samples, order by recency,
//! search and filter by status.

use std::cmp::Reverse;

use serde::de::DeserializeOwned;

use crate::record_model::{StatusFilter, SubmissionRecord};
use crate::slot_store::{LocalStore, SlotStorage};

/// Concatenates persisted and baseline records, newest first.
///
/// Records are ordered by [`SubmissionRecord::effective_timestamp`]; records without
/// a usable timestamp go last. The sort is stable, so re-sorting an already sorted
/// sequence keeps its order.
pub fn merge_and_sort<R: SubmissionRecord + Clone>(persisted: &[R], baseline: &[R]) -> Vec<R> {
    let mut merged: Vec<R> = persisted.iter().chain(baseline).cloned().collect();
    merged.sort_by_key(|record| Reverse(record.effective_timestamp()));
    merged
}

/// Keeps records whose searchable text contains `search` (case-insensitive) and whose
/// status passes `status`. An empty search matches everything; input order is kept.
pub fn filter_records<R: SubmissionRecord + Clone>(
    records: &[R],
    search: &str,
    status: StatusFilter,
) -> Vec<R> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|record| status.matches(record.status()))
        .filter(|record| {
            needle.is_empty()
                || record
                    .search_texts()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Everything a listing screen shows for one record kind.
pub fn load_history<S, R>(
    store: &LocalStore<S>,
    key: &str,
    baseline: &[R],
    search: &str,
    status: StatusFilter,
) -> Vec<R>
where
    S: SlotStorage,
    R: SubmissionRecord + Clone + DeserializeOwned,
{
    let persisted: Vec<R> = store.load(key, Vec::new());
    let merged = merge_and_sort(&persisted, baseline);
    filter_records(&merged, search, status)
}
