//! Stateless operations over a [`SampleQueriesList`].
//!
//! Every function takes the list by value or reference and returns a new
//! value; nothing here keeps state between calls.

use models::sample_query::{SampleQueriesList, SampleQuery};
use uuid::Uuid;

use super::ordering::order_samples;
use crate::errors::ServiceError;

pub fn find_by_id(list: &SampleQueriesList, id: Uuid) -> Option<&SampleQuery> {
    list.sample_queries.iter().find(|q| q.id == id)
}

pub fn exists(list: &SampleQueriesList, id: Uuid) -> bool {
    find_by_id(list, id).is_some()
}

/// Append `record`. The caller assigns a fresh id beforehand; uniqueness is not re-checked.
pub fn insert(mut list: SampleQueriesList, record: SampleQuery) -> SampleQueriesList {
    list.sample_queries.push(record);
    list
}

/// Replace the record with `id` in place. The stored record keeps `id`
/// whatever id `record` carries. Fails with `NotFound` rather than appending
/// when no record matches.
pub fn replace(
    mut list: SampleQueriesList,
    mut record: SampleQuery,
    id: Uuid,
) -> Result<SampleQueriesList, ServiceError> {
    let slot = list
        .sample_queries
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or_else(|| ServiceError::NotFound(format!("No sample query found with id: {id}")))?;
    record.id = id;
    *slot = record;
    Ok(list)
}

/// Drop the record with `id`; an unknown id leaves the list unchanged.
pub fn remove(mut list: SampleQueriesList, id: Uuid) -> SampleQueriesList {
    list.sample_queries.retain(|q| q.id != id);
    list
}

pub fn serialize(list: &SampleQueriesList) -> Result<String, ServiceError> {
    Ok(serde_json::to_string_pretty(list)?)
}

pub fn deserialize(text: &str, apply_ordering: bool) -> Result<SampleQueriesList, ServiceError> {
    let list: SampleQueriesList = serde_json::from_str(text)?;
    Ok(if apply_ordering { order_samples(list) } else { list })
}

/// Case-insensitive substring match on category, human name or tip.
pub fn matches_search(record: &SampleQuery, query: &str) -> bool {
    let needle = query.to_lowercase();
    [record.category.as_deref(), record.human_name.as_deref(), record.tip.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn search(list: &SampleQueriesList, query: &str) -> Vec<SampleQuery> {
    list.sample_queries
        .iter()
        .filter(|q| matches_search(q, query))
        .cloned()
        .collect()
}
