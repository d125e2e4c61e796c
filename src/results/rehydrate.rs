//! Mapping raw matches back to application records

use super::types::{RawResults, SearchHit};
use crate::error::{Result, TankerError};
use crate::models::ModelRegistry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Load the records behind a page of raw matches, in ranking order.
///
/// Matches are grouped by type and each type is fetched with a single
/// `RecordStore::find` call. Matches whose record no longer exists in the
/// store are skipped.
pub async fn rehydrate(registry: &ModelRegistry, raw: &RawResults) -> Result<Vec<SearchHit>> {
    if raw.results.is_empty() {
        return Ok(Vec::new());
    }

    let mut keys: Vec<(&str, i64)> = Vec::with_capacity(raw.results.len());
    let mut groups: Vec<(&str, Vec<i64>)> = Vec::new();

    for raw_match in &raw.results {
        let (type_name, id) = raw_match
            .type_tag()
            .zip(raw_match.record_id())
            .ok_or_else(|| TankerError::MalformedMatch(format!("{:?}", raw_match)))?;

        match groups.iter_mut().find(|(name, _)| *name == type_name) {
            Some((_, ids)) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            None => groups.push((type_name, vec![id])),
        }
        keys.push((type_name, id));
    }

    let mut fetched: HashMap<(&str, i64), SearchHit> = HashMap::with_capacity(keys.len());
    for (type_name, ids) in &groups {
        let model = registry.get(type_name)?;
        let hits = model.find(ids).await?;
        debug!(
            "Loaded {} of {} {} records",
            hits.len(),
            ids.len(),
            type_name
        );
        for hit in hits {
            fetched.insert((*type_name, hit.id()), hit);
        }
    }

    Ok(keys
        .into_iter()
        .filter_map(|key| match fetched.get(&key) {
            Some(hit) => Some(hit.clone()),
            None => {
                warn!("{} {} matched but is missing from the record store", key.0, key.1);
                None
            }
        })
        .collect())
}
