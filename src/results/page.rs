//! Paginated search results

use super::types::{Facets, RawResults, SearchHit};
use crate::models::Model;

/// One page of rehydrated search results
#[derive(Debug, Clone)]
pub struct SearchResults {
    page: u32,
    per_page: u32,
    total_entries: u64,
    hits: Vec<SearchHit>,
    raw: RawResults,
}

impl SearchResults {
    /// Wrap a page of hits.
    ///
    /// The total is inferred when the page is obviously the last one (a short
    /// first page, or a short non-empty later page); otherwise the service's
    /// `matches` count is used. The inference counts raw matches, so records
    /// skipped during rehydration do not shrink the total.
    pub fn new(page: u32, per_page: u32, hits: Vec<SearchHit>, raw: RawResults) -> Self {
        let page = page.max(1);
        let returned = raw.results.len() as u64;
        let offset = u64::from(per_page) * u64::from(page - 1);

        let total_entries = if returned < u64::from(per_page) && (page == 1 || returned > 0) {
            offset + returned
        } else {
            raw.matches
        };

        Self {
            page,
            per_page,
            total_entries,
            hits,
            raw,
        }
    }

    /// Current page (1-based)
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total_entries.div_ceil(u64::from(self.per_page))
    }

    /// Index of the first hit across all pages
    pub fn offset(&self) -> u64 {
        u64::from(self.per_page) * u64::from(self.page - 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        (u64::from(self.page) < self.total_pages()).then(|| self.page + 1)
    }

    /// Facet counts reported by the service
    pub fn facets(&self) -> &Facets {
        &self.raw.facets
    }

    /// The raw service response
    pub fn raw(&self) -> &RawResults {
        &self.raw
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchHit> {
        self.hits.iter()
    }

    /// Hits of type `M`, in result order
    pub fn records<M: Model>(&self) -> Vec<&M> {
        self.hits
            .iter()
            .filter_map(|hit| hit.downcast_ref::<M>())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a SearchHit;
    type IntoIter = std::slice::Iter<'a, SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
