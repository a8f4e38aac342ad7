use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use gallery_client::ClientError;
use shared::domain::{CategoryKey, GalleryItem};
use tracing::{debug, info, warn};

use crate::tabs::TabSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Per-category slot. Items survive a refetch and a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFetchState {
    pub is_loading: bool,
    pub items: Arc<[GalleryItem]>,
    pub has_loaded: bool,
    pub last_error: Option<ClientError>,
}

impl Default for CategoryFetchState {
    fn default() -> Self {
        Self {
            is_loading: false,
            items: Vec::new().into(),
            has_loaded: false,
            last_error: None,
        }
    }
}

impl CategoryFetchState {
    pub fn status(&self) -> CategoryStatus {
        if self.is_loading {
            CategoryStatus::Loading
        } else if self.last_error.is_some() {
            CategoryStatus::Failed
        } else if self.has_loaded {
            CategoryStatus::Loaded
        } else {
            CategoryStatus::Idle
        }
    }
}

/// Proof that a fetch was started; the holder must report back through
/// [`FetchCoordinator::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub category: CategoryKey,
}

pub struct FetchCoordinator {
    categories: BTreeMap<CategoryKey, CategoryFetchState>,
    in_flight: HashSet<CategoryKey>,
}

impl FetchCoordinator {
    pub fn new(tabs: &TabSet) -> Self {
        Self {
            categories: tabs
                .iter()
                .map(|tab| (tab.key.clone(), CategoryFetchState::default()))
                .collect(),
            in_flight: HashSet::new(),
        }
    }

    /// Marks `category` loading and hands out a ticket, unless a fetch for it
    /// is already running.
    pub fn begin(&mut self, category: &CategoryKey) -> Option<FetchTicket> {
        let Some(slot) = self.categories.get_mut(category) else {
            warn!(category = %category, "gallery: fetch requested for unknown category");
            return None;
        };
        if self.in_flight.contains(category) {
            debug!(category = %category, "gallery: fetch already in flight, skipping");
            return None;
        }

        slot.is_loading = true;
        self.in_flight.insert(category.clone());
        info!(
            category = %category,
            stale_items = slot.items.len(),
            "gallery: fetch started"
        );
        Some(FetchTicket {
            category: category.clone(),
        })
    }

    /// Applies a finished fetch. Returns false when nothing was in flight for
    /// the category, in which case the result is dropped.
    pub fn complete(
        &mut self,
        category: &CategoryKey,
        result: Result<Vec<GalleryItem>, ClientError>,
    ) -> bool {
        if !self.in_flight.remove(category) {
            warn!(category = %category, "gallery: dropping result with no fetch in flight");
            return false;
        }
        let Some(slot) = self.categories.get_mut(category) else {
            return false;
        };

        slot.is_loading = false;
        match result {
            Ok(items) => {
                info!(category = %category, items = items.len(), "gallery: fetch completed");
                slot.items = items.into();
                slot.has_loaded = true;
                slot.last_error = None;
            }
            Err(err) => {
                warn!(
                    category = %category,
                    error = %err,
                    kept_items = slot.items.len(),
                    "gallery: fetch failed"
                );
                slot.last_error = Some(err);
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self, category: &str) -> bool {
        self.in_flight.contains(category)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn category(&self, category: &str) -> Option<&CategoryFetchState> {
        self.categories.get(category)
    }

    pub fn categories(&self) -> &BTreeMap<CategoryKey, CategoryFetchState> {
        &self.categories
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
