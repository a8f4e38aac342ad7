use std::collections::BTreeMap;

use shared::domain::CategoryKey;

use crate::{
    coordinator::{CategoryFetchState, CategoryStatus},
    interpolation::{indicator_underline, indicator_weights},
    selection::SelectionState,
    tabs::{Tab, TabSet},
};

/// Immutable snapshot handed to presentation. A new one is assembled for
/// every state change; `revision` increases with each publish.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryViewModel {
    pub revision: u64,
    pub tabs: TabSet,
    pub active_index: usize,
    pub active_tab: Tab,
    pub transition_position: f32,
    pub total_art_count: u64,
    pub categories: BTreeMap<CategoryKey, CategoryFetchState>,
    pub indicator_weights: Vec<f32>,
}

impl GalleryViewModel {
    pub fn category(&self, key: &str) -> Option<&CategoryFetchState> {
        self.categories.get(key)
    }

    pub fn active_category(&self) -> Option<&CategoryFetchState> {
        self.categories.get(&self.active_tab.key)
    }

    pub fn status(&self, key: &str) -> CategoryStatus {
        self.category(key)
            .map(CategoryFetchState::status)
            .unwrap_or(CategoryStatus::Idle)
    }

    pub fn underline(&self, index: usize) -> bool {
        indicator_underline(&self.selection(), index)
    }

    pub fn selection(&self) -> SelectionState {
        SelectionState {
            active_index: self.active_index,
            transition_position: self.transition_position,
        }
    }
}

pub fn assemble(
    revision: u64,
    tabs: &TabSet,
    selection: SelectionState,
    categories: &BTreeMap<CategoryKey, CategoryFetchState>,
    total_count: u64,
) -> GalleryViewModel {
    let active_tab = tabs
        .get(selection.active_index)
        .unwrap_or_else(|| tabs.first())
        .clone();
    GalleryViewModel {
        revision,
        tabs: tabs.clone(),
        active_index: active_tab.display_index,
        active_tab,
        transition_position: selection.transition_position,
        total_art_count: total_count,
        categories: categories.clone(),
        indicator_weights: indicator_weights(&selection, tabs.len()),
    }
}
