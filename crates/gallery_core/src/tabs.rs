use std::{collections::HashSet, sync::Arc};

use shared::domain::CategoryKey;

use crate::error::TabSetError;

pub const GALLERY_CATEGORY: &str = "gallery";
pub const WONDER_SELF_CATEGORY: &str = "wonderSelf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub key: CategoryKey,
    pub title: String,
    pub display_index: usize,
}

/// Fixed, ordered, non-empty set of tabs with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSet {
    tabs: Arc<[Tab]>,
}

impl TabSet {
    pub fn new<K, T>(entries: impl IntoIterator<Item = (K, T)>) -> Result<Self, TabSetError>
    where
        K: Into<String>,
        T: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut tabs = Vec::new();
        for (display_index, (key, title)) in entries.into_iter().enumerate() {
            let key = key.into();
            if key.trim().is_empty() {
                return Err(TabSetError::EmptyKey { display_index });
            }
            if !seen.insert(key.clone()) {
                return Err(TabSetError::DuplicateKey(key));
            }
            tabs.push(Tab {
                key: CategoryKey(key),
                title: title.into(),
                display_index,
            });
        }
        if tabs.is_empty() {
            return Err(TabSetError::Empty);
        }
        Ok(Self { tabs: tabs.into() })
    }

    /// "My Gallery" and "WonderSelf", in that order.
    pub fn gallery_default() -> Self {
        let tabs = vec![
            Tab {
                key: CategoryKey::from(GALLERY_CATEGORY),
                title: "My Gallery".to_string(),
                display_index: 0,
            },
            Tab {
                key: CategoryKey::from(WONDER_SELF_CATEGORY),
                title: "WonderSelf".to_string(),
                display_index: 1,
            },
        ];
        Self { tabs: tabs.into() }
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn first(&self) -> &Tab {
        &self.tabs[0]
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.key.as_str() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }
}

impl Default for TabSet {
    fn default() -> Self {
        Self::gallery_default()
    }
}
