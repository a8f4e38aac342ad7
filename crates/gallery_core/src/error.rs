use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("tab index {index} is out of range for {tab_count} tabs")]
    InvalidIndex { index: usize, tab_count: usize },
    #[error("transition position {0} is not a finite number")]
    InvalidPosition(f32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabSetError {
    #[error("a tab set needs at least one tab")]
    Empty,
    #[error("tab key must not be empty (tab {display_index})")]
    EmptyKey { display_index: usize },
    #[error("duplicate tab key '{0}'")]
    DuplicateKey(String),
}
