use std::time::Duration;

use tokio::sync::watch;

use crate::{error::SelectionError, tabs::TabSet};

/// Which tab is active, plus where the indicator currently sits.
///
/// `transition_position` equals `active_index` at rest and moves continuously
/// while a tab change is animating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionState {
    pub active_index: usize,
    pub transition_position: f32,
}

impl SelectionState {
    pub fn at_rest(index: usize) -> Self {
        Self {
            active_index: index,
            transition_position: index as f32,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.transition_position == self.active_index as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Changed { previous: usize, current: usize },
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    elapsed: Duration,
    duration: Duration,
}

pub struct TabSelection {
    tab_count: usize,
    state: SelectionState,
    transition: Transition,
    observers: watch::Sender<SelectionState>,
}

impl TabSelection {
    pub fn new(tabs: &TabSet, transition_duration: Duration) -> Self {
        let state = SelectionState::at_rest(0);
        let (observers, _) = watch::channel(state);
        Self {
            tab_count: tabs.len(),
            state,
            transition: Transition {
                from: 0.0,
                elapsed: Duration::ZERO,
                duration: transition_duration,
            },
            observers,
        }
    }

    pub fn current(&self) -> SelectionState {
        self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.observers.subscribe()
    }

    /// The only way to change the active tab. Selecting the active tab again is a no-op.
    pub fn select_tab(&mut self, index: usize) -> Result<SelectionChange, SelectionError> {
        if index >= self.tab_count {
            return Err(SelectionError::InvalidIndex {
                index,
                tab_count: self.tab_count,
            });
        }
        let previous = self.state.active_index;
        if index == previous {
            return Ok(SelectionChange::Unchanged);
        }

        self.state.active_index = index;
        self.transition.from = self.state.transition_position;
        self.transition.elapsed = Duration::ZERO;
        if self.transition.duration.is_zero() {
            self.state.transition_position = index as f32;
        }
        self.notify();
        Ok(SelectionChange::Changed {
            previous,
            current: index,
        })
    }

    /// Gesture-driven position; never changes the active tab.
    pub fn set_transition_position(&mut self, position: f32) -> Result<(), SelectionError> {
        if !position.is_finite() {
            return Err(SelectionError::InvalidPosition(position));
        }
        let position = position.clamp(0.0, self.max_position());
        self.state.transition_position = position;
        self.transition.from = position;
        self.transition.elapsed = Duration::ZERO;
        self.notify();
        Ok(())
    }

    /// Moves the position linearly toward the active tab. Returns whether it moved.
    pub fn advance_transition(&mut self, elapsed: Duration) -> bool {
        if self.state.is_settled() {
            return false;
        }
        let target = self.state.active_index as f32;
        self.transition.elapsed = self.transition.elapsed.saturating_add(elapsed);
        let progress = if self.transition.duration.is_zero() {
            1.0
        } else {
            (self.transition.elapsed.as_secs_f32() / self.transition.duration.as_secs_f32())
                .min(1.0)
        };
        self.state.transition_position = if progress >= 1.0 {
            target
        } else {
            self.transition.from + (target - self.transition.from) * progress
        };
        self.notify();
        true
    }

    pub fn settle(&mut self) -> bool {
        if self.state.is_settled() {
            return false;
        }
        self.state.transition_position = self.state.active_index as f32;
        self.notify();
        true
    }

    fn max_position(&self) -> f32 {
        self.tab_count.saturating_sub(1) as f32
    }

    fn notify(&self) {
        self.observers.send_replace(self.state);
    }
}
