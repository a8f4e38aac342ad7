//! Reactive pipeline tying selection, fetch coordination and view model
//! publication together.
//!
//! The engine is the single owner of all mutable state. Client calls run in
//! spawned tasks that only report their outcome back over a channel; every
//! mutation and every publish happens on the engine's own loop.

use std::{future::Future, sync::Arc, time::Duration};

use gallery_client::{ClientError, GalleryClient};
use shared::domain::{CategoryKey, GalleryItem};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    coordinator::{FetchCoordinator, FetchTicket},
    error::SelectionError,
    selection::{SelectionChange, SelectionState, TabSelection},
    tabs::TabSet,
    view_model::{assemble, GalleryViewModel},
};

pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub transition_duration: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            transition_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

pub type SelectReply = oneshot::Sender<Result<SelectionChange, SelectionError>>;

pub enum EngineCommand {
    SelectTab {
        index: usize,
        reply: Option<SelectReply>,
    },
    SetTransitionPosition(f32),
    AdvanceTransition(Duration),
    SettleTransition,
}

enum FetchOutcome {
    Items {
        category: CategoryKey,
        result: Result<Vec<GalleryItem>, ClientError>,
    },
    TotalCount(Result<u64, ClientError>),
}

pub struct GalleryEngine {
    client: Arc<dyn GalleryClient>,
    tabs: TabSet,
    selection: TabSelection,
    coordinator: FetchCoordinator,
    total_count: u64,
    count_pending: bool,
    revision: u64,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    snapshots: watch::Sender<Arc<GalleryViewModel>>,
}

impl GalleryEngine {
    /// Publishes the initial snapshot, then starts the one-off total count
    /// fetch and the fetch for the initially active tab.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(client: Arc<dyn GalleryClient>, tabs: TabSet, options: EngineOptions) -> Self {
        let selection = TabSelection::new(&tabs, options.transition_duration);
        let coordinator = FetchCoordinator::new(&tabs);
        let initial = assemble(0, &tabs, selection.current(), coordinator.categories(), 0);
        let (snapshots, _) = watch::channel(Arc::new(initial));
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        let mut engine = Self {
            client,
            tabs,
            selection,
            coordinator,
            total_count: 0,
            count_pending: false,
            revision: 0,
            outcomes_tx,
            outcomes_rx,
            snapshots,
        };
        info!(tabs = engine.tabs.len(), "gallery: engine starting");
        let active_index = engine.selection.current().active_index;
        engine.spawn_count_fetch();
        engine.activate(active_index);
        engine
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GalleryViewModel>> {
        self.snapshots.subscribe()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionState> {
        self.selection.subscribe()
    }

    pub fn snapshot(&self) -> Arc<GalleryViewModel> {
        self.snapshots.borrow().clone()
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.current()
    }

    pub fn is_idle(&self) -> bool {
        !self.count_pending && self.coordinator.in_flight_count() == 0
    }

    pub fn select_tab(&mut self, index: usize) -> Result<SelectionChange, SelectionError> {
        let change = self.selection.select_tab(index)?;
        if let SelectionChange::Changed { previous, current } = change {
            info!(from = previous, to = current, "gallery: tab selected");
            // Selection must be visible before the fetch it triggers starts.
            self.publish();
            self.activate(current);
        }
        Ok(change)
    }

    pub fn set_transition_position(&mut self, position: f32) -> Result<(), SelectionError> {
        self.selection.set_transition_position(position)?;
        self.publish();
        Ok(())
    }

    pub fn advance_transition(&mut self, elapsed: Duration) {
        if self.selection.advance_transition(elapsed) {
            self.publish();
        }
    }

    pub fn settle_transition(&mut self) {
        if self.selection.settle() {
            self.publish();
        }
    }

    pub fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::SelectTab { index, reply } => {
                let result = self.select_tab(index);
                if let Err(err) = &result {
                    warn!(error = %err, "gallery: rejected tab selection");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            EngineCommand::SetTransitionPosition(position) => {
                if let Err(err) = self.set_transition_position(position) {
                    warn!(error = %err, "gallery: rejected transition position");
                }
            }
            EngineCommand::AdvanceTransition(elapsed) => self.advance_transition(elapsed),
            EngineCommand::SettleTransition => self.settle_transition(),
        }
    }

    /// Waits for the next fetch to finish and applies it.
    #[cfg(test)]
    pub(crate) async fn process_next_outcome(&mut self) {
        if let Some(outcome) = self.outcomes_rx.recv().await {
            self.apply_outcome(outcome);
        }
    }

    #[cfg(test)]
    pub(crate) async fn run_until_idle(&mut self) {
        while !self.is_idle() {
            self.process_next_outcome().await;
        }
    }

    /// Serves commands and fetch completions until every command sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle_command(command);
                }
                Some(outcome) = self.outcomes_rx.recv() => self.apply_outcome(outcome),
            }
        }
        info!(
            in_flight = self.coordinator.in_flight_count(),
            "gallery: engine stopped"
        );
    }

    fn activate(&mut self, index: usize) {
        let Some(tab) = self.tabs.get(index) else {
            return;
        };
        let category = tab.key.clone();
        let Some(ticket) = self.coordinator.begin(&category) else {
            return;
        };
        self.publish();
        self.spawn_items_fetch(ticket);
    }

    fn spawn_items_fetch(&self, ticket: FetchTicket) {
        let client = Arc::clone(&self.client);
        let outcomes = self.outcomes_tx.clone();
        let category = ticket.category.clone();
        tokio::spawn(async move {
            let result = supervised(async move { client.items(&category).await }).await;
            let _ = outcomes.send(FetchOutcome::Items {
                category: ticket.category,
                result,
            });
        });
    }

    fn spawn_count_fetch(&mut self) {
        self.count_pending = true;
        let client = Arc::clone(&self.client);
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = supervised(async move { client.total_count().await }).await;
            let _ = outcomes.send(FetchOutcome::TotalCount(result));
        });
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Items { category, result } => {
                if self.coordinator.complete(&category, result) {
                    self.publish();
                }
            }
            FetchOutcome::TotalCount(result) => {
                self.count_pending = false;
                match result {
                    Ok(count) => {
                        info!(count, "gallery: total count updated");
                        self.total_count = count;
                    }
                    Err(err) => {
                        warn!(error = %err, kept = self.total_count, "gallery: total count fetch failed");
                    }
                }
                self.publish();
            }
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = assemble(
            self.revision,
            &self.tabs,
            self.selection.current(),
            self.coordinator.categories(),
            self.total_count,
        );
        debug!(revision = self.revision, "gallery: view model published");
        self.snapshots.send_replace(Arc::new(snapshot));
    }
}

/// Runs a client call in its own task; a panic there becomes a
/// `ClientError::Network` so every fetch still reports an outcome.
async fn supervised<T, F>(fetch: F) -> Result<T, ClientError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    match tokio::spawn(fetch).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "gallery: fetch task aborted");
            Err(ClientError::Network(format!("fetch task failed: {err}")))
        }
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
