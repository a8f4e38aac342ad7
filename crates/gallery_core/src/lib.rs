//! Tab-driven coordination of per-category gallery fetches and the view model
//! presented for them.

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod interpolation;
pub mod selection;
pub mod tabs;
pub mod view_model;

pub use coordinator::{CategoryFetchState, CategoryStatus, FetchCoordinator, FetchTicket};
pub use engine::{EngineCommand, EngineOptions, GalleryEngine, SelectReply};
pub use error::{SelectionError, TabSetError};
pub use interpolation::{indicator_underline, indicator_weights};
pub use selection::{SelectionChange, SelectionState, TabSelection};
pub use tabs::{Tab, TabSet};
pub use view_model::{assemble, GalleryViewModel};
