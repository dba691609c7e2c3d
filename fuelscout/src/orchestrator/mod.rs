//! Orchestration core.
//!
//! The [`Orchestrator`] composes the leaf components into one observable
//! [`ViewState`]. All inputs are processed one at a time on a single task:
//!
//! ```text
//!  LocationSource ──samples──┐
//!  SearchPinBoard ──pins─────┤                         ┌──► watch<ViewState>
//!  Settings ────────changes──┼──► Orchestrator ────────┼──► ToMap  (MapCommand)
//!  OrchestratorHandle ─events┤      │      ▲           └──► ToList (ListCommand)
//!  timers (debounce, frames, ┘      ▼      │
//!          fix timeout)        FetchScheduler ── StationQueryService
//!                              (one in flight, generation-tagged)
//! ```
//!
//! # Reactive rules
//!
//! | Input                                  | Live                 | Pinned               |
//! |----------------------------------------|----------------------|----------------------|
//! | location sample                        | automatic fetch      | ignored              |
//! | fuel type / sort changed               | forced nearby fetch  | forced area re-query |
//! | radius changed                         | forced nearby fetch  | no effect            |
//! | excluded brands changed                | re-filter only       | re-filter only       |
//! | pin set                                | switch to pinned     | adopt the new pin    |
//! | clear pin                              | no effect            | back to live, forced |
//!
//! Every failure ends up in the view state: a failed fetch clears the
//! results and sets a dismissible error.

mod config;
mod core;
mod events;
mod handle;
mod state;

pub use config::{
    OrchestratorConfig, Settings, DEFAULT_EVENT_BUFFER, DEFAULT_FIX_TIMEOUT, DEFAULT_RADIUS_M,
};
pub use core::{Orchestrator, OrchestratorChannels};
pub use events::Event;
pub use handle::{HandleClosed, OrchestratorHandle};
pub use state::{Mode, ViewError, ViewState};
