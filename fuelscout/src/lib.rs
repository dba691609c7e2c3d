//! fuelscout - nearby fuel prices that follow you
//!
//! This library is the orchestration core behind a map + list fuel-station
//! finder. It keeps a backend-ordered station snapshot in sync with the
//! user's position (or a pinned place search), rate-limits the price feed,
//! filters out unwanted brands, and keeps the map and the list pointing at
//! the same station.
//!
//! # Layout
//!
//! | Module           | Role                                                   |
//! |------------------|--------------------------------------------------------|
//! | [`location`]     | platform location watch with acquire/release           |
//! | [`fetch`]        | cooldown, forced spacing, single in-flight slot        |
//! | [`search`]       | pinned search board and mode gate                      |
//! | [`filter`]       | brand exclusion                                        |
//! | [`selection`]    | selection ⇄ scroll offset ⇄ map viewport               |
//! | [`layout`]       | animated map/list split                                |
//! | [`orchestrator`] | composes the above into one observable view state      |
//! | [`station`]      | station model, query service trait, HTTP adapter       |
//! | [`config`]       | `~/.fuelscout/config.ini`                              |
//! | [`logging`]      | tracing subscriber setup                               |
//! | [`testing`]      | in-memory service and platform doubles                 |

pub mod config;
pub mod coord;
pub mod fetch;
pub mod filter;
pub mod layout;
pub mod location;
pub mod logging;
pub mod orchestrator;
pub mod search;
pub mod selection;
pub mod station;
pub mod testing;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
