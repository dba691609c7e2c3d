//! Fetch admission control.
//!
//! The scheduler decides *whether* a fetch may start; the orchestrator owns
//! the request future itself. Two gates apply, both measured from the start
//! of the previous fetch:
//!
//! ```text
//!                    in flight?      since last start
//! automatic  ──────► reject ───────► < poll_interval       → CoolingDown
//! forced     ──────► supersede ────► < min_forced_spacing  → TooSoon
//! ```
//!
//! Every accepted fetch receives a new generation. Only the completion that
//! carries the latest generation is applied; anything older is stale.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::coord::GeoPoint;
use crate::station::{FuelType, NearbyQuery, SortOption};

/// Minimum time between automatic (location-driven) fetch starts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Minimum time between forced (user-driven) fetch starts.
pub const DEFAULT_MIN_FORCED_SPACING: Duration = Duration::from_secs(1);

/// Timing policy for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub poll_interval: Duration,
    pub min_forced_spacing: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_forced_spacing: DEFAULT_MIN_FORCED_SPACING,
        }
    }
}

impl FetchPolicy {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_min_forced_spacing(mut self, spacing: Duration) -> Self {
        self.min_forced_spacing = spacing;
        self
    }
}

/// A live-mode fetch request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: u32,
    pub fuel_type: FuelType,
    pub sort: SortOption,
    pub forced: bool,
}

impl FetchQuery {
    pub fn new(center: GeoPoint, radius_m: u32, fuel_type: FuelType, sort: SortOption) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_m,
            fuel_type,
            sort,
            forced: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// The query as sent to the station service.
    pub fn to_nearby(&self) -> NearbyQuery {
        NearbyQuery {
            center: GeoPoint::new(self.latitude, self.longitude),
            radius_m: self.radius_m,
            fuel_type: self.fuel_type,
            sort: self.sort,
        }
    }
}

/// Outcome of asking the scheduler to start a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Go ahead; tag the completion with this generation.
    Accepted { generation: u64 },

    /// An automatic trigger arrived while a fetch is outstanding.
    InFlight,

    /// Automatic trigger inside the poll interval.
    CoolingDown { remaining: Duration },

    /// Forced trigger inside the minimum forced spacing.
    TooSoon { remaining: Duration },
}

impl FetchDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FetchDecision::Accepted { .. })
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            FetchDecision::Accepted { generation } => Some(*generation),
            _ => None,
        }
    }
}

/// Single-slot fetch scheduler with cooldown and forced-spacing gates.
#[derive(Debug)]
pub struct FetchScheduler {
    policy: FetchPolicy,
    last_started: Option<Instant>,
    generation: u64,
    in_flight: Option<u64>,
}

impl Default for FetchScheduler {
    fn default() -> Self {
        Self::new(FetchPolicy::default())
    }
}

impl FetchScheduler {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            last_started: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Ask to start a fetch at `now`.
    ///
    /// A forced fetch accepted while another is outstanding takes over the
    /// slot; the older generation will be rejected by [`finish`](Self::finish).
    pub fn try_begin(&mut self, forced: bool, now: Instant) -> FetchDecision {
        if !forced && self.in_flight.is_some() {
            debug!("FetchScheduler: automatic fetch skipped, request in flight");
            return FetchDecision::InFlight;
        }

        if let Some(last) = self.last_started {
            let elapsed = now.saturating_duration_since(last);
            let gate = if forced {
                self.policy.min_forced_spacing
            } else {
                self.policy.poll_interval
            };

            if elapsed < gate {
                let remaining = gate - elapsed;
                debug!(
                    forced,
                    remaining_ms = remaining.as_millis() as u64,
                    "FetchScheduler: fetch rejected"
                );
                return if forced {
                    FetchDecision::TooSoon { remaining }
                } else {
                    FetchDecision::CoolingDown { remaining }
                };
            }
        }

        if let Some(superseded) = self.in_flight {
            debug!(superseded, "FetchScheduler: forced fetch supersedes in-flight request");
        }

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.last_started = Some(now);
        FetchDecision::Accepted {
            generation: self.generation,
        }
    }

    /// Mark a fetch complete. Returns `true` if the result is current and
    /// should be applied.
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
            true
        } else {
            debug!(
                generation,
                latest = self.generation,
                "FetchScheduler: stale completion ignored"
            );
            false
        }
    }

    /// Forget the outstanding request without applying anything.
    pub fn abandon(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            debug!(generation, "FetchScheduler: in-flight request abandoned");
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Generation of the most recently accepted fetch (0 before any).
    pub fn latest_generation(&self) -> u64 {
        self.generation
    }

    pub fn last_started(&self) -> Option<Instant> {
        self.last_started
    }
}
