//! Map/list split animation.
//!
//! The split is a single fraction: the map's share of the vertical space.
//! It rests at one of two targets and moves between them with an eased
//! animation.
//!
//! # State Machine
//!
//! ```text
//!              scroll past threshold          debounce elapsed
//!   Resting ─────────────────────────► Pending ─────────────────► Animating
//!      ▲                                  │                           │
//!      │          back to top / marker    │  back to top / marker     │
//!      │         (cancels pending, may ───┘  (supersedes, from the    │
//!      │          start an animation)         current value)          │
//!      └──────────────────────────────────────────────────────────────┘
//!                               duration elapsed
//! ```
//!
//! Every qualifying scroll event restarts the debounce, so the list-biased
//! target only fires once scrolling has paused.
//!
//! A marker selection scrolls the list itself. Until that scroll lands, or
//! `selection_settle` runs out, scroll events past the threshold are taken
//! as programmatic and leave the split alone.
//!
//! A new target is adopted only when it differs from the current target by
//! more than `epsilon`. Callers pass `now` explicitly and wake themselves at
//! [`LayoutAnimator::next_deadline`].

mod easing;

pub use easing::Easing;

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Map share while the list is at the top.
pub const DEFAULT_MAP_BIASED: f64 = 0.55;

/// Map share once the user has scrolled into the list.
pub const DEFAULT_LIST_BIASED: f64 = 0.25;

pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 30.0;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(250);

/// How long after a marker selection its commanded scroll may take to land.
pub const DEFAULT_SELECTION_SETTLE: Duration = Duration::from_millis(500);

/// Distance within which a reported offset counts as the commanded one.
pub const SCROLL_MATCH_TOLERANCE_PX: f64 = 1.0;

/// Frame cadence while an animation runs.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Minimum target change worth animating.
pub const EPSILON: f64 = 0.01;

/// Tunables for [`LayoutAnimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub map_biased: f64,
    pub list_biased: f64,
    pub scroll_threshold_px: f64,
    pub debounce: Duration,
    pub duration: Duration,
    pub frame_interval: Duration,
    pub epsilon: f64,
    pub easing: Easing,
    pub selection_settle: Duration,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            map_biased: DEFAULT_MAP_BIASED,
            list_biased: DEFAULT_LIST_BIASED,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            debounce: DEFAULT_DEBOUNCE,
            duration: DEFAULT_ANIMATION_DURATION,
            frame_interval: FRAME_INTERVAL,
            epsilon: EPSILON,
            easing: Easing::default(),
            selection_settle: DEFAULT_SELECTION_SETTLE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f64,
    to: f64,
    started_at: Instant,
    next_frame: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    target: f64,
    fire_at: Instant,
}

/// A scroll the app asked the list to perform.
#[derive(Debug, Clone, Copy)]
struct CommandedScroll {
    offset_px: f64,
    until: Instant,
}

/// Derives the split fraction from scroll position and selection events.
#[derive(Debug)]
pub struct LayoutAnimator {
    config: LayoutConfig,
    /// Resting value, or the value the running animation will land on.
    value: f64,
    animation: Option<Animation>,
    pending: Option<Pending>,
    commanded: Option<CommandedScroll>,
    mounted: bool,
}

impl Default for LayoutAnimator {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutAnimator {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            value: config.map_biased,
            animation: None,
            pending: None,
            commanded: None,
            mounted: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// First mount: set the map-biased split directly, no animation.
    /// Later calls are ignored.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.value = self.config.map_biased;
        self.animation = None;
        self.pending = None;
        self.commanded = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Fraction to render at `now`.
    pub fn fraction_at(&self, now: Instant) -> f64 {
        match self.animation {
            Some(anim) => {
                let elapsed = now.saturating_duration_since(anim.started_at);
                let t = if self.config.duration.is_zero() {
                    1.0
                } else {
                    elapsed.as_secs_f64() / self.config.duration.as_secs_f64()
                };
                anim.from + (anim.to - anim.from) * self.config.easing.apply(t)
            }
            None => self.value,
        }
    }

    /// The target the split is heading for, including a pending one.
    pub fn target(&self) -> f64 {
        self.pending.map(|p| p.target).unwrap_or(self.value)
    }

    pub fn is_list_biased(&self) -> bool {
        (self.target() - self.config.list_biased).abs() <= self.config.epsilon
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The list scrolled to `offset_px`.
    pub fn on_scroll(&mut self, offset_px: f64, now: Instant) {
        if offset_px > self.config.scroll_threshold_px {
            if self.is_commanded(offset_px, now) {
                return;
            }

            let target = self.config.list_biased;
            let fire_at = now + self.config.debounce;
            if let Some(pending) = self.pending.as_mut() {
                pending.fire_at = fire_at;
            } else if self.differs(self.target(), target) {
                debug!(offset_px, "Layout: past threshold, debouncing");
                self.pending = Some(Pending { target, fire_at });
            }
        } else {
            self.pending = None;
            self.animate_to(self.config.map_biased, now);
        }
    }

    /// A marker was selected: restore the map-biased split right away.
    ///
    /// `scroll_to` is the offset the list was told to scroll to, if any.
    pub fn on_marker_selected(&mut self, scroll_to: Option<f64>, now: Instant) {
        let threshold = self.config.scroll_threshold_px;
        let until = now + self.config.selection_settle;
        self.pending = None;
        self.commanded = scroll_to
            .filter(|offset_px| *offset_px > threshold)
            .map(|offset_px| CommandedScroll { offset_px, until });
        self.animate_to(self.config.map_biased, now);
    }

    /// Whether the list is still carrying out a selection's scroll.
    pub fn is_settling(&self, now: Instant) -> bool {
        self.commanded.is_some_and(|c| now < c.until)
    }

    /// Swallow scroll reports belonging to a commanded scroll. The report
    /// at the commanded offset ends the settle window.
    fn is_commanded(&mut self, offset_px: f64, now: Instant) -> bool {
        let Some(commanded) = self.commanded else {
            return false;
        };
        if now >= commanded.until {
            self.commanded = None;
            return false;
        }

        if (offset_px - commanded.offset_px).abs() <= SCROLL_MATCH_TOLERANCE_PX {
            debug!(offset_px, "Layout: commanded scroll landed");
            self.commanded = None;
        }
        true
    }

    /// Advance timers. Returns `true` if the fraction moved and should be
    /// republished.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(pending) = self.pending {
            if now >= pending.fire_at {
                self.pending = None;
                changed |= self.animate_to(pending.target, now);
            }
        }

        if let Some(mut anim) = self.animation {
            if now >= anim.started_at + self.config.duration {
                self.value = anim.to;
                self.animation = None;
                debug!(fraction = anim.to, "Layout: animation complete");
                changed = true;
            } else if now >= anim.next_frame {
                anim.next_frame = now + self.config.frame_interval;
                self.animation = Some(anim);
                changed = true;
            }
        }

        changed
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let frame = self.animation.map(|a| {
            let end = a.started_at + self.config.duration;
            a.next_frame.min(end)
        });
        let pending = self.pending.map(|p| p.fire_at);

        match (frame, pending) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn differs(&self, a: f64, b: f64) -> bool {
        (a - b).abs() > self.config.epsilon
    }

    /// Start animating from the current value. No-op within epsilon.
    fn animate_to(&mut self, target: f64, now: Instant) -> bool {
        if !self.differs(self.value, target) {
            return false;
        }

        let from = self.fraction_at(now);
        debug!(from, to = target, "Layout: animating");
        self.animation = Some(Animation {
            from,
            to: target,
            started_at: now,
            next_frame: now + self.config.frame_interval,
        });
        self.value = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mounted() -> LayoutAnimator {
        let mut layout = LayoutAnimator::default();
        layout.mount();
        layout
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mount_sets_value_directly() {
        let layout = mounted();
        let now = Instant::now();

        assert!(layout.is_mounted());
        assert!(!layout.is_animating());
        assert!(close(layout.fraction_at(now), DEFAULT_MAP_BIASED));
    }

    #[test]
    fn test_scroll_debounces_then_animates_to_list() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_scroll(120.0, t0);
        assert!(layout.has_pending());
        assert!(!layout.is_animating());
        assert_eq!(layout.next_deadline(), Some(t0 + DEFAULT_DEBOUNCE));

        assert!(!layout.poll(t0 + ms(50)));
        assert!(layout.poll(t0 + ms(100)));
        assert!(layout.is_animating());

        let mid = layout.fraction_at(t0 + ms(225));
        assert!(mid < DEFAULT_MAP_BIASED && mid > DEFAULT_LIST_BIASED);

        assert!(layout.poll(t0 + ms(350)));
        assert!(!layout.is_animating());
        assert!(close(layout.fraction_at(t0 + ms(400)), DEFAULT_LIST_BIASED));
        assert!(layout.is_list_biased());
    }

    #[test]
    fn test_continuous_scroll_postpones_animation() {
        let mut layout = mounted();
        let t0 = Instant::now();

        for step in 0..5u64 {
            layout.on_scroll(40.0 + 20.0 * step as f64, t0 + ms(60 * step));
            assert!(!layout.poll(t0 + ms(60 * step)));
        }
        let last = t0 + ms(240);
        assert_eq!(layout.next_deadline(), Some(last + DEFAULT_DEBOUNCE));

        assert!(!layout.poll(last + ms(99)));
        assert!(!layout.is_animating());
        assert!(layout.poll(last + DEFAULT_DEBOUNCE));
        assert!(layout.is_animating());
    }

    #[test]
    fn test_small_scroll_stays_map_biased() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_scroll(10.0, t0);
        assert!(!layout.has_pending());
        assert!(!layout.is_animating());
        assert_eq!(layout.next_deadline(), None);
    }

    #[test]
    fn test_back_to_top_cancels_pending() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_scroll(120.0, t0);
        layout.on_scroll(0.0, t0 + ms(50));

        assert!(!layout.has_pending());
        assert!(!layout.is_animating());
        assert!(!layout.poll(t0 + ms(200)));
    }

    #[test]
    fn test_marker_selection_restores_map_split() {
        let mut layout = mounted();
        let t0 = Instant::now();
        layout.on_scroll(120.0, t0);
        layout.poll(t0 + ms(100));
        layout.poll(t0 + ms(400));
        assert!(layout.is_list_biased());

        layout.on_marker_selected(None, t0 + ms(500));
        assert!(layout.is_animating());
        assert!(!layout.is_list_biased());

        layout.poll(t0 + ms(800));
        assert!(close(layout.fraction_at(t0 + ms(800)), DEFAULT_MAP_BIASED));
    }

    #[test]
    fn test_marker_selection_cancels_debounce() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_scroll(120.0, t0);
        layout.on_marker_selected(None, t0 + ms(20));

        assert!(!layout.has_pending());
        assert!(!layout.poll(t0 + ms(200)));
        assert!(close(layout.fraction_at(t0 + ms(200)), DEFAULT_MAP_BIASED));
    }

    #[test]
    fn test_commanded_scroll_keeps_map_split() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_marker_selected(Some(262.0), t0);
        layout.on_scroll(140.0, t0 + ms(40));
        layout.on_scroll(262.0, t0 + ms(80));
        assert!(!layout.has_pending());
        assert!(!layout.is_settling(t0 + ms(80)));

        layout.poll(t0 + ms(1200));
        assert!(close(layout.fraction_at(t0 + ms(1200)), DEFAULT_MAP_BIASED));
    }

    #[test]
    fn test_user_scroll_after_commanded_scroll_biases_list() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_marker_selected(Some(262.0), t0);
        layout.on_scroll(262.5, t0 + ms(50));
        layout.on_scroll(400.0, t0 + ms(100));

        assert!(layout.has_pending());
        layout.poll(t0 + ms(200));
        layout.poll(t0 + ms(500));
        assert!(layout.is_list_biased());
    }

    #[test]
    fn test_settle_window_expires() {
        let mut layout = mounted();
        let t0 = Instant::now();

        layout.on_marker_selected(Some(262.0), t0);
        assert!(layout.is_settling(t0));
        assert!(!layout.is_settling(t0 + DEFAULT_SELECTION_SETTLE));

        layout.on_scroll(120.0, t0 + DEFAULT_SELECTION_SETTLE);
        assert!(layout.has_pending());
    }

    #[test]
    fn test_new_animation_starts_from_current_value() {
        let mut layout = mounted();
        let t0 = Instant::now();
        layout.on_scroll(120.0, t0);
        layout.poll(t0 + ms(100));

        let midway = t0 + ms(200);
        let current = layout.fraction_at(midway);
        layout.on_marker_selected(None, midway);

        assert!(close(layout.fraction_at(midway), current));
        layout.poll(midway + ms(300));
        assert!(close(layout.fraction_at(midway + ms(300)), DEFAULT_MAP_BIASED));
    }

    #[test]
    fn test_frames_are_paced() {
        let mut layout = mounted();
        let t0 = Instant::now();
        layout.on_marker_selected(None, t0);
        layout.on_scroll(120.0, t0);
        layout.poll(t0 + ms(100));

        let start = t0 + ms(100);
        assert_eq!(layout.next_deadline(), Some(start + FRAME_INTERVAL));
        assert!(!layout.poll(start + ms(5)));
        assert!(layout.poll(start + FRAME_INTERVAL));
        assert_eq!(
            layout.next_deadline(),
            Some(start + FRAME_INTERVAL + FRAME_INTERVAL)
        );
    }

    #[test]
    fn test_epsilon_suppresses_tiny_changes() {
        let config = LayoutConfig {
            list_biased: DEFAULT_MAP_BIASED - 0.005,
            ..LayoutConfig::default()
        };
        let mut layout = LayoutAnimator::new(config);
        layout.mount();

        layout.on_scroll(120.0, Instant::now());
        assert!(!layout.has_pending());
    }
}
