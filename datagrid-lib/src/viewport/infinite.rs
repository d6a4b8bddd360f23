//! Infinite-scroll controller.
//!
//! `Idle → Requesting → Idle`. A downward scroll that ends within the load
//! threshold of the bottom arms a debounce deadline; once scrolling settles
//! past it, [`InfiniteScroll::poll`] fires a single request. The lock is
//! released when the external loader reports it is no longer loading. The
//! controller never retries on its own.

use std::time::{Duration, Instant};

/// Distance from the bottom edge, in pixels, below which more rows are requested.
pub const DEFAULT_LOAD_THRESHOLD: f64 = 200.0;

/// Quiet period after the last qualifying scroll before a request fires.
pub const DEFAULT_LOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Longest accepted debounce. Larger values are clamped to it.
pub const MAX_LOAD_DEBOUNCE: Duration = Duration::from_secs(60);

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    /// A request was issued and the loader has not finished yet.
    Requesting,
}

/// Flags owned by the external loader, read on every scroll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadFlags {
    pub has_more: bool,
    pub loading: bool,
}

/// Scroll geometry sampled on a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Distance from the viewport's bottom edge to the end of the content.
    pub fn remaining(&self) -> f64 {
        (self.content_height - self.scroll_offset - self.viewport_height).max(0.0)
    }
}

/// Direction of the latest scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Still,
}

/// Requests further pages as the viewport nears the bottom of the rows.
#[derive(Debug)]
pub struct InfiniteScroll {
    state: LoadState,
    threshold: f64,
    debounce: Duration,
    last_offset: f64,
    last_metrics: Option<ScrollMetrics>,
    deadline: Option<Instant>,
}

impl Default for InfiniteScroll {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_THRESHOLD, DEFAULT_LOAD_DEBOUNCE)
    }
}

impl InfiniteScroll {
    pub fn new(threshold: f64, debounce: Duration) -> Self {
        if debounce > MAX_LOAD_DEBOUNCE {
            log::warn!(
                "Load debounce {:?} exceeds {:?}, clamping",
                debounce,
                MAX_LOAD_DEBOUNCE
            );
        }
        Self {
            state: LoadState::Idle,
            threshold,
            debounce: debounce.min(MAX_LOAD_DEBOUNCE),
            last_offset: 0.0,
            last_metrics: None,
            deadline: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// When a pending request becomes due, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records a scroll event and arms the debounce if a load is warranted.
    ///
    /// Every qualifying event pushes the deadline back, so a burst of scroll
    /// events yields at most one request once it settles.
    pub fn on_scroll(
        &mut self,
        metrics: ScrollMetrics,
        flags: LoadFlags,
        now: Instant,
    ) -> ScrollDirection {
        let direction = if metrics.scroll_offset > self.last_offset {
            ScrollDirection::Down
        } else if metrics.scroll_offset < self.last_offset {
            ScrollDirection::Up
        } else {
            ScrollDirection::Still
        };
        self.last_offset = metrics.scroll_offset;
        self.last_metrics = Some(metrics);

        if direction == ScrollDirection::Down && self.can_request(flags) && self.near_bottom() {
            self.deadline = Some(now.checked_add(self.debounce).unwrap_or(now));
            log::trace!(
                "Load armed: {}px remaining, due in {:?}",
                metrics.remaining(),
                self.debounce
            );
        }
        direction
    }

    /// Fires the pending request if its deadline has passed and the
    /// conditions still hold. Returns `true` when the caller must load more.
    pub fn poll(&mut self, flags: LoadFlags, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.deadline = None;

        if !(self.can_request(flags) && self.near_bottom()) {
            log::trace!("Load deadline passed but conditions no longer hold");
            return false;
        }
        self.state = LoadState::Requesting;
        log::debug!("Infinite scroll: Idle -> Requesting");
        true
    }

    /// Observes the loader's `loading` flag. Leaving the loading state
    /// releases the request lock whether the load succeeded or failed.
    pub fn loading_changed(&mut self, loading: bool) {
        if !loading && self.state == LoadState::Requesting {
            self.state = LoadState::Idle;
            log::debug!("Infinite scroll: Requesting -> Idle");
        }
    }

    /// Disarms a pending request.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            log::trace!("Pending load cancelled");
        }
    }

    /// Forgets the last scroll position after the host jumped back to the
    /// top. A pending request is disarmed; an in-flight one keeps its lock.
    pub fn rewind(&mut self) {
        self.cancel();
        self.last_offset = 0.0;
        self.last_metrics = None;
    }

    /// Returns to a pristine idle state, as for a brand-new row set.
    pub fn reset(&mut self) {
        self.rewind();
        self.state = LoadState::Idle;
    }

    fn can_request(&self, flags: LoadFlags) -> bool {
        flags.has_more && !flags.loading && self.state == LoadState::Idle
    }

    fn near_bottom(&self) -> bool {
        self.last_metrics
            .is_some_and(|m| m.remaining() < self.threshold)
    }
}
