//! Debounced viewport tracking.
//!
//! Every update lands in `current` immediately. `settled` only follows once no
//! further update has arrived for the quiet window. There is at most one
//! pending commit; a new update replaces it, so a burst collapses to its
//! last region.
use crate::bounds::bounds_from_region;
use crate::{GeoBounds, MapRegion};
use log::debug;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleState {
    Idle,
    PendingCommit { region: MapRegion, deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct RegionTracker {
    initial: MapRegion,
    current: MapRegion,
    settled: MapRegion,
    state: SettleState,
    quiet_window: Duration,
}

impl RegionTracker {
    pub fn new(initial: MapRegion, quiet_window: Duration) -> Self {
        Self {
            initial,
            current: initial,
            settled: initial,
            state: SettleState::Idle,
            quiet_window,
        }
    }

    /// The single setter for viewport changes. Cancels whatever commit was
    /// pending and schedules a fresh one.
    pub fn set_region(&mut self, region: MapRegion, now: Instant) {
        if let SettleState::PendingCommit { .. } = self.state {
            debug!("region update supersedes pending commit");
        }
        self.current = region;
        self.state = SettleState::PendingCommit {
            region,
            deadline: now + self.quiet_window,
        };
    }

    /// Commit the pending region if its deadline has passed. Returns the newly
    /// settled region, if any.
    pub fn poll(&mut self, now: Instant) -> Option<MapRegion> {
        match self.state {
            SettleState::PendingCommit { region, deadline } if now >= deadline => {
                self.settled = region;
                self.state = SettleState::Idle;
                Some(region)
            }
            _ => None,
        }
    }

    pub fn state(&self) -> SettleState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SettleState::PendingCommit { deadline, .. } => Some(deadline),
            SettleState::Idle => None,
        }
    }

    pub fn current_region(&self) -> MapRegion {
        self.current
    }

    pub fn current_bounds(&self) -> Option<GeoBounds> {
        bounds_from_region(&self.current)
    }

    pub fn settled_region(&self) -> MapRegion {
        self.settled
    }

    pub fn settled_bounds(&self) -> Option<GeoBounds> {
        bounds_from_region(&self.settled)
    }

    pub fn has_moved(&self) -> bool {
        !self.current.approx_eq(&self.initial)
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }
}

/// Sleep until `deadline`, or forever when nothing is pending. Meant as a
/// `tokio::select!` arm next to the update source.
pub async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
