//! Debug path output.

use std::time::{Duration, Instant};

use log::debug;

use crate::config::DetourMode;
use crate::core::WorldPoint;

/// Receives intermediate paths for visualization.
pub trait DebugSink: Send {
    /// Working path after relaxation round `iteration`.
    fn iteration_path(&mut self, iteration: usize, path: &[WorldPoint]);

    /// Final path of an alternative solve with a fixed detour side.
    fn detour_candidate(&mut self, mode: DetourMode, path: &[WorldPoint]);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn iteration_path(&mut self, _iteration: usize, _path: &[WorldPoint]) {}

    fn detour_candidate(&mut self, _mode: DetourMode, _path: &[WorldPoint]) {}
}

/// Writes paths to the log at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn iteration_path(&mut self, iteration: usize, path: &[WorldPoint]) {
        debug!("Iteration {} path ({} nodes): {:?}", iteration, path.len(), path);
    }

    fn detour_candidate(&mut self, mode: DetourMode, path: &[WorldPoint]) {
        debug!("Detour candidate {} ({} nodes): {:?}", mode, path.len(), path);
    }
}

/// Lets an event through at most once per interval.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Whether an event may pass at `now`; records it if so.
    pub fn allow_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    #[inline]
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Forget the last event
    pub fn reset(&mut self) {
        self.last = None;
    }
}
