use std::time::Instant;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::RefreshFailure;

/// Structured events for one refresh cycle, correlated by `cycle_id`.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    cycle_id: Uuid,
    started: Instant,
}

impl RefreshTelemetry {
    pub fn new() -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, waiters: usize) {
        event!(
            Level::INFO,
            cycle_id = %self.cycle_id,
            waiters,
            elapsed_ms = self.elapsed_ms(),
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, failure: &RefreshFailure, waiters: usize) {
        event!(
            Level::ERROR,
            cycle_id = %self.cycle_id,
            waiters,
            elapsed_ms = self.elapsed_ms(),
            error = %failure,
            "refresh.failure"
        );
    }
}

impl Default for RefreshTelemetry {
    fn default() -> Self {
        Self::new()
    }
}
