//! The cooperative yield point shared by every algorithm.
//!
//! An algorithm calls [`StepEmitter::step`] after each operation. The call blocks while
//! the run is paused, sleeps for the delay derived from the *live* speed setting, then
//! publishes the operation together with a snapshot of the sequence.

use crate::error::SortVizError;
use crate::model::{Operation, OperationCounts, Pacing, RunState, SortEvent};
use crate::sequence::SequenceStore;
use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::mpsc;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 50;
pub const DEFAULT_SPEED: u8 = 25;

/// How often a paused run re-checks the run state.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(80);

/// Merge leftovers are copied faster than compare-bearing writes.
pub const LEFTOVER_SPEEDUP: f64 = 1.5;

/// Map a speed setting (1..=50) to the delay between operations.
/// Higher settings are faster; the delay never drops below 40 ms.
pub fn compute_delay(value: u8) -> Duration {
    let ms = (850.0 - f64::from(value) * 16.0).round().max(40.0);
    Duration::from_millis(ms as u64)
}

/// Live speed setting shared between the input layer and a running engine.
#[derive(Debug, Clone)]
pub struct SpeedSetting(Arc<AtomicU8>);

impl SpeedSetting {
    pub fn new(value: u8) -> Self {
        Self(Arc::new(AtomicU8::new(value.clamp(MIN_SPEED, MAX_SPEED))))
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    /// Store a new value; out-of-range values are rejected and leave the setting untouched.
    pub fn set(&self, value: u8) -> Result<u8, SortVizError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&value) {
            return Err(SortVizError::InvalidConfiguration(format!(
                "speed {value} outside {MIN_SPEED}..={MAX_SPEED}"
            )));
        }
        self.0.store(value, Ordering::Relaxed);
        Ok(value)
    }

    pub fn delay(&self) -> Duration {
        compute_delay(self.get())
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

/// Run state readable by the engine. Only the run controller writes it.
#[derive(Debug, Clone, Default)]
pub struct RunStateCell(Arc<AtomicU8>);

impl RunStateCell {
    pub fn load(&self) -> RunState {
        match self.0.load(Ordering::Acquire) {
            1 => RunState::Running,
            2 => RunState::Paused,
            _ => RunState::Idle,
        }
    }

    pub(crate) fn store(&self, state: RunState) {
        let raw = match state {
            RunState::Idle => 0,
            RunState::Running => 1,
            RunState::Paused => 2,
        };
        self.0.store(raw, Ordering::Release);
    }
}

pub struct StepEmitter {
    event_tx: mpsc::UnboundedSender<SortEvent>,
    speed: SpeedSetting,
    state: RunStateCell,
    pacing: Pacing,
    counts: OperationCounts,
}

impl StepEmitter {
    pub fn new(
        event_tx: mpsc::UnboundedSender<SortEvent>,
        speed: SpeedSetting,
        state: RunStateCell,
        pacing: Pacing,
    ) -> Self {
        Self {
            event_tx,
            speed,
            state,
            pacing,
            counts: OperationCounts::default(),
        }
    }

    /// Suspend for one full step, then publish `op`.
    pub async fn step(&mut self, op: Operation, store: &SequenceStore) {
        self.step_scaled(op, store, 1.0).await;
    }

    /// Like [`step`](Self::step) with the delay divided by `speedup`.
    pub async fn step_scaled(&mut self, op: Operation, store: &SequenceStore, speedup: f64) {
        while self.state.load() == RunState::Paused {
            tokio::time::sleep(PAUSE_POLL_INTERVAL).await;
        }
        match self.pacing {
            Pacing::Live => {
                // Re-read every time so speed changes land on the next operation.
                let delay = self.speed.delay().div_f64(speedup.max(1.0));
                tokio::time::sleep(delay).await;
            }
            // No delay, but still hand control back so a pause can land.
            Pacing::Instant => tokio::task::yield_now().await,
        }
        self.notify(op, store);
    }

    /// Publish `op` without suspending. Used for annotations and writes that belong
    /// to the step just yielded.
    pub fn notify(&mut self, op: Operation, store: &SequenceStore) {
        tracing::trace!(op = %op.describe(), "step");
        self.counts.record(&op);
        let _ = self.event_tx.send(SortEvent::Step {
            op,
            snapshot: store.to_vec(),
        });
    }

    pub fn counts(&self) -> &OperationCounts {
        &self.counts
    }
}
