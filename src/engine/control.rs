use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use super::observer::SortObserver;

/// Raised through an algorithm when the run is cancelled at a suspend point.
/// Algorithms propagate it with `?`, so cancellation unwinds the whole run
/// uniformly regardless of how deep the work stack is.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("sort run interrupted")]
pub struct Interrupted;

pub type StepResult<T> = std::result::Result<T, Interrupted>;

/// Pause and cancel flags shared between the driving side and a running
/// algorithm. Pause blocks the worker on a condition variable at the next
/// suspend point; cancel wakes a paused worker so it can unwind.
#[derive(Default)]
pub struct SortControls {
    paused: Mutex<bool>,
    resumed: Condvar,
    cancelled: AtomicBool,
}

impl SortControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        *self.paused.lock().expect("controls mutex poisoned") = true;
    }

    pub fn resume(&self) {
        *self.paused.lock().expect("controls mutex poisoned") = false;
        self.resumed.notify_all();
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Take the lock before notifying so a worker between its pause check
        // and its wait cannot miss the wakeup.
        let _guard = self.paused.lock().expect("controls mutex poisoned");
        self.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().expect("controls mutex poisoned")
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The suspend point. Honors cancellation, waits out the step delay, then
    /// blocks while paused. Cancellation is rechecked on every wakeup.
    pub(crate) fn checkpoint(&self, delay: Duration) -> StepResult<()> {
        if self.is_cancelled() {
            return Err(Interrupted);
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let mut paused = self.paused.lock().expect("controls mutex poisoned");
        while *paused {
            if self.is_cancelled() {
                return Err(Interrupted);
            }
            paused = self
                .resumed
                .wait(paused)
                .expect("controls mutex poisoned");
        }
        drop(paused);
        if self.is_cancelled() {
            return Err(Interrupted);
        }
        Ok(())
    }
}

/// Per-run context handed by reference into every algorithm. Owns the step
/// delay, the shared controls, and the observer; algorithms only ever touch
/// their working slice and this context.
pub struct StepContext {
    delay: Duration,
    controls: Arc<SortControls>,
    observer: Arc<dyn SortObserver>,
}

impl StepContext {
    pub fn new(
        delay: Duration,
        controls: Arc<SortControls>,
        observer: Arc<dyn SortObserver>,
    ) -> Self {
        Self {
            delay,
            controls,
            observer,
        }
    }

    /// Emit a comparison for the exact pair influencing control flow, then
    /// suspend for the step delay.
    pub fn compare(&self, i: usize, j: usize) -> StepResult<()> {
        if !self.controls.is_cancelled() {
            self.observer.on_compare(i, j);
        }
        self.pace()
    }

    /// Emit a swap marker. The caller applies the exchange (or copy) and then
    /// publishes the updated array.
    pub fn mark_swap(&self, i: usize, j: usize) {
        if !self.controls.is_cancelled() {
            self.observer.on_swap(i, j);
        }
    }

    /// Publish the full working-array contents after a mutation.
    pub fn publish(&self, snapshot: &[u32]) {
        if !self.controls.is_cancelled() {
            self.observer.on_update(snapshot);
        }
    }

    /// Bare suspend point for the algorithms that pace outside comparisons
    /// (heap after a swap, shell after a shift, radix per writeback).
    pub fn pace(&self) -> StepResult<()> {
        self.controls.checkpoint(self.delay)
    }
}
