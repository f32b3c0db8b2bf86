use std::sync::Mutex;
use std::sync::mpsc::Sender;

/// Events emitted at algorithmically meaningful points during a run. Indices
/// always refer to the working array at the moment of emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    Compare(usize, usize),
    Swap(usize, usize),
    ArrayUpdated(Vec<u32>),
}

/// Receiver side of the engine's instrumentation. Implementations must not
/// block: the algorithm's pacing happens at suspend points, not inside
/// observer calls.
pub trait SortObserver: Send + Sync {
    fn on_compare(&self, i: usize, j: usize);
    fn on_swap(&self, i: usize, j: usize);
    fn on_update(&self, snapshot: &[u32]);
}

/// Queues events on an mpsc channel so rendering stays decoupled from the
/// algorithm's pacing. Send failures mean the receiver is gone, which is a
/// normal shutdown condition, not an error.
pub struct ChannelObserver {
    tx: Sender<AnimationEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<AnimationEvent>) -> Self {
        Self { tx }
    }
}

impl SortObserver for ChannelObserver {
    fn on_compare(&self, i: usize, j: usize) {
        let _ = self.tx.send(AnimationEvent::Compare(i, j));
    }

    fn on_swap(&self, i: usize, j: usize) {
        let _ = self.tx.send(AnimationEvent::Swap(i, j));
    }

    fn on_update(&self, snapshot: &[u32]) {
        let _ = self.tx.send(AnimationEvent::ArrayUpdated(snapshot.to_vec()));
    }
}

/// Discards everything. Useful for benches and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SortObserver for NullObserver {
    fn on_compare(&self, _i: usize, _j: usize) {}
    fn on_swap(&self, _i: usize, _j: usize) {}
    fn on_update(&self, _snapshot: &[u32]) {}
}

/// Captures the full emission stream for assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AnimationEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnimationEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }
}

impl SortObserver for RecordingObserver {
    fn on_compare(&self, i: usize, j: usize) {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(AnimationEvent::Compare(i, j));
    }

    fn on_swap(&self, i: usize, j: usize) {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(AnimationEvent::Swap(i, j));
    }

    fn on_update(&self, snapshot: &[u32]) {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(AnimationEvent::ArrayUpdated(snapshot.to_vec()));
    }
}
