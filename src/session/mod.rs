//! One sort run at a time. A session owns the worker thread executing the
//! algorithm against a private working copy, the queued event channel, and
//! the pause/cancel controls. The runtime (not the engine) is responsible
//! for never starting a second session while one is active.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use crate::engine::{
    Algorithm, AnimationEvent, ChannelObserver, SortControls, StepContext, run_algorithm,
};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::sequence;

/// `Idle → Running → {Paused ⇄ Running} → (Completed | Cancelled)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl PlaybackState {
    pub fn is_active(self) -> bool {
        matches!(self, PlaybackState::Running | PlaybackState::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PlaybackState::Completed | PlaybackState::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Completed => "completed",
            PlaybackState::Cancelled => "cancelled",
        }
    }
}

/// Immutable parameters of a run. Size and speed are clamped to the slider
/// ranges on construction; nothing else validates them later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub size: usize,
    pub speed: u8,
}

impl RunConfig {
    pub fn new(algorithm: Algorithm, size: usize, speed: u8) -> Self {
        Self {
            algorithm,
            size: size.clamp(sequence::MIN_SIZE, sequence::MAX_SIZE),
            speed: speed.clamp(1, 100),
        }
    }

    /// Speed maps inversely to the per-step delay: `200 - 2 * speed` ms, so
    /// speed 100 animates with no delay and speed 1 with 198 ms per step.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(200u64.saturating_sub(2 * u64::from(self.speed)))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(Algorithm::Bubble, 50, 50)
    }
}

pub struct SortSession {
    config: RunConfig,
    controls: Arc<SortControls>,
    state: Arc<Mutex<PlaybackState>>,
    events: Receiver<AnimationEvent>,
    worker: Option<JoinHandle<Vec<u32>>>,
}

impl SortSession {
    /// Clone the caller's sequence into a private working copy and start the
    /// algorithm on a worker thread. Events stream through the queued
    /// channel; the caller drains them with [`SortSession::try_events`].
    pub fn start(config: RunConfig, input: &[u32], logger: Option<Logger>) -> Self {
        let controls = Arc::new(SortControls::new());
        let state = Arc::new(Mutex::new(PlaybackState::Running));
        let (tx, rx) = mpsc::channel();

        let worker_controls = Arc::clone(&controls);
        let worker_state = Arc::clone(&state);
        let mut working = input.to_vec();
        let delay = config.step_delay();
        let algorithm = config.algorithm;

        let worker = thread::spawn(move || {
            let ctx = StepContext::new(
                delay,
                worker_controls,
                Arc::new(ChannelObserver::new(tx)),
            );
            let outcome = run_algorithm(algorithm, &mut working, &ctx);
            let cancelled = outcome.is_err();
            *worker_state.lock().expect("session state poisoned") = if cancelled {
                PlaybackState::Cancelled
            } else {
                PlaybackState::Completed
            };
            if let Some(logger) = logger {
                let _ = logger.log_event(event_with_fields(
                    LogLevel::Info,
                    "hellasort::session",
                    "run_finished",
                    [
                        json_kv("algorithm", json!(algorithm.key())),
                        json_kv("cancelled", json!(cancelled)),
                        json_kv("len", json!(working.len())),
                    ],
                ));
            }
            working
        });

        Self {
            config,
            controls,
            state,
            events: rx,
            worker: Some(worker),
        }
    }

    pub fn config(&self) -> RunConfig {
        self.config
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock().expect("session state poisoned")
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Takes effect at the worker's next suspend point.
    pub fn pause(&self) {
        let mut state = self.state.lock().expect("session state poisoned");
        if *state == PlaybackState::Running {
            self.controls.pause();
            *state = PlaybackState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut state = self.state.lock().expect("session state poisoned");
        if *state == PlaybackState::Paused {
            self.controls.resume();
            *state = PlaybackState::Running;
        }
    }

    /// Cancel the run. No further events will be observed; the worker
    /// unwinds at its next suspend point (a paused worker is woken first).
    pub fn stop(&self) {
        if self.state().is_active() {
            self.controls.cancel();
        }
    }

    /// Non-blocking drain of everything the worker has queued so far.
    pub fn try_events(&self) -> Vec<AnimationEvent> {
        self.events.try_iter().collect()
    }

    /// Wait for the worker and return its final working copy: fully sorted
    /// on completion, or wherever the algorithm had reached on cancellation.
    pub fn join(mut self) -> Vec<u32> {
        match self.worker.take() {
            Some(worker) => worker.join().expect("sort worker panicked"),
            None => Vec::new(),
        }
    }
}

impl Drop for SortSession {
    fn drop(&mut self) {
        // Never leave a worker sleeping or paused behind a dropped session.
        self.controls.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use std::time::Instant;

    fn wait_terminal(session: &SortSession) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !session.state().is_terminal() {
            assert!(Instant::now() < deadline, "session never finished");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn config_clamps_to_slider_ranges() {
        let config = RunConfig::new(Algorithm::Quick, 500, 0);
        assert_eq!(config.size, 100);
        assert_eq!(config.speed, 1);

        let config = RunConfig::new(Algorithm::Quick, 3, 200);
        assert_eq!(config.size, 10);
        assert_eq!(config.speed, 100);
    }

    #[test]
    fn delay_mapping_matches_slider_contract() {
        assert_eq!(
            RunConfig::new(Algorithm::Bubble, 50, 100).step_delay(),
            Duration::ZERO
        );
        assert_eq!(
            RunConfig::new(Algorithm::Bubble, 50, 1).step_delay(),
            Duration::from_millis(198)
        );
        assert_eq!(
            RunConfig::new(Algorithm::Bubble, 50, 50).step_delay(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn session_completes_and_yields_sorted_output() {
        let input = vec![5, 3, 8, 1];
        let config = RunConfig::new(Algorithm::Bubble, 10, 100);
        let session = SortSession::start(config, &input, None);
        wait_terminal(&session);
        assert_eq!(session.state(), PlaybackState::Completed);

        let events = session.try_events();
        assert!(!events.is_empty());
        assert_eq!(session.join(), vec![1, 3, 5, 8]);
    }

    #[test]
    fn pause_stops_emissions_until_resume() {
        // Speed 90 -> 20 ms per step; a 20-element bubble sort runs long
        // enough to pause it mid-flight.
        let input = sequence::generate(20);
        let config = RunConfig::new(Algorithm::Bubble, 20, 90);
        let session = SortSession::start(config, &input, None);

        thread::sleep(Duration::from_millis(60));
        session.pause();
        assert_eq!(session.state(), PlaybackState::Paused);

        // Let any in-flight step land, then drain.
        thread::sleep(Duration::from_millis(80));
        session.try_events();

        thread::sleep(Duration::from_millis(150));
        assert!(
            session.try_events().is_empty(),
            "events observed during pause"
        );

        session.resume();
        wait_terminal(&session);
        assert_eq!(session.state(), PlaybackState::Completed);
        let result = session.join();
        assert!(result.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn stop_cancels_early_and_silences_events() {
        let input = sequence::generate(50);
        let config = RunConfig::new(Algorithm::Bubble, 50, 90);
        let session = SortSession::start(config, &input, None);

        thread::sleep(Duration::from_millis(60));
        session.stop();
        wait_terminal(&session);
        assert_eq!(session.state(), PlaybackState::Cancelled);

        // Everything queued was emitted before the cancel flag was set.
        session.try_events();
        thread::sleep(Duration::from_millis(50));
        assert!(session.try_events().is_empty());

        // A 50-element bubble sort at 20 ms per compare would need minutes;
        // cancellation terminated the worker early.
        let partial = session.join();
        assert_eq!(partial.len(), input.len());
    }

    #[test]
    fn stop_wakes_a_paused_session() {
        let input = sequence::generate(30);
        let config = RunConfig::new(Algorithm::Selection, 30, 90);
        let session = SortSession::start(config, &input, None);

        thread::sleep(Duration::from_millis(50));
        session.pause();
        thread::sleep(Duration::from_millis(50));
        session.stop();
        wait_terminal(&session);
        assert_eq!(session.state(), PlaybackState::Cancelled);
    }

    #[test]
    fn finished_run_is_logged() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        let config = RunConfig::new(Algorithm::Insertion, 10, 100);
        let session = SortSession::start(config, &[3, 1, 2], Some(logger));
        wait_terminal(&session);
        session.join();

        let events = sink.events();
        let finished = events
            .iter()
            .find(|e| e.message == "run_finished")
            .expect("run_finished not logged");
        assert_eq!(finished.fields["algorithm"], "insertion");
        assert_eq!(finished.fields["cancelled"], false);
    }
}
