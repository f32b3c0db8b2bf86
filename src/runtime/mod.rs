//! The cooperative scheduler: one loop services terminal input, drains the
//! active session's queued animation events, renders frames, and emits
//! periodic metric snapshots. The engine paces itself on its worker thread;
//! this loop only ever observes.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::json;

use crate::engine::{Algorithm, AnimationEvent};
use crate::error::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::EngineMetrics;
use crate::render::{BarRenderer, Frame, Size};
use crate::sequence;
use crate::session::{PlaybackState, RunConfig, SortSession};

pub mod driver;

/// Configuration knobs for the visualizer loop.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Interval between synthetic tick events (drains the session channel).
    pub tick_interval: Duration,
    /// Optional structured logger used by the runtime.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<EngineMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(33),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "hellasort::runtime.metrics".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(EngineMetrics::new())));
        }
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<EngineMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Events delivered to the loop; scripted runs feed these directly.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Tick { elapsed: Duration },
    Key(KeyEvent),
    Resize(Size),
}

pub struct VisualizerRuntime {
    array: Vec<u32>,
    config: RunConfig,
    session: Option<SortSession>,
    last_state: PlaybackState,
    comparing: Option<(usize, usize)>,
    swapping: Option<(usize, usize)>,
    show_docs: bool,
    renderer: BarRenderer,
    runtime_config: RuntimeConfig,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl VisualizerRuntime {
    pub fn new(config: RunConfig, size: Size) -> Self {
        Self {
            array: sequence::generate(config.size),
            config,
            session: None,
            last_state: PlaybackState::Idle,
            comparing: None,
            swapping: None,
            show_docs: false,
            renderer: BarRenderer::new(size),
            runtime_config: RuntimeConfig::default(),
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        }
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.runtime_config
    }

    pub fn run_config(&self) -> RunConfig {
        self.config
    }

    pub fn array(&self) -> &[u32] {
        &self.array
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(self.last_state)
    }

    pub fn resize(&mut self, size: Size) -> Result<()> {
        self.renderer.resize(size);
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Info,
            "resized",
            [
                json_kv("width", json!(size.width)),
                json_kv("height", json!(size.height)),
            ],
        );
        Ok(())
    }

    /// Interactive loop over real terminal events.
    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap();
        self.render_if_needed(stdout)?;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = self
                .runtime_config
                .tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                if let Some(runtime_event) = Self::map_event(event::read()?) {
                    self.dispatch_event(runtime_event);
                    self.render_if_needed(stdout)?;
                }
                if self.should_exit {
                    break;
                }
            }

            if last_tick.elapsed() >= self.runtime_config.tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.dispatch_event(RuntimeEvent::Tick { elapsed });
                self.render_if_needed(stdout)?;
            }

            self.maybe_emit_metrics();
        }

        self.finalize();
        Ok(())
    }

    /// Drive the loop from a supplied event list. Used by tests and benches.
    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap();
        self.render_if_needed(stdout)?;
        for runtime_event in events {
            self.dispatch_event(runtime_event);
            self.render_if_needed(stdout)?;
            if self.should_exit {
                break;
            }
        }
        self.finalize();
        Ok(())
    }

    /// Run one sort of the current configuration to completion, headless.
    /// Used by benches and scripted tests.
    pub fn sort_once(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap();
        self.start_sort();
        self.wait_for_session(stdout)?;
        self.finalize();
        Ok(())
    }

    /// Drain the active session to completion, rendering as events arrive.
    pub fn wait_for_session(&mut self, stdout: &mut impl Write) -> Result<()> {
        while self
            .session
            .as_ref()
            .is_some_and(|s| !s.state().is_terminal())
        {
            self.drain_session_events();
            self.settle_session();
            self.render_if_needed(stdout)?;
            std::thread::sleep(Duration::from_millis(1));
        }
        self.drain_session_events();
        self.settle_session();
        self.render_if_needed(stdout)
    }

    fn dispatch_event(&mut self, runtime_event: RuntimeEvent) {
        let described = Self::describe_event(&runtime_event);
        match runtime_event {
            RuntimeEvent::Tick { .. } => {
                self.drain_session_events();
                self.settle_session();
            }
            RuntimeEvent::Key(key) => self.handle_key(key),
            RuntimeEvent::Resize(size) => {
                self.renderer.resize(size);
                self.redraw_requested = true;
            }
        }
        self.log_runtime_event(
            LogLevel::Debug,
            "event_dispatched",
            [json_kv("event", json!(described))],
        );
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Char(' ') => self.toggle_sort(),
            KeyCode::Char('s') => self.stop_sort(),
            KeyCode::Char('r') => self.reset_array(),
            KeyCode::Char('d') => {
                self.show_docs = !self.show_docs;
                self.redraw_requested = true;
            }
            KeyCode::Char(c @ '1'..='8') => {
                self.select_algorithm(c as usize - '1' as usize);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_size(5),
            KeyCode::Char('-') => self.adjust_size(-5),
            KeyCode::Char(']') => self.adjust_speed(5),
            KeyCode::Char('[') => self.adjust_speed(-5),
            _ => {}
        }
    }

    fn toggle_sort(&mut self) {
        match self.playback_state() {
            PlaybackState::Running => {
                if let Some(session) = &self.session {
                    session.pause();
                }
            }
            PlaybackState::Paused => {
                if let Some(session) = &self.session {
                    session.resume();
                }
            }
            _ => self.start_sort(),
        }
        self.redraw_requested = true;
    }

    fn start_sort(&mut self) {
        if self.session.as_ref().is_some_and(|s| s.is_active()) {
            return;
        }
        // Settle any finished session before replacing it.
        self.settle_session();
        self.comparing = None;
        self.swapping = None;
        self.session = Some(SortSession::start(
            self.config,
            &self.array,
            self.runtime_config.logger.clone(),
        ));
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Info,
            "sort_started",
            [
                json_kv("algorithm", json!(self.config.algorithm.key())),
                json_kv("size", json!(self.config.size)),
                json_kv("speed", json!(self.config.speed)),
                json_kv(
                    "delay_ms",
                    json!(self.config.step_delay().as_millis() as u64),
                ),
            ],
        );
    }

    fn stop_sort(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if !session.is_active() {
            return;
        }
        session.stop();
        // Cancellation is observed as silence: whatever is still queued is
        // discarded along with the worker's working copy.
        let deadline = Instant::now() + Duration::from_secs(2);
        while !session.state().is_terminal() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        self.settle_session();
    }

    fn reset_array(&mut self) {
        if self.playback_state().is_active() {
            self.log_locked_control("reset");
            return;
        }
        self.session = None;
        self.last_state = PlaybackState::Idle;
        self.array = sequence::generate(self.config.size);
        self.comparing = None;
        self.swapping = None;
        self.redraw_requested = true;
    }

    fn select_algorithm(&mut self, index: usize) {
        if self.playback_state().is_active() {
            self.log_locked_control("algorithm");
            return;
        }
        self.config = RunConfig::new(
            Algorithm::ALL[index],
            self.config.size,
            self.config.speed,
        );
        self.redraw_requested = true;
    }

    fn adjust_size(&mut self, delta: i64) {
        if self.playback_state().is_active() {
            self.log_locked_control("size");
            return;
        }
        let size = (self.config.size as i64 + delta)
            .clamp(sequence::MIN_SIZE as i64, sequence::MAX_SIZE as i64) as usize;
        self.config = RunConfig::new(self.config.algorithm, size, self.config.speed);
        // The reference app regenerates on every size change.
        self.array = sequence::generate(self.config.size);
        self.comparing = None;
        self.swapping = None;
        self.redraw_requested = true;
    }

    fn adjust_speed(&mut self, delta: i64) {
        if self.playback_state().is_active() {
            self.log_locked_control("speed");
            return;
        }
        let speed = (i64::from(self.config.speed) + delta).clamp(1, 100) as u8;
        self.config = RunConfig::new(self.config.algorithm, self.config.size, speed);
        self.redraw_requested = true;
    }

    fn drain_session_events(&mut self) {
        let events = match &self.session {
            Some(session) => session.try_events(),
            None => return,
        };
        if events.is_empty() {
            return;
        }
        for animation_event in events {
            match animation_event {
                AnimationEvent::Compare(i, j) => {
                    self.comparing = Some((i, j));
                    self.record_metric(|m| m.record_compare());
                }
                AnimationEvent::Swap(i, j) => {
                    self.swapping = Some((i, j));
                    self.record_metric(|m| m.record_swap());
                }
                AnimationEvent::ArrayUpdated(snapshot) => {
                    self.array = snapshot;
                    self.record_metric(|m| m.record_array_update());
                }
            }
        }
        self.redraw_requested = true;
    }

    /// Retire a finished session: adopt its final array on completion, drop
    /// its leftovers on cancellation, and clear the highlights either way.
    fn settle_session(&mut self) {
        let state = match self.session.as_ref().map(|s| s.state()) {
            Some(state) if state.is_terminal() => state,
            _ => return,
        };
        if state == PlaybackState::Completed {
            self.drain_session_events();
        }
        let session = self.session.take().expect("session checked above");
        let final_array = session.join();
        let cancelled = state == PlaybackState::Cancelled;
        if !cancelled {
            self.array = final_array;
        }
        self.last_state = state;
        self.comparing = None;
        self.swapping = None;
        self.redraw_requested = true;
        self.record_metric(|m| m.record_run(cancelled));
        self.log_runtime_event(
            LogLevel::Info,
            "run_settled",
            [json_kv("state", json!(state.label()))],
        );
    }

    fn render_if_needed(&mut self, stdout: &mut impl Write) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;
        let frame = Frame {
            values: &self.array,
            comparing: self.comparing,
            swapping: self.swapping,
            algorithm_label: self.config.algorithm.label(),
            state: self.playback_state(),
            size: self.config.size,
            speed: self.config.speed,
            show_docs: self.show_docs,
        };
        self.renderer.render(stdout, &frame)?;
        self.record_metric(|m| m.record_render());
        Ok(())
    }

    fn bootstrap(&mut self) {
        self.should_exit = false;
        self.redraw_requested = true;
        if self.runtime_config.metrics.is_none()
            && self.runtime_config.metrics_interval > Duration::ZERO
        {
            self.runtime_config.metrics = Some(Arc::new(Mutex::new(EngineMetrics::new())));
        }
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_started",
            [
                json_kv("algorithm", json!(self.config.algorithm.key())),
                json_kv("size", json!(self.config.size)),
                json_kv("speed", json!(self.config.speed)),
            ],
        );
    }

    fn finalize(&mut self) {
        if self.session.as_ref().is_some_and(|s| s.is_active()) {
            self.stop_sort();
        }
        self.settle_session();
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log_runtime_event(
            LogLevel::Info,
            "runtime_stopped",
            [json_kv("uptime_ms", json!(uptime_ms))],
        );
    }

    fn maybe_emit_metrics(&mut self) {
        if self.runtime_config.metrics.is_none()
            || self.runtime_config.metrics_interval == Duration::ZERO
        {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.runtime_config.metrics_interval => {
                return;
            }
            _ => {
                self.last_metrics_emit = Some(now);
            }
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) = (
            self.runtime_config.logger.as_ref(),
            self.runtime_config.metrics.as_ref(),
        ) {
            if let Ok(guard) = metrics.lock() {
                let target = self.runtime_config.metrics_target.as_str();
                let _ = logger.log_event(guard.snapshot(uptime).to_log_event(target));
            }
        }
    }

    fn record_metric<F>(&self, update: F)
    where
        F: FnOnce(&mut EngineMetrics),
    {
        if let Some(metrics) = self.runtime_config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    fn log_locked_control(&self, control: &str) {
        self.log_runtime_event(
            LogLevel::Debug,
            "control_locked",
            [json_kv("control", json!(control))],
        );
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.runtime_config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(
                level,
                "hellasort::runtime",
                message,
                fields,
            ));
        }
    }

    fn map_event(raw: CrosstermEvent) -> Option<RuntimeEvent> {
        match raw {
            CrosstermEvent::Key(key) => Some(RuntimeEvent::Key(key)),
            CrosstermEvent::Resize(width, height) => {
                Some(RuntimeEvent::Resize(Size::new(width, height)))
            }
            _ => None,
        }
    }

    fn describe_event(runtime_event: &RuntimeEvent) -> &'static str {
        match runtime_event {
            RuntimeEvent::Tick { .. } => "tick",
            RuntimeEvent::Key(_) => "key",
            RuntimeEvent::Resize(_) => "resize",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::io;

    fn key(c: char) -> RuntimeEvent {
        RuntimeEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn tick() -> RuntimeEvent {
        RuntimeEvent::Tick {
            elapsed: Duration::from_millis(33),
        }
    }

    fn runtime() -> VisualizerRuntime {
        let config = RunConfig::new(Algorithm::Bubble, 10, 100);
        let mut runtime = VisualizerRuntime::new(config, Size::new(80, 24));
        runtime.config_mut().metrics_interval = Duration::ZERO;
        runtime
    }

    #[test]
    fn scripted_quit_stops_the_loop() {
        let mut rt = runtime();
        let mut sink = io::sink();
        rt.run_scripted(&mut sink, vec![tick(), key('q'), tick()])
            .unwrap();
        assert_eq!(rt.playback_state(), PlaybackState::Idle);
    }

    #[test]
    fn full_sort_through_the_loop() {
        let mut rt = runtime();
        let mut sink = io::sink();
        let before = rt.array().to_vec();

        rt.bootstrap();
        rt.dispatch_event(key(' '));
        rt.wait_for_session(&mut sink).unwrap();
        rt.finalize();

        assert_eq!(rt.playback_state(), PlaybackState::Completed);
        let after = rt.array().to_vec();
        assert!(after.windows(2).all(|w| w[0] <= w[1]));
        let mut expected = before;
        expected.sort_unstable();
        assert_eq!(after, expected);
    }

    #[test]
    fn controls_are_locked_while_running() {
        let sink = MemorySink::new();
        let mut rt = runtime();
        rt.config_mut().logger = Some(Logger::new(sink.clone()));
        // Slow run so the session is still active when we poke the sliders.
        rt.config = RunConfig::new(Algorithm::Bubble, 30, 50);
        rt.array = sequence::generate(30);

        let mut out = io::sink();
        rt.bootstrap();
        rt.dispatch_event(key(' '));
        let config_before = rt.run_config();
        rt.dispatch_event(key('+'));
        rt.dispatch_event(key('3'));
        rt.dispatch_event(key('r'));
        assert_eq!(rt.run_config(), config_before);

        rt.dispatch_event(key('s'));
        rt.wait_for_session(&mut out).unwrap();
        rt.finalize();
        assert_eq!(rt.playback_state(), PlaybackState::Cancelled);

        let locked: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.message == "control_locked")
            .collect();
        assert_eq!(locked.len(), 3);
    }

    #[test]
    fn sliders_adjust_when_idle() {
        let mut rt = runtime();
        rt.bootstrap();
        rt.dispatch_event(key('+'));
        assert_eq!(rt.run_config().size, 15);
        assert_eq!(rt.array().len(), 15);

        rt.dispatch_event(key('['));
        assert_eq!(rt.run_config().speed, 95);

        rt.dispatch_event(key('4'));
        assert_eq!(rt.run_config().algorithm, Algorithm::Quick);
    }

    #[test]
    fn size_clamps_at_slider_bounds() {
        let mut rt = runtime();
        rt.bootstrap();
        rt.dispatch_event(key('-'));
        assert_eq!(rt.run_config().size, 10);
        for _ in 0..30 {
            rt.dispatch_event(key('+'));
        }
        assert_eq!(rt.run_config().size, 100);
    }

    #[test]
    fn stop_discards_queued_events_and_keeps_display_array() {
        let mut rt = runtime();
        rt.config = RunConfig::new(Algorithm::Bubble, 30, 50);
        rt.array = sequence::generate(30);
        rt.bootstrap();
        rt.dispatch_event(key(' '));
        std::thread::sleep(Duration::from_millis(150));
        rt.dispatch_event(key('s'));
        assert_eq!(rt.playback_state(), PlaybackState::Cancelled);
        assert_eq!(rt.array().len(), 30);
        // Highlights are cleared on settle.
        assert!(rt.comparing.is_none() && rt.swapping.is_none());
        rt.finalize();
    }

    #[test]
    fn metrics_accumulate_through_a_run() {
        let mut rt = runtime();
        rt.config_mut().enable_metrics();
        let handle = rt.config_mut().metrics_handle().unwrap();
        let mut sink = io::sink();

        rt.bootstrap();
        rt.dispatch_event(key(' '));
        rt.wait_for_session(&mut sink).unwrap();
        rt.finalize();

        let snapshot = handle.lock().unwrap().snapshot(Duration::ZERO);
        assert!(snapshot.comparisons > 0);
        assert_eq!(snapshot.runs_completed, 1);
    }
}
