use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated while the visualizer is running. One instance is
/// shared between the runtime loop and whoever emits periodic snapshots.
#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    comparisons: u64,
    swaps: u64,
    array_updates: u64,
    renders: u64,
    runs_completed: u64,
    runs_cancelled: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_compare(&mut self) {
        self.comparisons = self.comparisons.saturating_add(1);
    }

    pub fn record_swap(&mut self) {
        self.swaps = self.swaps.saturating_add(1);
    }

    pub fn record_array_update(&mut self) {
        self.array_updates = self.array_updates.saturating_add(1);
    }

    pub fn record_render(&mut self) {
        self.renders = self.renders.saturating_add(1);
    }

    pub fn record_run(&mut self, cancelled: bool) {
        if cancelled {
            self.runs_cancelled = self.runs_cancelled.saturating_add(1);
        } else {
            self.runs_completed = self.runs_completed.saturating_add(1);
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            comparisons: self.comparisons,
            swaps: self.swaps,
            array_updates: self.array_updates,
            renders: self.renders,
            runs_completed: self.runs_completed,
            runs_cancelled: self.runs_cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub comparisons: u64,
    pub swaps: u64,
    pub array_updates: u64,
    pub renders: u64,
    pub runs_completed: u64,
    pub runs_cancelled: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("comparisons".to_string(), json!(self.comparisons));
        map.insert("swaps".to_string(), json!(self.swaps));
        map.insert("array_updates".to_string(), json!(self.array_updates));
        map.insert("renders".to_string(), json!(self.renders));
        map.insert("runs_completed".to_string(), json!(self.runs_completed));
        map.insert("runs_cancelled".to_string(), json!(self.runs_cancelled));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "engine_metrics".to_string(),
            self.as_fields(),
        )
    }
}
