//! Hellasort: classic sorting algorithms animated in the terminal.
//!
//! The engine runs one instrumented algorithm at a time against a private
//! working copy, emitting `Compare` / `Swap` / `ArrayUpdated` events through
//! a queued observer while cooperating with shared pause and cancel flags.
//! The runtime loop renders those events as colored bars and owns the
//! playback state machine.

pub mod docs;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod sandbox;
pub mod sequence;
pub mod session;

pub use engine::{
    Algorithm, AnimationEvent, ChannelObserver, Interrupted, NullObserver, RecordingObserver,
    SortControls, SortObserver, StepContext, StepResult, run_algorithm,
};
pub use error::{EngineError, Result};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use metrics::{EngineMetrics, MetricSnapshot};
pub use render::{BarRenderer, Frame, Size};
pub use runtime::driver::{DriverResult, TerminalDriver, TerminalDriverError};
pub use runtime::{RuntimeConfig, RuntimeEvent, VisualizerRuntime};
pub use sandbox::{SandboxError, SandboxReport};
pub use session::{PlaybackState, RunConfig, SortSession};
