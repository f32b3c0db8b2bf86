//! The instrumented sort engine: algorithm selection, the observer surface,
//! and the cooperative pause/cancel machinery.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

pub mod algorithms;
pub mod control;
pub mod observer;

pub use control::{Interrupted, SortControls, StepContext, StepResult};
pub use observer::{
    AnimationEvent, ChannelObserver, NullObserver, RecordingObserver, SortObserver,
};

/// The eight animated algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bubble,
    Selection,
    Insertion,
    Quick,
    Merge,
    Heap,
    Shell,
    Radix,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Quick,
        Algorithm::Merge,
        Algorithm::Heap,
        Algorithm::Shell,
        Algorithm::Radix,
    ];

    /// Stable identifier used on the CLI and in log fields.
    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Quick => "quick",
            Algorithm::Merge => "merge",
            Algorithm::Heap => "heap",
            Algorithm::Shell => "shell",
            Algorithm::Radix => "radix",
        }
    }

    /// Human-facing name shown in the header and docs panel.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Selection => "Selection Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Quick => "Quick Sort",
            Algorithm::Merge => "Merge Sort",
            Algorithm::Heap => "Heap Sort",
            Algorithm::Shell => "Shell Sort",
            Algorithm::Radix => "Radix Sort",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.key() == s.to_ascii_lowercase())
            .ok_or_else(|| EngineError::UnknownAlgorithm(s.to_string()))
    }
}

/// Run the chosen algorithm against the caller's working copy.
pub fn run_algorithm(
    algorithm: Algorithm,
    arr: &mut [u32],
    ctx: &StepContext,
) -> StepResult<()> {
    match algorithm {
        Algorithm::Bubble => algorithms::bubble(arr, ctx),
        Algorithm::Selection => algorithms::selection(arr, ctx),
        Algorithm::Insertion => algorithms::insertion(arr, ctx),
        Algorithm::Quick => algorithms::quick(arr, ctx),
        Algorithm::Merge => algorithms::merge(arr, ctx),
        Algorithm::Heap => algorithms::heap(arr, ctx),
        Algorithm::Shell => algorithms::shell(arr, ctx),
        Algorithm::Radix => algorithms::radix(arr, ctx),
    }
}
