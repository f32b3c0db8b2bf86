//! Custom-sort evaluator. Runs a user-supplied sort function against a fresh
//! 10-element sample and validates the result. There is no isolation: the
//! function runs in-process with full host access, which is an accepted risk
//! of the feature. Panics are caught and surfaced as errors instead of
//! taking down the host.

use std::fmt;
use std::panic::{self, UnwindSafe};

use thiserror::Error;

use crate::sequence;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("{0}")]
    Evaluation(String),
    #[error("returned array must have the same length as input array ({expected} != {actual})")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Outcome of a sandbox run. `sorted` reports pairwise monotonicity; an
/// unsorted result is a report, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxReport {
    pub input: Vec<u32>,
    pub output: Vec<u32>,
    pub sorted: bool,
}

impl fmt::Display for SandboxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input: [{}]", join(&self.input))?;
        writeln!(f, "Output: [{}]", join(&self.output))?;
        write!(f, "Sorted: {}", if self.sorted { "Yes" } else { "No" })
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Evaluate `custom_sort` against a freshly generated sample.
pub fn evaluate<F>(custom_sort: F) -> Result<SandboxReport, SandboxError>
where
    F: FnOnce(&[u32]) -> Vec<u32> + UnwindSafe,
{
    evaluate_with_input(sequence::sample(), custom_sort)
}

/// Same as [`evaluate`] but with a caller-chosen sample, so tests can pin
/// the input.
pub fn evaluate_with_input<F>(input: Vec<u32>, custom_sort: F) -> Result<SandboxReport, SandboxError>
where
    F: FnOnce(&[u32]) -> Vec<u32> + UnwindSafe,
{
    let sample = input.clone();
    let output =
        panic::catch_unwind(move || custom_sort(&sample)).map_err(|payload| {
            SandboxError::Evaluation(panic_message(payload.as_ref()))
        })?;

    if output.len() != input.len() {
        return Err(SandboxError::LengthMismatch {
            expected: input.len(),
            actual: output.len(),
        });
    }

    let sorted = output.windows(2).all(|w| w[0] <= w[1]);
    Ok(SandboxReport {
        input,
        output,
        sorted,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "custom sort panicked".to_string()
    }
}
