//! Error types for the simulator.

use thiserror::Error;

/// Every way a run can fail before or during generation, tabulation or
/// assignment bookkeeping.
///
/// Optimizer non-convergence is not an error; it is reported through
/// [`crate::Termination`].
#[derive(Error, Debug)]
pub enum GrreatError {
    /// A grid side length is not of the form 2^n + 1 (n >= 1).
    #[error("invalid grid {axis} {value}: must be one plus a power of two (at least 3)")]
    InvalidGridDimension { axis: &'static str, value: usize },

    /// Configuration values that are out of range or mutually incompatible.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The population generator could not conserve the configured totals.
    #[error("generation failed at precinct ({x}, {y}) with {red_remaining} red / {blue_remaining} blue remaining: {reason}")]
    GenerationError {
        x: usize,
        y: usize,
        red_remaining: u64,
        blue_remaining: u64,
        reason: String,
    },

    /// The tabulator was asked to fill fewer than one seat.
    #[error("invalid seat count {0}: at least one seat is required")]
    InvalidSeatCount(u32),

    /// A precinct is missing from, or duplicated in, a district assignment.
    #[error("assignment invariant violated{}: {reason}", at_precinct(.precinct))]
    AssignmentInvariantViolation {
        precinct: Option<(usize, usize)>,
        reason: String,
    },

    /// Precinct counts, usually read from a population map file, that do not
    /// describe a valid population.
    #[error("invalid population map{}: {reason}", at_precinct(.precinct))]
    InvalidPopulationMap {
        precinct: Option<(usize, usize)>,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GrreatError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        GrreatError::InvalidConfig(message.into())
    }

    /// Creates a population map error, optionally tied to a precinct.
    pub fn population_map(precinct: Option<(usize, usize)>, reason: impl Into<String>) -> Self {
        GrreatError::InvalidPopulationMap { precinct, reason: reason.into() }
    }

    /// Creates an assignment error tied to a specific precinct.
    pub fn assignment_at(x: usize, y: usize, reason: impl Into<String>) -> Self {
        GrreatError::AssignmentInvariantViolation { precinct: Some((x, y)), reason: reason.into() }
    }

    /// Creates an assignment error that is not tied to one precinct.
    pub fn assignment(reason: impl Into<String>) -> Self {
        GrreatError::AssignmentInvariantViolation { precinct: None, reason: reason.into() }
    }
}

fn at_precinct(precinct: &Option<(usize, usize)>) -> String {
    precinct.map(|(x, y)| format!(" at precinct ({x}, {y})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, GrreatError>;
