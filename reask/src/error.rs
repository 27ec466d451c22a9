//! Error types for reask operations with attempt history tracking.

use std::time::Duration;
use thiserror::Error;

use crate::metrics::ReaskMetrics;
use crate::outcome::Violation;

/// Record of a single generation-and-validation round.
///
/// Records are append-only: the orchestrator creates one per failed attempt
/// and never mutates it afterwards.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// The full prompt sent to the generation collaborator for this attempt.
    pub prompt: String,
    /// Raw collaborator output text, before parsing.
    pub raw_output: String,
    /// The parsed submission, `Value::Null` when parsing itself failed.
    pub submitted: serde_json::Value,
    /// All violations collected during this attempt, in evaluation order.
    pub violations: Vec<Violation>,
    /// Elapsed time since the request started, at the point of recording.
    pub elapsed: Duration,
}

/// Errors that can occur while running the reask loop.
#[derive(Debug, Error)]
pub enum ReaskError {
    /// Retry budget spent without a valid candidate. A normal terminal
    /// outcome, carrying the full ordered attempt history for diagnostics.
    #[error("validation did not pass after {attempts} attempts (max: {max_attempts})")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// Maximum attempts allowed.
        max_attempts: usize,
        /// History of all attempts with their violations.
        history: Vec<AttemptRecord>,
        /// Metrics tracked across all attempts.
        metrics: ReaskMetrics,
    },

    /// The generation collaborator could not produce a candidate (transport,
    /// quota, etc.). Surfaced immediately; never retried.
    #[error("generation failed at attempt {attempt}: {message}")]
    GenerationFailed {
        /// Collaborator-reported failure message.
        message: String,
        /// Attempt number where the failure occurred.
        attempt: usize,
    },

    /// An in-flight generation call exceeded the configured per-attempt
    /// timeout. Surfaced immediately; never retried.
    #[error("attempt {attempt} cancelled after {limit:?}")]
    Cancelled {
        /// Attempt number that was cancelled.
        attempt: usize,
        /// The timeout that was exceeded.
        limit: Duration,
    },

    /// Schema compilation or validation setup failed.
    #[error("schema error: {0}")]
    SchemaError(String),

    /// Deserialization to the caller's target type failed after the candidate
    /// passed validation.
    #[error("deserialization failed at attempt {attempt}: {message}")]
    ParseError {
        /// Deserialization error message.
        message: String,
        /// The validated JSON that failed to deserialize.
        raw_text: String,
        /// Attempt number that produced the value.
        attempt: usize,
    },
}
