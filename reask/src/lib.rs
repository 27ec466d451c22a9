//! Bounded retry loops for validated structured LLM output.
//!
//! This crate turns a stateless prompt-to-text collaborator into a source of
//! validated structured values:
//!
//! - [`Schema`] - expected output shape with per-field validator chains
//! - [`Validator`] - check, transform, and context-aware constraint forms
//! - [`ReaskOrchestrator`] - async retry loop with validation feedback
//! - [`ReaskError`] - typed error enum with full attempt history
//! - [`ReaskMetrics`] - token and timing metrics
//! - [`ReaskConfig`] - retry behavior configuration
//!
//! The collaborator keeps no memory between calls, so every failure reason is
//! re-rendered into the next prompt ("reasking") until the output passes or
//! the attempt budget runs out.

pub mod config;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod orchestrator;
pub mod outcome;
pub mod schema;
pub mod validator;

pub use config::ReaskConfig;
pub use error::{AttemptRecord, ReaskError};
pub use feedback::{build_parse_error_feedback, build_validation_feedback};
pub use metrics::{estimate_tokens, ReaskMetrics};
pub use orchestrator::ReaskOrchestrator;
pub use outcome::{ValidationOutcome, Violation, ViolationTarget};
pub use schema::{FieldSpec, FieldType, Schema};
pub use validator::{Check, ContextCheck, Transform, ValidationContext, Validator};

/// Common traits and types for ergonomic usage of the reask loop.
pub mod prelude {
    pub use crate::config::ReaskConfig;
    pub use crate::error::{AttemptRecord, ReaskError};
    pub use crate::metrics::ReaskMetrics;
    pub use crate::orchestrator::ReaskOrchestrator;
    pub use crate::outcome::{ValidationOutcome, Violation, ViolationTarget};
    pub use crate::schema::{FieldSpec, FieldType, Schema};
    pub use crate::validator::{Check, ContextCheck, Transform, ValidationContext, Validator};
}
