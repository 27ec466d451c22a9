//! Orchestration layer for bounded validate-then-reask retry loops.

use serde_json::Value;
use tokio::time::Instant;

use crate::config::ReaskConfig;
use crate::error::{AttemptRecord, ReaskError};
use crate::feedback::{build_parse_error_feedback, build_validation_feedback};
use crate::metrics::{ReaskMetrics, UsageTally};
use crate::outcome::{ValidationOutcome, Violation};
use crate::schema::Schema;
use crate::validator::ValidationContext;

/// Orchestrator for running bounded retry loops with validation feedback.
///
/// One call to [`run`](Self::run) is one logical "produce a structured value
/// that satisfies all validators" request. The orchestrator calls the
/// generation collaborator, checks the result against the schema's validator
/// chains, and on rejection re-invokes generation with every reason collected
/// so far rendered into the prompt, up to the configured attempt budget.
///
/// `run` borrows the orchestrator immutably, so concurrent requests against
/// one orchestrator are fully independent: each call owns its own attempt
/// counter, history, and running prompt.
pub struct ReaskOrchestrator {
    schema: Schema,
    config: ReaskConfig,
}

impl ReaskOrchestrator {
    /// Creates a new orchestrator with the given schema and default configuration.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            config: ReaskConfig::default(),
        }
    }

    /// Creates a new orchestrator with the given schema and configuration.
    #[must_use]
    pub const fn with_config(schema: Schema, config: ReaskConfig) -> Self {
        Self { schema, config }
    }

    /// Sets the maximum number of retry attempts (fluent builder pattern).
    #[must_use]
    pub const fn max_attempts(mut self, max: usize) -> Self {
        self.config.max_attempts = max;
        self
    }

    /// Runs the validate-then-reask loop with the given generation function.
    ///
    /// The generation function receives the current prompt and returns the
    /// collaborator's raw text output (or an error string). The collaborator
    /// is stateless; only validation failures are absorbed into a retry, and
    /// the context is handed to context-aware validators verbatim on every
    /// attempt.
    ///
    /// Returns the validated (and transformed) JSON with metrics on success.
    ///
    /// # Errors
    ///
    /// Returns [`ReaskError::RetriesExhausted`] when every attempt failed
    /// validation, [`ReaskError::SchemaError`] if the schema does not
    /// compile, [`ReaskError::GenerationFailed`] if the collaborator itself
    /// fails, and [`ReaskError::Cancelled`] if a configured per-attempt
    /// timeout fires. The last three are surfaced immediately, not retried.
    pub async fn run<F, Fut>(
        &self,
        generate_fn: F,
        base_prompt: String,
        context: &ValidationContext,
    ) -> Result<(Value, ReaskMetrics), ReaskError>
    where
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = Result<String, String>>,
    {
        let start = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);
        let mut history: Vec<AttemptRecord> = Vec::new();
        let mut usage = UsageTally::default();
        let mut current_prompt = base_prompt;

        // Compile the schema up front (early error if the schema is invalid)
        let schema_json = self.schema.to_json_schema();
        let compiled = jsonschema::Validator::new(&schema_json)
            .map_err(|e| ReaskError::SchemaError(e.to_string()))?;

        for attempt in 1..=max_attempts {
            usage.record_prompt(&current_prompt);

            let raw_output = self
                .generate(&generate_fn, current_prompt.clone(), attempt)
                .await?;
            usage.record_response(&raw_output);

            // A non-JSON response is a validation failure: it consumes the
            // attempt and its parse error is fed back on the next round.
            let parsed = match serde_json::from_str::<Value>(&raw_output) {
                Ok(value) => value,
                Err(e) => {
                    let error_msg = e.to_string();
                    tracing::debug!(
                        target: "reask",
                        attempt,
                        error = %error_msg,
                        "collaborator response was not valid JSON"
                    );
                    history.push(AttemptRecord {
                        attempt_number: attempt,
                        prompt: current_prompt.clone(),
                        raw_output: raw_output.clone(),
                        submitted: Value::Null,
                        violations: vec![Violation::shape(
                            "",
                            format!("JSON parse error: {error_msg}"),
                        )],
                        elapsed: start.elapsed(),
                    });

                    if attempt < max_attempts {
                        let feedback = build_parse_error_feedback(
                            &raw_output,
                            &error_msg,
                            attempt,
                            max_attempts,
                            &schema_json,
                            self.config.include_schema_in_feedback,
                        );
                        current_prompt = format!("{current_prompt}\n\n{feedback}");
                    }
                    continue;
                }
            };

            match self
                .schema
                .check_compiled(&compiled, parsed.clone(), context)
            {
                ValidationOutcome::Valid(value) => {
                    tracing::debug!(target: "reask", attempt, "candidate accepted");
                    return Ok((value, usage.finish(attempt, start.elapsed())));
                }
                ValidationOutcome::Invalid(violations) => {
                    tracing::debug!(
                        target: "reask",
                        attempt,
                        violations = violations.len(),
                        "candidate rejected"
                    );
                    history.push(AttemptRecord {
                        attempt_number: attempt,
                        prompt: current_prompt.clone(),
                        raw_output,
                        submitted: parsed.clone(),
                        violations: violations.clone(),
                        elapsed: start.elapsed(),
                    });

                    if attempt < max_attempts {
                        let feedback = build_validation_feedback(
                            &schema_json,
                            &parsed,
                            &violations,
                            attempt,
                            max_attempts,
                            self.config.include_schema_in_feedback,
                        );
                        // Prompt accumulation: the collaborator has no memory
                        // of its own prior output, so every rejection stays in
                        // the running prompt.
                        current_prompt = format!("{current_prompt}\n\n{feedback}");
                    }
                }
            }
        }

        tracing::warn!(
            target: "reask",
            attempts = max_attempts,
            "retry budget spent without a valid candidate"
        );

        Err(ReaskError::RetriesExhausted {
            attempts: max_attempts,
            max_attempts,
            history,
            metrics: usage.finish(max_attempts, start.elapsed()),
        })
    }

    /// Convenience method that runs the loop and deserializes to a typed value.
    ///
    /// # Errors
    ///
    /// In addition to everything [`run`](Self::run) returns, this surfaces
    /// [`ReaskError::ParseError`] if deserialization to `T` fails after the
    /// candidate passed validation.
    pub async fn run_typed<T, F, Fut>(
        &self,
        generate_fn: F,
        base_prompt: String,
        context: &ValidationContext,
    ) -> Result<(T, ReaskMetrics), ReaskError>
    where
        T: serde::de::DeserializeOwned,
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = Result<String, String>>,
    {
        let (value, metrics) = self.run(generate_fn, base_prompt, context).await?;

        let attempt = metrics.total_attempts;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Ok((typed, metrics)),
            Err(e) => Err(ReaskError::ParseError {
                message: format!("validated JSON does not fit the target type: {e}"),
                raw_text: value.to_string(),
                attempt,
            }),
        }
    }

    /// One generation call, with the configured timeout applied when present.
    /// Collaborator errors and timeouts are terminal for the whole request.
    async fn generate<F, Fut>(
        &self,
        generate_fn: &F,
        prompt: String,
        attempt: usize,
    ) -> Result<String, ReaskError>
    where
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = Result<String, String>>,
    {
        let generated = match self.config.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, generate_fn(prompt))
                .await
                .map_err(|_| ReaskError::Cancelled { attempt, limit })?,
            None => generate_fn(prompt).await,
        };

        generated.map_err(|message| ReaskError::GenerationFailed { message, attempt })
    }
}
