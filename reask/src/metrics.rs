//! Attempt, timing, and token accounting for reask requests.

use std::time::Duration;

/// Metrics collected across one request's attempts.
#[derive(Debug, Clone, Default)]
pub struct ReaskMetrics {
    /// Total number of attempts made.
    pub total_attempts: usize,
    /// Wall-clock time elapsed during the request.
    pub wall_time: Duration,
    /// Estimated input tokens sent to the collaborator.
    pub estimated_input_tokens: usize,
    /// Estimated output tokens received from the collaborator.
    pub estimated_output_tokens: usize,
}

/// Running character tally for a single request.
///
/// The orchestrator records every prompt it sends and every raw response it
/// receives; the totals become token estimates when the request terminates.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UsageTally {
    prompt_chars: usize,
    response_chars: usize,
}

impl UsageTally {
    pub(crate) fn record_prompt(&mut self, prompt: &str) {
        self.prompt_chars += prompt.chars().count();
    }

    pub(crate) fn record_response(&mut self, response: &str) {
        self.response_chars += response.chars().count();
    }

    pub(crate) const fn finish(self, total_attempts: usize, wall_time: Duration) -> ReaskMetrics {
        ReaskMetrics {
            total_attempts,
            wall_time,
            estimated_input_tokens: tokens_for_chars(self.prompt_chars),
            estimated_output_tokens: tokens_for_chars(self.response_chars),
        }
    }
}

/// Estimate the token cost of a piece of prompt or response text.
///
/// Four characters per token is the usual rough heuristic for English-ish
/// text; counting `chars` keeps multi-byte text from inflating the estimate,
/// and the result rounds up so short strings never estimate to zero tokens.
///
/// # Examples
///
/// ```
/// assert_eq!(reask::estimate_tokens("what is 2 + 2?"), 4); // 14 chars
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    tokens_for_chars(text.chars().count())
}

const fn tokens_for_chars(chars: usize) -> usize {
    chars.div_ceil(4)
}
