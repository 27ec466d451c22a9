//! Failure-feedback builders for reask prompts.
//!
//! The generation collaborator keeps no memory between calls, so every reason
//! a candidate was rejected must be re-rendered into the next prompt. The
//! orchestrator appends these blocks to the running prompt, which makes the
//! prompt an accumulator of every reason collected so far.

use serde_json::Value;

use crate::outcome::Violation;

/// Build validation feedback for the collaborator with complete error context.
///
/// Includes:
/// - Attempt counter (e.g., "Attempt 2/3")
/// - Every violation with field/value attribution
/// - The expected schema (optional, for reference)
/// - Echoed submission (so the collaborator can compare)
/// - Instruction to fix and resubmit
///
/// # Examples
///
/// ```
/// use reask::{build_validation_feedback, Violation};
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
/// let submitted = json!({"name": "Jason"});
/// let violations = vec![Violation::field("name", "contains_space", "must contain a space")];
///
/// let feedback = build_validation_feedback(&schema, &submitted, &violations, 1, 3, true);
/// assert!(feedback.contains("Attempt 1/3"));
/// assert!(feedback.contains("must contain a space"));
/// ```
#[must_use]
pub fn build_validation_feedback(
    schema: &Value,
    submitted: &Value,
    violations: &[Violation],
    attempt: usize,
    max_attempts: usize,
    include_schema: bool,
) -> String {
    let mut feedback = format!("Attempt {attempt}/{max_attempts}: validation failed.\n\n");

    feedback.push_str("Problems:\n");
    for violation in violations {
        feedback.push_str("  - ");
        feedback.push_str(&violation.to_string());
        feedback.push('\n');
    }

    if include_schema {
        feedback.push_str("\nExpected schema:\n");
        let schema_str =
            serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
        feedback.push_str(&schema_str);
    }

    feedback.push_str("\n\nYour submission:\n");
    let submitted_str =
        serde_json::to_string_pretty(submitted).unwrap_or_else(|_| submitted.to_string());
    feedback.push_str(&submitted_str);

    feedback.push_str("\n\nPlease fix all of the problems above and resubmit.");

    feedback
}

/// Build feedback for when collaborator output is not valid JSON.
///
/// Includes the attempt counter, the parse error, a truncated echo of the raw
/// response (first 500 characters), the expected schema when requested, and an
/// instruction to respond with valid JSON.
#[must_use]
pub fn build_parse_error_feedback(
    raw_text: &str,
    parse_error: &str,
    attempt: usize,
    max_attempts: usize,
    schema: &Value,
    include_schema: bool,
) -> String {
    let mut feedback =
        format!("Attempt {attempt}/{max_attempts}: could not parse your response as JSON.\n\n");

    feedback.push_str("Parse error: ");
    feedback.push_str(parse_error);
    feedback.push_str("\n\n");

    feedback.push_str("Your response (first 500 chars):\n");
    feedback.push_str(&truncate_chars(raw_text, 500));

    if include_schema {
        feedback.push_str("\n\nExpected schema:\n");
        let schema_str =
            serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
        feedback.push_str(&schema_str);
    }

    feedback.push_str("\n\nPlease respond with valid JSON matching the expected schema.");

    feedback
}

// Char-boundary-safe truncation; byte slicing would panic on multi-byte UTF-8.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_validation_feedback() {
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let submitted = json!({"name": "Jason"});
        let violations = vec![Violation::field(
            "name",
            "contains_space",
            "must contain a space",
        )];

        let feedback = build_validation_feedback(&schema, &submitted, &violations, 1, 3, true);

        assert!(feedback.contains("Attempt 1/3"));
        assert!(feedback.contains("validation failed"));
        assert!(feedback.contains("field 'name' [contains_space]: must contain a space"));
        assert!(feedback.contains("Expected schema:"));
        assert!(feedback.contains("Your submission:"));
        assert!(feedback.contains("Please fix all of the problems"));
    }

    #[test]
    fn test_build_validation_feedback_without_schema() {
        let schema = json!({"type": "object"});
        let submitted = json!({});
        let violations = vec![Violation::value("check", "nope")];

        let feedback = build_validation_feedback(&schema, &submitted, &violations, 2, 2, false);

        assert!(!feedback.contains("Expected schema:"));
        assert!(feedback.contains("Your submission:"));
    }

    #[test]
    fn test_build_parse_error_feedback() {
        let schema = json!({"type": "object", "properties": {"city": {"type": "string"}}});

        let feedback = build_parse_error_feedback(
            "Sure! The city you asked about is Lisbon.",
            "expected value at line 1 column 1",
            1,
            4,
            &schema,
            true,
        );

        assert!(feedback.contains("Attempt 1/4"));
        assert!(feedback.contains("could not parse"));
        assert!(feedback.contains("expected value at line 1 column 1"));
        assert!(feedback.contains("Lisbon"));
        assert!(feedback.contains("Expected schema:"));
        assert!(feedback.contains("respond with valid JSON"));
    }

    #[test]
    fn test_build_parse_error_feedback_echo_is_bounded() {
        let schema = json!({"type": "object"});
        let rambling = "word ".repeat(400);

        let feedback =
            build_parse_error_feedback(&rambling, "trailing characters", 2, 3, &schema, false);

        // the echo stops at 500 characters and marks the cut
        assert!(feedback.contains("..."));
        assert!(!feedback.contains(&rambling));
        assert!(feedback.len() < rambling.len());
        assert!(!feedback.contains("Expected schema:"));
    }

    #[test]
    fn test_truncate_chars_is_utf8_safe() {
        let text = "é".repeat(600);
        let truncated = truncate_chars(&text, 500);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 503);
    }
}
