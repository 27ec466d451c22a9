//! Configuration for reask retry behavior.

use std::time::Duration;

/// Configuration for reask retry behavior.
#[derive(Debug, Clone)]
pub struct ReaskConfig {
    /// Maximum number of attempts before giving up (default: 3, minimum: 1).
    pub max_attempts: usize,
    /// Optional wall-clock limit for a single generation call (default: none).
    pub attempt_timeout: Option<Duration>,
    /// Whether to include the full schema in validation feedback (default: true).
    pub include_schema_in_feedback: bool,
}

impl Default for ReaskConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: None,
            include_schema_in_feedback: true,
        }
    }
}

impl ReaskConfig {
    /// Set the maximum number of retry attempts. Values below 1 are treated as 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set a per-attempt timeout for the generation call.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    /// Set whether to include the schema in validation feedback.
    #[must_use]
    pub const fn with_schema_in_feedback(mut self, include: bool) -> Self {
        self.include_schema_in_feedback = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaskConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert!(config.attempt_timeout.is_none());
        assert!(config.include_schema_in_feedback);
    }

    #[test]
    fn test_builders() {
        let config = ReaskConfig::default()
            .with_max_attempts(5)
            .with_attempt_timeout(Duration::from_secs(30))
            .with_schema_in_feedback(false);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.attempt_timeout, Some(Duration::from_secs(30)));
        assert!(!config.include_schema_in_feedback);
    }
}
