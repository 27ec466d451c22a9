//! Validation outcomes and failure attribution.

use serde_json::Value;

/// Where in the candidate a violation was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationTarget {
    /// A named field's validator chain rejected the field value.
    Field(String),
    /// The whole-value validator chain rejected the candidate.
    Value,
    /// The structural check rejected the candidate at this instance path.
    Shape(String),
}

/// A single rejection: which validator failed, where, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field, whole-value, or structural attribution.
    pub target: ViolationTarget,
    /// Name of the validator that rejected the value, when one did.
    pub validator: Option<String>,
    /// Human-readable reason, fed back verbatim into the next prompt.
    pub message: String,
}

impl Violation {
    /// Violation raised by a named validator on a specific field.
    #[must_use]
    pub fn field(
        field: impl Into<String>,
        validator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: ViolationTarget::Field(field.into()),
            validator: Some(validator.into()),
            message: message.into(),
        }
    }

    /// Violation raised by a named validator on the whole candidate.
    #[must_use]
    pub fn value(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: ViolationTarget::Value,
            validator: Some(validator.into()),
            message: message.into(),
        }
    }

    /// Violation raised by the structural (schema shape) check.
    #[must_use]
    pub fn shape(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: ViolationTarget::Shape(instance_path.into()),
            validator: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            ViolationTarget::Field(name) => write!(f, "field '{name}'")?,
            ViolationTarget::Value => write!(f, "value")?,
            ViolationTarget::Shape(path) => write!(f, "at path '{path}'")?,
        }
        if let Some(validator) = &self.validator {
            write!(f, " [{validator}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Result of running the full validator pipeline against one candidate.
///
/// A candidate is [`Valid`](ValidationOutcome::Valid) only if the structural
/// check, every field chain, and the whole-value chain all accept it in order;
/// the carried value reflects every transform applied along the way.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Every validator accepted; carries the transformed value.
    Valid(Value),
    /// One or more validators rejected; carries all collected reasons.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the collected violations, empty when valid.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(violations) => violations,
        }
    }

    /// Unwraps the transformed value, if valid.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_violation_display_field() {
        let v = Violation::field("name", "contains_space", "must contain a space");
        assert_eq!(
            v.to_string(),
            "field 'name' [contains_space]: must contain a space"
        );
    }

    #[test]
    fn test_violation_display_shape() {
        let v = Violation::shape("/age", "-5 is less than the minimum of 0");
        assert_eq!(v.to_string(), "at path '/age': -5 is less than the minimum of 0");
    }

    #[test]
    fn test_outcome_accessors() {
        let valid = ValidationOutcome::Valid(json!({"ok": true}));
        assert!(valid.is_valid());
        assert!(valid.violations().is_empty());
        assert_eq!(valid.into_value(), Some(json!({"ok": true})));

        let invalid = ValidationOutcome::Invalid(vec![Violation::value("v", "nope")]);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.violations().len(), 1);
        assert!(invalid.into_value().is_none());
    }
}
