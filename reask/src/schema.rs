//! Caller-defined description of the expected structured output.
//!
//! A [`Schema`] names the fields the generation collaborator must produce,
//! attaches an ordered validator chain to each field plus one chain for the
//! whole candidate, and renders to a JSON Schema document for the structural
//! check and for feedback prompts. Schemas are immutable once built.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::outcome::{ValidationOutcome, Violation};
use crate::validator::{ValidationContext, Validator};

/// Semantic type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Number,
    /// True or false.
    Boolean,
    /// Homogeneous list of the given element type.
    Array(Box<FieldType>),
    /// Nested free-form object.
    Object,
}

impl FieldType {
    fn type_schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Array(items) => json!({"type": "array", "items": items.type_schema()}),
            Self::Object => json!({"type": "object"}),
        }
    }
}

/// One named field: semantic type, optional description, validator chain.
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    description: Option<String>,
    required: bool,
    validators: Vec<Arc<dyn Validator>>,
}

impl FieldSpec {
    /// Declares a required field of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            required: true,
            validators: Vec::new(),
        }
    }

    /// Attaches a description, surfaced in the rendered schema.
    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Marks the field as optional (absent fields skip their chain).
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Appends a validator to this field's chain; later links receive the
    /// output of earlier ones.
    #[must_use]
    pub fn validate(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }
}

/// Expected output shape with attached validator chains.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    raw: Option<Value>,
    value_validators: Vec<Arc<dyn Validator>>,
}

impl Schema {
    /// Starts an empty object schema; add fields with [`Schema::field`].
    #[must_use]
    pub fn object() -> Self {
        Self::default()
    }

    /// Wraps a pre-built JSON Schema document (e.g. derived with `schemars`).
    ///
    /// Field chains are unavailable in this form; whole-value validators can
    /// still be attached with [`Schema::validate`].
    #[must_use]
    pub fn from_value(schema: Value) -> Self {
        Self {
            fields: Vec::new(),
            raw: Some(schema),
            value_validators: Vec::new(),
        }
    }

    /// Derives the structural schema from a Rust type via `schemars`.
    #[must_use]
    pub fn of<T: schemars::JsonSchema>() -> Self {
        Self::from_value(json!(schemars::schema_for!(T)))
    }

    /// Adds a field declaration (fluent builder pattern).
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Appends a validator to the whole-value chain, run after every field
    /// chain has accepted.
    #[must_use]
    pub fn validate(mut self, validator: impl Validator + 'static) -> Self {
        self.value_validators.push(Arc::new(validator));
        self
    }

    /// Renders the structural portion as a JSON Schema document.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }

        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut prop = field.ty.type_schema();
            if let (Some(obj), Some(text)) = (prop.as_object_mut(), &field.description) {
                obj.insert("description".to_string(), json!(text));
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(json!(field.name));
            }
        }

        json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(required),
        })
    }

    /// Runs the full pipeline against one candidate: structural check, then
    /// field chains, then the whole-value chain.
    ///
    /// Evaluation is staged. Structural errors are all collected; if any
    /// exist, custom chains do not run (they assume well-typed input). Field
    /// chains each short-circuit on their own first failure, but failures
    /// across different fields are all collected. The whole-value chain runs
    /// only on an otherwise clean candidate and short-circuits, since each
    /// link feeds the next.
    #[must_use]
    pub fn check(&self, candidate: Value, context: &ValidationContext) -> ValidationOutcome {
        let schema_json = self.to_json_schema();
        match jsonschema::Validator::new(&schema_json) {
            Ok(compiled) => self.check_compiled(&compiled, candidate, context),
            Err(e) => ValidationOutcome::Invalid(vec![Violation::shape(
                "",
                format!("schema compilation error: {e}"),
            )]),
        }
    }

    pub(crate) fn check_compiled(
        &self,
        compiled: &jsonschema::Validator,
        candidate: Value,
        context: &ValidationContext,
    ) -> ValidationOutcome {
        let shape_violations: Vec<Violation> = compiled
            .iter_errors(&candidate)
            .map(|error| Violation::shape(error.instance_path.to_string(), error.to_string()))
            .collect();
        if !shape_violations.is_empty() {
            return ValidationOutcome::Invalid(shape_violations);
        }

        let mut working = candidate;
        let mut violations = Vec::new();

        if let Some(obj) = working.as_object_mut() {
            for field in &self.fields {
                let Some(mut current) = obj.get(&field.name).cloned() else {
                    continue;
                };
                let mut failed = false;
                for link in &field.validators {
                    match link.apply(current.clone(), context) {
                        Ok(next) => current = next,
                        Err(message) => {
                            violations.push(Violation::field(&field.name, link.name(), message));
                            failed = true;
                            break;
                        }
                    }
                    // transform chaining: the next link sees this link's output
                }
                if !failed {
                    obj.insert(field.name.clone(), current);
                }
            }
        }

        if !violations.is_empty() {
            return ValidationOutcome::Invalid(violations);
        }

        let mut current = working;
        for link in &self.value_validators {
            match link.apply(current, context) {
                Ok(next) => current = next,
                Err(message) => {
                    return ValidationOutcome::Invalid(vec![Violation::value(
                        link.name(),
                        message,
                    )]);
                }
            }
        }

        ValidationOutcome::Valid(current)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field(
                "fields",
                &self.fields.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .field("raw", &self.raw.is_some())
            .field("value_validators", &self.value_validators.len())
            .finish()
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("required", &self.required)
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Check, ContextCheck, Transform};
    use serde_json::json;

    fn uppercase() -> Transform {
        Transform::new("uppercase", |v| match v {
            Value::String(s) => Ok(Value::String(s.to_uppercase())),
            other => Ok(other),
        })
    }

    fn all_caps() -> Check {
        Check::new("all_caps", |v| {
            let s = v.as_str().unwrap_or_default();
            if s.chars().any(|c| c.is_lowercase()) {
                Err("must be upper case".to_string())
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = Schema::object()
            .field(FieldSpec::new("name", FieldType::String).describe("Full name"))
            .field(FieldSpec::new("age", FieldType::Integer))
            .field(FieldSpec::new("tags", FieldType::Array(Box::new(FieldType::String))).optional());

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["name"]["type"], "string");
        assert_eq!(rendered["properties"]["name"]["description"], "Full name");
        assert_eq!(rendered["properties"]["tags"]["items"]["type"], "string");
        assert_eq!(rendered["required"], json!(["name", "age"]));
    }

    #[test]
    fn test_structural_violations_collected() {
        let schema = Schema::object()
            .field(FieldSpec::new("name", FieldType::String))
            .field(FieldSpec::new("age", FieldType::Integer));

        let outcome = schema.check(json!({"age": "old"}), &ValidationContext::new());
        let violations = outcome.violations().to_vec();
        // missing required "name" and mistyped "age", both reported
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.validator.is_none()));
    }

    #[test]
    fn test_field_chain_transform_then_check() {
        let schema = Schema::object().field(
            FieldSpec::new("name", FieldType::String)
                .validate(uppercase())
                .validate(all_caps()),
        );

        let outcome = schema.check(json!({"name": "jason liu"}), &ValidationContext::new());
        assert_eq!(outcome.into_value(), Some(json!({"name": "JASON LIU"})));
    }

    #[test]
    fn test_field_chain_order_sensitivity() {
        // check-before-transform sees the untransformed value and must reject
        let schema = Schema::object().field(
            FieldSpec::new("name", FieldType::String)
                .validate(all_caps())
                .validate(uppercase()),
        );

        let outcome = schema.check(json!({"name": "jason liu"}), &ValidationContext::new());
        assert!(!outcome.is_valid());
        assert_eq!(outcome.violations()[0].validator.as_deref(), Some("all_caps"));
    }

    #[test]
    fn test_failures_collected_across_fields() {
        let rejecting = |name: &str| {
            Check::new(name.to_string(), |_| Err("rejected".to_string()))
        };
        let schema = Schema::object()
            .field(FieldSpec::new("a", FieldType::String).validate(rejecting("check_a")))
            .field(FieldSpec::new("b", FieldType::String).validate(rejecting("check_b")));

        let outcome = schema.check(json!({"a": "x", "b": "y"}), &ValidationContext::new());
        assert_eq!(outcome.violations().len(), 2);
    }

    #[test]
    fn test_whole_value_chain_runs_last() {
        let schema = Schema::object()
            .field(FieldSpec::new("name", FieldType::String).validate(uppercase()))
            .validate(Check::new("name_is_caps", |v| {
                let name = v["name"].as_str().unwrap_or_default();
                if name.chars().any(|c| c.is_lowercase()) {
                    Err("field chain output expected".to_string())
                } else {
                    Ok(())
                }
            }));

        let outcome = schema.check(json!({"name": "jason"}), &ValidationContext::new());
        assert_eq!(outcome.into_value(), Some(json!({"name": "JASON"})));
    }

    #[test]
    fn test_check_is_idempotent_on_valid_output() {
        let schema = Schema::object().field(
            FieldSpec::new("name", FieldType::String)
                .validate(uppercase())
                .validate(all_caps()),
        );

        let ctx = ValidationContext::new();
        let once = schema
            .check(json!({"name": "jason"}), &ctx)
            .into_value()
            .unwrap();
        let twice = schema.check(once.clone(), &ctx).into_value().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_context_reaches_field_validators() {
        let schema = Schema::object().field(
            FieldSpec::new("word", FieldType::String).validate(ContextCheck::new(
                "not_blocked",
                |v, ctx| {
                    let word = v.as_str().unwrap_or_default();
                    let blocked = ctx.get("blocklist").and_then(Value::as_array);
                    if blocked.is_some_and(|list| list.iter().any(|b| b == word)) {
                        Err(format!("'{word}' is blocked"))
                    } else {
                        Ok(())
                    }
                },
            )),
        );

        let ctx = ValidationContext::new().with("blocklist", json!(["spam"]));
        assert!(!schema.check(json!({"word": "spam"}), &ctx).is_valid());
        assert!(schema.check(json!({"word": "ham"}), &ctx).is_valid());
    }
}
