//! Validator trait and closure adapters for constraint chains.
//!
//! A [`Validator`] receives a candidate value and a read-only [`ValidationContext`]
//! and either passes the (possibly transformed) value through or rejects it with a
//! human-readable reason. Validators compose into ordered chains: each link
//! receives the output of the previous one, so a transform placed before a check
//! changes what the check sees.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

/// Read-only auxiliary data made available to context-aware validators.
///
/// The orchestrator passes the context through verbatim on every attempt; it
/// never inspects or mutates the entries itself. Typical entries are reference
/// text for citation checks or a blocklist for content checks.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    entries: BTreeMap<String, Value>,
}

impl ValidationContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adds an entry (fluent builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns true if the context carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in the context.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A single link in a validation chain.
///
/// Implementations must be side-effect-free with respect to the orchestrator's
/// state and stable on already-valid input: re-applying a chain to a value it
/// has already accepted yields the same value.
pub trait Validator: Send + Sync {
    /// Short name used in failure attribution (e.g. `"contains_space"`).
    fn name(&self) -> &str;

    /// Applies the validator, returning the passed-through or transformed value,
    /// or a human-readable rejection reason.
    fn apply(&self, value: Value, context: &ValidationContext) -> Result<Value, String>;
}

type CheckFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;
type ContextCheckFn = Arc<dyn Fn(&Value, &ValidationContext) -> Result<(), String> + Send + Sync>;

/// A pure constraint check: passes the value through unchanged on success.
#[derive(Clone)]
pub struct Check {
    name: String,
    check: CheckFn,
}

impl Check {
    /// Wraps a constraint closure as a chain link.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

impl Validator for Check {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: Value, _context: &ValidationContext) -> Result<Value, String> {
        (self.check)(&value)?;
        Ok(value)
    }
}

/// A value transform: later links in the chain see the transformed output.
#[derive(Clone)]
pub struct Transform {
    name: String,
    transform: TransformFn,
}

impl Transform {
    /// Wraps a transform closure as a chain link.
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }
}

impl Validator for Transform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: Value, _context: &ValidationContext) -> Result<Value, String> {
        (self.transform)(value)
    }
}

/// A constraint check that consults the request's [`ValidationContext`].
#[derive(Clone)]
pub struct ContextCheck {
    name: String,
    check: ContextCheckFn,
}

impl ContextCheck {
    /// Wraps a context-aware constraint closure as a chain link.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value, &ValidationContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

impl Validator for ContextCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: Value, context: &ValidationContext) -> Result<Value, String> {
        (self.check)(&value, context)?;
        Ok(value)
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .finish()
    }
}

impl std::fmt::Debug for ContextCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCheck")
            .field("name", &self.name)
            .finish()
    }
}
