//! Declarative validation rule tables
//!
//! A [`Schema`] is an ordered table of fields, each carrying a list of
//! predicate/message rules over a draft. Validation reports at most one
//! message per field: the first rule that fails.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

type Predicate<D> = Box<dyn Fn(&D) -> bool + Send + Sync>;

/// A single predicate with the message shown when it fails
pub struct Rule<D> {
    check: Predicate<D>,
    message: String,
}

impl<D> Rule<D> {
    pub fn new(check: impl Fn(&D) -> bool + Send + Sync + 'static, message: impl Into<String>) -> Self {
        Self {
            check: Box::new(check),
            message: message.into(),
        }
    }

    pub fn passes(&self, draft: &D) -> bool {
        (self.check)(draft)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Text field must have at least `min` characters
pub fn min_length<D: 'static>(get: fn(&D) -> &str, min: usize, message: impl Into<String>) -> Rule<D> {
    Rule::new(move |draft| get(draft).chars().count() >= min, message)
}

/// Text field must not be blank
pub fn required<D: 'static>(get: fn(&D) -> &str, message: impl Into<String>) -> Rule<D> {
    Rule::new(move |draft| !get(draft).trim().is_empty(), message)
}

/// Optional text field: blank passes, otherwise `check` must hold
pub fn optional<D: 'static>(
    get: fn(&D) -> &str,
    check: fn(&str) -> bool,
    message: impl Into<String>,
) -> Rule<D> {
    Rule::new(
        move |draft| {
            let value = get(draft);
            value.trim().is_empty() || check(value)
        },
        message,
    )
}

struct FieldRules<D> {
    field: &'static str,
    rules: Vec<Rule<D>>,
}

/// Ordered rule table for one draft type
pub struct Schema<D> {
    fields: Vec<FieldRules<D>>,
}

impl<D> Schema<D> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field and its rules, evaluated in the given order
    pub fn field(mut self, field: &'static str, rules: Vec<Rule<D>>) -> Self {
        self.fields.push(FieldRules { field, rules });
        self
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.field).collect()
    }

    /// Validate a draft against every field
    pub fn validate(&self, draft: &D) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for field in &self.fields {
            if let Some(rule) = field.rules.iter().find(|rule| !rule.passes(draft)) {
                errors.insert(field.field, rule.message());
            }
        }
        errors
    }
}

impl<D> Default for Schema<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        write!(f, "{}", parts.join("; "))
    }
}
