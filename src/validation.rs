//! Schema-driven form validation.
//!
//! A [`FieldSchema`] maps field names to [`ValidationRule`]s. A [`FormValidation`]
//! binds that schema to a mutable draft and keeps two pieces of state next to it:
//! the latest error per field and whether the field has been "touched" (left by the
//! user at least once, or covered by a full validation).
//!
//! Errors only show up for touched fields, so a pristine form never flashes
//! "required" messages while the user is still filling it in. [`FormValidation::validate_all`]
//! is the submit gate: it checks every schema field and marks all of them touched.
//!
//! # Examples
//!
//! ```rust
//! use ehs_report_core::validation::{FieldSchema, FormValidation, ValidationRule};
//! use serde_json::{json, Map};
//!
//! let schema = FieldSchema::new()
//!     .field("description", ValidationRule::new().required().min_length(10));
//!
//! let mut initial = Map::new();
//! initial.insert("description".to_string(), json!("too short"));
//!
//! let mut form = FormValidation::new(initial, schema);
//! assert!(!form.validate_all());
//! assert_eq!(form.error_message("description").as_deref(), Some("Mínimo de 10 caracteres"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Extra semantic check layered on top of the built-in constraints.
///
/// Returns the error message, or `None` when the value is acceptable.
pub type CustomCheck = fn(&JsonValue) -> Option<String>;

/// Why a field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidFormat,
    Custom(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Required => write!(f, "Este campo é obrigatório"),
            FieldError::TooShort { min } => write!(f, "Mínimo de {} caracteres", min),
            FieldError::TooLong { max } => write!(f, "Máximo de {} caracteres", max),
            FieldError::InvalidFormat => write!(f, "Formato inválido"),
            FieldError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Independent, composable constraints for a single field.
///
/// Length bounds count Unicode scalar values and only apply to non-empty strings.
#[derive(Clone, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub custom: Option<CustomCheck>,
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn custom(mut self, check: CustomCheck) -> Self {
        self.custom = Some(check);
        self
    }

    /// Runs the constraints in order; the first failing one wins.
    ///
    /// `required`, then `min_length`, `max_length` and `pattern` (non-empty strings
    /// only), then `custom` if nothing failed so far.
    pub fn check(&self, value: &JsonValue) -> Option<FieldError> {
        if self.required && is_empty_value(value) {
            return Some(FieldError::Required);
        }

        if let JsonValue::String(text) = value {
            if !text.is_empty() {
                let len = text.chars().count();
                if let Some(min) = self.min_length.filter(|min| *min > 0) {
                    if len < min {
                        return Some(FieldError::TooShort { min });
                    }
                }
                if let Some(max) = self.max_length.filter(|max| *max > 0) {
                    if len > max {
                        return Some(FieldError::TooLong { max });
                    }
                }
                if let Some(pattern) = &self.pattern {
                    if !pattern.is_match(text) {
                        return Some(FieldError::InvalidFormat);
                    }
                }
            }
        }

        self.custom
            .and_then(|check| check(value))
            .filter(|msg| !msg.is_empty())
            .map(FieldError::Custom)
    }
}

impl Debug for ValidationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Null, or a string that is empty after trimming.
pub fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Field name to rule. Fields without a rule are always valid.
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    rules: BTreeMap<String, ValidationRule>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: ValidationRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.rules.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn validate_field(&self, field: &str, value: &JsonValue) -> Option<FieldError> {
        self.rules.get(field)?.check(value)
    }
}

/// Read/write access to a draft's fields as JSON values.
///
/// Lets [`FormValidation`] work over typed drafts as well as plain JSON objects.
/// Reading an unknown field yields `Null`; writing one is allowed to be a no-op.
pub trait FormData: Clone {
    fn field(&self, name: &str) -> JsonValue;
    fn set_field(&mut self, name: &str, value: JsonValue);
}

impl FormData for Map<String, JsonValue> {
    fn field(&self, name: &str) -> JsonValue {
        self.get(name).cloned().unwrap_or(JsonValue::Null)
    }

    fn set_field(&mut self, name: &str, value: JsonValue) {
        self.insert(name.to_string(), value);
    }
}

/// Validation state of one form instance.
#[derive(Debug, Clone)]
pub struct FormValidation<T: FormData> {
    initial: T,
    data: T,
    schema: FieldSchema,
    errors: BTreeMap<String, FieldError>,
    touched: BTreeSet<String>,
}

impl<T: FormData> FormValidation<T> {
    pub fn new(initial: T, schema: FieldSchema) -> Self {
        Self {
            data: initial.clone(),
            initial,
            schema,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }

    /// Pure check of `value` against the rule for `field`.
    pub fn validate_field(&self, field: &str, value: &JsonValue) -> Option<FieldError> {
        self.schema.validate_field(field, value)
    }

    /// Validates every schema field, marks all of them touched and replaces the
    /// stored errors. Returns `true` when no field failed.
    pub fn validate_all(&mut self) -> bool {
        let mut errors = BTreeMap::new();
        for field in self.schema.fields() {
            if let Some(error) = self.schema.validate_field(field, &self.data.field(field)) {
                errors.insert(field.to_string(), error);
            }
        }

        self.touched = self.schema.fields().map(str::to_string).collect();
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Sets a value; re-validates it right away only if the field was touched.
    ///
    /// The check runs on the value as stored, after any conversion the form data applies.
    pub fn update_field(&mut self, field: &str, value: impl Into<JsonValue>) {
        self.data.set_field(field, value.into());
        if self.touched.contains(field) {
            let error = self.validate_field(field, &self.data.field(field));
            self.store_error(field, error);
        }
    }

    pub fn touch_field(&mut self, field: &str) {
        self.touched.insert(field.to_string());
        let error = self.validate_field(field, &self.data.field(field));
        self.store_error(field, error);
    }

    /// Back to the construction-time snapshot, with no errors and nothing touched.
    pub fn reset_form(&mut self) {
        self.data = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
    }

    /// `true` when no field currently holds an error.
    ///
    /// Only reflects fields that were touched or validated; use
    /// [`validate_all`](Self::validate_all) to gate a submission.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn errors(&self) -> &BTreeMap<String, FieldError> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn error_message(&self, field: &str) -> Option<String> {
        self.errors.get(field).map(ToString::to_string)
    }

    /// Field name to display message, for every field currently in error.
    pub fn error_messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.clone(), error.to_string()))
            .collect()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    fn store_error(&mut self, field: &str, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.errors.insert(field.to_string(), error);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }
}
