//! Input validation
//!
//! A [`Validator`] walks a decoded JSON payload field by field. Every violation is
//! recorded instead of returned, so one request reports all of its problems at once.
//! Nothing here touches the store.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::id::CandidateId;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex")
});

/// A single constraint violation on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is missing or null
    Required,

    /// JSON type doesn't match
    WrongType {
        expected: &'static str,
        received: &'static str,
    },

    /// String shorter than allowed after trimming
    TooShort { min: usize },

    /// Number below zero
    Negative,

    /// Number must be strictly positive
    NotPositive,

    /// Number has a fractional part where a count is expected
    NotInteger,

    /// Identifier doesn't parse as an internal handle
    InvalidId { reason: String },

    InvalidEmail,

    /// Element of a list failed
    InvalidItem {
        index: usize,
        error: Box<ValidationError>,
    },

    /// Value outside a closed set of names
    InvalidVariant { value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::WrongType { expected, received } => {
                write!(f, "Expected {}, received {}", expected, received)
            }
            Self::TooShort { min } => {
                write!(f, "String must contain at least {} character(s)", min)
            }
            Self::Negative => write!(f, "Number must be greater than or equal to 0"),
            Self::NotPositive => write!(f, "Number must be greater than 0"),
            Self::NotInteger => write!(f, "Expected integer, received float"),
            Self::InvalidId { reason } => write!(f, "invalid identifier: {}", reason),
            Self::InvalidEmail => write!(f, "Invalid email"),
            Self::InvalidItem { index, error } => write!(f, "item {}: {}", index, error),
            Self::InvalidVariant { value } => write!(f, "unknown value '{}'", value),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every violation found in one request.
///
/// Request-level problems (wrong payload shape, unknown keys) are kept apart from
/// per-field ones. Field order follows the order fields were checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    request: Vec<String>,
    fields: Vec<(String, Vec<ValidationError>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single field failure.
    pub fn field(name: impl Into<String>, error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push_field(name, error);
        errors
    }

    /// Single request-level failure.
    pub fn request(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_request(message);
        errors
    }

    pub fn push_field(&mut self, name: impl Into<String>, error: ValidationError) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, errors)) => errors.push(error),
            None => self.fields.push((name, vec![error])),
        }
    }

    pub fn push_request(&mut self, message: impl Into<String>) {
        self.request.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.fields.is_empty()
    }

    /// Errors recorded for one field.
    pub fn for_field(&self, name: &str) -> Option<&[ValidationError]> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, errors)| errors.as_slice())
    }

    /// Names of the failing fields, in check order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn request_errors(&self) -> &[String] {
        &self.request
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.request.clone();
        for (name, errors) in &self.fields {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Field {}: {}", name, joined));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collects violations while extracting typed values from a payload.
///
/// Extractors return `None` when the value is absent or invalid; the reason is kept
/// for [`Validator::finish`].
///
/// # Example
/// ```
/// use docrel_core::validation::Validator;
/// use serde_json::json;
///
/// let payload = json!({ "name": " a ", "pages": -1 });
/// let mut v = Validator::strict(&payload);
/// let name = v.string("name", 2);
/// let pages = v.non_negative("pages");
/// let err = v.finish(|| Some((name?, pages?))).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Field name: String must contain at least 2 character(s)\n\
///      Field pages: Number must be greater than or equal to 0"
/// );
/// ```
pub struct Validator<'a> {
    payload: Option<&'a Map<String, Value>>,
    strict: bool,
    coerce_numbers: bool,
    seen: Vec<&'static str>,
    errors: ValidationErrors,
}

impl<'a> Validator<'a> {
    /// Unknown keys are rejected. Used for every mutation.
    pub fn strict(payload: &'a Value) -> Self {
        Self::new(payload, true)
    }

    /// Unknown keys are ignored and a null payload counts as empty. Used for queries.
    pub fn lenient(payload: &'a Value) -> Self {
        Self::new(payload, false)
    }

    fn new(payload: &'a Value, strict: bool) -> Self {
        let mut errors = ValidationErrors::new();
        let payload = match payload {
            Value::Object(map) => Some(map),
            Value::Null if !strict => None,
            other => {
                errors.push_request(format!("Expected object, received {}", json_type(other)));
                None
            }
        };

        Self {
            payload,
            strict,
            coerce_numbers: false,
            seen: Vec::new(),
            errors,
        }
    }

    /// Accept numeric strings for number fields (query-string input).
    pub fn coerce_numbers(mut self) -> Self {
        self.coerce_numbers = true;
        self
    }

    fn lookup(&mut self, field: &'static str) -> Option<&'a Value> {
        self.seen.push(field);
        self.payload
            .and_then(|map| map.get(field))
            .filter(|value| !value.is_null())
    }

    fn reject(&mut self, field: &'static str, error: ValidationError) {
        self.errors.push_field(field, error);
    }

    fn require(&mut self, field: &'static str) -> Option<&'a Value> {
        let value = self.lookup(field);
        if value.is_none() {
            self.reject(field, ValidationError::Required);
        }
        value
    }

    fn check_string(
        &mut self,
        field: &'static str,
        value: &Value,
        min: usize,
        trim: bool,
    ) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.reject(field, ValidationError::WrongType {
                expected: "string",
                received: json_type(value),
            });
            return None;
        };

        let s = if trim { s.trim() } else { s };
        if s.chars().count() < min.max(1) {
            self.reject(field, ValidationError::TooShort { min: min.max(1) });
            return None;
        }
        Some(s.to_owned())
    }

    /// Required trimmed string of at least `min` characters.
    pub fn string(&mut self, field: &'static str, min: usize) -> Option<String> {
        let value = self.require(field)?;
        self.check_string(field, value, min, true)
    }

    pub fn optional_string(&mut self, field: &'static str, min: usize) -> Option<String> {
        let value = self.lookup(field)?;
        self.check_string(field, value, min, true)
    }

    /// Required string kept byte for byte (secrets).
    pub fn raw_string(&mut self, field: &'static str, min: usize) -> Option<String> {
        let value = self.require(field)?;
        self.check_string(field, value, min, false)
    }

    /// Required email, trimmed and lowercased.
    pub fn email(&mut self, field: &'static str) -> Option<String> {
        let value = self.require(field)?;
        let email = self.check_string(field, value, 1, true)?;
        if !EMAIL_RE.is_match(&email) {
            self.reject(field, ValidationError::InvalidEmail);
            return None;
        }
        Some(email.to_lowercase())
    }

    fn check_number(&mut self, field: &'static str, value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if self.coerce_numbers => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        let Some(number) = number.filter(|n| n.is_finite()) else {
            self.reject(field, ValidationError::WrongType {
                expected: "number",
                received: json_type(value),
            });
            return None;
        };

        if number < 0.0 {
            self.reject(field, ValidationError::Negative);
            return None;
        }
        Some(number)
    }

    /// Required non-negative number.
    pub fn non_negative(&mut self, field: &'static str) -> Option<f64> {
        let value = self.require(field)?;
        self.check_number(field, value)
    }

    pub fn optional_non_negative(&mut self, field: &'static str) -> Option<f64> {
        let value = self.lookup(field)?;
        self.check_number(field, value)
    }

    fn check_count(&mut self, field: &'static str, value: &Value, positive: bool) -> Option<u64> {
        let number = self.check_number(field, value)?;
        if number.fract() != 0.0 {
            self.reject(field, ValidationError::NotInteger);
            return None;
        }
        if positive && number == 0.0 {
            self.reject(field, ValidationError::NotPositive);
            return None;
        }
        Some(number as u64)
    }

    /// Optional integer; `positive` additionally rejects zero.
    pub fn optional_count(&mut self, field: &'static str, positive: bool) -> Option<u64> {
        let value = self.lookup(field)?;
        self.check_count(field, value, positive)
    }

    fn check_id(&mut self, field: &'static str, value: &Value) -> Option<CandidateId> {
        let Some(s) = value.as_str() else {
            self.reject(field, ValidationError::WrongType {
                expected: "string",
                received: json_type(value),
            });
            return None;
        };

        match CandidateId::parse(s) {
            Ok(id) => Some(id),
            Err(e) => {
                self.reject(field, e);
                None
            }
        }
    }

    /// Required identifier.
    pub fn id(&mut self, field: &'static str) -> Option<CandidateId> {
        let value = self.require(field)?;
        self.check_id(field, value)
    }

    pub fn optional_id(&mut self, field: &'static str) -> Option<CandidateId> {
        let value = self.lookup(field)?;
        self.check_id(field, value)
    }

    /// Optional array of identifiers. One bad element fails the whole field.
    pub fn optional_id_list(&mut self, field: &'static str) -> Option<Vec<CandidateId>> {
        let value = self.lookup(field)?;
        let Some(items) = value.as_array() else {
            self.reject(field, ValidationError::WrongType {
                expected: "array",
                received: json_type(value),
            });
            return None;
        };

        let mut ids = Vec::with_capacity(items.len());
        let mut failed = false;
        for (index, item) in items.iter().enumerate() {
            let parsed = match item.as_str() {
                Some(s) => CandidateId::parse(s),
                None => Err(ValidationError::WrongType {
                    expected: "string",
                    received: json_type(item),
                }),
            };
            match parsed {
                Ok(id) => ids.push(id),
                Err(error) => {
                    failed = true;
                    self.reject(field, ValidationError::InvalidItem {
                        index,
                        error: Box::new(error),
                    });
                }
            }
        }

        (!failed).then_some(ids)
    }

    /// Optional set of names, given either as an array of strings or a comma-separated
    /// string, each parsed with `FromStr`.
    pub fn optional_variants<T>(&mut self, field: &'static str) -> Option<Vec<T>>
    where
        T: FromStr<Err = ValidationError> + PartialEq,
    {
        let value = self.lookup(field)?;
        let names: Vec<&str> = match value {
            Value::String(s) => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
            Value::Array(items) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => names.push(s.trim()),
                        None => {
                            self.reject(field, ValidationError::WrongType {
                                expected: "string",
                                received: json_type(item),
                            });
                            return None;
                        }
                    }
                }
                names
            }
            other => {
                self.reject(field, ValidationError::WrongType {
                    expected: "string",
                    received: json_type(other),
                });
                return None;
            }
        };

        let mut variants: Vec<T> = Vec::with_capacity(names.len());
        let mut failed = false;
        for name in names {
            match name.parse::<T>() {
                Ok(variant) if !variants.contains(&variant) => variants.push(variant),
                Ok(_) => {}
                Err(error) => {
                    failed = true;
                    self.reject(field, error);
                }
            }
        }

        (!failed).then_some(variants)
    }

    /// Close the validator.
    ///
    /// Fails with every recorded violation (plus unknown keys in strict mode).
    /// Otherwise `build` assembles the typed value from the extracted parts.
    pub fn finish<T>(mut self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if self.strict {
            if let Some(map) = self.payload {
                let unknown: Vec<String> = map
                    .keys()
                    .filter(|key| !self.seen.iter().any(|seen| *seen == key.as_str()))
                    .map(|key| format!("'{}'", key))
                    .collect();
                if !unknown.is_empty() {
                    self.errors.push_request(format!(
                        "Unrecognized key(s) in object: {}",
                        unknown.join(", ")
                    ));
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        build().ok_or_else(|| ValidationErrors::request("incomplete request"))
    }
}
