//! Request schemas with field-level error reporting.
//!
//! Handlers pull raw input (path segments, query pairs, a JSON document) and
//! read typed fields out of it through [`QueryFields`] and [`BodyFields`].
//! Every failed read records an [`Issue`] against the field name instead of
//! bailing, so a single 422 reports all offending fields at once.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    InvalidType,
    TooSmall,
    TooBig,
}

impl Issue {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
        }
    }
}

#[derive(Debug, Default)]
pub struct Issues {
    targets: BTreeMap<String, String>,
}

impl Issues {
    pub fn add(&mut self, field: &str, issue: Issue) {
        self.targets
            .entry(field.to_string())
            .or_insert_with(|| issue.code().to_string());
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.targets.is_empty() {
            return Ok(());
        }
        Err(ApiError::Validation {
            message: "Validation failed".to_string(),
            targets: self.targets,
        })
    }
}

/// Parses an id path segment such as `todoId`.
pub fn path_id(field: &str, raw: &str) -> Result<i64, ApiError> {
    let mut issues = Issues::default();
    let id = raw.trim().parse::<i64>().unwrap_or_else(|_| {
        issues.add(field, Issue::InvalidType);
        0
    });
    issues.finish()?;
    Ok(id)
}

fn check_range(issues: &mut Issues, field: &str, value: i64, range: &RangeInclusive<i64>) {
    if value < *range.start() {
        issues.add(field, Issue::TooSmall);
    } else if value > *range.end() {
        issues.add(field, Issue::TooBig);
    }
}

/// Query-string fields; values arrive as strings and are coerced.
pub struct QueryFields<'a> {
    params: &'a HashMap<String, String>,
    issues: Issues,
}

impl<'a> QueryFields<'a> {
    pub fn new(params: &'a HashMap<String, String>) -> Self {
        Self {
            params,
            issues: Issues::default(),
        }
    }

    /// `"true"` is true, anything else (or absence) is false.
    pub fn flag(&self, name: &str) -> bool {
        self.params.get(name).is_some_and(|value| value == "true")
    }

    pub fn integer(&mut self, name: &str, default: i64, range: RangeInclusive<i64>) -> i64 {
        let Some(raw) = self.params.get(name) else {
            return default;
        };
        match raw.trim().parse::<i64>() {
            Ok(value) => {
                check_range(&mut self.issues, name, value, &range);
                value
            }
            Err(_) => {
                self.issues.add(name, Issue::InvalidType);
                default
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.issues.finish()
    }
}

/// A request body read as loose JSON. Malformed JSON is kept as `None` and
/// reported when fields are read, so existence checks can run first.
#[derive(Debug, Default)]
pub struct JsonBody(pub Option<Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::Rejected {
                status: err.status(),
                message: err.body_text(),
            })?;
        Ok(Self(serde_json::from_slice(&bytes).ok()))
    }
}

pub struct BodyFields<'a> {
    object: Option<&'a Map<String, Value>>,
    issues: Issues,
}

impl<'a> BodyFields<'a> {
    pub fn new(body: &'a JsonBody) -> Self {
        let mut issues = Issues::default();
        let object = body.0.as_ref().and_then(Value::as_object);
        if object.is_none() {
            issues.add("body", Issue::InvalidType);
        }
        Self { object, issues }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.object.and_then(|object| object.get(name))
    }

    fn string_value(&mut self, name: &str, value: &Value, min_len: usize) -> Option<String> {
        match value.as_str() {
            Some(text) if text.trim().chars().count() < min_len => {
                self.issues.add(name, Issue::TooSmall);
                None
            }
            Some(text) => Some(text.to_string()),
            None => {
                self.issues.add(name, Issue::InvalidType);
                None
            }
        }
    }

    fn integer_value(&mut self, name: &str, value: &Value) -> Option<i64> {
        // `2.0` is an integer too.
        let integer = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        });
        if integer.is_none() {
            self.issues.add(name, Issue::InvalidType);
        }
        integer
    }

    /// Present string with at least `min_len` non-blank characters. The text
    /// is kept as sent.
    pub fn required_string(&mut self, name: &str, min_len: usize) -> String {
        match self.get(name) {
            Some(value) => self.string_value(name, value, min_len).unwrap_or_default(),
            None => {
                if self.object.is_some() {
                    self.issues.add(name, Issue::InvalidType);
                }
                String::new()
            }
        }
    }

    pub fn optional_string(&mut self, name: &str, min_len: usize) -> Option<String> {
        let value = self.get(name)?;
        self.string_value(name, value, min_len)
    }

    /// Absent → `None`, `null` → `Some(None)`, string → `Some(Some(..))`.
    pub fn nullable_string(&mut self, name: &str) -> Option<Option<String>> {
        match self.get(name)? {
            Value::Null => Some(None),
            value => self.string_value(name, value, 0).map(Some),
        }
    }

    pub fn required_bool(&mut self, name: &str) -> bool {
        match self.get(name).and_then(Value::as_bool) {
            Some(value) => value,
            None => {
                if self.object.is_some() {
                    self.issues.add(name, Issue::InvalidType);
                }
                false
            }
        }
    }

    pub fn required_integer(&mut self, name: &str) -> i64 {
        match self.get(name) {
            Some(value) => self.integer_value(name, value).unwrap_or_default(),
            None => {
                if self.object.is_some() {
                    self.issues.add(name, Issue::InvalidType);
                }
                0
            }
        }
    }

    pub fn optional_integer(&mut self, name: &str) -> Option<i64> {
        let value = self.get(name)?;
        self.integer_value(name, value)
    }

    pub fn nullable_integer(&mut self, name: &str) -> Option<Option<i64>> {
        match self.get(name)? {
            Value::Null => Some(None),
            value => self.integer_value(name, value).map(Some),
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.issues.finish()
    }
}
