//! The validation pass.
//!
//! One call walks every declared field, coerces the raw value to the declared
//! type, checks every rule and records each violation. Cross-field rules run in
//! a second pass over the normalized values, so they only see fields that were
//! present and valid.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{FieldError, ValidationErrors};
use crate::schema::{DateBound, Field, FieldType, Rule, Schema};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// Largest integer a JSON client can represent exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Controls how a payload is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop after the first violation instead of collecting all of them.
    pub abort_early: bool,

    /// Silently drop keys the schema does not declare. When false, each
    /// unknown key is reported as a violation.
    pub strip_unknown: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            abort_early: false,
            strip_unknown: true,
        }
    }
}

/// A field value after type coercion.
#[derive(Debug, Clone, PartialEq)]
enum Coerced {
    Str(String),
    Int(i64),
    Num(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl Coerced {
    fn into_json(self) -> Value {
        match self {
            Coerced::Str(s) => Value::String(s),
            Coerced::Int(i) => Value::from(i),
            Coerced::Num(n) => number_to_json(n),
            Coerced::Bool(b) => Value::Bool(b),
            Coerced::Date(d) => Value::String(format_date(&d)),
        }
    }
}

/// Validates `payload` against `schema`.
///
/// On success returns an object holding only declared fields, with defaults
/// filled in for absent optional fields. On failure returns every violation
/// in schema declaration order (unknown-key violations, if any, come last).
pub fn validate(
    schema: &Schema,
    payload: &Value,
    options: ValidateOptions,
) -> Result<Map<String, Value>, ValidationErrors> {
    let empty = Map::new();
    let input = match payload {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(ValidationErrors::single(FieldError::new(
                "",
                "\"value\" must be of type object",
            )));
        }
    };

    let now = Utc::now();
    let fields = schema.fields();
    let mut normalized = Map::new();
    let mut violations: Vec<Vec<FieldError>> = vec![Vec::new(); fields.len()];

    for (idx, field) in fields.iter().enumerate() {
        let name = field.name();
        match input.get(name) {
            None => {
                if field.is_required() {
                    violations[idx].push(FieldError::new(name, format!("\"{name}\" is required")));
                } else if let Some(default) = field.default_value() {
                    normalized.insert(name.to_string(), default.clone());
                }
            }
            Some(raw) => match coerce(field, raw) {
                Err(message) => violations[idx].push(FieldError::new(name, message)),
                Ok(value) => {
                    let failed = check_rules(field, &value, now);
                    if failed.is_empty() {
                        normalized.insert(name.to_string(), value.into_json());
                    } else {
                        violations[idx].extend(failed);
                    }
                }
            },
        }
    }

    for (idx, field) in fields.iter().enumerate() {
        for rule in field.rules() {
            let Some(other) = rule.reference() else {
                continue;
            };
            let (Some(own), Some(bound)) = (
                normalized.get(field.name()).and_then(json_date),
                normalized.get(other).and_then(json_date),
            ) else {
                continue;
            };
            if own < bound {
                let name = field.name();
                violations[idx].push(FieldError::new(
                    name,
                    format!("\"{name}\" must be greater than or equal to \"ref:{other}\""),
                ));
            }
        }
    }

    let mut errors: Vec<FieldError> = violations.into_iter().flatten().collect();

    if !options.strip_unknown {
        for key in input.keys().filter(|k| !schema.contains(k)) {
            errors.push(FieldError::new(key.as_str(), format!("\"{key}\" is not allowed")));
        }
    }

    if errors.is_empty() {
        return Ok(normalized);
    }

    if options.abort_early {
        errors.truncate(1);
    }
    tracing::debug!(violations = errors.len(), "payload failed validation");
    Err(ValidationErrors::new(errors))
}

fn coerce(field: &Field, raw: &Value) -> Result<Coerced, String> {
    let name = field.name();
    match field.field_type() {
        FieldType::String => match raw {
            Value::String(s) if s.is_empty() => Err(format!("\"{name}\" is not allowed to be empty")),
            Value::String(s) => Ok(Coerced::Str(s.clone())),
            _ => Err(format!("\"{name}\" must be a string")),
        },
        FieldType::Integer => as_integer(name, raw).map(Coerced::Int),
        FieldType::Number => as_number(raw)
            .map(Coerced::Num)
            .ok_or_else(|| format!("\"{name}\" must be a number")),
        FieldType::Boolean => match raw {
            Value::Bool(b) => Ok(Coerced::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Coerced::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Coerced::Bool(false)),
            _ => Err(format!("\"{name}\" must be a boolean")),
        },
        FieldType::Date => raw
            .as_str()
            .and_then(parse_iso_date)
            .map(Coerced::Date)
            .ok_or_else(|| format!("\"{name}\" must be in ISO 8601 date format")),
    }
}

fn check_rules(field: &Field, value: &Coerced, now: DateTime<Utc>) -> Vec<FieldError> {
    let name = field.name();
    let mut failed = Vec::new();
    let mut fail = |message: String| failed.push(FieldError::new(name, message));

    for rule in field.rules() {
        match (rule, value) {
            (Rule::MinLength(n), Coerced::Str(s)) if s.chars().count() < *n => {
                fail(format!("\"{name}\" length must be at least {n} characters long"));
            }
            (Rule::MaxLength(n), Coerced::Str(s)) if s.chars().count() > *n => {
                fail(format!(
                    "\"{name}\" length must be less than or equal to {n} characters long"
                ));
            }
            (Rule::Alphanum, Coerced::Str(s)) if !s.chars().all(|c| c.is_ascii_alphanumeric()) => {
                fail(format!("\"{name}\" must only contain alpha-numeric characters"));
            }
            (Rule::Email, Coerced::Str(s)) if !EMAIL_RE.is_match(s) => {
                fail(format!("\"{name}\" must be a valid email"));
            }
            (Rule::OneOf(allowed), Coerced::Str(s)) if !allowed.iter().any(|a| a == s) => {
                fail(format!("\"{name}\" must be one of [{}]", allowed.join(", ")));
            }
            (Rule::Min(min), v) if numeric(v).is_some_and(|n| n < *min) => {
                fail(format!("\"{name}\" must be greater than or equal to {min}"));
            }
            (Rule::Max(max), v) if numeric(v).is_some_and(|n| n > *max) => {
                fail(format!("\"{name}\" must be less than or equal to {max}"));
            }
            (Rule::Positive, v) if numeric(v).is_some_and(|n| n <= 0.0) => {
                fail(format!("\"{name}\" must be a positive number"));
            }
            (Rule::DateMin(DateBound::Now), Coerced::Date(d)) if *d < now => {
                fail(format!("\"{name}\" must be greater than or equal to \"now\""));
            }
            _ => {}
        }
    }

    failed
}

fn numeric(value: &Coerced) -> Option<f64> {
    match value {
        Coerced::Int(i) => Some(*i as f64),
        Coerced::Num(n) => Some(*n),
        _ => None,
    }
}

fn as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Reads an integer without passing through `f64` when the input is already
/// integral, so values near the safe limit are not rounded.
fn as_integer(name: &str, raw: &Value) -> Result<i64, String> {
    let exact = match raw {
        Value::Number(n) => n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    };

    let value = match exact {
        Some(v) => v,
        None => {
            let n = as_number(raw).ok_or_else(|| format!("\"{name}\" must be a number"))?;
            if n.fract() != 0.0 {
                return Err(format!("\"{name}\" must be an integer"));
            }
            if n.abs() > MAX_SAFE_INTEGER as f64 {
                return Err(format!("\"{name}\" must be a safe number"));
            }
            n as i128
        }
    };

    if value.abs() > i128::from(MAX_SAFE_INTEGER) {
        return Err(format!("\"{name}\" must be a safe number"));
    }
    i64::try_from(value).map_err(|_| format!("\"{name}\" must be a safe number"))
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn json_date(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_iso_date)
}

/// Parses an ISO 8601 date (`2024-05-01`) or date-time. Date-times without an
/// offset are taken as UTC.
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a date the way normalized payloads carry it: `2024-05-01T00:00:00.000Z`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
