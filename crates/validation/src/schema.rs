//! Declarative field schemas.
//!
//! A [`Schema`] is an ordered list of [`Field`]s. Declaration order matters:
//! it is the order in which violations are reported.

use serde_json::Value;

use crate::engine::{ValidateOptions, validate};
use crate::error::ValidationErrors;

/// Primitive type a field value must have after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    /// ISO 8601 date or date-time, normalized to RFC 3339 UTC.
    Date,
}

/// Lower bound for a date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateBound {
    /// The instant the payload is validated.
    Now,
    /// Another field of the same payload.
    Field(String),
}

/// A single constraint on a field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    MinLength(usize),
    MaxLength(usize),
    Alphanum,
    Email,
    OneOf(Vec<String>),
    Min(f64),
    Max(f64),
    Positive,
    DateMin(DateBound),
}

impl Rule {
    /// Name of the other field this rule depends on, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Rule::DateMin(DateBound::Field(name)) => Some(name),
            _ => None,
        }
    }
}

/// Definition of one expected field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    rules: Vec<Rule>,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            rules: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value inserted into the normalized output when the field is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min_length(self, n: usize) -> Self {
        self.rule(Rule::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.rule(Rule::MaxLength(n))
    }

    pub fn alphanum(self) -> Self {
        self.rule(Rule::Alphanum)
    }

    pub fn email(self) -> Self {
        self.rule(Rule::Email)
    }

    pub fn one_of(self, allowed: &[&str]) -> Self {
        self.rule(Rule::OneOf(allowed.iter().map(|s| s.to_string()).collect()))
    }

    pub fn min(self, n: f64) -> Self {
        self.rule(Rule::Min(n))
    }

    pub fn max(self, n: f64) -> Self {
        self.rule(Rule::Max(n))
    }

    pub fn positive(self) -> Self {
        self.rule(Rule::Positive)
    }

    /// Rejects dates earlier than the moment of validation.
    pub fn not_before_now(self) -> Self {
        self.rule(Rule::DateMin(DateBound::Now))
    }

    /// Rejects dates earlier than the value of `other`.
    ///
    /// Only checked when both fields survive validation.
    pub fn not_before(self, other: impl Into<String>) -> Self {
        self.rule(Rule::DateMin(DateBound::Field(other.into())))
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Ordered set of field definitions for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends the fields of `other`; a field already declared here wins.
    pub fn concat(mut self, other: Schema) -> Self {
        for field in other.fields {
            if self.get(field.name()).is_none() {
                self.fields.push(field);
            }
        }
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Validates with the default options (collect all, strip unknown).
    pub fn validate(&self, payload: &Value) -> Result<serde_json::Map<String, Value>, ValidationErrors> {
        validate(self, payload, ValidateOptions::default())
    }
}

/// Types whose inbound payload is described by a static schema.
pub trait HasSchema {
    fn schema() -> &'static Schema;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let schema = Schema::new()
            .field(Field::string("title").required())
            .field(Field::integer("page").default(1));

        let names: Vec<_> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["title", "page"]);
        assert!(schema.get("title").unwrap().is_required());
        assert_eq!(schema.get("page").unwrap().default_value(), Some(&Value::from(1)));
    }

    #[test]
    fn concat_does_not_duplicate_fields() {
        let base = Schema::new().field(Field::string("title"));
        let extra = Schema::new()
            .field(Field::string("title").required())
            .field(Field::integer("limit"));

        let merged = base.concat(extra);
        assert_eq!(merged.fields().len(), 2);
        assert!(!merged.get("title").unwrap().is_required());
    }

    #[test]
    fn only_field_bounds_have_references() {
        assert_eq!(Rule::DateMin(DateBound::Field("fromDate".into())).reference(), Some("fromDate"));
        assert_eq!(Rule::DateMin(DateBound::Now).reference(), None);
        assert_eq!(Rule::Positive.reference(), None);
    }
}
