//! Visibility predicates attached to field descriptors.
//!
//! On the wire a condition keeps the designer's shape
//! `{field, value?, notValue?, inValues?, notInValues?}`; in memory it is a
//! tagged union so that exactly one test is ever present.

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The comparison a [`Condition`] applies to its sibling field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTest {
    Equals(Value),
    NotEquals(Value),
    OneOf(Vec<Value>),
    NoneOf(Vec<Value>),
}

/// A predicate over the current value of one sibling field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub field: String,
    pub test: ConditionTest,
}

impl Condition {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            test: ConditionTest::Equals(value.into()),
        }
    }

    pub fn not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            test: ConditionTest::NotEquals(value.into()),
        }
    }

    pub fn one_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.to_string(),
            test: ConditionTest::OneOf(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn none_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.to_string(),
            test: ConditionTest::NoneOf(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Evaluates the predicate. A missing sibling value never equals anything.
    pub fn is_satisfied(&self, values: &Map<String, Value>) -> bool {
        let current = values.get(&self.field);
        let contains = |candidates: &[Value]| {
            current.is_some_and(|c| candidates.iter().any(|v| strict_eq(c, v)))
        };

        match &self.test {
            ConditionTest::Equals(expected) => current.is_some_and(|c| strict_eq(c, expected)),
            ConditionTest::NotEquals(expected) => !current.is_some_and(|c| strict_eq(c, expected)),
            ConditionTest::OneOf(candidates) => contains(candidates),
            ConditionTest::NoneOf(candidates) => !contains(candidates),
        }
    }
}

/// Strict equality: no string/number/bool coercion, but `1` and `1.0` are the
/// same number.
pub(crate) fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not_in_values: Option<Vec<Value>>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = SchemaError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let mut tests = Vec::with_capacity(1);
        if let Some(v) = raw.value {
            tests.push(ConditionTest::Equals(v));
        }
        if let Some(v) = raw.not_value {
            tests.push(ConditionTest::NotEquals(v));
        }
        if let Some(v) = raw.in_values {
            tests.push(ConditionTest::OneOf(v));
        }
        if let Some(v) = raw.not_in_values {
            tests.push(ConditionTest::NoneOf(v));
        }

        match (tests.pop(), tests.is_empty()) {
            (Some(test), true) => Ok(Condition {
                field: raw.field,
                test,
            }),
            (None, _) => Err(SchemaError::InvalidCondition(format!(
                "condition on '{}' has no value, notValue, inValues or notInValues",
                raw.field
            ))),
            (Some(_), false) => Err(SchemaError::InvalidCondition(format!(
                "condition on '{}' combines more than one test",
                raw.field
            ))),
        }
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let mut raw = RawCondition {
            field: condition.field,
            value: None,
            not_value: None,
            in_values: None,
            not_in_values: None,
        };
        match condition.test {
            ConditionTest::Equals(v) => raw.value = Some(v),
            ConditionTest::NotEquals(v) => raw.not_value = Some(v),
            ConditionTest::OneOf(v) => raw.in_values = Some(v),
            ConditionTest::NoneOf(v) => raw.not_in_values = Some(v),
        }
        raw
    }
}
