//! Pure functions over a resolved schema and the current field values.
//!
//! Nothing here caches or mutates; the same inputs always give the same output.

use crate::condition::strict_eq;
use crate::field::{FieldDescriptor, FieldKind, FieldOption, ValueShape};
use crate::schema::ResolvedSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Whether `field` is shown for `values`. Fields without a condition always are.
pub fn is_visible(field: &FieldDescriptor, values: &Map<String, Value>) -> bool {
    field
        .condition
        .as_ref()
        .map_or(true, |c| c.is_satisfied(values))
}

/// Fields whose condition holds for `values`, in schema order.
///
/// Advanced fields are included; use [`visible_fields_with`] to honour the
/// "show advanced" toggle.
pub fn visible_fields<'a>(
    schema: &'a ResolvedSchema,
    values: &Map<String, Value>,
) -> Vec<&'a FieldDescriptor> {
    visible_fields_with(schema, values, true)
}

pub fn visible_fields_with<'a>(
    schema: &'a ResolvedSchema,
    values: &Map<String, Value>,
    show_advanced: bool,
) -> Vec<&'a FieldDescriptor> {
    schema
        .fields
        .iter()
        .filter(|f| show_advanced || !f.advanced)
        .filter(|f| is_visible(f, values))
        .collect()
}

/// Key used to look up `optionsMap`/`defaultMap` entries.
fn map_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", f as i64))
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Options currently offered by `field`.
///
/// With `dependsOn` and an `optionsMap`, the list is the entry for the
/// driving field's value; an unmapped or missing value yields no options.
pub fn available_options<'a>(
    field: &'a FieldDescriptor,
    values: &Map<String, Value>,
) -> &'a [FieldOption] {
    match &field.depends_on {
        Some(driver) if !field.options_map.is_empty() => map_key(values.get(driver))
            .and_then(|k| field.options_map.get(&k))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &field.options,
    }
}

/// Default for `field` given the other values, falling back to the static default.
pub fn default_for(field: &FieldDescriptor, values: &Map<String, Value>) -> Option<Value> {
    if let Some(driver) = &field.depends_on {
        if let Some(mapped) = map_key(values.get(driver)).and_then(|k| field.default_map.get(&k)) {
            return Some(mapped.clone());
        }
    }
    field.default.clone()
}

/// `values` with every missing key filled in from its default.
///
/// Fields are filled in schema order, so a mapped default can follow a
/// driving field that was itself just defaulted.
pub fn effective_values(schema: &ResolvedSchema, values: &Map<String, Value>) -> Map<String, Value> {
    let mut result = values.clone();
    for field in &schema.fields {
        if result.contains_key(&field.key) {
            continue;
        }
        if let Some(default) = default_for(field, &result) {
            result.insert(field.key.clone(), default);
        }
    }
    result
}

/// A problem with one field value, found when an action is opened for editing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub key: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum IssueKind {
    Missing,
    WrongType { expected: ValueShape },
    OutOfRange { min: Option<f64>, max: Option<f64>, actual: f64 },
    NotAnOption { value: Value },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "'{}' is required", self.key),
            IssueKind::WrongType { expected } => {
                write!(f, "'{}' should be a {:?} value", self.key, expected)
            }
            IssueKind::OutOfRange { min, max, actual } => write!(
                f,
                "'{}' = {} is outside [{}, {}]",
                self.key,
                actual,
                min.map_or("-inf".to_string(), |m| m.to_string()),
                max.map_or("inf".to_string(), |m| m.to_string())
            ),
            IssueKind::NotAnOption { value } => {
                write!(f, "'{}' does not offer {}", self.key, value)
            }
        }
    }
}

/// `${name}` references are resolved at run time, so they satisfy any shape.
fn is_variable_reference(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.find("${").is_some_and(|i| s[i..].contains('}')))
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn shape_matches(shape: ValueShape, value: &Value) -> bool {
    match shape {
        ValueShape::Bool => value.is_boolean(),
        ValueShape::Number => as_number(value).is_some(),
        ValueShape::Array => value.is_array(),
        ValueShape::KeyValue => {
            value.is_object()
                || value
                    .as_array()
                    .is_some_and(|pairs| pairs.iter().all(|p| p.get("key").is_some()))
        }
        ValueShape::Scalar => !value.is_array() && !value.is_object(),
    }
}

/// Checks the visible fields of `schema` against `values`.
///
/// Hidden fields are never reported, whatever they hold.
pub fn validate(schema: &ResolvedSchema, values: &Map<String, Value>) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    for field in visible_fields(schema, values) {
        let value = values.get(&field.key);
        let issue = |kind| FieldIssue {
            key: field.key.clone(),
            kind,
        };

        let Some(value) = value.filter(|_| !is_empty(value)) else {
            if field.required {
                issues.push(issue(IssueKind::Missing));
            }
            continue;
        };

        if is_variable_reference(value) {
            continue;
        }

        let shape = field.kind.value_shape();
        if !shape_matches(shape, value) {
            issues.push(issue(IssueKind::WrongType { expected: shape }));
            continue;
        }

        if shape == ValueShape::Number {
            if let Some(actual) = as_number(value) {
                let below = field.min.is_some_and(|min| actual < min);
                let above = field.max.is_some_and(|max| actual > max);
                if below || above {
                    issues.push(issue(IssueKind::OutOfRange {
                        min: field.min,
                        max: field.max,
                        actual,
                    }));
                }
            }
        }

        if field.kind.is_choice() {
            let offered = available_options(field, values);
            if offered.is_empty() {
                continue;
            }
            let is_offered = |v: &Value| offered.iter().any(|o| strict_eq(&o.value, v));
            let rejected = match (field.kind, value) {
                (FieldKind::MultiSelect, Value::Array(members)) => members
                    .iter()
                    .find(|m| !is_offered(m) && !is_variable_reference(m))
                    .cloned(),
                _ if !is_offered(value) => Some(value.clone()),
                _ => None,
            };
            if let Some(value) = rejected {
                issues.push(issue(IssueKind::NotAnOption { value }));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::field::options;
    use serde_json::json;

    fn schema() -> ResolvedSchema {
        let mut schema = ResolvedSchema::fallback("export");
        schema.is_fallback = false;
        schema.fields = vec![
            FieldDescriptor::select(
                "format",
                "Format",
                options(&[("xlsx", "Excel"), ("csv", "CSV")]),
            )
            .default_value("xlsx")
            .required(),
            FieldDescriptor::select("sheet", "Sheet", Vec::new())
                .options_by(
                    "format",
                    vec![("xlsx", options(&[("Sheet1", "Sheet1"), ("Data", "Data")]))],
                )
                .defaults_by("format", vec![("xlsx", json!("Sheet1"))]),
            FieldDescriptor::slider("quality", "Quality", 0.0, 100.0).default_value(80),
            FieldDescriptor::toggle("saveAs", "Save as"),
            FieldDescriptor::text("target", "Target")
                .required()
                .when(Condition::equals("saveAs", true)),
            FieldDescriptor::number("retries", "Retries").advanced(),
        ];
        schema
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_options_follow_driver() {
        let schema = schema();
        let sheet = schema.field("sheet").unwrap();
        assert_eq!(
            available_options(sheet, &values(json!({"format": "xlsx"}))).len(),
            2
        );
        assert!(available_options(sheet, &values(json!({"format": "csv"}))).is_empty());
        assert!(available_options(sheet, &values(json!({}))).is_empty());
    }

    #[test]
    fn test_integral_float_driver_matches_integer_key() {
        let mut schema = schema();
        schema.fields.push(
            FieldDescriptor::select("mode", "Mode", Vec::new())
                .options_by("quality", vec![("1", options(&[("fast", "Fast")]))])
                .defaults_by("quality", vec![("1", json!("fast"))]),
        );
        let mode = schema.field("mode").unwrap();
        for driver in [json!(1), json!(1.0)] {
            let v = values(json!({ "quality": driver }));
            assert_eq!(available_options(mode, &v).len(), 1, "{driver}");
            assert_eq!(default_for(mode, &v), Some(json!("fast")));
        }
        assert!(available_options(mode, &values(json!({"quality": 1.5}))).is_empty());
    }

    #[test]
    fn test_effective_values_chain_defaults() {
        let filled = effective_values(&schema(), &values(json!({})));
        assert_eq!(filled["format"], "xlsx");
        assert_eq!(filled["sheet"], "Sheet1");
        assert_eq!(filled["quality"], 80);
        assert!(!filled.contains_key("target"));
    }

    #[test]
    fn test_advanced_toggle() {
        let schema = schema();
        let v = values(json!({}));
        assert!(visible_fields(&schema, &v).iter().any(|f| f.key == "retries"));
        assert!(!visible_fields_with(&schema, &v, false)
            .iter()
            .any(|f| f.key == "retries"));
    }

    #[test]
    fn test_validate_reports_visible_problems_only() {
        let schema = schema();
        let issues = validate(
            &schema,
            &values(json!({"format": "pdf", "quality": 120, "saveAs": false})),
        );
        let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["format", "quality"]);

        let issues = validate(&schema, &values(json!({"format": "xlsx", "saveAs": true})));
        assert_eq!(
            issues,
            vec![FieldIssue {
                key: "target".into(),
                kind: IssueKind::Missing
            }]
        );
    }

    #[test]
    fn test_validate_type_mismatch_and_variables() {
        let schema = schema();
        let issues = validate(
            &schema,
            &values(json!({"format": "csv", "saveAs": "yes"})),
        );
        assert_eq!(
            issues[0].kind,
            IssueKind::WrongType {
                expected: ValueShape::Bool
            }
        );
        assert!(validate(
            &schema,
            &values(json!({"format": "${fmt}", "saveAs": "${flag}"}))
        )
        .is_empty());
    }
}
