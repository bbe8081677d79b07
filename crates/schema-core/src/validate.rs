//! Document validation: executing a `SchemaNode` against a BSON value.
//!
//! Parsing walks the schema and the value together, collecting every issue it finds
//! rather than stopping at the first one. On success it returns the parsed value:
//! unknown keys handled per the object's policy and string transforms applied.

use crate::formats::format_regex;
use crate::refine::as_f64;
use crate::types::{
    ArraySchema, LiteralValue, NumberSchema, ObjectSchema, SchemaNode, StringFormat,
    StringSchema, StringTransform, UnknownKeys,
};
use base64::Engine;
use bson::{Bson, Document};
use regex::Regex;
use std::fmt;

/// Tolerance used by `multiple_of` checks on non-integral steps.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Location of the offending value, e.g. `$.tags[1]`
    pub path: String,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A value was rejected by a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    /// All issues found, in traversal order
    pub issues: Vec<Issue>,
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaNode {
    /// Validate `value`, returning the parsed value or every issue found.
    pub fn parse(&self, value: &Bson) -> Result<Bson, ValidationError> {
        let mut issues = Vec::new();
        match check(self, value, "$", &mut issues) {
            Some(parsed) if issues.is_empty() => Ok(parsed),
            _ => Err(ValidationError { issues }),
        }
    }

    /// Whether `value` validates.
    pub fn accepts(&self, value: &Bson) -> bool {
        self.parse(value).is_ok()
    }
}

fn issue(issues: &mut Vec<Issue>, path: &str, message: impl Into<String>) {
    issues.push(Issue {
        path: path.to_string(),
        message: message.into(),
    });
}

fn type_mismatch(issues: &mut Vec<Issue>, path: &str, expected: &str, found: &Bson) {
    issue(
        issues,
        path,
        format!("expected {expected}, found {:?}", found.element_type()),
    );
}

fn check(node: &SchemaNode, value: &Bson, path: &str, issues: &mut Vec<Issue>) -> Option<Bson> {
    match node {
        SchemaNode::Optional(w) => match value {
            Bson::Undefined => Some(Bson::Undefined),
            _ => check(&w.inner, value, path, issues),
        },
        SchemaNode::Nullable(w) => match value {
            Bson::Null => Some(Bson::Null),
            _ => check(&w.inner, value, path, issues),
        },
        SchemaNode::Object(obj) => check_object(obj, value, path, issues),
        SchemaNode::Array(arr) => check_array(arr, value, path, issues),
        SchemaNode::Tuple(tuple) => {
            let Bson::Array(items) = value else {
                type_mismatch(issues, path, "array", value);
                return None;
            };
            if items.len() != tuple.items.len() {
                issue(
                    issues,
                    path,
                    format!(
                        "expected {} elements, found {}",
                        tuple.items.len(),
                        items.len()
                    ),
                );
                return None;
            }
            let before = issues.len();
            let parsed: Vec<Bson> = tuple
                .items
                .iter()
                .zip(items)
                .enumerate()
                .filter_map(|(i, (node, item))| check(node, item, &format!("{path}[{i}]"), issues))
                .collect();
            (issues.len() == before).then_some(Bson::Array(parsed))
        }
        SchemaNode::String(s) => check_string(s, value, path, issues),
        SchemaNode::Number(n) => check_number(n, value, path, issues),
        SchemaNode::Boolean => match value {
            Bson::Boolean(_) => Some(value.clone()),
            _ => {
                type_mismatch(issues, path, "boolean", value);
                None
            }
        },
        SchemaNode::Date => match value {
            Bson::DateTime(_) => Some(value.clone()),
            _ => {
                type_mismatch(issues, path, "date", value);
                None
            }
        },
        SchemaNode::Enum(e) => match value {
            Bson::String(s) if e.values.iter().any(|v| v == s) => Some(value.clone()),
            _ => {
                issue(
                    issues,
                    path,
                    format!("expected one of [{}]", e.values.join(", ")),
                );
                None
            }
        },
        SchemaNode::Literal(lit) => {
            let matched = match (&lit.value, value) {
                (LiteralValue::String(expected), Bson::String(s)) => expected == s,
                (LiteralValue::Bool(expected), Bson::Boolean(b)) => expected == b,
                (LiteralValue::Number(expected), other) => as_f64(other) == Some(*expected),
                _ => false,
            };
            if matched {
                Some(value.clone())
            } else {
                issue(issues, path, format!("expected literal {:?}", lit.value));
                None
            }
        }
        SchemaNode::Union(union) => {
            for option in &union.options {
                let mut scratch = Vec::new();
                if let Some(parsed) = check(option, value, path, &mut scratch) {
                    if scratch.is_empty() {
                        return Some(parsed);
                    }
                }
            }
            issue(issues, path, "no union option matched");
            None
        }
        SchemaNode::Record(record) => {
            let Bson::Document(doc) = value else {
                type_mismatch(issues, path, "document", value);
                return None;
            };
            let before = issues.len();
            let mut out = Document::new();
            for (key, v) in doc {
                if let Some(parsed) = check(&record.values, v, &format!("{path}.{key}"), issues) {
                    out.insert(key.clone(), parsed);
                }
            }
            (issues.len() == before).then_some(Bson::Document(out))
        }
        SchemaNode::Any => Some(value.clone()),
        SchemaNode::Never => {
            issue(issues, path, "no value is accepted here");
            None
        }
        SchemaNode::Function => match value {
            Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => Some(value.clone()),
            _ => {
                type_mismatch(issues, path, "javascript code", value);
                None
            }
        },
    }
}

fn check_object(
    obj: &ObjectSchema,
    value: &Bson,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Bson> {
    let Bson::Document(doc) = value else {
        type_mismatch(issues, path, "document", value);
        return None;
    };
    let before = issues.len();
    let mut out = Document::new();

    for (name, field) in &obj.fields {
        let field_path = format!("{path}.{name}");
        match doc.get(name) {
            Some(v) => {
                if let Some(parsed) = check(field, v, &field_path, issues) {
                    out.insert(name.clone(), parsed);
                }
            }
            None if field.is_optional() => {}
            None => issue(issues, &field_path, "required field is missing"),
        }
    }

    for (key, v) in doc {
        if obj.fields.contains_key(key) {
            continue;
        }
        let key_path = format!("{path}.{key}");
        match (&obj.catchall, obj.unknown_keys) {
            (Some(catchall), _) => {
                if let Some(parsed) = check(catchall, v, &key_path, issues) {
                    out.insert(key.clone(), parsed);
                }
            }
            (None, UnknownKeys::Strict) => issue(issues, &key_path, "unrecognized key"),
            (None, UnknownKeys::Passthrough) => {
                out.insert(key.clone(), v.clone());
            }
            (None, UnknownKeys::Strip) => {}
        }
    }

    if issues.len() != before {
        return None;
    }
    let parsed = Bson::Document(out);
    run_refinements(&obj.refinements, &parsed, value, path, issues)
}

fn check_array(
    arr: &ArraySchema,
    value: &Bson,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Bson> {
    let Bson::Array(items) = value else {
        type_mismatch(issues, path, "array", value);
        return None;
    };
    let before = issues.len();
    let len = items.len() as u64;
    if let Some(min) = arr.min_length.filter(|min| len < *min) {
        issue(issues, path, format!("expected at least {min} elements, found {len}"));
    }
    if let Some(max) = arr.max_length.filter(|max| len > *max) {
        issue(issues, path, format!("expected at most {max} elements, found {len}"));
    }
    let parsed: Vec<Bson> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| check(&arr.element, item, &format!("{path}[{i}]"), issues))
        .collect();
    if issues.len() != before {
        return None;
    }
    run_refinements(&arr.refinements, &Bson::Array(parsed), value, path, issues)
}

/// Refinements see the original value, so object refinements count every key
/// the caller supplied rather than only those that survived stripping.
fn run_refinements(
    refinements: &[crate::refine::Refinement],
    parsed: &Bson,
    original: &Bson,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Bson> {
    let before = issues.len();
    for refinement in refinements {
        if let Err(message) = refinement.check(original) {
            issue(issues, path, message);
        }
    }
    (issues.len() == before).then(|| parsed.clone())
}

fn check_string(
    s: &StringSchema,
    value: &Bson,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Bson> {
    let Bson::String(text) = value else {
        type_mismatch(issues, path, "string", value);
        return None;
    };
    let before = issues.len();
    let len = text.chars().count() as u64;
    if let Some(min) = s.min_length.filter(|min| len < *min) {
        issue(issues, path, format!("expected at least {min} characters, found {len}"));
    }
    if let Some(max) = s.max_length.filter(|max| len > *max) {
        issue(issues, path, format!("expected at most {max} characters, found {len}"));
    }
    if let Some(pattern) = &s.pattern {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(text) => {}
            Ok(_) => issue(issues, path, format!("does not match pattern {pattern}")),
            Err(e) => issue(issues, path, format!("invalid pattern {pattern}: {e}")),
        }
    }
    if let Some(format) = s.format {
        let name = match format {
            StringFormat::Email => "email",
            StringFormat::Uuid => "uuid",
        };
        if !format_regex(format).is_some_and(|re| re.is_match(text)) {
            issue(issues, path, format!("invalid {name}"));
        }
    }
    if issues.len() != before {
        return None;
    }

    match s.transform {
        None => Some(value.clone()),
        Some(StringTransform::Base64Decode) => {
            match base64::engine::general_purpose::STANDARD.decode(text) {
                Ok(bytes) => Some(Bson::Binary(bson::Binary {
                    subtype: bson::spec::BinarySubtype::Generic,
                    bytes,
                })),
                Err(e) => {
                    issue(issues, path, format!("invalid base64: {e}"));
                    None
                }
            }
        }
    }
}

fn check_number(
    n: &NumberSchema,
    value: &Bson,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Option<Bson> {
    let Some(number) = as_f64(value) else {
        type_mismatch(issues, path, "number", value);
        return None;
    };
    let before = issues.len();
    if n.int && !(number.is_finite() && number.fract() == 0.0) {
        issue(issues, path, format!("expected integer, found {number}"));
    }
    if let Some(min) = n.minimum {
        if (n.exclusive_minimum && number <= min) || number < min {
            let op = if n.exclusive_minimum { ">" } else { ">=" };
            issue(issues, path, format!("expected {op} {min}, found {number}"));
        }
    }
    if let Some(max) = n.maximum {
        if (n.exclusive_maximum && number >= max) || number > max {
            let op = if n.exclusive_maximum { "<" } else { "<=" };
            issue(issues, path, format!("expected {op} {max}, found {number}"));
        }
    }
    if let Some(step) = n.multiple_of {
        let quotient = number / step;
        if step == 0.0 || (quotient - quotient.round()).abs() > MULTIPLE_OF_EPSILON {
            issue(issues, path, format!("expected a multiple of {step}, found {number}"));
        }
    }
    (issues.len() == before).then(|| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::Refinement;
    use bson::{bson, doc};

    #[test]
    fn test_object_required_and_optional_fields() {
        let schema = SchemaNode::object([
            ("a", SchemaNode::string()),
            ("b", SchemaNode::string().optional()),
        ]);
        assert!(schema.accepts(&bson!({ "a": "x" })));
        assert!(schema.accepts(&bson!({ "a": "x", "b": "y" })));

        let err = schema.parse(&bson!({ "b": "y" })).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "$.a");
    }

    #[test]
    fn test_object_unknown_keys() {
        let fields = [("a", SchemaNode::int())];
        let input = bson!({ "a": 1, "extra": true });

        let stripped = SchemaNode::object(fields.clone()).parse(&input).unwrap();
        assert_eq!(stripped, bson!({ "a": 1 }));

        let strict = SchemaNode::from(ObjectSchema::new(fields.clone()).strict());
        let err = strict.parse(&input).unwrap_err();
        assert_eq!(err.issues[0].path, "$.extra");

        let passthrough = SchemaNode::from(ObjectSchema::new(fields.clone()).passthrough());
        assert_eq!(passthrough.parse(&input).unwrap(), input);

        let catchall = SchemaNode::from(ObjectSchema::new(fields).with_catchall(SchemaNode::string()));
        assert!(!catchall.accepts(&input));
        assert!(catchall.accepts(&bson!({ "a": 1, "extra": "ok" })));
    }

    #[test]
    fn test_collects_every_issue() {
        let schema = SchemaNode::object([
            ("a", SchemaNode::string()),
            ("b", SchemaNode::int()),
        ]);
        let err = schema.parse(&bson!({ "a": 1, "b": 1.5 })).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.to_string().contains("$.a"));
        assert!(err.to_string().contains("$.b"));
    }

    #[test]
    fn test_array_bounds_and_unique_items() {
        let schema = SchemaNode::from(
            ArraySchema::new(SchemaNode::string())
                .with_min_length(1)
                .with_max_length(3)
                .with_refinement(Refinement::UniqueItems),
        );
        assert!(schema.accepts(&bson!(["x", "y"])));
        assert!(!schema.accepts(&bson!(["x", "x"])));
        assert!(!schema.accepts(&bson!([])));
        assert!(!schema.accepts(&bson!(["a", "b", "c", "d"])));
        assert!(!schema.accepts(&bson!(["a", 1])));
    }

    #[test]
    fn test_property_count_refinement() {
        let schema = SchemaNode::from(
            ObjectSchema::new([("a", SchemaNode::string().optional())])
                .passthrough()
                .with_refinement(Refinement::PropertyCount {
                    min: Some(1),
                    max: Some(2),
                }),
        );
        assert!(!schema.accepts(&bson!({})));
        assert!(schema.accepts(&bson!({ "a": "v" })));
        assert!(!schema.accepts(&bson!({ "a": "v", "b": 1, "c": 2 })));
    }

    #[test]
    fn test_string_constraints() {
        let schema = SchemaNode::from(
            StringSchema::new()
                .with_min_length(2)
                .with_max_length(4)
                .with_pattern("^[a-z]+$"),
        );
        assert!(schema.accepts(&bson!("abc")));
        assert!(!schema.accepts(&bson!("a")));
        assert!(!schema.accepts(&bson!("abcde")));
        assert!(!schema.accepts(&bson!("AB")));
    }

    #[test]
    fn test_string_formats() {
        let email = SchemaNode::from(StringSchema::new().with_format(StringFormat::Email));
        assert!(email.accepts(&bson!("alice@example.com")));
        assert!(!email.accepts(&bson!("alice")));

        let uuid = SchemaNode::from(StringSchema::new().with_format(StringFormat::Uuid));
        assert!(uuid.accepts(&bson!("550e8400-e29b-41d4-a716-446655440000")));
        assert!(!uuid.accepts(&bson!("550e8400")));
    }

    #[test]
    fn test_base64_transform() {
        let schema =
            SchemaNode::from(StringSchema::new().with_transform(StringTransform::Base64Decode));
        let parsed = schema.parse(&bson!("AQID")).unwrap();
        if let Bson::Binary(bin) = parsed {
            assert_eq!(bin.bytes, vec![1, 2, 3]);
        } else {
            panic!("Expected Binary");
        }
        assert!(!schema.accepts(&bson!("not base64!")));
    }

    #[test]
    fn test_number_constraints() {
        let schema = SchemaNode::from(
            NumberSchema::new()
                .integer()
                .with_minimum(0.0)
                .with_exclusive_maximum(10.0),
        );
        assert!(schema.accepts(&bson!(0)));
        assert!(schema.accepts(&bson!(9_i64)));
        assert!(schema.accepts(&bson!(3.0)));
        assert!(!schema.accepts(&bson!(3.5)));
        assert!(!schema.accepts(&bson!(10)));
        assert!(!schema.accepts(&bson!(-1)));
        assert!(!schema.accepts(&bson!("3")));

        let step = SchemaNode::from(NumberSchema::new().with_multiple_of(0.1));
        assert!(step.accepts(&bson!(0.3)));
        assert!(!step.accepts(&bson!(0.35)));
    }

    #[test]
    fn test_number_accepts_decimal128() {
        let decimal = |s: &str| Bson::Decimal128(s.parse::<bson::Decimal128>().unwrap());

        assert!(SchemaNode::number().accepts(&decimal("1.5")));

        let schema = SchemaNode::from(
            NumberSchema::new()
                .with_minimum(0.0)
                .with_maximum(100.0)
                .with_multiple_of(0.5),
        );
        assert_eq!(schema.parse(&decimal("2.5")).unwrap(), decimal("2.5"));
        assert!(!schema.accepts(&decimal("100.5")));
        assert!(!schema.accepts(&decimal("2.25")));

        assert!(SchemaNode::int().accepts(&decimal("42")));
        assert!(!SchemaNode::int().accepts(&decimal("4.2")));
        assert!(SchemaNode::literal(7.0).accepts(&decimal("7")));
    }

    #[test]
    fn test_union_nullable_and_literal() {
        let schema = SchemaNode::union(vec![SchemaNode::int(), SchemaNode::literal("auto")]);
        assert!(schema.accepts(&bson!(5)));
        assert!(schema.accepts(&bson!("auto")));
        assert!(!schema.accepts(&bson!("manual")));

        let nullable = SchemaNode::string().nullable();
        assert!(nullable.accepts(&Bson::Null));
        assert!(!SchemaNode::string().accepts(&Bson::Null));
    }

    #[test]
    fn test_date_record_enum() {
        let date = SchemaNode::date();
        assert!(date.accepts(&Bson::DateTime(bson::DateTime::from_millis(0))));
        assert!(!date.accepts(&bson!("2024-01-01")));

        let record = SchemaNode::record(SchemaNode::boolean());
        assert!(record.accepts(&Bson::Document(doc! { "x": true, "y": false })));
        assert!(!record.accepts(&Bson::Document(doc! { "x": 1 })));

        let status = SchemaNode::enumeration(["active", "inactive"]);
        assert!(status.accepts(&bson!("active")));
        assert!(!status.accepts(&bson!("deleted")));
    }

    #[test]
    fn test_never_and_function() {
        assert!(!SchemaNode::Never.accepts(&bson!(1)));
        assert!(SchemaNode::Function.accepts(&Bson::JavaScriptCode("x => x".into())));
        assert!(!SchemaNode::Function.accepts(&bson!("x => x")));
    }
}
