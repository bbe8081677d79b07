//! Validation-schema node types.
//!
//! This module defines `SchemaNode`, the closed set of combinators used to describe
//! the values an application accepts before they are stored in a collection.

use crate::refine::Refinement;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in a validation-schema tree.
///
/// Every node kind is a variant of this enum, so code walking a tree matches on it
/// exhaustively instead of probing run-time types.
///
/// # YAML Format
///
/// Nodes are internally tagged by `type`:
/// ```yaml
/// type: object
/// fields:
///   name: { type: string, min_length: 1 }
///   age:
///     type: optional
///     inner: { type: number, int: true, minimum: 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    /// Fixed set of named fields
    Object(ObjectSchema),
    /// Homogeneous sequence
    Array(ArraySchema),
    /// Positional sequence
    Tuple(TupleSchema),
    /// Text
    String(StringSchema),
    /// Numeric value
    Number(NumberSchema),
    /// Boolean value
    Boolean,
    /// Date/time value
    Date,
    /// Closed set of string literals
    Enum(EnumSchema),
    /// Exactly one literal value
    Literal(LiteralSchema),
    /// First matching alternative
    Union(UnionSchema),
    /// Open mapping with a single value type
    Record(RecordSchema),
    /// Value may be absent
    Optional(WrappedSchema),
    /// Value may be null
    Nullable(WrappedSchema),
    /// Accepts anything
    Any,
    /// Accepts nothing
    Never,
    /// Executable code value
    Function,
}

/// How an object treats keys that are not declared in `fields`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Drop unknown keys from the parsed output
    #[default]
    Strip,
    /// Reject documents with unknown keys
    Strict,
    /// Keep unknown keys as they are
    Passthrough,
}

/// Object node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Declared fields, in declaration order
    #[serde(default)]
    pub fields: IndexMap<String, SchemaNode>,

    /// Handling of undeclared keys
    #[serde(default, skip_serializing_if = "is_default")]
    pub unknown_keys: UnknownKeys,

    /// Schema applied to every undeclared key (overrides `unknown_keys`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catchall: Option<Box<SchemaNode>>,

    /// Checks run after the structural checks pass
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinements: Vec<Refinement>,
}

/// Array node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    /// Element type
    pub element: Box<SchemaNode>,

    /// Minimum number of elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum number of elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Checks run after the structural checks pass
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinements: Vec<Refinement>,
}

/// Tuple node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TupleSchema {
    /// Positional element types
    #[serde(default)]
    pub items: Vec<SchemaNode>,
}

/// Well-known string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFormat {
    /// Looks like an email address
    Email,
    /// Canonical hyphenated UUID text
    Uuid,
}

/// Transforms applied to a string after it validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringTransform {
    /// Decode standard base64 text into binary data
    Base64Decode,
}

/// String node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringSchema {
    /// Minimum length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Regular expression the text must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Well-known format marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,

    /// Post-validation transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<StringTransform>,
}

/// Number node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberSchema {
    /// Only integral values are accepted
    #[serde(default, skip_serializing_if = "is_default")]
    pub int: bool,

    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// The lower bound itself is rejected
    #[serde(default, skip_serializing_if = "is_default")]
    pub exclusive_minimum: bool,

    /// The upper bound itself is rejected
    #[serde(default, skip_serializing_if = "is_default")]
    pub exclusive_maximum: bool,

    /// Values must be a multiple of this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

/// Enum node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumSchema {
    /// Allowed values
    pub values: Vec<String>,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for LiteralValue {
    fn from(f: f64) -> Self {
        Self::Number(f)
    }
}

impl From<i64> for LiteralValue {
    fn from(i: i64) -> Self {
        Self::Number(i as f64)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Literal node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralSchema {
    /// The only accepted value
    pub value: LiteralValue,
}

/// Union node payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionSchema {
    /// Alternatives, tried in order
    pub options: Vec<SchemaNode>,
}

/// Record node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Type of every value
    pub values: Box<SchemaNode>,
}

/// Payload of the optional and nullable wrappers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedSchema {
    /// The wrapped node
    pub inner: Box<SchemaNode>,
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

impl SchemaNode {
    /// Create an object node with the given fields.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self::Object(ObjectSchema::new(fields))
    }

    /// Create an array node with the given element type.
    pub fn array(element: SchemaNode) -> Self {
        Self::Array(ArraySchema::new(element))
    }

    /// Create a tuple node with the given positional types.
    pub fn tuple(items: Vec<SchemaNode>) -> Self {
        Self::Tuple(TupleSchema { items })
    }

    /// Create an unconstrained string node.
    pub fn string() -> Self {
        Self::String(StringSchema::default())
    }

    /// Create an unconstrained number node.
    pub fn number() -> Self {
        Self::Number(NumberSchema::default())
    }

    /// Create an integer-only number node.
    pub fn int() -> Self {
        Self::Number(NumberSchema::new().integer())
    }

    /// Create a boolean node.
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// Create a date node.
    pub fn date() -> Self {
        Self::Date
    }

    /// Create an enum node over the given values.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumSchema {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Create a literal node.
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::Literal(LiteralSchema {
            value: value.into(),
        })
    }

    /// Create a union node over the given alternatives.
    pub fn union(options: Vec<SchemaNode>) -> Self {
        Self::Union(UnionSchema { options })
    }

    /// Create a record node with the given value type.
    pub fn record(values: SchemaNode) -> Self {
        Self::Record(RecordSchema {
            values: Box::new(values),
        })
    }

    /// Create a node that accepts anything.
    pub fn any() -> Self {
        Self::Any
    }

    /// Wrap this node so the value may be absent.
    pub fn optional(self) -> Self {
        Self::Optional(WrappedSchema {
            inner: Box::new(self),
        })
    }

    /// Wrap this node so the value may be null.
    pub fn nullable(self) -> Self {
        Self::Nullable(WrappedSchema {
            inner: Box::new(self),
        })
    }

    /// Name of this node's variant, as used in the definition format.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum(_) => "enum",
            Self::Literal(_) => "literal",
            Self::Union(_) => "union",
            Self::Record(_) => "record",
            Self::Optional(_) => "optional",
            Self::Nullable(_) => "nullable",
            Self::Any => "any",
            Self::Never => "never",
            Self::Function => "function",
        }
    }

    /// Whether an object field described by this node may be absent.
    ///
    /// Looks through nullable wrappers, so `nullable(optional(x))` counts too.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) => true,
            Self::Nullable(w) => w.inner.is_optional(),
            _ => false,
        }
    }
}

impl ObjectSchema {
    /// Create an object schema with the given fields and default key handling.
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Reject undeclared keys.
    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    /// Keep undeclared keys.
    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    /// Validate undeclared keys against `node`.
    pub fn with_catchall(mut self, node: SchemaNode) -> Self {
        self.catchall = Some(Box::new(node));
        self
    }

    /// Add a refinement.
    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinements.push(refinement);
        self
    }

    /// Names of the fields that must be present.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, node)| !node.is_optional())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl ArraySchema {
    /// Create an array schema with the given element type.
    pub fn new(element: SchemaNode) -> Self {
        Self {
            element: Box::new(element),
            min_length: None,
            max_length: None,
            refinements: Vec::new(),
        }
    }

    /// Set the minimum number of elements.
    pub fn with_min_length(mut self, min: u64) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum number of elements.
    pub fn with_max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Add a refinement.
    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinements.push(refinement);
        self
    }
}

impl StringSchema {
    /// Create an unconstrained string schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum length.
    pub fn with_min_length(mut self, min: u64) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set the regular expression.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the format marker.
    pub fn with_format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: StringTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl NumberSchema {
    /// Create an unconstrained number schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept integral values only.
    pub fn integer(mut self) -> Self {
        self.int = true;
        self
    }

    /// Set an inclusive lower bound.
    pub fn with_minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self.exclusive_minimum = false;
        self
    }

    /// Set an inclusive upper bound.
    pub fn with_maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self.exclusive_maximum = false;
        self
    }

    /// Set an exclusive lower bound.
    pub fn with_exclusive_minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self.exclusive_minimum = true;
        self
    }

    /// Set an exclusive upper bound.
    pub fn with_exclusive_maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self.exclusive_maximum = true;
        self
    }

    /// Require values to be a multiple of `step`.
    pub fn with_multiple_of(mut self, step: f64) -> Self {
        self.multiple_of = Some(step);
        self
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(schema: ArraySchema) -> Self {
        Self::Array(schema)
    }
}

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        Self::String(schema)
    }
}

impl From<NumberSchema> for SchemaNode {
    fn from(schema: NumberSchema) -> Self {
        Self::Number(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            SchemaNode::int(),
            SchemaNode::Number(NumberSchema {
                int: true,
                ..NumberSchema::default()
            })
        );
        assert_eq!(
            SchemaNode::enumeration(["a", "b"]),
            SchemaNode::Enum(EnumSchema {
                values: vec!["a".to_string(), "b".to_string()]
            })
        );
        assert!(matches!(SchemaNode::string().optional(), SchemaNode::Optional(_)));
    }

    #[test]
    fn test_is_optional_looks_through_nullable() {
        assert!(SchemaNode::string().optional().is_optional());
        assert!(SchemaNode::string().optional().nullable().is_optional());
        assert!(!SchemaNode::string().nullable().is_optional());
        assert!(!SchemaNode::any().is_optional());
    }

    #[test]
    fn test_required_fields_keep_declaration_order() {
        let schema = ObjectSchema::new([
            ("b", SchemaNode::string()),
            ("a", SchemaNode::string().optional()),
            ("c", SchemaNode::boolean()),
        ]);
        assert_eq!(schema.required_fields(), vec!["b", "c"]);
    }

    #[test]
    fn test_deserialize_yaml_definition() {
        let yaml = r#"
type: object
unknown_keys: strict
fields:
  name: { type: string, min_length: 1 }
  age:
    type: optional
    inner: { type: number, int: true, minimum: 0 }
  tags:
    type: array
    element: { type: string }
    refinements:
      - kind: unique_items
"#;
        let parsed: SchemaNode = serde_yaml::from_str(yaml).unwrap();
        let SchemaNode::Object(obj) = parsed else {
            panic!("Expected Object");
        };
        assert_eq!(obj.unknown_keys, UnknownKeys::Strict);
        let names: Vec<&str> = obj.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "age", "tags"]);
        assert_eq!(
            obj.fields["name"],
            SchemaNode::from(StringSchema::new().with_min_length(1))
        );
        assert_eq!(
            obj.fields["age"],
            SchemaNode::from(NumberSchema::new().integer().with_minimum(0.0)).optional()
        );
        let SchemaNode::Array(arr) = &obj.fields["tags"] else {
            panic!("Expected Array");
        };
        assert_eq!(arr.refinements, vec![Refinement::UniqueItems]);
    }

    #[test]
    fn test_serialize_omits_defaults() {
        let json = serde_json::to_value(SchemaNode::string()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string"}));

        let json = serde_json::to_value(SchemaNode::literal("x")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "literal", "value": "x"}));
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let nodes = vec![
            SchemaNode::object([("a", SchemaNode::string())]),
            SchemaNode::array(SchemaNode::int()),
            SchemaNode::record(SchemaNode::boolean()),
            SchemaNode::union(vec![SchemaNode::string(), SchemaNode::date()]),
            SchemaNode::literal(true),
            SchemaNode::string().nullable().optional(),
            SchemaNode::Never,
        ];

        for node in nodes {
            let yaml = serde_yaml::to_string(&node).unwrap();
            let parsed: SchemaNode = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(node, parsed);
        }
    }
}
