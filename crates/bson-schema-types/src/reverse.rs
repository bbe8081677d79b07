//! Reverse conversion: `$jsonSchema` descriptor → SchemaNode.
//!
//! This module rebuilds a schema-core tree from a descriptor. The mapping is lossy
//! where the descriptor vocabulary is wider than the schema model: numeric kinds
//! collapse into one number node and annotations are dropped.

use crate::descriptor::{AdditionalProperties, Alternatives, BsonSchema, BsonType, Items, Keywords};
use crate::error::ConversionError;
use crate::patterns::OBJECT_ID_PATTERN;
use schema_core::{
    ArraySchema, NumberSchema, ObjectSchema, Refinement, SchemaNode, StringFormat, StringSchema,
    StringTransform, UnknownKeys,
};

impl TryFrom<&BsonSchema> for SchemaNode {
    type Error = ConversionError;

    fn try_from(schema: &BsonSchema) -> Result<Self, Self::Error> {
        bson_to_schema(schema)
    }
}

/// Convert a descriptor to a schema node.
///
/// # Errors
///
/// Returns [`ConversionError::UnsupportedTargetKind`] for `null` (outside an
/// alternatives list), `regex`, `timestamp` and `mixed` nodes.
pub fn bson_to_schema(schema: &BsonSchema) -> Result<SchemaNode, ConversionError> {
    match schema {
        BsonSchema::Unconstrained(_) => Ok(SchemaNode::Any),
        BsonSchema::Alternatives(alt) => alternatives_to_schema(alt),
        BsonSchema::Typed(typed) => {
            let kw = &typed.keywords;
            let kind = typed.bson_type;
            let keeps_enum = kind.is_numeric() || matches!(kind, BsonType::String | BsonType::Bool);
            if kw.enum_values.is_some() && !keeps_enum {
                tracing::warn!("Dropping enum on a {} descriptor", kind);
            }
            match kind {
                BsonType::Object => object_to_schema(kw),
                BsonType::Array => array_to_schema(kw),
                BsonType::String => Ok(string_to_schema(kw)),
                BsonType::Bool => match &kw.enum_values {
                    Some(values) => Ok(literal_union(values)),
                    None => Ok(SchemaNode::Boolean),
                },
                BsonType::ObjectId => Ok(StringSchema::new().with_pattern(OBJECT_ID_PATTERN).into()),
                BsonType::Date => Ok(SchemaNode::Date),
                BsonType::Uuid => Ok(StringSchema::new().with_format(StringFormat::Uuid).into()),
                BsonType::BinData => Ok(StringSchema::new()
                    .with_transform(StringTransform::Base64Decode)
                    .into()),
                BsonType::Double | BsonType::Int | BsonType::Long | BsonType::Decimal => {
                    match &kw.enum_values {
                        Some(values) => Ok(literal_union(values)),
                        None => Ok(number_to_schema(kind, kw)),
                    }
                }
                BsonType::Null | BsonType::Regex | BsonType::Timestamp | BsonType::Mixed => {
                    Err(ConversionError::UnsupportedTargetKind(kind.to_string()))
                }
            }
        }
    }
}

fn alternatives_to_schema(alt: &Alternatives) -> Result<SchemaNode, ConversionError> {
    let mut saw_null = false;
    let mut members: Vec<SchemaNode> = Vec::with_capacity(alt.any_of.len());
    for member in &alt.any_of {
        if member.bson_type() == Some(BsonType::Null) {
            saw_null = true;
            continue;
        }
        let node = bson_to_schema(member)?;
        if members.contains(&node) {
            tracing::debug!("Collapsing duplicate alternative of type {}", node.type_name());
            continue;
        }
        members.push(node);
    }

    let node = match members.len() {
        0 if saw_null => {
            return Err(ConversionError::UnsupportedTargetKind(
                BsonType::Null.to_string(),
            ))
        }
        0 => SchemaNode::Never,
        1 => members.remove(0),
        _ => SchemaNode::union(members),
    };
    Ok(if saw_null { node.nullable() } else { node })
}

fn object_to_schema(kw: &Keywords) -> Result<SchemaNode, ConversionError> {
    let has_properties = kw.properties.as_ref().is_some_and(|p| !p.is_empty());
    let has_count = kw.min_properties.is_some() || kw.max_properties.is_some();
    let required = kw.required.as_deref().unwrap_or_default();

    if let Some(AdditionalProperties::Schema(values)) = &kw.additional_properties {
        if !has_properties && !has_count && required.is_empty() {
            return Ok(SchemaNode::record(bson_to_schema(values)?));
        }
    }

    let mut obj = ObjectSchema::default();
    if let Some(properties) = &kw.properties {
        for (name, property) in properties {
            let node = bson_to_schema(property)?;
            let node = if required.contains(name) {
                node
            } else {
                node.optional()
            };
            obj.fields.insert(name.clone(), node);
        }
    }
    for name in required {
        if !obj.fields.contains_key(name) {
            tracing::debug!("Required field '{}' has no property descriptor", name);
            obj.fields.insert(name.clone(), SchemaNode::Any);
        }
    }

    match &kw.additional_properties {
        Some(AdditionalProperties::Allowed(false)) => obj.unknown_keys = UnknownKeys::Strict,
        Some(AdditionalProperties::Schema(catchall)) => {
            obj.unknown_keys = UnknownKeys::Passthrough;
            obj.catchall = Some(Box::new(bson_to_schema(catchall)?));
        }
        Some(AdditionalProperties::Allowed(true)) | None => {
            obj.unknown_keys = UnknownKeys::Passthrough;
        }
    }

    if has_count {
        obj.refinements.push(Refinement::PropertyCount {
            min: kw.min_properties,
            max: kw.max_properties,
        });
    }
    Ok(SchemaNode::Object(obj))
}

fn array_to_schema(kw: &Keywords) -> Result<SchemaNode, ConversionError> {
    let element = match &kw.items {
        None => SchemaNode::Any,
        Some(Items::Single(item)) => bson_to_schema(item)?,
        Some(Items::Tuple(items)) => match items.as_slice() {
            [] => SchemaNode::Any,
            [only] => bson_to_schema(only)?,
            many => SchemaNode::union(
                many.iter()
                    .map(bson_to_schema)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        },
    };

    let mut arr = ArraySchema::new(element);
    arr.min_length = kw.min_items;
    arr.max_length = kw.max_items;
    if kw.unique_items == Some(true) {
        arr.refinements.push(Refinement::UniqueItems);
    }
    Ok(SchemaNode::Array(arr))
}

fn string_to_schema(kw: &Keywords) -> SchemaNode {
    if let Some(values) = &kw.enum_values {
        let strings: Option<Vec<&str>> = values.iter().map(serde_json::Value::as_str).collect();
        return match strings {
            Some(strings) => SchemaNode::enumeration(strings),
            None => literal_union(values),
        };
    }
    SchemaNode::String(StringSchema {
        min_length: kw.min_length,
        max_length: kw.max_length,
        pattern: kw.pattern.clone(),
        ..StringSchema::default()
    })
}

fn number_to_schema(kind: BsonType, kw: &Keywords) -> SchemaNode {
    SchemaNode::Number(NumberSchema {
        int: matches!(kind, BsonType::Int | BsonType::Long),
        minimum: kw.minimum,
        maximum: kw.maximum,
        exclusive_minimum: kw.exclusive_minimum.unwrap_or(false),
        exclusive_maximum: kw.exclusive_maximum.unwrap_or(false),
        multiple_of: kw.multiple_of,
    })
}

/// Build a literal (or union of literals) from an `enum` list.
fn literal_union(values: &[serde_json::Value]) -> SchemaNode {
    let mut nullable = false;
    let mut literals = Vec::with_capacity(values.len());
    for value in values {
        match value {
            serde_json::Value::Null => nullable = true,
            serde_json::Value::Bool(b) => literals.push(SchemaNode::literal(*b)),
            serde_json::Value::String(s) => literals.push(SchemaNode::literal(s.as_str())),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => literals.push(SchemaNode::literal(f)),
                None => tracing::warn!("Skipping enum value {} with no f64 form", n),
            },
            other => tracing::warn!("Skipping non-scalar enum value {}", other),
        }
    }

    let node = match literals.len() {
        0 => SchemaNode::Never,
        1 => literals.remove(0),
        _ => SchemaNode::union(literals),
    };
    if nullable {
        node.nullable()
    } else {
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: serde_json::Value) -> SchemaNode {
        let schema: BsonSchema = serde_json::from_value(value).unwrap();
        bson_to_schema(&schema).unwrap()
    }

    #[test]
    fn test_object_required_and_optional() {
        let node = from_json(json!({
            "bsonType": "object",
            "required": ["a"],
            "properties": {
                "a": { "bsonType": "string" },
                "b": { "bsonType": "bool" }
            }
        }));
        let SchemaNode::Object(obj) = node else {
            panic!("Expected Object");
        };
        assert_eq!(obj.fields["a"], SchemaNode::string());
        assert_eq!(obj.fields["b"], SchemaNode::boolean().optional());
        assert_eq!(obj.unknown_keys, UnknownKeys::Passthrough);
        assert!(obj.refinements.is_empty());
    }

    #[test]
    fn test_object_strict_and_property_count() {
        let node = from_json(json!({
            "bsonType": "object",
            "properties": { "a": { "bsonType": "int" } },
            "additionalProperties": false,
            "minProperties": 1
        }));
        let SchemaNode::Object(obj) = node else {
            panic!("Expected Object");
        };
        assert_eq!(obj.unknown_keys, UnknownKeys::Strict);
        assert_eq!(
            obj.refinements,
            vec![Refinement::PropertyCount {
                min: Some(1),
                max: None
            }]
        );
    }

    #[test]
    fn test_object_catchall_and_record() {
        let record = from_json(json!({
            "bsonType": "object",
            "additionalProperties": { "bsonType": "double" }
        }));
        assert_eq!(record, SchemaNode::record(SchemaNode::number()));

        let catchall = from_json(json!({
            "bsonType": "object",
            "required": ["id"],
            "properties": { "id": { "bsonType": "objectId" } },
            "additionalProperties": { "bsonType": "string" }
        }));
        let SchemaNode::Object(obj) = catchall else {
            panic!("Expected Object");
        };
        assert_eq!(obj.catchall.as_deref(), Some(&SchemaNode::string()));
    }

    #[test]
    fn test_required_without_property() {
        let node = from_json(json!({ "bsonType": "object", "required": ["x"] }));
        let SchemaNode::Object(obj) = node else {
            panic!("Expected Object");
        };
        assert_eq!(obj.fields["x"], SchemaNode::Any);
        assert_eq!(obj.required_fields(), vec!["x"]);
    }

    #[test]
    fn test_array_items() {
        let node = from_json(json!({
            "bsonType": "array",
            "items": { "bsonType": "string" },
            "minItems": 1,
            "maxItems": 4,
            "uniqueItems": true
        }));
        assert_eq!(
            node,
            SchemaNode::from(
                ArraySchema::new(SchemaNode::string())
                    .with_min_length(1)
                    .with_max_length(4)
                    .with_refinement(Refinement::UniqueItems)
            )
        );

        let no_items = from_json(json!({ "bsonType": "array" }));
        assert_eq!(no_items, SchemaNode::array(SchemaNode::Any));

        let one = from_json(json!({ "bsonType": "array", "items": [{ "bsonType": "date" }] }));
        assert_eq!(one, SchemaNode::array(SchemaNode::date()));

        let many = from_json(json!({
            "bsonType": "array",
            "items": [{ "bsonType": "date" }, { "bsonType": "bool" }]
        }));
        assert_eq!(
            many,
            SchemaNode::array(SchemaNode::union(vec![SchemaNode::date(), SchemaNode::boolean()]))
        );
    }

    #[test]
    fn test_string_constraints() {
        let node = from_json(json!({
            "bsonType": "string",
            "minLength": 1,
            "pattern": "^x"
        }));
        assert_eq!(
            node,
            SchemaNode::from(StringSchema::new().with_min_length(1).with_pattern("^x"))
        );
    }

    #[test]
    fn test_string_enum() {
        let node = from_json(json!({ "bsonType": "string", "enum": ["red", "green"] }));
        assert_eq!(node, SchemaNode::enumeration(["red", "green"]));

        let mixed = from_json(json!({ "bsonType": "string", "enum": ["red", 1, null] }));
        assert_eq!(
            mixed,
            SchemaNode::union(vec![SchemaNode::literal("red"), SchemaNode::literal(1.0)]).nullable()
        );
    }

    #[test]
    fn test_special_kinds() {
        assert_eq!(
            from_json(json!({ "bsonType": "objectId" })),
            SchemaNode::from(StringSchema::new().with_pattern(OBJECT_ID_PATTERN))
        );
        assert_eq!(
            from_json(json!({ "bsonType": "uuid" })),
            SchemaNode::from(StringSchema::new().with_format(StringFormat::Uuid))
        );
        assert_eq!(
            from_json(json!({ "bsonType": "binData" })),
            SchemaNode::from(StringSchema::new().with_transform(StringTransform::Base64Decode))
        );
        assert_eq!(from_json(json!({ "bsonType": "date" })), SchemaNode::date());
        assert_eq!(from_json(json!({ "bsonType": "bool" })), SchemaNode::boolean());
        assert_eq!(from_json(json!({})), SchemaNode::Any);
    }

    #[test]
    fn test_numeric_kinds() {
        assert_eq!(from_json(json!({ "bsonType": "double" })), SchemaNode::number());
        assert_eq!(from_json(json!({ "bsonType": "decimal" })), SchemaNode::number());
        assert_eq!(from_json(json!({ "bsonType": "long" })), SchemaNode::int());

        let bounded = from_json(json!({
            "bsonType": "int",
            "minimum": 0,
            "maximum": 10,
            "exclusiveMaximum": true,
            "multipleOf": 2
        }));
        assert_eq!(
            bounded,
            SchemaNode::from(
                NumberSchema::new()
                    .integer()
                    .with_minimum(0.0)
                    .with_exclusive_maximum(10.0)
                    .with_multiple_of(2.0)
            )
        );

        let literal = from_json(json!({ "bsonType": "int", "enum": [3] }));
        assert_eq!(literal, SchemaNode::literal(3.0));
    }

    #[test]
    fn test_decimal_kind_accepts_decimal_values() {
        let node = from_json(json!({ "bsonType": "decimal", "minimum": 0 }));
        assert_eq!(node, SchemaNode::from(NumberSchema::new().with_minimum(0.0)));

        let value = |s: &str| bson::Bson::Decimal128(s.parse::<bson::Decimal128>().unwrap());
        assert!(node.accepts(&value("1.5")));
        assert!(!node.accepts(&value("-1.5")));
    }

    #[test]
    fn test_enum_dropped_on_kinds_without_literals() {
        assert_eq!(
            from_json(json!({ "bsonType": "date", "enum": ["2024-01-01"] })),
            SchemaNode::date()
        );
        assert_eq!(
            from_json(json!({ "bsonType": "objectId", "enum": ["507f1f77bcf86cd799439011"] })),
            SchemaNode::from(StringSchema::new().with_pattern(OBJECT_ID_PATTERN))
        );
        let SchemaNode::Array(arr) = from_json(json!({ "bsonType": "array", "enum": [[1]] })) else {
            panic!("Expected Array");
        };
        assert_eq!(*arr.element, SchemaNode::Any);
    }

    #[test]
    fn test_alternatives() {
        let nullable = from_json(json!({ "anyOf": [{ "bsonType": "string" }, { "bsonType": "null" }] }));
        assert_eq!(nullable, SchemaNode::string().nullable());

        let union = from_json(json!({ "anyOf": [{ "bsonType": "string" }, { "bsonType": "date" }] }));
        assert_eq!(
            union,
            SchemaNode::union(vec![SchemaNode::string(), SchemaNode::date()])
        );

        let collapsed = from_json(json!({ "bsonType": ["int", "long"] }));
        assert_eq!(collapsed, SchemaNode::int());

        let empty = from_json(json!({ "anyOf": [] }));
        assert_eq!(empty, SchemaNode::Never);
    }

    #[test]
    fn test_unsupported_target_kinds() {
        for kind in ["timestamp", "regex", "mixed", "null"] {
            let schema: BsonSchema = serde_json::from_value(json!({ "bsonType": kind })).unwrap();
            assert_eq!(
                SchemaNode::try_from(&schema).unwrap_err(),
                ConversionError::UnsupportedTargetKind(kind.to_string())
            );
        }

        let only_null: BsonSchema =
            serde_json::from_value(json!({ "anyOf": [{ "bsonType": "null" }] })).unwrap();
        assert_eq!(
            bson_to_schema(&only_null).unwrap_err(),
            ConversionError::UnsupportedTargetKind("null".to_string())
        );

        let nested: BsonSchema = serde_json::from_value(json!({
            "bsonType": "object",
            "properties": { "ts": { "bsonType": "timestamp" } }
        }))
        .unwrap();
        assert!(bson_to_schema(&nested).is_err());
    }
}
