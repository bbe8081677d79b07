//! Forward conversion: SchemaNode → `$jsonSchema` descriptor.
//!
//! This module walks a schema-core tree and builds the equivalent descriptor tree.
//! Optional wrappers are transparent here; they only matter to the enclosing
//! object, which leaves such fields out of `required`.

use crate::config::{ConversionConfig, NumberPolicy};
use crate::descriptor::{AdditionalProperties, BsonSchema, BsonType, Items, Keywords, TypedSchema};
use crate::error::ConversionError;
use crate::patterns::{EMAIL_PATTERN, OBJECT_ID_PATTERN, UUID_PATTERN};
use schema_core::{
    ArraySchema, LiteralValue, NumberSchema, ObjectSchema, Refinement, SchemaNode, StringFormat,
    StringSchema, StringTransform, UnknownKeys,
};

impl TryFrom<&SchemaNode> for BsonSchema {
    type Error = ConversionError;

    fn try_from(node: &SchemaNode) -> Result<Self, Self::Error> {
        schema_to_bson(node)
    }
}

/// Convert a schema node to a descriptor with the default configuration.
pub fn schema_to_bson(node: &SchemaNode) -> Result<BsonSchema, ConversionError> {
    schema_to_bson_with_config(node, &ConversionConfig::default())
}

/// Convert a schema node to a descriptor.
///
/// # Errors
///
/// Returns [`ConversionError::UnsupportedSourceType`] for `never` and `function`
/// nodes anywhere in the tree.
pub fn schema_to_bson_with_config(
    node: &SchemaNode,
    config: &ConversionConfig,
) -> Result<BsonSchema, ConversionError> {
    match node {
        SchemaNode::Optional(w) => schema_to_bson_with_config(&w.inner, config),
        SchemaNode::Nullable(w) => {
            let inner = schema_to_bson_with_config(&w.inner, config)?;
            if config.nullable_widening {
                Ok(widen_nullable(inner))
            } else {
                tracing::debug!("Nullable widening is off, dropping null from descriptor");
                Ok(inner)
            }
        }
        SchemaNode::Object(obj) => object_to_bson(obj, config),
        SchemaNode::Record(record) => {
            let values = schema_to_bson_with_config(&record.values, config)?;
            Ok(typed(
                BsonType::Object,
                Keywords {
                    additional_properties: Some(AdditionalProperties::Schema(Box::new(values))),
                    ..Keywords::default()
                },
            ))
        }
        SchemaNode::Array(arr) => array_to_bson(arr, config),
        SchemaNode::Tuple(tuple) => {
            let items = tuple
                .items
                .iter()
                .map(|item| schema_to_bson_with_config(item, config))
                .collect::<Result<Vec<_>, _>>()?;
            let len = items.len() as u64;
            Ok(typed(
                BsonType::Array,
                Keywords {
                    items: Some(Items::Tuple(items)),
                    min_items: Some(len),
                    max_items: Some(len),
                    ..Keywords::default()
                },
            ))
        }
        SchemaNode::String(s) => Ok(string_to_bson(s)),
        SchemaNode::Number(n) => Ok(number_to_bson(n, config.number_policy)),
        SchemaNode::Boolean => Ok(BsonSchema::typed(BsonType::Bool)),
        SchemaNode::Date => Ok(BsonSchema::typed(BsonType::Date)),
        SchemaNode::Enum(e) => Ok(typed(
            BsonType::String,
            Keywords {
                enum_values: Some(e.values.iter().cloned().map(serde_json::Value::String).collect()),
                ..Keywords::default()
            },
        )),
        SchemaNode::Literal(lit) => literal_to_bson(&lit.value),
        SchemaNode::Union(union) => {
            let members = union
                .options
                .iter()
                .map(|option| schema_to_bson_with_config(option, config))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BsonSchema::alternatives(members))
        }
        SchemaNode::Any => Ok(BsonSchema::unconstrained()),
        SchemaNode::Never | SchemaNode::Function => Err(ConversionError::UnsupportedSourceType(
            node.type_name().to_string(),
        )),
    }
}

fn typed(bson_type: BsonType, keywords: Keywords) -> BsonSchema {
    BsonSchema::Typed(TypedSchema::with_keywords(bson_type, keywords))
}

/// Allow null alongside `inner`.
fn widen_nullable(inner: BsonSchema) -> BsonSchema {
    if inner.bson_type() == Some(BsonType::Null) {
        return inner;
    }
    let null = BsonSchema::typed(BsonType::Null);
    match inner {
        BsonSchema::Unconstrained(_) => inner,
        BsonSchema::Alternatives(mut alt) => {
            if !alt.any_of.contains(&null) {
                alt.any_of.push(null);
            }
            BsonSchema::Alternatives(alt)
        }
        other => BsonSchema::alternatives(vec![other, null]),
    }
}

fn object_to_bson(
    obj: &ObjectSchema,
    config: &ConversionConfig,
) -> Result<BsonSchema, ConversionError> {
    let mut properties = indexmap::IndexMap::with_capacity(obj.fields.len());
    for (name, field) in &obj.fields {
        tracing::debug!("Converting field '{}' of type {}", name, field.type_name());
        properties.insert(name.clone(), schema_to_bson_with_config(field, config)?);
    }

    let required: Vec<String> = obj
        .required_fields()
        .into_iter()
        .map(str::to_string)
        .collect();

    let additional_properties = match (&obj.catchall, obj.unknown_keys) {
        (Some(catchall), _) => Some(AdditionalProperties::Schema(Box::new(
            schema_to_bson_with_config(catchall, config)?,
        ))),
        (None, UnknownKeys::Strict) => Some(AdditionalProperties::Allowed(false)),
        (None, UnknownKeys::Strip | UnknownKeys::Passthrough) => None,
    };

    let mut keywords = Keywords {
        required: (!required.is_empty()).then_some(required),
        properties: Some(properties),
        additional_properties,
        ..Keywords::default()
    };
    for refinement in &obj.refinements {
        match refinement {
            Refinement::PropertyCount { min, max } => {
                keywords.min_properties = tighter(keywords.min_properties, *min, std::cmp::max);
                keywords.max_properties = tighter(keywords.max_properties, *max, std::cmp::min);
            }
            Refinement::UniqueItems => {
                tracing::warn!("Ignoring unique-items refinement on an object schema");
            }
        }
    }
    Ok(typed(BsonType::Object, keywords))
}

fn array_to_bson(
    arr: &ArraySchema,
    config: &ConversionConfig,
) -> Result<BsonSchema, ConversionError> {
    let element = schema_to_bson_with_config(&arr.element, config)?;
    let mut keywords = Keywords {
        items: Some(Items::Single(Box::new(element))),
        min_items: arr.min_length,
        max_items: arr.max_length,
        ..Keywords::default()
    };
    for refinement in &arr.refinements {
        match refinement {
            Refinement::UniqueItems => keywords.unique_items = Some(true),
            Refinement::PropertyCount { .. } => {
                tracing::warn!("Ignoring property-count refinement on an array schema");
            }
        }
    }
    Ok(typed(BsonType::Array, keywords))
}

/// Combine two optional bounds, keeping the tighter one.
fn tighter(current: Option<u64>, next: Option<u64>, pick: fn(u64, u64) -> u64) -> Option<u64> {
    match (current, next) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

fn string_to_bson(s: &StringSchema) -> BsonSchema {
    if s.transform == Some(StringTransform::Base64Decode) {
        if s.min_length.is_some() || s.max_length.is_some() || s.pattern.is_some() {
            tracing::warn!("Dropping text constraints on a base64 string mapped to binData");
        }
        return BsonSchema::typed(BsonType::BinData);
    }

    let object_id_only = s.pattern.as_deref() == Some(OBJECT_ID_PATTERN)
        && s.min_length.is_none()
        && s.max_length.is_none()
        && s.format.is_none();
    if object_id_only {
        return BsonSchema::typed(BsonType::ObjectId);
    }

    let format_pattern = s.format.map(|format| match format {
        StringFormat::Email => EMAIL_PATTERN,
        StringFormat::Uuid => UUID_PATTERN,
    });
    let pattern = match (&s.pattern, format_pattern) {
        (Some(explicit), Some(_)) => {
            tracing::warn!(
                "String has both a pattern and a format marker; keeping pattern {}",
                explicit
            );
            Some(explicit.clone())
        }
        (Some(explicit), None) => Some(explicit.clone()),
        (None, Some(format)) => Some(format.to_string()),
        (None, None) => None,
    };

    typed(
        BsonType::String,
        Keywords {
            min_length: s.min_length,
            max_length: s.max_length,
            pattern,
            ..Keywords::default()
        },
    )
}

fn number_to_bson(n: &NumberSchema, policy: NumberPolicy) -> BsonSchema {
    let kinds = match policy {
        NumberPolicy::Single => vec![if n.int { BsonType::Int } else { BsonType::Double }],
        NumberPolicy::Ambiguous => ambiguous_numeric_kinds(n),
    };
    let mut members: Vec<BsonSchema> = kinds
        .into_iter()
        .map(|kind| typed(kind, number_keywords(n)))
        .collect();
    if members.len() == 1 {
        members.remove(0)
    } else {
        BsonSchema::alternatives(members)
    }
}

/// Kinds a value of `n` could be stored as.
///
/// `int` and `long` are dropped when the declared range lies wholly outside what
/// they can hold.
fn ambiguous_numeric_kinds(n: &NumberSchema) -> Vec<BsonType> {
    let candidates: &[BsonType] = if n.int {
        &[BsonType::Int, BsonType::Long]
    } else {
        &[
            BsonType::Double,
            BsonType::Int,
            BsonType::Long,
            BsonType::Decimal,
        ]
    };
    let kinds: Vec<BsonType> = candidates
        .iter()
        .copied()
        .filter(|kind| match kind {
            BsonType::Int => range_overlaps(n, f64::from(i32::MIN), f64::from(i32::MAX)),
            BsonType::Long => range_overlaps(n, i64::MIN as f64, i64::MAX as f64),
            _ => true,
        })
        .collect();
    if kinds.is_empty() {
        vec![BsonType::Decimal]
    } else {
        kinds
    }
}

fn range_overlaps(n: &NumberSchema, lo: f64, hi: f64) -> bool {
    let above = n
        .minimum
        .is_some_and(|min| min > hi || (n.exclusive_minimum && min >= hi));
    let below = n
        .maximum
        .is_some_and(|max| max < lo || (n.exclusive_maximum && max <= lo));
    !(above || below)
}

fn number_keywords(n: &NumberSchema) -> Keywords {
    Keywords {
        minimum: n.minimum,
        exclusive_minimum: (n.minimum.is_some() && n.exclusive_minimum).then_some(true),
        maximum: n.maximum,
        exclusive_maximum: (n.maximum.is_some() && n.exclusive_maximum).then_some(true),
        multiple_of: n.multiple_of,
        ..Keywords::default()
    }
}

fn literal_to_bson(value: &LiteralValue) -> Result<BsonSchema, ConversionError> {
    let (kind, json) = match value {
        LiteralValue::String(s) => (BsonType::String, serde_json::Value::String(s.clone())),
        LiteralValue::Bool(b) => (BsonType::Bool, serde_json::Value::Bool(*b)),
        LiteralValue::Number(f) if f.is_finite() && f.fract() == 0.0 => {
            let i = *f as i64;
            let kind = if i32::try_from(i).is_ok() {
                BsonType::Int
            } else if (i64::MIN as f64..i64::MAX as f64).contains(f) {
                BsonType::Long
            } else {
                BsonType::Double
            };
            let json = match kind {
                BsonType::Double => number_json(*f)?,
                _ => serde_json::Value::from(i),
            };
            (kind, json)
        }
        LiteralValue::Number(f) => (BsonType::Double, number_json(*f)?),
    };
    Ok(typed(
        kind,
        Keywords {
            enum_values: Some(vec![json]),
            ..Keywords::default()
        },
    ))
}

fn number_json(f: f64) -> Result<serde_json::Value, ConversionError> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| ConversionError::UnsupportedSourceType(format!("literal {f}")))
}
