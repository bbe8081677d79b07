//! Loading schema definitions from YAML and JSON.

use crate::types::SchemaNode;
use std::fs;
use std::path::Path;

/// Error type for schema loading.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SchemaNode {
    /// Load a schema definition from a file.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a schema definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a schema definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render this schema as a YAML definition.
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_and_json_agree() {
        let yaml = r#"
type: union
options:
  - { type: string, format: email }
  - { type: literal, value: 0 }
"#;
        let json = r#"{"type":"union","options":[{"type":"string","format":"email"},{"type":"literal","value":0}]}"#;
        assert_eq!(
            SchemaNode::from_yaml(yaml).unwrap(),
            SchemaNode::from_json(json).unwrap()
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = SchemaNode::from_yaml("type: bigint").unwrap_err();
        assert!(matches!(err, SchemaError::YamlError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SchemaNode::from_file("/nonexistent/schema.yaml").unwrap_err();
        assert!(matches!(err, SchemaError::IoError(_)));
    }
}
