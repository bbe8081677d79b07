//! Sample document loading for the `check` command.
//!
//! Accepts a JSON array of documents, a single JSON document, or JSON lines.
//! Values are read as MongoDB extended JSON, so `{"$date": ...}` and
//! `{"$oid": ...}` wrappers become the matching BSON types.

use anyhow::Context;
use bson::Bson;
use std::fs;
use std::path::Path;

/// Load every document in `path`.
pub fn load_documents(path: &Path) -> anyhow::Result<Vec<Bson>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents from {path:?}"))?;
    parse_documents(&content).with_context(|| format!("Failed to parse documents in {path:?}"))
}

/// Parse documents from text.
pub fn parse_documents(content: &str) -> anyhow::Result<Vec<Bson>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let values = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<serde_json::Value>>(content)?
    } else {
        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) => vec![value],
            Err(_) => parse_lines(content)?,
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            Bson::try_from(value).with_context(|| format!("Document {i} is not valid extended JSON"))
        })
        .collect()
}

fn parse_lines(content: &str) -> anyhow::Result<Vec<serde_json::Value>> {
    let mut values = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line)
            .with_context(|| format!("Invalid JSON on line {}", line_no + 1))?;
        values.push(value);
    }
    Ok(values)
}
