//! Serialization of generated OpenAPI documents.
//!
//! Documents are written as pretty-printed JSON (the default, matching what Web API tooling
//! consumes) or as YAML, either to a file or to standard output.

use crate::cli::OutputFormat;
use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document in the requested format.
pub fn serialize_document(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serialize_json(doc),
        OutputFormat::Yaml => serialize_yaml(doc),
    }
}

/// Serializes an OpenAPI document to YAML format.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes the serialized document to `path`, creating parent directories as needed and
/// replacing any existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
