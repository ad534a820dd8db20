//! Serialization module for converting OpenAPI documents to JSON or YAML format.
//!
//! This module provides functions to serialize OpenAPI documents into standard formats
//! and write them to files or return them as strings. Every function validates the
//! fields the OpenAPI specification marks as REQUIRED before serializing.

use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiDocument;
use log::debug;
use std::fs;
use std::path::Path;

/// Checks the root fields the OpenAPI specification requires.
///
/// # Errors
///
/// Returns [`Error::MissingField`] naming every empty required field
/// (`Info.Title`, `Info.Version`).
pub fn validate(doc: &OpenApiDocument) -> Result<()> {
    let mut missing = Vec::new();
    if doc.info.title.is_empty() {
        missing.push("Info.Title".to_string());
    }
    if doc.info.version.is_empty() {
        missing.push("Info.Version".to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingField(missing))
    }
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// The output is formatted with indentation for readability, making it suitable
/// for human review and version control. Paths appear in registration order.
///
/// # Errors
///
/// Returns an error if a required field is empty or serialization fails.
///
/// # Example
///
/// ```
/// use web_openapi::openapi_builder::{Info, OpenApiBuilder};
/// use web_openapi::serializer::serialize_json;
///
/// let doc = OpenApiBuilder::new(Info::new("Pets", "1.0.0")).build();
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.1.0\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    validate(doc)?;
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Serializes an OpenAPI document to compact JSON bytes, the form served at
/// the document endpoint.
///
/// # Errors
///
/// Returns an error if a required field is empty or serialization fails.
pub fn to_json_bytes(doc: &OpenApiDocument) -> Result<Vec<u8>> {
    debug!("Serializing OpenAPI document to compact JSON");
    validate(doc)?;
    Ok(serde_json::to_vec(doc)?)
}

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if a required field is empty or serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    validate(doc)?;
    Ok(serde_yaml::to_string(doc)?)
}

/// Writes string content to a file.
///
/// Creates the file and any missing parent directories, or truncates and
/// overwrites the file if it exists.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{Info, OpenApiBuilder, Server};
    use tempfile::TempDir;

    fn document() -> OpenApiDocument {
        OpenApiBuilder::new(Info::new("Test API", "1.0.0"))
            .with_servers(vec![Server::new("https://api.example.com")])
            .build()
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&document()).unwrap();

        assert!(json.contains("\"openapi\": \"3.1.0\""));
        assert!(json.contains("\"title\": \"Test API\""));
        assert!(json.contains("\"paths\": {}"));
        assert!(!json.contains("components"));
        assert!(!json.contains("\"tags\""));
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&document()).unwrap();

        assert!(yaml.starts_with("openapi:"));
        assert!(yaml.contains("3.1.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("url: https://api.example.com"));
    }

    #[test]
    fn test_compact_json_parses_back() {
        let bytes = to_json_bytes(&document()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["info"]["version"], "1.0.0");
        assert_eq!(value["servers"][0]["url"], "https://api.example.com");
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let doc = OpenApiBuilder::new(Info::new("", "1.0.0")).build();

        match serialize_json(&doc) {
            Err(Error::MissingField(fields)) => assert_eq!(fields, vec!["Info.Title"]),
            other => panic!("expected MissingField, got {:?}", other),
        }
        assert!(serialize_yaml(&doc).is_err());
        assert!(to_json_bytes(&doc).is_err());
    }

    #[test]
    fn test_missing_title_and_version() {
        let doc = OpenApiBuilder::new(Info::default()).build();
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("Info.Title"));
        assert!(err.to_string().contains("Info.Version"));
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/openapi.json");

        write_to_file("{}", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        write_to_file("[]", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
