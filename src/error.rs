/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
///
/// Builder-time contract violations (bad method, empty path, missing handler) are
/// programming errors and panic at the call site. Everything that can fail after
/// the builder phase is reported through this type instead.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// Root fields the OpenAPI specification marks as REQUIRED were empty at
    /// serialization time (e.g. `Info.Title`).
    MissingField(Vec<String>),
    SerializationError(String),
    /// A documentation page template failed to render
    TemplateError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::MissingField(fields) => {
                let messages: Vec<String> = fields
                    .iter()
                    .map(|field| format!("OpenAPI Specification v3.1.0: {} is REQUIRED", field))
                    .collect();
                write!(f, "{}", messages.join("; "))
            }
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::TemplateError(msg) => write!(f, "Template error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}

impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        Error::TemplateError(err.to_string())
    }
}
