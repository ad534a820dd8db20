//! Request parameter and response declarations attached to an operation.

use crate::content_type::ContentType;
use crate::sample::SampleValue;
use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;

/// A path parameter; always required
#[derive(Debug, Clone, PartialEq)]
pub struct PathParam {
    pub description: String,
    pub value: SampleValue,
}

impl PathParam {
    pub fn new<T>(value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        Self {
            description: String::new(),
            value: SampleValue::of(value),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A query, header or cookie parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub optional: bool,
    pub description: String,
    pub value: SampleValue,
}

impl Param {
    /// A required parameter
    pub fn new<T>(value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        Self {
            optional: false,
            description: String::new(),
            value: SampleValue::of(value),
        }
    }

    pub fn optional<T>(value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        Self {
            optional: true,
            ..Self::new(value)
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

pub type Path = IndexMap<String, PathParam>;
pub type Query = IndexMap<String, Param>;
pub type Header = IndexMap<String, Param>;
pub type Cookie = IndexMap<String, Param>;

/// Request body declaration. An empty `content` means "no body".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub description: String,
    pub optional: bool,
    pub content: ContentType,
}

impl Body {
    /// A required `application/json` body
    pub fn new<T>(value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        Self::with_content(ContentType::json(value))
    }

    pub fn with_content(content: ContentType) -> Self {
        Self {
            description: String::new(),
            optional: false,
            content,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Overwrite description and content with the other body's where those
    /// are non-empty
    pub fn overlay(&mut self, other: &Body) {
        if !other.description.is_empty() {
            self.description = other.description.clone();
        }
        if !other.content.is_empty() {
            self.content = other.content.clone();
            self.optional = other.optional;
        }
    }
}

/// All request inputs of an operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub path: Path,
    pub query: Query,
    pub header: Header,
    pub cookie: Cookie,
    pub body: Body,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: impl Into<String>, param: PathParam) -> Self {
        self.path.insert(name.into(), param);
        self
    }

    pub fn query(mut self, name: impl Into<String>, param: Param) -> Self {
        self.query.insert(name.into(), param);
        self
    }

    pub fn header(mut self, name: impl Into<String>, param: Param) -> Self {
        self.header.insert(name.into(), param);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, param: Param) -> Self {
        self.cookie.insert(name.into(), param);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

/// Response key: a concrete status code or the catch-all `default`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Default,
    Code(u16),
}

impl Status {
    /// Key used in the OpenAPI `responses` object
    pub fn key(&self) -> String {
        match self {
            Status::Default => "default".to_string(),
            Status::Code(code) => code.to_string(),
        }
    }

    /// Human readable description, the canonical reason phrase when known
    pub fn description(&self) -> String {
        match self {
            Status::Default => "Default".to_string(),
            Status::Code(code) => StatusCode::from_u16(*code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Status {}", code)),
        }
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        Status::Code(code)
    }
}

impl From<StatusCode> for Status {
    fn from(status: StatusCode) -> Self {
        Status::Code(status.as_u16())
    }
}

/// Response declarations keyed by status, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses {
    entries: IndexMap<Status, ContentType>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an `application/json` response
    pub fn with<T>(self, status: impl Into<Status>, value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        self.with_content(status, ContentType::json(value))
    }

    pub fn with_content(mut self, status: impl Into<Status>, content: ContentType) -> Self {
        self.set(status, content);
        self
    }

    pub fn set(&mut self, status: impl Into<Status>, content: ContentType) {
        self.entries.insert(status.into(), content);
    }

    pub fn get(&self, status: impl Into<Status>) -> Option<&ContentType> {
        self.entries.get(&status.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Status, &ContentType)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Status-wise merge; the other side wins on conflict
    pub fn merge(&mut self, other: &Responses) {
        for (status, content) in &other.entries {
            self.entries.insert(*status, content.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::mime;

    #[test]
    fn test_param_constructors() {
        let required = Param::new(&"x").description("search term");
        assert!(!required.optional);
        assert_eq!(required.description, "search term");

        let optional = Param::optional(&10);
        assert!(optional.optional);
    }

    #[test]
    fn test_status_keys_and_descriptions() {
        assert_eq!(Status::Default.key(), "default");
        assert_eq!(Status::from(StatusCode::NOT_FOUND).key(), "404");
        assert_eq!(Status::Code(200).description(), "OK");
        assert_eq!(Status::Default.description(), "Default");
        assert_eq!(Status::Code(599).description(), "Status 599");
    }

    #[test]
    fn test_responses_merge_status_wise() {
        let mut base = Responses::new()
            .with(StatusCode::OK, &"base")
            .with(StatusCode::INTERNAL_SERVER_ERROR, &"error");
        let entry = Responses::new().with(StatusCode::OK, &"entry");
        base.merge(&entry);

        assert_eq!(base.len(), 2);
        assert_eq!(
            base.get(StatusCode::OK).and_then(|c| c.get(mime::APPLICATION_JSON)),
            Some(&SampleValue::Text("entry".to_string()))
        );
        assert!(base.get(StatusCode::INTERNAL_SERVER_ERROR).is_some());
    }

    #[test]
    fn test_body_overlay_skips_empty_fields() {
        let mut body = Body::new(&1).description("base");
        body.overlay(&Body::default().description("override"));

        assert_eq!(body.description, "override");
        assert_eq!(body.content, ContentType::json(&1));

        body.overlay(&Body::new(&"text").optional());
        assert!(body.optional);
        assert_eq!(body.description, "override");
    }
}
