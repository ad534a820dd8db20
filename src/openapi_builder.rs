use crate::content_type::ContentType;
use crate::defaults::Defaults;
use crate::route::{Api, HttpMethod};
use crate::router::placeholder;
use crate::sample::SampleValue;
use crate::schema_generator::{Schema, SchemaGenerator};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// OpenAPI version emitted in every document
pub const OPENAPI_VERSION: &str = "3.1.0";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    external_docs: Option<ExternalDocumentation>,
    /// Paths collection (URL path -> PathItem), in registration order
    paths: IndexMap<String, PathItem>,
    /// Every declared tag, in first-declaration order
    tags: IndexMap<String, Tag>,
    schema_gen: SchemaGenerator,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// API version
    pub version: String,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn terms_of_service(mut self, terms_of_service: impl Into<String>) -> Self {
        self.terms_of_service = Some(terms_of_service.into());
        self
    }
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI License object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct License {
    pub name: String,
    /// SPDX license expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalDocumentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// OpenAPI Tag object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// Store `operation` under `method`, replacing any earlier one
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        *self.slot(method) = Some(operation);
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations()
            .into_iter()
            .find(|(m, _)| *m == method)
            .map(|(_, operation)| operation)
    }

    /// Operations in document order
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
        .collect()
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters in path, query, header, cookie order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: OperationResponses,
}

/// Where a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
    pub required: bool,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Responses keyed by `"default"` or a decimal status code. Responses without
/// content are left out when serializing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResponses(pub IndexMap<String, Response>);

impl OperationResponses {
    /// Responses that carry content, in declaration order
    pub fn with_content(&self) -> impl Iterator<Item = (&String, &Response)> {
        self.0.iter().filter(|(_, response)| !response.content.is_empty())
    }
}

impl Serialize for OperationResponses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (status, response) in self.with_content() {
            map.serialize_entry(status, response)?;
        }
        map.end()
    }
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
}

impl OpenApiDocument {
    /// Named schemas, empty when there are none
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.components.iter().flat_map(|c| c.schemas.iter())
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl OpenApiBuilder {
    pub fn new(info: Info) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info,
            servers: Vec::new(),
            external_docs: None,
            paths: IndexMap::new(),
            tags: IndexMap::new(),
            schema_gen: SchemaGenerator::new(),
        }
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    pub fn with_servers(mut self, servers: Vec<Server>) -> Self {
        self.servers = servers;
        self
    }

    pub fn with_external_docs(mut self, external_docs: Option<ExternalDocumentation>) -> Self {
        self.external_docs = external_docs;
        self
    }

    /// Record a tag for the document's tag list. A repeated name keeps its
    /// first position and takes the latest description.
    pub fn add_tag(&mut self, tag: Tag) {
        debug!("Adding tag: {}", tag.name);
        self.tags.insert(tag.name.clone(), tag);
    }

    /// Add an operation, merging in the active defaults and inferring every
    /// schema it carries
    pub fn add_api(&mut self, method: HttpMethod, api: &Api, defaults: &Defaults, tags: &[String]) {
        debug!("Adding route: {} {}", method, api.path);
        let (parameters, responses) = defaults.apply(&api.parameters, &api.responses);
        check_path_params(&api.path, parameters.path.keys());

        let mut operation_params = Vec::new();
        for (name, param) in &parameters.path {
            let parameter = self.parameter(
                name,
                ParameterLocation::Path,
                &param.description,
                true,
                &param.value,
            );
            operation_params.push(parameter);
        }
        for (location, params) in [
            (ParameterLocation::Query, &parameters.query),
            (ParameterLocation::Header, &parameters.header),
            (ParameterLocation::Cookie, &parameters.cookie),
        ] {
            for (name, param) in params {
                let parameter = self.parameter(
                    name,
                    location,
                    &param.description,
                    !param.optional,
                    &param.value,
                );
                operation_params.push(parameter);
            }
        }

        let body = &parameters.body;
        let request_body = if body.is_empty() {
            None
        } else {
            Some(RequestBody {
                description: non_empty(&body.description),
                content: self.media_types(&body.content),
                required: !body.optional,
            })
        };

        let responses = OperationResponses(
            responses
                .iter()
                .map(|(status, content)| {
                    let response = Response {
                        description: status.description(),
                        content: self.media_types(content),
                    };
                    (status.key(), response)
                })
                .collect(),
        );

        let operation = Operation {
            tags: tags.to_vec(),
            summary: non_empty(&api.summary),
            description: non_empty(&api.description),
            operation_id: non_empty(&api.operation_id),
            parameters: operation_params,
            request_body,
            responses,
        };

        self.add_operation(method, &api.path, operation);
    }

    /// Insert an operation under its path; the last operation per method wins
    pub fn add_operation(&mut self, method: HttpMethod, path: &str, operation: Operation) {
        let path_item = self.paths.entry(path.to_string()).or_default();
        if path_item.operation(method).is_some() {
            debug!("Replacing operation {} {}", method, path);
        }
        path_item.set(method, operation);
    }

    fn parameter(
        &mut self,
        name: &str,
        location: ParameterLocation,
        description: &str,
        required: bool,
        value: &SampleValue,
    ) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            description: non_empty(description),
            required,
            schema: self.schema_gen.generate_schema(value),
            example: Some(value.to_json()).filter(|v| !v.is_null()),
        }
    }

    fn media_types(&mut self, content: &ContentType) -> IndexMap<String, MediaType> {
        content
            .iter()
            .map(|(media_type, value)| {
                let media = MediaType {
                    schema: self.schema_gen.generate_schema(value),
                    example: Some(value.to_json()).filter(|v| !v.is_null()),
                };
                (media_type.to_string(), media)
            })
            .collect()
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = self.schema_gen.into_schemas();
        let components = if !schemas.is_empty() {
            Some(Components { schemas })
        } else {
            None
        };

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components,
            tags: self.tags.into_values().collect(),
            external_docs: self.external_docs,
        }
    }
}

/// Warn about `{placeholder}` segments without a declared path parameter and
/// declared path parameters that never appear in the template
fn check_path_params<'a>(path: &str, declared: impl Iterator<Item = &'a String>) {
    let placeholders: Vec<&str> = path.split('/').filter_map(placeholder).collect();
    let declared: Vec<&String> = declared.collect();

    for name in &placeholders {
        if !declared.iter().any(|d| d.as_str() == *name) {
            warn!("Path {} uses {{{}}} but declares no such path parameter", path, name);
        }
    }
    for name in &declared {
        if !placeholders.contains(&name.as_str()) {
            warn!("Path parameter {} is not part of path {}", name, path);
        }
    }
}
