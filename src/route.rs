//! The route tree built up by the registration API.
//!
//! A [`Group`] is an ordered list of entries: middleware, operations, static
//! mounts, tags, defaults and nested groups. Registration order matters: a
//! middleware, tag or defaults entry only affects what comes after it in the
//! same group and in groups nested below it.
//!
//! Contract violations (unknown method, empty path, missing handler) are
//! programming errors and panic immediately at the registration call.

use crate::defaults::Defaults;
use crate::openapi_builder::Tag;
use crate::params::{Parameters, Responses, Status};
use crate::static_files::FileSystem;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type Request = http::Request<Vec<u8>>;
pub type Response = http::Response<Vec<u8>>;

/// Something that turns a request into a response
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(Request) -> Response + Send + Sync,
{
    fn handle(&self, request: Request) -> Response {
        self(request)
    }
}

pub type BoxHandler = Arc<dyn Handler>;

/// Wraps a handler in another handler
pub type Middleware = Arc<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

/// Box any handler
pub fn handler<H: Handler + 'static>(handler: H) -> BoxHandler {
    Arc::new(handler)
}

/// HTTP methods an operation can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    pub fn to_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Trace => http::Method::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let allowed: Vec<&str> = HttpMethod::ALL.iter().map(|m| m.as_str()).collect();
                format!("{} must be one of [{}]", s, allowed.join(", "))
            })
    }
}

/// One operation: method, path template, documentation and handler
#[derive(Clone, Default)]
pub struct Api {
    pub method: String,
    pub path: String,
    pub operation_id: String,
    pub summary: String,
    pub description: String,
    pub parameters: Parameters,
    pub responses: Responses,
    pub handler: Option<BoxHandler>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Api")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation_id", &self.operation_id)
            .field("parameters", &self.parameters)
            .field("responses", &self.responses)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Api {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = operation_id.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn responses(mut self, responses: Responses) -> Self {
        self.responses = responses;
        self
    }

    /// Add an `application/json` response
    pub fn response<T>(mut self, status: impl Into<Status>, value: &T) -> Self
    where
        T: ?Sized + Serialize,
    {
        self.responses = self.responses.with(status, value);
        self
    }

    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }
}

/// A file system mounted under a path prefix
#[derive(Clone, Default)]
pub struct Static {
    pub path_prefix: String,
    pub fs: Option<Arc<dyn FileSystem>>,
    /// Serve the mount root for any path that is not found
    pub spa_mode: bool,
}

impl Static {
    pub fn new<F: FileSystem + 'static>(path_prefix: impl Into<String>, fs: F) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            fs: Some(Arc::new(fs)),
            spa_mode: false,
        }
    }

    pub fn spa_mode(mut self, spa_mode: bool) -> Self {
        self.spa_mode = spa_mode;
        self
    }
}

pub(crate) struct ApiEntry {
    pub method: HttpMethod,
    pub handler: BoxHandler,
    pub api: Api,
}

pub(crate) struct StaticEntry {
    pub path_prefix: String,
    pub fs: Arc<dyn FileSystem>,
    pub spa_mode: bool,
}

pub(crate) enum Route {
    Middleware(Middleware),
    Api(Box<ApiEntry>),
    Static(StaticEntry),
    Tag(Tag),
    Defaults(Box<Defaults>),
    Group(Group),
}

/// An ordered scope of route entries
#[derive(Default)]
pub struct Group {
    routes: Vec<Route>,
}

pub(crate) fn assert_not_empty(name: &str, value: &str) {
    if value.is_empty() {
        panic!("{} must not be empty", name);
    }
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap every handler registered after this point in this scope
    pub fn use_middleware<M>(&mut self, middleware: M)
    where
        M: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
    {
        self.routes.push(Route::Middleware(Arc::new(middleware)));
    }

    pub fn api(&mut self, mut api: Api) {
        let method = match api.method.parse::<HttpMethod>() {
            Ok(method) => method,
            Err(message) => panic!("{}", message),
        };
        assert_not_empty("Api.Path", &api.path);
        let handler = match api.handler.take() {
            Some(handler) => handler,
            None => panic!("Api.Handler must not be empty"),
        };
        self.routes.push(Route::Api(Box::new(ApiEntry {
            method,
            handler,
            api,
        })));
    }

    pub fn static_files(&mut self, mount: Static) {
        assert_not_empty("Static.PathPrefix", &mount.path_prefix);
        let fs = match mount.fs {
            Some(fs) => fs,
            None => panic!("Static.FS must not be empty"),
        };
        self.routes.push(Route::Static(StaticEntry {
            path_prefix: mount.path_prefix,
            fs,
            spa_mode: mount.spa_mode,
        }));
    }

    /// Tag every operation registered after this point in this scope
    pub fn tag(&mut self, tag: Tag) {
        assert_not_empty("Tag.Name", &tag.name);
        self.routes.push(Route::Tag(tag));
    }

    pub fn defaults(&mut self, defaults: Defaults) {
        self.routes.push(Route::Defaults(Box::new(defaults)));
    }

    /// Open a nested scope. It starts with a copy of this scope's middleware,
    /// tags and defaults; nothing declared inside leaks back out.
    pub fn group<F>(&mut self, build: F)
    where
        F: FnOnce(&mut Group),
    {
        let mut group = Group::new();
        build(&mut group);
        self.routes.push(Route::Group(group));
    }

    pub(crate) fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
