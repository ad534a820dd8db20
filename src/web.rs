//! The registration root.
//!
//! [`Web`] collects document metadata and the root route group. Calling
//! [`Web::server`] consumes it, assembles the router and the OpenAPI document,
//! binds the documentation endpoints and writes the TypeScript client types.

use crate::assembler::assemble;
use crate::defaults::Defaults;
use crate::docs_ui::{ui_handler, UiVariant};
use crate::error::Result;
use crate::openapi_builder::{
    Contact, ExternalDocumentation, Info, License, OpenApiBuilder, OpenApiDocument, Server, Tag,
};
use crate::route::{assert_not_empty, Api, BoxHandler, Group, Handler, Request, Response, Static};
use crate::router::Router;
use crate::serializer::{to_json_bytes, write_to_file};
use crate::typescript;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::Method;
use log::{debug, info};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the OpenAPI document and its documentation page are served
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiConfig {
    pub doc_path: String,
    pub ui_path: String,
    pub ui_variant: UiVariant,
}

impl OpenApiConfig {
    /// Panics if a path is empty or `ui_variant` is not one of redoc, swagger
    /// or scalar
    pub fn new(doc_path: impl Into<String>, ui_path: impl Into<String>, ui_variant: &str) -> Self {
        let doc_path = doc_path.into();
        let ui_path = ui_path.into();
        assert_not_empty("OpenApi.DocPath", &doc_path);
        assert_not_empty("OpenApi.UiPath", &ui_path);
        assert_not_empty("OpenApi.UiVariant", ui_variant);
        let ui_variant = match ui_variant.parse::<UiVariant>() {
            Ok(variant) => variant,
            Err(message) => panic!("OpenApi.UiVariant {}", message),
        };
        Self {
            doc_path,
            ui_path,
            ui_variant,
        }
    }
}

/// Sink for the generated TypeScript
pub enum TypescriptApi {
    /// Created (with parent directories) or truncated
    Path(PathBuf),
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for TypescriptApi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypescriptApi::Path(path) => f.debug_tuple("Path").field(path).finish(),
            TypescriptApi::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl TypescriptApi {
    fn write(self, content: &str) -> Result<()> {
        match self {
            TypescriptApi::Path(path) => write_to_file(content, &path),
            TypescriptApi::Writer(mut writer) => {
                writer.write_all(content.as_bytes())?;
                writer.flush()?;
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct Web {
    info: Info,
    contact: Option<Contact>,
    license: Option<License>,
    external_docs: Option<ExternalDocumentation>,
    servers: Vec<Server>,
    openapi: Option<OpenApiConfig>,
    typescript_api: Option<TypescriptApi>,
    root: Group,
}

impl Web {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if the title or version is empty
    pub fn info(&mut self, info: Info) {
        assert_not_empty("Info.Title", &info.title);
        assert_not_empty("Info.Version", &info.version);
        self.info = info;
    }

    pub fn contact(&mut self, contact: Contact) {
        self.contact = Some(contact);
    }

    pub fn license(&mut self, license: License) {
        self.license = Some(license);
    }

    pub fn external_documentation(&mut self, external_docs: ExternalDocumentation) {
        assert_not_empty("ExternalDocumentation.Url", &external_docs.url);
        self.external_docs = Some(external_docs);
    }

    pub fn add_server(&mut self, server: Server) {
        assert_not_empty("Server.Url", &server.url);
        self.servers.push(server);
    }

    /// Serve the document and a documentation page
    pub fn openapi(&mut self, config: OpenApiConfig) {
        self.openapi = Some(config);
    }

    pub fn use_middleware<M>(&mut self, middleware: M)
    where
        M: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
    {
        self.root.use_middleware(middleware);
    }

    pub fn api(&mut self, api: Api) {
        self.root.api(api);
    }

    pub fn static_files(&mut self, mount: Static) {
        self.root.static_files(mount);
    }

    pub fn tag(&mut self, tag: Tag) {
        self.root.tag(tag);
    }

    pub fn defaults(&mut self, defaults: Defaults) {
        self.root.defaults(defaults);
    }

    pub fn group<F>(&mut self, build: F)
    where
        F: FnOnce(&mut Group),
    {
        self.root.group(build);
    }

    pub fn typescript_api(&mut self, typescript_api: TypescriptApi) {
        self.typescript_api = Some(typescript_api);
    }

    /// Assemble everything registered so far into a servable [`App`].
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing a required field or the
    /// TypeScript sink cannot be written.
    pub fn server(self) -> Result<App> {
        let mut info = self.info;
        info.contact = self.contact;
        info.license = self.license;
        let title = info.title.clone();

        let builder = OpenApiBuilder::new(info)
            .with_servers(self.servers)
            .with_external_docs(self.external_docs);
        let assembled = assemble(&self.root, builder);
        let mut router = assembled.router;
        let document = assembled.document;

        let openapi_json = Arc::new(to_json_bytes(&document)?);

        if let Some(config) = &self.openapi {
            debug!(
                "Serving OpenAPI document at {} and {} UI at {}",
                config.doc_path, config.ui_variant, config.ui_path
            );
            router.bind(
                Method::GET,
                config.doc_path.clone(),
                document_handler(Arc::clone(&openapi_json)),
            );
            router.bind(
                Method::GET,
                config.ui_path.clone(),
                ui_handler(config.ui_variant, &title, &config.doc_path)?,
            );
        }

        if let Some(sink) = self.typescript_api {
            info!("Writing TypeScript client types to {:?}", sink);
            sink.write(&typescript::generate(&document))?;
        }

        Ok(App {
            router,
            document,
            openapi_json,
        })
    }
}

fn document_handler(body: Arc<Vec<u8>>) -> BoxHandler {
    Arc::new(move |_request: Request| -> Response {
        let mut response = Response::new(body.as_ref().clone());
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    })
}

/// An assembled application: the router to hand to a server, plus the
/// document it was described by
pub struct App {
    router: Router,
    document: OpenApiDocument,
    openapi_json: Arc<Vec<u8>>,
}

impl App {
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    /// The compact JSON served at the document path
    pub fn openapi_json(&self) -> &[u8] {
        &self.openapi_json
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl Handler for App {
    fn handle(&self, request: Request) -> Response {
        self.router.handle(request)
    }
}
