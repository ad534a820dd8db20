//! web-openapi - Declarative HTTP API definitions with a derived OpenAPI 3.1 document.
//!
//! Routes are registered through a fluent builder together with *sample values*
//! for their parameters, request bodies and responses. From that one
//! registration the library produces a dispatchable router, an OpenAPI 3.1
//! document and TypeScript client types.
//!
//! # Architecture
//!
//! 1. [`sample`] - Turns any `serde::Serialize` value into a [`SampleValue`]
//! 2. [`schema_generator`] - Infers a schema from a sample value
//! 3. [`components`] - Moves named schemas into `#/components/schemas`
//! 4. [`route`] / [`params`] / [`defaults`] - The route tree and its declarations
//! 5. [`assembler`] - Walks the tree into [`router`] bindings and an [`openapi_builder`] document
//! 6. [`serializer`] - Renders the document as JSON or YAML
//! 7. [`typescript`] - Renders the document as TypeScript client types
//! 8. [`web`] - The registration root tying it all together
//!
//! # Example Usage
//!
//! ```
//! use http::StatusCode;
//! use serde::Serialize;
//! use web_openapi::{Api, Handler, Info, Parameters, PathParam, Request, Response, Web};
//!
//! #[derive(Serialize)]
//! struct Pet {
//!     id: u64,
//!     name: String,
//! }
//!
//! let mut web = Web::new();
//! web.info(Info::new("Pets", "1.0.0"));
//! web.api(
//!     Api::new("GET", "/pets/{id}")
//!         .parameters(Parameters::new().path("id", PathParam::new(&7)))
//!         .response(StatusCode::OK, &Pet { id: 7, name: "Rex".to_string() })
//!         .handler(|_request: Request| Response::new(b"{}".to_vec())),
//! );
//!
//! let app = web.server().unwrap();
//! assert!(app.document().schemas().any(|(name, _)| name == "Pet"));
//!
//! let request = http::Request::builder().uri("/pets/7").body(Vec::new()).unwrap();
//! assert_eq!(app.handle(request).status(), StatusCode::OK);
//! ```
//!
//! # Command-Line Interface
//!
//! The [`cli`] module builds a small demo API and prints its document.

pub mod assembler;
pub mod cli;
pub mod components;
pub mod content_type;
pub mod defaults;
pub mod docs_ui;
pub mod error;
pub mod openapi_builder;
pub mod params;
pub mod route;
pub mod router;
pub mod sample;
pub mod schema_generator;
pub mod serializer;
pub mod static_files;
pub mod typescript;
pub mod web;

pub use content_type::{mime, ContentType};
pub use defaults::Defaults;
pub use docs_ui::UiVariant;
pub use error::{Error, Result};
pub use openapi_builder::{Contact, ExternalDocumentation, Info, License, Server, Tag};
pub use params::{Body, Param, Parameters, PathParam, Responses, Status};
pub use route::{Api, BoxHandler, Group, Handler, HttpMethod, Request, Response, Static};
pub use router::{PathParams, Router};
pub use sample::SampleValue;
pub use static_files::{DirFileSystem, FileSystem, MemoryFileSystem};
pub use web::{App, OpenApiConfig, TypescriptApi, Web};
