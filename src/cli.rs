use crate::docs_ui::UiVariant;
use crate::openapi_builder::{Contact, Info, Tag};
use crate::params::{Parameters, PathParam};
use crate::route::{handler, Api, BoxHandler, Handler, Request, Response, Static};
use crate::router::PathParams;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::static_files::DirFileSystem;
use crate::web::{App, OpenApiConfig, TypescriptApi, Web};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;

/// web-openapi demo - Build the demo API and emit its OpenAPI document and TypeScript client types
#[derive(Parser, Debug)]
#[command(name = "web-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Write the TypeScript client types to this file
    #[arg(short = 't', long = "typescript", value_name = "FILE")]
    pub typescript_path: Option<PathBuf>,

    /// Directory served at / in SPA mode
    #[arg(short = 's', long = "static-dir", value_name = "DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Documentation page served at /api/doc
    #[arg(short = 'u', long = "ui", value_enum, default_value = "redoc")]
    pub ui_variant: UiArg,

    /// Dispatch a GET request for this path against the assembled router and print the response
    #[arg(short = 'g', long = "get", value_name = "PATH")]
    pub get: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Documentation page options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UiArg {
    Redoc,
    Swagger,
    Scalar,
}

impl From<UiArg> for UiVariant {
    fn from(arg: UiArg) -> Self {
        match arg {
            UiArg::Redoc => UiVariant::Redoc,
            UiArg::Swagger => UiVariant::Swagger,
            UiArg::Scalar => UiVariant::Scalar,
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    for path in &args.get {
        if !path.starts_with('/') {
            anyhow::bail!("Request path must start with '/': {}", path);
        }
    }

    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref typescript) = args.typescript_path {
        info!("TypeScript file: {}", typescript.display());
    }
    info!("Static directory: {}", args.static_dir.display());

    Ok(args)
}

#[derive(Serialize)]
struct ResponseTest {
    say: String,
}

fn json_response<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(body);
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            log::error!("Failed to encode response: {}", err);
            let mut response = Response::new(Vec::new());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn say_hello(request: Request) -> Response {
    let name = request
        .extensions()
        .get::<PathParams>()
        .and_then(|params| params.get("name"))
        .unwrap_or("world");
    json_response(&ResponseTest {
        say: format!("Hello {}", name),
    })
}

fn test(_request: Request) -> Response {
    json_response(&ResponseTest {
        say: "Hello world".to_string(),
    })
}

fn log_requests(next: BoxHandler) -> BoxHandler {
    handler(move |request: Request| {
        info!("{} {}", request.method(), request.uri());
        next.handle(request)
    })
}

/// The demo API: two greeting operations tagged `demo` and a single page app
/// served from `static_dir`
pub fn demo_web(args: &CliArgs) -> Web {
    let mut web = Web::new();

    web.info(Info::new("Demo", "0.0.1"));
    web.contact(Contact::default());
    web.openapi(OpenApiConfig::new(
        "/api/doc.json",
        "/api/doc",
        UiVariant::from(args.ui_variant).as_str(),
    ));

    web.tag(Tag::new("demo").description("demodescription"));
    web.use_middleware(log_requests);

    web.group(|group| {
        group.use_middleware(|next: BoxHandler| -> BoxHandler {
            handler(move |request: Request| {
                debug!("in group");
                next.handle(request)
            })
        });
    });

    let example = ResponseTest {
        say: "Hello world".to_string(),
    };
    web.api(
        Api::new("GET", "/test/{name}")
            .description("Say hello to someone")
            .parameters(Parameters::new().path(
                "name",
                PathParam::new(&"world").description("The name to say hello to"),
            ))
            .response(StatusCode::OK, &example)
            .handler(say_hello),
    );
    web.api(
        Api::new("GET", "/test")
            .response(StatusCode::OK, &example)
            .handler(test),
    );

    web.static_files(Static::new("/", DirFileSystem::new(&args.static_dir)).spa_mode(true));

    if let Some(path) = &args.typescript_path {
        web.typescript_api(TypescriptApi::Path(path.clone()));
    }

    web
}

fn print_response(app: &App, path: &str) -> Result<()> {
    let request = http::Request::builder()
        .uri(path)
        .body(Vec::new())
        .with_context(|| format!("Invalid request path: {}", path))?;
    let response = app.handle(request);
    println!("GET {} -> {}", path, response.status());
    println!("{}", String::from_utf8_lossy(response.body()));
    Ok(())
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Building demo API...");
    let web = demo_web(&args);

    info!("Assembling router and OpenAPI document...");
    let app = web
        .server()
        .context("Failed to assemble the demo API")?;
    info!("OpenAPI document built successfully");

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(app.document())?,
        OutputFormat::Json => serialize_json(app.document())?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    for path in &args.get {
        print_response(&app, path)?;
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Paths: {}", app.document().paths.len());
    info!("  - Schemas: {}", app.document().schemas().count());
    info!("  - Router bindings: {}", app.router().len());

    Ok(())
}
