//! Static file mounts: file systems, a file-serving handler and the wrappers
//! used to mount it under a prefix.

use crate::route::{BoxHandler, Handler, Request, Response};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{StatusCode, Uri};
use indexmap::IndexMap;
use log::{debug, warn};
use mime_guess::mime;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Read-only source of files addressed by slash separated paths
pub trait FileSystem: Send + Sync {
    /// Read the file at `path` (relative, no leading slash). Missing files
    /// must be reported as `io::ErrorKind::NotFound`.
    fn open(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Files below a directory on disk
pub struct DirFileSystem {
    base_dir: PathBuf,
}

impl DirFileSystem {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }
}

impl FileSystem for DirFileSystem {
    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = self
            .map_path(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        fs::read(&path)
    }
}

/// Files held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: IndexMap<String, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .insert(path.trim_start_matches('/').to_string(), contents.into());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }
}

/// Content type guessed from the file extension; text types are served as UTF-8
pub(crate) fn content_type(path: &str) -> HeaderValue {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    let value = if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", guess)
    } else {
        guess.to_string()
    };
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

pub(crate) fn text_response(status: StatusCode, body: &str) -> Response {
    let mut response = Response::new(body.as_bytes().to_vec());
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Serve files from `fs` by request path; directories serve their `index.html`
pub fn file_server(fs: Arc<dyn FileSystem>) -> BoxHandler {
    Arc::new(move |request: Request| -> Response {
        let mut path = request.uri().path().trim_start_matches('/').to_string();
        if path.is_empty() || path.ends_with('/') {
            path.push_str("index.html");
        }

        match fs.open(&path) {
            Ok(bytes) => {
                let mut response = Response::new(bytes);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, content_type(&path));
                response
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("Static file not found: {}", path);
                text_response(StatusCode::NOT_FOUND, "404 page not found")
            }
            Err(err) => {
                warn!("Failed to read static file {}: {}", path, err);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error")
            }
        }
    })
}

/// Remove `prefix` from the request path before calling `inner`; requests
/// outside the prefix get a 404
pub fn strip_prefix(prefix: impl Into<String>, inner: BoxHandler) -> BoxHandler {
    let prefix = prefix.into();
    Arc::new(move |mut request: Request| -> Response {
        let rest = match request.uri().path().strip_prefix(prefix.as_str()) {
            Some(rest) => rest,
            None => return text_response(StatusCode::NOT_FOUND, "404 page not found"),
        };
        let mut target = format!("/{}", rest.trim_start_matches('/'));
        if let Some(query) = request.uri().query() {
            target.push('?');
            target.push_str(query);
        }
        match target.parse::<Uri>() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(_) => return text_response(StatusCode::BAD_REQUEST, "400 bad request"),
        }
        inner.handle(request)
    })
}

/// Single page application mode: a 404 from `inner` is discarded and the
/// request is replayed once against `root`, served as HTML
pub fn spa_mode(inner: BoxHandler, root: impl Into<String>) -> BoxHandler {
    let root = root.into();
    Arc::new(move |request: Request| -> Response {
        let method = request.method().clone();
        let headers = request.headers().clone();
        let version = request.version();

        let response = inner.handle(request);
        if response.status() != StatusCode::NOT_FOUND {
            return response;
        }

        debug!("SPA fallback to {}", root);
        let mut retry = Request::new(Vec::new());
        *retry.method_mut() = method;
        *retry.headers_mut() = headers;
        *retry.version_mut() = version;
        match root.parse::<Uri>() {
            Ok(uri) => *retry.uri_mut() = uri,
            Err(_) => return text_response(StatusCode::NOT_FOUND, ""),
        }

        let mut response = inner.handle(retry);
        if response.status() == StatusCode::NOT_FOUND {
            response.body_mut().clear();
        }
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    })
}
