use crate::route::{BoxHandler, Handler, Request, Response};
use crate::static_files::text_response;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use indexmap::IndexMap;
use log::debug;

/// One registered `(method, pattern, handler)` triple
#[derive(Clone)]
pub struct RouteBinding {
    pub method: Method,
    pub pattern: String,
    pub handler: BoxHandler,
}

/// Path parameters captured while matching, stored in the request extensions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathParams(IndexMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered route bindings with a small dispatcher.
///
/// Patterns are either templates made of literal and `{name}` segments, or
/// prefixes ending in `/` that match a whole subtree. A later binding for the
/// same method and pattern replaces the earlier one in place.
#[derive(Clone, Default)]
pub struct Router {
    bindings: Vec<RouteBinding>,
}

/// How well a pattern matched; compared to pick the most specific binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Specificity {
    exact: bool,
    literal_segments: usize,
    prefix_len: usize,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, method: Method, pattern: impl Into<String>, handler: BoxHandler) {
        let pattern = pattern.into();
        debug!("Binding {} {}", method, pattern);
        match self
            .bindings
            .iter_mut()
            .find(|b| b.method == method && b.pattern == pattern)
        {
            Some(existing) => existing.handler = handler,
            None => self.bindings.push(RouteBinding {
                method,
                pattern,
                handler,
            }),
        }
    }

    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    pub fn find(&self, method: &Method, pattern: &str) -> Option<&RouteBinding> {
        self.bindings
            .iter()
            .find(|b| b.method == *method && b.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Route a request to the most specific matching binding
    pub fn dispatch(&self, mut request: Request) -> Response {
        let path = request.uri().path().to_string();
        let mut best: Option<(Specificity, &RouteBinding, PathParams)> = None;
        let mut allowed: Vec<&Method> = Vec::new();

        for binding in &self.bindings {
            let Some((specificity, params)) = match_pattern(&binding.pattern, &path) else {
                continue;
            };
            if binding.method != request.method() {
                if !allowed.contains(&&binding.method) {
                    allowed.push(&binding.method);
                }
                continue;
            }
            let better = match &best {
                Some((current, _, _)) => specificity > *current,
                None => true,
            };
            if better {
                best = Some((specificity, binding, params));
            }
        }

        match best {
            Some((_, binding, params)) => {
                request.extensions_mut().insert(params);
                binding.handler.handle(request)
            }
            None if !allowed.is_empty() => {
                let mut response =
                    text_response(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
                let allow: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                if let Ok(value) = HeaderValue::from_str(&allow.join(", ")) {
                    response.headers_mut().insert(ALLOW, value);
                }
                response
            }
            None => text_response(StatusCode::NOT_FOUND, "404 page not found"),
        }
    }
}

impl Handler for Router {
    fn handle(&self, request: Request) -> Response {
        self.dispatch(request)
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<(Specificity, PathParams)> {
    if pattern.ends_with('/') && pattern != path {
        return path.starts_with(pattern).then(|| {
            (
                Specificity {
                    exact: false,
                    literal_segments: 0,
                    prefix_len: pattern.len(),
                },
                PathParams::default(),
            )
        });
    }

    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = PathParams::default();
    let mut literal_segments = 0;
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match placeholder(expected) {
            Some(name) if !actual.is_empty() => {
                params.0.insert(name.to_string(), actual.to_string());
            }
            Some(_) => return None,
            None if expected == actual => literal_segments += 1,
            None => return None,
        }
    }

    Some((
        Specificity {
            exact: true,
            literal_segments,
            prefix_len: pattern.len(),
        },
        params,
    ))
}

/// Name of a `{name}` segment
pub(crate) fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn reply(text: &'static str) -> BoxHandler {
        Arc::new(move |request: Request| {
            let id = request
                .extensions()
                .get::<PathParams>()
                .and_then(|p| p.get("id"))
                .unwrap_or("")
                .to_string();
            Response::new(format!("{}{}", text, id).into_bytes())
        })
    }

    fn send(router: &Router, method: Method, uri: &str) -> Response {
        let request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Vec::new())
            .expect("request");
        router.dispatch(request)
    }

    #[test]
    fn test_last_binding_wins_in_place() {
        let mut router = Router::new();
        router.bind(Method::GET, "/a", reply("first"));
        router.bind(Method::GET, "/b", reply("b"));
        router.bind(Method::GET, "/a", reply("second"));

        assert_eq!(router.len(), 2);
        assert_eq!(router.bindings()[0].pattern, "/a");
        assert_eq!(send(&router, Method::GET, "/a").body(), b"second");
    }

    #[test]
    fn test_placeholders_are_captured() {
        let mut router = Router::new();
        router.bind(Method::GET, "/items/{id}", reply("item:"));

        assert_eq!(send(&router, Method::GET, "/items/42").body(), b"item:42");
        assert_eq!(
            send(&router, Method::GET, "/items/").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_literal_beats_placeholder() {
        let mut router = Router::new();
        router.bind(Method::GET, "/items/{id}", reply("item:"));
        router.bind(Method::GET, "/items/new", reply("new"));

        assert_eq!(send(&router, Method::GET, "/items/new").body(), b"new");
    }

    #[test]
    fn test_subtree_mount_and_longest_prefix() {
        let mut router = Router::new();
        router.bind(Method::GET, "/", reply("root"));
        router.bind(Method::GET, "/static/", reply("static"));
        router.bind(Method::GET, "/docs", reply("docs"));

        assert_eq!(send(&router, Method::GET, "/static/app.js").body(), b"static");
        assert_eq!(send(&router, Method::GET, "/anything").body(), b"root");
        assert_eq!(send(&router, Method::GET, "/docs").body(), b"docs");
    }

    #[test]
    fn test_method_not_allowed() {
        let mut router = Router::new();
        router.bind(Method::GET, "/items", reply("list"));
        router.bind(Method::PUT, "/items", reply("replace"));

        let response = send(&router, Method::DELETE, "/items");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, PUT");
        assert_eq!(
            send(&router, Method::GET, "/missing").status(),
            StatusCode::NOT_FOUND
        );
    }
}
