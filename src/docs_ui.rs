use crate::error::Result;
use crate::route::{BoxHandler, Request, Response};
use askama::Template;
use http::header::{HeaderValue, CONTENT_TYPE};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which documentation page to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiVariant {
    Redoc,
    Swagger,
    #[default]
    Scalar,
}

#[derive(Template)]
#[template(path = "docs/redoc.html")]
struct RedocPage<'a> {
    title: &'a str,
    doc_url: &'a str,
    icon: &'a str,
}

#[derive(Template)]
#[template(path = "docs/swagger.html")]
struct SwaggerPage<'a> {
    title: &'a str,
    doc_url: &'a str,
    icon: &'a str,
}

#[derive(Template)]
#[template(path = "docs/scalar.html")]
struct ScalarPage<'a> {
    title: &'a str,
    doc_url: &'a str,
    icon: &'a str,
}

impl UiVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiVariant::Redoc => "redoc",
            UiVariant::Swagger => "swagger",
            UiVariant::Scalar => "scalar",
        }
    }

    /// The full HTML page for this variant
    ///
    /// # Errors
    ///
    /// Returns an error if the page template fails to render.
    pub fn render(&self, title: &str, doc_url: &str) -> Result<String> {
        let page = match self {
            UiVariant::Redoc => RedocPage {
                title,
                doc_url,
                icon: ICON,
            }
            .render(),
            UiVariant::Swagger => SwaggerPage {
                title,
                doc_url,
                icon: ICON,
            }
            .render(),
            UiVariant::Scalar => ScalarPage {
                title,
                doc_url,
                icon: ICON,
            }
            .render(),
        };
        Ok(page?)
    }
}

impl fmt::Display for UiVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redoc" => Ok(UiVariant::Redoc),
            "swagger" => Ok(UiVariant::Swagger),
            "scalar" => Ok(UiVariant::Scalar),
            _ => Err(format!("{} must be one of [redoc, swagger, scalar]", s)),
        }
    }
}

/// Handler serving the rendered page as `text/html`
///
/// # Errors
///
/// Returns an error if the page template fails to render.
pub fn ui_handler(variant: UiVariant, title: &str, doc_url: &str) -> Result<BoxHandler> {
    let page = Arc::new(variant.render(title, doc_url)?.into_bytes());
    Ok(Arc::new(move |_request: Request| -> Response {
        let mut response = Response::new(page.as_ref().clone());
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    }))
}

const ICON: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSIyNCIgaGVpZ2h0PSIyNCIgdmlld0JveD0iMCAwIDI0IDI0IiBmaWxsPSJub25lIiBjb2xvcj0icmdiKDUyIDIxMSAxNTMpIiBzdHJva2U9ImN1cnJlbnRDb2xvciIgc3Ryb2tlLXdpZHRoPSIyIiBzdHJva2UtbGluZWNhcD0icm91bmQiIHN0cm9rZS1saW5lam9pbj0icm91bmQiIGNsYXNzPSJsdWNpZGUgbHVjaWRlLXdlYmhvb2sgaC02IHctNiBtci0yIHRleHQtZW1lcmFsZC00MDAiPjxwYXRoIGQ9Ik0xOCAxNi45OGgtNS45OWMtMS4xIDAtMS45NS45NC0yLjQ4IDEuOUE0IDQgMCAwIDEgMiAxN2MuMDEtLjcuMi0xLjQuNTctMiI+PC9wYXRoPjxwYXRoIGQ9Im02IDE3IDMuMTMtNS43OGMuNTMtLjk3LjEtMi4xOC0uNS0zLjFhNCA0IDAgMSAxIDYuODktNC4wNiI+PC9wYXRoPjxwYXRoIGQ9Im0xMiA2IDMuMTMgNS43M0MxNS42NiAxMi43IDE2LjkgMTMgMTggMTNhNCA0IDAgMCAxIDAgOCI+PC9wYXRoPjwvc3ZnPg==";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Handler;

    #[test]
    fn test_variant_parse_is_case_insensitive() {
        assert_eq!("ReDoc".parse::<UiVariant>(), Ok(UiVariant::Redoc));
        assert_eq!("SWAGGER".parse::<UiVariant>(), Ok(UiVariant::Swagger));
        assert_eq!("scalar".parse::<UiVariant>(), Ok(UiVariant::Scalar));
        assert!("rapidoc".parse::<UiVariant>().is_err());
        assert_eq!(UiVariant::default(), UiVariant::Scalar);
    }

    #[test]
    fn test_render_fills_title_and_url() {
        for variant in [UiVariant::Redoc, UiVariant::Swagger, UiVariant::Scalar] {
            let page = variant.render("Pet <Store>", "/openapi.json").unwrap();
            assert!(page.contains("<title>Pet &lt;Store&gt;</title>"), "{}", variant);
            assert!(page.contains("/openapi.json"), "{}", variant);
            assert!(page.contains("data:image/svg+xml;base64,"), "{}", variant);
            assert!(!page.contains("{{"), "{}", variant);
        }
    }

    #[test]
    fn test_ui_handler_serves_html() {
        let handler = ui_handler(UiVariant::Scalar, "Docs", "/doc.json").unwrap();
        let response = handler.handle(Request::new(Vec::new()));

        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        let body = String::from_utf8(response.into_body()).unwrap();
        assert!(body.contains("@scalar/api-reference"));
        assert!(body.contains("data-url=\"/doc.json\""));
    }
}
