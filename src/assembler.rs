//! Flattens a route tree into router bindings and an OpenAPI document.

use crate::defaults::Defaults;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::route::{BoxHandler, Group, Middleware, Route, StaticEntry};
use crate::router::Router;
use crate::static_files::{file_server, spa_mode, strip_prefix};
use http::Method;
use log::{debug, info};
use std::sync::Arc;

/// Output of [`assemble`]
pub struct Assembled {
    pub router: Router,
    pub document: OpenApiDocument,
}

/// State inherited down the tree; nested groups get their own copy
#[derive(Clone, Default)]
struct Scope {
    middleware: Vec<Middleware>,
    tags: Vec<String>,
    defaults: Defaults,
}

/// Wrap `handler` so the first middleware in `chain` runs first
pub fn compose(chain: &[Middleware], handler: BoxHandler) -> BoxHandler {
    chain
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware(next))
}

/// Walk `root` depth-first, binding every operation and static mount and
/// recording every operation and tag in the document
pub fn assemble(root: &Group, builder: OpenApiBuilder) -> Assembled {
    let mut assembler = Assembler {
        router: Router::new(),
        builder,
        operations: 0,
    };
    assembler.walk(root, Scope::default());
    info!(
        "Assembled {} operations into {} router bindings",
        assembler.operations,
        assembler.router.len()
    );

    Assembled {
        router: assembler.router,
        document: assembler.builder.build(),
    }
}

struct Assembler {
    router: Router,
    builder: OpenApiBuilder,
    operations: usize,
}

impl Assembler {
    fn walk(&mut self, group: &Group, mut scope: Scope) {
        for route in group.routes() {
            match route {
                Route::Middleware(middleware) => scope.middleware.push(Arc::clone(middleware)),
                Route::Tag(tag) => {
                    self.builder.add_tag(tag.clone());
                    if !scope.tags.contains(&tag.name) {
                        scope.tags.push(tag.name.clone());
                    }
                }
                Route::Defaults(defaults) => scope.defaults.merge(defaults),
                Route::Api(entry) => {
                    self.builder
                        .add_api(entry.method, &entry.api, &scope.defaults, &scope.tags);
                    let handler = compose(&scope.middleware, Arc::clone(&entry.handler));
                    self.router
                        .bind(entry.method.to_http(), entry.api.path.clone(), handler);
                    self.operations += 1;
                }
                Route::Static(mount) => self.mount(mount, &scope),
                Route::Group(child) => self.walk(child, scope.clone()),
            }
        }
    }

    fn mount(&mut self, mount: &StaticEntry, scope: &Scope) {
        debug!(
            "Mounting static files at {} (spa mode: {})",
            mount.path_prefix, mount.spa_mode
        );
        let served = compose(&scope.middleware, file_server(Arc::clone(&mount.fs)));
        let mut handler = strip_prefix(mount.path_prefix.clone(), served);
        if mount.spa_mode {
            handler = spa_mode(handler, mount.path_prefix.clone());
        }
        self.router.bind(Method::GET, mount.path_prefix.clone(), handler);
    }
}
