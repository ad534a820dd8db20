use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use web_openapi::{
    assembler::assemble,
    openapi_builder::OpenApiBuilder,
    schema_generator::{infer, Schema, SchemaGenerator, SchemaType},
    serializer::{serialize_json, serialize_yaml, write_to_file},
    typescript, Api, Defaults, Group, Handler, Info, MemoryFileSystem, OpenApiConfig, Param,
    Parameters, PathParam, Request, Response, SampleValue, Static, Tag, TypescriptApi, Web,
};

#[derive(Serialize)]
struct ResponseTest {
    #[serde(rename = "Say")]
    say: String,
}

#[derive(Serialize)]
struct Profile {
    id: u64,
    name: String,
    nickname: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    roles: Vec<String>,
    #[serde(skip)]
    #[allow(dead_code)]
    password: String,
}

fn profile() -> Profile {
    Profile {
        id: 7,
        name: "Ada".to_string(),
        nickname: None,
        roles: Vec::new(),
        password: "secret".to_string(),
    }
}

fn ok(_request: Request) -> Response {
    Response::new(b"ok".to_vec())
}

fn get(handler: &dyn Handler, uri: &str) -> Response {
    let request = http::Request::builder()
        .uri(uri)
        .body(Vec::new())
        .expect("Failed to build request");
    handler.handle(request)
}

fn assembled(root: &Group) -> web_openapi::assembler::Assembled {
    assemble(root, OpenApiBuilder::new(Info::new("Test", "1.0.0")))
}

#[test]
fn test_required_counts_follow_optional_fields() {
    let schema = infer(&SampleValue::of(&profile()));

    let properties = schema.properties.as_ref().expect("record should have properties");
    let names: Vec<&String> = properties.keys().collect();
    assert_eq!(names, vec!["id", "name", "nickname", "roles"]);
    assert_eq!(
        schema.required,
        Some(vec!["id".to_string(), "name".to_string()])
    );
    assert_eq!(properties["nickname"].schema_type, Some(SchemaType::Null));
    assert_eq!(properties["roles"], Schema::any());
}

#[test]
fn test_same_named_type_is_registered_once() {
    let mut generator = SchemaGenerator::new();
    let first = generator.generate_schema(&SampleValue::of(&profile()));
    let second = generator.generate_schema(&SampleValue::of(&profile()));

    assert_eq!(first, Schema::reference_to("Profile"));
    assert_eq!(second, Schema::reference_to("Profile"));
    assert_eq!(generator.get_schemas().len(), 1);
}

#[test]
fn test_skip_if_field_is_optional_across_samples() {
    let mut generator = SchemaGenerator::new();
    generator.generate_schema(&SampleValue::of(&profile()));
    let mut admin = profile();
    admin.roles = vec!["admin".to_string()];
    generator.generate_schema(&SampleValue::of(&admin));

    let stored = &generator.get_schemas()["Profile"];
    assert_eq!(
        stored.required,
        Some(vec!["id".to_string(), "name".to_string()])
    );
    let roles = &stored.properties.as_ref().unwrap()["roles"];
    assert_eq!(roles.schema_type, Some(SchemaType::Array));
}

#[test]
fn test_empty_sequence_is_an_open_array() {
    let empty: Vec<Profile> = Vec::new();
    let schema = infer(&SampleValue::of(&empty));

    assert_eq!(schema.schema_type, Some(SchemaType::Array));
    assert_eq!(schema.items.as_deref(), Some(&Schema::any()));
}

#[test]
fn test_reference_serializes_alone() {
    let mut schema = infer(&SampleValue::of(&profile()));
    schema.reference = Some("#/components/schemas/Profile".to_string());

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({"$ref": "#/components/schemas/Profile"})
    );
}

#[test]
fn test_paths_iterate_in_registration_order() {
    let mut root = Group::new();
    root.api(Api::new("GET", "/b").handler(ok));
    root.api(Api::new("POST", "/a").handler(ok));
    root.api(Api::new("GET", "/c").handler(ok));

    let document = assembled(&root).document;
    let paths: Vec<&String> = document.paths.keys().collect();
    assert_eq!(paths, vec!["/b", "/a", "/c"]);

    let json = serialize_json(&document).unwrap();
    let b = json.find("\"/b\"").unwrap();
    let a = json.find("\"/a\"").unwrap();
    assert!(b < a);
}

#[test]
fn test_tag_in_nested_group_does_not_reach_earlier_sibling() {
    let mut root = Group::new();
    root.group(|sibling| {
        sibling.api(Api::new("GET", "/sibling").handler(ok));
    });
    root.group(|tagged| {
        tagged.tag(Tag::new("x"));
        tagged.api(Api::new("GET", "/tagged").handler(ok));
    });

    let document = assembled(&root).document;
    let sibling = document.paths["/sibling"].get.as_ref().unwrap();
    let tagged = document.paths["/tagged"].get.as_ref().unwrap();
    assert!(sibling.tags.is_empty());
    assert_eq!(tagged.tags, vec!["x"]);
}

#[test]
fn test_root_query_default_reaches_nested_group() {
    let mut root = Group::new();
    root.defaults(Defaults::new().query("q", Param::optional(&"all").description("filter")));
    root.group(|nested| {
        nested.api(Api::new("GET", "/plain").handler(ok));
        nested.api(
            Api::new("GET", "/own")
                .parameters(Parameters::new().query("q", Param::new(&10)))
                .handler(ok),
        );
    });

    let document = assembled(&root).document;
    let plain = &document.paths["/plain"].get.as_ref().unwrap().parameters;
    assert_eq!(plain.len(), 1);
    assert_eq!(plain[0].description.as_deref(), Some("filter"));
    assert_eq!(plain[0].schema.schema_type, Some(SchemaType::String));

    let own = &document.paths["/own"].get.as_ref().unwrap().parameters;
    assert_eq!(own.len(), 1);
    assert!(own[0].required);
    assert_eq!(own[0].description, None);
    assert_eq!(own[0].schema.schema_type, Some(SchemaType::Integer));
}

#[test]
fn test_items_scenario() {
    let mut root = Group::new();
    root.api(
        Api::new("GET", "/items/{id}")
            .parameters(Parameters::new().path("id", PathParam::new(&"42")))
            .response(
                StatusCode::OK,
                &ResponseTest {
                    say: "ok".to_string(),
                },
            )
            .handler(|request: Request| {
                let id = request
                    .extensions()
                    .get::<web_openapi::PathParams>()
                    .and_then(|params| params.get("id"))
                    .unwrap_or_default()
                    .to_string();
                Response::new(id.into_bytes())
            }),
    );

    let assembled = assembled(&root);
    assert!(assembled.router.find(&Method::GET, "/items/{id}").is_some());
    assert_eq!(get(&assembled.router, "/items/42").body(), b"42");

    let value = serde_json::to_value(&assembled.document).unwrap();
    let operation = &value["paths"]["/items/{id}"]["get"];
    assert_eq!(
        operation["parameters"],
        json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": {"type": "string", "example": "42"},
            "example": "42"
        }])
    );
    assert_eq!(
        operation["responses"]["200"],
        json!({
            "description": "OK",
            "content": {
                "application/json": {
                    "schema": {"$ref": "#/components/schemas/ResponseTest"},
                    "example": {"Say": "ok"}
                }
            }
        })
    );
    assert_eq!(
        value["components"]["schemas"]["ResponseTest"]["properties"]["Say"]["type"],
        "string"
    );
}

#[test]
fn test_shared_named_type_across_operations() {
    let mut root = Group::new();
    root.api(Api::new("GET", "/me").response(StatusCode::OK, &profile()).handler(ok));
    root.api(
        Api::new("GET", "/users/{id}")
            .parameters(Parameters::new().path("id", PathParam::new(&7)))
            .response(StatusCode::OK, &profile())
            .handler(ok),
    );

    let document = assembled(&root).document;
    let schemas: Vec<&String> = document.schemas().map(|(name, _)| name).collect();
    assert_eq!(schemas, vec!["Profile"]);
    for path in ["/me", "/users/{id}"] {
        let response = &document.paths[path].get.as_ref().unwrap().responses.0["200"];
        assert_eq!(
            response.content["application/json"].schema,
            Schema::reference_to("Profile")
        );
    }
}

#[test]
fn test_spa_mount_retries_unknown_paths_against_root() {
    let opened = Arc::new(Mutex::new(Vec::new()));
    let mut root = Group::new();
    {
        let opened = Arc::clone(&opened);
        root.use_middleware(move |next: web_openapi::BoxHandler| -> web_openapi::BoxHandler {
            let opened = Arc::clone(&opened);
            Arc::new(move |request: Request| {
                opened.lock().unwrap().push(request.uri().path().to_string());
                next.handle(request)
            })
        });
    }
    root.static_files(
        Static::new(
            "/",
            MemoryFileSystem::new()
                .with_file("index.html", "<html>app</html>")
                .with_file("app.js", "console.log(1)"),
        )
        .spa_mode(true),
    );

    let router = assembled(&root).router;

    let asset = get(&router, "/app.js");
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(asset.body(), b"console.log(1)");

    let fallback = get(&router, "/settings/profile");
    assert_eq!(fallback.status(), StatusCode::OK);
    assert_eq!(fallback.body(), b"<html>app</html>");
    assert_eq!(
        fallback.headers()[http::header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(
        *opened.lock().unwrap(),
        vec!["/app.js", "/settings/profile", "/"]
    );
}

#[test]
fn test_invalid_method_panics_before_binding() {
    let result = std::panic::catch_unwind(|| {
        let mut root = Group::new();
        root.api(Api::new("FOOBAR", "/x").handler(ok));
        root
    });

    let message = result.err().and_then(|panic| {
        panic
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
    });
    assert_eq!(
        message.as_deref(),
        Some("FOOBAR must be one of [GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS, TRACE]")
    );
}

#[test]
fn test_lowercase_method_is_accepted() {
    let mut root = Group::new();
    root.api(Api::new("post", "/items").handler(ok));

    let assembled = assembled(&root);
    assert!(assembled.router.find(&Method::POST, "/items").is_some());
    assert!(assembled.document.paths["/items"].post.is_some());
}

#[test]
fn test_web_end_to_end_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let ts_path = temp_dir.path().join("web/api.ts");

    let mut web = Web::new();
    web.info(Info::new("Shop", "2.0.0"));
    web.openapi(OpenApiConfig::new("/api/doc.json", "/api/doc", "scalar"));
    web.tag(Tag::new("shop").description("Shop endpoints"));
    web.api(
        Api::new("GET", "/profiles/{id}")
            .parameters(Parameters::new().path("id", PathParam::new(&7)))
            .response(StatusCode::OK, &profile())
            .handler(ok),
    );
    web.typescript_api(TypescriptApi::Path(ts_path.clone()));
    let app = web.server().unwrap();

    let served = get(&app, "/api/doc.json");
    let value: serde_json::Value = serde_json::from_slice(served.body()).unwrap();
    assert_eq!(value["tags"], json!([{"name": "shop", "description": "Shop endpoints"}]));
    assert_eq!(
        value["paths"]["/profiles/{id}"]["get"]["tags"],
        json!(["shop"])
    );

    let json_path = temp_dir.path().join("out/openapi.json");
    write_to_file(&serialize_json(app.document()).unwrap(), &json_path).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(written, value);

    let yaml = serialize_yaml(app.document()).unwrap();
    assert!(yaml.contains("/profiles/{id}"));
    assert!(yaml.contains("#/components/schemas/Profile"));

    let ts = std::fs::read_to_string(&ts_path).unwrap();
    assert_eq!(ts, typescript::generate(app.document()));
    let expected_type = "export type Profile = {
\tid: number;
\tname: string;
\tnickname?: null;
\troles?: any;
};
";
    assert!(ts.contains(expected_type), "{}", ts);
}
