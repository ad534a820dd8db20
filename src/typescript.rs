//! TypeScript client types generated from an OpenAPI document.
//!
//! The output has four parts: a generated-code header, an `Api` interface with
//! one call signature per operation, a type alias per component schema, and a
//! small `fetch` based `createClient` factory implementing that interface.

use crate::openapi_builder::{OpenApiDocument, Operation, ParameterLocation};
use crate::schema_generator::{Schema, SchemaType};
use indexmap::IndexMap;
use log::debug;

const MARKER: &str = "%REMOVEME%";

const HEADER: &str = "Code generated by web-openapi. DO NOT EDIT.";

/// Render the TypeScript module for `doc`
pub fn generate(doc: &OpenApiDocument) -> String {
    debug!("Generating TypeScript client types");
    let mut t = TsWriter::default();
    t.comment(HEADER).newline();
    if !doc.info.title.is_empty() {
        t.doc(&[format!("{} {}", doc.info.title, doc.info.version)]);
    }

    if !doc.paths.is_empty() {
        t.s("export interface Api ").scope(|t| {
            for (path, item) in &doc.paths {
                for (method, operation) in item.operations() {
                    t.indent()
                        .parens(|t| {
                            t.s("api").colon().scope(|t| {
                                t.name("method").colon().s(&string_literal(method.as_str())).newline();
                                t.name("path").colon().s(&string_literal(path)).newline();
                                t.name("params").colon().scope(|t| params(t, operation)).newline();
                            });
                        })
                        .colon()
                        .s("Promise")
                        .generic(|t| responses(t, operation))
                        .semicolon()
                        .newline()
                        .newline();
                }
            }
            t.marker();
        });
        t.newline().newline();
    }

    for (name, schema) in doc.schemas() {
        t.s("export type ")
            .s(name)
            .assign()
            .schema(schema)
            .semicolon()
            .newline()
            .newline();
    }

    t.s(FETCH_CLIENT);
    t.finish()
}

fn params(t: &mut TsWriter, operation: &Operation) {
    for (key, location) in [
        ("path", ParameterLocation::Path),
        ("query", ParameterLocation::Query),
        ("cookie", ParameterLocation::Cookie),
    ] {
        let schema = parameter_schema(operation, location);
        if schema.properties.is_none() {
            continue;
        }
        let key = if schema.required.is_some() {
            key.to_string()
        } else {
            format!("{}?", key)
        };
        t.name(&key).colon().schema(&schema).newline();
    }

    let header = parameter_schema(operation, ParameterLocation::Header);
    if header.properties.is_some() {
        t.name("header")
            .colon()
            .s("Record<string, string> & ")
            .schema(&header)
            .newline();
    } else {
        t.name("header?").colon().s("Record<string, string>").newline();
    }

    if let Some(body) = &operation.request_body {
        t.name(if body.required { "body" } else { "body?" }).colon();
        for media in body.content.values() {
            t.schema(&media.schema).union();
        }
        t.marker().newline();
    }
}

fn responses(t: &mut TsWriter, operation: &Operation) {
    let mut any = false;
    for (status, response) in operation.responses.with_content() {
        any = true;
        let status = if status == "default" { "number" } else { status.as_str() };
        t.scope(|t| {
            t.name("status").colon().s(status).newline();
            t.name("body").colon();
            for media in response.content.values() {
                t.schema(&media.schema).union();
            }
            t.marker().newline();
        })
        .union();
    }
    if any {
        t.marker();
    } else {
        t.s("unknown");
    }
}

/// Object schema with one property per parameter in `location`
fn parameter_schema(operation: &Operation, location: ParameterLocation) -> Schema {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    for parameter in operation.parameters.iter().filter(|p| p.location == location) {
        if parameter.required {
            required.push(parameter.name.clone());
        }
        properties.insert(parameter.name.clone(), parameter.schema.clone());
    }

    Schema {
        schema_type: Some(SchemaType::Object),
        properties: if properties.is_empty() { None } else { Some(properties) },
        required: if required.is_empty() { None } else { Some(required) },
        ..Schema::default()
    }
}

/// Render a schema as a TypeScript type; `depth` is the indentation of the
/// line the type starts on
pub fn render_schema(schema: &Schema, depth: usize) -> String {
    if let Some(name) = schema.referenced_name() {
        return name.to_string();
    }

    match schema.schema_type {
        Some(SchemaType::Object) => {
            let properties = match &schema.properties {
                Some(properties) if !properties.is_empty() => properties,
                _ => return "never".to_string(),
            };
            let required = schema.required.as_deref().unwrap_or(&[]);

            let mut out = String::from("{\n");
            for (name, property) in properties {
                out.push_str(&"\t".repeat(depth + 1));
                out.push_str(&property_name(name));
                if !required.contains(name) {
                    out.push('?');
                }
                out.push_str(": ");
                out.push_str(&render_schema(property, depth + 1));
                out.push_str(";\n");
            }
            out.push_str(&"\t".repeat(depth));
            out.push('}');
            out
        }
        Some(SchemaType::Array) => {
            let item = match &schema.items {
                Some(items) => render_schema(items, depth),
                None => "any".to_string(),
            };
            format!("{}[]", item)
        }
        Some(SchemaType::String) => "string".to_string(),
        Some(SchemaType::Integer) | Some(SchemaType::Number) => "number".to_string(),
        Some(SchemaType::Boolean) => "boolean".to_string(),
        Some(SchemaType::Null) => "null".to_string(),
        None => "any".to_string(),
    }
}

fn property_name(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if is_identifier {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Single-quoted TypeScript string literal
fn string_literal(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Append-only writer tracking the current indentation
#[derive(Default)]
struct TsWriter {
    buf: String,
    depth: usize,
}

impl TsWriter {
    fn s(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    fn indent(&mut self) -> &mut Self {
        for _ in 0..self.depth {
            self.buf.push('\t');
        }
        self
    }

    fn name(&mut self, name: &str) -> &mut Self {
        self.indent().s(name)
    }

    fn colon(&mut self) -> &mut Self {
        self.s(": ")
    }

    fn assign(&mut self) -> &mut Self {
        self.s(" = ")
    }

    fn semicolon(&mut self) -> &mut Self {
        self.s(";")
    }

    fn union(&mut self) -> &mut Self {
        self.s(" | ")
    }

    fn newline(&mut self) -> &mut Self {
        self.s("\n")
    }

    /// Placeholder cleaned up by [`TsWriter::finish`] together with any
    /// dangling separator in front of it
    fn marker(&mut self) -> &mut Self {
        self.s(MARKER)
    }

    fn comment(&mut self, text: &str) -> &mut Self {
        self.s("// ").s(text).newline()
    }

    fn doc(&mut self, lines: &[String]) -> &mut Self {
        self.s("/**\n");
        for line in lines {
            self.s(" * ").s(line).newline();
        }
        self.s(" */\n")
    }

    fn schema(&mut self, schema: &Schema) -> &mut Self {
        let rendered = render_schema(schema, self.depth);
        self.s(&rendered)
    }

    fn scope<F: FnOnce(&mut Self)>(&mut self, body: F) -> &mut Self {
        self.s("{\n");
        self.depth += 1;
        body(self);
        self.depth -= 1;
        if !self.buf.ends_with('\n') {
            self.newline();
        }
        self.indent().s("}")
    }

    fn parens<F: FnOnce(&mut Self)>(&mut self, body: F) -> &mut Self {
        self.s("(");
        body(self);
        self.s(")")
    }

    fn generic<F: FnOnce(&mut Self)>(&mut self, body: F) -> &mut Self {
        self.s("<");
        body(self);
        self.s(">")
    }

    fn finish(self) -> String {
        let separator = format!(" | {}", MARKER);
        let blank = format!("\n\n{}", MARKER);
        let line = format!("\n{}", MARKER);
        self.buf
            .replace(&separator, "")
            .replace(&blank, "")
            .replace(&line, "")
            .replace(MARKER, "")
    }
}

const FETCH_CLIENT: &str = r#"export type ClientOptions = {
	url?: string
	beforeRequest?: (api: {
		method: string
		path: string
		params: {
			path?: Record<string, unknown>
			query?: Record<string, unknown>
			header?: Record<string, string>
			cookie?: Record<string, unknown>
			body?: unknown
		}
	}) => void
	afterRequest?: (response: {
		status: number
		body: unknown
	}) => void
}

export function createClient(options?: ClientOptions): Api {
	const url = options?.url ?? ''
	return (async (api: any) => {
		options?.beforeRequest?.(api)
		const query = new URLSearchParams()
		const queryObj = api?.params?.query || {}
		Object.keys(queryObj).forEach((name) => query.set(name, String(queryObj[name])))
		const queryString = query.size > 0 ? '?' + query.toString() : ''
		const pathParams = api?.params?.path || {}
		const path = api.path.replace(/{(\w+)}/g, (_: string, key: string) =>
			pathParams[key] !== undefined ? encodeURIComponent(String(pathParams[key])) : '{' + key + '}'
		)
		const body = api?.params?.body
		const resp = await fetch(url + path + queryString, {
			method: api.method,
			headers: api?.params?.header,
			body: body === undefined ? undefined : JSON.stringify(body),
		})
		const contentType = resp.headers.get('content-type') || ''
		const result = {
			status: resp.status,
			body: contentType.includes('json') ? await resp.json() : await resp.text(),
		}
		options?.afterRequest?.(result)
		return result
	}) as Api
}
"#;
