use crate::components::ComponentRegistry;
use crate::sample::{format_time, SampleValue};
use indexmap::IndexMap;
use log::debug;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Type name given to timestamp schemas
pub const TIME_TYPE_NAME: &str = "Time";

/// Schema generator - converts sample values to OpenAPI schemas and collects
/// named schemas as components
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    /// Named schemas promoted so far
    components: ComponentRegistry,
}

/// OpenAPI `type` keyword values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Object,
    Array,
}

/// OpenAPI Schema definition
///
/// A schema with no `schema_type` is open and accepts any value. When
/// `reference` is set the schema serializes as `{"$ref": ...}` and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub schema_type: Option<SchemaType>,
    /// Format hint for primitive types (`date-time` for timestamps)
    pub format: Option<String>,
    /// Properties for object types, in declaration order
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    pub items: Option<Box<Schema>>,
    /// The sample this schema was inferred from
    pub example: Option<Value>,
    /// Name of the source type; never serialized
    pub type_name: Option<String>,
    /// Reference to a component schema
    pub reference: Option<String>,
}

#[derive(Serialize)]
struct SchemaBody<'a> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<&'a Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'a Value>,
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(reference) = &self.reference {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("$ref", reference)?;
            return map.end();
        }

        SchemaBody {
            schema_type: self.schema_type,
            format: self.format.as_deref(),
            properties: self.properties.as_ref(),
            required: self.required.as_ref(),
            items: self.items.as_deref(),
            example: self.example.as_ref(),
        }
        .serialize(serializer)
    }
}

impl Schema {
    /// The open schema, accepting any value
    pub fn any() -> Self {
        Schema::default()
    }

    pub fn of_type(schema_type: SchemaType) -> Self {
        Schema {
            schema_type: Some(schema_type),
            ..Schema::default()
        }
    }

    /// A reference to `#/components/schemas/<type_name>`
    pub fn reference_to(type_name: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", crate::components::SCHEMA_REF_PREFIX, type_name)),
            ..Schema::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Name of the referenced component, if this is a reference
    pub fn referenced_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(|r| r.rsplit('/').next().unwrap_or(r))
    }

    fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Structural equality ignoring examples
    pub fn same_shape(&self, other: &Schema) -> bool {
        if self.schema_type != other.schema_type
            || self.format != other.format
            || self.required != other.required
            || self.type_name != other.type_name
            || self.reference != other.reference
        {
            return false;
        }

        let items_match = match (&self.items, &other.items) {
            (Some(a), Some(b)) => a.same_shape(b),
            (None, None) => true,
            _ => false,
        };

        let properties_match = match (&self.properties, &other.properties) {
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_shape(vb))
            }
            (None, None) => true,
            _ => false,
        };

        items_match && properties_match
    }
}

/// Infer a schema from a sample value. Never fails; anything indescribable
/// becomes a string schema.
pub fn infer(value: &SampleValue) -> Schema {
    match value {
        SampleValue::Null | SampleValue::Optional(None) => Schema::of_type(SchemaType::Null),
        SampleValue::Time(time) => Schema {
            schema_type: Some(SchemaType::String),
            format: Some("date-time".to_string()),
            example: Some(Value::String(format_time(time))),
            type_name: Some(TIME_TYPE_NAME.to_string()),
            ..Schema::default()
        },
        SampleValue::Bool(_) => Schema::of_type(SchemaType::Boolean).with_example(value.to_json()),
        SampleValue::Integer(_) => {
            Schema::of_type(SchemaType::Integer).with_example(value.to_json())
        }
        SampleValue::Float(_) => Schema::of_type(SchemaType::Number).with_example(value.to_json()),
        SampleValue::Text(_) | SampleValue::Opaque(_) => {
            Schema::of_type(SchemaType::String).with_example(value.to_json())
        }
        SampleValue::List(items) => {
            let items_schema = items.first().map(infer).unwrap_or_else(Schema::any);
            Schema {
                schema_type: Some(SchemaType::Array),
                items: Some(Box::new(items_schema)),
                example: Some(value.to_json()),
                ..Schema::default()
            }
        }
        SampleValue::Map(entries) => {
            let properties: IndexMap<String, Schema> = entries
                .iter()
                .map(|(key, value)| (key.clone(), infer(value)))
                .collect();
            Schema {
                schema_type: Some(SchemaType::Object),
                properties: non_empty(properties),
                example: Some(value.to_json()),
                ..Schema::default()
            }
        }
        SampleValue::Record(record) => {
            let mut properties = IndexMap::new();
            let mut required = Vec::new();
            for field in &record.fields {
                if !field.optional {
                    required.push(field.name.clone());
                }
                properties.insert(field.name.clone(), infer(&field.value));
            }
            Schema {
                schema_type: Some(SchemaType::Object),
                properties: non_empty(properties),
                required: if required.is_empty() { None } else { Some(required) },
                example: Some(value.to_json()),
                type_name: Some(record.type_name.clone()),
                ..Schema::default()
            }
        }
        SampleValue::Optional(Some(inner)) => infer(inner),
        SampleValue::Absent => Schema::any(),
    }
}

fn non_empty(properties: IndexMap<String, Schema>) -> Option<IndexMap<String, Schema>> {
    if properties.is_empty() {
        None
    } else {
        Some(properties)
    }
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with an empty component registry
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Generate a schema for a sample value, promoting it to a component
    /// reference when the sample is a named type
    pub fn generate_schema(&mut self, value: &SampleValue) -> Schema {
        let schema = infer(value);
        debug!(
            "Generated schema of type {:?} (named: {:?})",
            schema.schema_type, schema.type_name
        );
        self.components.promote(schema)
    }

    /// Get all named schemas collected so far
    pub fn get_schemas(&self) -> &IndexMap<String, Schema> {
        self.components.schemas()
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.components.into_schemas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct User {
        id: i64,
        name: String,
        email: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        nickname: Option<String>,
        #[serde(skip)]
        #[allow(dead_code)]
        password: String,
    }

    fn user() -> User {
        User {
            id: 1,
            name: "Ada".to_string(),
            email: None,
            nickname: None,
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_primitive_types() {
        assert_eq!(infer(&SampleValue::of(&"x")).schema_type, Some(SchemaType::String));
        assert_eq!(infer(&SampleValue::of(&42)).schema_type, Some(SchemaType::Integer));
        assert_eq!(infer(&SampleValue::of(&4.2)).schema_type, Some(SchemaType::Number));
        assert_eq!(infer(&SampleValue::of(&true)).schema_type, Some(SchemaType::Boolean));
        assert_eq!(infer(&SampleValue::of(&())).schema_type, Some(SchemaType::Null));
    }

    #[test]
    fn test_primitive_carries_example() {
        let schema = infer(&SampleValue::of(&42));
        assert_eq!(schema.example, Some(json!(42)));
    }

    #[test]
    fn test_struct_required_excludes_optional_fields() {
        let schema = infer(&SampleValue::of(&user()));

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert_eq!(schema.type_name.as_deref(), Some("User"));
        let properties = schema.properties.as_ref().expect("properties");
        assert_eq!(properties.len(), 4);
        assert!(!properties.contains_key("password"));
        assert_eq!(
            schema.required,
            Some(vec!["id".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_skipped_field_is_open() {
        let schema = infer(&SampleValue::of(&user()));
        let properties = schema.properties.expect("properties");
        assert_eq!(properties["nickname"], Schema::any());
        assert_eq!(properties["email"].schema_type, Some(SchemaType::Null));
    }

    #[test]
    fn test_vec_type() {
        let schema = infer(&SampleValue::of(&vec![1, 2, 3]));

        assert_eq!(schema.schema_type, Some(SchemaType::Array));
        let items = schema.items.expect("items");
        assert_eq!(items.schema_type, Some(SchemaType::Integer));
    }

    #[test]
    fn test_empty_vec_has_open_items() {
        let empty: Vec<String> = Vec::new();
        let schema = infer(&SampleValue::of(&empty));

        assert_eq!(schema.schema_type, Some(SchemaType::Array));
        assert_eq!(*schema.items.expect("items"), Schema::any());
        assert_eq!(schema.example, Some(json!([])));
    }

    #[test]
    fn test_option_type() {
        let some = infer(&SampleValue::of(&Some(5)));
        assert_eq!(some.schema_type, Some(SchemaType::Integer));

        let none: Option<i32> = None;
        assert_eq!(infer(&SampleValue::of(&none)).schema_type, Some(SchemaType::Null));
    }

    #[test]
    fn test_map_has_no_required() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("a", 1);
        let schema = infer(&SampleValue::of(&map));

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert!(schema.required.is_none());
        assert!(schema.type_name.is_none());
    }

    #[test]
    fn test_time_schema() {
        let schema = infer(&SampleValue::of("2024-01-02T03:04:05Z"));

        assert_eq!(schema.schema_type, Some(SchemaType::String));
        assert_eq!(schema.format.as_deref(), Some("date-time"));
        assert_eq!(schema.type_name.as_deref(), Some(TIME_TYPE_NAME));
        assert_eq!(schema.example, Some(json!("2024-01-02T03:04:05Z")));
    }

    #[test]
    fn test_reference_serializes_alone() {
        let mut schema = Schema::reference_to("User");
        schema.schema_type = Some(SchemaType::Object);
        schema.example = Some(json!({"id": 1}));

        let value = serde_json::to_value(&schema).expect("serialize");
        assert_eq!(value, json!({"$ref": "#/components/schemas/User"}));
        assert_eq!(schema.referenced_name(), Some("User"));
    }

    #[test]
    fn test_type_name_is_not_serialized() {
        let schema = infer(&SampleValue::of(&user()));
        let value = serde_json::to_value(&schema).expect("serialize");

        assert!(value.get("typeName").is_none());
        assert!(value.get("type_name").is_none());
        assert_eq!(value["type"], json!("object"));
    }

    #[test]
    fn test_generator_promotes_named_types() {
        let mut generator = SchemaGenerator::new();
        let first = generator.generate_schema(&SampleValue::of(&user()));
        let second = generator.generate_schema(&SampleValue::of(&user()));

        assert_eq!(first, Schema::reference_to("User"));
        assert_eq!(first, second);
        assert_eq!(generator.get_schemas().len(), 1);
    }

    #[test]
    fn test_same_shape_ignores_examples() {
        let a = infer(&SampleValue::of(&1));
        let b = infer(&SampleValue::of(&2));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&infer(&SampleValue::of("x"))));
    }
}
