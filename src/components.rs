use crate::schema_generator::Schema;
use indexmap::IndexMap;
use log::{debug, warn};

/// Prefix of every component reference
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Shared table of named schemas, in first-registration order
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    schemas: IndexMap<String, Schema>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a named schema into the registry and hand back a reference to it.
    ///
    /// Schemas without a type name are returned unchanged. A later schema with
    /// the same name replaces the stored one; when the two differ in shape a
    /// warning is logged since one of the types is being silently dropped.
    ///
    /// Samples of the same type are folded first: a property is required only
    /// if every sample carried it, and a property left open by a skipped field
    /// keeps the concrete schema an earlier sample gave it.
    pub fn promote(&mut self, mut schema: Schema) -> Schema {
        let type_name = match schema.type_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return schema,
        };

        if let Some(existing) = self.schemas.get(&type_name) {
            fold_samples(existing, &mut schema);
        }

        match self.schemas.get(&type_name) {
            Some(existing) if !existing.same_shape(&schema) => {
                warn!(
                    "Component schema '{}' redefined with a different shape; keeping the latest",
                    type_name
                );
            }
            Some(_) => debug!("Reusing component schema '{}'", type_name),
            None => debug!("Registering component schema '{}'", type_name),
        }

        let reference = Schema::reference_to(&type_name);
        self.schemas.insert(type_name, schema);
        reference
    }

    pub fn get(&self, type_name: &str) -> Option<&Schema> {
        self.schemas.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

fn is_open(schema: &Schema) -> bool {
    schema.schema_type.is_none() && schema.reference.is_none()
}

fn fold_samples(existing: &Schema, schema: &mut Schema) {
    if let (Some(required), Some(earlier)) = (schema.required.take(), &existing.required) {
        let shared: Vec<String> = required
            .into_iter()
            .filter(|name| earlier.contains(name))
            .collect();
        schema.required = if shared.is_empty() { None } else { Some(shared) };
    }

    if let (Some(properties), Some(earlier)) = (schema.properties.as_mut(), &existing.properties) {
        for (name, property) in properties.iter_mut() {
            match earlier.get(name) {
                Some(known) if is_open(property) && !is_open(known) => *property = known.clone(),
                _ => {}
            }
        }
    }
}
