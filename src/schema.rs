//! Static entity metadata.
//!
//! The compiler never inspects Rust types at runtime. Entity types, their
//! fields and their declared value types are described by a [`Schema`], or
//! by any other [`Introspect`] implementation (for example metadata
//! generated at build time).

use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use thiserror::Error;

/// Declared value type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Bool,
    Uuid,
    /// `yyyy-MM-dd`
    Date,
    /// `HH:mm:ss`
    Time,
    /// `yyyy-MM-dd HH:mm:ss`, no zone
    DateTime,
    /// Date-time in the system time zone
    ZonedDateTime,
    /// Date-time at the current offset of the system time zone
    OffsetDateTime,
    /// Point in time, UTC
    Instant,
    /// Legacy single date type, a `SystemTime`
    Timestamp,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    BigInt,
    Decimal,
    /// Enumeration declared in the schema
    Enum(String),
    /// To-one relationship or embedded value
    Entity(String),
    /// To-many relationship
    Collection(String),
    /// Application type converted by a registered converter
    Custom(String),
}

impl FieldType {
    /// Entity reached by navigating into a field of this type.
    pub fn target_entity(&self) -> Option<&str> {
        match self {
            FieldType::Entity(name) | FieldType::Collection(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Bool => "bool",
            FieldType::Uuid => "uuid",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::ZonedDateTime => "zoned_datetime",
            FieldType::OffsetDateTime => "offset_datetime",
            FieldType::Instant => "instant",
            FieldType::Timestamp => "timestamp",
            FieldType::I8 => "i8",
            FieldType::I16 => "i16",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::I128 => "i128",
            FieldType::F32 => "f32",
            FieldType::F64 => "f64",
            FieldType::BigInt => "bigint",
            FieldType::Decimal => "decimal",
            FieldType::Enum(name) => return write!(f, "enum:{name}"),
            FieldType::Entity(name) => return write!(f, "entity:{name}"),
            FieldType::Collection(name) => return write!(f, "collection:{name}"),
            FieldType::Custom(name) => return write!(f, "custom:{name}"),
        };
        f.write_str(name)
    }
}

/// Errors raised while building a schema from a description.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown field type '{0}'")]
    UnknownType(String),

    #[error("invalid schema document: {0}")]
    Invalid(String),

    #[error("type '{child}' extends undeclared type '{parent}'")]
    UnknownParent { child: String, parent: String },
}

impl FromStr for FieldType {
    type Err = SchemaError;

    /// Parses the names produced by `Display`, e.g. `i32` or `enum:Gender`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((kind, name)) = s.split_once(':') {
            let name = name.to_string();
            return match kind {
                "enum" => Ok(FieldType::Enum(name)),
                "entity" => Ok(FieldType::Entity(name)),
                "collection" => Ok(FieldType::Collection(name)),
                "custom" => Ok(FieldType::Custom(name)),
                _ => Err(SchemaError::UnknownType(s.to_string())),
            };
        }

        let ty = match s {
            "text" | "string" => FieldType::Text,
            "bool" => FieldType::Bool,
            "uuid" => FieldType::Uuid,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" => FieldType::DateTime,
            "zoned_datetime" => FieldType::ZonedDateTime,
            "offset_datetime" => FieldType::OffsetDateTime,
            "instant" => FieldType::Instant,
            "timestamp" => FieldType::Timestamp,
            "i8" => FieldType::I8,
            "i16" => FieldType::I16,
            "i32" => FieldType::I32,
            "i64" => FieldType::I64,
            "i128" => FieldType::I128,
            "f32" => FieldType::F32,
            "f64" => FieldType::F64,
            "bigint" => FieldType::BigInt,
            "decimal" => FieldType::Decimal,
            _ => return Err(SchemaError::UnknownType(s.to_string())),
        };
        Ok(ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

/// An entity (or embeddable) type and the fields it declares itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    pub name: String,
    /// Supertype whose fields are inherited
    pub parent: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        EntityType {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
        });
        self
    }
}

/// Identity of a schema, used to key process-wide caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(u64);

impl SchemaId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SchemaId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Schema introspection capability.
///
/// Given a type, reports the fields it declares and its supertype. The
/// provided methods walk the supertype chain so inherited fields are found.
pub trait Introspect {
    fn schema_id(&self) -> SchemaId;

    /// Fields declared directly on `type_name`, not inherited ones.
    fn declared_fields(&self, type_name: &str) -> Vec<FieldDef>;

    fn parent(&self, type_name: &str) -> Option<String>;

    /// Declared variant names of an enumeration.
    fn enum_variants(&self, enum_name: &str) -> Option<Vec<String>>;

    /// `type_name` followed by its ancestors, nearest first.
    fn hierarchy(&self, type_name: &str) -> Vec<String> {
        let mut chain = vec![type_name.to_string()];
        let mut seen: HashSet<String> = chain.iter().cloned().collect();
        let mut current = type_name.to_string();

        while let Some(parent) = self.parent(&current) {
            if !seen.insert(parent.clone()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Declared type of `field`, looking through supertypes.
    fn field_type(&self, type_name: &str, field: &str) -> Option<FieldType> {
        self.hierarchy(type_name).iter().find_map(|ty| {
            self.declared_fields(ty)
                .into_iter()
                .find(|def| def.name == field)
                .map(|def| def.ty)
        })
    }
}

/// In-memory schema: entity types and enumerations.
#[derive(Debug, Clone)]
pub struct Schema {
    id: SchemaId,
    entities: HashMap<String, EntityType>,
    enums: HashMap<String, Vec<String>>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        Schema {
            id: SchemaId::next(),
            entities: HashMap::new(),
            enums: HashMap::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn with_enum<I, S>(mut self, name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(name.into(), variants.into_iter().map(Into::into).collect());
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Builds a schema from its JSON description:
    ///
    /// ```text
    /// {
    ///   "entities": {
    ///     "Person": { "fields": { "firstName": "text", "age": "i32" } },
    ///     "Author": { "extends": "Person", "fields": { "gender": "enum:Gender" } }
    ///   },
    ///   "enums": { "Gender": ["MALE", "FEMALE"] }
    /// }
    /// ```
    pub fn from_json(document: &serde_json::Value) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new();

        if let Some(entities) = document.get("entities") {
            let entities = entities
                .as_object()
                .ok_or_else(|| SchemaError::Invalid("'entities' must be an object".into()))?;

            let empty = serde_json::Map::new();
            for (name, body) in entities {
                let mut entity = EntityType::new(name);
                if let Some(parent) = body.get("extends") {
                    let parent = parent.as_str().ok_or_else(|| {
                        SchemaError::Invalid(format!("'extends' of '{name}' must be a string"))
                    })?;
                    entity = entity.extends(parent);
                }

                let fields = match body.get("fields") {
                    Some(fields) => fields.as_object().ok_or_else(|| {
                        SchemaError::Invalid(format!("'fields' of '{name}' must be an object"))
                    })?,
                    None => &empty,
                };
                for (field, ty) in fields {
                    let ty = ty.as_str().ok_or_else(|| {
                        SchemaError::Invalid(format!("type of '{name}.{field}' must be a string"))
                    })?;
                    entity = entity.field(field, ty.parse()?);
                }
                schema = schema.with_entity(entity);
            }
        }

        if let Some(enums) = document.get("enums") {
            let enums = enums
                .as_object()
                .ok_or_else(|| SchemaError::Invalid("'enums' must be an object".into()))?;

            for (name, variants) in enums {
                let variants = variants
                    .as_array()
                    .and_then(|items| items.iter().map(|v| v.as_str()).collect::<Option<Vec<_>>>())
                    .ok_or_else(|| {
                        SchemaError::Invalid(format!("variants of '{name}' must be strings"))
                    })?;
                schema = schema.with_enum(name, variants);
            }
        }

        for entity in schema.entities.values() {
            if let Some(parent) = &entity.parent
                && !schema.entities.contains_key(parent)
            {
                return Err(SchemaError::UnknownParent {
                    child: entity.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(schema)
    }
}

impl Introspect for Schema {
    fn schema_id(&self) -> SchemaId {
        self.id
    }

    fn declared_fields(&self, type_name: &str) -> Vec<FieldDef> {
        self.entities
            .get(type_name)
            .map(|entity| entity.fields.clone())
            .unwrap_or_default()
    }

    fn parent(&self, type_name: &str) -> Option<String> {
        self.entities.get(type_name)?.parent.clone()
    }

    fn enum_variants(&self, enum_name: &str) -> Option<Vec<String>> {
        self.enums.get(enum_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherited_fields_are_found_through_the_parent_chain() {
        let schema = Schema::new()
            .with_entity(EntityType::new("Person").field("age", FieldType::I32))
            .with_entity(
                EntityType::new("Author")
                    .extends("Person")
                    .field("email", FieldType::Text),
            );

        assert_eq!(schema.hierarchy("Author"), vec!["Author", "Person"]);
        assert_eq!(schema.field_type("Author", "age"), Some(FieldType::I32));
        assert_eq!(schema.field_type("Person", "email"), None);
    }

    #[test]
    fn field_type_names_round_trip() {
        for name in ["i64", "zoned_datetime", "enum:Gender", "collection:Comment"] {
            assert_eq!(name.parse::<FieldType>().unwrap().to_string(), name);
        }
        assert!("money".parse::<FieldType>().is_err());
    }

    #[test]
    fn from_json_rejects_unknown_parent() {
        let doc = serde_json::json!({
            "entities": { "Author": { "extends": "Person", "fields": {} } }
        });
        assert!(matches!(
            Schema::from_json(&doc),
            Err(SchemaError::UnknownParent { .. })
        ));
    }
}
