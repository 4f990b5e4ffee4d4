//! Literal-to-value conversion.
//!
//! Two process-wide tables live here:
//!
//! - the [`ConverterRegistry`], mapping a [`FieldType`] to the function that
//!   parses literal text into a [`Value`] of that type. Built-ins are
//!   registered when the global registry is first used; any of them can be
//!   replaced with [`register_converter`].
//! - the [`TypeFieldCache`], mapping `(schema, owner type, field)` to the
//!   field's declared type. It is filled lazily: the first lookup on a type
//!   introspects the type and all its ancestors in one pass.
//!
//! Both are safe to read and extend from concurrent compilations.

use std::{
    str::FromStr,
    sync::{Arc, LazyLock},
    time::SystemTime,
};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use dashmap::DashMap;
use log::{debug, info};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{BoxError, CompileError, ConversionFailure},
    schema::{FieldType, Introspect, SchemaId},
    value::Value,
};

/// Pattern of `date` literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Pattern of `time` literals; fractional seconds are optional.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Pattern shared by every combined date-time literal.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type ConverterFn = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;

static CONVERTERS: LazyLock<ConverterRegistry> = LazyLock::new(ConverterRegistry::with_builtins);
static FIELD_TYPES: LazyLock<TypeFieldCache> = LazyLock::new(TypeFieldCache::new);

pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
}

pub fn parse_time(text: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
}

pub fn parse_date_time(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
}

/// Places a wall-clock time in the system time zone. An ambiguous time
/// (clocks turned back) resolves to the earlier instant.
pub fn in_local_zone(date_time: NaiveDateTime) -> Result<DateTime<Local>, ConversionFailure> {
    Local
        .from_local_datetime(&date_time)
        .earliest()
        .ok_or_else(|| ConversionFailure::NonexistentLocalTime(date_time.to_string()))
}

/// Places a wall-clock time at the offset the system zone has right now.
pub fn at_current_offset(
    date_time: NaiveDateTime,
) -> Result<DateTime<FixedOffset>, ConversionFailure> {
    let offset = *Local::now().offset();
    offset
        .from_local_datetime(&date_time)
        .single()
        .ok_or_else(|| ConversionFailure::NonexistentLocalTime(date_time.to_string()))
}

fn parse_zoned(text: &str) -> Result<DateTime<Local>, BoxError> {
    Ok(in_local_zone(parse_date_time(text)?)?)
}

fn parse_bool(text: &str) -> Result<Value, BoxError> {
    match text.to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(ConversionFailure::InvalidBool.into()),
    }
}

/// Target type to converter function.
pub struct ConverterRegistry {
    converters: DashMap<FieldType, ConverterFn>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConverterRegistry {
    /// A registry without any converter.
    pub fn empty() -> Self {
        ConverterRegistry {
            converters: DashMap::new(),
        }
    }

    /// A registry holding the built-in converters.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();

        registry.insert(FieldType::Text, |s| Ok(Value::Text(s.to_string())));
        registry.insert(FieldType::Bool, parse_bool);
        registry.insert(FieldType::Uuid, |s| Ok(Value::Uuid(Uuid::parse_str(s)?)));

        registry.insert(FieldType::Date, |s| Ok(Value::Date(parse_date(s)?)));
        registry.insert(FieldType::Time, |s| Ok(Value::Time(parse_time(s)?)));
        registry.insert(FieldType::DateTime, |s| {
            Ok(Value::DateTime(parse_date_time(s)?))
        });
        registry.insert(FieldType::ZonedDateTime, |s| Ok(Value::Zoned(parse_zoned(s)?)));
        registry.insert(FieldType::OffsetDateTime, |s| {
            Ok(Value::Offset(at_current_offset(parse_date_time(s)?)?))
        });
        registry.insert(FieldType::Instant, |s| {
            Ok(Value::Instant(parse_zoned(s)?.with_timezone(&Utc)))
        });
        registry.insert(FieldType::Timestamp, |s| {
            Ok(Value::Timestamp(SystemTime::from(parse_zoned(s)?)))
        });

        registry.insert(FieldType::I8, |s| Ok(Value::I8(s.parse()?)));
        registry.insert(FieldType::I16, |s| Ok(Value::I16(s.parse()?)));
        registry.insert(FieldType::I32, |s| Ok(Value::I32(s.parse()?)));
        registry.insert(FieldType::I64, |s| Ok(Value::I64(s.parse()?)));
        registry.insert(FieldType::I128, |s| Ok(Value::I128(s.parse()?)));
        registry.insert(FieldType::F32, |s| Ok(Value::F32(s.parse()?)));
        registry.insert(FieldType::F64, |s| Ok(Value::F64(s.parse()?)));

        registry.insert(FieldType::BigInt, |s| Ok(Value::BigInt(BigInt::from_str(s)?)));
        registry.insert(FieldType::Decimal, |s| Ok(Value::Decimal(Decimal::from_str(s)?)));

        registry
    }

    /// The process-wide registry used unless a compiler is given another one.
    pub fn global() -> &'static ConverterRegistry {
        &CONVERTERS
    }

    fn insert<F>(&self, ty: FieldType, converter: F)
    where
        F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.converters.insert(ty, Arc::new(converter));
    }

    /// Registers `converter` for `ty`, replacing any previous one.
    pub fn register<F>(&self, ty: FieldType, converter: F)
    where
        F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        info!("registering converter for {ty}");
        self.insert(ty, converter);
    }

    pub fn get(&self, ty: &FieldType) -> Option<ConverterFn> {
        self.converters.get(ty).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, ty: &FieldType) -> bool {
        self.converters.contains_key(ty)
    }
}

/// Registers a converter in the global registry.
pub fn register_converter<F>(ty: FieldType, converter: F)
where
    F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    ConverterRegistry::global().register(ty, converter);
}

type FieldKey = (SchemaId, String, String);

/// `(schema, owner type, field name)` to declared field type.
#[derive(Default)]
pub struct TypeFieldCache {
    entries: DashMap<FieldKey, FieldType>,
}

impl TypeFieldCache {
    pub fn new() -> Self {
        TypeFieldCache {
            entries: DashMap::new(),
        }
    }

    pub fn global() -> &'static TypeFieldCache {
        &FIELD_TYPES
    }

    /// Declared type of `owner.field`, introspecting `owner` on a miss.
    pub fn lookup<I>(&self, introspect: &I, owner: &str, field: &str) -> Option<FieldType>
    where
        I: Introspect + ?Sized,
    {
        let key = (introspect.schema_id(), owner.to_string(), field.to_string());
        if let Some(ty) = self.entries.get(&key) {
            return Some(ty.clone());
        }

        self.populate(introspect, owner);
        self.entries.get(&key).map(|ty| ty.clone())
    }

    /// Caches every field `owner` declares or inherits. A field redeclared by
    /// a subtype keeps the subtype's type.
    fn populate<I>(&self, introspect: &I, owner: &str)
    where
        I: Introspect + ?Sized,
    {
        let id = introspect.schema_id();
        let mut count = 0;
        for ty in introspect.hierarchy(owner) {
            for def in introspect.declared_fields(&ty) {
                self.entries
                    .entry((id, owner.to_string(), def.name))
                    .or_insert(def.ty);
                count += 1;
            }
        }
        debug!("cached {count} field types of {owner}");
    }

    pub fn contains<I>(&self, introspect: &I, owner: &str, field: &str) -> bool
    where
        I: Introspect + ?Sized,
    {
        let key = (introspect.schema_id(), owner.to_string(), field.to_string());
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Converts literal text using a converter registry and a field type cache.
#[derive(Clone, Copy)]
pub struct ValueConverter<'r> {
    converters: &'r ConverterRegistry,
    field_types: &'r TypeFieldCache,
}

impl ValueConverter<'static> {
    pub fn global() -> Self {
        ValueConverter {
            converters: ConverterRegistry::global(),
            field_types: TypeFieldCache::global(),
        }
    }
}

impl<'r> ValueConverter<'r> {
    pub fn new(converters: &'r ConverterRegistry, field_types: &'r TypeFieldCache) -> Self {
        ValueConverter {
            converters,
            field_types,
        }
    }

    pub fn field_types(&self) -> &'r TypeFieldCache {
        self.field_types
    }

    /// Converts `literal` for field `field` of type `owner`.
    pub fn convert<I>(
        &self,
        introspect: &I,
        owner: &str,
        field: &str,
        literal: &str,
    ) -> Result<Value, CompileError>
    where
        I: Introspect + ?Sized,
    {
        let ty = self
            .field_types
            .lookup(introspect, owner, field)
            .ok_or_else(|| CompileError::SchemaResolution {
                path: format!("{owner}.{field}"),
                segment: field.to_string(),
            })?;
        self.convert_to(introspect, &ty, field, literal)
    }

    /// Converts `literal` to a value of `ty`. Enumerations match declared
    /// variant names exactly; every other type goes through its converter.
    pub fn convert_to<I>(
        &self,
        introspect: &I,
        ty: &FieldType,
        field: &str,
        literal: &str,
    ) -> Result<Value, CompileError>
    where
        I: Introspect + ?Sized,
    {
        let failure = |cause: BoxError| CompileError::Conversion {
            target_type: ty.clone(),
            field_name: field.to_string(),
            literal: literal.to_string(),
            cause,
        };

        if let FieldType::Enum(enum_name) = ty {
            let variants = introspect
                .enum_variants(enum_name)
                .ok_or_else(|| failure(ConversionFailure::UnknownEnum(enum_name.clone()).into()))?;
            if !variants.iter().any(|variant| variant == literal) {
                return Err(failure(
                    ConversionFailure::UnknownVariant {
                        enum_name: enum_name.clone(),
                        variant: literal.to_string(),
                    }
                    .into(),
                ));
            }
            return Ok(Value::Enum {
                enum_name: enum_name.clone(),
                variant: literal.to_string(),
            });
        }

        let converter = self
            .converters
            .get(ty)
            .ok_or_else(|| failure(ConversionFailure::MissingConverter(ty.clone()).into()))?;
        converter(literal).map_err(failure)
    }
}

/// Converts `literal` for `owner.field` with the global tables.
pub fn convert<I>(introspect: &I, owner: &str, field: &str, literal: &str) -> Result<Value, CompileError>
where
    I: Introspect + ?Sized,
{
    ValueConverter::global().convert(introspect, owner, field, literal)
}
