use std::{fmt, str::FromStr, time::SystemTime};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use uuid::Uuid;

/// A literal converted to the native type of the field it is compared with.
///
/// # Examples
///
/// ```
/// use sieve_lang::Value;
///
/// let age = Value::I32(30);
/// let name = Value::Text("Charles".to_string());
/// assert_eq!(age.type_name(), "i32");
/// assert_eq!(name.to_string(), "'Charles'");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Uuid(Uuid),

    // Date and time
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Date-time in the system time zone
    Zoned(DateTime<Local>),
    /// Date-time at a fixed offset
    Offset(DateTime<FixedOffset>),
    Instant(DateTime<Utc>),
    /// Legacy single date value
    Timestamp(SystemTime),

    // Numbers
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    F32(f32),
    F64(f64),
    BigInt(BigInt),
    Decimal(Decimal),

    /// Declared variant of an enumeration
    Enum { enum_name: String, variant: String },
}

impl Value {
    /// Returns a human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Zoned(_) => "zoned_datetime",
            Value::Offset(_) => "offset_datetime",
            Value::Instant(_) => "instant",
            Value::Timestamp(_) => "timestamp",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::BigInt(_) => "bigint",
            Value::Decimal(_) => "decimal",
            Value::Enum { .. } => "enum",
        }
    }

    /// Numeric value as a decimal, if it is a number that fits.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::I8(n) => Some(Decimal::from(*n)),
            Value::I16(n) => Some(Decimal::from(*n)),
            Value::I32(n) => Some(Decimal::from(*n)),
            Value::I64(n) => Some(Decimal::from(*n)),
            Value::I128(n) => Decimal::from_i128(*n),
            Value::F32(n) => Decimal::from_f32(*n),
            Value::F64(n) => Decimal::from_f64(*n),
            Value::BigInt(n) => Decimal::from_str(&n.to_string()).ok(),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Point in time for zoned values.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Zoned(dt) => Some(dt.with_timezone(&Utc)),
            Value::Offset(dt) => Some(dt.with_timezone(&Utc)),
            Value::Instant(dt) => Some(*dt),
            Value::Timestamp(t) => Some(DateTime::<Utc>::from(*t)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Offset(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Instant(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Timestamp(t) => write!(f, "{}", DateTime::<Utc>::from(*t).to_rfc3339()),
            Value::I8(n) => write!(f, "{n}"),
            Value::I16(n) => write!(f, "{n}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::I128(n) => write!(f, "{n}"),
            Value::F32(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::BigInt(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Enum { variant, .. } => f.write_str(variant),
        }
    }
}
