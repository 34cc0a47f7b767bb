//! Row and value types produced by the session adapter
//!
//! `NativeValue` is a closed tagged model of what the driver hands back for a
//! single cell. The session adapter maps every CQL value into one of these
//! variants; the type normalizer then rewrites them into the portable subset
//! (integers, floats, text, booleans, timestamps) before frames are built.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::utils::time::format_timestamp;

/// Rows of a result set grouped by series identifier (first selected column).
pub type SeriesRows = HashMap<String, Vec<Row>>;

/// A single cell value as decoded from the database
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    /// Generic integer without a fixed CQL width (counter columns)
    Integer(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
    Inet(IpAddr),
    Uuid(Uuid),
    /// Any CQL type without a dedicated variant, tagged with its type name
    Other(String),
}

/// Payload-free discriminant of [`NativeValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Null,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Integer,
    Float,
    Double,
    Text,
    Boolean,
    Timestamp,
    Blob,
    Inet,
    Uuid,
    Other,
}

impl NativeValue {
    pub fn kind(&self) -> NativeType {
        match self {
            Self::Null => NativeType::Null,
            Self::TinyInt(_) => NativeType::TinyInt,
            Self::SmallInt(_) => NativeType::SmallInt,
            Self::Int(_) => NativeType::Int,
            Self::BigInt(_) => NativeType::BigInt,
            Self::Integer(_) => NativeType::Integer,
            Self::Float(_) => NativeType::Float,
            Self::Double(_) => NativeType::Double,
            Self::Text(_) => NativeType::Text,
            Self::Boolean(_) => NativeType::Boolean,
            Self::Timestamp(_) => NativeType::Timestamp,
            Self::Blob(_) => NativeType::Blob,
            Self::Inet(_) => NativeType::Inet,
            Self::Uuid(_) => NativeType::Uuid,
            Self::Other(_) => NativeType::Other,
        }
    }

    /// Type name used in diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            _ => self.kind().as_str(),
        }
    }

    /// String form used for series ids, legend aliases and labels.
    ///
    /// Floats use a fixed six decimal places. Returns `None` for values that
    /// have no textual identity (null, blobs, addresses, unmapped types).
    pub fn to_label_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::TinyInt(v) => Some(v.to_string()),
            Self::SmallInt(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::BigInt(v) | Self::Integer(v) => Some(v.to_string()),
            Self::Float(v) => Some(format!("{:.6}", v)),
            Self::Double(v) => Some(format!("{:.6}", v)),
            Self::Boolean(v) => Some(v.to_string()),
            Self::Timestamp(ts) => Some(format_timestamp(ts)),
            Self::Uuid(id) => Some(id.hyphenated().to_string()),
            Self::Null | Self::Blob(_) | Self::Inet(_) | Self::Other(_) => None,
        }
    }
}

impl NativeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Integer => "counter",
            Self::Float => "float",
            Self::Double => "double",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Blob => "blob",
            Self::Inet => "inet",
            Self::Uuid => "uuid",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One database record: ordered column names plus a name→value map.
///
/// The column list and the map are kept in sync; a column absent from the
/// map reads as [`NativeValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub columns: Vec<String>,
    pub fields: HashMap<String, NativeValue>,
}

impl Row {
    pub fn new(columns: Vec<String>, fields: HashMap<String, NativeValue>) -> Self {
        Self { columns, fields }
    }

    /// Build a row from `(column, value)` pairs, preserving their order
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, NativeValue)>,
        S: Into<String>,
    {
        let mut row = Self::default();
        for (name, value) in pairs {
            let name = name.into();
            row.columns.push(name.clone());
            row.fields.insert(name, value);
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&NativeValue> {
        self.fields.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
