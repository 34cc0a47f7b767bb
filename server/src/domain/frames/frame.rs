//! Columnar frame model returned to the visualization host

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::data::types::NativeValue;
use crate::utils::time::format_timestamp;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bool,
    Time,
}

impl FieldType {
    /// Field type for a normalized value, `None` for anything outside the
    /// portable set
    pub fn of(value: &NativeValue) -> Option<Self> {
        FieldValue::from_native(value).map(|v| v.field_type())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Self::Time)
    }
}

/// One cell of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl FieldValue {
    pub fn from_native(value: &NativeValue) -> Option<Self> {
        let value = match value {
            NativeValue::TinyInt(v) => Self::Int8(*v),
            NativeValue::SmallInt(v) => Self::Int16(*v),
            NativeValue::Int(v) => Self::Int32(*v),
            NativeValue::BigInt(v) => Self::Int64(*v),
            NativeValue::Float(v) => Self::Float32(*v),
            NativeValue::Double(v) => Self::Float64(*v),
            NativeValue::Text(s) => Self::String(s.clone()),
            NativeValue::Boolean(b) => Self::Bool(*b),
            NativeValue::Timestamp(ts) => Self::Time(*ts),
            _ => return None,
        };
        Some(value)
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Int8(_) => FieldType::Int8,
            Self::Int16(_) => FieldType::Int16,
            Self::Int32(_) => FieldType::Int32,
            Self::Int64(_) => FieldType::Int64,
            Self::Float32(_) => FieldType::Float32,
            Self::Float64(_) => FieldType::Float64,
            Self::String(_) => FieldType::String,
            Self::Bool(_) => FieldType::Bool,
            Self::Time(_) => FieldType::Time,
        }
    }

    /// String form used for frame labels, matching [`NativeValue::to_label_string`]
    pub fn to_label_string(&self) -> String {
        match self {
            Self::Int8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Float32(v) => format!("{:.6}", v),
            Self::Float64(v) => format!("{:.6}", v),
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Time(ts) => format_timestamp(ts),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int8(v) => serializer.serialize_i8(*v),
            Self::Int16(v) => serializer.serialize_i16(*v),
            Self::Int32(v) => serializer.serialize_i32(*v),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Float32(v) => serializer.serialize_f32(*v),
            Self::Float64(v) => serializer.serialize_f64(*v),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Time(ts) => serializer.serialize_i64(ts.timestamp_millis()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FieldConfig {
    /// Legend alias shown in place of the field name
    #[serde(rename = "displayNameFromDS")]
    pub display_name_from_ds: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<FieldConfig>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[schema(value_type = Vec<Object>)]
    pub values: Vec<Option<FieldValue>>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            config: None,
            labels: BTreeMap::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a cell. Missing values and values of another type become null.
    pub fn push(&mut self, value: Option<&NativeValue>) {
        let cell = value
            .and_then(FieldValue::from_native)
            .filter(|v| v.field_type() == self.field_type);
        if cell.is_none() {
            tracing::trace!(field = %self.name, "Appending null cell");
        }
        self.values.push(cell);
    }
}

/// A named group of equal-length fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Number of rows (length of the first field)
    pub fn rows(&self) -> usize {
        self.fields.first().map_or(0, Field::len)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
