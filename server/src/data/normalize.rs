//! Type normalization for decoded rows
//!
//! Rewrites driver values into the portable subset understood by the frame
//! assembler. Two modes are offered on [`Row`]:
//! - [`Row::normalize`] stops at the first unsupported column
//! - [`Row::filter_unsupported_types`] drops unsupported columns instead

use super::error::DataError;
use super::types::{NativeType, NativeValue, Row};

/// What happens to a value of a given native type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Keep,
    WidenInteger,
    DecodeUtf8,
    RenderInet,
    RenderUuid,
    Unsupported,
}

pub fn conversion_for(kind: NativeType) -> Conversion {
    match kind {
        NativeType::TinyInt
        | NativeType::SmallInt
        | NativeType::Int
        | NativeType::BigInt
        | NativeType::Float
        | NativeType::Double
        | NativeType::Text
        | NativeType::Boolean
        | NativeType::Timestamp => Conversion::Keep,
        NativeType::Integer => Conversion::WidenInteger,
        NativeType::Blob => Conversion::DecodeUtf8,
        NativeType::Inet => Conversion::RenderInet,
        NativeType::Uuid => Conversion::RenderUuid,
        NativeType::Null | NativeType::Other => Conversion::Unsupported,
    }
}

/// Convert a value in place. Unsupported values are left untouched.
fn apply_conversion(value: &mut NativeValue) -> Result<(), ()> {
    let converted = match (conversion_for(value.kind()), &*value) {
        (Conversion::Keep, _) => return Ok(()),
        (Conversion::Unsupported, _) => return Err(()),
        (Conversion::WidenInteger, NativeValue::Integer(v)) => NativeValue::BigInt(*v),
        (Conversion::DecodeUtf8, NativeValue::Blob(bytes)) => {
            NativeValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
        (Conversion::RenderInet, NativeValue::Inet(addr)) => NativeValue::Text(addr.to_string()),
        (Conversion::RenderUuid, NativeValue::Uuid(id)) => {
            NativeValue::Text(id.hyphenated().to_string())
        }
        _ => return Err(()),
    };
    *value = converted;
    Ok(())
}

impl Row {
    /// Convert every column, failing on the first unsupported one.
    ///
    /// Columns converted before the failure keep their new values.
    pub fn normalize(&mut self) -> Result<(), DataError> {
        for column in &self.columns {
            let Some(value) = self.fields.get_mut(column) else {
                return Err(DataError::unsupported_type(column, NativeType::Null.as_str()));
            };
            let type_name = value.type_name().to_string();
            if apply_conversion(value).is_err() {
                return Err(DataError::unsupported_type(column, type_name));
            }
        }
        Ok(())
    }

    /// Convert supported columns and drop the rest from both the map and the
    /// column list. Survivors keep their relative order.
    pub fn filter_unsupported_types(&mut self) {
        let fields = &mut self.fields;
        self.columns.retain(|column| {
            let keep = fields
                .get_mut(column)
                .is_some_and(|value| apply_conversion(value).is_ok());
            if !keep {
                tracing::trace!(column = %column, "Dropping unsupported column");
                fields.remove(column);
            }
            keep
        });
    }
}

/// String form of a series identifier value
pub fn series_id(value: &NativeValue) -> Result<String, DataError> {
    value
        .to_label_string()
        .ok_or_else(|| DataError::malformed_identifier(value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::net::{IpAddr, Ipv4Addr};
    use uuid::Uuid;

    fn mixed_row() -> Row {
        Row::from_pairs([
            ("id", NativeValue::Text("sensor-1".into())),
            ("hits", NativeValue::Integer(7)),
            ("raw", NativeValue::Blob(b"hello".to_vec())),
            ("addr", NativeValue::Inet(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))),
            ("big", NativeValue::Other("varint".into())),
            ("uid", NativeValue::Uuid(Uuid::nil())),
            ("missing", NativeValue::Null),
            ("value", NativeValue::Double(1.5)),
        ])
    }

    #[test]
    fn test_conversion_table() {
        assert_eq!(conversion_for(NativeType::Int), Conversion::Keep);
        assert_eq!(conversion_for(NativeType::Timestamp), Conversion::Keep);
        assert_eq!(conversion_for(NativeType::Integer), Conversion::WidenInteger);
        assert_eq!(conversion_for(NativeType::Blob), Conversion::DecodeUtf8);
        assert_eq!(conversion_for(NativeType::Inet), Conversion::RenderInet);
        assert_eq!(conversion_for(NativeType::Uuid), Conversion::RenderUuid);
        assert_eq!(conversion_for(NativeType::Null), Conversion::Unsupported);
        assert_eq!(conversion_for(NativeType::Other), Conversion::Unsupported);
    }

    #[test]
    fn test_filter_converts_and_drops() {
        let mut row = mixed_row();
        row.filter_unsupported_types();

        assert_eq!(row.columns, vec!["id", "hits", "raw", "addr", "uid", "value"]);
        assert_eq!(row.fields.len(), row.columns.len());
        assert_eq!(row.get("hits"), Some(&NativeValue::BigInt(7)));
        assert_eq!(row.get("raw"), Some(&NativeValue::Text("hello".into())));
        assert_eq!(row.get("addr"), Some(&NativeValue::Text("10.0.0.1".into())));
        assert_eq!(
            row.get("uid"),
            Some(&NativeValue::Text("00000000-0000-0000-0000-000000000000".into()))
        );
        assert!(row.get("big").is_none());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut once = mixed_row();
        once.filter_unsupported_types();
        let mut twice = once.clone();
        twice.filter_unsupported_types();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_keeps_supported_types_unchanged() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let original = Row::from_pairs([
            ("a", NativeValue::TinyInt(1)),
            ("b", NativeValue::SmallInt(2)),
            ("c", NativeValue::Int(3)),
            ("d", NativeValue::BigInt(4)),
            ("e", NativeValue::Float(5.0)),
            ("f", NativeValue::Double(6.0)),
            ("g", NativeValue::Text("x".into())),
            ("h", NativeValue::Boolean(true)),
            ("i", NativeValue::Timestamp(ts)),
        ]);
        let mut row = original.clone();
        row.filter_unsupported_types();
        assert_eq!(row, original);
    }

    #[test]
    fn test_strict_fails_fast_and_keeps_earlier_conversions() {
        let mut row = Row::from_pairs([
            ("hits", NativeValue::Integer(3)),
            ("bad", NativeValue::Other("decimal".into())),
            ("raw", NativeValue::Blob(b"later".to_vec())),
        ]);
        let err = row.normalize().unwrap_err();
        assert_eq!(err.to_string(), "field bad has unsupported type decimal");
        assert_eq!(row.get("hits"), Some(&NativeValue::BigInt(3)));
        // columns after the failure are untouched
        assert_eq!(row.get("raw"), Some(&NativeValue::Blob(b"later".to_vec())));
        assert_eq!(row.columns.len(), 3);
    }

    #[test]
    fn test_strict_reports_null() {
        let mut row = Row::from_pairs([("v", NativeValue::Null)]);
        let err = row.normalize().unwrap_err();
        assert_eq!(err.to_string(), "field v has unsupported type null");
    }

    #[test]
    fn test_strict_accepts_supported_row() {
        let mut row = Row::from_pairs([
            ("id", NativeValue::Uuid(Uuid::nil())),
            ("v", NativeValue::Float(1.0)),
        ]);
        row.normalize().unwrap();
        assert!(matches!(row.get("id"), Some(NativeValue::Text(_))));
    }

    #[test]
    fn test_series_id_forms() {
        assert_eq!(series_id(&NativeValue::Text("a".into())).unwrap(), "a");
        assert_eq!(series_id(&NativeValue::BigInt(12)).unwrap(), "12");
        assert_eq!(series_id(&NativeValue::Double(0.25)).unwrap(), "0.250000");
        assert_eq!(series_id(&NativeValue::Boolean(false)).unwrap(), "false");
        let err = series_id(&NativeValue::Inet(IpAddr::V4(Ipv4Addr::LOCALHOST))).unwrap_err();
        assert!(matches!(err, DataError::MalformedIdentifier { .. }));
    }
}
