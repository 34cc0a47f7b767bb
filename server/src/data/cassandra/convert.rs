//! Mapping of driver values and result sets into [`NativeValue`] rows

use chrono::DateTime;
use scylla::frame::response::result::{CqlValue, Row as CqlRow};
use uuid::Uuid;

use crate::data::error::DataError;
use crate::data::normalize::series_id;
use crate::data::types::{NativeValue, Row, SeriesRows};

const MILLIS_PER_DAY: i64 = 86_400_000;
/// `date` values are days since the epoch offset by 2^31
const DATE_EPOCH_OFFSET: i64 = 1 << 31;

pub fn to_native(value: Option<CqlValue>) -> NativeValue {
    let Some(value) = value else {
        return NativeValue::Null;
    };
    match value {
        CqlValue::TinyInt(v) => NativeValue::TinyInt(v),
        CqlValue::SmallInt(v) => NativeValue::SmallInt(v),
        CqlValue::Int(v) => NativeValue::Int(v),
        CqlValue::BigInt(v) => NativeValue::BigInt(v),
        CqlValue::Counter(c) => NativeValue::Integer(c.0),
        CqlValue::Float(v) => NativeValue::Float(v),
        CqlValue::Double(v) => NativeValue::Double(v),
        CqlValue::Ascii(s) | CqlValue::Text(s) => NativeValue::Text(s),
        CqlValue::Boolean(v) => NativeValue::Boolean(v),
        CqlValue::Timestamp(ts) => timestamp_or_other(ts.0, "timestamp"),
        CqlValue::Date(date) => {
            let days = i64::from(date.0) - DATE_EPOCH_OFFSET;
            timestamp_or_other(days * MILLIS_PER_DAY, "date")
        }
        CqlValue::Blob(bytes) => NativeValue::Blob(bytes),
        CqlValue::Inet(addr) => NativeValue::Inet(addr),
        CqlValue::Uuid(id) => NativeValue::Uuid(id),
        CqlValue::Timeuuid(id) => match Uuid::parse_str(&id.to_string()) {
            Ok(id) => NativeValue::Uuid(id),
            Err(_) => NativeValue::Other("timeuuid".to_string()),
        },
        CqlValue::Empty => NativeValue::Null,
        other => NativeValue::Other(cql_type_name(&other).to_string()),
    }
}

/// Values outside chrono's range stay unconverted under their CQL type name
fn timestamp_or_other(millis: i64, type_name: &str) -> NativeValue {
    match DateTime::from_timestamp_millis(millis) {
        Some(ts) => NativeValue::Timestamp(ts),
        None => NativeValue::Other(type_name.to_string()),
    }
}

fn cql_type_name(value: &CqlValue) -> &'static str {
    match value {
        CqlValue::Decimal(_) => "decimal",
        CqlValue::Varint(_) => "varint",
        CqlValue::Duration(_) => "duration",
        CqlValue::Time(_) => "time",
        CqlValue::List(_) => "list",
        CqlValue::Set(_) => "set",
        CqlValue::Map(_) => "map",
        CqlValue::Tuple(_) => "tuple",
        CqlValue::UserDefinedType { .. } => "udt",
        _ => "unknown",
    }
}

/// Convert a driver row, keeping the result set's column order
pub fn to_row(columns: &[String], row: CqlRow) -> Row {
    Row::from_pairs(
        columns
            .iter()
            .cloned()
            .zip(row.columns.into_iter().map(to_native)),
    )
}

/// Group rows by the string form of their first column.
///
/// Each row is run through filtering normalization before it is stored.
pub fn group_by_series(columns: &[String], rows: Vec<CqlRow>) -> Result<SeriesRows, DataError> {
    let mut grouped = SeriesRows::new();
    let Some(id_column) = columns.first() else {
        return Ok(grouped);
    };
    for raw in rows {
        let mut row = to_row(columns, raw);
        let id = series_id(row.get(id_column).unwrap_or(&NativeValue::Null))?;
        row.filter_unsupported_types();
        grouped.entry(id).or_default().push(row);
    }
    Ok(grouped)
}

/// Text cell at `index`, if the row has one there
pub fn text_at(row: &CqlRow, index: usize) -> Option<&str> {
    match row.columns.get(index)? {
        Some(CqlValue::Ascii(s) | CqlValue::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// First column of every row as text, skipping anything else
pub fn text_column(rows: &[CqlRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| text_at(row, 0).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::frame::value::{Counter, CqlDate, CqlTimestamp};

    use crate::utils::time::millis_to_datetime;

    fn cql_row(values: Vec<Option<CqlValue>>) -> CqlRow {
        CqlRow { columns: values }
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(to_native(None), NativeValue::Null);
        assert_eq!(to_native(Some(CqlValue::Int(5))), NativeValue::Int(5));
        assert_eq!(
            to_native(Some(CqlValue::Counter(Counter(9)))),
            NativeValue::Integer(9)
        );
        assert_eq!(
            to_native(Some(CqlValue::Ascii("a".into()))),
            NativeValue::Text("a".into())
        );
        assert_eq!(
            to_native(Some(CqlValue::List(vec![]))),
            NativeValue::Other("list".into())
        );
    }

    #[test]
    fn test_date_maps_to_utc_midnight() {
        let epoch = to_native(Some(CqlValue::Date(CqlDate(1 << 31))));
        assert_eq!(epoch, NativeValue::Timestamp(millis_to_datetime(0)));

        let next_day = to_native(Some(CqlValue::Date(CqlDate((1 << 31) + 1))));
        assert_eq!(
            next_day,
            NativeValue::Timestamp(millis_to_datetime(MILLIS_PER_DAY))
        );
    }

    #[test]
    fn test_out_of_range_dates_are_not_converted() {
        let far = to_native(Some(CqlValue::Date(CqlDate(u32::MAX))));
        assert_eq!(far, NativeValue::Other("date".into()));

        let ancient = to_native(Some(CqlValue::Date(CqlDate(0))));
        assert_eq!(ancient, NativeValue::Other("date".into()));

        let huge = to_native(Some(CqlValue::Timestamp(CqlTimestamp(i64::MAX))));
        assert_eq!(huge, NativeValue::Other("timestamp".into()));

        let mut row = Row::from_pairs([
            ("id", NativeValue::Text("a".into())),
            ("day", far),
        ]);
        let err = row.normalize().unwrap_err();
        assert!(matches!(
            err,
            DataError::UnsupportedType { ref column, ref type_name }
                if column == "day" && type_name == "date"
        ));

        let mut row = Row::from_pairs([
            ("id", NativeValue::Text("a".into())),
            ("day", NativeValue::Other("date".into())),
        ]);
        row.filter_unsupported_types();
        assert_eq!(row.columns, vec!["id".to_string()]);
    }

    #[test]
    fn test_timestamp_mapping() {
        let value = to_native(Some(CqlValue::Timestamp(CqlTimestamp(1_500))));
        assert_eq!(value, NativeValue::Timestamp(millis_to_datetime(1_500)));
    }

    #[test]
    fn test_group_by_series_filters_and_groups() {
        let columns = names(&["id", "value", "extra"]);
        let rows = vec![
            cql_row(vec![
                Some(CqlValue::Text("a".into())),
                Some(CqlValue::Double(1.0)),
                Some(CqlValue::Set(vec![CqlValue::Int(1)])),
            ]),
            cql_row(vec![
                Some(CqlValue::Text("b".into())),
                Some(CqlValue::Double(2.0)),
                None,
            ]),
            cql_row(vec![
                Some(CqlValue::Text("a".into())),
                Some(CqlValue::Double(3.0)),
                None,
            ]),
        ];
        let grouped = group_by_series(&columns, rows).unwrap();
        assert_eq!(grouped.len(), 2);
        let a = &grouped["a"];
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].columns, vec!["id", "value"]);
        assert_eq!(a[1].get("value"), Some(&NativeValue::Double(3.0)));
    }

    #[test]
    fn test_group_by_series_numeric_id() {
        let columns = names(&["sensor", "value"]);
        let rows = vec![cql_row(vec![
            Some(CqlValue::Int(42)),
            Some(CqlValue::Float(1.0)),
        ])];
        let grouped = group_by_series(&columns, rows).unwrap();
        assert!(grouped.contains_key("42"));
    }

    #[test]
    fn test_group_by_series_rejects_unsupported_id() {
        let columns = names(&["id", "value"]);
        let rows = vec![cql_row(vec![None, Some(CqlValue::Int(1))])];
        let err = group_by_series(&columns, rows).unwrap_err();
        assert!(matches!(err, DataError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_text_column() {
        let rows = vec![
            cql_row(vec![Some(CqlValue::Text("system".into()))]),
            cql_row(vec![None]),
            cql_row(vec![Some(CqlValue::Text("metrics".into()))]),
        ];
        assert_eq!(text_column(&rows), vec!["system", "metrics"]);
        assert_eq!(text_at(&rows[0], 1), None);
    }
}
