//! Series rows to frames

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::alias::format_alias;
use super::frame::{Field, FieldConfig, FieldType, Frame};
use super::wide::to_wide;
use crate::data::types::{Row, SeriesRows};
use crate::domain::query::Query;

/// What to emit for a series that has no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySeriesPolicy {
    #[default]
    Skip,
    /// Frame carrying only the series name
    EmptyFrame,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOptions {
    pub empty_series: EmptySeriesPolicy,
    /// Use the series id as display name when no alias template is set
    pub alias_fallback_to_id: bool,
}

/// Build one frame per series, converting to wide frames for alert queries.
///
/// Frames are ordered by series id.
pub fn assemble(query: &Query, rows: SeriesRows, options: &FrameOptions) -> Vec<Frame> {
    let ordered: BTreeMap<String, Vec<Row>> = rows.into_iter().collect();
    ordered
        .into_iter()
        .filter_map(|(id, series)| frame_from_rows(id, &query.alias, &series, options))
        .map(|frame| if query.is_alert { to_wide(frame) } else { frame })
        .collect()
}

/// Build a frame from the rows of one series.
///
/// Fields follow the first row's columns and types. Cells a later row lacks,
/// or holds with a different type, are null.
pub fn frame_from_rows(
    id: String,
    template: &str,
    rows: &[Row],
    options: &FrameOptions,
) -> Option<Frame> {
    let Some(first) = rows.first() else {
        return match options.empty_series {
            EmptySeriesPolicy::Skip => None,
            EmptySeriesPolicy::EmptyFrame => Some(Frame::new(id)),
        };
    };

    let mut alias = format_alias(template, &first.fields);
    if template.is_empty() && options.alias_fallback_to_id {
        alias = id.clone();
    }

    let mut columns = Vec::with_capacity(first.columns.len());
    let mut fields = Vec::with_capacity(first.columns.len());
    for column in &first.columns {
        let Some(field_type) = first.get(column).and_then(FieldType::of) else {
            tracing::warn!(series = %id, column = %column, "Skipping column without a frame type");
            continue;
        };
        let mut field = Field::new(column.clone(), field_type);
        if !alias.is_empty() && field_type.is_numeric() {
            field.config = Some(FieldConfig {
                display_name_from_ds: alias.clone(),
            });
        }
        columns.push(column.as_str());
        fields.push(field);
    }

    for row in rows {
        for (column, field) in columns.iter().zip(fields.iter_mut()) {
            field.push(row.get(column));
        }
    }

    Some(Frame { name: id, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::NativeValue;
    use crate::domain::frames::frame::FieldValue;
    use crate::utils::time::millis_to_datetime;

    fn point(id: &str, value: f64, ts: i64) -> Row {
        Row::from_pairs([
            ("id", NativeValue::Text(id.into())),
            ("value", NativeValue::Double(value)),
            ("created_at", NativeValue::Timestamp(millis_to_datetime(ts))),
        ])
    }

    fn series() -> SeriesRows {
        SeriesRows::from([
            ("a".to_string(), vec![point("a", 1.0, 1_000), point("a", 2.0, 2_000)]),
            ("b".to_string(), vec![point("b", 5.0, 1_000)]),
        ])
    }

    #[test]
    fn test_assemble_one_frame_per_series() {
        let frames = assemble(&Query::default(), series(), &FrameOptions::default());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name, "a");
        assert_eq!(frames[1].name, "b");

        let a = &frames[0];
        let names: Vec<_> = a.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "value", "created_at"]);
        assert_eq!(a.field("id").unwrap().field_type, FieldType::String);
        assert_eq!(a.field("value").unwrap().field_type, FieldType::Float64);
        assert_eq!(a.field("created_at").unwrap().field_type, FieldType::Time);
        assert_eq!(
            a.field("value").unwrap().values,
            vec![Some(FieldValue::Float64(1.0)), Some(FieldValue::Float64(2.0))]
        );
    }

    #[test]
    fn test_row_count_matches_every_field() {
        for frame in assemble(&Query::default(), series(), &FrameOptions::default()) {
            let expected = if frame.name == "a" { 2 } else { 1 };
            assert!(frame.fields.iter().all(|f| f.len() == expected));
        }
    }

    #[test]
    fn test_alias_only_on_numeric_fields() {
        let query = Query {
            alias: "{{ id }} load".into(),
            ..Default::default()
        };
        let frames = assemble(&query, series(), &FrameOptions::default());
        let a = &frames[0];
        assert_eq!(
            a.field("value").unwrap().config.as_ref().unwrap().display_name_from_ds,
            "a load"
        );
        assert!(a.field("id").unwrap().config.is_none());
        assert!(a.field("created_at").unwrap().config.is_none());
    }

    #[test]
    fn test_no_alias_without_template() {
        let frames = assemble(&Query::default(), series(), &FrameOptions::default());
        assert!(frames[0].field("value").unwrap().config.is_none());
    }

    #[test]
    fn test_alias_fallback_to_id() {
        let options = FrameOptions {
            alias_fallback_to_id: true,
            ..Default::default()
        };
        let frames = assemble(&Query::default(), series(), &options);
        assert_eq!(
            frames[1].field("value").unwrap().config.as_ref().unwrap().display_name_from_ds,
            "b"
        );
    }

    #[test]
    fn test_empty_series_skipped_by_default() {
        let rows = SeriesRows::from([("empty".to_string(), vec![])]);
        assert!(assemble(&Query::default(), rows, &FrameOptions::default()).is_empty());
    }

    #[test]
    fn test_empty_series_as_empty_frame() {
        let rows = SeriesRows::from([("empty".to_string(), vec![])]);
        let options = FrameOptions {
            empty_series: EmptySeriesPolicy::EmptyFrame,
            ..Default::default()
        };
        let frames = assemble(&Query::default(), rows, &options);
        assert_eq!(frames, vec![Frame::new("empty")]);
    }

    #[test]
    fn test_missing_and_mismatched_cells_are_null() {
        let mut short = point("a", 3.0, 3_000);
        short.columns.retain(|c| c != "value");
        short.fields.remove("value");
        let mut wrong = point("a", 4.0, 4_000);
        wrong
            .fields
            .insert("value".into(), NativeValue::Text("n/a".into()));

        let rows = SeriesRows::from([(
            "a".to_string(),
            vec![point("a", 1.0, 1_000), short, wrong],
        )]);
        let frames = assemble(&Query::default(), rows, &FrameOptions::default());
        let value = frames[0].field("value").unwrap();
        assert_eq!(value.values, vec![Some(FieldValue::Float64(1.0)), None, None]);
        assert!(frames[0].fields.iter().all(|f| f.len() == 3));
    }

    #[test]
    fn test_alert_query_produces_wide_frames() {
        let query = Query {
            is_alert: true,
            ..Default::default()
        };
        let frames = assemble(&query, series(), &FrameOptions::default());
        let a = &frames[0];
        assert!(a.field("id").is_none());
        assert_eq!(a.field("value").unwrap().labels["id"], "a");
    }
}
