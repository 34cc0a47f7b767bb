//! Narrow-to-wide frame conversion
//!
//! Alert consumers reject string and boolean fields. Their first values are
//! lifted into labels on every numeric field and the fields are removed.

use std::collections::BTreeMap;

use super::frame::{Field, Frame};

fn is_series_field(field: &Field) -> bool {
    field.field_type.is_numeric() || field.field_type.is_time()
}

/// Labels from the first value of every non-numeric, non-time field.
/// Empty when the frame has no rows.
fn labels_from_fields(frame: &Frame) -> BTreeMap<String, String> {
    if frame.rows() == 0 {
        return BTreeMap::new();
    }
    frame
        .fields
        .iter()
        .filter(|f| !is_series_field(f))
        .map(|f| {
            let value = f
                .values
                .first()
                .and_then(Option::as_ref)
                .map(|v| v.to_label_string())
                .unwrap_or_default();
            (f.name.clone(), value)
        })
        .collect()
}

pub fn to_wide(mut frame: Frame) -> Frame {
    if frame.fields.is_empty() {
        return frame;
    }

    let labels = labels_from_fields(&frame);
    for field in frame.fields.iter_mut().filter(|f| f.field_type.is_numeric()) {
        field
            .labels
            .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    frame.fields.retain(is_series_field);
    frame
}
