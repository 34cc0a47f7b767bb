//! Legend alias templating

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::data::types::NativeValue;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(.+?)\s*\}\}").expect("valid placeholder regex"));

/// Replace every `{{ name }}` in `template` with the string form of
/// `values[name]`. Unknown names and values without a string form render
/// as an empty string.
pub fn format_alias(template: &str, values: &HashMap<String, NativeValue>) -> String {
    if template.is_empty() {
        return String::new();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .get(caps[1].trim())
                .and_then(NativeValue::to_label_string)
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn values() -> HashMap<String, NativeValue> {
        HashMap::from([
            ("id".to_string(), NativeValue::Text("sensor-1".into())),
            ("count".to_string(), NativeValue::BigInt(42)),
            ("ratio".to_string(), NativeValue::Double(3.141)),
            ("ok".to_string(), NativeValue::Boolean(true)),
            (
                "at".to_string(),
                NativeValue::Timestamp(Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0).unwrap()),
            ),
        ])
    }

    #[test]
    fn test_format_alias_all_kinds() {
        assert_eq!(
            format_alias("{{ id }}/{{count}}/{{ ratio }}/{{ok}}", &values()),
            "sensor-1/42/3.141000/true"
        );
        assert_eq!(
            format_alias("at {{ at }}", &values()),
            "at 2009-11-10 23:00:00 +0000 UTC"
        );
    }

    #[test]
    fn test_format_alias_missing_key() {
        assert_eq!(format_alias("{{ nope }} value", &values()), " value");
    }

    #[test]
    fn test_format_alias_passthrough() {
        assert_eq!(format_alias("plain legend", &values()), "plain legend");
        assert_eq!(format_alias("", &values()), "");
        assert_eq!(format_alias("{ id }", &values()), "{ id }");
    }

    #[test]
    fn test_format_alias_round_trip() {
        for (name, value) in values() {
            let expected = value.to_label_string().unwrap();
            assert_eq!(format_alias(&format!("{{{{ {name} }}}}"), &values()), expected);
        }
    }
}
