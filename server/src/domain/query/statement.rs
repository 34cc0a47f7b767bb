use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};

use super::Query;

static TIME_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$__(timeFrom|timeTo|unixEpochFrom|unixEpochTo)").expect("valid macro regex")
});

impl Query {
    /// Render the structured-mode statement.
    ///
    /// Identifiers are interpolated verbatim; the id list and the time
    /// bounds are left as `?` placeholders.
    pub fn build_statement(&self) -> String {
        let per_partition_limit = if self.instant {
            " PER PARTITION LIMIT 1"
        } else {
            ""
        };
        let allow_filtering = if self.allow_filtering {
            " ALLOW FILTERING"
        } else {
            ""
        };

        let statement = format!(
            "SELECT {id}, {value}, {time} FROM {keyspace}.{table} WHERE {id} IN ? AND {time} >= ? AND {time} <= ?{per_partition_limit}{allow_filtering}",
            id = self.column_id,
            value = self.column_value,
            time = self.column_time,
            keyspace = self.keyspace,
            table = self.table,
        );

        tracing::debug!(statement = %statement, "Built strict statement");
        statement
    }

    /// Series identifiers from the comma-separated `value_id`
    pub fn ids(&self) -> Vec<String> {
        split_ids(&self.value_id)
    }
}

/// Split a comma-separated identifier list, trimming each entry
pub fn split_ids(s: &str) -> Vec<String> {
    s.split(',').map(|id| id.trim().to_string()).collect()
}

/// Substitute time range macros in a raw statement.
///
/// `$__timeFrom`/`$__timeTo` become epoch milliseconds,
/// `$__unixEpochFrom`/`$__unixEpochTo` epoch seconds.
pub fn apply_time_macros(target: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    TIME_MACRO
        .replace_all(target, |caps: &Captures| match &caps[1] {
            "timeFrom" => from.timestamp_millis().to_string(),
            "timeTo" => to.timestamp_millis().to_string(),
            "unixEpochFrom" => from.timestamp().to_string(),
            _ => to.timestamp().to_string(),
        })
        .into_owned()
}
