//! Query description and statement rendering
//!
//! - `statement` - structured statement builder, raw-mode time macros
//! - `request` - JSON payload of a single data query

mod request;
mod statement;

pub use request::{DataQuery, QueryRequestError, TimeRange};
pub use statement::{apply_time_macros, split_ids};

use chrono::{DateTime, Utc};

/// A single data query, either raw text or a structured column selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub raw_query: bool,
    /// Raw statement text (raw mode), macros already applied
    pub target: String,
    pub keyspace: String,
    pub table: String,
    pub column_value: String,
    pub column_id: String,
    /// Comma-separated series identifiers
    pub value_id: String,
    /// Legend alias template
    pub alias: String,
    pub column_time: String,
    pub time_from: DateTime<Utc>,
    pub time_to: DateTime<Utc>,
    pub allow_filtering: bool,
    pub instant: bool,
    /// Alert consumers get wide frames
    pub is_alert: bool,
}
