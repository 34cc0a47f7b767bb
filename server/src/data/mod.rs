//! Data access layer
//!
//! - `types` - native value model and rows
//! - `normalize` - strict and filtering type normalization
//! - `traits` - repository trait implemented by the session adapter
//! - `cassandra` - scylla-driver backed session
//! - `error` - error type for all of the above
//! - `mock` - in-memory repository (tests only)

pub mod cassandra;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod normalize;
pub mod traits;
pub mod types;

pub use cassandra::CassandraSession;
pub use error::DataError;
pub use traits::{Repository, SelectParams};
pub use types::{NativeType, NativeValue, Row, SeriesRows};
