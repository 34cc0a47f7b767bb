//! Cassandra/Scylla session adapter
//!
//! - `session` - driver session implementing [`Repository`](crate::data::traits::Repository)
//! - `convert` - CQL value and result set mapping
//! - `tls` - OpenSSL context from certificate paths or inline PEM

pub mod convert;
pub mod session;
pub mod tls;

pub use session::{CassandraSession, is_select, parse_consistency};
