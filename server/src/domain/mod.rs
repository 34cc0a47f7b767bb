//! Domain logic for the Cassandra datasource
//!
//! - `query` - query description, statement builder, request payload
//! - `frames` - series rows to columnar frames, alias templating, wide conversion
//! - `plugin` - executes queries against one repository
//! - `registry` - live plugin instances per datasource id

pub mod frames;
pub mod plugin;
pub mod query;
pub mod registry;

pub use plugin::{Plugin, PluginError, Variable};
pub use registry::{CassandraPluginFactory, DatasourceRegistry, PluginFactory, RegistryError};
