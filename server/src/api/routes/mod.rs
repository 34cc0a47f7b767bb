//! API route handlers

pub mod datasources;
pub mod health;
