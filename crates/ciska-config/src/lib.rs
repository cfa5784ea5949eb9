//! Ciska configuration.
//!
//! The host keeps one JSON config file per environment under the OS config
//! directory. The file is created on first access, and every field has a
//! default so an empty object is a complete config.

pub mod schema;
pub mod store;
pub mod validation;

pub use schema::{AppConfig, DEFAULT_ENVIRONMENT, DEFAULT_EVENT_CAPACITY};
pub use store::ConfigStore;
