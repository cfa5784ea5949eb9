pub mod errors;
pub mod events;
pub mod id;

pub use errors::{CiskaError, ConfigError, PlatformError};
pub use events::{Event, EventBus};
pub use id::new_correlation_id;

pub type Result<T> = std::result::Result<T, CiskaError>;
