//! Typed message path between the Ciska host and its window content.
//!
//! - [`Dispatcher`] resolves an action name to its use case and runs it
//! - [`Host`] routes envelopes by channel (`message`, `openDialog`) and
//!   emits host-to-content events
//! - [`ContentBridge`] is the only surface handed to content code: typed
//!   calls plus event subscription
//!
//! Every request and reply crosses the transport as JSON text, whether the
//! transport is the in-process [`channel::pair`] or a stdio pipe.

pub mod bridge;
pub mod channel;
pub mod dialog;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod messages;
pub mod use_cases;

pub use bridge::{ContentBridge, EventSubscription};
pub use channel::{Envelope, Reply, MESSAGE_CHANNEL, OPEN_DIALOG_CHANNEL};
pub use dialog::{DialogProperty, FileFilter, FilePicker, NullPicker, OpenDialogOptions};
pub use dispatcher::Dispatcher;
pub use error::{ApiError, ApiResponse};
pub use host::Host;
pub use messages::{AddNewProject, ApiAction, ApiMessage, LoadConfig};
pub use use_cases::{HandlerError, ShellUseCases, UseCases};
