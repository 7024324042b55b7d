//! Driver/passenger messaging.
//!
//! - [`store::MessageStore`] holds the conversation snapshot
//! - [`selector::ConversationSelector`] tracks the focused conversation and read marks
//! - [`send::SendCoordinator`] handles one-to-one sends
//! - [`broadcast::BroadcastCoordinator`] handles one-to-many sends
//! - [`session::MessagesSession`] bundles them for one driver

pub mod broadcast;
pub mod selector;
pub mod send;
pub mod session;
pub mod signals;
pub mod store;

pub use broadcast::{BroadcastComposer, BroadcastCoordinator, ComposerState};
pub use selector::{ConversationSelector, SelectOutcome};
pub use send::SendCoordinator;
pub use session::{ConversationRow, MessagesSession};
pub use signals::{Navigator, NoNavigation, Notifier};
pub use store::MessageStore;
