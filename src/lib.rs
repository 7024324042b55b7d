//! Passenger messaging for drivers: conversation list, one-to-one sends and
//! broadcasts against a remote messaging API.

pub mod api;
pub mod app;
pub mod error;
pub mod messages;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use api::RemoteApi;
pub use api::models::{Conversation, ConversationId, Passenger, UserId};
pub use error::{Error, Result};
pub use messages::MessagesSession;
