//! Remote messaging API: the contract the core consumes and its HTTP client.

pub mod client;
pub mod models;

use crate::error::TransportError;
use async_trait::async_trait;
use models::{BulkMessage, MessagesResponse, OutboundMessage, UserId};

pub use client::ApiClient;

/// Operations the messaging core needs from the backend.
///
/// Transport, authentication headers and broadcast recipient resolution all
/// live behind this trait.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Conversations known for `user_id`, in display order.
    async fn get_messages(&self, user_id: &UserId) -> Result<MessagesResponse, TransportError>;

    /// Deliver one message to one passenger.
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Deliver one message to every passenger the server associates with the driver.
    async fn send_bulk_message(&self, message: &BulkMessage) -> Result<(), TransportError>;
}
