//! One-to-one sends.

use crate::api::RemoteApi;
use crate::api::models::{OutboundMessage, UserId};
use crate::error::{Error, Result};
use crate::messages::selector::ConversationSelector;
use crate::messages::signals::{self, Notifier};
use crate::messages::store::MessageStore;
use crate::utils::message_text;
use log::{info, warn};
use std::sync::Arc;

/// Sends a message to one passenger, then reloads the store.
///
/// Success means the server acknowledged the message. The local snapshot is
/// never patched ahead of that; the follow-up reload brings in the new
/// `last_message`/`is_read` values.
pub struct SendCoordinator {
    api: Arc<dyn RemoteApi>,
    notifier: Arc<dyn Notifier>,
}

impl SendCoordinator {
    pub fn new(api: Arc<dyn RemoteApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub async fn send(
        &self,
        store: &MessageStore,
        selector: &ConversationSelector,
        from: &UserId,
        to: &UserId,
        text: &str,
    ) -> Result<()> {
        let message = match message_text(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Refusing to send to {to}: {e}");
                self.notifier.failure(signals::EMPTY_MESSAGE);
                return Err(e.into());
            }
        };

        let outbound = OutboundMessage { from: from.clone(), to: to.clone(), message };
        if let Err(e) = self.api.send_message(&outbound).await {
            warn!("Sending message from {from} to {to} failed: {e}");
            self.notifier.failure(signals::SEND_FAILED);
            return Err(Error::Transport(e));
        }
        info!("Message from {from} to {to} accepted");
        self.notifier.success(signals::SENT);

        // The attempt already reported success; a failed refresh only keeps the old snapshot.
        match store.load(self.api.as_ref(), from).await {
            Ok(snapshot) => {
                selector.reconcile(&snapshot).await;
            }
            Err(e) => warn!("Refresh after send failed: {e}"),
        }
        Ok(())
    }
}
