//! Everything a shell needs for the messages screen of one signed-in driver.

use crate::api::RemoteApi;
use crate::api::models::{Conversation, ConversationId, UserId};
use crate::error::{Error, Result, SelectionError};
use crate::messages::broadcast::{BroadcastComposer, BroadcastCoordinator};
use crate::messages::selector::{ConversationSelector, SelectOutcome};
use crate::messages::send::SendCoordinator;
use crate::messages::signals::{self, Navigator, Notifier};
use crate::messages::store::MessageStore;
use log::{error, warn};
use std::sync::Arc;

/// One line of the conversation list as a shell should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub conversation: Conversation,
    pub is_active: bool,
    pub is_unread: bool,
}

pub struct MessagesSession {
    driver: UserId,
    api: Arc<dyn RemoteApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    store: MessageStore,
    selector: ConversationSelector,
    sender: SendCoordinator,
    broadcaster: BroadcastCoordinator,
}

impl MessagesSession {
    pub fn new(
        driver: UserId,
        api: Arc<dyn RemoteApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_store(driver, api, notifier, navigator, MessageStore::new())
    }

    /// Start from an existing store, e.g. one seeded from the offline cache.
    pub fn with_store(
        driver: UserId,
        api: Arc<dyn RemoteApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        store: MessageStore,
    ) -> Self {
        Self {
            sender: SendCoordinator::new(api.clone(), notifier.clone()),
            broadcaster: BroadcastCoordinator::new(api.clone(), notifier.clone()),
            selector: ConversationSelector::new(),
            driver,
            api,
            notifier,
            navigator,
            store,
        }
    }

    pub fn driver(&self) -> &UserId {
        &self.driver
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn selector(&self) -> &ConversationSelector {
        &self.selector
    }

    /// Reload the conversation list and apply the default selection rule.
    pub async fn refresh(&self) -> Result<Vec<Conversation>> {
        match self.store.load(self.api.as_ref(), &self.driver).await {
            Ok(snapshot) => {
                self.selector.reconcile(&snapshot).await;
                Ok(snapshot)
            }
            Err(e) => {
                self.notifier.failure(signals::LOAD_FAILED);
                Err(e.into())
            }
        }
    }

    pub async fn select(&self, id: Option<&ConversationId>) -> Result<SelectOutcome> {
        match self.selector.select(&self.store, id, self.navigator.as_ref()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Selection rejected: {e}");
                self.notifier.failure(&e.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn send(&self, to: &UserId, text: &str) -> Result<()> {
        self.sender.send(&self.store, &self.selector, &self.driver, to, text).await
    }

    /// Send to the passenger of the active conversation.
    pub async fn send_to_active(&self, text: &str) -> Result<()> {
        let Some(active) = self.selector.active().await else {
            warn!("Send requested with no conversation selected");
            self.notifier.failure(signals::NOTHING_SELECTED);
            return Err(Error::Selection(SelectionError::NothingSelected));
        };
        self.send(&active.counterparty.id, text).await
    }

    pub async fn broadcast(&self, text: &str) -> Result<()> {
        self.broadcaster.broadcast(&self.driver, text).await
    }

    /// Submit a composer's draft as a broadcast from this driver.
    pub async fn submit_broadcast(&self, composer: &mut BroadcastComposer) -> Result<()> {
        composer.submit(&self.broadcaster, &self.driver).await
    }

    pub async fn rows(&self) -> Vec<ConversationRow> {
        let active = self.selector.active_id().await;
        let mut rows = Vec::new();
        for conversation in self.store.snapshot().await {
            rows.push(ConversationRow {
                is_active: active.as_ref() == Some(&conversation.id),
                is_unread: self.selector.is_unread(&conversation).await,
                conversation,
            });
        }
        rows
    }
}
