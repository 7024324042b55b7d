//! Client-side snapshot of the driver's conversations.

use crate::api::RemoteApi;
use crate::api::models::{Conversation, ConversationId, UserId};
use crate::error::LoadError;
use log::{debug, info, warn};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Ordered list of conversations as last returned by the server.
///
/// The snapshot is only ever replaced wholesale by [`MessageStore::load`];
/// readers get clones and cannot mutate entries in place.
#[derive(Default)]
pub struct MessageStore {
    snapshot: RwLock<Vec<Conversation>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from the offline cache. Same checks as a remote load.
    pub fn with_snapshot(conversations: Vec<Conversation>) -> Result<Self, LoadError> {
        validate(&conversations)?;
        Ok(Self { snapshot: RwLock::new(conversations) })
    }

    /// Fetch the conversations for `user_id` and replace the snapshot.
    ///
    /// On any failure the previous snapshot is left untouched.
    pub async fn load(&self, api: &dyn RemoteApi, user_id: &UserId) -> Result<Vec<Conversation>, LoadError> {
        let fetched = match api.get_messages(user_id).await {
            Ok(resp) => resp.data,
            Err(e) => {
                warn!("Error loading messages for {user_id}: {e}");
                return Err(e.into());
            }
        };
        if let Err(e) = validate(&fetched) {
            warn!("Rejected conversation list for {user_id}: {e}");
            return Err(e);
        }

        let mut guard = self.snapshot.write().await;
        *guard = fetched.clone();
        info!("Loaded {} conversations for {user_id}", fetched.len());
        Ok(fetched)
    }

    pub async fn snapshot(&self) -> Vec<Conversation> {
        self.snapshot.read().await.clone()
    }

    pub async fn get(&self, id: &ConversationId) -> Option<Conversation> {
        self.snapshot.read().await.iter().find(|c| &c.id == id).cloned()
    }

    pub async fn contains(&self, id: &ConversationId) -> bool {
        self.snapshot.read().await.iter().any(|c| &c.id == id)
    }

    pub async fn first(&self) -> Option<Conversation> {
        self.snapshot.read().await.first().cloned()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.is_empty()
    }
}

fn validate(conversations: &[Conversation]) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(conversations.len());
    for conv in conversations {
        if !seen.insert(&conv.id) {
            return Err(LoadError::DuplicateConversation(conv.id.clone()));
        }
        if conv.counterparty.name.trim().is_empty() {
            return Err(LoadError::BlankCounterparty(conv.id.clone()));
        }
    }
    debug!("Validated {} conversations", conversations.len());
    Ok(())
}
