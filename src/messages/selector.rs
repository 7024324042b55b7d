//! Active conversation tracking and local read marks.

use crate::api::models::{Conversation, ConversationId};
use crate::error::SelectionError;
use crate::messages::signals::Navigator;
use crate::messages::store::MessageStore;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// What a call to [`ConversationSelector::select`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A different conversation became active.
    Changed(Conversation),
    /// The conversation was already active; read state untouched.
    Unchanged(Conversation),
    Cleared,
}

#[derive(Default)]
struct Selection {
    active: Option<Conversation>,
    // conversation id -> last message the driver had on screen
    viewed: HashMap<ConversationId, String>,
}

impl Selection {
    fn mark_viewed(&mut self, conv: &Conversation) {
        if !conv.is_read {
            self.viewed.insert(conv.id.clone(), conv.last_message.clone());
        }
    }
}

/// Keeps at most one conversation focused.
#[derive(Default)]
pub struct ConversationSelector {
    state: RwLock<Selection>,
}

impl ConversationSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `id`, or clear the focus with `None`.
    ///
    /// The conversation must be in the store's current snapshot. Every
    /// successful focus is forwarded to `navigator`.
    pub async fn select(
        &self,
        store: &MessageStore,
        id: Option<&ConversationId>,
        navigator: &dyn Navigator,
    ) -> Result<SelectOutcome, SelectionError> {
        let Some(id) = id else {
            self.state.write().await.active = None;
            debug!("Selection cleared");
            return Ok(SelectOutcome::Cleared);
        };
        let conv = store
            .get(id)
            .await
            .ok_or_else(|| SelectionError::NotInSnapshot(id.clone()))?;

        let outcome = {
            let mut state = self.state.write().await;
            if state.active.as_ref().is_some_and(|a| a.id == conv.id) {
                SelectOutcome::Unchanged(conv.clone())
            } else {
                state.mark_viewed(&conv);
                state.active = Some(conv.clone());
                debug!("Selected conversation {}", conv.id);
                SelectOutcome::Changed(conv.clone())
            }
        };
        navigator.conversation_selected(&conv);
        Ok(outcome)
    }

    /// Bring the selection in line with a freshly loaded snapshot.
    ///
    /// With nothing focused the first conversation becomes active. A focused
    /// conversation that is gone from the snapshot is dropped, leaving no
    /// selection.
    pub async fn reconcile(&self, snapshot: &[Conversation]) -> Option<Conversation> {
        let mut state = self.state.write().await;

        state.viewed.retain(|id, seen| {
            snapshot
                .iter()
                .find(|c| &c.id == id)
                .is_some_and(|c| !c.is_read && c.last_message == *seen)
        });

        let next = match state.active.take() {
            Some(prev) => {
                let still_there = snapshot.iter().find(|c| c.id == prev.id).cloned();
                match &still_there {
                    // Still on screen, so anything new in it has been seen.
                    Some(c) => state.mark_viewed(c),
                    None => debug!("Selected conversation {} no longer listed", prev.id),
                }
                still_there
            }
            None => {
                let first = snapshot.first().cloned();
                if let Some(c) = &first {
                    debug!("Defaulting selection to {}", c.id);
                    state.mark_viewed(c);
                }
                first
            }
        };
        state.active = next.clone();
        next
    }

    pub async fn active(&self) -> Option<Conversation> {
        self.state.read().await.active.clone()
    }

    pub async fn active_id(&self) -> Option<ConversationId> {
        self.state.read().await.active.as_ref().map(|c| c.id.clone())
    }

    /// Whether `conv` should still be flagged unread on screen.
    pub async fn is_unread(&self, conv: &Conversation) -> bool {
        if conv.is_read {
            return false;
        }
        let state = self.state.read().await;
        state.viewed.get(&conv.id) != Some(&conv.last_message)
    }

    pub async fn unread_count(&self, snapshot: &[Conversation]) -> usize {
        let state = self.state.read().await;
        snapshot
            .iter()
            .filter(|c| !c.is_read && state.viewed.get(&c.id) != Some(&c.last_message))
            .count()
    }
}
