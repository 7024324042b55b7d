//! One-to-many sends and the broadcast authoring flow.

use crate::api::RemoteApi;
use crate::api::models::{BulkMessage, UserId};
use crate::error::{ComposerError, Error, Result};
use crate::messages::signals::{self, Notifier};
use crate::utils::message_text;
use log::{debug, info, warn};
use std::sync::Arc;

/// Sends one message to every passenger the server associates with a driver.
///
/// Recipient resolution and delivery are the server's job; from here a
/// broadcast is a single request. The message store is not involved.
pub struct BroadcastCoordinator {
    api: Arc<dyn RemoteApi>,
    notifier: Arc<dyn Notifier>,
}

impl BroadcastCoordinator {
    pub fn new(api: Arc<dyn RemoteApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub async fn broadcast(&self, driver_id: &UserId, text: &str) -> Result<()> {
        let message = match message_text(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Refusing to broadcast for {driver_id}: {e}");
                self.notifier.failure(signals::EMPTY_MESSAGE);
                return Err(e.into());
            }
        };

        let bulk = BulkMessage { driver_id: driver_id.clone(), message };
        match self.api.send_bulk_message(&bulk).await {
            Ok(()) => {
                info!("Broadcast from {driver_id} accepted");
                self.notifier.success(signals::BROADCAST_SENT);
                Ok(())
            }
            Err(e) => {
                warn!("Broadcast from {driver_id} failed: {e}");
                self.notifier.failure(signals::BROADCAST_FAILED);
                Err(Error::Transport(e))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposerState {
    #[default]
    Closed,
    Open { draft: String },
    Sending { draft: String },
}

/// Authoring state for a broadcast.
///
/// ```text
/// Closed --open--> Open --cancel--> Closed
/// Open --submit--> Sending --ok--> Closed
///                  Sending --err--> Open (draft kept)
/// ```
#[derive(Debug, Default)]
pub struct BroadcastComposer {
    state: ComposerState,
}

impl BroadcastComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ComposerState::Open { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            ComposerState::Closed => None,
            ComposerState::Open { draft } | ComposerState::Sending { draft } => Some(draft.as_str()),
        }
    }

    /// Opening an already open composer keeps its draft.
    pub fn open(&mut self) -> std::result::Result<(), ComposerError> {
        if matches!(self.state, ComposerState::Sending { .. }) {
            return Err(ComposerError::AlreadySending);
        }
        if self.state == ComposerState::Closed {
            self.state = ComposerState::Open { draft: String::new() };
        }
        Ok(())
    }

    pub fn edit(&mut self, text: impl Into<String>) -> std::result::Result<(), ComposerError> {
        match &mut self.state {
            ComposerState::Open { draft } => {
                *draft = text.into();
                Ok(())
            }
            ComposerState::Closed => Err(ComposerError::Closed),
            ComposerState::Sending { .. } => Err(ComposerError::AlreadySending),
        }
    }

    pub fn cancel(&mut self) -> std::result::Result<(), ComposerError> {
        if matches!(self.state, ComposerState::Sending { .. }) {
            return Err(ComposerError::AlreadySending);
        }
        self.state = ComposerState::Closed;
        Ok(())
    }

    /// Send the current draft through `coordinator`.
    ///
    /// Only valid from `Open`. The composer closes on success and reopens
    /// with the same draft on any failure.
    pub async fn submit(&mut self, coordinator: &BroadcastCoordinator, driver_id: &UserId) -> Result<()> {
        let draft = match std::mem::take(&mut self.state) {
            ComposerState::Open { draft } => draft,
            other => {
                let err = match other {
                    ComposerState::Sending { .. } => ComposerError::AlreadySending,
                    _ => ComposerError::Closed,
                };
                self.state = other;
                return Err(err.into());
            }
        };

        self.state = ComposerState::Sending { draft: draft.clone() };
        let result = coordinator.broadcast(driver_id, &draft).await;
        self.state = match &result {
            Ok(()) => ComposerState::Closed,
            Err(_) => {
                debug!("Broadcast not sent, keeping draft");
                ComposerState::Open { draft }
            }
        };
        result
    }
}
