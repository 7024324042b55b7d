//! Recording doubles for the remote API and the signal sinks.

use crate::api::RemoteApi;
use crate::api::models::{BulkMessage, Conversation, ConversationId, MessagesResponse, OutboundMessage, Passenger, UserId};
use crate::error::TransportError;
use crate::messages::signals::{Navigator, Notifier};
use async_trait::async_trait;
use std::sync::Mutex;

/// Call made against [`MockApi`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetMessages(UserId),
    SendMessage(OutboundMessage),
    SendBulk(BulkMessage),
}

/// Scripted remote API that records every call.
#[derive(Default)]
pub struct MockApi {
    snapshots: Mutex<Vec<Result<Vec<Conversation>, TransportError>>>,
    send_results: Mutex<Vec<Result<(), TransportError>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next `get_messages`. The last queued answer repeats.
    pub fn push_snapshot(&self, snapshot: Vec<Conversation>) -> &Self {
        self.snapshots.lock().unwrap().push(Ok(snapshot));
        self
    }

    pub fn push_load_failure(&self, err: TransportError) -> &Self {
        self.snapshots.lock().unwrap().push(Err(err));
        self
    }

    /// Queue the answer for the next send or broadcast. Defaults to success.
    pub fn push_send_result(&self, result: Result<(), TransportError>) -> &Self {
        self.send_results.lock().unwrap().push(result);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ApiCall::GetMessages(_))).count()
    }

    pub fn send_count(&self) -> usize {
        self.calls().iter().filter(|c| !matches!(c, ApiCall::GetMessages(_))).count()
    }

    fn next_send_result(&self) -> Result<(), TransportError> {
        let mut queue = self.send_results.lock().unwrap();
        if queue.is_empty() { Ok(()) } else { queue.remove(0) }
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn get_messages(&self, user_id: &UserId) -> Result<MessagesResponse, TransportError> {
        self.calls.lock().unwrap().push(ApiCall::GetMessages(user_id.clone()));
        let mut queue = self.snapshots.lock().unwrap();
        let next = if queue.len() > 1 { queue.remove(0) } else { queue.first().cloned().unwrap_or(Ok(Vec::new())) };
        next.map(|data| MessagesResponse { data })
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(ApiCall::SendMessage(message.clone()));
        self.next_send_result()
    }

    async fn send_bulk_message(&self, message: &BulkMessage) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(ApiCall::SendBulk(message.clone()));
        self.next_send_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Success(String),
    Failure(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingNotifier {
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.signals.lock().unwrap().push(Signal::Success(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.signals.lock().unwrap().push(Signal::Failure(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    selected: Mutex<Vec<ConversationId>>,
}

impl RecordingNavigator {
    pub fn selected(&self) -> Vec<ConversationId> {
        self.selected.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn conversation_selected(&self, conversation: &Conversation) {
        self.selected.lock().unwrap().push(conversation.id.clone());
    }
}

pub fn conversation(id: u64, passenger: u64, name: &str, last: &str, is_read: bool) -> Conversation {
    Conversation {
        id: ConversationId::Number(id),
        counterparty: Passenger { id: UserId::Number(passenger), name: name.to_string() },
        last_message: last.to_string(),
        is_read,
    }
}
