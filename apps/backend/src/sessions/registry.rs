//! Conversation id → at most one game session.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::session::GameSession;
use crate::domain::ConversationId;
use crate::errors::{ConflictKind, DomainError, NotFoundKind};

type Slot = Arc<Mutex<Option<GameSession>>>;

/// Each conversation owns one slot; its mutex serialises create, move and
/// abort for that conversation only. Slots stay in the map once created,
/// so every caller for a conversation contends on the same mutex.
#[derive(Default)]
pub struct SessionRegistry {
    slots: DashMap<ConversationId, Slot>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, conversation: &ConversationId) -> Slot {
        Arc::clone(self.slots.entry(conversation.clone()).or_default().value())
    }

    fn existing_slot(&self, conversation: &ConversationId) -> Option<Slot> {
        self.slots.get(conversation).map(|s| Arc::clone(s.value()))
    }

    pub fn get(&self, conversation: &ConversationId) -> Option<GameSession> {
        self.existing_slot(conversation)?.lock().clone()
    }

    pub fn create(
        &self,
        conversation: &ConversationId,
        session: GameSession,
    ) -> Result<(), DomainError> {
        let slot = self.slot(conversation);
        let mut current = slot.lock();
        if current.is_some() {
            return Err(DomainError::conflict(
                ConflictKind::SessionAlreadyActive,
                format!("conversation {conversation} already has a game"),
            ));
        }
        *current = Some(session);
        Ok(())
    }

    pub fn remove(&self, conversation: &ConversationId) -> Result<GameSession, DomainError> {
        self.with_slot(conversation, |current| {
            current.take().ok_or_else(|| no_session(conversation))
        })
    }

    /// Run `f` with the conversation's slot locked. Conversations that
    /// never had a session fail with `NoActiveSession` without a slot
    /// being allocated.
    pub fn with_slot<T>(
        &self,
        conversation: &ConversationId,
        f: impl FnOnce(&mut Option<GameSession>) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let slot = self
            .existing_slot(conversation)
            .ok_or_else(|| no_session(conversation))?;
        let mut current = slot.lock();
        f(&mut *current)
    }

    pub fn active_count(&self) -> usize {
        let slots: Vec<Slot> = self.slots.iter().map(|s| Arc::clone(s.value())).collect();
        slots.iter().filter(|s| s.lock().is_some()).count()
    }
}

pub(crate) fn no_session(conversation: &ConversationId) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Session,
        format!("no game in conversation {conversation}"),
    )
}
