//! Pollable listener buffer
//!
//! The messaging module pushes registration tokens and messages from its own
//! producer context; the application drains them from a single consumer loop.
//! Each queue is FIFO and guarded by its own lock, so a push never waits on
//! the other queue and a poll returns immediately when nothing is queued.
use crate::models::{Message, RegistrationToken};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Default)]
pub struct ListenerBuffer {
    tokens: Mutex<VecDeque<RegistrationToken>>,
    messages: Mutex<VecDeque<Message>>,
}

impl ListenerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a newly issued registration token
    pub fn push_token(&self, token: impl Into<RegistrationToken>) {
        let mut tokens = self.tokens.lock();
        tokens.push_back(token.into());
        trace!(queued = tokens.len(), "Registration token queued");
    }

    /// Queue a received message
    pub fn push_message(&self, message: Message) {
        let mut messages = self.messages.lock();
        messages.push_back(message);
        trace!(queued = messages.len(), "Message queued");
    }

    /// Pop the oldest registration token, if any
    pub fn poll_token(&self) -> Option<RegistrationToken> {
        self.tokens.lock().pop_front()
    }

    /// Pop the oldest message, if any
    pub fn poll_message(&self) -> Option<Message> {
        self.messages.lock().pop_front()
    }

    pub fn pending_tokens(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.lock().len()
    }
}
