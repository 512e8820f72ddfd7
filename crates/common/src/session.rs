//! Session store: current user plus the queue of user-facing messages.
//!
//! A single [`SessionStore`] exists per application context. The signup
//! controller and any seeding code hold a [`SessionHandle`] to it rather than
//! reaching into global state.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::types::{CurrentUser, Identity};

/// Pending user-facing messages, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    pub message: Vec<String>,
}

impl Messages {
    pub fn len(&self) -> usize {
        self.message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.message.last().map(String::as_str)
    }
}

/// Read-only snapshot of the application state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub user: CurrentUser,
    pub messages: Messages,
}

/// State changes that can be dispatched against the store.
///
/// Serialises as `{"type": "...", "payload": ...}` so seeding code can send
/// the same documents the web client dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    #[serde(rename = "user/setCurrentUser")]
    SetCurrentUser(Identity),
    #[serde(rename = "messages/append")]
    AppendMessage(String),
    #[serde(rename = "messages/clear")]
    ClearMessages,
}

/// Owned session state
#[derive(Debug, Default)]
pub struct SessionStore {
    state: AppState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replace the current user in one step
    pub fn set_current_user(&mut self, identity: Identity) {
        debug!(email = %identity.email, roles = %identity.roles.describe(), "Setting current user");
        self.state.user = CurrentUser::Authenticated(identity);
    }

    pub fn append_message(&mut self, text: impl Into<String>) {
        self.state.messages.message.push(text.into());
    }

    pub fn clear_messages(&mut self) {
        self.state.messages.message.clear();
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetCurrentUser(identity) => self.set_current_user(identity),
            Action::AppendMessage(text) => self.append_message(text),
            Action::ClearMessages => self.clear_messages(),
        }
    }
}

/// Shared handle to a [`SessionStore`].
///
/// Clones point at the same store. Every method takes the lock for the
/// duration of the call only, so a handle is safe to use around awaits.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionStore>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AppState {
        self.inner.read().state().clone()
    }

    pub fn current_user(&self) -> CurrentUser {
        self.inner.read().state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().state().user.is_authenticated()
    }

    pub fn message_count(&self) -> usize {
        self.inner.read().state().messages.len()
    }

    pub fn set_current_user(&self, identity: Identity) {
        self.inner.write().set_current_user(identity);
    }

    pub fn append_message(&self, text: impl Into<String>) {
        self.inner.write().append_message(text);
    }

    /// Append several messages under one lock so observers never see a
    /// partially recorded failure
    pub fn append_messages<I, S>(&self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = self.inner.write();
        for text in texts {
            store.append_message(text);
        }
    }

    pub fn dispatch(&self, action: Action) {
        self.inner.write().dispatch(action);
    }
}
