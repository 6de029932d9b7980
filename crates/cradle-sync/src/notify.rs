//! User-facing notifications
//!
//! Edits are fire-and-forget; their failures reach the user through a
//! [`Notifier`] side channel (a toast in the console).

use crate::types::EntityId;
use std::fmt::Debug;
use tokio::sync::mpsc;

/// Transient error message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Human-readable text
    pub message: String,
    /// Profile concerned
    pub entity_id: Option<EntityId>,
    /// Edited field, when the notice is about one
    pub field: Option<String>,
}

impl Notice {
    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            entity_id: None,
            field: None,
        }
    }

    /// Attach the profile
    #[must_use]
    pub fn for_entity(mut self, entity_id: &EntityId) -> Self {
        self.entity_id = Some(entity_id.clone());
        self
    }

    /// Attach the edited field
    #[must_use]
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Side channel for user notifications
pub trait Notifier: Send + Sync + Debug {
    /// Deliver a notice; must not block
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let entity = notice.entity_id.as_ref().map(EntityId::as_str);
        let field = notice.field.as_deref();
        tracing::error!(entity_id = ?entity, field = ?field, "{}", notice.message);
    }
}

/// Notifier that forwards notices to a channel a UI can drain
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create notifier and its receiving end
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            tracing::debug!("notice dropped: receiver gone");
        }
    }
}
