use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    Info,
    Success,
    Error,
}

impl NotificationStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            NotificationStyle::Info => "toast-info",
            NotificationStyle::Success => "toast-success",
            NotificationStyle::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotificationStyle::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotificationStyle::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotificationStyle::Error,
        }
    }
}

/// Receives short user-facing messages for transient display.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
}

/// Toasts currently on screen, oldest first. Older toasts are dropped
/// once `limit` is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
    limit: usize,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_limit(3)
    }
}

impl ToastQueue {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            toasts: Vec::new(),
            next_id: 0,
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast { id, notification });
        if self.toasts.len() > self.limit {
            let overflow = self.toasts.len() - self.limit;
            self.toasts.drain(..overflow);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}
