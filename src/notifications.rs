//! User-facing notifications
//!
//! Domain components never print. They push [`Notification`]s into a channel
//! and whatever front end is attached decides how to show them.

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

/// Something worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The loyalty balance went up.
    PointsEarned {
        /// Points gained since the last observed balance.
        points: u64,
    },

    /// The loyalty balance went down.
    PointsUsed {
        /// Points spent since the last observed balance.
        points: u64,
    },

    /// An operation finished successfully.
    Success {
        /// Text shown to the user.
        message: String,
    },

    /// An operation failed.
    Error {
        /// Text shown to the user.
        message: String,
    },

    /// The backend was unreachable and cached data is being shown.
    OfflineMode,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointsEarned { points } => write!(f, "You earned {points} loyalty points!"),
            Self::PointsUsed { points } => write!(f, "You used {points} loyalty points."),
            Self::Success { message } | Self::Error { message } => f.write_str(message),
            Self::OfflineMode => f.write_str("Using offline mode with cached data"),
        }
    }
}

/// Sending half of the notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notification>>,
}

/// Receiving half of the notification channel.
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

impl Notifier {
    /// Create a connected notifier and its receiver.
    #[must_use]
    pub fn channel() -> (Self, NotificationReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A notifier that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Publish a notification. Delivery is best-effort.
    pub fn notify(&self, notification: Notification) {
        trace!(%notification, "notification");

        if let Some(sender) = &self.sender
            && sender.send(notification).is_err()
        {
            trace!("notification receiver dropped");
        }
    }

    /// Publish a [`Notification::Success`].
    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::Success {
            message: message.into(),
        });
    }

    /// Publish a [`Notification::Error`].
    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::Error {
            message: message.into(),
        });
    }
}

/// Drain everything currently queued on `receiver`.
pub fn drain(receiver: &mut NotificationReceiver) -> Vec<Notification> {
    let mut notifications = Vec::new();

    while let Ok(notification) = receiver.try_recv() {
        notifications.push(notification);
    }

    notifications
}
