use super::types::Notification;
use crate::config::NotificationConfig;
use tokio::sync::broadcast;
use tracing::debug;

/// Fan-out publisher for dashboard notifications
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    sender: broadcast::Sender<PublishedNotification>,
}

/// Notification that has been published
#[derive(Debug, Clone)]
pub struct PublishedNotification {
    pub notification: Notification,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationPublisher {
    /// Create a new publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, usize::MAX / 2));
        Self { sender }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Publish a notification to every current subscriber, returning how many
    /// received it
    pub fn publish(&self, notification: Notification) -> usize {
        let name = notification.name();
        let published = PublishedNotification {
            notification,
            published_at: chrono::Utc::now(),
        };

        // Nobody listening is fine; the notification is simply dropped
        match self.sender.send(published) {
            Ok(receivers) => {
                debug!(event = name, receivers, "Published notification");
                receivers
            }
            Err(broadcast::error::SendError(_)) => {
                debug!(event = name, "Published notification with no subscribers");
                0
            }
        }
    }

    /// Publish several notifications in order
    pub fn publish_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.publish(notification);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationPublisher {
    fn default() -> Self {
        Self::from_config(&NotificationConfig::default())
    }
}
