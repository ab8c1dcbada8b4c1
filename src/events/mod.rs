//! # Notifications
//!
//! User-facing notifications and the broadcast channel they are published on.

pub mod publisher;
pub mod types;

pub use publisher::{NotificationPublisher, PublishedNotification};
pub use types::Notification;
