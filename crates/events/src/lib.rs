//! ModGuard notification infrastructure.
//!
//! Transient, user-facing notifications ("toasts") raised by the review
//! workflow are published on a [`NotificationBus`] and rendered by whatever
//! front-end subscribes to it.

pub mod bus;

pub use bus::{Notification, NotificationBus, NotificationVariant};
