//! Queue change notifications.
//!
//! Every mutation of queue state produces exactly one [`QueueEvent`] on the
//! controller's broadcast channel. A presentation layer subscribes via
//! [`QueueController::subscribe`] and either patches its view from the event
//! payload or re-reads the full snapshot.
//!
//! Events serialize with a `"event"` tag so they can be shipped as-is to a
//! webview or IPC boundary.
//!
//! [`QueueController::subscribe`]: crate::queue::QueueController::subscribe

use super::item::{ItemId, ItemStatus};
use serde::Serialize;

/// A single queue state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A new item entered the queue.
    Added { id: ItemId, url: String },
    /// An item moved to a new lifecycle state.
    StatusChanged {
        id: ItemId,
        status: ItemStatus,
        /// Failure message when `status` is `Failed`.
        error: Option<String>,
    },
    /// Progress update for a downloading item.
    Progress {
        id: ItemId,
        percent: f32,
        speed: Option<f64>,
        eta: Option<u64>,
    },
    /// Terminal items removed by `clear_completed`.
    Cleared { removed: Vec<ItemId> },
}
