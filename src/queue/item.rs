//! The download item model.
//!
//! A [`DownloadItem`] represents one queued URL and its current state. Items
//! are created by [`QueueController::add_urls`] and live until removed by
//! `clear_completed`; the controller hands out clones, never references.
//!
//! [`QueueController::add_urls`]: crate::queue::QueueController::add_urls

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Identifier assigned to a [`DownloadItem`] when it enters the queue.
///
/// Ids are sequential per controller and never reused, so they stay valid as
/// sort keys even after items are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(pub(crate) u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a download item.
///
/// Transitions are one-directional except `Downloading` ↔ `Paused`:
///
/// ```text
/// Queued ─> Downloading ─> Completed
///               │  ▲  │
///               ▼  │  ├─────> Failed
///             Paused └─────> Cancelled
/// ```
///
/// `Queued` and `Paused` items can also move straight to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Waiting for a free download slot.
    Queued,
    /// The engine is working on this item.
    Downloading,
    /// Suspended by the user; the engine remembers its position.
    Paused,
    /// Finished successfully.
    Completed,
    /// Stopped by the user.
    Cancelled,
    /// The engine reported an error.
    Failed,
}

impl ItemStatus {
    /// Whether the engine currently holds work for this item.
    pub fn is_active(&self) -> bool {
        matches!(self, ItemStatus::Downloading | ItemStatus::Paused)
    }

    /// Terminal states, removable via `clear_completed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Completed | ItemStatus::Cancelled | ItemStatus::Failed
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemStatus::Queued => "Queued",
            ItemStatus::Downloading => "Downloading",
            ItemStatus::Paused => "Paused",
            ItemStatus::Completed => "Completed",
            ItemStatus::Cancelled => "Cancelled",
            ItemStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// One queued URL and its current state.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadItem {
    /// Unique id, assigned at creation.
    pub id: ItemId,
    /// Source URL, immutable after creation.
    pub url: String,
    /// Current lifecycle state.
    pub status: ItemStatus,
    /// Percentage 0-100, non-decreasing while downloading.
    pub progress: f32,
    /// Transfer rate in bytes per second; present only while downloading.
    pub speed: Option<f64>,
    /// Estimated seconds remaining; present only while downloading.
    pub eta: Option<u64>,
    /// Final output path, known once the engine reports completion.
    pub destination: Option<PathBuf>,
    /// Human-readable failure message; present only when `Failed`.
    pub error: Option<String>,
}

impl DownloadItem {
    pub(crate) fn new(id: ItemId, url: String) -> Self {
        Self {
            id,
            url,
            status: ItemStatus::Queued,
            progress: 0.0,
            speed: None,
            eta: None,
            destination: None,
            error: None,
        }
    }

    /// Drop the display metrics that are only meaningful while downloading.
    pub(crate) fn clear_transients(&mut self) {
        self.speed = None;
        self.eta = None;
    }
}
