//! Configuration and defaults for the queue controller.

use std::env::current_dir;
use std::path::PathBuf;

/// Subdirectory of the working directory used when no directory is chosen.
const DEFAULT_SUBDIR: &str = "videos";

/// Configuration for a [`QueueController`].
///
/// [`QueueController`]: crate::queue::QueueController
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Directory where downloaded files are written. Applies to items
    /// admitted after the value changes.
    pub directory: PathBuf,
    /// Maximum number of items downloading at the same time.
    pub max_concurrent: usize,
    /// Capacity of the event broadcast channel. Slow subscribers that fall
    /// more than this many events behind see a `Lagged` error and should
    /// re-read the snapshot.
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            max_concurrent: 3,
            event_capacity: 256,
        }
    }
}

/// Default download location: `videos/` under the working directory.
pub fn default_directory() -> PathBuf {
    current_dir().unwrap_or_default().join(DEFAULT_SUBDIR)
}
