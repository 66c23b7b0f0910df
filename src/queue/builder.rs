//! Builder pattern implementation for creating queue controllers.
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust
//! use vidq::queue::QueueBuilder;
//! use std::path::PathBuf;
//!
//! let queue = QueueBuilder::new()
//!     .directory(PathBuf::from("./videos"))
//!     .max_concurrent(2)
//!     .build();
//! ```
//!
//! ## Picking an Engine
//!
//! ```rust
//! use std::sync::Arc;
//! use vidq::engine::direct::DirectEngine;
//! use vidq::queue::QueueBuilder;
//!
//! // Plain HTTP downloads only, no yt-dlp process involved.
//! let queue = QueueBuilder::new()
//!     .engine(Arc::new(DirectEngine::default()))
//!     .build();
//! ```

use super::config::QueueConfig;
use super::controller::QueueController;
use crate::engine::ytdlp::YtDlpEngine;
use crate::engine::ExtractionEngine;

use std::path::PathBuf;
use std::sync::Arc;

/// A builder used to create a [`QueueController`].
#[derive(Default)]
pub struct QueueBuilder {
    config: QueueConfig,
    engine: Option<Arc<dyn ExtractionEngine>>,
}

impl QueueBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        QueueBuilder::default()
    }

    /// Sets the directory where downloads are written.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Set the maximum number of simultaneous downloads (minimum 1).
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.config.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Set the capacity of the event broadcast channel.
    pub fn event_capacity(mut self, event_capacity: usize) -> Self {
        self.config.event_capacity = event_capacity;
        self
    }

    /// Set the extraction engine driving the downloads.
    ///
    /// Defaults to [`YtDlpEngine`] resolved from `PATH`.
    pub fn engine(mut self, engine: Arc<dyn ExtractionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Create the [`QueueController`] with the specified options.
    pub fn build(self) -> QueueController {
        let engine = self
            .engine
            .unwrap_or_else(|| Arc::new(YtDlpEngine::default()));
        QueueController::new(self.config, engine)
    }
}
