//! Vidq is a crate providing the core of a video download manager: an
//! in-memory queue of URLs driven through an external extraction engine
//! (yt-dlp by default) with a concurrency limit, pause/resume/cancel, and a
//! subscription interface for rendering progress.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidq::{QueueBuilder, YtDlpEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), vidq::Error> {
//! let queue = QueueBuilder::new()
//!     .directory("videos".into())
//!     .max_concurrent(2)
//!     .engine(Arc::new(YtDlpEngine::default()))
//!     .build();
//!
//! let mut events = queue.subscribe();
//! queue.add_urls("https://youtu.be/abc123, https://example.com/clip.mp4");
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//!     if queue.is_idle() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`queue`] - The queue controller, item model, events, and builder
//! - [`engine`] - The extraction engine trait and the shipped backends
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client construction for direct media downloads
//! - [`progress`] - Terminal progress rendering over the event stream
//! - [`utils`] - Input tokenization and display formatting helpers

pub mod engine;
pub mod error;
pub mod http;
pub mod progress;
pub mod queue;
pub mod utils;

pub use engine::direct::DirectEngine;
pub use engine::ytdlp::{YtDlpConfig, YtDlpEngine};
pub use engine::{EngineEvent, EventCallback, ExtractionEngine, StartRequest};
pub use error::{Error, Result};
pub use http::{browser_headers, build_client, HttpConfig};
pub use progress::{ProgressBarOpts, QueueDisplay, StyleOptions};
pub use queue::{
    DownloadItem, ItemId, ItemStatus, QueueBuilder, QueueConfig, QueueController, QueueEvent,
};
