//! Queue module containing the controller, item model, events, and builder.
//!
//! # Overview
//!
//! The queue module is organized into five components:
//!
//! - [`item`] - The `DownloadItem` record with its id and lifecycle status
//! - [`events`] - `QueueEvent` notifications broadcast on every state change
//! - [`controller`] - The `QueueController`, single authority over the queue
//! - [`builder`] - `QueueBuilder` for configuring a controller
//! - [`config`] - Configuration defaults
//!
//! # Examples
//!
//! ```rust
//! use vidq::queue::QueueBuilder;
//!
//! // A controller over the default yt-dlp engine, two downloads at a time.
//! let queue = QueueBuilder::new().max_concurrent(2).build();
//! assert!(queue.is_idle());
//! ```

pub mod builder;
pub mod config;
pub mod controller;
pub mod events;
pub mod item;

pub use builder::QueueBuilder;
pub use config::QueueConfig;
pub use controller::QueueController;
pub use events::QueueEvent;
pub use item::{DownloadItem, ItemId, ItemStatus};
