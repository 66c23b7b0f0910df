//! Terminal progress rendering over the queue event stream.
//!
//! The queue controller knows nothing about terminals; it only broadcasts
//! [`QueueEvent`]s. This module is a reference subscriber: [`QueueDisplay`]
//! renders one progress bar per item and an overall bar counting finished
//! items, styled through [`StyleOptions`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use vidq::progress::{QueueDisplay, StyleOptions};
//! use vidq::QueueBuilder;
//!
//! # async fn example() {
//! let queue = QueueBuilder::new().build();
//! let display = QueueDisplay::new(queue.clone(), StyleOptions::default());
//! let renderer = tokio::spawn(display.run());
//!
//! queue.add_urls("https://a.test/v1");
//! let _ = renderer.await;
//! # }
//! ```
//!
//! [`QueueEvent`]: crate::queue::QueueEvent

pub mod display;
pub mod style;

pub use display::QueueDisplay;
pub use style::{ProgressBarOpts, StyleOptions};
