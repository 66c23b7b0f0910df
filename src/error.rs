//! Error handling for the vidq library.
//!
//! This module provides centralized error handling for queue operations and
//! the shipped engines. Transition errors carry the item id and the state it
//! was actually in, so callers can report exactly why a command was rejected.

use crate::queue::{ItemId, ItemStatus};
use std::io;
use thiserror::Error;

/// Errors that can happen when using vidq.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system that fits no other category.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    ///
    /// Only the direct HTTP engine parses URLs eagerly; the queue itself
    /// accepts any token and lets the engine fail asynchronously.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The id does not match any item currently in the queue.
    #[error("Unknown download item: {0}")]
    UnknownItem(ItemId),

    /// The requested command is not legal for the item's current status,
    /// e.g. pausing an item that is not downloading. The item state is left
    /// untouched.
    #[error("Cannot {action} item {id} while {status}")]
    InvalidTransition {
        id: ItemId,
        status: ItemStatus,
        action: &'static str,
    },

    /// I/O Error.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Request error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the HTTP middleware stack (retries exhausted, etc.).
    #[error("Request error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },
}

/// Result type alias for operations that can fail with a vidq error.
pub type Result<T> = std::result::Result<T, Error>;
