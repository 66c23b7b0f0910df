//! Core queue controller implementation.
//!
//! The [`QueueController`] is the single authority over queue contents and
//! transition legality. User commands and engine callbacks both funnel into
//! one mutex-guarded state, so items are never mutated from two execution
//! contexts at once. The engine is fire-and-forget: commands return
//! immediately and their effect is observed through later engine events.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vidq::queue::QueueBuilder;
//!
//! # async fn example() -> Result<(), vidq::Error> {
//! let queue = QueueBuilder::new().max_concurrent(2).build();
//!
//! let ids = queue.add_urls("https://a.test/v1\nhttps://b.test/v2");
//! queue.pause(ids[0])?;
//! queue.resume(ids[0])?;
//! queue.cancel(ids[1])?;
//! # Ok(())
//! # }
//! ```

use super::config::QueueConfig;
use super::events::QueueEvent;
use super::item::{DownloadItem, ItemId, ItemStatus};
use crate::engine::{EngineEvent, EventCallback, ExtractionEngine, StartRequest};
use crate::error::{Error, Result};
use crate::utils::tokens::split_url_input;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Queue contents plus the bits of configuration that commands consult.
struct QueueState {
    items: Vec<DownloadItem>,
    next_id: u64,
    directory: PathBuf,
    max_concurrent: usize,
}

impl QueueState {
    fn item(&self, id: ItemId) -> Option<&DownloadItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut DownloadItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn downloading(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Downloading)
            .count()
    }

    /// Claim free slots: flip the earliest-added Queued items to Downloading
    /// and return the start requests to hand to the engine.
    fn admit(&mut self) -> Vec<StartRequest> {
        let mut requests = Vec::new();
        while self.downloading() < self.max_concurrent {
            let directory = self.directory.clone();
            let Some(item) = self
                .items
                .iter_mut()
                .find(|item| item.status == ItemStatus::Queued)
            else {
                break;
            };
            item.status = ItemStatus::Downloading;
            requests.push(StartRequest {
                id: item.id,
                url: item.url.clone(),
                directory,
            });
        }
        requests
    }
}

/// The download queue controller.
///
/// Cheap to clone; all clones share the same queue. Engine callbacks hold a
/// clone for the lifetime of their worker task.
#[derive(Clone)]
pub struct QueueController {
    state: Arc<Mutex<QueueState>>,
    engine: Arc<dyn ExtractionEngine>,
    events: broadcast::Sender<QueueEvent>,
}

impl fmt::Debug for QueueController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("QueueController")
            .field("engine", &self.engine.name())
            .field("items", &state.items.len())
            .field("max_concurrent", &state.max_concurrent)
            .finish()
    }
}

impl QueueController {
    pub(crate) fn new(config: QueueConfig, engine: Arc<dyn ExtractionEngine>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            state: Arc::new(Mutex::new(QueueState {
                items: Vec::new(),
                next_id: 1,
                directory: config.directory,
                max_concurrent: config.max_concurrent.max(1),
            })),
            engine,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().expect("queue state poisoned")
    }

    fn emit(&self, event: QueueEvent) {
        // Send only fails when nobody is subscribed; state stays authoritative.
        let _ = self.events.send(event);
    }

    /// The callback handed to the engine with every start/resume request.
    fn callback(&self) -> EventCallback {
        let controller = self.clone();
        Arc::new(move |event| match event {
            EngineEvent::Progress {
                id,
                percent,
                speed,
                eta,
            } => controller.on_progress(id, percent, speed, eta),
            EngineEvent::Completed { id, path } => controller.on_completed(id, path),
            EngineEvent::Failed { id, message } => controller.on_failed(id, message),
        })
    }

    /// Split pasted text into URL tokens and append one Queued item per
    /// token, in input order. Returns the ids of the created items.
    ///
    /// Empty tokens are silently dropped. No URL validation happens here;
    /// invalid URLs fail asynchronously through the engine.
    pub fn add_urls(&self, input: &str) -> Vec<ItemId> {
        let added: Vec<(ItemId, String)> = {
            let mut state = self.lock();
            split_url_input(input)
                .into_iter()
                .map(|url| {
                    let id = ItemId(state.next_id);
                    state.next_id += 1;
                    state.items.push(DownloadItem::new(id, url.clone()));
                    (id, url)
                })
                .collect()
        };
        for (id, url) in &added {
            debug!(%id, url = %url, "queued");
            self.emit(QueueEvent::Added {
                id: *id,
                url: url.clone(),
            });
        }
        self.start_next();
        added.into_iter().map(|(id, _)| id).collect()
    }

    /// Admission pass: start the earliest-added Queued items while fewer than
    /// `max_concurrent` items are Downloading. Runs after add, cancel,
    /// completion, and failure.
    fn start_next(&self) {
        let requests = self.lock().admit();
        for request in requests {
            debug!(id = %request.id, url = %request.url, "starting download");
            self.emit(QueueEvent::StatusChanged {
                id: request.id,
                status: ItemStatus::Downloading,
                error: None,
            });
            self.engine.start(request, self.callback());
        }
    }

    /// Suspend a downloading item.
    ///
    /// The engine stops or parks the transfer but remembers its position;
    /// the item keeps its progress. Paused items do not give their slot back,
    /// so resuming never has to wait for one.
    pub fn pause(&self, id: ItemId) -> Result<()> {
        {
            let mut state = self.lock();
            let item = state.item_mut(id).ok_or(Error::UnknownItem(id))?;
            if item.status != ItemStatus::Downloading {
                return Err(Error::InvalidTransition {
                    id,
                    status: item.status,
                    action: "pause",
                });
            }
            item.status = ItemStatus::Paused;
            item.clear_transients();
        }
        debug!(%id, "paused");
        self.engine.pause(id);
        self.emit(QueueEvent::StatusChanged {
            id,
            status: ItemStatus::Paused,
            error: None,
        });
        Ok(())
    }

    /// Resume a paused item.
    ///
    /// Engines that cannot resume in place restart the transfer from the
    /// remembered position; either way this surfaces as Paused → Downloading.
    pub fn resume(&self, id: ItemId) -> Result<()> {
        let request = {
            let mut state = self.lock();
            let directory = state.directory.clone();
            let item = state.item_mut(id).ok_or(Error::UnknownItem(id))?;
            if item.status != ItemStatus::Paused {
                return Err(Error::InvalidTransition {
                    id,
                    status: item.status,
                    action: "resume",
                });
            }
            item.status = ItemStatus::Downloading;
            StartRequest {
                id,
                url: item.url.clone(),
                directory,
            }
        };
        debug!(%id, "resumed");
        self.engine.resume(request, self.callback());
        self.emit(QueueEvent::StatusChanged {
            id,
            status: ItemStatus::Downloading,
            error: None,
        });
        Ok(())
    }

    /// Cancel a queued, downloading, or paused item.
    ///
    /// The item is marked Cancelled immediately; any late engine callback for
    /// it is dropped. Cancelling frees a slot, so the next queued item starts.
    pub fn cancel(&self, id: ItemId) -> Result<()> {
        let was_active = {
            let mut state = self.lock();
            let item = state.item_mut(id).ok_or(Error::UnknownItem(id))?;
            match item.status {
                ItemStatus::Queued | ItemStatus::Downloading | ItemStatus::Paused => {
                    let was_active = item.status.is_active();
                    item.status = ItemStatus::Cancelled;
                    item.clear_transients();
                    was_active
                }
                status => {
                    return Err(Error::InvalidTransition {
                        id,
                        status,
                        action: "cancel",
                    });
                }
            }
        };
        debug!(%id, "cancelled");
        if was_active {
            self.engine.cancel(id);
        }
        self.emit(QueueEvent::StatusChanged {
            id,
            status: ItemStatus::Cancelled,
            error: None,
        });
        self.start_next();
        Ok(())
    }

    /// Progress report from the engine.
    ///
    /// Applied only while the item is Downloading; anything else is a stale
    /// callback racing a pause or cancel and is dropped. Progress never
    /// decreases: restarted transfers are clamped to the floor already shown.
    pub fn on_progress(&self, id: ItemId, percent: f32, speed: Option<f64>, eta: Option<u64>) {
        let applied = {
            let mut state = self.lock();
            match state.item_mut(id) {
                Some(item) if item.status == ItemStatus::Downloading => {
                    item.progress = item.progress.max(percent.clamp(0.0, 100.0));
                    item.speed = speed;
                    item.eta = eta;
                    Some(item.progress)
                }
                _ => None,
            }
        };
        match applied {
            Some(percent) => self.emit(QueueEvent::Progress {
                id,
                percent,
                speed,
                eta,
            }),
            None => debug!(%id, "dropping stale progress callback"),
        }
    }

    /// Completion report from the engine.
    ///
    /// Accepted from Downloading or Paused (the engine may finish in the
    /// window where a pause was requested); ignored after cancel.
    pub fn on_completed(&self, id: ItemId, path: PathBuf) {
        let applied = {
            let mut state = self.lock();
            match state.item_mut(id) {
                Some(item) if item.status.is_active() => {
                    item.status = ItemStatus::Completed;
                    item.progress = 100.0;
                    item.destination = Some(path);
                    item.clear_transients();
                    true
                }
                _ => false,
            }
        };
        if applied {
            debug!(%id, "completed");
            self.emit(QueueEvent::StatusChanged {
                id,
                status: ItemStatus::Completed,
                error: None,
            });
            self.start_next();
        } else {
            debug!(%id, "dropping stale completion callback");
        }
    }

    /// Failure report from the engine.
    ///
    /// Records the message on the item and frees the slot. One item failing
    /// never affects the rest of the queue.
    pub fn on_failed(&self, id: ItemId, message: impl Into<String>) {
        let message = message.into();
        let applied = {
            let mut state = self.lock();
            match state.item_mut(id) {
                Some(item) if item.status.is_active() => {
                    item.status = ItemStatus::Failed;
                    item.error = Some(message.clone());
                    item.clear_transients();
                    true
                }
                _ => false,
            }
        };
        if applied {
            warn!(%id, message = %message, "download failed");
            self.emit(QueueEvent::StatusChanged {
                id,
                status: ItemStatus::Failed,
                error: Some(message),
            });
            self.start_next();
        } else {
            debug!(%id, "dropping stale failure callback");
        }
    }

    /// Remove all Completed, Cancelled, and Failed items. Returns how many
    /// were removed. Idempotent.
    pub fn clear_completed(&self) -> usize {
        let removed: Vec<ItemId> = {
            let mut state = self.lock();
            let removed = state
                .items
                .iter()
                .filter(|item| item.status.is_terminal())
                .map(|item| item.id)
                .collect::<Vec<_>>();
            state.items.retain(|item| !item.status.is_terminal());
            removed
        };
        let count = removed.len();
        if count > 0 {
            debug!(count, "cleared finished items");
            self.emit(QueueEvent::Cleared { removed });
        }
        count
    }

    /// Pause every downloading item. Returns how many were paused.
    pub fn pause_all(&self) -> usize {
        let ids: Vec<ItemId> = {
            let state = self.lock();
            state
                .items
                .iter()
                .filter(|item| item.status == ItemStatus::Downloading)
                .map(|item| item.id)
                .collect()
        };
        ids.into_iter()
            .filter(|id| self.pause(*id).is_ok())
            .count()
    }

    /// Resume every paused item. Returns how many were resumed.
    pub fn resume_all(&self) -> usize {
        let ids: Vec<ItemId> = {
            let state = self.lock();
            state
                .items
                .iter()
                .filter(|item| item.status == ItemStatus::Paused)
                .map(|item| item.id)
                .collect()
        };
        ids.into_iter()
            .filter(|id| self.resume(*id).is_ok())
            .count()
    }

    /// Cancel every item that is not yet finished. Returns how many were
    /// cancelled. Intended for shutdown.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<ItemId> = {
            let state = self.lock();
            state
                .items
                .iter()
                .filter(|item| !item.status.is_terminal())
                .map(|item| item.id)
                .collect()
        };
        ids.into_iter()
            .filter(|id| self.cancel(*id).is_ok())
            .count()
    }

    /// Read-only ordered snapshot of all items, for rendering.
    pub fn snapshot(&self) -> Vec<DownloadItem> {
        self.lock().items.clone()
    }

    /// Look up a single item by id.
    pub fn item(&self, id: ItemId) -> Option<DownloadItem> {
        self.lock().item(id).cloned()
    }

    /// Subscribe to queue change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Output directory for subsequently started items.
    pub fn directory(&self) -> PathBuf {
        self.lock().directory.clone()
    }

    /// Change the output directory. Items already started keep writing to
    /// their original location.
    pub fn set_directory(&self, directory: PathBuf) {
        self.lock().directory = directory;
    }

    /// The configured concurrency limit.
    pub fn max_concurrent(&self) -> usize {
        self.lock().max_concurrent
    }

    /// True when no item is queued, downloading, or paused.
    pub fn is_idle(&self) -> bool {
        self.lock()
            .items
            .iter()
            .all(|item| item.status.is_terminal())
    }
}
