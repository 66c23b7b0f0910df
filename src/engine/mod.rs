//! The extraction engine seam.
//!
//! The queue controller treats media extraction as a black box behind the
//! [`ExtractionEngine`] trait: start an item, best-effort pause/resume,
//! cancel, and a stream of [`EngineEvent`]s keyed by item id. Two backends
//! ship with the crate:
//!
//! - [`ytdlp`] - drives an external `yt-dlp` process per item
//! - [`direct`] - plain HTTP downloads for direct media links
//!
//! Engines spawn their workers and return immediately; every observable
//! effect arrives through the [`EventCallback`] passed to `start`/`resume`.

pub mod direct;
pub mod ytdlp;

use crate::queue::ItemId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Everything an engine needs to begin one extraction.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Queue item this work belongs to; echoed back in every event.
    pub id: ItemId,
    /// Source URL as the user pasted it.
    pub url: String,
    /// Directory to write the output file(s) under.
    pub directory: PathBuf,
}

/// Event reported back by an engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Transfer progress; `speed` is bytes per second, `eta` seconds.
    Progress {
        id: ItemId,
        percent: f32,
        speed: Option<f64>,
        eta: Option<u64>,
    },
    /// The item finished; `path` is the final output location.
    Completed { id: ItemId, path: PathBuf },
    /// The item failed with a human-readable message.
    Failed { id: ItemId, message: String },
}

/// Callback used by engines to report events back to the controller.
pub type EventCallback = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// A black-box extraction/download service.
///
/// All methods are fire-and-forget: implementations spawn their work onto
/// the tokio runtime and return immediately, so `start` and `resume` must be
/// called from within a runtime context.
pub trait ExtractionEngine: Send + Sync {
    /// Short engine name used in logs.
    fn name(&self) -> &str;

    /// Begin extraction for one item. Progress, completion, and failure are
    /// reported through `events`.
    fn start(&self, request: StartRequest, events: EventCallback);

    /// Suspend an in-flight item. Best effort: engines that cannot suspend
    /// mid-stream stop the transfer and remember its position instead.
    fn pause(&self, id: ItemId);

    /// Resume a paused item, restarting the transfer when in-place resume is
    /// not possible.
    fn resume(&self, request: StartRequest, events: EventCallback);

    /// Stop an in-flight item. Engines must not report further events for a
    /// cancelled id.
    fn cancel(&self, id: ItemId);
}

/// Terminal result of one worker run.
///
/// `Interrupted` means the worker stopped because of a pause or cancel; the
/// controller already recorded that state, so no event is emitted.
pub(crate) enum WorkerOutcome {
    Completed(PathBuf),
    Failed(String),
    Interrupted,
}

/// Cancel/pause flags shared between an engine front-end and its worker.
pub(crate) struct WorkerFlags {
    cancelled: AtomicBool,
    paused: AtomicBool,
    wake: Notify,
}

impl WorkerFlags {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            wake: Notify::new(),
        })
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub(crate) fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        self.is_cancelled() || self.is_paused()
    }

    /// Wait until `cancel` or `pause` is signalled. `Notify::notify_one`
    /// stores a permit, so a signal sent before the worker gets here is not
    /// lost.
    pub(crate) async fn woken(&self) {
        self.wake.notified().await;
    }
}

/// Live worker registry, one entry per in-flight item.
pub(crate) type WorkerRegistry = Mutex<HashMap<ItemId, Arc<WorkerFlags>>>;

pub(crate) fn register(workers: &WorkerRegistry, id: ItemId, flags: Arc<WorkerFlags>) {
    workers
        .lock()
        .expect("worker registry poisoned")
        .insert(id, flags);
}

/// Remove a finished worker's entry, unless a restarted worker for the same
/// id has already replaced it.
pub(crate) fn deregister(workers: &WorkerRegistry, id: ItemId, flags: &Arc<WorkerFlags>) {
    let mut registry = workers.lock().expect("worker registry poisoned");
    if registry
        .get(&id)
        .map(|current| Arc::ptr_eq(current, flags))
        .unwrap_or(false)
    {
        registry.remove(&id);
    }
}

pub(crate) fn signal_pause(workers: &WorkerRegistry, id: ItemId) {
    if let Some(flags) = workers.lock().expect("worker registry poisoned").get(&id) {
        flags.pause();
    }
}

pub(crate) fn signal_cancel(workers: &WorkerRegistry, id: ItemId) {
    if let Some(flags) = workers.lock().expect("worker registry poisoned").get(&id) {
        flags.cancel();
    }
}

/// Translate a worker outcome into its terminal event, if any.
pub(crate) fn emit_outcome(id: ItemId, outcome: WorkerOutcome, events: &EventCallback) {
    match outcome {
        WorkerOutcome::Completed(path) => events(EngineEvent::Completed { id, path }),
        WorkerOutcome::Failed(message) => events(EngineEvent::Failed { id, message }),
        WorkerOutcome::Interrupted => {}
    }
}
