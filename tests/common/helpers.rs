use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use vidq::engine::{EngineEvent, EventCallback, ExtractionEngine, StartRequest};
use vidq::queue::{ItemId, QueueBuilder, QueueController};

// Common test URLs
pub const URL_A: &str = "https://a.test";
pub const URL_B: &str = "https://b.test";
pub const URL_C: &str = "https://c.test";

/// Scripted extraction engine: records every call the controller makes and
/// lets tests fire engine events by hand. Events are delivered synchronously,
/// so controller state is deterministic after each helper call.
#[derive(Default)]
pub struct MockEngine {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    started: Vec<StartRequest>,
    paused: Vec<ItemId>,
    resumed: Vec<ItemId>,
    cancelled: Vec<ItemId>,
    callbacks: HashMap<ItemId, EventCallback>,
}

impl MockEngine {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().expect("mock engine poisoned")
    }

    /// Every start request received, in order.
    pub fn started(&self) -> Vec<StartRequest> {
        self.lock().started.clone()
    }

    pub fn started_ids(&self) -> Vec<ItemId> {
        self.lock().started.iter().map(|r| r.id).collect()
    }

    pub fn paused_ids(&self) -> Vec<ItemId> {
        self.lock().paused.clone()
    }

    pub fn resumed_ids(&self) -> Vec<ItemId> {
        self.lock().resumed.clone()
    }

    pub fn cancelled_ids(&self) -> Vec<ItemId> {
        self.lock().cancelled.clone()
    }

    fn callback(&self, id: ItemId) -> EventCallback {
        self.lock()
            .callbacks
            .get(&id)
            .expect("engine was never started for this item")
            .clone()
    }

    /// Fire a progress event as the engine would.
    pub fn progress(&self, id: ItemId, percent: f32) {
        // Release the registry lock before calling back into the controller.
        let callback = self.callback(id);
        callback(EngineEvent::Progress {
            id,
            percent,
            speed: Some(1_048_576.0),
            eta: Some(30),
        });
    }

    /// Fire a completion event as the engine would.
    pub fn complete(&self, id: ItemId, path: &str) {
        let callback = self.callback(id);
        callback(EngineEvent::Completed {
            id,
            path: PathBuf::from(path),
        });
    }

    /// Fire a failure event as the engine would.
    pub fn fail(&self, id: ItemId, message: &str) {
        let callback = self.callback(id);
        callback(EngineEvent::Failed {
            id,
            message: message.to_string(),
        });
    }
}

impl ExtractionEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn start(&self, request: StartRequest, events: EventCallback) {
        let mut inner = self.lock();
        inner.callbacks.insert(request.id, events);
        inner.started.push(request);
    }

    fn pause(&self, id: ItemId) {
        self.lock().paused.push(id);
    }

    fn resume(&self, request: StartRequest, events: EventCallback) {
        let mut inner = self.lock();
        inner.callbacks.insert(request.id, events);
        inner.resumed.push(request.id);
    }

    fn cancel(&self, id: ItemId) {
        self.lock().cancelled.push(id);
    }
}

/// Controller wired to a fresh mock engine and a temp output directory.
/// Keep the `TempDir` binding alive for the duration of the test.
pub fn mock_queue(max_concurrent: usize) -> (QueueController, Arc<MockEngine>, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let engine = Arc::new(MockEngine::default());
    let controller = QueueBuilder::new()
        .directory(dir.path().to_path_buf())
        .max_concurrent(max_concurrent)
        .engine(engine.clone())
        .build();
    (controller, engine, dir)
}

/// Assert that no more than `max` items are downloading at once.
pub fn assert_downloading_within_limit(controller: &QueueController, max: usize) {
    let downloading = controller
        .snapshot()
        .iter()
        .filter(|item| item.status == vidq::queue::ItemStatus::Downloading)
        .count();
    assert!(
        downloading <= max,
        "{downloading} items downloading, limit is {max}"
    );
}
