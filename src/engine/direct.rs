//! Direct HTTP downloads for URLs that point straight at a media file.
//!
//! This backend streams the response body to disk with the middleware client
//! from [`crate::http`], resuming from whatever partial file is already on
//! disk via a `Range` request. Pause drops the stream and keeps the partial
//! file; resume issues a fresh ranged request, so nothing already fetched is
//! downloaded twice. Cancel discards the partial file.

use super::{
    deregister, emit_outcome, register, signal_cancel, signal_pause, EngineEvent, EventCallback,
    ExtractionEngine, StartRequest, WorkerFlags, WorkerOutcome, WorkerRegistry,
};
use crate::error::Error;
use crate::http::{build_client, HttpConfig};
use crate::queue::ItemId;

use futures::StreamExt;
use reqwest::header::{CONTENT_RANGE, RANGE, REFERER};
use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File extensions treated as direct media links.
pub(crate) const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mkv", ".avi", ".mov", ".flv"];

/// Check whether the URL points straight at a media file.
pub(crate) fn is_direct_media_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Derive the output file name from the last URL path segment,
/// percent-decoded. Returns `None` when the path has no usable segment.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let name = url.path_segments()?.next_back()?;
    if name.is_empty() {
        return None;
    }
    let decoded: String = form_urlencoded::parse(name.as_bytes())
        .map(|(key, val)| [key, val].concat())
        .collect();
    Some(decoded)
}

/// Extraction engine for direct media links over plain HTTP.
pub struct DirectEngine {
    http: HttpConfig,
    workers: Arc<WorkerRegistry>,
}

impl Default for DirectEngine {
    fn default() -> Self {
        Self::new(HttpConfig::default())
    }
}

impl DirectEngine {
    /// Create an engine with the given HTTP options.
    pub fn new(http: HttpConfig) -> Self {
        Self {
            http,
            workers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn launch(&self, request: StartRequest, events: EventCallback) {
        let flags = WorkerFlags::new();
        register(&self.workers, request.id, flags.clone());
        let http = self.http.clone();
        let workers = self.workers.clone();
        tokio::spawn(async move {
            let outcome = match build_client(http) {
                Ok(client) => fetch(&client, &request, &flags, &events).await,
                Err(e) => WorkerOutcome::Failed(format!("failed to build HTTP client: {e}")),
            };
            deregister(&workers, request.id, &flags);
            emit_outcome(request.id, outcome, &events);
        });
    }
}

impl ExtractionEngine for DirectEngine {
    fn name(&self) -> &str {
        "direct-http"
    }

    fn start(&self, request: StartRequest, events: EventCallback) {
        self.launch(request, events);
    }

    fn pause(&self, id: ItemId) {
        signal_pause(&self.workers, id);
    }

    fn resume(&self, request: StartRequest, events: EventCallback) {
        // The paused worker already exited; a fresh ranged request picks up
        // where the partial file ends.
        self.launch(request, events);
    }

    fn cancel(&self, id: ItemId) {
        signal_cancel(&self.workers, id);
    }
}

/// Run one direct fetch to its terminal outcome. Shared with the yt-dlp
/// engine's direct-link fallback.
pub(crate) async fn fetch(
    client: &ClientWithMiddleware,
    request: &StartRequest,
    flags: &WorkerFlags,
    events: &EventCallback,
) -> WorkerOutcome {
    match try_fetch(client, request, flags, events).await {
        Ok(Some(path)) => WorkerOutcome::Completed(path),
        Ok(None) => WorkerOutcome::Interrupted,
        // An error racing a pause/cancel (e.g. the connection dying as we
        // stop reading) is not a failure the user should see.
        Err(_) if flags.is_interrupted() => WorkerOutcome::Interrupted,
        Err(e) => WorkerOutcome::Failed(e.to_string()),
    }
}

/// `Ok(None)` means the transfer was interrupted by pause or cancel.
async fn try_fetch(
    client: &ClientWithMiddleware,
    request: &StartRequest,
    flags: &WorkerFlags,
    events: &EventCallback,
) -> crate::Result<Option<PathBuf>> {
    let url = Url::parse(&request.url)
        .map_err(|e| Error::InvalidUrl(format!("\"{}\" cannot be parsed: {e}", request.url)))?;
    let filename =
        filename_from_url(&url).unwrap_or_else(|| format!("video-{}.mp4", request.id));
    let destination = request.directory.join(&filename);
    fs::create_dir_all(&request.directory).await?;

    // Resume from whatever is already on disk.
    let existing = match fs::metadata(&destination).await {
        Ok(meta) => meta.len(),
        Err(_) => 0,
    };

    let mut req = client.get(url).header(REFERER, request.url.clone());
    if existing > 0 {
        req = req.header(RANGE, format!("bytes={existing}-"));
    }
    let response = req.send().await?;

    // A 200 to a ranged request means the server restarted from zero.
    let offset = if existing > 0 && response.status() == StatusCode::PARTIAL_CONTENT {
        existing
    } else {
        0
    };
    response.error_for_status_ref()?;
    let total = content_length(&response, offset);
    debug!(
        id = %request.id,
        destination = %destination.display(),
        offset,
        total,
        "fetching direct media link"
    );

    let mut file = if offset > 0 {
        OpenOptions::new().append(true).open(&destination).await?
    } else {
        File::create(&destination).await?
    };

    let mut downloaded = offset;
    let session_start = offset;
    let started = Instant::now();
    let mut last_percent = -1.0_f32;
    let mut stream = response.bytes_stream();

    loop {
        if flags.is_cancelled() {
            drop(file);
            let _ = fs::remove_file(&destination).await;
            return Ok(None);
        }
        if flags.is_paused() {
            file.flush().await?;
            debug!(id = %request.id, bytes = downloaded, "transfer parked for pause");
            return Ok(None);
        }

        let chunk = tokio::select! {
            chunk = stream.next() => chunk,
            _ = flags.woken() => continue,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total {
            let percent = (downloaded as f32 / total as f32 * 100.0).min(100.0);
            // Events are throttled to whole-percent steps.
            if percent - last_percent >= 1.0 || percent >= 100.0 {
                last_percent = percent;
                let elapsed = started.elapsed().as_secs_f64();
                let speed = (elapsed > 0.0)
                    .then(|| (downloaded - session_start) as f64 / elapsed)
                    .filter(|speed| *speed > 0.0);
                let eta = speed.map(|speed| ((total - downloaded) as f64 / speed) as u64);
                events(EngineEvent::Progress {
                    id: request.id,
                    percent,
                    speed,
                    eta,
                });
            }
        }
    }

    file.flush().await?;
    Ok(Some(destination))
}

/// Full size of the resource, if the server told us.
fn content_length(response: &reqwest::Response, offset: u64) -> Option<u64> {
    // Content-Range carries the full size on ranged responses: "bytes a-b/total".
    if let Some(range) = response.headers().get(CONTENT_RANGE) {
        let total = range
            .to_str()
            .ok()
            .and_then(|value| value.split('/').next_back())
            .and_then(|value| value.trim().parse::<u64>().ok());
        if total.is_some() {
            return total;
        }
    }
    response
        .content_length()
        .map(|len| len + offset)
        .filter(|len| *len > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_media_url_detection() {
        assert!(is_direct_media_url("https://cdn.test/clip.mp4"));
        assert!(is_direct_media_url("https://cdn.test/CLIP.MKV"));
        assert!(is_direct_media_url("https://cdn.test/clip.webm?token=abc"));
        assert!(!is_direct_media_url("https://youtu.be/abc123"));
        assert!(!is_direct_media_url("https://cdn.test/clip.mp3"));
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://cdn.test/media/My%20Clip.mp4").unwrap();
        assert_eq!(filename_from_url(&url), Some("My Clip.mp4".to_string()));

        let url = Url::parse("https://cdn.test/").unwrap();
        assert_eq!(filename_from_url(&url), None);
    }
}
