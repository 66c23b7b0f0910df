//! Extraction backend driving an external `yt-dlp` process per item.
//!
//! yt-dlp handles the actual site extraction, format negotiation, and
//! transport; this module only wires its stdout into engine events. Progress
//! lines are forced into a machine-friendly shape with `--progress-template`
//! and the final path is captured from the destination lines yt-dlp prints.
//!
//! Pause kills the process and leaves its `.part` file in place; resume
//! relaunches with `--continue`, which picks the transfer back up, so a
//! pause/resume cycle costs one process spawn but no re-downloaded bytes.
//!
//! When yt-dlp fails on a URL that points straight at a media file, the
//! worker falls back to a plain HTTP fetch (see [`super::direct`]), matching
//! how desktop downloaders usually chain their backends.

use super::{
    deregister, direct, emit_outcome, register, signal_cancel, signal_pause, EngineEvent,
    EventCallback, ExtractionEngine, StartRequest, WorkerFlags, WorkerOutcome, WorkerRegistry,
};
use crate::http::{build_client, HttpConfig};
use crate::queue::ItemId;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Forces progress lines into `progress:  4.2%|1048576.0|118`.
const PROGRESS_TEMPLATE: &str =
    "progress:%(progress._percent_str)s|%(progress.speed)s|%(progress.eta)s";
const PROGRESS_PREFIX: &str = "progress:";

/// Options for [`YtDlpEngine`].
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// yt-dlp binary to spawn; resolved through `PATH` by default.
    pub binary: PathBuf,
    /// Format selector passed to `-f`.
    pub format: String,
    /// Additional arguments appended to every invocation.
    pub extra_args: Vec<String>,
    /// Retry direct media links over plain HTTP when yt-dlp fails on them.
    pub direct_fallback: bool,
    /// HTTP options used by the direct-link fallback.
    pub http: HttpConfig,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            format: String::from("best"),
            extra_args: Vec::new(),
            direct_fallback: true,
            http: HttpConfig::default(),
        }
    }
}

/// Extraction engine running one `yt-dlp` process per downloading item.
pub struct YtDlpEngine {
    config: YtDlpConfig,
    workers: Arc<WorkerRegistry>,
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(YtDlpConfig::default())
    }
}

impl YtDlpEngine {
    /// Create an engine with the given options.
    pub fn new(config: YtDlpConfig) -> Self {
        Self {
            config,
            workers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn launch(&self, request: StartRequest, events: EventCallback) {
        let flags = WorkerFlags::new();
        register(&self.workers, request.id, flags.clone());
        let config = self.config.clone();
        let workers = self.workers.clone();
        tokio::spawn(async move {
            let outcome = drive_ytdlp(&config, &request, &flags, &events).await;
            let outcome = match outcome {
                WorkerOutcome::Failed(message)
                    if config.direct_fallback && direct::is_direct_media_url(&request.url) =>
                {
                    debug!(
                        id = %request.id,
                        message = %message,
                        "yt-dlp failed, retrying as direct media link"
                    );
                    match build_client(config.http.clone()) {
                        Ok(client) => direct::fetch(&client, &request, &flags, &events).await,
                        Err(e) => {
                            WorkerOutcome::Failed(format!("failed to build HTTP client: {e}"))
                        }
                    }
                }
                other => other,
            };
            deregister(&workers, request.id, &flags);
            emit_outcome(request.id, outcome, &events);
        });
    }
}

impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn start(&self, request: StartRequest, events: EventCallback) {
        self.launch(request, events);
    }

    fn pause(&self, id: ItemId) {
        signal_pause(&self.workers, id);
    }

    fn resume(&self, request: StartRequest, events: EventCallback) {
        // `--continue` picks the .part file back up from where pause killed
        // the previous process.
        self.launch(request, events);
    }

    fn cancel(&self, id: ItemId) {
        signal_cancel(&self.workers, id);
    }
}

/// Run one yt-dlp process to its terminal outcome.
async fn drive_ytdlp(
    config: &YtDlpConfig,
    request: &StartRequest,
    flags: &WorkerFlags,
    events: &EventCallback,
) -> WorkerOutcome {
    if let Err(e) = tokio::fs::create_dir_all(&request.directory).await {
        return WorkerOutcome::Failed(format!(
            "cannot create {}: {e}",
            request.directory.display()
        ));
    }

    let mut command = Command::new(&config.binary);
    command
        .arg("-f")
        .arg(&config.format)
        .arg("--newline")
        .arg("--no-warnings")
        .arg("--continue")
        .arg("--progress-template")
        .arg(PROGRESS_TEMPLATE)
        .arg("-o")
        .arg(request.directory.join("%(title)s.%(ext)s"))
        .args(&config.extra_args)
        .arg(&request.url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return WorkerOutcome::Failed(format!(
                "failed to spawn {}: {e}",
                config.binary.display()
            ));
        }
    };
    debug!(id = %request.id, url = %request.url, "spawned yt-dlp");

    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");
    let mut lines = BufReader::new(stdout).lines();
    // Collect stderr in the background for the failure message.
    let stderr_task = tokio::spawn(async move {
        let mut buffer = String::new();
        let _ = BufReader::new(stderr).read_to_string(&mut buffer).await;
        buffer
    });

    let mut destination: Option<PathBuf> = None;
    loop {
        if flags.is_interrupted() {
            if let Err(e) = child.kill().await {
                warn!(id = %request.id, error = %e, "failed to kill yt-dlp");
            }
            let _ = stderr_task.await;
            return WorkerOutcome::Interrupted;
        }
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some((percent, speed, eta)) = parse_progress_line(&line) {
                        events(EngineEvent::Progress {
                            id: request.id,
                            percent,
                            speed,
                            eta,
                        });
                    } else if let Some(path) = parse_destination_line(&line) {
                        destination = Some(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(id = %request.id, error = %e, "error reading yt-dlp output");
                    break;
                }
            },
            _ = flags.woken() => {}
        }
    }

    let status = match child.wait().await {
        Ok(status) => status,
        Err(e) => return WorkerOutcome::Failed(format!("failed to wait on yt-dlp: {e}")),
    };
    if flags.is_interrupted() {
        return WorkerOutcome::Interrupted;
    }
    if status.success() {
        // The destination line is the best path we have; yt-dlp only knows
        // the real filename after extraction.
        let path = destination.unwrap_or_else(|| request.directory.clone());
        WorkerOutcome::Completed(path)
    } else {
        let stderr = stderr_task.await.unwrap_or_default();
        WorkerOutcome::Failed(failure_message(&stderr, &status))
    }
}

/// Last non-empty stderr line, or the exit status when there is none.
fn failure_message(stderr: &str, status: &std::process::ExitStatus) -> String {
    stderr_tail(stderr).unwrap_or_else(|| format!("yt-dlp exited with {status}"))
}

fn stderr_tail(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}

/// Parse a `--progress-template` line: `progress:  4.2%|1048576.0|118`.
///
/// Speed and ETA come back as `NA`/`None` before yt-dlp has an estimate.
fn parse_progress_line(line: &str) -> Option<(f32, Option<f64>, Option<u64>)> {
    let rest = line.strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = rest.split('|');
    let percent = fields
        .next()?
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f32>()
        .ok()?;
    let speed = fields.next().and_then(|v| v.trim().parse::<f64>().ok());
    let eta = fields
        .next()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v as u64);
    Some((percent, speed, eta))
}

/// Capture the output path from yt-dlp's informational lines.
fn parse_destination_line(line: &str) -> Option<PathBuf> {
    if let Some(rest) = line.strip_prefix("[download] Destination: ") {
        return Some(PathBuf::from(rest.trim()));
    }
    if let Some(rest) = line.strip_prefix("[Merger] Merging formats into \"") {
        return rest.strip_suffix('"').map(PathBuf::from);
    }
    if let Some(rest) = line.strip_prefix("[download] ") {
        if let Some(path) = rest.strip_suffix(" has already been downloaded") {
            return Some(PathBuf::from(path.trim()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        let parsed = parse_progress_line("progress:  4.2%|1048576.0|118");
        assert_eq!(parsed, Some((4.2, Some(1048576.0), Some(118))));
    }

    #[test]
    fn test_parse_progress_line_without_estimates() {
        let parsed = parse_progress_line("progress:  0.0%|NA|NA");
        assert_eq!(parsed, Some((0.0, None, None)));
    }

    #[test]
    fn test_parse_progress_line_rejects_other_output() {
        assert_eq!(parse_progress_line("[youtube] abc123: Downloading webpage"), None);
        assert_eq!(parse_progress_line(""), None);
        assert_eq!(parse_progress_line("progress:garbage"), None);
    }

    #[test]
    fn test_parse_destination_line() {
        assert_eq!(
            parse_destination_line("[download] Destination: videos/My Clip.mp4"),
            Some(PathBuf::from("videos/My Clip.mp4"))
        );
        assert_eq!(
            parse_destination_line("[Merger] Merging formats into \"videos/My Clip.mkv\""),
            Some(PathBuf::from("videos/My Clip.mkv"))
        );
        assert_eq!(
            parse_destination_line("[download] videos/My Clip.mp4 has already been downloaded"),
            Some(PathBuf::from("videos/My Clip.mp4"))
        );
        assert_eq!(parse_destination_line("[info] Writing video metadata"), None);
    }

    #[test]
    fn test_stderr_tail_takes_last_nonempty_line() {
        let stderr = "WARNING: something minor\nERROR: Unsupported URL: https://x.test\n\n";
        assert_eq!(
            stderr_tail(stderr),
            Some("ERROR: Unsupported URL: https://x.test".to_string())
        );
        assert_eq!(stderr_tail("\n \n"), None);
    }
}
