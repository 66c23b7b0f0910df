//! Queue display: renders controller events as terminal progress bars.

use crate::progress::StyleOptions;
use crate::queue::{ItemId, ItemStatus, QueueController, QueueEvent};
use crate::utils::{format_eta, format_speed};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

/// Maximum URL length shown next to an item bar.
const URL_WIDTH: usize = 40;

/// Terminal renderer for a [`QueueController`].
///
/// Subscribes on construction, so events between `new` and `run` are not
/// lost. `run` consumes the display and returns when the queue goes idle or
/// the controller is dropped.
pub struct QueueDisplay {
    controller: QueueController,
    style: StyleOptions,
    events: Receiver<QueueEvent>,
}

impl QueueDisplay {
    /// Create a display for `controller`.
    pub fn new(controller: QueueController, style: StyleOptions) -> Self {
        let events = controller.subscribe();
        Self {
            controller,
            style,
            events,
        }
    }

    /// Render until the queue goes idle.
    pub async fn run(mut self) {
        let multi = match self.style.is_enabled() {
            true => MultiProgress::new(),
            false => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        let overall = multi.add(self.style.overall().clone().to_progress_bar(0));
        let mut bars: HashMap<ItemId, ProgressBar> = HashMap::new();

        loop {
            let event = match self.events.recv().await {
                Ok(event) => event,
                // A lagged receiver just skips ahead; the bars catch up on
                // the next progress event.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            match event {
                QueueEvent::Added { id, url } => {
                    overall.inc_length(1);
                    let bar = multi.add(self.style.item().clone().to_progress_bar(100));
                    bar.set_message(format!("{} queued", truncate(&url, URL_WIDTH)));
                    bars.insert(id, bar);
                }
                QueueEvent::Progress {
                    id,
                    percent,
                    speed,
                    eta,
                } => {
                    if let Some(bar) = bars.get(&id) {
                        bar.set_position(percent as u64);
                        let speed = speed.map(format_speed).unwrap_or_default();
                        let eta = eta
                            .map(|eta| format!("eta {}", format_eta(eta)))
                            .unwrap_or_default();
                        bar.set_message(format!("{speed} {eta}"));
                    }
                }
                QueueEvent::StatusChanged { id, status, error } => {
                    if let Some(bar) = bars.get(&id) {
                        match status {
                            ItemStatus::Queued => {}
                            ItemStatus::Downloading => bar.set_message("downloading"),
                            ItemStatus::Paused => bar.set_message("paused"),
                            ItemStatus::Completed => {
                                bar.set_position(100);
                                overall.inc(1);
                                if self.style.item().clear {
                                    bar.finish_and_clear();
                                } else {
                                    bar.finish_with_message("done");
                                }
                            }
                            ItemStatus::Cancelled => {
                                overall.inc(1);
                                bar.abandon_with_message("cancelled");
                            }
                            ItemStatus::Failed => {
                                overall.inc(1);
                                bar.abandon_with_message(format!(
                                    "failed: {}",
                                    error.unwrap_or_default()
                                ));
                            }
                        }
                    }
                }
                QueueEvent::Cleared { removed } => {
                    for id in removed {
                        if let Some(bar) = bars.remove(&id) {
                            bar.finish_and_clear();
                        }
                    }
                }
            }
            if self.controller.is_idle() {
                break;
            }
        }

        if self.style.overall().clear {
            overall.finish_and_clear();
        } else {
            overall.finish();
        }
    }
}

fn truncate(url: &str, width: usize) -> String {
    if url.chars().count() <= width {
        url.to_string()
    } else {
        let cut: String = url.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        let long = "https://example.com/a/very/long/path/to/a/video/file.mp4";
        let cut = truncate(long, 20);
        assert_eq!(cut.chars().count(), 20);
        assert!(cut.ends_with('…'));
    }
}
