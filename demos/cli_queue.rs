//! Paste-and-go demo: queue the URLs given on the command line, watch the
//! downloads run, and print a summary table at the end.
//!
//! ```console
//! cargo run --example cli_queue -- "https://youtu.be/abc123" "https://host/clip.mp4"
//! ```

use color_eyre::Result;
use comfy_table::Table;
use console::style;
use std::sync::Arc;
use std::time::Duration;
use vidq::progress::{QueueDisplay, StyleOptions};
use vidq::{QueueBuilder, YtDlpEngine};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: cli_queue <url> [url ...]");
        return Ok(());
    }

    let queue = QueueBuilder::new()
        .max_concurrent(2)
        .engine(Arc::new(YtDlpEngine::default()))
        .build();

    // The display subscribes before anything is queued, so it sees every event.
    let display = QueueDisplay::new(queue.clone(), StyleOptions::default());
    let renderer = tokio::spawn(display.run());

    queue.add_urls(&urls.join("\n"));
    while !queue.is_idle() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    let _ = renderer.await;

    println!("\n{}", style("Queue summary").bold());
    let mut table = Table::new();
    table.set_header(["id", "status", "url", "result"]);
    for item in queue.snapshot() {
        let result = match (&item.destination, &item.error) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(error)) => error.clone(),
            _ => String::from("-"),
        };
        table.add_row([
            item.id.to_string(),
            item.status.to_string(),
            item.url.clone(),
            result,
        ]);
    }
    println!("{table}");

    Ok(())
}
