//! Progress bar styling for the queue display.
//!
//! # Examples
//!
//! ```rust
//! use vidq::progress::{ProgressBarOpts, StyleOptions};
//!
//! // Default styling: overall bar stays on screen, item bars clear.
//! let style = StyleOptions::default();
//! assert!(style.is_enabled());
//!
//! // No terminal output at all.
//! let hidden = StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
//! assert!(!hidden.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};

/// Style options for the queue display.
///
/// The overall bar counts finished items; item bars show the 0-100 progress
/// of one download with its status message. By default the overall bar stays
/// on screen upon completion and the item bars are cleared.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub(crate) overall: ProgressBarOpts,
    pub(crate) item: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            overall: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_OVERALL.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
                enabled: true,
                clear: false,
            },
            item: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_ITEM.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
                enabled: true,
                clear: true,
            },
        }
    }
}

impl StyleOptions {
    /// Create new [`StyleOptions`].
    pub fn new(overall: ProgressBarOpts, item: ProgressBarOpts) -> Self {
        Self { overall, item }
    }

    /// Return `false` if neither the overall nor the item bars are enabled.
    pub fn is_enabled(&self) -> bool {
        self.overall.enabled || self.item.enabled
    }

    /// Get a reference to the overall bar options.
    pub fn overall(&self) -> &ProgressBarOpts {
        &self.overall
    }

    /// Get a reference to the item bar options.
    pub fn item(&self) -> &ProgressBarOpts {
        &self.item
    }
}

/// Define the options for a single progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression character set: "filled", "current", "to do".
    progress_chars: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Template for the overall bar:
    /// `███████████░░ 3/5 items`.
    pub const TEMPLATE_OVERALL: &'static str = "{bar:40.blue} {pos:>}/{len} items {msg}";
    /// Template for one item:
    /// `━━━━━━╾───── 52% https://… 1.2 MiB/s eta 00:41`.
    pub const TEMPLATE_ITEM: &'static str = "{bar:30.green/black} {percent:>3}% {msg}";
    /// Fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// A line as progress characters: `"━╾╴─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bars.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    pub fn to_progress_style(self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = self.template {
            style = style.template(&template).expect("invalid template");
        }
        if let Some(progress_chars) = self.progress_chars {
            style = style.progress_chars(&progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(self, len: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let style = self.to_progress_style();
        ProgressBar::new(len).with_style(style)
    }
}
