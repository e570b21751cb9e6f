// ============================================================================
// vidmorph-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal spinner for batch status messages
//
// The core reports progress as plain status strings through a ProgressSink.
// The CLI shows the latest one on a spinner and also logs it, so the log file
// keeps the full sequence. Non-terminal runs get a hidden spinner.

use indicatif::{ProgressBar, ProgressStyle};
use vidmorph_core::ProgressSink;

use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

pub struct SpinnerSink {
    bar: ProgressBar,
}

impl SpinnerSink {
    /// Spinner on stderr when it is a terminal, hidden otherwise.
    pub fn new(visible: bool) -> Self {
        if !visible || !console::Term::stderr().is_term() {
            return Self::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressSink for SpinnerSink {
    fn report(&self, message: &str) {
        self.bar.set_message(message.to_string());
        self.bar.suspend(|| log::info!(target: "vidmorph::status", "{message}"));
    }
}

impl Drop for SpinnerSink {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_sink_accepts_reports() {
        let sink = SpinnerSink::hidden();
        sink.report("Starting video speed change...");
        assert_eq!(sink.bar.message(), "Starting video speed change...");
        sink.finish("done");
        assert!(sink.bar.is_finished());
    }
}
