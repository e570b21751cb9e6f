//! Progress reporting sinks.
//!
//! The pipeline and batch driver push human-readable status strings into a
//! [`ProgressSink`]. Reporting is fire-and-forget: a sink never returns an
//! error and must not block the job on its receiver.
//!
//! Implementations provided here:
//! - any `Fn(&str)` closure
//! - [`LogSink`] forwards to the `log` facade at info level
//! - [`NullSink`] discards everything
//! - [`ChannelSink`] sends owned strings over an unbounded `mpsc` channel

pub mod ffmpeg_handler;

use std::sync::mpsc::{self, Receiver, Sender};

/// Receiver of in-progress status messages.
pub trait ProgressSink {
    /// Reports one status message.
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message);
    }
}

/// Logs every message at info level under the `vidmorph::status` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, message: &str) {
        log::info!(target: "vidmorph::status", "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _message: &str) {}
}

/// Forwards messages to a channel; send failures are ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    /// Creates a sink together with the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, message: &str) {
        if self.tx.send(message.to_string()).is_err() {
            log::trace!("Progress receiver dropped; message discarded: {message}");
        }
    }
}
