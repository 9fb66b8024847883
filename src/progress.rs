//! Progress reporting and cooperative cancellation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stage of a decode. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Initializing,
    Loading,
    Parsing,
    Completed,
    Error,
}

/// A progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    /// Percentage from 0 to 100
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_slide: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_slides: Option<usize>,
}

/// Receiver of progress events.
///
/// Any `Fn(&ProgressEvent) + Send + Sync` closure is a sink.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Forwards events to an optional sink while keeping stages monotonic and
/// progress non-decreasing.
pub(crate) struct ProgressTracker<'a> {
    sink: Option<&'a dyn ProgressSink>,
    stage: ProgressStage,
    progress: u8,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(sink: Option<&'a dyn ProgressSink>) -> Self {
        Self {
            sink,
            stage: ProgressStage::Initializing,
            progress: 0,
        }
    }

    pub(crate) fn emit(&mut self, stage: ProgressStage, progress: u8, message: impl Into<String>) {
        self.emit_slide(stage, progress, message, None, None);
    }

    pub(crate) fn emit_slide(
        &mut self,
        stage: ProgressStage,
        progress: u8,
        message: impl Into<String>,
        current_slide: Option<usize>,
        total_slides: Option<usize>,
    ) {
        let stage = stage.max(self.stage);
        let progress = progress.min(100).max(self.progress);
        self.stage = stage;
        self.progress = progress;

        let event = ProgressEvent {
            stage,
            progress,
            message: message.into(),
            current_slide,
            total_slides,
        };
        log::debug!("[{:?} {}%] {}", event.stage, event.progress, event.message);
        if let Some(sink) = self.sink {
            sink.report(&event);
        }
    }
}

/// Cooperative cancellation flag shared between a host and a decode.
///
/// The decoder checks it at part boundaries; a cancelled decode returns the
/// slides decoded so far.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_tracker_is_monotonic() {
        let events = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| events.lock().unwrap().push(e.clone());
        {
            let mut tracker = ProgressTracker::new(Some(&sink as &dyn ProgressSink));
            tracker.emit(ProgressStage::Loading, 10, "open");
            tracker.emit(ProgressStage::Initializing, 5, "late");
            tracker.emit(ProgressStage::Parsing, 150, "done");
        }
        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].stage, ProgressStage::Loading);
        assert_eq!(events[1].progress, 10);
        assert_eq!(events[2].progress, 100);
    }

    #[test]
    fn test_cancellation_token_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
