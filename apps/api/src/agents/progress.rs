//! Progress contract between graphs and their callers.
//!
//! Purely observational: synchronous callback, no backpressure, no cancellation.
//! Whatever happens, the last event a caller sees carries `done: true`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub content: String,
    pub done: bool,
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Per-run reporter wrapping the optional caller callback.
///
/// If a graph returns early (model error propagated with `?`) after having
/// reported progress, dropping the reporter emits a closing `done` event.
pub struct Progress {
    callback: Option<ProgressCallback>,
    task: &'static str,
    emitted: bool,
    finished: bool,
}

impl Progress {
    pub fn new(task: &'static str, callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            task,
            emitted: false,
            finished: false,
        }
    }

    /// Reports an intermediate stage.
    pub fn update(&mut self, content: impl Into<String>) {
        self.emit(content.into(), false);
    }

    /// Reports the final stage. Later calls are ignored.
    pub fn finish(&mut self, content: impl Into<String>) {
        self.emit(content.into(), true);
    }

    fn emit(&mut self, content: String, done: bool) {
        if self.finished {
            return;
        }
        debug!(task = self.task, done, "{content}");
        self.emitted = true;
        self.finished = done;
        if let Some(callback) = &self.callback {
            callback(ProgressEvent { content, done });
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.emitted && !self.finished {
            self.emit(format!("{} stopped before completing", self.task), true);
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("task", &self.task)
            .field("has_callback", &self.callback.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Callback that records every event it receives.
    pub(crate) fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Arc::new(move |e| sink.lock().unwrap().push(e));
        (callback, events)
    }

    /// Asserts the contract every graph must honour.
    pub(crate) fn assert_finished(events: &[ProgressEvent]) {
        assert!(!events.is_empty(), "graph reported no progress");
        let (last, rest) = events.split_last().unwrap();
        assert!(last.done, "last event must be done: {last:?}");
        assert!(rest.iter().all(|e| !e.done), "only the last event may be done");
    }

    #[test]
    fn test_update_then_finish() {
        let (callback, events) = recorder();
        let mut progress = Progress::new("summary", Some(callback));
        progress.update("Analyzing");
        progress.finish("Done");
        drop(progress);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_finished(&events);
        assert_eq!(events[1].content, "Done");
    }

    #[test]
    fn test_events_after_finish_are_ignored() {
        let (callback, events) = recorder();
        let mut progress = Progress::new("summary", Some(callback));
        progress.finish("Done");
        progress.update("late");
        progress.finish("again");
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_drop_closes_unfinished_run() {
        let (callback, events) = recorder();
        {
            let mut progress = Progress::new("cover letter", Some(callback));
            progress.update("Drafting");
        }
        let events = events.lock().unwrap();
        assert_finished(&events);
        assert_eq!(events[1].content, "cover letter stopped before completing");
    }

    #[test]
    fn test_drop_without_events_is_silent() {
        let (callback, events) = recorder();
        drop(Progress::new("job title", Some(callback)));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_callback_is_fine() {
        let mut progress = Progress::new("job title", None);
        progress.update("x");
        progress.finish("y");
    }
}
