//! Where deployment results and notices go.
//!
//! [`WorkflowReporter`] speaks the GitHub Actions workflow command protocol.
//! [`RecordingReporter`] keeps everything in memory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Sink for user-facing messages, outputs and the terminal failure.
pub trait Reporter: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn notice(&self, message: &str);
    /// Publish a named result for later workflow steps.
    fn set_output(&self, name: &str, value: &str);
    /// Report the one failure that ends the run.
    fn set_failed(&self, message: &str);
}

/// Reporter that writes GitHub Actions workflow commands to stdout.
#[derive(Debug, Default)]
pub struct WorkflowReporter {
    output_file: Option<PathBuf>,
    failed: AtomicBool,
}

impl WorkflowReporter {
    /// Create a reporter writing outputs to the given file, if any.
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self {
            output_file,
            failed: AtomicBool::new(false),
        }
    }

    /// Create a reporter using the `GITHUB_OUTPUT` file of the current job.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }

    /// Whether [`Reporter::set_failed`] has been called.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn command(&self, name: &str, message: &str) {
        println!("::{}::{}", name, escape_data(message));
    }
}

impl Reporter for WorkflowReporter {
    fn debug(&self, message: &str) {
        log::debug!("{}", message);
        self.command("debug", message);
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        log::warn!("{}", message);
        self.command("warning", message);
    }

    fn notice(&self, message: &str) {
        self.command("notice", message);
    }

    fn set_output(&self, name: &str, value: &str) {
        let Some(path) = &self.output_file else {
            println!("{}={}", name, value);
            return;
        };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}={}", name, value));
        if let Err(e) = written {
            log::error!("Failed to write output {} to {}: {}", name, path.display(), e);
        }
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.command("error", message);
    }
}

/// Escape a workflow command message.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// One reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Debug(String),
    Info(String),
    Warning(String),
    Notice(String),
    Output { name: String, value: String },
    Failed(String),
}

/// Reporter that records every event, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in the order they were reported.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Value of the last output with this name.
    pub fn output(&self, name: &str) -> Option<String> {
        self.lock().iter().rev().find_map(|event| match event {
            Event::Output { name: n, value } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    /// Every failure message reported.
    pub fn failures(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::Failed(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every warning message reported.
    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every notice message reported.
    pub fn notices(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::Notice(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for RecordingReporter {
    fn debug(&self, message: &str) {
        self.push(Event::Debug(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(Event::Warning(message.to_string()));
    }

    fn notice(&self, message: &str) {
        self.push(Event::Notice(message.to_string()));
    }

    fn set_output(&self, name: &str, value: &str) {
        self.push(Event::Output {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn set_failed(&self, message: &str) {
        self.push(Event::Failed(message.to_string()));
    }
}
