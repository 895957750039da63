//! Reporter that keeps everything it is told

#![allow(dead_code)]

use pr_cherry_pick::report::Reporter;
use std::sync::Mutex;

/// Records messages per channel for later assertions
#[derive(Default)]
pub struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    summaries: Mutex<Vec<String>>,
    outputs: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.summaries.lock().unwrap().clone()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap().clone()
    }

    /// Value of a published output
    pub fn output(&self, name: &str) -> Option<String> {
        self.outputs
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Whether any info message contains `needle`
    pub fn info_contains(&self, needle: &str) -> bool {
        self.infos().iter().any(|m| m.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn append_summary(&self, markdown: &str) {
        self.summaries.lock().unwrap().push(markdown.to_string());
    }

    fn set_output(&self, name: &str, value: &str) {
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
    }
}
