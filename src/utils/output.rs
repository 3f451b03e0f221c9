// Diagnostic output sink
// The repository and the build orchestrator report progress through this
// seam instead of writing to the terminal directly, so commands decide
// where diagnostics go and tests can capture them.

use std::sync::Mutex;

use chrono::Local;

/// Append-only diagnostic line sink
pub trait OutputSink: Send + Sync {
    fn write_line(&self, message: &str);
}

/// Sink that prints timestamped lines to stderr
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_line(&self, message: &str) {
        eprintln!("[{}] {}", Local::now().format("%H:%M:%S"), message);
    }
}

/// Sink that collects lines in memory
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl OutputSink for BufferSink {
    fn write_line(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}
