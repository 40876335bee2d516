//! UI surface the orchestrator drives
//!
//! The browser binds this to a status box, a log element and the download
//! button. `RecordingView` keeps everything in memory.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl StatusLevel {
    /// CSS class applied to the status display
    pub fn as_class(self) -> &'static str {
        match self {
            StatusLevel::Info => "info",
            StatusLevel::Warn => "warn",
            StatusLevel::Error => "error",
        }
    }
}

pub trait MergeView {
    /// Overwrite the status display.
    fn set_status(&mut self, message: &str, level: StatusLevel);

    /// Append one line to the log. The log is never cleared.
    fn append_log(&mut self, line: &str);

    fn set_download_enabled(&mut self, enabled: bool);
}

/// In-memory view
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub status: Option<(String, StatusLevel)>,
    pub log: Vec<String>,
    pub download_enabled: bool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn status_level(&self) -> Option<StatusLevel> {
        self.status.as_ref().map(|(_, level)| *level)
    }
}

impl MergeView for RecordingView {
    fn set_status(&mut self, message: &str, level: StatusLevel) {
        self.status = Some((message.to_string(), level));
    }

    fn append_log(&mut self, line: &str) {
        self.log.push(line.to_string());
    }

    fn set_download_enabled(&mut self, enabled: bool) {
        self.download_enabled = enabled;
    }
}
