//! Console report written to stdout
//!
//! Stdout is reserved for the lines a monitoring agent parses: one `Ok`
//! confirmation per lifecycle step, then either `OK - total_time: <secs>` or
//! a single `CRITICAL - <error>` line. Log records go to stderr.

use crate::error::{AppError, Result};
use colored::Colorize;
use std::io::Write;

/// Lifecycle steps that print a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateBucket,
    UploadObject,
    DownloadObject,
    DeleteObject,
    DeleteBucket,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateBucket => "create_bucket",
            Self::UploadObject => "upload_object",
            Self::DownloadObject => "download_object",
            Self::DeleteObject => "delete_object",
            Self::DeleteBucket => "delete_bucket",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Writes the probe's report lines
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
    use_color: bool,
}

impl std::fmt::Debug for ConsoleReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("use_color", &self.use_color)
            .finish_non_exhaustive()
    }
}

impl ConsoleReporter {
    pub fn new(out: Box<dyn Write + Send>, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Reporter on the process stdout
    pub fn stdout(use_color: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), use_color)
    }

    /// `<step>: Ok`
    pub fn step_ok(&mut self, step: Step) -> Result<()> {
        let status = if self.use_color { "Ok".green().to_string() } else { "Ok".to_string() };
        self.line(&format!("{}: {}", step, status))
    }

    /// `OK - total_time: <seconds>`
    pub fn total_time(&mut self, seconds: f64) -> Result<()> {
        let status = if self.use_color { "OK".green().bold().to_string() } else { "OK".to_string() };
        self.line(&format!("{} - total_time: {:?}", status, seconds))
    }

    /// `CRITICAL - <error>`
    pub fn critical(&mut self, error: &AppError) -> Result<()> {
        let line = error.format_for_console(self.use_color);
        self.line(&line)
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)
            .and_then(|_| self.out.flush())
            .map_err(|e| AppError::io(format!("Could not write report: {}", e)))
    }
}

/// In-memory report sink that can be read back after the reporter is done
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
