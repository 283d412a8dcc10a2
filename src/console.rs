//! Per-record diagnostic lines.
//!
//! These are the user-facing progress lines, kept apart from `tracing`
//! output so they read the same at every verbosity level.

use crate::error::Error;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Line printed after a successful write.
pub const CREATED_LINE: &str = "File has been created successfully.";

type Sink = Mutex<Box<dyn Write + Send>>;

/// Destination for diagnostic lines.
///
/// Writes are serialized, so a console can be shared between concurrent
/// write tasks. Failures to print are ignored.
pub struct Console {
    out: Sink,
    err: Sink,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

impl Console {
    /// Prints to stdout and stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// Prints to the given writers.
    #[must_use]
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }

    /// Discards every line.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(io::sink(), io::sink())
    }

    /// Announces the record about to be written.
    pub fn title(&self, stem: &str) {
        Self::emit(&self.out, &format!("title : {stem}"));
    }

    /// Confirms a successful write.
    pub fn created(&self) {
        Self::emit(&self.out, CREATED_LINE);
    }

    /// Reports a failed write.
    pub fn failed(&self, error: &Error) {
        Self::emit(&self.err, &format!("Error: {error}"));
    }

    fn emit(sink: &Sink, line: &str) {
        let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

/// An in-memory writer whose contents stay readable after it is handed
/// to a [`Console`].
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_lines() {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let console = Console::new(out.clone(), err.clone());

        console.title("Q3Update");
        console.created();
        console.failed(&Error::write(
            "Q3Update.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        ));

        assert_eq!(out.lines(), ["title : Q3Update", CREATED_LINE]);
        assert!(err.contents().starts_with("Error: Failed to write 'Q3Update.txt'"));
    }

    #[test]
    fn test_silent_console() {
        let console = Console::silent();
        console.title("anything");
        console.created();
    }
}
