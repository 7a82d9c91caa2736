//! Console output sink
//!
//! Every user-facing line the engine prints (current values, change
//! confirmations, help text) goes through a [`Console`]. The default sink
//! is stdout; tests swap in an in-memory buffer and read it back.

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

/// Cloneable handle to a line-oriented output sink
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    /// Console writing to the process stdout
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Console writing to an arbitrary writer
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Console capturing into memory, plus the buffer to read it back
    pub fn buffer() -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    /// Print one line
    pub fn println(&self, line: impl fmt::Display) {
        let mut sink = self.sink.lock();
        if let Err(e) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
            warn!("Console write failed: {e}");
        }
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Shared in-memory output captured by [`Console::buffer`]
#[derive(Clone, Default)]
pub struct OutputBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Everything written so far, split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Drain the buffer, returning its lines
    pub fn take_lines(&self) -> Vec<String> {
        let bytes = std::mem::take(&mut *self.bytes.lock());
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
