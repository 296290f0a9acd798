//! Byte-stream abstraction for the engine's stdin/stdout/stderr.
//!
//! Enum dispatch rather than trait objects: the variants are known and
//! the write path is hot. The buffer variants exist for tests and
//! embedders that capture output; they hand out shared handles so the
//! capture can be read while the engine owns the sink.

use std::io::{Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// A shared byte buffer backing the capture variants.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    /// The current contents as text, invalid UTF-8 replaced.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn append(&self, bytes: &[u8]) {
        self.0.lock().extend_from_slice(bytes);
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Where engine output goes.
pub enum OutputSink {
    /// The process's stdout.
    Stdout,
    /// The process's stderr.
    Stderr,
    /// An in-memory capture buffer.
    Buffer(SharedBuffer),
}

impl OutputSink {
    /// Create a capture sink plus the handle to read it with.
    pub fn buffer() -> (OutputSink, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (OutputSink::Buffer(buffer.clone()), buffer)
    }

    /// Write bytes. Host stream failures are ignored, matching the
    /// fire-and-forget writes of the original runtime.
    pub fn write(&mut self, bytes: &[u8]) {
        match self {
            OutputSink::Stdout => {
                let _ = std::io::stdout().lock().write_all(bytes);
            }
            OutputSink::Stderr => {
                let _ = std::io::stderr().lock().write_all(bytes);
            }
            OutputSink::Buffer(buffer) => buffer.append(bytes),
        }
    }
}

/// Where engine input comes from.
pub enum InputSource {
    /// The process's stdin.
    Stdin,
    /// An in-memory buffer; reading drains it.
    Buffer(SharedBuffer),
}

impl InputSource {
    /// Create a pre-filled input source.
    pub fn buffer(contents: impl Into<Vec<u8>>) -> InputSource {
        let buffer = SharedBuffer::new();
        buffer.append(&contents.into());
        InputSource::Buffer(buffer)
    }

    /// Read everything available.
    pub fn read_to_end(&mut self) -> std::io::Result<Vec<u8>> {
        match self {
            InputSource::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin().lock().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            InputSource::Buffer(buffer) => Ok(buffer.take()),
        }
    }
}

/// The engine's three streams.
pub struct Streams {
    pub stdin: InputSource,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

impl Default for Streams {
    fn default() -> Self {
        Streams {
            stdin: InputSource::Stdin,
            stdout: OutputSink::Stdout,
            stderr: OutputSink::Stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_sink_captures_writes() {
        let (mut sink, handle) = OutputSink::buffer();
        sink.write(b"hello ");
        sink.write(b"world");
        assert_eq!(handle.contents_string(), "hello world");
    }

    #[test]
    fn buffer_clear_empties() {
        let (mut sink, handle) = OutputSink::buffer();
        sink.write(b"x");
        handle.clear();
        assert_eq!(handle.contents(), Vec::<u8>::new());
    }

    #[test]
    fn buffer_input_drains_on_read() {
        let mut input = InputSource::buffer("abc");
        assert_eq!(input.read_to_end().unwrap(), b"abc");
        assert_eq!(input.read_to_end().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn non_utf8_capture_is_lossy_text() {
        let (mut sink, handle) = OutputSink::buffer();
        sink.write(&[0xff, b'a']);
        assert_eq!(handle.contents(), vec![0xff, b'a']);
        assert!(handle.contents_string().ends_with('a'));
    }
}
