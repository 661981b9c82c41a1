use super::{Record, Recorder};
use crate::logger::Level;
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A text message kept by a [`BufferedRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    /// Name of the emitting logger.
    pub logger: String,
    /// Severity.
    pub level: Level,
    /// The message.
    pub message: String,
}

#[derive(Debug, Default)]
struct Buffer {
    records: Vec<(String, Record)>,
    texts: Vec<TextEntry>,
}

/// Buffered recorder.
///
/// Keeps everything in memory. Clones share the buffer, so a clone can be
/// handed to a logger while the original is used to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct BufferedRecorder {
    buf: Arc<Mutex<Buffer>>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records written so far, with the name of the emitting logger.
    pub fn records(&self) -> Vec<(String, Record)> {
        self.lock().records.clone()
    }

    /// Text messages written so far.
    pub fn texts(&self) -> Vec<TextEntry> {
        self.lock().texts.clone()
    }

    /// Drops everything written so far.
    pub fn clear(&self) {
        let mut buf = self.lock();
        buf.records.clear();
        buf.texts.clear();
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, logger: &str, record: &Record) -> Result<()> {
        self.lock()
            .records
            .push((logger.to_string(), record.clone()));
        Ok(())
    }

    fn write_text(&mut self, logger: &str, level: Level, message: &str) -> Result<()> {
        self.lock().texts.push(TextEntry {
            logger: logger.to_string(),
            level,
            message: message.to_string(),
        });
        Ok(())
    }
}
