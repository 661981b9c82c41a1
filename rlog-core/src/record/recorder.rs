use super::Record;
use crate::logger::Level;
use anyhow::Result;

/// A sink for structured records and text messages of a logger.
///
/// Structured records are emitted at [`Level::Trace`]; a recorder whose
/// [`Recorder::min_level`] is above it only receives text messages.
pub trait Recorder: Send {
    /// Writes a structured record emitted by the logger named `logger`.
    fn write(&mut self, logger: &str, record: &Record) -> Result<()>;

    /// Writes a text message.
    #[allow(unused_variables)]
    fn write_text(&mut self, logger: &str, level: Level, message: &str) -> Result<()> {
        Ok(())
    }

    /// Messages below this level are not handed to the recorder.
    fn min_level(&self) -> Level {
        Level::Trace
    }

    /// Flushes buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
