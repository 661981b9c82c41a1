use super::{Record, Recorder};
use crate::logger::Level;
use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Appends text messages to `log.log` in a directory.
///
/// Lines look like `14:03:27 [I] dqn: Logging application level stuff.`.
/// Structured records are not written.
pub struct TextFileRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
    level: Level,
}

impl TextFileRecorder {
    /// Name of the file created in the log directory.
    pub const FILE_NAME: &'static str = "log.log";

    /// Opens `<dir>/log.log` for appending, keeping messages at or above `level`.
    pub fn new(dir: impl AsRef<Path>, level: Level) -> Result<Self> {
        let path = dir.as_ref().join(Self::FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {:?}", path))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            level,
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Recorder for TextFileRecorder {
    fn write(&mut self, _logger: &str, _record: &Record) -> Result<()> {
        Ok(())
    }

    fn write_text(&mut self, logger: &str, level: Level, message: &str) -> Result<()> {
        writeln!(
            self.writer,
            "{} [{}] {}: {}",
            Local::now().format("%H:%M:%S"),
            level.letter(),
            logger,
            message
        )?;
        Ok(())
    }

    fn min_level(&self) -> Level {
        self.level
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_write_text() -> Result<()> {
        let dir = TempDir::new("text_recorder")?;
        let mut recorder = TextFileRecorder::new(dir.path(), Level::Info)?;
        recorder.write_text("dqn", Level::Info, "hello")?;
        recorder.write_text("dqn.agent", Level::Error, "boom")?;
        recorder.flush()?;

        let text = std::fs::read_to_string(recorder.path())?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" [I] dqn: hello"));
        assert!(lines[1].ends_with(" [E] dqn.agent: boom"));
        assert_eq!(recorder.min_level(), Level::Info);
        Ok(())
    }
}
