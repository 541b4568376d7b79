use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use buddy_core::telemetry::{SessionEvent, TelemetrySink};

/// Millisecond-stamped session log.
///
/// Telemetry delivery cannot fail, so the first write error is held and
/// reported by [`TranscriptLogger::finish`].
pub struct TranscriptLogger {
    writer: BufWriter<fs::File>,
    started_at: Instant,
    include_ticks: bool,
    error: Option<io::Error>,
}

impl TranscriptLogger {
    pub fn create(path: &Path, header: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
            started_at: Instant::now(),
            include_ticks: false,
            error: None,
        };

        logger.write_header(header)?;
        Ok(logger)
    }

    /// Also logs the once-per-second countdown events.
    #[must_use]
    pub fn with_ticks(mut self, include_ticks: bool) -> Self {
        self.include_ticks = include_ticks;
        self
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "# {header}")?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    /// Appends a free-form annotation line.
    pub fn note(&mut self, line: &str) {
        let elapsed = self.started_at.elapsed();
        self.append_line(elapsed, "NOTE", line);
    }

    fn append_line(&mut self, elapsed: Duration, tag: &str, line: &str) {
        if self.error.is_some() {
            return;
        }
        let result = writeln!(
            self.writer,
            "[+{:>6} ms] {tag} {line}",
            elapsed.as_millis()
        );
        if let Err(err) = result {
            self.error = Some(err);
        }
    }

    /// Flushes the log and returns the first error seen while writing it.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()
    }
}

impl TelemetrySink for TranscriptLogger {
    fn record(&mut self, event: SessionEvent) {
        if event.is_periodic() && !self.include_ticks {
            return;
        }
        let elapsed = self.started_at.elapsed();
        let tag = format!("{:#06x}", event.to_raw());
        self.append_line(elapsed, &tag, &event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::feedback::Cue;
    use buddy_core::session::SessionState;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("buddy-emulator-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn events_are_written_with_codes() {
        let path = scratch_path("events.log");
        let mut logger = TranscriptLogger::create(&path, "test transcript").unwrap();

        logger.record(SessionEvent::StateEntered(SessionState::Confirm));
        logger.record(SessionEvent::CueStarted(Cue::Closing));
        logger.record(SessionEvent::CountdownTick { remaining: 5 });
        logger.finish().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# test transcript\n"));
        assert!(contents.contains("0x0004 state confirm"));
        assert!(contents.contains("0x0023 cue closing"));
        assert!(!contents.contains("countdown-tick"));
    }

    #[test]
    fn ticks_are_logged_on_request() {
        let path = scratch_path("ticks.log");
        let mut logger = TranscriptLogger::create(&path, "ticks")
            .unwrap()
            .with_ticks(true);

        logger.record(SessionEvent::CountdownTick { remaining: 5 });
        logger.finish().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("0x0050 countdown-tick remaining=5"));
    }
}
