//! Per-origin stage duration logs.
//!
//! Every event that carries a `duration` appends one NDJSON line
//! `{date, event, duration}` to `<dir>/<origin>_durations.jsonl`.

use data_types::{EventKind, ExtractDate};
use parking_lot::Mutex;
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Errors appending to a durations log.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum DurationLogError {
    #[snafu(display("cannot create durations directory {:?}: {}", dir, source))]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("cannot append to durations log {:?}: {}", path, source))]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct DurationLine<'a> {
    date: &'a ExtractDate,
    event: EventKind,
    duration: f64,
}

/// Appends duration lines, one file per reporting origin.
#[derive(Debug)]
pub struct DurationRecorder {
    dir: PathBuf,
    // serializes append-open-write sequences across handler tasks
    lock: Mutex<()>,
}

impl DurationRecorder {
    /// Create a recorder writing under `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DurationLogError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context(CreateDirSnafu { dir: dir.clone() })?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// The directory the logs land in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one line to `origin`'s log.
    pub fn append(
        &self,
        origin: &str,
        date: &ExtractDate,
        event: EventKind,
        duration: f64,
    ) -> Result<(), DurationLogError> {
        let path = self.log_path(origin);
        let line = serde_json::to_string(&DurationLine {
            date,
            event,
            duration,
        })
        .expect("duration line serialization cannot fail");

        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context(AppendSnafu { path: path.clone() })?;
        writeln!(file, "{}", line).context(AppendSnafu { path })
    }

    // the origin comes off the wire and lands in a filename
    fn log_path(&self, origin: &str) -> PathBuf {
        let sanitized: String = origin
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}_durations.jsonl", sanitized))
    }
}
