//! Event log: appends one line per sync event and echoes it to stdout

use std::path::{Path, PathBuf};

use mirror_core::{EventSink, SyncEvent};

/// [`EventSink`] backed by an append-only log file.
///
/// The file is created on the first event, so a run that never reaches a
/// cycle leaves no log behind.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    replica_root: PathBuf,
    echo: bool,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, replica_root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            replica_root: replica_root.into(),
            echo: true,
        }
    }

    /// Stop echoing lines to stdout.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: &SyncEvent) -> mirror_core::Result<()> {
        let line = event.log_line(&self.replica_root);
        mirror_fs::io::append_line(&self.path, &line)?;
        if self.echo {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::{Action, Target};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn record_appends_lines_in_order() {
        let temp = TempDir::new().unwrap();
        let replica = temp.path().join("replica");
        let mut log = EventLog::new(temp.path().join("mirror.log"), &replica).quiet();

        log.record(&SyncEvent::mutation(Action::Created, Target::Folder, "dir".into()))
            .unwrap();
        log.record(&SyncEvent::cycle_completed()).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&format!(
            "Folder \"{}\" was created at ",
            replica.join("dir").display()
        )));
        assert!(lines[1].starts_with("Sync operation cycle completed at "));
    }

    #[test]
    fn log_is_not_created_before_first_event() {
        let temp = TempDir::new().unwrap();
        let log = EventLog::new(temp.path().join("mirror.log"), temp.path());

        assert!(!log.path().exists());
    }

    #[test]
    fn record_fails_when_log_directory_is_missing() {
        let temp = TempDir::new().unwrap();
        let mut log =
            EventLog::new(temp.path().join("missing").join("mirror.log"), temp.path()).quiet();

        let result = log.record(&SyncEvent::cycle_completed());

        assert!(result.is_err());
    }
}
