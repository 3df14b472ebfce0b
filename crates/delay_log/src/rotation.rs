//! Size-bounded rotating file sink.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

/// A file-backed log destination with size-based rotation.
///
/// The active file lives at `<directory>/<name>.log`. Once writing a line
/// would bring the active file to or past `max_bytes`, the file is renamed into a
/// bounded sequence of backups (`<name>.log.1` is the newest,
/// `<name>.log.<backup_count>` the oldest, anything beyond deleted) and a
/// fresh active file is opened.
///
/// The writer is not internally synchronized; callers sharing one writer
/// across threads must serialize access (the facility wraps it in a mutex).
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    /// Opens (or creates) the active log file at `<directory>/<name>.log`,
    /// creating the directory if it does not exist.
    ///
    /// The current file size is carried over, so reopening an existing log
    /// keeps rotation accounting correct.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened.
    pub fn open(
        directory: &Path,
        name: &str,
        max_bytes: u64,
        backup_count: usize,
    ) -> io::Result<Self> {
        fs::create_dir_all(directory)?;
        let path = directory.join(format!("{name}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one formatted line, rotating first when the line (including
    /// its trailing newline) would bring the active file to or past
    /// `max_bytes`, so the active file always stays below the threshold.
    ///
    /// The line is assembled into a single buffer and written with one
    /// `write_all` call, then flushed, so concurrent readers never observe
    /// a partial line.
    ///
    /// # Errors
    ///
    /// Write and rotation failures propagate to the caller; the in-flight
    /// line is never silently dropped.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buffer = Vec::with_capacity(line.len() + 1);
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(b'\n');

        let needed = u64::try_from(buffer.len()).unwrap_or(u64::MAX);
        if self.max_bytes > 0 && self.written.saturating_add(needed) >= self.max_bytes {
            self.rotate()?;
        }

        self.file.write_all(&buffer)?;
        self.file.flush()?;
        self.written = self.written.saturating_add(needed);
        Ok(())
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{index}", self.path.display()))
    }

    /// Renames the active file into the backup sequence and reopens a fresh
    /// active file. With a backup count of zero the active file is truncated
    /// in place instead.
    fn rotate(&mut self) -> io::Result<()> {
        if self.backup_count > 0 {
            let oldest = self.backup_path(self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}
