//! Durable, size-bounded log history for one process.
//!
//! Lines are appended to numbered segment files inside the process's log
//! directory. When the active segment reaches `max_lines` it is sealed and a
//! new one is opened; sealed segments beyond `max_files` are deleted oldest
//! first. The disk footprint is therefore bounded by
//! `max_lines * (max_files + 1)` lines.

use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use prochub_core::{LogEntry, LogStoreError};
use tracing::{debug, warn};

use super::rotation::{
    needs_rotation, next_segment_index, parse_segment_index, plan_prune, segment_file_name,
};

struct ActiveSegment {
    index: u64,
    writer: LineWriter<File>,
    lines: usize,
}

/// Rolling segment store for one process.
///
/// The directory is created and existing segments are discovered on the first
/// append; the newest existing segment is resumed as the active one.
pub struct RollingLogStore {
    dir: PathBuf,
    max_lines: usize,
    max_files: usize,
    /// Known segment indices, ascending. Populated on activation.
    segments: Vec<u64>,
    active: Option<ActiveSegment>,
}

impl std::fmt::Debug for RollingLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingLogStore")
            .field("dir", &self.dir)
            .field("max_lines", &self.max_lines)
            .field("max_files", &self.max_files)
            .field("segments", &self.segments)
            .field("active_lines", &self.active.as_ref().map(|a| a.lines))
            .finish()
    }
}

impl RollingLogStore {
    pub fn new(dir: impl Into<PathBuf>, max_lines: usize, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_lines,
            max_files,
            segments: Vec::new(),
            active: None,
        }
    }

    /// Append one entry as `<timestamp> [<stream>] <line>`.
    ///
    /// After a write failure the active segment is dropped and reopened on the
    /// next append.
    pub fn append(&mut self, entry: &LogEntry) -> Result<(), LogStoreError> {
        if self.active.is_none() {
            self.activate()?;
        }
        if self
            .active
            .as_ref()
            .is_some_and(|a| needs_rotation(a.lines, self.max_lines))
        {
            self.rotate()?;
        }

        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let mut line = entry.to_log_line();
        line.push('\n');
        if let Err(source) = active.writer.write_all(line.as_bytes()) {
            let path = self.dir.join(segment_file_name(active.index));
            self.active = None;
            return Err(LogStoreError::Write { path, source });
        }
        active.lines += 1;
        Ok(())
    }

    /// Paths of the segments currently on disk, oldest first.
    pub fn files(&self) -> Result<Vec<PathBuf>, LogStoreError> {
        Ok(list_segments(&self.dir)?
            .into_iter()
            .map(|index| self.dir.join(segment_file_name(index)))
            .collect())
    }

    /// Retained history, oldest line first, as written to disk.
    pub fn read_lines(&self) -> Result<Vec<String>, LogStoreError> {
        let mut lines = Vec::new();
        for path in self.files()? {
            let content = match fs::read(&path) {
                Ok(bytes) => bytes,
                // Pruned between listing and reading
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(LogStoreError::Read { path, source }),
            };
            lines.extend(
                String::from_utf8_lossy(&content)
                    .lines()
                    .map(str::to_owned),
            );
        }
        Ok(lines)
    }

    /// Write the retained history to `dest`, returning the number of lines.
    pub fn export_to(&self, dest: &Path) -> Result<usize, LogStoreError> {
        let lines = self.read_lines()?;
        let export_err = |source| LogStoreError::Export {
            path: dest.to_path_buf(),
            source,
        };

        let mut out = io::BufWriter::new(File::create(dest).map_err(export_err)?);
        for line in &lines {
            writeln!(out, "{line}").map_err(export_err)?;
        }
        out.flush().map_err(export_err)?;
        Ok(lines.len())
    }

    fn activate(&mut self) -> Result<(), LogStoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| LogStoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        self.segments = list_segments(&self.dir)?;
        let index = match self.segments.last() {
            Some(&newest) => newest,
            None => {
                let first = next_segment_index(None);
                self.segments.push(first);
                first
            }
        };

        let path = self.dir.join(segment_file_name(index));
        let (lines, unterminated) = scan_segment(&path)?;
        debug!(path = %path.display(), lines, "Resuming log segment");
        let mut active = open_segment(&path, index, lines)?;
        if unterminated {
            // Close the partial last line so the next entry starts on its own
            active
                .writer
                .write_all(b"\n")
                .map_err(|source| LogStoreError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        self.active = Some(active);
        self.prune();
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), LogStoreError> {
        let current = self.active.take().map(|a| a.index);
        let index = next_segment_index(current.or_else(|| self.segments.last().copied()));
        let path = self.dir.join(segment_file_name(index));

        self.active = Some(open_segment(&path, index, 0)?);
        self.segments.push(index);
        debug!(path = %path.display(), "Rotated log segment");
        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        let doomed = plan_prune(&self.segments, self.max_files).len();
        for index in self.segments.drain(..doomed) {
            let path = self.dir.join(segment_file_name(index));
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Deleted old log segment"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete old log segment"),
            }
        }
    }
}

fn open_segment(path: &Path, index: u64, lines: usize) -> Result<ActiveSegment, LogStoreError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogStoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(ActiveSegment {
        index,
        writer: LineWriter::new(file),
        lines,
    })
}

/// Line count of a segment, and whether its last line lacks a newline.
///
/// A partial last line counts as a line.
fn scan_segment(path: &Path) -> Result<(usize, bool), LogStoreError> {
    match fs::read(path) {
        Ok(bytes) => {
            let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
            let unterminated = bytes.last().is_some_and(|&b| b != b'\n');
            Ok((newlines + usize::from(unterminated), unterminated))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((0, false)),
        Err(source) => Err(LogStoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn list_segments(dir: &Path) -> Result<Vec<u64>, LogStoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LogStoreError::Read {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut indices: Vec<u64> = entries
        .flatten()
        .filter_map(|entry| parse_segment_index(&entry.file_name().to_string_lossy()))
        .collect();
    indices.sort_unstable();
    Ok(indices)
}
