//! Command-line history with optional append-only persistence.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use soundman_types::error::Result;

/// Input lines entered at the prompt, oldest first.
#[derive(Debug)]
pub struct History {
    entries: Vec<String>,
    max: usize,
    file: Option<PathBuf>,
}

impl History {
    /// In-memory history keeping at most `max` entries.
    pub fn new(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max: max.max(1),
            file: None,
        }
    }

    /// History backed by `path`: existing lines are loaded now and every new
    /// line is appended. A missing file is treated as empty.
    pub fn with_file(max: usize, path: &Path) -> Result<Self> {
        let mut history = Self::new(max);
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for line in reader.lines() {
                history.push_entry(&line?);
            }
            log::debug!(
                "loaded {} history entries from {}",
                history.entries.len(),
                path.display()
            );
        }
        history.file = Some(path.to_path_buf());
        Ok(history)
    }

    /// Record a line. Blank lines and repeats of the last entry are skipped.
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if !self.push_entry(line) {
            return;
        }
        if let Some(path) = &self.file
            && let Err(e) = append_line(path, line)
        {
            log::warn!("could not save history to {}: {e}", path.display());
        }
    }

    fn push_entry(&mut self, line: &str) -> bool {
        if line.is_empty() || self.entries.last().is_some_and(|last| last == line) {
            return false;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max {
            self.entries.remove(0);
        }
        true
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Forget the in-memory entries. The file, if any, is left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}
