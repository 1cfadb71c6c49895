// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat `KEY=value` file backend.

use super::{ConfigStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

/// Config store backed by a properties-style file.
///
/// The file is re-read on every lookup so edits made while the process runs
/// are picked up. Rewrites keep every unrelated line as it was.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Open an existing config file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Split a line into `(key, value)` if it is an assignment.
///
/// Comment lines and lines whose `=` is at position 0 are not assignments.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    match trimmed.find('=') {
        Some(idx) if idx > 0 => Some((trimmed[..idx].trim(), trimmed[idx + 1..].trim())),
        _ => None,
    }
}

/// Split a raw line into its text and its line ending (`\r\n`, `\n` or none).
fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        let value = contents
            .lines()
            .filter_map(parse_line)
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .last();
        Ok(value.filter(|v| !v.is_empty()).map(str::to_string))
    }

    fn update(&self, changes: &[(&str, String)]) -> Result<(), StoreError> {
        tracing::debug!(
            path = %self.path.display(),
            keys = ?changes.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            "Updating config file"
        );

        let contents = fs::read_to_string(&self.path)?;
        let newline = if contents.contains("\r\n") { "\r\n" } else { "\n" };
        let mut seen = vec![false; changes.len()];
        let mut out = String::with_capacity(contents.len() + 64);

        for raw in contents.split_inclusive('\n') {
            let (line, ending) = split_line_ending(raw);
            let replacement = parse_line(line).and_then(|(key, _)| {
                changes
                    .iter()
                    .position(|(k, _)| *k == key)
                    .map(|idx| (idx, key))
            });
            match replacement {
                Some((idx, key)) => {
                    seen[idx] = true;
                    out.push_str(key);
                    out.push('=');
                    out.push_str(&changes[idx].1);
                    out.push_str(ending);
                }
                None => out.push_str(raw),
            }
        }

        for ((key, value), seen) in changes.iter().zip(seen) {
            if !seen {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push_str(newline);
                }
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push_str(newline);
            }
        }

        fs::write(&self.path, out)?;
        Ok(())
    }
}
