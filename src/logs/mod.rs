//! The managed report directory.
//!
//! The directory listing is the retention index: every regular
//! `sysreport_*.log` file directly inside it counts as a report, nothing is
//! cached between calls. Other files sharing the directory are never touched.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use time::OffsetDateTime;
use time::macros::format_description;

mod lock;

pub use lock::StoreLock;

pub const REPORT_PREFIX: &str = "sysreport_";
pub const REPORT_EXTENSION: &str = ".log";
pub const LOCK_FILE_NAME: &str = ".sysreport.lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionOutcome {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
    max_logs: usize,
    pattern: GlobMatcher,
}

pub fn default_logs_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/sysreport/logs")
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>, max_logs: usize) -> Result<Self> {
        if max_logs == 0 {
            return Err(crate::exit::invalid_args(
                "the number of retained reports must be at least 1",
            ));
        }
        let pattern = Glob::new(&format!("{REPORT_PREFIX}*{REPORT_EXTENSION}"))
            .context("invalid report file pattern")?
            .compile_matcher();
        Ok(Self {
            dir: dir.into(),
            max_logs,
            pattern,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_logs(&self) -> usize {
        self.max_logs
    }

    /// Destination for a new report. The result is always a direct child of
    /// the managed directory named `sysreport_<base>.log`; callers only
    /// choose the base name.
    pub fn resolve_path(&self, requested: Option<&str>, now: OffsetDateTime) -> Result<PathBuf> {
        let Some(requested) = requested else {
            return Ok(self.timestamped_path(now));
        };

        let base = requested
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "." || base == ".." {
            return Err(crate::exit::invalid_args(format!(
                "output name has no usable file name: {requested:?}"
            )));
        }
        if base.starts_with('.') {
            return Err(crate::exit::invalid_args(format!(
                "output name must not start with '.': {requested:?}"
            )));
        }

        let base = base.strip_prefix(REPORT_PREFIX).unwrap_or(base);
        let base = base.strip_suffix(REPORT_EXTENSION).unwrap_or(base);
        if base.is_empty() {
            return Err(crate::exit::invalid_args(format!(
                "output name has no usable file name: {requested:?}"
            )));
        }
        Ok(self
            .dir
            .join(format!("{REPORT_PREFIX}{base}{REPORT_EXTENSION}")))
    }

    fn timestamped_path(&self, now: OffsetDateTime) -> PathBuf {
        let stamp = now
            .format(format_description!(
                "[year][month][day]_[hour][minute][second]"
            ))
            .unwrap_or_else(|_| now.unix_timestamp().to_string());

        let first = self
            .dir
            .join(format!("{REPORT_PREFIX}{stamp}{REPORT_EXTENSION}"));
        if !first.exists() {
            return first;
        }
        (2u32..)
            .map(|n| {
                self.dir
                    .join(format!("{REPORT_PREFIX}{stamp}-{n}{REPORT_EXTENSION}"))
            })
            .find(|p| !p.exists())
            .unwrap_or(first)
    }

    pub fn ensure_directory(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create report directory: {}", self.dir.display())
        })?;
        if !self.dir.is_dir() {
            return Err(anyhow::anyhow!(
                "report directory is not a directory: {}",
                self.dir.display()
            ));
        }
        Ok(())
    }

    pub fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(&self.dir.join(LOCK_FILE_NAME))
    }

    /// Reports in the directory, oldest first; ties are ordered by path.
    pub fn list(&self) -> Result<Vec<LogFile>> {
        let entries = std::fs::read_dir(&self.dir).with_context(|| {
            format!("failed to read report directory: {}", self.dir.display())
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || !self.pattern.is_match(&*name) {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            files.push(LogFile {
                path: entry.path(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
        sort_oldest_first(&mut files);
        Ok(files)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Makes room for one more report so that the directory holds at most
    /// `max_logs` reports after the next write.
    pub fn enforce_retention(&self) -> Result<RetentionOutcome> {
        self.enforce_retention_with(|path| std::fs::remove_file(path))
    }

    pub fn enforce_retention_with(
        &self,
        mut remove: impl FnMut(&Path) -> io::Result<()>,
    ) -> Result<RetentionOutcome> {
        let files = self.list()?;
        let mut outcome = RetentionOutcome::default();
        for file in select_for_removal(files, self.max_logs) {
            match remove(&file.path) {
                Ok(()) => {
                    tracing::debug!(path = %file.path.display(), "removed old report");
                    outcome.removed.push(file.path);
                }
                Err(err) => {
                    tracing::warn!(
                        path = %file.path.display(),
                        error = %err,
                        "failed to remove old report"
                    );
                    outcome.failed.push((file.path, err.to_string()));
                }
            }
        }
        Ok(outcome)
    }

    /// Writes `body` to `path` so the destination only ever holds a complete
    /// report: data goes to a temp file in the same directory which is then
    /// renamed into place.
    pub fn write_atomic(&self, path: &Path, body: &str) -> Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".sysreport-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        tmp.write_all(body.as_bytes())
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        tmp.flush()
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("failed to sync report: {}", path.display()))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to move report into place: {}", path.display()))?;
        sync_dir(&self.dir);
        Ok(())
    }
}

/// The oldest `len - max + 1` files when the directory is at or over `max`.
pub fn select_for_removal(mut files: Vec<LogFile>, max_logs: usize) -> Vec<LogFile> {
    let max_logs = max_logs.max(1);
    if files.len() < max_logs {
        return Vec::new();
    }
    sort_oldest_first(&mut files);
    let excess = files.len() - max_logs + 1;
    files.truncate(excess);
    files
}

fn sort_oldest_first(files: &mut [LogFile]) {
    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(d) = File::open(dir) {
        let _ = d.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
