use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::collectors::ProbeHost;
use crate::platform::{self, CommandOutput, CommandRunOptions};

/// Probes against the real machine. Every command is bounded by the
/// per-command timeout and by what is left of the run budget.
#[derive(Debug, Clone)]
pub struct SystemHost {
    timeout: Duration,
    deadline: Option<Instant>,
    options: CommandRunOptions,
}

impl SystemHost {
    pub fn new(timeout: Duration, budget: Option<Duration>) -> Self {
        Self {
            timeout,
            deadline: budget.map(|b| Instant::now() + b),
            options: CommandRunOptions::c_locale(),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        let Some(deadline) = self.deadline else {
            return self.timeout;
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        std::cmp::min(self.timeout, remaining)
    }
}

impl ProbeHost for SystemHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let timeout = self.command_timeout();
        if timeout.is_zero() {
            tracing::warn!(program, "collection budget exhausted; skipping command");
            return Err(anyhow!("collection budget exhausted before {program} could run"));
        }
        platform::run_command_with_options(program, args, timeout, &self.options)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob: {pattern}"))?
            .compile_matcher();

        let (root, depth) = glob_root(pattern);
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&root)
            .follow_links(true)
            .max_depth(depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && matcher.is_match(e.path()))
            .map(|e| e.into_path())
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// Splits a glob into its literal leading directory and the number of
/// components left to walk below it.
fn glob_root(pattern: &str) -> (PathBuf, usize) {
    let is_meta = |s: &str| s.contains(['*', '?', '[', '{']);
    let mut root = PathBuf::new();
    let mut rest = 0;
    let mut in_glob = false;
    for component in Path::new(pattern).components() {
        let s = component.as_os_str().to_string_lossy();
        if !in_glob && (matches!(component, Component::RootDir | Component::Prefix(_)) || !is_meta(&s))
        {
            root.push(component.as_os_str());
        } else {
            in_glob = true;
            rest += 1;
        }
    }
    if rest == 0 {
        if let Some(parent) = root.parent().map(Path::to_path_buf) {
            return (parent, 1);
        }
    }
    (root, rest)
}
