use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use time::OffsetDateTime;

use crate::core::{Platform, ReportConfig, SectionId};
use crate::logs::{LogStore, RetentionOutcome};
use crate::pipeline::CollectorPipeline;

#[derive(Debug, Clone, Default)]
pub struct WriterOptions {
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub platform: Platform,
    pub path: PathBuf,
    pub occupancy: usize,
    pub retention: RetentionOutcome,
    pub body: String,
}

/// Detect → ensure directory → retention → collect → persist → report.
/// Only storage problems abort a run; collectors never fail.
pub struct ReportWriter {
    store: LogStore,
    pipeline: CollectorPipeline,
    detect: Box<dyn Fn() -> Platform>,
    opts: WriterOptions,
}

impl ReportWriter {
    pub fn new(store: LogStore, pipeline: CollectorPipeline, opts: WriterOptions) -> Self {
        Self {
            store,
            pipeline,
            detect: Box::new(crate::platform::detect),
            opts,
        }
    }

    pub fn with_detector(mut self, detect: impl Fn() -> Platform + 'static) -> Self {
        self.detect = Box::new(detect);
        self
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn run(&self, config: &ReportConfig) -> Result<ReportOutcome> {
        self.run_at(config, OffsetDateTime::now_utc())
    }

    pub fn run_at(&self, config: &ReportConfig, now: OffsetDateTime) -> Result<ReportOutcome> {
        let platform = (self.detect)();

        tracing::debug!(
            dir = %self.store.dir().display(),
            max = self.store.max_logs(),
            "preparing report directory"
        );
        self.store
            .ensure_directory()
            .map_err(crate::exit::storage_err)?;
        let _lock = self.store.lock().map_err(crate::exit::storage_err)?;

        let path = self.store.resolve_path(config.output_name.as_deref(), now)?;

        let retention = match self.store.enforce_retention() {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "retention skipped");
                RetentionOutcome::default()
            }
        };

        let body = self.collect(&platform, config, now);

        self.store
            .write_atomic(&path, &body)
            .map_err(crate::exit::storage_err)?;
        let occupancy = self.store.count().map_err(crate::exit::storage_err)?;
        tracing::info!(path = %path.display(), occupancy, "report written");

        Ok(ReportOutcome {
            platform,
            path,
            occupancy,
            retention,
            body,
        })
    }

    fn collect(&self, platform: &Platform, config: &ReportConfig, now: OffsetDateTime) -> String {
        use std::io::IsTerminal;
        let progress_enabled = self.opts.show_progress && std::io::stderr().is_terminal();
        let pb = if progress_enabled {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.set_message("Collecting system information...");
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let total = self.pipeline.sections(config).len();
        tracing::debug!(sections = total, "collecting report");
        let mut done = 0usize;
        let body = self.pipeline.run_at(platform, config, now, |section| {
            done += 1;
            if let Some(pb) = &pb {
                pb.set_message(progress_message(section, done, total));
            }
        });

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        body
    }
}

fn progress_message(section: SectionId, done: usize, total: usize) -> String {
    format!("Collecting {section} ({done}/{total})...")
}
