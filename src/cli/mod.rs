use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;

use crate::collectors::SystemHost;
use crate::core::ReportConfig;
use crate::engine::{ReportWriter, WriterOptions};
use crate::logs::LogStore;
use crate::pipeline::CollectorPipeline;
use crate::ui::UiConfig;

const CONFIG_ENV: &str = "SYSREPORT_CONFIG";

#[derive(Debug, Parser)]
#[command(
    name = "sysreport",
    version,
    about = "Collect a plain-text system diagnostic report and keep a bounded history of them"
)]
pub struct Cli {
    /// Raise diagnostic logging on stderr to debug
    #[arg(short, long)]
    pub verbose: bool,
    /// Report name inside the log directory, stored as "sysreport_<NAME>.log"
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,
    /// Skip the container section
    #[arg(long = "no-docker")]
    pub no_docker: bool,
    /// Skip the audio sections
    #[arg(long = "no-audio")]
    pub no_audio: bool,
    /// Skip the temperature section
    #[arg(long = "no-temp")]
    pub no_temp: bool,
    /// Configuration file (overrides $SYSREPORT_CONFIG)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
    #[arg(long = "no-color")]
    pub no_color: bool,
    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    fn report_config(&self, cfg: &crate::config::EffectiveConfig) -> ReportConfig {
        ReportConfig {
            output_name: self.output.clone(),
            include_docker: cfg.collect.docker && !self.no_docker,
            include_audio: cfg.collect.audio && !self.no_audio,
            include_temperature: cfg.collect.temperature && !self.no_temp,
            verbose: self.verbose,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(()),
                _ => Err(crate::exit::usage(err)),
            };
        }
    };

    crate::telemetry::init(cli.verbose);

    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::platform::effective_home_dir().map_err(crate::exit::invalid_args_err)?;

    let env_config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;
    tracing::debug!(
        config = cfg.config_path.as_deref().unwrap_or("<defaults>"),
        logs_dir = %cfg.logs.dir.display(),
        max = cfg.logs.max,
        "effective configuration"
    );

    let ui_cfg = UiConfig {
        color: stdout_is_tty && cfg.ui.color && !cli.no_color,
        stdout_is_tty,
        stderr_is_tty,
        echo: cfg.ui.echo,
        quiet: cli.quiet,
    };

    let report_cfg = cli.report_config(&cfg);
    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.collect.timeout());
    let host = SystemHost::new(timeout, Some(cfg.collect.budget()));
    let pipeline =
        CollectorPipeline::standard(Rc::new(host)).with_hostname(crate::platform::hostname());

    let store = LogStore::new(cfg.logs.dir.clone(), cfg.logs.max)?;
    let writer = ReportWriter::new(
        store,
        pipeline,
        WriterOptions {
            show_progress: ui_cfg.show_progress(),
        },
    );

    let outcome = writer.run(&report_cfg)?;

    crate::ui::echo_report(&outcome.body, &ui_cfg);
    crate::ui::print_summary(&outcome, writer.store().max_logs(), &ui_cfg);

    Ok(())
}
