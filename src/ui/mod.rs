use anyhow::Error;
use std::io::{self, Write};

use crate::engine::ReportOutcome;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub echo: bool,
    pub quiet: bool,
}

impl UiConfig {
    pub fn show_progress(&self) -> bool {
        self.stderr_is_tty && !self.quiet
    }

    pub fn echo_body(&self) -> bool {
        self.echo && self.stdout_is_tty && !self.quiet
    }
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(stderr, "  - rerun with `--verbose` for diagnostic output");
    let _ = writeln!(stderr, "  - see `sysreport --help` for the available options");
}

pub fn print_summary(outcome: &ReportOutcome, max_logs: usize, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = out.write_all(format_summary(outcome, max_logs, cfg.color).as_bytes());
}

/// Writes the report body to stdout. The report is already on disk by now,
/// so a failed echo is only a warning.
pub fn echo_report(body: &str, cfg: &UiConfig) {
    if !cfg.echo_body() {
        return;
    }
    echo_report_to(&mut io::stdout().lock(), body);
}

fn echo_report_to(out: &mut impl Write, body: &str) {
    if let Err(err) = write_echo(out, body) {
        tracing::warn!(error = %err, "failed to echo report to stdout");
    }
}

fn write_echo(out: &mut impl Write, body: &str) -> io::Result<()> {
    match out.write_all(body.as_bytes()).and_then(|()| out.write_all(b"\n")) {
        Ok(()) => out.flush(),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err),
    }
}

pub fn format_summary(outcome: &ReportOutcome, max_logs: usize, color: bool) -> String {
    use std::fmt::Write as _;

    let mut s = String::new();
    let _ = writeln!(s, "{} {}", label("Platform:", color), outcome.platform);
    let _ = writeln!(
        s,
        "{}   {}",
        label("Report:", color),
        outcome.path.display()
    );
    let _ = writeln!(
        s,
        "{}     {}",
        label("Logs:", color),
        format_occupancy(outcome.occupancy, max_logs, color)
    );
    let removed = outcome.retention.removed.len();
    if removed > 0 {
        let _ = writeln!(s, "{}  {removed} old report(s)", label("Removed:", color));
    }
    let failed = outcome.retention.failed.len();
    if failed > 0 {
        let _ = writeln!(
            s,
            "{}  {}",
            label("Warning:", color),
            paint(&format!("{failed} old report(s) could not be removed"), "33", color)
        );
    }
    s
}

fn format_occupancy(occupancy: usize, max_logs: usize, color: bool) -> String {
    let s = format!("{occupancy}/{max_logs} retained");
    let code = if occupancy >= max_logs { "33" } else { "32" };
    paint(&s, code, color)
}

fn label(s: &str, color: bool) -> String {
    paint(s, "1", color)
}

fn paint(s: &str, code: &str, color: bool) -> String {
    if !color {
        return s.to_string();
    }
    format!("\x1b[{code}m{s}\x1b[0m")
}
