//! Section collectors.
//!
//! A collector turns one report section into text for the detected platform.
//! Platform dispatch is a lookup into [`tables`]: each `(section, family)`
//! pair maps to an ordered fallback chain of [`Probe`]s which is evaluated
//! lazily until one of them produces output. Collectors never fail; every
//! problem ends up as a diagnostic line inside the returned text.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;

use crate::core::{OsFamily, Platform, ReportConfig, SectionId};
use crate::platform::CommandOutput;

mod host;
pub mod tables;

pub use host::SystemHost;

const MAX_SECTION_OUTPUT_BYTES: usize = 64 * 1024;

pub trait Collector {
    fn section(&self) -> SectionId;
    fn collect(&self, platform: &Platform, config: &ReportConfig) -> String;
}

/// Access to the host for probes. [`SystemHost`] is the real one.
pub trait ProbeHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// One data source in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Command {
        program: &'static str,
        args: &'static [&'static str],
    },
    File(&'static str),
    Glob(&'static str),
    /// Several reads reported together as one source.
    Group(&'static [Probe]),
    /// Last resort; always succeeds.
    Message(&'static str),
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Command { program, args } => {
                f.write_str(program)?;
                for arg in *args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Probe::File(path) => f.write_str(path),
            Probe::Glob(pattern) => f.write_str(pattern),
            Probe::Group(members) => {
                let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", names.join(", "))
            }
            Probe::Message(_) => f.write_str("message"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Found(String),
    Missing(String),
}

pub fn attempt(host: &dyn ProbeHost, probe: &Probe) -> Attempt {
    let result = match probe {
        Probe::Command { program, args } => attempt_command(host, program, args),
        Probe::File(path) => attempt_file(host, Path::new(path)),
        Probe::Glob(pattern) => attempt_glob(host, pattern),
        Probe::Group(members) => attempt_group(host, members),
        Probe::Message(text) => Attempt::Found((*text).to_string()),
    };
    match &result {
        Attempt::Found(_) => tracing::debug!(probe = %probe, "probe produced output"),
        Attempt::Missing(reason) => tracing::debug!(probe = %probe, reason = %reason, "probe failed"),
    }
    result
}

fn attempt_command(host: &dyn ProbeHost, program: &str, args: &[&str]) -> Attempt {
    let output = match host.run(program, args) {
        Ok(output) => output,
        Err(err) => {
            let not_found = err
                .root_cause()
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
            if not_found {
                return Attempt::Missing(format!("{program} command not found"));
            }
            return Attempt::Missing(format!("{program} command failed: {err}"));
        }
    };

    if output.exit_code != 0 {
        let mut reason = format!("{program} command failed (exit_code={})", output.exit_code);
        if let Some(line) = output.stderr.lines().map(str::trim).find(|l| !l.is_empty()) {
            reason.push_str(": ");
            reason.push_str(line);
        }
        return Attempt::Missing(reason);
    }

    let stdout = output.stdout.trim_end();
    if stdout.trim().is_empty() {
        return Attempt::Missing(format!("{program} produced no output"));
    }
    Attempt::Found(stdout.to_string())
}

fn attempt_file(host: &dyn ProbeHost, path: &Path) -> Attempt {
    match host.read_to_string(path) {
        Ok(s) if !s.trim().is_empty() => Attempt::Found(s.trim_end().to_string()),
        Ok(_) => Attempt::Missing(format!("{} is empty", path.display())),
        Err(err) => Attempt::Missing(format!("{} is not readable: {err}", path.display())),
    }
}

fn attempt_glob(host: &dyn ProbeHost, pattern: &str) -> Attempt {
    let paths = match host.glob(pattern) {
        Ok(paths) => paths,
        Err(err) => return Attempt::Missing(format!("{pattern}: {err}")),
    };

    let lines: Vec<String> = paths
        .iter()
        .filter_map(|p| {
            let s = host.read_to_string(p).ok()?;
            let s = s.trim();
            (!s.is_empty()).then(|| format!("{}: {s}", p.display()))
        })
        .collect();

    if lines.is_empty() {
        return Attempt::Missing(format!("no readable files match {pattern}"));
    }
    Attempt::Found(lines.join("\n"))
}

fn attempt_group(host: &dyn ProbeHost, members: &[Probe]) -> Attempt {
    let mut found_any = false;
    let mut parts = Vec::with_capacity(members.len());
    for member in members {
        match attempt(host, member) {
            Attempt::Found(text) => {
                found_any = true;
                parts.push(format!("$ {member}\n{text}"));
            }
            Attempt::Missing(reason) => parts.push(format!("$ {member}\n({reason})")),
        }
    }
    if !found_any {
        return Attempt::Missing("no source in the group produced output".to_string());
    }
    Attempt::Found(parts.join("\n\n"))
}

/// Runs `chain` in order and returns the first output. When nothing works
/// the result lists every attempted probe with its failure.
pub fn first_available(host: &dyn ProbeHost, section: SectionId, chain: &[Probe]) -> String {
    let mut failures = Vec::new();
    for probe in chain {
        match attempt(host, probe) {
            Attempt::Found(text) => return text,
            Attempt::Missing(reason) => failures.push(format!("- {probe}: {reason}")),
        }
    }

    let mut out = format!("{section} info not available");
    for failure in failures {
        out.push('\n');
        out.push_str(&failure);
    }
    out
}

pub fn not_available_on(section: SectionId, family: OsFamily) -> String {
    format!("{section} information is not available on this platform ({family})")
}

/// Collector backed by the probe tables.
pub struct ChainCollector {
    section: SectionId,
    host: Rc<dyn ProbeHost>,
    max_lines: Option<usize>,
}

impl ChainCollector {
    pub fn new(section: SectionId, host: Rc<dyn ProbeHost>) -> Self {
        Self {
            section,
            host,
            max_lines: tables::max_lines(section),
        }
    }
}

impl Collector for ChainCollector {
    fn section(&self) -> SectionId {
        self.section
    }

    fn collect(&self, platform: &Platform, _config: &ReportConfig) -> String {
        let Some(chain) = tables::chain(self.section, platform.family) else {
            return not_available_on(self.section, platform.family);
        };
        let text = first_available(self.host.as_ref(), self.section, chain);
        let text = match self.max_lines {
            Some(max) => truncate_lines(&text, max),
            None => text,
        };
        truncate_string(&text, MAX_SECTION_OUTPUT_BYTES)
    }
}

/// The built-in collectors, one per section.
pub fn standard(host: Rc<dyn ProbeHost>) -> Vec<Box<dyn Collector>> {
    SectionId::ALL
        .into_iter()
        .map(|section| Box::new(ChainCollector::new(section, host.clone())) as Box<dyn Collector>)
        .collect()
}

fn truncate_lines(s: &str, max_lines: usize) -> String {
    let total = s.lines().count();
    if total <= max_lines {
        return s.to_string();
    }
    let mut out = s.lines().take(max_lines).collect::<Vec<_>>().join("\n");
    out.push_str(&format!("\n...({} more lines)", total - max_lines));
    out
}

fn truncate_string(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut idx = max_bytes;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx = idx.saturating_sub(1);
    }
    let head = &s[..idx];
    format!("{head}\n...(truncated, total={} bytes)", s.len())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeHost;
    use super::*;

    const CHAIN: &[Probe] = &[
        Probe::Command {
            program: "lscpu",
            args: &[],
        },
        Probe::File("/proc/cpuinfo"),
        Probe::Message("cpu details unavailable"),
    ];

    #[test]
    fn first_successful_probe_wins_and_later_ones_are_not_run() {
        let host = FakeHost::default()
            .command("lscpu", 0, "Architecture: x86_64\n")
            .file("/proc/cpuinfo", "processor : 0\n");
        let out = first_available(&host, SectionId::Cpu, CHAIN);
        assert_eq!(out, "Architecture: x86_64");
        assert_eq!(host.calls.borrow().as_slice(), ["lscpu"]);
    }

    #[test]
    fn failing_command_falls_back_to_file() {
        let host = FakeHost::default()
            .command("lscpu", 1, "")
            .file("/proc/cpuinfo", "processor : 0\n");
        let out = first_available(&host, SectionId::Cpu, CHAIN);
        assert_eq!(out, "processor : 0");
    }

    #[test]
    fn empty_output_counts_as_absent() {
        let host = FakeHost::default()
            .command("lscpu", 0, "  \n")
            .file("/proc/cpuinfo", "");
        let out = first_available(&host, SectionId::Cpu, CHAIN);
        assert_eq!(out, "cpu details unavailable");
    }

    #[test]
    fn exhausted_chain_reports_each_failure() {
        let chain = &CHAIN[..2];
        let host = FakeHost::default().command("lscpu", 2, "");
        let out = first_available(&host, SectionId::Cpu, chain);
        assert!(out.starts_with("CPU info not available"), "out={out}");
        assert!(
            out.contains("- lscpu: lscpu command failed (exit_code=2): simulated failure"),
            "out={out}"
        );
        assert!(out.contains("- /proc/cpuinfo: /proc/cpuinfo is not readable"), "out={out}");
    }

    #[test]
    fn missing_program_is_reported_as_not_found() {
        let host = FakeHost::default();
        let out = first_available(
            &host,
            SectionId::Containers,
            &[Probe::Command {
                program: "docker",
                args: &["ps"],
            }],
        );
        assert!(out.contains("docker command not found"), "out={out}");
    }

    #[test]
    fn group_succeeds_when_any_member_does() {
        let host = FakeHost::default().command("sysctl -n hw.memsize", 0, "17179869184\n");
        let probe = Probe::Group(&[
            Probe::Command {
                program: "sysctl",
                args: &["-n", "hw.memsize"],
            },
            Probe::Command {
                program: "vm_stat",
                args: &[],
            },
        ]);
        let Attempt::Found(text) = attempt(&host, &probe) else {
            panic!("group should succeed");
        };
        assert!(text.contains("$ sysctl -n hw.memsize\n17179869184"), "text={text}");
        assert!(text.contains("$ vm_stat\n(vm_stat command not found)"), "text={text}");
    }

    #[test]
    fn group_fails_when_every_member_fails() {
        let host = FakeHost::default();
        let probe = Probe::Group(&[Probe::File("/nope"), Probe::File("/nope2")]);
        assert!(matches!(attempt(&host, &probe), Attempt::Missing(_)));
    }

    #[test]
    fn glob_renders_each_matching_file() {
        let host = FakeHost::default()
            .file("/sys/class/thermal/thermal_zone0/temp", "45000\n")
            .file("/sys/class/thermal/thermal_zone1/temp", "51000\n")
            .file("/sys/class/thermal/cooling_device0/cur_state", "0\n");
        let out = first_available(
            &host,
            SectionId::Temperature,
            &[Probe::Glob("/sys/class/thermal/thermal_zone*/temp")],
        );
        assert_eq!(
            out,
            "/sys/class/thermal/thermal_zone0/temp: 45000\n/sys/class/thermal/thermal_zone1/temp: 51000"
        );
    }

    #[test]
    fn unsupported_platform_gets_fixed_line() {
        let host: Rc<dyn ProbeHost> = Rc::new(FakeHost::default());
        let collector = ChainCollector::new(SectionId::Cpu, host);
        let out = collector.collect(&Platform::unknown(), &ReportConfig::default());
        assert_eq!(out, "CPU information is not available on this platform (unknown)");
    }

    #[test]
    fn chain_collector_caps_lines() {
        let rows: String = (0..100).map(|i| format!("proc {i}\n")).collect();
        let host = FakeHost::default().command("ps aux --sort=-%cpu", 0, &rows);
        let collector = ChainCollector::new(SectionId::Processes, Rc::new(host));
        let out = collector.collect(&Platform::new(OsFamily::Linux), &ReportConfig::default());
        let max = tables::max_lines(SectionId::Processes).expect("processes are capped");
        assert_eq!(out.lines().count(), max + 1);
        assert!(out.ends_with(&format!("...({} more lines)", 100 - max)), "out={out}");
    }

    #[test]
    fn truncate_string_respects_char_boundaries() {
        let s = "ééééé";
        let out = truncate_string(s, 3);
        assert!(out.starts_with('é'));
        assert!(out.contains("truncated, total=10 bytes"));
    }

    #[test]
    fn standard_builds_one_collector_per_section_in_order() {
        let host: Rc<dyn ProbeHost> = Rc::new(FakeHost::default());
        let sections: Vec<SectionId> = standard(host).iter().map(|c| c.section()).collect();
        assert_eq!(sections, SectionId::ALL.to_vec());
    }
}
