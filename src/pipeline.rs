use std::fmt::Write as _;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::collectors::Collector;
use crate::core::{Platform, ReportConfig, SectionId};

const BANNER_RULE: &str = "==================================================";

/// Runs the enabled collectors in section order and assembles the report
/// body. Knows nothing about how any section is collected.
pub struct CollectorPipeline {
    collectors: Vec<Box<dyn Collector>>,
    hostname: Option<String>,
}

impl CollectorPipeline {
    pub fn new(mut collectors: Vec<Box<dyn Collector>>) -> Self {
        collectors.sort_by_key(|c| c.section());
        Self {
            collectors,
            hostname: None,
        }
    }

    /// The eleven built-in collectors sharing one probe host.
    pub fn standard(host: std::rc::Rc<dyn crate::collectors::ProbeHost>) -> Self {
        Self::new(crate::collectors::standard(host))
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }

    /// Sections that would run under `config`, in output order.
    pub fn sections(&self, config: &ReportConfig) -> Vec<SectionId> {
        self.collectors
            .iter()
            .map(|c| c.section())
            .filter(|s| s.enabled(config))
            .collect()
    }

    pub fn run_at(
        &self,
        platform: &Platform,
        config: &ReportConfig,
        generated_at: OffsetDateTime,
        mut on_section: impl FnMut(SectionId),
    ) -> String {
        let mut body = self.banner(platform, generated_at);
        for collector in &self.collectors {
            let section = collector.section();
            if !section.enabled(config) {
                tracing::debug!(section = %section, "section disabled");
                continue;
            }
            on_section(section);
            tracing::debug!(section = %section, "collecting section");
            let text = collector.collect(platform, config);
            let _ = writeln!(body);
            let _ = writeln!(body, "{}", section_header(section));
            let _ = writeln!(body, "{}", text.trim_end());
        }
        body
    }

    fn banner(&self, platform: &Platform, generated_at: OffsetDateTime) -> String {
        let generated = generated_at
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
            ))
            .unwrap_or_else(|_| "unknown".to_string());
        let host = self.hostname.as_deref().unwrap_or("unknown");

        let mut out = String::new();
        let _ = writeln!(out, "{BANNER_RULE}");
        let _ = writeln!(out, " System Diagnostic Report");
        let _ = writeln!(out, " Generated: {generated}");
        let _ = writeln!(out, " Platform:  {platform}");
        let _ = writeln!(out, " Host:      {host}");
        let _ = writeln!(out, "{BANNER_RULE}");
        out
    }
}

pub fn section_header(section: SectionId) -> String {
    format!("=== {} ===", section.name())
}
