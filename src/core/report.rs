/// Per-run report settings, built once from CLI input and the effective
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub output_name: Option<String>,
    pub include_docker: bool,
    pub include_audio: bool,
    pub include_temperature: bool,
    /// Accepted for compatibility; collection does not depend on it.
    pub verbose: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_name: None,
            include_docker: true,
            include_audio: true,
            include_temperature: true,
            verbose: false,
        }
    }
}
