use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub logs: LogsConfig,
    pub collect: CollectConfig,
    pub ui: UiConfig,
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsConfig {
    pub dir: PathBuf,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectConfig {
    pub timeout_secs: u64,
    pub budget_secs: u64,
    pub docker: bool,
    pub audio: bool,
    pub temperature: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub color: bool,
    pub echo: bool,
}

impl CollectConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }
}

impl EffectiveConfig {
    pub fn defaults(home_dir: &Path) -> Self {
        Self {
            logs: LogsConfig {
                dir: crate::logs::default_logs_dir(home_dir),
                max: 10,
            },
            collect: CollectConfig {
                timeout_secs: 10,
                budget_secs: 120,
                docker: true,
                audio: true,
                temperature: true,
            },
            ui: UiConfig {
                color: true,
                echo: true,
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    logs: Option<RawLogsConfig>,
    collect: Option<RawCollectConfig>,
    ui: Option<RawUiConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogsConfig {
    dir: Option<String>,
    max: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCollectConfig {
    timeout_secs: Option<u64>,
    budget_secs: Option<u64>,
    docker: Option<bool>,
    audio: Option<bool>,
    temperature: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUiConfig {
    color: Option<bool>,
    echo: Option<bool>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/sysreport/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::defaults(home_dir);

    let explicit = config_path.is_some();
    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw, home_dir);
        cfg.config_path = Some(path.display().to_string());
    } else if explicit {
        return Err(anyhow::anyhow!("config file not found: {}", path.display()));
    }

    apply_env_overrides(&mut cfg, home_dir)?;
    validate(&cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig, home_dir: &Path) {
    if let Some(logs) = raw.logs {
        if let Some(dir) = logs.dir {
            cfg.logs.dir = expand_home(&dir, home_dir);
        }
        if let Some(max) = logs.max {
            cfg.logs.max = max;
        }
    }

    if let Some(collect) = raw.collect {
        if let Some(timeout_secs) = collect.timeout_secs {
            cfg.collect.timeout_secs = timeout_secs;
        }
        if let Some(budget_secs) = collect.budget_secs {
            cfg.collect.budget_secs = budget_secs;
        }
        if let Some(docker) = collect.docker {
            cfg.collect.docker = docker;
        }
        if let Some(audio) = collect.audio {
            cfg.collect.audio = audio;
        }
        if let Some(temperature) = collect.temperature {
            cfg.collect.temperature = temperature;
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(echo) = ui.echo {
            cfg.ui.echo = echo;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig, home_dir: &Path) -> Result<()> {
    if let Ok(v) = std::env::var("SYSREPORT_LOGS_DIR") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.logs.dir = expand_home(v, home_dir);
        }
    }
    if let Ok(v) = std::env::var("SYSREPORT_LOGS_MAX") {
        cfg.logs.max = v
            .trim()
            .parse::<usize>()
            .with_context(|| "SYSREPORT_LOGS_MAX")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_COLLECT_TIMEOUT_SECS") {
        cfg.collect.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "SYSREPORT_COLLECT_TIMEOUT_SECS")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_COLLECT_BUDGET_SECS") {
        cfg.collect.budget_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "SYSREPORT_COLLECT_BUDGET_SECS")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_COLLECT_DOCKER") {
        cfg.collect.docker = parse_bool(&v).with_context(|| "SYSREPORT_COLLECT_DOCKER")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_COLLECT_AUDIO") {
        cfg.collect.audio = parse_bool(&v).with_context(|| "SYSREPORT_COLLECT_AUDIO")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_COLLECT_TEMPERATURE") {
        cfg.collect.temperature =
            parse_bool(&v).with_context(|| "SYSREPORT_COLLECT_TEMPERATURE")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "SYSREPORT_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("SYSREPORT_UI_ECHO") {
        cfg.ui.echo = parse_bool(&v).with_context(|| "SYSREPORT_UI_ECHO")?;
    }

    Ok(())
}

fn validate(cfg: &EffectiveConfig) -> Result<()> {
    if cfg.logs.max == 0 {
        return Err(anyhow::anyhow!("logs.max must be at least 1"));
    }
    if cfg.collect.timeout_secs == 0 {
        return Err(anyhow::anyhow!("collect.timeout_secs must be at least 1"));
    }
    if cfg.collect.budget_secs == 0 {
        return Err(anyhow::anyhow!("collect.budget_secs must be at least 1"));
    }
    Ok(())
}

fn expand_home(s: &str, home_dir: &Path) -> PathBuf {
    if s == "~" {
        return home_dir.to_path_buf();
    }
    match s.strip_prefix("~/") {
        Some(rest) => home_dir.join(rest),
        None => PathBuf::from(s),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
