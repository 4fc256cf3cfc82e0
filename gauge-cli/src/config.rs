//! CLI 配置
//!
//! 包含 CLI 特有的配置：可选的 JSON 配置文件、日志配置，以及二者与命令行
//! 参数合并后得到的 `RunConfig`。命令行参数优先。

use crate::error::CliError;
use gauge_api::{Environment, LimitConfig, RunConfig, RunnerConfig, RunnerKind};
use gauge_config::targets;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// 配置文件（`--config gauge.json`）
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFile {
    /// 入口文件，相对于配置文件所在目录
    pub entry: Option<String>,
    pub environment: Option<Environment>,
    pub limits: Option<LimitConfig>,
    pub runner: Option<RunnerConfig>,
    pub log_events: Option<bool>,
    pub log: Option<LogSection>,
}

/// 配置文件中的日志部分
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogSection {
    /// "silent", "error", "warn", "info", "debug", "trace"
    pub level: Option<String>,
    pub format: Option<String>,
    pub lexer: Option<String>,
    pub parser: Option<String>,
    pub compiler: Option<String>,
    pub interpreter: Option<String>,
    pub project: Option<String>,
    pub runner: Option<String>,
}

/// Read and parse the config file
pub fn read_config_file(path: &Path) -> Result<ConfigFile, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::Config(format!("Failed to parse '{}': {}", path.display(), e)))
}

/// Resolve entry file path relative to the config file directory
pub fn resolve_entry_path(config_path: &Path, entry: &str) -> PathBuf {
    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    base_dir.join(entry)
}

/// 命令行上给出的运行参数（都是可选的覆盖项）
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub sample_count: Option<usize>,
    pub seed: Option<String>,
    pub profile: bool,
    pub runner: Option<String>,
    pub runner_threads: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub log_events: bool,
}

/// 合并配置文件与命令行参数
pub fn build_run_config(file: Option<&ConfigFile>, overrides: &RunOverrides) -> Result<RunConfig, CliError> {
    let mut config = RunConfig::default();
    if let Some(file) = file {
        if let Some(environment) = &file.environment {
            config.environment = environment.clone();
        }
        if let Some(limits) = &file.limits {
            config.limits = limits.clone();
        }
        if let Some(runner) = &file.runner {
            config.runner = runner.clone();
        }
        config.log_events = file.log_events.unwrap_or(false);
    }

    if let Some(sample_count) = overrides.sample_count {
        if sample_count == 0 {
            return Err(CliError::Usage("--sample-count must be at least 1".to_string()));
        }
        config.environment.sample_count = sample_count;
    }
    if let Some(seed) = &overrides.seed {
        config.environment.seed = Some(seed.clone());
    }
    config.environment.profile |= overrides.profile;
    if let Some(name) = &overrides.runner {
        config.runner.kind =
            RunnerKind::parse(name).ok_or_else(|| CliError::Usage(format!("Unknown runner: {name}")))?;
    }
    if let Some(threads) = overrides.runner_threads {
        config.runner.threads = threads;
    }
    if overrides.timeout_ms.is_some() {
        config.runner.timeout_ms = overrides.timeout_ms;
    }
    config.log_events |= overrides.log_events;
    Ok(config)
}

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: LevelFilter,
    pub lexer: Option<LevelFilter>,
    pub parser: Option<LevelFilter>,
    pub compiler: Option<LevelFilter>,
    pub interpreter: Option<LevelFilter>,
    pub project: Option<LevelFilter>,
    pub runner: Option<LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            lexer: None,
            parser: None,
            compiler: None,
            interpreter: None,
            project: None,
            runner: None,
        }
    }
}

impl LogConfig {
    /// 从配置文件的日志部分构造；`cli_level` 覆盖全局级别
    pub fn from_section(section: Option<&LogSection>, cli_level: Option<&str>) -> Result<Self, CliError> {
        let mut config = LogConfig::default();
        let phase = |value: &Option<String>| value.as_deref().map(parse_log_level).transpose();
        if let Some(section) = section {
            if let Some(level) = &section.level {
                config.global = parse_log_level(level)?;
            }
            config.lexer = phase(&section.lexer)?;
            config.parser = phase(&section.parser)?;
            config.compiler = phase(&section.compiler)?;
            config.interpreter = phase(&section.interpreter)?;
            config.project = phase(&section.project)?;
            config.runner = phase(&section.runner)?;
        }
        if let Some(level) = cli_level {
            config.global = parse_log_level(level)?;
        }
        Ok(config)
    }

    /// Get log level for a specific target
    pub fn level_for(&self, target: &str) -> LevelFilter {
        let specific = match target {
            targets::LEXER => self.lexer,
            targets::PARSER => self.parser,
            targets::COMPILER => self.compiler,
            targets::INTERPRETER => self.interpreter,
            targets::PROJECT => self.project,
            targets::RUNNER => self.runner,
            _ => None,
        };
        specific.unwrap_or(self.global)
    }
}

/// Parse log level string
pub fn parse_log_level(s: &str) -> Result<LevelFilter, CliError> {
    match s.to_lowercase().as_str() {
        "silent" | "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        _ => Err(CliError::Usage(format!("Unknown log level: {s}"))),
    }
}
