//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。日志写到 stderr，
//! stdout 只留给程序结果。

use crate::config::LogConfig;
use crate::error::CliError;
use gauge_config::targets;
use std::io;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    #[default]
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Result<Self, CliError> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(CliError::Usage(format!("Unknown log format: {s}"))),
        }
    }
}

/// 按阶段构建过滤器
pub fn build_targets(log_config: &LogConfig) -> Targets {
    [
        targets::LEXER,
        targets::PARSER,
        targets::COMPILER,
        targets::INTERPRETER,
        targets::PROJECT,
        targets::RUNNER,
    ]
    .into_iter()
    .fold(Targets::new().with_default(log_config.global), |filter, target| {
        filter.with_target(target, log_config.level_for(target))
    })
    .with_target(targets::CLI, log_config.global)
}

/// 使用指定格式和日志配置初始化日志系统
pub fn init(log_config: &LogConfig, format: LogFormat) {
    let layer = create_format_layer(format, io::stderr).with_filter(build_targets(log_config));
    // 已经装过订阅者时（例如测试中）保持原样
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
