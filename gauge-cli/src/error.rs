//! CLI 错误

use gauge_api::GaugeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot read '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// 程序本身的失败；带上入口源码用于打印上下文
    #[error("{error}")]
    Program { error: GaugeError, code: String },
}

impl CliError {
    /// 进程退出码：用法错误为 2，其余为 1
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}
