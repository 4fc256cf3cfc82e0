//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供 CLI 使用）

use gauge_config::{Environment, LimitConfig, RunnerConfig};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Execution configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    /// 求值环境（采样数、种子、profile）
    pub environment: Environment,
    /// Execution limits
    pub limits: LimitConfig,
    /// 运行器选择
    pub runner: RunnerConfig,
    /// 是否打印项目事件（加载、输出提交）
    pub log_events: bool,
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration (must be called once before any operation)
///
/// # Panics
/// If config is already initialized
pub fn init(config: RunConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Get the global config, installing the default if nothing was set yet
pub fn get_or_init_default() -> &'static RunConfig {
    GLOBAL_CONFIG.get_or_init(RunConfig::default)
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
