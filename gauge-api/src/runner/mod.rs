//! 运行器
//!
//! 编排与解释之间的接缝：`Runner::run` 接收已解析的 AST、环境和外部绑定，
//! 返回结果、绑定与导出。运行时错误在这里被捕获一次，转换为
//! `ModuleError`。每次调用都构造新的解释器，调用之间不共享可变状态。

mod embedded;
mod thread;

pub use embedded::EmbeddedRunner;
pub use thread::ThreadRunner;

use crate::error::{GaugeError, ModuleError};
use gauge_config::{targets, Environment, LimitConfig, RunnerConfig, RunnerKind};
use gauge_core::ast::Program;
use gauge_core::{compile, Bindings, Interpreter, ProgramOutput};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// 一次运行的输入
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub program: Arc<Program>,
    pub environment: Environment,
    pub limits: LimitConfig,
    /// 导入与 continue 进来的绑定
    pub externals: Bindings,
}

pub type RunResult = Result<ProgramOutput, ModuleError>;

pub trait Runner: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, request: RunRequest) -> RunResult;
}

/// 在当前线程上降级并解释
pub fn run_in_place(request: &RunRequest) -> RunResult {
    let expression = compile(&request.program, &request.externals).map_err(ModuleError::Compile)?;
    trace!(target: targets::RUNNER, externals = request.externals.len(), "Compiled program");
    Interpreter::new(request.environment.clone(), request.limits.clone())
        .run_program(&expression)
        .map_err(ModuleError::from_runtime)
}

/// 按配置构造运行器
pub fn runner_from_config(config: &RunnerConfig) -> Arc<dyn Runner> {
    match config.kind {
        RunnerKind::Embedded => Arc::new(EmbeddedRunner),
        RunnerKind::Thread => Arc::new(ThreadRunner::new(
            config.threads.max(1),
            config.timeout_ms.map(Duration::from_millis),
        )),
    }
}

/// 按名字构造运行器（"embedded" 或 "thread"）
pub fn runner_by_name(name: &str, config: &RunnerConfig) -> Result<Arc<dyn Runner>, GaugeError> {
    let kind = RunnerKind::parse(name)
        .ok_or_else(|| GaugeError::Config(format!("Unknown runner: {name}")))?;
    Ok(runner_from_config(&RunnerConfig {
        kind,
        ..config.clone()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::{parse, Value};

    pub(crate) fn request(code: &str) -> RunRequest {
        RunRequest {
            program: Arc::new(parse(code).unwrap()),
            environment: Environment::default(),
            limits: LimitConfig::default(),
            externals: Bindings::new(),
        }
    }

    #[test]
    fn test_run_in_place() {
        let output = run_in_place(&request("a = 2\na * 3")).unwrap();
        assert_eq!(output.result, Value::Number(6.0));
    }

    #[test]
    fn test_lowering_error_is_compile_error() {
        let err = run_in_place(&request("missing + 1")).unwrap_err();
        assert!(matches!(err, ModuleError::Compile(_)));
    }

    #[test]
    fn test_runner_by_name() {
        let config = RunnerConfig::default();
        assert_eq!(runner_by_name("embedded", &config).unwrap().name(), "embedded");
        assert_eq!(runner_by_name("thread", &config).unwrap().name(), "thread");
        assert!(matches!(
            runner_by_name("node", &config),
            Err(GaugeError::Config(_))
        ));
    }
}
