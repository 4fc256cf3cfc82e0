//! Gauge API - Execution orchestration layer
//!
//! Provides the project model on top of `gauge-core`:
//! - Module graph with content-hashed modules, heads, continues and pins
//! - Output orchestration with a content-addressed cache (`Project`)
//! - Pluggable runners (`EmbeddedRunner`, `ThreadRunner`)
//! - Module loading through a `Linker`
//! - Unified error handling (`GaugeError`, `ErrorReport`)
//!
//! For CLI convenience, this crate provides a global singleton config.
//! For library use, prefer the explicit `run(source, &config)` API.

pub mod config;
pub mod error;
pub mod linker;
pub mod project;
pub mod runner;

pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};
pub use error::{
    ErrorReport, GaugeError, GraphError, ImportCause, ImportError, LinkError, ModuleError, RootCause,
};
pub use linker::{FileLinker, Linker, MemoryLinker};
pub use project::hash::{ModuleHash, OutputId};
pub use project::module::{ImportBinding, ImportKind, Module, ModuleSource};
pub use project::output::{Exports, ModuleOutput, RunSuccess};
pub use project::value_path::{PathEdge, PathRoot, ValuePath};
pub use project::{OutputPoll, Project, ProjectNotice};
pub use runner::{runner_by_name, runner_from_config, EmbeddedRunner, RunRequest, RunResult, Runner, ThreadRunner};

// Re-export config and core types
pub use gauge_config;
pub use gauge_config::{Environment, LimitConfig, Phase, RunnerConfig, RunnerKind};
pub use gauge_core::{Bindings, RunProfile, Span, Value};

use gauge_config::targets;
use tracing::info;

/// 单模块运行时使用的模块名
pub const MAIN_MODULE: &str = "main";

/// Execute a single module with explicit configuration
///
/// This is the recommended API for library users.
pub fn run(source: &str, config: &RunConfig) -> Result<RunSuccess, GaugeError> {
    info!(target: targets::PROJECT, runner = ?config.runner.kind, "Starting execution");
    let project = Project::from_config(config);
    project.set_source(MAIN_MODULE, source);
    let output = project.run(MAIN_MODULE)?;
    let success = output.result.clone().map_err(GaugeError::Module)?;
    info!(
        target: targets::PROJECT,
        elapsed_us = output.execution_time.as_micros() as u64,
        "Execution completed"
    );
    Ok(success)
}

/// Quick run with the global config (auto-initializes if needed)
pub fn quick_run(source: &str) -> Result<RunSuccess, GaugeError> {
    run(source, config::get_or_init_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_explicit_config() {
        let config = RunConfig::default();
        let success = run("a = 2\nexport b = a * 21\nb", &config).unwrap();
        assert_eq!(success.result, Value::Number(42.0));
        assert_eq!(success.exports.module, MAIN_MODULE);
        assert_eq!(success.exports.get("b"), Some(&Value::Number(42.0)));
    }

    #[test]
    fn test_run_reports_errors() {
        let err = run("throw(\"bad\")", &RunConfig::default()).unwrap_err();
        assert_eq!(err.phase(), "runtime");
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_quick_run() {
        let success = quick_run("1 + 1").unwrap();
        assert_eq!(success.result, Value::Number(2.0));
    }

    #[test]
    fn test_quick_run_from_many_threads() {
        let handles: Vec<_> = (0..8)
            .map(|i| std::thread::spawn(move || quick_run(&format!("{i} * 2"))))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let success = handle.join().unwrap().unwrap();
            assert_eq!(success.result, Value::Number(i as f64 * 2.0));
        }
    }
}
