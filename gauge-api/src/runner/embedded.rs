use super::{run_in_place, RunRequest, RunResult, Runner};
use gauge_config::targets;
use tracing::debug;

/// 在调用线程上同步运行
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedRunner;

impl Runner for EmbeddedRunner {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn run(&self, request: RunRequest) -> RunResult {
        debug!(target: targets::RUNNER, runner = self.name(), "Running module");
        run_in_place(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::request;
    use super::*;
    use crate::error::ModuleError;
    use gauge_core::Value;

    #[test]
    fn test_embedded_runner() {
        let output = EmbeddedRunner.run(request("export x = 1\nx + 1")).unwrap();
        assert_eq!(output.result, Value::Number(2.0));
        assert_eq!(output.exports.get("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_runtime_error_is_caught_once() {
        let err = EmbeddedRunner.run(request("throw(\"stop\")")).unwrap_err();
        match err {
            ModuleError::Run(e) => assert_eq!(e.message.to_string(), "stop"),
            other => panic!("expected run error, got {other:?}"),
        }
    }
}
