//! 测试辅助工具
//!
//! 提供项目测试用的计数运行器与常用断言

#![allow(dead_code)]

use gauge_api::{EmbeddedRunner, ModuleError, ModuleOutput, Project, RunRequest, RunResult, Runner, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// 记录调用次数的运行器，可选地在每次运行前睡眠
#[derive(Default)]
pub struct CountingRunner {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Runner for CountingRunner {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn run(&self, request: RunRequest) -> RunResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        EmbeddedRunner.run(request)
    }
}

/// 使用计数运行器的项目
pub fn counting_project() -> (Project, Arc<CountingRunner>) {
    let runner = CountingRunner::new();
    let project = Project::default().with_runner(runner.clone());
    (project, runner)
}

/// 成功输出的末尾值
pub fn result_of(output: &ModuleOutput) -> Value {
    match output.end_result() {
        Ok(value) => value.clone(),
        Err(e) => panic!("expected success for {}, got {e}", output.module_name),
    }
}

/// 绑定的名字，按字母序
pub fn binding_names(output: &ModuleOutput) -> Vec<String> {
    match output.bindings() {
        Ok(bindings) => bindings.keys().cloned().collect(),
        Err(e) => panic!("expected success for {}, got {e}", output.module_name),
    }
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

/// 断言输出是导入错误并返回它引用的说明符
pub fn import_error_specifier(output: &ModuleOutput) -> String {
    match output.error() {
        Some(ModuleError::Import(e)) => e.binding.specifier.clone(),
        other => panic!("expected import error for {}, got {other:?}", output.module_name),
    }
}
