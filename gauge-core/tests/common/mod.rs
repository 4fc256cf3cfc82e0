//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数：源码 -> 解析 -> 降级 -> 执行

#![allow(dead_code)]

use gauge_core::{
    compile, parse, Bindings, CompileError, Environment, Interpreter, LimitConfig, ProgramOutput,
    RuntimeError, Value,
};

/// 执行错误
#[derive(Debug)]
pub enum ExecError {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Compile(e) => write!(f, "Compile error: {e}"),
            ExecError::Runtime(e) => write!(f, "Runtime error: {}", e.to_string_with_stack_trace()),
        }
    }
}

impl std::error::Error for ExecError {}

/// 以默认环境执行代码
pub fn run_code(code: &str) -> Result<ProgramOutput, ExecError> {
    run_with(code, Environment::default(), LimitConfig::default(), &Bindings::new())
}

pub fn run_with(
    code: &str,
    environment: Environment,
    limits: LimitConfig,
    externals: &Bindings,
) -> Result<ProgramOutput, ExecError> {
    let program = parse(code).map_err(ExecError::Compile)?;
    let expression = compile(&program, externals).map_err(ExecError::Compile)?;
    Interpreter::new(environment, limits)
        .run_program(&expression)
        .map_err(ExecError::Runtime)
}

/// 执行并返回运行时错误（必须失败）
pub fn runtime_error(code: &str) -> RuntimeError {
    match run_code(code) {
        Err(ExecError::Runtime(e)) => e,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

/// 获取结果数值
pub fn get_number(output: &ProgramOutput) -> Option<f64> {
    output.result.as_number()
}

/// 获取结果字符串
pub fn get_string(output: &ProgramOutput) -> Option<String> {
    output.result.as_str().map(str::to_string)
}

/// 获取顶层绑定
pub fn binding<'a>(output: &'a ProgramOutput, name: &str) -> Option<&'a Value> {
    output.bindings.get(name)
}
