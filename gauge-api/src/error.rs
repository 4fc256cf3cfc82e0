//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。
//!
//! - `GraphError`：模块图本身的问题（循环、未知模块）
//! - `ImportError`：某个导入的输出失败或无法加载
//! - `ModuleError`：单个模块输出的失败原因
//! - `GaugeError`：API 层错误

use crate::project::module::ImportBinding;
use gauge_core::{CompileError, RuntimeError, Span};
use serde::Serialize;
use thiserror::Error;

/// Linker 错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("Module {name} not found")]
    NotFound { name: String },

    #[error("Module {name} has hash {actual}, expected {expected}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid import path '{specifier}': {reason}")]
    InvalidPath { specifier: String, reason: String },

    #[error("Failed to read {name}: {message}")]
    Io { name: String, message: String },
}

/// 模块图错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Cyclic import: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("Unknown module {0}")]
    UnknownModule(String),

    #[error("Unknown head {0}")]
    UnknownHead(String),

    #[error("Output of {0} is pending but nothing is loading")]
    Stalled(String),
}

/// 导入失败的原因
#[derive(Debug, Clone, PartialEq)]
pub enum ImportCause {
    /// 被导入的模块无法加载
    Load(LinkError),
    /// 被导入模块的输出本身是失败的，原样保留
    Output(Box<ModuleError>),
}

impl std::fmt::Display for ImportCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportCause::Load(e) => write!(f, "{e}"),
            ImportCause::Output(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to import {binding}: {cause}")]
pub struct ImportError {
    pub binding: ImportBinding,
    pub cause: ImportCause,
}

impl ImportError {
    /// 沿导入链找到最初的失败
    pub fn root_cause(&self) -> RootCause<'_> {
        match &self.cause {
            ImportCause::Load(e) => RootCause::Load(e),
            ImportCause::Output(e) => e.root_cause(),
        }
    }
}

/// `ModuleError::root_cause` 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootCause<'a> {
    Load(&'a LinkError),
    Module(&'a ModuleError),
}

/// 单个模块输出的失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// 词法、语法或降级错误
    #[error("{0}")]
    Compile(CompileError),

    /// 用户程序的运行时错误
    #[error("{0}")]
    Run(RuntimeError),

    #[error("{0}")]
    Import(ImportError),

    #[error("{0}")]
    Graph(GraphError),

    /// 编译器或运行器自身的缺陷，不是用户程序的错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModuleError {
    /// 运行时错误在 Runner 边界处转换一次
    pub fn from_runtime(error: RuntimeError) -> Self {
        if error.is_internal() {
            ModuleError::Internal(error.to_string_with_stack_trace())
        } else {
            ModuleError::Run(error)
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ModuleError::Internal(_))
    }

    pub fn root_cause(&self) -> RootCause<'_> {
        match self {
            ModuleError::Import(e) => e.root_cause(),
            other => RootCause::Module(other),
        }
    }

    /// 错误在本模块源码中的位置
    pub fn location(&self) -> Option<Span> {
        match self {
            ModuleError::Compile(e) => e.coordinate().map(Span::at),
            ModuleError::Run(e) => e.location(),
            ModuleError::Import(e) => e.binding.location,
            ModuleError::Graph(_) | ModuleError::Internal(_) => None,
        }
    }

    pub fn phase(&self) -> &'static str {
        match self {
            ModuleError::Compile(e) => e.phase(),
            ModuleError::Run(_) => "runtime",
            ModuleError::Import(_) => "import",
            ModuleError::Graph(_) => "graph",
            ModuleError::Internal(_) => "internal",
        }
    }

    /// 带栈追踪的完整消息
    pub fn to_string_with_stack_trace(&self) -> String {
        match self {
            ModuleError::Run(e) => e.to_string_with_stack_trace(),
            ModuleError::Import(ImportError {
                binding,
                cause: ImportCause::Output(inner),
            }) => format!("Failed to import {binding}: {}", inner.to_string_with_stack_trace()),
            other => other.to_string(),
        }
    }

    fn error_kind(&self) -> String {
        match self {
            ModuleError::Compile(CompileError::Lexer(e)) => format!("{:?}", e.kind),
            ModuleError::Compile(CompileError::Parser(e)) => format!("{:?}", e.kind),
            ModuleError::Compile(CompileError::Lowering(e)) => format!("{:?}", e.kind),
            ModuleError::Run(e) => format!("{:?}", e.message),
            ModuleError::Import(_) => "ImportError".to_string(),
            ModuleError::Graph(e) => format!("{e:?}"),
            ModuleError::Internal(_) => "InternalError".to_string(),
        }
    }
}

/// Gauge 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GaugeError {
    #[error("{0}")]
    Graph(#[from] GraphError),

    #[error("{0}")]
    Module(#[from] ModuleError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl GaugeError {
    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        self.location().map(|span| span.start.line)
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        self.location().map(|span| span.start.column)
    }

    pub fn location(&self) -> Option<Span> {
        match self {
            GaugeError::Module(e) => e.location(),
            _ => None,
        }
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            GaugeError::Graph(_) => "graph",
            GaugeError::Module(e) => e.phase(),
            GaugeError::Config(_) => "config",
            GaugeError::Io(_) => "io",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let error_kind = match self {
            GaugeError::Graph(e) => format!("{e:?}"),
            GaugeError::Module(e) => e.error_kind(),
            GaugeError::Config(_) => "ConfigError".to_string(),
            GaugeError::Io(_) => "IoError".to_string(),
        };
        let message = match self {
            GaugeError::Module(e) => e.to_string_with_stack_trace(),
            other => other.to_string(),
        };
        ErrorReport {
            phase: self.phase(),
            line: self.line(),
            column: self.column(),
            error_kind,
            message,
        }
    }
}

impl From<std::io::Error> for GaugeError {
    fn from(err: std::io::Error) -> Self {
        GaugeError::Io(err.to_string())
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、编辑器插件）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// 错误阶段: lexer, parser, compiler, runtime, import, graph, internal
    pub phase: &'static str,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    pub column: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "[{}:{}] {} error: {}", line, col, self.phase, self.message)
            }
            _ => write!(f, "[{}] {} error: {}", self.phase, self.phase, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"phase":"internal","message":"{e}"}}"#))
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}
