//! 运行时错误
//!
//! `ErrorMessage` 描述出了什么问题；`RuntimeError` 额外携带抛出时的
//! 调用栈快照。

use crate::compiler::lexer::types::Span;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorMessage {
    #[error("{expected} arguments expected. Instead {got} argument(s) were passed.")]
    Arity { expected: String, got: usize },

    #[error("Expected type: {expected} but got: {got}")]
    ExpectedType { expected: String, got: String },

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("{0} is not defined")]
    SymbolNotFound(String),

    #[error("Domain Error: {0}")]
    Domain(String),

    #[error("Parameter {} must be in domain {message}", .index + 1)]
    ArgumentDomain { index: usize, message: String },

    #[error("Argument Error: {0}")]
    Argument(String),

    #[error("Maximum call depth of {0} exceeded")]
    CallDepth(usize),

    #[error("Stack overflow: more than {0} live values")]
    StackOverflow(usize),

    #[error("{0}")]
    Throw(String),

    #[error("Error: {0}")]
    Other(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErrorMessage {
    pub fn expected_type(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ErrorMessage::ExpectedType {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// 解释器自身的缺陷，而不是用户程序的错误
    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorMessage::Internal(_))
    }
}

/// 栈追踪中的一帧
#[derive(Debug, Clone, PartialEq)]
pub struct StackTraceFrame {
    pub name: String,
    pub location: Option<Span>,
}

/// 栈追踪，最内层的帧在前
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackTrace {
    pub frames: Vec<StackTraceFrame>,
}

impl StackTrace {
    /// 错误发生的位置
    pub fn location(&self) -> Option<Span> {
        self.frames.first().and_then(|frame| frame.location)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match frame.location {
                Some(span) => write!(f, "  at {} ({})", frame.name, span.start)?,
                None => write!(f, "  at {}", frame.name)?,
            }
        }
        Ok(())
    }
}

/// 带栈追踪的运行时错误
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: ErrorMessage,
    pub stack_trace: StackTrace,
}

impl RuntimeError {
    pub fn new(message: ErrorMessage, stack_trace: StackTrace) -> Self {
        Self {
            message,
            stack_trace,
        }
    }

    pub fn location(&self) -> Option<Span> {
        self.stack_trace.location()
    }

    pub fn is_internal(&self) -> bool {
        self.message.is_internal()
    }

    /// 消息与栈追踪
    pub fn to_string_with_stack_trace(&self) -> String {
        if self.stack_trace.is_empty() {
            self.message.to_string()
        } else {
            format!("{}\nStack trace:\n{}", self.message, self.stack_trace)
        }
    }
}

/// 原生函数的错误：普通消息由解释器补上栈追踪，
/// 已经带栈追踪的错误（回调用户函数时产生）原样传播
#[derive(Debug, Clone)]
pub enum CallError {
    Message(ErrorMessage),
    Trapped(Box<RuntimeError>),
}

impl From<ErrorMessage> for CallError {
    fn from(message: ErrorMessage) -> Self {
        CallError::Message(message)
    }
}

impl From<RuntimeError> for CallError {
    fn from(error: RuntimeError) -> Self {
        CallError::Trapped(Box::new(error))
    }
}
