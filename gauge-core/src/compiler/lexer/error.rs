//! Lexer 错误类型
//!
//! 提供结构化的词法错误信息，包含错误类型、位置和详细消息。

use super::types::Coordinate;
use thiserror::Error;

/// 词法错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated block comment")]
    UnterminatedComment,
    #[error("Invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("Invalid number format: '{0}'")]
    InvalidNumber(String),
}

/// 词法错误，包含结构化信息
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{position}] {kind}")]
pub struct LexerError {
    /// 错误类型
    pub kind: LexerErrorKind,
    /// 错误发生的位置
    pub position: Coordinate,
}

impl LexerError {
    /// 在指定位置创建错误
    pub fn at(kind: LexerErrorKind, position: Coordinate) -> Self {
        Self { kind, position }
    }

    /// 获取行号（1-based）
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// 获取列号（1-based）
    pub fn column(&self) -> usize {
        self.position.column
    }
}
