//! 编译前端：词法分析、语法分析与降级

pub mod lexer;
pub mod lower;
pub mod parser;

use crate::runtime::expression::Expression;
use crate::runtime::value::Bindings;
use lexer::types::Coordinate;
use lexer::LexerError;
use lower::LoweringError;
use parser::ast::Program;
use parser::ParserError;
use thiserror::Error;

/// 编译阶段错误（词法、语法、降级）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{0}")]
    Lexer(#[from] LexerError),
    #[error("{0}")]
    Parser(#[from] ParserError),
    #[error("{0}")]
    Lowering(#[from] LoweringError),
}

impl CompileError {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            CompileError::Lexer(e) => Some(e.position),
            CompileError::Parser(e) => e.coordinate(),
            CompileError::Lowering(e) => Some(e.span.start),
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.coordinate().map(|c| c.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.coordinate().map(|c| c.column)
    }

    /// 错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            CompileError::Lexer(_) => "lexer",
            CompileError::Parser(_) => "parser",
            CompileError::Lowering(_) => "compiler",
        }
    }
}

/// 源码 -> AST
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = lexer::tokenize(source)?;
    Ok(parser::parse_tokens(tokens)?)
}

/// AST -> Expression；`externals` 中的名字（导入、continue 的绑定）以值的形式内联
pub fn compile(program: &Program, externals: &Bindings) -> Result<Expression, CompileError> {
    Ok(lower::lower_program(program, externals)?)
}
