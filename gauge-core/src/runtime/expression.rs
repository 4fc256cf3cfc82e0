//! 编译后的表达式树
//!
//! 名字已经全部解析：局部变量是相对于当前帧基址的栈槽，外层变量是
//! 捕获索引，全局名字（导入、标准库）直接内联为值。

use super::value::Value;
use crate::compiler::lexer::types::Span;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: Span) -> Self {
        Self { kind, location }
    }

    pub fn value(value: Value, location: Span) -> Self {
        Self::new(ExpressionKind::Value(value), location)
    }
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Value(Value),
    /// 当前帧内的栈槽
    StackRef(usize),
    /// 当前闭包的捕获值
    CaptureRef(usize),
    Block {
        statements: Vec<Expression>,
        result: Box<Expression>,
    },
    Program(ProgramIR),
    /// 求值右侧并压栈；名字只用于诊断
    Assign {
        name: String,
        right: Box<Expression>,
    },
    Array(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    Ternary {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    Lambda(Arc<LambdaIR>),
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
}

#[derive(Debug, Clone)]
pub struct ProgramIR {
    pub statements: Vec<Expression>,
    pub result: Option<Box<Expression>>,
    /// 顶层名字最终指向的栈槽（同名重复定义时取最后一次）
    pub bindings: Vec<ProgramBinding>,
}

#[derive(Debug, Clone)]
pub struct ProgramBinding {
    pub name: String,
    pub slot: usize,
    pub exported: bool,
    pub location: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaIR {
    pub name: Option<String>,
    pub parameters: Vec<ParameterIR>,
    /// 创建闭包时按此顺序收集捕获值
    pub captures: Vec<CaptureSource>,
    pub body: Arc<Expression>,
}

#[derive(Debug, Clone)]
pub struct ParameterIR {
    pub name: String,
    /// 在外层作用域中求值的定义域注解
    pub annotation: Option<Expression>,
}

/// 捕获值的来源（相对于创建闭包的那一帧）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Slot(usize),
    Capture(usize),
}
