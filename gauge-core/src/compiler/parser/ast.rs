//! 语法树定义
//!
//! 解析器输出的 AST。名字尚未解析，运算符尚未降级为函数调用；
//! 这些工作由 `compiler::lower` 完成。

use crate::compiler::lexer::types::Span;

/// 一个源文件
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<Import>,
    pub statements: Vec<Statement>,
    /// 末尾表达式（可选）
    pub result: Option<Expr>,
    pub span: Span,
}

/// `import "path" as variable`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub variable: String,
    pub span: Span,
}

/// `[export] name = value` 或 `[export] name(params) = body`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub name_span: Span,
    pub value: Expr,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64),
    String(String),
    Boolean(bool),
    Identifier(String),
    Array(Vec<Expr>),
    Dict(Vec<DictEntry>),
    Block {
        statements: Vec<Statement>,
        result: Box<Expr>,
    },
    Lambda(LambdaExpr),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `left -> callee(args)`
    Pipe {
        left: Box<Expr>,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `target.key`
    DotLookup {
        target: Box<Expr>,
        key: String,
    },
    /// `target[index]`
    Bracket {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// `c ? a : b` 与 `if c then a else b`
    Ternary {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub name: Option<String>,
    pub parameters: Vec<Parameter>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub span: Span,
    /// 参数定义域注解，例如 `x: [0, 10]`
    pub annotation: Option<Expr>,
}

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
    Equal,
    Unequal,
    Smaller,
    SmallerEq,
    Larger,
    LargerEq,
    And,
    Or,
    To,
}

impl InfixOp {
    /// 降级后调用的标准库函数名
    pub fn function_name(&self) -> &'static str {
        match self {
            InfixOp::Add => "add",
            InfixOp::Subtract => "subtract",
            InfixOp::Multiply => "multiply",
            InfixOp::Divide => "divide",
            InfixOp::Pow => "pow",
            InfixOp::Equal => "equal",
            InfixOp::Unequal => "unequal",
            InfixOp::Smaller => "smaller",
            InfixOp::SmallerEq => "smallerEq",
            InfixOp::Larger => "larger",
            InfixOp::LargerEq => "largerEq",
            InfixOp::And => "and",
            InfixOp::Or => "or",
            InfixOp::To => "to",
        }
    }
}

/// 一元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
}

impl UnaryOp {
    pub fn function_name(&self) -> &'static str {
        match self {
            UnaryOp::Minus => "unaryMinus",
            UnaryOp::Not => "not",
        }
    }
}

/// Standard library entry used for `[]` and `.` lookups
pub const INDEX_FUNCTION: &str = "$_atIndex_$";
