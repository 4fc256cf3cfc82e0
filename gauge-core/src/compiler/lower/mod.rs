//! AST -> Expression 降级
//!
//! 解决名字：局部名字变为栈槽，外层函数的名字变为捕获索引，
//! 外部绑定与标准库名字直接内联为值。运算符、`.`/`[]` 和 `->`
//! 降级为普通调用。

mod context;

pub use context::{ScopeStack, Variable};

use crate::compiler::lexer::types::Span;
use crate::compiler::parser::ast::{self, ExprKind, INDEX_FUNCTION};
use crate::runtime::expression::{
    Expression, ExpressionKind, LambdaIR, ParameterIR, ProgramBinding, ProgramIR,
};
use crate::runtime::stdlib;
use crate::runtime::value::{Bindings, Value};
use gauge_config::targets;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoweringErrorKind {
    #[error("{0} is not defined")]
    UndefinedName(String),
    #[error("Standard library function {0} is missing")]
    MissingBuiltin(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {kind}", .span.start)]
pub struct LoweringError {
    pub kind: LoweringErrorKind,
    pub span: Span,
}

impl LoweringError {
    fn new(kind: LoweringErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

type LowerResult<T> = Result<T, LoweringError>;

/// 降级整个程序
pub fn lower_program(program: &ast::Program, externals: &Bindings) -> LowerResult<Expression> {
    let mut lowerer = Lowerer::new(externals);

    let mut statements = Vec::with_capacity(program.statements.len());
    let mut bindings: Vec<ProgramBinding> = Vec::new();
    for statement in &program.statements {
        let (expression, slot) = lowerer.lower_statement(statement)?;
        statements.push(expression);
        let binding = ProgramBinding {
            name: statement.name.clone(),
            slot,
            exported: statement.exported,
            location: statement.span,
        };
        match bindings.iter_mut().find(|b| b.name == statement.name) {
            Some(existing) => *existing = binding,
            None => bindings.push(binding),
        }
    }
    let result = match &program.result {
        Some(result) => Some(Box::new(lowerer.lower_expr(result)?)),
        None => None,
    };

    debug!(
        target: targets::COMPILER,
        statements = statements.len(),
        bindings = bindings.len(),
        externals = externals.len(),
        "Lowered program"
    );

    Ok(Expression::new(
        ExpressionKind::Program(ProgramIR {
            statements,
            result,
            bindings,
        }),
        program.span,
    ))
}

struct Lowerer<'a> {
    scopes: ScopeStack,
    externals: &'a Bindings,
}

impl<'a> Lowerer<'a> {
    fn new(externals: &'a Bindings) -> Self {
        Self {
            scopes: ScopeStack::new(),
            externals,
        }
    }

    /// 右侧先于名字本身降级，所以定义不能引用自己
    fn lower_statement(&mut self, statement: &ast::Statement) -> LowerResult<(Expression, usize)> {
        let right = self.lower_expr(&statement.value)?;
        let slot = self.scopes.add_local(&statement.name);
        let expression = Expression::new(
            ExpressionKind::Assign {
                name: statement.name.clone(),
                right: Box::new(right),
            },
            statement.span,
        );
        Ok((expression, slot))
    }

    fn lower_exprs(&mut self, exprs: &[ast::Expr]) -> LowerResult<Vec<Expression>> {
        exprs.iter().map(|e| self.lower_expr(e)).collect()
    }

    fn lower_expr(&mut self, expr: &ast::Expr) -> LowerResult<Expression> {
        let span = expr.span;
        let kind = match &expr.kind {
            ExprKind::Number(n) => ExpressionKind::Value(Value::Number(*n)),
            ExprKind::String(s) => ExpressionKind::Value(Value::string(s.as_str())),
            ExprKind::Boolean(b) => ExpressionKind::Value(Value::Bool(*b)),
            ExprKind::Identifier(name) => self.lower_identifier(name, span)?,
            ExprKind::Array(elements) => ExpressionKind::Array(self.lower_exprs(elements)?),
            ExprKind::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for entry in entries {
                    pairs.push((self.lower_expr(&entry.key)?, self.lower_expr(&entry.value)?));
                }
                ExpressionKind::Dict(pairs)
            }
            ExprKind::Block { statements, result } => {
                let saved = self.scopes.local_count();
                let lowered = self.lower_block(statements, result);
                self.scopes.truncate_locals(saved);
                lowered?
            }
            ExprKind::Lambda(lambda) => self.lower_lambda(lambda)?,
            ExprKind::Call { callee, args } => ExpressionKind::Call {
                callee: Box::new(self.lower_expr(callee)?),
                args: self.lower_exprs(args)?,
            },
            ExprKind::Infix { op, left, right } => {
                let args = vec![self.lower_expr(left)?, self.lower_expr(right)?];
                self.builtin_call(op.function_name(), args, span)?
            }
            ExprKind::Unary { op, operand } => {
                let args = vec![self.lower_expr(operand)?];
                self.builtin_call(op.function_name(), args, span)?
            }
            ExprKind::Pipe { left, callee, args } => {
                let mut lowered = vec![self.lower_expr(left)?];
                lowered.extend(self.lower_exprs(args)?);
                ExpressionKind::Call {
                    callee: Box::new(self.lower_expr(callee)?),
                    args: lowered,
                }
            }
            ExprKind::DotLookup { target, key } => {
                let args = vec![
                    self.lower_expr(target)?,
                    Expression::value(Value::string(key.as_str()), span),
                ];
                self.builtin_call(INDEX_FUNCTION, args, span)?
            }
            ExprKind::Bracket { target, index } => {
                let args = vec![self.lower_expr(target)?, self.lower_expr(index)?];
                self.builtin_call(INDEX_FUNCTION, args, span)?
            }
            ExprKind::Ternary {
                condition,
                if_true,
                if_false,
            } => ExpressionKind::Ternary {
                condition: Box::new(self.lower_expr(condition)?),
                if_true: Box::new(self.lower_expr(if_true)?),
                if_false: Box::new(self.lower_expr(if_false)?),
            },
        };
        Ok(Expression::new(kind, span))
    }

    fn lower_block(
        &mut self,
        statements: &[ast::Statement],
        result: &ast::Expr,
    ) -> LowerResult<ExpressionKind> {
        let mut lowered = Vec::with_capacity(statements.len());
        for statement in statements {
            lowered.push(self.lower_statement(statement)?.0);
        }
        Ok(ExpressionKind::Block {
            statements: lowered,
            result: Box::new(self.lower_expr(result)?),
        })
    }

    fn lower_lambda(&mut self, lambda: &ast::LambdaExpr) -> LowerResult<ExpressionKind> {
        // 定义域注解在外层作用域中求值
        let mut parameters = Vec::with_capacity(lambda.parameters.len());
        for parameter in &lambda.parameters {
            let annotation = match &parameter.annotation {
                Some(annotation) => Some(self.lower_expr(annotation)?),
                None => None,
            };
            parameters.push(ParameterIR {
                name: parameter.name.clone(),
                annotation,
            });
        }

        self.scopes
            .begin_function(lambda.parameters.iter().map(|p| p.name.as_str()));
        let body = self.lower_expr(&lambda.body);
        let captures = self.scopes.end_function();

        Ok(ExpressionKind::Lambda(Arc::new(LambdaIR {
            name: lambda.name.clone(),
            parameters,
            captures,
            body: Arc::new(body?),
        })))
    }

    fn lower_identifier(&mut self, name: &str, span: Span) -> LowerResult<ExpressionKind> {
        if let Some(variable) = self.scopes.resolve(name) {
            return Ok(match variable {
                Variable::Slot(slot) => ExpressionKind::StackRef(slot),
                Variable::Capture(index) => ExpressionKind::CaptureRef(index),
            });
        }
        if let Some(value) = self.externals.get(name) {
            return Ok(ExpressionKind::Value(value.clone()));
        }
        match stdlib::lookup(name) {
            Some(value) => Ok(ExpressionKind::Value(value)),
            None => Err(LoweringError::new(
                LoweringErrorKind::UndefinedName(name.to_string()),
                span,
            )),
        }
    }

    /// 运算符总是指向标准库，不受用户绑定遮蔽
    fn builtin_call(
        &mut self,
        name: &'static str,
        args: Vec<Expression>,
        span: Span,
    ) -> LowerResult<ExpressionKind> {
        let function = stdlib::lookup(name)
            .ok_or_else(|| LoweringError::new(LoweringErrorKind::MissingBuiltin(name), span))?;
        Ok(ExpressionKind::Call {
            callee: Box::new(Expression::value(function, span)),
            args,
        })
    }
}
