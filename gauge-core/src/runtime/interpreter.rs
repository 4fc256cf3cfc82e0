//! 树遍历解释器
//!
//! 求值一棵已编译的 `Expression` 树。局部变量住在值栈上（相对于当前
//! 帧基址寻址），闭包的外层变量住在 `captures` 中，调用帧栈只用于
//! 生成栈追踪。解释器从不挂起，一次求值要么得到值，要么得到带完整
//! 栈追踪的 `RuntimeError`。

use super::domain::Domain;
use super::error::{CallError, ErrorMessage, RuntimeError};
use super::expression::{CaptureSource, Expression, ExpressionKind, LambdaIR, ProgramIR};
use super::frame_stack::FrameStack;
use super::profile::RunProfile;
use super::stack::Stack;
use super::value::{Bindings, BuiltinLambda, Lambda, LambdaParameter, UserDefinedLambda, Value};
use crate::compiler::lexer::types::Span;
use gauge_config::{targets, Environment, LimitConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// `run_program` 的结果
#[derive(Debug, Clone)]
pub struct ProgramOutput {
    /// 末尾表达式的值（没有时为 `Void`）
    pub result: Value,
    /// 所有顶层绑定
    pub bindings: Bindings,
    /// 其中带 `export` 的部分
    pub exports: Bindings,
    pub profile: Option<RunProfile>,
}

pub struct Interpreter {
    stack: Stack,
    frame_stack: FrameStack,
    /// 当前正在执行的闭包捕获的值
    captures: Arc<[Value]>,
    /// 当前帧的第一个栈槽
    frame_base: usize,
    /// 当前原生函数的调用位置，用于它回调用户函数
    call_site: Span,
    environment: Environment,
    limits: LimitConfig,
    rng: StdRng,
    profile: Option<RunProfile>,
}

/// 用种子字符串的 SHA-256 摘要初始化随机数生成器
fn seeded_rng(seed: &str) -> StdRng {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    StdRng::from_seed(bytes)
}

impl Interpreter {
    pub fn new(environment: Environment, limits: LimitConfig) -> Self {
        let rng = seeded_rng(environment.seed_or_default());
        let profile = environment.profile.then(RunProfile::default);
        Self {
            stack: Stack::new(limits.max_stack_size),
            frame_stack: FrameStack::new(),
            captures: Arc::from(Vec::new()),
            frame_base: 0,
            call_site: Span::default(),
            environment,
            limits,
            rng,
            profile,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// 构造带当前栈追踪的错误
    fn error(&self, message: ErrorMessage, location: Span) -> RuntimeError {
        RuntimeError::new(message, self.frame_stack.make_stack_trace(Some(location)))
    }

    fn internal(&self, message: String, location: Span) -> RuntimeError {
        self.error(ErrorMessage::Internal(message), location)
    }

    // ===== 程序 =====

    /// 执行一个模块。`Program` 节点的顶层绑定留在栈上，作为 `bindings` 返回。
    pub fn run_program(&mut self, expression: &Expression) -> Result<ProgramOutput, RuntimeError> {
        let ExpressionKind::Program(program) = &expression.kind else {
            let result = self.evaluate(expression)?;
            return Ok(ProgramOutput {
                result,
                bindings: Bindings::new(),
                exports: Bindings::new(),
                profile: self.profile.take(),
            });
        };

        debug!(
            target: targets::INTERPRETER,
            statements = program.statements.len(),
            "Running program"
        );

        let base = self.frame_base;
        let result = self.evaluate_program(program)?;

        let mut bindings = Bindings::new();
        let mut exports = Bindings::new();
        for binding in &program.bindings {
            let value = self
                .stack
                .get(base + binding.slot)
                .cloned()
                .ok_or_else(|| {
                    self.internal(
                        format!("binding {} has no stack slot {}", binding.name, binding.slot),
                        binding.location,
                    )
                })?;
            if binding.exported {
                exports.insert(binding.name.clone(), value.clone());
            }
            bindings.insert(binding.name.clone(), value);
        }

        Ok(ProgramOutput {
            result,
            bindings,
            exports,
            profile: self.profile.take(),
        })
    }

    fn evaluate_program(&mut self, program: &ProgramIR) -> Result<Value, RuntimeError> {
        for statement in &program.statements {
            let label = match &statement.kind {
                ExpressionKind::Assign { name, .. } => name.as_str(),
                _ => "<statement>",
            };
            self.evaluate_timed(statement, label)?;
        }
        match &program.result {
            Some(result) => self.evaluate_timed(result, "<result>"),
            None => Ok(Value::Void),
        }
    }

    fn evaluate_timed(&mut self, expression: &Expression, label: &str) -> Result<Value, RuntimeError> {
        if self.profile.is_none() {
            return self.evaluate(expression);
        }
        let start = Instant::now();
        let value = self.evaluate(expression)?;
        if let Some(profile) = self.profile.as_mut() {
            profile.record(label, expression.location, start.elapsed());
        }
        Ok(value)
    }

    // ===== 表达式 =====

    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        let location = expression.location;
        match &expression.kind {
            ExpressionKind::Value(value) => Ok(value.clone()),

            ExpressionKind::StackRef(slot) => {
                self.stack.get(self.frame_base + slot).cloned().ok_or_else(|| {
                    self.internal(format!("stack slot {slot} is out of range"), location)
                })
            }

            ExpressionKind::CaptureRef(index) => {
                self.captures.get(*index).cloned().ok_or_else(|| {
                    self.internal(format!("capture index {index} is out of range"), location)
                })
            }

            ExpressionKind::Block { statements, result } => {
                let size = self.stack.len();
                let value = self.evaluate_block(statements, result);
                self.stack.shrink_to(size);
                value
            }

            ExpressionKind::Program(program) => self.evaluate_program(program),

            ExpressionKind::Assign { name, right } => {
                let value = self.evaluate(right)?;
                trace!(target: targets::INTERPRETER, name = %name, "Assign");
                self.stack
                    .push(value)
                    .map_err(|message| self.error(message, location))?;
                Ok(Value::Void)
            }

            ExpressionKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }

            ExpressionKind::Dict(entries) => {
                let mut dict = Bindings::new();
                for (key, value) in entries {
                    let key_str = match self.evaluate(key)? {
                        Value::String(key_str) => key_str,
                        other => {
                            return Err(self.error(
                                ErrorMessage::expected_type("String", other.type_name()),
                                key.location,
                            ))
                        }
                    };
                    let value = self.evaluate(value)?;
                    dict.insert(key_str.to_string(), value);
                }
                Ok(Value::dict(dict))
            }

            ExpressionKind::Ternary {
                condition,
                if_true,
                if_false,
            } => match self.evaluate(condition)? {
                Value::Bool(true) => self.evaluate(if_true),
                Value::Bool(false) => self.evaluate(if_false),
                other => Err(self.error(
                    ErrorMessage::expected_type("Bool", other.type_name()),
                    condition.location,
                )),
            },

            ExpressionKind::Lambda(lambda) => self.create_lambda(lambda, location),

            ExpressionKind::Call { callee, args } => {
                // 先确认可调用，再求值参数
                let lambda = match self.evaluate(callee)? {
                    Value::Lambda(lambda) => lambda,
                    other => {
                        return Err(self.error(ErrorMessage::NotAFunction(other.to_string()), callee.location))
                    }
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                let arg_locations: Vec<Span> = args.iter().map(|a| a.location).collect();
                self.call_at(&lambda, values, location, &arg_locations)
            }
        }
    }

    fn evaluate_block(
        &mut self,
        statements: &[Expression],
        result: &Expression,
    ) -> Result<Value, RuntimeError> {
        for statement in statements {
            self.evaluate(statement)?;
        }
        self.evaluate(result)
    }

    /// 在创建时收集捕获值并求值参数定义域
    fn create_lambda(&mut self, lambda: &LambdaIR, location: Span) -> Result<Value, RuntimeError> {
        let mut captures = Vec::with_capacity(lambda.captures.len());
        for source in &lambda.captures {
            let value = match *source {
                CaptureSource::Slot(slot) => self.stack.get(self.frame_base + slot),
                CaptureSource::Capture(index) => self.captures.get(index),
            };
            match value {
                Some(value) => captures.push(value.clone()),
                None => {
                    return Err(self.internal(format!("invalid capture source {source:?}"), location))
                }
            }
        }

        let mut parameters = Vec::with_capacity(lambda.parameters.len());
        for parameter in &lambda.parameters {
            let domain = match &parameter.annotation {
                Some(annotation) => {
                    let value = self.evaluate(annotation)?;
                    let domain = Domain::from_annotation(&value)
                        .map_err(|message| self.error(message, annotation.location))?;
                    Some(domain)
                }
                None => None,
            };
            parameters.push(LambdaParameter {
                name: parameter.name.clone(),
                domain,
            });
        }

        Ok(Value::Lambda(Arc::new(Lambda::UserDefined(UserDefinedLambda {
            name: lambda.name.clone(),
            parameters,
            captures: Arc::from(captures),
            body: lambda.body.clone(),
            location,
        }))))
    }

    // ===== 调用 =====

    /// 供原生函数回调 lambda（例如 `List.map`），位置取当前原生调用的位置
    pub fn call(&mut self, lambda: &Arc<Lambda>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let location = self.call_site;
        self.call_at(lambda, args, location, &[])
    }

    fn call_at(
        &mut self,
        lambda: &Arc<Lambda>,
        args: Vec<Value>,
        location: Span,
        arg_locations: &[Span],
    ) -> Result<Value, RuntimeError> {
        if self.frame_stack.len() >= self.limits.max_call_depth {
            return Err(self.error(ErrorMessage::CallDepth(self.limits.max_call_depth), location));
        }

        match lambda.as_ref() {
            Lambda::UserDefined(user) => {
                if args.len() != user.parameters.len() {
                    return Err(self.error(
                        ErrorMessage::Arity {
                            expected: user.parameters.len().to_string(),
                            got: args.len(),
                        },
                        location,
                    ));
                }
                for (index, (parameter, arg)) in user.parameters.iter().zip(&args).enumerate() {
                    if let Some(domain) = &parameter.domain {
                        if !domain.includes(arg) {
                            let arg_location = arg_locations.get(index).copied().unwrap_or(location);
                            return Err(self.error(
                                ErrorMessage::ArgumentDomain {
                                    index,
                                    message: domain.to_string(),
                                },
                                arg_location,
                            ));
                        }
                    }
                }
                self.frame_stack.push(lambda.name(), Some(location));
                let result = self.call_user_defined(user, args);
                self.frame_stack.pop();
                result
            }
            Lambda::Builtin(builtin) => {
                if !builtin.arity.accepts(args.len()) {
                    return Err(self.error(
                        ErrorMessage::Arity {
                            expected: builtin.arity.to_string(),
                            got: args.len(),
                        },
                        location,
                    ));
                }
                self.frame_stack.push(builtin.name.to_string(), Some(location));
                let result = self.call_builtin(builtin, &args, location);
                self.frame_stack.pop();
                result
            }
        }
    }

    fn call_user_defined(
        &mut self,
        lambda: &UserDefinedLambda,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let saved_base = self.frame_base;
        let saved_size = self.stack.len();
        let saved_captures = std::mem::replace(&mut self.captures, lambda.captures.clone());
        self.frame_base = saved_size;

        let result = self.push_arguments(args, lambda.body.location).and_then(|()| self.evaluate(&lambda.body));

        self.stack.shrink_to(saved_size);
        self.frame_base = saved_base;
        self.captures = saved_captures;
        result
    }

    fn push_arguments(&mut self, args: Vec<Value>, location: Span) -> Result<(), RuntimeError> {
        for arg in args {
            self.stack
                .push(arg)
                .map_err(|message| self.error(message, location))?;
        }
        Ok(())
    }

    fn call_builtin(
        &mut self,
        builtin: &BuiltinLambda,
        args: &[Value],
        location: Span,
    ) -> Result<Value, RuntimeError> {
        let saved_site = std::mem::replace(&mut self.call_site, location);
        let result = (builtin.body)(self, args);
        self.call_site = saved_site;
        match result {
            Ok(value) => Ok(value),
            Err(CallError::Message(message)) => Err(self.error(message, location)),
            Err(CallError::Trapped(error)) => Err(*error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, parse};

    fn run(source: &str) -> Result<ProgramOutput, RuntimeError> {
        let program = parse(source).unwrap();
        let expression = compile(&program, &Bindings::new()).unwrap();
        Interpreter::new(Environment::default(), LimitConfig::default()).run_program(&expression)
    }

    #[test]
    fn test_program_bindings_survive() {
        let output = run("x = 1\ny = x + 1\nexport z = y * 2").unwrap();
        assert_eq!(output.bindings.get("y"), Some(&Value::Number(2.0)));
        assert_eq!(output.exports.len(), 1);
        assert_eq!(output.exports.get("z"), Some(&Value::Number(4.0)));
        assert_eq!(output.result, Value::Void);
    }

    #[test]
    fn test_block_bindings_are_scoped() {
        let output = run("x = { a = 5; a * 2 }\nx").unwrap();
        assert_eq!(output.result, Value::Number(10.0));
        assert!(!output.bindings.contains_key("a"));
    }

    #[test]
    fn test_ternary_requires_bool() {
        let err = run("1 ? 2 : 3").unwrap_err();
        assert_eq!(err.message, ErrorMessage::expected_type("Bool", "Number"));
    }

    #[test]
    fn test_not_a_function() {
        let err = run("x = 3\nx(1)").unwrap_err();
        assert_eq!(err.message, ErrorMessage::NotAFunction("3".into()));
        assert_eq!(err.location().map(|s| s.start.line), Some(2));
    }

    #[test]
    fn test_call_depth_limit() {
        let source = "loop(f, n) = f(f, n + 1)\nloop(loop, 0)";
        let program = parse(source).unwrap();
        let expression = compile(&program, &Bindings::new()).unwrap();
        let limits = LimitConfig {
            max_call_depth: 16,
            ..LimitConfig::default()
        };
        let err = Interpreter::new(Environment::default(), limits)
            .run_program(&expression)
            .unwrap_err();
        assert_eq!(err.message, ErrorMessage::CallDepth(16));
        assert_eq!(err.stack_trace.frames.len(), 17);
    }

    #[test]
    fn test_profile_records_statements() {
        let program = parse("a = 1\nb = 2\na + b").unwrap();
        let expression = compile(&program, &Bindings::new()).unwrap();
        let environment = Environment {
            profile: true,
            ..Environment::default()
        };
        let output = Interpreter::new(environment, LimitConfig::default())
            .run_program(&expression)
            .unwrap();
        let labels: Vec<_> = output
            .profile
            .unwrap()
            .entries
            .iter()
            .map(|e| e.label.clone())
            .collect();
        assert_eq!(labels, vec!["a", "b", "<result>"]);
    }

    #[test]
    fn test_invalid_capture_is_internal() {
        let expression = Expression::value(Value::Void, Span::default());
        let bad = Expression::new(ExpressionKind::CaptureRef(3), Span::default());
        let mut interpreter = Interpreter::new(Environment::default(), LimitConfig::default());
        assert!(interpreter.evaluate(&expression).is_ok());
        assert!(interpreter.evaluate(&bad).unwrap_err().is_internal());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let a = run("mean(normal(0, 1))").unwrap().result;
        let b = run("mean(normal(0, 1))").unwrap().result;
        assert_eq!(a, b);
    }
}
