//! 运行时值
//!
//! 所有值都是不可变的，复合值通过 `Arc` 共享，因此 `Value` 可以
//! 跨线程发送（线程 runner 依赖这一点）。

use super::dist::SampleSet;
use super::domain::Domain;
use super::error::CallError;
use super::expression::Expression;
use super::interpreter::Interpreter;
use crate::compiler::lexer::types::Span;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 名字到值的有序映射（模块绑定、导出、字典）
pub type Bindings = BTreeMap<String, Value>;

/// 原生函数指针类型
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Result<Value, CallError>;

#[derive(Clone, Debug)]
pub enum Value {
    Void,
    Number(f64),
    String(Arc<str>),
    Bool(bool),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Bindings>),
    Lambda(Arc<Lambda>),
    Dist(Arc<SampleSet>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Arc::new(values))
    }

    pub fn dict(entries: Bindings) -> Self {
        Value::Dict(Arc::new(entries))
    }

    pub fn dist(samples: SampleSet) -> Self {
        Value::Dist(Arc::new(samples))
    }

    /// 类型名（用于错误消息与 `typeOf`）
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "Void",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Array(_) => "List",
            Value::Dict(_) => "Dict",
            Value::Lambda(_) => "Lambda",
            Value::Dist(_) => "Distribution",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Bindings> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Arc<Lambda>> {
        match self {
            Value::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// 字符串的裸文本；其他值使用 `Display`
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            (Value::Dist(a), Value::Dist(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

/// 数字格式化：整数不带小数点
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "()"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Lambda(lambda) => write!(f, "{lambda}"),
            Value::Dist(dist) => write!(f, "{dist}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Void => serializer.serialize_unit(),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Lambda(lambda) => serializer.serialize_str(&lambda.to_string()),
            Value::Dist(dist) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "SampleSet")?;
                map.serialize_entry("mean", &dist.mean())?;
                map.serialize_entry("stdev", &dist.stdev())?;
                map.serialize_entry("sampleCount", &dist.len())?;
                map.end()
            }
        }
    }
}

// ===== Lambda =====

/// 可调用值：用户定义的闭包或原生函数
#[derive(Debug)]
pub enum Lambda {
    UserDefined(UserDefinedLambda),
    Builtin(BuiltinLambda),
}

#[derive(Debug)]
pub struct UserDefinedLambda {
    pub name: Option<String>,
    pub parameters: Vec<LambdaParameter>,
    /// 创建时捕获的值，按捕获索引排列
    pub captures: Arc<[Value]>,
    pub body: Arc<Expression>,
    pub location: Span,
}

#[derive(Debug, Clone)]
pub struct LambdaParameter {
    pub name: String,
    pub domain: Option<Domain>,
}

/// 原生函数的参数个数约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Between(min, max) => write!(f, "{min}-{max}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

pub struct BuiltinLambda {
    pub name: &'static str,
    pub arity: Arity,
    pub body: NativeFn,
}

impl fmt::Debug for BuiltinLambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinLambda")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Lambda {
    /// 用于调用帧与栈追踪的名字
    pub fn name(&self) -> String {
        match self {
            Lambda::UserDefined(lambda) => lambda
                .name
                .clone()
                .unwrap_or_else(|| "<anonymous>".to_string()),
            Lambda::Builtin(builtin) => builtin.name.to_string(),
        }
    }

    /// 用户定义函数的参数个数
    pub fn parameter_count(&self) -> Option<usize> {
        match self {
            Lambda::UserDefined(lambda) => Some(lambda.parameters.len()),
            Lambda::Builtin(builtin) => match builtin.arity {
                Arity::Exact(n) => Some(n),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lambda::UserDefined(lambda) => {
                let parameters: Vec<String> = lambda
                    .parameters
                    .iter()
                    .map(|p| match &p.domain {
                        Some(domain) => format!("{}: {}", p.name, domain),
                        None => p.name.clone(),
                    })
                    .collect();
                write!(f, "({}) => internal code", parameters.join(", "))
            }
            Lambda::Builtin(builtin) => write!(f, "Builtin({})", builtin.name),
        }
    }
}
