//! 标准库实现
//!
//! 所有原生函数都以 `NativeFn` 形式注册，作为普通 `Value::Lambda` 暴露，
//! 解释器以调用用户函数的方式调用它们。每个函数自己校验参数并给出
//! 错误消息；参数个数由注册时的 `Arity` 统一检查。
//!
//! 注册表是进程级只读单例，编译期把名字直接内联为值。

mod dict;
mod dist;
mod list;
mod math;
mod ops;

use super::error::{CallError, ErrorMessage};
use super::value::{Arity, Bindings, BuiltinLambda, Lambda, NativeFn, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// 原生函数返回类型
pub type NativeResult = Result<Value, CallError>;

#[derive(Default)]
pub struct StdLib {
    entries: HashMap<&'static str, Value>,
}

impl StdLib {
    /// 注册一个原生函数
    fn function(&mut self, name: &'static str, arity: Arity, body: NativeFn) {
        let lambda = Lambda::Builtin(BuiltinLambda { name, arity, body });
        self.entries.insert(name, Value::Lambda(Arc::new(lambda)));
    }

    /// 注册一个常量
    fn constant(&mut self, name: &'static str, value: Value) {
        self.entries.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

static STDLIB: Lazy<StdLib> = Lazy::new(|| {
    let mut lib = StdLib::default();
    ops::register(&mut lib);
    list::register(&mut lib);
    dict::register(&mut lib);
    math::register(&mut lib);
    dist::register(&mut lib);
    lib
});

/// 全局标准库
pub fn stdlib() -> &'static StdLib {
    &STDLIB
}

/// 按名字查找标准库条目
pub fn lookup(name: &str) -> Option<Value> {
    STDLIB.get(name).cloned()
}

// ===== 参数提取 =====

fn argument(args: &[Value], index: usize) -> Result<&Value, ErrorMessage> {
    args.get(index)
        .ok_or_else(|| ErrorMessage::Internal(format!("missing argument {index}")))
}

fn number(args: &[Value], index: usize) -> Result<f64, ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_number()
        .ok_or_else(|| ErrorMessage::expected_type("Number", value.type_name()))
}

/// 整数参数（不允许小数部分）
fn integer(args: &[Value], index: usize) -> Result<i64, ErrorMessage> {
    let n = number(args, index)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(ErrorMessage::Argument(format!(
            "Expected an integer but got {}",
            super::value::format_number(n)
        )));
    }
    Ok(n as i64)
}

fn string(args: &[Value], index: usize) -> Result<&str, ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_str()
        .ok_or_else(|| ErrorMessage::expected_type("String", value.type_name()))
}

fn boolean(args: &[Value], index: usize) -> Result<bool, ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_bool()
        .ok_or_else(|| ErrorMessage::expected_type("Bool", value.type_name()))
}

fn array(args: &[Value], index: usize) -> Result<&[Value], ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_array()
        .ok_or_else(|| ErrorMessage::expected_type("List", value.type_name()))
}

fn dict(args: &[Value], index: usize) -> Result<&Bindings, ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_dict()
        .ok_or_else(|| ErrorMessage::expected_type("Dict", value.type_name()))
}

fn lambda(args: &[Value], index: usize) -> Result<&Arc<Lambda>, ErrorMessage> {
    let value = argument(args, index)?;
    value
        .as_lambda()
        .ok_or_else(|| ErrorMessage::expected_type("Lambda", value.type_name()))
}
