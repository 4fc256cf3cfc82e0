//! 运算符与核心函数
//!
//! 中缀/一元运算符在降级时变成对这里函数的调用。

use super::{argument, boolean, NativeResult, StdLib};
use crate::compiler::parser::ast::INDEX_FUNCTION;
use crate::runtime::error::ErrorMessage;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::{Arity, Value};
use std::cmp::Ordering;

pub(super) fn register(lib: &mut StdLib) {
    // ===== 算术 =====
    lib.function("add", Arity::Exact(2), add);
    lib.function("subtract", Arity::Exact(2), subtract);
    lib.function("multiply", Arity::Exact(2), multiply);
    lib.function("divide", Arity::Exact(2), divide);
    lib.function("pow", Arity::Exact(2), pow);
    lib.function("unaryMinus", Arity::Exact(1), unary_minus);

    // ===== 比较 =====
    lib.function("equal", Arity::Exact(2), equal);
    lib.function("unequal", Arity::Exact(2), unequal);
    lib.function("smaller", Arity::Exact(2), smaller);
    lib.function("smallerEq", Arity::Exact(2), smaller_eq);
    lib.function("larger", Arity::Exact(2), larger);
    lib.function("largerEq", Arity::Exact(2), larger_eq);

    // ===== 逻辑 =====
    lib.function("and", Arity::Exact(2), and);
    lib.function("or", Arity::Exact(2), or);
    lib.function("not", Arity::Exact(1), not);

    // ===== 核心 =====
    lib.function(INDEX_FUNCTION, Arity::Exact(2), at_index);
    lib.function("typeOf", Arity::Exact(1), type_of);
    lib.function("toString", Arity::Exact(1), to_string);
    lib.function("throw", Arity::Between(0, 1), throw);
}

fn operands(args: &[Value]) -> Result<(&Value, &Value), ErrorMessage> {
    Ok((argument(args, 0)?, argument(args, 1)?))
}

/// 数字与样本集的逐元素运算
fn arithmetic(args: &[Value], op: fn(f64, f64) -> f64) -> Result<Value, ErrorMessage> {
    match operands(args)? {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
        (Value::Dist(a), Value::Dist(b)) => Ok(Value::dist(a.zip_with(b, op)?)),
        (Value::Dist(a), Value::Number(b)) => Ok(Value::dist(a.map(|x| op(x, *b))?)),
        (Value::Number(a), Value::Dist(b)) => Ok(Value::dist(b.map(|y| op(*a, y))?)),
        (a, b) => Err(ErrorMessage::expected_type(
            "Number or Distribution",
            format!("({}, {})", a.type_name(), b.type_name()),
        )),
    }
}

fn add(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    match operands(args)? {
        (Value::String(a), b) => Ok(Value::string(format!("{a}{}", b.to_plain_string()))),
        (a, Value::String(b)) => Ok(Value::string(format!("{}{b}", a.to_plain_string()))),
        _ => Ok(arithmetic(args, |a, b| a + b)?),
    }
}

fn subtract(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(arithmetic(args, |a, b| a - b)?)
}

fn multiply(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(arithmetic(args, |a, b| a * b)?)
}

fn divide(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(arithmetic(args, |a, b| a / b)?)
}

fn pow(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(arithmetic(args, f64::powf)?)
}

fn unary_minus(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    match argument(args, 0)? {
        Value::Number(n) => Ok(Value::Number(-n)),
        Value::Dist(d) => Ok(Value::dist(d.map(|x| -x)?)),
        other => Err(ErrorMessage::expected_type("Number or Distribution", other.type_name()).into()),
    }
}

// ===== 比较 =====

fn compare(args: &[Value]) -> Result<Ordering, ErrorMessage> {
    match operands(args)? {
        (Value::Number(a), Value::Number(b)) => a
            .partial_cmp(b)
            .ok_or_else(|| ErrorMessage::Argument("Cannot compare NaN".to_string())),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (a, b) => Err(ErrorMessage::expected_type(
            "two Numbers or two Strings",
            format!("({}, {})", a.type_name(), b.type_name()),
        )),
    }
}

fn equal(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let (a, b) = operands(args)?;
    Ok(Value::Bool(a == b))
}

fn unequal(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let (a, b) = operands(args)?;
    Ok(Value::Bool(a != b))
}

fn smaller(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(compare(args)? == Ordering::Less))
}

fn smaller_eq(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(compare(args)? != Ordering::Greater))
}

fn larger(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(compare(args)? == Ordering::Greater))
}

fn larger_eq(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(compare(args)? != Ordering::Less))
}

// ===== 逻辑 =====

fn and(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(boolean(args, 0)? && boolean(args, 1)?))
}

fn or(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(boolean(args, 0)? || boolean(args, 1)?))
}

fn not(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Bool(!boolean(args, 0)?))
}

// ===== 核心 =====

/// `list[i]`、`dict["key"]` 与 `dict.key`
fn at_index(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    match operands(args)? {
        (Value::Array(items), Value::Number(n)) => {
            if n.fract() != 0.0 || *n < 0.0 {
                return Err(ErrorMessage::Argument(format!("Invalid list index {}", Value::Number(*n))).into());
            }
            items.get(*n as usize).cloned().ok_or_else(|| {
                ErrorMessage::Other(format!(
                    "Index {} is out of bounds for a list of length {}",
                    Value::Number(*n),
                    items.len()
                ))
                .into()
            })
        }
        (Value::Dict(entries), Value::String(key)) => {
            entries.get(&**key).cloned().ok_or_else(|| {
                ErrorMessage::Other(format!("Dict has no key named {key}")).into()
            })
        }
        (target, key) => Err(ErrorMessage::Other(format!(
            "Can't access {} with a {} key",
            target.type_name(),
            key.type_name()
        ))
        .into()),
    }
}

fn type_of(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::string(argument(args, 0)?.type_name()))
}

fn to_string(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::string(argument(args, 0)?.to_plain_string()))
}

fn throw(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let message = match args.first() {
        Some(value) => value.to_plain_string(),
        None => "Common error".to_string(),
    };
    Err(ErrorMessage::Throw(message).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::CallError;
    use crate::runtime::value::Bindings;
    use gauge_config::{Environment, LimitConfig};

    fn call(f: fn(&mut Interpreter, &[Value]) -> NativeResult, args: &[Value]) -> NativeResult {
        let mut interpreter = Interpreter::new(Environment::default(), LimitConfig::default());
        f(&mut interpreter, args)
    }

    fn message(result: NativeResult) -> ErrorMessage {
        match result {
            Err(CallError::Message(message)) => message,
            other => panic!("expected error message, got {other:?}"),
        }
    }

    #[test]
    fn test_add_numbers_and_strings() {
        let n = call(add, &[Value::Number(1.0), Value::Number(2.0)]).unwrap();
        assert_eq!(n, Value::Number(3.0));
        let s = call(add, &[Value::from("a"), Value::Number(1.0)]).unwrap();
        assert_eq!(s, Value::from("a1"));
    }

    #[test]
    fn test_arithmetic_type_error() {
        let err = message(call(subtract, &[Value::Bool(true), Value::Number(1.0)]));
        assert_eq!(
            err.to_string(),
            "Expected type: Number or Distribution but got: (Bool, Number)"
        );
    }

    #[test]
    fn test_comparisons() {
        let lt = call(smaller, &[Value::from("a"), Value::from("b")]).unwrap();
        assert_eq!(lt, Value::Bool(true));
        let ge = call(larger_eq, &[Value::Number(2.0), Value::Number(2.0)]).unwrap();
        assert_eq!(ge, Value::Bool(true));
        assert!(call(larger, &[Value::Number(1.0), Value::from("1")]).is_err());
    }

    #[test]
    fn test_at_index() {
        let list = Value::array(vec![Value::Number(10.0), Value::Number(20.0)]);
        assert_eq!(call(at_index, &[list.clone(), Value::Number(1.0)]).unwrap(), Value::Number(20.0));
        assert!(call(at_index, &[list, Value::Number(2.0)]).is_err());

        let mut entries = Bindings::new();
        entries.insert("a".into(), Value::Bool(true));
        let dict = Value::dict(entries);
        assert_eq!(call(at_index, &[dict.clone(), Value::from("a")]).unwrap(), Value::Bool(true));
        let err = message(call(at_index, &[dict, Value::from("b")]));
        assert_eq!(err.to_string(), "Error: Dict has no key named b");
    }

    #[test]
    fn test_throw_message() {
        let err = message(call(throw, &[Value::from("boom")]));
        assert_eq!(err, ErrorMessage::Throw("boom".into()));
        let err = message(call(throw, &[]));
        assert_eq!(err.to_string(), "Common error");
    }
}
