use super::{argument, number, NativeResult, StdLib};
use crate::runtime::error::ErrorMessage;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::{Arity, Value};

pub(super) fn register(lib: &mut StdLib) {
    // ===== 常量 =====
    lib.constant("Math.pi", Value::Number(std::f64::consts::PI));
    lib.constant("Math.e", Value::Number(std::f64::consts::E));

    // ===== 函数 =====
    lib.function("Math.sqrt", Arity::Exact(1), sqrt);
    lib.function("Math.abs", Arity::Exact(1), abs);
    lib.function("Math.floor", Arity::Exact(1), floor);
    lib.function("Math.ceil", Arity::Exact(1), ceil);
    lib.function("Math.round", Arity::Exact(1), round);
    lib.function("Math.exp", Arity::Exact(1), exp);
    lib.function("Math.log", Arity::Exact(1), log);
    lib.function("Math.log10", Arity::Exact(1), log10);
    lib.function("Math.min", Arity::Between(1, 2), min);
    lib.function("Math.max", Arity::Between(1, 2), max);
}

fn unary(args: &[Value], f: fn(f64) -> f64) -> NativeResult {
    Ok(Value::Number(f(number(args, 0)?)))
}

fn sqrt(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let n = number(args, 0)?;
    if n < 0.0 {
        return Err(ErrorMessage::Domain("Cannot take the square root of a negative number".to_string()).into());
    }
    Ok(Value::Number(n.sqrt()))
}

fn abs(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    unary(args, f64::abs)
}

fn floor(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    unary(args, f64::floor)
}

fn ceil(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    unary(args, f64::ceil)
}

fn round(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    unary(args, f64::round)
}

fn exp(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    unary(args, f64::exp)
}

fn log(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let n = number(args, 0)?;
    if n <= 0.0 {
        return Err(ErrorMessage::Domain("Logarithm requires a positive number".to_string()).into());
    }
    Ok(Value::Number(n.ln()))
}

fn log10(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let n = number(args, 0)?;
    if n <= 0.0 {
        return Err(ErrorMessage::Domain("Logarithm requires a positive number".to_string()).into());
    }
    Ok(Value::Number(n.log10()))
}

/// 两个数字，或一个数字列表
fn extremum(args: &[Value], pick: fn(f64, f64) -> f64) -> NativeResult {
    if args.len() == 2 {
        return Ok(Value::Number(pick(number(args, 0)?, number(args, 1)?)));
    }
    let items = match argument(args, 0)? {
        Value::Array(items) => items,
        other => return Err(ErrorMessage::expected_type("List", other.type_name()).into()),
    };
    let mut best: Option<f64> = None;
    for item in items.iter() {
        let n = item
            .as_number()
            .ok_or_else(|| ErrorMessage::expected_type("Number", item.type_name()))?;
        best = Some(best.map_or(n, |b| pick(b, n)));
    }
    best.map(Value::Number)
        .ok_or_else(|| ErrorMessage::Argument("List must not be empty".to_string()).into())
}

fn min(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    extremum(args, f64::min)
}

fn max(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    extremum(args, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_config::{Environment, LimitConfig};

    fn interpreter() -> Interpreter {
        Interpreter::new(Environment::default(), LimitConfig::default())
    }

    #[test]
    fn test_min_max_forms() {
        let two = [Value::Number(3.0), Value::Number(-1.0)];
        assert_eq!(min(&mut interpreter(), &two).unwrap(), Value::Number(-1.0));
        let list = [Value::array(vec![Value::Number(2.0), Value::Number(9.0)])];
        assert_eq!(max(&mut interpreter(), &list).unwrap(), Value::Number(9.0));
        assert!(max(&mut interpreter(), &[Value::array(vec![])]).is_err());
    }

    #[test]
    fn test_domain_errors() {
        assert!(sqrt(&mut interpreter(), &[Value::Number(-4.0)]).is_err());
        assert!(log(&mut interpreter(), &[Value::Number(0.0)]).is_err());
        assert_eq!(
            log10(&mut interpreter(), &[Value::Number(100.0)]).unwrap(),
            Value::Number(2.0)
        );
    }
}
