use super::{argument, array, integer, lambda, number, NativeResult, StdLib};
use crate::runtime::error::ErrorMessage;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::{Arity, Value};

pub(super) fn register(lib: &mut StdLib) {
    lib.function("List.length", Arity::Exact(1), length);
    lib.function("List.map", Arity::Exact(2), map);
    lib.function("List.filter", Arity::Exact(2), filter);
    lib.function("List.reduce", Arity::Exact(3), reduce);
    lib.function("List.upTo", Arity::Exact(2), up_to);
    lib.function("List.make", Arity::Exact(2), make);
    lib.function("List.first", Arity::Exact(1), first);
    lib.function("List.last", Arity::Exact(1), last);
    lib.function("List.reverse", Arity::Exact(1), reverse);
    lib.function("List.sum", Arity::Exact(1), sum);
    lib.function("List.concat", Arity::Exact(2), concat);
}

fn length(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Number(array(args, 0)?.len() as f64))
}

/// 回调接受两个参数时额外传入下标
fn map(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let items = array(args, 0)?;
    let f = lambda(args, 1)?;
    let with_index = f.parameter_count() == Some(2);
    let mut mapped = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let call_args = if with_index {
            vec![item.clone(), Value::Number(index as f64)]
        } else {
            vec![item.clone()]
        };
        mapped.push(interpreter.call(f, call_args)?);
    }
    Ok(Value::array(mapped))
}

fn filter(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let items = array(args, 0)?;
    let f = lambda(args, 1)?;
    let mut kept = Vec::new();
    for item in items {
        match interpreter.call(f, vec![item.clone()])? {
            Value::Bool(true) => kept.push(item.clone()),
            Value::Bool(false) => {}
            other => return Err(ErrorMessage::expected_type("Bool", other.type_name()).into()),
        }
    }
    Ok(Value::array(kept))
}

fn reduce(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let items = array(args, 0)?;
    let mut accumulator = argument(args, 1)?.clone();
    let f = lambda(args, 2)?;
    for item in items {
        accumulator = interpreter.call(f, vec![accumulator, item.clone()])?;
    }
    Ok(accumulator)
}

/// 闭区间 [low, high] 的整数
fn up_to(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let low = integer(args, 0)?;
    let high = integer(args, 1)?;
    if high < low {
        return Err(ErrorMessage::Argument(format!(
            "Low value {low} must not be greater than high value {high}"
        ))
        .into());
    }
    Ok(Value::array((low..=high).map(|n| Value::Number(n as f64)).collect()))
}

/// `List.make(n, value)`；`value` 是函数时按下标（或无参）调用
fn make(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let count = number(args, 0)?;
    if count < 0.0 || count.fract() != 0.0 {
        return Err(ErrorMessage::Argument(format!(
            "Number of elements must be a non-negative integer, got {}",
            Value::Number(count)
        ))
        .into());
    }
    let count = count as usize;
    match argument(args, 1)? {
        Value::Lambda(f) => {
            let pass_index = f.parameter_count() == Some(1);
            let mut items = Vec::with_capacity(count);
            for index in 0..count {
                let call_args = if pass_index {
                    vec![Value::Number(index as f64)]
                } else {
                    Vec::new()
                };
                items.push(interpreter.call(f, call_args)?);
            }
            Ok(Value::array(items))
        }
        value => Ok(Value::array(vec![value.clone(); count])),
    }
}

fn first(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    array(args, 0)?
        .first()
        .cloned()
        .ok_or_else(|| ErrorMessage::Argument("List must not be empty".to_string()).into())
}

fn last(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    array(args, 0)?
        .last()
        .cloned()
        .ok_or_else(|| ErrorMessage::Argument("List must not be empty".to_string()).into())
}

fn reverse(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::array(array(args, 0)?.iter().rev().cloned().collect()))
}

fn sum(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mut total = 0.0;
    for item in array(args, 0)? {
        total += item
            .as_number()
            .ok_or_else(|| ErrorMessage::expected_type("Number", item.type_name()))?;
    }
    Ok(Value::Number(total))
}

fn concat(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mut items = array(args, 0)?.to_vec();
    items.extend_from_slice(array(args, 1)?);
    Ok(Value::array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_config::{Environment, LimitConfig};

    fn numbers(values: &[f64]) -> Value {
        Value::array(values.iter().map(|n| Value::Number(*n)).collect())
    }

    fn interpreter() -> Interpreter {
        Interpreter::new(Environment::default(), LimitConfig::default())
    }

    #[test]
    fn test_up_to_inclusive() {
        let result = up_to(&mut interpreter(), &[Value::Number(1.0), Value::Number(3.0)]).unwrap();
        assert_eq!(result, numbers(&[1.0, 2.0, 3.0]));
        assert!(up_to(&mut interpreter(), &[Value::Number(3.0), Value::Number(1.0)]).is_err());
    }

    #[test]
    fn test_make_with_value() {
        let result = make(&mut interpreter(), &[Value::Number(2.0), Value::from("x")]).unwrap();
        assert_eq!(result, Value::array(vec![Value::from("x"), Value::from("x")]));
        assert!(make(&mut interpreter(), &[Value::Number(-1.0), Value::Void]).is_err());
    }

    #[test]
    fn test_sum_and_reverse() {
        let list = numbers(&[1.0, 2.0, 3.5]);
        assert_eq!(sum(&mut interpreter(), &[list.clone()]).unwrap(), Value::Number(6.5));
        assert_eq!(
            reverse(&mut interpreter(), &[list]).unwrap(),
            numbers(&[3.5, 2.0, 1.0])
        );
    }

    #[test]
    fn test_first_of_empty_fails() {
        assert!(first(&mut interpreter(), &[numbers(&[])]).is_err());
        assert_eq!(
            last(&mut interpreter(), &[numbers(&[1.0, 2.0])]).unwrap(),
            Value::Number(2.0)
        );
    }

    #[test]
    fn test_concat() {
        let result = concat(&mut interpreter(), &[numbers(&[1.0]), numbers(&[2.0])]).unwrap();
        assert_eq!(result, numbers(&[1.0, 2.0]));
    }
}
