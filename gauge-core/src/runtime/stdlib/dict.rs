use super::{argument, dict, string, NativeResult, StdLib};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::{Arity, Value};

pub(super) fn register(lib: &mut StdLib) {
    lib.function("Dict.keys", Arity::Exact(1), keys);
    lib.function("Dict.values", Arity::Exact(1), values);
    lib.function("Dict.has", Arity::Exact(2), has);
    lib.function("Dict.set", Arity::Exact(3), set);
    lib.function("Dict.merge", Arity::Exact(2), merge);
}

fn keys(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let entries = dict(args, 0)?;
    Ok(Value::array(entries.keys().map(|k| Value::string(k.as_str())).collect()))
}

fn values(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let entries = dict(args, 0)?;
    Ok(Value::array(entries.values().cloned().collect()))
}

fn has(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let entries = dict(args, 0)?;
    Ok(Value::Bool(entries.contains_key(string(args, 1)?)))
}

/// 返回新字典，原字典不变
fn set(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mut entries = dict(args, 0)?.clone();
    entries.insert(string(args, 1)?.to_string(), argument(args, 2)?.clone());
    Ok(Value::dict(entries))
}

/// 右侧覆盖左侧
fn merge(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mut entries = dict(args, 0)?.clone();
    for (key, value) in dict(args, 1)? {
        entries.insert(key.clone(), value.clone());
    }
    Ok(Value::dict(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::Bindings;
    use gauge_config::{Environment, LimitConfig};

    fn interpreter() -> Interpreter {
        Interpreter::new(Environment::default(), LimitConfig::default())
    }

    fn sample() -> Value {
        let mut entries = Bindings::new();
        entries.insert("b".into(), Value::Number(2.0));
        entries.insert("a".into(), Value::Number(1.0));
        Value::dict(entries)
    }

    #[test]
    fn test_keys_are_sorted() {
        let result = keys(&mut interpreter(), &[sample()]).unwrap();
        assert_eq!(result, Value::array(vec![Value::from("a"), Value::from("b")]));
    }

    #[test]
    fn test_set_does_not_mutate() {
        let original = sample();
        let updated = set(
            &mut interpreter(),
            &[original.clone(), Value::from("c"), Value::Bool(true)],
        )
        .unwrap();
        assert_eq!(original.as_dict().unwrap().len(), 2);
        assert_eq!(updated.as_dict().unwrap().len(), 3);
    }

    #[test]
    fn test_merge_prefers_right() {
        let mut right = Bindings::new();
        right.insert("a".into(), Value::from("new"));
        let merged = merge(&mut interpreter(), &[sample(), Value::dict(right)]).unwrap();
        assert_eq!(merged.as_dict().unwrap().get("a"), Some(&Value::from("new")));
        let has_b = has(&mut interpreter(), &[merged, Value::from("b")]).unwrap();
        assert_eq!(has_b, Value::Bool(true));
    }
}
