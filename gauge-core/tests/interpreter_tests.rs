//! 解释器端到端测试
//!
//! 作用域、闭包捕获、错误与栈追踪、参数定义域

mod common;
use common::{binding, get_number, get_string, run_code, run_with, runtime_error, ExecError};
use gauge_core::{Bindings, Environment, ErrorMessage, LimitConfig, Value};

// ===== 作用域 =====

#[test]
fn test_program_bindings_are_visible() {
    let output = run_code("a = 1\nb = a + 1\nexport c = b * 10").unwrap();
    assert_eq!(binding(&output, "a"), Some(&Value::Number(1.0)));
    assert_eq!(binding(&output, "b"), Some(&Value::Number(2.0)));
    assert_eq!(output.exports.get("c"), Some(&Value::Number(20.0)));
    assert!(!output.exports.contains_key("a"));
}

#[test]
fn test_block_binding_is_invisible_after_block() {
    let output = run_code("x = { hidden = 3; hidden + 1 }").unwrap();
    assert_eq!(binding(&output, "x"), Some(&Value::Number(4.0)));
    assert!(binding(&output, "hidden").is_none());

    let err = run_code("x = { hidden = 3; hidden }\ny = hidden").unwrap_err();
    assert!(matches!(err, ExecError::Compile(_)));
}

#[test]
fn test_block_stack_is_restored() {
    // 块内的绑定出栈后，后续顶层绑定仍指向正确的槽
    let output = run_code("a = { t1 = 1; t2 = 2; t1 + t2 }\nb = 10\nc = a + b").unwrap();
    assert_eq!(binding(&output, "c"), Some(&Value::Number(13.0)));
}

#[test]
fn test_shadowing_at_top_level() {
    let output = run_code("x = 1\nx = x + 1\nx").unwrap();
    assert_eq!(get_number(&output), Some(2.0));
    assert_eq!(binding(&output, "x"), Some(&Value::Number(2.0)));
}

// ===== 闭包 =====

#[test]
fn test_closure_captures_by_value() {
    let output = run_code("x = 1\nf() = x\nx = 2\nf()").unwrap();
    assert_eq!(get_number(&output), Some(1.0));
}

#[test]
fn test_nested_closures() {
    let code = r#"
        base = 100
        adder(n) = {|x| x + n + base}
        add5 = adder(5)
        add5(1)
    "#;
    assert_eq!(get_number(&run_code(code).unwrap()), Some(106.0));
}

#[test]
fn test_closure_inside_block_captures_block_local() {
    let code = r#"
        f = { k = 3; {|x| x * k} }
        f(2)
    "#;
    assert_eq!(get_number(&run_code(code).unwrap()), Some(6.0));
}

#[test]
fn test_functions_as_values() {
    let code = r#"
        twice(f, x) = f(f(x))
        inc(x) = x + 1
        twice(inc, 5)
    "#;
    assert_eq!(get_number(&run_code(code).unwrap()), Some(7.0));
}

// ===== 控制流 =====

#[test]
fn test_ternary_evaluates_one_branch() {
    // 未选中的分支如果被求值会抛错
    let output = run_code(r#"true ? 1 : throw("never")"#).unwrap();
    assert_eq!(get_number(&output), Some(1.0));
    let output = run_code(r#"if 1 > 2 then throw("never") else "ok""#).unwrap();
    assert_eq!(get_string(&output), Some("ok".to_string()));
}

#[test]
fn test_ternary_condition_must_be_bool() {
    let err = runtime_error("x = 1\nx ? 1 : 2");
    assert_eq!(err.message, ErrorMessage::expected_type("Bool", "Number"));
}

// ===== 错误与栈追踪 =====

#[test]
fn test_not_a_function_message() {
    let err = runtime_error("s = \"text\"\ns(1)");
    assert_eq!(err.message.to_string(), "\"text\" is not a function");
}

#[test]
fn test_callee_checked_before_arguments() {
    let err = runtime_error("x = 3\ny = 1 +   x(throw(\"boom\"))");
    assert_eq!(err.message, ErrorMessage::NotAFunction("3".into()));
    let location = err.location().unwrap();
    assert_eq!((location.start.line, location.start.column), (2, 11));
}

#[test]
fn test_stack_trace_lists_call_chain() {
    let code = "inner(x) = throw(\"deep\")\nouter(x) = inner(x)\nouter(1)";
    let err = runtime_error(code);
    assert_eq!(err.message, ErrorMessage::Throw("deep".into()));
    let names: Vec<_> = err.stack_trace.frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["throw", "inner", "outer", "<top>"]);
    let lines: Vec<_> = err
        .stack_trace
        .frames
        .iter()
        .map(|f| f.location.map(|s| s.start.line))
        .collect();
    assert_eq!(lines, vec![Some(1), Some(1), Some(2), Some(3)]);
}

#[test]
fn test_arity_mismatch() {
    let err = runtime_error("f(a, b) = a + b\nf(1)");
    assert_eq!(
        err.message.to_string(),
        "2 arguments expected. Instead 1 argument(s) were passed."
    );
}

#[test]
fn test_failure_is_all_or_nothing() {
    // 失败的模块不返回任何绑定
    let result = run_code("a = 1\nb = throw(\"stop\")\nc = 3");
    assert!(matches!(result, Err(ExecError::Runtime(_))));
}

#[test]
fn test_call_depth_limit() {
    let code = "loop(f) = f(f)\nloop(loop)";
    let limits = LimitConfig {
        max_call_depth: 32,
        ..LimitConfig::default()
    };
    let err = run_with(code, Environment::default(), limits, &Bindings::new()).unwrap_err();
    let ExecError::Runtime(err) = err else {
        panic!("expected runtime error");
    };
    assert_eq!(err.message, ErrorMessage::CallDepth(32));
}

// ===== 参数定义域 =====

#[test]
fn test_domain_accepts_values_in_range() {
    let output = run_code("f(x: [0, 10]) = x * 2\nf(5)").unwrap();
    assert_eq!(get_number(&output), Some(10.0));
}

#[test]
fn test_domain_error_located_at_argument() {
    let err = runtime_error("f(x: [0, 10]) = x\ny = f(   11)");
    assert_eq!(
        err.message,
        ErrorMessage::ArgumentDomain {
            index: 0,
            message: "[0, 10]".into()
        }
    );
    let location = err.location().unwrap();
    assert_eq!((location.start.line, location.start.column), (2, 10));
}

#[test]
fn test_domain_annotation_uses_outer_scope() {
    let output = run_code("limit = 3\nf(x: [0, limit]) = x\nf(3)").unwrap();
    assert_eq!(get_number(&output), Some(3.0));
}

// ===== 外部绑定 =====

#[test]
fn test_externals_are_readable() {
    let mut externals = Bindings::new();
    externals.insert("x".into(), Value::Number(41.0));
    let output = run_with("x + 1", Environment::default(), LimitConfig::default(), &externals).unwrap();
    assert_eq!(get_number(&output), Some(42.0));
    assert!(output.bindings.is_empty());
}
