//! 标准库测试

mod common;
use common::{get_number, get_string, run_code, run_with, runtime_error};
use gauge_core::{Bindings, Environment, LimitConfig, Value};

// ===== 运算符 =====

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(get_number(&run_code("1 + 2 * 3 ^ 2").unwrap()), Some(19.0));
    assert_eq!(get_number(&run_code("-2 ^ 2").unwrap()), Some(-4.0));
    assert_eq!(get_number(&run_code("10 - 4 - 3").unwrap()), Some(3.0));
}

#[test]
fn test_number_suffixes() {
    assert_eq!(get_number(&run_code("2k + 1M").unwrap()), Some(1_002_000.0));
}

#[test]
fn test_string_concat_and_compare() {
    let output = run_code(r#""a" + "b" + 1"#).unwrap();
    assert_eq!(get_string(&output), Some("ab1".to_string()));
    let output = run_code(r#""apple" < "banana""#).unwrap();
    assert_eq!(output.result, Value::Bool(true));
}

#[test]
fn test_structural_equality() {
    let output = run_code("[1, {a: 2}] == [1, {a: 2}]").unwrap();
    assert_eq!(output.result, Value::Bool(true));
}

#[test]
fn test_logical_operators_need_bools() {
    assert_eq!(run_code("true && !false").unwrap().result, Value::Bool(true));
    let err = runtime_error("1 || true");
    assert!(err.message.to_string().contains("Expected type: Bool"));
}

// ===== 访问 =====

#[test]
fn test_dict_and_list_access() {
    let code = r#"
        d = {name: "gauge", items: [10, 20, 30]}
        d.items[1] + d["items"][2]
    "#;
    assert_eq!(get_number(&run_code(code).unwrap()), Some(50.0));
}

#[test]
fn test_missing_dict_key() {
    let err = runtime_error("d = {a: 1}\nd.b");
    assert_eq!(err.message.to_string(), "Error: Dict has no key named b");
}

// ===== List / Dict =====

#[test]
fn test_list_map_and_reduce() {
    let code = r#"
        xs = List.upTo(1, 4)
        doubled = List.map(xs, {|x| x * 2})
        List.reduce(doubled, 0, {|acc, x| acc + x})
    "#;
    assert_eq!(get_number(&run_code(code).unwrap()), Some(20.0));
}

#[test]
fn test_list_map_with_index() {
    let output = run_code("List.map([5, 5], {|x, i| x * i})").unwrap();
    assert_eq!(
        output.result,
        Value::array(vec![Value::Number(0.0), Value::Number(5.0)])
    );
}

#[test]
fn test_pipe_passes_left_as_first_argument() {
    let code = "[1, 2, 3] -> List.filter({|x| x > 1}) -> List.length()";
    assert_eq!(get_number(&run_code(code).unwrap()), Some(2.0));
}

#[test]
fn test_callback_error_keeps_stack_trace() {
    let err = runtime_error("List.map([1], {|x| x.field})");
    let names: Vec<_> = err.stack_trace.frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"$_atIndex_$"));
    assert!(names.contains(&"List.map"));
}

#[test]
fn test_dict_functions() {
    let code = r#"
        d = Dict.set({a: 1}, "b", 2)
        [Dict.keys(d), Dict.has(d, "b"), Dict.merge(d, {a: 5}).a]
    "#;
    let output = run_code(code).unwrap();
    assert_eq!(
        output.result.to_string(),
        r#"[["a", "b"], true, 5]"#
    );
}

#[test]
fn test_type_of() {
    let output = run_code("[typeOf(1), typeOf(\"s\"), typeOf([]), typeOf({}), typeOf({|x| x})]").unwrap();
    assert_eq!(
        output.result.to_string(),
        r#"["Number", "String", "List", "Dict", "Lambda"]"#
    );
}

// ===== 分布 =====

#[test]
fn test_distribution_arithmetic() {
    let environment = Environment {
        sample_count: 2_000,
        ..Environment::default()
    };
    let code = "d = normal(10, 1) + 5\nmean(d)";
    let output = run_with(code, environment, LimitConfig::default(), &Bindings::new()).unwrap();
    let mean = get_number(&output).unwrap();
    assert!((mean - 15.0).abs() < 0.2, "mean was {mean}");
}

#[test]
fn test_to_operator_builds_distribution() {
    let output = run_code("typeOf(1 to 10)").unwrap();
    assert_eq!(get_string(&output), Some("Distribution".to_string()));
    let err = runtime_error("10 to 1");
    assert!(err.message.to_string().contains("Low value must be less than high value"));
}

#[test]
fn test_seed_makes_runs_reproducible() {
    let code = "sample(normal(0, 1))";
    let first = run_code(code).unwrap().result;
    let second = run_code(code).unwrap().result;
    assert_eq!(first, second);

    let other_seed = Environment {
        seed: Some("another".into()),
        ..Environment::default()
    };
    let third = run_with(code, other_seed, LimitConfig::default(), &Bindings::new())
        .unwrap()
        .result;
    assert_ne!(first, third);
}

#[test]
fn test_sample_set_from_list() {
    let output = run_code("quantile(SampleSet.fromList([1, 2, 3, 4, 5]), 0.5)").unwrap();
    assert_eq!(get_number(&output), Some(3.0));
}
