//! 分布构造与查询
//!
//! 所有分布都按 `environment.sample_count` 采样成 `SampleSet`，
//! 随机数来自解释器中以种子初始化的 `StdRng`。

use super::{argument, array, integer, number, NativeResult, StdLib};
use crate::runtime::dist::SampleSet;
use crate::runtime::error::ErrorMessage;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::{Arity, Value};
use rand::Rng;
use std::f64::consts::PI;

/// 标准正态分布的 95% 分位数，`to` 把 [low, high] 当作 90% 置信区间
const NORMAL_95_QUANTILE: f64 = 1.6448536269514722;

pub(super) fn register(lib: &mut StdLib) {
    // ===== 构造 =====
    lib.function("normal", Arity::Exact(2), normal);
    lib.function("lognormal", Arity::Exact(2), lognormal);
    lib.function("uniform", Arity::Exact(2), uniform);
    lib.function("pointMass", Arity::Exact(1), point_mass);
    lib.function("to", Arity::Exact(2), to);
    lib.function("SampleSet.fromList", Arity::Exact(1), from_list);

    // ===== 查询 =====
    lib.function("mean", Arity::Exact(1), mean);
    lib.function("stdev", Arity::Exact(1), stdev);
    lib.function("sample", Arity::Exact(1), sample);
    lib.function("sampleN", Arity::Exact(2), sample_n);
    lib.function("quantile", Arity::Exact(2), quantile);
    lib.function("SampleSet.toList", Arity::Exact(1), to_list);
}

/// 按环境的样本数采样
fn generate(interpreter: &mut Interpreter, mut draw: impl FnMut(&mut dyn rand::RngCore) -> f64) -> NativeResult {
    let count = interpreter.environment().sample_count;
    let rng = interpreter.rng();
    let samples: Vec<f64> = (0..count).map(|_| draw(rng)).collect();
    Ok(Value::dist(SampleSet::new(samples)?))
}

/// Box–Muller 变换
fn standard_normal(rng: &mut dyn rand::RngCore) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn non_negative(value: f64, what: &str) -> Result<f64, ErrorMessage> {
    if value < 0.0 {
        return Err(ErrorMessage::Domain(format!(
            "{what} must be non-negative, got {}",
            Value::Number(value)
        )));
    }
    Ok(value)
}

fn normal(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mean = number(args, 0)?;
    let stdev = non_negative(number(args, 1)?, "Standard deviation")?;
    generate(interpreter, |rng| mean + stdev * standard_normal(rng))
}

fn lognormal(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mu = number(args, 0)?;
    let sigma = non_negative(number(args, 1)?, "Sigma")?;
    generate(interpreter, |rng| (mu + sigma * standard_normal(rng)).exp())
}

fn uniform(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let low = number(args, 0)?;
    let high = number(args, 1)?;
    if high < low {
        return Err(ErrorMessage::Domain(format!(
            "High must be at least low, got low {} and high {}",
            Value::Number(low),
            Value::Number(high)
        ))
        .into());
    }
    generate(interpreter, |rng| low + (high - low) * rng.gen::<f64>())
}

fn point_mass(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let value = number(args, 0)?;
    generate(interpreter, |_| value)
}

/// `low to high`：两端为正时取对数正态，否则取正态
fn to(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let low = number(args, 0)?;
    let high = number(args, 1)?;
    if low >= high {
        return Err(ErrorMessage::Domain(
            "Low value must be less than high value".to_string(),
        )
        .into());
    }
    if low > 0.0 {
        let (log_low, log_high) = (low.ln(), high.ln());
        let mu = (log_low + log_high) / 2.0;
        let sigma = (log_high - log_low) / (2.0 * NORMAL_95_QUANTILE);
        generate(interpreter, |rng| (mu + sigma * standard_normal(rng)).exp())
    } else {
        let mean = (low + high) / 2.0;
        let stdev = (high - low) / (2.0 * NORMAL_95_QUANTILE);
        generate(interpreter, |rng| mean + stdev * standard_normal(rng))
    }
}

fn from_list(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let mut samples = Vec::new();
    for item in array(args, 0)? {
        samples.push(
            item.as_number()
                .ok_or_else(|| ErrorMessage::expected_type("Number", item.type_name()))?,
        );
    }
    Ok(Value::dist(SampleSet::new(samples)?))
}

/// 数字视为点分布
fn sample_set(args: &[Value], index: usize) -> Result<SampleSet, ErrorMessage> {
    match argument(args, index)? {
        Value::Dist(dist) => Ok(dist.as_ref().clone()),
        Value::Number(n) => SampleSet::new(vec![*n]),
        other => Err(ErrorMessage::expected_type("Distribution", other.type_name())),
    }
}

fn mean(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Number(sample_set(args, 0)?.mean()))
}

fn stdev(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    Ok(Value::Number(sample_set(args, 0)?.stdev()))
}

fn sample(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let set = sample_set(args, 0)?;
    let index = interpreter.rng().gen_range(0..set.len());
    Ok(Value::Number(set.samples()[index]))
}

fn sample_n(interpreter: &mut Interpreter, args: &[Value]) -> NativeResult {
    let set = sample_set(args, 0)?;
    let count = integer(args, 1)?;
    if count < 0 {
        return Err(ErrorMessage::Argument(format!("Sample count must be non-negative, got {count}")).into());
    }
    let rng = interpreter.rng();
    let picked = (0..count)
        .map(|_| Value::Number(set.samples()[rng.gen_range(0..set.len())]))
        .collect();
    Ok(Value::array(picked))
}

fn quantile(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let set = sample_set(args, 0)?;
    Ok(Value::Number(set.quantile(number(args, 1)?)?))
}

fn to_list(_: &mut Interpreter, args: &[Value]) -> NativeResult {
    let set = sample_set(args, 0)?;
    Ok(Value::array(set.samples().iter().map(|s| Value::Number(*s)).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_config::{Environment, LimitConfig};

    fn interpreter(sample_count: usize) -> Interpreter {
        let environment = Environment {
            sample_count,
            ..Environment::default()
        };
        Interpreter::new(environment, LimitConfig::default())
    }

    fn samples(value: &Value) -> Vec<f64> {
        match value {
            Value::Dist(set) => set.samples().to_vec(),
            other => panic!("expected distribution, got {other}"),
        }
    }

    #[test]
    fn test_sample_count_follows_environment() {
        let dist = normal(&mut interpreter(17), &[Value::Number(0.0), Value::Number(1.0)]).unwrap();
        assert_eq!(samples(&dist).len(), 17);
    }

    #[test]
    fn test_zero_samples_is_error() {
        assert!(normal(&mut interpreter(0), &[Value::Number(0.0), Value::Number(1.0)]).is_err());
    }

    #[test]
    fn test_normal_moments() {
        let dist = normal(&mut interpreter(20_000), &[Value::Number(10.0), Value::Number(2.0)]).unwrap();
        let Value::Dist(set) = &dist else { unreachable!() };
        assert!((set.mean() - 10.0).abs() < 0.1);
        assert!((set.stdev() - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_to_positive_is_lognormal() {
        let dist = to(&mut interpreter(5_000), &[Value::Number(1.0), Value::Number(10.0)]).unwrap();
        assert!(samples(&dist).iter().all(|s| *s > 0.0));
        let q = quantile(&mut interpreter(1), &[dist, Value::Number(0.5)]).unwrap();
        let q = q.as_number().unwrap();
        assert!((q - 10f64.sqrt()).abs() < 0.3, "median {q}");
    }

    #[test]
    fn test_to_rejects_inverted_bounds() {
        assert!(to(&mut interpreter(10), &[Value::Number(5.0), Value::Number(1.0)]).is_err());
    }

    #[test]
    fn test_uniform_bounds() {
        let dist = uniform(&mut interpreter(500), &[Value::Number(2.0), Value::Number(3.0)]).unwrap();
        assert!(samples(&dist).iter().all(|s| (2.0..=3.0).contains(s)));
    }

    #[test]
    fn test_mean_of_number() {
        let result = mean(&mut interpreter(1), &[Value::Number(4.0)]).unwrap();
        assert_eq!(result, Value::Number(4.0));
    }

    #[test]
    fn test_from_list_round_trip() {
        let list = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let dist = from_list(&mut interpreter(1), &[list.clone()]).unwrap();
        assert_eq!(to_list(&mut interpreter(1), &[dist]).unwrap(), list);
    }
}
