//! 样本集分布
//!
//! 只实现一种分布表示：固定长度的 Monte Carlo 样本。分布之间的运算
//! 按下标逐个样本进行。

use super::error::ErrorMessage;
use super::value::format_number;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    samples: Vec<f64>,
}

impl SampleSet {
    pub fn new(samples: Vec<f64>) -> Result<Self, ErrorMessage> {
        if samples.is_empty() {
            return Err(ErrorMessage::Domain(
                "A sample set needs at least one sample".to_string(),
            ));
        }
        if samples.iter().any(|s| s.is_nan()) {
            return Err(ErrorMessage::Domain("Sample set contains NaN".to_string()));
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.len() as f64
    }

    /// 总体标准差
    pub fn stdev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .samples
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / self.len() as f64;
        variance.sqrt()
    }

    /// 分位数（线性插值），`p` 必须在 [0, 1]
    pub fn quantile(&self, p: f64) -> Result<f64, ErrorMessage> {
        if !(0.0..=1.0).contains(&p) {
            return Err(ErrorMessage::Domain(format!(
                "Quantile must be between 0 and 1, got {}",
                format_number(p)
            )));
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        let position = p * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let weight = position - lower as f64;
        Ok(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Result<Self, ErrorMessage> {
        Self::new(self.samples.iter().map(|s| f(*s)).collect())
    }

    /// 逐样本组合；长度不同时截断到较短者
    pub fn zip_with(&self, other: &SampleSet, f: impl Fn(f64, f64) -> f64) -> Result<Self, ErrorMessage> {
        Self::new(
            self.samples
                .iter()
                .zip(other.samples.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        )
    }
}

impl fmt::Display for SampleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sample Set Distribution(mean: {}, stdev: {})",
            format_float(self.mean()),
            format_float(self.stdev())
        )
    }
}

fn format_float(n: f64) -> String {
    format_number((n * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rejected() {
        assert!(SampleSet::new(vec![]).is_err());
        assert!(SampleSet::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_moments() {
        let set = SampleSet::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(set.mean(), 5.0);
        assert_eq!(set.stdev(), 2.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let set = SampleSet::new(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(set.quantile(0.0).unwrap(), 1.0);
        assert_eq!(set.quantile(1.0).unwrap(), 4.0);
        assert_eq!(set.quantile(0.5).unwrap(), 2.5);
        assert!(set.quantile(1.5).is_err());
    }

    #[test]
    fn test_zip_with_truncates() {
        let a = SampleSet::new(vec![1.0, 2.0, 3.0]).unwrap();
        let b = SampleSet::new(vec![10.0, 20.0]).unwrap();
        let sum = a.zip_with(&b, |x, y| x + y).unwrap();
        assert_eq!(sum.samples(), &[11.0, 22.0]);
    }

    #[test]
    fn test_display() {
        let set = SampleSet::new(vec![1.0, 3.0]).unwrap();
        assert_eq!(set.to_string(), "Sample Set Distribution(mean: 2, stdev: 1)");
    }
}
