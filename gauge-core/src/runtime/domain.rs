//! 参数定义域

use super::error::ErrorMessage;
use super::value::{format_number, Value};
use std::fmt;

/// 参数的运行时约束，由 `x: [min, max]` 注解在创建 lambda 时求值得到
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    NumericRange { min: f64, max: f64 },
}

impl Domain {
    /// 从注解的求值结果构造定义域
    pub fn from_annotation(value: &Value) -> Result<Domain, ErrorMessage> {
        let bounds = match value.as_array() {
            Some([min, max]) => (min.as_number(), max.as_number()),
            _ => {
                return Err(ErrorMessage::Domain(format!(
                    "Expected a [min, max] range but got: {value}"
                )))
            }
        };
        match bounds {
            (Some(min), Some(max)) if min <= max => Ok(Domain::NumericRange { min, max }),
            (Some(min), Some(max)) => Err(ErrorMessage::Domain(format!(
                "Range minimum {} is larger than maximum {}",
                format_number(min),
                format_number(max)
            ))),
            _ => Err(ErrorMessage::Domain(format!(
                "Range bounds must be numbers, got: {value}"
            ))),
        }
    }

    pub fn includes(&self, value: &Value) -> bool {
        match (self, value) {
            (Domain::NumericRange { min, max }, Value::Number(n)) => *min <= *n && *n <= *max,
            _ => false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::NumericRange { min, max } => {
                write!(f, "[{}, {}]", format_number(*min), format_number(*max))
            }
        }
    }
}
