//! 通用位置类型

use serde::Serialize;

/// 源代码坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinate {
    /// 1-based
    pub line: usize,
    /// 1-based, counted in chars
    pub column: usize,
    /// byte offset into the source
    pub offset: usize,
}

impl Default for Coordinate {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 源代码范围（span）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl Span {
    /// 创建新的 span
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    /// 从单个坐标创建 span（用于单 token）
    pub fn at(coord: Coordinate) -> Self {
        Self {
            start: coord,
            end: coord,
        }
    }

    /// 合并两个 span
    pub fn merge(&self, other: &Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    /// Whether a byte offset falls inside this span (end exclusive)
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(line: usize, column: usize, offset: usize) -> Coordinate {
        Coordinate {
            line,
            column,
            offset,
        }
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(coord(1, 1, 0), coord(1, 3, 2));
        let b = Span::new(coord(2, 1, 10), coord(2, 5, 14));
        let merged = a.merge(&b);
        assert_eq!(merged.start, a.start);
        assert_eq!(merged.end, b.end);
    }

    #[test]
    fn test_span_contains_offset() {
        let span = Span::new(coord(1, 1, 4), coord(1, 5, 8));
        assert!(span.contains_offset(4));
        assert!(span.contains_offset(7));
        assert!(!span.contains_offset(8));
        assert!(!span.contains_offset(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::at(coord(3, 7, 20)).to_string(), "3:7");
    }
}
