use crate::compiler::lexer::types::Span;
use serde::Serialize;
use std::time::Duration;

/// 顶层语句耗时（`environment.profile` 打开时记录）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunProfile {
    pub entries: Vec<ProfileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub label: String,
    pub location: Span,
    pub elapsed: Duration,
}

impl RunProfile {
    pub fn record(&mut self, label: impl Into<String>, location: Span, elapsed: Duration) {
        self.entries.push(ProfileEntry {
            label: label.into(),
            location,
            elapsed,
        });
    }

    pub fn total(&self) -> Duration {
        self.entries.iter().map(|e| e.elapsed).sum()
    }
}
