//! Gauge Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Gauge crates.

use serde::{Deserialize, Serialize};

/// Seed used when the caller does not provide one.
pub const DEFAULT_SEED: &str = "default-seed";

/// Numeric execution parameters.
///
/// Two runs of the same module under equal environments produce equal
/// outputs; the environment never affects a module's own hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    /// Number of samples drawn for every sample-set distribution
    pub sample_count: usize,
    /// Resolution used when a distribution is converted to a point set
    pub xy_point_length: usize,
    /// Seed for the random number generator (`None` = default seed)
    pub seed: Option<String>,
    /// Record per-statement timings
    pub profile: bool,
}

impl Environment {
    /// The effective seed string
    pub fn seed_or_default(&self) -> &str {
        self.seed.as_deref().unwrap_or(DEFAULT_SEED)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            sample_count: 1000,
            xy_point_length: 1000,
            seed: Some(DEFAULT_SEED.to_string()),
            profile: false,
        }
    }
}

/// Configuration for execution limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitConfig {
    /// Maximum depth of nested lambda calls
    pub max_call_depth: usize,
    /// Maximum number of live stack slots
    pub max_stack_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_stack_size: 1 << 20,
        }
    }
}

/// Which runner drives the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    /// In-process, on the calling thread
    #[default]
    Embedded,
    /// Persistent worker thread pool
    Thread,
}

impl RunnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerKind::Embedded => "embedded",
            RunnerKind::Thread => "thread",
        }
    }

    /// Parse a runner name as accepted by the CLI
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "embedded" => Some(RunnerKind::Embedded),
            "thread" | "threads" => Some(RunnerKind::Thread),
            _ => None,
        }
    }
}

/// Runner selection and limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    pub kind: RunnerKind,
    /// Worker count for the thread runner
    pub threads: usize,
    /// Per-run timeout for the thread runner, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            kind: RunnerKind::Embedded,
            threads: 2,
            timeout_ms: None,
        }
    }
}

/// Log targets, one per phase.
///
/// These are `const` so they can be used as `target:` in tracing macros.
pub mod targets {
    pub const LEXER: &str = "gauge::lexer";
    pub const PARSER: &str = "gauge::parser";
    pub const COMPILER: &str = "gauge::compiler";
    pub const INTERPRETER: &str = "gauge::interpreter";
    pub const PROJECT: &str = "gauge::project";
    pub const RUNNER: &str = "gauge::runner";
    pub const CLI: &str = "gauge::cli";
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Compiler,
    Interpreter,
    Project,
    Runner,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Lexer,
        Phase::Parser,
        Phase::Compiler,
        Phase::Interpreter,
        Phase::Project,
        Phase::Runner,
    ];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Interpreter => "interpreter",
            Phase::Project => "project",
            Phase::Runner => "runner",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> &'static str {
        match self {
            Phase::Lexer => targets::LEXER,
            Phase::Parser => targets::PARSER,
            Phase::Compiler => targets::COMPILER,
            Phase::Interpreter => targets::INTERPRETER,
            Phase::Project => targets::PROJECT,
            Phase::Runner => targets::RUNNER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment() {
        let env = Environment::default();
        assert_eq!(env.sample_count, 1000);
        assert_eq!(env.seed_or_default(), "default-seed");
        assert!(!env.profile);
    }

    #[test]
    fn test_environment_without_seed_uses_default() {
        let env = Environment {
            seed: None,
            ..Environment::default()
        };
        assert_eq!(env.seed_or_default(), DEFAULT_SEED);
    }

    #[test]
    fn test_default_limit_config() {
        let cfg = LimitConfig::default();
        assert_eq!(cfg.max_call_depth, 256);
        assert_eq!(cfg.max_stack_size, 1 << 20);
    }

    #[test]
    fn test_environment_json_partial() {
        let env: Environment = serde_json::from_str(r#"{"sampleCount": 50}"#).unwrap();
        assert_eq!(env.sample_count, 50);
        assert_eq!(env.xy_point_length, 1000);
    }

    #[test]
    fn test_runner_kind_parse() {
        assert_eq!(RunnerKind::parse("embedded"), Some(RunnerKind::Embedded));
        assert_eq!(RunnerKind::parse("Thread"), Some(RunnerKind::Thread));
        assert_eq!(RunnerKind::parse("node"), None);
        assert_eq!(RunnerKind::Thread.as_str(), "thread");
    }

    #[test]
    fn test_phase_as_str() {
        assert_eq!(Phase::Lexer.as_str(), "lexer");
        assert_eq!(Phase::Interpreter.target(), "gauge::interpreter");
        assert_eq!(Phase::ALL.len(), 6);
    }
}
