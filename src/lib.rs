//! Gauge - A small language for probabilistic estimates
//!
//! Programs are split into modules that import each other by name. A
//! [`Project`] tracks module sources, their versions and the outputs of
//! each run, and re-runs only what a change actually affects.
//!
//! # Architecture
//!
//! ```text
//! gauge-config/  - Shared config types and log targets
//! gauge-core/    - Lexer, parser, lowering and the interpreter (no IO)
//! gauge-api/     - Project, linkers and runners
//! gauge-cli/     - The `gauge` binary
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use gauge_workspace::quick_run;
//!
//! let success = quick_run("x = 2 to 5\nmean(x)").unwrap();
//! println!("Result: {}", success.result);
//! ```

pub use gauge_api::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_run() {
        let success = quick_run("1 + 41").unwrap();
        assert_eq!(success.result, Value::Number(42.0));
    }

    #[test]
    fn test_facade_exposes_project() {
        let project = Project::default();
        project.set_source(MAIN_MODULE, "export a = 1");
        let output = project.run(MAIN_MODULE).unwrap();
        assert!(output.is_ok());
    }
}
