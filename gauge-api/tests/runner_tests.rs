//! 运行器替换测试：同一项目在不同运行器下结果一致

mod common;

use common::*;
use gauge_api::{
    runner_by_name, ModuleError, Project, RunConfig, Runner, RunnerConfig, RunnerKind, ThreadRunner,
};
use std::sync::Arc;
use std::time::Duration;

const LIB: &str = "export scale(x) = x * 10\nexport base = 4";
const MAIN: &str = "import \"lib\" as lib\nvalues = List.map([1, 2, 3], {|v| lib.scale(v) + lib.base})\nList.sum(values)";

fn project_with(runner: Arc<dyn Runner>) -> Project {
    let project = Project::default().with_runner(runner);
    project.set_source("lib", LIB);
    project.set_source("main", MAIN);
    project
}

#[test]
fn test_thread_runner_matches_embedded() {
    let config = RunnerConfig::default();
    let embedded = project_with(runner_by_name("embedded", &config).unwrap());
    let threaded = project_with(runner_by_name("thread", &config).unwrap());

    let a = embedded.run("main").unwrap();
    let b = threaded.run("main").unwrap();
    assert_eq!(result_of(&a), num(72.0));
    assert_eq!(result_of(&a), result_of(&b));
    assert_eq!(a.id, b.id);
    assert_eq!(binding_names(&a), binding_names(&b));
}

#[test]
fn test_sampling_is_deterministic_across_runners() {
    let code = "d = normal(10, 2)\n[mean(d), stdev(d)]";
    let embedded = Project::default();
    let threaded = Project::default().with_runner(Arc::new(ThreadRunner::new(3, None)));
    embedded.set_source("main", code);
    threaded.set_source("main", code);
    assert_eq!(
        result_of(&embedded.run("main").unwrap()),
        result_of(&threaded.run("main").unwrap())
    );
}

#[test]
fn test_timeout_is_internal_error() {
    let runner = Arc::new(ThreadRunner::new(1, Some(Duration::from_millis(1))));
    let project = Project::default().with_runner(runner);
    project.set_source("slow", "List.reduce(List.upTo(1, 2000000), 0, {|acc, x| acc + x})");
    project.set_source("main", "import \"slow\" as slow\n1");

    let slow = project.run("slow").unwrap();
    assert!(matches!(slow.error(), Some(ModuleError::Internal(_))));
    assert_eq!(import_error_specifier(&project.run("main").unwrap()), "slow");
}

#[test]
fn test_project_from_config() {
    let config = RunConfig {
        runner: RunnerConfig {
            kind: RunnerKind::Thread,
            threads: 2,
            timeout_ms: None,
        },
        ..RunConfig::default()
    };
    let project = Project::from_config(&config);
    assert_eq!(project.runner().name(), "thread");
    project.set_source("main", "2 ^ 10");
    assert_eq!(result_of(&project.run("main").unwrap()), num(1024.0));
}
