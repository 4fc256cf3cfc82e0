//! 集成测试 - 从磁盘加载的多文件项目

mod common;
use common::{file_project, number, Workspace};
use gauge_workspace::{ImportCause, LinkError, ModuleError, RootCause, Value};

#[test]
fn test_relative_imports_load_from_disk() {
    let ws = Workspace::new("relative");
    ws.write("shared/rates.gauge", "export growth = 1.5");
    ws.write("models/lib.gauge", "import \"../shared/rates\" as rates\nexport base = 10 * rates.growth");
    ws.write("models/main.gauge", "import \"./lib\" as lib\nlib.base + 1");

    let (project, name) = file_project(&ws.path("models/main.gauge"));
    let output = project.run(&name).unwrap();
    assert_eq!(number(output.end_result().unwrap()), 16.0);

    // 被加载的模块都有了 head
    assert_eq!(project.module_names().len(), 3);
}

#[test]
fn test_missing_file_is_import_error() {
    let ws = Workspace::new("missing");
    ws.write("main.gauge", "import \"./nowhere\" as nowhere\nnowhere.x");

    let (project, name) = file_project(&ws.path("main.gauge"));
    let output = project.run(&name).unwrap();
    match output.error() {
        Some(ModuleError::Import(err)) => {
            assert!(matches!(err.cause, ImportCause::Load(LinkError::NotFound { .. })));
        }
        other => panic!("expected import error, got {other:?}"),
    }
}

#[test]
fn test_bare_specifier_is_rejected() {
    let ws = Workspace::new("bare");
    ws.write("main.gauge", "import \"lib\" as lib\nlib.x");

    let (project, name) = file_project(&ws.path("main.gauge"));
    let output = project.run(&name).unwrap();
    match output.error() {
        Some(ModuleError::Import(err)) => {
            assert!(matches!(err.cause, ImportCause::Load(LinkError::InvalidPath { .. })));
        }
        other => panic!("expected import error, got {other:?}"),
    }
}

#[test]
fn test_runtime_error_in_dependency_reaches_root_cause() {
    let ws = Workspace::new("root_cause");
    ws.write("lib.gauge", "export x = List.first([])");
    ws.write("main.gauge", "import \"./lib\" as lib\nlib.x");

    let (project, name) = file_project(&ws.path("main.gauge"));
    let output = project.run(&name).unwrap();
    let error = output.error().unwrap();
    assert!(matches!(error, ModuleError::Import(_)));
    assert!(matches!(error.root_cause(), RootCause::Module(ModuleError::Run(_))));
}

#[test]
fn test_editing_a_dependency_reruns_importer() {
    let ws = Workspace::new("edit");
    let lib = ws.write("lib.gauge", "export x = 1");
    ws.write("main.gauge", "import \"./lib\" as lib\nlib.x * 100");

    let (project, name) = file_project(&ws.path("main.gauge"));
    assert_eq!(number(project.run(&name).unwrap().end_result().unwrap()), 100.0);

    project.set_source(&lib, "export x = 2");
    assert_eq!(number(project.run(&name).unwrap().end_result().unwrap()), 200.0);
    assert_eq!(project.run_order_for(&name).unwrap(), vec![lib, name]);
}

#[test]
fn test_distribution_through_imports() {
    let ws = Workspace::new("dist");
    ws.write("inputs.gauge", "export cost = pointMass(20)\nexport units = 3");
    ws.write("main.gauge", "import \"./inputs\" as inputs\nmean(inputs.cost) * inputs.units");

    let (project, name) = file_project(&ws.path("main.gauge"));
    let output = project.run(&name).unwrap();
    assert_eq!(output.end_result().unwrap(), &Value::Number(60.0));
}
