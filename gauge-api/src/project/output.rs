//! 模块输出
//!
//! 一个模块在一个环境下的执行结果。提交后不可变，按 `OutputId`
//! 内容寻址缓存。

use super::hash::{hash_environment, OutputId, OutputIdBuilder};
use super::module::{ImportBinding, ImportKind, Module};
use super::value_path::{self, PathRoot, ValuePath};
use crate::error::{ImportCause, ImportError, LinkError, ModuleError};
use crate::runner::{RunRequest, Runner};
use gauge_config::{targets, Environment, LimitConfig};
use gauge_core::{Bindings, RunProfile, Span, Value};
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// 导出的绑定，带上所属模块的名字
#[derive(Debug, Clone, PartialEq)]
pub struct Exports {
    pub module: String,
    pub values: Bindings,
}

impl Deref for Exports {
    type Target = Bindings;

    fn deref(&self) -> &Bindings {
        &self.values
    }
}

/// 成功的运行
#[derive(Debug, Clone)]
pub struct RunSuccess {
    /// 末尾表达式的值
    pub result: Value,
    /// 本模块自己的顶层绑定（不含 continue 进来的）
    pub bindings: Bindings,
    /// 命名导入：变量 -> 被导入模块的 exports
    pub imports: Bindings,
    pub exports: Exports,
    pub profile: Option<RunProfile>,
}

/// 一条导入在编排时的状况
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    Ready(Arc<ModuleOutput>),
    LoadFailed(LinkError),
}

#[derive(Debug)]
pub struct ModuleOutput {
    pub id: OutputId,
    pub module_name: String,
    pub module: Arc<Module>,
    pub environment: Environment,
    pub result: Result<RunSuccess, ModuleError>,
    pub execution_time: Duration,
}

/// `ModuleOutput::make` 的输入
pub struct MakeParams<'a> {
    pub name: &'a str,
    pub module: &'a Arc<Module>,
    pub environment: &'a Environment,
    pub limits: &'a LimitConfig,
    /// 已按声明顺序解析完毕的导入
    pub imports: &'a [(ImportBinding, ImportOutcome)],
    pub runner: &'a dyn Runner,
}

impl ModuleOutput {
    /// 缓存键：模块名、模块哈希、环境哈希和每个导入输出的 id（按顺序）
    pub fn output_id(
        name: &str,
        module: &Module,
        environment: &Environment,
        imports: &[(ImportBinding, ImportOutcome)],
    ) -> OutputId {
        imports.iter().fold(
            OutputIdBuilder::new(name, module.hash(), &hash_environment(environment)),
            |builder, (binding, outcome)| match outcome {
                ImportOutcome::Ready(output) => builder.import_output(&output.id),
                ImportOutcome::LoadFailed(_) => builder.unresolved_import(&binding.specifier),
            },
        )
        .finish()
    }

    /// 失败的输出（不经过 Runner）
    pub fn failed(
        id: OutputId,
        name: &str,
        module: Arc<Module>,
        environment: &Environment,
        error: ModuleError,
    ) -> Self {
        Self {
            id,
            module_name: name.to_string(),
            module,
            environment: environment.clone(),
            result: Err(error),
            execution_time: Duration::ZERO,
        }
    }

    /// 运行一个所有导入都已就绪的模块
    ///
    /// 任何导入失败都会立即产生 `ImportError`，Runner 不会被调用。
    pub fn make(params: MakeParams<'_>) -> Self {
        let MakeParams {
            name,
            module,
            environment,
            limits,
            imports,
            runner,
        } = params;
        let id = Self::output_id(name, module, environment, imports);
        let fail = |error: ModuleError| Self::failed(id.clone(), name, module.clone(), environment, error);

        let mut externals = Bindings::new();
        let mut import_values = Bindings::new();
        for (binding, outcome) in imports {
            let output = match outcome {
                ImportOutcome::LoadFailed(error) => {
                    return fail(ModuleError::Import(ImportError {
                        binding: binding.clone(),
                        cause: ImportCause::Load(error.clone()),
                    }));
                }
                ImportOutcome::Ready(output) => output,
            };
            let success = match &output.result {
                Ok(success) => success,
                Err(error) => {
                    return fail(ModuleError::Import(ImportError {
                        binding: binding.clone(),
                        cause: ImportCause::Output(Box::new(error.clone())),
                    }));
                }
            };
            match &binding.kind {
                ImportKind::Continue => {
                    externals.extend(success.bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                ImportKind::Named { variable } => {
                    let exports = Value::dict(success.exports.values.clone());
                    externals.insert(variable.clone(), exports.clone());
                    import_values.insert(variable.clone(), exports);
                }
            }
        }

        let program = match module.ast() {
            Ok(program) => program,
            Err(error) => return fail(ModuleError::Compile(error)),
        };

        let request = RunRequest {
            program,
            environment: environment.clone(),
            limits: limits.clone(),
            externals,
        };
        let started = Instant::now();
        let run_result = runner.run(request);
        let execution_time = started.elapsed();

        debug!(
            target: targets::PROJECT,
            module = name,
            id = id.short(),
            runner = runner.name(),
            ok = run_result.is_ok(),
            elapsed_us = execution_time.as_micros() as u64,
            "Module ran"
        );

        let result = run_result.map(|output| {
            let mut profile = output.profile;
            if let Some(profile) = profile.as_mut() {
                // 导入语句的耗时记为被导入模块的执行时间
                for (binding, outcome) in imports {
                    if let (ImportOutcome::Ready(import), Some(location)) = (outcome, binding.location) {
                        profile.record(binding.to_string(), location, import.execution_time);
                    }
                }
            }
            RunSuccess {
                result: output.result,
                bindings: output.bindings,
                imports: import_values,
                exports: Exports {
                    module: name.to_string(),
                    values: output.exports,
                },
                profile,
            }
        });

        Self {
            id,
            module_name: name.to_string(),
            module: module.clone(),
            environment: environment.clone(),
            result,
            execution_time,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// 末尾表达式的值
    pub fn end_result(&self) -> Result<&Value, &ModuleError> {
        self.result.as_ref().map(|r| &r.result)
    }

    pub fn bindings(&self) -> Result<&Bindings, &ModuleError> {
        self.result.as_ref().map(|r| &r.bindings)
    }

    pub fn exports(&self) -> Result<&Exports, &ModuleError> {
        self.result.as_ref().map(|r| &r.exports)
    }

    pub fn error(&self) -> Option<&ModuleError> {
        self.result.as_ref().err()
    }

    // ===== 值路径 =====

    /// 路径处的值
    pub fn value_at(&self, path: &ValuePath) -> Option<Value> {
        let success = self.result.as_ref().ok()?;
        let root = match path.root {
            PathRoot::Result => success.result.clone(),
            PathRoot::Bindings => Value::dict(success.bindings.clone()),
            PathRoot::Imports => Value::dict(success.imports.clone()),
            PathRoot::Exports => Value::dict(success.exports.values.clone()),
        };
        path.lookup(&root).cloned()
    }

    /// 路径对应的源码位置
    pub fn locate(&self, path: &ValuePath) -> Option<Span> {
        let program = self.module.ast().ok()?;
        value_path::locate(&program, path)
    }

    /// 源码偏移量处的值路径
    pub fn find_value_path_by_offset(&self, offset: usize) -> Option<ValuePath> {
        let program = self.module.ast().ok()?;
        value_path::find_by_offset(&program, offset)
    }
}
