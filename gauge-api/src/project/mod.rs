//! 项目：模块图与输出编排
//!
//! `Project` 持有一个 [`ProjectStore`]，所有修改都以事件的形式提交。
//! 输出按需计算：
//!
//! 1. 递归地为每条导入取得目标模块及其输出（同一环境）
//! 2. 任一导入还在加载中，返回 [`OutputPoll::Pending`]
//! 3. 所有导入就绪后交给 [`ModuleOutput::make`]，结果按 `OutputId` 提交
//!
//! 同一 `OutputId` 的并发请求共享一次计算，Runner 只被调用一次。
//! Linker 的加载在后台线程中进行，完成后通过通道唤醒 [`Project::run`]。

pub mod hash;
pub mod module;
pub mod output;
pub mod resolution;
pub mod state;
pub mod topology;
pub mod value_path;

use crate::config::RunConfig;
use crate::error::{GaugeError, GraphError, LinkError, ModuleError};
use crate::linker::Linker;
use crate::runner::{runner_from_config, EmbeddedRunner, Runner};
use crossbeam_channel::{unbounded, Receiver, Sender};
use gauge_config::{targets, Environment, LimitConfig};
use hash::{hash_environment, ModuleHash, OutputId, OutputIdBuilder};
use module::{ImportBinding, ImportKind, Module};
use once_cell::sync::OnceCell;
use output::{ImportOutcome, MakeParams, ModuleOutput};
use parking_lot::Mutex;
use resolution::{LoadKey, LoadState, Resolution, ResolutionKey};
use state::{ProjectEvent, ProjectState, ProjectStore};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// `Project::run` 等待加载时的轮询间隔
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 输出请求的结果
#[derive(Debug, Clone)]
pub enum OutputPoll {
    Ready(Arc<ModuleOutput>),
    /// 某个导入仍在加载，稍后再来
    Pending,
}

impl OutputPoll {
    pub fn is_pending(&self) -> bool {
        matches!(self, OutputPoll::Pending)
    }

    pub fn ready(self) -> Option<Arc<ModuleOutput>> {
        match self {
            OutputPoll::Ready(output) => Some(output),
            OutputPoll::Pending => None,
        }
    }
}

/// 项目事件通知（供 CLI 的 `--log-events` 等订阅者使用）
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectNotice {
    OutputCommitted { name: String, id: OutputId, ok: bool },
    ModuleLoaded { name: String },
    LoadFailed { name: String, error: LinkError },
}

/// 后台加载线程也要访问的部分
struct Shared {
    store: ProjectStore,
    subscribers: Mutex<Vec<Sender<ProjectNotice>>>,
}

impl Shared {
    fn notify(&self, notice: ProjectNotice) {
        self.subscribers.lock().retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

/// 一条导入解析到的目标
enum ImportTarget {
    Found { name: String, module: Arc<Module> },
    Pending,
    Failed(LinkError),
}

pub struct Project {
    shared: Arc<Shared>,
    linker: Option<Arc<dyn Linker>>,
    runner: Arc<dyn Runner>,
    limits: LimitConfig,
    /// 正在计算的输出
    in_flight: Mutex<HashMap<OutputId, Arc<OnceCell<Arc<ModuleOutput>>>>>,
    load_tx: Sender<LoadKey>,
    load_rx: Receiver<LoadKey>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl Project {
    pub fn new(environment: Environment) -> Self {
        let (load_tx, load_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                store: ProjectStore::new(environment),
                subscribers: Mutex::new(Vec::new()),
            }),
            linker: None,
            runner: Arc::new(EmbeddedRunner),
            limits: LimitConfig::default(),
            in_flight: Mutex::new(HashMap::new()),
            load_tx,
            load_rx,
        }
    }

    /// 按 RunConfig 构造（环境、限制、运行器）
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.environment.clone())
            .with_limits(config.limits.clone())
            .with_runner(runner_from_config(&config.runner))
    }

    pub fn with_linker(mut self, linker: Arc<dyn Linker>) -> Self {
        self.linker = Some(linker);
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn Runner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_limits(mut self, limits: LimitConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn runner(&self) -> &Arc<dyn Runner> {
        &self.runner
    }

    fn store(&self) -> &ProjectStore {
        &self.shared.store
    }

    pub fn snapshot(&self) -> Arc<ProjectState> {
        self.store().snapshot()
    }

    pub fn version(&self) -> u64 {
        self.store().version()
    }

    /// 订阅项目通知；接收端被丢弃后自动退订
    pub fn subscribe(&self) -> Receiver<ProjectNotice> {
        let (tx, rx) = unbounded();
        self.shared.subscribers.lock().push(tx);
        rx
    }

    // ===== 源码与图的修改 =====

    /// 设置模块源码；该模块及所有传递依赖者的输出失效
    pub fn set_source(&self, name: &str, code: impl Into<String>) -> ModuleHash {
        let module = Arc::new(Module::new(code));
        let hash = module.hash().to_string();
        debug!(target: targets::PROJECT, module = name, hash = &hash[..12], "Setting source");
        self.store().apply_with(|state| {
            vec![
                ProjectEvent::SourceSet {
                    name: name.to_string(),
                    module,
                },
                ProjectEvent::OutputsCleared {
                    names: self.transitive_dependents_in(state, name),
                },
            ]
        });
        hash
    }

    /// 删除模块；依赖它的模块保留，之后它们的导入无法解析
    pub fn remove_source(&self, name: &str) {
        debug!(target: targets::PROJECT, module = name, "Removing source");
        self.store().apply_with(|state| {
            vec![
                ProjectEvent::OutputsCleared {
                    names: self.transitive_dependents_in(state, name),
                },
                ProjectEvent::SourceRemoved {
                    name: name.to_string(),
                },
            ]
        });
    }

    pub fn source(&self, name: &str) -> Option<String> {
        self.snapshot().head_module(name).map(|m| m.code().to_string())
    }

    pub fn module_names(&self) -> Vec<String> {
        self.snapshot().module_names()
    }

    pub fn head(&self, name: &str) -> Option<ModuleHash> {
        self.snapshot().head(name).cloned()
    }

    /// 把 head 指向一个已知的模块版本
    pub fn move_head(&self, head: &str, hash: &str) -> Result<(), GaugeError> {
        let mut unknown = false;
        self.store().apply_with(|state| {
            if state.module(hash).is_none() {
                unknown = true;
                return Vec::new();
            }
            vec![
                ProjectEvent::HeadMoved {
                    head: head.to_string(),
                    hash: hash.to_string(),
                },
                ProjectEvent::OutputsCleared {
                    names: self.transitive_dependents_in(state, head),
                },
            ]
        });
        if unknown {
            return Err(GraphError::UnknownModule(hash.to_string()).into());
        }
        Ok(())
    }

    /// 设置平铺导入；替换原有列表
    pub fn set_continues(&self, name: &str, continues: Vec<String>) {
        self.store().apply_with(|state| {
            vec![
                ProjectEvent::ContinuesSet {
                    name: name.to_string(),
                    continues,
                },
                ProjectEvent::OutputsCleared {
                    names: self.transitive_dependents_in(state, name),
                },
            ]
        });
    }

    /// 设置导入固定的哈希（说明符 -> 模块哈希）
    pub fn set_pins(&self, name: &str, pins: BTreeMap<String, ModuleHash>) {
        self.store().apply_with(|state| {
            vec![
                ProjectEvent::PinsSet {
                    name: name.to_string(),
                    pins,
                },
                ProjectEvent::OutputsCleared {
                    names: self.transitive_dependents_in(state, name),
                },
            ]
        });
    }

    /// 切换环境；旧环境下的输出仍按其键保留
    pub fn set_environment(&self, environment: Environment) {
        self.store().apply([ProjectEvent::EnvironmentSet(environment)]);
    }

    pub fn environment(&self) -> Environment {
        self.snapshot().environment().clone()
    }

    /// 丢弃一个模块的全部输出
    pub fn clean(&self, name: &str) {
        self.store().apply([ProjectEvent::OutputsCleared {
            names: vec![name.to_string()],
        }]);
    }

    pub fn clean_all(&self) {
        self.store().apply([ProjectEvent::OutputsCleared {
            names: self.module_names(),
        }]);
    }

    // ===== 拓扑查询 =====

    /// 直接依赖：先 continues，再命名导入；去重，保持声明顺序
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.dependencies_in(&self.snapshot(), name)
    }

    /// 直接依赖 `name` 的模块
    pub fn dependents(&self, name: &str) -> Vec<String> {
        let state = self.snapshot();
        topology::dependents(&state.module_names(), name, |n| self.dependencies_in(&state, n))
    }

    /// 全部模块的运行顺序，依赖在前
    pub fn run_order(&self) -> Result<Vec<String>, GraphError> {
        let state = self.snapshot();
        self.order_in(&state, &state.module_names())
    }

    /// 运行 `name` 需要的模块及其顺序（以 `name` 结尾）
    pub fn run_order_for(&self, name: &str) -> Result<Vec<String>, GraphError> {
        let state = self.snapshot();
        self.order_in(&state, &[name.to_string()])
    }

    fn order_in(&self, state: &ProjectState, entries: &[String]) -> Result<Vec<String>, GraphError> {
        let order = topology::run_order(entries, |n| self.dependencies_in(state, n))?;
        Ok(order.into_iter().filter(|n| state.head(n).is_some()).collect())
    }

    fn dependencies_in(&self, state: &ProjectState, name: &str) -> Vec<String> {
        let Some(module) = state.head_module(name) else {
            return Vec::new();
        };
        // 解析失败时只知道 continues
        let imports = state
            .imports_of(name, module)
            .unwrap_or_else(|_| state.continue_imports(name));
        let mut result: Vec<String> = Vec::new();
        for import in &imports {
            if let Ok(target) = self.target_name(name, import) {
                if !result.contains(&target) {
                    result.push(target);
                }
            }
        }
        result
    }

    fn transitive_dependents_in(&self, state: &ProjectState, name: &str) -> Vec<String> {
        let mut names = topology::transitive_dependents(&state.module_names(), name, |n| {
            self.dependencies_in(state, n)
        });
        names.push(name.to_string());
        names
    }

    /// 导入的目标模块名：continues 直接是模块名，命名导入交给 Linker
    fn target_name(&self, importer: &str, import: &ImportBinding) -> Result<String, LinkError> {
        match (&import.kind, &self.linker) {
            (ImportKind::Named { .. }, Some(linker)) => linker.resolve(&import.specifier, importer),
            _ => Ok(import.specifier.clone()),
        }
    }

    // ===== 输出 =====

    /// 取得模块在当前环境下的输出
    ///
    /// 失败的输出也是 `Ready`；只有模块本身不存在时才返回错误。
    pub fn output(&self, name: &str) -> Result<OutputPoll, GaugeError> {
        let state = self.snapshot();
        let module = state
            .head_module(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownHead(name.to_string()))?;
        let environment = state.environment().clone();
        let mut stack = Vec::new();
        Ok(self.compute(name, &module, &environment, &mut stack))
    }

    /// 阻塞直到输出就绪，期间等待后台加载
    pub fn run(&self, name: &str) -> Result<Arc<ModuleOutput>, GaugeError> {
        loop {
            if let OutputPoll::Ready(output) = self.output(name)? {
                return Ok(output);
            }
            if !self.snapshot().has_pending_loads() {
                // 加载可能在两次检查之间结束
                return match self.output(name)? {
                    OutputPoll::Ready(output) => Ok(output),
                    OutputPoll::Pending => Err(GraphError::Stalled(name.to_string()).into()),
                };
            }
            trace!(target: targets::PROJECT, module = name, "Waiting for loads");
            let _ = self.load_rx.recv_timeout(LOAD_POLL_INTERVAL);
        }
    }

    /// 运行全部模块（按运行顺序）
    pub fn run_all(&self) -> Result<Vec<Arc<ModuleOutput>>, GaugeError> {
        self.run_order()?.iter().map(|name| self.run(name)).collect()
    }

    /// 预先向 Linker 请求 `name` 传递依赖中所有缺失的模块，并等待加载结束
    ///
    /// 加载失败的模块不会报错，它们的导入者之后得到 `ImportError`。
    pub fn load_imports_recursively(&self, name: &str) -> Result<(), GaugeError> {
        let Some(linker) = self.linker.clone() else {
            return Ok(());
        };
        loop {
            let state = self.snapshot();
            let order = topology::run_order(&[name.to_string()], |n| self.dependencies_in(&state, n))?;
            let missing: Vec<String> = order
                .into_iter()
                .filter(|n| state.head(n).is_none())
                .filter(|n| !matches!(state.load(&LoadKey::new(n.as_str(), None)), Some(LoadState::Failed(_))))
                .collect();
            if missing.is_empty() && !state.has_pending_loads() {
                return Ok(());
            }
            for target in missing {
                let key = LoadKey::new(target, None);
                self.start_load(&linker, key, None);
            }
            let _ = self.load_rx.recv_timeout(LOAD_POLL_INTERVAL);
        }
    }

    /// 计算 `name`（其版本为 `module`）的输出；`stack` 是当前的导入链
    fn compute(
        &self,
        name: &str,
        module: &Arc<Module>,
        environment: &Environment,
        stack: &mut Vec<String>,
    ) -> OutputPoll {
        let state = self.snapshot();
        let bindings = state
            .imports_of(name, module)
            .unwrap_or_else(|_| state.continue_imports(name));

        stack.push(name.to_string());
        let mut outcomes = Vec::with_capacity(bindings.len());
        let mut pending = false;
        for binding in bindings {
            match self.resolve_import(name, &binding) {
                ImportTarget::Failed(error) => outcomes.push((binding, ImportOutcome::LoadFailed(error))),
                ImportTarget::Pending => pending = true,
                ImportTarget::Found {
                    name: target,
                    module: target_module,
                } => {
                    if let Some(start) = stack.iter().position(|n| n == &target) {
                        let mut chain = stack[start..].to_vec();
                        chain.push(target);
                        stack.pop();
                        return OutputPoll::Ready(self.cyclic(name, module, environment, &binding, chain));
                    }
                    match self.compute(&target, &target_module, environment, stack) {
                        OutputPoll::Ready(output) => outcomes.push((binding, ImportOutcome::Ready(output))),
                        OutputPoll::Pending => pending = true,
                    }
                }
            }
        }
        stack.pop();

        if pending {
            trace!(target: targets::PROJECT, module = name, "Output pending on loads");
            return OutputPoll::Pending;
        }

        let id = ModuleOutput::output_id(name, module, environment, &outcomes);
        OutputPoll::Ready(self.cached(id, || {
            ModuleOutput::make(MakeParams {
                name,
                module,
                environment,
                limits: &self.limits,
                imports: &outcomes,
                runner: self.runner.as_ref(),
            })
        }))
    }

    /// 导入链上出现环：本模块直接失败
    fn cyclic(
        &self,
        name: &str,
        module: &Arc<Module>,
        environment: &Environment,
        binding: &ImportBinding,
        chain: Vec<String>,
    ) -> Arc<ModuleOutput> {
        warn!(target: targets::PROJECT, chain = %chain.join(" -> "), "Cyclic import");
        let id = OutputIdBuilder::new(name, module.hash(), &hash_environment(environment))
            .cyclic_import(&binding.specifier)
            .finish();
        self.cached(id.clone(), || {
            ModuleOutput::failed(
                id,
                name,
                module.clone(),
                environment,
                ModuleError::Graph(GraphError::Cycle { chain }),
            )
        })
    }

    /// 取缓存或计算一次；同一 id 的并发请求共享一次计算
    fn cached(&self, id: OutputId, make: impl FnOnce() -> ModuleOutput) -> Arc<ModuleOutput> {
        if let Some(output) = self.snapshot().output(&id) {
            trace!(target: targets::PROJECT, id = id.short(), "Output cache hit");
            return output.clone();
        }
        let cell = self.in_flight.lock().entry(id.clone()).or_default().clone();
        let mut made = false;
        let output = cell
            .get_or_init(|| {
                // 另一个线程可能刚刚提交
                if let Some(output) = self.snapshot().output(&id) {
                    return output.clone();
                }
                made = true;
                Arc::new(make())
            })
            .clone();
        if made {
            self.commit(output.clone());
            self.in_flight.lock().remove(&id);
        }
        output
    }

    fn commit(&self, output: Arc<ModuleOutput>) {
        debug!(
            target: targets::PROJECT,
            module = %output.module_name,
            id = output.id.short(),
            ok = output.is_ok(),
            "Committing output"
        );
        let notice = ProjectNotice::OutputCommitted {
            name: output.module_name.clone(),
            id: output.id.clone(),
            ok: output.is_ok(),
        };
        self.store().apply([ProjectEvent::OutputCommitted(output)]);
        self.shared.notify(notice);
    }

    // ===== 导入解析与加载 =====

    fn resolve_import(&self, importer: &str, binding: &ImportBinding) -> ImportTarget {
        let key = ResolutionKey::new(importer, binding.specifier.as_str());
        let target = match self.target_name(importer, binding) {
            Ok(target) => target,
            Err(error) => {
                self.settle(key, Resolution::Failed {
                    target: None,
                    error: error.clone(),
                });
                return ImportTarget::Failed(error);
            }
        };
        let load_key = LoadKey::new(target.as_str(), binding.pin.clone());

        // 第二轮用于并发加载刚刚落地的情况
        for _ in 0..2 {
            let state = self.snapshot();
            let found = match &binding.pin {
                Some(pin) => state.module(pin),
                None => state.head_module(&target),
            };
            if let Some(module) = found {
                self.settle(key, Resolution::Loaded {
                    target: target.clone(),
                    hash: module.hash().to_string(),
                });
                return ImportTarget::Found {
                    name: target,
                    module: module.clone(),
                };
            }
            match state.load(&load_key) {
                Some(LoadState::Failed(error)) => {
                    self.settle(key, Resolution::Failed {
                        target: Some(target),
                        error: error.clone(),
                    });
                    return ImportTarget::Failed(error.clone());
                }
                Some(LoadState::Loading) => return ImportTarget::Pending,
                None => {}
            }

            let Some(linker) = self.linker.clone() else {
                let error = match (&binding.pin, state.head(&target)) {
                    (Some(pin), Some(head)) => LinkError::HashMismatch {
                        name: target.clone(),
                        expected: pin.clone(),
                        actual: head.clone(),
                    },
                    _ => LinkError::NotFound { name: target.clone() },
                };
                self.settle(key, Resolution::Failed {
                    target: Some(target),
                    error: error.clone(),
                });
                return ImportTarget::Failed(error);
            };
            if self.start_load(&linker, load_key.clone(), Some(key.clone())) {
                return ImportTarget::Pending;
            }
        }
        ImportTarget::Pending
    }

    /// 记录解析结果（与现有记录相同则不产生事件）
    fn settle(&self, key: ResolutionKey, resolution: Resolution) {
        self.store().apply_with(|state| {
            if state.resolution(&key) == Some(&resolution) {
                return Vec::new();
            }
            vec![ProjectEvent::ResolutionSettled { key, resolution }]
        });
    }

    /// 发起一次后台加载；同名（同 pin）的加载已在进行或模块已存在时返回 false
    fn start_load(&self, linker: &Arc<dyn Linker>, load_key: LoadKey, resolution: Option<ResolutionKey>) -> bool {
        let started = self.store().apply_with(|state| {
            if state.load(&load_key).is_some() {
                return Vec::new();
            }
            let present = match &load_key.pin {
                Some(pin) => state.module(pin).is_some(),
                None => state.head(&load_key.name).is_some(),
            };
            if present {
                return Vec::new();
            }
            let mut events = vec![ProjectEvent::LoadStarted(load_key.clone())];
            if let Some(key) = resolution {
                events.push(ProjectEvent::ResolutionSettled {
                    key,
                    resolution: Resolution::Loading {
                        target: load_key.name.clone(),
                    },
                });
            }
            events
        });
        if started.is_empty() {
            return false;
        }

        info!(target: targets::PROJECT, module = %load_key.name, pinned = load_key.pin.is_some(), "Loading module");
        let shared = Arc::clone(&self.shared);
        let linker = Arc::clone(linker);
        let done = self.load_tx.clone();
        let key = load_key.clone();
        let spawned = thread::Builder::new()
            .name(format!("gauge-load-{}", load_key.name))
            .spawn(move || {
                let result = load(linker.as_ref(), &key);
                finish_load(&shared, key.clone(), result);
                let _ = done.send(key);
            });
        if let Err(e) = spawned {
            let error = LinkError::Io {
                name: load_key.name.clone(),
                message: format!("failed to spawn loader thread: {e}"),
            };
            finish_load(&self.shared, load_key.clone(), Err(error));
            let _ = self.load_tx.send(load_key);
        }
        true
    }
}

/// 在加载线程上调用 Linker；pin 在这里再校验一次
fn load(linker: &dyn Linker, key: &LoadKey) -> Result<Arc<Module>, LinkError> {
    let source = linker.load_module(&key.name, key.pin.as_deref())?;
    let module = Module::new(source.code);
    match &key.pin {
        Some(pin) if pin != module.hash() => Err(LinkError::HashMismatch {
            name: key.name.clone(),
            expected: pin.clone(),
            actual: module.hash().to_string(),
        }),
        _ => Ok(Arc::new(module)),
    }
}

fn finish_load(shared: &Shared, key: LoadKey, result: Result<Arc<Module>, LinkError>) {
    let notice = match &result {
        Ok(_) => {
            info!(target: targets::PROJECT, module = %key.name, "Module loaded");
            ProjectNotice::ModuleLoaded { name: key.name.clone() }
        }
        Err(error) => {
            warn!(target: targets::PROJECT, module = %key.name, %error, "Module load failed");
            ProjectNotice::LoadFailed {
                name: key.name.clone(),
                error: error.clone(),
            }
        }
    };
    shared.store.apply([ProjectEvent::LoadFinished { key, result }]);
    shared.notify(notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::Value;

    #[test]
    fn test_output_of_unknown_module() {
        let project = Project::default();
        assert!(matches!(
            project.output("nope"),
            Err(GaugeError::Graph(GraphError::UnknownHead(_)))
        ));
    }

    #[test]
    fn test_dependencies_keep_declaration_order() {
        let project = Project::default();
        project.set_source("main", "import \"b\" as b\nimport \"a\" as a\nimport \"b\" as c\n1");
        project.set_continues("main", vec!["base".into()]);
        assert_eq!(project.dependencies("main"), vec!["base", "b", "a"]);
    }

    #[test]
    fn test_set_source_clears_dependent_outputs() {
        let project = Project::default();
        project.set_source("lib", "export x = 1");
        project.set_source("main", "import \"lib\" as lib\nlib.x");
        project.run("main").unwrap();
        assert_eq!(project.snapshot().outputs_of("main").count(), 1);

        project.set_source("lib", "export x = 2");
        assert_eq!(project.snapshot().outputs_of("main").count(), 0);
        let output = project.run("main").unwrap();
        assert_eq!(output.end_result().unwrap(), &Value::Number(2.0));
    }

    #[test]
    fn test_move_head_to_unknown_hash() {
        let project = Project::default();
        project.set_source("a", "1");
        assert!(matches!(
            project.move_head("a", "0000"),
            Err(GaugeError::Graph(GraphError::UnknownModule(_)))
        ));
    }

    #[test]
    fn test_move_head_back_reuses_module() {
        let project = Project::default();
        let first = project.set_source("a", "1");
        project.set_source("a", "2");
        project.move_head("a", &first).unwrap();
        let output = project.run("a").unwrap();
        assert_eq!(output.end_result().unwrap(), &Value::Number(1.0));
    }

    #[test]
    fn test_missing_import_without_linker() {
        let project = Project::default();
        project.set_source("main", "import \"lib\" as lib\n1");
        let output = project.run("main").unwrap();
        match output.error() {
            Some(ModuleError::Import(e)) => assert_eq!(e.binding.specifier, "lib"),
            other => panic!("expected import error, got {other:?}"),
        }
        let resolution = project
            .snapshot()
            .resolution(&ResolutionKey::new("main", "lib"))
            .cloned();
        assert!(matches!(resolution, Some(Resolution::Failed { .. })));
    }

    #[test]
    fn test_cycle_is_a_failed_output() {
        let project = Project::default();
        project.set_source("a", "import \"b\" as b\n1");
        project.set_source("b", "import \"a\" as a\n2");
        assert!(matches!(project.run_order(), Err(GraphError::Cycle { .. })));

        let output = project.run("a").unwrap();
        assert!(!output.is_ok());
        let b = project.run("b").unwrap();
        assert!(!b.is_ok());
    }

    #[test]
    fn test_clean_drops_outputs() {
        let project = Project::default();
        project.set_source("a", "1");
        project.set_source("b", "2");
        project.run_all().unwrap();
        project.clean("a");
        let state = project.snapshot();
        assert_eq!(state.outputs_of("a").count(), 0);
        assert_eq!(state.outputs_of("b").count(), 1);
        project.clean_all();
        assert_eq!(project.snapshot().outputs().count(), 0);
    }

    #[test]
    fn test_subscribe_sees_commits() {
        let project = Project::default();
        let notices = project.subscribe();
        project.set_source("a", "1");
        project.run("a").unwrap();
        match notices.try_recv() {
            Ok(ProjectNotice::OutputCommitted { name, ok, .. }) => {
                assert_eq!(name, "a");
                assert!(ok);
            }
            other => panic!("expected commit notice, got {other:?}"),
        }
    }
}
