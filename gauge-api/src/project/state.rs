//! 项目状态
//!
//! `ProjectState` 是不可变快照；所有修改都表示为 `ProjectEvent`，
//! 由 `ProjectStore` 在写锁下依次应用并递增版本号。读者持有
//! `Arc<ProjectState>`，永远看不到更新到一半的图。

use super::hash::{ModuleHash, OutputId};
use super::module::{ImportBinding, Module};
use super::output::ModuleOutput;
use super::resolution::{LoadKey, LoadState, Resolution, ResolutionKey};
use crate::error::LinkError;
use gauge_config::{targets, Environment};
use gauge_core::CompileError;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    /// 按内容哈希存放的模块
    modules: HashMap<ModuleHash, Arc<Module>>,
    /// 模块名 -> 当前版本
    heads: BTreeMap<String, ModuleHash>,
    /// 模块名 -> 平铺导入的模块名
    continues: HashMap<String, Vec<String>>,
    /// 模块名 -> (说明符 -> 固定哈希)
    pins: HashMap<String, BTreeMap<String, ModuleHash>>,
    resolutions: HashMap<ResolutionKey, Resolution>,
    loads: HashMap<LoadKey, LoadState>,
    outputs: HashMap<OutputId, Arc<ModuleOutput>>,
    environment: Environment,
    version: u64,
}

// ===== 查询 =====

impl ProjectState {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn module(&self, hash: &str) -> Option<&Arc<Module>> {
        self.modules.get(hash)
    }

    pub fn head(&self, name: &str) -> Option<&ModuleHash> {
        self.heads.get(name)
    }

    /// head 指向的模块
    pub fn head_module(&self, name: &str) -> Option<&Arc<Module>> {
        self.heads.get(name).and_then(|hash| self.modules.get(hash))
    }

    /// 所有具名模块，按名字排序
    pub fn module_names(&self) -> Vec<String> {
        self.heads.keys().cloned().collect()
    }

    pub fn continues(&self, name: &str) -> &[String] {
        self.continues.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pins(&self, name: &str) -> Option<&BTreeMap<String, ModuleHash>> {
        self.pins.get(name)
    }

    pub fn resolution(&self, key: &ResolutionKey) -> Option<&Resolution> {
        self.resolutions.get(key)
    }

    pub fn load(&self, key: &LoadKey) -> Option<&LoadState> {
        self.loads.get(key)
    }

    /// 是否有加载在进行中
    pub fn has_pending_loads(&self) -> bool {
        self.loads.values().any(|l| matches!(l, LoadState::Loading))
    }

    pub fn output(&self, id: &OutputId) -> Option<&Arc<ModuleOutput>> {
        self.outputs.get(id)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Arc<ModuleOutput>> {
        self.outputs.values()
    }

    /// 某模块名已提交的输出
    pub fn outputs_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<ModuleOutput>> + 'a {
        self.outputs.values().filter(move |o| o.module_name == name)
    }

    /// 模块的全部导入：先 continues，再源码里的命名导入；pins 按说明符套用
    pub fn imports_of(&self, name: &str, module: &Module) -> Result<Vec<ImportBinding>, CompileError> {
        let mut imports: Vec<ImportBinding> = self
            .continues(name)
            .iter()
            .map(ImportBinding::continues)
            .collect();
        imports.extend(module.named_imports()?);
        if let Some(pins) = self.pins.get(name) {
            for import in &mut imports {
                import.pin = pins.get(&import.specifier).cloned();
            }
        }
        Ok(imports)
    }

    /// 解析失败时仍然可知的导入（只有 continues）
    pub fn continue_imports(&self, name: &str) -> Vec<ImportBinding> {
        self.continues(name).iter().map(ImportBinding::continues).collect()
    }
}

// ===== 事件 =====

/// 对项目状态的一次修改
#[derive(Debug, Clone)]
pub enum ProjectEvent {
    /// 加入模块并把 head 指向它；同名的旧输出失效
    SourceSet { name: String, module: Arc<Module> },
    /// 删除 head 及其 continues / pins；依赖它的模块保持原样
    SourceRemoved { name: String },
    HeadMoved { head: String, hash: ModuleHash },
    ContinuesSet { name: String, continues: Vec<String> },
    PinsSet { name: String, pins: BTreeMap<String, ModuleHash> },
    EnvironmentSet(Environment),
    ResolutionSettled { key: ResolutionKey, resolution: Resolution },
    LoadStarted(LoadKey),
    LoadFinished { key: LoadKey, result: Result<Arc<Module>, LinkError> },
    OutputCommitted(Arc<ModuleOutput>),
    /// 丢弃这些模块名的全部输出
    OutputsCleared { names: Vec<String> },
}

impl ProjectState {
    fn apply(&mut self, event: ProjectEvent) {
        match event {
            ProjectEvent::SourceSet { name, module } => {
                let hash = module.hash().to_string();
                self.modules.entry(hash.clone()).or_insert(module);
                self.loads.retain(|key, _| key.name != name);
                self.outputs.retain(|_, o| o.module_name != name);
                self.heads.insert(name, hash);
            }
            ProjectEvent::SourceRemoved { name } => {
                self.heads.remove(&name);
                self.continues.remove(&name);
                self.pins.remove(&name);
                self.outputs.retain(|_, o| o.module_name != name);
                self.resolutions.retain(|key, _| key.importer != name);
            }
            ProjectEvent::HeadMoved { head, hash } => {
                self.outputs.retain(|_, o| o.module_name != head);
                self.heads.insert(head, hash);
            }
            ProjectEvent::ContinuesSet { name, continues } => {
                self.outputs.retain(|_, o| o.module_name != name);
                self.continues.insert(name, continues);
            }
            ProjectEvent::PinsSet { name, pins } => {
                self.outputs.retain(|_, o| o.module_name != name);
                self.pins.insert(name, pins);
            }
            ProjectEvent::EnvironmentSet(environment) => {
                self.environment = environment;
            }
            ProjectEvent::ResolutionSettled { key, resolution } => {
                self.resolutions.insert(key, resolution);
            }
            ProjectEvent::LoadStarted(key) => {
                self.loads.insert(key, LoadState::Loading);
            }
            ProjectEvent::LoadFinished { key, result } => match result {
                Ok(module) => {
                    let hash = module.hash().to_string();
                    self.modules.entry(hash.clone()).or_insert(module);
                    // 加载期间有人 set_source 过，以那次为准
                    self.heads.entry(key.name.clone()).or_insert(hash);
                    self.loads.remove(&key);
                }
                Err(error) => {
                    self.loads.insert(key, LoadState::Failed(error));
                }
            },
            ProjectEvent::OutputCommitted(output) => {
                self.outputs.insert(output.id.clone(), output);
            }
            ProjectEvent::OutputsCleared { names } => {
                self.outputs.retain(|_, o| !names.contains(&o.module_name));
            }
        }
    }
}

/// 单写者、带版本号的状态存储
#[derive(Debug, Default)]
pub struct ProjectStore {
    state: RwLock<Arc<ProjectState>>,
}

impl ProjectStore {
    pub fn new(environment: Environment) -> Self {
        Self {
            state: RwLock::new(Arc::new(ProjectState {
                environment,
                ..ProjectState::default()
            })),
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<ProjectState> {
        self.state.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// 应用一组事件，返回新版本号
    pub fn apply(&self, events: impl IntoIterator<Item = ProjectEvent>) -> u64 {
        let mut guard = self.state.write();
        let state = Arc::make_mut(&mut guard);
        for event in events {
            trace!(target: targets::PROJECT, ?event, "Applying event");
            state.apply(event);
        }
        state.version += 1;
        state.version
    }

    /// 在写锁下根据当前状态决定要应用的事件（检查与修改不会被其他写者打断）
    pub fn apply_with(&self, decide: impl FnOnce(&ProjectState) -> Vec<ProjectEvent>) -> Vec<ProjectEvent> {
        let mut guard = self.state.write();
        let events = decide(&guard);
        if !events.is_empty() {
            let state = Arc::make_mut(&mut guard);
            for event in events.iter().cloned() {
                trace!(target: targets::PROJECT, ?event, "Applying event");
                state.apply(event);
            }
            state.version += 1;
        }
        events
    }
}
