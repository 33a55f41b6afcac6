//! Module lifecycle, background-task ownership, and event fan-out.
//!
//! [`ModuleManager`] is the central owner of all loaded modules. It:
//!
//! - Keeps modules in load order and drives their `on_enable` hooks.
//! - Tracks every background task a module spawns, so unloading a module
//!   cancels its tasks before the module leaves the registry.
//! - Owns the persisted [`ParamStore`].
//! - Fans platform events out to every loaded module, isolating each
//!   module's failures from its siblings and from the event loop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock as AsyncRwLock;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use cogwork_core::{BoxedEvent, EventSink};

use crate::error::{ModuleError, ParamError};
use crate::module::SharedModule;
use crate::params::ParamStore;

// ============================================================================
// Task ownership
// ============================================================================

/// Identifier of one owned background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// The set of background tasks a loaded module currently owns.
///
/// A task is present from the moment it is spawned until it completes
/// naturally (success, failure or cancellation) or is cancelled by module
/// unload. Removal is idempotent; aborting an already-finished task is a
/// no-op.
#[derive(Default)]
struct TaskSet {
    handles: Mutex<HashMap<TaskId, AbortHandle>>,
}

impl TaskSet {
    fn insert(&self, id: TaskId, handle: AbortHandle) {
        self.handles.lock().insert(id, handle);
    }

    fn remove(&self, id: TaskId) {
        self.handles.lock().remove(&id);
    }

    fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Requests cancellation of every owned task and drains the set.
    fn cancel_all(&self) -> Vec<TaskId> {
        let drained: Vec<(TaskId, AbortHandle)> = self.handles.lock().drain().collect();
        drained
            .into_iter()
            .map(|(id, handle)| {
                handle.abort();
                id
            })
            .collect()
    }
}

struct LoadedModule {
    module: SharedModule,
    tasks: Arc<TaskSet>,
}

// ============================================================================
// ModuleManager
// ============================================================================

/// Owner of all loaded modules, their background tasks, and the parameter
/// store.
///
/// Load order is insertion order; the fan-out and `enable_all` iterate in
/// that order. Module identity is the `Arc` allocation; loading the same
/// handle twice is the caller's mistake, not checked here.
pub struct ModuleManager {
    modules: AsyncRwLock<Vec<LoadedModule>>,
    params: ParamStore,
    next_task_id: AtomicU64,
}

impl ModuleManager {
    /// Creates a manager whose parameter snapshot lives at `params_path`.
    ///
    /// Call [`load_params`](Self::load_params) once at startup before
    /// reading any parameter.
    pub fn new(params_path: impl Into<PathBuf>) -> Self {
        Self {
            modules: AsyncRwLock::new(Vec::new()),
            params: ParamStore::new(params_path),
            next_task_id: AtomicU64::new(0),
        }
    }

    // ─── Module lifecycle ────────────────────────────────────────────────

    /// Appends a module to the registry.
    pub async fn load_module(&self, module: SharedModule) {
        let name = module.name().to_string();
        self.modules.write().await.push(LoadedModule {
            module,
            tasks: Arc::new(TaskSet::default()),
        });
        info!(module = %name, "Module loaded");
    }

    /// Runs every loaded module's `on_enable` hook in load order.
    ///
    /// A failing hook is logged and does not stop the remaining modules.
    pub async fn enable_all(&self) {
        let modules: Vec<SharedModule> = {
            let list = self.modules.read().await;
            list.iter().map(|m| Arc::clone(&m.module)).collect()
        };

        for module in modules {
            match module.on_enable().await {
                Ok(()) => info!(module = %module.name(), "Module enabled"),
                Err(e) => error!(
                    module = %module.name(),
                    error = %format!("{e:#}"),
                    "Module failed to enable"
                ),
            }
        }
    }

    /// Cancels every task the module owns, then removes the module.
    ///
    /// Identity is pointer equality on the `Arc` handle. Unloading a module
    /// that is not loaded fails with [`ModuleError::NotLoaded`].
    pub async fn unload_module(&self, module: &SharedModule) -> Result<(), ModuleError> {
        let mut modules = self.modules.write().await;
        let pos = modules
            .iter()
            .position(|m| Arc::ptr_eq(&m.module, module))
            .ok_or_else(|| ModuleError::NotLoaded(module.name().to_string()))?;

        for id in modules[pos].tasks.cancel_all() {
            info!(module = %module.name(), task = id.0, "Cancelled owned task");
        }

        let entry = modules.remove(pos);
        info!(module = %entry.module.name(), "Module unloaded");
        Ok(())
    }

    /// Number of loaded modules.
    pub async fn module_count(&self) -> usize {
        self.modules.read().await.len()
    }

    // ─── Background tasks ────────────────────────────────────────────────

    /// Schedules `task` for independent execution on behalf of `module`.
    ///
    /// The task's abort handle enters the module's owned set immediately; a
    /// watcher removes it again when the task completes naturally, so the
    /// set only ever holds live work. The caller is never blocked on the
    /// task itself.
    pub async fn add_background_task(
        &self,
        task: BoxFuture<'static, ()>,
        module: &SharedModule,
    ) -> Result<TaskId, ModuleError> {
        let tasks = {
            let modules = self.modules.read().await;
            let entry = modules
                .iter()
                .find(|m| Arc::ptr_eq(&m.module, module))
                .ok_or_else(|| ModuleError::NotLoaded(module.name().to_string()))?;
            Arc::clone(&entry.tasks)
        };

        let id = TaskId(self.next_task_id.fetch_add(1, Ordering::Relaxed));
        let handle = tokio::spawn(task);
        tasks.insert(id, handle.abort_handle());
        debug!(module = %module.name(), task = id.0, "Background task scheduled");

        tokio::spawn(async move {
            // Natural completion, failure and cancellation all end up here;
            // the owned set must not keep handles to finished work.
            let _ = handle.await;
            tasks.remove(id);
        });

        Ok(id)
    }

    /// Number of live tasks the module owns right now.
    pub async fn owned_task_count(&self, module: &SharedModule) -> Result<usize, ModuleError> {
        let modules = self.modules.read().await;
        let entry = modules
            .iter()
            .find(|m| Arc::ptr_eq(&m.module, module))
            .ok_or_else(|| ModuleError::NotLoaded(module.name().to_string()))?;
        Ok(entry.tasks.len())
    }

    // ─── Parameter store ─────────────────────────────────────────────────

    /// The underlying parameter store.
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    /// Loads the parameter snapshot; see [`ParamStore::load`].
    pub async fn load_params(&self) -> Result<(), ParamError> {
        self.params.load().await
    }

    /// Persists the parameter snapshot; see [`ParamStore::save`].
    pub async fn save_params(&self) -> Result<(), ParamError> {
        self.params.save().await
    }

    /// First-write-wins parameter initialisation; see [`ParamStore::add`].
    pub async fn add_param(&self, key: &str, default: impl Serialize) -> Result<(), ParamError> {
        self.params.add(key, default).await
    }

    /// Overwrites a parameter; see [`ParamStore::set`].
    pub async fn set_param(
        &self,
        key: &str,
        value: impl Serialize,
        persist: bool,
    ) -> Result<(), ParamError> {
        self.params.set(key, value, persist).await
    }

    /// Reads a parameter; a miss is a hard error.
    pub fn get_param<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParamError> {
        self.params.get(key)
    }

    // ─── Event fan-out ───────────────────────────────────────────────────

    /// Forwards `event` to every loaded module, detached from the caller.
    ///
    /// One task walks the modules sequentially in load order; a failing
    /// hook is logged and never affects its siblings or the caller.
    pub fn dispatch_event(self: &Arc<Self>, event: BoxedEvent) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_modules_event(event).await;
        });
    }

    async fn run_modules_event(&self, event: BoxedEvent) {
        let modules: Vec<SharedModule> = {
            let list = self.modules.read().await;
            list.iter().map(|m| Arc::clone(&m.module)).collect()
        };

        for module in modules {
            if let Err(e) = module.on_event(&event).await {
                error!(
                    module = %module.name(),
                    event = event.event_name(),
                    error = %format!("{e:#}"),
                    "Module event hook failed"
                );
            }
        }
    }
}

impl EventSink for Arc<ModuleManager> {
    fn dispatch(&self, event: BoxedEvent) {
        ModuleManager::dispatch_event(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::testing::FakeEvent;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct Plain {
        name: &'static str,
    }

    #[async_trait]
    impl Module for Plain {
        fn name(&self) -> &str {
            self.name
        }
    }

    fn plain(name: &'static str) -> SharedModule {
        Arc::new(Plain { name })
    }

    fn manager_in(dir: &tempfile::TempDir) -> Arc<ModuleManager> {
        Arc::new(ModuleManager::new(dir.path().join("params.json")))
    }

    #[tokio::test]
    async fn load_and_unload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let module = plain("greeter");

        manager.load_module(Arc::clone(&module)).await;
        assert_eq!(manager.module_count().await, 1);

        manager.unload_module(&module).await.unwrap();
        assert_eq!(manager.module_count().await, 0);
    }

    #[tokio::test]
    async fn unloading_an_unknown_module_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let module = plain("ghost");

        let result = manager.unload_module(&module).await;
        assert!(matches!(result, Err(ModuleError::NotLoaded(_))));
    }

    #[tokio::test]
    async fn finished_task_leaves_the_owned_set() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let module = plain("worker");
        manager.load_module(Arc::clone(&module)).await;

        manager
            .add_background_task(Box::pin(async {}), &module)
            .await
            .unwrap();

        // The watcher runs on the same runtime; give it a beat.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.owned_task_count(&module).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unload_cancels_running_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let module = plain("worker");
        manager.load_module(Arc::clone(&module)).await;

        // A guard whose Drop observes the task dying, however it dies.
        struct DropFlag(Arc<AtomicUsize>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicUsize::new(0));
        let flag = DropFlag(Arc::clone(&dropped));
        manager
            .add_background_task(
                Box::pin(async move {
                    let _flag = flag;
                    // Would run forever without cancellation.
                    loop {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                    }
                }),
                &module,
            )
            .await
            .unwrap();
        assert_eq!(manager.owned_task_count(&module).await.unwrap(), 1);

        manager.unload_module(&module).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(dropped.load(Ordering::SeqCst), 1, "task future not dropped");
    }

    #[tokio::test]
    async fn tasks_cannot_attach_to_unloaded_modules() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let module = plain("absent");

        let result = manager
            .add_background_task(Box::pin(async {}), &module)
            .await;
        assert!(matches!(result, Err(ModuleError::NotLoaded(_))));
    }

    struct Recorder {
        name: &'static str,
        seen: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Module for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_event(&self, _event: &BoxedEvent) -> anyhow::Result<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("scripted failure");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn fan_out_isolates_failing_modules() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);

        let first_seen = Arc::new(AtomicUsize::new(0));
        let second_seen = Arc::new(AtomicUsize::new(0));

        manager
            .load_module(Arc::new(Recorder {
                name: "faulty",
                seen: Arc::clone(&first_seen),
                fail: true,
            }))
            .await;
        manager
            .load_module(Arc::new(Recorder {
                name: "healthy",
                seen: Arc::clone(&second_seen),
                fail: false,
            }))
            .await;

        // Through the transport-facing seam, as a real caller would.
        let sink: &dyn EventSink = &manager;
        sink.dispatch(BoxedEvent::new(FakeEvent::new("on_message", "hi")));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(first_seen.load(Ordering::SeqCst), 1);
        assert_eq!(second_seen.load(Ordering::SeqCst), 1);
    }
}
