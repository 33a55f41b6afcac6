//! The unit of extension.

use std::sync::Arc;

use async_trait::async_trait;

use cogwork_core::BoxedEvent;

/// An independently loadable unit of bot functionality.
///
/// A module contributes commands (registered with the dispatcher by
/// whatever loads the module) and receives every platform event through
/// [`on_event`](Module::on_event). Background work it spawns through
/// [`ModuleManager::add_background_task`] is owned by the module: unloading
/// cancels every task still running.
///
/// [`ModuleManager::add_background_task`]: crate::manager::ModuleManager::add_background_task
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Unique module name; commands reference their owner by it.
    fn name(&self) -> &str;

    /// One-line human description.
    fn description(&self) -> &str {
        ""
    }

    /// Called once when the module is enabled, before any events arrive.
    async fn on_enable(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every platform event. Errors are logged by the fan-out
    /// and never affect sibling modules.
    async fn on_event(&self, event: &BoxedEvent) -> anyhow::Result<()> {
        let _ = event;
        Ok(())
    }
}

/// Shared handle to a loaded module.
///
/// Module identity is the `Arc` allocation itself: the manager compares
/// handles with [`Arc::ptr_eq`], so keep the handle you loaded if you
/// intend to unload later.
pub type SharedModule = Arc<dyn Module>;
