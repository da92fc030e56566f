use crate::core::components::ComponentInstance;
use crate::core::couplings::CouplingManager;
use crate::core::events::{Listeners, UpdaterEvent, WorkspaceEvent};
use crate::core::execution::config::{ConcurrencyMode, WorkspaceConfig};
use crate::core::execution::update_manager::UpdateManager;
use crate::core::execution::updater::UpdaterState;
use crate::core::types::ComponentId;
use log::warn;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// State shared by the workspace handle and the scheduler thread.
///
/// Lock order: components, then couplings, then a single component.
pub(crate) struct WorkspaceShared {
    components: RwLock<Vec<ComponentInstance>>,
    couplings: Mutex<CouplingManager>,
    actions: Mutex<UpdateManager>,
    time: AtomicU64,
    state: Mutex<UpdaterState>,
    // Set by `stop()`; whoever flips it first owns the component stop passes
    pub(crate) stop_requested: AtomicBool,
    // Set from inside a step through the update context
    pub(crate) halt_requested: AtomicBool,
    changed: AtomicBool,
    workspace_listeners: Mutex<Listeners<WorkspaceEvent>>,
    updater_listeners: Mutex<Listeners<UpdaterEvent>>,
    pub(crate) config: WorkspaceConfig,
    pool: Option<rayon::ThreadPool>,
}

impl WorkspaceShared {
    pub(crate) fn new(config: WorkspaceConfig) -> Self {
        let pool = match config.concurrency_mode {
            ConcurrencyMode::Sequential => None,
            ConcurrencyMode::Rayon => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(size) = config.thread_pool_size {
                    builder = builder.num_threads(size);
                }
                match builder.build() {
                    Ok(pool) => Some(pool),
                    Err(err) => {
                        warn!("Falling back to sequential updates: {}", err);
                        None
                    }
                }
            }
        };

        Self {
            components: RwLock::new(Vec::new()),
            couplings: Mutex::new(CouplingManager::new()),
            actions: Mutex::new(UpdateManager::with_defaults(&[])),
            time: AtomicU64::new(0),
            state: Mutex::new(UpdaterState::Idle),
            stop_requested: AtomicBool::new(false),
            halt_requested: AtomicBool::new(false),
            changed: AtomicBool::new(false),
            workspace_listeners: Mutex::new(Listeners::new()),
            updater_listeners: Mutex::new(Listeners::new()),
            config,
            pool,
        }
    }

    pub(crate) fn components(&self) -> RwLockReadGuard<'_, Vec<ComponentInstance>> {
        self.components.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn components_mut(&self) -> RwLockWriteGuard<'_, Vec<ComponentInstance>> {
        self.components.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the component list, so no list lock is held while a component runs
    pub(crate) fn component_list(&self) -> Vec<ComponentInstance> {
        self.components().clone()
    }

    pub(crate) fn find_component(&self, id: &ComponentId) -> Option<ComponentInstance> {
        self.components().iter().find(|c| &c.id == id).cloned()
    }

    pub(crate) fn couplings(&self) -> MutexGuard<'_, CouplingManager> {
        self.couplings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn actions(&self) -> MutexGuard<'_, UpdateManager> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, UpdaterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, state: UpdaterState) {
        *self.state() = state;
    }

    pub(crate) fn time(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    pub(crate) fn set_time(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }

    /// Advance time by one step and return the new value
    pub(crate) fn advance_time(&self) -> u64 {
        self.time.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_changed(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    pub(crate) fn set_changed(&self, changed: bool) {
        self.changed.store(changed, Ordering::SeqCst);
    }

    pub(crate) fn pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool.as_ref()
    }

    /// True once a stop has been asked for from either side
    pub(crate) fn should_halt(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst) || self.halt_requested.load(Ordering::SeqCst)
    }

    /// Claim the component stop passes. Only the first caller after a start wins.
    pub(crate) fn claim_stop(&self) -> bool {
        self.stop_requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn reset_stop_flags(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
        self.halt_requested.store(false, Ordering::SeqCst);
    }

    pub(crate) fn workspace_listeners(&self) -> MutexGuard<'_, Listeners<WorkspaceEvent>> {
        self.workspace_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn updater_listeners(&self) -> MutexGuard<'_, Listeners<UpdaterEvent>> {
        self.updater_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn fire_workspace(&self, event: WorkspaceEvent) {
        self.workspace_listeners().fire(&event);
    }

    pub(crate) fn fire_updater(&self, event: UpdaterEvent) {
        self.updater_listeners().fire(&event);
    }

    pub(crate) fn start_components(&self) {
        for instance in self.component_list() {
            instance.lock().start();
        }
    }

    pub(crate) fn stop_components(&self) {
        for instance in self.component_list() {
            instance.lock().stop();
        }
    }

    pub(crate) fn notify_stopped(&self) {
        for instance in self.component_list() {
            instance.lock().do_stopped();
        }
    }

    pub(crate) fn replace_couplings(&self, manager: CouplingManager) {
        *self.couplings() = manager;
    }
}
