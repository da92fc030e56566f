use crate::core::components::naming::{default_name, is_taken};
use crate::core::components::{share, ComponentInstance, SharedComponent, WorkspaceComponent};
use crate::core::couplings::{Coupling, CouplingEvent, CouplingManager};
use crate::core::error::WorkspaceError;
use crate::core::events::{UpdaterEvent, WorkspaceEvent};
use crate::core::execution::config::WorkspaceConfig;
use crate::core::execution::context::UpdateContext;
use crate::core::execution::update_action::UpdateAction;
use crate::core::execution::update_manager::UpdateManager;
use crate::core::execution::updater::{Updater, UpdaterState};
use crate::core::types::{ComponentId, ContainerKey};
use crate::core::workspace::shared::WorkspaceShared;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, MutexGuard, PoisonError};

/// The only runtime value a saved workspace carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub time: u64,
}

/// Hosts components, couples their attributes and steps them together.
///
/// Dropping a workspace that is running or iterating stops it the way
/// [`Workspace::stop`] does (`stop()` and `do_stopped()` on every component),
/// then joins the scheduler thread. Components are not closed on drop.
///
/// # Example
///
/// ```no_run
/// use simweave::Workspace;
/// # fn demo() -> Result<(), simweave::WorkspaceError> {
/// let workspace = Workspace::new();
/// workspace.iterate_n(10)?;
/// assert_eq!(workspace.time(), 10);
/// # Ok(())
/// # }
/// ```
pub struct Workspace {
    shared: Arc<WorkspaceShared>,
    updater: Updater,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_config(WorkspaceConfig::default())
    }

    pub fn with_config(config: WorkspaceConfig) -> Self {
        let shared = Arc::new(WorkspaceShared::new(config));
        let updater = Updater::new(Arc::clone(&shared));
        Self { shared, updater }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.shared.config
    }

    /// Add a component, naming it `"<Kind> <n>"` unless it prefers a name
    ///
    /// The component is tracked by the coupling manager and gets an update
    /// action in the pipeline.
    ///
    /// # Arguments
    /// * `component` - The component to host
    ///
    /// # Returns
    /// The id the component was registered under
    ///
    /// # Errors
    /// `DuplicateComponent` if the component's preferred name is taken
    pub fn add_component<C: WorkspaceComponent + 'static>(
        &self,
        component: C,
    ) -> Result<ComponentId, WorkspaceError> {
        self.add_shared_component(share(component))
    }

    /// Add a component the caller keeps a handle to
    pub fn add_shared_component(&self, component: SharedComponent) -> Result<ComponentId, WorkspaceError> {
        let (kind, preferred) = {
            let guard = component.lock().unwrap_or_else(PoisonError::into_inner);
            (guard.kind().to_string(), guard.name())
        };

        let id = {
            let mut components = self.shared.components_mut();
            let existing: Vec<ComponentId> = components.iter().map(|c| c.id.clone()).collect();
            let name = match preferred {
                Some(name) if is_taken(&name, &existing) => {
                    return Err(WorkspaceError::DuplicateComponent(name));
                }
                Some(name) => name,
                None => default_name(&kind, &existing),
            };
            let id = ComponentId::new(name, kind);
            let instance = ComponentInstance::new(id.clone(), component);
            components.push(instance.clone());
            self.shared.couplings().track_component(instance);
            id
        };

        self.shared.actions().add_component_action(&id);
        self.shared.set_changed(true);
        debug!("Added component {}", id);
        self.shared
            .fire_workspace(WorkspaceEvent::ComponentAdded(id.clone()));
        Ok(id)
    }

    /// Close a component and purge everything that referenced it
    ///
    /// # Arguments
    /// * `name` - The component's name, as in its [`ComponentId`]
    ///
    /// # Errors
    /// `ComponentNotFound` if no component has that name
    pub fn remove_component(&self, name: &str) -> Result<(), WorkspaceError> {
        let instance = {
            let mut components = self.shared.components_mut();
            let index = components
                .iter()
                .position(|c| c.name() == name)
                .ok_or_else(|| WorkspaceError::ComponentNotFound(name.to_string()))?;
            components.remove(index)
        };

        instance.lock().close();
        self.shared.couplings().untrack_component(&instance.id);
        self.shared.actions().remove_component_action(&instance.id);
        self.shared.set_changed(true);
        debug!("Removed component {}", instance.id);
        self.shared
            .fire_workspace(WorkspaceEvent::ComponentRemoved(instance.id));
        Ok(())
    }

    pub fn component(&self, name: &str) -> Option<ComponentInstance> {
        self.shared
            .components()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    pub fn component_id(&self, name: &str) -> Option<ComponentId> {
        self.component(name).map(|c| c.id)
    }

    /// Components in registration order
    pub fn components(&self) -> Vec<ComponentInstance> {
        self.shared.component_list()
    }

    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.shared.components().iter().map(|c| c.id.clone()).collect()
    }

    /// Start every component and step until stopped. Returns immediately.
    ///
    /// # Errors
    /// `Busy` unless the updater is idle
    pub fn run(&self) -> Result<(), WorkspaceError> {
        info!("Workspace run started at time {}", self.time());
        self.updater.run()
    }

    /// Stop a run or iteration and wait for the scheduler to settle
    ///
    /// When this returns, every component has seen `stop()` and
    /// `do_stopped()` once and the updater is idle again.
    ///
    /// # Errors
    /// `Scheduler` when called from inside a step; use
    /// [`UpdateContext::request_stop`] there
    pub fn stop(&self) -> Result<(), WorkspaceError> {
        self.updater.stop()
    }

    /// Run a single step
    pub fn iterate(&self) -> Result<u64, WorkspaceError> {
        self.iterate_n(1)
    }

    /// Run exactly `steps` steps, blocking until they finish
    ///
    /// # Arguments
    /// * `steps` - Number of steps to run
    ///
    /// # Returns
    /// The workspace time after the last step
    ///
    /// # Errors
    /// `Busy` unless idle, or the failing action's error under
    /// [`ErrorPolicy::Abort`](crate::core::execution::ErrorPolicy::Abort)
    pub fn iterate_n(&self, steps: u64) -> Result<u64, WorkspaceError> {
        self.updater.iterate(steps)
    }

    /// Run `steps` steps without blocking; `on_finished` runs on the scheduler thread
    pub fn iterate_with<F>(&self, steps: u64, on_finished: F) -> Result<(), WorkspaceError>
    where
        F: FnOnce(Result<u64, WorkspaceError>) + Send + 'static,
    {
        self.updater.iterate_with(steps, Box::new(on_finished))
    }

    /// Step while `predicate(time)` holds, blocking until it fails
    pub fn iterate_while<F>(&self, predicate: F) -> Result<u64, WorkspaceError>
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        self.updater.iterate_while(Box::new(predicate))
    }

    pub fn state(&self) -> UpdaterState {
        self.updater.state()
    }

    pub fn is_running(&self) -> bool {
        self.updater.is_running()
    }

    /// Remove every component and return to time zero with the default pipeline
    ///
    /// Components are closed and purged one at a time, so coupling listeners
    /// see each purge before the coupling manager is replaced. Custom
    /// actions are dropped, non-removable ones included.
    pub fn clear_workspace(&self) -> Result<(), WorkspaceError> {
        self.stop()?;

        let removed: Vec<ComponentInstance> = self.shared.components_mut().drain(..).collect();
        for instance in &removed {
            instance.lock().close();
            self.shared.couplings().untrack_component(&instance.id);
        }
        self.shared.replace_couplings(CouplingManager::new());
        self.shared.actions().set_default_actions(&[]);
        self.shared.set_time(0);
        self.shared.set_changed(false);
        for instance in removed {
            self.shared
                .fire_workspace(WorkspaceEvent::ComponentRemoved(instance.id));
        }
        info!("Workspace cleared");
        self.shared.fire_workspace(WorkspaceEvent::WorkspaceCleared);
        Ok(())
    }

    pub fn time(&self) -> u64 {
        self.shared.time()
    }

    pub fn reset_time(&self) {
        self.shared.set_time(0);
    }

    pub fn saved_state(&self) -> WorkspaceState {
        WorkspaceState { time: self.time() }
    }

    pub fn restore_state(&self, state: WorkspaceState) {
        self.shared.set_time(state.time);
    }

    /// True if the workspace or any component changed since the last save
    pub fn changes_exist(&self) -> bool {
        self.shared.is_changed()
            || self
                .shared
                .component_list()
                .iter()
                .any(|c| c.lock().has_changed_since_last_save())
    }

    pub fn set_workspace_changed(&self, changed: bool) {
        self.shared.set_changed(changed);
    }

    /// Clear the changed flag on the workspace and every component
    pub fn mark_saved(&self) {
        self.shared.set_changed(false);
        for instance in self.shared.component_list() {
            instance.lock().set_changed_since_last_save(false);
        }
    }

    /// Locked access to the couplings. Do not hold across a step.
    pub fn coupling_manager(&self) -> MutexGuard<'_, CouplingManager> {
        self.shared.couplings()
    }

    /// Locked access to the pipeline. Do not hold across a step.
    pub fn update_manager(&self) -> MutexGuard<'_, UpdateManager> {
        self.shared.actions()
    }

    /// Append a custom action to the pipeline
    pub fn add_update_action<F>(&self, description: &str, body: F)
    where
        F: Fn(&UpdateContext<'_>) -> Result<(), WorkspaceError> + Send + Sync + 'static,
    {
        self.shared
            .actions()
            .add_action(UpdateAction::new(description, body));
    }

    /// Insert a custom action at `position`, appending when past the end
    pub fn add_update_action_at<F>(&self, position: usize, description: &str, body: F)
    where
        F: Fn(&UpdateContext<'_>) -> Result<(), WorkspaceError> + Send + Sync + 'static,
    {
        self.shared
            .actions()
            .add_action_at(position, UpdateAction::new(description, body));
    }

    /// Purge a container a component has retired
    pub fn retire_attribute_container(&self, container: &ContainerKey) -> Vec<Coupling> {
        self.shared.couplings().remove_attribute_container(container)
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&WorkspaceEvent) + Send + Sync + 'static,
    {
        self.shared.workspace_listeners().subscribe(listener);
    }

    pub fn subscribe_updater<F>(&self, listener: F)
    where
        F: Fn(&UpdaterEvent) + Send + Sync + 'static,
    {
        self.shared.updater_listeners().subscribe(listener);
    }

    /// Listen to coupling changes. Listeners are dropped by `clear_workspace`.
    pub fn subscribe_couplings<F>(&self, listener: F)
    where
        F: Fn(&CouplingEvent) + Send + Sync + 'static,
    {
        self.shared.couplings().subscribe(listener);
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("time", &self.time())
            .field("state", &self.state())
            .field("components", &self.component_ids())
            .finish()
    }
}
