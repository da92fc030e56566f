use crate::core::components::ComponentInstance;
use crate::core::couplings::CouplingManager;
use crate::core::error::WorkspaceError;
use crate::core::events::UpdaterEvent;
use crate::core::types::ComponentId;
use crate::core::workspace::shared::WorkspaceShared;
use log::trace;
use rayon::prelude::*;
use std::sync::atomic::Ordering;

/// What an update action can reach while a step runs
pub struct UpdateContext<'a> {
    shared: &'a WorkspaceShared,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(shared: &'a WorkspaceShared) -> Self {
        Self { shared }
    }

    /// Time of the step in progress; advances after the last action
    pub fn time(&self) -> u64 {
        self.shared.time()
    }

    pub fn components(&self) -> Vec<ComponentInstance> {
        self.shared.component_list()
    }

    pub fn component(&self, name: &str) -> Option<ComponentInstance> {
        self.shared
            .components()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Update one component, skipping it when its updates are off
    pub fn update_component(&self, id: &ComponentId) -> Result<(), WorkspaceError> {
        let instance = self
            .shared
            .find_component(id)
            .ok_or_else(|| WorkspaceError::ComponentNotFound(id.to_string()))?;
        self.run_component(&instance)
    }

    /// Update every update-enabled component.
    ///
    /// Runs on the workspace's thread pool when one is configured; otherwise
    /// in registration order. Every component is attempted and the first
    /// failure in registration order is returned.
    pub fn update_all_components(&self) -> Result<(), WorkspaceError> {
        let components = self.shared.component_list();
        let results: Vec<Result<(), WorkspaceError>> = match self.shared.pool() {
            Some(pool) => pool.install(|| {
                components
                    .par_iter()
                    .map(|instance| self.run_component(instance))
                    .collect()
            }),
            None => components
                .iter()
                .map(|instance| self.run_component(instance))
                .collect(),
        };
        results.into_iter().collect()
    }

    /// Propagate every coupling
    pub fn update_couplings(&self) -> Result<(), WorkspaceError> {
        self.shared.couplings().update_couplings()?;
        self.shared.fire_updater(UpdaterEvent::CouplingsUpdated { time: self.time() });
        Ok(())
    }

    /// Run `f` with the coupling manager locked
    pub fn with_couplings<R>(&self, f: impl FnOnce(&mut CouplingManager) -> R) -> R {
        f(&mut self.shared.couplings())
    }

    /// Ask the loop to end after the current step
    pub fn request_stop(&self) {
        trace!("Stop requested from inside step {}", self.time());
        self.shared.halt_requested.store(true, Ordering::SeqCst);
    }

    pub fn fire(&self, event: UpdaterEvent) {
        self.shared.fire_updater(event);
    }

    fn run_component(&self, instance: &ComponentInstance) -> Result<(), WorkspaceError> {
        let mut component = instance.lock();
        if !component.is_update_on() {
            return Ok(());
        }

        let time = self.time();
        self.shared.fire_updater(UpdaterEvent::ComponentUpdateStarted {
            component: instance.id.clone(),
            time,
        });
        component
            .update()
            .map_err(|err| WorkspaceError::component(instance.name(), err))?;
        drop(component);
        self.shared.fire_updater(UpdaterEvent::ComponentUpdateFinished {
            component: instance.id.clone(),
            time,
        });
        Ok(())
    }
}
