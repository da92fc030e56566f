use crate::core::error::WorkspaceError;
use crate::core::execution::update_action::{ActionKind, UpdateAction};
use crate::core::types::ComponentId;
use log::debug;

/// The ordered list of actions run once per step
#[derive(Debug, Default, Clone)]
pub struct UpdateManager {
    actions: Vec<UpdateAction>,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default pipeline for `components`
    pub fn with_defaults(components: &[ComponentId]) -> Self {
        let mut manager = Self::new();
        manager.set_default_actions(components);
        manager
    }

    pub fn add_action(&mut self, action: UpdateAction) {
        debug!("Added update action '{}'", action.name());
        self.actions.push(action);
    }

    /// Insert at `position`, appending when past the end
    pub fn add_action_at(&mut self, position: usize, action: UpdateAction) {
        let position = position.min(self.actions.len());
        debug!("Added update action '{}' at {}", action.name(), position);
        self.actions.insert(position, action);
    }

    pub fn remove_action(&mut self, name: &str) -> Result<UpdateAction, WorkspaceError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| WorkspaceError::NoSuchAction(name.to_string()))?;
        if !self.actions[index].is_removable() {
            return Err(WorkspaceError::ActionNotRemovable(name.to_string()));
        }
        Ok(self.actions.remove(index))
    }

    /// Move the action at `from` so that it ends up at `to`
    pub fn move_action(&mut self, from: usize, to: usize) -> Result<(), WorkspaceError> {
        if from >= self.actions.len() {
            return Err(WorkspaceError::NoSuchAction(format!("#{}", from)));
        }
        let action = self.actions.remove(from);
        let to = to.min(self.actions.len());
        self.actions.insert(to, action);
        Ok(())
    }

    /// Remove every removable action
    pub fn clear(&mut self) {
        self.actions.retain(|action| !action.is_removable());
    }

    /// Replace the whole pipeline, non-removable actions included, with one
    /// update per component followed by coupling propagation
    pub fn set_default_actions(&mut self, components: &[ComponentId]) {
        self.actions.clear();
        for component in components {
            self.actions
                .push(UpdateAction::update_component(component.clone()));
        }
        self.actions.push(UpdateAction::update_couplings());
    }

    /// Add the update action for a newly added component.
    ///
    /// Lands before the first coupling action, or at the end if there is
    /// none. Skipped while a buffered update covers every component.
    pub fn add_component_action(&mut self, component: &ComponentId) {
        if self.has_kind(&ActionKind::Buffered) {
            return;
        }
        let action = UpdateAction::update_component(component.clone());
        match self
            .actions
            .iter()
            .position(|a| a.kind() == &ActionKind::Couplings)
        {
            Some(index) => self.add_action_at(index, action),
            None => self.add_action(action),
        }
    }

    /// Drop every action that updates `component`
    pub fn remove_component_action(&mut self, component: &ComponentId) {
        let kind = ActionKind::Component(component.clone());
        self.actions.retain(|a| a.kind() != &kind);
    }

    pub fn action(&self, name: &str) -> Option<&UpdateAction> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn actions(&self) -> &[UpdateAction] {
        &self.actions
    }

    pub fn action_names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name() == name)
    }

    fn has_kind(&self, kind: &ActionKind) -> bool {
        self.actions.iter().any(|a| a.kind() == kind)
    }
}
