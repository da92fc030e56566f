use crate::core::error::WorkspaceError;
use crate::core::execution::context::UpdateContext;
use crate::core::types::ComponentId;
use std::sync::Arc;

/// Body of an update action
pub type ActionBody = Arc<dyn Fn(&UpdateContext<'_>) -> Result<(), WorkspaceError> + Send + Sync>;

/// What an action does, used to place and remove built-in actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Component(ComponentId),
    Couplings,
    /// Every component, then every coupling
    Buffered,
    Custom,
}

/// One named entry in the per-step pipeline
#[derive(Clone)]
pub struct UpdateAction {
    name: String,
    long_description: String,
    kind: ActionKind,
    removable: bool,
    body: ActionBody,
}

impl UpdateAction {
    /// A custom action
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&UpdateContext<'_>) -> Result<(), WorkspaceError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            long_description: name.clone(),
            name,
            kind: ActionKind::Custom,
            removable: true,
            body: Arc::new(body),
        }
    }

    /// Update one component
    pub fn update_component(component: ComponentId) -> Self {
        let target = component.clone();
        let mut action = Self::new(format!("Update {}", component), move |ctx| {
            ctx.update_component(&target)
        });
        action.kind = ActionKind::Component(component);
        action
    }

    /// Propagate every coupling
    pub fn update_couplings() -> Self {
        let mut action = Self::new("Update couplings", |ctx| ctx.update_couplings())
            .with_long_description("Push every producer's value to its coupled consumers");
        action.kind = ActionKind::Couplings;
        action
    }

    /// Update every component, concurrently when a pool is configured, then propagate couplings
    pub fn buffered_update() -> Self {
        let mut action = Self::new("Buffered update", |ctx| {
            ctx.update_all_components()?;
            ctx.update_couplings()
        })
        .with_long_description("Update all components, then all couplings");
        action.kind = ActionKind::Buffered;
        action
    }

    pub fn with_long_description(mut self, description: impl Into<String>) -> Self {
        self.long_description = description.into();
        self
    }

    /// Mark the action as exempt from removal and from `clear`
    pub fn non_removable(mut self) -> Self {
        self.removable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    pub fn invoke(&self, ctx: &UpdateContext<'_>) -> Result<(), WorkspaceError> {
        (self.body)(ctx)
    }
}

impl std::fmt::Debug for UpdateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateAction")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("removable", &self.removable)
            .finish()
    }
}
