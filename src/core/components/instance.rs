use crate::core::components::traits::WorkspaceComponent;
use crate::core::types::ComponentId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A component shared between the workspace, the coupling layer and the scheduler
pub type SharedComponent = Arc<Mutex<dyn WorkspaceComponent>>;

/// Wrap a component for hosting in a workspace
pub fn share<C: WorkspaceComponent + 'static>(component: C) -> SharedComponent {
    Arc::new(Mutex::new(component))
}

/// A named component hosted by the workspace
#[derive(Clone)]
pub struct ComponentInstance {
    pub id: ComponentId,
    pub component: SharedComponent,
}

impl ComponentInstance {
    pub fn new(id: ComponentId, component: SharedComponent) -> Self {
        Self { id, component }
    }

    pub fn name(&self) -> &str {
        self.id.id()
    }

    pub fn kind(&self) -> &str {
        self.id.module_type()
    }

    /// Lock the component, recovering from a panic in a previous holder
    pub fn lock(&self) -> MutexGuard<'_, dyn WorkspaceComponent + 'static> {
        self.component.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("id", &self.id)
            .finish()
    }
}
