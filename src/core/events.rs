use crate::core::types::ComponentId;

type Listener<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Subscribed callbacks for one event type.
///
/// Callbacks run synchronously on the firing thread, in subscription order.
pub struct Listeners<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn fire(&self, event: &E) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

/// Structural changes to the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    ComponentAdded(ComponentId),
    ComponentRemoved(ComponentId),
    WorkspaceCleared,
}

/// Progress of the update loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdaterEvent {
    RunStarted,
    RunStopped { time: u64 },
    /// A full step finished and time advanced
    StepCompleted { time: u64 },
    CouplingsUpdated { time: u64 },
    ComponentUpdateStarted { component: ComponentId, time: u64 },
    ComponentUpdateFinished { component: ComponentId, time: u64 },
    /// An action failed and the step continued past it
    ActionFailed { action: String, message: String },
}
