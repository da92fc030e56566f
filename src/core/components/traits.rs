use crate::core::attributes::AttributeContainer;
use crate::core::error::ComponentError;
use std::sync::Arc;

/// A simulation module hosted by the workspace.
///
/// Components never reference each other. They publish data through their
/// attribute containers and the workspace wires those together with
/// couplings. Lifecycle hooks are called from the scheduler thread during a
/// run and from the caller's thread otherwise.
pub trait WorkspaceComponent: Send {
    /// Kind used for default naming, e.g. `"Network"`
    fn kind(&self) -> &str;

    /// Preferred name; the workspace assigns `"<Kind> <n>"` when absent
    fn name(&self) -> Option<String> {
        None
    }

    /// Every container currently exposed by this component.
    ///
    /// May change between calls; new containers are discovered and vanished
    /// ones are purged when the component is next queried.
    fn attribute_containers(&self) -> Vec<Arc<dyn AttributeContainer>>;

    /// Advance the component by one step
    fn update(&mut self) -> Result<(), ComponentError>;

    /// Called once when a run or iteration begins
    fn start(&mut self) {}

    /// Called once when a run or iteration is asked to end
    fn stop(&mut self) {}

    /// Called once after updates have ceased
    fn do_stopped(&mut self) {}

    /// Release resources before removal from the workspace
    fn close(&mut self) {}

    /// Components with updates off are skipped by update actions
    fn is_update_on(&self) -> bool {
        true
    }

    fn is_gui_on(&self) -> bool {
        true
    }

    fn has_changed_since_last_save(&self) -> bool {
        false
    }

    fn set_changed_since_last_save(&mut self, _changed: bool) {}
}
