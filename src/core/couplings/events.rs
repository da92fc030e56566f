use crate::core::couplings::coupling::Coupling;
use crate::core::types::AttributeRef;

/// Changes to the set of couplings and endpoint visibility
#[derive(Debug, Clone, PartialEq)]
pub enum CouplingEvent {
    CouplingAdded(Coupling),
    CouplingRemoved(Coupling),
    /// Several couplings removed in one operation
    CouplingsRemoved(Vec<Coupling>),
    VisibilityChanged { attribute: AttributeRef, visible: bool },
}
