use crate::core::attributes::spec::AttributeSpec;
use crate::core::error::CouplingError;
use crate::core::values::TypedValue;

/// An object that exposes producible and consumable members.
///
/// Containers describe their members with a static list of [`AttributeSpec`]s
/// and serve reads and writes by attribute name. They are shared between the
/// owning component and the coupling layer, so access goes through `&self`.
pub trait AttributeContainer: Send + Sync {
    /// Stable id, unique within the owning component
    fn container_id(&self) -> &str;

    /// All producible and consumable members of this container
    fn attributes(&self) -> Vec<AttributeSpec>;

    /// Read the current value of a producer member.
    ///
    /// The returned value is owned; consumers never alias container state.
    fn produce(&self, attribute: &str) -> Result<TypedValue, CouplingError>;

    /// Write a value into a consumer member
    fn consume(&self, attribute: &str, value: TypedValue) -> Result<(), CouplingError>;
}
