pub mod cache;
pub mod coupling;
pub mod events;
pub mod manager;
pub mod validator;

pub use cache::CouplingCache;
pub use coupling::{ArchivedCoupling, Coupling};
pub use events::CouplingEvent;
pub use manager::CouplingManager;
pub use validator::CouplingValidator;
