pub mod typed_value;

// Re-export all public types
pub use typed_value::{TypedData, TypedValue, ValueType};
