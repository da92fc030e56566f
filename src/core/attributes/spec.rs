use crate::core::values::{TypedData, ValueType};
use serde::{Deserialize, Serialize};

/// Direction of an exposed member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Yields a value on demand
    Producer,
    /// Accepts a value
    Consumer,
}

impl AttributeKind {
    /// Check if an attribute of this kind can feed an attribute of the other kind
    pub fn can_couple_to(&self, other: &AttributeKind) -> bool {
        matches!((self, other), (AttributeKind::Producer, AttributeKind::Consumer))
    }

    /// Get a human-readable description of this kind
    pub fn description(&self) -> &'static str {
        match self {
            AttributeKind::Producer => "Producer that yields a value to couplings",
            AttributeKind::Consumer => "Consumer that accepts a value from couplings",
        }
    }
}

/// Static descriptor of one producible or consumable member of a container
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    name: String,
    kind: AttributeKind,
    value_type: ValueType,
    description: String,
    visible: bool,
    preference: i32,
}

impl AttributeSpec {
    /// Create a producer descriptor for values of type `T`
    pub fn producer<T: TypedData>(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::Producer, ValueType::of::<T>())
    }

    /// Create a consumer descriptor for values of type `T`
    pub fn consumer<T: TypedData>(name: &str) -> Self {
        Self::with_kind(name, AttributeKind::Consumer, ValueType::of::<T>())
    }

    /// Create a descriptor from an already known type tag
    pub fn with_kind(name: &str, kind: AttributeKind, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value_type,
            description: name.to_string(),
            visible: true,
            preference: 0,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Hide this attribute from visible views by default
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Priority used when auto-coupling two containers; higher wins
    pub fn with_preference(mut self, preference: i32) -> Self {
        self.preference = preference;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn preference(&self) -> i32 {
        self.preference
    }

    pub fn is_producer(&self) -> bool {
        self.kind == AttributeKind::Producer
    }

    pub fn is_consumer(&self) -> bool {
        self.kind == AttributeKind::Consumer
    }
}
