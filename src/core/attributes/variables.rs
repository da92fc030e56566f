use crate::core::attributes::container::AttributeContainer;
use crate::core::attributes::spec::{AttributeKind, AttributeSpec};
use crate::core::error::CouplingError;
use crate::core::types::generate_container_id;
use crate::core::values::{TypedData, TypedValue};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Attribute container backed by a table of named variables.
///
/// Each variable may be exposed as a producer, a consumer, or both under the
/// variable's own name. Components that only need to publish or receive plain
/// values can hold one of these instead of implementing
/// [`AttributeContainer`] by hand.
pub struct VariableContainer {
    id: String,
    specs: Vec<AttributeSpec>,
    values: RwLock<HashMap<String, TypedValue>>,
}

impl VariableContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            specs: Vec::new(),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Create a container with a generated unique id
    pub fn with_generated_id(prefix: &str) -> Self {
        Self::new(generate_container_id(prefix))
    }

    /// Add a variable readable through a producer
    pub fn with_producer<T: TypedData>(self, name: &str, initial: T) -> Self {
        self.with_attribute(AttributeSpec::producer::<T>(name), initial)
    }

    /// Add a variable writable through a consumer
    pub fn with_consumer<T: TypedData>(self, name: &str, initial: T) -> Self {
        self.with_attribute(AttributeSpec::consumer::<T>(name), initial)
    }

    /// Add a variable exposed both as producer and consumer
    pub fn with_variable<T: TypedData>(self, name: &str, initial: T) -> Self {
        self.with_producer(name, initial.clone())
            .with_consumer(name, initial)
    }

    /// Add a variable with a custom descriptor; the descriptor's name is the variable name
    pub fn with_attribute<T: TypedData>(mut self, spec: AttributeSpec, initial: T) -> Self {
        let values = self.values.get_mut().unwrap_or_else(PoisonError::into_inner);
        values.insert(spec.name().to_string(), TypedValue::new(initial));
        self.specs.push(spec);
        self
    }

    /// Read a variable
    pub fn get<T: TypedData>(&self, name: &str) -> Result<T, CouplingError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let value = values
            .get(name)
            .ok_or_else(|| self.no_such(name, None))?;
        value.get::<T>().cloned()
    }

    /// Write a variable directly, bypassing couplings
    pub fn set<T: TypedData>(&self, name: &str, value: T) -> Result<(), CouplingError> {
        self.store(name, TypedValue::new(value))
    }

    fn store(&self, name: &str, value: TypedValue) -> Result<(), CouplingError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let slot = values
            .get_mut(name)
            .ok_or_else(|| self.no_such(name, None))?;
        if slot.value_type() != value.value_type() {
            return Err(CouplingError::ValueTypeMismatch {
                expected: slot.type_name(),
                found: value.type_name(),
            });
        }
        *slot = value;
        Ok(())
    }

    fn no_such(&self, name: &str, kind: Option<AttributeKind>) -> CouplingError {
        let available = self
            .specs
            .iter()
            .filter(|spec| kind.map_or(true, |k| spec.kind() == k))
            .map(|spec| spec.name().to_string())
            .collect();
        CouplingError::NoSuchAttribute {
            container: self.id.clone(),
            attribute: name.to_string(),
            available,
        }
    }

    fn exposes(&self, name: &str, kind: AttributeKind) -> bool {
        self.specs
            .iter()
            .any(|spec| spec.name() == name && spec.kind() == kind)
    }
}

impl AttributeContainer for VariableContainer {
    fn container_id(&self) -> &str {
        &self.id
    }

    fn attributes(&self) -> Vec<AttributeSpec> {
        self.specs.clone()
    }

    fn produce(&self, attribute: &str) -> Result<TypedValue, CouplingError> {
        if !self.exposes(attribute, AttributeKind::Producer) {
            return Err(self.no_such(attribute, Some(AttributeKind::Producer)));
        }
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values
            .get(attribute)
            .cloned()
            .ok_or_else(|| self.no_such(attribute, Some(AttributeKind::Producer)))
    }

    fn consume(&self, attribute: &str, value: TypedValue) -> Result<(), CouplingError> {
        if !self.exposes(attribute, AttributeKind::Consumer) {
            return Err(self.no_such(attribute, Some(AttributeKind::Consumer)));
        }
        self.store(attribute, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let container = VariableContainer::new("neuron_1").with_variable("activation", 0.5_f64);
        assert_eq!(container.get::<f64>("activation").unwrap(), 0.5);
        container.set("activation", 0.75_f64).unwrap();
        assert_eq!(container.get::<f64>("activation").unwrap(), 0.75);
    }

    #[test]
    fn test_with_variable_exposes_both_kinds() {
        let container = VariableContainer::new("neuron_1").with_variable("activation", 0.0_f64);
        let specs = container.attributes();
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().any(|s| s.is_producer()));
        assert!(specs.iter().any(|s| s.is_consumer()));
    }

    #[test]
    fn test_consume_rejects_wrong_type() {
        let container = VariableContainer::new("sensor").with_consumer("input", 0.0_f64);
        let result = container.consume("input", TypedValue::new("text".to_string()));
        assert!(matches!(result, Err(CouplingError::ValueTypeMismatch { .. })));
    }

    #[test]
    fn test_produce_only_exposed_producers() {
        let container = VariableContainer::new("effector").with_consumer("amount", 0.0_f64);
        match container.produce("amount") {
            Err(CouplingError::NoSuchAttribute { available, .. }) => assert!(available.is_empty()),
            other => panic!("expected NoSuchAttribute, got {:?}", other),
        }
    }
}
