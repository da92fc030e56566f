use crate::core::error::CouplingError;
use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Runtime type tag carried by producers, consumers and values
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    type_id: TypeId,
    type_name: &'static str,
}

impl ValueType {
    /// Tag for the Rust type `T`
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.type_name
    }

    /// Last path segment of the type name, e.g. `f64` or `Vec<f64>`
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        match base.rfind("::") {
            Some(pos) => &self.type_name[pos + 2..],
            None => self.type_name,
        }
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Owned, type-erased value handed from a producer to a consumer
pub struct TypedValue {
    data: Box<dyn Any + Send + Sync>,
    clone_fn: fn(&dyn Any) -> Box<dyn Any + Send + Sync>,
    value_type: ValueType,
}

impl TypedValue {
    /// Create a new typed value
    pub fn new<T: TypedData>(value: T) -> Self {
        Self {
            value_type: ValueType::of::<T>(),
            data: Box::new(value),
            clone_fn: |any| match any.downcast_ref::<T>() {
                Some(typed) => Box::new(typed.clone()),
                None => unreachable!("clone_fn is only ever called on its own payload"),
            },
        }
    }

    /// Get a reference to the contained value
    pub fn get<T: 'static>(&self) -> Result<&T, CouplingError> {
        self.data
            .downcast_ref::<T>()
            .ok_or_else(|| self.mismatch::<T>())
    }

    /// Consume the typed value and return the contained value
    pub fn into_inner<T: 'static>(self) -> Result<T, CouplingError> {
        if !self.is_type::<T>() {
            return Err(self.mismatch::<T>());
        }
        let value_type = self.value_type;
        self.data
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| CouplingError::ValueTypeMismatch {
                expected: std::any::type_name::<T>(),
                found: value_type.name(),
            })
    }

    /// Get the runtime type tag of the contained value
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Get the type name of the contained value
    pub fn type_name(&self) -> &'static str {
        self.value_type.name()
    }

    /// Check if the contained value is of type T
    pub fn is_type<T: 'static>(&self) -> bool {
        TypeId::of::<T>() == self.value_type.type_id()
    }

    fn mismatch<T: 'static>(&self) -> CouplingError {
        CouplingError::ValueTypeMismatch {
            expected: std::any::type_name::<T>(),
            found: self.value_type.name(),
        }
    }
}

impl Clone for TypedValue {
    fn clone(&self) -> Self {
        Self {
            data: (self.clone_fn)(self.data.as_ref()),
            clone_fn: self.clone_fn,
            value_type: self.value_type,
        }
    }
}

impl std::fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedValue")
            .field("type", &self.value_type.name())
            .finish_non_exhaustive()
    }
}

/// Types that can flow through a coupling
pub trait TypedData: Send + Sync + Clone + 'static {}

impl<T: Send + Sync + Clone + 'static> TypedData for T {}
