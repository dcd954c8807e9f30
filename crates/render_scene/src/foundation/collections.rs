//! Specialized collection types

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub use slotmap::{SlotMap, DefaultKey};

/// Typed handle for type-safe references into a [`HandleMap`]
pub struct TypedHandle<T> {
    key: DefaultKey,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TypedHandle<T> {
    /// Create a new typed handle from a key
    pub fn new(key: DefaultKey) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying key
    pub fn key(&self) -> DefaultKey {
        self.key
    }
}

// Manual impls: the handle is Copy regardless of what it points at.
impl<T> Clone for TypedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedHandle<T> {}

impl<T> PartialEq for TypedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for TypedHandle<T> {}

impl<T> Hash for TypedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for TypedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedHandle").field(&self.key).finish()
    }
}

/// Slot map addressed by [`TypedHandle`]s
///
/// Handles stay valid until their own entry is removed; removed handles never
/// resolve to a later entry.
#[derive(Debug, Clone)]
pub struct HandleMap<T> {
    slots: SlotMap<DefaultKey, T>,
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleMap<T> {
    /// Create an empty map
    pub fn new() -> Self {
        Self { slots: SlotMap::new() }
    }

    /// Insert a value and return its handle
    pub fn insert(&mut self, value: T) -> TypedHandle<T> {
        TypedHandle::new(self.slots.insert(value))
    }

    /// Remove a value
    pub fn remove(&mut self, handle: TypedHandle<T>) -> Option<T> {
        self.slots.remove(handle.key)
    }

    /// Get a value
    pub fn get(&self, handle: TypedHandle<T>) -> Option<&T> {
        self.slots.get(handle.key)
    }

    /// Get a mutable value
    pub fn get_mut(&mut self, handle: TypedHandle<T>) -> Option<&mut T> {
        self.slots.get_mut(handle.key)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate handles and values
    pub fn iter(&self) -> impl Iterator<Item = (TypedHandle<T>, &T)> {
        self.slots.iter().map(|(key, value)| (TypedHandle::new(key), value))
    }

    /// Iterate values
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.values()
    }

    /// Iterate mutable values
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.values_mut()
    }
}
