//! Entity allocation and sparse component storage.
//!
//! Windows are identified by generation-checked [`Entity`] keys. A deleted
//! entity never compares equal to one allocated later, so stale handles held
//! by the layout are detected rather than silently aliased.

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Opaque handle for a window known to the window system.
    pub struct Entity;
}

#[derive(Default, Serialize, Deserialize)]
pub struct World {
    entities: SlotMap<Entity, ()>,
}

impl World {
    pub fn new() -> Self { Self::default() }

    pub fn create(&mut self) -> Entity { self.entities.insert(()) }

    pub fn delete(&mut self, entity: Entity) -> bool { self.entities.remove(entity).is_some() }

    pub fn contains(&self, entity: Entity) -> bool { self.entities.contains_key(entity) }

    pub fn len(&self) -> usize { self.entities.len() }

    pub fn is_empty(&self) -> bool { self.entities.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ { self.entities.keys() }
}

/// Sparse map from entities to component values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage<T> {
    store: SecondaryMap<Entity, T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self { Storage { store: SecondaryMap::new() } }
}

impl<T> Storage<T> {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, entity: Entity) -> bool { self.store.contains_key(entity) }

    pub fn get(&self, entity: Entity) -> Option<&T> { self.store.get(entity) }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> { self.store.get_mut(entity) }

    /// Stores `value`, returning whatever was there before.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        self.store.insert(entity, value)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> { self.store.remove(entity) }

    /// Runs `f` against the component, if present.
    pub fn with<R>(&mut self, entity: Entity, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.store.get_mut(entity).map(f)
    }

    /// Removes the component and hands it to `f`.
    pub fn take_with<R>(&mut self, entity: Entity, f: impl FnOnce(T) -> R) -> Option<R> {
        self.store.remove(entity).map(f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> { self.store.iter() }

    pub fn values(&self) -> impl Iterator<Item = &T> { self.store.values() }

    pub fn len(&self) -> usize { self.store.len() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }
}
