//! Bins and the objects placed in them

use crate::core::index::OrderedIndex;
use crate::core::placement::Policy;
use serde::{Deserialize, Serialize};

pub type BinId = u64;
pub type ObjectId = u64;

/// Position of a bin in the capacity-ordered index
///
/// Field order matters: the derived ordering compares remaining capacity first
/// and breaks ties by bin id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CapacityKey {
    pub capacity: u64,
    pub bin_id: BinId,
}

impl CapacityKey {
    pub fn new(capacity: u64, bin_id: BinId) -> Self {
        CapacityKey { capacity, bin_id }
    }
}

/// An item placed into exactly one bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub size: u64,
    pub policy: Policy,
}

impl Object {
    pub fn new(id: ObjectId, size: u64, policy: Policy) -> Self {
        Object { id, size, policy }
    }
}

/// A capacity-bounded container
///
/// `capacity` is the space still free, not the original size. The bin keeps
/// its own index of the objects it holds, keyed by object id.
#[derive(Debug, Clone)]
pub struct Bin {
    id: BinId,
    capacity: u64,
    initial_capacity: u64,
    objects: OrderedIndex<ObjectId, Object>,
}

impl Bin {
    pub fn new(id: BinId, capacity: u64) -> Self {
        Bin {
            id,
            capacity,
            initial_capacity: capacity,
            objects: OrderedIndex::new(),
        }
    }

    pub fn id(&self) -> BinId {
        self.id
    }

    /// Remaining free capacity
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Capacity the bin was created with
    pub fn initial_capacity(&self) -> u64 {
        self.initial_capacity
    }

    pub fn used(&self) -> u64 {
        self.initial_capacity - self.capacity
    }

    /// Current key in the capacity-ordered index
    pub fn capacity_key(&self) -> CapacityKey {
        CapacityKey::new(self.capacity, self.id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.values()
    }

    /// Ids of held objects, ascending
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn objects_index(&self) -> &OrderedIndex<ObjectId, Object> {
        &self.objects
    }

    /// Store an object and charge its size against the free capacity
    ///
    /// Returns `false` without changes if the object id is already held or the
    /// object does not fit.
    pub(crate) fn place(&mut self, object: Object) -> bool {
        if object.size > self.capacity || self.objects.contains_key(&object.id) {
            return false;
        }
        self.objects.insert(object.id, object);
        self.capacity -= object.size;
        true
    }

    /// Remove an object and give its size back to the free capacity
    pub(crate) fn release(&mut self, id: ObjectId) -> Option<Object> {
        let object = self.objects.delete(&id)?;
        self.capacity += object.size;
        Some(object)
    }
}
