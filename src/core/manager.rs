//! Allocation manager
//!
//! Owns the three indices that describe the system:
//! - `bins_by_capacity`: `(capacity, bin id)` for placement searches
//! - `bins_by_id`: owns every `Bin`
//! - `objects`: object id to owning bin id
//!
//! A bin's capacity-index key changes on every placement or removal, so the
//! entry is deleted under the old key and reinserted under the new one.
//! Every fallible check runs before the first mutation, which keeps a failed
//! call from leaving the indices half-updated.

use crate::core::bin::{Bin, BinId, CapacityKey, Object, ObjectId};
use crate::core::config::ManagerConfig;
use crate::core::error::{BinPackError, Result};
use crate::core::index::OrderedIndex;
use crate::core::placement::Policy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Snapshot of one bin as reported by [`AllocationManager::bin_info`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinInfo {
    /// Remaining free capacity
    pub capacity: u64,
    /// Held object ids, ascending
    pub objects: Vec<ObjectId>,
}

/// Aggregate counters across all bins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub bin_count: usize,
    pub object_count: usize,
    pub total_capacity: u64,
    pub free_capacity: u64,
    pub largest_free: Option<u64>,
    pub smallest_free: Option<u64>,
}

/// In-memory bin allocator
///
/// Not synchronized; wrap it in a mutex to share across threads.
///
/// # Examples
///
/// ```
/// use binpack_rs::{AllocationManager, Policy};
///
/// # fn main() -> binpack_rs::Result<()> {
/// let mut manager = AllocationManager::new();
/// manager.add_bin(1, 10)?;
/// manager.add_bin(2, 20)?;
/// manager.add_bin(3, 15)?;
///
/// let bin = manager.add_object(100, 12, Policy::BestFit)?;
/// assert_eq!(bin, 3);
/// assert_eq!(manager.bin_info(3)?.capacity, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllocationManager {
    config: ManagerConfig,
    bins_by_capacity: OrderedIndex<CapacityKey, ()>,
    bins_by_id: OrderedIndex<BinId, Bin>,
    objects: OrderedIndex<ObjectId, BinId>,
}

impl AllocationManager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        info!(
            strict_ids = config.strict_ids,
            default_policy = %config.default_policy,
            "Creating allocation manager"
        );
        AllocationManager {
            config,
            bins_by_capacity: OrderedIndex::new(),
            bins_by_id: OrderedIndex::new(),
            objects: OrderedIndex::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Register a new bin with `capacity` free space
    pub fn add_bin(&mut self, id: BinId, capacity: u64) -> Result<()> {
        if self.bins_by_id.contains_key(&id) {
            return self.duplicate(BinPackError::DuplicateBin(id));
        }

        let bin = Bin::new(id, capacity);
        self.bins_by_capacity.insert(bin.capacity_key(), ());
        self.bins_by_id.insert(id, bin);

        debug!("Added bin {} with capacity {}", id, capacity);
        Ok(())
    }

    /// Place a new object using `policy`, returning the chosen bin id
    ///
    /// Fails with `NoBinAvailable` without touching any index when no bin
    /// satisfies the request.
    pub fn add_object(&mut self, id: ObjectId, size: u64, policy: Policy) -> Result<BinId> {
        if size == 0 {
            return Err(BinPackError::InvalidSize(size));
        }
        if let Some(&owner) = self.objects.get(&id) {
            self.duplicate(BinPackError::DuplicateObject(id))?;
            return Ok(owner);
        }

        let old_key = policy
            .select(&self.bins_by_capacity, size)
            .ok_or(BinPackError::NoBinAvailable { size, policy })?;

        let bin = self.bins_by_id.get_mut(&old_key.bin_id).ok_or_else(|| {
            BinPackError::Inconsistent(format!(
                "capacity index references missing bin {}",
                old_key.bin_id
            ))
        })?;
        if bin.capacity_key() != old_key {
            return Err(BinPackError::Inconsistent(format!(
                "stale capacity key {:?} for bin {}",
                old_key,
                bin.id()
            )));
        }

        if !bin.place(Object::new(id, size, policy)) {
            return Err(BinPackError::Inconsistent(format!(
                "bin {} refused object {} of size {}",
                bin.id(),
                id,
                size
            )));
        }
        let new_key = bin.capacity_key();

        self.bins_by_capacity.delete(&old_key);
        self.bins_by_capacity.insert(new_key, ());
        self.objects.insert(id, new_key.bin_id);

        debug!(
            "Placed object {} (size {}, {}) in bin {}, capacity {} -> {}",
            id, size, policy, new_key.bin_id, old_key.capacity, new_key.capacity
        );
        Ok(new_key.bin_id)
    }

    /// Place a new object using the configured default policy
    pub fn add_object_default(&mut self, id: ObjectId, size: u64) -> Result<BinId> {
        self.add_object(id, size, self.config.default_policy)
    }

    /// Remove an object and return its space to the owning bin
    pub fn delete_object(&mut self, id: ObjectId) -> Result<()> {
        let bin_id = *self
            .objects
            .get(&id)
            .ok_or(BinPackError::ObjectNotFound(id))?;

        let bin = self.bins_by_id.get_mut(&bin_id).ok_or_else(|| {
            BinPackError::Inconsistent(format!("object {} maps to missing bin {}", id, bin_id))
        })?;

        let old_key = bin.capacity_key();
        let object = bin.release(id).ok_or_else(|| {
            BinPackError::Inconsistent(format!("bin {} does not hold object {}", bin_id, id))
        })?;
        let new_key = bin.capacity_key();

        self.objects.delete(&id);
        self.bins_by_capacity.delete(&old_key);
        self.bins_by_capacity.insert(new_key, ());

        debug!(
            "Deleted object {} (size {}) from bin {}, capacity {} -> {}",
            id, object.size, bin_id, old_key.capacity, new_key.capacity
        );
        Ok(())
    }

    /// Id of the bin currently holding object `id`
    pub fn object_info(&self, id: ObjectId) -> Result<BinId> {
        self.objects
            .get(&id)
            .copied()
            .ok_or(BinPackError::ObjectNotFound(id))
    }

    /// Free capacity and held object ids of bin `id`
    pub fn bin_info(&self, id: BinId) -> Result<BinInfo> {
        let bin = self.bin(id).ok_or(BinPackError::BinNotFound(id))?;
        Ok(BinInfo {
            capacity: bin.capacity(),
            objects: bin.object_ids(),
        })
    }

    /// Bin a placement would pick, without placing anything
    pub fn select_bin(&self, size: u64, policy: Policy) -> Result<BinId> {
        if size == 0 {
            return Err(BinPackError::InvalidSize(size));
        }
        policy
            .select(&self.bins_by_capacity, size)
            .map(|key| key.bin_id)
            .ok_or(BinPackError::NoBinAvailable { size, policy })
    }

    pub fn bin(&self, id: BinId) -> Option<&Bin> {
        self.bins_by_id.get(&id)
    }

    /// Object record, looked up through its owning bin
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        let bin_id = self.objects.get(&id)?;
        self.bin(*bin_id)?.object(id)
    }

    /// Bins ordered by `(capacity, id)`
    pub fn bins(&self) -> impl Iterator<Item = &Bin> + '_ {
        self.bins_by_capacity
            .keys()
            .filter_map(move |key| self.bins_by_id.get(&key.bin_id))
    }

    pub fn bin_count(&self) -> usize {
        self.bins_by_id.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn stats(&self) -> AllocationStats {
        let mut stats = AllocationStats {
            bin_count: self.bin_count(),
            object_count: self.object_count(),
            largest_free: self.bins_by_capacity.last().map(|(key, _)| key.capacity),
            smallest_free: self.bins_by_capacity.first().map(|(key, _)| key.capacity),
            ..AllocationStats::default()
        };
        for bin in self.bins_by_id.values() {
            stats.total_capacity = stats.total_capacity.saturating_add(bin.initial_capacity());
            stats.free_capacity = stats.free_capacity.saturating_add(bin.capacity());
        }
        stats
    }

    /// Check that all indices agree with each other and are balanced
    pub fn verify(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(BinPackError::Inconsistent(msg)) };

        if !self.bins_by_capacity.is_balanced()
            || !self.bins_by_id.is_balanced()
            || !self.objects.is_balanced()
        {
            return fail("manager index violates AVL balance".to_string());
        }
        if self.bins_by_capacity.len() != self.bins_by_id.len() {
            return fail(format!(
                "{} capacity entries for {} bins",
                self.bins_by_capacity.len(),
                self.bins_by_id.len()
            ));
        }

        let mut held = 0usize;
        for bin in self.bins_by_id.values() {
            if !self.bins_by_capacity.contains_key(&bin.capacity_key()) {
                return fail(format!("bin {} has a stale capacity key", bin.id()));
            }
            if !bin.objects_index().is_balanced() {
                return fail(format!("object index of bin {} is unbalanced", bin.id()));
            }

            let mut used = 0u64;
            for object in bin.objects() {
                used = used.saturating_add(object.size);
                if self.objects.get(&object.id) != Some(&bin.id()) {
                    return fail(format!(
                        "object {} in bin {} is not mapped to it",
                        object.id,
                        bin.id()
                    ));
                }
            }
            if bin.capacity().checked_add(used) != Some(bin.initial_capacity()) {
                return fail(format!(
                    "bin {} capacity {} + used {} != initial {}",
                    bin.id(),
                    bin.capacity(),
                    used,
                    bin.initial_capacity()
                ));
            }
            held += bin.object_count();
        }

        if held != self.objects.len() {
            return fail(format!(
                "{} objects held by bins, {} mapped",
                held,
                self.objects.len()
            ));
        }
        Ok(())
    }

    fn duplicate(&self, err: BinPackError) -> Result<()> {
        if self.config.strict_ids {
            return Err(err);
        }
        warn!("Ignoring duplicate id: {}", err);
        Ok(())
    }
}
