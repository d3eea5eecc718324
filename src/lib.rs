//! # binpack-rs - In-Memory Bin Allocation Index
//!
//! `binpack-rs` tracks a set of capacity-bounded bins and assigns sized
//! objects to them with one of four placement heuristics:
//!
//! - **Best-fit**: tightest bin that still fits
//! - **Worst-fit**: roomiest bin
//! - **Composite A**: lowest id among the roomiest bins
//! - **Composite B**: highest id among the tightest fitting bins
//!
//! Bins are indexed by `(remaining capacity, id)` in a height-balanced tree, so
//! every placement and removal costs O(log n).
//!
//! ## Quick Start
//!
//! ```rust
//! use binpack_rs::{AllocationManager, Policy, Result};
//!
//! # fn main() -> Result<()> {
//! let mut manager = AllocationManager::new();
//! manager.add_bin(1, 10)?;
//! manager.add_bin(2, 20)?;
//!
//! let bin = manager.add_object(7, 5, Policy::WorstFit)?;
//! assert_eq!(bin, 2);
//! assert_eq!(manager.object_info(7)?, 2);
//!
//! manager.delete_object(7)?;
//! assert_eq!(manager.bin_info(2)?.capacity, 20);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use binpack_rs::{AllocationManager, ManagerConfig, Policy};
//!
//! let config = ManagerConfig::from_toml_str(r#"default_policy = "composite-a""#).unwrap();
//! let manager = AllocationManager::with_config(config);
//! assert_eq!(manager.config().default_policy, Policy::CompositeA);
//! ```

pub mod core;

pub use crate::core::{
    bin::{Bin, BinId, CapacityKey, Object, ObjectId},
    config::{ManagerConfig, ManagerConfigBuilder},
    error::{BinPackError, Result},
    index::{Comparator, NaturalOrder, OrderedIndex},
    manager::{AllocationManager, AllocationStats, BinInfo},
    placement::Policy,
};
