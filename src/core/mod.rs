//! Core allocation engine
//!
//! Bottom-up:
//! - `index`: AVL-backed `OrderedIndex` with a pluggable comparator
//! - `placement`: best-fit, worst-fit and composite searches over bins
//! - `bin`: bins and objects
//! - `manager`: keeps the bin and object indices consistent

pub mod bin;
pub mod config;
pub mod error;
pub mod index;
pub mod manager;
pub mod placement;


pub use manager::AllocationManager;
