//! Placement heuristics over the capacity-ordered bin index
//!
//! Every heuristic walks an index keyed by [`CapacityKey`], which orders bins
//! by remaining capacity and then by id. Selection never mutates the index;
//! the manager applies the placement in a separate step.
//!
//! - **Best-fit**: smallest capacity that still fits, lowest id on ties
//! - **Worst-fit**: largest capacity that fits, highest id on ties
//! - **Composite A**: take the worst-fit capacity tier, then best-fit inside it
//!   (the lowest id among the largest bins)
//! - **Composite B**: take the best-fit capacity tier, then the highest id in it

use crate::core::bin::CapacityKey;
use crate::core::error::BinPackError;
use crate::core::index::OrderedIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Placement policy attached to each object
///
/// The legacy colour tags are accepted when parsing: `blue` (best-fit),
/// `green` (worst-fit), `red` (composite A) and `yellow` (composite B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    #[default]
    #[serde(alias = "blue")]
    BestFit,
    #[serde(alias = "green")]
    WorstFit,
    #[serde(alias = "red")]
    CompositeA,
    #[serde(alias = "yellow")]
    CompositeB,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::BestFit,
        Policy::WorstFit,
        Policy::CompositeA,
        Policy::CompositeB,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Policy::BestFit => "best-fit",
            Policy::WorstFit => "worst-fit",
            Policy::CompositeA => "composite-a",
            Policy::CompositeB => "composite-b",
        }
    }

    /// Choose a bin for an object of `size`, or `None` if nothing fits
    pub fn select<V>(self, index: &OrderedIndex<CapacityKey, V>, size: u64) -> Option<CapacityKey> {
        let selected = match self {
            Policy::BestFit => best_fit(index, size),
            Policy::WorstFit => worst_fit(index, size),
            Policy::CompositeA => {
                let widest = worst_fit(index, size)?;
                best_fit(index, widest.capacity)
            }
            Policy::CompositeB => {
                let tightest = best_fit(index, size)?;
                Some(largest_in_tier(index, tightest.capacity).unwrap_or(tightest))
            }
        };
        trace!(policy = %self, size, ?selected, "placement search");
        selected
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = BinPackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "best-fit" | "bestfit" | "blue" => Ok(Policy::BestFit),
            "worst-fit" | "worstfit" | "green" => Ok(Policy::WorstFit),
            "composite-a" | "red" => Ok(Policy::CompositeA),
            "composite-b" | "yellow" => Ok(Policy::CompositeB),
            _ => Err(BinPackError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Smallest `(capacity, id)` with `capacity >= size`
///
/// Subtrees left of a node that is too small are skipped entirely; a fitting
/// node becomes the candidate and the search continues left for a tighter one.
pub fn best_fit<V>(index: &OrderedIndex<CapacityKey, V>, size: u64) -> Option<CapacityKey> {
    let mut cursor = index.root();
    let mut best: Option<CapacityKey> = None;

    while let Some(node) = cursor {
        let key = *node.key();
        if key.capacity < size {
            cursor = node.right();
        } else {
            if best.map_or(true, |b| key.capacity <= b.capacity) {
                best = Some(key);
            }
            cursor = node.left();
        }
    }

    best
}

/// Largest `(capacity, id)`, provided its capacity fits `size`
pub fn worst_fit<V>(index: &OrderedIndex<CapacityKey, V>, size: u64) -> Option<CapacityKey> {
    let mut cursor = index.root();
    let mut best: Option<CapacityKey> = None;

    while let Some(node) = cursor {
        let key = *node.key();
        if key.capacity >= size && best.map_or(true, |b| key > b) {
            best = Some(key);
        }
        cursor = node.right();
    }

    best
}

/// Highest-id bin whose capacity equals `capacity` exactly
pub fn largest_in_tier<V>(
    index: &OrderedIndex<CapacityKey, V>,
    capacity: u64,
) -> Option<CapacityKey> {
    let mut cursor = index.root();
    let mut best: Option<CapacityKey> = None;

    while let Some(node) = cursor {
        let key = *node.key();
        cursor = if key.capacity > capacity {
            node.left()
        } else if key.capacity < capacity {
            node.right()
        } else {
            if best.map_or(true, |b| key.bin_id > b.bin_id) {
                best = Some(key);
            }
            node.right()
        };
    }

    best
}
