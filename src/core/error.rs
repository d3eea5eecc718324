use crate::core::bin::{BinId, ObjectId};
use crate::core::placement::Policy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinPackError {
    #[error("No bin available for an object of size {size} under {policy} placement")]
    NoBinAvailable { size: u64, policy: Policy },

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Bin not found: {0}")]
    BinNotFound(BinId),

    #[error("Bin already exists: {0}")]
    DuplicateBin(BinId),

    #[error("Object already exists: {0}")]
    DuplicateObject(ObjectId),

    #[error("Invalid object size: {0} (must be positive)")]
    InvalidSize(u64),

    #[error("Unknown placement policy: {0}")]
    UnknownPolicy(String),

    #[error("Index inconsistency: {0}")]
    Inconsistent(String),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl BinPackError {
    /// True for lookups of an object or bin id that is not present
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BinPackError::ObjectNotFound(_) | BinPackError::BinNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BinPackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(BinPackError::ObjectNotFound(3).is_not_found());
        assert!(BinPackError::BinNotFound(3).is_not_found());
        assert!(!BinPackError::DuplicateBin(3).is_not_found());
        assert!(!BinPackError::NoBinAvailable {
            size: 4,
            policy: Policy::BestFit
        }
        .is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = BinPackError::NoBinAvailable {
            size: 12,
            policy: Policy::WorstFit,
        };
        assert_eq!(
            err.to_string(),
            "No bin available for an object of size 12 under worst-fit placement"
        );
        assert_eq!(
            BinPackError::ObjectNotFound(7).to_string(),
            "Object not found: 7"
        );
    }
}
