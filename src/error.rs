//! Error types for the Motif indexer.
//!
//! This module defines every error the event-to-state core can raise.
//! Metadata reverts are not represented here: they are recovered locally by
//! the currency catalog and the item lifecycle (see [`crate::metadata`]).

use thiserror::Error;

/// Result type alias for indexer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the indexer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Missing-referent Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Item was never minted (or never indexed)
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// No live ask for the (item, owner) key
    #[error("Ask not found: {0}")]
    AskNotFound(String),

    /// No live bid for the (item, bidder) key
    #[error("Bid not found: {0}")]
    BidNotFound(String),

    /// Finalize could not be correlated with an earlier transfer
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// Reserve listing was never created
    #[error("Reserve listing not found: {0}")]
    ReserveListingNotFound(String),

    /// Listing points at a current bid that is not in the store
    #[error("Reserve listing bid not found: {0}")]
    ReserveListingBidNotFound(String),

    // ═══════════════════════════════════════════════════════════════════
    // Invariant Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invariant violation detected
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Currency liquidity would go below zero
    #[error("Liquidity underflow for currency {currency}: have {available}, releasing {requested}")]
    LiquidityUnderflow {
        /// Currency address
        currency: String,
        /// Liquidity before the release
        available: String,
        /// Amount being released
        requested: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid configuration value
    #[error("Invalid configuration {name}: {reason}")]
    InvalidConfig {
        /// Field name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Lock acquisition failed
    #[error("Failed to acquire lock")]
    Lock,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns true if a load found nothing where the protocol guarantees an entity
    pub fn is_missing_referent(&self) -> bool {
        matches!(
            self,
            Error::ItemNotFound(_)
                | Error::AskNotFound(_)
                | Error::BidNotFound(_)
                | Error::TransferNotFound(_)
                | Error::ReserveListingNotFound(_)
                | Error::ReserveListingBidNotFound(_)
        )
    }

    /// Returns true if the store itself is unusable and the stream must stop
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::Internal(_)
                | Error::Lock
                | Error::Storage(_)
                | Error::Serialization(_)
                | Error::Deserialization(_)
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Missing referents: 1xxx
            Error::ItemNotFound(_) => 1001,
            Error::AskNotFound(_) => 1002,
            Error::BidNotFound(_) => 1003,
            Error::TransferNotFound(_) => 1004,
            Error::ReserveListingNotFound(_) => 1005,
            Error::ReserveListingBidNotFound(_) => 1006,

            // Invariants: 2xxx
            Error::InvariantViolation(_) => 2001,
            Error::LiquidityUnderflow { .. } => 2002,

            // Configuration: 3xxx
            Error::InvalidConfig { .. } => 3001,

            // Serialization: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,

            // Internal: 9xxx
            Error::Internal(_) => 9001,
            Error::Lock => 9002,
            Error::Storage(_) => 9003,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::ItemNotFound("".into()).code(),
            Error::AskNotFound("".into()).code(),
            Error::BidNotFound("".into()).code(),
            Error::TransferNotFound("".into()).code(),
            Error::ReserveListingNotFound("".into()).code(),
            Error::ReserveListingBidNotFound("".into()).code(),
            Error::InvariantViolation("".into()).code(),
            Error::LiquidityUnderflow {
                currency: "".into(),
                available: "".into(),
                requested: "".into(),
            }
            .code(),
            Error::Storage("".into()).code(),
            Error::Lock.code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_missing_referent_classification() {
        assert!(Error::TransferNotFound("1-0xab-3".into()).is_missing_referent());
        assert!(Error::BidNotFound("x".into()).is_missing_referent());
        assert!(!Error::Storage("disk".into()).is_missing_referent());
        assert!(!Error::InvariantViolation("x".into()).is_missing_referent());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::Storage("disk full".into()).is_critical());
        assert!(Error::Lock.is_critical());
        assert!(!Error::ItemNotFound("x".into()).is_critical());
    }

    #[test]
    fn test_error_display() {
        let err = Error::LiquidityUnderflow {
            currency: "0xc0ffee".into(),
            available: "10".into(),
            requested: "50".into(),
        };
        let text = err.to_string();
        assert!(text.contains("0xc0ffee"));
        assert!(text.contains("50"));
    }
}
