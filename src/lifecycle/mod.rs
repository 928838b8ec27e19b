//! Entity lifecycle handlers.
//!
//! Each handler owns one family of entities and turns a decoded event into
//! store mutations. Handlers borrow the store and the chain reader for the
//! duration of one event and record best-effort failures in [`Diagnostics`].

use tracing::error;

use crate::config::{MissingReferentPolicy, DEFAULT_FINALIZE_TRANSFER_OFFSET};
use crate::error::{Error, Result};

pub mod auction;
pub mod currency;
pub mod identity;
pub mod item;
pub mod market;

#[cfg(test)]
pub(crate) mod testing;

pub use auction::AuctionLifecycle;
pub use currency::CurrencyCatalog;
pub use identity::IdentityResolver;
pub use item::ItemLifecycle;
pub use market::MarketLifecycle;

/// Knobs the handlers read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Log positions between a `Transfer` and the `BidFinalized` settling it
    pub finalize_transfer_offset: u64,
    /// Decimals recorded when `decimals()` reverts
    pub fallback_decimals: Option<u8>,
    /// Missing referent handling
    pub missing_referent_policy: MissingReferentPolicy,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            finalize_transfer_offset: DEFAULT_FINALIZE_TRANSFER_OFFSET,
            fallback_decimals: None,
            missing_referent_policy: MissingReferentPolicy::Report,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Problems reported while processing one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    policy: MissingReferentPolicy,
    reported: Vec<Error>,
}

impl Diagnostics {
    /// Create an empty report
    pub fn new(policy: MissingReferentPolicy) -> Self {
        Self {
            policy,
            reported: Vec::new(),
        }
    }

    /// A required entity was absent.
    ///
    /// Under [`MissingReferentPolicy::Report`] the error is logged and
    /// recorded, and the caller continues. Under `Fail` it is returned.
    pub fn missing(&mut self, err: Error) -> Result<()> {
        error!(code = err.code(), "{}", err);
        match self.policy {
            MissingReferentPolicy::Report => {
                self.reported.push(err);
                Ok(())
            }
            MissingReferentPolicy::Fail => Err(err),
        }
    }

    /// An accounting invariant was violated. Always recorded, never fatal.
    pub fn violation(&mut self, err: Error) {
        error!(code = err.code(), "{}", err);
        self.reported.push(err);
    }

    /// True if nothing was reported
    pub fn is_clean(&self) -> bool {
        self.reported.is_empty()
    }

    /// Reported errors, in order
    pub fn reported(&self) -> &[Error] {
        &self.reported
    }

    /// Take the reported errors
    pub fn into_errors(self) -> Vec<Error> {
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_policy_continues() {
        let mut diag = Diagnostics::new(MissingReferentPolicy::Report);
        assert!(diag.missing(Error::ItemNotFound("x".into())).is_ok());
        assert_eq!(diag.reported().len(), 1);
        assert!(!diag.is_clean());
    }

    #[test]
    fn test_fail_policy_returns_error() {
        let mut diag = Diagnostics::new(MissingReferentPolicy::Fail);
        let err = diag.missing(Error::BidNotFound("x".into())).unwrap_err();
        assert_eq!(err.code(), 1003);
        assert!(diag.is_clean());
    }

    #[test]
    fn test_violations_are_recorded_under_both_policies() {
        let mut diag = Diagnostics::new(MissingReferentPolicy::Fail);
        diag.violation(Error::InvariantViolation("x".into()));
        assert_eq!(diag.into_errors().len(), 1);
    }
}
