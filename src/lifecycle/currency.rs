//! Currency upsert and liquidity accounting.

use alloy_primitives::{Address, B256, U256};
use tracing::{debug, warn};

use super::Diagnostics;
use crate::error::{Error, Result};
use crate::metadata::{bytes32_to_string, CallResult, CurrencyMetadataSource, DEGENERATE_BYTES32};
use crate::model::Currency;
use crate::storage::{EntityStore, StorageBackend};

/// Address standing in for the chain's native asset
pub const NATIVE_CURRENCY: Address = Address::ZERO;

/// Name or symbol recorded when a token exposes neither accessor
pub const UNKNOWN: &str = "unknown";

/// Find-or-create for [`Currency`] records, plus the liquidity running total
pub struct CurrencyCatalog<'a, B: StorageBackend, C: CurrencyMetadataSource> {
    store: &'a EntityStore<B>,
    chain: &'a C,
    fallback_decimals: Option<u8>,
}

impl<'a, B: StorageBackend, C: CurrencyMetadataSource> CurrencyCatalog<'a, B, C> {
    /// Create a catalog
    pub fn new(store: &'a EntityStore<B>, chain: &'a C, fallback_decimals: Option<u8>) -> Self {
        Self {
            store,
            chain,
            fallback_decimals,
        }
    }

    /// Load the currency at `address`, resolving its metadata on first sight
    pub fn find_or_create_currency(&self, address: Address) -> Result<Currency> {
        if let Some(currency) = self.store.load::<Currency>(&address)? {
            return Ok(currency);
        }

        let currency = self.resolve(address);
        self.store.save(&currency)?;
        debug!(
            currency = %address,
            name = %currency.name,
            symbol = %currency.symbol,
            decimals = ?currency.decimals,
            "Created currency"
        );
        Ok(currency)
    }

    /// Add a newly live bid's amount
    pub fn credit_liquidity(&self, address: Address, amount: U256) -> Result<Currency> {
        let mut currency = self.find_or_create_currency(address)?;
        currency.liquidity = currency.liquidity.saturating_add(amount);
        self.store.save(&currency)?;
        Ok(currency)
    }

    /// Remove a terminated bid's amount.
    ///
    /// Liquidity never goes below zero; an underflow is reported and clamps.
    pub fn release_liquidity(
        &self,
        address: Address,
        amount: U256,
        diagnostics: &mut Diagnostics,
    ) -> Result<Currency> {
        let mut currency = self.find_or_create_currency(address)?;
        currency.liquidity = match currency.liquidity.checked_sub(amount) {
            Some(remaining) => remaining,
            None => {
                diagnostics.violation(Error::LiquidityUnderflow {
                    currency: format!("0x{}", hex::encode(address)),
                    available: currency.liquidity.to_string(),
                    requested: amount.to_string(),
                });
                U256::ZERO
            }
        };
        self.store.save(&currency)?;
        Ok(currency)
    }

    fn resolve(&self, address: Address) -> Currency {
        if address == NATIVE_CURRENCY {
            return Currency {
                id: address,
                name: "Ethereum".into(),
                symbol: "ETH".into(),
                decimals: Some(18),
                liquidity: U256::ZERO,
            };
        }

        let name = self.fetch_text(
            address,
            "name",
            self.chain.name(address),
            || self.chain.name_bytes32(address),
        );
        let symbol = self.fetch_text(
            address,
            "symbol",
            self.chain.symbol(address),
            || self.chain.symbol_bytes32(address),
        );
        let decimals = match self.chain.decimals(address) {
            Ok(decimals) => Some(decimals),
            Err(_) => {
                warn!(currency = %address, "decimals() reverted");
                self.fallback_decimals
            }
        };

        Currency {
            id: address,
            name,
            symbol,
            decimals,
            liquidity: U256::ZERO,
        }
    }

    /// Typed accessor, then the `bytes32` accessor, then [`UNKNOWN`]
    fn fetch_text(
        &self,
        address: Address,
        field: &'static str,
        typed: CallResult<String>,
        fixed: impl FnOnce() -> CallResult<B256>,
    ) -> String {
        if let Ok(value) = typed {
            return value;
        }

        match fixed() {
            Ok(raw) if raw != DEGENERATE_BYTES32 => bytes32_to_string(&raw),
            Ok(_) => {
                warn!(currency = %address, field, "bytes32 accessor returned the null sentinel");
                UNKNOWN.to_string()
            }
            Err(_) => {
                warn!(currency = %address, field, "Both accessors reverted");
                UNKNOWN.to_string()
            }
        }
    }
}
