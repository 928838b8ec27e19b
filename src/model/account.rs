//! Accounts and currencies.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::storage::{Entity, EntityKind};

/// An account seen in any event. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account address
    pub id: Address,
    /// Operators approved for all of this account's tokens
    pub authorized_users: BTreeSet<Address>,
}

impl User {
    /// Create a user with no operators
    pub fn new(id: Address) -> Self {
        Self {
            id,
            authorized_users: BTreeSet::new(),
        }
    }
}

impl Entity for User {
    type Key = Address;
    const KIND: EntityKind = EntityKind::User;

    fn key(&self) -> Address {
        self.id
    }
}

/// A currency asks and bids are denominated in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Token contract address, or the zero address for the native asset
    pub id: Address,
    /// Token name, `"unknown"` when the contract exposes none
    pub name: String,
    /// Token symbol, `"unknown"` when the contract exposes none
    pub symbol: String,
    /// Decimals; `None` when `decimals()` reverted
    pub decimals: Option<u8>,
    /// Sum of the amounts of all live bids in this currency
    pub liquidity: U256,
}

impl Entity for Currency {
    type Key = Address;
    const KIND: EntityKind = EntityKind::Currency;

    fn key(&self) -> Address {
        self.id
    }
}
