//! User upsert.

use alloy_primitives::Address;
use tracing::debug;

use crate::error::Result;
use crate::model::User;
use crate::storage::{EntityStore, StorageBackend};

/// Find-or-create for [`User`] records
pub struct IdentityResolver<'a, B: StorageBackend> {
    store: &'a EntityStore<B>,
}

impl<'a, B: StorageBackend> IdentityResolver<'a, B> {
    /// Create a resolver over a store
    pub fn new(store: &'a EntityStore<B>) -> Self {
        Self { store }
    }

    /// Load the user at `address`, creating an empty record on first sight
    pub fn find_or_create_user(&self, address: Address) -> Result<User> {
        if let Some(user) = self.store.load::<User>(&address)? {
            return Ok(user);
        }

        let user = User::new(address);
        self.store.save(&user)?;
        debug!(user = %address, "Created user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EntityKind, InMemoryStore};

    #[test]
    fn test_find_or_create_is_idempotent() {
        let store = EntityStore::new(InMemoryStore::new());
        let resolver = IdentityResolver::new(&store);
        let addr = Address::repeat_byte(0x0a);

        let first = resolver.find_or_create_user(addr).unwrap();
        assert!(first.authorized_users.is_empty());

        let mut updated = first.clone();
        updated.authorized_users.insert(Address::repeat_byte(0x0b));
        store.save(&updated).unwrap();

        let second = resolver.find_or_create_user(addr).unwrap();
        assert_eq!(second, updated);
        assert_eq!(store.count(EntityKind::User).unwrap(), 1);
    }
}
