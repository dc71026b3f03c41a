//! Fixed-capacity append-only tables for accounts, transfers, and pending
//! transfer side-table entries.
//!
//! Records are never moved or deleted once inserted: a table index is a
//! stable, opaque handle for the lifetime of the engine. Primary-key lookup
//! is conceptually a linear scan over a bounded-capacity table, which keeps
//! the worst case small and avoids needing a heap-backed hash map on a host
//! that may not offer one; this engine additionally keeps an internal
//! `HashMap<u128, u32>` per table as a lookup accelerator. The index is
//! rebuilt deterministically from the arrays on `load_state` and never
//! affects the snapshot bytes.

use std::collections::HashMap;

use crate::protocol::{Account, PendingTransferInfo, Transfer};

/// Default capacity for the accounts table.
pub const DEFAULT_MAX_ACCOUNTS: usize = 10_000;
/// Default capacity for the transfers table.
pub const DEFAULT_MAX_TRANSFERS: usize = 50_000;
/// Default capacity for the pending-transfers side table.
pub const DEFAULT_MAX_PENDING_TRANSFERS: usize = 10_000;

/// Upper ceiling no configured capacity may exceed; keeps worst-case
/// memory and linear-scan cost bounded regardless of host configuration.
pub const CAPACITY_CEILING: usize = 1 << 20;

/// Table capacities, configurable at construction time.
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    /// Maximum number of accounts.
    pub max_accounts: usize,
    /// Maximum number of transfers.
    pub max_transfers: usize,
    /// Maximum number of pending-transfer side-table entries.
    pub max_pending_transfers: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_accounts: DEFAULT_MAX_ACCOUNTS,
            max_transfers: DEFAULT_MAX_TRANSFERS,
            max_pending_transfers: DEFAULT_MAX_PENDING_TRANSFERS,
        }
    }
}

impl StoreConfig {
    /// Clamp each capacity to [`CAPACITY_CEILING`].
    pub fn clamped(mut self) -> Self {
        self.max_accounts = self.max_accounts.min(CAPACITY_CEILING);
        self.max_transfers = self.max_transfers.min(CAPACITY_CEILING);
        self.max_pending_transfers = self.max_pending_transfers.min(CAPACITY_CEILING);
        self
    }
}

/// The three append-only tables plus commit bookkeeping.
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,

    accounts: Vec<Account>,
    account_index: HashMap<u128, u32>,

    transfers: Vec<Transfer>,
    transfer_index: HashMap<u128, u32>,

    pending: Vec<PendingTransferInfo>,
    pending_index: HashMap<u128, u32>,

    /// Timestamp of the most recently committed record.
    pub commit_timestamp: u64,
}

impl Store {
    /// Create an empty store with the given capacities.
    pub fn new(config: StoreConfig) -> Self {
        let config = config.clamped();
        Self {
            accounts: Vec::with_capacity(config.max_accounts.min(1024)),
            account_index: HashMap::new(),
            transfers: Vec::with_capacity(config.max_transfers.min(1024)),
            transfer_index: HashMap::new(),
            pending: Vec::with_capacity(config.max_pending_transfers.min(1024)),
            pending_index: HashMap::new(),
            commit_timestamp: 0,
            config,
        }
    }

    /// The configured table capacities.
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    // --- accounts -----------------------------------------------------

    /// Number of accounts committed so far.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// True if the accounts table cannot accept another insertion.
    pub fn accounts_full(&self) -> bool {
        self.accounts.len() >= self.config.max_accounts
    }

    /// Append an account. Panics if the table is full; callers must check
    /// [`Store::accounts_full`] first.
    pub fn insert_account(&mut self, account: Account) {
        assert!(!self.accounts_full(), "accounts table at capacity");
        let index = self.accounts.len() as u32;
        self.account_index.insert(account.id, index);
        self.accounts.push(account);
    }

    /// Find an account by id.
    pub fn find_account(&self, id: u128) -> Option<&Account> {
        self.account_index.get(&id).map(|&i| &self.accounts[i as usize])
    }

    /// Find a mutable account by id.
    pub fn find_account_mut(&mut self, id: u128) -> Option<&mut Account> {
        match self.account_index.get(&id) {
            Some(&i) => Some(&mut self.accounts[i as usize]),
            None => None,
        }
    }

    /// All accounts in commit order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    // --- transfers ------------------------------------------------------

    /// Number of transfers committed so far.
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// True if the transfers table cannot accept another insertion.
    pub fn transfers_full(&self) -> bool {
        self.transfers.len() >= self.config.max_transfers
    }

    /// Append a transfer. Panics if the table is full; callers must check
    /// [`Store::transfers_full`] first.
    pub fn insert_transfer(&mut self, transfer: Transfer) {
        assert!(!self.transfers_full(), "transfers table at capacity");
        let index = self.transfers.len() as u32;
        self.transfer_index.insert(transfer.id, index);
        self.transfers.push(transfer);
    }

    /// Find a transfer by id.
    pub fn find_transfer(&self, id: u128) -> Option<&Transfer> {
        self.transfer_index.get(&id).map(|&i| &self.transfers[i as usize])
    }

    /// All transfers in commit order.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    // --- pending-transfer side table -------------------------------------

    /// Number of pending-transfer entries committed so far.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// True if the pending-transfers table cannot accept another insertion.
    pub fn pending_full(&self) -> bool {
        self.pending.len() >= self.config.max_pending_transfers
    }

    /// Append a pending-transfer entry. Panics if the table is full;
    /// callers must check [`Store::pending_full`] first.
    pub fn insert_pending(&mut self, info: PendingTransferInfo) {
        assert!(!self.pending_full(), "pending-transfers table at capacity");
        let index = self.pending.len() as u32;
        self.pending_index.insert(info.id, index);
        self.pending.push(info);
    }

    /// Find a pending-transfer entry by its original transfer id.
    pub fn find_pending(&self, id: u128) -> Option<&PendingTransferInfo> {
        self.pending_index.get(&id).map(|&i| &self.pending[i as usize])
    }

    /// Find a mutable pending-transfer entry by its original transfer id.
    pub fn find_pending_mut(&mut self, id: u128) -> Option<&mut PendingTransferInfo> {
        match self.pending_index.get(&id) {
            Some(&i) => Some(&mut self.pending[i as usize]),
            None => None,
        }
    }

    /// All pending-transfer entries in commit order.
    pub fn pending_entries(&self) -> &[PendingTransferInfo] {
        &self.pending
    }

    // --- snapshot support -------------------------------------------------

    /// Rebuild the store from already-deserialized arrays (used by the
    /// snapshot loader). Rebuilds the secondary indexes from scratch.
    pub fn rebuild_from_parts(
        config: StoreConfig,
        accounts: Vec<Account>,
        transfers: Vec<Transfer>,
        pending: Vec<PendingTransferInfo>,
        commit_timestamp: u64,
    ) -> Self {
        let mut account_index = HashMap::with_capacity(accounts.len());
        for (i, a) in accounts.iter().enumerate() {
            account_index.insert(a.id, i as u32);
        }
        let mut transfer_index = HashMap::with_capacity(transfers.len());
        for (i, t) in transfers.iter().enumerate() {
            transfer_index.insert(t.id, i as u32);
        }
        let mut pending_index = HashMap::with_capacity(pending.len());
        for (i, p) in pending.iter().enumerate() {
            pending_index.insert(p.id, i as u32);
        }
        Self {
            config: config.clamped(),
            accounts,
            account_index,
            transfers,
            transfer_index,
            pending,
            pending_index,
            commit_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: u128) -> Account {
        Account {
            id,
            ledger: 1,
            code: 1,
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_find_account() {
        let mut store = Store::new(StoreConfig::default());
        store.insert_account(account(1));
        assert!(store.find_account(1).is_some());
        assert!(store.find_account(2).is_none());
        assert_eq!(store.account_count(), 1);
    }

    #[test]
    fn capacity_is_respected() {
        let config = StoreConfig {
            max_accounts: 2,
            ..StoreConfig::default()
        };
        let mut store = Store::new(config);
        store.insert_account(account(1));
        store.insert_account(account(2));
        assert!(store.accounts_full());
    }

    #[test]
    fn rebuild_from_parts_restores_lookups() {
        let accounts = vec![account(1), account(2)];
        let store = Store::rebuild_from_parts(
            StoreConfig::default(),
            accounts,
            Vec::new(),
            Vec::new(),
            42,
        );
        assert!(store.find_account(1).is_some());
        assert!(store.find_account(2).is_some());
        assert_eq!(store.commit_timestamp, 42);
    }
}
