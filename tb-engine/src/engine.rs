//! The engine facade: an owned value tying the store, validators, query
//! surface, and snapshot codec together behind one typed API.
//!
//! Constructed once via [`Engine::new`], not a process-wide singleton by
//! itself (the host-boundary shim in `crate::host` is the one place that
//! holds an `Engine` behind process-wide interior mutability).

use crate::account::create_account;
use crate::error::HostError;
use crate::protocol::{
    Account, CreateAccountResult, CreateAccountsResult, CreateTransferResult,
    CreateTransfersResult, Transfer,
};
use crate::query;
use crate::snapshot;
use crate::store::{Store, StoreConfig};
use crate::transfer::create_transfer;

/// Source of the host's monotonic clock, nanoseconds since an unspecified
/// epoch. Modeled as a trait so tests can supply a fake.
pub trait ClockSource {
    /// Current time, in nanoseconds, from a monotonic (never-decreasing)
    /// source.
    fn now(&self) -> u64;
}

/// [`ClockSource`] backed by the operating system's wall clock.
#[derive(Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// The accounting state machine: a [`Store`] plus the clock used to
/// assign commit timestamps.
pub struct Engine {
    store: Store,
    clock: Box<dyn ClockSource + Send>,
}

impl Engine {
    /// Construct a fresh, empty engine with the given table capacities
    /// and clock source.
    pub fn new(config: StoreConfig, clock: Box<dyn ClockSource + Send>) -> Self {
        Self {
            store: Store::new(config),
            clock,
        }
    }

    /// Construct a fresh engine using the system clock.
    pub fn with_system_clock(config: StoreConfig) -> Self {
        Self::new(config, Box::new(SystemClock))
    }

    /// Validate and commit each account in `batch`, in order. Returns
    /// only the entries for accounts that did not succeed, each paired
    /// with its index in `batch` — a fully successful batch returns an
    /// empty vector. Unlike `create_transfers`, `Exists` is reported, not
    /// suppressed.
    pub fn create_accounts(&mut self, batch: &[Account]) -> Vec<CreateAccountsResult> {
        let base = self.clock.now();
        let mut failures = Vec::new();
        for (index, account) in batch.iter().enumerate() {
            let timestamp = base + index as u64;
            let result = create_account(&mut self.store, *account, timestamp);
            if !result.is_ok() {
                failures.push(CreateAccountsResult {
                    index: index as u32,
                    result,
                });
            }
        }
        failures
    }

    /// Validate and commit each transfer in `batch`, in order. Returns
    /// only the entries for transfers that did not succeed and were not
    /// an idempotent resubmission (`Exists` is suppressed here, unlike
    /// `create_accounts`).
    pub fn create_transfers(&mut self, batch: &[Transfer]) -> Vec<CreateTransfersResult> {
        let base = self.clock.now();
        let mut failures = Vec::new();
        for (index, transfer) in batch.iter().enumerate() {
            let timestamp = base + index as u64;
            let result = create_transfer(&mut self.store, *transfer, timestamp);
            if !result.is_ok() && result != CreateTransferResult::Exists {
                failures.push(CreateTransfersResult {
                    index: index as u32,
                    result,
                });
            }
        }
        failures
    }

    /// Resolve each id to its account, preserving input order and
    /// omitting ids that do not exist.
    pub fn lookup_accounts(&self, ids: &[u128]) -> Vec<Account> {
        query::lookup_accounts(&self.store, ids)
    }

    /// Resolve each id to its transfer, preserving input order and
    /// omitting ids that do not exist.
    pub fn lookup_transfers(&self, ids: &[u128]) -> Vec<Transfer> {
        query::lookup_transfers(&self.store, ids)
    }

    /// All transfers debiting or crediting `account_id`, in commit order,
    /// up to `limit` entries.
    pub fn account_transfers(&self, account_id: u128, limit: usize) -> Vec<Transfer> {
        query::account_transfers(&self.store, account_id, limit)
    }

    /// Bytes required to serialize the current state.
    pub fn state_size(&self) -> usize {
        snapshot::state_size(&self.store)
    }

    /// Serialize the current state into `buf`. Returns the number of
    /// bytes written.
    pub fn save_state(&self, buf: &mut [u8]) -> Result<usize, HostError> {
        snapshot::save_state(&self.store, buf)
    }

    /// Replace the engine's state with the snapshot in `buf`, preserving
    /// the currently configured table capacities. On failure the engine's
    /// existing state is left untouched.
    pub fn load_state(&mut self, buf: &[u8]) -> Result<(), HostError> {
        let config = self.store.config();
        let restored = snapshot::load_state(buf, config)?;
        self.store = restored;
        Ok(())
    }

    /// The current host clock reading.
    pub fn timestamp(&self) -> u64 {
        self.clock.now()
    }

    /// The configured table capacities.
    pub fn config(&self) -> StoreConfig {
        self.store.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{AccountFlags, TransferFlags};
    use std::cell::Cell;

    struct FakeClock(Cell<u64>);

    impl ClockSource for FakeClock {
        fn now(&self) -> u64 {
            let v = self.0.get();
            self.0.set(v + 1_000_000);
            v
        }
    }

    fn engine() -> Engine {
        Engine::new(StoreConfig::default(), Box::new(FakeClock(Cell::new(1))))
    }

    fn account(id: u128) -> Account {
        Account {
            id,
            ledger: 1,
            code: 1,
            ..Default::default()
        }
    }

    #[test]
    fn successful_batch_reports_no_failures() {
        let mut e = engine();
        let failures = e.create_accounts(&[account(1), account(2)]);
        assert!(failures.is_empty());
        assert_eq!(e.lookup_accounts(&[1, 2]).len(), 2);
    }

    #[test]
    fn create_accounts_reports_exists_but_create_transfers_suppresses_it() {
        let mut e = engine();
        e.create_accounts(&[account(1), account(2)]);

        let dup = e.create_accounts(&[account(1)]);
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].result, CreateAccountResult::Exists);

        let transfer = Transfer {
            id: 100,
            debit_account_id: 1,
            credit_account_id: 2,
            amount: 10,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        assert!(e.create_transfers(&[transfer]).is_empty());
        assert!(e.create_transfers(&[transfer]).is_empty());
    }

    #[test]
    fn batch_assigns_strictly_increasing_timestamps_by_index() {
        let mut e = engine();
        e.create_accounts(&[account(1), account(2), account(3)]);
        let a1 = e.lookup_accounts(&[1])[0].timestamp;
        let a2 = e.lookup_accounts(&[2])[0].timestamp;
        let a3 = e.lookup_accounts(&[3])[0].timestamp;
        assert!(a1 < a2);
        assert!(a2 < a3);
    }

    #[test]
    fn snapshot_round_trips_through_the_facade() {
        let mut e = engine();
        e.create_accounts(&[account(1), account(2)]);
        let transfer = Transfer {
            id: 100,
            debit_account_id: 1,
            credit_account_id: 2,
            amount: 10,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        e.create_transfers(&[transfer]);

        let mut buf = vec![0u8; e.state_size()];
        e.save_state(&mut buf).unwrap();

        let mut restored = engine();
        restored.load_state(&buf).unwrap();
        assert_eq!(restored.lookup_accounts(&[1])[0].debits_posted, 10);
        assert_eq!(restored.lookup_transfers(&[100]).len(), 1);
    }

    #[test]
    fn balance_limit_violation_is_reported_once() {
        let mut e = engine();
        let mut capped = account(1);
        capped.flags = AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS;
        e.create_accounts(&[capped, account(2)]);

        let transfer = Transfer {
            id: 1,
            debit_account_id: 1,
            credit_account_id: 2,
            amount: 50,
            ledger: 1,
            code: 1,
            flags: TransferFlags::empty(),
            ..Default::default()
        };
        let failures = e.create_transfers(&[transfer]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].result, CreateTransferResult::ExceedsCredits);
    }
}
