//! Host boundary: batched entrypoints over raw byte buffers.
//!
//! Owns one process-wide [`Engine`] behind a lazily-initialized lock, for
//! embedding behind a host ABI that only deals in raw byte buffers. The
//! engine type itself (`crate::engine::Engine`) is not a singleton; this
//! module is the one place that makes it one.

use std::sync::{Mutex, MutexGuard, OnceLock};

use tracing::{instrument, warn};

use crate::engine::Engine;
use crate::error::HostError;
use crate::protocol::{Account, CreateAccountsResult, CreateTransfersResult, Transfer};
use crate::scratch::Scratch;
use crate::store::StoreConfig;

struct HostState {
    engine: Engine,
    scratch: Scratch,
}

static HOST: OnceLock<Mutex<HostState>> = OnceLock::new();

/// Initialize the process-wide engine with the given table capacities.
/// Calling this again re-initializes with a fresh, empty engine.
pub fn init(config: StoreConfig) {
    let state = HostState {
        engine: Engine::with_system_clock(config),
        scratch: Scratch::new(),
    };
    match HOST.set(Mutex::new(state)) {
        Ok(()) => {}
        Err(_) => {
            // Already initialized; reset in place rather than leaving the
            // old engine live under a stale lock.
            let mut guard = HOST.get().unwrap().lock().unwrap();
            guard.engine = Engine::with_system_clock(config);
            guard.scratch = Scratch::new();
        }
    }
}

fn lock() -> Result<MutexGuard<'static, HostState>, HostError> {
    HOST.get().ok_or(HostError::NotInitialized)?.lock().map_err(|_| HostError::NotInitialized)
}

fn bytes_to_records<T: Copy>(bytes: &[u8]) -> Result<&[T], HostError> {
    let record_size = std::mem::size_of::<T>();
    if bytes.len() % record_size != 0 {
        return Err(HostError::BadSize);
    }
    let count = bytes.len() / record_size;
    // SAFETY: `T` is one of the crate's `repr(C)` wire records with no
    // padding-sensitive invariants beyond the bit patterns its plain
    // integer/bitflags fields already accept, and `bytes.len()` has just
    // been checked to be an exact multiple of `size_of::<T>()`.
    Ok(unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const T, count) })
}

fn warn_failures_accounts(results: &[CreateAccountsResult]) {
    for r in results {
        if r.result != crate::protocol::CreateAccountResult::Exists {
            warn!(index = r.index, result = ?r.result, "create_accounts record failed");
        }
    }
}

fn warn_failures_transfers(results: &[CreateTransfersResult]) {
    for r in results {
        warn!(index = r.index, result = ?r.result, "create_transfers record failed");
    }
}

/// Validate and commit a batch of `Account` records packed in `bytes`.
/// Returns the sparse `{index, result}` list for records that did not
/// succeed.
#[instrument(skip(bytes), fields(record_count))]
pub fn create_accounts(bytes: &[u8]) -> Result<Vec<CreateAccountsResult>, HostError> {
    let accounts: &[Account] = bytes_to_records(bytes)?;
    tracing::Span::current().record("record_count", accounts.len());
    let mut guard = lock()?;
    let results = guard.engine.create_accounts(accounts);
    warn_failures_accounts(&results);
    Ok(results)
}

/// Validate and commit a batch of `Transfer` records packed in `bytes`.
/// Returns the sparse `{index, result}` list for records that did not
/// succeed (idempotent `Exists` is suppressed, per the engine's
/// `create_transfers` convention).
#[instrument(skip(bytes), fields(record_count))]
pub fn create_transfers(bytes: &[u8]) -> Result<Vec<CreateTransfersResult>, HostError> {
    let transfers: &[Transfer] = bytes_to_records(bytes)?;
    tracing::Span::current().record("record_count", transfers.len());
    let mut guard = lock()?;
    let results = guard.engine.create_transfers(transfers);
    warn_failures_transfers(&results);
    Ok(results)
}

/// Resolve a batch of ids packed in `bytes` to their accounts.
#[instrument(skip(bytes))]
pub fn lookup_accounts(bytes: &[u8]) -> Result<Vec<Account>, HostError> {
    let ids: &[u128] = bytes_to_records(bytes)?;
    let guard = lock()?;
    Ok(guard.engine.lookup_accounts(ids))
}

/// Resolve a batch of ids packed in `bytes` to their transfers.
#[instrument(skip(bytes))]
pub fn lookup_transfers(bytes: &[u8]) -> Result<Vec<Transfer>, HostError> {
    let ids: &[u128] = bytes_to_records(bytes)?;
    let guard = lock()?;
    Ok(guard.engine.lookup_transfers(ids))
}

/// All transfers touching `account_id`, up to `limit` entries.
#[instrument]
pub fn account_transfers(account_id: u128, limit: usize) -> Result<Vec<Transfer>, HostError> {
    let guard = lock()?;
    Ok(guard.engine.account_transfers(account_id, limit))
}

/// No-op; present for host-loop symmetry with hosts that drive the
/// engine on a tick rather than call-by-call.
pub fn tick() {}

/// The current host clock reading.
pub fn timestamp() -> Result<u64, HostError> {
    Ok(lock()?.engine.timestamp())
}

/// Packed `major << 16 | minor << 8 | patch` engine version.
pub fn version() -> u32 {
    const MAJOR: u32 = 0;
    const MINOR: u32 = 1;
    const PATCH: u32 = 0;
    (MAJOR << 16) | (MINOR << 8) | PATCH
}

/// Bytes required to serialize the current state.
pub fn state_size() -> Result<usize, HostError> {
    Ok(lock()?.engine.state_size())
}

/// Serialize the current state into `buf`.
pub fn save_state(buf: &mut [u8]) -> Result<usize, HostError> {
    lock()?.engine.save_state(buf)
}

/// Replace the current state with the snapshot in `buf`.
pub fn load_state(buf: &[u8]) -> Result<(), HostError> {
    lock()?.engine.load_state(buf)
}

/// Persist the current state to a file at `path`, standing in for the
/// exported-function table's `persist_state(fd)`.
pub fn persist_state(path: &std::path::Path) -> Result<(), HostError> {
    let guard = lock()?;
    let size = guard.engine.state_size();
    let mut buf = vec![0u8; size];
    guard.engine.save_state(&mut buf)?;
    std::fs::write(path, &buf).map_err(|_| HostError::SnapshotIoFailure)
}

/// Restore state from a file at `path`, standing in for
/// `restore_state(fd, max)`.
pub fn restore_state(path: &std::path::Path) -> Result<(), HostError> {
    let buf = std::fs::read(path).map_err(|_| HostError::SnapshotIoFailure)?;
    let mut guard = lock()?;
    guard.engine.load_state(&buf)
}

/// Borrow the scratch buffer for request/response staging.
pub fn with_scratch<R>(f: impl FnOnce(&mut [u8]) -> R) -> Result<R, HostError> {
    let mut guard = lock()?;
    Ok(f(guard.scratch.as_mut_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AccountFlags;

    fn raw_account(id: u128) -> Vec<u8> {
        let account = Account {
            id,
            ledger: 1,
            code: 1,
            flags: AccountFlags::empty(),
            ..Default::default()
        };
        // SAFETY: test-only reinterpretation of a single repr(C) record.
        unsafe {
            std::slice::from_raw_parts(
                &account as *const Account as *const u8,
                std::mem::size_of::<Account>(),
            )
        }
        .to_vec()
    }

    #[test]
    fn rejects_calls_before_init() {
        // Each test process shares the static; this test only asserts the
        // shape of the error, not a pristine uninitialized state, since
        // other tests in this binary may have already called `init`.
        if HOST.get().is_none() {
            assert_eq!(timestamp(), Err(HostError::NotInitialized));
        }
    }

    #[test]
    fn create_accounts_round_trips_through_raw_bytes() {
        init(StoreConfig::default());
        let bytes = raw_account(777);
        let failures = create_accounts(&bytes).unwrap();
        assert!(failures.is_empty());
    }

    #[test]
    fn malformed_length_is_rejected() {
        init(StoreConfig::default());
        let bytes = vec![0u8; 5];
        assert_eq!(create_accounts(&bytes), Err(HostError::BadSize));
    }
}
