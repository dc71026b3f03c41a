//! Versioned binary snapshot codec.
//!
//! The header is packed explicitly, little-endian, field by field. The
//! body is the homogeneous `Account`/`Transfer`/`PendingTransferInfo`
//! arrays reinterpreted as raw bytes, the same way the wire header casts
//! itself to a fixed byte array.

use crate::error::HostError;
use crate::protocol::{Account, PendingTransferInfo, Transfer};
use crate::store::{Store, StoreConfig};

/// Snapshot magic number, ASCII "TBST" read little-endian.
pub const MAGIC: u32 = 0x5442_5354;

const VERSION_1: u32 = 1;
const VERSION_2: u32 = 2;

const HEADER_SIZE: usize = 28;

/// Bytes required to save the current contents of `store`.
pub fn state_size(store: &Store) -> usize {
    HEADER_SIZE
        + store.account_count() * std::mem::size_of::<Account>()
        + store.transfer_count() * std::mem::size_of::<Transfer>()
        + store.pending_count() * std::mem::size_of::<PendingTransferInfo>()
}

/// Serialize `store` (current version 2 layout) into `buf`. Returns the
/// number of bytes written.
pub fn save_state(store: &Store, buf: &mut [u8]) -> Result<usize, HostError> {
    let needed = state_size(store);
    if buf.len() < needed {
        return Err(HostError::SnapshotBufferTooSmall);
    }

    let mut offset = 0;
    write_u32(buf, &mut offset, MAGIC);
    write_u32(buf, &mut offset, VERSION_2);
    write_u32(buf, &mut offset, store.account_count() as u32);
    write_u32(buf, &mut offset, store.transfer_count() as u32);
    write_u32(buf, &mut offset, store.pending_count() as u32);
    write_u64(buf, &mut offset, store.commit_timestamp);

    write_records(buf, &mut offset, store.accounts());
    write_records(buf, &mut offset, store.transfers());
    write_records(buf, &mut offset, store.pending_entries());

    Ok(offset)
}

/// Deserialize a snapshot from `buf` into a fresh [`Store`] configured
/// with `config`. Accepts version 1 (accounts only) and version 2
/// (accounts, transfers, pending) layouts.
pub fn load_state(buf: &[u8], config: StoreConfig) -> Result<Store, HostError> {
    if buf.len() < 8 {
        return Err(HostError::SnapshotIoFailure);
    }
    let mut offset = 0;
    let magic = read_u32(buf, &mut offset)?;
    if magic != MAGIC {
        return Err(HostError::SnapshotIoFailure);
    }
    let version = read_u32(buf, &mut offset)?;

    let config = config.clamped();

    match version {
        VERSION_1 => {
            let account_count = read_u32(buf, &mut offset)? as usize;
            let commit_timestamp = read_u64(buf, &mut offset)?;
            let _reserved = read_u64(buf, &mut offset)?;

            if account_count > config.max_accounts {
                return Err(HostError::SnapshotTooManyAccounts);
            }
            let accounts = read_records::<Account>(buf, &mut offset, account_count)?;

            Ok(Store::rebuild_from_parts(
                config,
                accounts,
                Vec::new(),
                Vec::new(),
                commit_timestamp,
            ))
        }
        VERSION_2 => {
            let account_count = read_u32(buf, &mut offset)? as usize;
            let transfer_count = read_u32(buf, &mut offset)? as usize;
            let pending_count = read_u32(buf, &mut offset)? as usize;
            let commit_timestamp = read_u64(buf, &mut offset)?;

            if account_count > config.max_accounts {
                return Err(HostError::SnapshotTooManyAccounts);
            }
            if transfer_count > config.max_transfers {
                return Err(HostError::SnapshotTooManyTransfers);
            }
            if pending_count > config.max_pending_transfers {
                return Err(HostError::SnapshotTooManyPendingTransfers);
            }

            let accounts = read_records::<Account>(buf, &mut offset, account_count)?;
            let transfers = read_records::<Transfer>(buf, &mut offset, transfer_count)?;
            let pending = read_records::<PendingTransferInfo>(buf, &mut offset, pending_count)?;

            if offset != buf.len() {
                return Err(HostError::SnapshotIoFailure);
            }

            Ok(Store::rebuild_from_parts(
                config,
                accounts,
                transfers,
                pending,
                commit_timestamp,
            ))
        }
        _ => Err(HostError::SnapshotIoFailure),
    }
}

fn write_u32(buf: &mut [u8], offset: &mut usize, value: u32) {
    buf[*offset..*offset + 4].copy_from_slice(&value.to_le_bytes());
    *offset += 4;
}

fn write_u64(buf: &mut [u8], offset: &mut usize, value: u64) {
    buf[*offset..*offset + 8].copy_from_slice(&value.to_le_bytes());
    *offset += 8;
}

fn read_u32(buf: &[u8], offset: &mut usize) -> Result<u32, HostError> {
    let end = *offset + 4;
    let bytes: [u8; 4] = buf
        .get(*offset..end)
        .ok_or(HostError::SnapshotIoFailure)?
        .try_into()
        .map_err(|_| HostError::SnapshotIoFailure)?;
    *offset = end;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u64(buf: &[u8], offset: &mut usize) -> Result<u64, HostError> {
    let end = *offset + 8;
    let bytes: [u8; 8] = buf
        .get(*offset..end)
        .ok_or(HostError::SnapshotIoFailure)?
        .try_into()
        .map_err(|_| HostError::SnapshotIoFailure)?;
    *offset = end;
    Ok(u64::from_le_bytes(bytes))
}

fn write_records<T: Copy>(buf: &mut [u8], offset: &mut usize, records: &[T]) {
    let byte_len = std::mem::size_of_val(records);
    // SAFETY: `T` is one of our `repr(C)` wire types with no padding bytes
    // left uninitialized (every field is itself a plain integer or
    // bitflags wrapper); reinterpreting the slice as bytes is a plain
    // layout-preserving reinterpretation.
    let bytes: &[u8] = unsafe { std::slice::from_raw_parts(records.as_ptr() as *const u8, byte_len) };
    buf[*offset..*offset + byte_len].copy_from_slice(bytes);
    *offset += byte_len;
}

fn read_records<T: Copy>(buf: &[u8], offset: &mut usize, count: usize) -> Result<Vec<T>, HostError> {
    let byte_len = count * std::mem::size_of::<T>();
    let slice = buf
        .get(*offset..*offset + byte_len)
        .ok_or(HostError::SnapshotIoFailure)?;
    *offset += byte_len;
    let mut out = Vec::with_capacity(count);
    // SAFETY: `slice` is exactly `count * size_of::<T>()` bytes sourced
    // from a buffer the caller asserts holds a snapshot written by
    // `write_records`, and `T` is `Copy` with no invalid bit patterns for
    // the field types it is built from (plain integers and bitflags).
    unsafe {
        let typed = std::slice::from_raw_parts(slice.as_ptr() as *const T, count);
        out.extend_from_slice(typed);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::create_account;
    use crate::protocol::CreateAccountResult;

    #[test]
    fn round_trips_an_empty_store() {
        let store = Store::new(StoreConfig::default());
        let mut buf = vec![0u8; state_size(&store)];
        let written = save_state(&store, &mut buf).unwrap();
        assert_eq!(written, buf.len());
        let loaded = load_state(&buf, StoreConfig::default()).unwrap();
        assert_eq!(loaded.account_count(), 0);
    }

    #[test]
    fn round_trips_accounts_and_preserves_lookups() {
        let mut store = Store::new(StoreConfig::default());
        let account = Account {
            id: 42,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        assert_eq!(
            create_account(&mut store, account, 7),
            CreateAccountResult::Ok
        );

        let mut buf = vec![0u8; state_size(&store)];
        save_state(&store, &mut buf).unwrap();
        let loaded = load_state(&buf, StoreConfig::default()).unwrap();
        let restored = loaded.find_account(42).unwrap();
        assert_eq!(restored.timestamp, 7);
        assert_eq!(restored.ledger, 1);
    }

    #[test]
    fn rejects_undersized_buffer() {
        let mut store = Store::new(StoreConfig::default());
        let account = Account {
            id: 1,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        create_account(&mut store, account, 1);
        let mut buf = vec![0u8; state_size(&store) - 1];
        assert_eq!(
            save_state(&store, &mut buf),
            Err(HostError::SnapshotBufferTooSmall)
        );
    }

    #[test]
    fn version_1_layout_loads_with_zero_transfers_and_pending() {
        let mut buf = vec![0u8; HEADER_SIZE + std::mem::size_of::<Account>()];
        let mut offset = 0;
        write_u32(&mut buf, &mut offset, MAGIC);
        write_u32(&mut buf, &mut offset, VERSION_1);
        write_u32(&mut buf, &mut offset, 1);
        write_u64(&mut buf, &mut offset, 5);
        write_u64(&mut buf, &mut offset, 0);
        let account = Account {
            id: 9,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        write_records(&mut buf, &mut offset, std::slice::from_ref(&account));

        let loaded = load_state(&buf, StoreConfig::default()).unwrap();
        assert_eq!(loaded.account_count(), 1);
        assert_eq!(loaded.transfer_count(), 0);
        assert_eq!(loaded.pending_count(), 0);
        assert_eq!(loaded.find_account(9).unwrap().ledger, 1);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = vec![0u8; HEADER_SIZE];
        assert_eq!(
            load_state(&buf, StoreConfig::default()),
            Err(HostError::SnapshotIoFailure)
        );
    }
}
