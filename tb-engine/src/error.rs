//! Host-call error plane (negative integer codes returned by the host
//! boundary entrypoints). Distinct from the per-record domain result
//! codes in `crate::protocol`, which are values, not exceptions.

use thiserror::Error;

/// An error returned by a host-boundary entrypoint, as opposed to a
/// per-record domain result written to a sparse result buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum HostError {
    /// The engine has not been initialized.
    #[error("engine not initialized")]
    NotInitialized,
    /// The input byte length was not a multiple of the record size, or
    /// exceeded what the engine is willing to process in one call.
    #[error("malformed or oversized byte length")]
    BadSize,
    /// A snapshot read or write failed (bad magic, truncated buffer, or
    /// unsupported version).
    #[error("snapshot I/O failure")]
    SnapshotIoFailure,
    /// A snapshot's account count exceeds this engine's configured
    /// capacity.
    #[error("snapshot has too many accounts for this engine's capacity")]
    SnapshotTooManyAccounts,
    /// A snapshot's transfer count exceeds this engine's configured
    /// capacity.
    #[error("snapshot has too many transfers for this engine's capacity")]
    SnapshotTooManyTransfers,
    /// A snapshot's pending-transfer count exceeds this engine's
    /// configured capacity.
    #[error("snapshot has too many pending transfers for this engine's capacity")]
    SnapshotTooManyPendingTransfers,
    /// The destination buffer passed to `save_state` is smaller than
    /// `state_size`.
    #[error("snapshot output buffer too small")]
    SnapshotBufferTooSmall,
    /// The requested entrypoint is present in the surface but not
    /// exercised by this engine.
    #[error("not implemented")]
    NotImplemented,
}

impl HostError {
    /// The negative integer code this error maps to across the host
    /// boundary.
    pub fn code(self) -> i32 {
        match self {
            HostError::NotInitialized => -1,
            HostError::BadSize => -2,
            HostError::SnapshotIoFailure => -3,
            HostError::SnapshotTooManyAccounts => -4,
            HostError::SnapshotBufferTooSmall => -5,
            HostError::SnapshotTooManyTransfers => -6,
            HostError::SnapshotTooManyPendingTransfers => -7,
            HostError::NotImplemented => -100,
        }
    }
}
