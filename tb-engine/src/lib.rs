//! Embeddable double-entry accounting state machine.
//!
//! This crate provides an in-memory, deterministic engine for accounts and
//! two-phase transfers: a synchronous, single-process library with no
//! connection, no async runtime requirement, and no distributed consensus
//! protocol anywhere in this crate.
//!
//! # Layers
//!
//! - [`protocol`]: fixed-layout `Account`/`Transfer` records, flag bitsets,
//!   and result-code enumerations — the "wire format" of the engine.
//! - [`store`]: fixed-capacity, append-only tables for accounts, transfers,
//!   and pending-transfer bookkeeping.
//! - [`account`] / [`transfer`] / [`twophase`]: validation and application.
//! - [`query`]: point lookups and per-account transfer history.
//! - [`snapshot`]: the versioned binary state codec.
//! - [`engine`]: [`Engine`], the owned facade tying the above together.
//! - [`host`]: a process-wide singleton over raw byte buffers, for
//!   embedding behind a narrower host ABI.
//!
//! # Quick Start
//!
//! ```
//! use tb_engine::{Engine, StoreConfig, Account};
//!
//! let mut engine = Engine::with_system_clock(StoreConfig::default());
//!
//! let a = Account { id: tb_engine::id(), ledger: 1, code: 1, ..Default::default() };
//! let b = Account { id: tb_engine::id(), ledger: 1, code: 1, ..Default::default() };
//! let failures = engine.create_accounts(&[a, b]);
//! assert!(failures.is_empty());
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod account;
pub mod engine;
pub mod error;
mod math;
pub mod host;
pub mod protocol;
pub mod query;
pub mod scratch;
pub mod snapshot;
pub mod store;
pub mod transfer;
pub mod twophase;

pub use engine::{ClockSource, Engine, SystemClock};
pub use error::HostError;
pub use store::{Store, StoreConfig};

// Re-export protocol types
pub use protocol::{
    Account, AccountFlags, CreateAccountResult, CreateAccountsResult, CreateTransferResult,
    CreateTransfersResult, PendingState, PendingTransferInfo, Transfer, TransferFlags,
};

/// Generate a unique 128-bit ID.
///
/// Creates a globally unique identifier using timestamp and random data,
/// suitable for account or transfer IDs.
///
/// # Example
///
/// ```
/// let account_id = tb_engine::id();
/// let transfer_id = tb_engine::id();
/// assert_ne!(account_id, transfer_id);
/// ```
pub fn id() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64;

    let random: u64 = rand::random();

    ((timestamp as u128) << 64) | (random as u128)
}
