//! Fixed-layout records and result codes that cross the host boundary.
//!
//! This is the "wire format" of the engine: the byte-stable `Account` and
//! `Transfer` records, their flag bitsets, and the result-code enumerations
//! clients depend on for precise error recovery.

pub mod types;

pub use types::{
    Account, AccountFlags, CreateAccountResult, CreateAccountsResult, CreateTransferResult,
    CreateTransfersResult, PendingState, PendingTransferInfo, Transfer, TransferFlags,
};
