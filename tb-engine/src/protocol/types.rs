//! Fixed-layout records that cross the host boundary.
//!
//! These types match the byte layout documented for the engine's external
//! interface: `Account` and `Transfer` are each 128 bytes, `repr(C)`, with
//! every field accounted for so the layout is stable across platforms. The
//! in-memory [`crate::store::Store`] holds these types directly; the
//! snapshot codec (`crate::snapshot`) serializes them as raw bytes.

use bitflags::bitflags;

/// A balance-bearing entity with four running counters.
///
/// `reserved` is carried as `u32` rather than `u128` so the record totals
/// exactly 128 bytes (see DESIGN.md for why this departs from a literal
/// reading of the field's declared width).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Account {
    /// Unique identifier for the account.
    pub id: u128,
    /// Sum of pending debit transfers.
    pub debits_pending: u128,
    /// Sum of posted debit transfers.
    pub debits_posted: u128,
    /// Sum of pending credit transfers.
    pub credits_pending: u128,
    /// Sum of posted credit transfers.
    pub credits_posted: u128,
    /// Opaque user data for external linking (128-bit indexed).
    pub user_data_128: u128,
    /// Opaque user data for external linking (64-bit indexed).
    pub user_data_64: u64,
    /// Opaque user data for external linking (32-bit indexed).
    pub user_data_32: u32,
    /// Reserved; must be zero.
    pub reserved: u32,
    /// The ledger this account belongs to.
    pub ledger: u32,
    /// Chart-of-accounts code describing the account type.
    pub code: u16,
    /// Account flags.
    pub flags: AccountFlags,
    /// Timestamp when the account was created (assigned by the engine).
    pub timestamp: u64,
}

const _: () = assert!(std::mem::size_of::<Account>() == 128);

bitflags! {
    /// Flags for Account configuration.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct AccountFlags: u16 {
        /// Reserved for chained-batch semantics; carried but not validated
        /// or applied by this engine (see Non-goals in SPEC_FULL.md).
        const LINKED = 1 << 0;
        /// Enforce that debits do not exceed credits.
        const DEBITS_MUST_NOT_EXCEED_CREDITS = 1 << 1;
        /// Enforce that credits do not exceed debits.
        const CREDITS_MUST_NOT_EXCEED_DEBITS = 1 << 2;
        /// Enable balance history for this account (carried, not acted on).
        const HISTORY = 1 << 3;
        /// Mark this account as imported (carried, not acted on).
        const IMPORTED = 1 << 4;
        /// Mark this account as closed.
        const CLOSED = 1 << 5;
    }
}

/// A directed movement of a u128 amount between two accounts, or a
/// two-phase post/void against a prior pending transfer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Transfer {
    /// Unique identifier for the transfer.
    pub id: u128,
    /// Account ID to debit.
    pub debit_account_id: u128,
    /// Account ID to credit.
    pub credit_account_id: u128,
    /// Amount actually applied (may differ from the amount submitted by the
    /// caller under balancing or post-of-zero semantics).
    pub amount: u128,
    /// ID of pending transfer to post or void (0 if not applicable).
    pub pending_id: u128,
    /// Opaque user data for external linking (128-bit indexed).
    pub user_data_128: u128,
    /// Opaque user data for external linking (64-bit indexed).
    pub user_data_64: u64,
    /// Opaque user data for external linking (32-bit indexed).
    pub user_data_32: u32,
    /// Timeout in seconds for pending transfers (0 for non-pending).
    pub timeout: u32,
    /// The ledger this transfer operates on.
    pub ledger: u32,
    /// Chart-of-accounts code describing the transfer type.
    pub code: u16,
    /// Transfer flags.
    pub flags: TransferFlags,
    /// Timestamp when the transfer was committed (assigned by the engine).
    pub timestamp: u64,
}

const _: () = assert!(std::mem::size_of::<Transfer>() == 128);

bitflags! {
    /// Flags for Transfer configuration.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TransferFlags: u16 {
        /// Reserved for chained-batch semantics; carried but not validated
        /// or applied by this engine.
        const LINKED = 1 << 0;
        /// Create a pending (two-phase) transfer.
        const PENDING = 1 << 1;
        /// Post a pending transfer.
        const POST_PENDING_TRANSFER = 1 << 2;
        /// Void a pending transfer.
        const VOID_PENDING_TRANSFER = 1 << 3;
        /// Balance the debit side (clamp to the maximum permitted amount).
        const BALANCING_DEBIT = 1 << 4;
        /// Balance the credit side (clamp to the maximum permitted amount).
        const BALANCING_CREDIT = 1 << 5;
        /// Close the debit account after this transfer (carried, not acted
        /// on by this engine).
        const CLOSING_DEBIT = 1 << 6;
        /// Close the credit account after this transfer (carried, not acted
        /// on by this engine).
        const CLOSING_CREDIT = 1 << 7;
        /// Mark this transfer as imported (carried, not acted on).
        const IMPORTED = 1 << 8;
    }
}

impl AccountFlags {
    /// Bits outside the named flags above; must be zero on input.
    pub const PADDING: u16 = !(Self::LINKED.bits()
        | Self::DEBITS_MUST_NOT_EXCEED_CREDITS.bits()
        | Self::CREDITS_MUST_NOT_EXCEED_DEBITS.bits()
        | Self::HISTORY.bits()
        | Self::IMPORTED.bits()
        | Self::CLOSED.bits());
}

impl TransferFlags {
    /// Bits outside the named flags above; must be zero on input.
    pub const PADDING: u16 = !(Self::LINKED.bits()
        | Self::PENDING.bits()
        | Self::POST_PENDING_TRANSFER.bits()
        | Self::VOID_PENDING_TRANSFER.bits()
        | Self::BALANCING_DEBIT.bits()
        | Self::BALANCING_CREDIT.bits()
        | Self::CLOSING_DEBIT.bits()
        | Self::CLOSING_CREDIT.bits()
        | Self::IMPORTED.bits());
}

/// Lifecycle state of a pending (two-phase) transfer.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PendingState {
    /// Awaiting a post or void; amount sits in the `_pending` counters.
    Active = 0,
    /// Fully consumed by one or more posts.
    Posted = 1,
    /// Released by a void.
    Voided = 2,
    /// Timed out before being posted or voided.
    Expired = 3,
}

/// Side-table entry tracking one pending transfer's lifecycle.
///
/// 64 bytes, `repr(C)`, serialized as raw bytes by the snapshot codec.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingTransferInfo {
    /// The id of the original `pending` transfer.
    pub id: u128,
    /// The amount submitted on the original pending transfer.
    pub original_amount: u128,
    /// Running total already moved to `_posted` by partial posts.
    pub amount_posted: u128,
    /// Absolute nanosecond timestamp after which the entry is expired, or 0
    /// for "never expires".
    pub expires_at: u64,
    /// Current lifecycle state.
    pub state: PendingState,
    /// Padding to round the record to 64 bytes; must be zero.
    pub reserved: [u8; 7],
}

const _: () = assert!(std::mem::size_of::<PendingTransferInfo>() == 64);

/// Result of validating/creating one [`Account`].
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreateAccountResult {
    /// Account created successfully.
    Ok = 0,
    /// A reserved field was set to a non-zero value.
    ReservedField = 1,
    /// A reserved flag bit was set.
    ReservedFlag = 2,
    /// Account ID must not be zero.
    IdMustNotBeZero = 3,
    /// Account ID must not be `u128::MAX`.
    IdMustNotBeIntMax = 4,
    /// Mutually exclusive balance-limit flags were set together.
    FlagsAreMutuallyExclusive = 5,
    /// `debits_pending` must be zero on creation.
    DebitsPendingMustBeZero = 6,
    /// `debits_posted` must be zero on creation.
    DebitsPostedMustBeZero = 7,
    /// `credits_pending` must be zero on creation.
    CreditsPendingMustBeZero = 8,
    /// `credits_posted` must be zero on creation.
    CreditsPostedMustBeZero = 9,
    /// Ledger must not be zero.
    LedgerMustNotBeZero = 10,
    /// Code must not be zero.
    CodeMustNotBeZero = 11,
    /// Account exists with different flags.
    ExistsWithDifferentFlags = 12,
    /// Account exists with different `user_data_128`.
    ExistsWithDifferentUserData128 = 13,
    /// Account exists with different `user_data_64`.
    ExistsWithDifferentUserData64 = 14,
    /// Account exists with different `user_data_32`.
    ExistsWithDifferentUserData32 = 15,
    /// Account exists with different ledger.
    ExistsWithDifferentLedger = 16,
    /// Account exists with different code.
    ExistsWithDifferentCode = 17,
    /// Account already exists (idempotent success).
    Exists = 18,
    /// The accounts table is at capacity.
    TooManyAccounts = 19,
}

impl Default for CreateAccountResult {
    fn default() -> Self {
        CreateAccountResult::Ok
    }
}

impl CreateAccountResult {
    /// True for the one code that represents success (idempotent or not).
    pub fn is_ok(self) -> bool {
        matches!(self, CreateAccountResult::Ok)
    }
}

/// Result of validating/applying one [`Transfer`].
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreateTransferResult {
    /// Transfer created successfully.
    Ok = 0,
    /// A reserved flag bit was set.
    ReservedFlag = 1,
    /// Transfer ID must not be zero.
    IdMustNotBeZero = 2,
    /// Transfer ID must not be `u128::MAX`.
    IdMustNotBeIntMax = 3,
    /// Transfer exists with different flags.
    ExistsWithDifferentFlags = 4,
    /// Transfer exists with different debit account.
    ExistsWithDifferentDebitAccountId = 5,
    /// Transfer exists with different credit account.
    ExistsWithDifferentCreditAccountId = 6,
    /// Transfer exists with different amount.
    ExistsWithDifferentAmount = 7,
    /// Transfer exists with different `pending_id`.
    ExistsWithDifferentPendingId = 8,
    /// Transfer exists with different `user_data_128`.
    ExistsWithDifferentUserData128 = 9,
    /// Transfer exists with different `user_data_64`.
    ExistsWithDifferentUserData64 = 10,
    /// Transfer exists with different `user_data_32`.
    ExistsWithDifferentUserData32 = 11,
    /// Transfer exists with different timeout.
    ExistsWithDifferentTimeout = 12,
    /// Transfer exists with different code.
    ExistsWithDifferentCode = 13,
    /// Transfer already exists (idempotent success).
    Exists = 14,
    /// Mutually exclusive `pending`/post/void flags were set together.
    FlagsAreMutuallyExclusive = 15,
    /// Debit account ID must not be zero.
    DebitAccountIdMustNotBeZero = 16,
    /// Debit account ID must not be `u128::MAX`.
    DebitAccountIdMustNotBeIntMax = 17,
    /// Credit account ID must not be zero.
    CreditAccountIdMustNotBeZero = 18,
    /// Credit account ID must not be `u128::MAX`.
    CreditAccountIdMustNotBeIntMax = 19,
    /// Debit and credit accounts must be different.
    AccountsMustBeDifferent = 20,
    /// `pending_id` must be zero for non-post/void transfers.
    PendingIdMustBeZero = 21,
    /// `pending_id` must not be zero for post/void transfers.
    PendingIdMustNotBeZero = 22,
    /// `pending_id` must not be `u128::MAX`.
    PendingIdMustNotBeIntMax = 23,
    /// `pending_id` must be different from the transfer's own ID.
    PendingIdMustBeDifferent = 24,
    /// Timeout is only valid for `pending` transfers.
    TimeoutReservedForPendingTransfer = 25,
    /// Ledger must not be zero.
    LedgerMustNotBeZero = 26,
    /// Code must not be zero.
    CodeMustNotBeZero = 27,
    /// Debit account not found.
    DebitAccountNotFound = 28,
    /// Credit account not found.
    CreditAccountNotFound = 29,
    /// Debit and credit accounts must have the same ledger.
    AccountsMustHaveTheSameLedger = 30,
    /// Transfer ledger must match the accounts' ledger.
    TransferMustHaveTheSameLedgerAsAccounts = 31,
    /// Debit account is already closed.
    DebitAccountAlreadyClosed = 32,
    /// Credit account is already closed.
    CreditAccountAlreadyClosed = 33,
    /// Referenced pending transfer not found.
    PendingTransferNotFound = 34,
    /// Referenced transfer is not a pending transfer.
    PendingTransferNotPending = 35,
    /// Referenced pending transfer was already posted.
    PendingTransferAlreadyPosted = 36,
    /// Referenced pending transfer was already voided.
    PendingTransferAlreadyVoided = 37,
    /// Referenced pending transfer has expired.
    PendingTransferExpired = 38,
    /// Pending transfer has a different debit account.
    PendingTransferHasDifferentDebitAccountId = 39,
    /// Pending transfer has a different credit account.
    PendingTransferHasDifferentCreditAccountId = 40,
    /// Pending transfer has a different ledger.
    PendingTransferHasDifferentLedger = 41,
    /// Pending transfer has a different code.
    PendingTransferHasDifferentCode = 42,
    /// Post amount exceeds the pending transfer's remaining amount.
    ExceedsPendingTransferAmount = 43,
    /// Transfer exceeds the credit account's available credits.
    ExceedsCredits = 44,
    /// Transfer exceeds the debit account's available debits.
    ExceedsDebits = 45,
    /// Transfer would overflow the debit account's `debits_pending`.
    OverflowsDebitsPending = 46,
    /// Transfer would overflow the credit account's `credits_pending`.
    OverflowsCreditsPending = 47,
    /// Transfer would overflow the debit account's `debits_posted`.
    OverflowsDebitsPosted = 48,
    /// Transfer would overflow the credit account's `credits_posted`.
    OverflowsCreditsPosted = 49,
    /// The transfers table is at capacity.
    TooManyTransfers = 50,
    /// The pending-transfers side table is at capacity.
    TooManyPendingTransfers = 51,
}

impl Default for CreateTransferResult {
    fn default() -> Self {
        CreateTransferResult::Ok
    }
}

impl CreateTransferResult {
    /// True for the one code that represents success (idempotent or not).
    pub fn is_ok(self) -> bool {
        matches!(self, CreateTransferResult::Ok)
    }
}

/// One sparse entry in a `create_accounts` reply: `{index, result}`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CreateAccountsResult {
    /// Index of the account in the submitted batch.
    pub index: u32,
    /// Result code for that account.
    pub result: CreateAccountResult,
}

/// One sparse entry in a `create_transfers` reply: `{index, result}`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CreateTransfersResult {
    /// Index of the transfer in the submitted batch.
    pub index: u32,
    /// Result code for that transfer.
    pub result: CreateTransferResult,
}
