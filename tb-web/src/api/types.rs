//! JSON-serializable API request/response types.
//!
//! `u128` values are serialized as fixed-width hex (ids) or decimal
//! strings (amounts) to avoid JavaScript precision issues.

use serde::{Deserialize, Serialize};

use tb_engine::{Account, AccountFlags, Transfer, TransferFlags};

use crate::error::AppError;

/// Parse a hex-encoded `u128` id.
pub fn parse_hex_id(s: &str) -> Result<u128, AppError> {
    u128::from_str_radix(s, 16).map_err(|_| AppError::BadRequest(format!("invalid id: {}", s)))
}

fn parse_decimal_u128(s: &str) -> Result<u128, AppError> {
    s.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid amount: {}", s)))
}

/// Account response type.
#[derive(Debug, Serialize)]
pub struct ApiAccount {
    /// Account id, hex-encoded.
    pub id: String,
    /// Sum of pending debits.
    pub debits_pending: String,
    /// Sum of posted debits.
    pub debits_posted: String,
    /// Sum of pending credits.
    pub credits_pending: String,
    /// Sum of posted credits.
    pub credits_posted: String,
    /// Opaque 128-bit user data, hex-encoded.
    pub user_data_128: String,
    /// Opaque 64-bit user data.
    pub user_data_64: u64,
    /// Opaque 32-bit user data.
    pub user_data_32: u32,
    /// Ledger id.
    pub ledger: u32,
    /// Chart-of-accounts code.
    pub code: u16,
    /// Raw flag bits.
    pub flags: u16,
    /// Commit timestamp (nanoseconds).
    pub timestamp: u64,
}

impl From<&Account> for ApiAccount {
    fn from(a: &Account) -> Self {
        Self {
            id: format!("{:032x}", a.id),
            debits_pending: a.debits_pending.to_string(),
            debits_posted: a.debits_posted.to_string(),
            credits_pending: a.credits_pending.to_string(),
            credits_posted: a.credits_posted.to_string(),
            user_data_128: format!("{:032x}", a.user_data_128),
            user_data_64: a.user_data_64,
            user_data_32: a.user_data_32,
            ledger: a.ledger,
            code: a.code,
            flags: a.flags.bits(),
            timestamp: a.timestamp,
        }
    }
}

/// Request body for creating one account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account id, hex-encoded.
    pub id: String,
    /// Ledger id.
    pub ledger: u32,
    /// Chart-of-accounts code.
    pub code: u16,
    /// Raw flag bits.
    #[serde(default)]
    pub flags: u16,
    /// Opaque 128-bit user data, hex-encoded.
    #[serde(default)]
    pub user_data_128: Option<String>,
    /// Opaque 64-bit user data.
    #[serde(default)]
    pub user_data_64: u64,
    /// Opaque 32-bit user data.
    #[serde(default)]
    pub user_data_32: u32,
}

impl TryFrom<&CreateAccountRequest> for Account {
    type Error = AppError;

    fn try_from(req: &CreateAccountRequest) -> Result<Self, Self::Error> {
        let user_data_128 = match &req.user_data_128 {
            Some(s) => parse_hex_id(s)?,
            None => 0,
        };
        Ok(Account {
            id: parse_hex_id(&req.id)?,
            ledger: req.ledger,
            code: req.code,
            flags: AccountFlags::from_bits_truncate(req.flags),
            user_data_128,
            user_data_64: req.user_data_64,
            user_data_32: req.user_data_32,
            ..Default::default()
        })
    }
}

/// Transfer response type.
#[derive(Debug, Serialize)]
pub struct ApiTransfer {
    /// Transfer id, hex-encoded.
    pub id: String,
    /// Debited account id, hex-encoded.
    pub debit_account_id: String,
    /// Credited account id, hex-encoded.
    pub credit_account_id: String,
    /// Amount actually applied.
    pub amount: String,
    /// Referenced pending transfer id, hex-encoded (all-zero if none).
    pub pending_id: String,
    /// Opaque 128-bit user data, hex-encoded.
    pub user_data_128: String,
    /// Opaque 64-bit user data.
    pub user_data_64: u64,
    /// Opaque 32-bit user data.
    pub user_data_32: u32,
    /// Pending timeout, seconds.
    pub timeout: u32,
    /// Ledger id.
    pub ledger: u32,
    /// Chart-of-accounts code.
    pub code: u16,
    /// Raw flag bits.
    pub flags: u16,
    /// Commit timestamp (nanoseconds).
    pub timestamp: u64,
}

impl From<&Transfer> for ApiTransfer {
    fn from(t: &Transfer) -> Self {
        Self {
            id: format!("{:032x}", t.id),
            debit_account_id: format!("{:032x}", t.debit_account_id),
            credit_account_id: format!("{:032x}", t.credit_account_id),
            amount: t.amount.to_string(),
            pending_id: format!("{:032x}", t.pending_id),
            user_data_128: format!("{:032x}", t.user_data_128),
            user_data_64: t.user_data_64,
            user_data_32: t.user_data_32,
            timeout: t.timeout,
            ledger: t.ledger,
            code: t.code,
            flags: t.flags.bits(),
            timestamp: t.timestamp,
        }
    }
}

/// Request body for creating one transfer.
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    /// Transfer id, hex-encoded.
    pub id: String,
    /// Debited account id, hex-encoded.
    pub debit_account_id: String,
    /// Credited account id, hex-encoded.
    pub credit_account_id: String,
    /// Amount, decimal.
    pub amount: String,
    /// Referenced pending transfer id, hex-encoded.
    #[serde(default)]
    pub pending_id: Option<String>,
    /// Pending timeout, seconds.
    #[serde(default)]
    pub timeout: u32,
    /// Ledger id.
    pub ledger: u32,
    /// Chart-of-accounts code.
    pub code: u16,
    /// Raw flag bits.
    #[serde(default)]
    pub flags: u16,
}

impl TryFrom<&CreateTransferRequest> for Transfer {
    type Error = AppError;

    fn try_from(req: &CreateTransferRequest) -> Result<Self, Self::Error> {
        let pending_id = match &req.pending_id {
            Some(s) => parse_hex_id(s)?,
            None => 0,
        };
        Ok(Transfer {
            id: parse_hex_id(&req.id)?,
            debit_account_id: parse_hex_id(&req.debit_account_id)?,
            credit_account_id: parse_hex_id(&req.credit_account_id)?,
            amount: parse_decimal_u128(&req.amount)?,
            pending_id,
            timeout: req.timeout,
            ledger: req.ledger,
            code: req.code,
            flags: TransferFlags::from_bits_truncate(req.flags),
            ..Default::default()
        })
    }
}

/// One failed record from a batch create call.
#[derive(Debug, Serialize)]
pub struct ApiBatchFailure {
    /// Index of the record in the submitted batch.
    pub index: u32,
    /// Result code, rendered as its variant name.
    pub result: String,
}

/// Response to a `create_accounts`/`create_transfers` call: only the
/// records that did not succeed.
#[derive(Debug, Serialize)]
pub struct CreateBatchResponse {
    /// Failed records, empty when the whole batch succeeded.
    pub failures: Vec<ApiBatchFailure>,
}

/// Paginated accounts response.
#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    /// Accounts found, in input order.
    pub accounts: Vec<ApiAccount>,
}

/// Paginated transfers response.
#[derive(Debug, Serialize)]
pub struct TransfersResponse {
    /// Transfers found, in input order or commit order.
    pub transfers: Vec<ApiTransfer>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the process is serving requests.
    pub status: String,
    /// Current engine clock reading.
    pub timestamp: u64,
}
