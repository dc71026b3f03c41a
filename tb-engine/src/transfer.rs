//! Transfer field validation, duplicate detection, balance constraints,
//! and application.

use crate::math::checked_add;
use crate::protocol::{CreateTransferResult, PendingState, PendingTransferInfo, Transfer, TransferFlags};
use crate::store::Store;
use crate::twophase::complete_pending;

/// Validate and, if valid, commit `transfer` into `store` with the given
/// `timestamp`. Returns the result code observable to the caller; on
/// anything other than [`CreateTransferResult::Ok`] the store is left
/// unmodified.
pub fn create_transfer(store: &mut Store, mut transfer: Transfer, timestamp: u64) -> CreateTransferResult {
    if transfer.flags.bits() & TransferFlags::PADDING != 0 {
        return CreateTransferResult::ReservedFlag;
    }
    if transfer.id == 0 {
        return CreateTransferResult::IdMustNotBeZero;
    }
    if transfer.id == u128::MAX {
        return CreateTransferResult::IdMustNotBeIntMax;
    }
    if let Some(existing) = store.find_transfer(transfer.id) {
        return idempotency_check(existing, &transfer);
    }

    let is_pending = transfer.flags.contains(TransferFlags::PENDING);
    let is_post = transfer.flags.contains(TransferFlags::POST_PENDING_TRANSFER);
    let is_void = transfer.flags.contains(TransferFlags::VOID_PENDING_TRANSFER);
    if [is_pending, is_post, is_void].iter().filter(|b| **b).count() > 1 {
        return CreateTransferResult::FlagsAreMutuallyExclusive;
    }
    let is_two_phase_completion = is_post || is_void;

    if transfer.debit_account_id == 0 {
        return CreateTransferResult::DebitAccountIdMustNotBeZero;
    }
    if transfer.debit_account_id == u128::MAX {
        return CreateTransferResult::DebitAccountIdMustNotBeIntMax;
    }
    if transfer.credit_account_id == 0 {
        return CreateTransferResult::CreditAccountIdMustNotBeZero;
    }
    if transfer.credit_account_id == u128::MAX {
        return CreateTransferResult::CreditAccountIdMustNotBeIntMax;
    }
    if transfer.debit_account_id == transfer.credit_account_id {
        return CreateTransferResult::AccountsMustBeDifferent;
    }

    if is_two_phase_completion {
        if transfer.pending_id == 0 {
            return CreateTransferResult::PendingIdMustNotBeZero;
        }
        if transfer.pending_id == u128::MAX {
            return CreateTransferResult::PendingIdMustNotBeIntMax;
        }
        if transfer.pending_id == transfer.id {
            return CreateTransferResult::PendingIdMustBeDifferent;
        }
    } else if transfer.pending_id != 0 {
        return CreateTransferResult::PendingIdMustBeZero;
    }

    if transfer.timeout != 0 && !is_pending {
        return CreateTransferResult::TimeoutReservedForPendingTransfer;
    }
    if transfer.ledger == 0 {
        return CreateTransferResult::LedgerMustNotBeZero;
    }
    if transfer.code == 0 {
        return CreateTransferResult::CodeMustNotBeZero;
    }

    if store.find_account(transfer.debit_account_id).is_none() {
        return CreateTransferResult::DebitAccountNotFound;
    }
    if store.find_account(transfer.credit_account_id).is_none() {
        return CreateTransferResult::CreditAccountNotFound;
    }

    let debit_ledger = store.find_account(transfer.debit_account_id).unwrap().ledger;
    let credit_ledger = store.find_account(transfer.credit_account_id).unwrap().ledger;
    if debit_ledger != credit_ledger {
        return CreateTransferResult::AccountsMustHaveTheSameLedger;
    }
    if transfer.ledger != debit_ledger {
        return CreateTransferResult::TransferMustHaveTheSameLedgerAsAccounts;
    }

    if store.find_account(transfer.debit_account_id).unwrap().flags.contains(
        crate::protocol::AccountFlags::CLOSED,
    ) {
        return CreateTransferResult::DebitAccountAlreadyClosed;
    }
    if store.find_account(transfer.credit_account_id).unwrap().flags.contains(
        crate::protocol::AccountFlags::CLOSED,
    ) {
        return CreateTransferResult::CreditAccountAlreadyClosed;
    }

    if is_two_phase_completion {
        if store.transfers_full() {
            return CreateTransferResult::TooManyTransfers;
        }
        return match complete_pending(store, &transfer, timestamp) {
            Ok(amount) => {
                transfer.amount = amount;
                commit(store, transfer, timestamp)
            }
            Err(code) => code,
        };
    }

    let mut amount = transfer.amount;

    {
        let debit_account = store.find_account(transfer.debit_account_id).unwrap();
        if debit_account
            .flags
            .contains(crate::protocol::AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
        {
            let available = debit_account
                .credits_posted
                .saturating_sub(debit_account.debits_posted + debit_account.debits_pending);
            if amount > available {
                if transfer.flags.contains(TransferFlags::BALANCING_DEBIT) {
                    amount = available;
                } else {
                    return CreateTransferResult::ExceedsCredits;
                }
                if amount == 0 {
                    return CreateTransferResult::ExceedsCredits;
                }
            }
        }
    }
    {
        let credit_account = store.find_account(transfer.credit_account_id).unwrap();
        if credit_account
            .flags
            .contains(crate::protocol::AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
        {
            let available = credit_account
                .debits_posted
                .saturating_sub(credit_account.credits_posted + credit_account.credits_pending);
            if amount > available {
                if transfer.flags.contains(TransferFlags::BALANCING_CREDIT) {
                    amount = available;
                } else {
                    return CreateTransferResult::ExceedsDebits;
                }
                if amount == 0 {
                    return CreateTransferResult::ExceedsDebits;
                }
            }
        }
    }

    if is_pending {
        let debit = store.find_account(transfer.debit_account_id).unwrap();
        if checked_add(debit.debits_pending, amount).is_none() {
            return CreateTransferResult::OverflowsDebitsPending;
        }
        let credit = store.find_account(transfer.credit_account_id).unwrap();
        if checked_add(credit.credits_pending, amount).is_none() {
            return CreateTransferResult::OverflowsCreditsPending;
        }
    } else {
        let debit = store.find_account(transfer.debit_account_id).unwrap();
        if checked_add(debit.debits_posted, amount).is_none() {
            return CreateTransferResult::OverflowsDebitsPosted;
        }
        let credit = store.find_account(transfer.credit_account_id).unwrap();
        if checked_add(credit.credits_posted, amount).is_none() {
            return CreateTransferResult::OverflowsCreditsPosted;
        }
    }

    if store.transfers_full() {
        return CreateTransferResult::TooManyTransfers;
    }
    if is_pending && store.pending_full() {
        return CreateTransferResult::TooManyPendingTransfers;
    }

    if is_pending {
        let debit = store.find_account_mut(transfer.debit_account_id).unwrap();
        debit.debits_pending = checked_add(debit.debits_pending, amount).unwrap();
        let credit = store.find_account_mut(transfer.credit_account_id).unwrap();
        credit.credits_pending = checked_add(credit.credits_pending, amount).unwrap();

        let expires_at = if transfer.timeout != 0 {
            timestamp + (transfer.timeout as u64) * 1_000_000_000
        } else {
            0
        };
        store.insert_pending(PendingTransferInfo {
            id: transfer.id,
            original_amount: amount,
            amount_posted: 0,
            expires_at,
            state: PendingState::Active,
            reserved: [0; 7],
        });
    } else {
        let debit = store.find_account_mut(transfer.debit_account_id).unwrap();
        debit.debits_posted = checked_add(debit.debits_posted, amount).unwrap();
        let credit = store.find_account_mut(transfer.credit_account_id).unwrap();
        credit.credits_posted = checked_add(credit.credits_posted, amount).unwrap();
    }

    transfer.amount = amount;
    commit(store, transfer, timestamp)
}

fn commit(store: &mut Store, mut transfer: Transfer, timestamp: u64) -> CreateTransferResult {
    transfer.timestamp = timestamp;
    store.insert_transfer(transfer);
    CreateTransferResult::Ok
}

/// Compare a resubmitted transfer against the one already on file, in the
/// field order the external contract specifies.
fn idempotency_check(existing: &Transfer, submitted: &Transfer) -> CreateTransferResult {
    if existing.flags != submitted.flags {
        return CreateTransferResult::ExistsWithDifferentFlags;
    }
    if existing.debit_account_id != submitted.debit_account_id {
        return CreateTransferResult::ExistsWithDifferentDebitAccountId;
    }
    if existing.credit_account_id != submitted.credit_account_id {
        return CreateTransferResult::ExistsWithDifferentCreditAccountId;
    }
    if existing.amount != submitted.amount {
        return CreateTransferResult::ExistsWithDifferentAmount;
    }
    if existing.pending_id != submitted.pending_id {
        return CreateTransferResult::ExistsWithDifferentPendingId;
    }
    if existing.user_data_128 != submitted.user_data_128 {
        return CreateTransferResult::ExistsWithDifferentUserData128;
    }
    if existing.user_data_64 != submitted.user_data_64 {
        return CreateTransferResult::ExistsWithDifferentUserData64;
    }
    if existing.user_data_32 != submitted.user_data_32 {
        return CreateTransferResult::ExistsWithDifferentUserData32;
    }
    if existing.timeout != submitted.timeout {
        return CreateTransferResult::ExistsWithDifferentTimeout;
    }
    if existing.code != submitted.code {
        return CreateTransferResult::ExistsWithDifferentCode;
    }
    CreateTransferResult::Exists
}
