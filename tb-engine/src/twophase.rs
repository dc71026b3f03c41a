//! Two-phase completion: posting or voiding a previously-pending transfer.

use crate::math::checked_add;
use crate::protocol::{CreateTransferResult, PendingState, Transfer, TransferFlags};
use crate::store::Store;

/// Complete (post or void) the pending transfer referenced by
/// `submitted.pending_id`.
///
/// `submitted` is the post/void Transfer record as received from the
/// caller, already past the structural/account-resolution/closure checks
/// common to every transfer (§4.3 steps 1-9). On success, returns the
/// amount that should be stored on the appended completion Transfer; the
/// caller is responsible for actually appending it and updating the
/// account balances.
pub fn complete_pending(
    store: &mut Store,
    submitted: &Transfer,
    now: u64,
) -> Result<u128, CreateTransferResult> {
    let pending_id = submitted.pending_id;

    let original = match store.find_transfer(pending_id) {
        Some(t) => *t,
        None => return Err(CreateTransferResult::PendingTransferNotFound),
    };

    // Borrow-check: read what we need, then mutate through a second lookup.
    let state = match store.find_pending(pending_id) {
        Some(info) => info.state,
        None => return Err(CreateTransferResult::PendingTransferNotPending),
    };

    let is_expired = {
        let info = store.find_pending(pending_id).unwrap();
        state == PendingState::Active && info.expires_at != 0 && now >= info.expires_at
    };

    if is_expired {
        store.find_pending_mut(pending_id).unwrap().state = PendingState::Expired;
        return Err(CreateTransferResult::PendingTransferExpired);
    }

    match state {
        PendingState::Posted => return Err(CreateTransferResult::PendingTransferAlreadyPosted),
        PendingState::Voided => return Err(CreateTransferResult::PendingTransferAlreadyVoided),
        PendingState::Expired => return Err(CreateTransferResult::PendingTransferExpired),
        PendingState::Active => {}
    }

    if original.debit_account_id != submitted.debit_account_id {
        return Err(CreateTransferResult::PendingTransferHasDifferentDebitAccountId);
    }
    if original.credit_account_id != submitted.credit_account_id {
        return Err(CreateTransferResult::PendingTransferHasDifferentCreditAccountId);
    }
    if original.ledger != submitted.ledger {
        return Err(CreateTransferResult::PendingTransferHasDifferentLedger);
    }
    if original.code != submitted.code {
        return Err(CreateTransferResult::PendingTransferHasDifferentCode);
    }

    let amount_posted = store.find_pending(pending_id).unwrap().amount_posted;
    let remaining = original.amount.saturating_sub(amount_posted);

    if submitted.flags.contains(TransferFlags::POST_PENDING_TRANSFER) {
        post(store, pending_id, &original, submitted, remaining)
    } else {
        debug_assert!(submitted.flags.contains(TransferFlags::VOID_PENDING_TRANSFER));
        void(store, pending_id, &original, remaining)
    }
}

fn post(
    store: &mut Store,
    pending_id: u128,
    original: &Transfer,
    submitted: &Transfer,
    remaining: u128,
) -> Result<u128, CreateTransferResult> {
    let amount = if submitted.amount == 0 {
        remaining
    } else {
        submitted.amount
    };
    if amount > remaining {
        return Err(CreateTransferResult::ExceedsPendingTransferAmount);
    }

    {
        let debit = store.find_account_mut(original.debit_account_id).unwrap();
        debit.debits_pending = debit.debits_pending.saturating_sub(amount);
        debit.debits_posted = checked_add(debit.debits_posted, amount)
            .ok_or(CreateTransferResult::OverflowsDebitsPosted)?;
    }
    {
        let credit = store.find_account_mut(original.credit_account_id).unwrap();
        credit.credits_pending = credit.credits_pending.saturating_sub(amount);
        credit.credits_posted = checked_add(credit.credits_posted, amount)
            .ok_or(CreateTransferResult::OverflowsCreditsPosted)?;
    }

    let info = store.find_pending_mut(pending_id).unwrap();
    info.amount_posted += amount;
    if info.amount_posted == info.original_amount {
        info.state = PendingState::Posted;
    }

    Ok(amount)
}

fn void(
    store: &mut Store,
    pending_id: u128,
    original: &Transfer,
    remaining: u128,
) -> Result<u128, CreateTransferResult> {
    {
        let debit = store.find_account_mut(original.debit_account_id).unwrap();
        debit.debits_pending = debit.debits_pending.saturating_sub(remaining);
    }
    {
        let credit = store.find_account_mut(original.credit_account_id).unwrap();
        credit.credits_pending = credit.credits_pending.saturating_sub(remaining);
    }

    store.find_pending_mut(pending_id).unwrap().state = PendingState::Voided;

    Ok(remaining)
}
