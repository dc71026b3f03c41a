//! Account field validation, duplicate detection, and creation.

use crate::protocol::{Account, AccountFlags, CreateAccountResult};
use crate::store::Store;

/// Validate and, if valid, commit `account` into `store` with the given
/// `timestamp`. Returns the result code observable to the caller; on
/// anything other than [`CreateAccountResult::Ok`] the store is left
/// unmodified.
pub fn create_account(store: &mut Store, mut account: Account, timestamp: u64) -> CreateAccountResult {
    if account.reserved != 0 {
        return CreateAccountResult::ReservedField;
    }
    if account.flags.bits() & AccountFlags::PADDING != 0 {
        return CreateAccountResult::ReservedFlag;
    }
    if account.id == 0 {
        return CreateAccountResult::IdMustNotBeZero;
    }
    if account.id == u128::MAX {
        return CreateAccountResult::IdMustNotBeIntMax;
    }
    if account
        .flags
        .contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
        && account
            .flags
            .contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
    {
        return CreateAccountResult::FlagsAreMutuallyExclusive;
    }
    if account.debits_pending != 0 {
        return CreateAccountResult::DebitsPendingMustBeZero;
    }
    if account.debits_posted != 0 {
        return CreateAccountResult::DebitsPostedMustBeZero;
    }
    if account.credits_pending != 0 {
        return CreateAccountResult::CreditsPendingMustBeZero;
    }
    if account.credits_posted != 0 {
        return CreateAccountResult::CreditsPostedMustBeZero;
    }
    if account.ledger == 0 {
        return CreateAccountResult::LedgerMustNotBeZero;
    }
    if account.code == 0 {
        return CreateAccountResult::CodeMustNotBeZero;
    }

    if let Some(existing) = store.find_account(account.id) {
        return idempotency_check(existing, &account);
    }

    if store.accounts_full() {
        return CreateAccountResult::TooManyAccounts;
    }

    account.debits_pending = 0;
    account.debits_posted = 0;
    account.credits_pending = 0;
    account.credits_posted = 0;
    account.timestamp = timestamp;
    store.insert_account(account);
    CreateAccountResult::Ok
}

/// Compare a resubmitted account against the one already on file, in the
/// field order the external contract specifies, and report the first
/// mismatch (or `Exists` if every compared field matches).
fn idempotency_check(existing: &Account, submitted: &Account) -> CreateAccountResult {
    if existing.flags != submitted.flags {
        return CreateAccountResult::ExistsWithDifferentFlags;
    }
    if existing.user_data_128 != submitted.user_data_128 {
        return CreateAccountResult::ExistsWithDifferentUserData128;
    }
    if existing.user_data_64 != submitted.user_data_64 {
        return CreateAccountResult::ExistsWithDifferentUserData64;
    }
    if existing.user_data_32 != submitted.user_data_32 {
        return CreateAccountResult::ExistsWithDifferentUserData32;
    }
    if existing.ledger != submitted.ledger {
        return CreateAccountResult::ExistsWithDifferentLedger;
    }
    if existing.code != submitted.code {
        return CreateAccountResult::ExistsWithDifferentCode;
    }
    CreateAccountResult::Exists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    fn base(id: u128) -> Account {
        Account {
            id,
            ledger: 1,
            code: 1,
            ..Default::default()
        }
    }

    #[test]
    fn creates_fresh_account() {
        let mut store = Store::new(StoreConfig::default());
        let result = create_account(&mut store, base(1), 100);
        assert_eq!(result, CreateAccountResult::Ok);
        let stored = store.find_account(1).unwrap();
        assert_eq!(stored.timestamp, 100);
        assert_eq!(stored.debits_posted, 0);
    }

    #[test]
    fn rejects_zero_id() {
        let mut store = Store::new(StoreConfig::default());
        let result = create_account(&mut store, base(0), 1);
        assert_eq!(result, CreateAccountResult::IdMustNotBeZero);
    }

    #[test]
    fn rejects_max_id() {
        let mut store = Store::new(StoreConfig::default());
        let result = create_account(&mut store, base(u128::MAX), 1);
        assert_eq!(result, CreateAccountResult::IdMustNotBeIntMax);
    }

    #[test]
    fn rejects_mutually_exclusive_flags() {
        let mut store = Store::new(StoreConfig::default());
        let mut a = base(1);
        a.flags = AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS
            | AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS;
        let result = create_account(&mut store, a, 1);
        assert_eq!(result, CreateAccountResult::FlagsAreMutuallyExclusive);
    }

    #[test]
    fn rejects_nonzero_initial_balances() {
        let mut store = Store::new(StoreConfig::default());
        let mut a = base(1);
        a.debits_posted = 5;
        assert_eq!(
            create_account(&mut store, a, 1),
            CreateAccountResult::DebitsPostedMustBeZero
        );
    }

    #[test]
    fn idempotent_resubmission() {
        let mut store = Store::new(StoreConfig::default());
        assert_eq!(
            create_account(&mut store, base(1), 1),
            CreateAccountResult::Ok
        );
        assert_eq!(
            create_account(&mut store, base(1), 2),
            CreateAccountResult::Exists
        );
        // timestamp from the first call must not be overwritten.
        assert_eq!(store.find_account(1).unwrap().timestamp, 1);
    }

    #[test]
    fn exists_with_different_code() {
        let mut store = Store::new(StoreConfig::default());
        create_account(&mut store, base(1), 1);
        let mut resubmit = base(1);
        resubmit.code = 2;
        assert_eq!(
            create_account(&mut store, resubmit, 2),
            CreateAccountResult::ExistsWithDifferentCode
        );
    }

    #[test]
    fn capacity_exhaustion() {
        let config = StoreConfig {
            max_accounts: 1,
            ..StoreConfig::default()
        };
        let mut store = Store::new(config);
        assert_eq!(create_account(&mut store, base(1), 1), CreateAccountResult::Ok);
        assert_eq!(
            create_account(&mut store, base(2), 2),
            CreateAccountResult::TooManyAccounts
        );
    }
}
