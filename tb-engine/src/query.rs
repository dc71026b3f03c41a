//! Point lookups and account-transfer enumeration.

use crate::protocol::{Account, Transfer};
use crate::store::Store;

/// Resolve each id in `ids` to its account, preserving input order and
/// silently omitting ids that do not exist.
pub fn lookup_accounts(store: &Store, ids: &[u128]) -> Vec<Account> {
    ids.iter()
        .filter_map(|id| store.find_account(*id).copied())
        .collect()
}

/// Resolve each id in `ids` to its transfer, preserving input order and
/// silently omitting ids that do not exist.
pub fn lookup_transfers(store: &Store, ids: &[u128]) -> Vec<Transfer> {
    ids.iter()
        .filter_map(|id| store.find_transfer(*id).copied())
        .collect()
}

/// All transfers debiting or crediting `account_id`, in commit order, up
/// to `limit` entries.
pub fn account_transfers(store: &Store, account_id: u128, limit: usize) -> Vec<Transfer> {
    store
        .transfers()
        .iter()
        .filter(|t| t.debit_account_id == account_id || t.credit_account_id == account_id)
        .take(limit)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::create_account;
    use crate::protocol::CreateAccountResult;
    use crate::store::StoreConfig;
    use crate::transfer::create_transfer;

    fn account(id: u128) -> Account {
        Account {
            id,
            ledger: 1,
            code: 1,
            ..Default::default()
        }
    }

    #[test]
    fn lookup_accounts_preserves_order_and_skips_missing() {
        let mut store = Store::new(StoreConfig::default());
        assert_eq!(
            create_account(&mut store, account(1), 1),
            CreateAccountResult::Ok
        );
        assert_eq!(
            create_account(&mut store, account(2), 1),
            CreateAccountResult::Ok
        );
        let found = lookup_accounts(&store, &[2, 999, 1]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, 2);
        assert_eq!(found[1].id, 1);
    }

    #[test]
    fn account_transfers_matches_either_side_in_commit_order() {
        let mut store = Store::new(StoreConfig::default());
        create_account(&mut store, account(1), 1);
        create_account(&mut store, account(2), 1);
        create_account(&mut store, account(3), 1);

        let t1 = Transfer {
            id: 10,
            debit_account_id: 1,
            credit_account_id: 2,
            amount: 1,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        let t2 = Transfer {
            id: 11,
            debit_account_id: 3,
            credit_account_id: 1,
            amount: 1,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        let t3 = Transfer {
            id: 12,
            debit_account_id: 2,
            credit_account_id: 3,
            amount: 1,
            ledger: 1,
            code: 1,
            ..Default::default()
        };
        create_transfer(&mut store, t1, 2);
        create_transfer(&mut store, t2, 3);
        create_transfer(&mut store, t3, 4);

        let result = account_transfers(&store, 1, 10);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 10);
        assert_eq!(result[1].id, 11);
    }

    #[test]
    fn account_transfers_respects_limit() {
        let mut store = Store::new(StoreConfig::default());
        create_account(&mut store, account(1), 1);
        create_account(&mut store, account(2), 1);
        for i in 0..5u128 {
            let t = Transfer {
                id: 100 + i,
                debit_account_id: 1,
                credit_account_id: 2,
                amount: 1,
                ledger: 1,
                code: 1,
                ..Default::default()
            };
            create_transfer(&mut store, t, 2 + i as u64);
        }
        assert_eq!(account_transfers(&store, 1, 2).len(), 2);
    }
}
