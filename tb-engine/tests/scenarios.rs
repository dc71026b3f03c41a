//! End-to-end scenarios exercising the engine facade as a whole, rather
//! than one module's internals in isolation.

use std::cell::Cell;

use tb_engine::{
    Account, AccountFlags, ClockSource, CreateAccountResult, CreateTransferResult, Engine,
    StoreConfig, Transfer, TransferFlags,
};

struct FakeClock(Cell<u64>);

impl ClockSource for FakeClock {
    fn now(&self) -> u64 {
        let t = self.0.get();
        self.0.set(t + 1000);
        t
    }
}

fn engine() -> Engine {
    Engine::new(StoreConfig::default(), Box::new(FakeClock(Cell::new(1))))
}

fn account(id: u128, flags: AccountFlags) -> Account {
    Account {
        id,
        ledger: 1,
        code: 1,
        flags,
        ..Default::default()
    }
}

fn transfer(id: u128, debit: u128, credit: u128, amount: u128, flags: TransferFlags) -> Transfer {
    Transfer {
        id,
        debit_account_id: debit,
        credit_account_id: credit,
        amount,
        ledger: 1,
        code: 1,
        flags,
        ..Default::default()
    }
}

#[test]
fn basic_transfer_moves_balances_on_both_sides() {
    let mut e = engine();
    e.create_accounts(&[account(1, AccountFlags::empty()), account(2, AccountFlags::empty())]);

    let results = e.create_transfers(&[transfer(100, 1, 2, 50, TransferFlags::empty())]);
    assert!(results.is_empty());

    let accounts = e.lookup_accounts(&[1, 2]);
    assert_eq!(accounts[0].debits_posted, 50);
    assert_eq!(accounts[1].credits_posted, 50);
    assert_eq!(accounts[0].debits_posted, accounts[1].credits_posted);
}

#[test]
fn two_phase_pending_then_partial_posts_drain_to_zero() {
    let mut e = engine();
    e.create_accounts(&[account(1, AccountFlags::empty()), account(2, AccountFlags::empty())]);

    let mut pending = transfer(101, 1, 2, 100, TransferFlags::PENDING);
    pending.timeout = 60;
    assert!(e.create_transfers(&[pending]).is_empty());

    let a = &e.lookup_accounts(&[1])[0];
    assert_eq!(a.debits_pending, 100);

    let mut partial_post = transfer(102, 1, 2, 40, TransferFlags::POST_PENDING_TRANSFER);
    partial_post.pending_id = 101;
    assert!(e.create_transfers(&[partial_post]).is_empty());

    let mut drain_post = transfer(103, 1, 2, 0, TransferFlags::POST_PENDING_TRANSFER);
    drain_post.pending_id = 101;
    assert!(e.create_transfers(&[drain_post]).is_empty());

    let a = &e.lookup_accounts(&[1])[0];
    assert_eq!(a.debits_pending, 0);
    assert_eq!(a.debits_posted, 100);
}

#[test]
fn void_releases_pending_without_posting() {
    let mut e = engine();
    e.create_accounts(&[account(1, AccountFlags::empty()), account(2, AccountFlags::empty())]);

    let mut pending = transfer(200, 1, 2, 75, TransferFlags::PENDING);
    pending.timeout = 60;
    assert!(e.create_transfers(&[pending]).is_empty());

    let mut void = transfer(201, 1, 2, 0, TransferFlags::VOID_PENDING_TRANSFER);
    void.pending_id = 200;
    assert!(e.create_transfers(&[void]).is_empty());

    let a = &e.lookup_accounts(&[1])[0];
    assert_eq!(a.debits_pending, 0);
    assert_eq!(a.debits_posted, 0);

    let completion = &e.lookup_transfers(&[201])[0];
    assert_eq!(completion.amount, 75);
}

#[test]
fn balance_limit_rejects_then_balancing_flag_clamps() {
    let mut e = engine();
    e.create_accounts(&[
        account(1, AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS),
        account(2, AccountFlags::empty()),
    ]);

    // Credit account 1 with 30 first (debit 2, credit 1).
    assert!(e
        .create_transfers(&[transfer(300, 2, 1, 30, TransferFlags::empty())])
        .is_empty());

    let results = e.create_transfers(&[transfer(301, 1, 2, 50, TransferFlags::empty())]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result, CreateTransferResult::ExceedsCredits);

    let results = e.create_transfers(&[transfer(302, 1, 2, 50, TransferFlags::BALANCING_DEBIT)]);
    assert!(results.is_empty());

    let stored = &e.lookup_transfers(&[302])[0];
    assert_eq!(stored.amount, 30);

    let a = &e.lookup_accounts(&[1])[0];
    assert_eq!(a.debits_posted, 30);
}

#[test]
fn resubmitting_a_batch_is_idempotent() {
    let mut e = engine();
    let batch = [account(1, AccountFlags::empty()), account(2, AccountFlags::empty())];

    assert!(e.create_accounts(&batch).is_empty());
    let second = e.create_accounts(&batch);
    assert_eq!(second.len(), 2);
    assert!(second
        .iter()
        .all(|r| r.result == CreateAccountResult::Exists));
    assert_eq!(e.lookup_accounts(&[1, 2]).len(), 2);
}

#[test]
fn snapshot_round_trip_preserves_balances_across_a_fresh_engine() {
    let mut e = engine();
    e.create_accounts(&[account(1, AccountFlags::empty()), account(2, AccountFlags::empty())]);
    e.create_transfers(&[transfer(100, 1, 2, 50, TransferFlags::empty())]);

    let mut pending = transfer(101, 1, 2, 100, TransferFlags::PENDING);
    pending.timeout = 60;
    e.create_transfers(&[pending]);

    let mut buf = vec![0u8; e.state_size()];
    e.save_state(&mut buf).unwrap();

    let mut reloaded = Engine::new(StoreConfig::default(), Box::new(FakeClock(Cell::new(1))));
    reloaded.load_state(&buf).unwrap();

    let before = e.lookup_accounts(&[1, 2]);
    let after = reloaded.lookup_accounts(&[1, 2]);
    assert_eq!(before, after);
}
