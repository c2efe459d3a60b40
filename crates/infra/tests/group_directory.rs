use std::sync::Arc;
use std::thread;

use tabsettle_core::{DomainError, GroupId, MemberId};
use tabsettle_infra::{DirectoryError, GroupDirectory, InMemoryGroupDirectory};
use tabsettle_observability::ObservabilityConfig;
use tabsettle_settlement::{Expense, Group, Member, Payment};
use uuid::Uuid;

struct Trip {
    directory: InMemoryGroupDirectory,
    group_id: GroupId,
    john: MemberId,
    peter: MemberId,
    mary: MemberId,
}

fn member(n: u128, name: &str) -> Member {
    Member::with_id(MemberId::from_uuid(Uuid::from_u128(n)), name)
}

fn trip() -> Trip {
    tabsettle_observability::init(&ObservabilityConfig {
        filter: "debug".to_string(),
        json: false,
    });

    let (john, peter, mary) = (member(1, "John"), member(2, "Peter"), member(3, "Mary"));
    let ids = (john.id_typed(), peter.id_typed(), mary.id_typed());

    let directory = InMemoryGroupDirectory::new();
    let group = directory
        .create_group("Trip", vec![john, peter, mary])
        .expect("group is valid");

    Trip {
        group_id: group.id_typed(),
        directory,
        john: ids.0,
        peter: ids.1,
        mary: ids.2,
    }
}

fn add(t: &Trip, payer: MemberId, label: &str, amount: f64) -> Expense {
    let expense = Expense::new(payer, label, amount);
    t.directory
        .add_or_replace_expense(t.group_id, expense.clone())
        .expect("group is open");
    expense
}

/// Hotel/500/John, Restaurant/150/Mary, Sightseeing/100/Peter.
fn three_payers() -> Trip {
    let t = trip();
    add(&t, t.john, "Hotel", 500.0);
    add(&t, t.mary, "Restaurant", 150.0);
    add(&t, t.peter, "Sightseeing", 100.0);
    t
}

#[test]
fn three_distinct_payers_owe_the_hotel_payer() {
    let t = three_payers();
    let outstanding = t.directory.outstanding_payments(t.group_id).unwrap();

    assert_eq!(outstanding.len(), 2);
    assert_eq!(
        outstanding.for_payer(&t.mary),
        Some(&[Payment::new(t.mary, t.john, 100.0)][..])
    );
    assert_eq!(
        outstanding.for_payer(&t.peter),
        Some(&[Payment::new(t.peter, t.john, 150.0)][..])
    );
}

#[test]
fn single_payer_is_owed_an_equal_share_by_everyone() {
    let t = trip();
    add(&t, t.john, "Hotel", 500.0);
    add(&t, t.john, "Restaurant", 150.0);
    add(&t, t.john, "Sightseeing", 100.0);

    let outstanding = t.directory.outstanding_payments(t.group_id).unwrap();
    assert_eq!(outstanding.len(), 2);
    assert_eq!(outstanding.total_for_payer(&t.mary), 250.0);
    assert_eq!(outstanding.total_for_payer(&t.peter), 250.0);
}

#[test]
fn settling_every_payment_drains_the_balance() {
    let t = three_payers();
    let outstanding = t.directory.outstanding_payments(t.group_id).unwrap();

    for payment in outstanding.payments() {
        t.directory.propose_settlement(t.group_id, *payment).unwrap();
    }

    assert_eq!(t.directory.settlement_records(t.group_id).unwrap().len(), 2);
    assert!(t.directory.outstanding_payments(t.group_id).unwrap().is_empty());
}

#[test]
fn non_debtor_payer_is_rejected() {
    let t = three_payers();
    let err = t
        .directory
        .propose_settlement(t.group_id, Payment::new(t.john, t.mary, 30.0))
        .unwrap_err();

    assert_eq!(
        err,
        DirectoryError::Domain(DomainError::NoPendingPaymentsForPayer { payer: t.john })
    );
}

#[test]
fn partial_amount_is_rejected() {
    let t = three_payers();
    let err = t
        .directory
        .propose_settlement(t.group_id, Payment::new(t.mary, t.john, 30.0))
        .unwrap_err();

    assert_eq!(
        err,
        DirectoryError::Domain(DomainError::PaymentNotRecognized {
            payer: t.mary,
            receiver: t.john,
            amount: 30.0,
        })
    );
}

#[test]
fn wrong_receiver_is_rejected() {
    let t = three_payers();
    let err = t
        .directory
        .propose_settlement(t.group_id, Payment::new(t.mary, t.peter, 100.0))
        .unwrap_err();

    assert!(matches!(
        err,
        DirectoryError::Domain(DomainError::PaymentNotRecognized { .. })
    ));
}

#[test]
fn resubmitted_partial_settlement_is_rejected() {
    let t = trip();
    add(&t, t.peter, "Hotel", 90.0);
    add(&t, t.mary, "Dinner", 90.0);

    let to_peter = Payment::new(t.john, t.peter, 30.0);
    let to_mary = Payment::new(t.john, t.mary, 30.0);
    let outstanding = t.directory.outstanding_payments(t.group_id).unwrap();
    assert_eq!(outstanding.for_payer(&t.john).map(<[Payment]>::len), Some(2));

    t.directory.propose_settlement(t.group_id, to_peter).unwrap();
    let err = t
        .directory
        .propose_settlement(t.group_id, to_peter)
        .unwrap_err();

    assert_eq!(
        err,
        DirectoryError::Domain(DomainError::PaymentNotRecognized {
            payer: t.john,
            receiver: t.peter,
            amount: 30.0,
        })
    );
    let outstanding = t.directory.outstanding_payments(t.group_id).unwrap();
    assert_eq!(outstanding.for_payer(&t.john), Some(&[to_mary][..]));
}

#[test]
fn one_settlement_freezes_expenses_for_unrelated_members() {
    let t = trip();
    let hotel = add(&t, t.john, "Hotel", 500.0);
    add(&t, t.john, "Restaurant", 150.0);
    add(&t, t.john, "Sightseeing", 100.0);

    let from_mary: Vec<Payment> = t
        .directory
        .outstanding_payments(t.group_id)
        .unwrap()
        .for_payer(&t.mary)
        .unwrap()
        .to_vec();
    for payment in from_mary {
        t.directory.propose_settlement(t.group_id, payment).unwrap();
    }

    let add_err = t
        .directory
        .add_or_replace_expense(t.group_id, Expense::new(t.peter, "Shopping", 100.0))
        .unwrap_err();
    assert_eq!(add_err, DirectoryError::Domain(DomainError::GroupSettling));

    let remove_err = t
        .directory
        .remove_expense(t.group_id, hotel.id_typed())
        .unwrap_err();
    assert_eq!(remove_err, DirectoryError::Domain(DomainError::GroupSettling));

    assert_eq!(t.directory.expenses(t.group_id).unwrap().len(), 3);
}

#[test]
fn every_operation_reports_an_unknown_group() {
    let t = three_payers();
    let unknown = GroupId::new();
    let not_found = DirectoryError::GroupNotFound(unknown);

    assert_eq!(
        t.directory
            .add_or_replace_expense(unknown, Expense::new(t.john, "Hotel", 500.0))
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        t.directory
            .remove_expense(unknown, tabsettle_core::ExpenseId::new())
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        t.directory
            .propose_settlement(unknown, Payment::new(t.john, t.john, 0.0))
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        t.directory.outstanding_payments(unknown).unwrap_err(),
        not_found
    );
}

#[test]
fn creation_is_idempotent_regardless_of_member_order() {
    let t = trip();
    let again = t
        .directory
        .create_group("Trip", vec![member(2, "Peter"), member(3, "Mary"), member(1, "John")])
        .unwrap();

    assert_eq!(again.id_typed(), t.group_id);
    assert!(Arc::ptr_eq(&again, &t.directory.lookup(t.group_id).unwrap()));
    assert_eq!(t.directory.len().unwrap(), 1);
}

#[test]
fn groups_are_independent() {
    let t = three_payers();
    let dinner = t
        .directory
        .create_group("Dinner", vec![member(1, "John"), member(3, "Mary")])
        .unwrap();

    t.directory
        .propose_settlement(t.group_id, Payment::new(t.mary, t.john, 100.0))
        .unwrap();

    t.directory
        .add_or_replace_expense(dinner.id_typed(), Expense::new(t.mary, "Pizza", 40.0))
        .unwrap();
    let outstanding = t.directory.outstanding_payments(dinner.id_typed()).unwrap();
    assert!(outstanding.contains(&Payment::new(t.john, t.mary, 20.0)));
    assert!(!dinner.is_settling());
}

#[test]
fn concurrent_clients_share_one_group() {
    let directory = Arc::new(InMemoryGroupDirectory::new());
    let crew: Vec<Member> = (1..=4).map(|n| member(n, &format!("m{n}"))).collect();
    let payers: Vec<MemberId> = crew.iter().map(Member::id_typed).collect();

    let groups: Vec<Arc<Group>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let directory = Arc::clone(&directory);
                let mut members = crew.clone();
                members.rotate_left(i);
                s.spawn(move || directory.create_group("Flat", members).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(groups.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    let group_id = groups[0].id_typed();

    thread::scope(|s| {
        for payer in &payers {
            let directory = Arc::clone(&directory);
            s.spawn(move || {
                for k in 0..25 {
                    let expense = Expense::new(*payer, format!("rent {k}"), 40.0);
                    directory.add_or_replace_expense(group_id, expense).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..100 {
                let outstanding = directory.outstanding_payments(group_id).unwrap();
                assert!(outstanding.payments().all(|p| p.amount > 0.0));
            }
        });
    });

    assert_eq!(directory.expenses(group_id).unwrap().len(), 100);
    assert!(directory.outstanding_payments(group_id).unwrap().is_empty());
}
