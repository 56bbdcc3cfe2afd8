use bank_ledger_store::{Bank, StoreConfig, Stores, User, WriteMode};
use std::sync::Arc;
use std::thread;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "bank_ledger_conc_{}_{}.db",
        name,
        uuid::Uuid::new_v4()
    ))
}

fn config(name: &str) -> StoreConfig {
    StoreConfig {
        users_path: temp_path(&format!("{name}_users")),
        banks_path: temp_path(&format!("{name}_banks")),
        pretty: false,
        write_mode: WriteMode::Atomic,
    }
}

fn cleanup(cfg: &StoreConfig) {
    let _ = std::fs::remove_file(&cfg.users_path);
    let _ = std::fs::remove_file(&cfg.banks_path);
}

#[test]
fn parallel_registrations_are_serialized() {
    let cfg = config("register");
    let stores = Stores::open(&cfg).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let users = Arc::clone(&stores.users);
            thread::spawn(move || {
                for i in 0..10 {
                    users
                        .register(User {
                            email: format!("u{t}_{i}@x.com"),
                            phone: format!("{t}{i:03}"),
                            password: "pw".into(),
                            ..User::default()
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(stores.users.len(), 80);

    let reopened = Stores::open(&cfg).unwrap();
    assert_eq!(reopened.users.users(), stores.users.users());
    cleanup(&cfg);
}

#[test]
fn racing_for_one_email_admits_exactly_one() {
    let cfg = config("race");
    let stores = Stores::open(&cfg).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let users = Arc::clone(&stores.users);
            thread::spawn(move || {
                users
                    .register(User {
                        email: "same@x.com".into(),
                        phone: format!("{t}"),
                        password: "pw".into(),
                        ..User::default()
                    })
                    .is_ok()
            })
        })
        .collect();
    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(wins, 1);
    assert_eq!(stores.users.len(), 1);
    cleanup(&cfg);
}

#[test]
fn both_stores_work_side_by_side() {
    let cfg = config("side_by_side");
    let stores = Stores::open(&cfg).unwrap();

    let users = Arc::clone(&stores.users);
    let banks = Arc::clone(&stores.banks);
    let writer = thread::spawn(move || {
        for i in 0..20 {
            banks
                .add_bank(
                    "U1",
                    Some(Bank {
                        id: format!("B{i}"),
                        ..Bank::default()
                    }),
                )
                .unwrap();
        }
    });
    let id = users
        .register(User {
            email: "a@x.com".into(),
            phone: "1".into(),
            password: "pw".into(),
            ..User::default()
        })
        .unwrap();
    writer.join().unwrap();

    let reopened = Stores::open(&cfg).unwrap();
    assert_eq!(reopened.banks.get_banks("U1").unwrap().len(), 20);
    assert_eq!(reopened.users.get("1").unwrap().user_id, id);
    cleanup(&cfg);
}
