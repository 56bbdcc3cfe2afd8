//! Wires both stores the way a gateway process would at startup: load
//! `.env`, read the config, open the stores once, and hand out the handles.
//!
//! Run with `RUST_LOG=debug` to see every write-through.

use bank_ledger_store::{Bank, BankRouting, StoreConfig, Stores, User};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run() -> Result<(), bank_ledger_store::Error> {
    let mut cfg = StoreConfig::from_env()?;
    if std::env::var_os("USERS_DB_PATH").is_none() {
        cfg.users_path = std::env::temp_dir().join("bank_ledger_demo_users.db");
    }
    if std::env::var_os("BANKS_DB_PATH").is_none() {
        cfg.banks_path = std::env::temp_dir().join("bank_ledger_demo_banks.db");
    }
    let stores = Stores::open(&cfg)?;

    let email = format!("demo+{}@example.com", stores.users.len());
    let id = stores.users.register(User {
        email: email.clone(),
        phone: format!("+1555{:04}", stores.users.len()),
        first_name: "Demo".into(),
        password: "change-me".into(),
        ..User::default()
    })?;
    let user = stores.users.login(&email, "change-me")?;
    info!(user_id = %user.user_id, "logged in");

    stores.banks.add_bank(
        &id,
        Some(Bank {
            id: "gh.29.uk".into(),
            full_name: "Acme Bank".into(),
            short_name: "Acme".into(),
            bank_routing: BankRouting {
                scheme: "OBP".into(),
                address: "gh.29.uk".into(),
            },
            ..Bank::default()
        }),
    )?;
    for bank in stores.banks.get_banks(&id)? {
        info!(user_id = %id, bank_id = %bank.id, name = %bank.full_name, "bank on file");
    }

    println!("users file: {}", cfg.users_path.display());
    println!("banks file: {}", cfg.banks_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "gateway stores failed");
            ExitCode::FAILURE
        }
    }
}
