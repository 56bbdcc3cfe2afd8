//! Startup configuration and the pair of stores handed to request handlers.

use crate::bank::BankListStore;
use crate::error::{Error, Result};
use crate::persist::WriteMode;
use crate::store::Store;
use crate::user::UserStore;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default file for the user table.
pub const DEFAULT_USERS_PATH: &str = "users.db";
/// Default file for the bank-list table.
pub const DEFAULT_BANKS_PATH: &str = "banks.db";

/// Where the stores live and how they write.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backing file for users.
    pub users_path: PathBuf,
    /// Backing file for bank lists.
    pub banks_path: PathBuf,
    /// Indent the JSON on disk.
    pub pretty: bool,
    /// In-place overwrite or temp file + rename.
    pub write_mode: WriteMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            users_path: DEFAULT_USERS_PATH.into(),
            banks_path: DEFAULT_BANKS_PATH.into(),
            pretty: false,
            write_mode: WriteMode::default(),
        }
    }
}

fn or_default(path: PathBuf, default: &str) -> PathBuf {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        default.into()
    } else {
        path
    }
}

impl StoreConfig {
    /// Build from `USERS_DB_PATH`, `BANKS_DB_PATH`, `STORE_PRETTY` and
    /// `STORE_WRITE_MODE`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(p) = get("USERS_DB_PATH") {
            cfg.users_path = p.into();
        }
        if let Some(p) = get("BANKS_DB_PATH") {
            cfg.banks_path = p.into();
        }
        if let Some(v) = get("STORE_PRETTY") {
            cfg.pretty = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(Error::Validation(format!("invalid STORE_PRETTY: {other}")))
                }
            };
        }
        if let Some(v) = get("STORE_WRITE_MODE") {
            cfg.write_mode = v.parse()?;
        }
        Ok(cfg.normalize())
    }

    /// Replace blank paths with the defaults.
    pub fn normalize(mut self) -> Self {
        self.users_path = or_default(self.users_path, DEFAULT_USERS_PATH);
        self.banks_path = or_default(self.banks_path, DEFAULT_BANKS_PATH);
        self
    }
}

/// Both stores, opened once at startup and shared with the handler layer.
#[derive(Debug, Clone)]
pub struct Stores {
    /// User table.
    pub users: Arc<UserStore>,
    /// Bank lists.
    pub banks: Arc<BankListStore>,
}

impl Stores {
    /// Open both stores. Any failure is returned; nothing is half-open.
    pub fn open(cfg: &StoreConfig) -> Result<Self> {
        let cfg = cfg.clone().normalize();
        let users = UserStore::with_builder(
            Store::builder(&cfg.users_path)
                .pretty(cfg.pretty)
                .write_mode(cfg.write_mode),
        )?;
        let banks = BankListStore::with_builder(
            Store::builder(&cfg.banks_path)
                .pretty(cfg.pretty)
                .write_mode(cfg.write_mode),
        )?;
        info!(
            users = users.len(),
            bank_owners = banks.owners().len(),
            "stores ready"
        );
        Ok(Self {
            users: Arc::new(users),
            banks: Arc::new(banks),
        })
    }
}
