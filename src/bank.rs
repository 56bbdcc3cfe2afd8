//! Per-user bank lists.

use crate::error::{Error, Result};
use crate::store::{Store, StoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to reach a bank on the open-banking network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BankRouting {
    /// Routing scheme, e.g. `"OBP"`.
    pub scheme: String,
    /// Address within that scheme.
    pub address: String,
}

/// A bank reference as returned by the upstream banking API. Field names
/// on disk match the upstream payload.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Bank {
    #[serde(rename = "ID")]
    pub id: String,
    pub full_name: String,
    pub short_name: String,
    #[serde(rename = "LogoURL")]
    pub logo_url: String,
    #[serde(rename = "WebsiteURL")]
    pub website_url: String,
    #[serde(rename = "SwiftBIC")]
    pub swift_bic: String,
    pub national_identifier: String,
    pub bank_routing: BankRouting,
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::missing(what))
    } else {
        Ok(())
    }
}

fn no_banks(user_id: &str) -> Error {
    Error::NoCollection(user_id.to_string())
}

fn no_bank(user_id: &str, bank_id: &str) -> Error {
    Error::NoElement {
        owner: user_id.to_string(),
        id: bank_id.to_string(),
    }
}

/// Durable table of `user_id -> [Bank, ...]`, kept in insertion order.
#[derive(Debug)]
pub struct BankListStore {
    store: Store<String, Vec<Bank>>,
}

impl BankListStore {
    /// Open (or create) the bank-list table at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Store::open(path).map(|store| Self { store })
    }

    /// Open through a configured builder (pretty output, write mode).
    pub fn with_builder(builder: StoreBuilder<String, Vec<Bank>>) -> Result<Self> {
        builder.build().map(|store| Self { store })
    }

    /// Append `bank` to the user's list, creating the list on first use.
    ///
    /// `None` or a bank without an identifier is rejected, and so is a bank
    /// whose identifier is already in this user's list.
    pub fn add_bank(&self, user_id: &str, bank: Option<Bank>) -> Result<()> {
        require(user_id, "user id")?;
        let bank = bank.ok_or_else(|| Error::Validation("cannot add nil bank".into()))?;
        require(&bank.id, "bank id")?;

        self.store.mutate(|table| {
            let banks = table.entry(user_id.to_string()).or_default();
            if banks.iter().any(|b| b.id == bank.id) {
                return Err(Error::Conflict("bank_id".into()));
            }
            banks.push(bank);
            Ok(())
        })
    }

    /// The user's whole list, in insertion order.
    pub fn get_banks(&self, user_id: &str) -> Result<Vec<Bank>> {
        require(user_id, "user id")?;
        self.store
            .read(|table| table.get(user_id).cloned())
            .ok_or_else(|| no_banks(user_id))
    }

    /// One bank from the user's list.
    pub fn get_bank(&self, user_id: &str, bank_id: &str) -> Result<Bank> {
        require(user_id, "user id")?;
        require(bank_id, "bank id")?;
        self.store.read(|table| {
            let banks = table.get(user_id).ok_or_else(|| no_banks(user_id))?;
            banks
                .iter()
                .find(|b| b.id == bank_id)
                .cloned()
                .ok_or_else(|| no_bank(user_id, bank_id))
        })
    }

    /// Drop the first bank with `bank_id`, keeping the order of the rest.
    /// The (possibly empty) list stays in place.
    pub fn remove_bank(&self, user_id: &str, bank_id: &str) -> Result<Bank> {
        require(user_id, "user id")?;
        require(bank_id, "bank id")?;
        self.store.mutate(|table| {
            let banks = table.get_mut(user_id).ok_or_else(|| no_banks(user_id))?;
            let pos = banks
                .iter()
                .position(|b| b.id == bank_id)
                .ok_or_else(|| no_bank(user_id, bank_id))?;
            Ok(banks.remove(pos))
        })
    }

    /// Users that have a list, in identifier order.
    pub fn owners(&self) -> Vec<String> {
        self.store.read(|table| table.keys().cloned().collect())
    }

    /// The underlying table.
    pub fn store(&self) -> &Store<String, Vec<Bank>> {
        &self.store
    }
}
