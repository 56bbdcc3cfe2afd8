//! Durable JSON-file record stores for an open-banking gateway: one table
//! of users, one table of per-user bank lists.
//!
//! Each store keeps its whole table in memory behind a single mutex and
//! rewrites its backing file on every mutation before returning.
//!
//! ```rust,no_run
//! use bank_ledger_store::{Stores, StoreConfig, User};
//!
//! let stores = Stores::open(&StoreConfig::default()).unwrap();
//! let id = stores
//!     .users
//!     .register(User {
//!         email: "a@x.com".into(),
//!         phone: "1".into(),
//!         password: "p".into(),
//!         ..User::default()
//!     })
//!     .unwrap();
//! assert_eq!(stores.users.get("a@x.com").unwrap().user_id, id);
//! ```
//!
//! **Single-process only.** Two processes (or two stores) on the same file
//! will clobber each other.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bank;
pub mod codec;
pub mod config;
pub mod error;
pub mod persist;
pub mod store;
pub mod user;

pub use bank::{Bank, BankListStore, BankRouting};
pub use config::{StoreConfig, Stores};
pub use error::{Error, ErrorKind, Result};
pub use persist::WriteMode;
pub use store::{Store, StoreBuilder};
pub use user::{User, UserField, UserStore};
