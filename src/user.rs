//! User records: uniqueness on email/phone and lookup by any of
//! identifier, email or phone.

use crate::error::{Error, Result};
use crate::store::{Store, StoreBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// A registered API user.
///
/// Empty fields are left out of the JSON and read back as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Generated at registration, never changed afterwards.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    /// Unique across the table when non-empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Unique across the table when non-empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    /// Kept as given. Hashing belongs to whoever issues credentials.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Field that made a candidate record collide with a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum UserField {
    UserId,
    Email,
    Phone,
}

impl UserField {
    /// Name as it appears in the JSON record.
    pub fn as_str(self) -> &'static str {
        match self {
            UserField::UserId => "user_id",
            UserField::Email => "email",
            UserField::Phone => "phone",
        }
    }
}

impl std::fmt::Display for UserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserField> for Error {
    fn from(field: UserField) -> Self {
        Error::Conflict(field.as_str().to_string())
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn same(stored: &str, candidate: &str) -> bool {
    !stored.is_empty() && stored == candidate
}

/// First email/phone collision between `candidate` and any record other
/// than `skip_id`.
fn collision(
    table: &BTreeMap<String, User>,
    candidate: &User,
    skip_id: Option<&str>,
) -> Option<UserField> {
    table
        .values()
        .filter(|u| Some(u.user_id.as_str()) != skip_id)
        .find_map(|u| {
            if same(&u.email, &candidate.email) {
                Some(UserField::Email)
            } else if same(&u.phone, &candidate.phone) {
                Some(UserField::Phone)
            } else {
                None
            }
        })
}

fn lookup<'a>(table: &'a BTreeMap<String, User>, key: &str) -> Option<&'a User> {
    table.get(key).or_else(|| {
        table
            .values()
            .find(|u| same(&u.email, key) || same(&u.phone, key) || same(&u.user_id, key))
    })
}

/// Durable user table keyed by `user_id`.
#[derive(Debug)]
pub struct UserStore {
    store: Store<String, User>,
}

impl UserStore {
    /// Open (or create) the user table at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Store::open(path).map(Self::from_store)
    }

    /// Open through a configured builder (pretty output, write mode).
    pub fn with_builder(builder: StoreBuilder<String, User>) -> Result<Self> {
        builder.build().map(Self::from_store)
    }

    fn from_store(store: Store<String, User>) -> Self {
        Self { store }
    }

    /// Whether `candidate.user_id` is already taken, and if it is not, the
    /// first field whose non-empty value another record already uses.
    pub fn exists(&self, candidate: &User) -> (bool, Option<UserField>) {
        self.store.read(|table| {
            if table.contains_key(&candidate.user_id) {
                (true, None)
            } else {
                (false, collision(table, candidate, None))
            }
        })
    }

    /// Insert `user` under its identifier.
    ///
    /// Fails with [`Error::Conflict`] if the identifier is taken or the
    /// email/phone belongs to another record.
    pub fn add(&self, user: User) -> Result<()> {
        if blank(&user.user_id) {
            return Err(Error::missing("user id"));
        }
        self.store.mutate(|table| {
            if table.contains_key(&user.user_id) {
                return Err(UserField::UserId.into());
            }
            if let Some(field) = collision(table, &user, None) {
                return Err(field.into());
            }
            table.insert(user.user_id.clone(), user);
            Ok(())
        })
    }

    /// Validate credentials, assign a fresh identifier and add the user.
    /// Returns the new identifier.
    pub fn register(&self, mut user: User) -> Result<String> {
        if blank(&user.email) {
            return Err(Error::missing("user email"));
        }
        if blank(&user.phone) {
            return Err(Error::missing("user phone"));
        }
        if blank(&user.password) {
            return Err(Error::missing("user password"));
        }
        let id = Uuid::new_v4().to_string();
        user.user_id = id.clone();
        self.add(user)?;
        info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Resolve `key` as identifier, then email, then phone.
    pub fn get(&self, key: &str) -> Result<User> {
        self.store
            .read(|table| lookup(table, key).cloned())
            .ok_or_else(|| Error::NotFound(format!("couldn't find user with id: {key}")))
    }

    /// Resolve `key` like [`get`](Self::get) and check the password.
    pub fn login(&self, key: &str, password: &str) -> Result<User> {
        if blank(key) {
            return Err(Error::missing("user id"));
        }
        if blank(password) {
            return Err(Error::missing("password"));
        }
        let user = self.get(key)?;
        if user.password != password {
            return Err(Error::Validation("password incorrect".into()));
        }
        Ok(user)
    }

    /// Merge the non-empty fields of `patch` into the record stored under
    /// exactly `user_id`. Blank patch fields keep the stored value and the
    /// identifier is never rewritten. Returns the updated record.
    pub fn update(&self, user_id: &str, patch: &User) -> Result<User> {
        self.store.mutate(|table| {
            let mut user = table
                .get(user_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("user {user_id} doesn't exist")))?;

            for (slot, value) in [
                (&mut user.email, &patch.email),
                (&mut user.phone, &patch.phone),
                (&mut user.first_name, &patch.first_name),
                (&mut user.last_name, &patch.last_name),
                (&mut user.password, &patch.password),
            ] {
                if !blank(value) {
                    slot.clone_from(value);
                }
            }

            if let Some(field) = collision(table, &user, Some(user_id)) {
                return Err(field.into());
            }
            table.insert(user_id.to_string(), user.clone());
            Ok(user)
        })
    }

    /// All users in identifier order.
    pub fn users(&self) -> Vec<User> {
        self.store.read(|table| table.values().cloned().collect())
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// `true` when no user is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The underlying table.
    pub fn store(&self) -> &Store<String, User> {
        &self.store
    }
}
