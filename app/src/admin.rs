//! Password gate in front of the order log.
//!
//! There are no sessions: [`Bazaar::unlock`](crate::Bazaar::unlock) hands out an [`AdminPanel`] only
//! when the password matches, and the panel borrows the bazaar for as long as
//! it is open. Dropping the panel locks the gate again.

use std::path::PathBuf;

use anyhow::Result;
use log::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use infra::documents::Document;
use infra::persistence::Storage;

use crate::error::BazaarError;
use crate::orders::{OrderRecord, Orders};
use crate::services::{Commandable, Queryable, Request};
use crate::store::BazaarStore;

pub const DEFAULT_PASSWORD: &str = "admin123";
pub const DEFAULT_PASSWORD_HASH: &str =
    "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";

/// The credential document, `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    #[serde(alias = "admin_password_sha256")]
    pub admin_password_hash: String,
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    credential: AdminCredential,
}

pub struct AdminPanel<'a, S> {
    store: &'a S,
    orders: &'a mut Orders,
    gate: &'a mut AdminGate,
}

#[derive(Debug, Clone, Copy)]
pub struct ListOrders;

#[derive(Debug, Clone, Copy)]
pub struct ExportOrders;

#[derive(Debug, Clone, Copy)]
pub struct ClearOrders;

#[derive(Debug, Clone)]
pub struct ChangePassword {
    pub new_password: String,
    pub confirmation: String,
}

/// Lowercase hex SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl AdminCredential {
    pub fn for_password(password: &str) -> Self {
        AdminCredential {
            admin_password_hash: hash_password(password),
        }
    }
}

impl Document for AdminCredential {
    const FILE_NAME: &'static str = "config.json";

    fn seed() -> Self {
        AdminCredential::for_password(DEFAULT_PASSWORD)
    }
}

impl AdminGate {
    pub fn load<S: Storage>(store: &S) -> Result<Self, BazaarError> {
        let credential = store.load_config()?;
        Ok(AdminGate { credential })
    }

    pub fn authenticate(&self, password: &str) -> bool {
        let stored = self.credential.admin_password_hash.to_ascii_lowercase();
        let ok = constant_time_eq(&hash_password(password), &stored);
        if !ok {
            info!("Rejected admin password");
        }
        ok
    }

    /// Persists a new password. The old one stays valid if the write fails.
    pub fn change_password<S: Storage>(
        &mut self,
        store: &S,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), BazaarError> {
        if new_password != confirmation {
            return Err(BazaarError::PasswordMismatch);
        }
        if new_password.is_empty() {
            return Err(BazaarError::EmptyPassword);
        }

        let credential = AdminCredential::for_password(new_password);
        store.save_config(&credential)?;
        self.credential = credential;
        info!("Admin password changed");
        Ok(())
    }
}

impl<'a, S: Storage> AdminPanel<'a, S> {
    /// Opens an unlocked panel, refreshing the order log from disk.
    pub(crate) fn open(
        store: &'a S,
        orders: &'a mut Orders,
        gate: &'a mut AdminGate,
    ) -> Result<Self, BazaarError> {
        orders.reload(store)?;
        debug!("Admin panel opened with {} orders", orders.len());
        Ok(AdminPanel {
            store,
            orders,
            gate,
        })
    }

    pub fn orders(&self) -> &[OrderRecord] {
        self.orders.records()
    }

    pub fn refresh(&mut self) -> Result<(), BazaarError> {
        self.orders.reload(self.store)
    }

    /// Deletes every order, returning how many there were.
    pub fn clear_orders(&mut self) -> Result<usize, BazaarError> {
        self.orders.clear(self.store)
    }

    /// Writes a timestamped copy of the order log as it is on disk now.
    pub fn export_orders(&mut self) -> Result<PathBuf, BazaarError> {
        self.orders.export(self.store)
    }

    pub fn change_password(
        &mut self,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), BazaarError> {
        self.gate
            .change_password(self.store, new_password, confirmation)
    }
}

impl<'a, S> Drop for AdminPanel<'a, S> {
    fn drop(&mut self) {
        debug!("Admin panel closed");
    }
}

impl Request for ListOrders {
    type Resp = Vec<OrderRecord>;
}

impl Request for ExportOrders {
    type Resp = PathBuf;
}

impl Request for ClearOrders {
    type Resp = usize;
}

impl Request for ChangePassword {
    type Resp = ();
}

impl<'a, S: Storage> Queryable<ListOrders> for AdminPanel<'a, S> {
    fn query(&self, _: ListOrders) -> Result<Vec<OrderRecord>> {
        Ok(self.orders().to_vec())
    }
}

impl<'a, S: Storage> Commandable<ExportOrders> for AdminPanel<'a, S> {
    fn execute(&mut self, _: ExportOrders) -> Result<PathBuf> {
        Ok(self.export_orders()?)
    }
}

impl<'a, S: Storage> Commandable<ClearOrders> for AdminPanel<'a, S> {
    fn execute(&mut self, _: ClearOrders) -> Result<usize> {
        Ok(self.clear_orders()?)
    }
}

impl<'a, S: Storage> Commandable<ChangePassword> for AdminPanel<'a, S> {
    fn execute(&mut self, req: ChangePassword) -> Result<()> {
        self.change_password(&req.new_password, &req.confirmation)?;
        Ok(())
    }
}
