//! The bazaar's three documents, by name.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use infra::persistence::{Storage, StorageError};

use crate::admin::AdminCredential;
use crate::menu::Catalog;
use crate::orders::OrderLog;

const EXPORT_STAMP: &str = "%Y%m%d%H%M%S";

pub trait BazaarStore: Storage {
    fn load_menu(&self) -> Result<Catalog, StorageError> {
        self.load::<Catalog>()
    }

    fn load_orders(&self) -> Result<OrderLog, StorageError> {
        self.load::<OrderLog>()
    }

    fn save_orders(&self, orders: &OrderLog) -> Result<(), StorageError> {
        self.save(orders)
    }

    fn load_config(&self) -> Result<AdminCredential, StorageError> {
        self.load::<AdminCredential>()
    }

    fn save_config(&self, config: &AdminCredential) -> Result<(), StorageError> {
        self.save(config)
    }

    /// Writes `orders_export_<YYYYMMDDHHMMSS>.json` for the given instant.
    fn export_orders(&self, orders: &OrderLog, at: DateTime<Utc>) -> Result<PathBuf, StorageError> {
        let label = format!("export_{}", at.format(EXPORT_STAMP));
        self.export(orders, &label)
    }
}

impl<S: Storage> BazaarStore for S {}
