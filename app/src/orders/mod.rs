use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use log::*;

use infra::persistence::Storage;

use crate::cart::{subtotal, Cart, CartLine};
use crate::error::BazaarError;
use crate::menu::Menu;
use crate::services::{Commandable, Request};
use crate::store::BazaarStore;
use crate::Bazaar;

mod models;

pub use self::models::{OrderLine, OrderLog, OrderRecord};

/// The in-memory copy of the order log. Every mutation is written through to
/// the store before it becomes visible here.
#[derive(Debug, Clone, Default)]
pub struct Orders {
    log: OrderLog,
}

/// Fills the session cart with `lines` and places the order. A rejected
/// order leaves the cart as it was before the command.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub lines: Vec<CartLine>,
    pub buyer: String,
    pub note: String,
}

impl Orders {
    pub fn load<S: Storage>(store: &S) -> Result<Self, BazaarError> {
        let log = store.load_orders()?;
        debug!("Loaded {} orders", log.0.len());
        Ok(Orders { log })
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.log.0
    }

    pub fn len(&self) -> usize {
        self.log.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.0.is_empty()
    }

    /// Replaces the in-memory log with what is currently on disk.
    pub fn reload<S: Storage>(&mut self, store: &S) -> Result<(), BazaarError> {
        self.log = store.load_orders()?;
        debug!("Reloaded {} orders", self.len());
        Ok(())
    }

    pub fn place_order<S: Storage>(
        &mut self,
        store: &S,
        cart: &Cart,
        menu: &Menu,
        buyer: &str,
        note: &str,
    ) -> Result<OrderRecord, BazaarError> {
        self.place_order_at(store, cart, menu, buyer, note, Utc::now())
    }

    fn place_order_at<S: Storage>(
        &mut self,
        store: &S,
        cart: &Cart,
        menu: &Menu,
        buyer: &str,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<OrderRecord, BazaarError> {
        if cart.is_empty() {
            return Err(BazaarError::EmptyCart);
        }
        let buyer = buyer.trim();
        if buyer.is_empty() {
            return Err(BazaarError::MissingBuyer);
        }

        let items = cart
            .lines(menu)
            .map(|(item, qty, _)| OrderLine::of(item, qty))
            .collect::<Vec<_>>();
        let total = items
            .iter()
            .map(|it| subtotal(it.price, it.qty))
            .fold(0u64, u64::saturating_add);

        let record = OrderRecord {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            buyer: buyer.to_string(),
            note: note.to_string(),
            items,
            total,
        };

        self.log.0.push(record.clone());
        if let Err(e) = store.save_orders(&self.log) {
            warn!("Could not persist order for {:?}, rolling back: {}", buyer, e);
            self.log.0.pop();
            return Err(e.into());
        }

        info!(
            "Order placed by {:?}: {} lines, total {}",
            record.buyer,
            record.items.len(),
            record.total
        );
        Ok(record)
    }

    pub fn clear<S: Storage>(&mut self, store: &S) -> Result<usize, BazaarError> {
        let cleared = self.len();
        store.save_orders(&OrderLog::default())?;
        self.log.0.clear();
        info!("Cleared {} orders", cleared);
        Ok(cleared)
    }

    /// Re-reads the log from disk and writes a timestamped copy of it.
    pub fn export<S: Storage>(&mut self, store: &S) -> Result<PathBuf, BazaarError> {
        self.reload(store)?;
        Ok(store.export_orders(&self.log, Utc::now())?)
    }
}

impl Request for PlaceOrder {
    type Resp = OrderRecord;
}

impl<S: Storage> Commandable<PlaceOrder> for Bazaar<S> {
    fn execute(&mut self, req: PlaceOrder) -> Result<OrderRecord> {
        let PlaceOrder { lines, buyer, note } = req;
        if let Some(line) = lines.iter().find(|l| !self.menu().contains(l.item_id)) {
            return Err(BazaarError::UnknownItem(line.item_id).into());
        }
        let before = self.cart.clone();
        for line in lines {
            self.cart.add(line.item_id, line.qty);
        }
        match self.place_order(&buyer, &note) {
            Ok(record) => Ok(record),
            Err(e) => {
                debug!("Order rejected, restoring cart: {}", e);
                self.cart = before;
                Err(e.into())
            }
        }
    }
}
