use log::*;

use infra::persistence::{Documents, Storage};

pub mod admin;
pub mod cart;
pub mod config;
pub mod error;
pub mod menu;
pub mod money;
pub mod orders;
pub mod services;
pub mod store;

use crate::admin::{AdminGate, AdminPanel};
use crate::cart::Cart;
use crate::error::BazaarError;
use crate::menu::{ItemId, Menu};
use crate::orders::{OrderRecord, Orders};

/// One running point of sale: the loaded documents plus the buyer's cart.
#[derive(Debug)]
pub struct Bazaar<S> {
    store: S,
    menu: Menu,
    orders: Orders,
    gate: AdminGate,
    cart: Cart,
}

impl Bazaar<Documents> {
    pub fn new(config: &config::Config) -> Result<Self, BazaarError> {
        let docs = config.storage.build()?;
        Self::open(docs)
    }
}

impl<S: Storage> Bazaar<S> {
    /// Loads all three documents, seeding any that are missing.
    pub fn open(store: S) -> Result<Self, BazaarError> {
        info!("Opening bazaar");
        let menu = Menu::load(&store)?;
        let orders = Orders::load(&store)?;
        let gate = AdminGate::load(&store)?;
        let cart = Cart::new();

        Ok(Bazaar {
            store,
            menu,
            orders,
            gate,
            cart,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_to_cart(&mut self, item_id: ItemId, qty: u32) -> Result<(), BazaarError> {
        if !self.menu.contains(item_id) {
            return Err(BazaarError::UnknownItem(item_id));
        }
        self.cart.add(item_id, qty);
        trace!("Cart now {:?}", self.cart);
        Ok(())
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn cart_total(&self) -> u64 {
        self.cart.total(&self.menu)
    }

    /// Records the current cart as an order and empties the cart. On failure
    /// the cart is kept so the buyer can try again.
    pub fn place_order(&mut self, buyer: &str, note: &str) -> Result<OrderRecord, BazaarError> {
        let record = self
            .orders
            .place_order(&self.store, &self.cart, &self.menu, buyer, note)?;
        self.cart.clear();
        Ok(record)
    }

    pub fn authenticate(&self, password: &str) -> bool {
        self.gate.authenticate(password)
    }

    /// Opens the admin panel if `password` is right.
    pub fn unlock(&mut self, password: &str) -> Result<Option<AdminPanel<'_, S>>, BazaarError> {
        if !self.gate.authenticate(password) {
            return Ok(None);
        }
        let panel = AdminPanel::open(&self.store, &mut self.orders, &mut self.gate)?;
        Ok(Some(panel))
    }
}
