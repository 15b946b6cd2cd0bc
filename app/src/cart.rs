use std::str::FromStr;

use err_derive::Error;

use crate::menu::{ItemId, Menu, MenuItem};

/// One selected item and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: ItemId,
    pub qty: u32,
}

/// The session's in-progress selection. Lines keep the order in which items
/// were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(display = "expected ID or ID:QTY, got {:?}", _0)]
pub struct ParseCartLineError(String);

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `qty` of an item; repeated adds accumulate and zero is a no-op.
    pub fn add(&mut self, item_id: ItemId, qty: u32) {
        if qty == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => line.qty = line.qty.saturating_add(qty),
            None => self.lines.push(CartLine { item_id, qty }),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Resolves each line against `menu` as `(item, qty, subtotal)`. Lines
    /// whose item has left the menu are skipped.
    pub fn lines<'a>(&'a self, menu: &'a Menu) -> impl 'a + Iterator<Item = (&'a MenuItem, u32, u64)> {
        self.lines.iter().filter_map(move |line| {
            menu.get(line.item_id)
                .map(|item| (item, line.qty, subtotal(item.price, line.qty)))
        })
    }

    pub fn total(&self, menu: &Menu) -> u64 {
        self.lines(menu)
            .map(|(_, _, subtotal)| subtotal)
            .fold(0u64, u64::saturating_add)
    }
}

pub(crate) fn subtotal(price: u64, qty: u32) -> u64 {
    price.saturating_mul(u64::from(qty))
}

impl FromStr for CartLine {
    type Err = ParseCartLineError;

    /// Accepts `ID`, `ID:QTY` or `IDxQTY`.
    fn from_str(val: &str) -> Result<Self, Self::Err> {
        let err = || ParseCartLineError(val.to_string());
        let mut parts = val.splitn(2, |c: char| c == ':' || c == 'x');
        let item_id = parts
            .next()
            .ok_or_else(err)?
            .parse::<ItemId>()
            .map_err(|_| err())?;
        let qty = match parts.next() {
            Some(q) => q.trim().parse::<u32>().map_err(|_| err())?,
            None => 1,
        };
        Ok(CartLine { item_id, qty })
    }
}
