use serde::{Deserialize, Serialize};

use infra::documents::Document;

use crate::menu::{ItemId, MenuItem};

/// A menu item as it was priced when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ItemId,
    pub name: String,
    pub price: u64,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// UTC, ISO-8601 with a trailing `Z`.
    pub timestamp: String,
    pub buyer: String,
    #[serde(default)]
    pub note: String,
    pub items: Vec<OrderLine>,
    pub total: u64,
}

/// The order log document, `orders.json`, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OrderLog(pub Vec<OrderRecord>);

impl OrderLine {
    pub(super) fn of(item: &MenuItem, qty: u32) -> Self {
        OrderLine {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            qty,
        }
    }
}

impl OrderRecord {
    /// Summary of the items, e.g. `Bakso x2; Jus Jeruk x1`.
    pub fn details(&self) -> String {
        self.items
            .iter()
            .map(|it| format!("{} x{}", it.name, it.qty))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Document for OrderLog {
    const FILE_NAME: &'static str = "orders.json";

    fn seed() -> Self {
        OrderLog::default()
    }
}
