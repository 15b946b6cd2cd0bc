use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use infra::documents::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// Price in rupiah.
    pub price: u64,
}

/// The catalog document, `menu.json`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog(pub Vec<MenuItem>);

impl MenuItem {
    pub fn new(id: u32, name: &str, category: &str, price: u64) -> Self {
        let id = ItemId(id);
        let name = name.to_string();
        let category = category.to_string();
        MenuItem {
            id,
            name,
            category,
            price,
        }
    }
}

impl Document for Catalog {
    const FILE_NAME: &'static str = "menu.json";

    fn seed() -> Self {
        Catalog(vec![
            MenuItem::new(1, "Nasi Goreng", "Makanan", 12000),
            MenuItem::new(2, "Mie Goreng", "Makanan", 10000),
            MenuItem::new(3, "Bakso", "Makanan", 15000),
            MenuItem::new(4, "Es Teh Manis", "Minuman", 5000),
            MenuItem::new(5, "Jus Jeruk", "Minuman", 8000),
            MenuItem::new(6, "Roti Bakar", "Snack", 7000),
        ])
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;
    fn from_str(val: &str) -> Result<Self, Self::Err> {
        val.trim().parse().map(ItemId)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seed_has_six_distinct_items() {
        let Catalog(items) = Catalog::seed();
        let ids = items
            .iter()
            .map(|it| it.id)
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(ids.len(), 6);
        assert_eq!(items[0], MenuItem::new(1, "Nasi Goreng", "Makanan", 12000));
    }

    #[test]
    fn catalog_reads_plain_json_array() {
        let json = r#"[{"id": 9, "name": "Es Campur", "category": "Minuman", "price": 9000}]"#;
        let catalog: Catalog = serde_json::from_str(json).expect("parse");
        assert_eq!(
            catalog,
            Catalog(vec![MenuItem::new(9, "Es Campur", "Minuman", 9000)])
        );
    }
}
