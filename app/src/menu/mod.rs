use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use log::*;

use infra::persistence::Storage;

use crate::error::BazaarError;
use crate::services::{Queryable, Request};
use crate::store::BazaarStore;
use crate::Bazaar;

mod models;

pub use self::models::{Catalog, ItemId, MenuItem};

/// Category name that selects every item.
pub const ALL_CATEGORIES: &str = "Semua";

#[derive(Debug, Clone)]
pub struct Menu {
    items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default)]
pub struct ShowMenu {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ShowCategories;

impl Menu {
    pub fn load<S: Storage>(store: &S) -> Result<Self, BazaarError> {
        let catalog = store.load_menu()?;
        Self::from_catalog(catalog)
    }

    pub fn from_catalog(catalog: Catalog) -> Result<Self, BazaarError> {
        let Catalog(items) = catalog;
        let mut seen = HashSet::new();
        for item in items.iter() {
            if !seen.insert(item.id) {
                return Err(BazaarError::DuplicateMenuItem(item.id));
            }
        }
        debug!("Menu with {} items", items.len());
        Ok(Menu { items })
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn categories(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|it| it.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Items in `category`, in catalog order. `None`, the empty string and
    /// [`ALL_CATEGORIES`] select everything.
    pub fn filter<'a>(&'a self, category: Option<&'a str>) -> impl 'a + Iterator<Item = &'a MenuItem> {
        let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
        self.items
            .iter()
            .filter(move |it| category.map(|c| it.category == c).unwrap_or(true))
    }
}

impl Request for ShowMenu {
    type Resp = Vec<MenuItem>;
}

impl Request for ShowCategories {
    type Resp = Vec<String>;
}

impl<S: Storage> Queryable<ShowMenu> for Bazaar<S> {
    fn query(&self, req: ShowMenu) -> Result<Vec<MenuItem>> {
        let items = self
            .menu()
            .filter(req.category.as_deref())
            .cloned()
            .collect::<Vec<_>>();
        debug!("Show menu for {:?}: {} items", req.category, items.len());
        Ok(items)
    }
}

impl<S: Storage> Queryable<ShowCategories> for Bazaar<S> {
    fn query(&self, _: ShowCategories) -> Result<Vec<String>> {
        Ok(self.menu().categories())
    }
}
