//! # Product Store
//!
//! The append-only, insertion-ordered list of products plus the counter
//! that hands out their identities.
//!
//! ## Invariants
//! - Products are only ever appended; no update, no removal.
//! - `id` is the counter value *before* increment: 0, 1, 2, ...
//! - Ids are never reused within the lifetime of a store.
//! - [`ProductStore::reset`] is the only way back to an empty store with
//!   the counter at 0 (used to isolate tests and sessions).

use chrono::{DateTime, Utc};
use tracing::info;

use crate::types::{ImageAttachment, Product};

/// Field values for a product that has passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub barcode: String,
    pub description: String,
    pub kind: String,
    pub price: String,
    pub total: String,
    pub image: Option<ImageAttachment>,
}

/// Owns every product created in this session.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
    next_id: u64,
}

impl ProductStore {
    /// Creates an empty store; the first product will get id 0.
    pub fn new() -> Self {
        ProductStore::default()
    }

    /// Appends a product, assigning the next identity and `timestamp`.
    ///
    /// Returns a reference to the stored product.
    pub fn append(&mut self, new: NewProduct, timestamp: DateTime<Utc>) -> &Product {
        let id = self.next_id;
        self.next_id += 1;

        self.products.push(Product {
            id,
            name: new.name,
            barcode: new.barcode,
            description: new.description,
            kind: new.kind,
            price: new.price,
            total: new.total,
            timestamp,
            image: new.image,
        });

        let index = self.products.len() - 1;
        let product = &self.products[index];
        info!(id = product.id, name = %product.name, "Adding new product");
        product
    }

    /// All products in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks a product up by id.
    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The id the next appended product will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Drops every product and rewinds the identity counter.
    pub fn reset(&mut self) {
        self.products.clear();
        self.next_id = 0;
    }
}
