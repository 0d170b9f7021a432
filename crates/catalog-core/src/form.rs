//! # Product Form & Submission
//!
//! The product form as data, and the submit step that turns a fully
//! valid form into a stored [`Product`].
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        submit(form)                                     │
//! │                                                                         │
//! │  1. validate_field on EVERY field (all flags updated, no short-circuit)│
//! │           │                                                             │
//! │           ├── any invalid ──► Err(ValidationFailure), store untouched  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. total = with_tax(price)                                            │
//! │  3. store.append(...) with id = counter++, timestamp = clock.now()     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Ok(Product)                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-rendering and notifications happen in the caller; this step only
//! decides and mutates the store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clock::Clock;
use crate::error::ValidationFailure;
use crate::pricing::{with_tax, TaxRate};
use crate::store::{NewProduct, ProductStore};
use crate::types::{ImageAttachment, Product};
use crate::validation::{check_field, Field, FieldSpec, ValidatorName, ValidatorRegistry};

/// Form keys the submit step reads.
pub mod keys {
    pub const NAME: &str = "name";
    pub const BARCODE: &str = "barcode";
    pub const DESCRIPTION: &str = "description";
    pub const KIND: &str = "kind";
    pub const PRICE: &str = "price";
    pub const IMAGE: &str = "image";
}

/// An ordered set of form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub fields: Vec<Field>,
}

impl ProductForm {
    pub fn new(fields: Vec<Field>) -> Self {
        ProductForm { fields }
    }

    /// The catalog's product form.
    ///
    /// | key         | validators          |
    /// |-------------|---------------------|
    /// | name        | required            |
    /// | barcode     | required, number    |
    /// | description | –                   |
    /// | kind        | –                   |
    /// | price       | required, number    |
    /// | image       | image-format        |
    pub fn standard() -> Self {
        use ValidatorName::*;

        ProductForm::new(vec![
            Field::new(keys::NAME, FieldSpec::new(vec![Required])),
            Field::new(keys::BARCODE, FieldSpec::new(vec![Required, Number])),
            Field::new(keys::DESCRIPTION, FieldSpec::default()),
            Field::new(keys::KIND, FieldSpec::default()),
            Field::new(keys::PRICE, FieldSpec::new(vec![Required, Number])),
            Field::new(keys::IMAGE, FieldSpec::new(vec![ImageFormat])),
        ])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Builder-style: sets the value of the named field if present.
    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Some(field) = self.field_mut(name) {
            field.set_value(value);
        }
        self
    }

    /// Current value of a field; a missing field reads as empty.
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// True if any field is currently flagged as errored.
    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.errored)
    }

    /// Clears every value, flag and verdict.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }

    /// Validates every field, returning every rejection.
    pub fn validate(&mut self, registry: &ValidatorRegistry) -> Result<(), ValidationFailure> {
        let errors: Vec<_> = self
            .fields
            .iter_mut()
            .flat_map(|field| check_field(field, registry))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure { errors })
        }
    }

    fn to_new_product(&self, tax_rate: TaxRate) -> NewProduct {
        let price = self.value(keys::PRICE).to_string();
        let image = match self.value(keys::IMAGE) {
            "" => None,
            path => Some(ImageAttachment::new(path)),
        };

        NewProduct {
            name: self.value(keys::NAME).to_string(),
            barcode: self.value(keys::BARCODE).to_string(),
            description: self.value(keys::DESCRIPTION).to_string(),
            kind: self.value(keys::KIND).to_string(),
            total: with_tax(&price, tax_rate),
            price,
            image,
        }
    }
}

/// Validates the whole form and, if every field passes, appends a product.
///
/// On rejection the store is left exactly as it was.
pub fn submit(
    form: &mut ProductForm,
    store: &mut ProductStore,
    registry: &ValidatorRegistry,
    tax_rate: TaxRate,
    clock: &dyn Clock,
) -> Result<Product, ValidationFailure> {
    form.validate(registry)?;

    let product = store.append(form.to_new_product(tax_rate), clock.now());
    Ok(product.clone())
}
