//! # Form Commands
//!
//! Live feedback while the user fills in the form: per-field validation
//! on every keystroke, the tax-inclusive total next to the price, and the
//! image preview.

use serde::{Deserialize, Serialize};
use tracing::debug;

use catalog_core::form::{keys, ProductForm};
use catalog_core::{validate_field as run_validators, with_tax, Field, FieldSpec};

use crate::error::ApiError;
use crate::events::{CatalogEvent, EventBus};
use crate::preview::PreviewLoader;
use crate::state::{CatalogState, ConfigState};

/// One field of a form layout, as the presentation layer declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    /// Comma-separated validator tags, e.g. `"required,number"`.
    #[serde(default)]
    pub validate: Option<String>,
}

/// Result of picking an image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSelection {
    /// The image field after validation.
    pub field: Field,
    /// Preview generation started, if the file passed validation.
    pub generation: Option<u64>,
}

/// Replaces the form layout with the declared fields.
///
/// Existing values and products are untouched; the new fields start empty.
pub fn define_form(catalog: &CatalogState, fields: Vec<FieldDefinition>) -> ProductForm {
    let form = ProductForm::new(
        fields
            .into_iter()
            .map(|def| Field::new(def.name, FieldSpec::from_attribute(def.validate.as_deref())))
            .collect(),
    );
    debug!(fields = form.fields.len(), "define_form command");

    catalog.with_session_mut(|session| session.form = form.clone());
    form
}

/// Returns the form as it currently stands.
pub fn get_form(catalog: &CatalogState) -> ProductForm {
    catalog.with_session(|session| session.form.clone())
}

/// Sets a field's value and validates it (keypress / change / blur).
pub fn validate_field(
    catalog: &CatalogState,
    events: &EventBus,
    name: &str,
    value: String,
) -> Result<Field, ApiError> {
    let field = catalog
        .with_session_mut(|session| {
            let field = session.form.field_mut(name)?;
            field.set_value(value);
            run_validators(field, catalog.registry());
            Some(field.clone())
        })
        .ok_or_else(|| ApiError::not_found("Field", name))?;

    events.publish(CatalogEvent::FieldValidated {
        field: field.clone(),
    });
    Ok(field)
}

/// Computes the total shown next to the price while typing.
pub fn preview_total(config: &ConfigState, events: &EventBus, price: String) -> String {
    let total = with_tax(&price, config.tax_rate());
    events.publish(CatalogEvent::TotalPreviewed {
        price,
        total: total.clone(),
    });
    total
}

/// Records the picked image and, if it validates, starts its preview.
pub fn select_image(
    catalog: &CatalogState,
    preview: &PreviewLoader,
    events: &EventBus,
    path: String,
) -> Result<ImageSelection, ApiError> {
    let field = validate_field(catalog, events, keys::IMAGE, path)?;

    let generation = if field.is_valid() && !field.value.is_empty() {
        Some(preview.load(field.value.as_str()))
    } else {
        debug!(valid = field.is_valid(), "select_image: preview not started");
        None
    };

    Ok(ImageSelection { field, generation })
}
