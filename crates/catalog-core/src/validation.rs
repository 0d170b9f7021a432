//! # Validation Module
//!
//! Declarative field validation for the product form.
//!
//! ## Validation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Field Validation                                   │
//! │                                                                         │
//! │  Field attribute: "required,number"                                     │
//! │           │                                                             │
//! │           ▼  FieldSpec::from_attribute                                  │
//! │  [Required, Number]                                                     │
//! │           │                                                             │
//! │           ▼  ValidatorRegistry lookup                                   │
//! │  ┌─────────────────────┬───────────────────────────────┐               │
//! │  │ registered          │ not registered (Unknown)       │               │
//! │  │ run predicate(value)│ skipped, never fails the field │               │
//! │  └─────────────────────┴───────────────────────────────┘               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  valid = no registered validator rejected the value                    │
//! │  field.errored = !valid, field.verdict = Some(valid)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::validation::{validate_field, Field, FieldSpec, ValidatorRegistry};
//!
//! let registry = ValidatorRegistry::standard(&["PNG"]);
//! let mut price = Field::new("price", FieldSpec::from_attribute(Some("required,number")));
//!
//! price.set_value("12");
//! assert!(validate_field(&mut price, &registry));
//!
//! price.set_value("");
//! assert!(!validate_field(&mut price, &registry));
//! assert!(price.errored);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::pricing::scan_int_prefix;

// =============================================================================
// Validator Names
// =============================================================================

/// Name of a validator, as written in a field's declarative attribute.
///
/// Unrecognized names are kept as [`ValidatorName::Unknown`] rather than
/// rejected: a field may carry tags meant for validators that are not
/// registered here, and those tags never fail the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ValidatorName {
    /// Value must be non-empty.
    Required,
    /// Value must start with an integer.
    Number,
    /// Value, if present, must end in an accepted image extension.
    ImageFormat,
    /// A tag no built-in validator answers to.
    Unknown(String),
}

impl ValidatorName {
    /// The canonical tag string.
    pub fn as_str(&self) -> &str {
        match self {
            ValidatorName::Required => "required",
            ValidatorName::Number => "number",
            ValidatorName::ImageFormat => "image-format",
            ValidatorName::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ValidatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Tags are matched verbatim: " number" is not "number"
        Ok(match s {
            "required" => ValidatorName::Required,
            "number" => ValidatorName::Number,
            // "png" is the tag older forms were written with
            "image-format" | "png" => ValidatorName::ImageFormat,
            other => ValidatorName::Unknown(other.to_string()),
        })
    }
}

impl From<String> for ValidatorName {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(name) => name,
            Err(never) => match never {},
        }
    }
}

impl From<ValidatorName> for String {
    fn from(name: ValidatorName) -> Self {
        name.as_str().to_string()
    }
}

// =============================================================================
// Built-in Predicates
// =============================================================================

/// `required`: fails only on the empty string.
pub fn required(value: &str) -> bool {
    !value.is_empty()
}

/// `number`: passes when the value starts with an integer.
///
/// `"42abc"` passes, as does an integer too wide for any machine type.
/// See [`scan_int_prefix`] for the exact grammar.
pub fn number(value: &str) -> bool {
    scan_int_prefix(value).is_some()
}

/// `image-format`: an empty value passes (no file chosen); otherwise the
/// text after the last `.` must be one of `accepted` (compared upper-case).
///
/// ## Example
/// ```rust
/// use catalog_core::validation::image_format;
///
/// assert!(image_format("", &["PNG"]));
/// assert!(image_format("photo.png", &["PNG"]));
/// assert!(!image_format("photo.jpg", &["PNG"]));
/// assert!(!image_format("photo", &["PNG"]));
/// ```
pub fn image_format<S: AsRef<str>>(value: &str, accepted: &[S]) -> bool {
    if value.is_empty() {
        return true;
    }

    match value.rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_uppercase();
            accepted
                .iter()
                .any(|a| a.as_ref().to_uppercase() == extension)
        }
        None => false,
    }
}

// =============================================================================
// Registry
// =============================================================================

/// A validator predicate over a raw field value; `true` means valid.
pub type Validator = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// The fixed set of validators fields are checked against.
///
/// Built once at startup and shared read-only afterwards. [`with`] is the
/// extension point for adding validators while building.
///
/// [`with`]: ValidatorRegistry::with
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<ValidatorName, Validator>,
}

impl ValidatorRegistry {
    /// A registry with nothing registered. Every field passes.
    pub fn empty() -> Self {
        ValidatorRegistry::default()
    }

    /// The built-in registry: `required`, `number` and `image-format`
    /// restricted to the given extensions.
    pub fn standard<S: AsRef<str>>(accepted_image_extensions: &[S]) -> Self {
        let accepted: Vec<String> = accepted_image_extensions
            .iter()
            .map(|e| e.as_ref().to_uppercase())
            .collect();

        ValidatorRegistry::empty()
            .with(ValidatorName::Required, required)
            .with(ValidatorName::Number, number)
            .with(ValidatorName::ImageFormat, move |value| {
                image_format(value, accepted.as_slice())
            })
    }

    /// Registers (or replaces) a validator under `name`.
    pub fn with<F>(mut self, name: ValidatorName, validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(name, Box::new(validator));
        self
    }

    /// Looks up a validator. `None` means "not applicable".
    pub fn get(&self, name: &ValidatorName) -> Option<&Validator> {
        self.validators.get(name)
    }

    /// Returns true if `name` has a registered validator.
    pub fn contains(&self, name: &ValidatorName) -> bool {
        self.validators.contains_key(name)
    }

    /// Runs every registered validator of `spec` on `value` and returns
    /// the names of those that rejected it. Unregistered names are skipped.
    pub fn evaluate(&self, spec: &FieldSpec, value: &str) -> Vec<ValidatorName> {
        spec.names()
            .iter()
            .filter(|name| match self.get(name) {
                Some(validator) => !validator(value),
                None => false,
            })
            .cloned()
            .collect()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}

// =============================================================================
// Field Spec
// =============================================================================

/// The validators declared on one field.
///
/// Order is kept for diagnostics only; the verdict does not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpec(Vec<ValidatorName>);

impl FieldSpec {
    /// Creates a spec from validator names.
    pub fn new(names: Vec<ValidatorName>) -> Self {
        FieldSpec(names)
    }

    /// Parses a comma-separated declarative attribute.
    ///
    /// An absent attribute gives an empty spec. Empty segments are
    /// dropped; segments are not trimmed, so `"required, number"` declares
    /// `" number"`, which no validator answers to.
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute {
            Some(attr) => FieldSpec(
                attr.split(',')
                    .filter(|tag| !tag.is_empty())
                    .map(|tag| ValidatorName::from(tag.to_string()))
                    .collect(),
            ),
            None => FieldSpec::default(),
        }
    }

    /// The declared names.
    pub fn names(&self) -> &[ValidatorName] {
        &self.0
    }

    /// True if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Field
// =============================================================================

/// One labelled input of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Form key, e.g. `"price"`.
    pub name: String,

    /// Current raw value as typed.
    #[serde(default)]
    pub value: String,

    /// Declared validators.
    #[serde(default)]
    #[ts(as = "Vec<String>")]
    pub spec: FieldSpec,

    /// Container is marked as errored (drives the error styling).
    #[serde(default)]
    pub errored: bool,

    /// Verdict of the last validation; `None` until first validated.
    #[serde(default)]
    pub verdict: Option<bool>,
}

impl Field {
    /// Creates an empty, not-yet-validated field.
    pub fn new(name: impl Into<String>, spec: FieldSpec) -> Self {
        Field {
            name: name.into(),
            value: String::new(),
            spec,
            errored: false,
            verdict: None,
        }
    }

    /// Builder-style value setter.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Replaces the raw value. Does not revalidate.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// True if the last validation passed.
    pub fn is_valid(&self) -> bool {
        self.verdict == Some(true)
    }

    /// Clears value, flag and verdict.
    pub fn reset(&mut self) {
        self.value.clear();
        self.errored = false;
        self.verdict = None;
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Validates one field, updating its errored flag and stored verdict.
///
/// Cannot fail: a field with no applicable validators is valid.
pub fn validate_field(field: &mut Field, registry: &ValidatorRegistry) -> bool {
    check_field(field, registry).is_empty()
}

/// Like [`validate_field`] but returns each rejection for diagnostics.
pub fn check_field(field: &mut Field, registry: &ValidatorRegistry) -> Vec<ValidationError> {
    let rejected = registry.evaluate(&field.spec, &field.value);
    let valid = rejected.is_empty();

    field.errored = !valid;
    field.verdict = Some(valid);

    debug!(field = %field.name, valid, rejected = rejected.len(), "Field validated");

    rejected
        .into_iter()
        .map(|validator| ValidationError {
            field: field.name.clone(),
            validator,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry() -> ValidatorRegistry {
        ValidatorRegistry::standard(&["PNG"])
    }

    fn field(attr: &str, value: &str) -> Field {
        Field::new("f", FieldSpec::from_attribute(Some(attr))).with_value(value)
    }

    #[test]
    fn test_required_and_number_scenario() {
        let registry = registry();

        let mut f = field("required,number", "");
        assert!(!validate_field(&mut f, &registry));
        assert!(f.errored);
        assert_eq!(f.verdict, Some(false));

        let mut f = field("required,number", "12");
        assert!(validate_field(&mut f, &registry));
        assert!(!f.errored);

        // Integer-prefix parse accepts trailing garbage
        let mut f = field("required,number", "12abc");
        assert!(validate_field(&mut f, &registry));
    }

    #[test]
    fn test_required_accepts_whitespace() {
        assert!(required(" "));
        assert!(!required(""));
    }

    #[test]
    fn test_image_format() {
        let accepted = ["PNG"];
        assert!(image_format("", &accepted));
        assert!(image_format("a.PNG", &accepted));
        assert!(image_format("C:\\fakepath\\my.photo.png", &accepted));
        assert!(!image_format("a.jpg", &accepted));
        assert!(!image_format("png", &accepted));
        assert!(!image_format("a.", &accepted));
    }

    #[test]
    fn test_image_format_extension_set() {
        let registry = ValidatorRegistry::standard(&["png", "jpg"]);
        let mut f = field("image-format", "cat.JPG");
        assert!(validate_field(&mut f, &registry));
    }

    #[test]
    fn test_unknown_validator_is_ignored() {
        let registry = registry();
        let mut f = field("required,maxlength", "x");
        assert!(validate_field(&mut f, &registry));
        assert_eq!(
            f.spec.names()[1],
            ValidatorName::Unknown("maxlength".to_string())
        );
    }

    #[test]
    fn test_absent_attribute_is_trivially_valid() {
        let mut f = Field::new("description", FieldSpec::from_attribute(None));
        assert!(f.spec.is_empty());
        assert!(validate_field(&mut f, &registry()));
        assert!(f.is_valid());
    }

    #[test]
    fn test_legacy_png_tag() {
        assert_eq!("png".parse::<ValidatorName>().ok(), Some(ValidatorName::ImageFormat));
        assert_eq!(ValidatorName::ImageFormat.to_string(), "image-format");
    }

    #[test]
    fn test_revalidation_clears_flag() {
        let registry = registry();
        let mut f = field("required", "");
        validate_field(&mut f, &registry);
        assert!(f.errored);

        f.set_value("now filled");
        validate_field(&mut f, &registry);
        assert!(!f.errored);
        assert!(f.is_valid());
    }

    #[test]
    fn test_check_field_reports_each_rejection() {
        let mut f = field("required,number", "");
        let errors = check_field(&mut f, &registry());
        let names: Vec<_> = errors.iter().map(|e| e.validator.clone()).collect();
        assert_eq!(names, vec![ValidatorName::Required, ValidatorName::Number]);
    }

    #[test]
    fn test_custom_validator_registration() {
        let registry = registry().with(ValidatorName::Unknown("short".into()), |v| v.len() < 4);
        let mut f = field("short", "toolong");
        assert!(!validate_field(&mut f, &registry));
    }

    #[test]
    fn test_spec_serde_uses_tag_strings() {
        let spec = FieldSpec::from_attribute(Some("required,png, png ,x"));
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"["required","image-format"," png ","x"]"#);
    }

    #[test]
    fn test_padded_tag_is_not_a_known_validator() {
        let registry = registry();
        let mut f = field("required, number", "abc");
        assert!(validate_field(&mut f, &registry));
        assert_eq!(
            f.spec.names(),
            &[
                ValidatorName::Required,
                ValidatorName::Unknown(" number".to_string())
            ]
        );

        let mut f = field("required, number", "");
        assert!(!validate_field(&mut f, &registry));
    }

    #[test]
    fn test_number_accepts_wide_integers() {
        assert!(number("99999999999999999999999"));
        assert!(!number(" x1"));
    }

    fn tag() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("required".to_string()),
            Just("number".to_string()),
            Just("image-format".to_string()),
            "[a-z]{1,8}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a field is valid iff every registered validator it
        /// declares accepts the value.
        #[test]
        fn valid_iff_every_registered_validator_accepts(
            tags in prop::collection::vec(tag(), 0..5),
            value in ".{0,12}",
        ) {
            let registry = registry();
            let attr = tags.join(",");
            let mut f = field(&attr, &value);

            let expected = f.spec.names().iter().all(|name| match registry.get(name) {
                Some(v) => v(value.as_str()),
                None => true,
            });

            prop_assert_eq!(validate_field(&mut f, &registry), expected);
            prop_assert_eq!(f.errored, !expected);
        }
    }
}
