//! # Pricing Module
//!
//! Turns the raw price typed into the form into the tax-inclusive total
//! shown next to it.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:  0.1 + 0.2 = 0.30000000000000004                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "100" ──► 10000 cents ──► +20% = 2000 cents ──► "120.00"             │
//! │    Every step is exact; only the final string has a decimal point.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Raw Price Parsing
//! The raw price goes through [`parse_int_prefix`]: leading whitespace and
//! a sign are skipped, then the longest run of digits is taken. Anything
//! after it is ignored, so `"12.99"` is priced as `12` and `"42abc"` as
//! `42`. Totals already shown to users depend on both behaviours.
//!
//! Prices are totalled in exact cents up to [`EXACT_PRICE_LIMIT`]; larger
//! ones are never clamped but multiplied as doubles.
//!
//! ## Usage
//! ```rust
//! use catalog_core::pricing::{with_tax, TaxRate};
//!
//! assert_eq!(with_tax("100", TaxRate::STANDARD), "120.00");
//! assert_eq!(with_tax("abc", TaxRate::STANDARD), "");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 2000 bps = 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The catalog's standard 20% rate.
    pub const STANDARD: TaxRate = TaxRate(2000);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for config parsing).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `1 + rate` as a double, e.g. `1.2` for 20%.
    pub fn multiplier(&self) -> f64 {
        1.0 + self.0 as f64 / 10_000.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::STANDARD
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// Saturates instead of overflowing for absurdly large prices.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major.saturating_mul(100))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Calculates tax, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math on i128: `(amount * bps ± 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::pricing::{Money, TaxRate};
    ///
    /// let price = Money::from_cents(1000); // 10.00
    /// let tax = price.calculate_tax(TaxRate::from_bps(825));
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let half = if scaled < 0 { -5000 } else { 5000 };
        let tax_cents = (scaled + half) / 10000;
        Money::from_cents(tax_cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Formats as a plain decimal with exactly two fraction digits,
    /// no currency symbol: `12000` → `"120.00"`, `-600` → `"-6.00"`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

// =============================================================================
// Integer Prefix Parsing
// =============================================================================

/// The leading integer of a raw string, as scanned but not yet converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntPrefix<'a> {
    negative: bool,
    radix: u32,
    digits: &'a str,
}

impl IntPrefix<'_> {
    /// Exact value, or `None` if it does not fit an i64.
    pub fn to_i64(&self) -> Option<i64> {
        // Accumulate negatively so i64::MIN is reachable
        let mut value: i64 = 0;
        for c in self.digits.chars() {
            let d = c.to_digit(self.radix)? as i64;
            value = value.checked_mul(self.radix as i64)?.checked_sub(d)?;
        }
        if self.negative {
            Some(value)
        } else {
            value.checked_neg()
        }
    }

    /// Nearest double to the value; infinite past the f64 range.
    pub fn to_f64(&self) -> f64 {
        let magnitude = if self.radix == 10 {
            self.digits.parse::<f64>().unwrap_or(f64::INFINITY)
        } else {
            self.digits
                .chars()
                .filter_map(|c| c.to_digit(self.radix))
                .fold(0.0, |acc, d| acc * self.radix as f64 + d as f64)
        };
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Scans the leading integer of a string.
///
/// ## Grammar
/// ```text
/// [whitespace]* [+|-]? ( 0x|0X hex-digit+ | digit+ ) <anything>
/// ```
/// Returns `None` when no digit follows the optional sign/prefix.
pub fn scan_int_prefix(raw: &str) -> Option<IntPrefix<'_>> {
    let mut rest = raw.trim_start();

    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let radix = if rest.starts_with("0x") || rest.starts_with("0X") {
        rest = &rest[2..];
        16
    } else {
        10
    };

    // Digits are ASCII, so the byte index is a char boundary
    let end = rest
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    Some(IntPrefix {
        negative,
        radix,
        digits: &rest[..end],
    })
}

/// Parses the leading integer of a string.
///
/// `None` when there is no leading integer or it does not fit an i64.
///
/// ## Example
/// ```rust
/// use catalog_core::pricing::parse_int_prefix;
///
/// assert_eq!(parse_int_prefix("42abc"), Some(42));
/// assert_eq!(parse_int_prefix("  -7"), Some(-7));
/// assert_eq!(parse_int_prefix("0x1A"), Some(26));
/// assert_eq!(parse_int_prefix("abc"), None);
/// ```
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    scan_int_prefix(raw)?.to_i64()
}

// =============================================================================
// With Tax
// =============================================================================

/// Largest price (in whole units) totalled in exact integer cents.
///
/// Beyond it the total follows double-precision arithmetic, which is
/// what the form has always displayed for such prices.
pub const EXACT_PRICE_LIMIT: u64 = 1_000_000_000_000;

/// Computes the tax-inclusive total for a raw price string.
///
/// ## Behaviour
/// - Non-numeric input → `""` (the "no total" value, not an error)
/// - Otherwise the integer prefix plus tax, with two decimals
/// - Prices past [`EXACT_PRICE_LIMIT`] are multiplied as doubles; past
///   1e21 the total is written in exponent form (`"1.2e+22"`)
///
/// ## User Workflow
/// ```text
/// Price field: "100"
///      │
///      ▼
/// with_tax("100", 20%) ← THIS FUNCTION
///      │
///      ▼
/// Total field: "120.00"
/// ```
pub fn with_tax(raw_price: &str, rate: TaxRate) -> String {
    let Some(prefix) = scan_int_prefix(raw_price) else {
        return String::new();
    };

    match prefix
        .to_i64()
        .filter(|value| value.unsigned_abs() <= EXACT_PRICE_LIMIT)
    {
        Some(value) => {
            let price = Money::from_major(value);
            (price + price.calculate_tax(rate)).to_decimal_string()
        }
        None => to_fixed_2(prefix.to_f64() * rate.multiplier()),
    }
}

/// Two-decimal rendering of a double, exponent form from 1e21 up.
fn to_fixed_2(value: f64) -> String {
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}Infinity", sign);
    }

    if value.abs() < 1e21 {
        return format!("{:.2}", value);
    }

    let exponent_form = format!("{:e}", value);
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exponent_form,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
