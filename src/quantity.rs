//! # Quantity Parser and Normalizer
//!
//! Parses quantity expressions from free-text ingredient names or amount
//! strings into a canonical (unit, value) pair, and renders canonical values
//! back into display strings.
//!
//! ## Features
//!
//! - Detection of quantity tokens embedded in ingredient names ("梅肉 200g")
//! - Canonicalization in a fixed priority order: 大さじ → 小さじ → ml/cc → g →
//!   カップ (200 ml) → 個/枚/本 → 片 (half piece)
//! - Unit-specific rounding when rendering (half spoons, stepped grams)
//! - Sanitization of degenerate zero quantities into the trace sentinel
//!
//! ## Usage
//!
//! ```rust
//! use kondate::quantity::{parse_amount, CanonicalUnit};
//!
//! let q = parse_amount("大さじ1.5").unwrap();
//! assert_eq!(q.unit, CanonicalUnit::Tablespoons);
//! assert_eq!(q.to_string(), "大さじ1.5");
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity_patterns::{
    CUP_ML, CUP_REGEX, GRAM_REGEX, HALF_PIECE_REGEX, ML_REGEX, MULTI_SPACE_REGEX, NUMBER_REGEX,
    PIECE_REGEX, QTY_IN_NAME_REGEX, TBSP_REGEX, TO_TASTE, TRACE_AMOUNT, TRAILING_ZERO_REGEX,
    TSP_IN_TBSP, TSP_REGEX, ZERO_AMOUNT_REGEX,
};

/// Unit tag of a canonical quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalUnit {
    /// Mass in grams
    Grams,
    /// Volume in milliliters
    Milliliters,
    /// 大さじ units
    Tablespoons,
    /// 小さじ units
    Teaspoons,
    /// Discrete pieces (個, 枚, 本; 片 counts as half a piece)
    Pieces,
}

/// Computation intermediate; always rendered back before leaving this module's callers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuantity {
    pub unit: CanonicalUnit,
    pub value: f64,
}

impl CanonicalQuantity {
    pub fn new(unit: CanonicalUnit, value: f64) -> Self {
        Self { unit, value }
    }

    pub fn grams(value: f64) -> Self {
        Self::new(CanonicalUnit::Grams, value)
    }

    pub fn milliliters(value: f64) -> Self {
        Self::new(CanonicalUnit::Milliliters, value)
    }

    pub fn tablespoons(value: f64) -> Self {
        Self::new(CanonicalUnit::Tablespoons, value)
    }

    pub fn teaspoons(value: f64) -> Self {
        Self::new(CanonicalUnit::Teaspoons, value)
    }

    pub fn pieces(value: f64) -> Self {
        Self::new(CanonicalUnit::Pieces, value)
    }

    /// Same unit, value multiplied by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.unit, self.value * factor)
    }

    /// Render to a display string using the unit-specific rounding rules
    pub fn render(&self) -> String {
        render_quantity(self.unit, self.value)
    }
}

impl fmt::Display for CanonicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Replace full-width digits and the full-width period with ASCII
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// Parse a number or a simple fraction ("1/2")
fn parse_number(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            Some(num / den)
        }
        None => text.parse().ok(),
    }
}

fn captured_number(regex: &regex::Regex, text: &str) -> Option<f64> {
    let captures = regex.captures(text)?;
    let number = captures
        .iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str())?;
    parse_number(number)
}

/// Canonicalize a display amount.
///
/// Unit markers are tried in priority order: tablespoon, teaspoon,
/// milliliter/cc/liter, gram/kilogram, cup (200 ml), piece, half piece.
/// Returns `None` when no marker with a number is present (e.g. "少々", "適量").
pub fn parse_amount(amount: &str) -> Option<CanonicalQuantity> {
    let normalized = to_half_width(amount.trim()).to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let parsed = if let Some(v) = captured_number(&TBSP_REGEX, &normalized) {
        Some(CanonicalQuantity::tablespoons(v))
    } else if let Some(v) = captured_number(&TSP_REGEX, &normalized) {
        Some(CanonicalQuantity::teaspoons(v))
    } else if let Some(captures) = ML_REGEX.captures(&normalized) {
        let value = parse_number(&captures[1])?;
        let scale = match &captures[2] {
            "l" | "ℓ" => 1000.0,
            _ => 1.0,
        };
        Some(CanonicalQuantity::milliliters(value * scale))
    } else if let Some(captures) = GRAM_REGEX.captures(&normalized) {
        let value = parse_number(&captures[1])?;
        let scale = match &captures[2] {
            "kg" | "㎏" => 1000.0,
            _ => 1.0,
        };
        Some(CanonicalQuantity::grams(value * scale))
    } else if let Some(v) = captured_number(&CUP_REGEX, &normalized) {
        Some(CanonicalQuantity::milliliters(v * CUP_ML))
    } else if let Some(v) = captured_number(&PIECE_REGEX, &normalized) {
        Some(CanonicalQuantity::pieces(v))
    } else {
        captured_number(&HALF_PIECE_REGEX, &normalized).map(|v| CanonicalQuantity::pieces(v * 0.5))
    };

    trace!("Canonicalized amount '{}' -> {:?}", amount, parsed);
    parsed
}

/// Round to the nearest multiple of `step`, ties to even like the display rules expect
fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round_ties_even() * step
}

/// Round to the nearest half unit
pub fn round_half(value: f64) -> f64 {
    round_to_step(value, 0.5)
}

/// Format a number without a trailing ".0"
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn gram_step(grams: f64) -> f64 {
    if grams < 60.0 {
        10.0
    } else if grams < 150.0 {
        25.0
    } else {
        50.0
    }
}

/// Render grams with stepped rounding: 10 g below 60 g, 25 g up to 150 g, 50 g above.
///
/// A value rounded into the next band is re-rounded with that band's step, so the
/// result is a fixed point: re-rendering a rendered value never changes it.
/// Anything that rounds down to zero renders as the trace amount.
pub fn grams_to_pretty(grams: i64) -> String {
    let mut value = grams as f64;
    loop {
        let rounded = round_to_step(value, gram_step(value));
        if rounded == value {
            break;
        }
        value = rounded;
    }
    if value <= 0.0 {
        return TRACE_AMOUNT.to_string();
    }
    format!("{}g", value as i64)
}

/// Render a teaspoon total, switching to tablespoons at 3 tsp or more
pub fn teaspoons_to_pretty(tsp: f64) -> String {
    if tsp <= 0.15 {
        return TRACE_AMOUNT.to_string();
    }
    let tbsp = tsp / TSP_IN_TBSP;
    if tbsp >= 1.0 {
        render_quantity(CanonicalUnit::Tablespoons, tbsp)
    } else {
        render_quantity(CanonicalUnit::Teaspoons, tsp)
    }
}

/// Render a piece count as an integer when the fraction is negligible, else one decimal
pub fn format_piece_count(value: f64) -> String {
    if (value - value.trunc()).abs() < 1e-6 {
        format!("{}", value.trunc() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Render a canonical pair back into a display string
pub fn render_quantity(unit: CanonicalUnit, value: f64) -> String {
    match unit {
        CanonicalUnit::Tablespoons => {
            let v = round_half(value);
            if v <= 0.0 {
                TRACE_AMOUNT.to_string()
            } else {
                format!("大さじ{}", format_number(v))
            }
        }
        CanonicalUnit::Teaspoons => {
            let v = round_half(value);
            if v <= 0.0 {
                TRACE_AMOUNT.to_string()
            } else {
                format!("小さじ{}", format_number(v))
            }
        }
        CanonicalUnit::Grams => grams_to_pretty(value.round_ties_even() as i64),
        CanonicalUnit::Milliliters => {
            let v = value.round_ties_even();
            if v <= 0.0 {
                TRACE_AMOUNT.to_string()
            } else {
                format!("{}ml", v as i64)
            }
        }
        CanonicalUnit::Pieces => format!("{}個", format_piece_count(value)),
    }
}

/// Whether the text contains a number
pub fn has_number(text: &str) -> bool {
    NUMBER_REGEX.is_match(&to_half_width(text))
}

/// Clean up a display amount; explicit zero quantities collapse to the trace sentinel
pub fn sanitize_amount(amount: Option<&str>) -> Option<String> {
    let amount = amount?.trim();
    if amount.is_empty() {
        return None;
    }

    let cleaned = to_half_width(amount);
    let cleaned = TRAILING_ZERO_REGEX.replace_all(&cleaned, "$1$2").to_string();

    if ZERO_AMOUNT_REGEX.is_match(&cleaned) {
        debug!("Collapsing zero amount '{}' to trace amount", amount);
        return Some(TRACE_AMOUNT.to_string());
    }

    Some(cleaned)
}

/// An amount is usable when it is non-empty, not "to taste", and carries
/// either a number or the trace sentinel
pub fn is_usable_amount(amount: &str) -> bool {
    if amount.trim().is_empty() || amount.contains(TO_TASTE) {
        return false;
    }
    has_number(amount) || amount.contains(TRACE_AMOUNT)
}

/// Split an embedded quantity token out of an ingredient name.
///
/// Returns the base name and the first quantity token found. All quantity
/// tokens are removed from the name; a name that is nothing but a quantity is
/// returned unchanged.
pub fn split_quantity_from_name(name: &str) -> (String, Option<String>) {
    let mut remaining = name.to_string();
    let mut first_quantity: Option<String> = None;

    while let Some(captures) = QTY_IN_NAME_REGEX.captures(&remaining) {
        let whole = captures.get(0).map(|m| m.range());
        let token = captures.get(1).map(|m| m.as_str().to_string());
        let (Some(range), Some(token)) = (whole, token) else {
            break;
        };
        if first_quantity.is_none() {
            first_quantity = Some(token);
        }
        remaining.replace_range(range, " ");
    }

    let base = MULTI_SPACE_REGEX
        .replace_all(remaining.trim(), " ")
        .to_string();

    if base.is_empty() {
        (name.to_string(), first_quantity)
    } else {
        (base, first_quantity)
    }
}
