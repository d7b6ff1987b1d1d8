//! # Quantity Patterns Module
//!
//! This module contains the regex patterns and sentinels used for quantity
//! detection in ingredient names, amount strings and step texts.

use lazy_static::lazy_static;
use regex::Regex;

/// Display sentinel for a trace amount ("a pinch")
pub const TRACE_AMOUNT: &str = "少々";

/// Display sentinel for an unquantified "to taste" amount
pub const TO_TASTE: &str = "適量";

/// Reference volume of one cup in milliliters
pub const CUP_ML: f64 = 200.0;

/// Teaspoons per tablespoon
pub const TSP_IN_TBSP: f64 = 3.0;

// A plain number or a simple fraction such as "1/2"
const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?(?:/[0-9]+)?";

// Quantity tokens that may be embedded in an ingredient name, delimited by whitespace
pub const QTY_IN_NAME_PATTERN: &str = r"(?:^|\s)((?:小さじ|大さじ|カップ)\s*[0-9]+(?:\.[0-9]+)?(?:/[0-9]+)?|[0-9]+(?:\.[0-9]+)?(?:/[0-9]+)?\s*(?:g|グラム|kg|㎏|ml|mL|L|cc|カップ|cup|個|片|枚|本)|少々|適量)(?:\s|$)";

// Leading ordinal markers on step texts: "STEP 3", "3.", "３）", "②"
pub const STEP_PREFIX_PATTERN: &str =
    r"^\s*(?:STEP\s*[0-9０-９]+[:：\-\s]*|[0-9０-９]+[\.．、\)）]\s*|[①-⑳]\s*)";

lazy_static! {
    pub static ref QTY_IN_NAME_REGEX: Regex =
        Regex::new(QTY_IN_NAME_PATTERN).expect("Quantity-in-name pattern should be valid");
    pub static ref STEP_PREFIX_REGEX: Regex =
        Regex::new(STEP_PREFIX_PATTERN).expect("Step prefix pattern should be valid");
    pub static ref NUMBER_REGEX: Regex =
        Regex::new(NUMBER).expect("Number pattern should be valid");
    pub static ref MULTI_SPACE_REGEX: Regex =
        Regex::new(r"\s{2,}").expect("Whitespace pattern should be valid");
    pub static ref TRAILING_ZERO_REGEX: Regex =
        Regex::new(r"([0-9]+)\.0+([^0-9]|$)").expect("Trailing zero pattern should be valid");
    pub static ref ZERO_AMOUNT_REGEX: Regex = Regex::new(
        r"^(?:(?:大さじ|小さじ|カップ)\s*0(?:\.0+)?|0(?:\.0+)?\s*(?:g|グラム|kg|㎏|ml|mL|L|cc|カップ|cup|個|片|枚|本))$"
    )
    .expect("Zero amount pattern should be valid");

    // Canonicalization patterns, evaluated in priority order
    pub static ref TBSP_REGEX: Regex =
        Regex::new(&format!(r"大さじ\s*({NUMBER})")).expect("Tablespoon pattern should be valid");
    pub static ref TSP_REGEX: Regex =
        Regex::new(&format!(r"小さじ\s*({NUMBER})")).expect("Teaspoon pattern should be valid");
    pub static ref ML_REGEX: Regex =
        Regex::new(&format!(r"({NUMBER})\s*(ml|cc|ℓ|l)")).expect("Milliliter pattern should be valid");
    pub static ref GRAM_REGEX: Regex =
        Regex::new(&format!(r"({NUMBER})\s*(kg|㎏|g|グラム)")).expect("Gram pattern should be valid");
    pub static ref CUP_REGEX: Regex = Regex::new(&format!(
        r"(?:({NUMBER})\s*(?:カップ|cup)|(?:カップ|cup)\s*({NUMBER}))"
    ))
    .expect("Cup pattern should be valid");
    pub static ref PIECE_REGEX: Regex =
        Regex::new(&format!(r"({NUMBER})\s*(?:個|枚|本)")).expect("Piece pattern should be valid");
    pub static ref HALF_PIECE_REGEX: Regex =
        Regex::new(&format!(r"({NUMBER})\s*片")).expect("Half-piece pattern should be valid");

    // Durations inside step texts, e.g. "5分"
    pub static ref MINUTES_REGEX: Regex =
        Regex::new(r"([0-9]+)\s*分").expect("Minutes pattern should be valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(QTY_IN_NAME_REGEX.is_match("梅肉 200g"));
        assert!(STEP_PREFIX_REGEX.is_match("STEP 1 切る"));
        assert!(ZERO_AMOUNT_REGEX.is_match("小さじ0"));
        assert!(ZERO_AMOUNT_REGEX.is_match("0g"));
        assert!(!ZERO_AMOUNT_REGEX.is_match("10g"));
    }

    #[test]
    fn test_quantity_in_name_requires_token_boundary() {
        assert!(!QTY_IN_NAME_REGEX.is_match("しょうゆ大さじ1"));
        assert!(QTY_IN_NAME_REGEX.is_match("しょうゆ 大さじ1"));
        assert!(QTY_IN_NAME_REGEX.is_match("塩 少々"));
        assert!(QTY_IN_NAME_REGEX.is_match("卵 2個"));
    }

    #[test]
    fn test_cup_pattern_both_orders() {
        assert!(CUP_REGEX.is_match("1カップ"));
        assert!(CUP_REGEX.is_match("カップ1.5"));
        assert!(!CUP_REGEX.is_match("カップ"));
    }
}
