//! # Composition Table
//!
//! Static nutrition and price records keyed by ingredient keyword. Lookup is
//! the first record, in table order, whose key is a substring of the
//! ingredient name; order therefore encodes precedence ("木綿豆腐" before
//! "絹ごし豆腐", "水" last so that longer names match their own record first).

use std::sync::LazyLock;

use crate::nutrition::NutritionFacts;
use crate::quantity::{CanonicalQuantity, CanonicalUnit};

/// Grams per tablespoon used for weight equivalents
pub const GRAMS_PER_TBSP: f64 = 15.0;

/// Grams per teaspoon used for weight equivalents
pub const GRAMS_PER_TSP: f64 = 5.0;

/// Reference unit the nutrition values of a record are expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionBasis {
    Per100g,
    Per100ml,
    PerTablespoon,
    PerTeaspoon,
}

/// Reference unit and price (yen) of a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceBasis {
    Per100g(f64),
    Per100ml(f64),
    PerTablespoon(f64),
    PerTeaspoon(f64),
    /// Price per whole piece, with the piece weight used to convert grams
    PerPiece { yen: f64, piece_grams: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRecord {
    pub key: &'static str,
    pub nutrition: NutritionFacts,
    pub basis: NutritionBasis,
    pub price: PriceBasis,
}

const fn facts(kcal: f64, protein_g: f64, fat_g: f64, carb_g: f64, salt_g: f64) -> NutritionFacts {
    NutritionFacts {
        kcal,
        protein_g,
        fat_g,
        carb_g,
        salt_g,
    }
}

const fn record(
    key: &'static str,
    nutrition: NutritionFacts,
    basis: NutritionBasis,
    price: PriceBasis,
) -> CompositionRecord {
    CompositionRecord {
        key,
        nutrition,
        basis,
        price,
    }
}

/// Process-wide composition table, read-only after initialization
pub static COMPOSITION_TABLE: LazyLock<Vec<CompositionRecord>> = LazyLock::new(|| {
    use NutritionBasis::*;

    vec![
        record("鶏むね肉", facts(120.0, 23.0, 2.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(68.0)),
        record("鶏もも肉", facts(200.0, 17.0, 14.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(98.0)),
        record("豚肉", facts(242.0, 20.0, 19.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(128.0)),
        record("牛肉", facts(250.0, 20.0, 19.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(198.0)),
        record("ひき肉", facts(230.0, 19.0, 17.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(118.0)),
        record("鮭", facts(200.0, 22.0, 12.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(198.0)),
        record("さば", facts(240.0, 20.0, 19.0, 0.0, 0.0), Per100g, PriceBasis::Per100g(158.0)),
        record(
            "木綿豆腐",
            facts(72.0, 7.0, 4.0, 2.0, 0.0),
            Per100g,
            PriceBasis::PerPiece { yen: 62.0, piece_grams: 300.0 },
        ),
        record(
            "絹ごし豆腐",
            facts(56.0, 5.0, 3.0, 2.0, 0.0),
            Per100g,
            PriceBasis::PerPiece { yen: 62.0, piece_grams: 300.0 },
        ),
        record(
            "卵",
            facts(150.0, 12.0, 10.0, 0.0, 0.0),
            Per100g,
            PriceBasis::PerPiece { yen: 25.0, piece_grams: 50.0 },
        ),
        record("キャベツ", facts(23.0, 1.0, 0.0, 5.0, 0.0), Per100g, PriceBasis::Per100g(25.0)),
        record(
            "玉ねぎ",
            facts(37.0, 1.0, 0.0, 9.0, 0.0),
            Per100g,
            PriceBasis::PerPiece { yen: 40.0, piece_grams: 180.0 },
        ),
        record("にんじん", facts(37.0, 1.0, 0.0, 9.0, 0.0), Per100g, PriceBasis::Per100g(28.0)),
        record("じゃがいも", facts(76.0, 2.0, 0.0, 17.0, 0.0), Per100g, PriceBasis::Per100g(25.0)),
        record("なす", facts(22.0, 1.0, 0.0, 5.0, 0.0), Per100g, PriceBasis::Per100g(40.0)),
        record("もやし", facts(14.0, 2.0, 0.0, 3.0, 0.0), Per100g, PriceBasis::Per100g(20.0)),
        record("牛乳", facts(61.0, 3.3, 3.8, 4.8, 0.1), Per100ml, PriceBasis::Per100ml(25.0)),
        record("豆乳", facts(44.0, 3.6, 2.0, 3.1, 0.0), Per100ml, PriceBasis::Per100ml(30.0)),
        record("生クリーム", facts(404.0, 1.9, 43.0, 3.1, 0.1), Per100ml, PriceBasis::Per100ml(120.0)),
        record("だし汁", facts(2.0, 0.3, 0.0, 0.3, 0.1), Per100ml, PriceBasis::Per100ml(5.0)),
        record("しょうゆ", facts(13.0, 1.4, 0.0, 1.2, 2.6), PerTablespoon, PriceBasis::PerTablespoon(10.0)),
        record("醤油", facts(13.0, 1.4, 0.0, 1.2, 2.6), PerTablespoon, PriceBasis::PerTablespoon(10.0)),
        record("みりん", facts(43.0, 0.0, 0.0, 7.2, 0.0), PerTablespoon, PriceBasis::PerTablespoon(10.0)),
        record("酒", facts(11.0, 0.0, 0.0, 0.5, 0.0), PerTablespoon, PriceBasis::PerTablespoon(8.0)),
        record("砂糖", facts(35.0, 0.0, 0.0, 9.0, 0.0), Per100g, PriceBasis::PerTablespoon(5.0)),
        record("味噌", facts(33.0, 2.0, 1.0, 4.0, 0.9), PerTablespoon, PriceBasis::PerTablespoon(15.0)),
        record("ごま油", facts(111.0, 0.0, 12.6, 0.0, 0.0), PerTablespoon, PriceBasis::PerTablespoon(18.0)),
        record(
            "オリーブオイル",
            facts(111.0, 0.0, 12.6, 0.0, 0.0),
            PerTablespoon,
            PriceBasis::PerTablespoon(20.0),
        ),
        record("コンソメ", facts(8.0, 0.2, 0.2, 1.5, 1.3), PerTeaspoon, PriceBasis::PerTeaspoon(8.0)),
        record("塩", facts(0.0, 0.0, 0.0, 0.0, 6.0), PerTeaspoon, PriceBasis::PerTeaspoon(2.0)),
        record("水", facts(0.0, 0.0, 0.0, 0.0, 0.0), Per100ml, PriceBasis::Per100ml(0.0)),
    ]
});

/// First record whose key is a substring of `name`
pub fn lookup(name: &str) -> Option<&'static CompositionRecord> {
    COMPOSITION_TABLE.iter().find(|r| name.contains(r.key))
}

/// Gram weight assumed for one piece of an ingredient
pub fn piece_grams(name: &str) -> f64 {
    if name.contains("卵") {
        50.0
    } else if name.contains("にんにく") {
        5.0
    } else {
        30.0
    }
}

/// Raw weight equivalent of a canonical quantity; milliliters count as grams
pub fn grams_equivalent(name: &str, quantity: &CanonicalQuantity) -> f64 {
    match quantity.unit {
        CanonicalUnit::Grams | CanonicalUnit::Milliliters => quantity.value,
        CanonicalUnit::Tablespoons => quantity.value * GRAMS_PER_TBSP,
        CanonicalUnit::Teaspoons => quantity.value * GRAMS_PER_TSP,
        CanonicalUnit::Pieces => quantity.value * piece_grams(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_first_substring_match() {
        assert_eq!(lookup("鶏むね肉").map(|r| r.key), Some("鶏むね肉"));
        assert_eq!(lookup("木綿豆腐").map(|r| r.key), Some("木綿豆腐"));
        assert_eq!(lookup("濃口しょうゆ").map(|r| r.key), Some("しょうゆ"));
        assert!(lookup("梅肉").is_none());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = COMPOSITION_TABLE.iter().map(|r| r.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), COMPOSITION_TABLE.len());
    }

    #[test]
    fn test_piece_grams() {
        assert_eq!(piece_grams("卵"), 50.0);
        assert_eq!(piece_grams("にんにく"), 5.0);
        assert_eq!(piece_grams("トマト"), 30.0);
    }

    #[test]
    fn test_grams_equivalent() {
        assert_eq!(grams_equivalent("しょうゆ", &CanonicalQuantity::tablespoons(2.0)), 30.0);
        assert_eq!(grams_equivalent("塩", &CanonicalQuantity::teaspoons(1.0)), 5.0);
        assert_eq!(grams_equivalent("卵", &CanonicalQuantity::pieces(2.0)), 100.0);
        assert_eq!(grams_equivalent("牛乳", &CanonicalQuantity::milliliters(200.0)), 200.0);
    }
}
