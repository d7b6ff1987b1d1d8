//! # Nutrition Estimator and Profile Scoring
//!
//! Aggregates per-ingredient nutrition contributions from the composition
//! table into per-serving totals, and scores values against named profiles.
//!
//! Per ingredient the display amount is canonicalized, the first matching
//! composition record is found, and the canonical value is converted into a
//! factor relative to the record's reference unit:
//!
//! | unit | factor |
//! |------|--------|
//! | g    | g / 100 |
//! | ml   | ml / 100 |
//! | 大さじ | value on tablespoon records, ×3 on teaspoon records, else 15 g / 100 |
//! | 小さじ | value on teaspoon records, ÷3 on tablespoon records, else 5 g / 100 |
//! | 個   | piece grams (卵 50, にんにく 5, other 30) / 100 |
//!
//! Ingredients without a record or without a parseable amount contribute zero.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::composition::{lookup, piece_grams, CompositionRecord, NutritionBasis, GRAMS_PER_TBSP, GRAMS_PER_TSP};
use crate::quantity::{parse_amount, CanonicalQuantity, CanonicalUnit};
use crate::quantity_patterns::TSP_IN_TBSP;
use crate::recipe_model::{Ingredient, Recipe};

/// Energy and macro totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
    pub salt_g: f64,
}

impl NutritionFacts {
    /// Add `other` scaled by `factor`
    pub fn add_scaled(&mut self, other: &NutritionFacts, factor: f64) {
        self.kcal += other.kcal * factor;
        self.protein_g += other.protein_g * factor;
        self.fat_g += other.fat_g * factor;
        self.carb_g += other.carb_g * factor;
        self.salt_g += other.salt_g * factor;
    }

    /// Every field divided by `divisor`
    pub fn divided(&self, divisor: f64) -> NutritionFacts {
        NutritionFacts {
            kcal: self.kcal / divisor,
            protein_g: self.protein_g / divisor,
            fat_g: self.fat_g / divisor,
            carb_g: self.carb_g / divisor,
            salt_g: self.salt_g / divisor,
        }
    }

    /// Every field rounded to one decimal place
    pub fn rounded(&self) -> NutritionFacts {
        NutritionFacts {
            kcal: round1(self.kcal),
            protein_g: round1(self.protein_g),
            fat_g: round1(self.fat_g),
            carb_g: round1(self.carb_g),
            salt_g: round1(self.salt_g),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Factor of a canonical quantity relative to a record's reference unit
pub fn nutrition_factor(record: &CompositionRecord, name: &str, quantity: &CanonicalQuantity) -> f64 {
    let value = quantity.value;
    match quantity.unit {
        CanonicalUnit::Grams | CanonicalUnit::Milliliters => value / 100.0,
        CanonicalUnit::Tablespoons => match record.basis {
            NutritionBasis::PerTablespoon => value,
            NutritionBasis::PerTeaspoon => value * TSP_IN_TBSP,
            _ => value * GRAMS_PER_TBSP / 100.0,
        },
        CanonicalUnit::Teaspoons => match record.basis {
            NutritionBasis::PerTeaspoon => value,
            NutritionBasis::PerTablespoon => value / TSP_IN_TBSP,
            _ => value * GRAMS_PER_TSP / 100.0,
        },
        CanonicalUnit::Pieces => piece_grams(name) * value / 100.0,
    }
}

/// Nutrition contributed by one ingredient, before division by servings
pub fn ingredient_nutrition(ingredient: &Ingredient) -> NutritionFacts {
    let mut facts = NutritionFacts::default();

    let Some(record) = lookup(&ingredient.name) else {
        trace!("No composition record for '{}'", ingredient.name);
        return facts;
    };
    let Some(quantity) = parse_amount(ingredient.amount_str()) else {
        trace!(
            "Amount '{}' of '{}' has no quantity, contributing zero",
            ingredient.amount_str(),
            ingredient.name
        );
        return facts;
    };

    let factor = nutrition_factor(record, &ingredient.name, &quantity);
    facts.add_scaled(&record.nutrition, factor);
    facts
}

/// Recipe totals before the per-serving division
pub fn estimate_raw_nutrition(recipe: &Recipe) -> NutritionFacts {
    let mut total = NutritionFacts::default();
    for ingredient in &recipe.ingredients {
        let contribution = ingredient_nutrition(ingredient);
        total.add_scaled(&contribution, 1.0);
    }
    total
}

/// Per-serving totals rounded to one decimal place
pub fn estimate_nutrition(recipe: &Recipe) -> NutritionFacts {
    let raw = estimate_raw_nutrition(recipe);
    let per_serving = raw.divided(recipe.effective_servings() as f64).rounded();
    debug!(
        "Nutrition for '{}': {:.1} kcal, {:.1} g protein, {:.1} g salt per serving",
        recipe.title, per_serving.kcal, per_serving.protein_g, per_serving.salt_g
    );
    per_serving
}

/// Three-tier score of a value against a target range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Within [low, high]
    Excellent,
    /// Below range but at least 90% of low, or above range but at most 115% of high
    Borderline,
    OutOfRange,
}

impl Tier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Tier::Excellent => "◎",
            Tier::Borderline => "△",
            Tier::OutOfRange => "⚠",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

const LOW_TOLERANCE: f64 = 0.9;
const HIGH_TOLERANCE: f64 = 1.15;
const EPSILON: f64 = 1e-9;

/// Score `value` against `(low, high)`; the tolerances are deliberately asymmetric
pub fn score_value(value: f64, range: (f64, f64)) -> Tier {
    let (low, high) = range;
    if value >= low && value <= high {
        Tier::Excellent
    } else if value < low {
        if value >= low * LOW_TOLERANCE - EPSILON {
            Tier::Borderline
        } else {
            Tier::OutOfRange
        }
    } else if value <= high * HIGH_TOLERANCE + EPSILON {
        Tier::Borderline
    } else {
        Tier::OutOfRange
    }
}

/// Target ranges of a profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRanges {
    pub kcal: (f64, f64),
    pub protein_g: (f64, f64),
    pub salt_g: (f64, f64),
}

/// Named nutrition profile selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionProfile {
    #[default]
    #[serde(alias = "ふつう")]
    Standard,
    #[serde(alias = "ダイエット")]
    Diet,
    #[serde(alias = "がっつり")]
    Hearty,
    #[serde(alias = "減塩")]
    LowSodium,
}

impl NutritionProfile {
    pub fn label(&self) -> &'static str {
        match self {
            NutritionProfile::Standard => "ふつう",
            NutritionProfile::Diet => "ダイエット",
            NutritionProfile::Hearty => "がっつり",
            NutritionProfile::LowSodium => "減塩",
        }
    }

    pub fn ranges(&self) -> ProfileRanges {
        match self {
            NutritionProfile::Standard => ProfileRanges {
                kcal: (500.0, 800.0),
                protein_g: (20.0, 35.0),
                salt_g: (0.0, 2.5),
            },
            NutritionProfile::Diet => ProfileRanges {
                kcal: (350.0, 600.0),
                protein_g: (25.0, 40.0),
                salt_g: (0.0, 2.0),
            },
            NutritionProfile::Hearty => ProfileRanges {
                kcal: (700.0, 1000.0),
                protein_g: (35.0, 55.0),
                salt_g: (0.0, 3.0),
            },
            NutritionProfile::LowSodium => ProfileRanges {
                kcal: (500.0, 800.0),
                protein_g: (20.0, 35.0),
                salt_g: (0.0, 2.0),
            },
        }
    }
}

impl FromStr for NutritionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ふつう" | "standard" => Ok(NutritionProfile::Standard),
            "ダイエット" | "diet" => Ok(NutritionProfile::Diet),
            "がっつり" | "hearty" => Ok(NutritionProfile::Hearty),
            "減塩" | "low_sodium" => Ok(NutritionProfile::LowSodium),
            other => Err(format!("unknown nutrition profile: {}", other)),
        }
    }
}

/// Tier of each scored field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileScore {
    pub kcal: Tier,
    pub protein_g: Tier,
    pub salt_g: Tier,
}

pub fn score_against_profile(facts: &NutritionFacts, profile: NutritionProfile) -> ProfileScore {
    let ranges = profile.ranges();
    ProfileScore {
        kcal: score_value(facts.kcal, ranges.kcal),
        protein_g: score_value(facts.protein_g, ranges.protein_g),
        salt_g: score_value(facts.salt_g, ranges.salt_g),
    }
}
