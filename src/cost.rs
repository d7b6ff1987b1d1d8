//! # Cost Estimator
//!
//! Prices a recipe from the composition table. Each ingredient's amount is
//! canonicalized and multiplied against its record's price basis; the recipe
//! total is scaled by a regional price factor and rounded to whole yen.
//!
//! ## Usage
//!
//! ```rust
//! use kondate::cost::{CostEstimator, PriceRegion};
//! use kondate::recipe_model::{Ingredient, Recipe};
//!
//! let recipe = Recipe::new("卵かけご飯", 1).with_ingredient(Ingredient::new("卵").with_amount("2個"));
//! assert_eq!(CostEstimator::new(PriceRegion::Standard).estimate(&recipe), 50);
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::composition::{grams_equivalent, lookup, CompositionRecord, PriceBasis};
use crate::quantity::{parse_amount, CanonicalQuantity, CanonicalUnit};
use crate::quantity_patterns::TSP_IN_TBSP;
use crate::recipe_model::{Ingredient, Recipe};

/// Flat price applied per 100 g or 100 ml of an ingredient with no record
pub const UNKNOWN_YEN_PER_100G: f64 = 30.0;

/// Weight charged per piece against a per-weight price, regardless of the ingredient
pub const PIECE_COST_GRAMS: f64 = 50.0;

/// Regional price multiplier chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRegion {
    #[serde(alias = "安め")]
    Cheap,
    #[default]
    #[serde(alias = "ふつう")]
    Standard,
    #[serde(alias = "やや高め")]
    SlightlyHigh,
    #[serde(alias = "高め")]
    High,
}

impl PriceRegion {
    pub fn factor(&self) -> f64 {
        match self {
            PriceRegion::Cheap => 0.9,
            PriceRegion::Standard => 1.0,
            PriceRegion::SlightlyHigh => 1.1,
            PriceRegion::High => 1.2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceRegion::Cheap => "安め",
            PriceRegion::Standard => "ふつう",
            PriceRegion::SlightlyHigh => "やや高め",
            PriceRegion::High => "高め",
        }
    }
}

impl FromStr for PriceRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "安め" | "cheap" => Ok(PriceRegion::Cheap),
            "ふつう" | "standard" => Ok(PriceRegion::Standard),
            "やや高め" | "slightly_high" => Ok(PriceRegion::SlightlyHigh),
            "高め" | "high" => Ok(PriceRegion::High),
            other => Err(format!("unknown price region: {}", other)),
        }
    }
}

/// How amounts without a quantity ("少々", "適量") are priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAmountPolicy {
    /// Tablespoon-priced seasonings are charged one tablespoon, everything else zero
    #[default]
    NominalSpoon,
    /// Every unquantified amount costs nothing
    Zero,
}

/// Recipe pricing with a fixed region and trace policy
#[derive(Debug, Clone, Copy, Default)]
pub struct CostEstimator {
    pub region: PriceRegion,
    pub trace_policy: TraceAmountPolicy,
}

impl CostEstimator {
    pub fn new(region: PriceRegion) -> Self {
        Self {
            region,
            trace_policy: TraceAmountPolicy::default(),
        }
    }

    pub fn with_trace_policy(mut self, policy: TraceAmountPolicy) -> Self {
        self.trace_policy = policy;
        self
    }

    /// Unscaled yen for one ingredient
    pub fn ingredient_cost(&self, ingredient: &Ingredient) -> f64 {
        let record = lookup(&ingredient.name);
        let quantity = parse_amount(ingredient.amount_str());

        let yen = match (record, quantity) {
            (Some(record), Some(q)) => priced_quantity(record, &ingredient.name, &q),
            (Some(record), None) => self.unquantified_cost(record),
            (None, Some(q)) => match q.unit {
                CanonicalUnit::Grams | CanonicalUnit::Milliliters => {
                    q.value / 100.0 * UNKNOWN_YEN_PER_100G
                }
                _ => 0.0,
            },
            (None, None) => 0.0,
        };

        trace!("Cost of '{}' ({}): {:.1} yen", ingredient.name, ingredient.amount_str(), yen);
        yen
    }

    fn unquantified_cost(&self, record: &CompositionRecord) -> f64 {
        match (self.trace_policy, record.price) {
            (TraceAmountPolicy::NominalSpoon, PriceBasis::PerTablespoon(yen)) => yen,
            _ => 0.0,
        }
    }

    /// Recipe total scaled by the region factor, rounded to whole yen
    pub fn estimate(&self, recipe: &Recipe) -> i64 {
        let raw: f64 = recipe
            .ingredients
            .iter()
            .map(|i| self.ingredient_cost(i))
            .sum();
        let total = (raw * self.region.factor()).round_ties_even() as i64;
        debug!(
            "Cost of '{}': {:.1} yen raw, {} yen at {} prices",
            recipe.title,
            raw,
            total,
            self.region.label()
        );
        total
    }
}

/// Price of a parsed quantity against a record's price basis
fn priced_quantity(record: &CompositionRecord, name: &str, q: &CanonicalQuantity) -> f64 {
    let value = q.value;
    match record.price {
        PriceBasis::Per100g(yen) | PriceBasis::Per100ml(yen) => match q.unit {
            CanonicalUnit::Pieces => value * PIECE_COST_GRAMS / 100.0 * yen,
            _ => grams_equivalent(name, q) / 100.0 * yen,
        },
        PriceBasis::PerPiece { yen, piece_grams } => match q.unit {
            CanonicalUnit::Pieces => yen * value,
            _ => yen * grams_equivalent(name, q) / piece_grams,
        },
        PriceBasis::PerTablespoon(yen) => match q.unit {
            CanonicalUnit::Tablespoons => yen * value,
            CanonicalUnit::Teaspoons => yen * value / TSP_IN_TBSP,
            _ => yen,
        },
        PriceBasis::PerTeaspoon(yen) => match q.unit {
            CanonicalUnit::Teaspoons => yen * value,
            CanonicalUnit::Tablespoons => yen * value * TSP_IN_TBSP,
            _ => yen,
        },
    }
}

/// Recipe cost with the default trace policy
pub fn estimate_cost(recipe: &Recipe, region: PriceRegion) -> i64 {
    CostEstimator::new(region).estimate(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost_of(name: &str, amount: &str) -> f64 {
        CostEstimator::default().ingredient_cost(&Ingredient::new(name).with_amount(amount))
    }

    #[test]
    fn test_per_100g_pricing() {
        assert!((cost_of("鶏むね肉", "300g") - 204.0).abs() < 1e-9);
        assert!((cost_of("牛乳", "200ml") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_piece_pricing() {
        assert!((cost_of("卵", "2個") - 50.0).abs() < 1e-9);
        assert!((cost_of("木綿豆腐", "150g") - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_pieces_of_weight_priced_items() {
        // 1 piece is charged as 50 g: 28 yen/100g → 14 yen
        assert!((cost_of("にんじん", "1本") - 14.0).abs() < 1e-9);
        assert!((cost_of("じゃがいも", "2個") - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_spoon_pricing() {
        assert!((cost_of("しょうゆ", "大さじ2") - 20.0).abs() < 1e-9);
        assert!((cost_of("しょうゆ", "小さじ3") - 10.0).abs() < 1e-9);
        assert!((cost_of("塩", "大さじ1") - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ingredient_flat_rate() {
        assert!((cost_of("梅肉", "200g") - 60.0).abs() < 1e-9);
        assert_eq!(cost_of("梅肉", "2個"), 0.0);
    }

    #[test]
    fn test_trace_policies() {
        let soy = Ingredient::new("しょうゆ").with_amount("少々");
        let salt = Ingredient::new("塩").with_amount("少々");

        let nominal = CostEstimator::default();
        assert_eq!(nominal.ingredient_cost(&soy), 10.0);
        assert_eq!(nominal.ingredient_cost(&salt), 0.0);

        let zero = CostEstimator::default().with_trace_policy(TraceAmountPolicy::Zero);
        assert_eq!(zero.ingredient_cost(&soy), 0.0);
    }

    #[test]
    fn test_region_factor_and_rounding() {
        let recipe = Recipe::new("鶏むね肉の照り焼き", 2)
            .with_ingredient(Ingredient::new("鶏むね肉").with_amount("250g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("大さじ1"));
        // 170 + 10 = 180
        assert_eq!(estimate_cost(&recipe, PriceRegion::Standard), 180);
        assert_eq!(estimate_cost(&recipe, PriceRegion::Cheap), 162);
        assert_eq!(estimate_cost(&recipe, PriceRegion::High), 216);
    }

    #[test]
    fn test_region_from_label() {
        assert_eq!("やや高め".parse::<PriceRegion>(), Ok(PriceRegion::SlightlyHigh));
        assert!("激安".parse::<PriceRegion>().is_err());
    }
}
