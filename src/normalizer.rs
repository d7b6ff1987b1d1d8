//! # Ingredient Normalizer
//!
//! Turns raw ingredient lines into display-ready ingredients: quantity tokens
//! are split out of names, amounts are sanitized, and unusable amounts are
//! replaced by an estimate. Normalizing an already normalized list is a no-op.

use log::{debug, info};

use crate::classifier::{is_condiment, is_spicy};
use crate::estimator::estimate_amount;
use crate::quantity::{is_usable_amount, parse_amount, sanitize_amount, split_quantity_from_name, CanonicalUnit};
use crate::quantity_patterns::{TO_TASTE, TRACE_AMOUNT};
use crate::recipe_model::{Ingredient, Recipe};

/// Default scale applied to condiments in child mode
pub const DEFAULT_CHILD_FACTOR: f64 = 0.8;

/// Display amount for spicy ingredients in child mode
pub const CHILD_SPICY_AMOUNT: &str = "少々（大人は後がけ）";

/// Normalize one ingredient for the given serving count
pub fn normalize_ingredient(ingredient: &Ingredient, servings: u32) -> Ingredient {
    let (base_name, qty_in_name) = split_quantity_from_name(&ingredient.name);

    let mut amount = sanitize_amount(ingredient.amount.as_deref())
        .or(qty_in_name)
        .unwrap_or_default();

    if !is_usable_amount(&amount) {
        let estimated = estimate_amount(&base_name, servings);
        debug!(
            "Amount '{}' for '{}' is unusable, estimated '{}'",
            amount, base_name, estimated
        );
        amount = estimated;
    }

    let amount = sanitize_amount(Some(&amount)).unwrap_or_else(|| TO_TASTE.to_string());

    Ingredient {
        name: base_name,
        amount: Some(amount),
        is_optional: ingredient.is_optional,
        substitution: ingredient.substitution.clone(),
    }
}

/// Normalize a list of ingredients
pub fn normalize_ingredients(ingredients: &[Ingredient], servings: u32) -> Vec<Ingredient> {
    ingredients
        .iter()
        .map(|i| normalize_ingredient(i, servings))
        .collect()
}

/// Normalize a recipe's ingredients in place
pub fn normalize_recipe(recipe: &mut Recipe) {
    let servings = recipe.effective_servings();
    recipe.ingredients = normalize_ingredients(&recipe.ingredients, servings);
    info!(
        "Normalized {} ingredients of '{}' for {} servings",
        recipe.ingredients.len(),
        recipe.title,
        servings
    );
}

/// Child-friendly amount: spicy items become a trace served on the side,
/// condiments measured in spoons or grams are scaled by `factor`
pub fn adjust_child_friendly_amount(name: &str, amount: &str, factor: f64) -> String {
    if amount.is_empty() {
        return amount.to_string();
    }
    if is_spicy(name) {
        return CHILD_SPICY_AMOUNT.to_string();
    }
    if is_condiment(name) {
        if let Some(q) = parse_amount(amount) {
            if matches!(
                q.unit,
                CanonicalUnit::Tablespoons | CanonicalUnit::Teaspoons | CanonicalUnit::Grams
            ) {
                let scaled = q.scaled(factor).render();
                return sanitize_amount(Some(&scaled)).unwrap_or_else(|| TRACE_AMOUNT.to_string());
            }
        }
    }
    amount.to_string()
}

/// Apply the child-friendly adjustment to every ingredient of a normalized recipe.
///
/// Not idempotent for condiments; the planner applies it exactly once per recipe.
pub fn adjust_for_child(recipe: &mut Recipe, factor: f64) {
    for ingredient in &mut recipe.ingredients {
        let adjusted = adjust_child_friendly_amount(&ingredient.name, ingredient.amount_str(), factor);
        ingredient.amount = Some(adjusted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_moves_from_name_to_amount() {
        let normalized = normalize_ingredient(&Ingredient::new("梅肉 200g"), 2);
        assert_eq!(normalized.name, "梅肉");
        assert_eq!(normalized.amount.as_deref(), Some("200g"));
    }

    #[test]
    fn test_explicit_amount_wins_over_name_token() {
        let normalized =
            normalize_ingredient(&Ingredient::new("豚肉 100g").with_amount("300g"), 2);
        assert_eq!(normalized.name, "豚肉");
        assert_eq!(normalized.amount.as_deref(), Some("300g"));
    }

    #[test]
    fn test_vague_amount_is_estimated() {
        let normalized = normalize_ingredient(&Ingredient::new("しょうゆ").with_amount("適量"), 4);
        assert_eq!(normalized.amount.as_deref(), Some("大さじ1.5"));
    }

    #[test]
    fn test_zero_amount_becomes_trace() {
        let normalized = normalize_ingredient(&Ingredient::new("塩").with_amount("小さじ0"), 2);
        assert_eq!(normalized.amount.as_deref(), Some("少々"));
    }

    #[test]
    fn test_flags_are_preserved() {
        let ingredient = Ingredient::new("パセリ").optional().with_substitution("青のり");
        let normalized = normalize_ingredient(&ingredient, 2);
        assert!(normalized.is_optional);
        assert_eq!(normalized.substitution.as_deref(), Some("青のり"));
        assert_eq!(normalized.amount.as_deref(), Some("適量"));
    }

    #[test]
    fn test_child_adjustment() {
        assert_eq!(adjust_child_friendly_amount("豆板醤", "小さじ1", 0.8), CHILD_SPICY_AMOUNT);
        assert_eq!(adjust_child_friendly_amount("しょうゆ", "大さじ2", 0.8), "大さじ1.5");
        assert_eq!(adjust_child_friendly_amount("キャベツ", "200g", 0.8), "200g");
        assert_eq!(adjust_child_friendly_amount("塩", "3g", 0.8), "少々");
        assert_eq!(adjust_child_friendly_amount("砂糖", "30g", 0.8), "20g");
    }
}
