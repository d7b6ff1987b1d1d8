use kondate::cost::{estimate_cost, PriceRegion};
use kondate::normalizer::{adjust_for_child, normalize_ingredient, normalize_recipe};
use kondate::nutrition::{
    estimate_nutrition, estimate_raw_nutrition, score_value, NutritionProfile, Tier,
};
use kondate::quality::{quality_check, QualityIssue};
use kondate::quantity::{parse_amount, render_quantity, CanonicalQuantity, CanonicalUnit};
use kondate::recipe_model::{Ingredient, Recipe, Step};
use kondate::trust::{augment, TrustBadge};

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_ingredients() -> Vec<Ingredient> {
        vec![
            Ingredient::new("梅肉 200g"),
            Ingredient::new("しょうゆ"),
            Ingredient::new("塩").with_amount("小さじ0"),
            Ingredient::new("鶏むね肉").with_amount("適量"),
            Ingredient::new("卵").with_amount("２個"),
            Ingredient::new("にんにく"),
            Ingredient::new("黒胡椒"),
            Ingredient::new("謎のスパイス"),
            Ingredient::new("牛乳").with_amount("1.0カップ"),
        ]
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for servings in 1..=8 {
            for ingredient in raw_ingredients() {
                let once = normalize_ingredient(&ingredient, servings);
                let twice = normalize_ingredient(&once, servings);
                assert_eq!(once, twice, "not idempotent for {:?} at {} servings", ingredient, servings);
            }
        }
    }

    #[test]
    fn test_render_parse_round_trip() {
        let quantities = [
            CanonicalQuantity::tablespoons(1.25),
            CanonicalQuantity::tablespoons(2.0),
            CanonicalQuantity::teaspoons(0.75),
            CanonicalQuantity::teaspoons(2.5),
            CanonicalQuantity::grams(57.0),
            CanonicalQuantity::grams(133.0),
            CanonicalQuantity::grams(1234.0),
            CanonicalQuantity::milliliters(430.4),
            CanonicalQuantity::pieces(2.0),
            CanonicalQuantity::pieces(1.5),
        ];

        for quantity in quantities {
            let rendered = quantity.render();
            let reparsed = parse_amount(&rendered)
                .unwrap_or_else(|| panic!("rendered '{}' should parse", rendered));
            assert_eq!(reparsed.render(), rendered);
        }
    }

    #[test]
    fn test_soy_sauce_estimated_for_four() {
        let normalized = normalize_ingredient(&Ingredient::new("しょうゆ"), 4);
        // 1 tsp per serving × 4 = 4 tsp = 1.33 tbsp, rounded to the half unit
        assert_eq!(normalized.amount.as_deref(), Some("大さじ1.5"));
        assert_eq!(
            parse_amount("大さじ1.5"),
            Some(CanonicalQuantity::new(CanonicalUnit::Tablespoons, 1.5))
        );
    }

    #[test]
    fn test_stub_recipe_fails_with_three_reasons() {
        let recipe = Recipe::new("梅肉和え", 2).with_ingredient(Ingredient::new("梅肉 200g"));
        let report = quality_check(&recipe);

        assert!(!report.passed());
        assert_eq!(report.reasons().len(), 3);
        assert_eq!(
            report.issues,
            vec![
                QualityIssue::TooFewIngredients { count: 1 },
                QualityIssue::TooFewSteps { count: 0 },
                QualityIssue::NoHeatMarker,
            ]
        );
    }

    #[test]
    fn test_small_gram_amounts_never_render_as_zero() {
        for grams in [0.4, 3.0, 4.0, 5.0] {
            assert_eq!(render_quantity(CanonicalUnit::Grams, grams), "少々", "{} g", grams);
        }
        assert_eq!(render_quantity(CanonicalUnit::Grams, 6.0), "10g");
        assert_eq!(render_quantity(CanonicalUnit::Grams, 14.0), "10g");
    }

    #[test]
    fn test_child_mode_keeps_amounts_non_zero() {
        let mut recipe = Recipe::new("鶏肉の塩焼き", 2)
            .with_ingredient(Ingredient::new("鶏もも肉").with_amount("300g"))
            .with_ingredient(Ingredient::new("塩").with_amount("3g"))
            .with_ingredient(Ingredient::new("砂糖").with_amount("5g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("小さじ0.5"))
            .with_ingredient(Ingredient::new("みりん").with_amount("30g"));
        normalize_recipe(&mut recipe);
        adjust_for_child(&mut recipe, 0.8);

        for ingredient in &recipe.ingredients {
            let amount = ingredient.amount_str();
            if let Some(q) = parse_amount(amount) {
                assert!(q.value > 0.0, "{} rendered as zero: {}", ingredient.name, amount);
            }
            assert!(!amount.starts_with('0'), "{}: {}", ingredient.name, amount);
        }

        let amount_of = |name: &str| {
            recipe.ingredients.iter().find(|i| i.name == name).and_then(|i| i.amount.clone())
        };
        assert_eq!(amount_of("塩").as_deref(), Some("少々"));
        assert_eq!(amount_of("砂糖").as_deref(), Some("少々"));
        assert_eq!(amount_of("みりん").as_deref(), Some("20g"));
        assert_eq!(amount_of("鶏もも肉").as_deref(), Some("300g"));
    }

    fn cream_stew() -> Recipe {
        Recipe::new("鶏肉のクリーム煮", 4)
            .with_ingredient(Ingredient::new("鶏もも肉").with_amount("400g"))
            .with_ingredient(Ingredient::new("玉ねぎ"))
            .with_ingredient(Ingredient::new("牛乳").with_amount("50ml"))
            .with_step(Step::new("鶏肉と玉ねぎを切る"))
            .with_step(Step::new("中火で鶏肉を焼く"))
            .with_step(Step::new("牛乳を加えて弱火で5分煮る"))
    }

    #[test]
    fn test_liquid_top_up_after_normalization() {
        let mut recipe = cream_stew();
        normalize_recipe(&mut recipe);
        let report = augment(&mut recipe);

        let water: Vec<_> = recipe.ingredients.iter().filter(|i| i.name == "水").collect();
        assert_eq!(water.len(), 1);
        assert_eq!(water[0].amount.as_deref(), Some("430ml"));
        assert_eq!(
            recipe.badges.iter().filter(|b| **b == TrustBadge::LiquidNormalized).count(),
            1
        );
        assert!(!report.notes().is_empty());
    }

    #[test]
    fn test_augmentation_is_idempotent_after_normalization() {
        let mut once = cream_stew();
        normalize_recipe(&mut once);
        augment(&mut once);

        let mut twice = once.clone();
        augment(&mut twice);

        assert_eq!(once.badges, twice.badges);
        assert_eq!(once.ingredients, twice.ingredients);
        assert_eq!(once.steps, twice.steps);
    }

    #[test]
    fn test_nutrition_scales_with_quantity() {
        let single = Recipe::new("鶏むね肉とキャベツ", 2)
            .with_ingredient(Ingredient::new("鶏むね肉").with_amount("150g"))
            .with_ingredient(Ingredient::new("キャベツ").with_amount("100g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("大さじ1"));
        let doubled = Recipe::new("鶏むね肉とキャベツ", 2)
            .with_ingredient(Ingredient::new("鶏むね肉").with_amount("300g"))
            .with_ingredient(Ingredient::new("キャベツ").with_amount("200g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("大さじ2"));

        let a = estimate_raw_nutrition(&single);
        let b = estimate_raw_nutrition(&doubled);
        assert!((b.kcal - 2.0 * a.kcal).abs() < 1e-9);
        assert!((b.protein_g - 2.0 * a.protein_g).abs() < 1e-9);
        assert!((b.salt_g - 2.0 * a.salt_g).abs() < 1e-9);

        // 180 + 23 + 13 = 216 kcal over 2 servings
        assert_eq!(estimate_nutrition(&single).kcal, 108.0);
    }

    #[test]
    fn test_profile_boundaries() {
        let ranges = NutritionProfile::Standard.ranges();
        let (low, high) = ranges.kcal;

        assert_eq!(score_value(low, ranges.kcal), Tier::Excellent);
        assert_eq!(score_value(high, ranges.kcal), Tier::Excellent);
        assert_eq!(score_value(low * 0.899, ranges.kcal), Tier::OutOfRange);
        assert_eq!(score_value(low * 0.95, ranges.kcal), Tier::Borderline);
        assert_eq!(score_value(high * 1.15, ranges.kcal), Tier::Borderline);
        assert_eq!(score_value(high * 1.16, ranges.kcal), Tier::OutOfRange);
    }

    #[test]
    fn test_cost_with_region() {
        let recipe = Recipe::new("豚肉の生姜焼き", 2)
            .with_ingredient(Ingredient::new("豚肉").with_amount("200g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("大さじ1"))
            .with_ingredient(Ingredient::new("梅肉").with_amount("100g"));

        // 256 + 10 + 30 (flat rate for an unknown ingredient)
        assert_eq!(estimate_cost(&recipe, PriceRegion::Standard), 296);
        assert_eq!(estimate_cost(&recipe, PriceRegion::High), 355);
    }
}
