//! # Display Formatting
//!
//! Plain-text rendering of recipes, plans and shopping lists. Child-mode
//! step annotations are applied here, at display time, so the stored recipe
//! keeps its original steps.

use crate::classifier::SPICY;
use crate::equipment::equipment_or_inferred;
use crate::messages::{t, t_args};
use crate::nutrition::{NutritionFacts, NutritionProfile, ProfileScore};
use crate::planner::{DaySuggestion, WeeklyPlan};
use crate::quantity::format_number;
use crate::recipe_model::{Ingredient, Recipe};
use crate::shopping::ShoppingList;
use crate::trust::TrustReport;

const SAKE: &str = "酒";
const HEATING: &str = "加熱";

/// Append child-mode notes to a step: spicy additions go to the adults' share,
/// sake needs to be cooked off
pub fn annotate_step_for_child(text: &str) -> String {
    let mut annotated = text.to_string();
    let spicy_note = t("child-note-spicy");
    if SPICY.matches(text) && !annotated.contains(&spicy_note) {
        annotated.push_str(&spicy_note);
    }
    let sake_note = t("child-note-sake");
    if text.contains(SAKE) && !text.contains(HEATING) && !annotated.contains(&sake_note) {
        annotated.push_str(&sake_note);
    }
    annotated
}

pub fn format_ingredient_line(ingredient: &Ingredient) -> String {
    let mut line = format!("・{}", ingredient.name);
    let amount = ingredient.amount_str();
    if !amount.is_empty() {
        line.push(' ');
        line.push_str(amount);
    }
    if ingredient.is_optional {
        line.push_str(&t("card-optional"));
    }
    if let Some(substitution) = &ingredient.substitution {
        line.push_str("（");
        line.push_str(&t_args("card-substitution", &[("text", substitution.as_str())]));
        line.push_str("）");
    }
    line
}

/// Title, ingredients, equipment and numbered steps
pub fn format_recipe(recipe: &Recipe, child_mode: bool) -> String {
    let servings = recipe.effective_servings().to_string();
    let mut lines = vec![t_args(
        "card-servings",
        &[("title", recipe.title.as_str()), ("servings", servings.as_str())],
    )];

    lines.push(String::new());
    lines.push(format!("【{}】", t("card-ingredients")));
    lines.extend(recipe.ingredients.iter().map(format_ingredient_line));

    lines.push(String::new());
    lines.push(format!("【{}】", t("card-equipment")));
    lines.push(equipment_or_inferred(recipe).join("、"));

    lines.push(String::new());
    lines.push(format!("【{}】", t("card-steps")));
    for (number, text) in recipe.numbered_steps() {
        let text = if child_mode { annotate_step_for_child(&text) } else { text };
        lines.push(format!("{}. {}", number, text));
    }

    if !recipe.badges.is_empty() {
        let badges = recipe.badges.iter().map(|b| b.label()).collect::<Vec<_>>().join("・");
        lines.push(String::new());
        lines.push(t_args("card-badges", &[("badges", badges.as_str())]));
    }

    lines.join("\n")
}

pub fn format_nutrition(facts: &NutritionFacts) -> String {
    let kcal = format_number(facts.kcal);
    let protein = format_number(facts.protein_g);
    let fat = format_number(facts.fat_g);
    let carb = format_number(facts.carb_g);
    let salt = format_number(facts.salt_g);
    t_args(
        "card-nutrition",
        &[
            ("kcal", kcal.as_str()),
            ("protein", protein.as_str()),
            ("fat", fat.as_str()),
            ("carb", carb.as_str()),
            ("salt", salt.as_str()),
        ],
    )
}

pub fn format_score(score: &ProfileScore, profile: NutritionProfile) -> String {
    t_args(
        "card-score",
        &[
            ("kcal", score.kcal.symbol()),
            ("protein", score.protein_g.symbol()),
            ("salt", score.salt_g.symbol()),
            ("profile", profile.label()),
        ],
    )
}

fn format_cost(yen: i64) -> String {
    let yen = yen.to_string();
    t_args("card-cost", &[("yen", yen.as_str())])
}

fn push_trust_notes(lines: &mut Vec<String>, trust: Option<&TrustReport>) {
    if let Some(report) = trust {
        lines.extend(report.notes().into_iter().map(|note| format!("　※{}", note)));
    }
}

/// Every suggested candidate with its estimates
pub fn format_suggestion(suggestion: &DaySuggestion, profile: NutritionProfile, child_mode: bool) -> String {
    let mut blocks: Vec<String> = suggestion.notes.clone();

    for candidate in &suggestion.candidates {
        let mut lines = vec![format_recipe(&candidate.recipe, child_mode)];
        push_trust_notes(&mut lines, candidate.trust.as_ref());
        lines.push(format_cost(candidate.cost_yen));
        lines.push(format_nutrition(&candidate.nutrition));
        lines.push(format_score(&candidate.score, profile));
        lines.extend(candidate.quality.reasons().into_iter().map(|reason| format!("　△{}", reason)));
        blocks.push(lines.join("\n"));
    }

    if child_mode {
        blocks.push(t("child-tips"));
    }
    blocks.join("\n\n")
}

/// Day-by-day plan followed by totals and the weekly average
pub fn format_week(plan: &WeeklyPlan, child_mode: bool) -> String {
    let mut blocks = Vec::new();

    for day in &plan.days {
        let day_label = day.day_index.to_string();
        let mut lines = vec![format!("■ {}", t_args("week-day", &[("day", day_label.as_str())]))];
        lines.extend(day.notes.iter().cloned());
        lines.push(format_recipe(&day.recipe, child_mode));
        push_trust_notes(&mut lines, day.trust.as_ref());
        lines.push(format_cost(day.cost_yen));
        blocks.push(lines.join("\n"));
    }

    let total = plan.total_cost.to_string();
    let budget = plan.budget_yen.to_string();
    let mut summary = vec![t_args(
        "week-total",
        &[("total", total.as_str()), ("budget", budget.as_str())],
    )];
    summary.extend(plan.notes.iter().cloned());

    let average = &plan.nutrition.average;
    let kcal = format_number(average.kcal);
    let protein = format_number(average.protein_g);
    let salt = format_number(average.salt_g);
    summary.push(t_args(
        "week-average",
        &[("kcal", kcal.as_str()), ("protein", protein.as_str()), ("salt", salt.as_str())],
    ));
    summary.push(format_score(&plan.nutrition.score, plan.nutrition.profile));
    blocks.push(summary.join("\n"));

    if child_mode {
        blocks.push(t("child-tips"));
    }
    blocks.join("\n\n")
}

pub fn format_shopping_list(list: &ShoppingList) -> String {
    let mut lines = vec![format!("【{}】", t("shopping-title"))];
    for (section, items) in list.grouped() {
        lines.push(format!("＜{}＞", section.label()));
        for item in items {
            let amount = item.display_amount();
            if amount.is_empty() {
                lines.push(format!("・{}", item.name));
            } else {
                lines.push(format!("・{} {}", item.name, amount));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::Step;

    #[test]
    fn test_child_annotations() {
        let spicy = annotate_step_for_child("豆板醤を加えて炒める");
        assert!(spicy.ends_with(&t("child-note-spicy")));

        let sake = annotate_step_for_child("酒を加えて煮る");
        assert!(sake.ends_with(&t("child-note-sake")));

        let cooked = annotate_step_for_child("酒を加えてよく加熱する");
        assert_eq!(cooked, "酒を加えてよく加熱する");

        assert_eq!(annotate_step_for_child(&spicy), spicy);
    }

    #[test]
    fn test_format_recipe_sections() {
        let recipe = Recipe::new("豚の生姜焼き", 2)
            .with_ingredient(Ingredient::new("豚肉").with_amount("200g"))
            .with_ingredient(Ingredient::new("七味").optional())
            .with_step(Step::new("1. 豚肉を焼く（中火）"))
            .with_step(Step::new("② 七味をふる"));

        let plain = format_recipe(&recipe, false);
        assert!(plain.starts_with("豚の生姜焼き（2人分）"));
        assert!(plain.contains("・豚肉 200g"));
        assert!(plain.contains("・七味（任意）"));
        assert!(plain.contains("1. 豚肉を焼く（中火）"));
        assert!(plain.contains("2. 七味をふる"));

        let child = format_recipe(&recipe, true);
        assert!(child.contains(&format!("2. 七味をふる{}", t("child-note-spicy"))));
    }
}
