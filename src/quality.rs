//! # Quality Gate
//!
//! Deterministic heuristics deciding whether a generated recipe is usable
//! as-is. Used to filter candidates and to drive bounded regeneration.

use serde::{Deserialize, Serialize};

use crate::classifier::{has_basic_seasoning, has_heat_marker};
use crate::messages::{t, t_args};
use crate::quantity_patterns::TO_TASTE;
use crate::recipe_model::Recipe;

pub const MIN_INGREDIENTS: usize = 3;
pub const MIN_STEPS: usize = 3;

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    TooFewIngredients { count: usize },
    TooFewSteps { count: usize },
    NoHeatMarker,
    NoBasicSeasoning,
    /// An ingredient whose amount is still the "to taste" sentinel
    VagueAmount { name: String },
}

impl QualityIssue {
    /// Human-readable reason
    pub fn reason(&self) -> String {
        match self {
            QualityIssue::TooFewIngredients { count } => t_args(
                "quality-too-few-ingredients",
                &[
                    ("count", count.to_string().as_str()),
                    ("min", MIN_INGREDIENTS.to_string().as_str()),
                ],
            ),
            QualityIssue::TooFewSteps { count } => t_args(
                "quality-too-few-steps",
                &[
                    ("count", count.to_string().as_str()),
                    ("min", MIN_STEPS.to_string().as_str()),
                ],
            ),
            QualityIssue::NoHeatMarker => t("quality-no-heat-marker"),
            QualityIssue::NoBasicSeasoning => t("quality-no-seasoning"),
            QualityIssue::VagueAmount { name } => t_args("quality-vague-amount", &[("name", name.as_str())]),
        }
    }
}

/// Verdict with every failed check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.issues.iter().map(QualityIssue::reason).collect()
    }
}

/// Run every check against a recipe.
///
/// The seasoning check only applies once the ingredient list is long enough
/// to be judged; a one-line stub fails on size alone.
pub fn quality_check(recipe: &Recipe) -> QualityReport {
    let mut issues = Vec::new();

    let ingredient_count = recipe.ingredients.len();
    if ingredient_count < MIN_INGREDIENTS {
        issues.push(QualityIssue::TooFewIngredients {
            count: ingredient_count,
        });
    }

    if recipe.steps.len() < MIN_STEPS {
        issues.push(QualityIssue::TooFewSteps {
            count: recipe.steps.len(),
        });
    }

    if !recipe.steps.iter().any(|s| has_heat_marker(&s.text)) {
        issues.push(QualityIssue::NoHeatMarker);
    }

    if ingredient_count >= MIN_INGREDIENTS
        && !recipe
            .ingredients
            .iter()
            .any(|i| has_basic_seasoning(&i.combined_text()))
    {
        issues.push(QualityIssue::NoBasicSeasoning);
    }

    for ingredient in &recipe.ingredients {
        if ingredient.amount_str().contains(TO_TASTE) {
            issues.push(QualityIssue::VagueAmount {
                name: ingredient.name.clone(),
            });
        }
    }

    QualityReport { issues }
}

/// Candidates that pass every check, in their original order
pub fn filter_passed(candidates: &[Recipe]) -> Vec<Recipe> {
    candidates
        .iter()
        .filter(|r| quality_check(r).passed())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::{Ingredient, Step};

    fn good_recipe() -> Recipe {
        Recipe::new("豚肉とキャベツの炒め物", 2)
            .with_ingredient(Ingredient::new("豚肉").with_amount("200g"))
            .with_ingredient(Ingredient::new("キャベツ").with_amount("150g"))
            .with_ingredient(Ingredient::new("しょうゆ").with_amount("大さじ1"))
            .with_step(Step::new("材料を切る"))
            .with_step(Step::new("中火で豚肉を炒める"))
            .with_step(Step::new("キャベツを加えてしょうゆで調味する"))
    }

    #[test]
    fn test_good_recipe_passes() {
        let report = quality_check(&good_recipe());
        assert!(report.passed(), "{:?}", report.reasons());
    }

    #[test]
    fn test_single_ingredient_stub_has_three_issues() {
        let recipe = Recipe::new("梅肉和え", 2).with_ingredient(Ingredient::new("梅肉").with_amount("200g"));
        let report = quality_check(&recipe);
        assert_eq!(
            report.issues,
            vec![
                QualityIssue::TooFewIngredients { count: 1 },
                QualityIssue::TooFewSteps { count: 0 },
                QualityIssue::NoHeatMarker,
            ]
        );
        assert_eq!(report.reasons().len(), 3);
    }

    #[test]
    fn test_vague_amount_flagged() {
        let mut recipe = good_recipe();
        recipe.ingredients.push(Ingredient::new("こしょう").with_amount("適量"));
        let report = quality_check(&recipe);
        assert_eq!(
            report.issues,
            vec![QualityIssue::VagueAmount {
                name: "こしょう".to_string()
            }]
        );
        assert!(report.reasons()[0].contains("こしょう"));
    }

    #[test]
    fn test_missing_seasoning() {
        let mut recipe = good_recipe();
        recipe.ingredients[2] = Ingredient::new("ピーマン").with_amount("2個");
        assert_eq!(quality_check(&recipe).issues, vec![QualityIssue::NoBasicSeasoning]);
    }

    #[test]
    fn test_filter_keeps_order() {
        let bad = Recipe::new("未完成", 2);
        let good = good_recipe();
        let passed = filter_passed(&[bad, good.clone()]);
        assert_eq!(passed, vec![good]);
    }
}
