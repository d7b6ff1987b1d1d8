//! # Recipe Data Model
//!
//! This module defines the structures exchanged between the text-generation
//! provider, the quantity/estimation layers and the weekly planner.
//!
//! ## Core Concepts
//!
//! - **Ingredient**: a free-text name with an optional display amount
//! - **Step**: one free-text instruction
//! - **Recipe**: title, servings, ingredients, steps and optional equipment
//! - **RecipeSet**: the 1–3 candidates returned by one generation call
//!
//! ## Usage
//!
//! ```rust
//! use kondate::recipe_model::{Ingredient, Recipe, Step};
//!
//! let recipe = Recipe::new("豚こま炒め", 2)
//!     .with_ingredient(Ingredient::new("豚肉").with_amount("200g"))
//!     .with_step(Step::new("1. フライパンを中火で熱する"));
//!
//! assert_eq!(recipe.numbered_steps()[0], (1, "フライパンを中火で熱する".to_string()));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity_patterns::STEP_PREFIX_REGEX;
use crate::trust::TrustBadge;

/// A single ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Free-text name; may embed a quantity such as "梅肉 200g" before normalization
    pub name: String,

    /// Display amount (e.g. "大さじ1", "200g", "少々")
    #[serde(default)]
    pub amount: Option<String>,

    /// Whether the ingredient can be left out
    #[serde(default)]
    pub is_optional: bool,

    /// Substitution hint shown next to the ingredient
    #[serde(default)]
    pub substitution: Option<String>,
}

/// A single cooking instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
}

/// A complete recipe candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Dish title
    pub title: String,

    /// Target servings, at least 1
    #[serde(default = "default_servings")]
    pub servings: u32,

    /// Total cooking time in minutes
    #[serde(default)]
    pub total_time_min: Option<u32>,

    /// Free-text difficulty label
    #[serde(default)]
    pub difficulty: Option<String>,

    pub ingredients: Vec<Ingredient>,

    pub steps: Vec<Step>,

    #[serde(default)]
    pub equipment: Option<Vec<String>>,

    /// Repairs applied by trust augmentation, in first-applied order
    #[serde(default, skip_deserializing)]
    pub badges: Vec<TrustBadge>,
}

/// The unit of output of one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSet {
    pub recommendations: Vec<Recipe>,
}

fn default_servings() -> u32 {
    2
}

impl Ingredient {
    /// Create a new ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: None,
            is_optional: false,
            substitution: None,
        }
    }

    /// Set the display amount
    pub fn with_amount(mut self, amount: &str) -> Self {
        self.amount = Some(amount.to_string());
        self
    }

    /// Mark the ingredient as optional
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Add a substitution hint
    pub fn with_substitution(mut self, substitution: &str) -> Self {
        self.substitution = Some(substitution.to_string());
        self
    }

    /// The amount, or an empty string when absent
    pub fn amount_str(&self) -> &str {
        self.amount.as_deref().unwrap_or("")
    }

    /// Name and amount joined by a space, used by keyword checks
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.name, self.amount_str())
    }
}

impl Step {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Recipe {
    /// Create an empty recipe; servings below 1 are raised to 1
    pub fn new(title: &str, servings: u32) -> Self {
        Self {
            title: title.to_string(),
            servings: servings.max(1),
            total_time_min: None,
            difficulty: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            equipment: None,
            badges: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_equipment(mut self, equipment: Vec<String>) -> Self {
        self.equipment = Some(equipment);
        self
    }

    pub fn with_total_time(mut self, minutes: u32) -> Self {
        self.total_time_min = Some(minutes);
        self
    }

    pub fn with_difficulty(mut self, difficulty: &str) -> Self {
        self.difficulty = Some(difficulty.to_string());
        self
    }

    /// Servings used as a divisor; never zero
    pub fn effective_servings(&self) -> u32 {
        self.servings.max(1)
    }

    /// All step texts joined, used by keyword checks
    pub fn steps_text(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("。")
    }

    /// All ingredient names and amounts joined, used by keyword checks
    pub fn ingredients_text(&self) -> String {
        self.ingredients
            .iter()
            .map(Ingredient::combined_text)
            .collect::<Vec<_>>()
            .join("、")
    }

    /// Steps with their original prefixes removed, renumbered from 1
    pub fn numbered_steps(&self) -> Vec<(usize, String)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| (i + 1, strip_step_prefix(&s.text)))
            .collect()
    }
}

/// Remove a leading "STEP 3", "3.", "３）" or circled-number marker
pub fn strip_step_prefix(text: &str) -> String {
    STEP_PREFIX_REGEX.replace(text, "").trim().to_string()
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        if let Some(amount) = &self.amount {
            write!(f, " {}", amount)?;
        }

        if self.is_optional {
            write!(f, "（任意）")?;
        }

        if let Some(substitution) = &self.substitution {
            write!(f, " / 代替: {}", substitution)?;
        }

        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}（{}人分）", self.title, self.servings)?;

        for ingredient in &self.ingredients {
            writeln!(f, "  - {}", ingredient)?;
        }

        for (n, text) in self.numbered_steps() {
            writeln!(f, "  STEP {} {}", n, text)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_builder() {
        let ingredient = Ingredient::new("牛乳")
            .with_amount("200ml")
            .with_substitution("豆乳")
            .optional();

        assert_eq!(ingredient.name, "牛乳");
        assert_eq!(ingredient.amount_str(), "200ml");
        assert!(ingredient.is_optional);
        assert_eq!(ingredient.to_string(), "牛乳 200ml（任意） / 代替: 豆乳");
    }

    #[test]
    fn test_recipe_servings_floor() {
        let recipe = Recipe::new("味噌汁", 0);
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.effective_servings(), 1);
    }

    #[test]
    fn test_strip_step_prefix_variants() {
        assert_eq!(strip_step_prefix("STEP 3: 煮込む"), "煮込む");
        assert_eq!(strip_step_prefix("3. 煮込む"), "煮込む");
        assert_eq!(strip_step_prefix("３）煮込む"), "煮込む");
        assert_eq!(strip_step_prefix("② 煮込む"), "煮込む");
        assert_eq!(strip_step_prefix("煮込む"), "煮込む");
    }

    #[test]
    fn test_numbered_steps_are_contiguous() {
        let recipe = Recipe::new("炒め物", 2)
            .with_step(Step::new("STEP 5 切る"))
            .with_step(Step::new("① 炒める"))
            .with_step(Step::new("10. 盛り付ける"));

        let numbered = recipe.numbered_steps();
        assert_eq!(
            numbered,
            vec![
                (1, "切る".to_string()),
                (2, "炒める".to_string()),
                (3, "盛り付ける".to_string()),
            ]
        );
    }

    #[test]
    fn test_deserialize_with_title_field() {
        let json = r#"{
            "title": "肉じゃが",
            "servings": 3,
            "ingredients": [{"name": "じゃがいも", "amount": "300g"}],
            "steps": [{"text": "煮る"}]
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.title, "肉じゃが");
        assert_eq!(recipe.servings, 3);
        assert!(!recipe.ingredients[0].is_optional);
        assert!(recipe.badges.is_empty());
        assert!(recipe.equipment.is_none());
    }
}
