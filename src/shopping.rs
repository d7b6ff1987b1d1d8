//! # Shopping List
//!
//! Consolidates the ingredients of a planned week into one list grouped by
//! store section.
//!
//! Entries with the same name are summed when their units agree. When two
//! entries for the same ingredient use different units, the running total is
//! converted to a gram equivalent (g 1, ml 1, 大さじ 15, 小さじ 5, 個 50) and
//! summed in grams. Amounts that carry no quantity (少々, 適量) are kept as
//! notes next to the total.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::classifier::{shopping_section, ShoppingSection};
use crate::planner::DayPlan;
use crate::quantity::{parse_amount, teaspoons_to_pretty, CanonicalQuantity, CanonicalUnit};
use crate::recipe_model::{Ingredient, Recipe};

/// Fixed gram equivalent of one unit, used only when units disagree
pub fn unit_gram_equivalent(unit: CanonicalUnit) -> f64 {
    match unit {
        CanonicalUnit::Grams | CanonicalUnit::Milliliters => 1.0,
        CanonicalUnit::Tablespoons => 15.0,
        CanonicalUnit::Teaspoons => 5.0,
        CanonicalUnit::Pieces => 50.0,
    }
}

fn as_grams(quantity: CanonicalQuantity) -> CanonicalQuantity {
    CanonicalQuantity::grams(quantity.value * unit_gram_equivalent(quantity.unit))
}

/// Sum two quantities, merging as grams when the units differ
pub fn merge_quantities(a: CanonicalQuantity, b: CanonicalQuantity) -> CanonicalQuantity {
    if a.unit == b.unit {
        CanonicalQuantity::new(a.unit, a.value + b.value)
    } else {
        CanonicalQuantity::grams(as_grams(a).value + as_grams(b).value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub section: ShoppingSection,
    pub total: Option<CanonicalQuantity>,
    /// Unquantified amounts seen for this ingredient, deduplicated
    pub notes: Vec<String>,
}

impl ShoppingItem {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            section: shopping_section(name),
            total: None,
            notes: Vec::new(),
        }
    }

    fn add(&mut self, ingredient: &Ingredient) {
        let amount = ingredient.amount_str().trim();
        match parse_amount(amount) {
            Some(quantity) => {
                self.total = Some(match self.total {
                    Some(total) => merge_quantities(total, quantity),
                    None => quantity,
                });
            }
            None if !amount.is_empty() => {
                if !self.notes.iter().any(|n| n == amount) {
                    self.notes.push(amount.to_string());
                }
            }
            None => {}
        }
    }

    /// Display amount, e.g. "300g" or "大さじ2 / 少々"
    pub fn display_amount(&self) -> String {
        let mut parts = Vec::new();
        if let Some(total) = self.total {
            parts.push(match total.unit {
                CanonicalUnit::Teaspoons => teaspoons_to_pretty(total.value),
                _ => total.render(),
            });
        }
        parts.extend(self.notes.iter().cloned());
        parts.join(" / ")
    }
}

/// A consolidated list in first-seen order within each section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipe(&mut self, recipe: &Recipe) {
        for ingredient in &recipe.ingredients {
            let name = ingredient.name.trim();
            if name.is_empty() {
                continue;
            }
            match self.items.iter_mut().find(|item| item.name == name) {
                Some(item) => item.add(ingredient),
                None => {
                    let mut item = ShoppingItem::new(name);
                    item.add(ingredient);
                    self.items.push(item);
                }
            }
        }
    }

    /// Items of one section
    pub fn section(&self, section: ShoppingSection) -> Vec<&ShoppingItem> {
        self.items.iter().filter(|item| item.section == section).collect()
    }

    /// Non-empty sections in display order
    pub fn grouped(&self) -> Vec<(ShoppingSection, Vec<&ShoppingItem>)> {
        ShoppingSection::all()
            .into_iter()
            .map(|section| (section, self.section(section)))
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Aggregate recipes into one shopping list
pub fn build_shopping_list<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> ShoppingList {
    let mut list = ShoppingList::new();
    for recipe in recipes {
        list.add_recipe(recipe);
    }
    debug!("Built shopping list with {} items", list.len());
    list
}

/// Aggregate the recipes of planned days
pub fn shopping_list_for_days(days: &[DayPlan]) -> ShoppingList {
    build_shopping_list(days.iter().map(|day| &day.recipe))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(items: &[(&str, &str)]) -> Recipe {
        items.iter().fold(Recipe::new("テスト", 2), |r, (name, amount)| {
            r.with_ingredient(Ingredient::new(name).with_amount(amount))
        })
    }

    #[test]
    fn test_same_unit_sums() {
        let list = build_shopping_list(&[
            recipe(&[("鶏むね肉", "200g"), ("しょうゆ", "大さじ1")]),
            recipe(&[("鶏むね肉", "150g"), ("しょうゆ", "大さじ1.5")]),
        ]);

        assert_eq!(list.len(), 2);
        let chicken = &list.items[0];
        assert_eq!(chicken.total, Some(CanonicalQuantity::grams(350.0)));
        assert_eq!(chicken.display_amount(), "350g");
        assert_eq!(list.items[1].display_amount(), "大さじ2.5");
    }

    #[test]
    fn test_incompatible_units_merge_as_grams() {
        let list = build_shopping_list(&[recipe(&[("バター", "10g")]), recipe(&[("バター", "大さじ1")])]);
        assert_eq!(list.items[0].total, Some(CanonicalQuantity::grams(25.0)));
    }

    #[test]
    fn test_unquantified_amounts_kept_as_notes() {
        let list = build_shopping_list(&[
            recipe(&[("塩", "少々")]),
            recipe(&[("塩", "少々"), ("塩", "小さじ1")]),
        ]);
        let salt = &list.items[0];
        assert_eq!(salt.notes, vec!["少々".to_string()]);
        assert_eq!(salt.display_amount(), "小さじ1 / 少々");
    }

    #[test]
    fn test_grouped_by_section() {
        let list = build_shopping_list(&[recipe(&[
            ("キャベツ", "1/4個"),
            ("豚肉", "200g"),
            ("みりん", "大さじ1"),
            ("豆腐", "1個"),
        ])]);
        let sections: Vec<_> = list.grouped().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            sections,
            vec![
                ShoppingSection::MeatAndFish,
                ShoppingSection::Produce,
                ShoppingSection::Seasonings,
                ShoppingSection::Other,
            ]
        );
    }
}
