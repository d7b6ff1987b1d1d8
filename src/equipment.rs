//! # Equipment Inference
//!
//! Infers a tool list for recipes that arrive without one, from the
//! ingredient names and step texts. Rules are applied in order and each tool
//! is listed once.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::recipe_model::Recipe;

/// Kit suggested when no rule matches
pub const DEFAULT_TOOLS: [&str; 4] = ["包丁", "まな板", "フライパンまたは鍋", "計量スプーン"];

const MEASURING_SPOON: &str = "計量スプーン";

const CUTTING_TOOLS: &[&str] = &["包丁", "まな板"];
const MIXING_TOOLS: &[&str] = &["ボウル", "菜箸"];
const FRYING_TOOLS: &[&str] = &["フライパン", "フライ返し"];
const BOILING_TOOLS: &[&str] = &["鍋（湯用）", "ザル"];
const SIMMERING_TOOLS: &[&str] = &["鍋", "菜箸"];
const MICROWAVE_TOOLS: &[&str] = &["電子レンジ", "耐熱容器", "ラップ"];

lazy_static! {
    static ref TOOL_RULES: Vec<(Regex, &'static [&'static str])> = vec![
        (
            Regex::new(r"(切る|刻む|みじん|千切り|輪切り|そぎ切り)").expect("Cutting pattern should be valid"),
            CUTTING_TOOLS,
        ),
        (
            Regex::new(r"(混ぜ|和え|ほぐし|溶き卵|衣を作る)").expect("Mixing pattern should be valid"),
            MIXING_TOOLS,
        ),
        (
            Regex::new(r"(炒め|焼き色|ソテー|香りが立つまで)").expect("Frying pattern should be valid"),
            FRYING_TOOLS,
        ),
        (
            Regex::new(r"(茹で|ゆで|湯が|下茹で)").expect("Boiling pattern should be valid"),
            BOILING_TOOLS,
        ),
        (
            Regex::new(r"(煮|煮込|煮立|弱火|中火|強火|沸騰)").expect("Simmering pattern should be valid"),
            SIMMERING_TOOLS,
        ),
        (
            Regex::new(r"(電子レンジ|レンジ|600W|500W)").expect("Microwave pattern should be valid"),
            MICROWAVE_TOOLS,
        ),
    ];
    static ref MEASURE_REGEX: Regex =
        Regex::new(r"(小さじ|大さじ|カップ|cup|cc|ml|mL|L|ℓ)").expect("Measure pattern should be valid");
}

fn push_unique(tools: &mut Vec<String>, tool: &str) {
    if !tools.iter().any(|t| t == tool) {
        tools.push(tool.to_string());
    }
}

/// Tools implied by a recipe's ingredient names and steps
pub fn infer_tools(recipe: &Recipe) -> Vec<String> {
    let names = recipe
        .ingredients
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join("、");
    let text = format!("{}\n{}", names, recipe.steps_text());

    let mut tools = Vec::new();
    for (pattern, rule_tools) in TOOL_RULES.iter() {
        if pattern.is_match(&text) {
            for tool in rule_tools.iter() {
                push_unique(&mut tools, tool);
            }
        }
    }

    if MEASURE_REGEX.is_match(&text) {
        push_unique(&mut tools, MEASURING_SPOON);
    }

    if tools.is_empty() {
        tools = DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect();
    }

    debug!("Inferred {} tools for '{}'", tools.len(), recipe.title);
    tools
}

/// The recipe's own equipment, or the inferred list when it has none
pub fn equipment_or_inferred(recipe: &Recipe) -> Vec<String> {
    match &recipe.equipment {
        Some(equipment) if !equipment.is_empty() => equipment.clone(),
        _ => infer_tools(recipe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::{Ingredient, Step};

    #[test]
    fn test_rules_in_order_without_duplicates() {
        let recipe = Recipe::new("野菜炒め", 2)
            .with_ingredient(Ingredient::new("キャベツ"))
            .with_step(Step::new("キャベツをざく切りにする"))
            .with_step(Step::new("中火で炒める"));

        assert_eq!(
            infer_tools(&recipe),
            vec!["フライパン", "フライ返し", "鍋", "菜箸"]
        );
    }

    #[test]
    fn test_measuring_spoon_rule() {
        let recipe = Recipe::new("たれ", 2).with_step(Step::new("しょうゆ大さじ1を混ぜる"));
        assert_eq!(infer_tools(&recipe), vec!["ボウル", "菜箸", "計量スプーン"]);
    }

    #[test]
    fn test_default_kit() {
        let recipe = Recipe::new("冷奴", 1).with_step(Step::new("器に盛る"));
        assert_eq!(infer_tools(&recipe), DEFAULT_TOOLS.to_vec());
    }

    #[test]
    fn test_existing_equipment_wins() {
        let recipe = Recipe::new("冷奴", 1).with_equipment(vec!["皿".to_string()]);
        assert_eq!(equipment_or_inferred(&recipe), vec!["皿"]);
    }
}
