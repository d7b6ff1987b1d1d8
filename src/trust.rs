//! # Trust Augmentation Engine
//!
//! Repairs under-specified recipes against a small database of dish
//! categories with known-good proportions.
//!
//! ## Features
//!
//! - Category detection by title alias, or by a dairy ingredient in a simmered dish
//! - Liquid top-up to a minimum milliliters per serving
//! - A default flavor base when none of the category's seasonings is present
//! - A pre-softening step for root vegetables and longer short simmer times
//! - A pot size chosen from the total raw ingredient weight
//! - A closing taste-and-adjust step
//!
//! Every repair checks for an existing equivalent first, so augmenting an
//! augmented recipe changes nothing.
//!
//! ## Usage
//!
//! ```rust
//! use kondate::recipe_model::{Ingredient, Recipe, Step};
//! use kondate::trust::{augment, DishCategory, TrustBadge};
//!
//! let mut recipe = Recipe::new("鶏肉のクリーム煮", 4)
//!     .with_ingredient(Ingredient::new("牛乳").with_amount("50ml"))
//!     .with_step(Step::new("弱火で煮る"));
//!
//! let report = augment(&mut recipe);
//! assert_eq!(report.category, Some(DishCategory::CreamStew));
//! assert!(recipe.badges.contains(&TrustBadge::LiquidNormalized));
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::{DAIRY, SIMMER_TITLE_MARKERS, TASTE_CHECK_MARKERS};
use crate::composition::{grams_equivalent, GRAMS_PER_TBSP, GRAMS_PER_TSP};
use crate::equipment::infer_tools;
use crate::messages::{t, t_args};
use crate::quantity::{format_number, parse_amount, render_quantity, teaspoons_to_pretty, CanonicalUnit};
use crate::quantity_patterns::MINUTES_REGEX;
use crate::recipe_model::{Ingredient, Recipe, Step};

/// Repair applied to a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBadge {
    LiquidNormalized,
    FlavorBase,
    PrepStep,
    Cookware,
    TasteCheck,
}

impl TrustBadge {
    fn message_key(&self) -> &'static str {
        match self {
            TrustBadge::LiquidNormalized => "badge-liquid-normalized",
            TrustBadge::FlavorBase => "badge-flavor-base",
            TrustBadge::PrepStep => "badge-prep-step",
            TrustBadge::Cookware => "badge-cookware",
            TrustBadge::TasteCheck => "badge-taste-check",
        }
    }

    pub fn label(&self) -> String {
        t(self.message_key())
    }
}

impl fmt::Display for TrustBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    CreamStew,
    Nikujaga,
    MisoSoup,
}

impl DishCategory {
    pub fn label(&self) -> String {
        match self {
            DishCategory::CreamStew => t("category-cream-stew"),
            DishCategory::Nikujaga => t("category-nikujaga"),
            DishCategory::MisoSoup => t("category-miso-soup"),
        }
    }
}

/// Minimum liquid per serving and where a deficit goes
#[derive(Debug, Clone, Copy)]
pub struct LiquidRule {
    /// Ingredient keywords counted as cooking liquid
    pub keys: &'static [&'static str],
    pub min_ml_per_serving: f64,
    /// Exact ingredient name that receives the deficit
    pub top_up_name: &'static str,
    /// Message id of the substitution hint on an inserted top-up ingredient
    pub substitution_key: Option<&'static str>,
}

/// At least one of `one_of` must be present
#[derive(Debug, Clone, Copy)]
pub struct FlavorBaseRule {
    pub one_of: &'static [&'static str],
    pub default_name: &'static str,
    pub tsp_per_serving: f64,
}

/// Root vegetables needing pre-softening and a minimum simmer time
#[derive(Debug, Clone, Copy)]
pub struct PrepRule {
    pub vegetables: &'static [&'static str],
    pub min_simmer_minutes: u32,
}

/// Static repair policy of one dish category
#[derive(Debug, Clone, Copy)]
pub struct TrustRule {
    pub category: DishCategory,
    pub aliases: &'static [&'static str],
    pub liquid: Option<LiquidRule>,
    pub flavor_base: Option<FlavorBaseRule>,
    pub prep: Option<PrepRule>,
    /// (minimum total grams, pot) in ascending order
    pub cookware: &'static [(f64, &'static str)],
}

const PREP_MARKERS: [&str; 2] = ["下茹で", "レンジ"];
const SIMMER_MARKER: &str = "煮";

pub const TRUST_RULES: &[TrustRule] = &[
    TrustRule {
        category: DishCategory::CreamStew,
        aliases: &["クリーム煮", "シチュー"],
        liquid: Some(LiquidRule {
            keys: &["牛乳", "豆乳", "生クリーム", "水"],
            min_ml_per_serving: 120.0,
            top_up_name: "水",
            substitution_key: Some("trust-water-substitution"),
        }),
        flavor_base: Some(FlavorBaseRule {
            one_of: &["塩", "コンソメ", "顆粒だし", "ブイヨン"],
            default_name: "コンソメ",
            tsp_per_serving: 0.5,
        }),
        prep: Some(PrepRule {
            vegetables: &["じゃがいも", "にんじん", "かぼちゃ"],
            min_simmer_minutes: 10,
        }),
        cookware: &[(0.0, "18cm鍋"), (800.0, "20cm鍋"), (1500.0, "24cm鍋")],
    },
    TrustRule {
        category: DishCategory::Nikujaga,
        aliases: &["肉じゃが"],
        liquid: Some(LiquidRule {
            keys: &["だし汁", "水"],
            min_ml_per_serving: 100.0,
            top_up_name: "水",
            substitution_key: Some("trust-broth-substitution"),
        }),
        flavor_base: Some(FlavorBaseRule {
            one_of: &["しょうゆ", "醤油"],
            default_name: "しょうゆ",
            tsp_per_serving: 1.5,
        }),
        prep: Some(PrepRule {
            vegetables: &["じゃがいも", "にんじん"],
            min_simmer_minutes: 15,
        }),
        cookware: &[(0.0, "18cm鍋"), (1000.0, "20cm鍋"), (1800.0, "24cm鍋")],
    },
    TrustRule {
        category: DishCategory::MisoSoup,
        aliases: &["味噌汁", "みそ汁"],
        liquid: Some(LiquidRule {
            keys: &["だし汁", "水"],
            min_ml_per_serving: 150.0,
            top_up_name: "だし汁",
            substitution_key: Some("trust-dashi-substitution"),
        }),
        flavor_base: Some(FlavorBaseRule {
            one_of: &["味噌", "みそ"],
            default_name: "味噌",
            tsp_per_serving: 1.5,
        }),
        prep: None,
        cookware: &[(0.0, "16cm鍋"), (600.0, "18cm鍋")],
    },
];

/// The rule for a category
pub fn rule_for(category: DishCategory) -> Option<&'static TrustRule> {
    TRUST_RULES.iter().find(|r| r.category == category)
}

/// Category by title alias first, then by the dairy-in-a-simmered-dish heuristic
pub fn detect_category(recipe: &Recipe) -> Option<DishCategory> {
    if let Some(rule) = TRUST_RULES
        .iter()
        .find(|r| r.aliases.iter().any(|a| recipe.title.contains(a)))
    {
        return Some(rule.category);
    }

    let has_dairy = recipe.ingredients.iter().any(|i| DAIRY.matches(&i.name));
    if has_dairy && SIMMER_TITLE_MARKERS.matches(&recipe.title) {
        return Some(DishCategory::CreamStew);
    }

    None
}

/// Sum of the gram equivalents of every parseable amount
pub fn estimate_total_weight(recipe: &Recipe) -> f64 {
    recipe
        .ingredients
        .iter()
        .filter_map(|i| parse_amount(i.amount_str()).map(|q| grams_equivalent(&i.name, &q)))
        .sum()
}

/// One repair and its note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRepair {
    pub badge: TrustBadge,
    pub note: String,
}

/// What one augmentation pass did
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrustReport {
    pub category: Option<DishCategory>,
    pub applied: Vec<AppliedRepair>,
}

impl TrustReport {
    fn record(&mut self, recipe: &mut Recipe, badge: TrustBadge, note: String) {
        debug!("Trust repair {:?} on '{}': {}", badge, recipe.title, note);
        if !recipe.badges.contains(&badge) {
            recipe.badges.push(badge);
        }
        self.applied.push(AppliedRepair { badge, note });
    }

    pub fn notes(&self) -> Vec<&str> {
        self.applied.iter().map(|r| r.note.as_str()).collect()
    }
}

/// Detect the category and apply its repairs in place
pub fn augment(recipe: &mut Recipe) -> TrustReport {
    let mut report = TrustReport {
        category: detect_category(recipe),
        applied: Vec::new(),
    };

    let Some(rule) = report.category.and_then(rule_for) else {
        debug!("No trust category for '{}'", recipe.title);
        return report;
    };

    if let Some(liquid) = &rule.liquid {
        top_up_liquid(recipe, liquid, &mut report);
    }
    if let Some(flavor) = &rule.flavor_base {
        ensure_flavor_base(recipe, flavor, &mut report);
    }
    if let Some(prep) = &rule.prep {
        ensure_prep_steps(recipe, prep, &mut report);
    }
    recommend_cookware(recipe, rule.cookware, &mut report);
    ensure_taste_check(recipe, &mut report);

    info!(
        "Trust augmentation of '{}' as {:?}: {} repairs",
        recipe.title,
        rule.category,
        report.applied.len()
    );
    report
}

/// Milliliters of one liquid amount; grams count as milliliters
fn liquid_ml(amount: &str) -> f64 {
    match parse_amount(amount) {
        Some(q) => match q.unit {
            CanonicalUnit::Milliliters | CanonicalUnit::Grams => q.value,
            CanonicalUnit::Tablespoons => q.value * GRAMS_PER_TBSP,
            CanonicalUnit::Teaspoons => q.value * GRAMS_PER_TSP,
            CanonicalUnit::Pieces => 0.0,
        },
        None => 0.0,
    }
}

fn top_up_liquid(recipe: &mut Recipe, rule: &LiquidRule, report: &mut TrustReport) {
    let have: f64 = recipe
        .ingredients
        .iter()
        .filter(|i| rule.keys.iter().any(|k| i.name.contains(k)))
        .map(|i| liquid_ml(i.amount_str()))
        .sum();
    let need = rule.min_ml_per_serving * recipe.effective_servings() as f64;
    let deficit = need - have;
    if deficit < 1.0 {
        return;
    }

    if let Some(existing) = recipe.ingredients.iter_mut().find(|i| i.name == rule.top_up_name) {
        let current = liquid_ml(existing.amount_str());
        existing.amount = Some(render_quantity(CanonicalUnit::Milliliters, current + deficit));
    } else {
        let mut inserted =
            Ingredient::new(rule.top_up_name).with_amount(&render_quantity(CanonicalUnit::Milliliters, deficit));
        if let Some(key) = rule.substitution_key {
            inserted = inserted.with_substitution(&t(key));
        }
        recipe.ingredients.push(inserted);
    }

    let note = t_args(
        "trust-note-liquid",
        &[
            ("have", format_number(have.round()).as_str()),
            ("name", rule.top_up_name),
            ("added", format_number(deficit.round()).as_str()),
            ("need", format_number(need.round()).as_str()),
        ],
    );
    report.record(recipe, TrustBadge::LiquidNormalized, note);
}

fn ensure_flavor_base(recipe: &mut Recipe, rule: &FlavorBaseRule, report: &mut TrustReport) {
    let present = recipe
        .ingredients
        .iter()
        .any(|i| rule.one_of.iter().any(|k| i.name.contains(k)));
    if present {
        return;
    }

    let amount = teaspoons_to_pretty(rule.tsp_per_serving * recipe.effective_servings() as f64);
    recipe
        .ingredients
        .push(Ingredient::new(rule.default_name).with_amount(&amount));

    let note = t_args(
        "trust-note-flavor",
        &[("name", rule.default_name), ("amount", amount.as_str())],
    );
    report.record(recipe, TrustBadge::FlavorBase, note);
}

fn ensure_prep_steps(recipe: &mut Recipe, rule: &PrepRule, report: &mut TrustReport) {
    let present: Vec<&str> = rule
        .vegetables
        .iter()
        .copied()
        .filter(|v| recipe.ingredients.iter().any(|i| i.name.contains(v)))
        .collect();
    if present.is_empty() {
        return;
    }

    let unprepared: Vec<&str> = present
        .iter()
        .copied()
        .filter(|v| {
            !recipe
                .steps
                .iter()
                .any(|s| s.text.contains(v) && PREP_MARKERS.iter().any(|m| s.text.contains(m)))
        })
        .collect();

    if !unprepared.is_empty() {
        let names = unprepared.join("・");
        recipe
            .steps
            .insert(0, Step::new(&t_args("trust-prep-step", &[("name", names.as_str())])));
        let note = t_args("trust-note-prep", &[("name", names.as_str())]);
        report.record(recipe, TrustBadge::PrepStep, note);
    }

    let min = rule.min_simmer_minutes;
    let mut lengthened = false;
    for step in recipe.steps.iter_mut().filter(|s| s.text.contains(SIMMER_MARKER)) {
        let replaced = MINUTES_REGEX.replace_all(&step.text, |caps: &regex::Captures| {
            let minutes: u32 = caps[1].parse().unwrap_or(min);
            if minutes < min {
                format!("{}分", min)
            } else {
                caps[0].to_string()
            }
        });
        if replaced != step.text {
            step.text = replaced.into_owned();
            lengthened = true;
        }
    }

    if lengthened {
        let note = t_args("trust-note-simmer", &[("minutes", min.to_string().as_str())]);
        report.record(recipe, TrustBadge::PrepStep, note);
    }
}

/// Last breakpoint whose threshold does not exceed `total_grams`
pub fn select_cookware(breakpoints: &'static [(f64, &'static str)], total_grams: f64) -> Option<&'static str> {
    let mut chosen = None;
    for (threshold, tool) in breakpoints {
        if *threshold <= total_grams {
            chosen = Some(*tool);
        }
    }
    chosen
}

fn recommend_cookware(
    recipe: &mut Recipe,
    breakpoints: &'static [(f64, &'static str)],
    report: &mut TrustReport,
) {
    let total = estimate_total_weight(recipe);
    let Some(tool) = select_cookware(breakpoints, total) else {
        return;
    };

    if recipe.equipment.is_none() {
        recipe.equipment = Some(infer_tools(recipe));
    }
    let Some(equipment) = recipe.equipment.as_mut() else {
        return;
    };
    if equipment.iter().any(|e| e == tool) {
        return;
    }
    equipment.push(tool.to_string());

    let note = t_args(
        "trust-note-cookware",
        &[("grams", format_number(total.round()).as_str()), ("tool", tool)],
    );
    report.record(recipe, TrustBadge::Cookware, note);
}

fn ensure_taste_check(recipe: &mut Recipe, report: &mut TrustReport) {
    if recipe.steps.iter().any(|s| TASTE_CHECK_MARKERS.matches(&s.text)) {
        return;
    }
    recipe.steps.push(Step::new(&t("trust-taste-step")));
    report.record(recipe, TrustBadge::TasteCheck, t("trust-note-taste"));
}
