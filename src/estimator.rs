//! # Quantity Estimator
//!
//! Infers a plausible display amount for an ingredient that has no usable
//! quantity, from per-serving reference tables scaled by the serving count.
//!
//! Tables are evaluated in a fixed order and the first table containing a
//! keyword of the name wins: pieces → protein (g) → vegetables (g) → oils
//! (tsp) → condiments (tsp). The order keeps "卵" a piece ingredient even
//! though it also appears in the protein table.

use log::debug;

use crate::classifier::TRACE_ONLY;
use crate::quantity::{format_number, format_piece_count, grams_to_pretty, teaspoons_to_pretty};
use crate::quantity_patterns::{TO_TASTE, TRACE_AMOUNT};

/// How a table expresses its per-serving reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerServing {
    /// Discrete count with its display unit (個, 片)
    Pieces(f64, &'static str),
    Grams(f64),
    Teaspoons(f64),
}

/// Category of an estimation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateCategory {
    Piece,
    Protein,
    Vegetable,
    Oil,
    Condiment,
}

type EstimateTable = &'static [(&'static str, PerServing)];

const PIECE_PER_SERVING: EstimateTable = &[
    ("卵", PerServing::Pieces(1.0, "個")),
    ("にんにく", PerServing::Pieces(0.5, "片")),
    ("生姜", PerServing::Pieces(0.5, "片")),
];

const PROTEIN_G_PER_SERVING: EstimateTable = &[
    ("鶏むね肉", PerServing::Grams(100.0)),
    ("鶏もも肉", PerServing::Grams(100.0)),
    ("豚肉", PerServing::Grams(100.0)),
    ("牛肉", PerServing::Grams(100.0)),
    ("ひき肉", PerServing::Grams(100.0)),
    ("鮭", PerServing::Grams(90.0)),
    ("さば", PerServing::Grams(90.0)),
    ("ツナ", PerServing::Grams(70.0)),
    ("ベーコン", PerServing::Grams(30.0)),
    ("ハム", PerServing::Grams(30.0)),
    ("豆腐", PerServing::Grams(150.0)),
    ("木綿豆腐", PerServing::Grams(150.0)),
    ("絹ごし豆腐", PerServing::Grams(150.0)),
    ("卵", PerServing::Grams(50.0)),
];

const VEGETABLE_G_PER_SERVING: EstimateTable = &[
    ("玉ねぎ", PerServing::Grams(50.0)),
    ("ねぎ", PerServing::Grams(10.0)),
    ("長ねぎ", PerServing::Grams(20.0)),
    ("キャベツ", PerServing::Grams(80.0)),
    ("にんじん", PerServing::Grams(40.0)),
    ("じゃがいも", PerServing::Grams(80.0)),
    ("なす", PerServing::Grams(60.0)),
    ("ピーマン", PerServing::Grams(40.0)),
    ("もやし", PerServing::Grams(100.0)),
    ("ブロッコリー", PerServing::Grams(70.0)),
    ("きのこ", PerServing::Grams(60.0)),
    ("しめじ", PerServing::Grams(60.0)),
    ("えのき", PerServing::Grams(60.0)),
    ("トマト", PerServing::Grams(80.0)),
    ("青菜", PerServing::Grams(70.0)),
    ("小松菜", PerServing::Grams(70.0)),
    ("ほうれん草", PerServing::Grams(70.0)),
];

const OIL_TSP_PER_SERVING: EstimateTable = &[
    ("サラダ油", PerServing::Teaspoons(1.0)),
    ("ごま油", PerServing::Teaspoons(0.5)),
    ("オリーブオイル", PerServing::Teaspoons(1.0)),
];

const CONDIMENT_TSP_PER_SERVING: EstimateTable = &[
    ("塩", PerServing::Teaspoons(0.125)),
    ("砂糖", PerServing::Teaspoons(0.5)),
    ("しょうゆ", PerServing::Teaspoons(1.0)),
    ("醤油", PerServing::Teaspoons(1.0)),
    ("みりん", PerServing::Teaspoons(1.0)),
    ("酒", PerServing::Teaspoons(1.0)),
    ("酢", PerServing::Teaspoons(1.0)),
    ("コチュジャン", PerServing::Teaspoons(0.5)),
    ("味噌", PerServing::Teaspoons(1.5)),
    ("味の素", PerServing::Teaspoons(0.25)),
    ("顆粒だし", PerServing::Teaspoons(0.5)),
];

/// (category, table) pairs in evaluation order
const ESTIMATION_TABLES: [(EstimateCategory, EstimateTable); 5] = [
    (EstimateCategory::Piece, PIECE_PER_SERVING),
    (EstimateCategory::Protein, PROTEIN_G_PER_SERVING),
    (EstimateCategory::Vegetable, VEGETABLE_G_PER_SERVING),
    (EstimateCategory::Oil, OIL_TSP_PER_SERVING),
    (EstimateCategory::Condiment, CONDIMENT_TSP_PER_SERVING),
];

/// The first (category, per-serving reference) whose keyword the name contains
pub fn lookup_reference(name: &str) -> Option<(EstimateCategory, PerServing)> {
    ESTIMATION_TABLES.iter().find_map(|(category, table)| {
        table
            .iter()
            .find(|(key, _)| name.contains(key))
            .map(|(_, per)| (*category, *per))
    })
}

/// Render a per-serving reference scaled to `servings`
pub fn render_reference(per: PerServing, servings: u32) -> String {
    let servings = servings.max(1) as f64;
    match per {
        PerServing::Pieces(count, unit) => {
            let total = count * servings;
            let text = if (total - total.trunc()).abs() < 1e-6 {
                format_piece_count(total)
            } else {
                format_number(total)
            };
            format!("{}{}", text, unit)
        }
        PerServing::Grams(grams) => grams_to_pretty((grams * servings) as i64),
        PerServing::Teaspoons(tsp) => teaspoons_to_pretty(tsp * servings),
    }
}

/// Estimate a display amount for `name` with no numeric input.
///
/// Falls back to the trace sentinel for pepper-like names, then to "to taste".
pub fn estimate_amount(name: &str, servings: u32) -> String {
    if let Some((category, per)) = lookup_reference(name) {
        let amount = render_reference(per, servings);
        debug!(
            "Estimated '{}' as {:?} for {} servings: {}",
            name, category, servings, amount
        );
        return amount;
    }

    if TRACE_ONLY.matches(name) {
        return TRACE_AMOUNT.to_string();
    }

    debug!("No estimation table matched '{}', using to-taste sentinel", name);
    TO_TASTE.to_string()
}
