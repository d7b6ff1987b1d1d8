//! # Ingredient Classifier
//!
//! Keyword tables used to classify free-text ingredient names and step texts.
//!
//! Matching is case-sensitive substring containment with no word-boundary
//! enforcement: "玉ねぎ" contains "ねぎ" and a name embedding a condiment
//! keyword inside a longer word is still a condiment. When several tables could
//! apply, callers evaluate them in a fixed order and the first match wins.

use serde::{Deserialize, Serialize};

/// An ordered, read-only keyword list
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    keywords: &'static [&'static str],
}

impl KeywordSet {
    pub const fn new(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// Whether any keyword is a substring of `text`
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }

    /// The first keyword, in table order, contained in `text`
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.keywords.iter().copied().find(|k| text.contains(k))
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }
}

pub const CONDIMENTS: KeywordSet = KeywordSet::new(&[
    "塩", "砂糖", "しょうゆ", "醤油", "みりん", "酒", "味噌", "酢", "ごま油", "オリーブオイル", "油",
    "バター", "だし", "顆粒だし",
]);

pub const SPICY: KeywordSet = KeywordSet::new(&[
    "一味", "七味", "豆板醤", "コチュジャン", "ラー油", "唐辛子", "粉唐辛子",
]);

/// Basic seasonings the quality gate expects to find somewhere in the ingredient list
pub const BASIC_SEASONINGS: KeywordSet = KeywordSet::new(&[
    "塩", "砂糖", "しょうゆ", "醤油", "みりん", "酒", "味噌", "酢", "ごま油", "オリーブオイル", "バター",
    "だし",
]);

/// Explicit heat-process markers expected in at least one step
pub const HEAT_MARKERS: KeywordSet = KeywordSet::new(&[
    "弱火", "中火", "強火", "沸騰", "余熱", "レンジ", "600W", "500W",
]);

/// Ingredients whose estimated amount is always a trace
pub const TRACE_ONLY: KeywordSet =
    KeywordSet::new(&["胡椒", "こしょう", "黒胡椒", "一味", "七味", "ラー油"]);

pub const DAIRY: KeywordSet = KeywordSet::new(&["牛乳", "生クリーム", "豆乳", "チーズ", "バター"]);

/// Title markers of simmered dishes
pub const SIMMER_TITLE_MARKERS: KeywordSet = KeywordSet::new(&["煮", "シチュー", "スープ"]);

/// Step markers asking the cook to taste and adjust
pub const TASTE_CHECK_MARKERS: KeywordSet =
    KeywordSet::new(&["味見", "味を調え", "味をととのえ", "味を整え"]);

pub fn is_condiment(name: &str) -> bool {
    CONDIMENTS.matches(name)
}

pub fn is_spicy(name: &str) -> bool {
    SPICY.matches(name)
}

pub fn has_heat_marker(text: &str) -> bool {
    HEAT_MARKERS.matches(text)
}

pub fn has_basic_seasoning(text: &str) -> bool {
    BASIC_SEASONINGS.matches(text)
}

/// Store section used to group the shopping list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingSection {
    MeatAndFish,
    Produce,
    Seasonings,
    Other,
}

impl ShoppingSection {
    pub fn label(&self) -> &'static str {
        match self {
            ShoppingSection::MeatAndFish => "精肉/魚",
            ShoppingSection::Produce => "青果",
            ShoppingSection::Seasonings => "調味料",
            ShoppingSection::Other => "その他",
        }
    }

    /// Sections in display order
    pub fn all() -> [ShoppingSection; 4] {
        [
            ShoppingSection::MeatAndFish,
            ShoppingSection::Produce,
            ShoppingSection::Seasonings,
            ShoppingSection::Other,
        ]
    }
}

const SECTION_TABLE: [(ShoppingSection, KeywordSet); 3] = [
    (
        ShoppingSection::MeatAndFish,
        KeywordSet::new(&[
            "鶏", "豚", "牛", "鮭", "さば", "ひき肉", "ベーコン", "ハム", "ツナ", "卵",
        ]),
    ),
    (
        ShoppingSection::Produce,
        KeywordSet::new(&[
            "玉ねぎ", "ねぎ", "長ねぎ", "キャベツ", "にんじん", "じゃがいも", "なす", "ピーマン", "もやし",
            "ブロッコリー", "きのこ", "しめじ", "えのき", "トマト", "小松菜", "ほうれん草", "青菜",
        ]),
    ),
    (
        ShoppingSection::Seasonings,
        KeywordSet::new(&[
            "塩", "砂糖", "しょうゆ", "醤油", "みりん", "酒", "味噌", "酢", "ごま油", "オリーブオイル", "バター",
            "顆粒だし", "だし",
        ]),
    ),
];

/// First section, in table order, whose keywords match the name
pub fn shopping_section(name: &str) -> ShoppingSection {
    SECTION_TABLE
        .iter()
        .find(|(_, keywords)| keywords.matches(name))
        .map(|(section, _)| *section)
        .unwrap_or(ShoppingSection::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condiment_substring_heuristic() {
        assert!(is_condiment("しょうゆ"));
        assert!(is_condiment("サラダ油"));
        // "塩" inside a longer word still classifies as a condiment
        assert!(is_condiment("塩昆布"));
        assert!(!is_condiment("キャベツ"));
    }

    #[test]
    fn test_spicy() {
        assert!(is_spicy("豆板醤"));
        assert!(is_spicy("ラー油"));
        assert!(!is_spicy("ごま油"));
    }

    #[test]
    fn test_first_match_follows_table_order() {
        let set = KeywordSet::new(&["ねぎ", "玉ねぎ"]);
        assert_eq!(set.first_match("玉ねぎ"), Some("ねぎ"));
    }

    #[test]
    fn test_shopping_section_order() {
        assert_eq!(shopping_section("鶏むね肉"), ShoppingSection::MeatAndFish);
        assert_eq!(shopping_section("キャベツ"), ShoppingSection::Produce);
        assert_eq!(shopping_section("みりん"), ShoppingSection::Seasonings);
        assert_eq!(shopping_section("梅肉"), ShoppingSection::Other);
        // "牛" wins over produce and seasonings for "牛乳"
        assert_eq!(shopping_section("牛乳"), ShoppingSection::MeatAndFish);
    }

    #[test]
    fn test_heat_markers() {
        assert!(has_heat_marker("中火で5分炒める"));
        assert!(has_heat_marker("電子レンジ600Wで2分"));
        assert!(!has_heat_marker("器に盛る"));
    }
}
