//! Product-category derivation.
//!
//! The rule table keys on a coarse product category, not free text. This
//! module maps a product description onto one of the supported categories
//! with a weighted keyword pass: every pattern that fires adds its weight
//! to the category's score, the highest score wins, and anything that
//! matches nothing lands in `GeneralGoods`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse product category used as a rule-table key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Food,
    Textiles,
    Electronics,
    Pharmaceuticals,
    Chemicals,
    Cosmetics,
    Handicraft,
    Software,
    Machinery,
    GeneralGoods,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Food => "food",
            ProductCategory::Textiles => "textiles",
            ProductCategory::Electronics => "electronics",
            ProductCategory::Pharmaceuticals => "pharmaceuticals",
            ProductCategory::Chemicals => "chemicals",
            ProductCategory::Cosmetics => "cosmetics",
            ProductCategory::Handicraft => "handicraft",
            ProductCategory::Software => "software",
            ProductCategory::Machinery => "machinery",
            ProductCategory::GeneralGoods => "general_goods",
        }
    }

    /// Parse the snake_case form used in rule tables. `"*"` is not a
    /// category; wildcards are handled by the rule matcher.
    pub fn parse(value: &str) -> Option<ProductCategory> {
        match value.trim().to_lowercase().as_str() {
            "food" => Some(ProductCategory::Food),
            "textiles" => Some(ProductCategory::Textiles),
            "electronics" => Some(ProductCategory::Electronics),
            "pharmaceuticals" => Some(ProductCategory::Pharmaceuticals),
            "chemicals" => Some(ProductCategory::Chemicals),
            "cosmetics" => Some(ProductCategory::Cosmetics),
            "handicraft" => Some(ProductCategory::Handicraft),
            "software" => Some(ProductCategory::Software),
            "machinery" => Some(ProductCategory::Machinery),
            "general_goods" => Some(ProductCategory::GeneralGoods),
            _ => None,
        }
    }
}

/// Keyword patterns per category. Weights favor specific product terms
/// over generic ones so "LED light bulbs" scores electronics, not
/// machinery, and "herbal soap" scores cosmetics, not food.
static CATEGORY_PATTERNS: LazyLock<Vec<(ProductCategory, Regex, f32)>> = LazyLock::new(|| {
    vec![
        (
            ProductCategory::Food,
            Regex::new(r"(?i)\b(turmeric|spice|spices|tea|coffee|rice|wheat|flour|pickle|snack|honey|jaggery|ghee|pulses|lentil|mango|fruit|vegetable|masala|cardamom|pepper|cashew|almond|organic food|edible)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Food,
            Regex::new(r"(?i)\b(food|beverage|juice|dairy|grain)\b").unwrap(),
            1.0,
        ),
        (
            ProductCategory::Textiles,
            Regex::new(r"(?i)\b(saree|sarees|kurta|garment|garments|apparel|t-?shirt|fabric|cotton|silk|wool|denim|yarn|hosiery|bedsheet|towel|carpet|rug)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Textiles,
            Regex::new(r"(?i)\b(textile|clothing|wear)\b").unwrap(),
            1.0,
        ),
        (
            ProductCategory::Electronics,
            Regex::new(r"(?i)\b(led|lamp|bulb|bulbs|charger|battery|batteries|router|sensor|circuit|pcb|smartphone|headphone|earphone|speaker|inverter|solar panel|adapter)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Electronics,
            Regex::new(r"(?i)\b(electronic|electronics|electrical|appliance)\b").unwrap(),
            1.0,
        ),
        (
            ProductCategory::Pharmaceuticals,
            Regex::new(r"(?i)\b(tablet|tablets|capsule|capsules|syrup|vaccine|drug|drugs|medicine|medicines|pharmaceutical|ayurvedic|nutraceutical|supplement)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Chemicals,
            Regex::new(r"(?i)\b(dye|dyes|pigment|solvent|resin|polymer|fertilizer|pesticide|acid|chemical|chemicals|reagent)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Cosmetics,
            Regex::new(r"(?i)\b(soap|shampoo|cream|lotion|lipstick|kohl|kajal|perfume|cosmetic|cosmetics|skincare|essential oil)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Handicraft,
            Regex::new(r"(?i)\b(handicraft|handmade|hand-?crafted|brass[a-z]*|terracotta|pottery|jewell?ery|woodcarving|artisan|decor)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Software,
            Regex::new(r"(?i)\b(software|saas|app|application|platform|api|cloud|erp|crm|analytics|fintech|it services?)\b").unwrap(),
            2.0,
        ),
        (
            ProductCategory::Machinery,
            Regex::new(r"(?i)\b(machine|machinery|pump|pumps|compressor|lathe|cnc|motor|motors|gearbox|turbine|engine)\b").unwrap(),
            2.0,
        ),
    ]
});

/// Derive the product category from free-text description.
pub fn derive_category(description: &str) -> ProductCategory {
    let mut scores: Vec<(ProductCategory, f32)> = Vec::new();

    for (category, pattern, weight) in CATEGORY_PATTERNS.iter() {
        let hits = pattern.find_iter(description).count();
        if hits == 0 {
            continue;
        }
        let score = *weight * hits as f32;
        match scores.iter_mut().find(|(c, _)| c == category) {
            Some((_, existing)) => *existing += score,
            None => scores.push((*category, score)),
        }
    }

    scores
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(category, _)| category)
        .unwrap_or(ProductCategory::GeneralGoods)
}
