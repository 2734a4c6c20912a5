//! Weekly shopping list: grams per food, grouped by food family.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::completion::classify;
use crate::matcher::normalize;
use crate::models::Category;
use crate::planner::WeekPlan;

/// Preparation words dropped before grouping, so "Riz cuit" and "riz"
/// land on the same line.
const PREPARATION_WORDS: &[&str] = &[
    "cuit", "cuite", "cuits", "bouilli", "grille", "grillee", "frais", "fraiche", "sec",
    "congele", "appertise", "egoutte", "cru", "crue",
];

const ARTICLES: &[&str] = &["le", "la", "les", "de", "du", "des", "d", "l"];

/// Display order of the aisles.
const AISLES: [Category; 10] = [
    Category::Vegetable,
    Category::Legume,
    Category::Grain,
    Category::Fruit,
    Category::Dairy,
    Category::Meat,
    Category::Fish,
    Category::Egg,
    Category::Default,
    Category::Unclassified,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub grams: i64,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingGroup {
    pub category: Category,
    pub items: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    pub total_items: usize,
    pub groups: Vec<ShoppingGroup>,
}

/// Grams, switching to kilograms with two decimals from 1000 g.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_quantity(grams: i64) -> String {
    if grams >= 1000 {
        format!("{:.2} kg", grams as f64 / 1000.0)
    } else {
        format!("{grams} g")
    }
}

fn strip_parenthesized(name: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Grouping key: normalized name without parenthesized details,
/// preparation words or articles.
#[must_use]
pub fn shopping_key(name: &str) -> String {
    let normalized = normalize(&strip_parenthesized(name));
    let key: Vec<&str> = normalized
        .split(' ')
        .filter(|w| !PREPARATION_WORDS.contains(w) && !ARTICLES.contains(w))
        .collect();
    if key.is_empty() {
        normalize(name)
    } else {
        key.join(" ")
    }
}

/// Sum every item of the week per food, then group by family with the
/// largest quantities first.
#[must_use]
pub fn shopping_list(week: &WeekPlan) -> ShoppingList {
    // (key, display name, grams) in first-seen order
    let mut totals: Vec<(String, String, i64)> = Vec::new();

    let items = week
        .days
        .iter()
        .flat_map(|day| &day.meals)
        .flat_map(|meal| &meal.items);
    for item in items {
        let key = shopping_key(&item.ingredient_name);
        match totals.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, grams)) => *grams += item.grams,
            None => {
                let display = strip_parenthesized(&item.ingredient_name);
                totals.push((key, display, item.grams));
            }
        }
    }

    let total_items = totals.len();
    let mut groups: Vec<ShoppingGroup> = Vec::new();
    for category in AISLES {
        let mut group: Vec<ShoppingItem> = totals
            .iter()
            .filter(|(key, _, _)| classify(key) == category)
            .map(|(_, name, grams)| ShoppingItem {
                name: name.clone(),
                grams: *grams,
                quantity: format_quantity(*grams),
            })
            .collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| b.grams.cmp(&a.grams).then_with(|| a.name.cmp(&b.name)));
        groups.push(ShoppingGroup {
            category,
            items: group,
        });
    }

    debug!(items = total_items, groups = groups.len(), "built shopping list");
    ShoppingList {
        week_start: week.days.first().and_then(|d| d.date),
        total_items,
        groups,
    }
}
