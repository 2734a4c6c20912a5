//! Categorical estimation of missing macro values.

use serde::Serialize;
use tracing::debug;

use crate::matcher::normalize;
use crate::models::{Category, Diagnostic, EstimatedFields, Ingredient, NutritionSource};

/// Keyword lists in priority order. The first category with a keyword
/// contained in the normalized name wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Meat,
        &[
            "poulet", "dinde", "boeuf", "veau", "porc", "agneau", "viande", "canard", "lapin",
        ],
    ),
    (
        Category::Fish,
        &[
            "poisson", "saumon", "thon", "cabillaud", "merlan", "crevette", "moule", "calmar",
            "anchois", "hareng", "maquereau",
        ],
    ),
    (
        Category::Vegetable,
        &[
            "salade",
            "tomate",
            "carotte",
            "courgette",
            "brocoli",
            "chou",
            "epinard",
            "haricot vert",
            "poivron",
            "aubergine",
            "navet",
            "betterave",
            "legume",
        ],
    ),
    (
        Category::Fruit,
        &[
            "pomme", "poire", "banane", "orange", "fraise", "raisin", "melon", "kiwi", "ananas",
            "fruit", "avocat",
        ],
    ),
    (
        Category::Grain,
        &[
            "riz",
            "pates",
            "pain",
            "quinoa",
            "ble",
            "avoine",
            "semoule",
            "cereale",
            "feculent",
            "pomme de terre",
        ],
    ),
    (
        Category::Dairy,
        &["lait", "yaourt", "fromage", "creme", "beurre", "laitier"],
    ),
    (
        Category::Legume,
        &[
            "lentille",
            "pois chiche",
            "haricot blanc",
            "haricot rouge",
            "feve",
            "soja",
            "legumineuse",
        ],
    ),
    (Category::Egg, &["oeuf"]),
];

/// Per-100g averages: (kcal, protein, carbs, fat).
#[must_use]
pub fn category_averages(category: Category) -> (f64, f64, f64, f64) {
    match category {
        Category::Meat => (200.0, 20.0, 0.0, 12.0),
        Category::Fish => (150.0, 20.0, 0.0, 6.0),
        Category::Vegetable => (30.0, 2.0, 5.0, 0.3),
        Category::Fruit => (50.0, 0.5, 12.0, 0.2),
        Category::Grain => (350.0, 10.0, 70.0, 2.0),
        Category::Dairy => (60.0, 3.5, 5.0, 3.0),
        Category::Legume => (120.0, 8.0, 20.0, 0.5),
        Category::Egg => (145.0, 12.0, 1.0, 10.0),
        Category::Default | Category::Unclassified => (100.0, 5.0, 10.0, 3.0),
    }
}

/// Classify a food name, falling back to [`Category::Default`].
#[must_use]
pub fn classify(name: &str) -> Category {
    let name = normalize(name);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map_or(Category::Default, |(category, _)| *category)
}

fn is_present(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn fill(value: &mut f64, average: f64) -> bool {
    if is_present(*value) {
        false
    } else {
        *value = average;
        true
    }
}

/// Fill the non-positive macro fields from the category averages.
///
/// Fields that are already positive are kept. Applying this twice gives the
/// same ingredient as applying it once.
#[must_use]
pub fn complete_ingredient(ingredient: &Ingredient) -> Ingredient {
    let complete = is_present(ingredient.calories_per_100g)
        && is_present(ingredient.protein_per_100g)
        && is_present(ingredient.carbs_per_100g)
        && is_present(ingredient.fat_per_100g);
    if complete {
        return ingredient.clone();
    }

    let category = classify(&ingredient.name);
    let (kcal, protein, carbs, fat) = category_averages(category);

    let mut completed = ingredient.clone();
    let filled = EstimatedFields {
        calories: fill(&mut completed.calories_per_100g, kcal),
        protein: fill(&mut completed.protein_per_100g, protein),
        carbs: fill(&mut completed.carbs_per_100g, carbs),
        fat: fill(&mut completed.fat_per_100g, fat),
    };

    completed.category = category;
    completed.estimated = ingredient.estimated.union(filled);
    if completed.estimated.any() {
        completed.source = NutritionSource::Estimated;
    }

    debug!(
        ingredient = %completed.name,
        category = category.as_str(),
        fields = ?filled.names(),
        "estimated missing nutrition values"
    );
    completed
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletionSummary {
    pub total: usize,
    pub estimated: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Complete a whole pool, reporting which foods needed estimation.
#[must_use]
pub fn complete_pool(pool: &[Ingredient]) -> (Vec<Ingredient>, CompletionSummary) {
    let mut summary = CompletionSummary {
        total: pool.len(),
        ..CompletionSummary::default()
    };
    let completed = pool
        .iter()
        .map(|ingredient| {
            let done = complete_ingredient(ingredient);
            if done.estimated != ingredient.estimated {
                summary.estimated += 1;
                summary.diagnostics.push(Diagnostic::IncompleteNutritionData {
                    ingredient: done.name.clone(),
                    category: done.category,
                    fields: done.estimated.names(),
                });
            }
            done
        })
        .collect();
    (completed, summary)
}
