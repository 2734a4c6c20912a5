use serde::{Deserialize, Serialize};

use crate::matcher::{contains_phrase, normalize};
use crate::models::MealSlot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub slot: MealSlot,
    /// Generic ingredient terms, in serving order.
    pub ingredients: Vec<String>,
}

const BUILTIN: &[(MealSlot, &str, &[&str])] = &[
    (MealSlot::Breakfast, "Omelette nature", &["oeufs", "beurre"]),
    (MealSlot::Breakfast, "Oeufs brouillés", &["oeufs", "lait", "beurre"]),
    (
        MealSlot::Breakfast,
        "Omelette au fromage",
        &["oeufs", "fromage", "beurre"],
    ),
    (MealSlot::Breakfast, "Porridge", &["flocons d'avoine", "lait"]),
    (
        MealSlot::Breakfast,
        "Muesli maison",
        &["flocons d'avoine", "fruits secs", "noix"],
    ),
    (MealSlot::Breakfast, "Tartines beurre", &["pain", "beurre"]),
    (
        MealSlot::Breakfast,
        "Tartines confiture",
        &["pain", "beurre", "confiture"],
    ),
    (
        MealSlot::Lunch,
        "Poulet rôti aux légumes",
        &["poulet", "carottes", "courgettes", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Poulet grillé et riz",
        &["poulet", "riz", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Salade de poulet",
        &["poulet", "salade", "tomates", "concombre", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Steak haricots verts",
        &["boeuf", "haricots verts", "beurre"],
    ),
    (
        MealSlot::Lunch,
        "Boeuf bourguignon",
        &["boeuf", "carottes", "oignons", "vin rouge"],
    ),
    (
        MealSlot::Lunch,
        "Saumon grillé et légumes",
        &["saumon", "brocoli", "carottes", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Cabillaud vapeur",
        &["cabillaud", "pommes de terre", "citron", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Pâtes bolognaise",
        &["pâtes", "viande hachée", "tomates", "oignons", "huile d'olive"],
    ),
    (
        MealSlot::Lunch,
        "Pâtes carbonara",
        &["pâtes", "lardons", "oeufs", "parmesan", "crème"],
    ),
    (
        MealSlot::Dinner,
        "Filet de poisson vapeur",
        &["poisson blanc", "citron", "herbes"],
    ),
    (
        MealSlot::Dinner,
        "Pavé de saumon et épinards",
        &["saumon", "épinards", "huile d'olive"],
    ),
    (
        MealSlot::Dinner,
        "Dorade au four",
        &["dorade", "tomates", "citron", "huile d'olive"],
    ),
    (
        MealSlot::Dinner,
        "Escalope de dinde grillée",
        &["dinde", "salade", "tomates"],
    ),
    (
        MealSlot::Dinner,
        "Blanc de poulet et légumes",
        &["poulet", "courgettes", "brocoli", "huile d'olive"],
    ),
    (
        MealSlot::Dinner,
        "Omelette légumes",
        &["oeufs", "tomates", "poivrons", "oignons"],
    ),
    (
        MealSlot::Dinner,
        "Frittata aux légumes",
        &["oeufs", "courgettes", "tomates", "fromage"],
    ),
    (
        MealSlot::Dinner,
        "Soupe de légumes",
        &["carottes", "poireaux", "pommes de terre", "bouillon"],
    ),
    (
        MealSlot::Dinner,
        "Velouté de potiron",
        &["potiron", "crème", "oignons"],
    ),
];

/// Pairs of terms that never share a plate.
const INCOHERENT_PAIRS: &[(&str, &str)] = &[
    ("viande hachee", "moules"),
    ("viande hachee", "poisson"),
    ("poulet", "poisson"),
    ("boeuf", "poisson"),
    ("confiture", "viande"),
    ("confiture", "poisson"),
    ("chocolat", "viande"),
    ("chocolat", "poisson"),
];

/// False when the terms combine two foods that do not go together.
#[must_use]
pub fn is_coherent<S: AsRef<str>>(terms: &[S]) -> bool {
    let normalized: Vec<String> = terms.iter().map(|t| normalize(t.as_ref())).collect();
    let mentions = |word: &str| normalized.iter().any(|t| contains_phrase(t, word));
    !INCOHERENT_PAIRS
        .iter()
        .any(|&(a, b)| mentions(a) && mentions(b))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeCatalog {
    pub recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// French home-cooking recipes covering the three meal slots.
    #[must_use]
    pub fn builtin() -> Self {
        let recipes = BUILTIN
            .iter()
            .map(|(slot, name, ingredients)| Recipe {
                name: (*name).to_string(),
                slot: *slot,
                ingredients: ingredients.iter().map(|s| (*s).to_string()).collect(),
            })
            .collect();
        Self { recipes }
    }

    /// Recipes of one slot, in catalog order.
    pub fn for_slot(&self, slot: MealSlot) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(move |r| r.slot == slot)
    }
}
