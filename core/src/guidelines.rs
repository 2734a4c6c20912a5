//! Food bans and portion limits written in practitioner documents.
//!
//! "Éviter le pain et les pâtes" bans two foods; "maximum 150 g de riz"
//! bounds a portion. Bans filter the food lists before recipe selection,
//! limits are only audited on the generated meals.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::matcher::{contains_phrase, normalize};
use crate::models::{Diagnostic, GeneratedMeal, Ingredient};
use crate::rules::segments;

/// Normalized stems that turn a sentence into a ban.
const BAN_STEMS: &[&str] = &[
    "interdi", "ne pas", "evit", "exclu", "banni", "supprim", "enlev", "retir", "proscri",
];

/// Foods a ban sentence can name, in normalized form.
const COMMON_FOODS: &[&str] = &[
    "pain",
    "pates",
    "riz",
    "pomme de terre",
    "patate",
    "sucre",
    "sel",
    "huile",
    "beurre",
    "fromage",
    "lait",
    "yaourt",
    "oeuf",
    "poulet",
    "viande",
    "poisson",
    "legume",
    "fruit",
    "cereale",
    "chocolat",
    "gateau",
    "biscuit",
    "soda",
    "alcool",
    "cafe",
    "the",
    "glace",
    "confiture",
    "charcuterie",
    "friture",
];

static QUANTITY_LIMIT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(maximum|minimum)\s+([0-9]+)\s*(kg|g|grammes?|ml)\s+d(?:e)?\s+([a-z]+)").ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitBound {
    Maximum,
    Minimum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityLimit {
    pub food: String,
    pub grams: i64,
    pub bound: LimitBound,
    pub source_text: String,
}

impl QuantityLimit {
    fn label(&self) -> String {
        let bound = match self.bound {
            LimitBound::Maximum => "maximum",
            LimitBound::Minimum => "minimum",
        };
        format!("{bound} {} g of {}", self.grams, self.food)
    }
}

/// Singular or plural whole-word mention of `food` in a normalized text.
fn mentions(text: &str, food: &str) -> bool {
    contains_phrase(text, food)
        || contains_phrase(text, &format!("{food}s"))
        || contains_phrase(text, &format!("{food}x"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Guidelines {
    pub forbidden_foods: Vec<String>,
    pub quantity_limits: Vec<QuantityLimit>,
}

impl Guidelines {
    #[must_use]
    pub fn extract(text: &str) -> Self {
        let mut guidelines = Guidelines::default();

        for segment in segments(text) {
            let normalized = normalize(segment);

            // "ne pas dépasser" bounds a quantity, it does not ban the food
            let is_ban = BAN_STEMS.iter().any(|stem| normalized.contains(stem))
                && !normalized.contains("depasser");
            if is_ban {
                for food in COMMON_FOODS {
                    if mentions(&normalized, food)
                        && !guidelines.forbidden_foods.iter().any(|f| f == food)
                    {
                        guidelines.forbidden_foods.push((*food).to_string());
                    }
                }
            }

            if let Some(re) = QUANTITY_LIMIT.as_ref() {
                for caps in re.captures_iter(&normalized) {
                    let Some(amount) = caps.get(2).and_then(|m| m.as_str().parse::<i64>().ok())
                    else {
                        continue;
                    };
                    let grams = if caps.get(3).is_some_and(|m| m.as_str() == "kg") {
                        amount * 1000
                    } else {
                        amount
                    };
                    let bound = if caps.get(1).is_some_and(|m| m.as_str() == "minimum") {
                        LimitBound::Minimum
                    } else {
                        LimitBound::Maximum
                    };
                    if let Some(food) = caps.get(4) {
                        guidelines.quantity_limits.push(QuantityLimit {
                            food: food.as_str().to_string(),
                            grams,
                            bound,
                            source_text: segment.to_string(),
                        });
                    }
                }
            }
        }

        debug!(
            forbidden = guidelines.forbidden_foods.len(),
            limits = guidelines.quantity_limits.len(),
            "extracted practitioner guidelines"
        );
        guidelines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forbidden_foods.is_empty() && self.quantity_limits.is_empty()
    }

    #[must_use]
    pub fn is_forbidden(&self, food_name: &str) -> bool {
        let name = normalize(food_name);
        self.forbidden_foods.iter().any(|f| mentions(&name, f))
    }

    /// Pool without the banned foods. When every food is banned the pool is
    /// returned as is and `false` is reported alongside.
    #[must_use]
    pub fn filter_pool(&self, pool: &[Ingredient]) -> (Vec<Ingredient>, bool) {
        let kept: Vec<Ingredient> = pool
            .iter()
            .filter(|i| !self.is_forbidden(&i.name))
            .cloned()
            .collect();
        if kept.is_empty() && !pool.is_empty() {
            warn!("every food of the pool is forbidden, keeping the full pool");
            return (pool.to_vec(), false);
        }
        (kept, true)
    }

    /// Portion limits broken by a meal.
    #[must_use]
    pub fn audit(&self, meal: &GeneratedMeal) -> Vec<Diagnostic> {
        let mut violations = Vec::new();
        for item in &meal.items {
            let name = normalize(&item.ingredient_name);
            for limit in &self.quantity_limits {
                if !mentions(&name, &limit.food) {
                    continue;
                }
                let broken = match limit.bound {
                    LimitBound::Maximum => item.grams > limit.grams,
                    LimitBound::Minimum => item.grams < limit.grams,
                };
                if broken {
                    warn!(
                        food = %item.ingredient_name,
                        grams = item.grams,
                        limit = limit.grams,
                        "portion breaks a practitioner limit"
                    );
                    violations.push(Diagnostic::GuidelineViolation {
                        slot: meal.slot,
                        food: item.ingredient_name.clone(),
                        grams: item.grams,
                        limit: limit.label(),
                    });
                }
            }
        }
        violations
    }
}
