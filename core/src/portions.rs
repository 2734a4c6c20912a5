//! Gram quantities for a meal.
//!
//! The recipe path gives every mapped ingredient the same calorie share and
//! converts it to grams through the ingredient's density, clamped to the
//! portion bounds. The clamp is kept even when it moves the total away from
//! the target; callers read `GeneratedMeal::deviation` to see by how much.

use tracing::debug;

use crate::catalog::Recipe;
use crate::config::{FallbackSettings, PortionBounds};
use crate::matcher::{find_match, normalize};
use crate::models::{GeneratedMeal, Ingredient, MealItem, MealSource, MealTarget};
use crate::selector::{RandomSource, shuffle};

fn has_density(ingredient: &Ingredient) -> bool {
    ingredient.calories_per_100g.is_finite() && ingredient.calories_per_100g > 0.0
}

fn grams_for(share: f64, ingredient: &Ingredient, bounds: PortionBounds) -> i64 {
    bounds.clamp((share / ingredient.calories_per_100g * 100.0).round() as i64)
}

/// The pool food chosen for each recipe term, in recipe order.
#[must_use]
pub fn map_recipe(recipe: &Recipe, pool: &[Ingredient]) -> Vec<Ingredient> {
    recipe
        .ingredients
        .iter()
        .filter_map(|term| find_match(term, pool).cloned())
        .collect()
}

/// Recipe path: equal calorie share per mapped ingredient.
///
/// Ingredients without a calorie density still count in the share but get
/// no item.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn allocate(
    target: MealTarget,
    recipe_name: Option<&str>,
    ingredients: &[Ingredient],
    bounds: PortionBounds,
) -> GeneratedMeal {
    let items = if ingredients.is_empty() {
        Vec::new()
    } else {
        let share = target.calories as f64 / ingredients.len() as f64;
        ingredients
            .iter()
            .filter(|i| has_density(i))
            .map(|i| MealItem::portion(i, grams_for(share, i, bounds)))
            .collect()
    };
    let meal = GeneratedMeal::new(
        target,
        recipe_name.map(str::to_string),
        MealSource::Recipe,
        items,
    );
    debug!(
        slot = target.slot.as_str(),
        target = target.calories,
        realized = meal.totals.calories,
        deviation = meal.deviation,
        "allocated recipe portions"
    );
    meal
}

/// Builds a meal straight from the food list when no recipe fits.
pub trait FallbackComposer: Send + Sync {
    /// `None` only when the pool is empty.
    fn compose(
        &self,
        pool: &[Ingredient],
        target: MealTarget,
        used_today: &[String],
        rng: &mut dyn RandomSource,
    ) -> Option<GeneratedMeal>;
}

/// Random subsets of the pool, keeping the one closest to the target.
#[derive(Debug, Clone, Default)]
pub struct RandomPoolComposer {
    settings: FallbackSettings,
}

impl RandomPoolComposer {
    #[must_use]
    pub fn new(settings: FallbackSettings) -> Self {
        Self { settings }
    }

    #[allow(clippy::cast_precision_loss)]
    fn attempt(
        &self,
        candidates: &[&Ingredient],
        target: MealTarget,
        rng: &mut dyn RandomSource,
    ) -> GeneratedMeal {
        let mut picks = candidates.to_vec();
        shuffle(&mut picks, rng);

        let upper = self.settings.max_items.min(picks.len()).max(1);
        let lower = self.settings.min_items.clamp(1, upper);
        let count = lower + rng.next_index(upper - lower + 1);
        picks.truncate(count);

        let share = target.calories as f64 / picks.len() as f64;
        let bounds = self.settings.portions;
        let items = picks
            .iter()
            .map(|i| {
                let grams = if has_density(i) {
                    grams_for(share, i, bounds)
                } else {
                    bounds.min_g
                };
                MealItem::portion(i, grams)
            })
            .collect();
        GeneratedMeal::new(target, None, MealSource::Fallback, items)
    }
}

impl FallbackComposer for RandomPoolComposer {
    fn compose(
        &self,
        pool: &[Ingredient],
        target: MealTarget,
        used_today: &[String],
        rng: &mut dyn RandomSource,
    ) -> Option<GeneratedMeal> {
        if pool.is_empty() {
            return None;
        }

        let used: Vec<String> = used_today.iter().map(|n| normalize(n)).collect();
        let fresh: Vec<&Ingredient> = pool
            .iter()
            .filter(|i| !used.contains(&normalize(&i.name)))
            .collect();
        let fresh = if fresh.is_empty() {
            pool.iter().collect()
        } else {
            fresh
        };
        let dense: Vec<&Ingredient> = fresh.iter().copied().filter(|i| has_density(i)).collect();
        let candidates = if dense.is_empty() { fresh } else { dense };

        let mut best: Option<GeneratedMeal> = None;
        for _ in 0..self.settings.attempts.max(1) {
            let meal = self.attempt(&candidates, target, rng);
            if best.as_ref().is_none_or(|b| meal.deviation < b.deviation) {
                best = Some(meal);
            }
            if best
                .as_ref()
                .is_some_and(|b| b.deviation <= self.settings.tolerance)
            {
                break;
            }
        }

        if let Some(meal) = &best {
            debug!(
                slot = target.slot.as_str(),
                target = target.calories,
                realized = meal.totals.calories,
                items = meal.items.len(),
                "composed meal from food list"
            );
        }
        best
    }
}
