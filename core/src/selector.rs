use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::catalog::{Recipe, RecipeCatalog, is_coherent};
use crate::matcher::find_match;
use crate::models::{Ingredient, MealSlot};

/// Source of the random draws made while planning.
///
/// Production code uses [`RngSource`]; tests pin the draws with
/// [`SequenceSource`].
pub trait RandomSource {
    /// Index in `0..len`. Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Adapter from any `rand` generator.
pub struct RngSource<R>(pub R);

impl RngSource<ThreadRng> {
    #[must_use]
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl RngSource<StdRng> {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Replays a fixed list of draws, cycling, each taken modulo `len`.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    draws: Vec<usize>,
    pos: usize,
}

impl SequenceSource {
    #[must_use]
    pub fn new(draws: Vec<usize>) -> Self {
        Self { draws, pos: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_index(&mut self, len: usize) -> usize {
        if self.draws.is_empty() || len == 0 {
            return 0;
        }
        let draw = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        draw % len
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// A recipe is realizable when every one of its terms matches a food of the pool.
#[must_use]
pub fn is_realizable(recipe: &Recipe, available: &[Ingredient]) -> bool {
    !recipe.ingredients.is_empty()
        && recipe
            .ingredients
            .iter()
            .all(|term| find_match(term, available).is_some())
}

/// Realizable, coherent recipes of a slot, in catalog order.
#[must_use]
pub fn select_realizable_recipes<'a>(
    catalog: &'a RecipeCatalog,
    slot: MealSlot,
    available: &[Ingredient],
) -> Vec<&'a Recipe> {
    let realizable: Vec<&Recipe> = catalog
        .for_slot(slot)
        .filter(|recipe| is_coherent(recipe.ingredients.as_slice()))
        .filter(|recipe| is_realizable(recipe, available))
        .collect();
    debug!(
        slot = slot.as_str(),
        pool = available.len(),
        realizable = realizable.len(),
        "selected realizable recipes"
    );
    realizable
}

/// Uniform pick; `None` when nothing is realizable.
#[must_use]
pub fn pick_one<'a>(recipes: &[&'a Recipe], rng: &mut dyn RandomSource) -> Option<&'a Recipe> {
    if recipes.is_empty() {
        return None;
    }
    Some(recipes[rng.next_index(recipes.len())])
}
