use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::models::MealSlot;

/// Share of the daily calories given to each slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MealDistribution {
    pub breakfast: f64,
    pub lunch: f64,
    pub dinner: f64,
}

impl MealDistribution {
    #[must_use]
    pub fn share(&self, slot: MealSlot) -> f64 {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
        }
    }

    /// Slots with a positive share, in serving order.
    #[must_use]
    pub fn active_slots(&self) -> Vec<MealSlot> {
        MealSlot::ALL
            .into_iter()
            .filter(|slot| self.share(*slot) > 0.0)
            .collect()
    }

    fn validate(&self, name: &str) -> Result<()> {
        let shares = [self.breakfast, self.lunch, self.dinner];
        if shares.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "{name}: shares must be non-negative numbers"
            )));
        }
        let sum: f64 = shares.iter().sum();
        if (sum - 1.0).abs() > 0.001 {
            return Err(PlannerError::InvalidConfig(format!(
                "{name}: shares must sum to 1 (got {sum:.3})"
            )));
        }
        Ok(())
    }
}

/// Inclusive gram range of a single portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortionBounds {
    pub min_g: i64,
    pub max_g: i64,
}

impl PortionBounds {
    #[must_use]
    pub fn clamp(&self, grams: i64) -> i64 {
        grams.max(self.min_g).min(self.max_g)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    pub min_items: usize,
    pub max_items: usize,
    pub portions: PortionBounds,
    pub attempts: usize,
    /// Relative deviation at which the search stops early.
    pub tolerance: f64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            min_items: 3,
            max_items: 5,
            portions: PortionBounds {
                min_g: 30,
                max_g: 500,
            },
            attempts: 50,
            tolerance: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub distribution: MealDistribution,
    pub fasting_distribution: MealDistribution,
    pub recipe_portions: PortionBounds,
    pub fallback: FallbackSettings,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            distribution: MealDistribution {
                breakfast: 0.27,
                lunch: 0.43,
                dinner: 0.30,
            },
            fasting_distribution: MealDistribution {
                breakfast: 0.0,
                lunch: 0.60,
                dinner: 0.40,
            },
            recipe_portions: PortionBounds {
                min_g: 20,
                max_g: 400,
            },
            fallback: FallbackSettings::default(),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        self.distribution.validate("distribution")?;
        self.fasting_distribution.validate("fasting_distribution")?;
        for (name, bounds) in [
            ("recipe_portions", self.recipe_portions),
            ("fallback.portions", self.fallback.portions),
        ] {
            if bounds.min_g <= 0 || bounds.min_g > bounds.max_g {
                return Err(PlannerError::InvalidConfig(format!(
                    "{name}: expected 0 < min_g <= max_g (got {}..{})",
                    bounds.min_g, bounds.max_g
                )));
            }
        }
        if self.fallback.min_items == 0 || self.fallback.min_items > self.fallback.max_items {
            return Err(PlannerError::InvalidConfig(format!(
                "fallback: expected 0 < min_items <= max_items (got {}..{})",
                self.fallback.min_items, self.fallback.max_items
            )));
        }
        if !(0.0..=1.0).contains(&self.fallback.tolerance) {
            return Err(PlannerError::InvalidConfig(
                "fallback.tolerance must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn distribution_for(&self, fasting: bool) -> &MealDistribution {
        if fasting {
            &self.fasting_distribution
        } else {
            &self.distribution
        }
    }
}
