//! Daily energy budget from a biometric profile.
//!
//! BMR uses the revised Harris-Benedict equations
//! (Roza & Shizgal, 1984, *Am J Clin Nutr* 40(1):168-182):
//!
//! - male:   88.362 + 13.397 × weight + 4.799 × height − 5.677 × age
//! - female: 447.593 + 9.247 × weight + 3.098 × height − 4.330 × age
//!
//! TDEE scales BMR by the activity multiplier, then the objective factor
//! (reduce ×0.85, gain ×1.15) gives the daily calories. Every step is
//! rounded to the nearest kcal before the next one.

use serde::Serialize;
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::{ActivityLevel, Objective, Profile, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnergyBudget {
    pub bmr: i64,
    pub tdee: i64,
    pub daily_calories: i64,
    pub sex: Sex,
}

fn require_positive(field: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(PlannerError::MissingBiometricData { field, value }),
    }
}

fn round_kcal(value: f64) -> i64 {
    value.round() as i64
}

/// Basal metabolic rate, rounded to the nearest kcal.
#[must_use]
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: f64, sex: Sex) -> i64 {
    let bmr = match sex {
        Sex::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age_years,
        Sex::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age_years,
    };
    round_kcal(bmr)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_tdee(bmr: i64, activity: ActivityLevel) -> i64 {
    round_kcal(bmr as f64 * activity.multiplier())
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn adjust_for_objective(tdee: i64, objective: Objective) -> i64 {
    round_kcal(tdee as f64 * objective.factor())
}

/// BMR, TDEE and objective-adjusted calories for a profile.
///
/// Fails when weight, height or age is absent or not positive. Daily
/// calories never go below zero, even for out-of-range biometrics.
pub fn compute_budget(profile: &Profile) -> Result<EnergyBudget> {
    let weight = require_positive("weight", profile.weight_kg)?;
    let height = require_positive("height", profile.height_cm)?;
    let age = require_positive("age", profile.age_years)?;

    let bmr = compute_bmr(weight, height, age, profile.sex);
    let tdee = compute_tdee(bmr, profile.activity);
    let daily_calories = adjust_for_objective(tdee, profile.objective).max(0);

    debug!(bmr, tdee, daily_calories, "computed energy budget");

    Ok(EnergyBudget {
        bmr,
        tdee,
        daily_calories,
        sex: profile.sex,
    })
}

/// Daily macro split in percent and grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroTargets {
    pub calories: i64,
    pub protein_pct: i64,
    pub fat_pct: i64,
    pub carbs_pct: i64,
    pub protein_g: i64,
    pub fat_g: i64,
    pub carbs_g: i64,
}

impl MacroTargets {
    /// Reduce: 35/30/35, gain: 25/25/50, maintain: 25/30/45 (protein/fat/carbs).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_objective(calories: i64, objective: Objective) -> Self {
        let (protein_pct, fat_pct, carbs_pct) = match objective {
            Objective::Reduce => (35, 30, 35),
            Objective::Gain => (25, 25, 50),
            Objective::Maintain => (25, 30, 45),
        };
        let cal = calories as f64;
        Self {
            calories,
            protein_pct,
            fat_pct,
            carbs_pct,
            protein_g: round_kcal(cal * protein_pct as f64 / 100.0 / 4.0),
            fat_g: round_kcal(cal * fat_pct as f64 / 100.0 / 9.0),
            carbs_g: round_kcal(cal * carbs_pct as f64 / 100.0 / 4.0),
        }
    }
}
