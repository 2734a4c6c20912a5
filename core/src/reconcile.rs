use serde::Serialize;
use tracing::info;

use crate::rules::{CalorieRule, RuleKind};

/// Effective daily calories after practitioner rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub calories: i64,
    pub computed_calories: i64,
    pub applied_rule: Option<CalorieRule>,
    pub explanation: String,
}

/// The rule that wins: duration-bearing rules first, then document order.
#[must_use]
pub fn prioritized(rules: &[CalorieRule]) -> Option<&CalorieRule> {
    rules
        .iter()
        .find(|r| r.duration_weeks.is_some())
        .or_else(|| rules.first())
}

/// Merge the computed budget with the extracted rules.
///
/// Only one rule is applied. A range clamps in both directions; a maximum
/// or exact value only ever lowers the computed calories. The duration of a
/// rule is informational and does not limit when it applies.
#[must_use]
pub fn apply_rules(computed_calories: i64, rules: &[CalorieRule]) -> Reconciliation {
    let Some(rule) = prioritized(rules) else {
        return Reconciliation {
            calories: computed_calories,
            computed_calories,
            applied_rule: None,
            explanation: format!(
                "No practitioner rule: standard BMR/TDEE calculation ({computed_calories} kcal)"
            ),
        };
    };

    let window = rule
        .duration_weeks
        .map(|n| format!(" (window: {n})"))
        .unwrap_or_default();

    let (calories, explanation) = match (rule.kind, rule.calorie_max) {
        (RuleKind::Range, Some(max)) => {
            let min = rule.calorie_min;
            if computed_calories < min {
                (
                    min,
                    format!("Raised from {computed_calories} to the {min}-{max} kcal range minimum{window}"),
                )
            } else if computed_calories > max {
                (
                    max,
                    format!("Lowered from {computed_calories} to the {min}-{max} kcal range maximum{window}"),
                )
            } else {
                (
                    computed_calories,
                    format!("{computed_calories} kcal already within the {min}-{max} kcal range{window}"),
                )
            }
        }
        _ => {
            let cap = rule.calorie_min;
            if computed_calories > cap {
                (
                    cap,
                    format!("Capped from {computed_calories} to the {cap} kcal practitioner limit{window}"),
                )
            } else {
                (
                    computed_calories,
                    format!("{computed_calories} kcal already under the {cap} kcal practitioner limit{window}"),
                )
            }
        }
    };

    info!(
        computed = computed_calories,
        effective = calories,
        rule = %rule.source_text,
        "applied practitioner calorie rule"
    );

    Reconciliation {
        calories,
        computed_calories,
        applied_rule: Some(rule.clone()),
        explanation,
    }
}
