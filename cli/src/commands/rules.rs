use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use assiette_core::guidelines::{Guidelines, LimitBound};
use assiette_core::reconcile::{Reconciliation, apply_rules};
use assiette_core::rules::{CalorieRule, DurationUnit, RuleKind, extract_rules};

use super::helpers::{print_json, read_document, truncate};
use crate::config::Config;

#[derive(Serialize)]
struct RulesReport {
    rules: Vec<CalorieRule>,
    guidelines: Guidelines,
    #[serde(skip_serializing_if = "Option::is_none")]
    reconciliation: Option<Reconciliation>,
}

fn describe_calories(rule: &CalorieRule) -> String {
    match (rule.kind, rule.calorie_max) {
        (RuleKind::Range, Some(max)) => format!("{}-{max}", rule.calorie_min),
        (RuleKind::Exact, _) => format!("= {}", rule.calorie_min),
        _ => format!("<= {}", rule.calorie_min),
    }
}

fn describe_duration(rule: &CalorieRule) -> String {
    match (rule.duration_weeks, rule.duration_unit) {
        (Some(n), Some(DurationUnit::Days)) => format!("{n} jours"),
        (Some(n), _) => format!("{n} semaines"),
        (None, _) => "-".to_string(),
    }
}

fn print_rules_table(rules: &[CalorieRule]) {
    #[derive(Tabled)]
    struct RuleRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "kcal")]
        calories: String,
        #[tabled(rename = "Durée")]
        duration: String,
        #[tabled(rename = "Texte")]
        text: String,
    }

    let rows: Vec<RuleRow> = rules
        .iter()
        .enumerate()
        .map(|(i, r)| RuleRow {
            idx: i + 1,
            calories: describe_calories(r),
            duration: describe_duration(r),
            text: truncate(&r.source_text, 60),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn cmd_rules(
    config: &Config,
    file: Option<&Path>,
    calories: Option<i64>,
    json: bool,
) -> Result<()> {
    let text = read_document(file, config.document_path())?;
    let rules = extract_rules(&text);
    let guidelines = Guidelines::extract(&text);
    let reconciliation = calories.map(|c| apply_rules(c, &rules));

    if json {
        return print_json(&RulesReport {
            rules,
            guidelines,
            reconciliation,
        });
    }

    if rules.is_empty() {
        println!("No calorie rule found.");
    } else {
        print_rules_table(&rules);
    }
    if !guidelines.forbidden_foods.is_empty() {
        println!("Forbidden: {}", guidelines.forbidden_foods.join(", "));
    }
    for limit in &guidelines.quantity_limits {
        let bound = match limit.bound {
            LimitBound::Maximum => "max",
            LimitBound::Minimum => "min",
        };
        println!("Limit: {} {bound} {} g", limit.food, limit.grams);
    }
    if let Some(r) = reconciliation {
        println!("Daily calories: {} kcal", r.calories);
        println!("{}", r.explanation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RuleKind, min: i64, max: Option<i64>) -> CalorieRule {
        let mut rules = extract_rules("Maximum 1500 kcal pour 10 jours de détox.");
        let mut r = rules.remove(0);
        r.kind = kind;
        r.calorie_min = min;
        r.calorie_max = max;
        r
    }

    #[test]
    fn test_describe_rule() {
        let r = rule(RuleKind::Maximum, 1500, None);
        assert_eq!(describe_calories(&r), "<= 1500");
        assert_eq!(describe_duration(&r), "10 jours");
        let r = rule(RuleKind::Range, 1400, Some(1600));
        assert_eq!(describe_calories(&r), "1400-1600");
    }

    #[test]
    fn test_rules_from_default_document() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        std::fs::write(
            config.document_path(),
            "Limite de 1500 kcal par jour pendant les 3 premières semaines.",
        )
        .unwrap();
        cmd_rules(&config, None, Some(1898), true).unwrap();
        cmd_rules(&config, None, None, false).unwrap();
    }
}
