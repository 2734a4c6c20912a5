use anyhow::{Context, Result, bail};
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use assiette_core::models::{Diagnostic, GeneratedMeal, MealSlot, MealSource, ProfileInput};

pub(crate) fn parse_slot(s: &str) -> Result<MealSlot> {
    MealSlot::parse(s).with_context(|| {
        format!("Invalid meal slot '{s}'. Use petit_dejeuner, dejeuner or diner")
    })
}

/// First day of a week: today, tomorrow, the next monday/lundi, or YYYY-MM-DD.
pub(crate) fn parse_start(start: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match start.map(str::to_lowercase).as_deref() {
        None | Some("today" | "aujourd'hui") => Ok(today),
        Some("tomorrow" | "demain") => today
            .checked_add_days(Days::new(1))
            .context("Date out of range"),
        Some("monday" | "lundi") => {
            let ahead = (7 - today.weekday().num_days_from_monday()) % 7;
            today
                .checked_add_days(Days::new(u64::from(ahead)))
                .context("Date out of range")
        }
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD, today, tomorrow or monday")),
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn read_profile(path: &Path) -> Result<ProfileInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse profile {}", path.display()))
}

/// Text of the practitioner document. An explicit path must exist; the
/// default one may be absent, which reads as an empty document.
pub(crate) fn read_document(explicit: Option<&Path>, default: PathBuf) -> Result<String> {
    match explicit {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display())),
        None if default.is_file() => std::fs::read_to_string(&default)
            .with_context(|| format!("Failed to read document {}", default.display())),
        None => Ok(String::new()),
    }
}

pub(crate) fn require_file(path: Option<PathBuf>, what: &str) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => bail!("No {what} found in the data directory. Pass a file or use --data-dir"),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("Note: {diagnostic}");
    }
}

pub(crate) fn meal_title(meal: &GeneratedMeal) -> String {
    let what = match (&meal.source, meal.recipe_name.as_deref()) {
        (_, Some(name)) => name.to_string(),
        (MealSource::Fallback, None) => "Composition libre".to_string(),
        _ => "Aucun aliment disponible".to_string(),
    };
    format!(
        "{} - {what} ({} / {} kcal)",
        meal.slot.label_fr(),
        meal.totals.calories,
        meal.target_calories
    )
}

pub(crate) fn print_meal_table(meal: &GeneratedMeal) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Aliment")]
        name: String,
        #[tabled(rename = "g")]
        grams: i64,
        #[tabled(rename = "kcal")]
        calories: i64,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "G")]
        carbs: String,
        #[tabled(rename = "L")]
        fat: String,
    }

    println!("{}", meal_title(meal));
    if meal.items.is_empty() {
        return;
    }

    let rows: Vec<ItemRow> = meal
        .items
        .iter()
        .map(|i| ItemRow {
            name: truncate(&i.ingredient_name, 35),
            grams: i.grams,
            calories: i.calories,
            protein: format!("{:.1}", i.protein),
            carbs: format!("{:.1}", i.carbs),
            fat: format!("{:.1}", i.fat),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("petit_dejeuner").unwrap(), MealSlot::Breakfast);
        assert_eq!(parse_slot("Déjeuner").unwrap(), MealSlot::Lunch);
        assert_eq!(parse_slot("dinner").unwrap(), MealSlot::Dinner);
        assert!(parse_slot("gouter").is_err());
    }

    #[test]
    fn test_parse_start_keywords() {
        // 2026-10-21 is a Wednesday
        let wed = day(2026, 10, 21);
        assert_eq!(parse_start(None, wed).unwrap(), wed);
        assert_eq!(parse_start(Some("demain"), wed).unwrap(), day(2026, 10, 22));
        assert_eq!(parse_start(Some("Lundi"), wed).unwrap(), day(2026, 10, 26));
        let mon = day(2026, 10, 19);
        assert_eq!(parse_start(Some("monday"), mon).unwrap(), mon);
    }

    #[test]
    fn test_parse_start_iso_and_invalid() {
        let wed = day(2026, 10, 21);
        assert_eq!(
            parse_start(Some("2024-01-15"), wed).unwrap(),
            day(2024, 1, 15)
        );
        assert!(parse_start(Some("nope"), wed).is_err());
    }

    #[test]
    fn test_read_document_default_may_be_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let default = tmp.path().join("consignes.txt");
        assert_eq!(read_document(None, default.clone()).unwrap(), "");

        std::fs::write(&default, "Maximum 1500 kcal par jour.").unwrap();
        assert_eq!(
            read_document(None, default.clone()).unwrap(),
            "Maximum 1500 kcal par jour."
        );

        let missing = tmp.path().join("autre.txt");
        assert!(read_document(Some(&missing), default).is_err());
    }

    #[test]
    fn test_read_profile_french_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("profil.json");
        std::fs::write(
            &path,
            r#"{"poids": "72,5", "taille": 168, "age": 41, "genre": "femme", "activitePhysique": "leger"}"#,
        )
        .unwrap();
        let profile = read_profile(&path).unwrap();
        assert_eq!(profile.poids, Some(72.5));
        assert_eq!(profile.genre.as_deref(), Some("femme"));
        assert_eq!(profile.activite_physique.as_deref(), Some("leger"));
    }

    #[test]
    fn test_json_error_escapes() {
        assert_eq!(json_error("bad \"x\""), r#"{"error":"bad \"x\""}"#);
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche épaisse", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }
}
