use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use assiette_core::catalog::{Recipe, RecipeCatalog};
use assiette_core::completion::{CompletionSummary, complete_pool};
use assiette_core::models::{Ingredient, MealSlot};
use assiette_core::pool_import::load_pool;
use assiette_core::selector::select_realizable_recipes;

use super::helpers::{json_error, parse_slot, print_diagnostics, print_json, require_file, truncate};
use crate::config::Config;

fn print_pool_table(pool: &[Ingredient]) {
    #[derive(Tabled)]
    struct PoolRow {
        #[tabled(rename = "Aliment")]
        name: String,
        #[tabled(rename = "Catégorie")]
        category: String,
        #[tabled(rename = "kcal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "G/100g")]
        carbs: String,
        #[tabled(rename = "L/100g")]
        fat: String,
        #[tabled(rename = "Estimé")]
        estimated: String,
    }

    let rows: Vec<PoolRow> = pool
        .iter()
        .map(|i| PoolRow {
            name: truncate(&i.name, 35),
            category: i.category.as_str().to_string(),
            calories: format!("{:.0}", i.calories_per_100g),
            protein: format!("{:.1}", i.protein_per_100g),
            carbs: format!("{:.1}", i.carbs_per_100g),
            fat: format!("{:.1}", i.fat_per_100g),
            estimated: if i.estimated.any() {
                i.estimated.names().join(", ")
            } else {
                "-".into()
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[derive(Serialize)]
struct CompletedPool {
    ingredients: Vec<Ingredient>,
    summary: CompletionSummary,
}

pub(crate) fn cmd_complete(file: &Path, json: bool) -> Result<()> {
    let pool = load_pool(file)?;
    let (ingredients, summary) = complete_pool(&pool);

    if json {
        return print_json(&CompletedPool {
            ingredients,
            summary,
        });
    }

    print_pool_table(&ingredients);
    println!(
        "{} foods, {} with estimated values",
        summary.total, summary.estimated
    );
    print_diagnostics(&summary.diagnostics);
    Ok(())
}

/// Realizable recipes of `slot` for a completed pool.
fn realizable<'a>(catalog: &'a RecipeCatalog, slot: MealSlot, pool: &[Ingredient]) -> Vec<&'a Recipe> {
    let (completed, _) = complete_pool(pool);
    select_realizable_recipes(catalog, slot, &completed)
}

pub(crate) fn cmd_recipes(
    config: &Config,
    slot: &str,
    pool: Option<&Path>,
    json: bool,
) -> Result<()> {
    let slot = parse_slot(slot)?;
    let path = match pool {
        Some(p) => p.to_path_buf(),
        None => require_file(config.pool_path(slot), &format!("{} food list", slot.label_fr()))?,
    };
    let ingredients = load_pool(&path)?;
    let catalog = RecipeCatalog::builtin();
    let recipes = realizable(&catalog, slot, &ingredients);

    if recipes.is_empty() {
        let message = format!("No realizable {} recipe for {}", slot.label_fr(), path.display());
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if json {
        return print_json(&recipes);
    }

    for recipe in &recipes {
        println!("{}: {}", recipe.name, recipe.ingredients.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realizable_from_csv_pool() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("petit_dejeuner.csv");
        std::fs::write(
            &path,
            "Nom,Énergie,Protéines,Glucides,Lipides\nOeufs frais,145,12,1,10\nBeurre doux,740,\"0,7\",\"0,6\",82\n",
        )
        .unwrap();
        let pool = load_pool(&path).unwrap();
        let catalog = RecipeCatalog::builtin();
        let names: Vec<&str> = realizable(&catalog, MealSlot::Breakfast, &pool)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Omelette nature"]);
    }

    #[test]
    fn test_complete_json_pool() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("diner.json");
        std::fs::write(&path, r#"[{"nom": "Saumon"}, {"nom": "Kiwi", "energie": 61}]"#).unwrap();
        let (completed, summary) = complete_pool(&load_pool(&path).unwrap());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.estimated, 2);
        assert!(completed[0].calories_per_100g > 0.0);
        cmd_complete(&path, true).unwrap();
    }

    #[test]
    fn test_recipes_without_default_pool() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        let err = cmd_recipes(&config, "diner", None, false).unwrap_err();
        assert!(err.to_string().contains("diner food list"));
    }
}
