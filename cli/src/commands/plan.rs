use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use assiette_core::models::{Category, MealSlot};
use assiette_core::planner::{
    DayPlan, MealPlan, MealPlanner, PlanRequest, SlotPools, TargetResolution, WeekPlan,
};
use assiette_core::pool_import::load_pool;
use assiette_core::selector::{RandomSource, RngSource};
use assiette_core::shopping::{ShoppingList, shopping_list};

use super::helpers::{
    meal_title, parse_slot, parse_start, print_diagnostics, print_json, print_meal_table,
    read_document, read_profile, today, truncate,
};
use crate::config::Config;

pub(crate) struct PlanArgs {
    pub profile: PathBuf,
    pub slot: Option<String>,
    pub week: bool,
    pub shopping: bool,
    pub fasting: bool,
    pub seed: Option<u64>,
    pub document: Option<PathBuf>,
    pub start: Option<String>,
}

/// Food lists from the data directory. A slot without a file gets an empty
/// list and the planner reports it.
fn load_pools(config: &Config) -> Result<SlotPools> {
    let mut pools = SlotPools::default();
    for slot in MealSlot::ALL {
        if let Some(path) = config.pool_path(slot) {
            pools.set(slot, load_pool(&path)?);
        }
    }
    Ok(pools)
}

fn build_request(config: &Config, args: &PlanArgs) -> Result<PlanRequest> {
    Ok(PlanRequest {
        profile: read_profile(&args.profile)?,
        pools: load_pools(config)?,
        document: read_document(args.document.as_deref(), config.document_path())?,
        intermittent_fasting: args.fasting,
    })
}

fn print_target(target: &TargetResolution) {
    println!(
        "Daily target: {} kcal (BMR {}, TDEE {})",
        target.daily_calories(),
        target.budget.bmr,
        target.budget.tdee
    );
    if target.reconciliation.applied_rule.is_some() {
        println!("{}", target.reconciliation.explanation);
    }
}

fn print_day(day: &DayPlan) {
    if let (Some(label), Some(date)) = (&day.label, day.date) {
        println!("\n== {label} {date} ==");
    }
    for meal in &day.meals {
        print_meal_table(meal);
    }
    println!(
        "Total: {} / {} kcal",
        day.total_calories, day.target_calories
    );
}

fn print_week_summary(days: &[DayPlan]) {
    for day in days {
        let label = day.label.as_deref().unwrap_or("-");
        let meals: Vec<String> = day.meals.iter().map(meal_title).collect();
        println!("{label}: {}", meals.join(" | "));
    }
}

#[derive(Serialize)]
struct WeekWithShopping<'a> {
    #[serde(flatten)]
    plan: &'a MealPlan<WeekPlan>,
    shopping_list: &'a ShoppingList,
}

fn aisle(category: Category) -> &'static str {
    match category {
        Category::Vegetable => "Légumes",
        Category::Legume => "Légumineuses",
        Category::Grain => "Céréales et féculents",
        Category::Fruit => "Fruits",
        Category::Dairy => "Produits laitiers",
        Category::Meat => "Viandes",
        Category::Fish => "Poissons",
        Category::Egg => "Oeufs",
        Category::Default | Category::Unclassified => "Divers",
    }
}

fn print_shopping_list(list: &ShoppingList) {
    #[derive(Tabled)]
    struct ShoppingRow {
        #[tabled(rename = "Rayon")]
        aisle: &'static str,
        #[tabled(rename = "Produit")]
        name: String,
        #[tabled(rename = "Quantité")]
        quantity: String,
    }

    println!("\nShopping list ({} items)", list.total_items);
    if list.groups.is_empty() {
        return;
    }
    let rows: Vec<ShoppingRow> = list
        .groups
        .iter()
        .flat_map(|group| {
            group.items.iter().map(move |item| ShoppingRow {
                aisle: aisle(group.category),
                name: truncate(&item.name, 35),
                quantity: item.quantity.clone(),
            })
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn cmd_plan(config: &Config, args: &PlanArgs, json: bool) -> Result<()> {
    let planner = MealPlanner::new(config.planner_config()?)?;
    let request = build_request(config, args)?;
    let mut rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(RngSource::seeded(seed)),
        None => Box::new(RngSource::thread()),
    };

    if let Some(slot) = &args.slot {
        let plan = planner.plan_meal(&request, parse_slot(slot)?, rng.as_mut())?;
        if json {
            return print_json(&plan);
        }
        print_target(&plan.target);
        print_meal_table(&plan.plan);
        print_diagnostics(&plan.diagnostics);
        return Ok(());
    }

    if args.week {
        let start = parse_start(args.start.as_deref(), today())?;
        let plan = planner.generate_week(&request, start, rng.as_mut())?;
        let shopping = args.shopping.then(|| shopping_list(&plan.plan));
        if json {
            return match &shopping {
                Some(list) => print_json(&WeekWithShopping {
                    plan: &plan,
                    shopping_list: list,
                }),
                None => print_json(&plan),
            };
        }
        print_target(&plan.target);
        for day in &plan.plan.days {
            print_day(day);
        }
        println!();
        print_week_summary(&plan.plan.days);
        println!("Weekly average: {} kcal", plan.plan.average_calories);
        if let Some(list) = &shopping {
            print_shopping_list(list);
        }
        print_diagnostics(&plan.diagnostics);
        return Ok(());
    }

    let plan = planner.generate_day(&request, rng.as_mut())?;
    if json {
        return print_json(&plan);
    }
    print_target(&plan.target);
    print_day(&plan.plan);
    print_diagnostics(&plan.diagnostics);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assiette_core::models::Diagnostic;

    fn setup() -> (tempfile::TempDir, Config, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        std::fs::write(
            tmp.path().join("petit_dejeuner.csv"),
            "nom,energie,proteines,glucides,lipides\nOeufs,145,12,1,10\nBeurre,740,0.7,0.6,82\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("dejeuner.json"),
            r#"[{"nom": "Poulet", "energie": 165, "proteines": 31, "lipides": 3.6},
                {"nom": "Riz", "energie": 130, "proteines": 2.7, "glucides": 28, "lipides": 0.3},
                {"nom": "Huile d'olive", "energie": 900, "lipides": 100}]"#,
        )
        .unwrap();
        let profile = tmp.path().join("profil.json");
        std::fs::write(
            &profile,
            r#"{"poids": 80, "taille": 175, "age": 30, "genre": "homme",
                "activitePhysique": "sedentaire", "objectif": "perte"}"#,
        )
        .unwrap();
        (tmp, config, profile)
    }

    fn args(profile: PathBuf) -> PlanArgs {
        PlanArgs {
            profile,
            slot: None,
            week: false,
            shopping: false,
            fasting: false,
            seed: Some(7),
            document: None,
            start: None,
        }
    }

    #[test]
    fn test_request_from_data_dir() {
        let (_tmp, config, profile) = setup();
        let request = build_request(&config, &args(profile)).unwrap();
        assert_eq!(request.pools.breakfast.len(), 2);
        assert_eq!(request.pools.lunch.len(), 3);
        assert!(request.pools.dinner.is_empty());
        assert!(request.document.is_empty());
    }

    #[test]
    fn test_day_plan_with_missing_dinner_list() {
        let (_tmp, config, profile) = setup();
        let planner = MealPlanner::default();
        let request = build_request(&config, &args(profile)).unwrap();
        let plan = planner
            .generate_day(&request, &mut RngSource::seeded(7))
            .unwrap();
        assert_eq!(plan.plan.meals.len(), 3);
        assert!(plan.plan.meals[2].items.is_empty());
        assert!(
            plan.diagnostics
                .contains(&Diagnostic::EmptyPool { slot: MealSlot::Dinner })
        );
    }

    #[test]
    fn test_cmd_plan_variants() {
        let (_tmp, config, profile) = setup();
        cmd_plan(&config, &args(profile.clone()), true).unwrap();

        let mut week = args(profile.clone());
        week.week = true;
        week.start = Some("2026-10-19".into());
        cmd_plan(&config, &week, false).unwrap();
        week.shopping = true;
        cmd_plan(&config, &week, false).unwrap();
        cmd_plan(&config, &week, true).unwrap();

        let mut meal = args(profile);
        meal.slot = Some("dejeuner".into());
        meal.fasting = true;
        cmd_plan(&config, &meal, true).unwrap();
    }

    #[test]
    fn test_week_shopping_list_covers_every_item() {
        let (_tmp, config, profile) = setup();
        let planner = MealPlanner::default();
        let request = build_request(&config, &args(profile)).unwrap();
        let monday = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let plan = planner
            .generate_week(&request, monday, &mut RngSource::seeded(3))
            .unwrap();
        let list = shopping_list(&plan.plan);

        let planned: i64 = plan
            .plan
            .days
            .iter()
            .flat_map(|d| &d.meals)
            .flat_map(|m| &m.items)
            .map(|i| i.grams)
            .sum();
        let listed: i64 = list
            .groups
            .iter()
            .flat_map(|g| &g.items)
            .map(|i| i.grams)
            .sum();
        assert!(planned > 0);
        assert_eq!(listed, planned);
        assert_eq!(list.week_start, Some(monday));
        assert!(list.groups.iter().all(|g| {
            g.items.windows(2).all(|w| w[0].grams >= w[1].grams)
        }));
    }

    #[test]
    fn test_cmd_plan_missing_profile_field() {
        let (tmp, config, _) = setup();
        let profile = tmp.path().join("incomplet.json");
        std::fs::write(&profile, r#"{"poids": 80, "age": 30}"#).unwrap();
        let err = cmd_plan(&config, &args(profile), false).unwrap_err();
        assert!(format!("{err:#}").contains("height"));
    }
}
