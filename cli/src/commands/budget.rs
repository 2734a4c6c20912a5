use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use assiette_core::energy::{EnergyBudget, MacroTargets, compute_budget};
use assiette_core::models::{Diagnostic, Profile, ProfileInput};

use super::helpers::{print_diagnostics, print_json, read_profile};

pub(crate) struct BudgetArgs {
    pub profile: Option<PathBuf>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<f64>,
    pub sex: Option<String>,
    pub activity: Option<String>,
    pub objective: Option<String>,
}

impl BudgetArgs {
    fn profile_input(&self) -> Result<ProfileInput> {
        let mut input = match &self.profile {
            Some(path) => read_profile(path)?,
            None => ProfileInput::default(),
        };
        input.poids = self.weight.or(input.poids);
        input.taille = self.height.or(input.taille);
        input.age = self.age.or(input.age);
        if self.sex.is_some() {
            input.genre.clone_from(&self.sex);
        }
        if self.activity.is_some() {
            input.activite_physique.clone_from(&self.activity);
        }
        if self.objective.is_some() {
            input.objectif.clone_from(&self.objective);
        }
        Ok(input)
    }
}

#[derive(Serialize)]
struct BudgetReport {
    profile: Profile,
    budget: EnergyBudget,
    macros: MacroTargets,
    diagnostics: Vec<Diagnostic>,
}

pub(crate) fn cmd_budget(args: &BudgetArgs, json: bool) -> Result<()> {
    let (profile, diagnostics) = args.profile_input()?.normalize();
    let budget = compute_budget(&profile)?;
    let macros = MacroTargets::for_objective(budget.daily_calories, profile.objective);

    if json {
        return print_json(&BudgetReport {
            profile,
            budget,
            macros,
            diagnostics,
        });
    }

    print_diagnostics(&diagnostics);
    println!("BMR:            {} kcal", budget.bmr);
    println!("TDEE:           {} kcal", budget.tdee);
    println!("Daily calories: {} kcal", budget.daily_calories);
    println!(
        "Protein: {}% ({}g)  Carbs: {}% ({}g)  Fat: {}% ({}g)",
        macros.protein_pct,
        macros.protein_g,
        macros.carbs_pct,
        macros.carbs_g,
        macros.fat_pct,
        macros.fat_g
    );
    Ok(())
}
