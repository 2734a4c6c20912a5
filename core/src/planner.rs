use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::RecipeCatalog;
use crate::completion::complete_pool;
use crate::config::PlannerConfig;
use crate::energy::{EnergyBudget, MacroTargets, compute_budget};
use crate::error::Result;
use crate::guidelines::Guidelines;
use crate::models::{
    Diagnostic, GeneratedMeal, Ingredient, MealSlot, MealTarget, Profile, ProfileInput,
};
use crate::portions::{FallbackComposer, RandomPoolComposer, allocate, map_recipe};
use crate::reconcile::{Reconciliation, apply_rules};
use crate::rules::{CalorieRule, extract_rules};
use crate::selector::{RandomSource, pick_one, select_realizable_recipes};

/// Allowed foods per meal slot.
#[derive(Debug, Clone, Default)]
pub struct SlotPools {
    pub breakfast: Vec<Ingredient>,
    pub lunch: Vec<Ingredient>,
    pub dinner: Vec<Ingredient>,
}

impl SlotPools {
    #[must_use]
    pub fn get(&self, slot: MealSlot) -> &[Ingredient] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn set(&mut self, slot: MealSlot, pool: Vec<Ingredient>) {
        match slot {
            MealSlot::Breakfast => self.breakfast = pool,
            MealSlot::Lunch => self.lunch = pool,
            MealSlot::Dinner => self.dinner = pool,
        }
    }
}

/// Everything a generation call needs.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub profile: ProfileInput,
    pub pools: SlotPools,
    /// Plain text of the practitioner documents, possibly empty.
    pub document: String,
    pub intermittent_fasting: bool,
}

/// Budget, rules and the effective daily calories they lead to.
#[derive(Debug, Clone, Serialize)]
pub struct TargetResolution {
    pub profile: Profile,
    pub budget: EnergyBudget,
    pub rules: Vec<CalorieRule>,
    pub reconciliation: Reconciliation,
    pub macros: MacroTargets,
    pub guidelines: Guidelines,
}

impl TargetResolution {
    #[must_use]
    pub fn daily_calories(&self) -> i64 {
        self.reconciliation.calories
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealOutcome {
    pub meal: GeneratedMeal,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub target_calories: i64,
    pub total_calories: i64,
    pub meals: Vec<GeneratedMeal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekPlan {
    pub days: Vec<DayPlan>,
    pub average_calories: i64,
}

/// A generated meal, day or week with the targets it was built for.
#[derive(Debug, Clone, Serialize)]
pub struct MealPlan<T> {
    pub generated_at: DateTime<Utc>,
    pub target: TargetResolution,
    pub plan: T,
    pub diagnostics: Vec<Diagnostic>,
}

/// French weekday name.
#[must_use]
pub fn weekday_fr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

fn push_unique(into: &mut Vec<Diagnostic>, from: Vec<Diagnostic>) {
    for diagnostic in from {
        if !into.contains(&diagnostic) {
            into.push(diagnostic);
        }
    }
}

/// Turns a profile, food lists and practitioner text into meals.
pub struct MealPlanner {
    catalog: RecipeCatalog,
    config: PlannerConfig,
    fallback: Box<dyn FallbackComposer>,
}

impl Default for MealPlanner {
    fn default() -> Self {
        let config = PlannerConfig::default();
        Self {
            catalog: RecipeCatalog::builtin(),
            fallback: Box::new(RandomPoolComposer::new(config.fallback)),
            config,
        }
    }
}

impl MealPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: RecipeCatalog::builtin(),
            fallback: Box::new(RandomPoolComposer::new(config.fallback)),
            config,
        })
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: RecipeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn FallbackComposer>) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Budget → rules → reconciliation → macros.
    pub fn resolve_target(&self, profile: &Profile, document: &str) -> Result<TargetResolution> {
        let budget = compute_budget(profile)?;
        let rules = extract_rules(document);
        let reconciliation = apply_rules(budget.daily_calories, &rules);
        let macros = MacroTargets::for_objective(reconciliation.calories, profile.objective);
        let guidelines = Guidelines::extract(document);

        info!(
            bmr = budget.bmr,
            tdee = budget.tdee,
            computed = budget.daily_calories,
            effective = reconciliation.calories,
            rules = rules.len(),
            "resolved daily calorie target"
        );

        Ok(TargetResolution {
            profile: profile.clone(),
            budget,
            rules,
            reconciliation,
            macros,
            guidelines,
        })
    }

    /// Completion → filtering → selection → allocation, falling back to the
    /// food list when no recipe is realizable.
    pub fn generate_meal(
        &self,
        slot: MealSlot,
        pool: &[Ingredient],
        calories: i64,
        guidelines: &Guidelines,
        used_today: &[String],
        rng: &mut dyn RandomSource,
    ) -> MealOutcome {
        let target = MealTarget { calories, slot };
        let (completed, summary) = complete_pool(pool);
        let mut diagnostics = summary.diagnostics;

        let (allowed, filtered) = guidelines.filter_pool(&completed);
        if !filtered {
            diagnostics.push(Diagnostic::ForbiddenFoodsIgnored { slot });
        }

        let realizable = select_realizable_recipes(&self.catalog, slot, &allowed);
        let meal = if let Some(recipe) = pick_one(&realizable, rng) {
            info!(slot = slot.as_str(), recipe = %recipe.name, "picked recipe");
            let mapped = map_recipe(recipe, &allowed);
            allocate(
                target,
                Some(&recipe.name),
                &mapped,
                self.config.recipe_portions,
            )
        } else {
            warn!(
                slot = slot.as_str(),
                "no realizable recipe, composing from the food list"
            );
            diagnostics.push(Diagnostic::NoRealizableRecipe { slot });
            self.fallback
                .compose(&allowed, target, used_today, rng)
                .unwrap_or_else(|| {
                    warn!(slot = slot.as_str(), "empty food list, meal left empty");
                    diagnostics.push(Diagnostic::EmptyPool { slot });
                    GeneratedMeal::empty(target)
                })
        };

        diagnostics.extend(guidelines.audit(&meal));
        MealOutcome { meal, diagnostics }
    }

    /// Per-slot calories for the day: `round(daily × share)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slot_targets(&self, daily_calories: i64, fasting: bool) -> Vec<(MealSlot, i64)> {
        let distribution = self.config.distribution_for(fasting);
        distribution
            .active_slots()
            .into_iter()
            .map(|slot| {
                let share = distribution.share(slot);
                (slot, (daily_calories as f64 * share).round() as i64)
            })
            .collect()
    }

    fn build_day(
        &self,
        target: &TargetResolution,
        request: &PlanRequest,
        rng: &mut dyn RandomSource,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> DayPlan {
        let mut used_today: Vec<String> = Vec::new();
        let mut meals = Vec::new();

        for (slot, calories) in
            self.slot_targets(target.daily_calories(), request.intermittent_fasting)
        {
            let outcome = self.generate_meal(
                slot,
                request.pools.get(slot),
                calories,
                &target.guidelines,
                &used_today,
                rng,
            );
            used_today.extend(
                outcome
                    .meal
                    .items
                    .iter()
                    .map(|item| item.ingredient_name.clone()),
            );
            push_unique(diagnostics, outcome.diagnostics);
            meals.push(outcome.meal);
        }

        DayPlan {
            label: None,
            date: None,
            target_calories: target.daily_calories(),
            total_calories: meals.iter().map(|m| m.totals.calories).sum(),
            meals,
        }
    }

    fn prepare(&self, request: &PlanRequest) -> Result<(TargetResolution, Vec<Diagnostic>)> {
        let (profile, diagnostics) = request.profile.normalize();
        let target = self.resolve_target(&profile, &request.document)?;
        Ok((target, diagnostics))
    }

    /// One meal for one slot, sized from the day's distribution.
    pub fn plan_meal(
        &self,
        request: &PlanRequest,
        slot: MealSlot,
        rng: &mut dyn RandomSource,
    ) -> Result<MealPlan<GeneratedMeal>> {
        let (target, mut diagnostics) = self.prepare(request)?;
        let calories = self
            .slot_targets(target.daily_calories(), request.intermittent_fasting)
            .into_iter()
            .find_map(|(s, calories)| (s == slot).then_some(calories));

        let meal = if let Some(calories) = calories {
            let outcome = self.generate_meal(
                slot,
                request.pools.get(slot),
                calories,
                &target.guidelines,
                &[],
                rng,
            );
            push_unique(&mut diagnostics, outcome.diagnostics);
            outcome.meal
        } else {
            info!(slot = slot.as_str(), "slot outside the distribution, skipped");
            diagnostics.push(Diagnostic::SlotSkipped { slot });
            GeneratedMeal::empty(MealTarget { calories: 0, slot })
        };

        Ok(MealPlan {
            generated_at: Utc::now(),
            target,
            plan: meal,
            diagnostics,
        })
    }

    pub fn generate_day(
        &self,
        request: &PlanRequest,
        rng: &mut dyn RandomSource,
    ) -> Result<MealPlan<DayPlan>> {
        let (target, mut diagnostics) = self.prepare(request)?;
        let day = self.build_day(&target, request, rng, &mut diagnostics);
        Ok(MealPlan {
            generated_at: Utc::now(),
            target,
            plan: day,
            diagnostics,
        })
    }

    /// Seven consecutive days starting at `start`.
    pub fn generate_week(
        &self,
        request: &PlanRequest,
        start: NaiveDate,
        rng: &mut dyn RandomSource,
    ) -> Result<MealPlan<WeekPlan>> {
        let (target, mut diagnostics) = self.prepare(request)?;
        let mut days = Vec::with_capacity(7);
        for offset in 0..7 {
            let date = start.checked_add_days(Days::new(offset));
            let mut day = self.build_day(&target, request, rng, &mut diagnostics);
            day.label = date.map(|d| weekday_fr(d.weekday()).to_string());
            day.date = date;
            days.push(day);
        }
        let average_calories = days.iter().map(|d| d.total_calories).sum::<i64>() / 7;
        Ok(MealPlan {
            generated_at: Utc::now(),
            target,
            plan: WeekPlan {
                days,
                average_calories,
            },
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::models::{MealSource, Objective};
    use crate::selector::{RngSource, SequenceSource};

    fn profile() -> ProfileInput {
        ProfileInput {
            poids: Some(80.0),
            taille: Some(175.0),
            age: Some(30.0),
            genre: Some("homme".into()),
            activite_physique: Some("sedentaire".into()),
            objectif: Some("perte".into()),
            ..ProfileInput::default()
        }
    }

    fn pools() -> SlotPools {
        SlotPools {
            breakfast: vec![
                Ingredient::new("Oeufs", 145.0, 12.0, 1.0, 10.0),
                Ingredient::new("Beurre", 740.0, 0.7, 0.6, 82.0),
            ],
            lunch: vec![
                Ingredient::new("Poulet", 165.0, 31.0, 0.0, 3.6),
                Ingredient::new("Riz", 130.0, 2.7, 28.0, 0.3),
                Ingredient::new("Huile d'olive", 900.0, 0.0, 0.0, 100.0),
            ],
            dinner: vec![
                Ingredient::new("Kiwi", 61.0, 1.1, 15.0, 0.5),
                Ingredient::new("Amandes", 579.0, 21.0, 22.0, 50.0),
                Ingredient::new("Lentilles", 116.0, 9.0, 20.0, 0.4),
            ],
        }
    }

    fn request() -> PlanRequest {
        PlanRequest {
            profile: profile(),
            pools: pools(),
            document: String::new(),
            intermittent_fasting: false,
        }
    }

    #[test]
    fn test_resolve_target_with_rule() {
        let planner = MealPlanner::default();
        let (p, _) = profile().normalize();
        let target = planner
            .resolve_target(
                &p,
                "Limite de 1500 kcal par jour pendant les 3 premières semaines.",
            )
            .unwrap();
        assert_eq!(target.budget.daily_calories, 1867);
        assert_eq!(target.rules.len(), 1);
        assert_eq!(target.daily_calories(), 1500);
        assert_eq!(target.macros.calories, 1500);
        assert_eq!(target.profile.objective, Objective::Reduce);
    }

    #[test]
    fn test_missing_biometrics_blocks_generation() {
        let planner = MealPlanner::default();
        let mut req = request();
        req.profile.taille = None;
        let err = planner
            .generate_day(&req, &mut SequenceSource::new(vec![0]))
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::MissingBiometricData { field: "height", .. }
        ));
    }

    #[test]
    fn test_generate_day_recipe_and_fallback() {
        let planner = MealPlanner::default();
        let plan = planner
            .generate_day(&request(), &mut RngSource::seeded(11))
            .unwrap();
        let meals = &plan.plan.meals;
        assert_eq!(meals.len(), 3);

        assert_eq!(meals[0].recipe_name.as_deref(), Some("Omelette nature"));
        assert_eq!(meals[0].target_calories, 504);
        assert_eq!(meals[1].recipe_name.as_deref(), Some("Poulet grillé et riz"));
        assert_eq!(meals[1].target_calories, 803);

        // no dinner recipe uses kiwi, almonds or lentils
        assert_eq!(meals[2].source, MealSource::Fallback);
        assert!(meals[2].recipe_name.is_none());
        assert!(!meals[2].items.is_empty());
        assert!(
            plan.diagnostics
                .contains(&Diagnostic::NoRealizableRecipe { slot: MealSlot::Dinner })
        );

        let total: i64 = meals.iter().map(|m| m.totals.calories).sum();
        assert_eq!(plan.plan.total_calories, total);
        assert_eq!(plan.plan.target_calories, 1867);
    }

    #[test]
    fn test_generate_meal_estimates_missing_macros() {
        let planner = MealPlanner::default();
        let pool = vec![
            Ingredient::new("Oeufs", 0.0, 0.0, 0.0, 0.0),
            Ingredient::new("Beurre", 740.0, 0.7, 0.6, 82.0),
        ];
        let outcome = planner.generate_meal(
            MealSlot::Breakfast,
            &pool,
            400,
            &Guidelines::default(),
            &[],
            &mut SequenceSource::new(vec![0]),
        );
        assert_eq!(outcome.meal.source, MealSource::Recipe);
        // 200 kcal of eggs at the egg average of 145 kcal/100g
        assert_eq!(outcome.meal.items[0].grams, 138);
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::IncompleteNutritionData { .. }
        ));
    }

    #[test]
    fn test_generate_meal_empty_pool_is_never_null() {
        let planner = MealPlanner::default();
        let outcome = planner.generate_meal(
            MealSlot::Lunch,
            &[],
            600,
            &Guidelines::default(),
            &[],
            &mut SequenceSource::new(vec![0]),
        );
        assert_eq!(outcome.meal.source, MealSource::Empty);
        assert_eq!(outcome.meal.target_calories, 600);
        assert!(
            outcome
                .diagnostics
                .contains(&Diagnostic::EmptyPool { slot: MealSlot::Lunch })
        );
    }

    #[test]
    fn test_forbidden_food_removes_recipe() {
        let planner = MealPlanner::default();
        let mut req = request();
        req.document = "Éviter le riz pendant le programme.".into();
        let plan = planner
            .plan_meal(&req, MealSlot::Lunch, &mut SequenceSource::new(vec![0]))
            .unwrap();
        assert_eq!(plan.target.guidelines.forbidden_foods, vec!["riz"]);
        assert_eq!(plan.plan.source, MealSource::Fallback);
        assert!(plan.plan.items.iter().all(|i| i.ingredient_name != "Riz"));
    }

    #[test]
    fn test_intermittent_fasting_skips_breakfast() {
        let planner = MealPlanner::default();
        let mut req = request();
        req.intermittent_fasting = true;
        let plan = planner
            .generate_day(&req, &mut RngSource::seeded(5))
            .unwrap();
        let slots: Vec<MealSlot> = plan.plan.meals.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![MealSlot::Lunch, MealSlot::Dinner]);
        assert_eq!(plan.plan.meals[0].target_calories, 1120);
        assert_eq!(plan.plan.meals[1].target_calories, 747);
    }

    #[test]
    fn test_plan_meal_for_skipped_slot_is_empty() {
        let planner = MealPlanner::default();
        let mut req = request();
        req.intermittent_fasting = true;
        let plan = planner
            .plan_meal(&req, MealSlot::Breakfast, &mut RngSource::seeded(5))
            .unwrap();
        assert_eq!(plan.plan.source, MealSource::Empty);
        assert!(plan.plan.items.is_empty());
        assert_eq!(plan.plan.target_calories, 0);
        assert!(plan.plan.deviation.abs() < f64::EPSILON);
        assert!(
            plan.diagnostics
                .contains(&Diagnostic::SlotSkipped { slot: MealSlot::Breakfast })
        );
    }

    #[test]
    fn test_slot_targets() {
        let planner = MealPlanner::default();
        assert_eq!(
            planner.slot_targets(2000, false),
            vec![
                (MealSlot::Breakfast, 540),
                (MealSlot::Lunch, 860),
                (MealSlot::Dinner, 600)
            ]
        );
    }

    #[test]
    fn test_generate_week_labels() {
        let planner = MealPlanner::default();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let plan = planner
            .generate_week(&request(), monday, &mut RngSource::seeded(2))
            .unwrap();
        let labels: Vec<&str> = plan
            .plan
            .days
            .iter()
            .filter_map(|d| d.label.as_deref())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"
            ]
        );
        assert_eq!(
            plan.plan.days[6].date,
            NaiveDate::from_ymd_opt(2026, 10, 25)
        );
        let sum: i64 = plan.plan.days.iter().map(|d| d.total_calories).sum();
        assert_eq!(plan.plan.average_calories, sum / 7);
        // diagnostics are not repeated for every day
        let dinner_fallbacks = plan
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::NoRealizableRecipe { .. }))
            .count();
        assert_eq!(dinner_fallbacks, 1);
    }

    struct FixedComposer;

    impl FallbackComposer for FixedComposer {
        fn compose(
            &self,
            pool: &[Ingredient],
            target: MealTarget,
            _used_today: &[String],
            _rng: &mut dyn RandomSource,
        ) -> Option<GeneratedMeal> {
            let first = pool.first()?;
            Some(allocate(
                target,
                None,
                std::slice::from_ref(first),
                crate::config::PortionBounds {
                    min_g: 1,
                    max_g: 1000,
                },
            ))
        }
    }

    #[test]
    fn test_custom_fallback_composer() {
        let planner = MealPlanner::default().with_fallback(Box::new(FixedComposer));
        let outcome = planner.generate_meal(
            MealSlot::Dinner,
            &pools().dinner,
            610,
            &Guidelines::default(),
            &[],
            &mut SequenceSource::new(vec![0]),
        );
        assert_eq!(outcome.meal.items.len(), 1);
        assert_eq!(outcome.meal.items[0].ingredient_name, "Kiwi");
        assert_eq!(outcome.meal.items[0].grams, 1000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlannerConfig::default();
        config.fallback.min_items = 0;
        assert!(MealPlanner::new(config).is_err());
    }
}
