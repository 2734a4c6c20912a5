use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::matcher::normalize;

// --- Meal slots ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    /// French label, also the stem of the default pool file names.
    #[must_use]
    pub fn label_fr(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "petit_dejeuner",
            MealSlot::Lunch => "dejeuner",
            MealSlot::Dinner => "diner",
        }
    }

    /// Accepts English names and the usual French spellings
    /// ("petit-déjeuner", "déjeuner", "dîner", "soir").
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize(raw);
        if key.starts_with("petit") || key == "breakfast" || key == "matin" {
            Some(MealSlot::Breakfast)
        } else if key.starts_with("dejeuner") || key == "lunch" || key == "midi" {
            Some(MealSlot::Lunch)
        } else if key.starts_with("diner") || key == "dinner" || key == "soir" {
            Some(MealSlot::Dinner)
        } else {
            None
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Profile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "m" | "h" | "homme" | "male" | "masculin" | "man" | "garcon" => Some(Sex::Male),
            "f" | "femme" | "female" | "feminin" | "femenin" | "woman" | "fille" => {
                Some(Sex::Female)
            }
            _ => None,
        }
    }
}

/// Physical activity level with its fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Hard exercise 6-7 days/week
    Intense,
    /// Physical job or twice-daily training
    Extreme,
}

impl ActivityLevel {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "sedentaire" | "sedentary" => Some(ActivityLevel::Sedentary),
            "legere" | "leger" | "light" => Some(ActivityLevel::Light),
            "moderee" | "modere" | "moderate" => Some(ActivityLevel::Moderate),
            "intense" | "active" | "actif" => Some(ActivityLevel::Intense),
            "extreme" | "tres actif" | "very active" => Some(ActivityLevel::Extreme),
            _ => None,
        }
    }

    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Intense => 1.725,
            ActivityLevel::Extreme => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Reduce,
    #[default]
    Maintain,
    Gain,
}

impl Objective {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "perte" | "perte de poids" | "reduce" | "weight loss" | "minceur" => {
                Some(Objective::Reduce)
            }
            "prise" | "prise de masse" | "gain" => Some(Objective::Gain),
            "maintien" | "maintain" | "confort" | "confort digestif" | "vitalite"
            | "equilibre" => Some(Objective::Maintain),
            _ => None,
        }
    }

    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Objective::Reduce => 0.85,
            Objective::Maintain => 1.0,
            Objective::Gain => 1.15,
        }
    }
}

/// Canonical profile consumed by the energy budget calculator.
///
/// Biometrics stay optional here: their absence is reported by
/// [`crate::energy::compute_budget`] as a blocking error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<f64>,
    pub sex: Sex,
    pub activity: ActivityLevel,
    pub objective: Objective,
}

/// Profile as produced by the questionnaire layer, with its loose spellings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default, alias = "weight", deserialize_with = "lenient_f64")]
    pub poids: Option<f64>,
    #[serde(default, alias = "height", deserialize_with = "lenient_f64")]
    pub taille: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub sexe: Option<String>,
    #[serde(default, alias = "sex")]
    pub gender: Option<String>,
    #[serde(default, rename = "activitePhysique")]
    pub activite_physique: Option<String>,
    #[serde(default, alias = "activity")]
    pub activite: Option<String>,
    #[serde(default, alias = "objective")]
    pub objectif: Option<String>,
}

impl ProfileInput {
    /// Map every accepted spelling onto the canonical schema.
    ///
    /// Unknown sex falls back to male, unknown activity to moderate and
    /// unknown objective to maintain; each fallback on a non-empty value
    /// is reported as a diagnostic.
    #[must_use]
    pub fn normalize(&self) -> (Profile, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let sex = match first_non_blank(&[&self.genre, &self.sexe, &self.gender]) {
            Some(raw) => Sex::parse(raw).unwrap_or_else(|| {
                warn!(raw, "unrecognized sex, defaulting to male");
                diagnostics.push(Diagnostic::UnrecognizedSex {
                    raw: raw.to_string(),
                });
                Sex::Male
            }),
            None => {
                warn!("sex not provided, defaulting to male");
                diagnostics.push(Diagnostic::UnrecognizedSex { raw: String::new() });
                Sex::Male
            }
        };

        let activity = match first_non_blank(&[&self.activite_physique, &self.activite]) {
            Some(raw) => ActivityLevel::parse(raw).unwrap_or_else(|| {
                warn!(raw, "unrecognized activity level, defaulting to moderate");
                diagnostics.push(Diagnostic::UnrecognizedActivity {
                    raw: raw.to_string(),
                });
                ActivityLevel::Moderate
            }),
            None => ActivityLevel::Moderate,
        };

        let objective = match non_blank(self.objectif.as_deref()) {
            Some(raw) => Objective::parse(raw).unwrap_or_else(|| {
                warn!(raw, "unrecognized objective, defaulting to maintain");
                diagnostics.push(Diagnostic::UnrecognizedObjective {
                    raw: raw.to_string(),
                });
                Objective::Maintain
            }),
            None => Objective::Maintain,
        };

        let profile = Profile {
            weight_kg: self.poids,
            height_cm: self.taille,
            age_years: self.age,
            sex,
            activity,
            objective,
        };
        (profile, diagnostics)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// First spelling that carries a value; blank fields fall through.
fn first_non_blank<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|value| non_blank(value.as_deref()))
}

/// Parse a number that may use a French decimal comma ("12,5").
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(n)) => Some(n),
            Some(NumberOrText::Text(s)) => parse_decimal(&s),
            None => None,
        },
    )
}

// --- Ingredients ---

/// Food family used to estimate missing macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Meat,
    Fish,
    Vegetable,
    Fruit,
    Grain,
    Dairy,
    Legume,
    Egg,
    Default,
    #[default]
    Unclassified,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meat => "meat",
            Category::Fish => "fish",
            Category::Vegetable => "vegetable",
            Category::Fruit => "fruit",
            Category::Grain => "grain",
            Category::Dairy => "dairy",
            Category::Legume => "legume",
            Category::Egg => "egg",
            Category::Default => "default",
            Category::Unclassified => "unclassified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionSource {
    #[default]
    Provided,
    Estimated,
}

/// Which per-100g fields were filled by estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimatedFields {
    pub calories: bool,
    pub protein: bool,
    pub carbs: bool,
    pub fat: bool,
}

impl EstimatedFields {
    #[must_use]
    pub fn any(self) -> bool {
        self.calories || self.protein || self.carbs || self.fat
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            calories: self.calories || other.calories,
            protein: self.protein || other.protein,
            carbs: self.carbs || other.carbs,
            fat: self.fat || other.fat,
        }
    }

    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        [
            (self.calories, "calories"),
            (self.protein, "protein"),
            (self.carbs, "carbs"),
            (self.fat, "fat"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// One row of a practitioner food list, as the spreadsheet parser emits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIngredient {
    #[serde(alias = "nom")]
    pub name: String,
    #[serde(
        default,
        alias = "calories",
        alias = "calories_per_100g",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub energie: Option<f64>,
    #[serde(
        default,
        alias = "protein",
        alias = "protein_per_100g",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub proteines: Option<f64>,
    #[serde(
        default,
        alias = "carbs",
        alias = "carbs_per_100g",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub glucides: Option<f64>,
    #[serde(
        default,
        alias = "fat",
        alias = "fat_per_100g",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub lipides: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    #[serde(default)]
    pub source: NutritionSource,
    #[serde(default)]
    pub estimated: EstimatedFields,
}

impl Ingredient {
    #[must_use]
    pub fn new(name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            name: name.to_string(),
            category: Category::Unclassified,
            calories_per_100g: calories,
            protein_per_100g: protein,
            carbs_per_100g: carbs,
            fat_per_100g: fat,
            source: NutritionSource::Provided,
            estimated: EstimatedFields::default(),
        }
    }
}

impl From<RawIngredient> for Ingredient {
    fn from(raw: RawIngredient) -> Self {
        Ingredient::new(
            raw.name.trim(),
            raw.energie.unwrap_or(0.0),
            raw.proteines.unwrap_or(0.0),
            raw.glucides.unwrap_or(0.0),
            raw.lipides.unwrap_or(0.0),
        )
    }
}

// --- Generated meals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealTarget {
    pub calories: i64,
    pub slot: MealSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    Recipe,
    Fallback,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealItem {
    pub ingredient_name: String,
    pub grams: i64,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MealItem {
    /// Nutrition for `grams` of `ingredient`: integer kcal, macros to one decimal.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn portion(ingredient: &Ingredient, grams: i64) -> Self {
        let ratio = grams as f64 / 100.0;
        Self {
            ingredient_name: ingredient.name.clone(),
            grams,
            calories: (ingredient.calories_per_100g * ratio).round() as i64,
            protein: round1(ingredient.protein_per_100g * ratio),
            carbs: round1(ingredient.carbs_per_100g * ratio),
            fat: round1(ingredient.fat_per_100g * ratio),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MealTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MealTotals {
    #[must_use]
    pub fn sum(items: &[MealItem]) -> Self {
        let (protein, carbs, fat) = items.iter().fold((0.0, 0.0, 0.0), |(p, c, f), item| {
            (p + item.protein, c + item.carbs, f + item.fat)
        });
        Self {
            calories: items.iter().map(|i| i.calories).sum(),
            protein: round1(protein),
            carbs: round1(carbs),
            fat: round1(fat),
        }
    }
}

/// A concrete meal for one slot.
///
/// Totals are always derived from the items, so the sum of item calories
/// equals `totals.calories` exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMeal {
    pub slot: MealSlot,
    pub recipe_name: Option<String>,
    pub source: MealSource,
    pub target_calories: i64,
    pub items: Vec<MealItem>,
    pub totals: MealTotals,
    pub deviation: f64,
}

impl GeneratedMeal {
    #[must_use]
    pub fn new(
        target: MealTarget,
        recipe_name: Option<String>,
        source: MealSource,
        items: Vec<MealItem>,
    ) -> Self {
        let totals = MealTotals::sum(&items);
        Self {
            slot: target.slot,
            recipe_name,
            source,
            target_calories: target.calories,
            deviation: relative_deviation(totals.calories, target.calories),
            items,
            totals,
        }
    }

    #[must_use]
    pub fn empty(target: MealTarget) -> Self {
        Self::new(target, None, MealSource::Empty, Vec::new())
    }
}

/// `|realized - target| / target`. Without a positive target, any food at
/// all counts as a full miss (1.0) and an empty meal as exact (0.0).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn relative_deviation(realized: i64, target: i64) -> f64 {
    if target <= 0 {
        return if realized > 0 { 1.0 } else { 0.0 };
    }
    (realized - target).abs() as f64 / target as f64
}

#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// --- Diagnostics ---

/// Non-blocking conditions met while planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnrecognizedSex {
        raw: String,
    },
    UnrecognizedActivity {
        raw: String,
    },
    UnrecognizedObjective {
        raw: String,
    },
    IncompleteNutritionData {
        ingredient: String,
        category: Category,
        fields: Vec<&'static str>,
    },
    NoRealizableRecipe {
        slot: MealSlot,
    },
    EmptyPool {
        slot: MealSlot,
    },
    SlotSkipped {
        slot: MealSlot,
    },
    ForbiddenFoodsIgnored {
        slot: MealSlot,
    },
    GuidelineViolation {
        slot: MealSlot,
        food: String,
        grams: i64,
        limit: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedSex { raw } if raw.is_empty() => {
                write!(f, "sex not provided, assumed male")
            }
            Diagnostic::UnrecognizedSex { raw } => {
                write!(f, "unrecognized sex '{raw}', assumed male")
            }
            Diagnostic::UnrecognizedActivity { raw } => {
                write!(f, "unrecognized activity '{raw}', assumed moderate")
            }
            Diagnostic::UnrecognizedObjective { raw } => {
                write!(f, "unrecognized objective '{raw}', assumed maintain")
            }
            Diagnostic::IncompleteNutritionData {
                ingredient,
                category,
                fields,
            } => write!(
                f,
                "{ingredient}: estimated {} from {} averages",
                fields.join(", "),
                category.as_str()
            ),
            Diagnostic::NoRealizableRecipe { slot } => {
                write!(f, "{slot}: no realizable recipe, composed from the food list")
            }
            Diagnostic::EmptyPool { slot } => write!(f, "{slot}: food list is empty"),
            Diagnostic::SlotSkipped { slot } => {
                write!(f, "{slot}: not part of the day's distribution, meal skipped")
            }
            Diagnostic::ForbiddenFoodsIgnored { slot } => write!(
                f,
                "{slot}: every food is forbidden by the guidelines, list kept as is"
            ),
            Diagnostic::GuidelineViolation {
                slot,
                food,
                grams,
                limit,
            } => write!(f, "{slot}: {food} at {grams} g breaks '{limit}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_slot_parse() {
        assert_eq!(MealSlot::parse("Petit-déjeuner"), Some(MealSlot::Breakfast));
        assert_eq!(MealSlot::parse("déjeuner"), Some(MealSlot::Lunch));
        assert_eq!(MealSlot::parse("Dîner"), Some(MealSlot::Dinner));
        assert_eq!(MealSlot::parse("soir"), Some(MealSlot::Dinner));
        assert_eq!(MealSlot::parse("lunch"), Some(MealSlot::Lunch));
        assert_eq!(MealSlot::parse("goûter"), None);
    }

    #[test]
    fn test_sex_synonyms() {
        for raw in ["homme", "H", "Male", "masculin", "m"] {
            assert_eq!(Sex::parse(raw), Some(Sex::Male), "{raw}");
        }
        for raw in ["femme", "F", "female", "Féminin", "femenin"] {
            assert_eq!(Sex::parse(raw), Some(Sex::Female), "{raw}");
        }
        assert_eq!(Sex::parse("autre"), None);
    }

    #[test]
    fn test_activity_and_objective_parse() {
        assert_eq!(
            ActivityLevel::parse("Sédentaire"),
            Some(ActivityLevel::Sedentary)
        );
        assert_eq!(ActivityLevel::parse("légère"), Some(ActivityLevel::Light));
        assert_eq!(
            ActivityLevel::parse("tres_actif"),
            Some(ActivityLevel::Extreme)
        );
        assert_eq!(ActivityLevel::parse("marathon"), None);
        assert_eq!(Objective::parse("perte"), Some(Objective::Reduce));
        assert_eq!(Objective::parse("prise"), Some(Objective::Gain));
        assert_eq!(Objective::parse("vitalité"), Some(Objective::Maintain));
        assert_eq!(Objective::parse("confort_digestif"), Some(Objective::Maintain));
    }

    #[test]
    fn test_profile_input_french_spellings() {
        let input: ProfileInput = serde_json::from_str(
            r#"{"poids": 80, "taille": "175", "age": 30, "sexe": "homme",
                "activitePhysique": "sedentaire", "objectif": "perte"}"#,
        )
        .unwrap();
        let (profile, diagnostics) = input.normalize();
        assert!(diagnostics.is_empty());
        assert_eq!(profile.weight_kg, Some(80.0));
        assert_eq!(profile.height_cm, Some(175.0));
        assert_eq!(profile.sex, Sex::Male);
        assert_eq!(profile.activity, ActivityLevel::Sedentary);
        assert_eq!(profile.objective, Objective::Reduce);
    }

    #[test]
    fn test_profile_input_english_spellings_and_decimal_comma() {
        let input: ProfileInput = serde_json::from_str(
            r#"{"weight": "62,5", "height": 165, "age": 41, "gender": "female",
                "activity": "light", "objective": "gain"}"#,
        )
        .unwrap();
        let (profile, diagnostics) = input.normalize();
        assert!(diagnostics.is_empty());
        assert_eq!(profile.weight_kg, Some(62.5));
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.activity, ActivityLevel::Light);
        assert_eq!(profile.objective, Objective::Gain);
    }

    #[test]
    fn test_profile_input_blank_spelling_falls_through() {
        let input: ProfileInput = serde_json::from_str(
            r#"{"poids": 60, "taille": 165, "age": 30, "genre": "", "sexe": "femme",
                "activitePhysique": " ", "activite": "legere"}"#,
        )
        .unwrap();
        let (profile, diagnostics) = input.normalize();
        assert!(diagnostics.is_empty());
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.activity, ActivityLevel::Light);
    }

    #[test]
    fn test_profile_input_first_spelling_wins() {
        let input: ProfileInput =
            serde_json::from_str(r#"{"genre": "homme", "gender": "female"}"#).unwrap();
        assert_eq!(input.normalize().0.sex, Sex::Male);
    }

    #[test]
    fn test_profile_input_unknown_values_fall_back() {
        let input = ProfileInput {
            genre: Some("x".into()),
            activite_physique: Some("marathon".into()),
            objectif: Some("bronzer".into()),
            ..ProfileInput::default()
        };
        let (profile, diagnostics) = input.normalize();
        assert_eq!(profile.sex, Sex::Male);
        assert_eq!(profile.activity, ActivityLevel::Moderate);
        assert_eq!(profile.objective, Objective::Maintain);
        assert_eq!(diagnostics.len(), 3);
        assert!(matches!(diagnostics[0], Diagnostic::UnrecognizedSex { .. }));
        assert!(matches!(
            diagnostics[1],
            Diagnostic::UnrecognizedActivity { .. }
        ));
        assert!(matches!(
            diagnostics[2],
            Diagnostic::UnrecognizedObjective { .. }
        ));
    }

    #[test]
    fn test_profile_input_absent_sex_warns_but_absent_activity_does_not() {
        let (profile, diagnostics) = ProfileInput::default().normalize();
        assert_eq!(profile.sex, Sex::Male);
        assert_eq!(profile.activity, ActivityLevel::Moderate);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnrecognizedSex { raw: String::new() }]
        );
    }

    #[test]
    fn test_raw_ingredient_aliases() {
        let rows: Vec<RawIngredient> = serde_json::from_str(
            r#"[{"nom": "Poulet", "energie": 165, "proteines": 31, "glucides": 0, "lipides": 3.6},
                {"name": "Riz", "calories": "130", "protein": null}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].name, "Poulet");
        assert_eq!(rows[0].energie, Some(165.0));
        assert_eq!(rows[1].energie, Some(130.0));
        assert_eq!(rows[1].proteines, None);

        let riz = Ingredient::from(rows[1].clone());
        assert!((riz.calories_per_100g - 130.0).abs() < 1e-9);
        assert!(riz.protein_per_100g.abs() < 1e-9);
        assert_eq!(riz.category, Category::Unclassified);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal(" 7 "), Some(7.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn test_generated_meal_totals_and_deviation() {
        let poulet = Ingredient::new("Poulet", 165.0, 31.0, 0.0, 3.6);
        let riz = Ingredient::new("Riz", 130.0, 2.7, 28.0, 0.3);
        let items = vec![MealItem::portion(&poulet, 150), MealItem::portion(&riz, 200)];
        let meal = GeneratedMeal::new(
            MealTarget {
                calories: 500,
                slot: MealSlot::Lunch,
            },
            Some("Poulet grillé et riz".into()),
            MealSource::Recipe,
            items,
        );
        // 247.5 -> 248, 260
        assert_eq!(meal.items[0].calories, 248);
        assert_eq!(meal.totals.calories, 508);
        assert!((meal.totals.protein - 51.9).abs() < 1e-9);
        assert!((meal.deviation - 0.016).abs() < 1e-9);
    }

    #[test]
    fn test_relative_deviation_zero_target() {
        assert!((relative_deviation(120, 0) - 1.0).abs() < f64::EPSILON);
        assert!(relative_deviation(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_estimated_fields_names_and_union() {
        let a = EstimatedFields {
            calories: true,
            ..EstimatedFields::default()
        };
        let b = EstimatedFields {
            fat: true,
            ..EstimatedFields::default()
        };
        assert_eq!(a.union(b).names(), vec!["calories", "fat"]);
        assert!(!EstimatedFields::default().any());
    }
}
