//! Calorie constraints mined from practitioner documents.
//!
//! The text is cut into sentences and each sentence is run through an
//! ordered grammar of calorie matchers. The first matcher that fires decides
//! the rule; a second, independent grammar looks for a duration window.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Maximum,
    Exact,
    Range,
}

/// Calorie phrasings, listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaloriePattern {
    /// "1500 kcal par jour", "1500 kcal/jour"
    PerDay,
    /// "limite de 1500 kcal"
    Limit,
    /// "maximum 1500 kcal"
    Maximum,
    /// "ne pas dépasser 1500 kcal"
    DoNotExceed,
    /// "entre 1400 et 1600 kcal"
    RangeBetween,
    /// "1400 à 1600 kcal"
    RangeTo,
    /// "consommer environ 1500 kcal"
    Consume,
    /// "apport calorique de 1500 kcal"
    Intake,
}

impl CaloriePattern {
    pub const PRIORITY: [CaloriePattern; 8] = [
        CaloriePattern::PerDay,
        CaloriePattern::Limit,
        CaloriePattern::Maximum,
        CaloriePattern::DoNotExceed,
        CaloriePattern::RangeBetween,
        CaloriePattern::RangeTo,
        CaloriePattern::Consume,
        CaloriePattern::Intake,
    ];

    fn source(self) -> &'static str {
        match self {
            CaloriePattern::PerDay => r"([0-9]{3,4})\s*(?:kcal|calories)\s*(?:par|/)\s*jour",
            CaloriePattern::Limit => r"limite\s*(?:de)?\s*([0-9]{3,4})\s*(?:kcal|calories)",
            CaloriePattern::Maximum => r"maximum\s*(?:de)?\s*([0-9]{3,4})\s*(?:kcal|calories)",
            CaloriePattern::DoNotExceed => {
                r"ne\s*pas\s*d[ée]passer\s*([0-9]{3,4})\s*(?:kcal|calories)"
            }
            CaloriePattern::RangeBetween => {
                r"entre\s*([0-9]{3,4})\s*et\s*([0-9]{3,4})\s*(?:kcal|calories)"
            }
            CaloriePattern::RangeTo => r"([0-9]{3,4})\s*à\s*([0-9]{3,4})\s*(?:kcal|calories)",
            CaloriePattern::Consume => {
                r"consommer\s*(?:environ)?\s*([0-9]{3,4})\s*(?:kcal|calories)"
            }
            CaloriePattern::Intake => {
                r"apport\s*(?:de|calorique)?\s*(?:de)?\s*([0-9]{3,4})\s*(?:kcal|calories)"
            }
        }
    }

    #[must_use]
    pub fn is_range(self) -> bool {
        matches!(self, CaloriePattern::RangeBetween | CaloriePattern::RangeTo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Weeks,
    Days,
}

/// Duration phrasings, listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DurationPattern {
    During,
    Throughout,
    TheFirstWeeks,
    FirstWeeks,
    ForDays,
    Phase,
}

impl DurationPattern {
    const PRIORITY: [DurationPattern; 6] = [
        DurationPattern::During,
        DurationPattern::Throughout,
        DurationPattern::TheFirstWeeks,
        DurationPattern::FirstWeeks,
        DurationPattern::ForDays,
        DurationPattern::Phase,
    ];

    fn source(self) -> &'static str {
        match self {
            DurationPattern::During => {
                r"pendant\s*(?:les)?\s*([0-9]+)\s*(?:premi[èe]res?)?\s*semaines?"
            }
            DurationPattern::Throughout => {
                r"durant\s*(?:les)?\s*([0-9]+)\s*(?:premi[èe]res?)?\s*semaines?"
            }
            DurationPattern::TheFirstWeeks => r"les\s*([0-9]+)\s*premi[èe]res?\s*semaines?",
            DurationPattern::FirstWeeks => r"([0-9]+)\s*premi[èe]res?\s*semaines?",
            DurationPattern::ForDays => r"pour\s*([0-9]+)\s*jours?",
            DurationPattern::Phase => r"phase\s*de\s*([0-9]+)\s*semaines?",
        }
    }

    fn unit(self) -> DurationUnit {
        match self {
            DurationPattern::ForDays => DurationUnit::Days,
            _ => DurationUnit::Weeks,
        }
    }
}

/// Structured result of one calorie matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalorieMatch {
    pub pattern: CaloriePattern,
    pub min: i64,
    pub max: Option<i64>,
}

struct Matcher<P> {
    pattern: P,
    regex: Regex,
}

fn compile<P: Copy>(patterns: &[P], source: fn(P) -> &'static str) -> Vec<Matcher<P>> {
    patterns
        .iter()
        .filter_map(|&pattern| {
            Regex::new(source(pattern))
                .ok()
                .map(|regex| Matcher { pattern, regex })
        })
        .collect()
}

static CALORIE_GRAMMAR: LazyLock<Vec<Matcher<CaloriePattern>>> =
    LazyLock::new(|| compile(&CaloriePattern::PRIORITY, CaloriePattern::source));

static DURATION_GRAMMAR: LazyLock<Vec<Matcher<DurationPattern>>> =
    LazyLock::new(|| compile(&DurationPattern::PRIORITY, DurationPattern::source));

static SENTENCE_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[.!?]+").ok());

impl Matcher<CaloriePattern> {
    fn try_match(&self, segment: &str) -> Option<CalorieMatch> {
        let caps = self.regex.captures(segment)?;
        let first = caps.get(1)?.as_str().parse::<i64>().ok()?;
        if self.pattern.is_range() {
            let second = caps.get(2)?.as_str().parse::<i64>().ok()?;
            Some(CalorieMatch {
                pattern: self.pattern,
                min: first,
                max: Some(second),
            })
        } else {
            Some(CalorieMatch {
                pattern: self.pattern,
                min: first,
                max: None,
            })
        }
    }
}

impl Matcher<DurationPattern> {
    fn try_match(&self, segment: &str) -> Option<(u32, DurationUnit)> {
        let caps = self.regex.captures(segment)?;
        let amount = caps.get(1)?.as_str().parse::<u32>().ok()?;
        Some((amount, self.pattern.unit()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalorieRule {
    pub calorie_min: i64,
    pub calorie_max: Option<i64>,
    /// First duration number of the sentence, in `duration_unit`.
    pub duration_weeks: Option<u32>,
    pub duration_unit: Option<DurationUnit>,
    pub source_text: String,
    pub kind: RuleKind,
    pub pattern: CaloriePattern,
}

/// Sentence-like segments of at least 10 characters, trimmed.
#[must_use]
pub fn segments(text: &str) -> Vec<&str> {
    let Some(breaks) = SENTENCE_BREAK.as_ref() else {
        return Vec::new();
    };
    breaks
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() >= 10)
        .collect()
}

/// First calorie phrase of a lowercased segment, in priority order.
#[must_use]
pub fn match_calories(segment: &str) -> Option<CalorieMatch> {
    CALORIE_GRAMMAR.iter().find_map(|m| m.try_match(segment))
}

/// First duration phrase of a lowercased segment, in priority order.
#[must_use]
pub fn match_duration(segment: &str) -> Option<(u32, DurationUnit)> {
    DURATION_GRAMMAR.iter().find_map(|m| m.try_match(segment))
}

/// One rule per qualifying sentence, in document order.
#[must_use]
pub fn extract_rules(text: &str) -> Vec<CalorieRule> {
    let rules: Vec<CalorieRule> = segments(text)
        .into_iter()
        .filter_map(|segment| {
            let lowered = segment.to_lowercase();
            let found = match_calories(&lowered)?;
            let duration = match_duration(&lowered);
            Some(CalorieRule {
                calorie_min: found.min,
                calorie_max: found.max,
                duration_weeks: duration.map(|(amount, _)| amount),
                duration_unit: duration.map(|(_, unit)| unit),
                source_text: segment.to_string(),
                kind: if found.pattern.is_range() {
                    RuleKind::Range
                } else {
                    RuleKind::Maximum
                },
                pattern: found.pattern,
            })
        })
        .collect();

    debug!(count = rules.len(), "extracted calorie rules");
    rules
}
