//! Matching of generic recipe terms ("poisson blanc", "oeufs") against the
//! food names of a practitioner list ("Cabillaud, filet cru", "Oeuf entier").
//!
//! The predicate is boolean: equal after normalization, substring in either
//! direction, or both names listed under the same synonym entry.

use crate::models::Ingredient;

/// Groups of names that stand for the same ingredient in a recipe.
///
/// Entries are written in normalized form. A name belongs to an entry when it
/// contains the head or one of the variants as whole words.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("oeufs", &["oeuf", "jaune d oeuf", "blanc d oeuf"]),
    (
        "poisson blanc",
        &["cabillaud", "colin", "merlu", "lieu noir", "sole", "merlan", "limande"],
    ),
    ("viande hachee", &["boeuf hache", "steak hache", "hache de boeuf"]),
    ("boeuf", &["steak", "bavette", "rumsteck", "entrecote", "paleron"]),
    ("poulet", &["volaille", "blanc de poulet", "filet de poulet"]),
    (
        "fromage",
        &[
            "emmental", "comte", "gruyere", "mozzarella", "chevre", "parmesan", "feta",
        ],
    ),
    (
        "pates",
        &[
            "spaghetti",
            "spaghettis",
            "tagliatelles",
            "penne",
            "macaronis",
            "coquillettes",
            "fusilli",
        ],
    ),
    ("pain", &["baguette", "pain de mie", "pain complet"]),
    ("salade", &["laitue", "mache", "roquette", "mesclun"]),
    (
        "herbes",
        &["persil", "basilic", "ciboulette", "coriandre", "thym", "aneth"],
    ),
    ("huile d olive", &["huile olive", "huile vierge"]),
    (
        "lait",
        &["lait demi ecreme", "lait ecreme", "lait entier", "boisson vegetale"],
    ),
    ("pommes de terre", &["pomme de terre", "patate", "patates"]),
    ("flocons d avoine", &["avoine", "porridge"]),
    (
        "fruits secs",
        &["raisins secs", "abricots secs", "dattes", "pruneaux"],
    ),
    ("noix", &["amandes", "noisettes", "noix de cajou"]),
    ("lardons", &["bacon", "poitrine fumee"]),
    ("tomates", &["tomate", "tomates cerises", "coulis de tomate"]),
    ("carottes", &["carotte"]),
    ("courgettes", &["courgette"]),
    ("epinards", &["epinard"]),
    ("legumes", &["legume", "poelee de legumes", "julienne de legumes"]),
    ("potiron", &["citrouille", "courge", "butternut", "potimarron"]),
    ("confiture", &["marmelade", "gelee de fruits"]),
    ("citron", &["jus de citron", "citron vert"]),
    ("creme fraiche", &["creme", "creme legere"]),
    ("haricots verts", &["haricot vert"]),
    ("oignon", &["oignons", "echalote", "echalotes"]),
    ("poivrons", &["poivron"]),
    ("poireaux", &["poireau"]),
];

/// Lowercase, fold French accents, turn apostrophes and punctuation into
/// spaces and collapse runs of whitespace.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'â' | 'ä' | 'á' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'î' | 'ï' | 'í' => folded.push('i'),
            'ô' | 'ö' | 'ó' => folded.push('o'),
            'ù' | 'û' | 'ü' | 'ú' => folded.push('u'),
            'ç' => folded.push('c'),
            'ÿ' => folded.push('y'),
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            c if c.is_alphanumeric() => folded.push(c),
            _ => folded.push(' '),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word containment on normalized strings.
#[must_use]
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && format!(" {haystack} ").contains(&format!(" {needle} "))
}

fn synonym_group(name: &str) -> impl Iterator<Item = usize> + '_ {
    SYNONYMS
        .iter()
        .enumerate()
        .filter(move |(_, (head, variants))| {
            contains_phrase(name, head) || variants.iter().any(|v| contains_phrase(name, v))
        })
        .map(|(idx, _)| idx)
}

fn normalized_match(term: &str, available: &str) -> bool {
    if term.is_empty() || available.is_empty() {
        return false;
    }
    if term == available || term.contains(available) || available.contains(term) {
        return true;
    }
    synonym_group(term).any(|group| synonym_group(available).any(|other| other == group))
}

/// Does the available food satisfy the recipe term?
#[must_use]
pub fn matches(recipe_term: &str, available_name: &str) -> bool {
    normalized_match(&normalize(recipe_term), &normalize(available_name))
}

/// First food of the pool, in pool order, that satisfies `term`.
#[must_use]
pub fn find_match<'a>(term: &str, pool: &'a [Ingredient]) -> Option<&'a Ingredient> {
    let term = normalize(term);
    pool.iter()
        .find(|ingredient| normalized_match(&term, &normalize(&ingredient.name)))
}
