use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::matcher::normalize;
use crate::models::{Ingredient, RawIngredient, parse_decimal};

const NAME_HEADERS: &[&str] = &["nom", "name", "aliment", "libelle", "produit"];
const ENERGY_HEADERS: &[&str] = &["energie", "calories", "kcal", "energy"];
const PROTEIN_HEADERS: &[&str] = &["proteines", "protein", "proteins"];
const CARBS_HEADERS: &[&str] = &["glucides", "carbs", "carbohydrates"];
const FAT_HEADERS: &[&str] = &["lipides", "fat", "matieres grasses"];

/// Header matches an alias when its normalized form equals it or starts
/// with it, so "Énergie (kcal/100g)" is an energy column.
fn header_matches(header: &str, aliases: &[&str]) -> bool {
    let header = normalize(header);
    aliases
        .iter()
        .any(|alias| header == *alias || header.starts_with(&format!("{alias} ")))
}

/// Parse a practitioner food list exported as CSV.
///
/// The name column is required; macro columns are optional and accept a
/// decimal comma. Missing or unreadable values are left empty so that
/// completion can estimate them.
pub fn parse_pool_csv<R: Read>(reader: R) -> Result<Vec<RawIngredient>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
    let col = |aliases: &[&str]| -> Option<usize> {
        headers.iter().position(|h| header_matches(h, aliases))
    };

    let Some(idx_name) = col(NAME_HEADERS) else {
        bail!("Missing food name column (expected one of: {})", NAME_HEADERS.join(", "));
    };
    let idx_energy = col(ENERGY_HEADERS);
    let idx_protein = col(PROTEIN_HEADERS);
    let idx_carbs = col(CARBS_HEADERS);
    let idx_fat = col(FAT_HEADERS);

    let mut rows = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;

        let name = record.get(idx_name).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }

        let value = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_decimal);

        rows.push(RawIngredient {
            name,
            energie: value(idx_energy),
            proteines: value(idx_protein),
            glucides: value(idx_carbs),
            lipides: value(idx_fat),
        });
    }

    debug!(rows = rows.len(), "parsed food list CSV");
    Ok(rows)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolDocument {
    List(Vec<RawIngredient>),
    Wrapped {
        #[serde(alias = "aliments", alias = "foods")]
        ingredients: Vec<RawIngredient>,
    },
}

/// Parse a food list given as a JSON array, or as an object holding the
/// array under `ingredients`, `aliments` or `foods`.
pub fn parse_pool_json<R: Read>(reader: R) -> Result<Vec<RawIngredient>> {
    let document: PoolDocument =
        serde_json::from_reader(reader).context("Failed to parse food list JSON")?;
    let rows = match document {
        PoolDocument::List(rows) | PoolDocument::Wrapped { ingredients: rows } => rows,
    };
    Ok(rows
        .into_iter()
        .filter(|row| !row.name.trim().is_empty())
        .collect())
}

/// Read a food list from disk, choosing the parser from the extension.
pub fn load_pool(path: &Path) -> Result<Vec<Ingredient>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open food list {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows = if is_json {
        parse_pool_json(file)
    } else {
        parse_pool_csv(file)
    }
    .with_context(|| format!("Failed to read food list {}", path.display()))?;
    Ok(rows.into_iter().map(Ingredient::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_french_headers_and_decimal_comma() {
        let csv = "\
Nom,Énergie (kcal/100g),Protéines (g),Glucides (g),Lipides (g)
Poulet,165,31,0,\"3,6\"
Riz basmati,\"130,5\",\"2,7\",28,\"0,3\"
";
        let rows = parse_pool_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Poulet");
        assert_eq!(rows[0].energie, Some(165.0));
        assert_eq!(rows[0].lipides, Some(3.6));
        assert_eq!(rows[1].energie, Some(130.5));
        assert_eq!(rows[1].proteines, Some(2.7));
    }

    #[test]
    fn test_parse_english_headers() {
        let csv = "name,calories,protein,carbs,fat\nOats,370,13,60,7\n";
        let rows = parse_pool_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "Oats");
        assert_eq!(rows[0].glucides, Some(60.0));
        assert_eq!(rows[0].lipides, Some(7.0));
    }

    #[test]
    fn test_missing_values_stay_empty() {
        let csv = "nom,energie,proteines\nBrocoli,,\nKiwi,61,n/a\n,\n";
        let rows = parse_pool_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].energie, None);
        assert_eq!(rows[1].energie, Some(61.0));
        assert_eq!(rows[1].proteines, None);
        assert_eq!(rows[1].glucides, None);
    }

    #[test]
    fn test_missing_name_column() {
        let csv = "calories,protein\n100,5\n";
        let err = parse_pool_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("food name"));
    }

    #[test]
    fn test_parse_json_list_and_wrapped() {
        let list = r#"[{"nom": "Oeufs", "energie": "145", "proteines": 12}, {"nom": "  "}]"#;
        let rows = parse_pool_json(list.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].energie, Some(145.0));
        assert_eq!(rows[0].proteines, Some(12.0));

        let wrapped = r#"{"aliments": [{"name": "Kiwi", "calories": 61}]}"#;
        let rows = parse_pool_json(wrapped.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "Kiwi");
        assert_eq!(rows[0].energie, Some(61.0));
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(parse_pool_json("{\"x\": 1}".as_bytes()).is_err());
    }
}
