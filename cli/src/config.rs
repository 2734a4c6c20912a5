use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

use assiette_core::config::PlannerConfig;
use assiette_core::models::MealSlot;

const DOCUMENT_FILE: &str = "consignes.txt";
const PLANNER_FILE: &str = "planner.json";

pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Use `data_dir` when given, otherwise the platform data directory.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "assiette")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        debug!(data_dir = %data_dir.display(), "using data directory");
        Ok(Config { data_dir })
    }

    /// Default food list of a slot: `<slot>.csv`, then `<slot>.json`.
    pub fn pool_path(&self, slot: MealSlot) -> Option<PathBuf> {
        ["csv", "json"]
            .iter()
            .map(|ext| self.data_dir.join(format!("{}.{ext}", slot.label_fr())))
            .find(|path| path.is_file())
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE)
    }

    /// Planner settings, with `planner.json` overriding the defaults.
    pub fn planner_config(&self) -> Result<PlannerConfig> {
        let path = self.data_dir.join(PLANNER_FILE);
        if !path.is_file() {
            return Ok(PlannerConfig::default());
        }
        debug!(path = %path.display(), "loading planner settings");
        read_planner_config(&path)
    }
}

fn read_planner_config(path: &Path) -> Result<PlannerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: PlannerConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("assiette");
        let config = Config::load(Some(dir.clone())).unwrap();
        assert!(dir.is_dir());
        assert_eq!(config.document_path(), dir.join("consignes.txt"));
    }

    #[test]
    fn test_pool_path_prefers_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        assert!(config.pool_path(MealSlot::Lunch).is_none());

        std::fs::write(tmp.path().join("dejeuner.json"), "[]").unwrap();
        assert_eq!(
            config.pool_path(MealSlot::Lunch),
            Some(tmp.path().join("dejeuner.json"))
        );
        std::fs::write(tmp.path().join("dejeuner.csv"), "nom\n").unwrap();
        assert_eq!(
            config.pool_path(MealSlot::Lunch),
            Some(tmp.path().join("dejeuner.csv"))
        );
        assert!(config.pool_path(MealSlot::Dinner).is_none());
    }

    #[test]
    fn test_planner_config_defaults_and_override() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(config.planner_config().unwrap(), PlannerConfig::default());

        std::fs::write(
            tmp.path().join("planner.json"),
            r#"{"recipe_portions": {"min_g": 10, "max_g": 300}}"#,
        )
        .unwrap();
        let planner = config.planner_config().unwrap();
        assert_eq!(planner.recipe_portions.max_g, 300);
        assert_eq!(planner.fallback.attempts, 50);
    }

    #[test]
    fn test_planner_config_rejects_bad_distribution() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(tmp.path().to_path_buf())).unwrap();
        std::fs::write(
            tmp.path().join("planner.json"),
            r#"{"distribution": {"breakfast": 0.5, "lunch": 0.5, "dinner": 0.5}}"#,
        )
        .unwrap();
        let err = config.planner_config().unwrap_err();
        assert!(format!("{err:#}").contains("sum to 1"));
    }
}
