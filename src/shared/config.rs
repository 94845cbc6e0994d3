use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::shared::errors::{AppError, AppResult};

/// Built-in catalog used when no IMPORT_CONFIG_PATH is configured.
const DEFAULT_IMPORT_CONFIG: &str = include_str!("../../config/import_config.json");

/// Runtime configuration assembled from the environment plus the
/// JSON import catalog (strategy and preset definitions).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,
    pub mealdb_base_url: String,
    pub upload_folder: PathBuf,
    pub import_user_email: String,
    pub fallback_user_id: i32,
    pub max_concurrent_jobs: usize,
    pub job_max_age: Duration,
    pub catalog: ImportCatalog,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let catalog = match env::var("IMPORT_CONFIG_PATH") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    AppError::InternalError(format!("Cannot read import config {}: {}", path, e))
                })?;
                ImportCatalog::from_json(&raw)?
            }
            Err(_) => ImportCatalog::from_json(DEFAULT_IMPORT_CONFIG)?,
        };

        let deepl_api_key = env::var("DEEPL_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            port: env_or("PORT", 8080),
            deepl_api_key,
            deepl_api_url: env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| "https://api-free.deepl.com/v2/translate".to_string()),
            mealdb_base_url: env::var("MEALDB_BASE_URL")
                .unwrap_or_else(|_| "https://www.themealdb.com/api/json/v1/1".to_string()),
            upload_folder: PathBuf::from(
                env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "./data/uploads".to_string()),
            ),
            import_user_email: env::var("IMPORT_USER_EMAIL")
                .unwrap_or_else(|_| "import@seaser.local".to_string()),
            fallback_user_id: env_or("IMPORT_FALLBACK_USER_ID", 1),
            max_concurrent_jobs: env_or("MAX_CONCURRENT_JOBS", 4),
            job_max_age: Duration::from_secs(env_or("JOB_MAX_AGE_HOURS", 24u64) * 3600),
            catalog,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// The parsed import catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportCatalog {
    pub meal_import: MealImportConfig,
    pub site_import: SiteImportConfig,
}

impl ImportCatalog {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::InternalError(format!("Invalid import config: {}", e)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealImportConfig {
    pub default_strategy: String,
    pub category_denylist: Vec<String>,
    pub strategies: HashMap<String, StrategyConfig>,
}

impl MealImportConfig {
    /// Content filter: meat and seafood categories are rejected outright.
    pub fn is_denied_category(&self, category: &str) -> bool {
        self.category_denylist
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub endpoint: StrategyEndpoint,
    pub requires_value: bool,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyEndpoint {
    Random,
    FilterCategory,
    FilterArea,
    FilterIngredient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteImportConfig {
    pub base_url: String,
    pub overview_path: String,
    pub default_preset: String,
    pub max_recipes_per_import: usize,
    pub delay_between_imports_ms: u64,
    pub presets: HashMap<String, PresetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetConfig {
    pub filters: Vec<String>,
}
