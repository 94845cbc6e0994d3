//! Import pipeline: background workers that bring external recipes into the
//! catalog, plus the collaborators they share (translation, images,
//! formatting).
pub mod format;
pub mod images;
pub mod mealdb;
pub mod site;
pub mod translation;

use std::sync::Arc;

use crate::modules::catalog::{RecipeRepository, UserRepository};
use crate::modules::jobs::domain::store::JobStore;
use crate::shared::config::AppConfig;
use crate::log_warn;

pub use images::{DiskImageStore, ImageStore};
pub use translation::{DeepLTranslator, Translator};

/// Shared collaborators handed to every import worker. All seams are traits
/// so workers run against fixtures in tests.
pub struct ImportDeps {
    pub config: Arc<AppConfig>,
    pub job_store: Arc<dyn JobStore>,
    pub meal_api: Arc<dyn mealdb::MealApi>,
    pub translator: Arc<dyn Translator>,
    pub images: Arc<dyn ImageStore>,
    pub pages: Arc<dyn site::PageFetcher>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Resolve the owning user for imported records: the explicit request
/// parameter wins, then the configured import account, then the static
/// fallback id.
pub async fn resolve_import_user(deps: &ImportDeps, requested: Option<i32>) -> i32 {
    if let Some(user_id) = requested {
        return user_id;
    }

    match deps.users.find_by_email(&deps.config.import_user_email).await {
        Ok(Some(user)) => user.id,
        Ok(None) => deps.config.fallback_user_id,
        Err(e) => {
            log_warn!("Import user lookup failed ({}), using fallback", e);
            deps.config.fallback_user_id
        }
    }
}
