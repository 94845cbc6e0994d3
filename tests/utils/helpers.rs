use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rezept_tagebuch::modules::catalog::{
    InMemoryRecipeRepository, InMemoryUserRepository, User,
};
use rezept_tagebuch::modules::import::mealdb::{MealApi, MealDto};
use rezept_tagebuch::modules::import::site::PageFetcher;
use rezept_tagebuch::modules::import::{ImageStore, ImportDeps, Translator};
use rezept_tagebuch::modules::jobs::domain::{JobRecord, JobStore};
use rezept_tagebuch::modules::jobs::{InMemoryJobStore, JobManager};
use rezept_tagebuch::shared::config::{AppConfig, ImportCatalog};
use uuid::Uuid;

use super::fixtures::{
    CountingImageStore, CountingTranslator, FixtureMealApi, FixturePageFetcher,
};

pub struct TestServices {
    pub config: Arc<AppConfig>,
    pub manager: Arc<JobManager>,
    pub meal_api: Arc<FixtureMealApi>,
    pub translator: Arc<CountingTranslator>,
    pub images: Arc<CountingImageStore>,
    pub pages: Arc<FixturePageFetcher>,
    pub recipes: Arc<InMemoryRecipeRepository>,
    pub deps: Arc<ImportDeps>,
}

pub fn test_config() -> AppConfig {
    let mut catalog =
        ImportCatalog::from_json(include_str!("../../config/import_config.json"))
            .expect("embedded catalog parses");
    // No politeness pauses in tests
    catalog.site_import.delay_between_imports_ms = 0;

    AppConfig {
        port: 0,
        deepl_api_key: None,
        deepl_api_url: "https://api-free.deepl.com/v2/translate".to_string(),
        mealdb_base_url: "https://www.themealdb.com/api/json/v1/1".to_string(),
        upload_folder: std::env::temp_dir(),
        import_user_email: "import@seaser.local".to_string(),
        fallback_user_id: 1,
        max_concurrent_jobs: 4,
        job_max_age: Duration::from_secs(24 * 3600),
        catalog,
    }
}

pub fn build_test_services(meal: MealDto, pages: HashMap<String, String>) -> TestServices {
    let config = Arc::new(test_config());
    let job_store = Arc::new(InMemoryJobStore::new());

    let meal_api = Arc::new(FixtureMealApi::new(meal));
    let translator = Arc::new(CountingTranslator::default());
    let images = Arc::new(CountingImageStore::default());
    let pages = Arc::new(FixturePageFetcher::new(pages));
    let recipes = Arc::new(InMemoryRecipeRepository::new());
    let users = Arc::new(InMemoryUserRepository::with_users(vec![User {
        id: 42,
        email: config.import_user_email.clone(),
        name: "Import".to_string(),
    }]));

    let deps = Arc::new(ImportDeps {
        config: Arc::clone(&config),
        job_store: Arc::clone(&job_store) as Arc<dyn JobStore>,
        meal_api: Arc::clone(&meal_api) as Arc<dyn MealApi>,
        translator: Arc::clone(&translator) as Arc<dyn Translator>,
        images: Arc::clone(&images) as Arc<dyn ImageStore>,
        pages: Arc::clone(&pages) as Arc<dyn PageFetcher>,
        recipes: Arc::clone(&recipes) as _,
        users: Arc::clone(&users) as _,
    });

    let manager = Arc::new(JobManager::new(
        Arc::clone(&job_store) as Arc<dyn JobStore>,
        config.max_concurrent_jobs,
    ));

    TestServices {
        config,
        manager,
        meal_api,
        translator,
        images,
        pages,
        recipes,
        deps,
    }
}

/// Poll the store until the job reaches a terminal state, bounded at 30 s.
pub async fn wait_terminal(manager: &JobManager, job_id: Uuid) -> JobRecord {
    for _ in 0..3000 {
        if let Some(job) = manager.store().get(job_id).await {
            if job.status.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never reached a terminal state", job_id);
}
