use std::sync::Arc;

use rezept_tagebuch::modules::catalog::{InMemoryRecipeRepository, InMemoryUserRepository, User};
use rezept_tagebuch::modules::import::mealdb::MealDbClient;
use rezept_tagebuch::modules::import::site::HttpPageFetcher;
use rezept_tagebuch::modules::import::{DeepLTranslator, DiskImageStore, ImportDeps};
use rezept_tagebuch::modules::jobs::InMemoryJobStore;
use rezept_tagebuch::shared::config::AppConfig;
use rezept_tagebuch::shared::errors::AppResult;
use rezept_tagebuch::shared::utils::logger::init_logger;
use rezept_tagebuch::{log_info, AppState};

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = Arc::new(AppConfig::from_env()?);

    let job_store = Arc::new(InMemoryJobStore::new());
    let import_user = User {
        id: config.fallback_user_id,
        email: config.import_user_email.clone(),
        name: "Import".to_string(),
    };

    let deps = Arc::new(ImportDeps {
        config: Arc::clone(&config),
        job_store: job_store.clone(),
        meal_api: Arc::new(MealDbClient::new(config.mealdb_base_url.clone())?),
        translator: Arc::new(DeepLTranslator::new(
            config.deepl_api_url.clone(),
            config.deepl_api_key.clone(),
        )?),
        images: Arc::new(DiskImageStore::new(config.upload_folder.clone())?),
        pages: Arc::new(HttpPageFetcher::new()?),
        recipes: Arc::new(InMemoryRecipeRepository::new()),
        users: Arc::new(InMemoryUserRepository::with_users(vec![import_user])),
    });

    let state = AppState::new(Arc::clone(&config), deps);

    tokio::spawn(Arc::clone(&state.jobs).run_cleanup_loop(config.job_max_age));

    let app = rezept_tagebuch::router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log_info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
