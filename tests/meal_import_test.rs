//! End-to-end meal import through the job manager, against counting
//! fixtures for every external collaborator.
mod utils;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rezept_tagebuch::modules::import::mealdb::{meal_import_worker, MealImportParams};
use rezept_tagebuch::modules::jobs::{JobStatus, JobType};
use serde_json::json;
use utils::{fixtures, helpers};

#[tokio::test]
async fn meal_import_persists_one_recipe() {
    let services = helpers::build_test_services(
        fixtures::meal("1", "Test Meal", "Vegetarian"),
        HashMap::new(),
    );

    let params = json!({"count": 1});
    let typed: MealImportParams = serde_json::from_value(params.clone()).unwrap();
    let deps = Arc::clone(&services.deps);
    let job_id = services
        .manager
        .submit(JobType::ExternalMealImport, params, move |id| {
            meal_import_worker(id, typed, deps)
        })
        .await
        .unwrap();

    let job = helpers::wait_terminal(&services.manager, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    let result = job.result.expect("completed job carries a result");
    assert_eq!(result["imported"], 1);
    assert_eq!(result["failed"], 0);
    assert_eq!(result["rejected"], 0);
    // No translation credential in tests, so the title survives unchanged
    assert_eq!(result["recipes"][0]["title"], "Test Meal");
    assert_eq!(result["recipes"][0]["original_title"], "Test Meal");

    assert_eq!(services.recipes.count().await, 1);
    let stored = &services.recipes.all().await[0];
    assert!(stored.auto_imported);
    // Resolved via the import account, not the static fallback
    assert_eq!(stored.user_id, 42);
    let notes = stored.notes.as_deref().unwrap();
    assert!(notes.starts_with("SCHRITT 1"));
    assert!(notes.contains("Zutaten:\n- 200 g Pasta"));
    assert!(notes.contains("🌍 Quelle: TheMealDB"));

    // Title, instructions, and one ingredient pair
    assert_eq!(services.translator.calls.load(Ordering::SeqCst), 3);
    assert_eq!(services.images.calls.load(Ordering::SeqCst), 1);

    // Final progress is saturated
    assert_eq!(job.progress.current, 1);
    assert_eq!(job.progress.total, 1);
}

#[tokio::test]
async fn denied_category_is_rejected_without_side_effects() {
    let services = helpers::build_test_services(
        fixtures::meal("2", "Beef Wellington", "Beef"),
        HashMap::new(),
    );

    let params = json!({"count": 1});
    let typed: MealImportParams = serde_json::from_value(params.clone()).unwrap();
    let deps = Arc::clone(&services.deps);
    let job_id = services
        .manager
        .submit(JobType::ExternalMealImport, params, move |id| {
            meal_import_worker(id, typed, deps)
        })
        .await
        .unwrap();

    let job = helpers::wait_terminal(&services.manager, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);

    let result = job.result.unwrap();
    assert_eq!(result["imported"], 0);
    assert_eq!(result["rejected"], 1);
    assert_eq!(result["rejections"][0]["category"], "Beef");

    // Rejection happens before any image, translation, or persistence work
    assert_eq!(services.recipes.count().await, 0);
    assert_eq!(services.translator.calls.load(Ordering::SeqCst), 0);
    assert_eq!(services.images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_fetches_are_recorded_per_recipe() {
    struct FailingApi;

    #[async_trait::async_trait]
    impl rezept_tagebuch::modules::import::mealdb::MealApi for FailingApi {
        async fn random(
            &self,
        ) -> rezept_tagebuch::shared::errors::AppResult<Vec<rezept_tagebuch::modules::import::mealdb::MealDto>>
        {
            Err(rezept_tagebuch::shared::errors::AppError::ExternalServiceError(
                "meal db down".to_string(),
            ))
        }
        async fn filter(
            &self,
            _endpoint: rezept_tagebuch::shared::config::StrategyEndpoint,
            _value: &str,
        ) -> rezept_tagebuch::shared::errors::AppResult<Vec<rezept_tagebuch::modules::import::mealdb::MealDto>>
        {
            Err(rezept_tagebuch::shared::errors::AppError::ExternalServiceError(
                "meal db down".to_string(),
            ))
        }
        async fn lookup(
            &self,
            _id: &str,
        ) -> rezept_tagebuch::shared::errors::AppResult<Option<rezept_tagebuch::modules::import::mealdb::MealDto>>
        {
            Ok(None)
        }
    }

    let services = helpers::build_test_services(
        fixtures::meal("3", "Unused", "Vegetarian"),
        HashMap::new(),
    );
    let deps = Arc::new(rezept_tagebuch::modules::import::ImportDeps {
        meal_api: Arc::new(FailingApi),
        config: Arc::clone(&services.deps.config),
        job_store: Arc::clone(&services.deps.job_store),
        translator: Arc::clone(&services.deps.translator),
        images: Arc::clone(&services.deps.images),
        pages: Arc::clone(&services.deps.pages),
        recipes: Arc::clone(&services.deps.recipes),
        users: Arc::clone(&services.deps.users),
    });

    let params = json!({"count": 2});
    let typed: MealImportParams = serde_json::from_value(params.clone()).unwrap();
    let job_id = services
        .manager
        .submit(JobType::ExternalMealImport, params, move |id| {
            meal_import_worker(id, typed, deps)
        })
        .await
        .unwrap();

    // A batch where every fetch fails still completes with bookkeeping
    let job = helpers::wait_terminal(&services.manager, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    let result = job.result.unwrap();
    assert_eq!(result["imported"], 0);
    assert_eq!(result["failed"], 2);
    assert_eq!(services.recipes.count().await, 0);
}
