//! Counting fixture doubles for the external collaborators. Every fixture
//! records how often it was called so tests can assert on side effects.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use rezept_tagebuch::modules::import::mealdb::{MealApi, MealDto};
use rezept_tagebuch::modules::import::site::PageFetcher;
use rezept_tagebuch::modules::import::{ImageStore, Translator};
use rezept_tagebuch::shared::config::StrategyEndpoint;
use rezept_tagebuch::shared::errors::{AppError, AppResult};

pub fn meal(id: &str, title: &str, category: &str) -> MealDto {
    serde_json::from_value(serde_json::json!({
        "idMeal": id,
        "strMeal": title,
        "strCategory": category,
        "strArea": "Italian",
        "strInstructions": "Cook everything.\nServe hot.",
        "strMealThumb": "https://example.com/thumb.jpg",
        "strIngredient1": "Pasta",
        "strMeasure1": "200 g"
    }))
    .expect("valid meal fixture")
}

/// Serves a fixed meal for every endpoint.
pub struct FixtureMealApi {
    pub meal: MealDto,
    pub calls: AtomicUsize,
}

impl FixtureMealApi {
    pub fn new(meal: MealDto) -> Self {
        Self {
            meal,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MealApi for FixtureMealApi {
    async fn random(&self) -> AppResult<Vec<MealDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.meal.clone()])
    }

    async fn filter(&self, _endpoint: StrategyEndpoint, _value: &str) -> AppResult<Vec<MealDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.meal.clone()])
    }

    async fn lookup(&self, _id: &str) -> AppResult<Option<MealDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.meal.clone()))
    }
}

/// Identity translation, counting invocations.
#[derive(Default)]
pub struct CountingTranslator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, _target_lang: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        text.to_string()
    }
}

/// Never stores anything, counting invocations.
#[derive(Default)]
pub struct CountingImageStore {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ImageStore for CountingImageStore {
    async fn fetch_image(&self, _url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

/// Serves canned HTML by URL; unknown URLs fail like a dead link.
pub struct FixturePageFetcher {
    pub pages: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl FixturePageFetcher {
    pub fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for FixturePageFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::ExternalServiceError(format!("No fixture page for {}", url)))
    }
}
