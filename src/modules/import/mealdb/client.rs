use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::dto::{MealDto, MealListResponse};
use crate::shared::config::StrategyEndpoint;
use crate::shared::errors::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// External meal database access, kept behind a trait so workers can be
/// exercised against canned fixtures.
#[async_trait]
pub trait MealApi: Send + Sync {
    /// One full random meal record.
    async fn random(&self) -> AppResult<Vec<MealDto>>;

    /// Abbreviated candidates for a category/area/ingredient filter.
    async fn filter(&self, endpoint: StrategyEndpoint, value: &str) -> AppResult<Vec<MealDto>>;

    /// Full record for a candidate id; None when the id is unknown.
    async fn lookup(&self, id: &str) -> AppResult<Option<MealDto>>;
}

pub struct MealDbClient {
    client: Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(base_url: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("rezept-tagebuch/1.0")
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    async fn fetch_meals(&self, url: &str) -> AppResult<Vec<MealDto>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ApiError(format!("TheMealDB request failed: {}", e)))?;

        self.handle_response_status(response.status())?;

        let body: MealListResponse = response
            .json()
            .await
            .map_err(|e| AppError::ApiError(format!("Failed to parse TheMealDB response: {}", e)))?;

        Ok(body.meals.unwrap_or_default())
    }

    fn handle_response_status(&self, status: StatusCode) -> AppResult<()> {
        match status {
            StatusCode::OK => Ok(()),
            StatusCode::TOO_MANY_REQUESTS => Err(AppError::RateLimitError(
                "TheMealDB rate limit exceeded".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(AppError::NotFound("Resource not found".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => Err(
                AppError::ExternalServiceError("TheMealDB service unavailable".to_string()),
            ),
            _ => Err(AppError::ApiError(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl MealApi for MealDbClient {
    async fn random(&self) -> AppResult<Vec<MealDto>> {
        self.fetch_meals(&format!("{}/random.php", self.base_url)).await
    }

    async fn filter(&self, endpoint: StrategyEndpoint, value: &str) -> AppResult<Vec<MealDto>> {
        let query = match endpoint {
            StrategyEndpoint::FilterCategory => "c",
            StrategyEndpoint::FilterArea => "a",
            StrategyEndpoint::FilterIngredient => "i",
            StrategyEndpoint::Random => return self.random().await,
        };
        let url = format!(
            "{}/filter.php?{}={}",
            self.base_url,
            query,
            urlencoding::encode(value)
        );
        self.fetch_meals(&url).await
    }

    async fn lookup(&self, id: &str) -> AppResult<Option<MealDto>> {
        let url = format!(
            "{}/lookup.php?i={}",
            self.base_url,
            urlencoding::encode(id)
        );
        Ok(self.fetch_meals(&url).await?.into_iter().next())
    }
}
