//! Candidate selection for the meal import
//!
//! A strategy is a named policy from the configured catalog: random pick or
//! a filtered fetch by category/area/ingredient. Filtered endpoints return
//! abbreviated records, so one detail lookup follows for a randomly chosen
//! candidate.
use rand::seq::SliceRandom;

use super::client::MealApi;
use super::dto::MealDto;
use crate::shared::config::{MealImportConfig, StrategyConfig, StrategyEndpoint};
use crate::shared::errors::{AppError, AppResult};
use crate::log_warn;

/// Resolve the strategy to apply. Unrecognized names fall back to `random`.
fn resolve_strategy<'a>(
    config: &'a MealImportConfig,
    requested: Option<&'a str>,
) -> AppResult<(&'a str, &'a StrategyConfig)> {
    let name = requested.unwrap_or(&config.default_strategy);

    if let Some(strategy) = config.strategies.get(name) {
        return Ok((name, strategy));
    }

    log_warn!("Unknown import strategy '{}', falling back to random", name);
    config
        .strategies
        .get_key_value("random")
        .map(|(k, v)| (k.as_str(), v))
        .ok_or_else(|| {
            AppError::InternalError("Strategy catalog has no random strategy".to_string())
        })
}

/// Pick the parameter value for a strategy that needs one: the caller's
/// value if supplied, otherwise a random entry from the catalog defaults.
fn resolve_value(name: &str, strategy: &StrategyConfig, value: Option<&str>) -> AppResult<String> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value.to_string());
    }
    strategy
        .values
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "Strategy '{}' requires a value and has no defaults configured",
                name
            ))
        })
}

/// Fetch one full candidate record according to the requested strategy.
pub async fn fetch_candidate(
    api: &dyn MealApi,
    config: &MealImportConfig,
    requested_strategy: Option<&str>,
    requested_value: Option<&str>,
) -> AppResult<MealDto> {
    let (name, strategy) = resolve_strategy(config, requested_strategy)?;

    let candidates = if strategy.requires_value {
        let value = resolve_value(name, strategy, requested_value)?;
        api.filter(strategy.endpoint, &value).await?
    } else {
        match strategy.endpoint {
            StrategyEndpoint::Random => api.random().await?,
            endpoint => {
                let value = resolve_value(name, strategy, requested_value)?;
                api.filter(endpoint, &value).await?
            }
        }
    };

    let candidate = candidates
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| {
            AppError::ExternalServiceError(format!("Strategy '{}' returned no candidates", name))
        })?;

    if !candidate.is_abbreviated() {
        return Ok(candidate);
    }

    // Listing endpoints omit instructions; one detail lookup fills them in.
    api.lookup(&candidate.id).await?.ok_or_else(|| {
        AppError::ExternalServiceError(format!(
            "Candidate {} vanished between listing and lookup",
            candidate.id
        ))
    })
}
