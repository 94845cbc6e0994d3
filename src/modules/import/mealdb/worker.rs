//! External meal import worker
//!
//! For each requested import: fetch a candidate per strategy, apply the
//! category content filter, download the image, translate, reformat into
//! the step-marker convention, and persist. A single recipe's failure never
//! aborts the batch.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dto::MealDto;
use super::strategy::fetch_candidate;
use crate::modules::catalog::NewRecipe;
use crate::modules::import::format::{
    format_steps_from_text, ingredients_section, FOOTER_SEPARATOR,
};
use crate::modules::import::{resolve_import_user, ImportDeps};
use crate::shared::errors::AppResult;
use crate::{log_info, log_warn};

const TARGET_LANG: &str = "DE";

fn default_count() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealImportParams {
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedMeal {
    pub id: i32,
    pub title: String,
    pub original_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealFailure {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRejection {
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealImportResult {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub rejected: usize,
    pub recipes: Vec<ImportedMeal>,
    pub failures: Vec<MealFailure>,
    pub rejections: Vec<MealRejection>,
}

enum MealOutcome {
    Imported(ImportedMeal),
    Rejected(MealRejection),
}

pub async fn meal_import_worker(
    job_id: Uuid,
    params: MealImportParams,
    deps: Arc<ImportDeps>,
) -> AppResult<serde_json::Value> {
    let count = params.count.max(1);
    let user_id = resolve_import_user(&deps, params.user_id).await;

    let mut recipes = Vec::new();
    let mut failures = Vec::new();
    let mut rejections = Vec::new();

    deps.job_store
        .update_progress(job_id, 0, count, "Starting TheMealDB import...")
        .await;

    for i in 1..=count {
        deps.job_store
            .update_progress(
                job_id,
                i - 1,
                count,
                &format!("Fetching recipe {}/{}...", i, count),
            )
            .await;

        match import_one(job_id, i, count, &params, user_id, &deps).await {
            Ok(MealOutcome::Imported(meal)) => {
                log_info!("[{}/{}] Imported: {}", i, count, meal.title);
                recipes.push(meal);
            }
            Ok(MealOutcome::Rejected(rejection)) => {
                log_info!(
                    "[{}/{}] Rejected by category filter: {} ({})",
                    i,
                    count,
                    rejection.title,
                    rejection.category
                );
                rejections.push(rejection);
            }
            Err(e) => {
                log_warn!("[{}/{}] Import failed: {}", i, count, e);
                failures.push(MealFailure {
                    error: e.to_string(),
                });
            }
        }
    }

    deps.job_store
        .update_progress(
            job_id,
            count,
            count,
            &format!("Completed! Imported {}/{}", recipes.len(), count),
        )
        .await;

    let result = MealImportResult {
        success: true,
        imported: recipes.len(),
        failed: failures.len(),
        rejected: rejections.len(),
        recipes,
        failures,
        rejections,
    };
    Ok(serde_json::to_value(result)?)
}

async fn import_one(
    job_id: Uuid,
    i: u32,
    count: u32,
    params: &MealImportParams,
    user_id: i32,
    deps: &ImportDeps,
) -> AppResult<MealOutcome> {
    let meal = fetch_candidate(
        deps.meal_api.as_ref(),
        &deps.config.catalog.meal_import,
        params.strategy.as_deref(),
        params.value.as_deref(),
    )
    .await?;

    // Content filter: rejection is deliberate and side-effect free, not an
    // error. No image, translation, or persistence happens for it.
    let category = meal.category.clone().unwrap_or_default();
    if deps.config.catalog.meal_import.is_denied_category(&category) {
        return Ok(MealOutcome::Rejected(MealRejection {
            title: meal.title.clone(),
            category,
        }));
    }

    let image = match &meal.thumbnail {
        Some(url) if !url.is_empty() => deps.images.fetch_image(url).await,
        _ => None,
    };

    deps.job_store
        .update_progress(
            job_id,
            i - 1,
            count,
            &format!("Translating \"{}\"...", meal.title),
        )
        .await;

    let original_title = meal.title.clone();
    let translated_title = deps.translator.translate(&original_title, TARGET_LANG).await;
    let instructions = meal.instructions.clone().unwrap_or_default();
    let translated_instructions = deps.translator.translate(&instructions, TARGET_LANG).await;

    let mut ingredients = Vec::new();
    for pair in meal.ingredient_pairs() {
        ingredients.push(deps.translator.translate(&pair, TARGET_LANG).await);
    }

    let notes = compose_notes(&meal, &original_title, &translated_instructions, &ingredients);

    deps.job_store
        .update_progress(
            job_id,
            i - 1,
            count,
            &format!("Saving \"{}\"...", translated_title),
        )
        .await;

    let saved = deps
        .recipes
        .insert(NewRecipe {
            title: translated_title,
            image,
            notes,
            duration: None,
            rating: None,
            user_id,
            auto_imported: true,
        })
        .await?;

    Ok(MealOutcome::Imported(ImportedMeal {
        id: saved.id,
        title: saved.title,
        original_title,
    }))
}

fn compose_notes(
    meal: &MealDto,
    original_title: &str,
    translated_instructions: &str,
    ingredients: &[String],
) -> String {
    let mut notes = format_steps_from_text(translated_instructions);
    notes.push_str(&ingredients_section(ingredients));

    notes.push_str(&format!("\n{}\n", FOOTER_SEPARATOR));
    notes.push_str("🌍 Quelle: TheMealDB\n");
    notes.push_str(&format!("📖 Original: {}\n", original_title));
    notes.push_str(&format!(
        "🏷️ Kategorie: {}\n",
        meal.category.as_deref().unwrap_or("")
    ));
    notes.push_str(&format!(
        "🌎 Region: {}\n",
        meal.area.as_deref().unwrap_or("")
    ));
    notes.push_str("🤖 Übersetzt mit DeepL");
    notes
}
