//! Batch site-import worker
//!
//! Walks a recipe overview page for a configured filter set, scrapes each
//! linked detail page, and persists what parses. Individual page failures
//! are recorded and skipped; only a bad preset aborts the job.
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scraper::{format_for_db, scrape_recipe};
use crate::modules::catalog::NewRecipe;
use crate::modules::import::{resolve_import_user, ImportDeps};
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};

fn recipe_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="(/de/rezepte/[a-z0-9-]+)""#).expect("static regex"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteImportParams {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub filters: Option<Vec<String>>,
    #[serde(default)]
    pub max_recipes: Option<usize>,
    #[serde(default)]
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedPage {
    pub id: i32,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSkip {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteImportResult {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
    pub recipes: Vec<ImportedPage>,
    pub failures: Vec<PageFailure>,
    pub skips: Vec<PageSkip>,
}

enum PageOutcome {
    Imported(ImportedPage),
    Skipped(PageSkip),
    Failed(PageFailure),
}

pub async fn site_import_worker(
    job_id: Uuid,
    params: SiteImportParams,
    deps: Arc<ImportDeps>,
) -> AppResult<serde_json::Value> {
    let site = &deps.config.catalog.site_import;
    let filters = resolve_filters(&params, site)?;
    let user_id = resolve_import_user(&deps, params.user_id).await;

    let overview_url = format!(
        "{}{}/{}",
        site.base_url,
        site.overview_path,
        filters.join("-")
    );

    deps.job_store
        .update_progress(job_id, 0, 0, "Fetching recipe overview...")
        .await;
    log_info!("Site import: scanning {}", overview_url);

    let overview_html = deps.pages.fetch(&overview_url).await?;

    let cap = params
        .max_recipes
        .map(|n| n.min(site.max_recipes_per_import))
        .unwrap_or(site.max_recipes_per_import);
    let links = extract_recipe_links(&overview_html, &site.base_url, cap);
    let total = links.len() as u32;
    log_info!("Site import: {} recipe pages found", total);

    let mut recipes = Vec::new();
    let mut failures = Vec::new();
    let mut skips = Vec::new();

    for (index, url) in links.iter().enumerate() {
        deps.job_store
            .update_progress(
                job_id,
                index as u32,
                total,
                &format!("Importing recipe {}/{}...", index + 1, total),
            )
            .await;

        match import_page(url, user_id, &deps).await {
            Ok(PageOutcome::Imported(page)) => {
                log_info!("[{}/{}] Imported: {}", index + 1, total, page.title);
                recipes.push(page);

                // Politeness pause after a successful scrape, except the last
                if index + 1 < links.len() {
                    tokio::time::sleep(Duration::from_millis(site.delay_between_imports_ms)).await;
                }
            }
            Ok(PageOutcome::Skipped(skip)) => {
                log_info!("[{}/{}] Skipped ({}): {}", index + 1, total, skip.reason, url);
                skips.push(skip);
            }
            Ok(PageOutcome::Failed(failure)) => {
                log_warn!("[{}/{}] Failed: {} ({})", index + 1, total, url, failure.error);
                failures.push(failure);
            }
            Err(e) => {
                log_warn!("[{}/{}] Failed: {} ({})", index + 1, total, url, e);
                failures.push(PageFailure {
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    deps.job_store
        .update_progress(
            job_id,
            total,
            total,
            &format!("Completed! Imported {}/{}", recipes.len(), total),
        )
        .await;

    let result = SiteImportResult {
        success: true,
        imported: recipes.len(),
        failed: failures.len(),
        skipped: skips.len(),
        recipes,
        failures,
        skips,
    };
    Ok(serde_json::to_value(result)?)
}

/// Explicit filters win; otherwise the named (or default) preset from the
/// catalog. An unknown preset name is a caller error and fails the job.
fn resolve_filters(
    params: &SiteImportParams,
    site: &crate::shared::config::SiteImportConfig,
) -> AppResult<Vec<String>> {
    if let Some(filters) = &params.filters {
        if !filters.is_empty() {
            return Ok(filters.clone());
        }
    }

    let preset_name = params.preset.as_deref().unwrap_or(&site.default_preset);
    site.presets
        .get(preset_name)
        .map(|preset| preset.filters.clone())
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown import preset '{}'", preset_name)))
}

/// Absolute detail-page URLs from the overview markup, deduplicated in
/// first-seen order and capped.
pub fn extract_recipe_links(html: &str, base_url: &str, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for captures in recipe_link_regex().captures_iter(html) {
        if let Some(path) = captures.get(1) {
            let path = path.as_str();
            if seen.insert(path.to_string()) {
                links.push(format!("{}{}", base_url, path));
                if links.len() >= cap {
                    break;
                }
            }
        }
    }
    links
}

fn slug_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

async fn import_page(url: &str, user_id: i32, deps: &ImportDeps) -> AppResult<PageOutcome> {
    // The duplicate check keys on the URL slug rather than the stored title
    let slug = slug_from_url(url);
    if deps.recipes.find_by_title(slug).await?.is_some() {
        return Ok(PageOutcome::Skipped(PageSkip {
            url: url.to_string(),
            reason: "already_exists".to_string(),
        }));
    }

    let html = deps.pages.fetch(url).await?;
    let scraped = scrape_recipe(&html, url);

    let Some(formatted) = format_for_db(&scraped) else {
        return Ok(PageOutcome::Failed(PageFailure {
            url: url.to_string(),
            error: "no_title".to_string(),
        }));
    };

    let image = match &formatted.image {
        Some(image_url) if image_url.starts_with("http") => {
            deps.images.fetch_image(image_url).await
        }
        _ => None,
    };

    let saved = deps
        .recipes
        .insert(NewRecipe {
            title: formatted.title,
            image,
            notes: formatted.notes,
            duration: formatted.duration_hours,
            rating: formatted.rating,
            user_id,
            auto_imported: true,
        })
        .await?;

    Ok(PageOutcome::Imported(ImportedPage {
        id: saved.id,
        title: saved.title,
        url: url.to_string(),
    }))
}
