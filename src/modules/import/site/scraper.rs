//! Recipe page scraping
//!
//! Two extraction tiers: structured JSON-LD (schema.org Recipe) when the
//! page embeds it, and a text heuristic over the stripped markup otherwise.
//! Both produce the same `ScrapedRecipe` shape.
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::modules::import::format::{
    format_steps_from_list, ingredients_section, parse_iso_duration_hours, FOOTER_SEPARATOR,
};
use crate::shared::errors::{AppError, AppResult};
use crate::log_debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_HEURISTIC_STEPS: usize = 10;

fn jsonld_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<script\s+type="application/ld\+json"[^>]*>(.*?)</script>"#)
            .expect("static regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("static regex"))
}

fn script_style_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("static regex")
    })
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h[12][^>]*>(.*?)</h[12]>").expect("static regex"))
}

fn measurement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\d+[.,]?\d*\s*(g|kg|ml|dl|l|TL|EL|Prise|Stück|Bund)\b")
            .expect("static regex")
    })
}

fn step_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Schritt\s*\d+[.:]?\s*(.*)$").expect("static regex"))
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(Minuten|Min\.?|Stunden|Std\.?)").expect("static regex")
    })
}

fn yield_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*Portionen").expect("static regex"))
}

/// Raw HTML retrieval, behind a trait so the batch worker can be exercised
/// against canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            // Some recipe sites refuse non-browser agents
            .user_agent("Mozilla/5.0 (compatible; rezept-tagebuch/1.0)")
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Page fetch for {} returned HTTP {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMethod {
    JsonLd,
    Heuristic,
}

impl ScrapeMethod {
    fn label(self) -> &'static str {
        match self {
            ScrapeMethod::JsonLd => "schema.org",
            ScrapeMethod::Heuristic => "pattern_matching",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapedRecipe {
    pub title: Option<String>,
    pub image: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// ISO-8601 duration (e.g. `PT45M`) when the page states one.
    pub total_time: Option<String>,
    pub recipe_yield: Option<String>,
    pub rating: Option<f64>,
    pub method: ScrapeMethod,
    pub source_url: String,
}

/// What the catalog stores for a scraped page. The rating column is an
/// integer, so fractional page ratings are rounded.
#[derive(Debug, Clone)]
pub struct FormattedRecipe {
    pub title: String,
    pub notes: String,
    pub image: Option<String>,
    pub duration_hours: Option<f64>,
    pub rating: Option<i32>,
}

/// Extract a recipe from a fetched page. JSON-LD wins when present and
/// parseable; the heuristic covers everything else.
pub fn scrape_recipe(html: &str, url: &str) -> ScrapedRecipe {
    if let Some(recipe) = scrape_jsonld(html, url) {
        log_debug!("Scraped {} via JSON-LD", url);
        return recipe;
    }
    log_debug!("No usable JSON-LD on {}, falling back to heuristic", url);
    scrape_heuristic(html, url)
}

fn scrape_jsonld(html: &str, url: &str) -> Option<ScrapedRecipe> {
    for captures in jsonld_regex().captures_iter(html) {
        let raw = captures.get(1)?.as_str();
        let Ok(document) = serde_json::from_str::<Value>(raw) else {
            continue;
        };
        if let Some(node) = find_recipe_node(&document) {
            return Some(recipe_from_node(node, url));
        }
    }
    None
}

/// schema.org embeds come in several shapes: a bare Recipe object, an array
/// of nodes, or a `@graph` collection.
fn find_recipe_node(document: &Value) -> Option<&Value> {
    match document {
        Value::Object(map) => {
            if is_recipe_type(map.get("@type")) {
                return Some(document);
            }
            map.get("@graph").and_then(find_recipe_node)
        }
        Value::Array(items) => items.iter().find_map(find_recipe_node),
        _ => None,
    }
}

fn is_recipe_type(type_field: Option<&Value>) -> bool {
    match type_field {
        Some(Value::String(s)) => s == "Recipe",
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some("Recipe")),
        _ => false,
    }
}

fn recipe_from_node(node: &Value, url: &str) -> ScrapedRecipe {
    ScrapedRecipe {
        title: node
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        image: extract_image(node.get("image")),
        ingredients: string_list(node.get("recipeIngredient")),
        instructions: extract_instructions(node.get("recipeInstructions")),
        total_time: node
            .get("totalTime")
            .and_then(Value::as_str)
            .map(str::to_string),
        recipe_yield: extract_yield(node.get("recipeYield")),
        rating: node
            .get("aggregateRating")
            .and_then(|r| r.get("ratingValue"))
            .and_then(numeric),
        method: ScrapeMethod::JsonLd,
        source_url: url.to_string(),
    }
}

/// `image` is a URL string, a list of them, or an ImageObject.
fn extract_image(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(|v| extract_image(Some(v))),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// `recipeInstructions` entries are plain strings or HowToStep objects.
fn extract_instructions(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(map) => map
                    .get("text")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn extract_yield(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(|v| extract_yield(Some(v))),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scrape_heuristic(html: &str, url: &str) -> ScrapedRecipe {
    let title = heading_regex()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()).trim().to_string())
        .filter(|s| !s.is_empty());

    let text = strip_tags(html);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    ScrapedRecipe {
        title,
        image: None,
        ingredients: heuristic_ingredients(&lines),
        instructions: heuristic_instructions(&lines, &text),
        total_time: heuristic_duration(&text),
        recipe_yield: yield_regex()
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        rating: None,
        method: ScrapeMethod::Heuristic,
        source_url: url.to_string(),
    }
}

pub fn strip_tags(html: &str) -> String {
    let without_blocks = script_style_regex().replace_all(html, " ");
    let without_tags = tag_regex().replace_all(&without_blocks, "\n");
    decode_entities(&without_tags)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

const BULLET_CHARS: [char; 4] = ['-', '•', '*', '–'];

/// Ingredient candidates: quantity-with-unit lines between the "Zutaten"
/// and "Zubereitung" headings, or anywhere if no headings exist. Bulleted
/// lines count as ingredients too, with the bullet stripped.
fn heuristic_ingredients(lines: &[&str]) -> Vec<String> {
    let start = lines.iter().position(|l| l.starts_with("Zutaten"));
    let end = lines.iter().position(|l| l.starts_with("Zubereitung"));

    let window: &[&str] = match (start, end) {
        (Some(s), Some(e)) if s < e => &lines[s..e],
        (Some(s), _) => &lines[s..],
        _ => lines,
    };

    window
        .iter()
        .filter_map(|line| {
            if measurement_regex().is_match(line) {
                Some(line.to_string())
            } else if line.starts_with(BULLET_CHARS) {
                let item = line.trim_start_matches(|c: char| BULLET_CHARS.contains(&c) || c == ' ');
                (!item.is_empty()).then(|| item.to_string())
            } else {
                None
            }
        })
        .collect()
}

fn heuristic_instructions(lines: &[&str], text: &str) -> Vec<String> {
    let marked: Vec<String> = lines
        .iter()
        .filter_map(|line| {
            step_line_regex()
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .collect();
    if !marked.is_empty() {
        return marked;
    }

    // No explicit step markup: take the text after the preparation heading
    // (or the whole page) and keep a bounded number of sentences.
    let body = text
        .split_once("Zubereitung")
        .map(|(_, after)| after)
        .unwrap_or(text);

    crate::modules::import::format::split_sentences(body)
        .into_iter()
        .filter(|s| s.len() > 20)
        .take(MAX_HEURISTIC_STEPS)
        .collect()
}

fn heuristic_duration(text: &str) -> Option<String> {
    let captures = duration_regex().captures(text)?;
    let amount: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str().to_lowercase();
    if unit.starts_with("std") || unit.starts_with("stunden") {
        Some(format!("PT{}H", amount))
    } else {
        Some(format!("PT{}M", amount))
    }
}

/// Name the source site for the notes footer.
fn source_site(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if url.contains("migusto") {
        "Migusto"
    } else if url.contains("chefkoch") {
        "Chefkoch"
    } else if url.contains("lecker") {
        "Lecker.de"
    } else {
        "Web Import"
    }
}

/// Assemble the catalog record: step-marker notes, ingredient block, and a
/// provenance footer.
pub fn format_for_db(scraped: &ScrapedRecipe) -> Option<FormattedRecipe> {
    let title = scraped.title.clone()?;

    let mut notes = format_steps_from_list(&scraped.instructions);
    if !notes.is_empty() {
        notes.push_str("\n\n");
    }
    notes.push_str(&ingredients_section(&scraped.ingredients));

    notes.push_str(&format!("\n{}\n", FOOTER_SEPARATOR));
    notes.push_str(&format!("🌍 Quelle: {}\n", source_site(&scraped.source_url)));
    notes.push_str(&format!("📖 URL: {}\n", scraped.source_url));
    if let Some(portions) = &scraped.recipe_yield {
        notes.push_str(&format!("👥 Portionen: {}\n", portions));
    }
    notes.push_str(&format!("📋 Methode: {}", scraped.method.label()));

    Some(FormattedRecipe {
        title,
        notes,
        image: scraped.image.clone(),
        duration_hours: scraped
            .total_time
            .as_deref()
            .and_then(parse_iso_duration_hours),
        rating: scraped.rating.map(|r| r.round() as i32),
    })
}
