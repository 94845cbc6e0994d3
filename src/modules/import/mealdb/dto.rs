use std::collections::HashMap;

use serde::Deserialize;

/// One meal record as TheMealDB returns it. Listing endpoints deliver
/// abbreviated records (no instructions); `lookup` fills in the rest.
/// The enumerated `strIngredient1..20` / `strMeasure1..20` columns are kept
/// in the flattened map and read positionally.
#[derive(Debug, Clone, Deserialize)]
pub struct MealDto {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub title: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Option<serde_json::Value>>,
}

pub const MAX_INGREDIENT_FIELDS: usize = 20;

impl MealDto {
    /// Listing endpoints omit the instruction text.
    pub fn is_abbreviated(&self) -> bool {
        self.instructions
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    }

    fn extra_text(&self, key: &str) -> &str {
        self.extra
            .get(key)
            .and_then(|v| v.as_ref())
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
    }

    /// Collect up to 20 "measure ingredient" strings, skipping empty slots.
    pub fn ingredient_pairs(&self) -> Vec<String> {
        (1..=MAX_INGREDIENT_FIELDS)
            .filter_map(|i| {
                let ingredient = self.extra_text(&format!("strIngredient{}", i));
                if ingredient.is_empty() {
                    return None;
                }
                let measure = self.extra_text(&format!("strMeasure{}", i));
                Some(format!("{} {}", measure, ingredient).trim().to_string())
            })
            .collect()
    }
}

/// TheMealDB wraps every response in `{"meals": [...]}` and signals an
/// empty result with `"meals": null`.
#[derive(Debug, Deserialize)]
pub struct MealListResponse {
    pub meals: Option<Vec<MealDto>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MealDto {
        serde_json::from_str(
            r#"{
                "idMeal": "52772",
                "strMeal": "Test Meal",
                "strCategory": "Vegetarian",
                "strArea": "Italian",
                "strInstructions": "Cook it.\nServe it.",
                "strMealThumb": "https://www.themealdb.com/images/media/meals/test.jpg",
                "strIngredient1": "Tomato",
                "strMeasure1": "2",
                "strIngredient2": "Basil",
                "strMeasure2": "1 handful",
                "strIngredient3": "",
                "strMeasure3": " ",
                "strIngredient4": null,
                "strMeasure4": null
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ingredient_pairs_skip_empty_slots() {
        let pairs = fixture().ingredient_pairs();
        assert_eq!(pairs, vec!["2 Tomato".to_string(), "1 handful Basil".to_string()]);
    }

    #[test]
    fn test_abbreviated_detection() {
        let mut meal = fixture();
        assert!(!meal.is_abbreviated());
        meal.instructions = None;
        assert!(meal.is_abbreviated());
        meal.instructions = Some("   ".to_string());
        assert!(meal.is_abbreviated());
    }

    #[test]
    fn test_null_meals_list() {
        let response: MealListResponse = serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(response.meals.is_none());
    }
}
