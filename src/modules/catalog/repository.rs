//! Persistence collaborator contract
//!
//! Record storage is owned by an external data-access layer; the import
//! pipeline only needs this narrow slice of its create/read surface.
use async_trait::async_trait;

use super::entities::{NewRecipe, Recipe, User};
use crate::shared::errors::AppResult;

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn insert(&self, recipe: NewRecipe) -> AppResult<Recipe>;

    /// Exact title match; the batch importer's duplicate check.
    async fn find_by_title(&self, title: &str) -> AppResult<Option<Recipe>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}
