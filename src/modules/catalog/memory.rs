//! In-memory implementations of the persistence contract, used for default
//! wiring and as test doubles.
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::entities::{NewRecipe, Recipe, User};
use super::repository::{RecipeRepository, UserRepository};
use crate::shared::errors::AppResult;

#[derive(Default)]
pub struct InMemoryRecipeRepository {
    recipes: RwLock<Vec<Recipe>>,
    next_id: AtomicI32,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self {
            recipes: RwLock::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }

    pub async fn all(&self) -> Vec<Recipe> {
        self.recipes.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.recipes.read().await.len()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn insert(&self, recipe: NewRecipe) -> AppResult<Recipe> {
        let stored = Recipe {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: recipe.title,
            image: recipe.image,
            notes: Some(recipe.notes),
            duration: recipe.duration,
            rating: recipe.rating,
            user_id: recipe.user_id,
            auto_imported: recipe.auto_imported,
            created_at: Utc::now(),
        };
        self.recipes.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<Recipe>> {
        Ok(self
            .recipes
            .read()
            .await
            .iter()
            .find(|r| r.title == title)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}
