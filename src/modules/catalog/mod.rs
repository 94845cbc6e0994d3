//! Record persistence contract for the recipe catalog
//!
//! Data access is an external collaborator; this module carries the entities
//! and the trait seam the import workers write through, plus in-memory
//! implementations for default wiring and tests.
pub mod entities;
pub mod memory;
pub mod repository;

pub use entities::{NewRecipe, Recipe, User};
pub use memory::{InMemoryRecipeRepository, InMemoryUserRepository};
pub use repository::{RecipeRepository, UserRepository};
