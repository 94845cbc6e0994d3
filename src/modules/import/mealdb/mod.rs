pub mod client;
pub mod dto;
pub mod strategy;
pub mod worker;

pub use client::{MealApi, MealDbClient};
pub use dto::MealDto;
pub use worker::{meal_import_worker, MealImportParams};
