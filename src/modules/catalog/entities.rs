use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A diary user. Auto-imported recipes belong to a designated non-human
/// import account, resolved by its sentinel email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// A stored recipe as the persistence collaborator returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub image: Option<String>,
    pub notes: Option<String>,
    pub duration: Option<f64>,
    pub rating: Option<i32>,
    pub user_id: i32,
    pub auto_imported: bool,
    pub created_at: DateTime<Utc>,
}

/// A recipe to be persisted. The import pipeline always sets
/// `auto_imported` and attributes the record to the import user.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub image: Option<String>,
    pub notes: String,
    pub duration: Option<f64>,
    pub rating: Option<i32>,
    pub user_id: i32,
    pub auto_imported: bool,
}
