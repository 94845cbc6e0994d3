pub mod scraper;
pub mod worker;

pub use scraper::{HttpPageFetcher, PageFetcher, ScrapedRecipe};
pub use worker::{site_import_worker, SiteImportParams};
