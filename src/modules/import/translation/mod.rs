pub mod deepl;

use async_trait::async_trait;

pub use deepl::DeepLTranslator;

/// Best-effort text translation. Implementations must degrade gracefully:
/// a failed or unconfigured translation returns the input unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> String;
}
