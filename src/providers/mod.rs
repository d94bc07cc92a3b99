/*!
 * Translation providers.
 *
 * This module contains the client for the translation HTTP API and a mock
 * implementation used by tests and dry runs:
 * - `baidu`: signed requests against the Baidu general translation API
 * - `mock`: scripted in-process translator
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Target language used when none is given
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Common trait for all translation providers
///
/// Pipelines only talk to this trait, so a provider can be swapped for a mock
/// without touching the orchestration code.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` into `target_language`
    ///
    /// # Returns
    /// * `Ok(Some(text))` - the translated text
    /// * `Ok(None)` - the service answered but produced no usable translation
    /// * `Err(ProviderError)` - transport, HTTP or decoding failure
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Option<String>, ProviderError>;

    /// Translate `text` into the default target language
    async fn translate_default(&self, text: &str) -> Result<Option<String>, ProviderError> {
        self.translate(text, DEFAULT_TARGET_LANGUAGE).await
    }

    /// Short provider name for logs
    fn name(&self) -> &str;
}

pub mod baidu;
pub mod mock;

pub use baidu::BaiduTranslator;
pub use mock::MockTranslator;
