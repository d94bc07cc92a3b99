/*!
 * Pack/unpack codec for batching two fields into one translation call.
 *
 * Title and content are joined with a delimiter, translated together and
 * split again. Nothing is escaped: when a field contains the delimiter, or the
 * translation rewrites it, the split yields more or fewer than two segments.
 * Callers must check `CertTranslation::into_fields` before trusting the split.
 */

use log::debug;

use crate::errors::ProviderError;
use crate::providers::Translator;

/// Default delimiter, a token unlikely to appear in scraped text
pub const DEFAULT_DELIMITER: &str = "分隔符";

/// Join `title` and `content` with `delimiter`
pub fn pack(title: &str, content: &str, delimiter: &str) -> String {
    format!("{}{}{}", title, delimiter, content)
}

/// Split `text` on every occurrence of `delimiter`
pub fn unpack(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter).map(str::to_string).collect()
}

/// Result of translating a packed title and content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertTranslation {
    /// Title was empty: the translation after the delimiter is the content
    Whole(String),
    /// Translation split on the delimiter
    Segments(Vec<String>),
}

impl CertTranslation {
    /// Translated `(title, content)`, when the split is unambiguous
    pub fn into_fields(self) -> Option<(String, String)> {
        match self {
            CertTranslation::Whole(content) => Some((String::new(), content)),
            CertTranslation::Segments(segments) => {
                let [title, content]: [String; 2] = segments.try_into().ok()?;
                Some((title, content))
            }
        }
    }
}

/// Translate title and content with a single call
///
/// Returns `Ok(None)` when the translator produced nothing.
pub async fn cert_translate(
    translator: &dyn Translator,
    title: &str,
    content: &str,
    delimiter: &str,
    target_language: &str,
) -> Result<Option<CertTranslation>, ProviderError> {
    let packed = pack(title, content, delimiter);
    let Some(translated) = translator.translate(&packed, target_language).await? else {
        return Ok(None);
    };

    let mut segments = unpack(&translated, delimiter);
    debug!("Packed translation split into {} segment(s)", segments.len());

    // With no title, whatever precedes the delimiter is dropped
    if title.is_empty() && segments.len() == 2 {
        if let Some(content) = segments.pop() {
            return Ok(Some(CertTranslation::Whole(content)));
        }
    }

    Ok(Some(CertTranslation::Segments(segments)))
}
