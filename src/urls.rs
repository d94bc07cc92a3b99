/*!
 * Link resolution for generated spiders.
 *
 * Extracted links come in three flavours: absolute (`https://...`),
 * protocol-relative (`//cdn.example.com/...`) and relative (`../page.html`).
 * `resolve_url` turns all of them into absolute URLs against the page they
 * were found on.
 */

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ABSOLUTE_HTTP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?").expect("valid absolute url pattern"));

/// Resolve `href` found on `page_url` into an absolute URL
pub fn resolve_url(page_url: &str, href: &str) -> Result<String> {
    if ABSOLUTE_HTTP.is_match(href) {
        return Ok(href.to_string());
    }

    let base = Url::parse(page_url)
        .with_context(|| format!("Invalid page url: {}", page_url))?;

    if href.starts_with("//") {
        return Ok(format!("{}:{}", base.scheme(), href));
    }

    let joined = base
        .join(href)
        .with_context(|| format!("Cannot join '{}' onto '{}'", href, page_url))?;
    Ok(joined.to_string())
}
