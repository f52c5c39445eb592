use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Attributes checked in order; lazy loaders keep the real URL in `data-*`
/// until the image scrolls into view.
const SOURCE_ATTRIBUTES: [&str; 3] = ["src", "data-src", "data-lazy-src"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Absolute image URLs of the elements matching `selector`, in document order.
pub fn image_sources(html: &str, base_url: &str, selector: &str) -> Result<Vec<String>, DomError> {
    let parsed = Selector::parse(selector).map_err(|err| DomError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })?;
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let urls = document
        .select(&parsed)
        .filter_map(|element| {
            SOURCE_ATTRIBUTES
                .iter()
                .filter_map(|name| element.value().attr(name))
                .find_map(|raw| resolve_url(raw, base.as_ref()))
        })
        .map(String::from)
        .collect();
    Ok(urls)
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("data:") || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
