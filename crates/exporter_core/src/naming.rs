//! Page file naming.
//!
//! Harvested images are stored as `{slug}-{chapter}-{NN}.jpg`. The page token
//! is always two digits so that a plain string sort of the file names is the
//! reading order ("02" sorts before "10", "2" would not).

/// Highest page number that still fits the two digit token.
pub const MAX_PAGE_NUMBER: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("no trailing page number in {identifier}")]
    MissingMarker { identifier: String },
    #[error("page number {number} does not fit the two digit page token")]
    MarkerOutOfRange { number: u32 },
}

/// Stable per-image identifier a file name is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey<'a> {
    /// The trailing number of the image URL is the page number.
    SourceUrl(&'a str),
    /// Zero-based position of the image in the rendered chapter DOM.
    DomIndex(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    slug: String,
}

impl NamingPolicy {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn file_name(&self, chapter_id: &str, key: PageKey<'_>) -> Result<String, NamingError> {
        let number = match key {
            PageKey::SourceUrl(url) => page_marker(url).ok_or_else(|| NamingError::MissingMarker {
                identifier: url.to_string(),
            })?,
            PageKey::DomIndex(index) => u32::try_from(index + 1)
                .map_err(|_| NamingError::MarkerOutOfRange { number: u32::MAX })?,
        };
        let token = padded_token(number)?;
        Ok(format!("{}-{}-{}.jpg", self.slug, chapter_id, token))
    }
}

/// Trailing page number of a URL or path: `.../one-piece-1070-3.jpg?x=1` -> 3.
pub fn page_marker(identifier: &str) -> Option<u32> {
    let without_query = identifier
        .split(['?', '#'])
        .next()
        .unwrap_or(identifier);
    let segment = without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query);
    let stem = match segment.rfind('.') {
        Some(dot) if dot > 0 => &segment[..dot],
        _ => segment,
    };

    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    stem[digits_start..].parse().ok()
}

/// Single digit numbers get one leading zero; two digit numbers pass through.
pub fn padded_token(number: u32) -> Result<String, NamingError> {
    if number > MAX_PAGE_NUMBER {
        return Err(NamingError::MarkerOutOfRange { number });
    }
    Ok(format!("{number:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_ignores_extension_and_query() {
        assert_eq!(page_marker("https://cdn.example/one-piece-1070-3.jpg"), Some(3));
        assert_eq!(page_marker("https://cdn.example/p/12.png?w=800#top"), Some(12));
        assert_eq!(page_marker("C:\\tmp\\page-7.webp"), Some(7));
    }

    #[test]
    fn marker_requires_trailing_digits() {
        assert_eq!(page_marker("https://cdn.example/cover.jpg"), None);
        assert_eq!(page_marker("https://cdn.example/page-3a.jpg"), None);
        assert_eq!(page_marker("https://cdn.example/"), None);
    }

    #[test]
    fn dotfile_stem_is_kept() {
        assert_eq!(page_marker("/x/.42"), Some(42));
    }
}
