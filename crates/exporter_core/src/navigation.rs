use url::Url;

/// What to do with a paused browser request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    Continue,
    Abort,
}

/// Document requests may only load the chapter page itself. Redirect and ad
/// chains that try to move the session elsewhere are aborted; sub-resources
/// (images, scripts, styles) always continue.
pub fn guard_request(target_url: &str, request_url: &str, is_document: bool) -> InterceptDecision {
    if !is_document || same_document(target_url, request_url) {
        InterceptDecision::Continue
    } else {
        InterceptDecision::Abort
    }
}

/// URL equality ignoring fragment, trailing slash and scheme/host case.
pub fn same_document(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

fn normalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    let mut normalized = url.to_string();
    if url.query().is_none() && normalized.ends_with('/') {
        normalized.pop();
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://ww1.tcbscans.org/manga/one-piece/chapter-1070/";

    #[test]
    fn chapter_document_continues() {
        assert_eq!(guard_request(TARGET, TARGET, true), InterceptDecision::Continue);
        assert_eq!(
            guard_request(TARGET, "https://WW1.tcbscans.org/manga/one-piece/chapter-1070#p2", true),
            InterceptDecision::Continue
        );
    }

    #[test]
    fn foreign_document_is_aborted() {
        assert_eq!(
            guard_request(TARGET, "https://ads.example.com/landing", true),
            InterceptDecision::Abort
        );
        assert_eq!(
            guard_request(TARGET, "https://ww1.tcbscans.org/manga/one-piece/chapter-1071/", true),
            InterceptDecision::Abort
        );
    }

    #[test]
    fn sub_resources_always_continue() {
        assert_eq!(
            guard_request(TARGET, "https://ads.example.com/banner.png", false),
            InterceptDecision::Continue
        );
    }
}
