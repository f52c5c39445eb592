use std::fmt;

/// Why a harvest produced no chapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarvestFailure {
    #[error("navigation did not finish within the timeout")]
    NavigationTimeout,
    #[error("no chapter pages found ({matched} matching images)")]
    NoPagesFound { matched: usize },
    #[error("only {found} pages arrived, at least {minimum} required")]
    TooFewPages { found: usize, minimum: usize },
    #[error("{} expected page(s) never arrived: {}", missing.len(), MissingList(missing))]
    UnmatchedResponse { missing: Vec<String> },
    #[error("cannot derive a page file name for {url}: {reason}")]
    UnnamedPage { url: String, reason: String },
}

struct MissingList<'a>(&'a [String]);

impl fmt::Display for MissingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 3;
        for (idx, url) in self.0.iter().take(SHOWN).enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{url}")?;
        }
        if self.0.len() > SHOWN {
            write!(f, ", ...")?;
        }
        Ok(())
    }
}
