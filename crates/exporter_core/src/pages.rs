use std::path::{Path, PathBuf};

/// One reading page of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub label: String,
    pub asset: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutDecision {
    Single(PathBuf),
    Spread {
        full: PathBuf,
        left: PathBuf,
        right: PathBuf,
    },
}

/// Which half of a spread is read first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadOrder {
    /// Manga convention: right tile first, `[full, right, left]`.
    #[default]
    RightToLeft,
    /// `[full, left, right]`.
    LeftToRight,
}

impl SpreadOrder {
    /// Value of the package's `page-progression-direction`.
    pub fn progression(self) -> &'static str {
        match self {
            SpreadOrder::RightToLeft => "rtl",
            SpreadOrder::LeftToRight => "ltr",
        }
    }
}

/// Expands one source page into its reading pages. `number` is 1-based.
pub fn page_specs(number: usize, decision: &LayoutDecision, order: SpreadOrder) -> Vec<PageSpec> {
    match decision {
        LayoutDecision::Single(asset) => vec![PageSpec {
            label: number.to_string(),
            asset: asset.clone(),
        }],
        LayoutDecision::Spread { full, left, right } => {
            let (first, second) = match order {
                SpreadOrder::RightToLeft => (right, left),
                SpreadOrder::LeftToRight => (left, right),
            };
            vec![
                PageSpec {
                    label: number.to_string(),
                    asset: full.clone(),
                },
                PageSpec {
                    label: format!("{number} - 1"),
                    asset: first.clone(),
                },
                PageSpec {
                    label: format!("{number} - 2"),
                    asset: second.clone(),
                },
            ]
        }
    }
}

/// Where the derivatives of source page `number` are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAssets {
    pub page: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
}

impl DerivedAssets {
    pub fn in_dir(dir: &Path, number: usize) -> Self {
        Self {
            page: dir.join(format!("page-{number:03}.jpg")),
            left: dir.join(format!("page-{number:03}-left.jpg")),
            right: dir.join(format!("page-{number:03}-right.jpg")),
        }
    }
}

/// Reading pages produced for `singles` single pages and `spreads` spreads.
pub fn expected_page_count(singles: usize, spreads: usize) -> usize {
    singles + 3 * spreads
}
