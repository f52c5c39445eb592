use std::time::Duration;

use regex::Regex;

use crate::naming::NamingPolicy;

const CHAPTER_PLACEHOLDER: &str = "{chapter}";

/// Target page canvas of the reading device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub width: u32,
    pub height: u32,
}

impl DeviceProfile {
    pub const KINDLE_OASIS: DeviceProfile = DeviceProfile {
        width: 1264,
        height: 1680,
    };

    /// Largest accepted width or height.
    pub const MAX_SIDE: u32 = 8192;

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides within `1..=MAX_SIDE`.
    pub fn is_supported(&self) -> bool {
        (1..=Self::MAX_SIDE).contains(&self.width) && (1..=Self::MAX_SIDE).contains(&self.height)
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::KINDLE_OASIS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRequest {
    pub chapter_id: String,
    pub source_url: String,
}

/// How the harvester finds the chapter's images and decides it has all of them.
#[derive(Debug, Clone)]
pub enum Discovery {
    /// Read the expected image URLs from the rendered DOM; done when every one
    /// of them has been captured, failed when `deadline` passes first.
    KnownCount {
        dom_selector: String,
        deadline: Duration,
    },
    /// Capture every image response whose URL matches `url_pattern`; done once
    /// `min_pages` arrived and nothing new came in for `quiet_window`.
    Settling {
        url_pattern: Regex,
        min_pages: usize,
        quiet_window: Duration,
        deadline: Duration,
    },
}

impl Discovery {
    pub fn deadline(&self) -> Duration {
        match self {
            Discovery::KnownCount { deadline, .. } | Discovery::Settling { deadline, .. } => {
                *deadline
            }
        }
    }
}

/// Everything that differs between source sites.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    /// Identifier used on the command line.
    pub name: String,
    /// Prefix of harvested file names.
    pub slug: String,
    /// Chapter URL with a `{chapter}` placeholder.
    pub url_template: String,
    pub series: String,
    pub author: String,
    pub discovery: Discovery,
}

impl SourceProfile {
    pub fn chapter_url(&self, chapter_id: &str) -> String {
        self.url_template.replace(CHAPTER_PLACEHOLDER, chapter_id)
    }

    pub fn chapter_request(&self, chapter_id: &str) -> ChapterRequest {
        ChapterRequest {
            chapter_id: chapter_id.to_string(),
            source_url: self.chapter_url(chapter_id),
        }
    }

    pub fn naming(&self) -> NamingPolicy {
        NamingPolicy::new(self.slug.clone())
    }

    /// TCB Scans One Piece: reader container lists every page up front.
    pub fn tcb_one_piece() -> Self {
        Self {
            name: "tcb-one-piece".to_string(),
            slug: "one-piece".to_string(),
            url_template: "https://ww1.tcbscans.org/manga/one-piece/chapter-{chapter}/".to_string(),
            series: "One Piece".to_string(),
            author: "Eiichiro Oda".to_string(),
            discovery: Discovery::KnownCount {
                dom_selector: ".read-container img".to_string(),
                deadline: Duration::from_secs(60),
            },
        }
    }

    /// read-onepiece.net: pages are lazy loaded, file names carry the page number.
    pub fn read_onepiece() -> Self {
        Self {
            name: "read-onepiece".to_string(),
            slug: "one-piece".to_string(),
            url_template: "https://ww3.read-onepiece.net/manga/one-piece-chapter-{chapter}/"
                .to_string(),
            series: "One Piece".to_string(),
            author: "Eiichiro Oda".to_string(),
            discovery: Discovery::Settling {
                url_pattern: one_piece_page_pattern(),
                min_pages: 5,
                quiet_window: Duration::from_secs(8),
                deadline: Duration::from_secs(120),
            },
        }
    }

    pub fn chainsaw_man() -> Self {
        Self {
            name: "chainsaw-man".to_string(),
            slug: "chainsaw-man".to_string(),
            url_template:
                "https://www.chainsaw-man-manga.online/manga/chainsaw-man-chapter-{chapter}/"
                    .to_string(),
            series: "Chainsaw Man".to_string(),
            author: "Tatsuki Fujimoto".to_string(),
            discovery: Discovery::KnownCount {
                dom_selector: "article figure img".to_string(),
                deadline: Duration::from_secs(60),
            },
        }
    }

    pub fn builtins() -> Vec<SourceProfile> {
        vec![
            Self::tcb_one_piece(),
            Self::read_onepiece(),
            Self::chainsaw_man(),
        ]
    }

    pub fn builtin(name: &str) -> Option<SourceProfile> {
        Self::builtins()
            .into_iter()
            .find(|profile| profile.name.eq_ignore_ascii_case(name.trim()))
    }
}

fn one_piece_page_pattern() -> Regex {
    Regex::new(r"one-piece-.{4}-\d+\.jpg").expect("static page pattern")
}
