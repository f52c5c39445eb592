use std::path::PathBuf;

use crate::SourceProfile;

/// Metadata handed through to the book writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub id: String,
    pub title: String,
    pub series: String,
    pub language: String,
    pub author: String,
    pub cover_path: PathBuf,
}

impl BookMetadata {
    /// Default metadata for a chapter of `profile`, e.g. id
    /// `one-piece-weekly-1070`, title `One Piece - Chapter 1070`.
    pub fn for_chapter(
        profile: &SourceProfile,
        chapter_id: &str,
        language: &str,
        cover_path: PathBuf,
    ) -> Self {
        Self {
            id: format!("{}-weekly-{}", profile.slug, chapter_id),
            title: format!("{} - Chapter {}", profile.series, chapter_id),
            series: profile.series.clone(),
            language: language.to_string(),
            author: profile.author.clone(),
            cover_path,
        }
    }

    /// Names of identifying fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.trim().is_empty() {
            missing.push("id");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.language.trim().is_empty() {
            missing.push("language");
        }
        missing
    }
}
