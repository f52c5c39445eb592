use std::path::PathBuf;

/// How one source image is laid out on the reading device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Portrait or square artwork: one reading page.
    Single,
    /// Landscape artwork spanning two reading pages.
    Spread,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl PageImageInfo {
    pub fn layout(&self) -> PageLayout {
        classify(self.width, self.height)
    }
}

/// Strictly wider than tall is a spread; everything else, squares included,
/// is a single page.
pub fn classify(width: u32, height: u32) -> PageLayout {
    if width > height {
        PageLayout::Spread
    } else {
        PageLayout::Single
    }
}
