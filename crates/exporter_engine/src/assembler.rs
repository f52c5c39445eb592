use std::fs;
use std::path::{Path, PathBuf};

use exporter_core::markup::{page_markup, page_title, PAGE_STYLESHEET};
use exporter_core::{
    page_specs, BookMetadata, DerivedAssets, DeviceProfile, LayoutDecision, PageLayout, PageSpec,
    SpreadOrder,
};
use exporter_logging::{exporter_debug, exporter_info};

use crate::epub::EpubDocument;
use crate::imaging::{read_info, render_single, split_spread};
use crate::{AssemblyError, WriterError};

/// Turns harvested page images into a paginated book for one device.
#[derive(Debug, Clone, Default)]
pub struct ChapterAssembler {
    device: DeviceProfile,
    order: SpreadOrder,
    modified_utc: Option<String>,
}

impl ChapterAssembler {
    pub fn new(device: DeviceProfile, order: SpreadOrder) -> Self {
        Self {
            device,
            order,
            modified_utc: None,
        }
    }

    pub fn with_modified_utc(mut self, stamp: impl Into<String>) -> Self {
        self.modified_utc = Some(stamp.into());
        self
    }

    /// Renders every source into `out_dir` and returns the reading pages in
    /// order. Sources are read, never modified; any unreadable source fails
    /// the whole chapter.
    pub fn prepare_pages(
        &self,
        sources: &[PathBuf],
        out_dir: &Path,
    ) -> Result<Vec<PageSpec>, AssemblyError> {
        if sources.is_empty() {
            return Err(AssemblyError::NoPages);
        }
        fs::create_dir_all(out_dir)?;

        let infos = sources
            .iter()
            .map(|source| read_info(source))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pages = Vec::new();
        for (index, info) in infos.iter().enumerate() {
            let number = index + 1;
            let assets = DerivedAssets::in_dir(out_dir, number);
            let decision = match info.layout() {
                PageLayout::Single => {
                    render_single(&info.path, &assets.page, self.device)?;
                    LayoutDecision::Single(assets.page)
                }
                PageLayout::Spread => {
                    exporter_debug!(
                        "Page {} is a spread ({}x{})",
                        number,
                        info.width,
                        info.height
                    );
                    split_spread(&info.path, self.device, &assets)?;
                    LayoutDecision::Spread {
                        full: assets.page,
                        left: assets.left,
                        right: assets.right,
                    }
                }
            };
            pages.extend(page_specs(number, &decision, self.order));
        }
        Ok(pages)
    }

    /// Writes one section per page, in order, to `{output_dir}/{file_name}`.
    pub fn write_book(
        &self,
        pages: &[PageSpec],
        metadata: &BookMetadata,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, WriterError> {
        let mut document = EpubDocument::new(metadata.clone(), self.device, self.order);
        if let Some(stamp) = &self.modified_utc {
            document = document.modified_utc(stamp.clone());
        }
        for page in pages {
            let asset_name = document.add_image(&page.asset)?;
            document.add_stylesheet(PAGE_STYLESHEET);
            document.add_page(page_title(&page.label), page_markup(&asset_name, self.device));
        }
        document.write(output_dir, file_name)
    }

    /// Renders the pages next to the sources and writes the book.
    pub fn assemble(
        &self,
        sources: &[PathBuf],
        work_dir: &Path,
        metadata: &BookMetadata,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, AssemblyError> {
        let pages = self.prepare_pages(sources, &work_dir.join("pages"))?;
        let path = self.write_book(&pages, metadata, output_dir, file_name)?;
        exporter_info!(
            "Assembled {} pages from {} images into {}",
            pages.len(),
            sources.len(),
            path.display()
        );
        Ok(path)
    }
}
