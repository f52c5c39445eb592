//! Minimal fixed-layout EPUB 3 writer for image-only books.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use exporter_core::{BookMetadata, DeviceProfile, SpreadOrder};
use exporter_logging::exporter_debug;
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::persist::AtomicFileWriter;
use crate::WriterError;

const MIMETYPE: &str = "application/epub+zip";
const STYLESHEET_HREF: &str = "css/ebook.css";
const UNSET_MODIFIED: &str = "1970-01-01T00:00:00Z";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

#[derive(Debug, Clone)]
struct ImageAsset {
    name: String,
    source: PathBuf,
    media_type: &'static str,
}

#[derive(Debug, Clone)]
struct PageDocument {
    title: String,
    markup: String,
}

/// Book under construction. Pages keep insertion order; that order is the
/// spine.
#[derive(Debug)]
pub struct EpubDocument {
    metadata: BookMetadata,
    device: DeviceProfile,
    order: SpreadOrder,
    modified: String,
    images: Vec<ImageAsset>,
    pages: Vec<PageDocument>,
    stylesheets: Vec<String>,
}

impl EpubDocument {
    pub fn new(metadata: BookMetadata, device: DeviceProfile, order: SpreadOrder) -> Self {
        Self {
            metadata,
            device,
            order,
            modified: UNSET_MODIFIED.to_string(),
            images: Vec::new(),
            pages: Vec::new(),
            stylesheets: Vec::new(),
        }
    }

    /// `dcterms:modified`, e.g. `2024-03-01T12:00:00Z`.
    pub fn modified_utc(mut self, stamp: impl Into<String>) -> Self {
        self.modified = stamp.into();
        self
    }

    /// Registers an image file; returns its name inside the package.
    pub fn add_image(&mut self, source: &Path) -> Result<String, WriterError> {
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| WriterError::MissingAsset {
                path: source.to_path_buf(),
                message: "no file name".to_string(),
            })?
            .to_string();
        if name == self.cover_name() || self.images.iter().any(|image| image.name == name) {
            return Err(WriterError::DuplicateAsset(name));
        }
        self.images.push(ImageAsset {
            media_type: media_type(source),
            name: name.clone(),
            source: source.to_path_buf(),
        });
        Ok(name)
    }

    pub fn add_page(&mut self, title: impl Into<String>, markup: impl Into<String>) {
        self.pages.push(PageDocument {
            title: title.into(),
            markup: markup.into(),
        });
    }

    /// Identical stylesheets are stored once.
    pub fn add_stylesheet(&mut self, css: &str) {
        if !self.stylesheets.iter().any(|existing| existing == css) {
            self.stylesheets.push(css.to_string());
        }
    }

    /// Writes `{output_dir}/{file_name}`. The file only appears once the
    /// package is complete.
    pub fn write(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf, WriterError> {
        let missing = self.metadata.missing_fields();
        if !missing.is_empty() {
            return Err(WriterError::EmptyMetadata(missing));
        }
        let writer = AtomicFileWriter::new(output_dir.to_path_buf())?;
        let path = writer.write_with(file_name, |file: &mut File| self.write_package(file))?;
        exporter_debug!("Wrote {} pages to {}", self.pages.len(), path.display());
        Ok(path)
    }

    fn write_package<W: Write + Seek>(&self, out: W) -> Result<(), WriterError> {
        let mut zip = ZipWriter::new(out);
        let stored = entry_options(CompressionMethod::Stored);
        let deflated = entry_options(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        zip.start_file("OEBPS/content.opf", deflated)?;
        zip.write_all(self.package_opf().as_bytes())?;

        zip.start_file("OEBPS/nav.xhtml", deflated)?;
        zip.write_all(self.nav_xhtml().as_bytes())?;

        zip.start_file("OEBPS/toc.ncx", deflated)?;
        zip.write_all(self.toc_ncx().as_bytes())?;

        zip.start_file(format!("OEBPS/{STYLESHEET_HREF}"), deflated)?;
        zip.write_all(self.stylesheets.join("\n").as_bytes())?;

        for (index, page) in self.pages.iter().enumerate() {
            zip.start_file(format!("OEBPS/content/{}.xhtml", page_id(index)), deflated)?;
            zip.write_all(self.page_xhtml(page).as_bytes())?;
        }

        // JPEG data does not shrink; store it.
        zip.start_file(format!("OEBPS/images/{}", self.cover_name()), stored)?;
        copy_asset(&self.metadata.cover_path, &mut zip)?;
        for image in &self.images {
            zip.start_file(format!("OEBPS/images/{}", image.name), stored)?;
            copy_asset(&image.source, &mut zip)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn cover_name(&self) -> String {
        let extension = self
            .metadata
            .cover_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        format!("cover.{extension}")
    }

    fn writing_mode(&self) -> &'static str {
        match self.order {
            SpreadOrder::RightToLeft => "horizontal-rl",
            SpreadOrder::LeftToRight => "horizontal-lr",
        }
    }

    fn package_opf(&self) -> String {
        let meta = &self.metadata;
        let mut opf = String::new();
        let _ = write!(
            opf,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId" prefix="rendition: http://www.idpf.org/vocab/rendition/#">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:identifier id="BookId">{id}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{language}</dc:language>
    <dc:creator>{author}</dc:creator>
    <meta property="dcterms:modified">{modified}</meta>
    <meta property="belongs-to-collection" id="series">{series}</meta>
    <meta refines="#series" property="collection-type">series</meta>
    <meta name="cover" content="cover-image"/>
    <meta property="rendition:layout">pre-paginated</meta>
    <meta property="rendition:spread">none</meta>
    <meta property="rendition:orientation">portrait</meta>
    <meta name="fixed-layout" content="true"/>
    <meta name="book-type" content="comic"/>
    <meta name="original-resolution" content="{width}x{height}"/>
    <meta name="primary-writing-mode" content="{mode}"/>
    <meta name="zero-gutter" content="true"/>
    <meta name="zero-margin" content="true"/>
    <meta name="RegionMagnification" content="false"/>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="css" href="{css}" media-type="text/css"/>
    <item id="cover-image" href="images/{cover}" media-type="{cover_type}" properties="cover-image"/>
"##,
            id = escape(meta.id.as_str()),
            title = escape(meta.title.as_str()),
            language = escape(meta.language.as_str()),
            author = escape(meta.author.as_str()),
            modified = escape(self.modified.as_str()),
            series = escape(meta.series.as_str()),
            width = self.device.width,
            height = self.device.height,
            mode = self.writing_mode(),
            css = STYLESHEET_HREF,
            cover = escape(self.cover_name().as_str()),
            cover_type = media_type(&meta.cover_path),
        );
        for (index, image) in self.images.iter().enumerate() {
            let _ = writeln!(
                opf,
                r#"    <item id="img{:04}" href="images/{}" media-type="{}"/>"#,
                index + 1,
                escape(image.name.as_str()),
                image.media_type
            );
        }
        for index in 0..self.pages.len() {
            let id = page_id(index);
            let _ = writeln!(
                opf,
                r#"    <item id="{id}" href="content/{id}.xhtml" media-type="application/xhtml+xml"/>"#
            );
        }
        let _ = writeln!(opf, "  </manifest>");
        let _ = writeln!(
            opf,
            r#"  <spine toc="ncx" page-progression-direction="{}">"#,
            self.order.progression()
        );
        for index in 0..self.pages.len() {
            let _ = writeln!(opf, r#"    <itemref idref="{}"/>"#, page_id(index));
        }
        opf.push_str("  </spine>\n</package>\n");
        opf
    }

    fn page_xhtml(&self, page: &PageDocument) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <title>{title}</title>
  <link href="../{css}" rel="stylesheet" type="text/css"/>
  <meta name="viewport" content="width={width}, height={height}"/>
</head>
<body>
{markup}
</body>
</html>
"#,
            title = escape(page.title.as_str()),
            css = STYLESHEET_HREF,
            width = self.device.width,
            height = self.device.height,
            markup = page.markup,
        )
    }

    /// Navigation document; listed in the manifest but not in the spine.
    fn nav_xhtml(&self) -> String {
        let mut entries = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            let _ = writeln!(
                entries,
                r#"      <li><a href="content/{}.xhtml">{}</a></li>"#,
                page_id(index),
                escape(page.title.as_str())
            );
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <ol>
{entries}    </ol>
  </nav>
</body>
</html>
"#,
            title = escape(self.metadata.title.as_str()),
        )
    }

    fn toc_ncx(&self) -> String {
        let mut points = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            let id = page_id(index);
            let _ = write!(
                points,
                r#"    <navPoint id="nav-{id}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="content/{id}.xhtml"/>
    </navPoint>
"#,
                order = index + 1,
                title = escape(page.title.as_str()),
            );
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{id}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#,
            id = escape(self.metadata.id.as_str()),
            title = escape(self.metadata.title.as_str()),
        )
    }
}

/// Fixed timestamps keep repeated runs byte-identical.
fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
}

fn page_id(index: usize) -> String {
    format!("p{:04}", index + 1)
}

fn media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn copy_asset<W: Write>(source: &Path, out: &mut W) -> Result<(), WriterError> {
    let mut file = File::open(source).map_err(|err| WriterError::MissingAsset {
        path: source.to_path_buf(),
        message: err.to_string(),
    })?;
    io::copy(&mut file, out)?;
    Ok(())
}
