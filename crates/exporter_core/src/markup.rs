//! Per-page XHTML fragment and the stylesheet shared by every page.

use quick_xml::escape::escape;

use crate::DeviceProfile;

/// Directory of images relative to a page document inside the package.
pub const IMAGE_DIR_FROM_PAGE: &str = "../images";

/// Identical for every page: no margins, the image fills the page.
pub const PAGE_STYLESHEET: &str = "@page {
  margin: 0;
}
body {
  display: block;
  margin: 0;
  padding: 0;
}
";

/// Title of the page section labelled `label`.
pub fn page_title(label: &str) -> String {
    format!("Page {label}")
}

/// Body fragment showing `asset_name` at the device resolution.
pub fn page_markup(asset_name: &str, device: DeviceProfile) -> String {
    format!(
        r#"<div style="text-align:center;top:0.0%;">
  <img width="{width}" height="{height}" src="{dir}/{asset}" alt="" />
</div>"#,
        width = device.width,
        height = device.height,
        dir = IMAGE_DIR_FROM_PAGE,
        asset = escape(asset_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_uses_device_size_and_image_dir() {
        let markup = page_markup("page-001.jpg", DeviceProfile::new(1264, 1680));
        assert!(markup.contains(r#"width="1264""#));
        assert!(markup.contains(r#"height="1680""#));
        assert!(markup.contains(r#"src="../images/page-001.jpg""#));
    }

    #[test]
    fn asset_names_are_escaped() {
        let markup = page_markup("a&b\".jpg", DeviceProfile::new(1, 1));
        assert!(markup.contains("a&amp;b&quot;.jpg"));
    }
}
