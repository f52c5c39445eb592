use std::path::Path;

use exporter_core::{DerivedAssets, DeviceProfile, PageLayout};
use exporter_engine::imaging::{fit_contain, read_info, split_spread};
use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn save(dir: &Path, name: &str, image: &RgbImage) -> std::path::PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

#[test]
fn header_dimensions_drive_layout() {
    let temp = TempDir::new().unwrap();
    let spread = save(temp.path(), "wide.jpg", &RgbImage::new(300, 200));
    let square = save(temp.path(), "square.jpg", &RgbImage::new(200, 200));

    let info = read_info(&spread).unwrap();
    assert_eq!((info.width, info.height), (300, 200));
    assert_eq!(info.layout(), PageLayout::Spread);
    assert_eq!(read_info(&square).unwrap().layout(), PageLayout::Single);
}

#[test]
fn png_data_behind_jpg_name_is_read() {
    let temp = TempDir::new().unwrap();
    let png = save(temp.path(), "page.png", &RgbImage::new(40, 60));
    let disguised = temp.path().join("one-piece-1070-01.jpg");
    std::fs::rename(&png, &disguised).unwrap();

    let info = read_info(&disguised).unwrap();
    assert_eq!((info.width, info.height), (40, 60));
}

#[test]
fn contain_fit_pads_with_white() {
    let image = RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]));
    let fitted = fit_contain(&image, 100, 100);

    assert_eq!(fitted.dimensions(), (100, 100));
    assert_eq!(fitted.get_pixel(50, 5), &Rgb([255, 255, 255]));
    assert_eq!(fitted.get_pixel(50, 50), &Rgb([0, 0, 0]));
}

#[test]
fn spread_yields_three_device_sized_pages() {
    let temp = TempDir::new().unwrap();
    let mut image = RgbImage::from_pixel(400, 300, Rgb([255, 255, 255]));
    for x in 20..380 {
        for y in 20..280 {
            let shade = if x < 200 { 30 } else { 200 };
            image.put_pixel(x, y, Rgb([shade, shade, shade]));
        }
    }
    let source = save(temp.path(), "spread.png", &image);
    let device = DeviceProfile::new(60, 80);
    let assets = DerivedAssets::in_dir(temp.path(), 7);

    split_spread(&source, device, &assets).unwrap();

    for path in [&assets.page, &assets.left, &assets.right] {
        assert_eq!(image::image_dimensions(path).unwrap(), (60, 80));
    }
    let left = image::open(&assets.left).unwrap().to_rgb8();
    let right = image::open(&assets.right).unwrap().to_rgb8();
    assert!(left.get_pixel(30, 40)[0] < 100);
    assert!(right.get_pixel(30, 40)[0] > 150);
}
