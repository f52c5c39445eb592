//! Page rendering: contain-fit, spread splitting and border trimming.

use std::fs;
use std::path::Path;

use exporter_core::{DerivedAssets, DeviceProfile, PageImageInfo};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgb, RgbImage, Rgba, RgbaImage};

use crate::AssemblyError;

pub const JPEG_QUALITY: u8 = 90;
/// Largest per-channel difference still counted as border colour.
pub const TRIM_THRESHOLD: u8 = 10;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Dimensions from the image header; the file extension is not trusted.
pub fn read_info(path: &Path) -> Result<PageImageInfo, AssemblyError> {
    let (width, height) = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| AssemblyError::unreadable(path, err))?
        .into_dimensions()
        .map_err(|err| AssemblyError::unreadable(path, err))?;
    Ok(PageImageInfo {
        path: path.to_path_buf(),
        width,
        height,
    })
}

fn decode_rgb(path: &Path) -> Result<RgbImage, AssemblyError> {
    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| AssemblyError::unreadable(path, err))?
        .decode()
        .map_err(|err| AssemblyError::unreadable(path, err))?;
    Ok(flatten(decoded))
}

/// Transparent pixels end up white, like the page background.
fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Largest size with the aspect ratio of `(width, height)` fitting the box.
fn contain_dimensions(width: u32, height: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(box_w) / f64::from(width.max(1)),
        f64::from(box_h) / f64::from(height.max(1)),
    );
    let fit_w = (f64::from(width) * scale).round() as u32;
    let fit_h = (f64::from(height) * scale).round() as u32;
    (fit_w.clamp(1, box_w.max(1)), fit_h.clamp(1, box_h.max(1)))
}

/// Scales `image` to fit `(width, height)` and centres it on a white canvas
/// of exactly that size.
pub fn fit_contain(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (content_w, content_h) = contain_dimensions(image.width(), image.height(), width, height);
    let resized = if (content_w, content_h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, content_w, content_h, FilterType::CatmullRom)
    };
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);
    let offset_x = i64::from((width - content_w) / 2);
    let offset_y = i64::from((height - content_h) / 2);
    imageops::overlay(&mut canvas, &resized, offset_x, offset_y);
    canvas
}

/// Cuts away the uniform border whose colour is the top-left pixel. An image
/// that is border only is returned unchanged.
pub fn trim_uniform_border(image: &RgbImage, threshold: u8) -> RgbImage {
    let Some(reference) = image.get_pixel_checked(0, 0).copied() else {
        return image.clone();
    };
    let differs = |pixel: &Rgb<u8>| {
        pixel
            .0
            .iter()
            .zip(reference.0.iter())
            .any(|(a, b)| a.abs_diff(*b) > threshold)
    };

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if differs(pixel) {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => {
            imageops::crop_imm(image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => image.clone(),
    }
}

pub fn encode_jpeg(image: &RgbImage, path: &Path) -> Result<(), AssemblyError> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|err| AssemblyError::ImageEncoding {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Portrait page: contain-fit to the device and re-encode under `dest`.
pub fn render_single(source: &Path, dest: &Path, device: DeviceProfile) -> Result<(), AssemblyError> {
    let image = decode_rgb(source)?;
    encode_jpeg(&fit_contain(&image, device.width, device.height), dest)
}

/// Landscape spread: writes the rotated full page and both halves, each at
/// the device size. `source` is only read.
pub fn split_spread(
    source: &Path,
    device: DeviceProfile,
    assets: &DerivedAssets,
) -> Result<(), AssemblyError> {
    let (width, height) = (device.width, device.height);
    let spread_width = width.checked_mul(2).ok_or_else(|| AssemblyError::ImageEncoding {
        path: source.to_path_buf(),
        message: format!("device width {width} is too large for a spread"),
    })?;
    let image = decode_rgb(source)?;
    let spread = fit_contain(&image, spread_width, height);

    let full = imageops::rotate270(&spread);
    encode_jpeg(&fit_contain(&full, width, height), &assets.page)?;

    let left = imageops::crop_imm(&spread, 0, 0, width, height).to_image();
    let left = trim_uniform_border(&left, TRIM_THRESHOLD);
    encode_jpeg(&fit_contain(&left, width, height), &assets.left)?;

    let right = imageops::crop_imm(&spread, width, 0, width, height).to_image();
    let right = trim_uniform_border(&right, TRIM_THRESHOLD);
    encode_jpeg(&fit_contain(&right, width, height), &assets.right)?;
    Ok(())
}
