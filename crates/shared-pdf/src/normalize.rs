//! Page bitmap normalization ahead of OCR

use image::{DynamicImage, GrayImage, Luma};

/// Luminance below this becomes black, everything else white
pub const BINARIZE_THRESHOLD: u8 = 180;

/// Grayscale, autocontrast, then binarize at `BINARIZE_THRESHOLD`
pub fn normalize_page(page: &DynamicImage) -> GrayImage {
    let gray = page.to_luma8();
    let stretched = autocontrast(&gray);
    binarize(&stretched, BINARIZE_THRESHOLD)
}

/// Stretch the luminance range so the darkest pixel maps to 0 and the brightest to 255.
///
/// An image with a single luminance value is returned unchanged.
pub fn autocontrast(image: &GrayImage) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let lo = histogram.iter().position(|&count| count > 0);
    let hi = histogram.iter().rposition(|&count| count > 0);

    let (lo, hi) = match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => (lo as f32, hi as f32),
        _ => return image.clone(),
    };

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let mapped = ((value as f32 - lo) * 255.0 / (hi - lo)).round() as i32;
        *slot = mapped.clamp(0, 255) as u8;
    }

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = Luma([lut[pixel[0] as usize]]);
    }
    out
}

/// Two-level image: `< threshold` → 0, otherwise 255
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] < threshold { 0 } else { 255 };
    }
    out
}
