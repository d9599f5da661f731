//! Pixel operations on RGBA tiles: placeholders, parcel normalisation and
//! the 2×2 composite that feeds the pyramid downsampler.
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::warn;

/// Fully transparent tile; the content of every empty grid slot.
pub fn placeholder_tile(tile_size: u32) -> RgbaImage {
    RgbaImage::new(tile_size, tile_size)
}

/// Bring a decoded parcel to `tile_size`² pixels. Mis-sized parcels are
/// resampled with a triangle filter and reported.
pub fn fit_to_tile(image: RgbaImage, tile_size: u32, label: &str) -> RgbaImage {
    if image.dimensions() == (tile_size, tile_size) {
        return image;
    }
    warn!(
        "{label} is {}x{}, expected {tile_size}x{tile_size}; resampling",
        image.width(),
        image.height()
    );
    imageops::resize(&image, tile_size, tile_size, FilterType::Triangle)
}

/// Snap colour channels to pure black or white by luma, keeping alpha.
pub fn snap_monochrome(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let [r, g, b, a] = px.0;
        // Rec. 601 integer luma.
        let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
        let v = if luma >= 128 { 255 } else { 0 };
        *px = Rgba([v, v, v, a]);
    }
}

/// Place four `t×t` children on a `2t×2t` canvas in the order
/// top-left, top-right, bottom-left, bottom-right.
pub fn composite_quad(children: &[RgbaImage], tile_size: u32) -> RgbaImage {
    debug_assert_eq!(children.len(), 4);
    let mut canvas = RgbaImage::new(tile_size * 2, tile_size * 2);
    for (i, child) in children.iter().enumerate() {
        let dx = (i as u32 % 2) * tile_size;
        let dy = (i as u32 / 2) * tile_size;
        imageops::replace(&mut canvas, child, i64::from(dx), i64::from(dy));
    }
    canvas
}
