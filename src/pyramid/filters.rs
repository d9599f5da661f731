//! Deterministic 2× reduction filters for interior pyramid levels.
//!
//! Every filter maps a `2t×2t` composite to a `t×t` tile and is a pure
//! function of its input pixels, so rebuilding a tile from unchanged children
//! yields byte-identical output.
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleFilter {
    /// Alpha-weighted 2×2 average. Transparent neighbours do not darken edges.
    #[default]
    Box,
    /// Top-left sample of every 2×2 block.
    Nearest,
    /// Lanczos (a=3) resampling from the `image` crate.
    Lanczos3,
}

impl DownsampleFilter {
    /// Halve both dimensions of `src` (rounded down).
    pub fn reduce(self, src: &RgbaImage) -> RgbaImage {
        let (w, h) = (src.width() / 2, src.height() / 2);
        match self {
            Self::Box => box_2x(src, w, h),
            Self::Nearest => RgbaImage::from_fn(w, h, |x, y| *src.get_pixel(2 * x, 2 * y)),
            Self::Lanczos3 => imageops::resize(src, w, h, FilterType::Lanczos3),
        }
    }
}

fn box_2x(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let block = [
            src.get_pixel(2 * x, 2 * y).0,
            src.get_pixel(2 * x + 1, 2 * y).0,
            src.get_pixel(2 * x, 2 * y + 1).0,
            src.get_pixel(2 * x + 1, 2 * y + 1).0,
        ];
        let alpha_sum: u32 = block.iter().map(|p| u32::from(p[3])).sum();
        let mut out = [0u8; 4];
        if alpha_sum > 0 {
            for (c, slot) in out.iter_mut().take(3).enumerate() {
                let weighted: u32 = block
                    .iter()
                    .map(|p| u32::from(p[c]) * u32::from(p[3]))
                    .sum();
                *slot = ((weighted + alpha_sum / 2) / alpha_sum) as u8;
            }
        }
        out[3] = ((alpha_sum + 2) / 4) as u8;
        Rgba(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(pixels: [[u8; 4]; 4]) -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| Rgba(pixels[(y * 2 + x) as usize]))
    }

    #[test]
    fn box_filter_averages_opaque_pixels() {
        let src = quad([[0, 0, 0, 255], [255, 255, 255, 255], [100, 0, 0, 255], [0, 100, 0, 255]]);
        let out = DownsampleFilter::Box.reduce(&src);
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0).0, [89, 89, 64, 255]);
    }

    #[test]
    fn box_filter_ignores_colour_of_transparent_pixels() {
        let src = quad([[200, 40, 0, 255], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let out = DownsampleFilter::Box.reduce(&src);
        assert_eq!(out.get_pixel(0, 0).0, [200, 40, 0, 64]);

        let empty = DownsampleFilter::Box.reduce(&RgbaImage::new(4, 4));
        assert!(empty.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn every_filter_halves_dimensions_deterministically() {
        let src = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 5, 255]));
        for filter in [DownsampleFilter::Box, DownsampleFilter::Nearest, DownsampleFilter::Lanczos3] {
            let a = filter.reduce(&src);
            assert_eq!(a.dimensions(), (4, 4));
            assert_eq!(a, filter.reduce(&src), "{filter:?}");
        }
        let nearest = DownsampleFilter::Nearest.reduce(&src);
        assert_eq!(nearest.get_pixel(1, 2), src.get_pixel(2, 4));
    }
}
