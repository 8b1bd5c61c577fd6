//! Per-pixel operations on decoded tiles.

use image::{GrayImage, Luma, RgbaImage};

/// Mask value for pixels with data.
pub const MASK_ON: u8 = 255;

/// Binary coverage mask: `MASK_ON` wherever the image's alpha is non-zero.
pub fn content_mask(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y)[3] != 0 {
            Luma([MASK_ON])
        } else {
            Luma([0])
        }
    })
}

/// Binary coverage mask from a single-band mask raster: `MASK_ON` wherever
/// the value is non-zero.
pub fn value_mask(mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y)[0] != 0 {
            Luma([MASK_ON])
        } else {
            Luma([0])
        }
    })
}

/// Linear cross blend `a * (1 - f) + b * f` on every channel.
///
/// Both images must have the same dimensions.
pub fn cross_blend(a: &RgbaImage, b: &RgbaImage, factor: f32) -> RgbaImage {
    let f = factor.clamp(0.0, 1.0);
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        for c in 0..4 {
            let mixed = f32::from(dst[c]) * (1.0 - f) + f32::from(src[c]) * f;
            dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Rewrites the alpha channel of `image`.
///
/// A pixel stays visible only inside `mask` and where `alpha_source` is
/// opaque (or, with `outside`, where it is fully transparent).
pub fn apply_alpha(image: &mut RgbaImage, mask: &GrayImage, alpha_source: &RgbaImage, outside: bool) {
    for ((pixel, m), src) in image
        .pixels_mut()
        .zip(mask.pixels())
        .zip(alpha_source.pixels())
    {
        let covered = if outside { src[3] == 0 } else { src[3] != 0 };
        pixel[3] = if m[0] != 0 && covered { 255 } else { 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_content_mask() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        img.put_pixel(1, 0, Rgba([9, 9, 9, 0]));
        let mask = content_mask(&img);
        assert_eq!(mask.get_pixel(0, 0)[0], MASK_ON);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
    }

    #[test]
    fn test_value_mask() {
        let mut gray = GrayImage::from_pixel(3, 1, Luma([255]));
        gray.put_pixel(1, 0, Luma([0]));
        gray.put_pixel(2, 0, Luma([1]));
        let mask = value_mask(&gray);
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![MASK_ON, 0, MASK_ON]);
    }

    #[test]
    fn test_cross_blend_endpoints_and_midpoint() {
        let a = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 255]));
        let b = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 200, 255]));
        assert_eq!(cross_blend(&a, &b, 0.0).get_pixel(0, 0), &Rgba([200, 100, 0, 255]));
        assert_eq!(cross_blend(&a, &b, 1.0).get_pixel(0, 0), &Rgba([0, 100, 200, 255]));
        assert_eq!(cross_blend(&a, &b, 0.5).get_pixel(0, 0), &Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn test_apply_alpha_inside_and_outside() {
        let mut mask = GrayImage::from_pixel(3, 1, Luma([MASK_ON]));
        mask.put_pixel(2, 0, Luma([0]));
        let mut alpha = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]));
        alpha.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        alpha.put_pixel(2, 0, Rgba([0, 0, 0, 0]));

        let mut inside = RgbaImage::from_pixel(3, 1, Rgba([1, 2, 3, 77]));
        apply_alpha(&mut inside, &mask, &alpha, false);
        let a: Vec<u8> = inside.pixels().map(|p| p[3]).collect();
        assert_eq!(a, vec![255, 0, 0]);

        let mut outside = RgbaImage::from_pixel(3, 1, Rgba([1, 2, 3, 77]));
        apply_alpha(&mut outside, &mask, &alpha, true);
        let a: Vec<u8> = outside.pixels().map(|p| p[3]).collect();
        // pixel 2 is transparent in the source but outside the content mask
        assert_eq!(a, vec![0, 255, 0]);
        assert_eq!(outside.get_pixel(1, 0)[0], 1);
    }
}
