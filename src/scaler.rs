use crate::controls::ScaleFactors;
use crate::decoder::Frame;
use image::imageops::{self, FilterType};
use image::GenericImageView;
use log::debug;

/// Resampling filter used for every frame (bicubic)
pub const SCALE_FILTER: FilterType = FilterType::CatmullRom;

/// Output pixel dimensions for an image of `width` x `height`.
///
/// Height is `floor(scale * h)`. Width is derived from the scaled height and the
/// source aspect ratio, widened by `squash`: `floor(scale * h * (w / h) * squash)`.
pub fn output_dims(factors: ScaleFactors, width: u32, height: u32) -> (u32, u32) {
    if height == 0 {
        return (0, 0);
    }

    let h = f64::from(height);
    let ratio = f64::from(width) / h * factors.squash;

    let out_width = (factors.scale * h * ratio).floor();
    let out_height = (factors.scale * h).floor();

    // float to int casts saturate, so absurd factors cannot wrap
    (out_width as u32, out_height as u32)
}

/// Resize an image to the dimensions given by [`output_dims`]
pub fn scale_image<I>(image: &I, factors: ScaleFactors) -> Frame
where
    I: GenericImageView<Pixel = image::Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let (out_width, out_height) = output_dims(factors, width, height);
    debug!("Scaling {}x{} -> {}x{}", width, height, out_width, out_height);

    if out_width == 0 || out_height == 0 {
        return Frame::new(out_width, out_height);
    }

    if (out_width, out_height) == (width, height) {
        let mut copy = Frame::new(width, height);
        for (x, y, pixel) in image.pixels() {
            copy.put_pixel(x, y, pixel);
        }
        return copy;
    }

    imageops::resize(image, out_width, out_height, SCALE_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_unit_factors_keep_dimensions() {
        assert_eq!(output_dims(ScaleFactors::new(1.0, 1.0), 640, 480), (640, 480));
    }

    #[test]
    fn test_squash_only_affects_width() {
        assert_eq!(output_dims(ScaleFactors::new(0.5, 2.0), 200, 100), (200, 50));
        assert_eq!(output_dims(ScaleFactors::new(1.0, 2.0), 10, 10), (20, 10));
    }

    #[test]
    fn test_dimensions_are_floored() {
        // 0.25 * 10 = 2.5 -> 2 ; width 0.25 * 10 * 1.5 = 3.75 -> 3
        assert_eq!(output_dims(ScaleFactors::new(0.25, 1.0), 15, 10), (3, 2));
    }

    #[test]
    fn test_formula_matches_reference() {
        let cases = [(1920u32, 1080u32, 0.1, 2.0), (37, 91, 0.33, 1.7), (5, 3, 3.0, 0.5)];
        for (w, h, scale, squash) in cases {
            let (ow, oh) = output_dims(ScaleFactors::new(scale, squash), w, h);
            let hf = h as f64;
            assert_eq!(oh, (scale * hf).floor() as u32);
            assert_eq!(ow, (scale * hf * (w as f64 / hf * squash)).floor() as u32);
        }
    }

    #[test]
    fn test_zero_height_image() {
        assert_eq!(output_dims(ScaleFactors::default(), 10, 0), (0, 0));
    }

    #[test]
    fn test_scale_image_resizes() {
        let img = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        let scaled = scale_image(&img, ScaleFactors::new(0.5, 1.0));
        assert_eq!(scaled.dimensions(), (4, 2));
        assert_eq!(*scaled.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_scale_image_identity_copies_pixels() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([1, 2, 3, 4]));
        let scaled = scale_image(&img, ScaleFactors::default());
        assert_eq!(scaled, img);
    }

    #[test]
    fn test_scale_image_to_nothing() {
        let img = RgbaImage::new(3, 3);
        let scaled = scale_image(&img, ScaleFactors::new(0.1, 1.0));
        assert_eq!(scaled.dimensions(), (0, 0));
    }
}
