//! Test utilities for imageops-kuwahara
//!
//! This module provides common image builders for the unit tests.
//! It is only compiled when running tests.

#[cfg(test)]
use image::Rgb;
#[cfg(test)]
use itertools::iproduct;

#[cfg(test)]
use crate::Image;

/// Creates an RGB image filled with a single color.
#[cfg(test)]
pub fn uniform_rgb_image(width: u32, height: u32, color: Rgb<u8>) -> Image<Rgb<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates an RGB image with a smooth three-channel gradient.
///
/// Every pixel differs from its neighbors, which makes the image useful
/// for determinism checks and for exercising variance computations on
/// non-flat data.
#[cfg(test)]
pub fn gradient_rgb_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(width, height);

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let r = ((x * 255) / width) as u8;
        let g = ((y * 255) / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        image.put_pixel(x, y, Rgb([r, g, b]));
    });

    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_rgb_image_with_valid_input_creates_image() {
        let image = uniform_rgb_image(3, 2, Rgb([10, 20, 30]));
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|pixel| *pixel == Rgb([10, 20, 30])));
    }

    #[test]
    fn gradient_rgb_image_with_valid_input_creates_image() {
        let image = gradient_rgb_image(4, 4);
        assert_eq!(image.dimensions(), (4, 4));
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(3, 3));
    }
}
