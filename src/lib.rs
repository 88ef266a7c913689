mod error;
mod kuwahara;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::KuwaharaError;
pub use kuwahara::filter::{ApplyKuwahara, Kuwahara, KuwaharaFilter, KuwaharaMode};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
