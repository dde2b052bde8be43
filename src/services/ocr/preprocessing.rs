use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use super::OcrError;

/// Decode an image file, force it to 8-bit RGB and re-encode it as PNG
///
/// The transcription model expects three-channel input regardless of the
/// uploaded format (palette GIFs, grayscale TIFFs, RGBA PNGs).
pub fn load_rgb_png(path: &Path) -> Result<Vec<u8>, OcrError> {
    let image = image::open(path)?;
    encode_rgb_png(&image)
}

/// Convert to RGB8 and encode as PNG
pub fn encode_rgb_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
