use crate::core::{GymError, Result};

/// Encode packed RGBA renderer output (`r` in the lowest byte) as PNG bytes.
/// - When the `image` feature is enabled, this will encode using the `image` crate.
/// - Without the feature, returns GymError::NotSupported.
pub fn encode_png(width: usize, height: usize, pixels: &[u32]) -> Result<Vec<u8>> {
    if width.checked_mul(height) != Some(pixels.len()) {
        return Err(GymError::RenderBuffer { width, height, len: pixels.len() });
    }
    encode_pixels_png(width as u32, height as u32, pixels)
}

#[cfg(feature = "image")]
fn encode_pixels_png(width: u32, height: u32, pixels: &[u32]) -> Result<Vec<u8>> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};
    use std::io::Cursor;

    let bytes: Vec<u8> = pixels.iter().flat_map(|p| p.to_le_bytes()).collect();

    let mut buf = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buf);
        let encoder = PngEncoder::new(&mut cursor);
        encoder
            .write_image(&bytes, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| GymError::Other(format!("PNG encode error: {}", e)))?;
    }
    Ok(buf)
}

#[cfg(not(feature = "image"))]
fn encode_pixels_png(_width: u32, _height: u32, _pixels: &[u32]) -> Result<Vec<u8>> {
    Err(GymError::NotSupported(
        "PNG encoding requires the `image` feature".into(),
    ))
}

/// Save packed RGBA renderer output as a PNG file at the given path.
/// Requires the `image` feature; otherwise returns NotSupported.
pub fn save_png<P: AsRef<std::path::Path>>(path: P, width: usize, height: usize, pixels: &[u32]) -> Result<()> {
    let bytes = encode_png(width, height, pixels)?;
    std::fs::write(path, bytes).map_err(|e| GymError::Other(format!("Failed to write PNG: {}", e)))
}
