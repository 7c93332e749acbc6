use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use tracing::debug;

use crate::error::{PhotoError, Result};
use crate::photo::PixelBuffer;

/// Decode an encoded image (PNG, JPEG) held in memory
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let image = image::load_from_memory(bytes).map_err(|e| PhotoError::DecodeFailed {
        reason: e.to_string(),
    })?;
    Ok(PixelBuffer::from_dynamic(image))
}

/// Load and decode an image file
pub fn load<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| PhotoError::DecodeFailed {
        reason: format!("{}: {}", path.display(), e),
    })?;

    debug!("Loaded {:?} ({}x{})", path, image.width(), image.height());
    Ok(PixelBuffer::from_dynamic(image))
}

/// Encode a buffer to disk, picking the format from the file extension.
///
/// JPEG output drops any alpha channel and uses `jpeg_quality` (1-100).
pub fn save<P: AsRef<Path>>(buffer: &PixelBuffer, path: P, jpeg_quality: u8) -> Result<()> {
    let path = path.as_ref();
    let image = buffer.to_dynamic()?;

    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Jpeg) => {
            let writer = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(writer, jpeg_quality.clamp(1, 100));
            let rgb = image.to_rgb8();
            encoder.encode_image(&rgb)?;
        }
        _ => image.save(path)?,
    }

    debug!("Saved {:?}", path);
    Ok(())
}
