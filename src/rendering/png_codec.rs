//! PNG load/save for rasters.
//!
//! Any PNG colour type and bit depth is normalized to 8-bit gray or RGB on
//! load; alpha is dropped. Rasters are written back as 8-bit gray (one
//! channel) or RGB (three channels).

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use halftone::Raster;

use crate::error::CodecError;

/// Decode PNG bytes into a 1- or 3-channel raster.
pub fn decode_png(bytes: &[u8]) -> Result<Raster, CodecError> {
    read_png(Cursor::new(bytes))
}

/// Read a PNG file into a 1- or 3-channel raster.
pub fn load_png(path: &Path) -> Result<Raster, CodecError> {
    let file = File::open(path)?;
    let raster = read_png(BufReader::new(file))?;
    tracing::trace!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        channels = raster.channels(),
        "Loaded PNG"
    );
    Ok(raster)
}

fn read_png<R: Read>(source: R) -> Result<Raster, CodecError> {
    let mut decoder = png::Decoder::new(source);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    buf.truncate(frame.buffer_size());

    let (width, height) = (frame.width as usize, frame.height as usize);
    let (data, channels) = match frame.color_type {
        png::ColorType::Grayscale => (buf, 1),
        png::ColorType::Rgb => (buf, 3),
        png::ColorType::GrayscaleAlpha => (strip_alpha(&buf, 2), 1),
        png::ColorType::Rgba => (strip_alpha(&buf, 4), 3),
        png::ColorType::Indexed => {
            return Err(CodecError::Unsupported(
                "indexed PNG was not expanded".to_string(),
            ))
        }
    };
    Ok(Raster::from_vec(data, width, height, channels)?)
}

/// Keep the first `stride - 1` samples of every pixel.
fn strip_alpha(data: &[u8], stride: usize) -> Vec<u8> {
    data.chunks_exact(stride)
        .flat_map(|px| px[..stride - 1].iter().copied())
        .collect()
}

/// Encode a 1- or 3-channel raster as an 8-bit PNG.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, CodecError> {
    let color_type = match raster.channels() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        n => {
            return Err(CodecError::Unsupported(format!(
                "cannot write {} channel raster",
                n
            )))
        }
    };
    let width = u32::try_from(raster.width())
        .map_err(|_| CodecError::Unsupported("image too wide".to_string()))?;
    let height = u32::try_from(raster.height())
        .map_err(|_| CodecError::Unsupported("image too tall".to_string()))?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        writer
            .write_image_data(raster.data())
            .map_err(|e| CodecError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Write a raster to `path` as PNG.
pub fn save_png(path: &Path, raster: &Raster) -> Result<(), CodecError> {
    let bytes = encode_png(raster)?;
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), "Wrote PNG");
    Ok(())
}
