//! Image normalisation: uploaded bytes → JPEG → base64 data URL.
//!
//! Users upload whatever their phone or browser produced (PNG screenshots,
//! WebP, GIF, TIFF scans). Vision APIs reliably accept JPEG, so every upload
//! is decoded and re-encoded once before it is embedded in the request.
//! JPEG carries neither alpha nor palettes nor 16-bit samples; those layouts
//! are flattened to 8-bit RGB first.

use crate::error::AnalyzerError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

/// Media type of every normalised image.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// An upload after re-encoding, ready to embed in a request.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// JPEG-encoded bytes.
    pub bytes: Vec<u8>,
    /// Always [`OUTPUT_MIME_TYPE`].
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Format sniffed from the upload's magic bytes, if recognised.
    pub source_format: Option<ImageFormat>,
}

impl NormalizedImage {
    /// Wrap the bytes in a `data:` URL.
    pub fn data_url(&self) -> String {
        data_url(self.mime_type, &self.bytes)
    }
}

/// Build a `data:<mime>;base64,<payload>` URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decode `bytes` as any supported image format and re-encode as JPEG.
///
/// CPU-bound; async callers go through [`normalize_image_async`].
pub fn normalize_image(bytes: &[u8], quality: u8) -> Result<NormalizedImage, AnalyzerError> {
    if bytes.is_empty() {
        return Err(AnalyzerError::UnsupportedImage {
            detail: "the uploaded file is empty".into(),
        });
    }

    let source_format = image::guess_format(bytes).ok();
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    let img = to_jpeg_compatible(img);

    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;

    debug!(
        "Normalised {:?} {}x{} ({} bytes) → JPEG ({} bytes)",
        source_format,
        width,
        height,
        bytes.len(),
        buf.len()
    );

    Ok(NormalizedImage {
        bytes: buf,
        mime_type: OUTPUT_MIME_TYPE,
        width,
        height,
        source_format,
    })
}

/// Run [`normalize_image`] on the blocking pool.
pub async fn normalize_image_async(
    bytes: Vec<u8>,
    quality: u8,
) -> Result<NormalizedImage, AnalyzerError> {
    tokio::task::spawn_blocking(move || normalize_image(&bytes, quality))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("image task failed: {e}")))?
}

/// 8-bit grayscale and RGB go straight to the encoder; everything else is
/// flattened to RGB8.
fn to_jpeg_compatible(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format)
            .expect("test image should encode");
        buf
    }

    fn rgba_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([200, 30, 30, 128])))
    }

    fn assert_jpeg(out: &NormalizedImage, width: u32, height: u32) {
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory_with_format(&out.bytes, ImageFormat::Jpeg)
            .expect("output must decode as JPEG");
        assert_eq!((decoded.width(), decoded.height()), (width, height));
    }

    #[test]
    fn png_with_alpha_becomes_jpeg() {
        let png = encode_as(&rgba_square(), ImageFormat::Png);
        let out = normalize_image(&png, 90).expect("normalise png");
        assert_eq!(out.source_format, Some(ImageFormat::Png));
        assert_jpeg(&out, 16, 8);
    }

    #[test]
    fn jpeg_input_is_reencoded() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([10, 120, 240])));
        let jpeg = encode_as(&rgb, ImageFormat::Jpeg);
        let out = normalize_image(&jpeg, 90).expect("normalise jpeg");
        assert_eq!(out.source_format, Some(ImageFormat::Jpeg));
        assert_jpeg(&out, 20, 10);
    }

    #[test]
    fn other_supported_formats_become_jpeg() {
        let img = rgba_square();
        for format in [
            ImageFormat::Gif,
            ImageFormat::Bmp,
            ImageFormat::Tiff,
            ImageFormat::WebP,
        ] {
            let input = encode_as(&img, format);
            let out = normalize_image(&input, 90)
                .unwrap_or_else(|e| panic!("{format:?} should normalise: {e}"));
            assert_eq!(out.source_format, Some(format));
            assert_jpeg(&out, 16, 8);
        }
    }

    #[test]
    fn grayscale_is_kept_single_channel() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([77])));
        let out = normalize_image(&encode_as(&gray, ImageFormat::Png), 90).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[test]
    fn sixteen_bit_input_is_flattened() {
        let deep = DynamicImage::ImageRgba16(image::ImageBuffer::from_pixel(
            3,
            3,
            Rgba([60_000u16, 0, 0, 65_535]),
        ));
        let out = normalize_image(&encode_as(&deep, ImageFormat::Png), 90).unwrap();
        assert_jpeg(&out, 3, 3);
    }

    #[test]
    fn garbage_is_unsupported() {
        let err = normalize_image(b"%PDF-1.7 not an image", 90).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedImage { .. }));
    }

    #[test]
    fn empty_upload_is_unsupported() {
        let err = normalize_image(&[], 90).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedImage { .. }));
    }

    #[test]
    fn data_url_is_base64_jpeg() {
        let png = encode_as(&rgba_square(), ImageFormat::Png);
        let out = normalize_image(&png, 90).unwrap();
        let url = out.data_url();
        let payload = url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("data URL prefix");
        let decoded = STANDARD.decode(payload).expect("valid base64");
        assert_eq!(decoded, out.bytes);
    }

    #[tokio::test]
    async fn async_variant_matches_sync() {
        let png = encode_as(&rgba_square(), ImageFormat::Png);
        let out = normalize_image_async(png, 90).await.unwrap();
        assert_jpeg(&out, 16, 8);
    }
}
