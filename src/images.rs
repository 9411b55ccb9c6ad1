//! Image sources – scheme classification, `data:` URI decoding and display
//! size resolution. Nothing here touches the network.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::commands::ImageSource;
use crate::geometry::ImageMetrics;
use crate::nodes::ImageNode;

/// Outcome of trying to place an `img`.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePlacement {
    /// Scheme we do not handle: no command, no cursor movement.
    Skip,
    /// Ready to place at this display size (inches).
    Place {
        source: ImageSource,
        width: f64,
        height: f64,
    },
    /// Supported scheme, but the image cannot be used.
    Failed(String),
}

/// Classify `src` and work out how large the image is drawn.
pub fn resolve_image(node: &ImageNode, metrics: &ImageMetrics) -> ImagePlacement {
    let src = node.src.as_str();
    let (source, probed) = if has_scheme(src, "data:") {
        let bytes = match decode_data_uri(src) {
            Ok(b) => b,
            Err(e) => return ImagePlacement::Failed(e),
        };
        let probed = if node.width.is_none() || node.height.is_none() {
            match probe_dimensions(&bytes) {
                Ok(dims) => Some(dims),
                Err(e) => return ImagePlacement::Failed(e),
            }
        } else {
            None
        };
        (ImageSource::DataUri(src.to_string()), probed)
    } else if has_scheme(src, "http://") || has_scheme(src, "https://") {
        (ImageSource::Url(src.to_string()), None)
    } else {
        return ImagePlacement::Skip;
    };

    let width_px = node
        .width
        .or(probed.map(|(w, _)| w as f64))
        .unwrap_or(metrics.default_width_px);
    let height_px = node
        .height
        .or(probed.map(|(_, h)| h as f64))
        .unwrap_or(metrics.default_height_px);

    let (width, height) = display_size(width_px, height_px, metrics);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return ImagePlacement::Failed(format!(
            "Unusable image size {width_px}×{height_px} px"
        ));
    }
    ImagePlacement::Place {
        source,
        width,
        height,
    }
}

/// Pixel size → inches, each axis capped independently.
pub fn display_size(width_px: f64, height_px: f64, metrics: &ImageMetrics) -> (f64, f64) {
    (
        (width_px / metrics.pixel_divisor).min(metrics.max_width),
        (height_px / metrics.pixel_divisor).min(metrics.max_height),
    )
}

fn has_scheme(src: &str, scheme: &str) -> bool {
    src.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
///
/// Returns `Err` if `src` is not a data URI or does not use base64 encoding.
pub fn decode_data_uri(src: &str) -> Result<Vec<u8>, String> {
    if !has_scheme(src, "data:") {
        let preview: String = src.chars().take(80).collect();
        return Err(format!(
            "Image src must be a base64 data URI \
             (e.g. `data:image/png;base64,...`). Got: {preview:?}"
        ));
    }
    let rest = &src["data:".len()..];
    let comma_pos = rest.find(',').ok_or_else(|| {
        "Invalid data URI: missing `,` separator between header and data".to_string()
    })?;
    let header = &rest[..comma_pos];
    if !header.to_ascii_lowercase().contains(";base64") {
        return Err("Only base64-encoded data URIs are supported. \
             The header must contain `;base64` (e.g. `data:image/png;base64,...`)."
            .to_string());
    }
    let b64_data: String = rest[comma_pos + 1..]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    BASE64_STD
        .decode(b64_data)
        .map_err(|e| format!("Base64 decode error: {e}"))
}

/// Pixel dimensions of an encoded PNG/JPEG.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), String> {
    let img = ::image::load_from_memory(bytes).map_err(|e| format!("Image decode error: {e}"))?;
    Ok((img.width(), img.height()))
}
