use std::path::Path;

use image::RgbImage;

use crate::config::QrConfig;
use crate::error::{EncodeError, QrError, RenderError};
use crate::output::{show, ImageSink, ImageViewer, PngFile};
use crate::qrcode::QrCode;
use crate::render::{to_image, to_svg_string, RenderOptions};

/*---- Utilities ----*/

/// Encodes `content` with the settings in `config`.
///
/// Configuration errors are reported before any encoding starts.
pub fn generate(content: &str, config: &QrConfig) -> Result<QrCode, EncodeError> {
    QrCode::encode_with_config(content, config)
}

/// Generates a QR Code image buffer from the provided content.
///
/// # Example
///
/// ```
/// use qrmint::config::QrConfig;
/// use qrmint::helper::generate_image_buffer;
///
/// let img = generate_image_buffer("Hello, World!", &QrConfig::default()).unwrap();
/// assert_eq!(img.dimensions(), (290, 290));
/// ```
pub fn generate_image_buffer(content: &str, config: &QrConfig) -> Result<RgbImage, QrError> {
    let qr = generate(content, config)?;
    Ok(to_image(&qr, &RenderOptions::from(config))?)
}

/// Renders an encoded symbol and saves it as a PNG at `path`.
///
/// Only render errors can occur here, so a failed save can be retried with
/// the same `qr`.
pub fn save_png(qr: &QrCode, config: &QrConfig, path: &Path) -> Result<RgbImage, RenderError> {
    let raster = to_image(qr, &RenderOptions::from(config))?;
    PngFile.save(&raster, path)?;
    Ok(raster)
}

/// Generates a QR Code PNG from the provided content, saves it to `path` and
/// optionally shows it. Display failures are only logged.
///
/// # Example
///
/// ```no_run
/// use qrmint::config::QrConfig;
/// use qrmint::helper::generate_image;
/// use qrmint::output::SystemViewer;
///
/// generate_image(
///     "https://www.microsoft.com",
///     &QrConfig::default(),
///     "qrcode.png".as_ref(),
///     Some(&SystemViewer::default()),
/// )
/// .unwrap();
/// ```
pub fn generate_image(
    content: &str,
    config: &QrConfig,
    path: &Path,
    viewer: Option<&dyn ImageViewer>,
) -> Result<QrCode, QrError> {
    let qr = generate(content, config)?;
    let raster = save_png(&qr, config, path)?;
    if let Some(viewer) = viewer {
        show(viewer, &raster);
    }
    Ok(qr)
}

/// Generates a QR Code SVG from the provided content.
///
/// # Example
///
/// ```
/// use qrmint::config::QrConfig;
/// use qrmint::helper::generate_svg_string;
///
/// let svg = generate_svg_string("Hello, World!", &QrConfig::default()).unwrap();
/// assert!(svg.ends_with("</svg>\n"));
/// ```
pub fn generate_svg_string(content: &str, config: &QrConfig) -> Result<String, EncodeError> {
    let qr = generate(content, config)?;
    Ok(to_svg_string(&qr, &RenderOptions::from(config)))
}
