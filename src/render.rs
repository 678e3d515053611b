//! Turning a finished [`QrCode`] into pixels, SVG or terminal text.

use image::{Rgb, RgbImage};

use crate::config::QrConfig;
use crate::error::RenderError;
use crate::qrcode::QrCode;

/// Raster sides above this are refused.
pub const MAX_RASTER_SIDE: u64 = 1 << 16;

/// How modules map to pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub box_size: u32,
    pub border: u32,
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::from(&QrConfig::default())
    }
}

impl From<&QrConfig> for RenderOptions {
    fn from(config: &QrConfig) -> Self {
        Self {
            box_size: config.box_size,
            border: config.border,
            foreground: config.foreground,
            background: config.background,
        }
    }
}

/// Pixel side of the raster: `(size + 2 * border) * box_size`.
pub fn raster_side(qr: &QrCode, opts: &RenderOptions) -> Result<u32, RenderError> {
    if opts.box_size == 0 {
        return Err(RenderError::ZeroBoxSize);
    }
    let side = (qr.size() as u64 + 2 * u64::from(opts.border)) * u64::from(opts.box_size);
    if side > MAX_RASTER_SIDE {
        return Err(RenderError::RasterTooLarge { side });
    }
    Ok(side as u32)
}

/// Renders the symbol as an RGB raster. Each module becomes a
/// `box_size`×`box_size` square; the border is filled with the background.
///
/// # Example
///
/// ```rust
/// use qrmint::qrcode::{QrCode, QrCodeEcc};
/// use qrmint::render::{to_image, RenderOptions};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low, None, None).unwrap();
/// let img = to_image(&qr, &RenderOptions::default()).unwrap();
/// assert_eq!(img.width(), 290);
/// ```
pub fn to_image(qr: &QrCode, opts: &RenderOptions) -> Result<RgbImage, RenderError> {
    let side = raster_side(qr, opts)?;
    let border = opts.border as i64;
    let boxsize = opts.box_size;
    Ok(RgbImage::from_fn(side, side, |x, y| {
        let qr_x = i64::from(x / boxsize) - border;
        let qr_y = i64::from(y / boxsize) - border;
        if qr.get_module(qr_x as i32, qr_y as i32) {
            opts.foreground
        } else {
            opts.background
        }
    }))
}

/// Returns a string of SVG code for an image depicting the given QR Code,
/// with one user unit per module. The string always uses Unix newlines (\n),
/// regardless of the platform.
pub fn to_svg_string(qr: &QrCode, opts: &RenderOptions) -> String {
    let border = opts.border as i32;
    let dimension = qr.size() + border * 2;
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", hex_color(opts.background));
    result += "\t<path d=\"";
    let mut first = true;
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!("M{},{}h1v1h-1z", x + border, y + border);
            }
        }
    }
    result += &format!("\" fill=\"{}\"/>\n", hex_color(opts.foreground));
    result += "</svg>\n";
    result
}

/// Renders the symbol as terminal text, two characters per module.
pub fn to_console_string(qr: &QrCode, border: u32) -> String {
    let border = border as i32;
    let mut result = String::new();
    for y in -border..qr.size() + border {
        for x in -border..qr.size() + border {
            let c = if qr.get_module(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

fn hex_color(c: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::{QrCodeEcc, Version};

    fn sample() -> QrCode {
        QrCode::encode_text("https://www.microsoft.com", QrCodeEcc::Low, None, None).unwrap()
    }

    #[test]
    fn test_raster_dimensions() {
        let qr = sample();
        let opts = RenderOptions::default();
        let img = to_image(&qr, &opts).unwrap();
        // version 2: (25 + 2 * 4) * 10
        assert_eq!(img.dimensions(), (330, 330));

        let opts = RenderOptions { box_size: 1, border: 0, ..opts };
        assert_eq!(to_image(&qr, &opts).unwrap().dimensions(), (25, 25));
    }

    #[test]
    fn test_modules_become_filled_boxes() {
        let qr = QrCode::encode_text("1", QrCodeEcc::Low, Some(Version::new(1)), None).unwrap();
        let opts = RenderOptions {
            box_size: 3,
            border: 2,
            foreground: Rgb([10, 20, 30]),
            background: Rgb([200, 210, 220]),
        };
        let img = to_image(&qr, &opts).unwrap();
        // Border
        assert_eq!(*img.get_pixel(0, 0), opts.background);
        assert_eq!(*img.get_pixel(5, 5), opts.background);
        // Top left finder corner occupies pixels 6..9
        for (x, y) in [(6, 6), (8, 8), (6, 8)] {
            assert_eq!(*img.get_pixel(x, y), opts.foreground);
        }
        for y in 0..21 {
            for x in 0..21 {
                let px = *img.get_pixel((x as u32 + 2) * 3 + 1, (y as u32 + 2) * 3 + 1);
                let expected = if qr.get_module(x, y) { opts.foreground } else { opts.background };
                assert_eq!(px, expected);
            }
        }
    }

    #[test]
    fn test_oversized_raster_rejected() {
        let qr = QrCode::encode_text("x".repeat(2000).as_str(), QrCodeEcc::Low, None, None).unwrap();
        let opts = RenderOptions { box_size: 256, border: 256, ..RenderOptions::default() };
        assert!(matches!(to_image(&qr, &opts), Err(RenderError::RasterTooLarge { .. })));
    }

    #[test]
    fn test_zero_box_size_rejected() {
        let opts = RenderOptions { box_size: 0, ..RenderOptions::default() };
        assert!(matches!(to_image(&sample(), &opts), Err(RenderError::ZeroBoxSize)));
    }

    #[test]
    fn test_svg_string() {
        let qr = sample();
        let svg = to_svg_string(&qr, &RenderOptions::default());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 33 33\""));
        assert!(svg.contains("fill=\"#000000\""));
        assert!(svg.contains("M4,4h1v1h-1z"));
    }

    #[test]
    fn test_console_string() {
        let qr = sample();
        let text = to_console_string(&qr, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 27);
        assert!(lines.iter().all(|l| l.chars().count() == 54));
    }
}
