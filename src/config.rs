//! Encoding and rendering configuration.

use image::Rgb;

use crate::error::ConfigError;
use crate::mask::Mask;
use crate::qrcode::{QrCodeEcc, Version};

/// Largest accepted module box size, in pixels.
pub const MAX_BOX_SIZE: u32 = 100;
/// Largest accepted border (quiet zone), in modules.
pub const MAX_BORDER: u32 = 100;

/// Settings for one encode-and-render request.
///
/// The defaults reproduce a classic setup: smallest fitting version, level L,
/// 10 pixel boxes, a 4 module border, black on white.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrConfig {
    /// Fixed version (1–40), or `None` to pick the smallest that fits.
    pub version: Option<u8>,
    pub error_correction: QrCodeEcc,
    /// Fixed mask (0–7), or `None` for penalty based selection.
    pub mask: Option<u8>,
    /// Side of one module in pixels.
    pub box_size: u32,
    /// Quiet zone width in modules.
    pub border: u32,
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            version: None,
            error_correction: QrCodeEcc::Low,
            mask: None,
            box_size: 10,
            border: 4,
            foreground: Rgb([0, 0, 0]),
            background: Rgb([255, 255, 255]),
        }
    }
}

impl QrConfig {
    /// Checks every field, naming the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.version()?;
        self.mask()?;
        if self.box_size == 0 || self.box_size > MAX_BOX_SIZE {
            return Err(ConfigError::new(
                "box_size",
                format!("must be between 1 and {}, got {}", MAX_BOX_SIZE, self.box_size),
            ));
        }
        if self.border > MAX_BORDER {
            return Err(ConfigError::new(
                "border",
                format!("must be at most {}, got {}", MAX_BORDER, self.border),
            ));
        }
        if self.foreground == self.background {
            return Err(ConfigError::new(
                "foreground",
                "foreground and background colors must differ",
            ));
        }
        Ok(())
    }

    /// The requested version, if any, as a checked [`Version`].
    pub fn version(&self) -> Result<Option<Version>, ConfigError> {
        self.version
            .map(|v| {
                Version::try_new(v).ok_or_else(|| {
                    ConfigError::new("version", format!("must be between 1 and 40, got {}", v))
                })
            })
            .transpose()
    }

    /// The requested mask, if any, as a checked [`Mask`].
    pub fn mask(&self) -> Result<Option<Mask>, ConfigError> {
        self.mask
            .map(|m| {
                Mask::try_new(m).ok_or_else(|| {
                    ConfigError::new("mask", format!("must be between 0 and 7, got {}", m))
                })
            })
            .transpose()
    }
}

/// Parses a color given as a name (`black`, `white`, `red`, ...), `#rgb` or
/// `#rrggbb`.
pub fn parse_color(s: &str) -> Result<Rgb<u8>, ConfigError> {
    let s = s.trim();
    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Some([0, 0, 0]),
        "white" => Some([255, 255, 255]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        "orange" => Some([255, 165, 0]),
        "purple" => Some([128, 0, 128]),
        "gray" | "grey" => Some([128, 128, 128]),
        "navy" => Some([0, 0, 128]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(Rgb(rgb));
    }

    let invalid = || ConfigError::new("color", format!("unrecognised color {:?}", s));
    let hex = s.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Rgb(rgb))
        }
        6 => Ok(Rgb([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = QrConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version().unwrap(), None);
        assert_eq!(config.box_size, 10);
        assert_eq!(config.border, 4);
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let cases = [
            (QrConfig { version: Some(0), ..QrConfig::default() }, "version"),
            (QrConfig { version: Some(41), ..QrConfig::default() }, "version"),
            (QrConfig { mask: Some(8), ..QrConfig::default() }, "mask"),
            (QrConfig { box_size: 0, ..QrConfig::default() }, "box_size"),
            (QrConfig { border: MAX_BORDER + 1, ..QrConfig::default() }, "border"),
            (
                QrConfig { foreground: Rgb([9, 9, 9]), background: Rgb([9, 9, 9]), ..QrConfig::default() },
                "foreground",
            ),
        ];
        for (config, param) in cases {
            assert_eq!(config.validate().unwrap_err().param, param);
        }
    }

    #[test]
    fn test_border_zero_is_allowed() {
        let config = QrConfig { border: 0, box_size: 1, ..QrConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("black").unwrap(), Rgb([0, 0, 0]));
        assert_eq!(parse_color("White").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(parse_color("#ff8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(parse_color("#0f0").unwrap(), Rgb([0, 255, 0]));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gg0000").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }
}
