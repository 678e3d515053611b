//! Error types for encoding, rendering and displaying QR codes.
//!
//! Encoding failures ([`EncodeError`]) are raised before any matrix work
//! begins. Rendering failures ([`RenderError`]) only happen after a symbol has
//! been built, so a caller holding a [`QrCode`](crate::qrcode::QrCode) can
//! retry the save without encoding again. [`DisplayError`] is never fatal.

use thiserror::Error;

use crate::qrcode::QrCodeEcc;

/// An invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{param}`: {reason}")]
pub struct ConfigError {
    /// Name of the offending parameter.
    pub param: &'static str,
    /// Human readable description of what is wrong with it.
    pub reason: String,
}

impl ConfigError {
    pub fn new(param: &'static str, reason: impl Into<String>) -> Self {
        Self { param, reason: reason.into() }
    }
}

/// Error returned when text or data cannot be turned into a QR Code symbol.
///
/// Ways to handle a [`EncodeError::Capacity`] include:
///
/// - Lower the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Drop the explicit version so the smallest fitting one is chosen.
/// - Change the text to fit a denser mode (e.g. uppercase for alphanumeric).
/// - Make the text shorter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The payload itself is unusable: empty, malformed, or too long for any symbol.
    #[error("invalid input `{param}`: {reason}")]
    Input {
        param: &'static str,
        reason: String,
    },

    /// The payload does not fit the requested version / error correction level.
    #[error(
        "data does not fit in version {version} at level {ecl:?}: \
         {needed_bits} bits needed, {available_bits} bits available"
    )]
    Capacity {
        version: u8,
        ecl: QrCodeEcc,
        needed_bits: usize,
        available_bits: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EncodeError {
    pub(crate) fn input(param: &'static str, reason: impl Into<String>) -> Self {
        Self::Input { param, reason: reason.into() }
    }
}

/// Error raised while writing a rendered symbol out.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("box size must be at least 1 pixel")]
    ZeroBoxSize,

    #[error("raster of {side} pixels per side is too large")]
    RasterTooLarge { side: u64 },
}

/// Error raised by an image viewer. Only ever logged.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to prepare image for display: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image for display: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to launch image viewer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Either stage of an encode-then-save request, kept apart so callers can
/// tell a bad payload from a failed write.
#[derive(Debug, Error)]
pub enum QrError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
