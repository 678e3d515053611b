//! # qrmint
//!
//! A Rust library for generating QR codes, with its own encoder and simple
//! rendering to PNG, SVG and the terminal.
//!
//! `qrmint` encodes text or binary data into QR codes following the QR Code
//! Model 2 specification. It supports versions 1 to 40, four error correction
//! levels, and numeric, alphanumeric, byte and kanji modes. Every stage of the
//! encoder is implemented here; only pixel buffers and PNG compression are
//! delegated to the `image` crate.
//!
//! ## Pipeline
//!
//! 1. [`segment::analyze`] picks the narrowest mode for the text.
//! 2. [`capacity::select_version`] picks (or validates) the version.
//! 3. [`QrCode::encode_segments_to_codewords`] packs and pads the data codewords.
//! 4. [`ecc::add_ecc_and_interleave`] appends Reed–Solomon blocks.
//! 5. [`matrix::ModuleMatrix`] stamps function patterns and places codewords.
//! 6. [`mask::select_mask`] scores all eight masks and commits the best.
//! 7. [`render::to_image`] turns the symbol into a raster.
//!
//! ## Example
//!
//! ```rust
//! use qrmint::{QrCode, QrCodeEcc, QrConfig};
//! use qrmint::render::{to_image, RenderOptions};
//!
//! let config = QrConfig::default();
//! let qr = QrCode::encode_with_config("https://www.microsoft.com", &config).unwrap();
//! assert_eq!(qr.version().value(), 2);
//! assert_eq!(qr.error_correction_level(), QrCodeEcc::Low);
//!
//! let img = to_image(&qr, &RenderOptions::from(&config)).unwrap();
//! assert_eq!(img.width(), (25 + 2 * 4) * 10);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: The symbol type and the encode entry points.
//! - [`segment`], [`capacity`], [`ecc`], [`matrix`], [`mask`]: Encoder stages.
//! - [`render`]: Raster, SVG and console renderers.
//! - [`output`]: Saving and displaying rasters.
//! - [`helper`]: One-call conveniences.

#![forbid(unsafe_code)]

pub mod capacity;
pub mod config;
pub mod ecc;
pub mod error;
pub mod helper;
pub mod mask;
pub mod matrix;
pub mod output;
pub mod qrcode;
pub mod render;
pub mod segment;

pub use config::QrConfig;
pub use error::{ConfigError, DisplayError, EncodeError, QrError, RenderError};
pub use mask::Mask;
pub use qrcode::{QrCode, QrCodeEcc, Version};
pub use segment::{QrSegment, QrSegmentMode};
