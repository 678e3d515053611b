#![forbid(unsafe_code)]
//! QR code encoding functionality.
//!
//! This module ties the pipeline together: segments are packed into data
//! codewords, error correction is appended, codewords are placed in a module
//! matrix, and the best mask is chosen. It supports the QR Code Model 2
//! specification with versions 1–40 and all four error correction levels.

use core::str::FromStr;

use crate::capacity;
use crate::config::QrConfig;
use crate::ecc;
use crate::error::{ConfigError, EncodeError};
use crate::mask::{self, Mask};
use crate::matrix::ModuleMatrix;
use crate::segment::{BitBuffer, QrSegment};

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Instances are immutable after creation and own their module grid.
///
/// # Creation
///
/// - High-level: Use [`QrCode::encode_text`] or [`QrCode::encode_binary`].
/// - Mid-level: Use [`QrCode::encode_segments`].
/// - Low-level: Use [`QrCode::encode_segments_to_codewords`] and [`QrCode::encode_codewords`].
///
/// # Example
///
/// ```rust
/// use qrmint::qrcode::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low, None, None).unwrap();
/// println!("Version: {}", qr.version().value());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,
    size: i32,
    ecl: QrCodeEcc,
    mask: Mask,
    /// The modules of this QR Code (false = light, true = dark), row major.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string into a QR code.
    ///
    /// The narrowest mode able to hold the whole text is used. With
    /// `version` set to `None` the smallest fitting version is chosen; an
    /// explicit version is only validated. The `mask` can be `None` for
    /// automatic selection or a fixed pattern.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrmint::qrcode::{QrCode, QrCodeEcc, Version};
    ///
    /// let qr = QrCode::encode_text("1", QrCodeEcc::High, Some(Version::new(1)), None).unwrap();
    /// assert_eq!(qr.size(), 21);
    /// ```
    pub fn encode_text(
        text: &str,
        ecl: QrCodeEcc,
        version: Option<Version>,
        mask: Option<Mask>,
    ) -> Result<Self, EncodeError> {
        let seg = QrSegment::make_segment(text)?;
        Self::encode_segments(&[seg], ecl, version, mask)
    }

    /// Encodes arbitrary bytes in byte mode.
    pub fn encode_binary(
        data: &[u8],
        ecl: QrCodeEcc,
        version: Option<Version>,
        mask: Option<Mask>,
    ) -> Result<Self, EncodeError> {
        if data.is_empty() {
            return Err(EncodeError::input("data", "data must not be empty"));
        }
        Self::encode_segments(&[QrSegment::make_bytes(data)], ecl, version, mask)
    }

    /// Encodes a text string with every setting taken from `config`.
    ///
    /// The configuration is validated before any encoding starts.
    pub fn encode_with_config(text: &str, config: &QrConfig) -> Result<Self, EncodeError> {
        config.validate()?;
        Self::encode_text(text, config.error_correction, config.version()?, config.mask()?)
    }

    /// Encodes the given segments, in order, into a QR code.
    pub fn encode_segments(
        segs: &[QrSegment],
        ecl: QrCodeEcc,
        version: Option<Version>,
        mask: Option<Mask>,
    ) -> Result<Self, EncodeError> {
        if segs.is_empty() {
            return Err(EncodeError::input("segments", "at least one segment is required"));
        }
        let (datacodewords, version) = Self::encode_segments_to_codewords(segs, ecl, version)?;
        Ok(Self::encode_codewords(&datacodewords, ecl, version, mask))
    }

    /// Selects the version and returns the padded data codewords for the
    /// given segments.
    ///
    /// The bit stream is, per segment: 4-bit mode indicator, character
    /// count, payload. Then a terminator of up to four zero bits, zero bits
    /// up to a byte boundary, and alternating 0xEC/0x11 pad bytes until the
    /// data capacity of `(version, ecl)` is reached exactly.
    pub fn encode_segments_to_codewords(
        segs: &[QrSegment],
        ecl: QrCodeEcc,
        version: Option<Version>,
    ) -> Result<(Vec<u8>, Version), EncodeError> {
        let (version, datausedbits) = capacity::select_version(segs, ecl, version)?;

        // Concatenate all segments to create the data bit string
        let datacapacitybits: usize = capacity::get_num_data_codewords(version, ecl) * 8;
        let mut bb = BitBuffer::with_capacity(datacapacitybits);
        for seg in segs {
            bb.append_bits(seg.mode().mode_bits(), 4);
            let numchars = u32::try_from(seg.num_chars())
                .map_err(|_| EncodeError::input("segments", "character count out of range"))?;
            bb.append_bits(numchars, seg.mode().num_char_count_bits(version));
            let data = seg.data();
            for i in 0..data.len() {
                bb.append_bits(u32::from(data.get(i)), 1);
            }
        }
        debug_assert_eq!(bb.len(), datausedbits);

        // Add terminator and pad up to a byte if applicable
        let numzerobits = (datacapacitybits - bb.len()).min(4);
        bb.append_bits(0, numzerobits as u8);
        let numzerobits = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8);
        debug_assert_eq!(bb.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        for &padbyte in [0xec, 0x11].iter().cycle() {
            if bb.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8);
        }
        debug_assert_eq!(bb.len(), datacapacitybits);
        Ok((bb.into_bytes(), version))
    }

    /// Creates a new QR Code with the given version number, error correction
    /// level, data codeword bytes, and mask.
    ///
    /// This is a low-level API that most users should not use directly.
    ///
    /// # Panics
    ///
    /// Panics if `datacodewords` is not exactly the data capacity of
    /// `(version, ecl)`.
    pub fn encode_codewords(
        datacodewords: &[u8],
        ecl: QrCodeEcc,
        version: Version,
        mask: Option<Mask>,
    ) -> Self {
        // Compute ECC
        let allcodewords = ecc::add_ecc_and_interleave(datacodewords, version, ecl);

        // Draw modules
        let mut matrix = ModuleMatrix::with_function_patterns(version);
        matrix.draw_codewords(&allcodewords);

        // Do masking
        let mask = match mask {
            Some(m) => {
                mask::commit_mask(&mut matrix, ecl, m);
                m
            }
            None => mask::select_mask(&mut matrix, ecl),
        };
        tracing::debug!(
            version = version.value(),
            ecl = ?ecl,
            mask = mask.value(),
            "encoded symbol"
        );
        Self::from_matrix(&matrix, ecl, mask)
    }

    fn from_matrix(matrix: &ModuleMatrix, ecl: QrCodeEcc, mask: Mask) -> Self {
        Self {
            version: matrix.version(),
            size: matrix.size(),
            ecl,
            mask,
            modules: matrix.modules().iter().map(|m| m.is_dark()).collect(),
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.modules[(y * self.size + x) as usize]
    }

    /// Reads the error correction level and mask back out of the first copy
    /// of the format area.
    pub fn read_format(&self) -> (QrCodeEcc, Mask) {
        let mut bits: u32 = 0;
        for i in 0..6 {
            bits |= u32::from(self.get_module(8, i)) << i;
        }
        bits |= u32::from(self.get_module(8, 7)) << 6;
        bits |= u32::from(self.get_module(8, 8)) << 7;
        bits |= u32::from(self.get_module(7, 8)) << 8;
        for i in 9..15 {
            bits |= u32::from(self.get_module(14 - i, 8)) << i;
        }
        let data = (bits ^ 0x5412) >> 10;
        let ecl = QrCodeEcc::from_format_bits(((data >> 3) & 3) as u8);
        (ecl, Mask::new((data & 7) as u8))
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    pub const ALL: [QrCodeEcc; 4] = [
        QrCodeEcc::Low,
        QrCodeEcc::Medium,
        QrCodeEcc::Quartile,
        QrCodeEcc::High,
    ];

    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub(crate) fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit code used in the format word.
    pub(crate) fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    fn from_format_bits(bits: u8) -> Self {
        use QrCodeEcc::*;
        [Medium, Low, High, Quartile][usize::from(bits & 3)]
    }
}

impl FromStr for QrCodeEcc {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(QrCodeEcc::Low),
            "m" | "medium" => Ok(QrCodeEcc::Medium),
            "q" | "quartile" => Ok(QrCodeEcc::Quartile),
            "h" | "high" => Ok(QrCodeEcc::High),
            other => Err(ConfigError::new(
                "error_correction",
                format!("expected one of L, M, Q, H, got {:?}", other),
            )),
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns `None` if the number is outside the range [1, 40].
    pub const fn try_new(ver: u8) -> Option<Self> {
        if Version::MIN.value() <= ver && ver <= Version::MAX.value() {
            Some(Self(ver))
        } else {
            None
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the symbol in modules.
    pub const fn size(self) -> i32 {
        self.0 as i32 * 4 + 17
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::QrSegmentMode;

    #[test]
    fn test_single_digit_codewords() {
        let seg = QrSegment::make_segment("1").unwrap();
        assert_eq!(seg.mode(), QrSegmentMode::Numeric);
        let (codewords, version) =
            QrCode::encode_segments_to_codewords(&[seg], QrCodeEcc::Low, Some(Version::new(1)))
                .unwrap();
        assert_eq!(version, Version::new(1));
        // 0001 0000000001 0001 0000 00 -> 0x10 0x04 0x40, then pad bytes
        let mut expected = vec![0x10, 0x04, 0x40];
        expected.extend([0xec, 0x11].iter().cycle().take(16));
        assert_eq!(codewords, expected);
        assert_eq!(codewords.len(), 19);

        let qr = QrCode::encode_text("1", QrCodeEcc::Low, Some(Version::new(1)), None).unwrap();
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn test_reference_numeric_codewords() {
        let seg = QrSegment::make_numeric("01234567").unwrap();
        let (codewords, _) =
            QrCode::encode_segments_to_codewords(&[seg], QrCodeEcc::Medium, None).unwrap();
        assert_eq!(
            codewords,
            vec![
                0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec,
                0x11, 0xec, 0x11
            ]
        );
    }

    #[test]
    fn test_terminator_truncated_when_full() {
        // 17 bytes fill 1-L exactly except for the 4-bit terminator room
        let (codewords, version) = QrCode::encode_segments_to_codewords(
            &[QrSegment::make_bytes(&[0xaa; 17])],
            QrCodeEcc::Low,
            None,
        )
        .unwrap();
        assert_eq!(version.value(), 1);
        assert_eq!(codewords.len(), 19);
        assert_eq!(codewords[0], 0x41);
        assert_eq!(codewords[18], 0xa0);
    }

    #[test]
    fn test_boundary_version_1_high() {
        let qr = QrCode::encode_text("7", QrCodeEcc::High, Some(Version::new(1)), None).unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.error_correction_level(), QrCodeEcc::High);
    }

    #[test]
    fn test_auto_version_for_url() {
        let qr = QrCode::encode_text("https://www.microsoft.com", QrCodeEcc::Low, None, None)
            .unwrap();
        assert_eq!(qr.version().value(), 2);
        assert_eq!(qr.size(), 25);
    }

    #[test]
    fn test_explicit_version_too_small() {
        let err = QrCode::encode_text(
            "https://www.microsoft.com",
            QrCodeEcc::Low,
            Some(Version::new(1)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::Capacity { version: 1, .. }));
    }

    #[test]
    fn test_over_capacity_fails() {
        let text = "x".repeat(2954);
        assert!(matches!(
            QrCode::encode_text(&text, QrCodeEcc::Low, None, None),
            Err(EncodeError::Input { .. })
        ));
        let text = "x".repeat(1274);
        assert!(matches!(
            QrCode::encode_text(&text, QrCodeEcc::High, None, None),
            Err(EncodeError::Capacity { version: 40, .. })
        ));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = QrCode::encode_text("Hello, World!", QrCodeEcc::Quartile, None, None).unwrap();
        let b = QrCode::encode_text("Hello, World!", QrCodeEcc::Quartile, None, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mask(), b.mask());
    }

    #[test]
    fn test_format_area_round_trips() {
        for ecl in QrCodeEcc::ALL {
            for m in Mask::ALL {
                let qr = QrCode::encode_text("FORMAT", ecl, None, Some(m)).unwrap();
                assert_eq!(qr.read_format(), (ecl, m));
                assert_eq!(qr.mask(), m);
            }
        }
    }

    #[test]
    fn test_ecc_parsing() {
        assert_eq!("L".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::Low);
        assert_eq!("quartile".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::Quartile);
        assert_eq!(" h ".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::High);
        let err = "X".parse::<QrCodeEcc>().unwrap_err();
        assert_eq!(err.param, "error_correction");
    }

    #[test]
    fn test_version_bounds() {
        assert!(Version::try_new(0).is_none());
        assert!(Version::try_new(41).is_none());
        assert_eq!(Version::new(40).size(), 177);
    }
}
