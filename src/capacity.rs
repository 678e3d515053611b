//! Symbol capacity tables and version selection.

use crate::error::EncodeError;
use crate::qrcode::{QrCodeEcc, Version};
use crate::segment::{QrSegment, QrSegmentMode};

/// Returns the number of data bits that can be stored in a QR Code of the given
/// version, after all function modules are excluded. This includes remainder
/// bits, so it might not be a multiple of 8. The result is in the range [208, 29648].
pub fn get_num_raw_data_modules(ver: Version) -> usize {
    let ver = usize::from(ver.value());
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Total codewords (data plus error correction) in a symbol of this version.
pub fn get_num_raw_codewords(ver: Version) -> usize {
    get_num_raw_data_modules(ver) / 8
}

/// Returns the number of 8-bit data codewords contained in a QR Code of the
/// given version and error correction level, with remainder bits discarded.
pub fn get_num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
    get_num_raw_codewords(ver)
        - ecc_codewords_per_block(ver, ecl) * num_error_correction_blocks(ver, ecl)
}

pub fn ecc_codewords_per_block(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
}

pub fn num_error_correction_blocks(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

/// Maximum number of characters a single segment in `mode` can carry in a
/// symbol of the given version and level.
pub fn char_capacity(ver: Version, ecl: QrCodeEcc, mode: QrSegmentMode) -> usize {
    let ccbits = mode.num_char_count_bits(ver);
    let databits = get_num_data_codewords(ver, ecl) * 8;
    let bits = databits.saturating_sub(4 + usize::from(ccbits));
    use QrSegmentMode::*;
    let chars = match mode {
        Numeric => {
            let rem = bits % 10;
            bits / 10 * 3 + if rem >= 7 { 2 } else if rem >= 4 { 1 } else { 0 }
        }
        Alphanumeric => bits / 11 * 2 + usize::from(bits % 11 >= 6),
        Byte => bits / 8,
        Kanji => bits / 13,
    };
    chars.min((1usize << ccbits) - 1)
}

/// Picks the version to encode `segs` at.
///
/// Without an explicit version, versions 1 to 40 are tried in order and the
/// first that holds the data wins. An explicit version is only validated,
/// never upgraded. Returns the version and the number of data bits used.
pub fn select_version(
    segs: &[QrSegment],
    ecl: QrCodeEcc,
    requested: Option<Version>,
) -> Result<(Version, usize), EncodeError> {
    let fits = |version: Version| -> Result<usize, EncodeError> {
        let datacapacitybits = get_num_data_codewords(version, ecl) * 8;
        match QrSegment::get_total_bits(segs, version) {
            Some(n) if n <= datacapacitybits => Ok(n),
            dataused => Err(EncodeError::Capacity {
                version: version.value(),
                ecl,
                needed_bits: dataused.unwrap_or(usize::MAX),
                available_bits: datacapacitybits,
            }),
        }
    };

    if let Some(version) = requested {
        let used = fits(version)?;
        tracing::debug!(version = version.value(), used, "explicit version holds data");
        return Ok((version, used));
    }

    let mut version = Version::MIN;
    loop {
        match fits(version) {
            Ok(used) => {
                tracing::debug!(version = version.value(), used, "selected smallest version");
                return Ok((version, used));
            }
            Err(err) if version >= Version::MAX => return Err(err),
            Err(_) => version = Version::new(version.value() + 1),
        }
    }
}

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];
