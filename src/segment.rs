//! Data segments and the bit-level encoding of their payloads.
//!
//! A segment is a run of characters sharing one encoding mode. Text is
//! classified into the narrowest mode that can represent all of it by
//! [`analyze`], then packed by one of the `make_*` constructors.

use crate::capacity;
use crate::error::EncodeError;
use crate::qrcode::{QrCodeEcc, Version};

/// The set of characters encodable in alphanumeric mode, in code order.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Describes how a segment's data bits are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl QrSegmentMode {
    /// Returns the 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
        }
    }

    /// Returns the bit width of the character count field for a segment in
    /// this mode in a QR Code at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
        })[usize::from((ver.value() + 7) / 17)]
    }
}

/// An appendable sequence of bits, packed big-endian into bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant bit first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 31` or if `val` has bits set above `len`.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value out of range");
        for i in (0..len).rev() {
            let shift = 7 - (self.length & 7);
            if shift == 7 {
                self.data.push(0);
            }
            let bit = ((val >> i) & 1) as u8;
            if let Some(last) = self.data.last_mut() {
                *last |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Returns the bit at the given index.
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.length, "Bit index out of range");
        (self.data[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// The packed bytes. The final byte is zero-padded when the bit length is
    /// not a multiple of 8.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// A segment of character/binary/control data in a QR Code symbol.
///
/// Instances are immutable. Create them with [`QrSegment::make_numeric`],
/// [`QrSegment::make_alphanumeric`], [`QrSegment::make_bytes`] or
/// [`QrSegment::make_kanji`], or let [`QrSegment::make_segment`] pick the mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: BitBuffer,
}

impl QrSegment {
    /// Creates a segment for binary data in byte mode.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer::with_capacity(data.len() * 8);
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        QrSegment::new(QrSegmentMode::Byte, data.len(), bb)
    }

    /// Creates a segment for a string of decimal digits in numeric mode.
    ///
    /// Digits are packed in groups of three into 10 bits; a trailing group of
    /// one or two digits takes 4 or 7 bits.
    pub fn make_numeric(text: &str) -> Result<Self, EncodeError> {
        let mut bb = BitBuffer::with_capacity(text.len() * 10 / 3 + 7);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            if !b.is_ascii_digit() {
                return Err(EncodeError::input(
                    "text",
                    format!("{:?} is not encodable in numeric mode", char::from(b)),
                ));
            }
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Ok(QrSegment::new(QrSegmentMode::Numeric, text.len(), bb))
    }

    /// Creates a segment for alphanumeric text.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    pub fn make_alphanumeric(text: &str) -> Result<Self, EncodeError> {
        let mut bb = BitBuffer::with_capacity(text.len() * 11 / 2 + 6);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let i = ALPHANUMERIC_CHARSET.find(c).ok_or_else(|| {
                EncodeError::input("text", format!("{:?} is not encodable in alphanumeric mode", c))
            })?;
            // The charset is ASCII, so byte offsets are character indices
            accumdata = accumdata * 45 + i as u32;
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, 6);
        }
        Ok(QrSegment::new(QrSegmentMode::Alphanumeric, text.len(), bb))
    }

    /// Creates a kanji mode segment from Shift JIS encoded double-byte characters.
    ///
    /// Each pair must lie in 0x8140–0x9FFC or 0xE040–0xEBBF, with a trail
    /// byte in 0x40–0xFC other than 0x7F.
    pub fn make_kanji(sjis: &[u8]) -> Result<Self, EncodeError> {
        if sjis.len() % 2 != 0 {
            return Err(EncodeError::input("sjis", "Shift JIS data must be whole byte pairs"));
        }
        let mut bb = BitBuffer::with_capacity(sjis.len() / 2 * 13);
        for pair in sjis.chunks_exact(2) {
            let code = (u32::from(pair[0]) << 8) | u32::from(pair[1]);
            let trail_ok = matches!(pair[1], 0x40..=0x7e | 0x80..=0xfc);
            let offset = match code {
                0x8140..=0x9ffc if trail_ok => code - 0x8140,
                0xe040..=0xebbf if trail_ok => code - 0xc140,
                _ => {
                    return Err(EncodeError::input(
                        "sjis",
                        format!("0x{:04X} is not a kanji mode character", code),
                    ))
                }
            };
            bb.append_bits((offset >> 8) * 0xc0 + (offset & 0xff), 13);
        }
        Ok(QrSegment::new(QrSegmentMode::Kanji, sjis.len() / 2, bb))
    }

    /// Classifies `text` with [`analyze`] and packs it in the chosen mode.
    pub fn make_segment(text: &str) -> Result<Self, EncodeError> {
        match analyze(text)? {
            QrSegmentMode::Numeric => QrSegment::make_numeric(text),
            QrSegmentMode::Alphanumeric => QrSegment::make_alphanumeric(text),
            _ => Ok(QrSegment::make_bytes(text.as_bytes())),
        }
    }

    fn new(mode: QrSegmentMode, numchars: usize, data: BitBuffer) -> Self {
        Self { mode, numchars, data }
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// The packed payload bits, without mode indicator or character count.
    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    /// Returns the number of bits needed to encode the given segments at the
    /// given version, or `None` if a segment's character count does not fit
    /// its count field or the total overflows.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if seg.numchars >= 1usize << ccbits {
                return None;
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    /// Payload bit count for `numchars` characters in `mode`.
    pub fn calc_bit_length(mode: QrSegmentMode, numchars: usize) -> Option<usize> {
        let mul_frac_ceil = |numer: usize, denom: usize| {
            numchars
                .checked_mul(numer)
                .and_then(|x| x.checked_add(denom - 1))
                .map(|x| x / denom)
        };
        use QrSegmentMode::*;
        match mode {
            Numeric => mul_frac_ceil(10, 3),
            Alphanumeric => mul_frac_ceil(11, 2),
            Byte => mul_frac_ceil(8, 1),
            Kanji => mul_frac_ceil(13, 1),
        }
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

/// Picks the narrowest mode able to represent every character of `text`.
///
/// Fails if the text is empty or longer than the largest symbol
/// (version 40, level L) can hold in that mode.
pub fn analyze(text: &str) -> Result<QrSegmentMode, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::input("text", "text must not be empty"));
    }
    let (mode, numchars) = if QrSegment::is_numeric(text) {
        (QrSegmentMode::Numeric, text.len())
    } else if QrSegment::is_alphanumeric(text) {
        (QrSegmentMode::Alphanumeric, text.len())
    } else {
        (QrSegmentMode::Byte, text.len())
    };
    let maxchars = capacity::char_capacity(Version::MAX, QrCodeEcc::Low, mode);
    if numchars > maxchars {
        return Err(EncodeError::input(
            "text",
            format!(
                "{} characters exceed the {} character {:?} capacity of the largest symbol",
                numchars, maxchars, mode
            ),
        ));
    }
    tracing::debug!(?mode, numchars, "classified input");
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert_eq!(QrSegment::is_numeric("1234567890"), true);
        assert_eq!(QrSegment::is_numeric("1234abc"), false);
    }

    #[test]
    fn test_is_alphanumeric() {
        assert_eq!(QrSegment::is_alphanumeric("HELLO WORLD"), true);
        assert_eq!(QrSegment::is_alphanumeric("Hello World"), false);
    }

    #[test]
    fn test_analyze_picks_narrowest_mode() {
        assert_eq!(analyze("0123").unwrap(), QrSegmentMode::Numeric);
        assert_eq!(analyze("HTTP://A.B/C").unwrap(), QrSegmentMode::Alphanumeric);
        assert_eq!(analyze("https://www.microsoft.com").unwrap(), QrSegmentMode::Byte);
        assert_eq!(analyze("héllo").unwrap(), QrSegmentMode::Byte);
    }

    #[test]
    fn test_analyze_rejects_empty_and_oversized() {
        assert!(matches!(analyze(""), Err(EncodeError::Input { param: "text", .. })));
        let digits = "7".repeat(7090);
        assert!(matches!(analyze(&digits), Err(EncodeError::Input { .. })));
        assert_eq!(analyze(&"7".repeat(7089)).unwrap(), QrSegmentMode::Numeric);
    }

    #[test]
    fn test_bit_buffer_packs_msb_first() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b1, 1);
        bb.append_bits(0b0101, 4);
        bb.append_bits(0b111, 3);
        bb.append_bits(0b10, 2);
        assert_eq!(bb.len(), 10);
        assert_eq!(bb.as_bytes(), &[0b1010_1111, 0b1000_0000]);
        assert!(bb.get(0));
        assert!(!bb.get(9));
    }

    #[test]
    fn test_numeric_grouping() {
        // "01234567" -> 012 345 67 -> 10 + 10 + 7 bits
        let seg = QrSegment::make_numeric("01234567").unwrap();
        assert_eq!(seg.data().len(), 27);
        assert_eq!(seg.data().as_bytes(), &[0x03, 0x15, 0x98, 0x60]);

        let seg = QrSegment::make_numeric("1").unwrap();
        assert_eq!(seg.data().len(), 4);
        assert_eq!(seg.data().as_bytes(), &[0b0001_0000]);
    }

    #[test]
    fn test_alphanumeric_pairs() {
        // "AC-42": (10*45+12)=462, (41*45+4)=1849, '2'=2
        let seg = QrSegment::make_alphanumeric("AC-42").unwrap();
        assert_eq!(seg.data().len(), 11 + 11 + 6);
        let mut expected = BitBuffer::new();
        expected.append_bits(462, 11);
        expected.append_bits(1849, 11);
        expected.append_bits(2, 6);
        assert_eq!(seg.data(), &expected);
        assert!(QrSegment::make_alphanumeric("ac").is_err());
    }

    #[test]
    fn test_kanji_packing() {
        // 0x935F -> 0x121F -> 0x12 * 0xC0 + 0x1F = 0xD9F
        // 0xE4AA -> 0x236A -> 0x23 * 0xC0 + 0x6A = 0x1AAA
        let seg = QrSegment::make_kanji(&[0x93, 0x5f, 0xe4, 0xaa]).unwrap();
        assert_eq!(seg.num_chars(), 2);
        let mut expected = BitBuffer::new();
        expected.append_bits(0xd9f, 13);
        expected.append_bits(0x1aaa, 13);
        assert_eq!(seg.data(), &expected);

        assert!(QrSegment::make_kanji(&[0x93]).is_err());
        assert!(QrSegment::make_kanji(&[0x41, 0x42]).is_err());
    }

    #[test]
    fn test_kanji_rejects_bad_trail_bytes() {
        // 0x8230 would pack to the same value as 0x8270
        assert!(QrSegment::make_kanji(&[0x82, 0x30]).is_err());
        assert!(QrSegment::make_kanji(&[0x81, 0x7f]).is_err());
        assert!(QrSegment::make_kanji(&[0x9f, 0xfd]).is_err());
        assert!(QrSegment::make_kanji(&[0xe0, 0x3f]).is_err());
        assert!(QrSegment::make_kanji(&[0x82, 0x70]).is_ok());
        assert!(QrSegment::make_kanji(&[0x81, 0x80]).is_ok());
        assert!(QrSegment::make_kanji(&[0xeb, 0xbf]).is_ok());
    }

    #[test]
    fn test_char_count_bits_by_version_range() {
        use QrSegmentMode::*;
        assert_eq!(Numeric.num_char_count_bits(Version::new(9)), 10);
        assert_eq!(Numeric.num_char_count_bits(Version::new(10)), 12);
        assert_eq!(Numeric.num_char_count_bits(Version::new(27)), 14);
        assert_eq!(Byte.num_char_count_bits(Version::new(1)), 8);
        assert_eq!(Byte.num_char_count_bits(Version::new(40)), 16);
        assert_eq!(Kanji.num_char_count_bits(Version::new(26)), 10);
    }
}
