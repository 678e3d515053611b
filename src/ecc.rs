//! Reed–Solomon error correction over GF(2^8/0x11D) and block interleaving.

use crate::capacity;
use crate::qrcode::{QrCodeEcc, Version};

/// Computes Reed–Solomon error correction codewords for a sequence of data
/// codewords at a given degree. Objects are immutable.
#[derive(Clone, Debug)]
pub struct ReedSolomonGenerator {
    /// Coefficients of the divisor polynomial, highest to lowest power,
    /// excluding the leading term which is always 1.
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Creates a generator for the given degree, which must be in 1..=255.
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        // Start off with the monomial x^0, then multiply by (x - r^i) for each root
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Returns the remainder of `data` times x^degree divided by the divisor.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.rotate_left(1);
            if let Some(last) = result.last_mut() {
                *last = 0;
            }
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
        result
    }

    /// Multiplies in GF(2^8/0x11D), Russian peasant style.
    pub fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

/// One error correction block: a slice of the data codewords and its ECC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// Splits data codewords into the blocks defined for `(ver, ecl)` and
/// computes each block's ECC.
///
/// Short blocks come first; long blocks carry one extra data codeword.
///
/// # Panics
///
/// Panics if `data` is not exactly the data codeword count of `(ver, ecl)`.
pub fn split_into_blocks(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Vec<Block> {
    assert_eq!(data.len(), capacity::get_num_data_codewords(ver, ecl), "Illegal argument");
    let numblocks = capacity::num_error_correction_blocks(ver, ecl);
    let blockecclen = capacity::ecc_codewords_per_block(ver, ecl);
    let rawcodewords = capacity::get_num_raw_codewords(ver);
    let numshortblocks = numblocks - rawcodewords % numblocks;
    let shortblockdatalen = rawcodewords / numblocks - blockecclen;

    let rs = ReedSolomonGenerator::new(blockecclen);
    let mut blocks = Vec::with_capacity(numblocks);
    let mut dat = data;
    for i in 0..numblocks {
        let datlen = shortblockdatalen + usize::from(i >= numshortblocks);
        let (head, rest) = dat.split_at(datlen);
        blocks.push(Block {
            data: head.to_vec(),
            ecc: rs.compute_remainder(head),
        });
        dat = rest;
    }
    debug_assert!(dat.is_empty());
    blocks
}

/// Interleaves blocks column by column: all data codewords first (skipping
/// the short blocks' missing last column), then all ECC codewords.
pub fn interleave(blocks: &[Block]) -> Vec<u8> {
    let total: usize = blocks.iter().map(|b| b.data.len() + b.ecc.len()).sum();
    let mut result = Vec::with_capacity(total);
    let maxdata = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
    for i in 0..maxdata {
        result.extend(blocks.iter().filter_map(|b| b.data.get(i)));
    }
    let maxecc = blocks.iter().map(|b| b.ecc.len()).max().unwrap_or(0);
    for i in 0..maxecc {
        result.extend(blocks.iter().filter_map(|b| b.ecc.get(i)));
    }
    result
}

/// Appends error correction to the data codewords and returns the final
/// codeword sequence to be placed in the symbol.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Vec<u8> {
    let result = interleave(&split_into_blocks(data, ver, ecl));
    debug_assert_eq!(result.len(), capacity::get_num_raw_codewords(ver));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(ReedSolomonGenerator::multiply(0, 0x53), 0);
        assert_eq!(ReedSolomonGenerator::multiply(1, 0x53), 0x53);
        assert_eq!(ReedSolomonGenerator::multiply(0x80, 0x02), 0x1d);
        assert_eq!(ReedSolomonGenerator::multiply(0x02, 0x8e), 0x01);
    }

    #[test]
    fn test_version_1m_reference_block() {
        // "01234567" at 1-M
        let data = [
            0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11,
            0xec, 0x11,
        ];
        let rs = ReedSolomonGenerator::new(10);
        assert_eq!(
            rs.compute_remainder(&data),
            vec![0xa5, 0x24, 0xd4, 0xc1, 0xed, 0x36, 0xc7, 0x87, 0x2c, 0x55]
        );
    }

    #[test]
    fn test_mixed_block_sizes() {
        // 5-Q: 2 blocks of 15 and 2 blocks of 16 data codewords, 18 ECC each
        let ver = Version::new(5);
        let data: Vec<u8> = (0..62).collect();
        let blocks = split_into_blocks(&data, ver, QrCodeEcc::Quartile);
        let lens: Vec<usize> = blocks.iter().map(|b| b.data.len()).collect();
        assert_eq!(lens, vec![15, 15, 16, 16]);
        assert!(blocks.iter().all(|b| b.ecc.len() == 18));

        let all = interleave(&blocks);
        assert_eq!(all.len(), 134);
        assert_eq!(&all[..4], &[0, 15, 30, 46]);
        // Column 15 only exists in the long blocks
        assert_eq!(&all[60..62], &[45, 61]);
        assert_eq!(all[62], blocks[0].ecc[0]);
    }
}
