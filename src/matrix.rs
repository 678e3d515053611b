//! The module grid of a symbol under construction.
//!
//! Every cell starts out [`Module::Unset`]. Function patterns are stamped
//! first, format and version areas are held as [`Module::Reserved`], and the
//! remaining cells receive codeword bits as [`Module::Data`]. Only data
//! modules are ever touched by masking.

use crate::capacity;
use crate::mask::Mask;
use crate::qrcode::{QrCodeEcc, Version};

/// State of one cell in a [`ModuleMatrix`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Module {
    Unset,
    /// Held for format or version information not written yet.
    Reserved,
    /// Fixed module: finder, separator, timing, alignment, dark module, or
    /// written format/version information.
    Function(bool),
    /// Codeword or remainder bit.
    Data(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Function(true) | Module::Data(true))
    }

    /// True for cells that masking must leave alone.
    pub fn is_function(self) -> bool {
        matches!(self, Module::Reserved | Module::Function(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMatrix {
    version: Version,
    size: i32,
    modules: Vec<Module>,
}

impl ModuleMatrix {
    /// Allocates an empty grid of side `4 * version + 17`.
    pub fn new(version: Version) -> Self {
        let size = i32::from(version.value()) * 4 + 17;
        Self {
            version,
            size,
            modules: vec![Module::Unset; (size * size) as usize],
        }
    }

    /// Allocates a grid with every function pattern stamped and the
    /// format/version areas reserved.
    pub fn with_function_patterns(version: Version) -> Self {
        let mut result = Self::new(version);
        result.draw_function_patterns();
        result
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns the module at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Module {
        self.modules[self.index(x, y)]
    }

    /// Returns whether the module at `(x, y)` is dark. Coordinates outside
    /// the grid are light.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.get(x, y).is_dark()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    fn index(&self, x: i32, y: i32) -> usize {
        let range = 0..self.size;
        assert!(range.contains(&x) && range.contains(&y), "Module coordinates out of range");
        (y * self.size + x) as usize
    }

    fn set(&mut self, x: i32, y: i32, module: Module) {
        let index = self.index(x, y);
        self.modules[index] = module;
    }

    fn set_function(&mut self, x: i32, y: i32, isdark: bool) {
        self.set(x, y, Module::Function(isdark));
    }

    /// Stamps timing, finder, alignment patterns and the dark module, and
    /// reserves the format and version information areas.
    pub fn draw_function_patterns(&mut self) {
        let size = self.size;
        for i in 0..size {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }

        // Finders overwrite the timing patterns where they cross
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        let alignpatpos = alignment_pattern_positions(self.version);
        let numalign = alignpatpos.len();
        for (i, &pos0) in alignpatpos.iter().enumerate() {
            for (j, &pos1) in alignpatpos.iter().enumerate() {
                // Skip the three corners taken by finder patterns
                if (i == 0 && j == 0) || (i == 0 && j == numalign - 1) || (i == numalign - 1 && j == 0) {
                    continue;
                }
                self.draw_alignment_pattern(pos0, pos1);
            }
        }

        self.reserve_format_area();
        if self.version.value() >= 7 {
            self.reserve_version_area();
        }
    }

    /// Draws a 9x9 finder pattern including the separator border, centered at
    /// `(x, y)`. Cells outside the grid are skipped.
    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let xx = x + dx;
                let yy = y + dy;
                if (0..self.size).contains(&xx) && (0..self.size).contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    /// Draws a 5x5 alignment pattern centered at `(x, y)`.
    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                self.set_function(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn reserve_format_area(&mut self) {
        let size = self.size;
        for i in 0..=8 {
            if i != 6 {
                self.set(8, i, Module::Reserved);
                self.set(i, 8, Module::Reserved);
            }
        }
        for i in 0..8 {
            self.set(size - 1 - i, 8, Module::Reserved);
        }
        for i in 0..7 {
            self.set(8, size - 1 - i, Module::Reserved);
        }
        // Always dark
        self.set_function(8, size - 8, true);
    }

    fn reserve_version_area(&mut self) {
        let size = self.size;
        for i in 0..18 {
            let a = size - 11 + i % 3;
            let b = i / 3;
            self.set(a, b, Module::Reserved);
            self.set(b, a, Module::Reserved);
        }
    }

    /// Places the interleaved codewords in the zig-zag order: two-module-wide
    /// columns from right to left, alternating upward and downward, skipping
    /// the vertical timing column and every function module. Cells left over
    /// after the last codeword are remainder bits and stay light.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not the raw codeword count for this version.
    pub fn draw_codewords(&mut self, data: &[u8]) {
        assert_eq!(
            data.len(),
            capacity::get_num_raw_codewords(self.version),
            "Illegal argument"
        );
        let size = self.size;
        let totalbits = data.len() * 8;
        let mut i: usize = 0;
        let mut right: i32 = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = right - j;
                    if self.get(x, y) != Module::Unset {
                        continue;
                    }
                    let bit = i < totalbits && get_bit(data[i >> 3].into(), 7 - (i & 7) as u8);
                    self.set(x, y, Module::Data(bit));
                    i += 1;
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, capacity::get_num_raw_data_modules(self.version));
    }

    /// Writes the BCH protected format word for `ecl` and `mask` into both
    /// copies of the format area.
    pub fn draw_format_bits(&mut self, ecl: QrCodeEcc, mask: Mask) {
        let bits = format_bits(ecl, mask);
        let size = self.size;

        // First copy, around the top left finder
        for i in 0..6 {
            self.set_function(8, i, get_bit(bits, i as u8));
        }
        self.set_function(8, 7, get_bit(bits, 6));
        self.set_function(8, 8, get_bit(bits, 7));
        self.set_function(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function(14 - i, 8, get_bit(bits, i as u8));
        }

        // Second copy, split between the other two finders
        for i in 0..8 {
            self.set_function(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function(8, size - 8, true);
    }

    /// Writes the 18-bit version word into both version areas. No-op below
    /// version 7.
    pub fn draw_version_bits(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        let size = self.size;
        for i in 0..18 {
            let bit = get_bit(bits, i as u8);
            let a = size - 11 + i % 3;
            let b = i / 3;
            self.set_function(a, b, bit);
            self.set_function(b, a, bit);
        }
    }

    /// XORs the mask formula into every data module. Applying the same mask
    /// twice restores the previous state.
    pub fn apply_mask(&mut self, mask: Mask) {
        let size = self.size;
        for y in 0..size {
            for x in 0..size {
                let index = (y * size + x) as usize;
                if let Module::Data(isdark) = self.modules[index] {
                    self.modules[index] = Module::Data(isdark ^ mask.inverts(x, y));
                }
            }
        }
    }

    /// Number of dark modules in the grid.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_dark()).count()
    }
}

/// Returns the ascending center coordinates of the alignment patterns for a
/// version. Each coordinate is used for both axes. Empty for version 1.
pub fn alignment_pattern_positions(ver: Version) -> Vec<i32> {
    let ver = i32::from(ver.value());
    if ver == 1 {
        return Vec::new();
    }
    let size = ver * 4 + 17;
    let numalign = ver / 7 + 2;
    let step = if ver == 32 {
        26
    } else {
        ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
    };
    let mut result: Vec<i32> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

/// The 15-bit format word: 2 level bits and 3 mask bits, a BCH(15,5)
/// remainder, XORed with 0x5412.
pub fn format_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// The 18-bit version word: 6 version bits and a BCH(18,6) remainder.
pub fn version_bits(ver: Version) -> u32 {
    let ver = u32::from(ver.value());
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    (ver << 12) | rem
}

pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}
