//! Mask patterns, penalty scoring and mask selection.

use crate::matrix::ModuleMatrix;
use crate::qrcode::QrCodeEcc;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// All eight patterns, in index order.
    pub const ALL: [Mask; 8] = [
        Mask(0),
        Mask(1),
        Mask(2),
        Mask(3),
        Mask(4),
        Mask(5),
        Mask(6),
        Mask(7),
    ];

    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns `None` if the number is outside the range [0, 7].
    pub const fn try_new(mask: u8) -> Option<Self> {
        if mask <= 7 {
            Some(Self(mask))
        } else {
            None
        }
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this mask flips the module at column `x`, row `y`.
    pub fn inverts(self, x: i32, y: i32) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Tries every mask on `matrix` and leaves it with the lowest-penalty one
/// applied and its format word written. The first mask reaching the minimum
/// wins ties.
///
/// Version information is written before scoring, so the scored grid is
/// the final one apart from the format word under evaluation.
pub fn select_mask(matrix: &mut ModuleMatrix, ecl: QrCodeEcc) -> Mask {
    matrix.draw_version_bits();
    let mut best = Mask::new(0);
    let mut minpenalty = i32::MAX;
    for mask in Mask::ALL {
        matrix.apply_mask(mask);
        matrix.draw_format_bits(ecl, mask);
        let penalty = get_penalty_score(matrix);
        tracing::trace!(mask = mask.value(), penalty, "scored mask");
        if penalty < minpenalty {
            best = mask;
            minpenalty = penalty;
        }
        matrix.apply_mask(mask); // Undoes the mask due to XOR
    }
    tracing::debug!(mask = best.value(), penalty = minpenalty, "selected mask");
    commit_mask(matrix, ecl, best);
    best
}

/// Applies `mask` and writes the final format and version information.
pub fn commit_mask(matrix: &mut ModuleMatrix, ecl: QrCodeEcc, mask: Mask) {
    matrix.apply_mask(mask);
    matrix.draw_format_bits(ecl, mask);
    matrix.draw_version_bits();
}

/// Computes the penalty score of the matrix as currently drawn.
///
/// Four rules: runs of five or more same-colored modules in a row or column
/// (N1), 2x2 same-colored blocks (N2), finder-like 1:1:3:1:1 patterns with
/// four light modules on one side (N3), and deviation of the dark ratio
/// from 50% in 5% steps (N4).
pub fn get_penalty_score(matrix: &ModuleMatrix) -> i32 {
    let mut result: i32 = 0;
    let size = matrix.size();

    // Adjacent modules in row having same color, and finder-like patterns
    for y in 0..size {
        result += line_penalty(size, |i| matrix.is_dark(i, y));
    }
    // Adjacent modules in column having same color, and finder-like patterns
    for x in 0..size {
        result += line_penalty(size, |i| matrix.is_dark(x, i));
    }

    // 2*2 blocks of modules having same color
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = matrix.is_dark(x, y);
            if color == matrix.is_dark(x + 1, y)
                && color == matrix.is_dark(x, y + 1)
                && color == matrix.is_dark(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Balance of dark and light modules
    let dark = matrix.dark_count() as i32;
    let total = size * size;
    // Smallest k >= 0 such that (45-5k)% <= dark/total <= (55+5k)%
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

fn line_penalty(size: i32, isdark: impl Fn(i32) -> bool) -> i32 {
    let mut result = 0;
    let mut runcolor = false;
    let mut runlen: i32 = 0;
    let mut runhistory = FinderPenalty::new(size);
    for i in 0..size {
        let color = isdark(i);
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            runhistory.add_history(runlen);
            if !runcolor {
                result += runhistory.count_patterns() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3
}

/// Recent run lengths along one line, newest first, used to spot
/// finder-like patterns. The light border outside the symbol counts as a
/// run of `qr_size` light modules at each end.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            qr_size: size,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // Add light border to initial run
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Can only be called right after a light run is added. Returns 0, 1 or 2.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    /// Must be called at the end of a line.
    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            // Terminate dark run
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size; // Add light border to final run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}
