//! Mask patterns, their penalty evaluation, and the BCH protected
//! information fields.
//!
//! A mask flips a fixed pattern of data modules so that problematic
//! arrangements (long runs, shapes that look like a finder pattern)
//! become unlikely. The standard defines eight candidate patterns and a
//! penalty score; the encoder tries all eight and keeps the cheapest.
//!
//! Which mask and error correction level were used is stored in the
//! symbol itself, protected by a small BCH code, so a reader can undo
//! the mask.
use alloc::{vec, vec::Vec};

use crate::placement::MatrixMap;
use crate::version::{EcLevel, Version};
use crate::EncodingError;

/// A mask pattern index in `0..=7`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mask(u8);

impl Mask {
    pub(crate) const ALL: [Mask; 8] = [
        Mask(0),
        Mask(1),
        Mask(2),
        Mask(3),
        Mask(4),
        Mask(5),
        Mask(6),
        Mask(7),
    ];

    /// The pattern number in `0..=7`.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the pattern flips the data module at the given position.
    fn flips(self, i: usize, j: usize) -> bool {
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

impl TryFrom<u8> for Mask {
    type Error = EncodingError;

    fn try_from(mask: u8) -> Result<Self, Self::Error> {
        if mask <= 7 {
            Ok(Mask(mask))
        } else {
            Err(EncodingError::InvalidMask(mask))
        }
    }
}

/// XOR the mask over the data cells. Reserved cells are never touched,
/// and applying the same mask twice restores the previous state.
pub(crate) fn apply(map: &mut MatrixMap, mask: Mask) {
    for i in 0..map.width() {
        for j in 0..map.width() {
            if !map.is_reserved(i, j) && mask.flips(i, j) {
                map.set_module(i, j, !map.module(i, j));
            }
        }
    }
}

/// Append the BCH remainder of the `p` bit value `poly` for the given
/// generator, widening it by `q` bits.
fn bch_augment(poly: u32, p: u32, genpoly: u32, q: u32) -> u32 {
    let mut modulus = poly << q;
    for i in (0..p).rev() {
        if modulus >> (q + i) & 1 == 1 {
            modulus ^= genpoly << i;
        }
    }
    (poly << q) | modulus
}

/// The 15 bit format field: error correction level and mask pattern,
/// protected by BCH(15, 5) and XORed with a fixed pattern so the field
/// is never all zero.
pub(crate) fn format_info(level: EcLevel, mask: Mask) -> u32 {
    let field = (level.index() as u32) << 3 | u32::from(mask.0);
    bch_augment(field, 5, 0x537, 10) ^ 0x5412
}

/// The 18 bit version field, BCH(18, 6), present from version 7 on.
pub(crate) fn version_info(version: Version) -> u32 {
    bch_augment(u32::from(version.value()), 6, 0x1F25, 12)
}

/// Write both copies of the format field.
///
/// One copy wraps around the top left finder, the other is split over
/// the top right and bottom left finders. The cells were reserved when
/// the matrix was built, so masking cannot disturb them.
pub(crate) fn write_format_info(map: &mut MatrixMap, level: EcLevel, mask: Mask) {
    let n = map.width();
    let code = format_info(level, mask);
    for i in 0..15 {
        let dark = code >> i & 1 == 1;
        let row = match i {
            0..=5 => i,
            6 => 7,
            7 => 8,
            _ => n - 15 + i,
        };
        let col = match i {
            0..=7 => n - 1 - i,
            8 => 7,
            _ => 14 - i,
        };
        map.set_module(row, 8, dark);
        map.set_module(8, col, dark);
    }
}

/// Try every mask and keep the cheapest, ties going to the lower
/// pattern number. The matrix is left unmasked.
pub(crate) fn select(map: &mut MatrixMap, level: EcLevel) -> Mask {
    let mut best = Mask::ALL[0];
    let mut best_score = usize::MAX;
    for mask in Mask::ALL {
        apply(map, mask);
        write_format_info(map, level, mask);
        let score = penalty_score(map);
        if score < best_score {
            best = mask;
            best_score = score;
        }
        apply(map, mask);
    }
    best
}

const PENALTY_RUN: usize = 3;
const PENALTY_BOX: usize = 3;
const PENALTY_FINDER_LIKE: usize = 40;
const PENALTY_DENSITY: usize = 10;

/// The alternating run lengths of a line, starting with a zero length
/// light run so that dark runs always sit at the odd indices.
fn run_groups(line: &[bool]) -> Vec<usize> {
    let mut groups = vec![0usize];
    let mut j = 0;
    while j < line.len() {
        let mut k = 0;
        while j < line.len() && line[j] {
            j += 1;
            k += 1;
        }
        groups.push(k);
        let mut k = 0;
        while j < line.len() && !line[j] {
            j += 1;
            k += 1;
        }
        groups.push(k);
    }
    groups
}

/// Score one line: long runs of one color, and runs in the 1:1:3:1:1
/// ratio of a finder pattern when a quiet zone of at least four times
/// the unit width borders them on either side.
fn score_runs(groups: &[usize]) -> usize {
    let mut score = 0;
    for &g in groups {
        if g >= 5 {
            score += PENALTY_RUN + (g - 5);
        }
    }
    let mut i = 5;
    while i < groups.len() {
        let p = groups[i];
        if groups[i - 1] == p
            && groups[i - 2] == 3 * p
            && groups[i - 3] == p
            && groups[i - 4] == p
            && (groups[i - 5] >= 4 * p || groups.get(i + 1).map_or(false, |&g| g >= 4 * p))
        {
            score += PENALTY_FINDER_LIKE;
        }
        i += 2;
    }
    score
}

/// Total penalty of the matrix under the current mask. Lower is better.
pub(crate) fn penalty_score(map: &MatrixMap) -> usize {
    let n = map.width();
    let mut score = 0;
    let mut dark = 0;
    for i in 0..n {
        let row: Vec<bool> = (0..n).map(|j| map.module(i, j)).collect();
        let col: Vec<bool> = (0..n).map(|j| map.module(j, i)).collect();
        score += score_runs(&run_groups(&row));
        score += score_runs(&run_groups(&col));
        dark += row.iter().filter(|&&d| d).count();
        // 2x2 blocks of one color; the last row has no row below it
        if i + 1 < n {
            for j in 0..n - 1 {
                let c = row[j];
                if c == row[j + 1] && c == map.module(i + 1, j) && c == map.module(i + 1, j + 1) {
                    score += PENALTY_BOX;
                }
            }
        }
    }
    // |darkness - 50%| in steps of five percent, truncated
    score += PENALTY_DENSITY * ((20 * dark).abs_diff(10 * n * n) / (n * n));
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::MatrixMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn mask_range() {
        assert_eq!(Mask::try_from(0).map(Mask::value), Ok(0));
        assert_eq!(Mask::try_from(7).map(Mask::value), Ok(7));
        assert_eq!(Mask::try_from(8), Err(EncodingError::InvalidMask(8)));
    }

    #[test]
    fn masking_is_an_involution() {
        let version = Version::new(2);
        let mut map = MatrixMap::new(version);
        let stream: Vec<u8> = (0..44).map(|i| i as u8 ^ 0x5A).collect();
        map.place_codewords(&stream);
        let before: Vec<bool> = (0..map.width())
            .flat_map(|i| (0..map.width()).map(move |j| (i, j)))
            .map(|(i, j)| map.module(i, j))
            .collect();
        for mask in Mask::ALL {
            apply(&mut map, mask);
            apply(&mut map, mask);
        }
        let after: Vec<bool> = (0..map.width())
            .flat_map(|i| (0..map.width()).map(move |j| (i, j)))
            .map(|(i, j)| map.module(i, j))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn masks_leave_reserved_cells_alone() {
        let version = Version::new(1);
        let mut map = MatrixMap::new(version);
        let reserved_before: Vec<bool> = (0..21)
            .flat_map(|i| (0..21).map(move |j| (i, j)))
            .filter(|&(i, j)| map.is_reserved(i, j))
            .map(|(i, j)| map.module(i, j))
            .collect();
        for mask in Mask::ALL {
            apply(&mut map, mask);
        }
        let reserved_after: Vec<bool> = (0..21)
            .flat_map(|i| (0..21).map(move |j| (i, j)))
            .filter(|&(i, j)| map.is_reserved(i, j))
            .map(|(i, j)| map.module(i, j))
            .collect();
        assert_eq!(reserved_before, reserved_after);
    }

    #[test]
    fn format_codes_match_the_published_values() {
        // an all zero field maps to the fixed XOR pattern
        assert_eq!(format_info(EcLevel::M, Mask::ALL[0]), 0x5412);
        assert_eq!(format_info(EcLevel::M, Mask::ALL[5]), 0b100_0000_1100_1110);
        assert_eq!(format_info(EcLevel::Q, Mask::ALL[5]), 0x2183);
    }

    #[test]
    fn version_codes_match_the_published_values() {
        assert_eq!(version_info(Version::new(7)), 0x07C94);
        assert_eq!(version_info(Version::new(33)), 0x216F0);
    }

    #[test]
    fn finder_like_run_is_penalized() {
        let line = [
            true, false, true, true, true, false, true, false, false, false, false,
        ];
        assert_eq!(score_runs(&run_groups(&line)), PENALTY_FINDER_LIKE);
        // without the quiet zone the ratio alone does not count
        let bare = [true, false, true, true, true, false, true];
        assert_eq!(score_runs(&run_groups(&bare)), 0);
        // a quiet zone in front works as well
        let leading = [
            false, false, false, false, true, false, true, true, true, false, true,
        ];
        assert_eq!(score_runs(&run_groups(&leading)), PENALTY_FINDER_LIKE);
    }

    #[test]
    fn long_runs_are_penalized() {
        let line = [true; 7];
        assert_eq!(score_runs(&run_groups(&line)), PENALTY_RUN + 2);
        let line = [false; 5];
        assert_eq!(score_runs(&run_groups(&line)), PENALTY_RUN);
        let line = [true, false, true, false];
        assert_eq!(score_runs(&run_groups(&line)), 0);
    }

    #[test]
    fn run_groups_start_with_a_light_sentinel() {
        let line = [false, true, true, false];
        assert_eq!(run_groups(&line), vec![0, 0, 1, 2, 1]);
        let line = [true, true];
        assert_eq!(run_groups(&line), vec![0, 2, 0]);
    }

    #[test]
    fn selection_is_deterministic() {
        let version = Version::new(1);
        let stream: Vec<u8> = (0..26).map(|i| (i * 31 + 7) as u8).collect();
        let mut first = MatrixMap::new(version);
        first.place_codewords(&stream);
        let mut second = MatrixMap::new(version);
        second.place_codewords(&stream);
        assert_eq!(
            select(&mut first, EcLevel::L),
            select(&mut second, EcLevel::L)
        );
    }
}
