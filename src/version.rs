//! Symbol versions, error correction levels, and their capacity tables.
use std::fmt;
use std::str::FromStr;

use crate::encodation::Mode;
use crate::EncodingError;

/// The error correction level of a symbol.
///
/// Higher levels can recover a larger share of damaged codewords but
/// leave less room for the payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EcLevel {
    /// Recovers about 7% of the codewords.
    L,
    /// Recovers about 15% of the codewords.
    M,
    /// Recovers about 25% of the codewords.
    Q,
    /// Recovers about 30% of the codewords.
    H,
}

impl EcLevel {
    /// Fixed column index into the per-version tables.
    ///
    /// The order comes from the two level bits of the format information
    /// field, not from increasing strength. The capacity tables below are
    /// laid out in this order, so changing the mapping would silently
    /// corrupt every lookup.
    pub(crate) fn index(self) -> usize {
        match self {
            EcLevel::L => 1,
            EcLevel::M => 0,
            EcLevel::Q => 3,
            EcLevel::H => 2,
        }
    }
}

impl Default for EcLevel {
    fn default() -> Self {
        EcLevel::L
    }
}

impl FromStr for EcLevel {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(EcLevel::L),
            "M" | "m" => Ok(EcLevel::M),
            "Q" | "q" => Ok(EcLevel::Q),
            "H" | "h" => Ok(EcLevel::H),
            _ => Err(EncodingError::InvalidEcLevel(s.into())),
        }
    }
}

/// A symbol version in `1..=40`.
///
/// The version determines the symbol width: a version v symbol is
/// 4v + 17 modules wide and tall.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    /// Create a version from its number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside `1..=40`. Use [TryFrom] for
    /// untrusted input.
    pub fn new(version: u8) -> Self {
        assert!(
            (Self::MIN.0..=Self::MAX.0).contains(&version),
            "version number out of range"
        );
        Version(version)
    }

    /// The version number in `1..=40`.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Symbol width (and height) in modules.
    pub fn width(self) -> usize {
        usize::from(self.0) * 4 + 17
    }

    /// All versions, smallest first.
    pub fn candidates() -> impl Iterator<Item = Version> {
        (Self::MIN.0..=Self::MAX.0).map(Version)
    }

    /// Row and column coordinates of the alignment pattern centres.
    pub(crate) fn alignment_centres(self) -> &'static [u8] {
        ALIGNMENT_CENTRES[usize::from(self.0)]
    }

    /// Number of error correction codewords in each block.
    pub(crate) fn ecc_per_block(self, level: EcLevel) -> usize {
        usize::from(ECC_CODEWORDS_PER_BLOCK[usize::from(self.0)][level.index()])
    }

    /// Number of error correction blocks the codewords are split into.
    pub(crate) fn num_blocks(self, level: EcLevel) -> usize {
        usize::from(NUM_ECC_BLOCKS[usize::from(self.0)][level.index()])
    }

    /// Number of modules left for the codeword stream after all function
    /// patterns are placed.
    pub(crate) fn num_raw_data_bits(self) -> usize {
        let v = usize::from(self.0);
        let mut bits = 16 * v * v + 128 * v + 64;
        if self.0 >= 7 {
            // version information occupies two 6x3 regions
            bits -= 36;
        }
        let m = self.alignment_centres().len();
        if m > 0 {
            bits -= 25 * m * m - 10 * m - 55;
        }
        bits
    }

    /// Number of bits available to the data part, before error correction.
    pub(crate) fn num_data_bits(self, level: EcLevel) -> usize {
        (self.num_raw_data_bits() & !7) - 8 * self.ecc_per_block(level) * self.num_blocks(level)
    }

    /// Number of data codewords at the given level.
    pub(crate) fn num_data_codewords(self, level: EcLevel) -> usize {
        self.num_data_bits(level) / 8
    }

    /// Maximum payload length, in characters for the text modes and in
    /// bytes for [Mode::Byte].
    pub(crate) fn max_payload_len(self, level: EcLevel, mode: Mode) -> usize {
        let bits = self.num_data_bits(level) - 4 - mode.char_count_bits(self) as usize;
        match mode {
            Mode::Numeric => {
                bits / 10 * 3
                    + match bits % 10 {
                        0..=3 => 0,
                        4..=6 => 1,
                        _ => 2,
                    }
            }
            Mode::Alphanumeric => bits / 11 * 2 + usize::from(bits % 11 >= 6),
            Mode::Byte => bits / 8,
        }
    }

    /// The smallest version that can hold `len` payload units, if any.
    pub(crate) fn smallest_fitting(len: usize, level: EcLevel, mode: Mode) -> Option<Version> {
        Version::candidates().find(|version| len <= version.max_payload_len(level, mode))
    }
}

impl TryFrom<u8> for Version {
    type Error = EncodingError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&version) {
            Ok(Version(version))
        } else {
            Err(EncodingError::InvalidVersion(version))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error correction codewords per block, one row per version.
///
/// The columns are ordered by [EcLevel::index]: M, L, H, Q.
#[rustfmt::skip]
const ECC_CODEWORDS_PER_BLOCK: [[u8; 4]; 41] = [
    [0, 0, 0, 0], [10, 7, 17, 13], [16, 10, 28, 22], [26, 15, 22, 18],
    [18, 20, 16, 26], [24, 26, 22, 18], [16, 18, 28, 24], [18, 20, 26, 18],
    [22, 24, 26, 22], [22, 30, 24, 20], [26, 18, 28, 24], [30, 20, 24, 28],
    [22, 24, 28, 26], [22, 26, 22, 24], [24, 30, 24, 20], [24, 22, 24, 30],
    [28, 24, 30, 24], [28, 28, 28, 28], [26, 30, 28, 28], [26, 28, 26, 26],
    [26, 28, 28, 30], [26, 28, 30, 28], [28, 28, 24, 30], [28, 30, 30, 30],
    [28, 30, 30, 30], [28, 26, 30, 30], [28, 28, 30, 28], [28, 30, 30, 30],
    [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30],
    [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30],
    [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30], [28, 30, 30, 30],
    [28, 30, 30, 30],
];

/// Error correction block count, one row per version, columns as above.
#[rustfmt::skip]
const NUM_ECC_BLOCKS: [[u8; 4]; 41] = [
    [0, 0, 0, 0], [1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 2, 2],
    [2, 1, 4, 2], [2, 1, 4, 4], [4, 2, 4, 4], [4, 2, 5, 6],
    [4, 2, 6, 6], [5, 2, 8, 8], [5, 4, 8, 8], [5, 4, 11, 8],
    [8, 4, 11, 10], [9, 4, 16, 12], [9, 4, 16, 16], [10, 6, 18, 12],
    [10, 6, 16, 17], [11, 6, 19, 16], [13, 6, 21, 18], [14, 7, 25, 21],
    [16, 8, 25, 20], [17, 8, 25, 23], [17, 9, 34, 23], [18, 9, 30, 25],
    [20, 10, 32, 27], [21, 12, 35, 29], [23, 12, 37, 34], [25, 12, 40, 34],
    [26, 13, 42, 35], [28, 14, 45, 38], [29, 15, 48, 40], [31, 16, 51, 43],
    [33, 17, 54, 45], [35, 18, 57, 48], [37, 19, 60, 51], [38, 19, 63, 53],
    [40, 20, 66, 56], [43, 21, 70, 59], [45, 22, 74, 62], [47, 24, 77, 65],
    [49, 25, 81, 68],
];

/// Alignment pattern centre coordinates, one row per version.
#[rustfmt::skip]
const ALIGNMENT_CENTRES: [&[u8]; 41] = [
    &[], &[], &[6, 18],
    &[6, 22], &[6, 26], &[6, 30],
    &[6, 34], &[6, 22, 38], &[6, 24, 42],
    &[6, 26, 46], &[6, 28, 50], &[6, 30, 54],
    &[6, 32, 58], &[6, 34, 62], &[6, 26, 46, 66],
    &[6, 26, 48, 70], &[6, 26, 50, 74], &[6, 30, 54, 78],
    &[6, 30, 56, 82], &[6, 30, 58, 86], &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94], &[6, 26, 50, 74, 98], &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106], &[6, 32, 58, 84, 110], &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118], &[6, 26, 50, 74, 98, 122], &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130], &[6, 30, 56, 82, 108, 134], &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142], &[6, 34, 62, 90, 118, 146], &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154], &[6, 28, 54, 80, 106, 132, 158], &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166], &[6, 30, 58, 86, 114, 142, 170],
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_index_is_the_format_field_order() {
        assert_eq!(EcLevel::L.index(), 1);
        assert_eq!(EcLevel::M.index(), 0);
        assert_eq!(EcLevel::Q.index(), 3);
        assert_eq!(EcLevel::H.index(), 2);
    }

    #[test]
    fn level_from_str() {
        assert_eq!("q".parse::<EcLevel>(), Ok(EcLevel::Q));
        assert_eq!("H".parse::<EcLevel>(), Ok(EcLevel::H));
        assert_eq!(
            "x".parse::<EcLevel>(),
            Err(EncodingError::InvalidEcLevel("x".into()))
        );
    }

    #[test]
    fn version_range() {
        assert_eq!(Version::try_from(1), Ok(Version::MIN));
        assert_eq!(Version::try_from(40), Ok(Version::MAX));
        assert_eq!(Version::try_from(0), Err(EncodingError::InvalidVersion(0)));
        assert_eq!(
            Version::try_from(41),
            Err(EncodingError::InvalidVersion(41))
        );
    }

    #[test]
    fn symbol_widths() {
        assert_eq!(Version::new(1).width(), 21);
        assert_eq!(Version::new(40).width(), 177);
    }

    #[test]
    fn raw_bit_counts() {
        // 26, 44, 196 and 3706 total codewords
        assert_eq!(Version::new(1).num_raw_data_bits() >> 3, 26);
        assert_eq!(Version::new(2).num_raw_data_bits() >> 3, 44);
        assert_eq!(Version::new(7).num_raw_data_bits() >> 3, 196);
        assert_eq!(Version::new(40).num_raw_data_bits() >> 3, 3706);
    }

    #[test]
    fn data_codeword_counts() {
        assert_eq!(Version::new(1).num_data_codewords(EcLevel::L), 19);
        assert_eq!(Version::new(1).num_data_codewords(EcLevel::M), 16);
        assert_eq!(Version::new(1).num_data_codewords(EcLevel::Q), 13);
        assert_eq!(Version::new(1).num_data_codewords(EcLevel::H), 9);
        assert_eq!(Version::new(40).num_data_codewords(EcLevel::L), 2956);
    }

    #[test]
    fn payload_capacities_match_the_published_tables() {
        let v1 = Version::new(1);
        assert_eq!(v1.max_payload_len(EcLevel::L, Mode::Numeric), 41);
        assert_eq!(v1.max_payload_len(EcLevel::L, Mode::Alphanumeric), 25);
        assert_eq!(v1.max_payload_len(EcLevel::L, Mode::Byte), 17);
        assert_eq!(v1.max_payload_len(EcLevel::M, Mode::Numeric), 34);
        assert_eq!(v1.max_payload_len(EcLevel::M, Mode::Alphanumeric), 20);
        assert_eq!(v1.max_payload_len(EcLevel::M, Mode::Byte), 14);
        let v40 = Version::new(40);
        assert_eq!(v40.max_payload_len(EcLevel::L, Mode::Numeric), 7089);
        assert_eq!(v40.max_payload_len(EcLevel::L, Mode::Alphanumeric), 4296);
        assert_eq!(v40.max_payload_len(EcLevel::L, Mode::Byte), 2953);
        assert_eq!(Version::new(10).max_payload_len(EcLevel::Q, Mode::Byte), 151);
    }

    #[test]
    fn smallest_fitting_version() {
        assert_eq!(
            Version::smallest_fitting(41, EcLevel::L, Mode::Numeric),
            Some(Version::new(1))
        );
        assert_eq!(
            Version::smallest_fitting(42, EcLevel::L, Mode::Numeric),
            Some(Version::new(2))
        );
        assert_eq!(
            Version::smallest_fitting(7090, EcLevel::L, Mode::Numeric),
            None
        );
    }

    #[test]
    fn alignment_centre_rows() {
        assert_eq!(Version::new(1).alignment_centres(), &[] as &[u8]);
        assert_eq!(Version::new(2).alignment_centres(), &[6, 18]);
        assert_eq!(Version::new(7).alignment_centres(), &[6, 22, 38]);
        assert_eq!(
            Version::new(40).alignment_centres(),
            &[6, 30, 58, 86, 114, 142, 170]
        );
    }
}
