//! Implementation of the data part encoding using all supported modes.
//!
//! The data part of the codeword stream consists of a 4 bit mode
//! indicator, the payload length, the payload packed according to the
//! mode, a terminator, and pad codewords up to the data capacity of the
//! symbol. Everything after it (error correction, interleaving) works on
//! whole codewords and lives in [crate::errorcode].
use alloc::vec::Vec;

use bitstream_io::{BigEndian, BitRecorder, BitWrite, BitWriter};
use flagset::{flags, FlagSet};

use std::str::FromStr;

pub(crate) mod alphanumeric;
mod bytes;
pub(crate) mod numeric;

use crate::version::{EcLevel, Version};
use crate::EncodingError;

/// Bit sink the mode encoders write into, most significant bit first.
pub(crate) type BitStream = BitRecorder<u32, BigEndian>;

type CodewordWriter<'a> = BitWriter<&'a mut Vec<u8>, BigEndian>;

/// Mode indicator of the terminator written after the payload.
const TERMINATOR: u32 = 0b0000;

/// Codewords alternated with each other to fill the remaining capacity.
const PAD_CODEWORDS: [u8; 2] = [0xEC, 0x11];

flags! {
    /// The payload encoding modes.
    ///
    /// The flag values double as the 4 bit mode indicators that open a
    /// segment in the bit stream. The Kanji indicator (0b1000) is not
    /// supported.
    pub enum Mode: u8 {
        /// Digits `0-9`, packed three to ten bits.
        Numeric = 0b0001,
        /// Digits, capital letters and the nine characters
        /// `SP $ % * + - . / :`, packed two to eleven bits.
        Alphanumeric = 0b0010,
        /// Arbitrary bytes. Text is UTF-8 encoded first.
        Byte = 0b0100,
    }
}

impl Mode {
    /// All modes, for unrestricted auto detection.
    pub fn all() -> FlagSet<Mode> {
        FlagSet::full()
    }

    /// The 4 bit mode indicator that goes on the wire.
    pub(crate) fn indicator(self) -> u32 {
        match self {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
        }
    }

    /// Width of the payload length field in bits.
    pub(crate) fn char_count_bits(self, version: Version) -> u32 {
        let class = match version.value() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][class],
            Mode::Alphanumeric => [9, 11, 13][class],
            Mode::Byte => [8, 16, 16][class],
        }
    }

    /// Pick the first enabled mode whose character set covers `data`.
    ///
    /// Detection only ever selects alphanumeric for uppercase content,
    /// everything else falls through to [Mode::Byte].
    pub(crate) fn detect(data: &[u8], enabled: FlagSet<Mode>) -> Result<Mode, EncodingError> {
        if enabled.contains(Mode::Numeric) && numeric::is_valid(data) {
            Ok(Mode::Numeric)
        } else if enabled.contains(Mode::Alphanumeric) && alphanumeric::is_valid(data) {
            Ok(Mode::Alphanumeric)
        } else if enabled.contains(Mode::Byte) {
            Ok(Mode::Byte)
        } else {
            Err(EncodingError::ModeMismatch)
        }
    }

    /// Check a payload against an explicitly requested mode.
    ///
    /// Unlike detection this accepts lowercase letters for alphanumeric;
    /// they are folded to uppercase before encoding.
    pub(crate) fn validate(self, data: &[u8]) -> Result<(), EncodingError> {
        let ok = match self {
            Mode::Numeric => numeric::is_valid(data),
            Mode::Alphanumeric => alphanumeric::is_valid_folded(data),
            Mode::Byte => true,
        };
        if ok {
            Ok(())
        } else {
            Err(EncodingError::ModeMismatch)
        }
    }
}

impl FromStr for Mode {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "numeric" => Ok(Mode::Numeric),
            "alphanumeric" => Ok(Mode::Alphanumeric),
            "octet" | "byte" => Ok(Mode::Byte),
            _ => Err(EncodingError::InvalidMode(s.into())),
        }
    }
}

/// Packs one payload into the padded data codewords of a symbol.
///
/// The caller has already validated the payload against the mode and
/// picked a version it fits into.
pub(crate) struct DataEncoder<'a> {
    data: &'a [u8],
    mode: Mode,
    version: Version,
    level: EcLevel,
}

impl<'a> DataEncoder<'a> {
    pub fn new(data: &'a [u8], mode: Mode, version: Version, level: EcLevel) -> Self {
        Self {
            data,
            mode,
            version,
            level,
        }
    }

    /// Produce the data codewords: mode, length, payload, terminator
    /// and padding.
    pub fn codewords(&self) -> Vec<u8> {
        let mut stream = BitStream::new();
        stream.write(4, self.mode.indicator()).unwrap();
        stream
            .write(
                self.mode.char_count_bits(self.version),
                self.data.len() as u32,
            )
            .unwrap();
        match self.mode {
            Mode::Numeric => numeric::encode(&mut stream, self.data),
            Mode::Alphanumeric => alphanumeric::encode(&mut stream, self.data),
            Mode::Byte => bytes::encode(&mut stream, self.data),
        }

        let capacity = self.version.num_data_bits(self.level) as u32;
        debug_assert!(stream.written() <= capacity);
        // the terminator is truncated when the payload is an exact fit
        let terminator_bits = (capacity - stream.written()).min(4);
        if terminator_bits > 0 {
            stream.write(terminator_bits, TERMINATOR).unwrap();
        }

        let mut out = Vec::with_capacity(capacity as usize / 8);
        {
            let mut writer = CodewordWriter::new(&mut out);
            stream.playback(&mut writer).unwrap();
            writer.byte_align().unwrap();
        }
        for &pad in PAD_CODEWORDS.iter().cycle() {
            if out.len() >= capacity as usize / 8 {
                break;
            }
            out.push(pad);
        }
        out
    }
}
