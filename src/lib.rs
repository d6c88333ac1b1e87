//! QR Code symbol encoder.
//!
//! This crate turns a payload into the module matrix of a QR Code
//! symbol: mode detection and bit packing, Reed-Solomon error correction
//! with block interleaving, function pattern placement, and penalty
//! driven mask selection, for versions 1 to 40 and all four error
//! correction levels.
//!
//! The result is an abstract [Bitmap]. Rendering it to a concrete image
//! format is a job for other crates; [Bitmap::pixels] and
//! [Bitmap::unicode] cover the common needs.
//!
//! ```
//! use qrmatrix::{EcLevel, QrEncoder};
//!
//! let bitmap = QrEncoder::new()
//!     .ec_level(EcLevel::Q)
//!     .encode("HELLO WORLD")?;
//! assert_eq!(bitmap.width(), 21);
//! print!("{}", bitmap.unicode());
//! # Ok::<(), qrmatrix::EncodingError>(())
//! ```
//!
//! Version, mode and mask are all chosen automatically by default. Each
//! can be pinned through the [QrEncoder] options; bad combinations are
//! reported as an [EncodingError] before any matrix work starts.
//!
//! Kanji mode, Micro QR, ECI and structured append are not supported.
extern crate alloc;

mod encodation;
pub mod errorcode;
mod masking;
mod placement;
mod version;


use alloc::borrow::Cow;
use alloc::string::String;
use std::fmt;

pub use flagset::FlagSet;

pub use encodation::Mode;
pub use masking::Mask;
pub use placement::Bitmap;
pub use version::{EcLevel, Version};

use encodation::DataEncoder;
use placement::MatrixMap;

/// Error when resolving the encoding options or fitting the payload.
///
/// All validation happens up front; once encoding proper starts it
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The requested mode is not one of numeric, alphanumeric or octet.
    InvalidMode(String),
    /// The requested level is not one of L, M, Q or H.
    InvalidEcLevel(String),
    /// The requested version is outside `1..=40`.
    InvalidVersion(u8),
    /// The requested mask is outside `0..=7`.
    InvalidMask(u8),
    /// No allowed version can hold the payload.
    DataTooLong,
    /// The payload contains characters the chosen mode cannot encode.
    ModeMismatch,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidMode(mode) => write!(f, "invalid or unsupported mode \"{}\"", mode),
            Self::InvalidEcLevel(level) => {
                write!(f, "invalid error correction level \"{}\"", level)
            }
            Self::InvalidVersion(version) => {
                write!(f, "version {} is outside 1..=40", version)
            }
            Self::InvalidMask(mask) => write!(f, "mask {} is outside 0..=7", mask),
            Self::DataTooLong => write!(f, "too much data for the chosen version and level"),
            Self::ModeMismatch => write!(f, "data not allowed in the chosen mode"),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Encoding options and entry point.
///
/// The defaults are level L with version, mode and mask chosen
/// automatically, matching what most generators do.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    level: EcLevel,
    version: Option<Version>,
    mode: Option<Mode>,
    mask: Option<Mask>,
    modes: FlagSet<Mode>,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self {
            level: EcLevel::default(),
            version: None,
            mode: None,
            mask: None,
            modes: Mode::all(),
        }
    }

    /// Set the error correction level (default L).
    pub fn ec_level(mut self, level: EcLevel) -> Self {
        self.level = level;
        self
    }

    /// Pin the symbol version instead of using the smallest that fits.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Pin the payload mode instead of detecting it.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Pin the mask pattern instead of picking the cheapest.
    pub fn mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Restrict the modes considered by auto detection.
    pub fn enabled_modes(mut self, modes: impl Into<FlagSet<Mode>>) -> Self {
        self.modes = modes.into();
        self
    }

    /// Encode text.
    ///
    /// Without a pinned mode the densest mode whose character set covers
    /// the text is detected; text that is neither numeric nor uppercase
    /// alphanumeric is UTF-8 encoded in octet mode.
    pub fn encode(&self, text: &str) -> Result<Bitmap, EncodingError> {
        let data = text.as_bytes();
        let mode = match self.mode {
            Some(mode) => mode,
            None => Mode::detect(data, self.modes)?,
        };
        self.encode_with_mode(mode, data)
    }

    /// Encode raw bytes. Without a pinned mode this is always octet.
    pub fn encode_bytes(&self, data: &[u8]) -> Result<Bitmap, EncodingError> {
        let mode = self.mode.unwrap_or(Mode::Byte);
        self.encode_with_mode(mode, data)
    }

    fn encode_with_mode(&self, mode: Mode, payload: &[u8]) -> Result<Bitmap, EncodingError> {
        mode.validate(payload)?;
        // the character set is defined on uppercase letters only
        let payload: Cow<[u8]> = if mode == Mode::Alphanumeric {
            Cow::Owned(encodation::alphanumeric::fold(payload))
        } else {
            Cow::Borrowed(payload)
        };

        let version = match self.version {
            Some(version) => {
                if payload.len() > version.max_payload_len(self.level, mode) {
                    return Err(EncodingError::DataTooLong);
                }
                version
            }
            None => Version::smallest_fitting(payload.len(), self.level, mode)
                .ok_or(EncodingError::DataTooLong)?,
        };

        let data = DataEncoder::new(&payload, mode, version, self.level).codewords();
        let stream = errorcode::interleaved_codewords(&data, version, self.level);

        let mut map = MatrixMap::new(version);
        map.place_codewords(&stream);
        let mask = match self.mask {
            Some(mask) => mask,
            None => masking::select(&mut map, self.level),
        };
        masking::apply(&mut map, mask);
        masking::write_format_info(&mut map, self.level, mask);
        Ok(map.into_bitmap())
    }
}

/// Encode text with the default options.
pub fn encode(text: &str) -> Result<Bitmap, EncodingError> {
    QrEncoder::new().encode(text)
}

/// Encode raw bytes with the default options.
pub fn encode_bytes(data: &[u8]) -> Result<Bitmap, EncodingError> {
    QrEncoder::new().encode_bytes(data)
}
