use alloc::vec::Vec;

use bitstream_io::BitWrite;

use super::BitStream;

/// The 45 symbol character set, the table index is the encoded value.
const CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

fn value_of(ch: u8) -> Option<u32> {
    CHARSET.iter().position(|&c| c == ch).map(|i| i as u32)
}

/// Uppercase letters only, as used by mode detection.
pub(crate) fn is_valid(data: &[u8]) -> bool {
    data.iter().all(|&ch| value_of(ch).is_some())
}

/// Like [is_valid] but also accepts lowercase letters.
pub(crate) fn is_valid_folded(data: &[u8]) -> bool {
    data.iter()
        .all(|&ch| value_of(ch.to_ascii_uppercase()).is_some())
}

/// Fold lowercase letters to the uppercase character set.
pub(crate) fn fold(data: &[u8]) -> Vec<u8> {
    data.to_ascii_uppercase()
}

/// Pack character pairs as a * 45 + b into eleven bits, a trailing
/// single character into six.
pub(super) fn encode(stream: &mut BitStream, data: &[u8]) {
    for chunk in data.chunks(2) {
        match *chunk {
            [a, b] => {
                let value = value_of(a).unwrap() * 45 + value_of(b).unwrap();
                stream.write(11, value).unwrap();
            }
            [a] => stream.write(6, value_of(a).unwrap()).unwrap(),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_values() {
        assert_eq!(value_of(b'0'), Some(0));
        assert_eq!(value_of(b'9'), Some(9));
        assert_eq!(value_of(b'A'), Some(10));
        assert_eq!(value_of(b'Z'), Some(35));
        assert_eq!(value_of(b' '), Some(36));
        assert_eq!(value_of(b':'), Some(44));
        assert_eq!(value_of(b'a'), None);
        assert_eq!(value_of(b'_'), None);
    }

    #[test]
    fn pair_packing() {
        let mut stream = BitStream::new();
        encode(&mut stream, b"AC-42");
        // (10, 12) -> 462, (41, 4) -> 1849, 2 -> 6 bits
        assert_eq!(stream.written(), 11 + 11 + 6);
    }

    #[test]
    fn folding() {
        assert!(is_valid(b"HELLO WORLD"));
        assert!(!is_valid(b"Hello World"));
        assert!(is_valid_folded(b"Hello World"));
        assert!(!is_valid_folded(b"Hello, World"));
        assert_eq!(fold(b"ab-12"), b"AB-12".to_vec());
    }
}
