use bitstream_io::BitWrite;

use super::BitStream;

pub(crate) fn is_valid(data: &[u8]) -> bool {
    data.iter().all(u8::is_ascii_digit)
}

/// Pack digit triplets into ten bits each, a final group of one or two
/// digits into four or seven bits.
pub(super) fn encode(stream: &mut BitStream, data: &[u8]) {
    for chunk in data.chunks(3) {
        let mut value: u32 = 0;
        for &digit in chunk {
            value = value * 10 + u32::from(digit - b'0');
        }
        stream.write(chunk.len() as u32 * 3 + 1, value).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of(data: &[u8]) -> (u32, alloc::vec::Vec<u8>) {
        use bitstream_io::{BigEndian, BitWriter};

        let mut stream = BitStream::new();
        encode(&mut stream, data);
        let written = stream.written();
        let mut out = alloc::vec::Vec::new();
        {
            let mut writer = BitWriter::<_, BigEndian>::new(&mut out);
            stream.playback(&mut writer).unwrap();
            writer.byte_align().unwrap();
        }
        (written, out)
    }

    #[test]
    fn triplet_grouping() {
        // 012 345 67 -> 10 + 10 + 7 bits
        let (written, out) = bits_of(b"01234567");
        assert_eq!(written, 27);
        assert_eq!(out, vec![0b0000_0011, 0b0001_0101_u8, 0b1001_1000, 0b0110_0000]);
    }

    #[test]
    fn single_trailing_digit() {
        let (written, _) = bits_of(b"0123");
        assert_eq!(written, 14);
    }

    #[test]
    fn digit_check() {
        assert!(is_valid(b""));
        assert!(is_valid(b"0123456789"));
        assert!(!is_valid(b"12 34"));
        assert!(!is_valid(b"12a"));
    }
}
