use bitstream_io::BitWrite;

use super::BitStream;

/// Every byte goes into the stream as is.
pub(super) fn encode(stream: &mut BitStream, data: &[u8]) {
    for &byte in data {
        stream.write(8, byte).unwrap();
    }
}

#[test]
fn bytes_are_verbatim() {
    let mut stream = BitStream::new();
    encode(&mut stream, &[0x00, 0xFF, 0xA5]);
    assert_eq!(stream.written(), 24);
}
