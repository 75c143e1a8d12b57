//! Wire format for sample timestamps.
//!
//! The on-bus payload is exactly eight bytes: the send time in
//! milliseconds since the Unix epoch, as a little-endian unsigned
//! 64-bit integer. No envelope, no versioning, no checksum.

use thiserror::Error;

/// Fixed width of the wire payload in bytes.
pub const WIRE_WIDTH: usize = 8;

/// Errors produced when reading a sample payload off the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload shorter than the fixed wire width.
    #[error("payload too short: got {len} bytes, need {WIRE_WIDTH}")]
    Truncated { len: usize },
}

/// Serializes a timestamp into the 8-byte little-endian wire format.
pub fn encode(sent_at_millis: u64) -> [u8; WIRE_WIDTH] {
    sent_at_millis.to_le_bytes()
}

/// Deserializes a timestamp from wire format.
///
/// Reads the first eight bytes of `buf`; trailing bytes are ignored.
///
/// # Errors
/// Returns [`DecodeError::Truncated`] if the buffer holds fewer than
/// eight bytes.
pub fn decode(buf: &[u8]) -> Result<u64, DecodeError> {
    if buf.len() < WIRE_WIDTH {
        return Err(DecodeError::Truncated { len: buf.len() });
    }
    Ok(u64::from_le_bytes(buf[..WIRE_WIDTH].try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_test() {
        const TEST_CASES: &[u64] = &[
            0,
            1,
            42,
            1_000,
            1_700_000_000_000, // a contemporary Unix-millis value
            u32::MAX as u64,
            (1u64 << 63) - 1,
            u64::MAX,
        ];

        for &t in TEST_CASES {
            let buf = encode(t);
            assert_eq!(decode(&buf), Ok(t), "roundtrip failed for {}", t);
        }
    }

    #[test]
    fn encode_is_fixed_width_test() {
        assert_eq!(encode(0).len(), WIRE_WIDTH);
        assert_eq!(encode(u64::MAX).len(), WIRE_WIDTH);
    }

    #[test]
    fn encode_is_little_endian_test() {
        assert_eq!(encode(1), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode(0x0102_0304_0506_0708), [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn decode_short_buffer_test() {
        for len in 0..WIRE_WIDTH {
            let buf = vec![0u8; len];
            assert_eq!(decode(&buf), Err(DecodeError::Truncated { len }));
        }
    }

    #[test]
    fn decode_ignores_trailing_bytes_test() {
        let mut buf = encode(1042).to_vec();
        buf.extend_from_slice(&[0xff; 4]);
        assert_eq!(decode(&buf), Ok(1042));
    }
}
