//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): Rejected
//!
//! The agent restricts long form to at most two length octets: every message
//! it handles fits a single UDP datagram, so any longer length field is
//! garbage and is rejected early with a typed error.

use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};

/// Maximum length we'll accept.
///
/// The two-octet long form tops out at 0xFFFF, well above any datagram the
/// agent will see (typical messages are hundreds of bytes).
pub const MAX_LENGTH: usize = 0xFFFF;

/// Encode a length value (returns bytes in reverse order for prepending).
///
/// Uses short form for lengths <= 127, one- or two-octet long form
/// otherwise. Lengths above [`MAX_LENGTH`] are an encode error rather than a
/// wider form; nothing the agent emits can legitimately be that large.
pub fn encode_length(len: usize) -> Result<([u8; 3], usize)> {
    let mut buf = [0u8; 3];

    if len <= 127 {
        // Short form
        buf[0] = len as u8;
        Ok((buf, 1))
    } else if len <= 0xFF {
        // Long form, 1 byte
        buf[0] = len as u8;
        buf[1] = 0x81;
        Ok((buf, 2))
    } else if len <= MAX_LENGTH {
        // Long form, 2 bytes
        buf[0] = len as u8;
        buf[1] = (len >> 8) as u8;
        buf[2] = 0x82;
        Ok((buf, 3))
    } else {
        Err(Error::encode(EncodeErrorKind::LengthTooLarge { length: len }))
    }
}

/// Decode a length from bytes, returning (length, bytes_consumed)
///
/// The `base_offset` parameter is used to report error offsets correctly
/// when this is called from within a decoder.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    if data.is_empty() {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let first = data[0];

    if first == 0x80 {
        // Indefinite length
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        // Short form
        Ok((first as usize, 1))
    } else {
        // Long form
        let num_octets = (first & 0x7F) as usize;

        if num_octets == 0 {
            return Err(Error::decode(base_offset, DecodeErrorKind::InvalidLength));
        }

        if num_octets > 2 {
            return Err(Error::decode(
                base_offset,
                DecodeErrorKind::LengthTooLong { octets: num_octets },
            ));
        }

        if data.len() < 1 + num_octets {
            return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
        }

        let mut len: usize = 0;
        for i in 0..num_octets {
            len = (len << 8) | (data[1 + i] as usize);
        }

        if len > MAX_LENGTH {
            return Err(Error::decode(
                base_offset,
                DecodeErrorKind::LengthExceedsMax {
                    length: len,
                    max: MAX_LENGTH,
                },
            ));
        }

        Ok((len, 1 + num_octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        assert_eq!(decode_length(&[0], 0).unwrap(), (0, 1));
        assert_eq!(decode_length(&[127], 0).unwrap(), (127, 1));
        assert_eq!(decode_length(&[1], 0).unwrap(), (1, 1));
    }

    #[test]
    fn test_long_form_1_byte() {
        assert_eq!(decode_length(&[0x81, 128], 0).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0x81, 255], 0).unwrap(), (255, 2));
    }

    #[test]
    fn test_long_form_2_bytes() {
        assert_eq!(decode_length(&[0x82, 0x01, 0x00], 0).unwrap(), (256, 3));
        assert_eq!(decode_length(&[0x82, 0xFF, 0xFF], 0).unwrap(), (65535, 3));
    }

    #[test]
    fn test_indefinite_rejected() {
        assert!(decode_length(&[0x80], 0).is_err());
    }

    #[test]
    fn test_three_octet_form_rejected() {
        let result = decode_length(&[0x83, 0x00, 0x00, 0x80], 0);
        match result.unwrap_err() {
            Error::Decode { kind, .. } => {
                assert_eq!(kind, DecodeErrorKind::LengthTooLong { octets: 3 });
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
        assert!(decode_length(&[0x84, 0x00, 0x00, 0x01, 0x00], 0).is_err());
    }

    #[test]
    fn test_encode_short() {
        let (buf, len) = encode_length(0).unwrap();
        assert_eq!(&buf[..len], &[0]);

        let (buf, len) = encode_length(127).unwrap();
        assert_eq!(&buf[..len], &[127]);
    }

    #[test]
    fn test_encode_long() {
        let (buf, len) = encode_length(128).unwrap();
        assert_eq!(&buf[..len], &[128, 0x81]);

        let (buf, len) = encode_length(255).unwrap();
        assert_eq!(&buf[..len], &[255, 0x81]);

        let (buf, len) = encode_length(256).unwrap();
        assert_eq!(&buf[..len], &[0, 1, 0x82]);

        let (buf, len) = encode_length(0xFFFF).unwrap();
        assert_eq!(&buf[..len], &[0xFF, 0xFF, 0x82]);
    }

    #[test]
    fn test_encode_over_max_fails() {
        assert!(encode_length(0x10000).is_err());
    }

    #[test]
    fn test_accept_oversized_length_encoding() {
        // Non-minimal length encodings are valid per X.690 Section 8.1.3.5 Note 2
        // 0x82 0x00 0x05 = length 5 using 2 bytes (minimal would be 0x05)
        let result = decode_length(&[0x82, 0x00, 0x05], 0);
        assert_eq!(result.unwrap(), (5, 3));

        // 0x81 0x01 = length 1 using long form (non-minimal, minimal would be 0x01)
        let result = decode_length(&[0x81, 0x01], 0);
        assert_eq!(result.unwrap(), (1, 2));

        // 0x82 0x00 0x7F = length 127 using 2 bytes (non-minimal, minimal would be 0x7F)
        let result = decode_length(&[0x82, 0x00, 0x7F], 0);
        assert_eq!(result.unwrap(), (127, 3));
    }

    #[test]
    fn test_max_length_boundary() {
        // 0xFFFF is the largest decodable length
        assert_eq!(decode_length(&[0x82, 0xFF, 0xFF], 0).unwrap(), (0xFFFF, 3));
    }
}
