//! BER (Basic Encoding Rules) codec.
//!
//! SNMP uses a small, fixed subset of BER: definite lengths only, a handful
//! of universal types, a few application-tagged integers, and context-tagged
//! PDUs. Decoding walks forward through the datagram with [`Decoder`];
//! encoding builds the response back-to-front with [`EncodeBuf`], so each
//! constructed length is known exactly when its header is written and no
//! length is ever patched after the fact.

mod decode;
mod encode;
pub(crate) mod length;

pub use decode::Decoder;
pub use encode::EncodeBuf;
pub use length::MAX_LENGTH;

/// BER tag constants for the SNMP subset.
pub mod tag {
    /// Universal class tags (X.690).
    pub mod universal {
        pub const INTEGER: u8 = 0x02;
        pub const OCTET_STRING: u8 = 0x04;
        pub const NULL: u8 = 0x05;
        pub const OBJECT_IDENTIFIER: u8 = 0x06;
        pub const SEQUENCE: u8 = 0x30;
    }

    /// Application class tags (RFC 2578).
    pub mod application {
        pub const IP_ADDRESS: u8 = 0x40;
        pub const COUNTER32: u8 = 0x41;
        pub const GAUGE32: u8 = 0x42;
        pub const TIMETICKS: u8 = 0x43;
        pub const OPAQUE: u8 = 0x44;
        pub const NSAP_ADDRESS: u8 = 0x45;
        pub const COUNTER64: u8 = 0x46;
    }

    /// Context class tags for PDUs (RFC 3416).
    pub mod pdu {
        pub const GET_REQUEST: u8 = 0xA0;
        pub const GET_NEXT_REQUEST: u8 = 0xA1;
        pub const RESPONSE: u8 = 0xA2;
        pub const SET_REQUEST: u8 = 0xA3;
    }
}

/// Number of bytes a length field occupies when encoded.
pub fn length_encoded_len(len: usize) -> usize {
    if len <= 127 {
        1
    } else if len <= 0xFF {
        2
    } else {
        3
    }
}

/// Content length of a signed integer in minimal two's-complement form.
pub fn integer_content_len(value: i32) -> usize {
    if (-128..=127).contains(&value) {
        1
    } else if (-32768..=32767).contains(&value) {
        2
    } else if (-8388608..=8388607).contains(&value) {
        3
    } else {
        4
    }
}

/// Content length of an unsigned 32-bit integer.
///
/// Values with the high bit of the top content octet set get a leading
/// 0x00 pad so they are not read back as negative.
pub fn unsigned32_content_len(value: u32) -> usize {
    if value <= 0x7F {
        1
    } else if value <= 0x7FFF {
        2
    } else if value <= 0x7FFFFF {
        3
    } else if value <= 0x7FFFFFFF {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_content_len_boundaries() {
        assert_eq!(integer_content_len(0), 1);
        assert_eq!(integer_content_len(127), 1);
        assert_eq!(integer_content_len(-128), 1);
        assert_eq!(integer_content_len(128), 2);
        assert_eq!(integer_content_len(-129), 2);
        assert_eq!(integer_content_len(32767), 2);
        assert_eq!(integer_content_len(32768), 3);
        assert_eq!(integer_content_len(8388607), 3);
        assert_eq!(integer_content_len(8388608), 4);
        assert_eq!(integer_content_len(i32::MAX), 4);
        assert_eq!(integer_content_len(i32::MIN), 4);
    }

    #[test]
    fn unsigned32_content_len_pads_high_bit() {
        assert_eq!(unsigned32_content_len(0), 1);
        assert_eq!(unsigned32_content_len(0x7F), 1);
        assert_eq!(unsigned32_content_len(0x80), 2);
        assert_eq!(unsigned32_content_len(0x7FFFFFFF), 4);
        assert_eq!(unsigned32_content_len(0x80000000), 5);
        assert_eq!(unsigned32_content_len(u32::MAX), 5);
    }

    #[test]
    fn length_encoded_len_boundaries() {
        assert_eq!(length_encoded_len(0), 1);
        assert_eq!(length_encoded_len(127), 1);
        assert_eq!(length_encoded_len(128), 2);
        assert_eq!(length_encoded_len(255), 2);
        assert_eq!(length_encoded_len(256), 3);
        assert_eq!(length_encoded_len(0xFFFF), 3);
    }
}
