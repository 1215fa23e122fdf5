//! SNMP value types.
//!
//! [`Value`] covers the types an SNMPv1/v2c agent traffics in. Opaque,
//! Counter64 and NSAP tags are recognized on the wire but rejected as
//! unsupported; OBJECT IDENTIFIER values decode (a manager may send one) but
//! never encode, since nothing in the MIB model produces them.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (ASN.1 primitive, signed 32-bit)
    Integer(i32),

    /// OCTET STRING (arbitrary bytes).
    ///
    /// Per RFC 2578 (SMIv2) the maximum size is 65535 octets; the BER layer's
    /// length cap enforces that bound for free.
    OctetString(Bytes),

    /// NULL. The placeholder value in every request varbind.
    Null,

    /// OBJECT IDENTIFIER. Decode-only; see [`Value::encode`].
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping)
    Gauge32(u32),

    /// TimeTicks (hundredths of a second)
    TimeTicks(u32),
}

impl Value {
    /// Try to get as i32.
    ///
    /// ```
    /// use microsnmp::Value;
    ///
    /// assert_eq!(Value::Integer(42).as_i32(), Some(42));
    /// assert_eq!(Value::Counter32(42).as_i32(), None);
    /// ```
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    ///
    /// Returns `Some` for [`Value::Counter32`], [`Value::Gauge32`],
    /// [`Value::TimeTicks`], or a non-negative [`Value::Integer`].
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// Try to get as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as string (UTF-8).
    ///
    /// ```
    /// use microsnmp::Value;
    /// use bytes::Bytes;
    ///
    /// let v = Value::OctetString(Bytes::from_static(b"Linux router1 5.4.0"));
    /// assert_eq!(v.as_str(), Some("Linux router1 5.4.0"));
    ///
    /// let v = Value::OctetString(Bytes::from_static(&[0xFF, 0xFE]));
    /// assert_eq!(v.as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as IP address.
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(bytes) => Some(std::net::Ipv4Addr::from(*bytes)),
            _ => None,
        }
    }

    /// The BER tag this value carries on the wire.
    ///
    /// SET validation compares the incoming value's tag against the stored
    /// object's tag; two values are type-compatible exactly when their wire
    /// tags match.
    pub fn ber_tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
        }
    }

    /// Returns the total BER-encoded length (tag + length + content).
    pub(crate) fn ber_encoded_len(&self) -> usize {
        use crate::ber::{integer_content_len, length_encoded_len, unsigned32_content_len};

        match self {
            Value::Integer(v) => {
                let content_len = integer_content_len(*v);
                1 + length_encoded_len(content_len) + content_len
            }
            Value::OctetString(data) => {
                let content_len = data.len();
                1 + length_encoded_len(content_len) + content_len
            }
            Value::Null => 2, // tag + length(0)
            Value::ObjectIdentifier(oid) => {
                let content_len = oid.to_ber().len();
                1 + length_encoded_len(content_len) + content_len
            }
            Value::IpAddress(_) => 6, // tag + length(4) + 4 bytes
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                let content_len = unsigned32_content_len(*v);
                1 + length_encoded_len(content_len) + content_len
            }
        }
    }

    /// Encode to BER.
    ///
    /// [`Value::ObjectIdentifier`] fails with
    /// [`EncodeErrorKind::UnsupportedValueType`]: the agent never produces
    /// OID values, so one reaching the encoder is a registry bug, and the
    /// failure must stay distinguishable from running out of buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(_) => Err(Error::encode(
                EncodeErrorKind::UnsupportedValueType {
                    tag: tag::universal::OBJECT_IDENTIFIER,
                },
            )),
            Value::IpAddress(addr) => buf.push_ip_address(addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
        }
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let value_tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match value_tag {
            tag::universal::INTEGER => {
                let value = decoder.read_integer_value(len)?;
                Ok(Value::Integer(value))
            }
            tag::universal::OCTET_STRING => {
                let data = decoder.read_bytes(len)?;
                Ok(Value::OctetString(data))
            }
            tag::universal::NULL => {
                if len != 0 {
                    return Err(Error::decode(
                        decoder.offset(),
                        DecodeErrorKind::InvalidNull,
                    ));
                }
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                let oid = decoder.read_oid_value(len)?;
                Ok(Value::ObjectIdentifier(oid))
            }
            tag::application::IP_ADDRESS => {
                let addr = decoder.read_ip_address_value(len)?;
                Ok(Value::IpAddress(addr))
            }
            tag::application::COUNTER32 => {
                let value = decoder.read_unsigned32_value(len)?;
                Ok(Value::Counter32(value))
            }
            tag::application::GAUGE32 => {
                let value = decoder.read_unsigned32_value(len)?;
                Ok(Value::Gauge32(value))
            }
            tag::application::TIMETICKS => {
                let value = decoder.read_unsigned32_value(len)?;
                Ok(Value::TimeTicks(value))
            }
            // Recognized SMI tags the agent does not handle
            tag::application::OPAQUE
            | tag::application::NSAP_ADDRESS
            | tag::application::COUNTER64 => Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::UnsupportedValueType { tag: value_tag },
            )),
            _ => Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::UnsupportedType { tag: value_tag },
            )),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => {
                // Display as string if valid UTF-8, hex otherwise
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "0x")?;
                    for byte in data.iter() {
                        write!(f, "{:02x}", byte)?;
                    }
                    Ok(())
                }
            }
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<[u8; 4]> for Value {
    fn from(addr: [u8; 4]) -> Self {
        Value::IpAddress(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) -> Value {
        let mut buf = EncodeBuf::new(512);
        value.encode(&mut buf).unwrap();
        let data = buf.finish();
        let mut decoder = Decoder::new(data);
        Value::decode(&mut decoder).unwrap()
    }

    #[test]
    fn test_integer_roundtrip() {
        for v in [0, 42, -42, 127, 128, -128, -129, 32767, 32768, i32::MIN, i32::MAX] {
            let value = Value::Integer(v);
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn test_octet_string_roundtrip() {
        for data in [
            Bytes::from_static(b"hello world"),
            Bytes::from_static(&[0x00, 0xFF, 0x80, 0x7F]),
            Bytes::new(),
        ] {
            let value = Value::OctetString(data);
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn test_null_roundtrip() {
        assert_eq!(roundtrip(Value::Null), Value::Null);
    }

    #[test]
    fn test_ip_address_roundtrip() {
        for addr in [[192, 168, 1, 1], [0, 0, 0, 0], [255, 255, 255, 255]] {
            let value = Value::IpAddress(addr);
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn test_unsigned_roundtrips() {
        for v in [0, 1, 0x7F, 0x80, 999999, 0x7FFFFFFF, 0x80000000, u32::MAX] {
            assert_eq!(roundtrip(Value::Counter32(v)), Value::Counter32(v));
            assert_eq!(roundtrip(Value::Gauge32(v)), Value::Gauge32(v));
            assert_eq!(roundtrip(Value::TimeTicks(v)), Value::TimeTicks(v));
        }
    }

    #[test]
    fn test_oid_value_decodes() {
        // A manager may legitimately send an OID value in a SET
        let data = Bytes::from_static(&[0x06, 0x03, 0x2B, 0x06, 0x01]);
        let mut decoder = Decoder::new(data);
        let value = Value::decode(&mut decoder).unwrap();
        assert_eq!(value.as_oid().unwrap().arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_oid_value_does_not_encode() {
        let value = Value::ObjectIdentifier(crate::oid!(1, 3, 6, 1));
        let mut buf = EncodeBuf::new(512);
        let err = value.encode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::UnsupportedValueType { tag: 0x06 }
            }
        ));
        // and crucially it is NOT buffer exhaustion
        assert!(!err.is_buffer_full());
    }

    #[test]
    fn test_opaque_counter64_nsap_rejected() {
        for raw in [
            &[0x44, 0x02, 0xBE, 0xEF][..],       // Opaque
            &[0x45, 0x02, 0x01, 0x02][..],       // NSAP
            &[0x46, 0x02, 0x01, 0x02][..],       // Counter64
        ] {
            let mut decoder = Decoder::from_slice(raw);
            let err = Value::decode(&mut decoder).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::Decode {
                        kind: DecodeErrorKind::UnsupportedValueType { .. },
                        ..
                    }
                ),
                "tag 0x{:02X} should be recognized-but-unsupported",
                raw[0]
            );
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut decoder = Decoder::from_slice(&[0x99, 0x01, 0x00]);
        let err = Value::decode(&mut decoder).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::UnsupportedType { tag: 0x99 },
                ..
            }
        ));
    }

    #[test]
    fn test_decode_invalid_null_length() {
        let mut decoder = Decoder::from_slice(&[0x05, 0x01, 0x00]);
        assert!(Value::decode(&mut decoder).is_err());
    }

    #[test]
    fn test_decode_invalid_ip_address_length() {
        let mut decoder = Decoder::from_slice(&[0x40, 0x03, 0x01, 0x02, 0x03]);
        assert!(Value::decode(&mut decoder).is_err());
    }

    #[test]
    fn test_ber_encoded_len_matches_encoding() {
        let values = [
            Value::Integer(0),
            Value::Integer(-129),
            Value::Integer(i32::MAX),
            Value::OctetString(Bytes::from_static(b"abc")),
            Value::Null,
            Value::IpAddress([10, 0, 0, 1]),
            Value::Counter32(u32::MAX),
            Value::Gauge32(0x80),
            Value::TimeTicks(100),
        ];
        for value in values {
            let mut buf = EncodeBuf::new(512);
            value.encode(&mut buf).unwrap();
            assert_eq!(buf.len(), value.ber_encoded_len(), "{:?}", value);
        }
    }

    #[test]
    fn test_ber_tag() {
        assert_eq!(Value::Integer(1).ber_tag(), 0x02);
        assert_eq!(Value::OctetString(Bytes::new()).ber_tag(), 0x04);
        assert_eq!(Value::Null.ber_tag(), 0x05);
        assert_eq!(Value::IpAddress([0; 4]).ber_tag(), 0x40);
        assert_eq!(Value::Counter32(0).ber_tag(), 0x41);
        assert_eq!(Value::Gauge32(0).ber_tag(), 0x42);
        assert_eq!(Value::TimeTicks(0).ber_tag(), 0x43);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Integer(42).as_i32(), Some(42));
        assert_eq!(Value::Counter32(100).as_i32(), None);
        assert_eq!(Value::Counter32(100).as_u32(), Some(100));
        assert_eq!(Value::Integer(-1).as_u32(), None);
        assert_eq!(Value::Integer(50).as_u32(), Some(50));
        assert_eq!(
            Value::OctetString(Bytes::from_static(b"test")).as_bytes(),
            Some(b"test".as_slice())
        );
        assert_eq!(
            Value::IpAddress([192, 168, 1, 1]).as_ip(),
            Some(std::net::Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-42).to_string(), "-42");
        assert_eq!(
            Value::OctetString(Bytes::from_static(b"hello")).to_string(),
            "hello"
        );
        assert_eq!(
            Value::OctetString(Bytes::from_static(&[0xFF, 0xFE])).to_string(),
            "0xfffe"
        );
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::IpAddress([192, 168, 1, 1]).to_string(), "192.168.1.1");
        // 123456 hundredths = 1234.56 seconds = 0d 0h 20m 34s
        assert_eq!(Value::TimeTicks(123456).to_string(), "0d 0h 20m 34s");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(String::from("hi")).as_str(), Some("hi"));
        assert_eq!(
            Value::from(&[1u8, 2, 3][..]).as_bytes(),
            Some(&[1u8, 2, 3][..])
        );
        assert_eq!(
            Value::from(std::net::Ipv4Addr::new(10, 0, 0, 1)),
            Value::IpAddress([10, 0, 0, 1])
        );
        assert_eq!(
            Value::from([192u8, 168, 1, 1]),
            Value::IpAddress([192, 168, 1, 1])
        );
    }
}
