//! Community-based SNMP messages (v1 and v2c).
//!
//! The outer frame is `SEQUENCE { version INTEGER, community OCTET STRING,
//! pdu }`. Decoding is strict about framing so that malformed datagrams are
//! dropped before any PDU processing happens.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;

/// SNMP message version field values.
///
/// These are the literal wire integers (RFC 1157 / RFC 1901), not marketing
/// numbers: v1 is 0 and v2c is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Version {
    V1 = 0,
    V2c = 1,
}

impl Version {
    /// Create from the wire integer.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2c),
            _ => None,
        }
    }

    /// Get the wire integer.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2c => write!(f, "v2c"),
        }
    }
}

/// Community-based SNMP message: version, community string, PDU.
#[derive(Debug, Clone)]
pub struct Message {
    /// Protocol version.
    pub version: Version,
    /// Community string (opaque bytes; compared constant-time by the engine).
    pub community: Bytes,
    /// The PDU.
    pub pdu: Pdu,
}

impl Message {
    /// Create a v1 message.
    pub fn v1(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version: Version::V1,
            community: community.into(),
            pdu,
        }
    }

    /// Create a v2c message.
    pub fn v2c(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version: Version::V2c,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf)?;
            buf.push_octet_string(&self.community)?;
            buf.push_integer(self.version.as_i32())
        })
    }

    /// Decode a message from a complete datagram.
    ///
    /// Strict on the framing: the outer SEQUENCE must span the whole
    /// datagram (trailing bytes are rejected), the version integer must be a
    /// known one, the community must be non-empty and NUL-free, and the PDU
    /// must be a request type the agent answers.
    pub fn decode(decoder: &mut Decoder, max_varbinds: usize) -> Result<Self> {
        let seq_len = decoder.expect_tag(tag::universal::SEQUENCE)?;
        if seq_len != decoder.remaining() {
            let kind = DecodeErrorKind::TrailingData {
                remaining: decoder.remaining() - seq_len,
            };
            tracing::debug!(target: "microsnmp::message", { kind = %kind }, "message shorter than datagram");
            return Err(Error::decode(decoder.offset(), kind));
        }

        let raw_version = decoder.read_integer()?;
        let version = Version::from_i32(raw_version).ok_or_else(|| {
            Error::decode(
                decoder.offset(),
                DecodeErrorKind::UnknownVersion(raw_version),
            )
        })?;

        let community = decoder.read_octet_string()?;
        if community.is_empty() || community.contains(&0) {
            return Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::InvalidCommunity,
            ));
        }

        let pdu = Pdu::decode(decoder, max_varbinds)?;
        if !pdu.pdu_type.is_request() {
            return Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::UnknownPduType(pdu.pdu_type.tag()),
            ));
        }

        Ok(Message {
            version,
            community,
            pdu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::PduType;

    const NO_CAP: usize = usize::MAX;

    #[test]
    fn test_message_roundtrip() {
        let msg = Message::v2c(
            &b"public"[..],
            Pdu::get_request(42, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );

        let mut buf = EncodeBuf::new(1024);
        msg.encode(&mut buf).unwrap();
        let mut decoder = Decoder::new(buf.finish());
        let decoded = Message::decode(&mut decoder, NO_CAP).unwrap();

        assert_eq!(decoded.version, Version::V2c);
        assert_eq!(&decoded.community[..], b"public");
        assert_eq!(decoded.pdu.request_id, 42);
    }

    #[test]
    fn test_message_rejects_trailing_bytes() {
        let msg = Message::v1(&b"public"[..], Pdu::get_request(1, &[oid!(1, 3, 6, 1)]));
        let mut buf = EncodeBuf::new(1024);
        msg.encode(&mut buf).unwrap();
        let mut bytes = buf.finish().to_vec();
        bytes.push(0x00);

        let mut decoder = Decoder::from_slice(&bytes);
        let err = Message::decode(&mut decoder, NO_CAP).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::TrailingData { remaining: 1 },
                ..
            }
        ));
    }

    #[test]
    fn test_message_rejects_unknown_version() {
        // Version 3 in a community-message frame
        let mut buf = EncodeBuf::new(1024);
        buf.push_sequence(|buf| {
            Pdu::get_request(1, &[oid!(1, 3, 6, 1)]).encode(buf)?;
            buf.push_octet_string(b"public")?;
            buf.push_integer(3)
        })
        .unwrap();

        let mut decoder = Decoder::new(buf.finish());
        let err = Message::decode(&mut decoder, NO_CAP).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::UnknownVersion(3),
                ..
            }
        ));
    }

    #[test]
    fn test_message_rejects_bad_community() {
        for community in [&b""[..], &b"pub\x00lic"[..]] {
            let mut buf = EncodeBuf::new(1024);
            buf.push_sequence(|buf| {
                Pdu::get_request(1, &[oid!(1, 3, 6, 1)]).encode(buf)?;
                buf.push_octet_string(community)?;
                buf.push_integer(1)
            })
            .unwrap();

            let mut decoder = Decoder::new(buf.finish());
            let err = Message::decode(&mut decoder, NO_CAP).unwrap_err();
            assert!(matches!(
                err,
                Error::Decode {
                    kind: DecodeErrorKind::InvalidCommunity,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_message_rejects_response_pdu() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 1,
            error_status: 0,
            error_index: 0,
            varbinds: vec![],
            raw_varbinds: Bytes::new(),
        };
        let msg = Message::v2c(&b"public"[..], pdu);
        let mut buf = EncodeBuf::new(1024);
        msg.encode(&mut buf).unwrap();

        let mut decoder = Decoder::new(buf.finish());
        assert!(Message::decode(&mut decoder, NO_CAP).is_err());
    }
}
