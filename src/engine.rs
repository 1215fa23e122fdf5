//! Protocol engine: one datagram in, at most one datagram out.
//!
//! The engine is transport-agnostic. `handle` runs the whole pipeline for a
//! single request (decode, authenticate, dispatch against the MIB, encode)
//! and never suspends; callers own the socket and the concurrency story.

use bytes::Bytes;
use subtle::ConstantTimeEq;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{Error, ErrorStatus, Result};
use crate::message::{Message, Version};
use crate::mib::MibRegistry;
use crate::pdu::{Pdu, PduType};
use crate::varbind::VarBind;

/// Default response size cap: an Ethernet-sized UDP payload.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1472;

/// Default cap on varbinds per request PDU.
pub const DEFAULT_MAX_VARBINDS: usize = 32;

/// Community-authenticated request processor.
///
/// ```
/// use microsnmp::{Engine, MibObject, MibRegistry, Value, oid};
///
/// let mut mib = MibRegistry::new();
/// mib.register(MibObject::scalar(
///     oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
///     Value::from("host1"),
/// ));
/// let engine = Engine::new(&b"public"[..]);
/// // engine.handle(&datagram, &mut mib)? inside the receive loop
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    community: Bytes,
    max_message_size: usize,
    max_varbinds: usize,
}

impl Engine {
    pub fn new(community: impl Into<Bytes>) -> Self {
        Self {
            community: community.into(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_varbinds: DEFAULT_MAX_VARBINDS,
        }
    }

    /// Cap the encoded response size (and the tooBig fallback threshold).
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Cap the number of varbinds accepted per request.
    pub fn max_varbinds(mut self, count: usize) -> Self {
        self.max_varbinds = count;
        self
    }

    /// Process one request datagram.
    ///
    /// Returns `Ok(Some(bytes))` with the encoded response, `Ok(None)` when
    /// the datagram is dropped without reply (malformed, or the response
    /// cannot fit even as tooBig), and `Err` on hard failures: a SET that
    /// failed after writes began, or a registry serving a value the encoder
    /// cannot emit.
    pub fn handle(&self, datagram: &[u8], mib: &mut MibRegistry) -> Result<Option<Bytes>> {
        let mut decoder = Decoder::from_slice(datagram);
        let message = match Message::decode(&mut decoder, self.max_varbinds) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(
                    target: "microsnmp::engine",
                    { error = %err, len = datagram.len() },
                    "dropping malformed datagram"
                );
                return Ok(None);
            }
        };

        let request = &message.pdu;
        tracing::debug!(
            target: "microsnmp::engine",
            { pdu = %request.pdu_type, request_id = request.request_id, varbinds = request.varbinds.len() },
            "handling request"
        );

        let authorized: bool = message
            .community
            .as_ref()
            .ct_eq(self.community.as_ref())
            .into();

        let response = if !authorized {
            // Respond rather than drop so the manager sees the refusal,
            // but leak nothing about which byte differed
            let status = match message.version {
                Version::V1 => ErrorStatus::GenErr,
                Version::V2c => ErrorStatus::NoAccess,
            };
            tracing::debug!(
                target: "microsnmp::engine",
                { status = %status },
                "community mismatch"
            );
            error_response(request, status, 0)
        } else {
            match request.pdu_type {
                PduType::GetRequest => get_response(request, mib),
                PduType::GetNextRequest => get_next_response(request, mib),
                PduType::SetRequest => set_response(request, mib)?,
                // Message::decode only admits request PDUs
                PduType::Response => return Ok(None),
            }
        };

        self.encode_response(&message, &response)
    }

    /// Encode the response, falling back to tooBig once if it overflows.
    fn encode_response(&self, message: &Message, response: &Pdu) -> Result<Option<Bytes>> {
        let reply = Message {
            version: message.version,
            community: message.community.clone(),
            pdu: response.clone(),
        };

        let mut buf = EncodeBuf::new(self.max_message_size);
        match reply.encode(&mut buf) {
            Ok(()) => return Ok(Some(buf.finish())),
            Err(err) if err.is_buffer_full() => {}
            Err(err) => return Err(err),
        }

        tracing::debug!(
            target: "microsnmp::engine",
            { request_id = response.request_id, cap = self.max_message_size },
            "response overflows buffer; retrying as tooBig"
        );

        // tooBig echoes the request's varbind-list bytes verbatim; the
        // values we resolved are what made the response too large
        let mut buf = EncodeBuf::new(self.max_message_size);
        let result = buf.push_sequence(|buf| {
            buf.push_constructed(PduType::Response.tag(), |buf| {
                buf.push_raw(&message.pdu.raw_varbinds)?;
                buf.push_integer(0)?;
                buf.push_integer(ErrorStatus::TooBig.as_i32())?;
                buf.push_integer(response.request_id)
            })?;
            buf.push_octet_string(&message.community)?;
            buf.push_integer(message.version.as_i32())
        });

        match result {
            Ok(()) => Ok(Some(buf.finish())),
            Err(err) if err.is_buffer_full() => {
                tracing::debug!(
                    target: "microsnmp::engine",
                    { request_id = response.request_id },
                    "tooBig response overflows too; dropping"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Error responses echo the request OIDs with NULL values. GETNEXT rewrites
/// OIDs during dispatch, so they are rebuilt from the request, not from
/// whatever dispatch produced.
fn error_response(request: &Pdu, status: ErrorStatus, index: i32) -> Pdu {
    let varbinds = request
        .varbinds
        .iter()
        .map(|vb| VarBind::null(vb.oid.clone()))
        .collect();
    let mut response = request.to_response(varbinds);
    response.error_status = status.as_i32();
    response.error_index = index;
    response.raw_varbinds = request.raw_varbinds.clone();
    response
}

fn get_response(request: &Pdu, mib: &mut MibRegistry) -> Pdu {
    let mut varbinds = request.varbinds.clone();
    for (i, vb) in varbinds.iter_mut().enumerate() {
        if !mib.get(vb) {
            return error_response(request, ErrorStatus::NoSuchName, (i + 1) as i32);
        }
    }
    request.to_response(varbinds)
}

fn get_next_response(request: &Pdu, mib: &mut MibRegistry) -> Pdu {
    let mut varbinds = request.varbinds.clone();
    for (i, vb) in varbinds.iter_mut().enumerate() {
        if !mib.get_next(vb) {
            return error_response(request, ErrorStatus::NoSuchName, (i + 1) as i32);
        }
    }
    request.to_response(varbinds)
}

/// Two-phase SET. Phase one validates every varbind without writing, so any
/// phase-one failure leaves the MIB untouched. A phase-two failure is a hard
/// error: earlier varbinds may already be written and there is no rollback,
/// so it surfaces as `Err` rather than a normal error response.
fn set_response(request: &Pdu, mib: &mut MibRegistry) -> Result<Pdu> {
    for (i, vb) in request.varbinds.iter().enumerate() {
        match mib.probe(vb) {
            None => return Ok(error_response(request, ErrorStatus::NoSuchName, (i + 1) as i32)),
            Some(tag) if tag != vb.value.ber_tag() => {
                return Ok(error_response(request, ErrorStatus::BadValue, (i + 1) as i32));
            }
            Some(_) => {}
        }
    }

    for (i, vb) in request.varbinds.iter().enumerate() {
        if !mib.set(vb) {
            let index = (i + 1) as u32;
            tracing::error!(
                target: "microsnmp::engine",
                { request_id = request.request_id, index },
                "SET failed after writes began; MIB may be partially updated"
            );
            return Err(Error::SetFailed { index });
        }
    }

    Ok(request.to_response(request.varbinds.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mib::MibObject;
    use crate::oid;
    use crate::value::Value;

    fn test_mib() -> MibRegistry {
        let mut mib = MibRegistry::new();
        mib.register(MibObject::scalar(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("test agent"),
        ));
        mib.register(MibObject::scalar(
            oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
            Value::from("host1"),
        ));
        mib
    }

    fn encode_request(msg: &Message) -> Bytes {
        let mut buf = EncodeBuf::new(4096);
        msg.encode(&mut buf).unwrap();
        buf.finish()
    }

    fn decode_response(bytes: &Bytes) -> Message {
        let mut decoder = Decoder::new(bytes.clone());
        let seq_len = decoder
            .expect_tag(crate::ber::tag::universal::SEQUENCE)
            .unwrap();
        assert_eq!(seq_len, decoder.remaining());
        let version = Version::from_i32(decoder.read_integer().unwrap()).unwrap();
        let community = decoder.read_octet_string().unwrap();
        let pdu = Pdu::decode(&mut decoder, usize::MAX).unwrap();
        Message {
            version,
            community,
            pdu,
        }
    }

    #[test]
    fn test_get_roundtrip() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_request(7, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        let datagram = encode_request(&request);

        let reply = engine.handle(&datagram, &mut mib).unwrap().unwrap();
        let response = decode_response(&reply);

        assert_eq!(response.pdu.pdu_type, PduType::Response);
        assert_eq!(response.pdu.request_id, 7);
        assert_eq!(response.pdu.error_status, 0);
        assert_eq!(response.pdu.varbinds[0].value.as_str(), Some("test agent"));
    }

    #[test]
    fn test_malformed_datagram_dropped() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        assert!(engine.handle(&[], &mut mib).unwrap().is_none());
        assert!(engine.handle(&[0x30], &mut mib).unwrap().is_none());
        assert!(engine.handle(&[0xFF, 0x03, 0x01, 0x02, 0x03], &mut mib).unwrap().is_none());
    }

    #[test]
    fn test_bad_community_v2c_no_access() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"private"[..],
            Pdu::get_request(3, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);

        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::NoAccess);
        assert_eq!(response.pdu.error_index, 0);
        assert_eq!(response.pdu.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        assert_eq!(response.pdu.varbinds[0].value, Value::Null);
    }

    #[test]
    fn test_bad_community_v1_gen_err() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v1(
            &b"private"[..],
            Pdu::get_request(3, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);

        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::GenErr);
        assert_eq!(response.pdu.error_index, 0);
    }

    #[test]
    fn test_get_missing_oid_no_such_name() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_request(
                9,
                &[
                    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                    oid!(1, 3, 6, 1, 9, 9, 9, 0),
                ],
            ),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);

        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::NoSuchName);
        assert_eq!(response.pdu.error_index, 2);
        // Error shaping: request OIDs back with NULL values
        assert_eq!(response.pdu.varbinds.len(), 2);
        assert_eq!(response.pdu.varbinds[0].value, Value::Null);
    }

    #[test]
    fn test_get_next_walk_and_termination() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_next_request(1, &[oid!(1, 3, 6, 1, 2, 1, 1)]),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);
        assert_eq!(response.pdu.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));

        // Walking past the last object ends with noSuchName
        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_next_request(2, &[oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)]),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);
        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::NoSuchName);
        assert_eq!(response.pdu.error_index, 1);
        // The request OID comes back unmodified despite dispatch rewriting
        assert_eq!(response.pdu.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
    }

    #[test]
    fn test_set_applies_value() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"public"[..],
            Pdu::set_request(
                5,
                vec![VarBind::new(
                    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
                    Value::from("host2"),
                )],
            ),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);
        assert_eq!(response.pdu.error_status, 0);
        assert_eq!(response.pdu.varbinds[0].value.as_str(), Some("host2"));

        let mut check = VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
        assert!(mib.get(&mut check));
        assert_eq!(check.value.as_str(), Some("host2"));
    }

    #[test]
    fn test_set_type_mismatch_is_atomic() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        // First varbind is valid, second has the wrong type; nothing may
        // be written
        let request = Message::v2c(
            &b"public"[..],
            Pdu::set_request(
                6,
                vec![
                    VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("host2")),
                    VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::Integer(1)),
                ],
            ),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);
        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::BadValue);
        assert_eq!(response.pdu.error_index, 2);

        let mut check = VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
        assert!(mib.get(&mut check));
        assert_eq!(check.value.as_str(), Some("host1"));
    }

    #[test]
    fn test_set_plain_scalar_succeeds() {
        // No setter callback registered: the stored value is replaced
        let engine = Engine::new(&b"public"[..]);
        let mut mib = test_mib();

        let request = Message::v2c(
            &b"public"[..],
            Pdu::set_request(
                8,
                vec![VarBind::new(
                    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                    Value::from("replaced"),
                )],
            ),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        let response = decode_response(&reply);
        assert_eq!(response.pdu.error_status, 0);

        let mut check = VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        assert!(mib.get(&mut check));
        assert_eq!(check.value.as_str(), Some("replaced"));
    }

    #[test]
    fn test_set_phase_two_failure_is_hard_error() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = MibRegistry::new();
        mib.register(
            MibObject::scalar(oid!(1, 3, 6, 1, 4, 1, 1, 0), Value::Integer(0))
                .with_set(Box::new(|_, _| false)),
        );

        let request = Message::v2c(
            &b"public"[..],
            Pdu::set_request(
                4,
                vec![VarBind::new(oid!(1, 3, 6, 1, 4, 1, 1, 0), Value::Integer(1))],
            ),
        );
        let err = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap_err();
        assert!(matches!(err, Error::SetFailed { index: 1 }));
    }

    #[test]
    fn test_too_big_echoes_request_varbinds() {
        // 64-byte cap: the sysDescr value cannot fit, the echo can
        let engine = Engine::new(&b"public"[..]).max_message_size(64);
        let mut mib = MibRegistry::new();
        mib.register(MibObject::scalar(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("a very long system description that will not fit in the reply"),
        ));

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_request(11, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        let reply = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap()
            .unwrap();
        assert!(reply.len() <= 64);

        let response = decode_response(&reply);
        assert_eq!(response.pdu.error_status_enum(), ErrorStatus::TooBig);
        assert_eq!(response.pdu.error_index, 0);
        assert_eq!(response.pdu.varbinds, request.pdu.varbinds);
    }

    #[test]
    fn test_too_big_fallback_overflow_drops() {
        // Too small even for the echo
        let engine = Engine::new(&b"public"[..]).max_message_size(16);
        let mut mib = MibRegistry::new();
        mib.register(MibObject::scalar(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("a very long system description that will not fit in the reply"),
        ));

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_request(12, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]),
        );
        // The request itself encodes larger than 16 bytes, so encode it at
        // full size and only cap the response path
        let datagram = encode_request(&request);
        assert!(engine.handle(&datagram, &mut mib).unwrap().is_none());
    }

    #[test]
    fn test_varbind_cap_drops_request() {
        let engine = Engine::new(&b"public"[..]).max_varbinds(2);
        let mut mib = test_mib();

        let oids = vec![oid!(1, 3, 6, 1, 2, 1, 1, 1, 0); 3];
        let request = Message::v2c(&b"public"[..], Pdu::get_request(13, &oids));
        let datagram = encode_request(&request);
        assert!(engine.handle(&datagram, &mut mib).unwrap().is_none());
    }

    #[test]
    fn test_oid_valued_response_is_hard_error() {
        let engine = Engine::new(&b"public"[..]);
        let mut mib = MibRegistry::new();
        mib.register(MibObject::scalar(
            oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 8072)),
        ));

        let request = Message::v2c(
            &b"public"[..],
            Pdu::get_request(14, &[oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)]),
        );
        let err = engine
            .handle(&encode_request(&request), &mut mib)
            .unwrap_err();
        assert!(!err.is_buffer_full());
        assert!(matches!(err, Error::Encode { .. }));
    }
}
