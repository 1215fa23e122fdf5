//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. Lists of them are the payload of
//! every PDU.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (the request placeholder form).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_sequence(|buf| {
            self.value.encode(buf)?;
            buf.push_oid(&self.oid)
        })
    }

    /// Returns the exact encoded size of this VarBind in bytes.
    ///
    /// Computed arithmetically without encoding anything.
    pub fn encoded_size(&self) -> usize {
        use crate::ber::length_encoded_len;

        // VarBind is SEQUENCE { oid, value }
        let oid_content = self.oid.to_ber().len();
        let oid_len = 1 + length_encoded_len(oid_content) + oid_content;
        let value_len = self.value.ber_encoded_len();
        let content_len = oid_len + value_len;

        1 + length_encoded_len(content_len) + content_len
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encodes a list of VarBinds as a SEQUENCE of VarBind SEQUENCEs.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) -> Result<()> {
    buf.push_sequence(|buf| {
        // Encode in reverse order since we're using a reverse buffer
        for vb in varbinds.iter().rev() {
            vb.encode(buf)?;
        }
        Ok(())
    })
}

/// Decodes a BER-encoded VarBind list, bounded by `max_varbinds`.
///
/// The cap keeps a hostile datagram from making the agent build an
/// arbitrarily large vector before any of it is validated.
pub fn decode_varbind_list(decoder: &mut Decoder, max_varbinds: usize) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;

    // Typical VarBind is 20-50 bytes; 16 is a conservative divisor
    let estimated_capacity = (seq.remaining() / 16).max(1).min(max_varbinds);
    let mut varbinds = Vec::with_capacity(estimated_capacity);

    while !seq.is_empty() {
        if varbinds.len() >= max_varbinds {
            return Err(Error::decode(
                seq.offset(),
                DecodeErrorKind::TooManyVarBinds {
                    count: varbinds.len() + 1,
                    max: max_varbinds,
                },
            ));
        }
        varbinds.push(VarBind::decode(&mut seq)?);
    }

    Ok(varbinds)
}
