//! BER encoding.
//!
//! [`EncodeBuf`] builds a message tail-first: the cursor starts at the end of
//! a fixed-capacity buffer and every push moves it toward zero. Encoding a
//! constructed type therefore costs nothing extra; by the time its header is
//! written the content is already in place and its length is exact.
//!
//! The buffer never grows. Running out of room is an ordinary, typed
//! condition ([`EncodeErrorKind::BufferFull`]) that the protocol engine maps
//! to a `tooBig` response.

use super::length::encode_length;
use super::tag;
use crate::error::{EncodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// Reverse-order BER encoder over a fixed-capacity buffer.
///
/// # Example
///
/// ```
/// use microsnmp::ber::EncodeBuf;
///
/// let mut buf = EncodeBuf::new(64);
/// buf.push_sequence(|buf| {
///     buf.push_integer(2)?;
///     buf.push_integer(1)
/// })
/// .unwrap();
/// assert_eq!(&buf.finish()[..], &[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
/// ```
pub struct EncodeBuf {
    buf: Vec<u8>,
    cursor: usize,
}

impl EncodeBuf {
    /// Create an encoder with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            cursor: capacity,
        }
    }

    /// Number of bytes emitted so far.
    pub fn len(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// True when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.cursor == self.buf.len()
    }

    /// Total capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The encoded bytes emitted so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    /// Prepend a single byte.
    pub fn push_byte(&mut self, byte: u8) -> Result<()> {
        if self.cursor == 0 {
            return Err(Error::encode(EncodeErrorKind::BufferFull));
        }
        self.cursor -= 1;
        self.buf[self.cursor] = byte;
        Ok(())
    }

    /// Prepend a slice verbatim.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.cursor {
            return Err(Error::encode(EncodeErrorKind::BufferFull));
        }
        self.cursor -= bytes.len();
        self.buf[self.cursor..self.cursor + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Prepend pre-encoded TLV bytes verbatim.
    pub fn push_raw(&mut self, tlv: &[u8]) -> Result<()> {
        self.push_bytes(tlv)
    }

    /// Prepend a tag byte.
    pub fn push_tag(&mut self, tag: u8) -> Result<()> {
        self.push_byte(tag)
    }

    /// Prepend an encoded length field.
    pub fn push_length(&mut self, len: usize) -> Result<()> {
        let (bytes, count) = encode_length(len)?;
        // encode_length returns bytes reversed; pushing them in order lands
        // them in wire order.
        for &byte in bytes.iter().take(count) {
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Prepend an INTEGER TLV in minimal two's-complement form.
    pub fn push_integer(&mut self, value: i32) -> Result<()> {
        let content_len = super::integer_content_len(value);
        for shift in 0..content_len {
            self.push_byte((value >> (8 * shift)) as u8)?;
        }
        self.push_length(content_len)?;
        self.push_tag(tag::universal::INTEGER)
    }

    /// Prepend an application-tagged unsigned 32-bit integer TLV.
    ///
    /// A leading 0x00 pad is added when the top content octet would have its
    /// high bit set.
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) -> Result<()> {
        let content_len = super::unsigned32_content_len(value);
        let wide = value as u64;
        for shift in 0..content_len {
            self.push_byte((wide >> (8 * shift)) as u8)?;
        }
        self.push_length(content_len)?;
        self.push_tag(tag)
    }

    /// Prepend an OCTET STRING TLV.
    pub fn push_octet_string(&mut self, bytes: &[u8]) -> Result<()> {
        self.push_bytes(bytes)?;
        self.push_length(bytes.len())?;
        self.push_tag(tag::universal::OCTET_STRING)
    }

    /// Prepend a NULL TLV.
    pub fn push_null(&mut self) -> Result<()> {
        self.push_length(0)?;
        self.push_tag(tag::universal::NULL)
    }

    /// Prepend an OBJECT IDENTIFIER TLV.
    pub fn push_oid(&mut self, oid: &Oid) -> Result<()> {
        let ber = oid.to_ber_checked()?;
        self.push_bytes(&ber)?;
        self.push_length(ber.len())?;
        self.push_tag(tag::universal::OBJECT_IDENTIFIER)
    }

    /// Prepend an IpAddress TLV.
    pub fn push_ip_address(&mut self, addr: &[u8; 4]) -> Result<()> {
        self.push_bytes(addr)?;
        self.push_length(4)?;
        self.push_tag(tag::application::IP_ADDRESS)
    }

    /// Prepend a SEQUENCE wrapping whatever the closure emits.
    ///
    /// The closure pushes the sequence content (in reverse field order, like
    /// everything else here); the header is prepended afterwards with the
    /// measured content length.
    pub fn push_sequence<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_constructed(tag::universal::SEQUENCE, f)
    }

    /// Prepend a constructed TLV with the given tag.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let before = self.len();
        f(self)?;
        let content_len = self.len() - before;
        self.push_length(content_len)?;
        self.push_tag(tag)
    }

    /// Compact the encoding to the front of the buffer and return it.
    pub fn finish(mut self) -> Bytes {
        let len = self.len();
        self.buf.copy_within(self.cursor.., 0);
        self.buf.truncate(len);
        Bytes::from(self.buf)
    }
}
