use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;

type Result<T> = std::result::Result<T, util::Error>;

/// A packet whose type, or feedback format, has no decoder here.
///
/// It holds the packet exactly as received, header included, and marshals
/// back to the same bytes. The header is parsed once by
/// [`RawPacket::unmarshal`], so a `RawPacket` always carries a valid one.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawPacket {
    header: Header,
    bytes: Bytes,
}

impl RawPacket {
    /// The whole packet, header included.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl fmt::Display for RawPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawPacket {} count={} ({} bytes)",
            self.header.packet_type,
            self.header.count,
            self.bytes.len()
        )
    }
}

impl Packet for RawPacket {
    fn header(&self) -> Header {
        self.header.clone()
    }

    /// Unknown packets name no destinations.
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![]
    }

    fn raw_size(&self) -> usize {
        self.bytes.len()
    }
}

impl MarshalSize for RawPacket {
    fn marshal_size(&self) -> usize {
        self.bytes.len()
    }
}

impl Marshal for RawPacket {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < self.bytes.len() {
            return Err(Error::BufferTooShort.into());
        }
        buf.put_slice(&self.bytes);
        Ok(self.bytes.len())
    }
}

impl Unmarshal for RawPacket {
    /// Takes one header and the body its length field declares. Padding is
    /// left in place.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let head = raw_packet.copy_to_bytes(HEADER_LENGTH);
        let header = Header::unmarshal(&mut head.clone())?;

        let body_length = header.packet_size() - HEADER_LENGTH;
        if raw_packet.remaining() < body_length {
            return Err(Error::PacketTooShort.into());
        }

        let mut bytes = BytesMut::with_capacity(header.packet_size());
        bytes.put(head);
        bytes.put(raw_packet.copy_to_bytes(body_length));

        Ok(RawPacket {
            header,
            bytes: bytes.freeze(),
        })
    }
}
