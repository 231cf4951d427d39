
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// Goodbye (BYE, RFC 3550 section 6.6) announces that sources are leaving
/// the session, with an optional reason.
///
/// ```text
///        0                   1                   2                   3
///        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |V=2|P|    SC   |   PT=BYE=203  |             length            |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       |                           SSRC/CSRC                           |
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///       :                              ...                              :
///       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// (opt) |     length    |               reason for leaving            ...
///       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The reason is followed by null octets up to the next 32-bit boundary,
/// so the P bit stays clear.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Goodbye {
    /// At most 31.
    pub sources: Vec<u32>,
    /// At most 255 octets; empty when absent.
    pub reason: Bytes,
}

impl fmt::Display for Goodbye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Goodbye")?;
        for source in &self.sources {
            write!(f, " {source:x}")?;
        }
        if !self.reason.is_empty() {
            write!(f, " reason={:?}", String::from_utf8_lossy(&self.reason))?;
        }
        Ok(())
    }
}

impl Packet for Goodbye {
    fn header(&self) -> Header {
        Header {
            padding: false,
            ..packet_header(
                PacketType::Goodbye,
                self.sources.len() as u8,
                self.raw_size(),
            )
        }
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.sources.clone()
    }

    fn raw_size(&self) -> usize {
        let reason_size = match self.reason.len() {
            0 => 0,
            n => 1 + n,
        };
        HEADER_LENGTH + SSRC_LENGTH * self.sources.len() + reason_size
    }
}

impl MarshalSize for Goodbye {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for Goodbye {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.sources.len() > COUNT_MAX {
            return Err(Error::TooManySources.into());
        }
        if self.reason.len() > SDES_MAX_OCTET_COUNT {
            return Err(Error::ReasonTooLong.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            for &source in &self.sources {
                buf.put_u32(source);
            }
            if !self.reason.is_empty() {
                buf.put_u8(self.reason.len() as u8);
                buf.put_slice(&self.reason);
            }
            buf.put_bytes(0, get_padding_size(self.raw_size()));
            Ok(())
        })
    }
}

impl Unmarshal for Goodbye {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (header, mut body) = unmarshal_body(raw_packet, PacketType::Goodbye, None, 0)?;
        if body.len() < SSRC_LENGTH * header.count as usize {
            return Err(Error::PacketTooShort.into());
        }

        let sources = (0..header.count).map(|_| body.get_u32()).collect();

        // anything after the sources starts with the reason length octet
        let reason = match body.first() {
            None => Bytes::new(),
            Some(&len) if usize::from(len) < body.len() => body.slice(1..1 + usize::from(len)),
            Some(_) => return Err(Error::PacketTooShort.into()),
        };

        Ok(Goodbye { sources, reason })
    }
}
