use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// sender_ssrc and media_ssrc
const PLI_BODY_LENGTH: usize = 2 * SSRC_LENGTH;

/// PictureLossIndication (RFC 4585 section 6.3.1) tells the media sender
/// that the receiver lost an unknown amount of coded picture data. The
/// usual answer is a key frame.
///
/// The message has no FCI, so its length field is always 2.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct PictureLossIndication {
    pub sender_ssrc: u32,
    /// Stream the loss happened on.
    pub media_ssrc: u32,
}

impl fmt::Display for PictureLossIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PictureLossIndication from {:x} for {:x}",
            self.sender_ssrc, self.media_ssrc
        )
    }
}

impl Packet for PictureLossIndication {
    fn header(&self) -> Header {
        packet_header(
            PacketType::PayloadSpecificFeedback,
            FORMAT_PLI,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + PLI_BODY_LENGTH
    }
}

impl MarshalSize for PictureLossIndication {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for PictureLossIndication {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(self.media_ssrc);
            Ok(())
        })
    }
}

impl Unmarshal for PictureLossIndication {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) = unmarshal_body(
            raw_packet,
            PacketType::PayloadSpecificFeedback,
            Some(FORMAT_PLI),
            PLI_BODY_LENGTH,
        )?;

        Ok(PictureLossIndication {
            sender_ssrc: body.get_u32(),
            media_ssrc: body.get_u32(),
        })
    }
}
