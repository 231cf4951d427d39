#[cfg(test)]
mod full_intra_request_test;

use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// sender_ssrc and media_ssrc
const FIR_FIXED_LENGTH: usize = 2 * SSRC_LENGTH;
/// ssrc, seq nr and three reserved octets
const FIR_ENTRY_LENGTH: usize = 8;

/// One FCI entry of a [`FullIntraRequest`]: the stream that should send a
/// decoder refresh point and the command sequence number for it.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FirEntry {
    pub ssrc: u32,
    pub sequence_number: u8,
}

/// FullIntraRequest (RFC 5104 section 4.3.1, FMT=4) asks each listed
/// stream for a decoder refresh point. Loss repair should use
/// PictureLossIndication instead.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              SSRC                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Seq nr.       |    Reserved = 0                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct FullIntraRequest {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub fir: Vec<FirEntry>,
}

impl fmt::Display for FullIntraRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FullIntraRequest from {:x} for {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for e in &self.fir {
            write!(f, " [ssrc={:x} seq={}]", e.ssrc, e.sequence_number)?;
        }
        Ok(())
    }
}

impl Packet for FullIntraRequest {
    fn header(&self) -> Header {
        packet_header(
            PacketType::PayloadSpecificFeedback,
            FORMAT_FIR,
            self.raw_size(),
        )
    }

    /// Every stream named by an FCI entry; the media ssrc field is unused.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.fir.iter().map(|entry| entry.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + FIR_FIXED_LENGTH + FIR_ENTRY_LENGTH * self.fir.len()
    }
}

impl MarshalSize for FullIntraRequest {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for FullIntraRequest {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.marshal_size() / 4 - 1 > u16::MAX as usize {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(self.media_ssrc);
            for entry in &self.fir {
                buf.put_u32(entry.ssrc);
                buf.put_u8(entry.sequence_number);
                buf.put_bytes(0, 3);
            }
            Ok(())
        })
    }
}

impl Unmarshal for FullIntraRequest {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) = unmarshal_body(
            raw_packet,
            PacketType::PayloadSpecificFeedback,
            Some(FORMAT_FIR),
            FIR_FIXED_LENGTH,
        )?;
        if (body.len() - FIR_FIXED_LENGTH) % FIR_ENTRY_LENGTH != 0 {
            return Err(Error::PacketTooShort.into());
        }

        let sender_ssrc = body.get_u32();
        let media_ssrc = body.get_u32();
        let fir = body
            .chunks_exact(FIR_ENTRY_LENGTH)
            .map(|mut entry| FirEntry {
                ssrc: entry.get_u32(),
                sequence_number: entry.get_u8(),
            })
            .collect();

        Ok(FullIntraRequest {
            sender_ssrc,
            media_ssrc,
            fir,
        })
    }
}
