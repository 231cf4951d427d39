
use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// sender_ssrc and media_ssrc
const SLI_FIXED_LENGTH: usize = 2 * SSRC_LENGTH;
const SLI_ENTRY_LENGTH: usize = 4;

/// One lost run of macroblocks: `number` macroblocks starting at `first`,
/// in the picture whose ID ends in the 6 bits of `picture`.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            First        |        Number           | PictureID |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct SliEntry {
    /// 13 bits
    pub first: u16,
    /// 13 bits
    pub number: u16,
    /// 6 bits
    pub picture: u8,
}

impl From<u32> for SliEntry {
    fn from(sli: u32) -> Self {
        SliEntry {
            first: ((sli >> 19) & 0x1FFF) as u16,
            number: ((sli >> 6) & 0x1FFF) as u16,
            picture: (sli & 0x3F) as u8,
        }
    }
}

impl From<SliEntry> for u32 {
    fn from(s: SliEntry) -> Self {
        ((s.first as u32 & 0x1FFF) << 19) | ((s.number as u32 & 0x1FFF) << 6) | (s.picture as u32 & 0x3F)
    }
}

/// SliceLossIndication (RFC 4585 section 6.3.2) reports lost runs of
/// macroblocks so the encoder can repair them without a full key frame.
/// Each FCI entry is one [`SliEntry`].
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SliceLossIndication {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub sli_entries: Vec<SliEntry>,
}

impl fmt::Display for SliceLossIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SliceLossIndication from {:x} for {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for e in &self.sli_entries {
            write!(
                f,
                " [first={} number={} picture={}]",
                e.first, e.number, e.picture
            )?;
        }
        Ok(())
    }
}

impl Packet for SliceLossIndication {
    fn header(&self) -> Header {
        packet_header(
            PacketType::PayloadSpecificFeedback,
            FORMAT_SLI,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + SLI_FIXED_LENGTH + SLI_ENTRY_LENGTH * self.sli_entries.len()
    }
}

impl MarshalSize for SliceLossIndication {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for SliceLossIndication {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let h = self.header();
        if usize::from(h.length) * 4 + HEADER_LENGTH != self.marshal_size() {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&h, self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(self.media_ssrc);
            self.sli_entries
                .iter()
                .for_each(|&entry| buf.put_u32(entry.into()));
            Ok(())
        })
    }
}

impl Unmarshal for SliceLossIndication {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) = unmarshal_body(
            raw_packet,
            PacketType::PayloadSpecificFeedback,
            Some(FORMAT_SLI),
            SLI_FIXED_LENGTH,
        )?;
        if (body.len() - SLI_FIXED_LENGTH) % SLI_ENTRY_LENGTH != 0 {
            return Err(Error::PacketTooShort.into());
        }

        let sender_ssrc = body.get_u32();
        let media_ssrc = body.get_u32();
        let sli_entries = body
            .chunks_exact(SLI_ENTRY_LENGTH)
            .map(|mut entry| SliEntry::from(entry.get_u32()))
            .collect();

        Ok(SliceLossIndication {
            sender_ssrc,
            media_ssrc,
            sli_entries,
        })
    }
}
