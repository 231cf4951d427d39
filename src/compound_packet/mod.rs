
use std::fmt;

use bytes::{Buf, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::*;
use crate::source_description::*;

type Result<T> = std::result::Result<T, util::Error>;

/// Packets sent together in one datagram and checked against the layout of
/// RFC 3550 section 6.1.
///
/// The first packet is a SenderReport or ReceiverReport. Further
/// ReceiverReports may follow it, then a SourceDescription with a CNAME item.
/// Anything may come after that.
///
/// Unlike [`unmarshal`], decoding a CompoundPacket never stops early at a
/// leading SenderReport.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CompoundPacket(pub Vec<RtcpPacket>);

impl fmt::Display for CompoundPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CompoundPacket ({} packets)", self.0.len())?;
        for packet in &self.0 {
            writeln!(f, "  {packet}")?;
        }
        Ok(())
    }
}

impl Packet for CompoundPacket {
    /// A compound has no header of its own; this is the first packet's.
    fn header(&self) -> Header {
        self.0.first().map(|p| p.header()).unwrap_or_default()
    }

    /// Sources named by the leading report.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.0
            .first()
            .map(|p| p.destination_ssrc())
            .unwrap_or_default()
    }

    fn raw_size(&self) -> usize {
        self.0.iter().map(|p| p.marshal_size()).sum()
    }
}

impl MarshalSize for CompoundPacket {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for CompoundPacket {
    /// Refuses to write a compound that fails [`CompoundPacket::validate`].
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        self.validate()?;

        let mut written = 0;
        for packet in &self.0 {
            let n = packet.marshal_to(buf)?;
            buf = &mut buf[n..];
            written += n;
        }

        Ok(written)
    }
}

impl Unmarshal for CompoundPacket {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let mut packets = vec![];
        while raw_packet.has_remaining() {
            packets.push(RtcpPacket::unmarshal(raw_packet)?);
        }

        let compound = CompoundPacket(packets);
        compound.validate()?;
        Ok(compound)
    }
}

impl CompoundPacket {
    /// Checks packet order; see [`CompoundPacket::cname`] for the rules.
    pub fn validate(&self) -> Result<()> {
        self.cname().map(|_| ())
    }

    /// The first CNAME of the SourceDescription that follows the reports.
    ///
    /// Fails with `EmptyCompound`, `BadFirstPacket`, `PacketBeforeCname` or
    /// `MissingCname` when the layout is wrong.
    pub fn cname(&self) -> Result<Bytes> {
        let (first, rest) = match self.0.split_first() {
            Some(split) => split,
            None => return Err(Error::EmptyCompound.into()),
        };

        if !matches!(
            first,
            RtcpPacket::SenderReport(_) | RtcpPacket::ReceiverReport(_)
        ) {
            return Err(Error::BadFirstPacket.into());
        }

        for pkt in rest {
            match pkt {
                // reports past 31 spill into extra RRs
                RtcpPacket::ReceiverReport(_) => continue,
                RtcpPacket::SourceDescription(sdes) => {
                    return sdes_cname(sdes).ok_or_else(|| Error::MissingCname.into());
                }
                _ => return Err(Error::PacketBeforeCname.into()),
            }
        }

        Err(Error::MissingCname.into())
    }
}

fn sdes_cname(sdes: &SourceDescription) -> Option<Bytes> {
    sdes.chunks
        .iter()
        .flat_map(|chunk| &chunk.items)
        .find(|item| item.sdes_type == SdesType::SdesCname)
        .map(|item| item.text.clone())
}
