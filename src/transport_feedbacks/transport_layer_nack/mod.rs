#[cfg(test)]
mod transport_layer_nack_test;

use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// pid and blp
const NACK_PAIR_LENGTH: usize = 4;
/// sender_ssrc and media_ssrc
const NACK_FIXED_LENGTH: usize = 2 * SSRC_LENGTH;
/// Sequence numbers one pair covers past its packet_id.
const NACK_BITMAP_WIDTH: u16 = 16;

/// One FCI entry of a [`TransportLayerNack`]: the lost `packet_id` plus a
/// bitmap where bit `i` marks `packet_id + i + 1` as lost too.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct NackPair {
    pub packet_id: u16,
    pub lost_packets: u16,
}

impl NackPair {
    pub fn new(seq: u16) -> Self {
        NackPair {
            packet_id: seq,
            lost_packets: 0,
        }
    }

    /// Every sequence number this pair reports lost, packet_id first and
    /// the rest ascending. Sequence numbers wrap at 65535.
    pub fn packet_list(&self) -> Vec<u16> {
        let following = (0..NACK_BITMAP_WIDTH)
            .filter(|bit| self.lost_packets & (1 << bit) != 0)
            .map(|bit| self.packet_id.wrapping_add(bit + 1));
        std::iter::once(self.packet_id).chain(following).collect()
    }
}

/// Packs lost sequence numbers into NACK pairs in the order given.
///
/// A number within 16 of the open pair's packet_id sets a bit in it; any
/// other number opens a new pair. Distances wrap, so 65535 followed by 0
/// share a pair.
pub fn nack_pairs_from_sequence_numbers(seq_nos: &[u16]) -> Vec<NackPair> {
    let mut pairs: Vec<NackPair> = vec![];

    for &seq in seq_nos {
        match pairs.last_mut() {
            Some(pair) => match seq.wrapping_sub(pair.packet_id) {
                0 => {}
                diff if diff <= NACK_BITMAP_WIDTH => pair.lost_packets |= 1 << (diff - 1),
                _ => pairs.push(NackPair::new(seq)),
            },
            None => pairs.push(NackPair::new(seq)),
        }
    }

    pairs
}

/// TransportLayerNack (RFC 4585 section 6.2.1, FMT=1) lists RTP packets
/// the receiver never got.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|  FMT=1  |   PT=205      |          length               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of packet sender                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of media source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            PID                |             BLP               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct TransportLayerNack {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub nacks: Vec<NackPair>,
}

impl fmt::Display for TransportLayerNack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransportLayerNack from {:x} for {:x}",
            self.sender_ssrc, self.media_ssrc
        )?;
        for nack in &self.nacks {
            write!(f, " [{} {:#06x}]", nack.packet_id, nack.lost_packets)?;
        }
        Ok(())
    }
}

impl Packet for TransportLayerNack {
    fn header(&self) -> Header {
        packet_header(
            PacketType::TransportSpecificFeedback,
            FORMAT_TLN,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + NACK_FIXED_LENGTH + NACK_PAIR_LENGTH * self.nacks.len()
    }
}

impl MarshalSize for TransportLayerNack {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for TransportLayerNack {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        // one length word per pair plus the two ssrc words
        if self.nacks.len() + 2 > u16::MAX as usize {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(self.media_ssrc);
            for nack in &self.nacks {
                buf.put_u16(nack.packet_id);
                buf.put_u16(nack.lost_packets);
            }
            Ok(())
        })
    }
}

impl Unmarshal for TransportLayerNack {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) = unmarshal_body(
            raw_packet,
            PacketType::TransportSpecificFeedback,
            Some(FORMAT_TLN),
            NACK_FIXED_LENGTH,
        )?;
        if (body.len() - NACK_FIXED_LENGTH) % NACK_PAIR_LENGTH != 0 {
            return Err(Error::PacketTooShort.into());
        }

        let sender_ssrc = body.get_u32();
        let media_ssrc = body.get_u32();
        let nacks = body
            .chunks_exact(NACK_PAIR_LENGTH)
            .map(|mut pair| NackPair {
                packet_id: pair.get_u16(),
                lost_packets: pair.get_u16(),
            })
            .collect();

        Ok(TransportLayerNack {
            sender_ssrc,
            media_ssrc,
            nacks,
        })
    }
}
