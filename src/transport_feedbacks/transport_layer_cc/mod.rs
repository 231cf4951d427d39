#[cfg(test)]
mod transport_layer_cc_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// The T bit of a packet status chunk.
#[derive(Default, PartialEq, Eq, Debug, Clone)]
#[repr(u16)]
pub enum StatusChunkTypeTcc {
    #[default]
    RunLengthChunk = 0,
    StatusVectorChunk = 1,
}

/// Packet status symbol, which also decides the size of the receive delta.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u16)]
pub enum SymbolTypeTcc {
    #[default]
    PacketNotReceived = 0,
    PacketReceivedSmallDelta = 1,
    PacketReceivedLargeDelta = 2,
    /// Received, but no delta follows.
    PacketReceivedWithoutDelta = 3,
}

/// Symbol width of a status vector chunk.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u16)]
pub enum SymbolSizeTypeTcc {
    #[default]
    OneBit = 0,
    TwoBit = 1,
}

impl From<u16> for SymbolSizeTypeTcc {
    fn from(val: u16) -> Self {
        match val {
            0 => SymbolSizeTypeTcc::OneBit,
            _ => SymbolSizeTypeTcc::TwoBit,
        }
    }
}

impl From<u16> for StatusChunkTypeTcc {
    fn from(val: u16) -> Self {
        match val {
            0 => StatusChunkTypeTcc::RunLengthChunk,
            _ => StatusChunkTypeTcc::StatusVectorChunk,
        }
    }
}

impl From<u16> for SymbolTypeTcc {
    fn from(val: u16) -> Self {
        match val {
            0 => SymbolTypeTcc::PacketNotReceived,
            1 => SymbolTypeTcc::PacketReceivedSmallDelta,
            2 => SymbolTypeTcc::PacketReceivedLargeDelta,
            _ => SymbolTypeTcc::PacketReceivedWithoutDelta,
        }
    }
}

impl SymbolTypeTcc {
    fn has_delta(self) -> bool {
        self == SymbolTypeTcc::PacketReceivedSmallDelta
            || self == SymbolTypeTcc::PacketReceivedLargeDelta
    }
}

/// Offset of the first packet chunk from the end of the common header.
const PACKET_CHUNK_OFFSET: usize = 16;

/// Receive deltas count in units of 250us.
pub const TYPE_TCC_DELTA_SCALE_FACTOR: i64 = 250;

static NUM_OF_BITS_OF_SYMBOL_SIZE: [u16; 2] = [1, 2];

const PACKET_STATUS_CHUNK_LENGTH: usize = 2;

const RUN_LENGTH_MASK: u16 = 0x1fff;
const REFERENCE_TIME_MASK: u32 = 0x00ff_ffff;

/// Either kind of packet status chunk; the T bit tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketStatusChunk {
    RunLengthChunk(RunLengthChunk),
    StatusVectorChunk(StatusVectorChunk),
}

impl MarshalSize for PacketStatusChunk {
    fn marshal_size(&self) -> usize {
        PACKET_STATUS_CHUNK_LENGTH
    }
}

impl Marshal for PacketStatusChunk {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            PacketStatusChunk::RunLengthChunk(c) => c.marshal_to(buf),
            PacketStatusChunk::StatusVectorChunk(c) => c.marshal_to(buf),
        }
    }
}

/// One status repeated for a run of packets.
///
/// ```text
/// 0                   1
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |T| S |       Run Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunLengthChunk {
    pub type_tcc: StatusChunkTypeTcc,
    pub packet_status_symbol: SymbolTypeTcc,
    /// 13 bits; higher bits are dropped when marshalling.
    pub run_length: u16,
}

impl MarshalSize for RunLengthChunk {
    fn marshal_size(&self) -> usize {
        PACKET_STATUS_CHUNK_LENGTH
    }
}

impl Marshal for RunLengthChunk {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < PACKET_STATUS_CHUNK_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u16(
            (self.packet_status_symbol as u16) << 13 | self.run_length & RUN_LENGTH_MASK,
        );
        Ok(PACKET_STATUS_CHUNK_LENGTH)
    }
}

impl Unmarshal for RunLengthChunk {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < PACKET_STATUS_CHUNK_LENGTH {
            return Err(Error::PacketStatusChunkLength.into());
        }

        let word = raw_packet.get_u16();
        Ok(RunLengthChunk {
            type_tcc: StatusChunkTypeTcc::RunLengthChunk,
            packet_status_symbol: ((word >> 13) & 0x3).into(),
            run_length: word & RUN_LENGTH_MASK,
        })
    }
}

/// A status per packet, 14 one-bit or 7 two-bit symbols.
///
/// ```text
/// 0                   1
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |T|S|       symbol list         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusVectorChunk {
    pub type_tcc: StatusChunkTypeTcc,
    pub symbol_size: SymbolSizeTypeTcc,
    /// One-bit symbols can only say "not received" or "received, small
    /// delta". Marshalling fails if the list overflows the chunk.
    pub symbol_list: Vec<SymbolTypeTcc>,
}

impl MarshalSize for StatusVectorChunk {
    fn marshal_size(&self) -> usize {
        PACKET_STATUS_CHUNK_LENGTH
    }
}

impl Marshal for StatusVectorChunk {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < PACKET_STATUS_CHUNK_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        let bits = NUM_OF_BITS_OF_SYMBOL_SIZE[self.symbol_size as usize];
        let mut word = 1 << 15 | (self.symbol_size as u16) << 14;
        for (i, symbol) in self.symbol_list.iter().enumerate() {
            word = set_nbits_of_uint16(word, bits, 2 + bits * i as u16, *symbol as u16)?;
        }

        buf.put_u16(word);
        Ok(PACKET_STATUS_CHUNK_LENGTH)
    }
}

impl Unmarshal for StatusVectorChunk {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < PACKET_STATUS_CHUNK_LENGTH {
            return Err(Error::PacketStatusChunkLength.into());
        }

        let word = raw_packet.get_u16();
        let symbol_size = SymbolSizeTypeTcc::from((word >> 14) & 0x1);
        let bits = NUM_OF_BITS_OF_SYMBOL_SIZE[symbol_size as usize];
        let mask = (1 << bits) - 1;

        let symbol_list = (1..=14 / bits)
            .map(|i| ((word >> (14 - bits * i)) & mask).into())
            .collect();

        Ok(StatusVectorChunk {
            type_tcc: StatusChunkTypeTcc::StatusVectorChunk,
            symbol_size,
            symbol_list,
        })
    }
}

/// A receive time delta in microseconds.
///
/// Small deltas take one unsigned byte, 0 to 63.75ms. Large deltas take a
/// signed 16-bit word, -8192 to 8191.75ms. Precision below 250us is lost.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecvDelta {
    pub type_tcc_packet: SymbolTypeTcc,
    pub delta: i64,
}

impl RecvDelta {
    fn scaled(&self) -> Option<Scaled> {
        let units = self.delta / TYPE_TCC_DELTA_SCALE_FACTOR;
        match self.type_tcc_packet {
            SymbolTypeTcc::PacketReceivedSmallDelta => u8::try_from(units).ok().map(Scaled::Small),
            SymbolTypeTcc::PacketReceivedLargeDelta => i16::try_from(units).ok().map(Scaled::Large),
            _ => None,
        }
    }
}

enum Scaled {
    Small(u8),
    Large(i16),
}

/// Wire size of the delta a packet with `symbol` carries.
fn delta_size(symbol: SymbolTypeTcc) -> usize {
    match symbol {
        SymbolTypeTcc::PacketReceivedSmallDelta => 1,
        SymbolTypeTcc::PacketReceivedLargeDelta => 2,
        _ => 0,
    }
}

impl MarshalSize for RecvDelta {
    /// Zero when the delta cannot be encoded.
    fn marshal_size(&self) -> usize {
        match self.scaled() {
            Some(Scaled::Small(_)) => 1,
            Some(Scaled::Large(_)) => 2,
            None => 0,
        }
    }
}

impl Marshal for RecvDelta {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let scaled = match self.scaled() {
            Some(scaled) => scaled,
            None => return Err(Error::DeltaExceedLimit.into()),
        };
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        match scaled {
            Scaled::Small(units) => buf.put_u8(units),
            Scaled::Large(units) => buf.put_i16(units),
        }
        Ok(self.marshal_size())
    }
}

impl Unmarshal for RecvDelta {
    /// The buffer holds exactly one delta; its size picks the kind.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (type_tcc_packet, units) = match raw_packet.remaining() {
            1 => (
                SymbolTypeTcc::PacketReceivedSmallDelta,
                i64::from(raw_packet.get_u8()),
            ),
            2 => (
                SymbolTypeTcc::PacketReceivedLargeDelta,
                i64::from(raw_packet.get_i16()),
            ),
            _ => return Err(Error::DeltaExceedLimit.into()),
        };

        Ok(RecvDelta {
            type_tcc_packet,
            delta: units * TYPE_TCC_DELTA_SCALE_FACTOR,
        })
    }
}

/// TransportLayerCc (FMT=15) is transport-wide congestion control
/// feedback: the arrival status and time of a range of transport sequence
/// numbers.
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|  FMT=15 |    PT=205     |           length              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     SSRC of packet sender                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      SSRC of media source                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      base sequence number     |      packet status count      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                 reference time                | fb pkt. count |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :            packet chunks, then one delta per received         :
/// :            packet, then padding to a word boundary            :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct TransportLayerCc {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    /// Transport sequence number of the first packet described.
    pub base_sequence_number: u16,
    pub packet_status_count: u16,
    /// 24 bits, in multiples of 64ms.
    pub reference_time: u32,
    pub fb_pkt_count: u8,
    pub packet_chunks: Vec<PacketStatusChunk>,
    pub recv_deltas: Vec<RecvDelta>,
}

impl fmt::Display for TransportLayerCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransportLayerCc from {:x} for {:x} base={} status={} ref={} fb={} chunks={} deltas={}",
            self.sender_ssrc,
            self.media_ssrc,
            self.base_sequence_number,
            self.packet_status_count,
            self.reference_time,
            self.fb_pkt_count,
            self.packet_chunks.len(),
            self.recv_deltas.len()
        )
    }
}

impl Packet for TransportLayerCc {
    fn header(&self) -> Header {
        packet_header(
            PacketType::TransportSpecificFeedback,
            FORMAT_TCC,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + PACKET_CHUNK_OFFSET
            + self.packet_chunks.len() * PACKET_STATUS_CHUNK_LENGTH
            + self
                .recv_deltas
                .iter()
                .map(|d| delta_size(d.type_tcc_packet))
                .sum::<usize>()
    }
}

impl MarshalSize for TransportLayerCc {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for TransportLayerCc {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(self.media_ssrc);
            buf.put_u16(self.base_sequence_number);
            buf.put_u16(self.packet_status_count);
            buf.put_u32(
                (self.reference_time & REFERENCE_TIME_MASK) << 8 | u32::from(self.fb_pkt_count),
            );

            for chunk in &self.packet_chunks {
                put_marshal(buf, chunk)?;
            }
            for delta in &self.recv_deltas {
                if delta.marshal_size() != delta_size(delta.type_tcc_packet) {
                    return Err(Error::DeltaExceedLimit.into());
                }
                put_marshal(buf, delta)?;
            }
            Ok(())
        })
    }
}

impl Unmarshal for TransportLayerCc {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH + PACKET_CHUNK_OFFSET {
            return Err(Error::PacketTooShort.into());
        }

        let h = Header::unmarshal(raw_packet)?;
        if h.packet_type != PacketType::TransportSpecificFeedback || h.count != FORMAT_TCC {
            return Err(Error::WrongType.into());
        }

        let body_length = h.length as usize * 4;
        if body_length < PACKET_CHUNK_OFFSET || raw_packet.remaining() < body_length {
            return Err(Error::PacketTooShort.into());
        }

        // Padding is left in place: some senders set P over trailing delta
        // bytes, so deltas are bounded by the declared length only.
        let mut body = raw_packet.copy_to_bytes(body_length);

        let sender_ssrc = body.get_u32();
        let media_ssrc = body.get_u32();
        let base_sequence_number = body.get_u16();
        let packet_status_count = body.get_u16();
        let reference_and_count = body.get_u32();

        let (packet_chunks, delta_symbols) =
            unmarshal_packet_chunks(&mut body, packet_status_count)?;

        let recv_deltas = delta_symbols
            .into_iter()
            .map(|symbol| -> Result<RecvDelta> {
                let size = delta_size(symbol);
                if body.remaining() < size {
                    return Err(Error::PacketTooShort.into());
                }
                RecvDelta::unmarshal(&mut body.split_to(size))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TransportLayerCc {
            sender_ssrc,
            media_ssrc,
            base_sequence_number,
            packet_status_count,
            reference_time: reference_and_count >> 8,
            fb_pkt_count: reference_and_count as u8,
            packet_chunks,
            recv_deltas,
        })
    }
}

/// Reads chunks until `packet_status_count` packets are covered. Returns
/// the chunks and the symbol of every covered packet that carries a delta.
fn unmarshal_packet_chunks(
    body: &mut Bytes,
    packet_status_count: u16,
) -> Result<(Vec<PacketStatusChunk>, Vec<SymbolTypeTcc>)> {
    let mut packet_chunks = vec![];
    let mut delta_symbols = vec![];

    let mut covered = 0u16;
    while covered < packet_status_count {
        if body.remaining() < PACKET_STATUS_CHUNK_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let left = usize::from(packet_status_count - covered);
        let mut chunk_reader = body.split_to(PACKET_STATUS_CHUNK_LENGTH);

        let (chunk, taken) = match StatusChunkTypeTcc::from(u16::from(chunk_reader[0] >> 7)) {
            StatusChunkTypeTcc::RunLengthChunk => {
                let chunk = RunLengthChunk::unmarshal(&mut chunk_reader)?;
                let taken = left.min(usize::from(chunk.run_length));
                if chunk.packet_status_symbol.has_delta() {
                    delta_symbols.extend(std::iter::repeat(chunk.packet_status_symbol).take(taken));
                }
                (PacketStatusChunk::RunLengthChunk(chunk), taken)
            }
            StatusChunkTypeTcc::StatusVectorChunk => {
                let chunk = StatusVectorChunk::unmarshal(&mut chunk_reader)?;
                let taken = left.min(chunk.symbol_list.len());
                delta_symbols.extend(
                    chunk.symbol_list[..taken]
                        .iter()
                        .filter(|s| s.has_delta()),
                );
                (PacketStatusChunk::StatusVectorChunk(chunk), taken)
            }
        };

        covered += taken as u16;
        packet_chunks.push(chunk);
    }

    Ok((packet_chunks, delta_symbols))
}
