
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::extended_report::ExtendedReport;
use crate::goodbye::*;
use crate::header::*;
use crate::payload_feedbacks::full_intra_request::*;
use crate::payload_feedbacks::picture_loss_indication::*;
use crate::payload_feedbacks::receiver_estimated_maximum_bitrate::*;
use crate::payload_feedbacks::slice_loss_indication::*;
use crate::raw_packet::*;
use crate::receiver_report::*;
use crate::sender_report::*;
use crate::source_description::*;
use crate::transport_feedbacks::rapid_resynchronization_request::*;
use crate::transport_feedbacks::transport_layer_cc::*;
use crate::transport_feedbacks::transport_layer_nack::*;

type Result<T> = std::result::Result<T, util::Error>;

/// Behaviour shared by every packet codec in the crate.
pub trait Packet: Marshal + Unmarshal + fmt::Display + fmt::Debug {
    /// The header this packet marshals with, padding bit and length included.
    fn header(&self) -> Header;
    /// Sources the packet is about; empty when it names none.
    fn destination_ssrc(&self) -> Vec<u32>;
    /// Size before padding to a 4-byte boundary.
    fn raw_size(&self) -> usize;
}

/// One decoded RTCP packet of any supported type.
///
/// Packets with an unknown type, and feedback packets with an unknown
/// format, are kept as [`RtcpPacket::Raw`].
#[derive(Debug, PartialEq, Clone)]
pub enum RtcpPacket {
    SenderReport(SenderReport),
    ReceiverReport(ReceiverReport),
    SourceDescription(SourceDescription),
    Goodbye(Goodbye),
    TransportLayerNack(TransportLayerNack),
    RapidResynchronizationRequest(RapidResynchronizationRequest),
    TransportLayerCc(TransportLayerCc),
    PictureLossIndication(PictureLossIndication),
    SliceLossIndication(SliceLossIndication),
    ReceiverEstimatedMaximumBitrate(ReceiverEstimatedMaximumBitrate),
    FullIntraRequest(FullIntraRequest),
    ExtendedReport(ExtendedReport),
    Raw(RawPacket),
}

impl RtcpPacket {
    fn as_packet(&self) -> &(dyn Packet + Send + Sync) {
        match self {
            RtcpPacket::SenderReport(p) => p,
            RtcpPacket::ReceiverReport(p) => p,
            RtcpPacket::SourceDescription(p) => p,
            RtcpPacket::Goodbye(p) => p,
            RtcpPacket::TransportLayerNack(p) => p,
            RtcpPacket::RapidResynchronizationRequest(p) => p,
            RtcpPacket::TransportLayerCc(p) => p,
            RtcpPacket::PictureLossIndication(p) => p,
            RtcpPacket::SliceLossIndication(p) => p,
            RtcpPacket::ReceiverEstimatedMaximumBitrate(p) => p,
            RtcpPacket::FullIntraRequest(p) => p,
            RtcpPacket::ExtendedReport(p) => p,
            RtcpPacket::Raw(p) => p,
        }
    }
}

macro_rules! impl_from_packet {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RtcpPacket {
                fn from(p: $ty) -> Self {
                    RtcpPacket::$variant(p)
                }
            }
        )*
    };
}

impl_from_packet! {
    SenderReport => SenderReport,
    ReceiverReport => ReceiverReport,
    SourceDescription => SourceDescription,
    Goodbye => Goodbye,
    TransportLayerNack => TransportLayerNack,
    RapidResynchronizationRequest => RapidResynchronizationRequest,
    TransportLayerCc => TransportLayerCc,
    PictureLossIndication => PictureLossIndication,
    SliceLossIndication => SliceLossIndication,
    ReceiverEstimatedMaximumBitrate => ReceiverEstimatedMaximumBitrate,
    FullIntraRequest => FullIntraRequest,
    ExtendedReport => ExtendedReport,
    Raw => RawPacket,
}

impl fmt::Display for RtcpPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_packet(), f)
    }
}

impl Packet for RtcpPacket {
    fn header(&self) -> Header {
        self.as_packet().header()
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.as_packet().destination_ssrc()
    }

    fn raw_size(&self) -> usize {
        self.as_packet().raw_size()
    }
}

impl MarshalSize for RtcpPacket {
    fn marshal_size(&self) -> usize {
        self.as_packet().marshal_size()
    }
}

impl Marshal for RtcpPacket {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.as_packet().marshal_to(buf)
    }
}

impl Unmarshal for RtcpPacket {
    /// Decodes the first packet and consumes exactly the bytes its header
    /// declares.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let h = Header::unmarshal(raw_packet)?;

        let body_length = h.length as usize * 4;
        if raw_packet.remaining() < body_length {
            return Err(Error::PacketTooShort.into());
        }

        let mut raw = BytesMut::with_capacity(h.packet_size());
        raw.put(h.marshal()?);
        raw.put(raw_packet.copy_to_bytes(body_length));

        Ok(unmarshaller(&raw.freeze())?.packet)
    }
}

/// Timing data carried by a SenderReport.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SenderSync {
    pub ntp_time: u64,
    pub packet_count: u32,
}

impl SenderSync {
    fn is_set(&self) -> bool {
        self.ntp_time != 0 && self.packet_count != 0
    }
}

impl fmt::Display for SenderSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SenderSync ntp_time={:#x} packet_count={}",
            self.ntp_time, self.packet_count
        )
    }
}

/// The result of decoding one UDP datagram.
#[derive(Debug, PartialEq, Clone)]
pub enum Datagram {
    /// Every packet of a compound datagram, in arrival order.
    Packets(Vec<RtcpPacket>),
    /// The datagram opened with a SenderReport carrying timing data; nothing
    /// after it was parsed.
    SenderSync(SenderSync),
}

/// Concatenates the marshalled packets into one datagram.
pub fn marshal(packets: &[RtcpPacket]) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(packets.iter().map(|p| p.marshal_size()).sum());
    for p in packets {
        out.put(p.marshal()?);
    }
    Ok(out.freeze())
}

/// Decodes every packet of one datagram.
///
/// When the first packet is a SenderReport whose NTP timestamp and packet
/// count are both non-zero, only that timing data is returned and the rest
/// of the datagram is left unparsed.
pub fn unmarshal<B>(raw_data: &mut B) -> Result<Datagram>
where
    B: Buf,
{
    let mut raw = raw_data.copy_to_bytes(raw_data.remaining());
    let mut packets = vec![];

    while raw.has_remaining() {
        let unmarshalled = unmarshaller(&raw)?;

        if packets.is_empty() && unmarshalled.is_sender_report && unmarshalled.sync.is_set() {
            log::trace!("leading sender report carries {}", unmarshalled.sync);
            return Ok(Datagram::SenderSync(unmarshalled.sync));
        }

        packets.push(unmarshalled.packet);
        raw.advance(unmarshalled.bytes_processed);
    }

    if packets.is_empty() {
        return Err(Error::EmptyPacketList.into());
    }
    Ok(Datagram::Packets(packets))
}

/// A single packet pulled off the front of a datagram.
pub(crate) struct Unmarshalled {
    pub(crate) packet: RtcpPacket,
    pub(crate) bytes_processed: usize,
    pub(crate) sync: SenderSync,
    pub(crate) is_sender_report: bool,
}

/// Decodes the packet at the front of `raw_data` and reports how many bytes
/// it spans.
pub(crate) fn unmarshaller(raw_data: &Bytes) -> Result<Unmarshalled> {
    let h = Header::unmarshal(&mut raw_data.clone())?;

    let bytes_processed = h.packet_size();
    if bytes_processed > raw_data.len() {
        return Err(Error::PacketTooShort.into());
    }

    let in_packet = raw_data.slice(..bytes_processed);

    log::trace!(
        "dispatching {:?} count={} ({} bytes)",
        h.packet_type,
        h.count,
        bytes_processed
    );

    let mut sync = SenderSync::default();
    let is_sender_report = h.packet_type == PacketType::SenderReport;
    if is_sender_report {
        match SenderReport::unmarshal(&mut in_packet.clone()) {
            Ok(sr) => {
                sync = SenderSync {
                    ntp_time: sr.ntp_time,
                    packet_count: sr.packet_count,
                }
            }
            Err(err) => log::warn!("sender report timing unreadable: {err}"),
        }
    }

    let packet = unmarshal_packet(&h, &mut in_packet.clone())?;

    Ok(Unmarshalled {
        packet,
        bytes_processed,
        sync,
        is_sender_report,
    })
}

fn unmarshal_packet(h: &Header, in_packet: &mut Bytes) -> Result<RtcpPacket> {
    let p: RtcpPacket = match h.packet_type {
        PacketType::SenderReport => SenderReport::unmarshal(in_packet)?.into(),
        PacketType::ReceiverReport => ReceiverReport::unmarshal(in_packet)?.into(),
        PacketType::SourceDescription => SourceDescription::unmarshal(in_packet)?.into(),
        PacketType::Goodbye => Goodbye::unmarshal(in_packet)?.into(),

        PacketType::TransportSpecificFeedback => match h.count {
            FORMAT_TLN => TransportLayerNack::unmarshal(in_packet)?.into(),
            FORMAT_RRR => RapidResynchronizationRequest::unmarshal(in_packet)?.into(),
            FORMAT_TCC => TransportLayerCc::unmarshal(in_packet)?.into(),
            _ => RawPacket::unmarshal(in_packet)?.into(),
        },
        PacketType::PayloadSpecificFeedback => match h.count {
            FORMAT_PLI => PictureLossIndication::unmarshal(in_packet)?.into(),
            FORMAT_SLI => SliceLossIndication::unmarshal(in_packet)?.into(),
            FORMAT_REMB => ReceiverEstimatedMaximumBitrate::unmarshal(in_packet)?.into(),
            FORMAT_FIR => FullIntraRequest::unmarshal(in_packet)?.into(),
            _ => RawPacket::unmarshal(in_packet)?.into(),
        },
        PacketType::ExtendedReport => ExtendedReport::unmarshal(in_packet)?.into(),
        _ => RawPacket::unmarshal(in_packet)?.into(),
    };

    Ok(p)
}
