use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

type Result<T> = std::result::Result<T, util::Error>;

/// The second octet of every RTCP header.
///
/// Octets outside 200..=207 are kept in `Unsupported` and written back
/// unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PacketType {
    Unsupported(u8),
    SenderReport,              // RFC 3550, 6.4.1
    ReceiverReport,            // RFC 3550, 6.4.2
    SourceDescription,         // RFC 3550, 6.5
    Goodbye,                   // RFC 3550, 6.6
    ApplicationDefined,        // RFC 3550, 6.7 (decoded as a RawPacket)
    TransportSpecificFeedback, // RFC 4585, 6051
    PayloadSpecificFeedback,   // RFC 4585, 6.3
    ExtendedReport,            // RFC 3611
}

impl Default for PacketType {
    fn default() -> Self {
        PacketType::Unsupported(0)
    }
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            205 => PacketType::TransportSpecificFeedback,
            206 => PacketType::PayloadSpecificFeedback,
            207 => PacketType::ExtendedReport,
            other => PacketType::Unsupported(other),
        }
    }
}

impl From<PacketType> for u8 {
    fn from(t: PacketType) -> Self {
        match t {
            PacketType::Unsupported(b) => b,
            PacketType::SenderReport => 200,
            PacketType::ReceiverReport => 201,
            PacketType::SourceDescription => 202,
            PacketType::Goodbye => 203,
            PacketType::ApplicationDefined => 204,
            PacketType::TransportSpecificFeedback => 205,
            PacketType::PayloadSpecificFeedback => 206,
            PacketType::ExtendedReport => 207,
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Unsupported(b) => write!(f, "Unsupported({b})"),
            PacketType::SenderReport => write!(f, "SR"),
            PacketType::ReceiverReport => write!(f, "RR"),
            PacketType::SourceDescription => write!(f, "SDES"),
            PacketType::Goodbye => write!(f, "BYE"),
            PacketType::ApplicationDefined => write!(f, "APP"),
            PacketType::TransportSpecificFeedback => write!(f, "TSFB"),
            PacketType::PayloadSpecificFeedback => write!(f, "PSFB"),
            PacketType::ExtendedReport => write!(f, "XR"),
        }
    }
}

// Transport and payload specific feedback messages overload the count field
// to act as a message type.

/// Picture Loss Indication, RFC 4585 6.3.1.
pub const FORMAT_PLI: u8 = 1;
/// Slice Loss Indication, RFC 4585 6.3.2.
pub const FORMAT_SLI: u8 = 2;
/// Full Intra Request, RFC 5104 4.3.1.
pub const FORMAT_FIR: u8 = 4;
/// Receiver Estimated Maximum Bitrate, application layer feedback.
pub const FORMAT_REMB: u8 = 15;
/// Generic NACK, RFC 4585 6.2.1.
pub const FORMAT_TLN: u8 = 1;
/// Rapid Resynchronization Request, RFC 6051.
pub const FORMAT_RRR: u8 = 5;
/// Transport-wide congestion control feedback.
/// https://tools.ietf.org/html/draft-holmer-rmcat-transport-wide-cc-extensions-01#page-5
pub const FORMAT_TCC: u8 = 15;

pub const RTP_VERSION: u8 = 2;
pub const VERSION_SHIFT: u8 = 6;
pub const VERSION_MASK: u8 = 0x3;
pub const PADDING_SHIFT: u8 = 5;
pub const PADDING_MASK: u8 = 0x1;
pub const COUNT_SHIFT: u8 = 0;
pub const COUNT_MASK: u8 = 0x1f;

pub const HEADER_LENGTH: usize = 4;
pub const COUNT_MAX: usize = (1 << 5) - 1;
pub const SSRC_LENGTH: usize = 4;
pub const SDES_MAX_OCTET_COUNT: usize = (1 << 8) - 1;

/// The four octets that open every packet in a datagram.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|  count  |      PT       |             length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Header {
    /// Set when the last octet of the packet counts trailing padding.
    pub padding: bool,
    /// Report or chunk count, or the feedback format for PT 205/206.
    pub count: u8,
    pub packet_type: PacketType,
    /// Packet size in 32-bit words minus one, padding included.
    pub length: u16,
}

impl Header {
    /// Total size in bytes of the packet this header describes.
    pub fn packet_size(&self) -> usize {
        (self.length as usize + 1) * 4
    }
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
    }
}

impl Marshal for Header {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.count as usize > COUNT_MAX {
            return Err(Error::InvalidHeader.into());
        }
        if buf.remaining_mut() < HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u8(
            RTP_VERSION << VERSION_SHIFT
                | u8::from(self.padding) << PADDING_SHIFT
                | self.count << COUNT_SHIFT,
        );
        buf.put_u8(self.packet_type.into());
        buf.put_u16(self.length);

        Ok(HEADER_LENGTH)
    }
}

impl Unmarshal for Header {
    /// Checks the version only; length against the input is the caller's
    /// concern.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::InvalidHeader.into());
        }

        let b0 = raw_packet.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        if version != RTP_VERSION {
            return Err(Error::BadVersion.into());
        }

        Ok(Header {
            padding: (b0 >> PADDING_SHIFT) & PADDING_MASK == 1,
            count: (b0 >> COUNT_SHIFT) & COUNT_MASK,
            packet_type: PacketType::from(raw_packet.get_u8()),
            length: raw_packet.get_u16(),
        })
    }
}
