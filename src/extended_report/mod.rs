
#[macro_use]
mod block;
pub mod dlrr;
pub mod prt;
pub mod rle;
pub mod rrt;
pub mod ssr;
pub mod unknown;
pub mod vm;

use std::fmt;

use block::{read_block, write_block, BlockBody};
use bytes::{Buf, BufMut, Bytes};
pub use dlrr::{DlrrReport, DlrrReportBlock};
pub use prt::PacketReceiptTimesReportBlock;
pub use rle::{Chunk, ChunkType, RleReportBlock};
pub use rrt::ReceiverReferenceTimeReportBlock;
pub use ssr::{StatisticsSummaryReportBlock, TtlOrHopLimitType};
pub use unknown::UnknownReportBlock;
use util::marshal::{Marshal, MarshalSize, Unmarshal};
pub use vm::VoipMetricsReportBlock;

use crate::error::Error;
use crate::header::{Header, PacketType, HEADER_LENGTH, SSRC_LENGTH};
use crate::packet::Packet;
use crate::util::{
    get_padding_size, marshal_packet, packet_header, padded_size, put_marshal, unmarshal_body,
};

type Result<T> = std::result::Result<T, util::Error>;

pub(crate) const XR_HEADER_LENGTH: usize = 4;

/// Report block types of RFC 3611. Unassigned octets map to `Unknown`.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockType {
    #[default]
    Unknown = 0,
    LossRle = 1,               // RFC 3611, section 4.1
    DuplicateRle = 2,          // RFC 3611, section 4.2
    PacketReceiptTimes = 3,    // RFC 3611, section 4.3
    ReceiverReferenceTime = 4, // RFC 3611, section 4.4
    Dlrr = 5,                  // RFC 3611, section 4.5
    StatisticsSummary = 6,     // RFC 3611, section 4.6
    VoipMetrics = 7,           // RFC 3611, section 4.7
}

impl From<u8> for BlockType {
    fn from(v: u8) -> Self {
        match v {
            1 => BlockType::LossRle,
            2 => BlockType::DuplicateRle,
            3 => BlockType::PacketReceiptTimes,
            4 => BlockType::ReceiverReferenceTime,
            5 => BlockType::Dlrr,
            6 => BlockType::StatisticsSummary,
            7 => BlockType::VoipMetrics,
            _ => BlockType::Unknown,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockType::LossRle => "LossRLE",
            BlockType::DuplicateRle => "DuplicateRLE",
            BlockType::PacketReceiptTimes => "PRT",
            BlockType::ReceiverReferenceTime => "RRT",
            BlockType::Dlrr => "DLRR",
            BlockType::StatisticsSummary => "SSR",
            BlockType::VoipMetrics => "VoIP",
            BlockType::Unknown => "Unknown",
        })
    }
}

/// XrHeader is the common 4-byte prefix of every report block.
///
/// `block_type` is kept as the raw octet so blocks of unknown type
/// re-encode unchanged; use [`XrHeader::kind`] to classify it.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct XrHeader {
    pub block_type: u8,
    pub type_specific: u8,
    /// Block length in 32-bit words, not counting this header.
    pub block_length: u16,
}

impl XrHeader {
    pub fn kind(&self) -> BlockType {
        self.block_type.into()
    }

    /// Size of the block this header introduces, header included.
    pub fn block_size(&self) -> usize {
        XR_HEADER_LENGTH + self.block_length as usize * 4
    }
}

impl MarshalSize for XrHeader {
    fn marshal_size(&self) -> usize {
        XR_HEADER_LENGTH
    }
}

impl Marshal for XrHeader {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if buf.remaining_mut() < XR_HEADER_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u8(self.block_type);
        buf.put_u8(self.type_specific);
        buf.put_u16(self.block_length);

        Ok(XR_HEADER_LENGTH)
    }
}

impl Unmarshal for XrHeader {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < XR_HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        Ok(XrHeader {
            block_type: raw_packet.get_u8(),
            type_specific: raw_packet.get_u8(),
            block_length: raw_packet.get_u16(),
        })
    }
}

/// One report block of an [`ExtendedReport`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReportBlock {
    LossRle(RleReportBlock),
    DuplicateRle(RleReportBlock),
    PacketReceiptTimes(PacketReceiptTimesReportBlock),
    ReceiverReferenceTime(ReceiverReferenceTimeReportBlock),
    Dlrr(DlrrReportBlock),
    StatisticsSummary(StatisticsSummaryReportBlock),
    VoipMetrics(VoipMetricsReportBlock),
    Unknown(UnknownReportBlock),
}

impl ReportBlock {
    pub fn block_type(&self) -> BlockType {
        match self {
            ReportBlock::LossRle(_) => BlockType::LossRle,
            ReportBlock::DuplicateRle(_) => BlockType::DuplicateRle,
            ReportBlock::PacketReceiptTimes(_) => BlockType::PacketReceiptTimes,
            ReportBlock::ReceiverReferenceTime(_) => BlockType::ReceiverReferenceTime,
            ReportBlock::Dlrr(_) => BlockType::Dlrr,
            ReportBlock::StatisticsSummary(_) => BlockType::StatisticsSummary,
            ReportBlock::VoipMetrics(_) => BlockType::VoipMetrics,
            ReportBlock::Unknown(_) => BlockType::Unknown,
        }
    }

    /// Sources this block reports on. RRT and unknown blocks name none.
    pub fn destination_ssrc(&self) -> Vec<u32> {
        match self {
            ReportBlock::LossRle(b) | ReportBlock::DuplicateRle(b) => vec![b.ssrc],
            ReportBlock::PacketReceiptTimes(b) => vec![b.ssrc],
            ReportBlock::Dlrr(b) => b.reports.iter().map(|r| r.ssrc).collect(),
            ReportBlock::StatisticsSummary(b) => vec![b.ssrc],
            ReportBlock::VoipMetrics(b) => vec![b.ssrc],
            ReportBlock::ReceiverReferenceTime(_) | ReportBlock::Unknown(_) => vec![],
        }
    }

    /// Decodes the block `xr_header` introduces; `block` holds exactly
    /// that block, header included.
    fn unmarshal_block(xr_header: &XrHeader, block: &mut Bytes) -> Result<Self> {
        Ok(match xr_header.kind() {
            BlockType::LossRle => ReportBlock::LossRle(read_block(block)?),
            BlockType::DuplicateRle => ReportBlock::DuplicateRle(read_block(block)?),
            BlockType::PacketReceiptTimes => ReportBlock::PacketReceiptTimes(read_block(block)?),
            BlockType::ReceiverReferenceTime => {
                ReportBlock::ReceiverReferenceTime(read_block(block)?)
            }
            BlockType::Dlrr => ReportBlock::Dlrr(read_block(block)?),
            BlockType::StatisticsSummary => ReportBlock::StatisticsSummary(read_block(block)?),
            BlockType::VoipMetrics => ReportBlock::VoipMetrics(read_block(block)?),
            BlockType::Unknown => ReportBlock::Unknown(read_block(block)?),
        })
    }
}

impl fmt::Display for ReportBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {:x?}]", self.block_type(), self.destination_ssrc())
    }
}

impl MarshalSize for ReportBlock {
    fn marshal_size(&self) -> usize {
        match self {
            ReportBlock::LossRle(b) | ReportBlock::DuplicateRle(b) => b.marshal_size(),
            ReportBlock::PacketReceiptTimes(b) => b.marshal_size(),
            ReportBlock::ReceiverReferenceTime(b) => b.marshal_size(),
            ReportBlock::Dlrr(b) => b.marshal_size(),
            ReportBlock::StatisticsSummary(b) => b.marshal_size(),
            ReportBlock::VoipMetrics(b) => b.marshal_size(),
            ReportBlock::Unknown(b) => b.marshal_size(),
        }
    }
}

impl Marshal for ReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            ReportBlock::LossRle(b) => b.marshal_block(BlockType::LossRle, buf),
            ReportBlock::DuplicateRle(b) => b.marshal_block(BlockType::DuplicateRle, buf),
            ReportBlock::PacketReceiptTimes(b) => b.marshal_to(buf),
            ReportBlock::ReceiverReferenceTime(b) => b.marshal_to(buf),
            ReportBlock::Dlrr(b) => b.marshal_to(buf),
            ReportBlock::StatisticsSummary(b) => b.marshal_to(buf),
            ReportBlock::VoipMetrics(b) => b.marshal_to(buf),
            ReportBlock::Unknown(b) => b.marshal_to(buf),
        }
    }
}

/// ExtendedReport (RFC 3611, PT=207) carries a list of typed report blocks
/// after the sender ssrc. Blocks of unassigned types are kept as
/// [`UnknownReportBlock`].
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|reserved |   PT=XR=207   |             length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              ssrc                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                         report blocks                         :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ExtendedReport {
    pub sender_ssrc: u32,
    pub reports: Vec<ReportBlock>,
}

impl fmt::Display for ExtendedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedReport from {:x}", self.sender_ssrc)?;
        for report in &self.reports {
            write!(f, " {report}")?;
        }
        Ok(())
    }
}

impl Packet for ExtendedReport {
    fn header(&self) -> Header {
        packet_header(PacketType::ExtendedReport, 0, self.raw_size())
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports
            .iter()
            .flat_map(|r| r.destination_ssrc())
            .collect()
    }

    /// Blocks are whole words, so this is always aligned.
    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SSRC_LENGTH
            + self.reports.iter().map(|r| r.marshal_size()).sum::<usize>()
    }
}

impl MarshalSize for ExtendedReport {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for ExtendedReport {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.marshal_size() / 4 - 1 > u16::MAX as usize {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            for report in &self.reports {
                put_marshal(buf, report)?;
            }
            Ok(())
        })
    }
}

impl Unmarshal for ExtendedReport {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) =
            unmarshal_body(raw_packet, PacketType::ExtendedReport, None, SSRC_LENGTH)?;

        let sender_ssrc = body.get_u32();
        let mut reports = vec![];
        while body.has_remaining() {
            let xr_header = XrHeader::unmarshal(&mut body.clone())?;
            if body.remaining() < xr_header.block_size() {
                return Err(Error::PacketTooShort.into());
            }

            let mut block = body.split_to(xr_header.block_size());
            reports.push(ReportBlock::unmarshal_block(&xr_header, &mut block)?);
        }

        Ok(ExtendedReport {
            sender_ssrc,
            reports,
        })
    }
}
