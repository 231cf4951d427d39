use super::*;

const SSR_BODY_LENGTH: usize = 36;

const SSR_LOSS_FLAG: u8 = 0x80;
const SSR_DUPLICATE_FLAG: u8 = 0x40;
const SSR_JITTER_FLAG: u8 = 0x20;
const SSR_TOH_SHIFT: u8 = 3;

/// StatisticsSummaryReportBlock summarizes loss, duplication, jitter and
/// TTL over a sequence range, RFC 3611 section 4.6. The L, D and J flags
/// tell which of the summaries are meaningful.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=6      |L|D|J|ToH|rsvd.|       block length = 9        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        lost_packets           |         dup_packets           |
/// :   (32 bits each) followed by min, max, mean and dev jitter    :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | min_ttl_or_hl | max_ttl_or_hl |mean_ttl_or_hl | dev_ttl_or_hl |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct StatisticsSummaryReportBlock {
    pub loss_reports: bool,
    pub duplicate_reports: bool,
    pub jitter_reports: bool,
    pub ttl_or_hop_limit: TtlOrHopLimitType,

    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    pub lost_packets: u32,
    pub dup_packets: u32,
    pub min_jitter: u32,
    pub max_jitter: u32,
    pub mean_jitter: u32,
    pub dev_jitter: u32,
    pub min_ttl_or_hl: u8,
    pub max_ttl_or_hl: u8,
    pub mean_ttl_or_hl: u8,
    pub dev_ttl_or_hl: u8,
}

/// What the TTL/hop-limit summary of a [`StatisticsSummaryReportBlock`]
/// was measured on. The reserved wire value 3 reads as `Missing`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum TtlOrHopLimitType {
    #[default]
    Missing = 0,
    Ipv4 = 1,
    Ipv6 = 2,
}

impl From<u8> for TtlOrHopLimitType {
    fn from(v: u8) -> Self {
        match v {
            1 => TtlOrHopLimitType::Ipv4,
            2 => TtlOrHopLimitType::Ipv6,
            _ => TtlOrHopLimitType::Missing,
        }
    }
}

impl fmt::Display for TtlOrHopLimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtlOrHopLimitType::Missing => write!(f, "no TTL"),
            TtlOrHopLimitType::Ipv4 => write!(f, "IPv4 TTL"),
            TtlOrHopLimitType::Ipv6 => write!(f, "IPv6 hop limit"),
        }
    }
}

impl BlockBody for StatisticsSummaryReportBlock {
    fn accepts(kind: BlockType) -> bool {
        kind == BlockType::StatisticsSummary
    }

    fn type_specific(&self) -> u8 {
        let flag = |set: bool, bit: u8| if set { bit } else { 0 };

        flag(self.loss_reports, SSR_LOSS_FLAG)
            | flag(self.duplicate_reports, SSR_DUPLICATE_FLAG)
            | flag(self.jitter_reports, SSR_JITTER_FLAG)
            | (self.ttl_or_hop_limit as u8) << SSR_TOH_SHIFT
    }

    fn body_size(&self) -> usize {
        SSR_BODY_LENGTH
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.ssrc);
        buf.put_u16(self.begin_seq);
        buf.put_u16(self.end_seq);
        for v in [
            self.lost_packets,
            self.dup_packets,
            self.min_jitter,
            self.max_jitter,
            self.mean_jitter,
            self.dev_jitter,
        ] {
            buf.put_u32(v);
        }
        buf.put_slice(&[
            self.min_ttl_or_hl,
            self.max_ttl_or_hl,
            self.mean_ttl_or_hl,
            self.dev_ttl_or_hl,
        ]);
    }

    fn get_body(xr_header: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() != SSR_BODY_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let flags = xr_header.type_specific;
        Ok(StatisticsSummaryReportBlock {
            loss_reports: flags & SSR_LOSS_FLAG != 0,
            duplicate_reports: flags & SSR_DUPLICATE_FLAG != 0,
            jitter_reports: flags & SSR_JITTER_FLAG != 0,
            ttl_or_hop_limit: ((flags >> SSR_TOH_SHIFT) & 0x03).into(),

            ssrc: body.get_u32(),
            begin_seq: body.get_u16(),
            end_seq: body.get_u16(),
            lost_packets: body.get_u32(),
            dup_packets: body.get_u32(),
            min_jitter: body.get_u32(),
            max_jitter: body.get_u32(),
            mean_jitter: body.get_u32(),
            dev_jitter: body.get_u32(),
            min_ttl_or_hl: body.get_u8(),
            max_ttl_or_hl: body.get_u8(),
            mean_ttl_or_hl: body.get_u8(),
            dev_ttl_or_hl: body.get_u8(),
        })
    }
}

impl_block_codec!(StatisticsSummaryReportBlock, BlockType::StatisticsSummary);
