use super::*;

const DLRR_REPORT_LENGTH: usize = 12;

/// DlrrReport is one sub-block of a DLRR report block.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct DlrrReport {
    pub ssrc: u32,
    /// Middle 32 bits of the NTP timestamp of the last RRT block from `ssrc`.
    pub last_rr: u32,
    /// Delay since that RRT block, in units of 1/65536 seconds.
    pub dlrr: u32,
}

impl fmt::Display for DlrrReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DLRR ssrc={:x} last_rr={:#x} delay={}]",
            self.ssrc, self.last_rr, self.dlrr
        )
    }
}

/// DlrrReportBlock encodes a DLRR Report Block as described in
/// RFC 3611 section 4.5.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=5      |   reserved    |         block length          |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                 SSRC_1 (ssrc of first receiver)               | sub-
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+ block
/// |                         last RR (LRR)                         |   1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   delay since last RR (DLRR)                  |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                 SSRC_2 (ssrc of second receiver)              | sub-
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+ block
/// :                               ...                             :   2
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct DlrrReportBlock {
    pub reports: Vec<DlrrReport>,
}

impl BlockBody for DlrrReportBlock {
    fn accepts(kind: BlockType) -> bool {
        kind == BlockType::Dlrr
    }

    fn body_size(&self) -> usize {
        self.reports.len() * DLRR_REPORT_LENGTH
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        for rep in &self.reports {
            buf.put_u32(rep.ssrc);
            buf.put_u32(rep.last_rr);
            buf.put_u32(rep.dlrr);
        }
    }

    fn get_body(_: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() % DLRR_REPORT_LENGTH != 0 {
            return Err(Error::PacketTooShort.into());
        }

        let reports = body
            .chunks_exact(DLRR_REPORT_LENGTH)
            .map(|mut sub_block| DlrrReport {
                ssrc: sub_block.get_u32(),
                last_rr: sub_block.get_u32(),
                dlrr: sub_block.get_u32(),
            })
            .collect();

        Ok(DlrrReportBlock { reports })
    }
}

impl_block_codec!(DlrrReportBlock, BlockType::Dlrr);
