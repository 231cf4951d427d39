use super::*;

/// ssrc, begin_seq and end_seq.
const PRT_FIXED_LENGTH: usize = 8;

/// PacketReceiptTimesReportBlock lists the arrival time of every packet in
/// `[begin_seq, end_seq)`, RFC 3611 section 4.3.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=3      | rsvd. |   t   |         block length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Receipt time of packet begin_seq                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                              ...                              :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Receipt time of packet (end_seq - 1) mod 65536          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct PacketReceiptTimesReportBlock {
    /// Thinning, 0..=15.
    pub t: u8,
    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    /// One RTP-clock timestamp per packet.
    pub receipt_time: Vec<u32>,
}

impl BlockBody for PacketReceiptTimesReportBlock {
    fn accepts(kind: BlockType) -> bool {
        kind == BlockType::PacketReceiptTimes
    }

    fn type_specific(&self) -> u8 {
        self.t & 0x0F
    }

    fn body_size(&self) -> usize {
        PRT_FIXED_LENGTH + 4 * self.receipt_time.len()
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.ssrc);
        buf.put_u16(self.begin_seq);
        buf.put_u16(self.end_seq);
        self.receipt_time.iter().for_each(|&at| buf.put_u32(at));
    }

    fn get_body(xr_header: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() < PRT_FIXED_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = body.get_u32();
        let begin_seq = body.get_u16();
        let end_seq = body.get_u16();
        let receipt_time = body.chunks_exact(4).map(|mut at| at.get_u32()).collect();

        Ok(PacketReceiptTimesReportBlock {
            t: xr_header.type_specific & 0x0F,
            ssrc,
            begin_seq,
            end_seq,
            receipt_time,
        })
    }
}

impl_block_codec!(PacketReceiptTimesReportBlock, BlockType::PacketReceiptTimes);
