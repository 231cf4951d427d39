use super::*;

/// ReceiverReferenceTimeReportBlock lets a receiver that sends no SR
/// publish its wallclock, RFC 3611 section 4.4. Senders answer it with a
/// [`DlrrReportBlock`].
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=4      |   reserved    |       block length = 2        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |              NTP timestamp, most significant word             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             NTP timestamp, least significant word             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct ReceiverReferenceTimeReportBlock {
    pub ntp_timestamp: u64,
}

impl BlockBody for ReceiverReferenceTimeReportBlock {
    fn accepts(kind: BlockType) -> bool {
        kind == BlockType::ReceiverReferenceTime
    }

    fn body_size(&self) -> usize {
        8
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.ntp_timestamp);
    }

    fn get_body(_: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() != 8 {
            return Err(Error::PacketTooShort.into());
        }

        Ok(ReceiverReferenceTimeReportBlock {
            ntp_timestamp: body.get_u64(),
        })
    }
}

impl_block_codec!(
    ReceiverReferenceTimeReportBlock,
    BlockType::ReceiverReferenceTime
);
