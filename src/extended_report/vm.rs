use super::*;

const VM_BODY_LENGTH: usize = 32;

/// VoipMetricsReportBlock carries call-quality metrics for a voice
/// stream, RFC 3611 section 4.7.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     BT=7      |   reserved    |       block length = 8        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   loss rate   | discard rate  | burst density |  gap density  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       burst duration          |         gap duration          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     round trip delay          |       end system delay        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | signal level  |  noise level  |     RERL      |     Gmin      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   R factor    | ext. R factor |    MOS-LQ     |    MOS-CQ     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   RX config   |   reserved    |          JB nominal           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          JB maximum           |          JB abs max           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct VoipMetricsReportBlock {
    pub ssrc: u32,
    pub loss_rate: u8,
    pub discard_rate: u8,
    pub burst_density: u8,
    pub gap_density: u8,
    pub burst_duration: u16,
    pub gap_duration: u16,
    pub round_trip_delay: u16,
    pub end_system_delay: u16,
    pub signal_level: u8,
    pub noise_level: u8,
    pub rerl: u8,
    pub gmin: u8,
    pub rfactor: u8,
    pub ext_rfactor: u8,
    pub mos_lq: u8,
    pub mos_cq: u8,
    pub rx_config: u8,
    pub reserved: u8,
    pub jb_nominal: u16,
    pub jb_maximum: u16,
    pub jb_abs_max: u16,
}

impl BlockBody for VoipMetricsReportBlock {
    fn accepts(kind: BlockType) -> bool {
        kind == BlockType::VoipMetrics
    }

    fn body_size(&self) -> usize {
        VM_BODY_LENGTH
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.ssrc);
        buf.put_slice(&[
            self.loss_rate,
            self.discard_rate,
            self.burst_density,
            self.gap_density,
        ]);
        for v in [
            self.burst_duration,
            self.gap_duration,
            self.round_trip_delay,
            self.end_system_delay,
        ] {
            buf.put_u16(v);
        }
        buf.put_slice(&[
            self.signal_level,
            self.noise_level,
            self.rerl,
            self.gmin,
            self.rfactor,
            self.ext_rfactor,
            self.mos_lq,
            self.mos_cq,
            self.rx_config,
            self.reserved,
        ]);
        for v in [self.jb_nominal, self.jb_maximum, self.jb_abs_max] {
            buf.put_u16(v);
        }
    }

    fn get_body(_: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() != VM_BODY_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        Ok(VoipMetricsReportBlock {
            ssrc: body.get_u32(),
            loss_rate: body.get_u8(),
            discard_rate: body.get_u8(),
            burst_density: body.get_u8(),
            gap_density: body.get_u8(),
            burst_duration: body.get_u16(),
            gap_duration: body.get_u16(),
            round_trip_delay: body.get_u16(),
            end_system_delay: body.get_u16(),
            signal_level: body.get_u8(),
            noise_level: body.get_u8(),
            rerl: body.get_u8(),
            gmin: body.get_u8(),
            rfactor: body.get_u8(),
            ext_rfactor: body.get_u8(),
            mos_lq: body.get_u8(),
            mos_cq: body.get_u8(),
            rx_config: body.get_u8(),
            reserved: body.get_u8(),
            jb_nominal: body.get_u16(),
            jb_maximum: body.get_u16(),
            jb_abs_max: body.get_u16(),
        })
    }
}

impl_block_codec!(VoipMetricsReportBlock, BlockType::VoipMetrics);
