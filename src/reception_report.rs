use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

type Result<T> = std::result::Result<T, util::Error>;

pub(crate) const RECEPTION_REPORT_LENGTH: usize = 24;

/// total_lost is carried in 24 bits.
pub(crate) const MAX_TOTAL_LOST: u32 = (1 << 24) - 1;

/// Reception statistics for one source, as carried by sender and receiver
/// reports (RFC 3550 section 6.4.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// |                              SSRC                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | fraction lost |       cumulative number of packets lost       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           extended highest sequence number received           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      interarrival jitter                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         last SR (LSR)                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   delay since last SR (DLSR)                  |
/// +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceptionReport {
    /// Source the statistics describe.
    pub ssrc: u32,
    /// Loss since the previous report, in 1/256ths.
    pub fraction_lost: u8,
    /// Cumulative loss; marshalling fails above [`MAX_TOTAL_LOST`].
    pub total_lost: u32,
    /// Cycle count in the high 16 bits, highest sequence number in the low 16.
    pub last_sequence_number: u32,
    /// In RTP timestamp units.
    pub jitter: u32,
    /// Middle 32 bits of the NTP time of the last SenderReport, or 0.
    pub last_sender_report: u32,
    /// Since that SenderReport, in 1/65536 seconds.
    pub delay: u32,
}

impl fmt::Display for ReceptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ssrc={:x} lost={}/256 total={} seq={} jitter={}]",
            self.ssrc, self.fraction_lost, self.total_lost, self.last_sequence_number, self.jitter
        )
    }
}

impl MarshalSize for ReceptionReport {
    fn marshal_size(&self) -> usize {
        RECEPTION_REPORT_LENGTH
    }
}

impl Marshal for ReceptionReport {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.total_lost > MAX_TOTAL_LOST {
            return Err(Error::InvalidTotalLost.into());
        }
        if buf.remaining_mut() < RECEPTION_REPORT_LENGTH {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u32(self.ssrc);
        buf.put_u32(u32::from(self.fraction_lost) << 24 | self.total_lost);
        for word in [
            self.last_sequence_number,
            self.jitter,
            self.last_sender_report,
            self.delay,
        ] {
            buf.put_u32(word);
        }

        Ok(RECEPTION_REPORT_LENGTH)
    }
}

impl Unmarshal for ReceptionReport {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < RECEPTION_REPORT_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = raw_packet.get_u32();
        let loss = raw_packet.get_u32();

        Ok(ReceptionReport {
            ssrc,
            fraction_lost: (loss >> 24) as u8,
            total_lost: loss & MAX_TOTAL_LOST,
            last_sequence_number: raw_packet.get_u32(),
            jitter: raw_packet.get_u32(),
            last_sender_report: raw_packet.get_u32(),
            delay: raw_packet.get_u32(),
        })
    }
}
