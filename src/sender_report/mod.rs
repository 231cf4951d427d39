
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::reception_report::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// ssrc, ntp time, rtp time, packet count and octet count
pub(crate) const SR_HEADER_LENGTH: usize = 24;

/// SenderReport (RFC 3550 section 6.4.1) carries transmission statistics
/// from an active sender plus reception statistics for the sources it hears.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    RC   |   PT=SR=200   |             length            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         SSRC of sender                        |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// sender |              NTP timestamp, most significant word             |
/// info   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |             NTP timestamp, least significant word             |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         RTP timestamp                         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                     sender's packet count                     |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                      sender's octet count                     |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_1 (SSRC of first source)                 |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   1    :                               ...                             :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///        |                  profile-specific extensions                  |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SenderReport {
    pub ssrc: u32,
    /// 64 bit NTP wallclock time the report was sent at.
    pub ntp_time: u64,
    /// `ntp_time` on the media clock of the stream.
    pub rtp_time: u32,
    pub packet_count: u32,
    /// Payload octets only.
    pub octet_count: u32,
    /// At most 31.
    pub reports: Vec<ReceptionReport>,
    pub profile_extensions: Bytes,
}

impl fmt::Display for SenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SenderReport from {:x} ntp={:#018x} rtp={} packets={} octets={}",
            self.ssrc, self.ntp_time, self.rtp_time, self.packet_count, self.octet_count
        )?;
        for report in &self.reports {
            write!(f, " {report}")?;
        }
        if !self.profile_extensions.is_empty() {
            write!(f, " ext={:02x?}", &self.profile_extensions[..])?;
        }
        Ok(())
    }
}

impl Packet for SenderReport {
    fn header(&self) -> Header {
        packet_header(
            PacketType::SenderReport,
            self.reports.len() as u8,
            self.raw_size(),
        )
    }

    /// The reported sources, then the sender itself.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports
            .iter()
            .map(|report| report.ssrc)
            .chain(std::iter::once(self.ssrc))
            .collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SR_HEADER_LENGTH
            + RECEPTION_REPORT_LENGTH * self.reports.len()
            + self.profile_extensions.len()
    }
}

impl MarshalSize for SenderReport {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for SenderReport {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.ssrc);
            buf.put_u64(self.ntp_time);
            buf.put_u32(self.rtp_time);
            buf.put_u32(self.packet_count);
            buf.put_u32(self.octet_count);
            for report in &self.reports {
                put_marshal(buf, report)?;
            }
            buf.put_slice(&self.profile_extensions);
            Ok(())
        })
    }
}

impl Unmarshal for SenderReport {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (header, mut body) =
            unmarshal_body(raw_packet, PacketType::SenderReport, None, SR_HEADER_LENGTH)?;
        if body.len() < SR_HEADER_LENGTH + RECEPTION_REPORT_LENGTH * header.count as usize {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = body.get_u32();
        let ntp_time = body.get_u64();
        let rtp_time = body.get_u32();
        let packet_count = body.get_u32();
        let octet_count = body.get_u32();
        let reports = (0..header.count)
            .map(|_| ReceptionReport::unmarshal(&mut body))
            .collect::<Result<Vec<_>>>()?;

        Ok(SenderReport {
            ssrc,
            ntp_time,
            rtp_time,
            packet_count,
            octet_count,
            reports,
            profile_extensions: body,
        })
    }
}
