#[cfg(test)]
mod receiver_report_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::reception_report::*;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// ReceiverReport (RFC 3550 section 6.4.2) carries reception statistics
/// from a participant that is not sending media.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    RC   |   PT=RR=201   |             length            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                     SSRC of packet sender                     |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// report |                 SSRC_1 (SSRC of first source)                 |
/// block  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///   1    :                               ...                             :
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///        |                  profile-specific extensions                  |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct ReceiverReport {
    pub ssrc: u32,
    /// At most 31, one per source heard since the last report.
    pub reports: Vec<ReceptionReport>,
    /// Whatever follows the report blocks, kept as is.
    pub profile_extensions: Bytes,
}

impl fmt::Display for ReceiverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverReport from {:x}", self.ssrc)?;
        for report in &self.reports {
            write!(f, " {report}")?;
        }
        if !self.profile_extensions.is_empty() {
            write!(f, " ext={:02x?}", &self.profile_extensions[..])?;
        }
        Ok(())
    }
}

impl Packet for ReceiverReport {
    fn header(&self) -> Header {
        packet_header(
            PacketType::ReceiverReport,
            self.reports.len() as u8,
            self.raw_size(),
        )
    }

    /// The sources the report blocks describe.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|report| report.ssrc).collect()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + SSRC_LENGTH
            + RECEPTION_REPORT_LENGTH * self.reports.len()
            + self.profile_extensions.len()
    }
}

impl MarshalSize for ReceiverReport {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for ReceiverReport {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.ssrc);
            for report in &self.reports {
                put_marshal(buf, report)?;
            }
            buf.put_slice(&self.profile_extensions);
            Ok(())
        })
    }
}

impl Unmarshal for ReceiverReport {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (header, mut body) =
            unmarshal_body(raw_packet, PacketType::ReceiverReport, None, SSRC_LENGTH)?;
        if body.len() < SSRC_LENGTH + RECEPTION_REPORT_LENGTH * header.count as usize {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = body.get_u32();
        let reports = (0..header.count)
            .map(|_| ReceptionReport::unmarshal(&mut body))
            .collect::<Result<Vec<_>>>()?;

        Ok(ReceiverReport {
            ssrc,
            reports,
            profile_extensions: body,
        })
    }
}
