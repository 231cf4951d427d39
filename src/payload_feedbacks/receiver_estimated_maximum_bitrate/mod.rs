
use std::fmt;

use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// ReceiverEstimatedMaximumBitrate (draft-alvestrand-rmcat-remb, FMT=15)
/// carries the bandwidth a receiver estimates for the listed streams.
/// The media ssrc field is always zero.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P| FMT=15  |   PT=206      |             length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of packet sender                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  SSRC of media source = 0                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Unique identifier 'R' 'E' 'M' 'B'                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Num SSRC     | BR Exp    |  BR Mantissa                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   SSRC feedback                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  ...                                                          |
/// ```
#[derive(Debug, PartialEq, Default, Clone)]
pub struct ReceiverEstimatedMaximumBitrate {
    pub sender_ssrc: u32,
    /// Bits per second.
    pub bitrate: f32,
    pub ssrcs: Vec<u32>,
}

/// sender ssrc, media ssrc, identifier, count and bitrate word
const REMB_FIXED_LENGTH: usize = 16;

const UNIQUE_IDENTIFIER: &[u8; 4] = b"REMB";
const BIT_UNITS: [&str; 7] = ["b", "Kb", "Mb", "Gb", "Tb", "Pb", "Eb"];

const MANTISSA_BITS: u32 = 18;
const MANTISSA_MASK: u32 = (1 << MANTISSA_BITS) - 1;
const EXP_MAX: u32 = (1 << 6) - 1;
/// 0x3FFFF * 2^63
const BITRATE_MAX: f32 = 2.417_842_4e24;

impl fmt::Display for ReceiverEstimatedMaximumBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled = self.bitrate;
        let mut unit = 0;
        while scaled >= 1000.0 && unit + 1 < BIT_UNITS.len() {
            scaled /= 1000.0;
            unit += 1;
        }

        write!(
            f,
            "ReceiverEstimatedMaximumBitrate from {:x} {:.2} {}/s",
            self.sender_ssrc, scaled, BIT_UNITS[unit],
        )
    }
}

impl Packet for ReceiverEstimatedMaximumBitrate {
    fn header(&self) -> Header {
        packet_header(
            PacketType::PayloadSpecificFeedback,
            FORMAT_REMB,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.ssrcs.clone()
    }

    fn raw_size(&self) -> usize {
        HEADER_LENGTH + REMB_FIXED_LENGTH + SSRC_LENGTH * self.ssrcs.len()
    }
}

impl MarshalSize for ReceiverEstimatedMaximumBitrate {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for ReceiverEstimatedMaximumBitrate {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.ssrcs.len() > u8::MAX as usize {
            return Err(Error::TooManyReports.into());
        }
        let (exp, mantissa) = encode_bitrate(self.bitrate)?;

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            buf.put_u32(self.sender_ssrc);
            buf.put_u32(0);
            buf.put_slice(UNIQUE_IDENTIFIER);
            buf.put_u8(self.ssrcs.len() as u8);
            // 6 bit exponent then 18 bit mantissa in the low 24 bits
            let word = (exp << MANTISSA_BITS) | mantissa;
            buf.put_slice(&word.to_be_bytes()[1..]);
            for &ssrc in &self.ssrcs {
                buf.put_u32(ssrc);
            }
            Ok(())
        })
    }
}

/// Splits a bitrate into exponent and mantissa with the mantissa rounded
/// down. Bitrates past the largest encodable value saturate.
fn encode_bitrate(bitrate: f32) -> Result<(u32, u32)> {
    if bitrate.is_nan() || bitrate < 0.0 {
        return Err(Error::InvalidBitrate.into());
    }

    let mut mantissa = bitrate.min(BITRATE_MAX);
    let mut exp = 0;
    while mantissa >= (1 << MANTISSA_BITS) as f32 {
        mantissa /= 2.0;
        exp += 1;
    }
    if exp > EXP_MAX {
        return Err(Error::InvalidBitrate.into());
    }

    Ok((exp, mantissa as u32))
}

fn decode_bitrate(word: u32) -> f32 {
    let exp = (word >> MANTISSA_BITS) & EXP_MAX;
    // exact while the mantissa fits in f32's 24 bit significand
    (word & MANTISSA_MASK) as f32 * 2f32.powi(exp as i32)
}

impl Unmarshal for ReceiverEstimatedMaximumBitrate {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (_, mut body) = unmarshal_body(
            raw_packet,
            PacketType::PayloadSpecificFeedback,
            Some(FORMAT_REMB),
            REMB_FIXED_LENGTH,
        )?;

        let sender_ssrc = body.get_u32();
        if body.get_u32() != 0 {
            return Err(Error::SsrcMustBeZero.into());
        }
        if !body.starts_with(UNIQUE_IDENTIFIER) {
            return Err(Error::MissingRembIdentifier.into());
        }
        body.advance(UNIQUE_IDENTIFIER.len());

        let word = body.get_u32();
        let num_ssrc = (word >> 24) as usize;
        let bitrate = decode_bitrate(word);

        if body.len() < num_ssrc * SSRC_LENGTH {
            return Err(Error::PacketTooShort.into());
        }
        let ssrcs = (0..num_ssrc).map(|_| body.get_u32()).collect();

        Ok(ReceiverEstimatedMaximumBitrate {
            sender_ssrc,
            bitrate,
            ssrcs,
        })
    }
}
