
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::*;

type Result<T> = std::result::Result<T, util::Error>;

/// item type and octet count
const SDES_ITEM_HEADER_LENGTH: usize = 2;

/// SDES item types from the IANA RTP parameters registry.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdesType {
    /// Terminates a chunk's item list; never encoded as an item.
    #[default]
    SdesEnd,
    SdesCname,
    SdesName,
    SdesEmail,
    SdesPhone,
    SdesLocation,
    SdesTool,
    SdesNote,
    SdesPrivate,
    /// Unregistered item types, kept so they re-encode unchanged.
    Unknown(u8),
}

const SDES_TYPE_NAMES: [(SdesType, u8, &str); 9] = [
    (SdesType::SdesEnd, 0, "END"),
    (SdesType::SdesCname, 1, "CNAME"),
    (SdesType::SdesName, 2, "NAME"),
    (SdesType::SdesEmail, 3, "EMAIL"),
    (SdesType::SdesPhone, 4, "PHONE"),
    (SdesType::SdesLocation, 5, "LOC"),
    (SdesType::SdesTool, 6, "TOOL"),
    (SdesType::SdesNote, 7, "NOTE"),
    (SdesType::SdesPrivate, 8, "PRIV"),
];

impl fmt::Display for SdesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SDES_TYPE_NAMES.iter().find(|(t, _, _)| t == self) {
            Some((_, _, name)) => write!(f, "{name}"),
            None => write!(f, "SDES{}", u8::from(*self)),
        }
    }
}

impl From<u8> for SdesType {
    fn from(b: u8) -> Self {
        SDES_TYPE_NAMES
            .iter()
            .find(|(_, v, _)| *v == b)
            .map_or(SdesType::Unknown(b), |(t, _, _)| *t)
    }
}

impl From<SdesType> for u8 {
    fn from(t: SdesType) -> Self {
        match t {
            SdesType::Unknown(b) => b,
            known => SDES_TYPE_NAMES
                .iter()
                .find(|(k, _, _)| *k == known)
                .map_or(0, |(_, v, _)| *v),
        }
    }
}

/// The items describing one source.
///
/// ```text
///  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
///  |                          SSRC/CSRC_1                          |
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  |                           SDES items                          |
///  |                              ...                              |
///  +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// ```
///
/// The item list ends with a null octet followed by null octets up to
/// the next 32-bit boundary.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SourceDescriptionChunk {
    pub source: u32,
    pub items: Vec<SourceDescriptionItem>,
}

impl SourceDescriptionChunk {
    /// Size up to and including the END octet.
    fn raw_size(&self) -> usize {
        SSRC_LENGTH
            + self
                .items
                .iter()
                .map(|item| item.marshal_size())
                .sum::<usize>()
            + 1
    }
}

impl MarshalSize for SourceDescriptionChunk {
    fn marshal_size(&self) -> usize {
        padded_size(self.raw_size())
    }
}

impl Marshal for SourceDescriptionChunk {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.remaining_mut() < size {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u32(self.source);
        for item in &self.items {
            put_marshal(&mut buf, item)?;
        }
        buf.put_bytes(0, size - self.raw_size() + 1);

        Ok(size)
    }
}

impl Unmarshal for SourceDescriptionChunk {
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if raw_packet.remaining() < SSRC_LENGTH + 1 {
            return Err(Error::PacketTooShort.into());
        }

        let source = raw_packet.get_u32();
        let mut consumed = SSRC_LENGTH;
        let mut items = vec![];

        while raw_packet.has_remaining() {
            let item = SourceDescriptionItem::unmarshal(raw_packet)?;
            if item.sdes_type == SdesType::SdesEnd {
                // skip the null octets after END
                let fill = get_padding_size(consumed + 1);
                if raw_packet.remaining() < fill {
                    return Err(Error::PacketTooShort.into());
                }
                raw_packet.advance(fill);
                return Ok(SourceDescriptionChunk { source, items });
            }
            consumed += item.marshal_size();
            items.push(item);
        }

        // ran out of bytes before END
        Err(Error::PacketTooShort.into())
    }
}

/// One typed text item of a chunk.
///
/// ```text
///   0                   1                   2                   3
///   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///  |    CNAME=1    |     length    | user and domain name        ...
///  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SourceDescriptionItem {
    pub sdes_type: SdesType,
    /// UTF-8 by convention, kept as raw octets; at most 255.
    pub text: Bytes,
}

impl MarshalSize for SourceDescriptionItem {
    fn marshal_size(&self) -> usize {
        SDES_ITEM_HEADER_LENGTH + self.text.len()
    }
}

impl Marshal for SourceDescriptionItem {
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize> {
        if self.sdes_type == SdesType::SdesEnd {
            return Err(Error::SdesMissingType.into());
        }
        if self.text.len() > SDES_MAX_OCTET_COUNT {
            return Err(Error::SdesTextTooLong.into());
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        buf.put_u8(self.sdes_type.into());
        buf.put_u8(self.text.len() as u8);
        buf.put_slice(&self.text);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for SourceDescriptionItem {
    /// Reads one item. An END octet yields an `SdesEnd` item with no text
    /// and consumes only that octet.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if !raw_packet.has_remaining() {
            return Err(Error::PacketTooShort.into());
        }

        let sdes_type = SdesType::from(raw_packet.get_u8());
        if sdes_type == SdesType::SdesEnd {
            return Ok(SourceDescriptionItem::default());
        }

        if !raw_packet.has_remaining() {
            return Err(Error::PacketTooShort.into());
        }
        let octet_count = raw_packet.get_u8() as usize;
        if raw_packet.remaining() < octet_count {
            return Err(Error::PacketTooShort.into());
        }

        Ok(SourceDescriptionItem {
            sdes_type,
            text: raw_packet.copy_to_bytes(octet_count),
        })
    }
}

/// SourceDescription (SDES, RFC 3550 section 6.5) names the sources of a
/// session.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// header |V=2|P|    SC   |  PT=SDES=202  |             length            |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// chunk  |                          SSRC/CSRC_1                          |
///   1    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                           SDES items                          |
///        |                              ...                              |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// chunk  |                          SSRC/CSRC_2                          |
///   2    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                           SDES items                          |
///        |                              ...                              |
///        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct SourceDescription {
    /// At most 31.
    pub chunks: Vec<SourceDescriptionChunk>,
}

impl SourceDescription {
    /// The first CNAME item carried for `source`.
    pub fn cname(&self, source: u32) -> Option<&Bytes> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.source == source)
            .flat_map(|chunk| &chunk.items)
            .find(|item| item.sdes_type == SdesType::SdesCname)
            .map(|item| &item.text)
    }
}

impl fmt::Display for SourceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceDescription")?;
        for chunk in &self.chunks {
            write!(f, " [{:x}", chunk.source)?;
            for item in &chunk.items {
                write!(
                    f,
                    " {}={:?}",
                    item.sdes_type,
                    String::from_utf8_lossy(&item.text)
                )?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Packet for SourceDescription {
    fn header(&self) -> Header {
        packet_header(
            PacketType::SourceDescription,
            self.chunks.len() as u8,
            self.raw_size(),
        )
    }

    fn destination_ssrc(&self) -> Vec<u32> {
        self.chunks.iter().map(|chunk| chunk.source).collect()
    }

    /// Chunks are null-padded to 32 bits, so this is always aligned.
    fn raw_size(&self) -> usize {
        HEADER_LENGTH
            + self
                .chunks
                .iter()
                .map(|chunk| chunk.marshal_size())
                .sum::<usize>()
    }
}

impl MarshalSize for SourceDescription {
    fn marshal_size(&self) -> usize {
        self.raw_size()
    }
}

impl Marshal for SourceDescription {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.chunks.len() > COUNT_MAX {
            return Err(Error::TooManyChunks.into());
        }

        marshal_packet(&self.header(), self.raw_size(), buf, |buf| {
            for chunk in &self.chunks {
                put_marshal(buf, chunk)?;
            }
            Ok(())
        })
    }
}

impl Unmarshal for SourceDescription {
    /// Decodes chunks until the body is used up; their number must match
    /// the header's source count.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let (header, mut body) =
            unmarshal_body(raw_packet, PacketType::SourceDescription, None, 0)?;

        let mut chunks = Vec::with_capacity(header.count as usize);
        while body.has_remaining() {
            chunks.push(SourceDescriptionChunk::unmarshal(&mut body)?);
        }
        if chunks.len() != header.count as usize {
            return Err(Error::InvalidHeader.into());
        }

        Ok(SourceDescription { chunks })
    }
}
