use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, Unmarshal};

use crate::error::Error;
use crate::header::{Header, PacketType, HEADER_LENGTH};

type Result<T> = std::result::Result<T, util::Error>;

const PADDING_MULTIPLE: usize = 4;

/// Returns the padding required to make the length a multiple of 4.
pub(crate) fn get_padding_size(len: usize) -> usize {
    (PADDING_MULTIPLE - (len % PADDING_MULTIPLE)) % PADDING_MULTIPLE
}

/// Writes RFC 3550 padding for a payload of `len` bytes: zero octets where
/// the last one holds the padding count.
pub(crate) fn put_padding(mut buf: &mut [u8], len: usize) {
    let padding_size = get_padding_size(len);
    for i in 0..padding_size {
        if i == padding_size - 1 {
            buf.put_u8(padding_size as u8);
        } else {
            buf.put_u8(0);
        }
    }
}

/// Wire size of a packet whose unpadded size is `raw_size`.
pub(crate) fn padded_size(raw_size: usize) -> usize {
    raw_size + get_padding_size(raw_size)
}

/// Header of a packet of `raw_size` unpadded bytes. The P bit is set when
/// the packet needs padding to reach a 32-bit boundary.
pub(crate) fn packet_header(packet_type: PacketType, count: u8, raw_size: usize) -> Header {
    Header {
        padding: get_padding_size(raw_size) != 0,
        count,
        packet_type,
        length: (padded_size(raw_size) / 4 - 1) as u16,
    }
}

/// Writes `h`, then the body, then the padding `h` announces.
/// Returns the number of bytes written.
pub(crate) fn marshal_packet<F>(
    h: &Header,
    raw_size: usize,
    mut buf: &mut [u8],
    put_body: F,
) -> Result<usize>
where
    F: FnOnce(&mut &mut [u8]) -> Result<()>,
{
    let size = padded_size(raw_size);
    if buf.remaining_mut() < size {
        return Err(Error::BufferTooShort.into());
    }

    let n = h.marshal_to(buf)?;
    buf = &mut buf[n..];
    put_body(&mut buf)?;

    if h.padding {
        put_padding(buf, raw_size);
    }

    Ok(size)
}

/// Marshals `item` at the front of `buf` and moves `buf` past it.
pub(crate) fn put_marshal<M: Marshal>(buf: &mut &mut [u8], item: &M) -> Result<()> {
    let rest = std::mem::take(buf);
    let n = item.marshal_to(rest)?;
    *buf = &mut rest[n..];
    Ok(())
}

/// [`unmarshal_header_and_body`] for packets whose body holds at least
/// `min_body` bytes.
pub(crate) fn unmarshal_body<B>(
    raw_packet: &mut B,
    packet_type: PacketType,
    format: Option<u8>,
    min_body: usize,
) -> Result<(Header, Bytes)>
where
    B: Buf,
{
    if raw_packet.remaining() < HEADER_LENGTH + min_body {
        return Err(Error::PacketTooShort.into());
    }

    let (header, body) = unmarshal_header_and_body(raw_packet, packet_type, format)?;
    if body.len() < min_body {
        return Err(Error::PacketTooShort.into());
    }

    Ok((header, body))
}

/// Reads one packet header plus its declared body.
///
/// The header must carry `packet_type` and, when given, the feedback
/// `format`. When the padding bit is set the trailing padding is stripped
/// from the returned body.
pub(crate) fn unmarshal_header_and_body<B>(
    raw_packet: &mut B,
    packet_type: PacketType,
    format: Option<u8>,
) -> Result<(Header, Bytes)>
where
    B: Buf,
{
    let header = Header::unmarshal(raw_packet)?;
    if header.packet_type != packet_type {
        return Err(Error::WrongType.into());
    }
    if let Some(format) = format {
        if header.count != format {
            return Err(Error::WrongType.into());
        }
    }

    let body_length = header.length as usize * 4;
    if raw_packet.remaining() < body_length {
        return Err(Error::PacketTooShort.into());
    }
    let mut body = raw_packet.copy_to_bytes(body_length);

    if header.padding {
        let padding_size = match body.last() {
            Some(&p) => p as usize,
            None => return Err(Error::WrongPadding.into()),
        };
        if padding_size == 0 || padding_size > body.len() {
            return Err(Error::WrongPadding.into());
        }
        body.truncate(body.len() - padding_size);
    }

    Ok((header, body))
}

/// Truncates `val` to `size` bits and sets them in `src` starting at bit
/// `start_index`, counted from the most significant bit.
pub(crate) fn set_nbits_of_uint16(src: u16, size: u16, start_index: u16, mut val: u16) -> Result<u16> {
    if start_index + size > 16 {
        return Err(Error::InvalidSizeOrStartIndex.into());
    }

    // truncate val to size bits
    val &= (1 << size) - 1;

    Ok(src | (val << (16 - size - start_index)))
}
