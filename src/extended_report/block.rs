use super::*;

/// Body layout of one kind of report block. The 4-byte block header, the
/// length bookkeeping and the buffer checks are shared by every kind and
/// live in [`write_block`] and [`read_block`].
pub(crate) trait BlockBody: Sized {
    /// Whether a block header of this kind may be decoded as `Self`.
    fn accepts(kind: BlockType) -> bool;

    fn type_specific(&self) -> u8 {
        0
    }

    /// Body length in bytes, always a multiple of 4.
    fn body_size(&self) -> usize;

    fn put_body<B: BufMut>(&self, buf: &mut B);

    /// `body` holds exactly the bytes announced by the block header.
    fn get_body(xr_header: &XrHeader, body: &mut Bytes) -> Result<Self>;

    fn xr_header(&self, block_type: u8) -> XrHeader {
        XrHeader {
            block_type,
            type_specific: self.type_specific(),
            block_length: (self.body_size() / 4) as u16,
        }
    }
}

pub(crate) fn write_block<T: BlockBody>(block: &T, block_type: u8, mut buf: &mut [u8]) -> Result<usize> {
    let body_size = block.body_size();
    if body_size / 4 > u16::MAX as usize {
        return Err(Error::TooManyReports.into());
    }

    let size = XR_HEADER_LENGTH + body_size;
    if buf.remaining_mut() < size {
        return Err(Error::BufferTooShort.into());
    }

    let n = block.xr_header(block_type).marshal_to(buf)?;
    buf = &mut buf[n..];
    block.put_body(&mut buf);

    Ok(size)
}

pub(crate) fn read_block<T, B>(raw_packet: &mut B) -> Result<T>
where
    T: BlockBody,
    B: Buf,
{
    let xr_header = XrHeader::unmarshal(raw_packet)?;
    if !T::accepts(xr_header.kind()) {
        return Err(Error::WrongType.into());
    }

    let body_length = xr_header.block_length as usize * 4;
    if raw_packet.remaining() < body_length {
        return Err(Error::PacketTooShort.into());
    }

    let mut body = raw_packet.copy_to_bytes(body_length);
    T::get_body(&xr_header, &mut body)
}

/// Implements the marshal traits of a report block on top of its
/// [`BlockBody`]. With a block type, `Marshal` is derived as well.
macro_rules! impl_block_codec {
    ($block:ty) => {
        impl MarshalSize for $block {
            fn marshal_size(&self) -> usize {
                XR_HEADER_LENGTH + self.body_size()
            }
        }

        impl Unmarshal for $block {
            fn unmarshal<B>(raw_packet: &mut B) -> Result<Self>
            where
                Self: Sized,
                B: Buf,
            {
                read_block(raw_packet)
            }
        }
    };
    ($block:ty, $block_type:expr) => {
        impl_block_codec!($block);

        impl Marshal for $block {
            fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
                write_block(self, $block_type as u8, buf)
            }
        }
    };
}
