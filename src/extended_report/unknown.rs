use super::*;

/// UnknownReportBlock keeps a report block of a type this crate does not
/// model. The type and type-specific octets are kept so the block
/// re-encodes unchanged.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct UnknownReportBlock {
    pub block_type: u8,
    pub type_specific: u8,
    /// Block body after the 4-byte block header.
    pub bytes: Bytes,
}

impl BlockBody for UnknownReportBlock {
    fn accepts(_: BlockType) -> bool {
        true
    }

    fn type_specific(&self) -> u8 {
        self.type_specific
    }

    fn body_size(&self) -> usize {
        self.bytes.len() + get_padding_size(self.bytes.len())
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.bytes);
        buf.put_bytes(0, get_padding_size(self.bytes.len()));
    }

    fn get_body(xr_header: &XrHeader, body: &mut Bytes) -> Result<Self> {
        Ok(UnknownReportBlock {
            block_type: xr_header.block_type,
            type_specific: xr_header.type_specific,
            bytes: body.split_off(0),
        })
    }
}

impl_block_codec!(UnknownReportBlock);

impl Marshal for UnknownReportBlock {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        write_block(self, self.block_type, buf)
    }
}
