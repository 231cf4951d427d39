use super::*;

/// ssrc, begin_seq and end_seq.
const RLE_FIXED_LENGTH: usize = 8;

/// Kind of a 16-bit RLE chunk, picked by its leading bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChunkType {
    /// `0 R len(14)`: a run of `len` packets, all received when R is set.
    RunLength = 0,
    /// `1 bits(15)`: one bit per packet, most significant first.
    BitVector = 1,
    /// All zero; pads the chunk list to a word boundary.
    TerminatingNull = 2,
}

/// One RLE chunk, kept as its wire word.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Chunk(pub u16);

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk_type() {
            ChunkType::RunLength => {
                let run_type = self.run_type().unwrap_or(0);
                write!(f, "[RunLength type={}, length={}]", run_type, self.value())
            }
            ChunkType::BitVector => write!(f, "[BitVector {:#b}]", self.value()),
            ChunkType::TerminatingNull => write!(f, "[TerminatingNull]"),
        }
    }
}

impl Chunk {
    pub fn chunk_type(&self) -> ChunkType {
        if self.0 == 0 {
            ChunkType::TerminatingNull
        } else if (self.0 >> 15) == 0 {
            ChunkType::RunLength
        } else {
            ChunkType::BitVector
        }
    }

    /// run_type is 1 for a run of received packets, 0 for a run of
    /// lost ones. Only run length chunks carry it.
    pub fn run_type(&self) -> std::result::Result<u8, Error> {
        if self.chunk_type() != ChunkType::RunLength {
            Err(Error::WrongChunkType)
        } else {
            Ok((self.0 >> 14) as u8 & 0x01)
        }
    }

    pub fn value(&self) -> u16 {
        match self.chunk_type() {
            ChunkType::RunLength => self.0 & 0x3FFF,
            ChunkType::BitVector => self.0 & 0x7FFF,
            ChunkType::TerminatingNull => 0,
        }
    }
}

/// RleReportBlock is the layout shared by Loss RLE report blocks
/// (RFC 3611 §4.1) and Duplicate RLE report blocks (RFC 3611 §4.2).
/// [`ReportBlock`] tells the two apart.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  BT = 1 or 2  | rsvd. |   t   |         block length          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ssrc of source                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          begin_seq            |             end_seq           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          chunk 1              |             chunk 2           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :                              ...                              :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          chunk n-1            |             chunk n           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RleReportBlock {
    /// Thinning, the low 4 bits of the type-specific octet.
    pub t: u8,

    pub ssrc: u32,
    pub begin_seq: u16,
    pub end_seq: u16,
    /// An odd number of chunks is followed by a terminating null chunk on the wire.
    pub chunks: Vec<Chunk>,
}

impl RleReportBlock {
    pub(crate) fn marshal_block(&self, block_type: BlockType, buf: &mut [u8]) -> Result<usize> {
        write_block(self, block_type as u8, buf)
    }
}

impl BlockBody for RleReportBlock {
    fn accepts(kind: BlockType) -> bool {
        matches!(kind, BlockType::LossRle | BlockType::DuplicateRle)
    }

    fn type_specific(&self) -> u8 {
        self.t & 0x0F
    }

    fn body_size(&self) -> usize {
        let padded_chunks = self.chunks.len() + self.chunks.len() % 2;
        RLE_FIXED_LENGTH + 2 * padded_chunks
    }

    fn put_body<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.ssrc);
        buf.put_u16(self.begin_seq);
        buf.put_u16(self.end_seq);
        self.chunks.iter().for_each(|c| buf.put_u16(c.0));
        if self.chunks.len() % 2 == 1 {
            buf.put_u16(0);
        }
    }

    fn get_body(xr_header: &XrHeader, body: &mut Bytes) -> Result<Self> {
        if body.len() < RLE_FIXED_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let ssrc = body.get_u32();
        let begin_seq = body.get_u16();
        let end_seq = body.get_u16();
        let chunks = body
            .chunks_exact(2)
            .map(|c| Chunk(u16::from_be_bytes([c[0], c[1]])))
            .collect();

        Ok(RleReportBlock {
            t: xr_header.type_specific & 0x0F,
            ssrc,
            begin_seq,
            end_seq,
            chunks,
        })
    }
}

// Loss and duplicate blocks share the body, so `Marshal` goes through
// `ReportBlock`, which knows the block type.
impl_block_codec!(RleReportBlock);
