use thiserror::Error;

/// Every way decoding, encoding or compound validation can fail.
///
/// Codecs return these boxed in [`util::Error`]; compare with
/// `assert_eq!(Error::PacketTooShort, err)` or recover the variant with
/// `err.downcast_ref::<Error>()`.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Fewer than four bytes where a common header was expected.
    #[error("rtcp: header needs 4 bytes")]
    InvalidHeader,
    #[error("rtcp: version field is not 2")]
    BadVersion,
    /// The declared length runs past the input, or a body is shorter than
    /// its fixed part.
    #[error("rtcp: packet shorter than its declared contents")]
    PacketTooShort,
    /// A datagram decoded to zero packets.
    #[error("rtcp: no packets in datagram")]
    EmptyPacketList,
    #[error("rtcp: output buffer smaller than marshal size")]
    BufferTooShort,
    /// Header type or feedback format belongs to a different packet.
    #[error("rtcp: packet type or format mismatch")]
    WrongType,
    /// Padding count is zero or larger than the body.
    #[error("rtcp: padding count out of range")]
    WrongPadding,

    #[error("rtcp: compound packet is empty")]
    EmptyCompound,
    #[error("rtcp: compound packet must start with a sender or receiver report")]
    BadFirstPacket,
    #[error("rtcp: compound packet has no source description with a cname")]
    MissingCname,
    #[error("rtcp: packet before the cname source description")]
    PacketBeforeCname,

    /// A list outgrew its count or length field.
    #[error("rtcp: too many reports for the count field")]
    TooManyReports,
    #[error("rtcp: too many source description chunks")]
    TooManyChunks,
    #[error("rtcp: too many sources for the count field")]
    TooManySources,
    #[error("rtcp: total lost does not fit in 24 bits")]
    InvalidTotalLost,
    #[error("rtcp: source description text longer than 255 octets")]
    SdesTextTooLong,
    #[error("rtcp: source description item without a type")]
    SdesMissingType,
    #[error("rtcp: goodbye reason longer than 255 octets")]
    ReasonTooLong,

    #[error("rtcp: media ssrc must be zero")]
    SsrcMustBeZero,
    #[error("rtcp: REMB identifier missing")]
    MissingRembIdentifier,
    /// Negative or NaN bitrate.
    #[error("rtcp: bitrate cannot be encoded")]
    InvalidBitrate,

    #[error("rtcp: receive delta out of range")]
    DeltaExceedLimit,
    #[error("rtcp: packet status chunk is not 2 bytes")]
    PacketStatusChunkLength,
    #[error("rtcp: bit range exceeds 16 bits")]
    InvalidSizeOrStartIndex,
    #[error("rtcp: unexpected packet status chunk type")]
    WrongChunkType,
}

impl From<Error> for util::Error {
    fn from(err: Error) -> Self {
        util::Error::from_std(err)
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        other.downcast_ref::<Error>() == Some(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_compares_through_util_error() {
        let boxed: util::Error = Error::WrongPadding.into();
        assert_eq!(Error::WrongPadding, boxed);
        assert_ne!(Error::WrongType, boxed);
        assert_eq!(
            boxed.to_string(),
            "rtcp: padding count out of range"
        );

        let foreign = util::Error::from_std(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not ours",
        ));
        assert_ne!(Error::WrongPadding, foreign);
    }
}
