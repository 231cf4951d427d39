use bytes::Bytes;

use super::*;

const SENDER: u32 = 0x1111_0001;
const MEDIA: u32 = 0x2222_0002;

fn run_length(symbol: SymbolTypeTcc, run_length: u16) -> PacketStatusChunk {
    PacketStatusChunk::RunLengthChunk(RunLengthChunk {
        type_tcc: StatusChunkTypeTcc::RunLengthChunk,
        packet_status_symbol: symbol,
        run_length,
    })
}

fn status_vector(symbol_size: SymbolSizeTypeTcc, symbols: &[u16]) -> PacketStatusChunk {
    PacketStatusChunk::StatusVectorChunk(StatusVectorChunk {
        type_tcc: StatusChunkTypeTcc::StatusVectorChunk,
        symbol_size,
        symbol_list: symbols.iter().map(|&s| s.into()).collect(),
    })
}

fn small(delta: i64) -> RecvDelta {
    RecvDelta {
        type_tcc_packet: SymbolTypeTcc::PacketReceivedSmallDelta,
        delta,
    }
}

fn large(delta: i64) -> RecvDelta {
    RecvDelta {
        type_tcc_packet: SymbolTypeTcc::PacketReceivedLargeDelta,
        delta,
    }
}

fn packets() -> Vec<(&'static str, Bytes, TransportLayerCc)> {
    vec![
        (
            "run of small deltas",
            Bytes::from_static(&[
                0xaf, 0xcd, 0x00, 0x06, // v=2, p=1, FMT=15, TSFB, len=6
                0x11, 0x11, 0x00, 0x01, // sender=0x11110001
                0x22, 0x22, 0x00, 0x02, // media=0x22220002
                0x00, 0x64, 0x00, 0x03, // base=100, status=3
                0x00, 0x01, 0x23, 0x07, // ref=0x123, fb=7
                0x20, 0x03, 0x04, 0x00, // run: small x3, deltas 1ms 0ms
                0xff, 0x00, 0x00, 0x03, // delta 63.75ms, padding=3
            ]),
            TransportLayerCc {
                sender_ssrc: SENDER,
                media_ssrc: MEDIA,
                base_sequence_number: 100,
                packet_status_count: 3,
                reference_time: 0x123,
                fb_pkt_count: 7,
                packet_chunks: vec![run_length(SymbolTypeTcc::PacketReceivedSmallDelta, 3)],
                recv_deltas: vec![small(1000), small(0), small(63750)],
            },
        ),
        (
            "two bit vector then a lost run",
            Bytes::from_static(&[
                0x8f, 0xcd, 0x00, 0x06, // v=2, p=0, FMT=15, TSFB, len=6
                0x11, 0x11, 0x00, 0x01, // sender=0x11110001
                0x22, 0x22, 0x00, 0x02, // media=0x22220002
                0xff, 0xfe, 0x00, 0x0a, // base=65534, status=10
                0x00, 0x00, 0x01, 0x00, // ref=1, fb=0
                0xd8, 0xd0, 0x00, 0x03, // vector: S L N R S N N, run: lost x3
                0x08, 0xff, 0xfc, 0x01, // deltas 2ms, -1ms, 250us
            ]),
            TransportLayerCc {
                sender_ssrc: SENDER,
                media_ssrc: MEDIA,
                base_sequence_number: 65534,
                packet_status_count: 10,
                reference_time: 1,
                fb_pkt_count: 0,
                packet_chunks: vec![
                    status_vector(SymbolSizeTypeTcc::TwoBit, &[1, 2, 0, 3, 1, 0, 0]),
                    run_length(SymbolTypeTcc::PacketNotReceived, 3),
                ],
                recv_deltas: vec![small(2000), large(-1000), small(250)],
            },
        ),
        (
            "one bit vector longer than the status count",
            Bytes::from_static(&[
                0xaf, 0xcd, 0x00, 0x06, // v=2, p=1, FMT=15, TSFB, len=6
                0x11, 0x11, 0x00, 0x01, // sender=0x11110001
                0x22, 0x22, 0x00, 0x02, // media=0x22220002
                0x00, 0x07, 0x00, 0x05, // base=7, status=5
                0xff, 0xff, 0xff, 0xff, // ref=0xffffff, fb=255
                0xac, 0x40, 0x01, 0x02, // vector: 1 0 1 1 0 0 0 1 ..., deltas
                0x03, 0x00, 0x00, 0x03, // delta, padding=3
            ]),
            TransportLayerCc {
                sender_ssrc: SENDER,
                media_ssrc: MEDIA,
                base_sequence_number: 7,
                packet_status_count: 5,
                reference_time: 0x00ff_ffff,
                fb_pkt_count: 255,
                packet_chunks: vec![status_vector(
                    SymbolSizeTypeTcc::OneBit,
                    &[1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0],
                )],
                recv_deltas: vec![small(250), small(500), small(750)],
            },
        ),
    ]
}

#[test]
fn test_transport_layer_cc_unmarshal() -> Result<()> {
    for (name, data, want) in packets() {
        let got = TransportLayerCc::unmarshal(&mut data.clone())?;
        assert_eq!(got, want, "Unmarshal {name}");
        assert_eq!(got.destination_ssrc(), vec![MEDIA], "{name}");
    }
    Ok(())
}

#[test]
fn test_transport_layer_cc_marshal() -> Result<()> {
    for (name, want, packet) in packets() {
        assert_eq!(packet.marshal_size(), want.len(), "{name}");
        assert_eq!(packet.marshal()?, want, "Marshal {name}");
    }
    Ok(())
}

#[test]
fn test_transport_layer_cc_header() {
    let packets = packets();
    let (_, _, padded) = &packets[0];
    assert_eq!(
        padded.header(),
        Header {
            padding: true,
            count: FORMAT_TCC,
            packet_type: PacketType::TransportSpecificFeedback,
            length: 6,
        }
    );

    let (_, _, aligned) = &packets[1];
    assert!(!aligned.header().padding);
    assert_eq!(
        aligned.to_string(),
        "TransportLayerCc from 11110001 for 22220002 base=65534 status=10 ref=1 fb=0 chunks=2 deltas=3"
    );
}

#[test]
fn test_transport_layer_cc_unmarshal_errors() {
    let tests: Vec<(&str, Bytes, Error)> = vec![
        (
            "header only",
            Bytes::from_static(&[0x8f, 0xcd, 0x00, 0x00]),
            Error::PacketTooShort,
        ),
        (
            "generic nack format",
            Bytes::from_static(&[
                0x81, 0xcd, 0x00, 0x04, // v=2, p=0, FMT=1, TSFB, len=4
                0x11, 0x11, 0x00, 0x01, // sender
                0x22, 0x22, 0x00, 0x02, // media
                0x00, 0x01, 0x00, 0x00, // nack pid=1, blp=0
                0x00, 0x00, 0x00, 0x00, // filler
            ]),
            Error::WrongType,
        ),
        (
            "length past end",
            Bytes::from_static(&[
                0x8f, 0xcd, 0x00, 0x06, // v=2, p=0, FMT=15, TSFB, len=6
                0x11, 0x11, 0x00, 0x01, // sender
                0x22, 0x22, 0x00, 0x02, // media
                0x00, 0x01, 0x00, 0x01, // base=1, status=1
                0x00, 0x00, 0x00, 0x00, // ref=0, fb=0
            ]),
            Error::PacketTooShort,
        ),
        (
            "no chunk for the status count",
            Bytes::from_static(&[
                0x8f, 0xcd, 0x00, 0x04, // v=2, p=0, FMT=15, TSFB, len=4
                0x11, 0x11, 0x00, 0x01, // sender
                0x22, 0x22, 0x00, 0x02, // media
                0x00, 0x01, 0x00, 0x03, // base=1, status=3
                0x00, 0x00, 0x00, 0x00, // ref=0, fb=0
            ]),
            Error::PacketTooShort,
        ),
        (
            "deltas missing",
            Bytes::from_static(&[
                0x8f, 0xcd, 0x00, 0x05, // v=2, p=0, FMT=15, TSFB, len=5
                0x11, 0x11, 0x00, 0x01, // sender
                0x22, 0x22, 0x00, 0x02, // media
                0x00, 0x01, 0x00, 0x02, // base=1, status=2
                0x00, 0x00, 0x00, 0x00, // ref=0, fb=0
                0x40, 0x01, 0x40, 0x01, // run: large x1, run: large x1
            ]),
            Error::PacketTooShort,
        ),
    ];

    for (name, mut data, want) in tests {
        match TransportLayerCc::unmarshal(&mut data) {
            Ok(got) => panic!("Unmarshal {name}: got {got:?}, want {want}"),
            Err(got) => assert_eq!(want, got, "Unmarshal {name}: err = {got}, want {want}"),
        }
    }
}

#[test]
fn test_run_length_chunk() -> Result<()> {
    let chunk = RunLengthChunk::unmarshal(&mut Bytes::from_static(&[0x60, 0x0d]))?;
    assert_eq!(
        chunk,
        RunLengthChunk {
            type_tcc: StatusChunkTypeTcc::RunLengthChunk,
            packet_status_symbol: SymbolTypeTcc::PacketReceivedWithoutDelta,
            run_length: 13,
        }
    );
    assert_eq!(chunk.marshal()?, Bytes::from_static(&[0x60, 0x0d]));

    // only 13 bits of run length reach the wire
    let long = RunLengthChunk {
        packet_status_symbol: SymbolTypeTcc::PacketReceivedLargeDelta,
        run_length: 0x2001,
        ..Default::default()
    };
    assert_eq!(long.marshal()?, Bytes::from_static(&[0x40, 0x01]));

    assert_eq!(
        Error::PacketStatusChunkLength,
        RunLengthChunk::unmarshal(&mut Bytes::from_static(&[0x20])).unwrap_err()
    );
    Ok(())
}

#[test]
fn test_status_vector_chunk() -> Result<()> {
    let chunk = StatusVectorChunk::unmarshal(&mut Bytes::from_static(&[0xd8, 0xd0]))?;
    assert_eq!(chunk.symbol_size, SymbolSizeTypeTcc::TwoBit);
    assert_eq!(chunk.symbol_list.len(), 7);
    assert_eq!(chunk.symbol_list[1], SymbolTypeTcc::PacketReceivedLargeDelta);
    assert_eq!(chunk.marshal()?, Bytes::from_static(&[0xd8, 0xd0]));

    let one_bit = StatusVectorChunk::unmarshal(&mut Bytes::from_static(&[0xbf, 0xff]))?;
    assert_eq!(
        one_bit.symbol_list,
        vec![SymbolTypeTcc::PacketReceivedSmallDelta; 14]
    );

    // eight two-bit symbols do not fit
    let overfull = StatusVectorChunk {
        symbol_size: SymbolSizeTypeTcc::TwoBit,
        symbol_list: vec![SymbolTypeTcc::PacketNotReceived; 8],
        ..Default::default()
    };
    assert_eq!(
        Error::InvalidSizeOrStartIndex,
        overfull.marshal().unwrap_err()
    );
    Ok(())
}

#[test]
fn test_recv_delta_marshal() {
    let tests: Vec<(&str, RecvDelta, std::result::Result<&'static [u8], Error>)> = vec![
        ("small max", small(63750), Ok(&[0xff])),
        ("small rounds down", small(1100), Ok(&[0x04])),
        ("small too big", small(64000), Err(Error::DeltaExceedLimit)),
        ("small negative", small(-250), Err(Error::DeltaExceedLimit)),
        ("large min", large(-8_192_000), Ok(&[0x80, 0x00])),
        ("large max", large(8_191_750), Ok(&[0x7f, 0xff])),
        ("large too big", large(8_192_000), Err(Error::DeltaExceedLimit)),
        (
            "not received",
            RecvDelta::default(),
            Err(Error::DeltaExceedLimit),
        ),
    ];

    for (name, delta, want) in tests {
        let mut buf = [0u8; 2];
        match (delta.marshal_to(&mut buf), want) {
            (Ok(n), Ok(want)) => {
                assert_eq!(&buf[..n], want, "Marshal {name}");
                assert_eq!(delta.marshal_size(), n, "{name}");
            }
            (Err(got), Err(want)) => assert_eq!(want, got, "Marshal {name}"),
            (got, want) => panic!("Marshal {name}: got {got:?}, want {want:?}"),
        }
    }
}

#[test]
fn test_recv_delta_unmarshal() -> Result<()> {
    assert_eq!(
        RecvDelta::unmarshal(&mut Bytes::from_static(&[0x08]))?,
        small(2000)
    );
    assert_eq!(
        RecvDelta::unmarshal(&mut Bytes::from_static(&[0xff, 0xfc]))?,
        large(-1000)
    );
    assert_eq!(
        Error::DeltaExceedLimit,
        RecvDelta::unmarshal(&mut Bytes::from_static(&[0, 0, 0])).unwrap_err()
    );
    Ok(())
}

#[test]
fn test_transport_layer_cc_marshal_errors() {
    let too_far = TransportLayerCc {
        packet_status_count: 1,
        packet_chunks: vec![run_length(SymbolTypeTcc::PacketReceivedSmallDelta, 1)],
        recv_deltas: vec![small(64000)],
        ..Default::default()
    };
    assert_eq!(Error::DeltaExceedLimit, too_far.marshal().unwrap_err());

    let packets = packets();
    let (_, data, packet) = &packets[1];
    let mut short = vec![0u8; data.len() - 1];
    assert_eq!(
        Error::BufferTooShort,
        packet.marshal_to(&mut short).unwrap_err()
    );
}
