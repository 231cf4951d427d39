use bytes::Bytes;

use super::*;

#[test]
fn test_transport_layer_nack_unmarshal() {
    let tests: Vec<(&str, Bytes, std::result::Result<TransportLayerNack, Error>)> = vec![
        (
            "two pairs",
            Bytes::from_static(&[
                0x81, 0xcd, 0x00, 0x04, // v=2, p=0, FMT=1, TSFB, len=4
                0x00, 0x00, 0x30, 0x39, // sender=12345
                0x00, 0x01, 0x09, 0x32, // media=67890
                0x03, 0xe8, 0x80, 0x01, // pid=1000, blp=0x8001
                0xff, 0xff, 0x00, 0x00, // pid=65535, blp=0
            ]),
            Ok(TransportLayerNack {
                sender_ssrc: 12345,
                media_ssrc: 67890,
                nacks: vec![
                    NackPair {
                        packet_id: 1000,
                        lost_packets: 0x8001,
                    },
                    NackPair::new(65535),
                ],
            }),
        ),
        (
            "padded",
            Bytes::from_static(&[
                0xa1, 0xcd, 0x00, 0x04, // v=2, p=1, FMT=1, TSFB, len=4
                0x00, 0x00, 0x30, 0x39, // sender=12345
                0x00, 0x01, 0x09, 0x32, // media=67890
                0x03, 0xe8, 0x80, 0x01, // pid=1000, blp=0x8001
                0x00, 0x00, 0x00, 0x04, // 4 bytes of padding
            ]),
            Ok(TransportLayerNack {
                sender_ssrc: 12345,
                media_ssrc: 67890,
                nacks: vec![NackPair {
                    packet_id: 1000,
                    lost_packets: 0x8001,
                }],
            }),
        ),
        (
            "padding splits a pair",
            Bytes::from_static(&[
                0xa1, 0xcd, 0x00, 0x03, // v=2, p=1, FMT=1, TSFB, len=3
                0x00, 0x00, 0x30, 0x39, // sender=12345
                0x00, 0x01, 0x09, 0x32, // media=67890
                0x03, 0xe8, 0x00, 0x02, // pid=1000, 2 bytes of padding
            ]),
            Err(Error::PacketTooShort),
        ),
        (
            "declared length past the datagram",
            Bytes::from_static(&[
                0x81, 0xcd, 0x00, 0x05, // v=2, p=0, FMT=1, TSFB, len=5
                0x00, 0x00, 0x30, 0x39, // sender=12345
                0x00, 0x01, 0x09, 0x32, // media=67890
                0x03, 0xe8, 0x80, 0x01, // pid=1000, blp=0x8001
            ]),
            Err(Error::PacketTooShort),
        ),
        (
            "media ssrc missing",
            Bytes::from_static(&[
                0x81, 0xcd, 0x00, 0x01, // v=2, p=0, FMT=1, TSFB, len=1
                0x00, 0x00, 0x30, 0x39, // sender=12345
            ]),
            Err(Error::PacketTooShort),
        ),
        (
            "receiver report",
            Bytes::from_static(&[
                0x81, 0xc9, 0x00, 0x02, // v=2, p=0, count=1, RR, len=2
                0x00, 0x00, 0x30, 0x39, // ssrc=12345
                0x00, 0x01, 0x09, 0x32, // first word of a report block
            ]),
            Err(Error::WrongType),
        ),
        (
            "rrr format",
            Bytes::from_static(&[
                0x85, 0xcd, 0x00, 0x02, // v=2, p=0, FMT=5, TSFB, len=2
                0x00, 0x00, 0x30, 0x39, // sender=12345
                0x00, 0x01, 0x09, 0x32, // media=67890
            ]),
            Err(Error::WrongType),
        ),
        ("empty", Bytes::new(), Err(Error::PacketTooShort)),
    ];

    for (name, mut data, want) in tests {
        let got = TransportLayerNack::unmarshal(&mut data);
        match (got, want) {
            (Ok(got), Ok(want)) => assert_eq!(got, want, "Unmarshal {name}"),
            (Err(got), Err(want)) => {
                assert_eq!(want, got, "Unmarshal {name}: err = {got:?}, want {want:?}")
            }
            (got, want) => panic!("Unmarshal {name}: got {got:?}, want {want:?}"),
        }
    }
}

#[test]
fn test_transport_layer_nack_roundtrip() {
    let tests: Vec<(&str, TransportLayerNack, Option<Error>)> = vec![
        (
            "lost run then single loss",
            TransportLayerNack {
                sender_ssrc: 12345,
                media_ssrc: 67890,
                nacks: nack_pairs_from_sequence_numbers(&[10, 11, 12, 40]),
            },
            None,
        ),
        (
            "no pairs",
            TransportLayerNack {
                sender_ssrc: 12345,
                media_ssrc: 67890,
                nacks: vec![],
            },
            None,
        ),
        (
            "length field overflows",
            TransportLayerNack {
                sender_ssrc: 12345,
                media_ssrc: 67890,
                nacks: vec![NackPair::default(); u16::MAX as usize],
            },
            Some(Error::TooManyReports),
        ),
    ];

    for (name, want, want_error) in tests {
        match (want.marshal(), want_error) {
            (Ok(data), None) => {
                assert_eq!(data.len(), want.marshal_size(), "Marshal {name}");
                let got = TransportLayerNack::unmarshal(&mut data.clone())
                    .unwrap_or_else(|err| panic!("Unmarshal {name}: {err:?}"));
                assert_eq!(got, want, "{name} round trip");
            }
            (Err(got_err), Some(want_err)) => {
                assert_eq!(want_err, got_err, "Marshal {name}: err = {got_err:?}")
            }
            (got, want_err) => panic!("Marshal {name}: got {got:?}, want {want_err:?}"),
        }
    }
}

#[test]
fn test_transport_layer_nack_marshal() -> Result<()> {
    let nack = TransportLayerNack {
        sender_ssrc: 12345,
        media_ssrc: 67890,
        nacks: vec![NackPair {
            packet_id: 1000,
            lost_packets: 0x8001,
        }],
    };

    assert_eq!(
        nack.marshal()?,
        Bytes::from_static(&[
            0x81, 0xcd, 0x00, 0x03, // v=2, p=0, FMT=1, TSFB, len=3
            0x00, 0x00, 0x30, 0x39, // sender=12345
            0x00, 0x01, 0x09, 0x32, // media=67890
            0x03, 0xe8, 0x80, 0x01, // pid=1000, blp=0x8001
        ])
    );
    assert_eq!(nack.destination_ssrc(), vec![67890]);
    assert_eq!(nack.to_string(), "TransportLayerNack from 3039 for 10932 [1000 0x8001]");

    let mut short = [0u8; 15];
    assert_eq!(Error::BufferTooShort, nack.marshal_to(&mut short).unwrap_err());
    Ok(())
}

#[test]
fn test_nack_pair_packet_list() {
    let tests: Vec<(&str, NackPair, Vec<u16>)> = vec![
        ("only pid", NackPair::new(500), vec![500]),
        (
            "first and last bit",
            NackPair {
                packet_id: 1000,
                lost_packets: 0x8001,
            },
            vec![1000, 1001, 1016],
        ),
        (
            "alternating",
            NackPair {
                packet_id: 7,
                lost_packets: 0b0101,
            },
            vec![7, 8, 10],
        ),
        (
            "wraps past 65535",
            NackPair {
                packet_id: 65533,
                lost_packets: 0b1110,
            },
            vec![65533, 65535, 0, 1],
        ),
        (
            "every bit",
            NackPair {
                packet_id: 0,
                lost_packets: 0xffff,
            },
            (0..=16).collect(),
        ),
    ];

    for (name, pair, want) in tests {
        assert_eq!(pair.packet_list(), want, "{name}");
    }
}

#[test]
fn test_nack_pairs_from_sequence_numbers() {
    let tests: Vec<(&str, Vec<u16>, Vec<NackPair>)> = vec![
        ("empty", vec![], vec![]),
        ("repeated", vec![9, 9, 9], vec![NackPair::new(9)]),
        (
            "exactly sixteen apart shares a pair",
            vec![300, 316],
            vec![NackPair {
                packet_id: 300,
                lost_packets: 0x8000,
            }],
        ),
        (
            "seventeen apart opens a pair",
            vec![300, 317],
            vec![NackPair::new(300), NackPair::new(317)],
        ),
        (
            "wrap around",
            vec![65535, 0, 2],
            vec![NackPair {
                packet_id: 65535,
                lost_packets: 0b101,
            }],
        ),
        (
            "going backwards opens a pair",
            vec![50, 49, 51],
            vec![NackPair::new(50), NackPair {
                packet_id: 49,
                lost_packets: 0b10,
            }],
        ),
    ];

    for (name, seq_nos, want) in tests {
        let got = nack_pairs_from_sequence_numbers(&seq_nos);
        assert_eq!(got, want, "{name}");

        let covered: Vec<u16> = got.iter().flat_map(|pair| pair.packet_list()).collect();
        for seq in &seq_nos {
            assert!(covered.contains(seq), "{name}: {seq} not covered");
        }
    }
}
