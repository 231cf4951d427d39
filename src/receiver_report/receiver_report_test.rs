use super::*;

fn one_block() -> ReceptionReport {
    ReceptionReport {
        ssrc: 0x0a0b0c0d,
        fraction_lost: 128,
        total_lost: 3,
        last_sequence_number: 0x0001_0005,
        jitter: 12,
        last_sender_report: 0xdeadbeef,
        delay: 0x0002_0000,
    }
}

#[test]
fn test_receiver_report_unmarshal() {
    let tests: Vec<(&str, Bytes, std::result::Result<ReceiverReport, Error>)> = vec![
        (
            "one block",
            Bytes::from_static(&[
                0x81, 0xc9, 0x00, 0x07, // v=2, p=0, count=1, RR, len=7
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x0a, 0x0b, 0x0c, 0x0d, // ssrc=0x0a0b0c0d
                0x80, 0x00, 0x00, 0x03, // fraction lost=128, total lost=3
                0x00, 0x01, 0x00, 0x05, // last seq=0x00010005
                0x00, 0x00, 0x00, 0x0c, // jitter=12
                0xde, 0xad, 0xbe, 0xef, // lsr=0xdeadbeef
                0x00, 0x02, 0x00, 0x00, // dlsr=2s
            ]),
            Ok(ReceiverReport {
                ssrc: 0x01020304,
                reports: vec![one_block()],
                profile_extensions: Bytes::new(),
            }),
        ),
        (
            "profile extension",
            Bytes::from_static(&[
                0x81, 0xc9, 0x00, 0x08, // v=2, p=0, count=1, RR, len=8
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x0a, 0x0b, 0x0c, 0x0d, // ssrc=0x0a0b0c0d
                0x80, 0x00, 0x00, 0x03, // fraction lost=128, total lost=3
                0x00, 0x01, 0x00, 0x05, // last seq=0x00010005
                0x00, 0x00, 0x00, 0x0c, // jitter=12
                0xde, 0xad, 0xbe, 0xef, // lsr=0xdeadbeef
                0x00, 0x02, 0x00, 0x00, // dlsr=2s
                b'e', b'x', b't', b'!', // extension
            ]),
            Ok(ReceiverReport {
                ssrc: 0x01020304,
                reports: vec![one_block()],
                profile_extensions: Bytes::from_static(b"ext!"),
            }),
        ),
        (
            "padding stripped from extension",
            Bytes::from_static(&[
                0xa0, 0xc9, 0x00, 0x02, // v=2, p=1, count=0, RR, len=2
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0xca, 0xfe, 0x00, 0x02, // extension=0xcafe, 2 bytes of padding
            ]),
            Ok(ReceiverReport {
                ssrc: 0x01020304,
                reports: vec![],
                profile_extensions: Bytes::from_static(&[0xca, 0xfe]),
            }),
        ),
        (
            "largest loss counters",
            Bytes::from_static(&[
                0x81, 0xc9, 0x00, 0x07, // v=2, p=0, count=1, RR, len=7
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x0a, 0x0b, 0x0c, 0x0d, // ssrc=0x0a0b0c0d
                0xff, 0xff, 0xff, 0xff, // fraction lost=255, total lost=2^24-1
                0x00, 0x01, 0x00, 0x05, // last seq=0x00010005
                0x00, 0x00, 0x00, 0x0c, // jitter=12
                0xde, 0xad, 0xbe, 0xef, // lsr=0xdeadbeef
                0x00, 0x02, 0x00, 0x00, // dlsr=2s
            ]),
            Ok(ReceiverReport {
                ssrc: 0x01020304,
                reports: vec![ReceptionReport {
                    fraction_lost: 255,
                    total_lost: MAX_TOTAL_LOST,
                    ..one_block()
                }],
                profile_extensions: Bytes::new(),
            }),
        ),
        (
            "count past the body",
            Bytes::from_static(&[
                0x82, 0xc9, 0x00, 0x07, // v=2, p=0, count=2, RR, len=7
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x0a, 0x0b, 0x0c, 0x0d, // ssrc=0x0a0b0c0d
                0x80, 0x00, 0x00, 0x03, // fraction lost=128, total lost=3
                0x00, 0x01, 0x00, 0x05, // last seq=0x00010005
                0x00, 0x00, 0x00, 0x0c, // jitter=12
                0xde, 0xad, 0xbe, 0xef, // lsr=0xdeadbeef
                0x00, 0x02, 0x00, 0x00, // dlsr=2s
            ]),
            Err(Error::PacketTooShort),
        ),
        (
            "zero padding count",
            Bytes::from_static(&[
                0xa0, 0xc9, 0x00, 0x02, // v=2, p=1, count=0, RR, len=2
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0xca, 0xfe, 0x00, 0x00, // last octet must count the padding
            ]),
            Err(Error::WrongPadding),
        ),
        (
            "sender report",
            Bytes::from_static(&[
                0x80, 0xc8, 0x00, 0x01, // v=2, p=0, count=0, SR, len=1
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
            ]),
            Err(Error::WrongType),
        ),
        (
            "header only",
            Bytes::from_static(&[0x80, 0xc9, 0x00, 0x00]),
            Err(Error::PacketTooShort),
        ),
    ];

    for (name, mut data, want) in tests {
        let got = ReceiverReport::unmarshal(&mut data);
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
fn test_receiver_report_marshal() -> Result<()> {
    let rr = ReceiverReport {
        ssrc: 0x01020304,
        reports: vec![],
        profile_extensions: Bytes::from_static(&[0xca, 0xfe]),
    };

    // two extension bytes force the P bit and two bytes of padding
    let data = rr.marshal()?;
    assert_eq!(
        data,
        Bytes::from_static(&[
            0xa0, 0xc9, 0x00, 0x02, // v=2, p=1, count=0, RR, len=2
            0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
            0xca, 0xfe, 0x00, 0x02, // extension=0xcafe, 2 bytes of padding
        ])
    );
    assert!(rr.header().padding);
    assert_eq!(ReceiverReport::unmarshal(&mut data.clone())?, rr);

    let rr = ReceiverReport {
        ssrc: 0x01020304,
        reports: vec![one_block(), ReceptionReport { ssrc: 7, ..one_block() }],
        profile_extensions: Bytes::from_static(b"ext!"),
    };
    let data = rr.marshal()?;
    assert_eq!(data.len(), 60);
    assert_eq!(&data[..4], &[0x82, 0xc9, 0x00, 0x0e]);
    assert_eq!(rr.destination_ssrc(), vec![0x0a0b0c0d, 7]);
    assert_eq!(
        rr.to_string(),
        "ReceiverReport from 1020304 \
         [ssrc=a0b0c0d lost=128/256 total=3 seq=65541 jitter=12] \
         [ssrc=7 lost=128/256 total=3 seq=65541 jitter=12] ext=[65, 78, 74, 21]"
    );
    Ok(())
}

#[test]
fn test_receiver_report_marshal_errors() {
    let tests: Vec<(&str, ReceiverReport, Error)> = vec![
        (
            "32 report blocks",
            ReceiverReport {
                reports: vec![one_block(); COUNT_MAX + 1],
                ..Default::default()
            },
            Error::TooManyReports,
        ),
        (
            "total lost past 24 bits",
            ReceiverReport {
                reports: vec![ReceptionReport {
                    total_lost: MAX_TOTAL_LOST + 1,
                    ..one_block()
                }],
                ..Default::default()
            },
            Error::InvalidTotalLost,
        ),
    ];

    for (name, rr, want) in tests {
        match rr.marshal() {
            Err(err) => assert_eq!(want, err, "Marshal {name}: err = {err:?}"),
            Ok(data) => panic!("Marshal {name}: got {data:?}, want {want:?}"),
        }
    }

    let rr = ReceiverReport {
        reports: vec![one_block()],
        ..Default::default()
    };
    let mut short = [0u8; 31];
    assert_eq!(Error::BufferTooShort, rr.marshal_to(&mut short).unwrap_err());
}
