use bytes::Bytes;

use super::*;

fn two_entries() -> FullIntraRequest {
    FullIntraRequest {
        sender_ssrc: 0xaabbccdd,
        media_ssrc: 0,
        fir: vec![
            FirEntry {
                ssrc: 0x01020304,
                sequence_number: 7,
            },
            FirEntry {
                ssrc: 0x0a0b0c0d,
                sequence_number: 255,
            },
        ],
    }
}

#[test]
fn test_full_intra_request_unmarshal() {
    let tests: Vec<(&str, Bytes, std::result::Result<FullIntraRequest, Error>)> = vec![
        (
            "two entries",
            Bytes::from_static(&[
                0x84, 0xce, 0x00, 0x06, // v=2, p=0, FMT=4, PSFB, len=6
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x07, 0x00, 0x00, 0x00, // seq=7
                0x0a, 0x0b, 0x0c, 0x0d, // ssrc=0x0a0b0c0d
                0xff, 0x00, 0x00, 0x00, // seq=255
            ]),
            Ok(two_entries()),
        ),
        (
            "reserved octets ignored",
            Bytes::from_static(&[
                0x84, 0xce, 0x00, 0x04, // v=2, p=0, FMT=4, PSFB, len=4
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x07, 0xde, 0xad, 0x00, // seq=7, reserved not zero
            ]),
            Ok(FullIntraRequest {
                sender_ssrc: 0xaabbccdd,
                media_ssrc: 0,
                fir: vec![FirEntry {
                    ssrc: 0x01020304,
                    sequence_number: 7,
                }],
            }),
        ),
        (
            "padded",
            Bytes::from_static(&[
                0xa4, 0xce, 0x00, 0x05, // v=2, p=1, FMT=4, PSFB, len=5
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304
                0x07, 0x00, 0x00, 0x00, // seq=7
                0x00, 0x00, 0x00, 0x04, // 4 bytes of padding
            ]),
            Ok(FullIntraRequest {
                sender_ssrc: 0xaabbccdd,
                media_ssrc: 0,
                fir: vec![FirEntry {
                    ssrc: 0x01020304,
                    sequence_number: 7,
                }],
            }),
        ),
        (
            "half an entry",
            Bytes::from_static(&[
                0x84, 0xce, 0x00, 0x03, // v=2, p=0, FMT=4, PSFB, len=3
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
                0x01, 0x02, 0x03, 0x04, // ssrc=0x01020304, seq missing
            ]),
            Err(Error::PacketTooShort),
        ),
        (
            "sli format",
            Bytes::from_static(&[
                0x82, 0xce, 0x00, 0x02, // v=2, p=0, FMT=2, PSFB, len=2
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
            ]),
            Err(Error::WrongType),
        ),
        (
            "transport feedback",
            Bytes::from_static(&[
                0x84, 0xcd, 0x00, 0x02, // v=2, p=0, FMT=4, TSFB, len=2
                0xaa, 0xbb, 0xcc, 0xdd, // sender=0xaabbccdd
                0x00, 0x00, 0x00, 0x00, // media=0
            ]),
            Err(Error::WrongType),
        ),
        (
            "header only",
            Bytes::from_static(&[0x84, 0xce, 0x00, 0x00]),
            Err(Error::PacketTooShort),
        ),
    ];

    for (name, mut data, want) in tests {
        let got = FullIntraRequest::unmarshal(&mut data);
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
fn test_full_intra_request_marshal() -> Result<()> {
    let fir = two_entries();

    let data = fir.marshal()?;
    assert_eq!(data.len(), 28);
    assert_eq!(&data[..4], &[0x84, 0xce, 0x00, 0x06]);
    assert_eq!(&data[20..], &[0x0a, 0x0b, 0x0c, 0x0d, 0xff, 0x00, 0x00, 0x00]);
    assert_eq!(FullIntraRequest::unmarshal(&mut data.clone())?, fir);

    assert_eq!(fir.destination_ssrc(), vec![0x01020304, 0x0a0b0c0d]);
    assert_eq!(
        fir.to_string(),
        "FullIntraRequest from aabbccdd for 0 [ssrc=1020304 seq=7] [ssrc=a0b0c0d seq=255]"
    );

    let mut short = [0u8; 27];
    assert_eq!(Error::BufferTooShort, fir.marshal_to(&mut short).unwrap_err());
    Ok(())
}

#[test]
fn test_full_intra_request_too_many_entries() {
    let fir = FullIntraRequest {
        fir: vec![FirEntry::default(); 1 << 15],
        ..Default::default()
    };
    assert_eq!(Error::TooManyReports, fir.marshal().unwrap_err());
}

#[test]
fn test_full_intra_request_without_entries() -> Result<()> {
    let fir = FullIntraRequest {
        sender_ssrc: 1,
        media_ssrc: 2,
        fir: vec![],
    };
    let data = fir.marshal()?;
    assert_eq!(&data[..4], &[0x84, 0xce, 0x00, 0x02]);
    assert!(fir.destination_ssrc().is_empty());
    assert_eq!(FullIntraRequest::unmarshal(&mut data.clone())?, fir);
    Ok(())
}
