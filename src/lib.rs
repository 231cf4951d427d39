#![warn(rust_2018_idioms)]
#![allow(dead_code)]

//! Decoder and encoder for RTCP datagrams: compound packets (RFC 3550),
//! feedback messages (RFC 4585, RFC 5104) and extended reports (RFC 3611).
//!
//! [`packet::unmarshal`] splits a datagram into typed packets and
//! [`packet::marshal`] writes them back.

pub mod compound_packet;
mod error;
pub mod extended_report;
pub mod goodbye;
pub mod header;
pub mod packet;
pub mod payload_feedbacks;
pub mod raw_packet;
pub mod receiver_report;
pub mod reception_report;
pub mod sender_report;
pub mod source_description;
pub mod transport_feedbacks;
mod util;

pub use error::Error;
pub use packet::{marshal, unmarshal, Datagram, Packet, RtcpPacket, SenderSync};
