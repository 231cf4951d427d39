//! Transport layer feedback messages, RFC 4585 section 6.2 and the
//! transport-wide congestion control extension.

pub mod rapid_resynchronization_request;
pub mod transport_layer_cc;
pub mod transport_layer_nack;
