//! Payload-specific feedback messages (PT=206), RFC 4585 section 6.3,
//! RFC 5104 and the REMB draft.

pub mod full_intra_request;
pub mod picture_loss_indication;
pub mod receiver_estimated_maximum_bitrate;
pub mod slice_loss_indication;
