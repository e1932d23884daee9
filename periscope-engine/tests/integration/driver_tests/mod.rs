pub mod test_access_gate;
pub mod test_full_negotiation;
pub mod test_media_failure;
