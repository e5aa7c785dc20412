pub mod accept;
pub mod media_type;

pub use accept::{AcceptEntry, parse_accept_header, sort_by_quality};
pub use media_type::{InvalidMediaType, MediaType, QUALITY_MAX_MILLI};
