//! Consumes-based handler disambiguation and response content negotiation
//! for HTTP-shaped servers. The embedding host owns routing and the wire;
//! this crate owns the two decisions in between.
pub mod config;
pub mod consumes;
pub mod error;
pub mod media;
pub mod negotiate;
pub mod serializer;
