pub mod negotiator;
pub mod respond;
pub mod types;

pub use negotiator::Negotiator;
pub use respond::respond;
pub use types::{
    FormatMappings, Negotiated, NegotiationBasis, NegotiationPolicy, NegotiationRequest,
    ResponseOutcome,
};
