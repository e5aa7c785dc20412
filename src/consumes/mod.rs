pub mod resolver;
pub mod types;

pub use resolver::{
    CandidateDisposition, CandidateOutcome, CandidateWhy, Decision, Disambiguation,
    SelectionReport, disambiguate, select_handler,
};
pub use types::{
    Candidate, CandidateSet, ConstraintContext, ConsumesDeclaration, GROUP_DECLARATION_RANK,
    HANDLER_DECLARATION_RANK, HandlerId,
};
