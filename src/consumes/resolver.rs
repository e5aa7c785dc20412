use serde::{Deserialize, Serialize};

use crate::{
    consumes::types::{Candidate, ConstraintContext, HandlerId},
    error::SelectionError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateDisposition {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateWhy {
    /// The candidate carries no consumes declaration and lets anything
    /// through.
    Unconstrained,
    /// The request content-type structurally matched a declared type.
    ContentTypeMatch,
    /// The request carries no content-type and no unconstrained fallback
    /// exists, so every constrained candidate stays in play.
    AbsentContentType,
    /// The request carries no content-type and an unconstrained candidate is
    /// present; constrained candidates defer to it.
    DeferredToUnconstrained,
    /// The request content-type matched none of the declared types.
    ContentTypeMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateOutcome {
    pub handler: HandlerId,
    pub disposition: CandidateDisposition,
    pub why: CandidateWhy,
}

/// Per-candidate outcomes in candidate order, kept alongside the decision
/// for diagnostics and introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub outcomes: Vec<CandidateOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Selected(HandlerId),
    NoMatch,
    Ambiguous(Vec<HandlerId>),
}

#[derive(Debug, Clone)]
pub struct Disambiguation {
    pub report: SelectionReport,
    pub decision: Decision,
}

impl Disambiguation {
    pub fn into_result(self, context: &ConstraintContext<'_>) -> Result<HandlerId, SelectionError> {
        match self.decision {
            Decision::Selected(handler) => Ok(handler),
            Decision::NoMatch => Err(SelectionError::UnsupportedMediaType {
                content_type: context
                    .request_content_type
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }),
            Decision::Ambiguous(handlers) => Err(SelectionError::AmbiguousMatch { handlers }),
        }
    }
}

/// Narrows the candidate set to a single handler, or reports why it could
/// not. One pass over the whole set per request; evaluation is a pure
/// function of the context.
pub fn disambiguate(context: &ConstraintContext<'_>) -> Disambiguation {
    let candidates = context.candidates.candidates();
    let mut outcomes = Vec::with_capacity(candidates.len());
    let mut accepted: Vec<usize> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let (disposition, why) = evaluate(context, candidate);
        if disposition == CandidateDisposition::Accepted {
            accepted.push(index);
        }
        tracing::debug!(
            target: "consumes",
            handler = %candidate.handler,
            disposition = ?disposition,
            why = ?why,
            "candidate_evaluated"
        );
        outcomes.push(CandidateOutcome {
            handler: candidate.handler.clone(),
            disposition,
            why,
        });
    }

    let decision = match accepted.as_slice() {
        [] => {
            let content_type = context
                .request_content_type
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::warn!(
                target: "consumes",
                content_type = %content_type,
                "no_candidate_accepts_request"
            );
            Decision::NoMatch
        }
        [single] => {
            let handler = candidates[*single].handler.clone();
            tracing::info!(target: "consumes", handler = %handler, "candidate_selected");
            Decision::Selected(handler)
        }
        several => {
            let handlers: Vec<HandlerId> = several
                .iter()
                .map(|index| candidates[*index].handler.clone())
                .collect();
            tracing::warn!(target: "consumes", handlers = ?handlers, "candidate_selection_ambiguous");
            Decision::Ambiguous(handlers)
        }
    };

    Disambiguation {
        report: SelectionReport { outcomes },
        decision,
    }
}

/// Convenience wrapper collapsing the report into a plain result.
pub fn select_handler(context: &ConstraintContext<'_>) -> Result<HandlerId, SelectionError> {
    disambiguate(context).into_result(context)
}

fn evaluate(
    context: &ConstraintContext<'_>,
    candidate: &Candidate,
) -> (CandidateDisposition, CandidateWhy) {
    let Some(declaration) = candidate.authoritative() else {
        return (CandidateDisposition::Accepted, CandidateWhy::Unconstrained);
    };

    match context.request_content_type {
        None => {
            let unconstrained_peer = context
                .candidates
                .candidates()
                .iter()
                .any(|peer| !peer.is_constrained());
            if unconstrained_peer {
                (
                    CandidateDisposition::Rejected,
                    CandidateWhy::DeferredToUnconstrained,
                )
            } else {
                (CandidateDisposition::Accepted, CandidateWhy::AbsentContentType)
            }
        }
        Some(content_type) => {
            if declaration.matches(content_type) {
                (CandidateDisposition::Accepted, CandidateWhy::ContentTypeMatch)
            } else {
                (
                    CandidateDisposition::Rejected,
                    CandidateWhy::ContentTypeMismatch,
                )
            }
        }
    }
}
