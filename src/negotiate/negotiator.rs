use std::sync::Arc;

use crate::{
    error::NegotiationError,
    media::{AcceptEntry, MediaType, parse_accept_header, sort_by_quality},
    negotiate::types::{
        FormatMappings, Negotiated, NegotiationBasis, NegotiationPolicy, NegotiationRequest,
        ResponseOutcome,
    },
    serializer::{Serializer, SerializerRegistry},
};

/// Selects one (serializer, concrete media type) pair for a response, or
/// fails with NotAcceptable. Pure function of its inputs; the chosen
/// serializer alone writes bytes and headers.
pub struct Negotiator {
    registry: SerializerRegistry,
    policy: NegotiationPolicy,
    format_mappings: FormatMappings,
}

impl Negotiator {
    pub fn new(registry: SerializerRegistry, policy: NegotiationPolicy) -> Self {
        Self {
            registry,
            policy,
            format_mappings: FormatMappings::default(),
        }
    }

    pub fn with_format_mappings(mut self, format_mappings: FormatMappings) -> Self {
        self.format_mappings = format_mappings;
        self
    }

    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    pub fn negotiate(
        &self,
        outcome: &ResponseOutcome,
        request: &NegotiationRequest<'_>,
    ) -> Result<Negotiated, NegotiationError> {
        let (declared, accept) = self.effective_signals(outcome, request)?;

        let negotiated = self
            .from_accept_and_declared(outcome, &declared, &accept)
            .or_else(|| self.from_declared(outcome, &declared))
            .or_else(|| self.from_accept(outcome, &declared, &accept))
            .or_else(|| self.from_request_content_type(outcome, &declared, request))
            .or_else(|| self.from_any_capable(outcome, &declared));

        match negotiated {
            Some(negotiated) => {
                let content_type = negotiated
                    .content_type
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                tracing::info!(
                    target: "negotiate",
                    serializer = negotiated.serializer.name(),
                    content_type = %content_type,
                    basis = ?negotiated.basis,
                    "response_negotiated"
                );
                Ok(negotiated)
            }
            None => {
                tracing::warn!(target: "negotiate", "response_not_acceptable");
                Err(NegotiationError::NotAcceptable)
            }
        }
    }

    /// Resolves the declared-type list and the normalized Accept entries,
    /// applying the format override when present: the mapped type replaces
    /// the Accept signal and filters the declared types.
    fn effective_signals(
        &self,
        outcome: &ResponseOutcome,
        request: &NegotiationRequest<'_>,
    ) -> Result<(Vec<MediaType>, Vec<AcceptEntry>), NegotiationError> {
        if let Some(key) = request.format {
            let mapped = self
                .format_mappings
                .resolve(key)
                .ok_or_else(|| NegotiationError::UnknownFormat {
                    key: key.to_string(),
                })?
                .clone();
            let declared = if outcome.declared_types.is_empty() {
                vec![mapped.clone()]
            } else {
                outcome
                    .declared_types
                    .iter()
                    .filter(|declared| declared.is_subset_of(&mapped))
                    .cloned()
                    .collect()
            };
            if declared.is_empty() {
                tracing::warn!(target: "negotiate", format = key, "format_matches_no_declared_type");
                return Err(NegotiationError::NotAcceptable);
            }
            let accept = vec![AcceptEntry {
                media_type: mapped,
                position: 0,
            }];
            return Ok((declared, accept));
        }

        Ok((
            outcome.declared_types.clone(),
            self.normalized_accept(request.accept),
        ))
    }

    fn normalized_accept(&self, header: Option<&str>) -> Vec<AcceptEntry> {
        let Some(header) = header else {
            return Vec::new();
        };
        let mut entries: Vec<AcceptEntry> = parse_accept_header(header)
            .into_iter()
            .filter(|entry| entry.quality_milli() != 0)
            .filter(|entry| {
                self.policy.respect_browser_accept || !entry.media_type.matches_all_media()
            })
            .collect();
        sort_by_quality(&mut entries);
        entries
    }

    fn serializers(&self) -> &[Arc<dyn Serializer>] {
        self.registry.serializers()
    }

    // Declared types and Accept entries both present: Accept entries by
    // descending quality, declared types matching each, serializers in
    // registration order.
    fn from_accept_and_declared(
        &self,
        outcome: &ResponseOutcome,
        declared: &[MediaType],
        accept: &[AcceptEntry],
    ) -> Option<Negotiated> {
        if declared.is_empty() || accept.is_empty() {
            return None;
        }
        for entry in accept {
            for declared_type in declared {
                if !declared_type.is_subset_of(&entry.media_type) {
                    continue;
                }
                for serializer in self.serializers() {
                    if serializer.can_produce(&outcome.payload, Some(declared_type)) {
                        return Some(Negotiated {
                            serializer: serializer.clone(),
                            content_type: Some(declared_type.clone()),
                            basis: NegotiationBasis::AcceptAndDeclared,
                        });
                    }
                }
            }
        }
        None
    }

    // Declared types without a usable Accept signal, or nothing in the
    // Accept list was servable: declared order, then serializer order.
    fn from_declared(&self, outcome: &ResponseOutcome, declared: &[MediaType]) -> Option<Negotiated> {
        for declared_type in declared {
            for serializer in self.serializers() {
                if serializer.can_produce(&outcome.payload, Some(declared_type)) {
                    return Some(Negotiated {
                        serializer: serializer.clone(),
                        content_type: Some(declared_type.clone()),
                        basis: NegotiationBasis::DeclaredOnly,
                    });
                }
            }
        }
        None
    }

    // Nothing declared: match Accept entries against each serializer's own
    // supported types.
    fn from_accept(
        &self,
        outcome: &ResponseOutcome,
        declared: &[MediaType],
        accept: &[AcceptEntry],
    ) -> Option<Negotiated> {
        if !declared.is_empty() {
            return None;
        }
        for entry in accept {
            for serializer in self.serializers() {
                for concrete in serializer.supported_types(&outcome.payload, Some(&entry.media_type))
                {
                    if serializer.can_produce(&outcome.payload, Some(&concrete)) {
                        return Some(Negotiated {
                            serializer: serializer.clone(),
                            content_type: Some(concrete),
                            basis: NegotiationBasis::AcceptOnly,
                        });
                    }
                }
            }
        }
        None
    }

    // Nothing declared, nothing servable in Accept: echo the request's own
    // content-type as a hint.
    fn from_request_content_type(
        &self,
        outcome: &ResponseOutcome,
        declared: &[MediaType],
        request: &NegotiationRequest<'_>,
    ) -> Option<Negotiated> {
        if !declared.is_empty() {
            return None;
        }
        let hint = request.content_type?;
        for serializer in self.serializers() {
            if serializer.can_produce(&outcome.payload, Some(hint)) {
                let content_type = serializer
                    .supported_types(&outcome.payload, Some(hint))
                    .into_iter()
                    .next();
                return Some(Negotiated {
                    serializer: serializer.clone(),
                    content_type,
                    basis: NegotiationBasis::RequestContentType,
                });
            }
        }
        None
    }

    // No signal at all: first serializer that can produce anything for the
    // payload, with its preferred type.
    fn from_any_capable(
        &self,
        outcome: &ResponseOutcome,
        declared: &[MediaType],
    ) -> Option<Negotiated> {
        if !declared.is_empty() {
            return None;
        }
        for serializer in self.serializers() {
            if serializer.can_produce(&outcome.payload, None) {
                let content_type = serializer
                    .supported_types(&outcome.payload, None)
                    .into_iter()
                    .next();
                return Some(Negotiated {
                    serializer: serializer.clone(),
                    content_type,
                    basis: NegotiationBasis::AnyCapable,
                });
            }
        }
        None
    }
}
