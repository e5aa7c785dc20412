use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{media::MediaType, serializer::Serializer};

/// What a handler produced, as seen by negotiation: the payload plus the
/// declared allowed response content types. Empty declared types mean
/// "negotiate freely".
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub payload: Value,
    pub declared_types: Vec<MediaType>,
}

impl ResponseOutcome {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            declared_types: Vec::new(),
        }
    }

    pub fn with_declared_types(payload: Value, declared_types: Vec<MediaType>) -> Self {
        Self {
            payload,
            declared_types,
        }
    }
}

/// Controls whether broad wildcard Accept ranges, typically injected by
/// browsers, participate in negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationPolicy {
    pub respect_browser_accept: bool,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            respect_browser_accept: false,
        }
    }
}

/// Request-side negotiation signals. All optional; the negotiator's passes
/// degrade through them in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiationRequest<'a> {
    /// Raw Accept header, unparsed.
    pub accept: Option<&'a str>,
    /// The request's own content-type, used as a last-resort hint.
    pub content_type: Option<&'a MediaType>,
    /// Explicit format key from the route or query string; supersedes the
    /// Accept header when present.
    pub format: Option<&'a str>,
}

/// Maps short format keys (`json`, `txt`, ...) to concrete media types.
#[derive(Debug, Clone)]
pub struct FormatMappings {
    mappings: BTreeMap<String, MediaType>,
}

impl FormatMappings {
    pub fn new(mappings: BTreeMap<String, MediaType>) -> Self {
        Self { mappings }
    }

    pub fn insert(&mut self, key: impl Into<String>, media_type: MediaType) {
        self.mappings.insert(key.into().to_ascii_lowercase(), media_type);
    }

    pub fn resolve(&self, key: &str) -> Option<&MediaType> {
        self.mappings.get(&key.to_ascii_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.mappings.keys()
    }
}

impl Default for FormatMappings {
    fn default() -> Self {
        let mut mappings = BTreeMap::new();
        mappings.insert("json".to_string(), MediaType::of("application", "json"));
        mappings.insert("txt".to_string(), MediaType::of("text", "plain"));
        Self { mappings }
    }
}

/// Which pass produced the selection; recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationBasis {
    /// An Accept entry matched a declared type.
    AcceptAndDeclared,
    /// Declared types alone, no usable Accept signal.
    DeclaredOnly,
    /// Accept entries against serializer-supported types, nothing declared.
    AcceptOnly,
    /// The request's own content-type echoed back as a hint.
    RequestContentType,
    /// First serializer capable of producing anything for the payload.
    AnyCapable,
}

/// The committed outcome of negotiation: one serializer and the concrete
/// media type it will produce. `content_type` is absent only for
/// serializers that advertise no concrete types.
#[derive(Clone)]
pub struct Negotiated {
    pub serializer: Arc<dyn Serializer>,
    pub content_type: Option<MediaType>,
    pub basis: NegotiationBasis,
}

impl std::fmt::Debug for Negotiated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Negotiated")
            .field("serializer", &self.serializer.name())
            .field("content_type", &self.content_type)
            .field("basis", &self.basis)
            .finish()
    }
}
