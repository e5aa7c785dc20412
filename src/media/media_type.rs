use std::fmt;

use thiserror::Error;

/// Quality weights are fixed-point thousandths: 1000 is `q=1`, 0 excludes
/// the entry from negotiation entirely.
pub const QUALITY_MAX_MILLI: u16 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid media type '{text}'")]
pub struct InvalidMediaType {
    text: String,
}

impl InvalidMediaType {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// A MIME type with parameters. The `q` parameter is split off into a
/// quality weight at parse time and takes no part in structural matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
    parameters: Vec<(String, String)>,
    quality_milli: u16,
}

impl MediaType {
    /// Builds a bare `kind/subtype` media type with no parameters.
    pub fn of(kind: &str, subtype: &str) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: Vec::new(),
            quality_milli: QUALITY_MAX_MILLI,
        }
    }

    pub fn parse(text: &str) -> Result<Self, InvalidMediaType> {
        let mut segments = text.split(';');
        let full_type = segments.next().unwrap_or_default().trim();
        let (kind, subtype) = full_type
            .split_once('/')
            .ok_or_else(|| InvalidMediaType::new(text))?;
        let kind = kind.trim();
        let subtype = subtype.trim();
        if !is_token(kind) || !is_token(subtype) {
            return Err(InvalidMediaType::new(text));
        }

        let mut parameters = Vec::new();
        let mut quality_milli = QUALITY_MAX_MILLI;
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| InvalidMediaType::new(text))?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if name.is_empty() {
                return Err(InvalidMediaType::new(text));
            }
            if name == "q" {
                quality_milli =
                    parse_quality_milli(&value).ok_or_else(|| InvalidMediaType::new(text))?;
            } else {
                parameters.push((name, value));
            }
        }

        Ok(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters,
            quality_milli,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn quality_milli(&self) -> u16 {
        self.quality_milli
    }

    pub fn matches_all_types(&self) -> bool {
        self.kind == "*"
    }

    pub fn matches_all_subtypes(&self) -> bool {
        self.subtype == "*"
    }

    /// A pure `*/*` range, the kind browsers append to their Accept lists.
    pub fn matches_all_media(&self) -> bool {
        self.matches_all_types() && self.matches_all_subtypes()
    }

    /// Structural specificity match: true when `set` names this type or a
    /// wildcard covering it, and every parameter carried here is present in
    /// `set` with an equal value. Wildcards live on the `set` side; quality
    /// weights are excluded.
    pub fn is_subset_of(&self, set: &MediaType) -> bool {
        if !set.matches_all_types() && self.kind != set.kind {
            return false;
        }
        if !set.matches_all_subtypes() && self.subtype != set.subtype {
            return false;
        }
        self.parameters.iter().all(|(name, value)| {
            set.parameter(name)
                .is_some_and(|other| other.eq_ignore_ascii_case(value))
        })
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.parameters {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}

// RFC 7230 token characters, minus the rarely seen ones nobody declares
// media types with.
fn is_token(text: &str) -> bool {
    !text.is_empty()
        && text.bytes().all(|byte| {
            byte.is_ascii_alphanumeric() || matches!(byte, b'!' | b'#' | b'$' | b'&' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
        })
}

fn parse_quality_milli(text: &str) -> Option<u16> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let base = match whole {
        "0" => 0u16,
        "1" => QUALITY_MAX_MILLI,
        _ => return None,
    };
    if frac.len() > 3 || !frac.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let mut digits = [0u16; 3];
    for (slot, byte) in digits.iter_mut().zip(frac.bytes()) {
        *slot = (byte - b'0') as u16;
    }
    let milli = base + digits[0] * 100 + digits[1] * 10 + digits[2];
    (milli <= QUALITY_MAX_MILLI).then_some(milli)
}
