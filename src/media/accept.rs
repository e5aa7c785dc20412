use crate::media::media_type::MediaType;

/// One parsed Accept header entry. `position` is the entry's index in the
/// header and is the stable tie-break between entries of equal quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptEntry {
    pub media_type: MediaType,
    pub position: usize,
}

impl AcceptEntry {
    pub fn quality_milli(&self) -> u16 {
        self.media_type.quality_milli()
    }
}

/// Parses a comma-separated Accept header. Segments that fail to parse are
/// skipped rather than failing the whole header.
pub fn parse_accept_header(header: &str) -> Vec<AcceptEntry> {
    let mut entries = Vec::new();
    for (position, segment) in header.split(',').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match MediaType::parse(segment) {
            Ok(media_type) => entries.push(AcceptEntry {
                media_type,
                position,
            }),
            Err(error) => {
                tracing::debug!(target: "media", segment, %error, "accept_entry_skipped");
            }
        }
    }
    entries
}

/// Orders entries by descending quality, header position breaking ties.
pub fn sort_by_quality(entries: &mut [AcceptEntry]) {
    entries.sort_by(|lhs, rhs| {
        rhs.quality_milli()
            .cmp(&lhs.quality_milli())
            .then(lhs.position.cmp(&rhs.position))
    });
}
