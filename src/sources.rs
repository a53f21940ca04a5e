use crate::types::Source;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// Cap on the number of sources attached to a fetch batch.
pub const MAX_SOURCES: usize = 5;

/// A citation record as it arrives from grounding metadata.
/// Either half may be missing; partial citations are never synthesized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCitation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

impl RawCitation {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            uri: Some(uri.into()),
        }
    }
}

/// Collapses raw citations into a unique, order-stable source list.
///
/// Records missing a title or URI are dropped up front. Duplicate URIs keep
/// their first occurrence, and the result is truncated to [`MAX_SOURCES`].
pub fn dedup_citations<I>(raw: I) -> Vec<Source>
where
    I: IntoIterator<Item = RawCitation>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut dropped = 0usize;

    for citation in raw {
        let (Some(title), Some(uri)) = (citation.title, citation.uri) else {
            dropped += 1;
            continue;
        };
        if !seen.insert(uri.clone()) {
            continue;
        }
        out.push(Source { title, uri });
        if out.len() == MAX_SOURCES {
            break;
        }
    }

    if dropped > 0 {
        debug!("dropped {} partial citation records", dropped);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_uris_collapse_first_title_wins() {
        let raw = vec![
            RawCitation::new("X", "https://x.com"),
            RawCitation::new("X dup", "https://x.com"),
        ];
        let sources = dedup_citations(raw);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "X");
        assert_eq!(sources[0].uri, "https://x.com");
    }

    #[test]
    fn partial_records_are_dropped() {
        let raw = vec![
            RawCitation {
                title: None,
                uri: Some("https://a.com".into()),
            },
            RawCitation {
                title: Some("no uri".into()),
                uri: None,
            },
            RawCitation::default(),
            RawCitation::new("B", "https://b.com"),
        ];
        let sources = dedup_citations(raw);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].uri, "https://b.com");
    }

    #[test]
    fn capped_at_max_and_order_preserved() {
        let raw: Vec<RawCitation> = (0..8)
            .map(|i| RawCitation::new(format!("t{i}"), format!("https://s{i}.com")))
            .collect();
        let sources = dedup_citations(raw);
        assert_eq!(sources.len(), MAX_SOURCES);
        let uris: Vec<&str> = sources.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(
            uris,
            [
                "https://s0.com",
                "https://s1.com",
                "https://s2.com",
                "https://s3.com",
                "https://s4.com"
            ]
        );
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(dedup_citations(Vec::new()).is_empty());
    }
}
