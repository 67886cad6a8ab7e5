use std::collections::BTreeMap;
use std::net::SocketAddr;

use tracing::debug;

use crate::DecodeErrorSummary;
use crate::protocols::vban::error::VbanError;

use super::ts_to_rfc3339;

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
struct ErrorStats {
    count: u64,
    examples: Vec<String>,
}

/// Decode failures grouped by `VbanError::kind`.
#[derive(Debug, Default)]
pub(crate) struct ErrorTable {
    by_kind: BTreeMap<&'static str, ErrorStats>,
}

impl ErrorTable {
    pub fn add(&mut self, err: &VbanError, source: SocketAddr, ts: Option<f64>) {
        debug!(%source, kind = err.kind(), error = %err, "dropping undecodable datagram");
        let entry = self.by_kind.entry(err.kind()).or_default();
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            let at = ts_to_rfc3339(ts).unwrap_or_else(|| "unknown time".to_string());
            entry.examples.push(format!("{source} @ {at}: {err}"));
        }
    }

    pub fn total(&self) -> u64 {
        self.by_kind.values().map(|stats| stats.count).sum()
    }

    pub fn into_summaries(self) -> Vec<DecodeErrorSummary> {
        self.by_kind
            .into_iter()
            .map(|(kind, stats)| DecodeErrorSummary {
                kind: kind.to_string(),
                count: stats.count,
                examples: stats.examples,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorTable;
    use crate::protocols::vban::error::{HeaderError, VbanError};

    #[test]
    fn keeps_three_examples() {
        let source = "10.0.0.9:6980".parse().unwrap();
        let err = VbanError::from(HeaderError::TooShort {
            needed: 28,
            actual: 4,
        });
        let mut table = ErrorTable::default();
        for _ in 0..5 {
            table.add(&err, source, Some(0.0));
        }
        table.add(&VbanError::UnroutablePacket { tag: 0x80 }, source, None);
        assert_eq!(table.total(), 6);

        let summaries = table.into_summaries();
        assert_eq!(summaries[0].kind, "invalid-header");
        assert_eq!(summaries[0].count, 5);
        assert_eq!(summaries[0].examples.len(), 3);
        assert!(summaries[0].examples[0].starts_with("10.0.0.9:6980 @ 1970-01-01T00:00:00Z: invalid header"));
        assert_eq!(summaries[1].kind, "unroutable-packet");
        assert!(summaries[1].examples[0].contains("unknown time"));
    }
}
