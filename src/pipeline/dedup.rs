//! Identity-based deduplication.
//!
//! Sources overlap (the same question can be listed on two platforms under
//! one slug, the same mint can trend in two pools), so records are
//! collapsed by their stable identity. The first occurrence in input order
//! wins; later duplicates are dropped, never merged. Input order is the
//! declared adapter order, which keeps the result reproducible regardless
//! of which upstream answered first.

use std::collections::HashSet;

use crate::domain::{MarketRecord, TokenRecord};

/// Anything carrying a dedup key.
pub trait HasIdentity {
    fn identity(&self) -> &str;
}

impl HasIdentity for MarketRecord {
    fn identity(&self) -> &str {
        &self.identity
    }
}

impl HasIdentity for TokenRecord {
    fn identity(&self) -> &str {
        &self.identity
    }
}

/// First-seen-wins dedup, O(n) over a seen-identity set.
pub fn dedup_by_identity<T: HasIdentity>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.identity().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OddsPair, Source};

    fn record(identity: &str, source: Source) -> MarketRecord {
        MarketRecord::new(
            identity,
            format!("question for {identity}"),
            Some(OddsPair::binary(50)),
            1_000.0,
            5_000.0,
            source,
        )
    }

    #[test]
    fn first_occurrence_wins() {
        let records = vec![
            record("shared-slug", Source::Polymarket),
            record("unique-a", Source::Polymarket),
            record("shared-slug", Source::Kalshi),
        ];

        let deduped = dedup_by_identity(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].identity, "shared-slug");
        assert_eq!(deduped[0].source, Source::Polymarket);
        assert_eq!(deduped[1].identity, "unique-a");
    }

    #[test]
    fn dedup_is_idempotent() {
        let records = vec![
            record("a", Source::Polymarket),
            record("b", Source::Kalshi),
            record("a", Source::Manifold),
            record("c", Source::Manifold),
            record("b", Source::Metaculus),
        ];

        let once = dedup_by_identity(records);
        let identities: Vec<String> = once.iter().map(|r| r.identity.clone()).collect();
        let twice = dedup_by_identity(once);
        let identities_twice: Vec<String> = twice.iter().map(|r| r.identity.clone()).collect();

        assert_eq!(identities, identities_twice);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let deduped = dedup_by_identity(Vec::<MarketRecord>::new());
        assert!(deduped.is_empty());
    }
}
