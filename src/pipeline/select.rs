//! Threshold filtering and category-balanced selection for the
//! predictions list.
//!
//! Two stages: drop records outside the odds band or below their source's
//! volume floor, then assemble a bounded list from category buckets with
//! fixed quotas. Sports markets never make the list regardless of volume;
//! the only exception is the externally pinned matchup, which is detected
//! on the unfiltered records and prepended while its cutoff date has not
//! passed.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{PinnedConfig, SelectionConfig, SourcesConfig};
use crate::domain::{Category, MarketRecord, MatchupSide, OddsPair, PinnedMatchup, Source};

use super::classify::classify;

/// Inclusive odds band; records with a yes side outside it are dropped.
/// Only applies to records that carry odds at all.
pub const ODDS_BAND_MIN: i64 = 10;
pub const ODDS_BAND_MAX: i64 = 90;

/// Per-source volume floor. Token feeds never reach this path.
fn min_volume(sources: &SourcesConfig, source: Source) -> f64 {
    match source {
        Source::Polymarket => sources.polymarket.min_volume_24h,
        Source::Kalshi => sources.kalshi.min_volume_24h,
        Source::Manifold => sources.manifold.min_volume_24h,
        Source::Metaculus => sources.metaculus.min_volume_24h,
        Source::GeckoTerminal | Source::CoinGecko => 0.0,
    }
}

fn passes_filters(record: &MarketRecord, sources: &SourcesConfig) -> bool {
    if let Some(odds) = record.odds {
        if !(ODDS_BAND_MIN..=ODDS_BAND_MAX).contains(&odds.yes) {
            return false;
        }
    }
    record.volume_24h >= min_volume(sources, record.source)
}

/// Assemble the final bounded list.
///
/// Returns the selected records and whether a pinned record was injected.
/// An empty input yields an empty list, a valid "no data this cycle"
/// result rather than an error.
pub fn select_markets(
    records: Vec<MarketRecord>,
    selection: &SelectionConfig,
    sources: &SourcesConfig,
    pinned: Option<&PinnedConfig>,
    now: DateTime<Utc>,
) -> (Vec<MarketRecord>, bool) {
    // Pinned detection runs on unfiltered records: both sides of the
    // matchup must still be quoted somewhere, even below threshold.
    let pinned_record = pinned.and_then(|cfg| build_pinned(&records, cfg, now));

    let filtered: Vec<MarketRecord> = records
        .into_iter()
        .filter(|r| passes_filters(r, sources))
        .collect();

    let mut mna = Vec::new();
    let mut finance = Vec::new();
    let mut other = Vec::new();
    for record in filtered {
        // Fixed business rule: sports markets are excluded outright.
        if record.has_category(Category::Sports) {
            continue;
        }
        if record.has_category(Category::MergersAcquisitions) {
            mna.push(record);
        } else if record.has_category(Category::Finance) {
            finance.push(record);
        } else {
            other.push(record);
        }
    }

    by_volume_desc(&mut mna);
    by_volume_desc(&mut finance);
    by_volume_desc(&mut other);

    let has_pinned = pinned_record.is_some();
    let cap = selection.total_cap.saturating_sub(usize::from(has_pinned));

    let mut selected = Vec::with_capacity(selection.total_cap);
    let mut finance_iter = finance.into_iter();
    let mut finance_taken = 0usize;

    selected.extend(mna.into_iter().take(selection.mna_cap));

    while finance_taken < selection.finance_first_pass && selected.len() < cap {
        match finance_iter.next() {
            Some(record) => {
                selected.push(record);
                finance_taken += 1;
            }
            None => break,
        }
    }

    // Remaining slots: finance is drained to its cap before any "other"
    // record is taken, then other fills the rest.
    while finance_taken < selection.finance_cap && selected.len() < cap {
        match finance_iter.next() {
            Some(record) => {
                selected.push(record);
                finance_taken += 1;
            }
            None => break,
        }
    }
    selected.extend(other.into_iter().take(cap.saturating_sub(selected.len())));

    if let Some(record) = pinned_record {
        selected.insert(0, record);
    }

    debug!(
        count = selected.len(),
        has_pinned, "market selection complete"
    );

    (selected, has_pinned)
}

fn by_volume_desc(records: &mut [MarketRecord]) {
    // Stable sort: equal volumes keep declared source order.
    records.sort_by(|a, b| {
        b.volume_24h
            .partial_cmp(&a.volume_24h)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Build the pinned record when both sides of the configured matchup are
/// present and the cutoff has not passed.
fn build_pinned(
    records: &[MarketRecord],
    config: &PinnedConfig,
    now: DateTime<Utc>,
) -> Option<MarketRecord> {
    if now >= config.cutoff {
        return None;
    }

    let favorite = find_side(records, &config.favorite)?;
    let underdog = find_side(records, &config.underdog)?;

    let favorite_odds = favorite.odds.map(|o| o.yes).unwrap_or(50);
    let underdog_odds = underdog.odds.map(|o| o.yes).unwrap_or(50);

    let mut record = MarketRecord::new(
        "pinned-matchup",
        config.label.clone(),
        Some(OddsPair::new(favorite_odds, underdog_odds)),
        favorite.volume_24h + underdog.volume_24h,
        favorite.total_volume + underdog.total_volume,
        favorite.source,
    );
    record.categories = classify(&config.label);
    record.pinned = true;
    record.matchup = Some(PinnedMatchup {
        favorite: MatchupSide {
            name: config.favorite.clone(),
            odds: favorite_odds,
        },
        underdog: MatchupSide {
            name: config.underdog.clone(),
            odds: underdog_odds,
        },
    });
    Some(record)
}

fn find_side<'a>(records: &'a [MarketRecord], needle: &str) -> Option<&'a MarketRecord> {
    let needle = needle.to_lowercase();
    records
        .iter()
        .find(|r| r.label.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sources() -> SourcesConfig {
        SourcesConfig::default()
    }

    fn record(identity: &str, yes: i64, volume: f64, categories: Vec<Category>) -> MarketRecord {
        let mut r = MarketRecord::new(
            identity,
            format!("question {identity}"),
            Some(OddsPair::binary(yes)),
            volume,
            volume * 10.0,
            Source::Polymarket,
        );
        r.categories = categories;
        r
    }

    #[test]
    fn odds_band_boundaries_are_inclusive() {
        let sources = sources();
        for (yes, expected) in [(9, false), (10, true), (90, true), (91, false)] {
            let r = record("m", yes, 50_000.0, vec![Category::Other]);
            assert_eq!(
                passes_filters(&r, &sources),
                expected,
                "yes odds {yes} should pass={expected}"
            );
        }
    }

    #[test]
    fn records_without_odds_skip_the_band_check() {
        let sources = sources();
        let mut r = record("m", 50, 50_000.0, vec![Category::Other]);
        r.odds = None;
        assert!(passes_filters(&r, &sources));
    }

    #[test]
    fn volume_floor_is_per_source() {
        let sources = sources();

        let mut below = record("m", 50, 9_000.0, vec![Category::Other]);
        assert!(!passes_filters(&below, &sources));

        // The same volume passes for a zero-threshold source.
        below.source = Source::Manifold;
        assert!(passes_filters(&below, &sources));
    }

    #[test]
    fn category_quota_fill() {
        let mut records = Vec::new();
        for i in 0..6 {
            records.push(record(
                &format!("mna-{i}"),
                50,
                100_000.0 - i as f64,
                vec![Category::MergersAcquisitions],
            ));
        }
        for i in 0..20 {
            records.push(record(
                &format!("fin-{i}"),
                50,
                90_000.0 - i as f64,
                vec![Category::Finance],
            ));
        }
        for i in 0..10 {
            records.push(record(
                &format!("oth-{i}"),
                50,
                80_000.0 - i as f64,
                vec![Category::Other],
            ));
        }

        let (selected, has_pinned) =
            select_markets(records, &SelectionConfig::default(), &sources(), None, Utc::now());

        assert!(!has_pinned);
        assert_eq!(selected.len(), 30);

        let count = |cat: Category| selected.iter().filter(|r| r.has_category(cat)).count();
        assert_eq!(count(Category::MergersAcquisitions), 5);
        assert_eq!(count(Category::Finance), 12);
        assert_eq!(count(Category::Other), 13);

        // M&A first, highest volume first.
        assert_eq!(selected[0].identity, "mna-0");
        assert_eq!(selected[5].identity, "fin-0");
    }

    #[test]
    fn sports_are_excluded_regardless_of_volume() {
        let records = vec![
            record("sports", 50, 1_000_000.0, vec![Category::Sports]),
            record("plain", 50, 20_000.0, vec![Category::Other]),
        ];

        let (selected, _) =
            select_markets(records, &SelectionConfig::default(), &sources(), None, Utc::now());

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].identity, "plain");
    }

    #[test]
    fn empty_input_is_a_valid_empty_result() {
        let (selected, has_pinned) = select_markets(
            Vec::new(),
            &SelectionConfig::default(),
            &sources(),
            None,
            Utc::now(),
        );
        assert!(selected.is_empty());
        assert!(!has_pinned);
    }

    fn pinned_config(cutoff: DateTime<Utc>) -> PinnedConfig {
        PinnedConfig {
            label: "Heavyweight title: Iron vs Thunder".into(),
            favorite: "iron".into(),
            underdog: "thunder".into(),
            cutoff,
        }
    }

    fn matchup_records() -> Vec<MarketRecord> {
        vec![
            record_with_label("iron-wins", "Will Iron win the title fight?", 70, 500.0),
            record_with_label("thunder-wins", "Will Thunder win the title fight?", 30, 500.0),
            record("filler", 50, 50_000.0, vec![Category::Other]),
        ]
    }

    fn record_with_label(identity: &str, label: &str, yes: i64, volume: f64) -> MarketRecord {
        let mut r = MarketRecord::new(
            identity,
            label,
            Some(OddsPair::binary(yes)),
            volume,
            volume,
            Source::Polymarket,
        );
        r.categories = vec![Category::Other];
        r
    }

    #[test]
    fn pinned_record_is_prepended_before_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let (selected, has_pinned) = select_markets(
            matchup_records(),
            &SelectionConfig::default(),
            &sources(),
            Some(&pinned_config(cutoff)),
            now,
        );

        assert!(has_pinned);
        assert!(selected[0].pinned);
        let matchup = selected[0].matchup.as_ref().unwrap();
        assert_eq!(matchup.favorite.odds, 70);
        assert_eq!(matchup.underdog.odds, 30);
    }

    #[test]
    fn no_pinned_record_after_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let (selected, has_pinned) = select_markets(
            matchup_records(),
            &SelectionConfig::default(),
            &sources(),
            Some(&pinned_config(cutoff)),
            now,
        );

        assert!(!has_pinned);
        assert!(selected.iter().all(|r| !r.pinned));
    }

    #[test]
    fn pinned_needs_both_sides() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let records = vec![record_with_label(
            "iron-wins",
            "Will Iron win the title fight?",
            70,
            500.0,
        )];

        let (_, has_pinned) = select_markets(
            records,
            &SelectionConfig::default(),
            &sources(),
            Some(&pinned_config(cutoff)),
            now,
        );
        assert!(!has_pinned);
    }

    #[test]
    fn pinned_consumes_one_of_the_total_slots() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cutoff = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let mut records = matchup_records();
        for i in 0..40 {
            records.push(record(
                &format!("oth-{i}"),
                50,
                70_000.0 - i as f64,
                vec![Category::Other],
            ));
        }

        let (selected, has_pinned) = select_markets(
            records,
            &SelectionConfig::default(),
            &sources(),
            Some(&pinned_config(cutoff)),
            now,
        );

        assert!(has_pinned);
        assert_eq!(selected.len(), 30);
    }
}
