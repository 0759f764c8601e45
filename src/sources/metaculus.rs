//! Metaculus adapter.
//!
//! Metaculus exposes a community probability object rather than traded
//! prices, and has no volume at all; activity stands in as the secondary
//! magnitude signal and the volume threshold for this source is zero.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketSourceConfig;
use crate::domain::{MarketRecord, OddsPair, Source};
use crate::error::Result;

use super::MarketSource;

pub struct MetaculusAdapter {
    client: Client,
    config: MarketSourceConfig,
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    results: Vec<MetaculusQuestion>,
}

#[derive(Debug, Deserialize)]
struct MetaculusQuestion {
    id: Option<i64>,
    title: Option<String>,
    community_prediction: Option<CommunityPrediction>,
    activity: Option<f64>,
    close_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommunityPrediction {
    full: Option<PredictionQuartiles>,
}

#[derive(Debug, Deserialize)]
struct PredictionQuartiles {
    /// Median community probability, 0-1.
    q2: Option<f64>,
}

impl MetaculusAdapter {
    #[must_use]
    pub fn new(client: Client, config: MarketSourceConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_inner(&self) -> Result<Vec<MarketRecord>> {
        let url = format!(
            "{}/questions/?status=open&forecast_type=binary&order_by=-activity&limit={}",
            self.config.base_url, self.config.limit
        );

        debug!(url = %url, "fetching metaculus questions");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Token {key}"));
        }

        let response: QuestionsResponse = request.send().await?.json().await?;

        Ok(response.results.into_iter().filter_map(normalize).collect())
    }
}

fn normalize(question: MetaculusQuestion) -> Option<MarketRecord> {
    let id = question.id?;
    let label = question.title.filter(|t| !t.is_empty())?;

    let yes = question
        .community_prediction
        .and_then(|p| p.full)
        .and_then(|f| f.q2)
        .map(|q2| (q2 * 100.0).round() as i64)
        .unwrap_or(50)
        .clamp(0, 100);

    Some(
        MarketRecord::new(
            format!("metaculus-{id}"),
            label,
            Some(OddsPair::binary(yes)),
            0.0,
            question.activity.unwrap_or(0.0),
            Source::Metaculus,
        )
        .with_end_time(question.close_time),
    )
}

#[async_trait]
impl MarketSource for MetaculusAdapter {
    fn source(&self) -> Source {
        Source::Metaculus
    }

    async fn fetch(&self) -> Vec<MarketRecord> {
        match self.fetch_inner().await {
            Ok(records) => {
                debug!(count = records.len(), "metaculus fetch complete");
                records
            }
            Err(err) => {
                warn!(error = %err, "metaculus fetch failed, continuing without it");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_median_becomes_odds() {
        let question = MetaculusQuestion {
            id: Some(42),
            title: Some("Will X occur by 2030?".into()),
            community_prediction: Some(CommunityPrediction {
                full: Some(PredictionQuartiles { q2: Some(0.27) }),
            }),
            activity: Some(153.2),
            close_time: None,
        };
        let record = normalize(question).unwrap();
        assert_eq!(record.identity, "metaculus-42");
        assert_eq!(record.odds, Some(OddsPair::new(27, 73)));
        assert_eq!(record.volume_24h, 0.0);
    }

    #[test]
    fn missing_prediction_defaults_to_midpoint() {
        let question = MetaculusQuestion {
            id: Some(7),
            title: Some("Ambiguous question".into()),
            community_prediction: None,
            activity: None,
            close_time: None,
        };
        let record = normalize(question).unwrap();
        assert_eq!(record.odds, Some(OddsPair::new(50, 50)));
    }
}
