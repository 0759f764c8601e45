//! Source-agnostic types flowing through the aggregation pipeline.

pub mod payload;
pub mod record;

pub use payload::{
    CryptoPayload, McapFilters, MemecoinsPayload, PredictionsPayload, Quote, TickerItem,
    TickerPayload,
};
pub use record::{
    Category, MarketRecord, MatchupSide, OddsPair, PinnedMatchup, Source, TokenRecord,
};
