use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::stock::QuoteRow;

/// 全市场行情快照来源
#[async_trait]
pub trait MarketSnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<QuoteRow>, FetchError>;
}

/// 板块成分股来源：板块名 -> 六位代码集合
#[async_trait]
pub trait BoardConstituentProvider: Send + Sync {
    async fn fetch_constituents(&self, board: &str) -> Result<HashSet<String>, FetchError>;
}
