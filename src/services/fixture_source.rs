use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::models::stock::QuoteRow;
use crate::services::provider::{BoardConstituentProvider, MarketSnapshotProvider};

/// 离线数据源：从本地 JSON 读取行情快照与板块成分股
///
/// ```json
/// { "quotes": [ { "code": "600000", "name": "浦发银行", "pe": 5.1, ... } ],
///   "boards": { "银行": ["600000", "000001"] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSource {
    #[serde(default)]
    pub quotes: Vec<QuoteRow>,
    #[serde(default)]
    pub boards: HashMap<String, Vec<String>>,
}

impl FixtureSource {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取离线数据失败: {}", path.display()))?;
        serde_json::from_str(&text).context("离线数据格式错误")
    }
}

#[async_trait]
impl MarketSnapshotProvider for FixtureSource {
    async fn fetch_snapshot(&self) -> Result<Vec<QuoteRow>, FetchError> {
        if self.quotes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(self.quotes.clone())
    }
}

#[async_trait]
impl BoardConstituentProvider for FixtureSource {
    async fn fetch_constituents(&self, board: &str) -> Result<HashSet<String>, FetchError> {
        self.boards
            .get(board)
            .map(|codes| codes.iter().cloned().collect())
            .ok_or_else(|| FetchError::UnknownBoard(board.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_lookup() {
        let fixture: FixtureSource = serde_json::from_str(
            r#"{"quotes":[{"code":"600000","name":"浦发银行","pe":5.1}],
                "boards":{"银行":["600000","000001"]}}"#,
        )
        .unwrap();

        let rows = fixture.fetch_snapshot().await.unwrap();
        assert_eq!(rows.len(), 1);

        let codes = fixture.fetch_constituents("银行").await.unwrap();
        assert!(codes.contains("000001"));

        let missing = fixture.fetch_constituents("煤炭").await;
        assert!(matches!(missing, Err(FetchError::UnknownBoard(_))));
    }

    #[tokio::test]
    async fn test_empty_quotes_is_error() {
        let fixture = FixtureSource::default();
        assert!(matches!(fixture.fetch_snapshot().await, Err(FetchError::Empty)));
    }
}
