use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::format::lenient_f64;

/// 全市场快照中的单只股票（来自东方财富 clist API）
///
/// 数值字段缺失或无效（接口返回 "-"、NaN 等）时为 `None`，不会按 0 处理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    pub code: String, // "600000"，六位纯数字
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub change_pct: Option<f64>, // 涨跌幅 %
    #[serde(default, deserialize_with = "lenient_number")]
    pub pe: Option<f64>, // 市盈率(动态)
    #[serde(default, deserialize_with = "lenient_number")]
    pub pb: Option<f64>, // 市净率
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_market_cap: Option<f64>, // 总市值（元）
    #[serde(default, deserialize_with = "lenient_number")]
    pub turnover_rate: Option<f64>, // 换手率 %
}

/// 离线数据沿用接口写法，"-"、空串等按缺失处理
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_f64))
}

/// 一次运行使用的全市场快照，按代码索引
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    rows: HashMap<String, QuoteRow>,
}

impl MarketSnapshot {
    /// 同一代码出现多次时以最后一条为准
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = QuoteRow>,
    {
        let mut map = HashMap::new();
        for row in rows {
            map.insert(row.code.clone(), row);
        }
        Self { rows: map }
    }

    pub fn get(&self, code: &str) -> Option<&QuoteRow> {
        self.rows.get(code)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &QuoteRow> {
        self.rows.values()
    }
}

/// 板块与其成分股代码
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConstituency {
    pub board: String,
    pub codes: HashSet<String>,
}

impl BoardConstituency {
    pub fn new(board: impl Into<String>, codes: HashSet<String>) -> Self {
        Self { board: board.into(), codes }
    }
}
