use chrono::NaiveDate;
use serde::Serialize;

use super::policy::PolicyRecord;
use crate::utils::format::{detail_url, format_market_cap_yi, round_to};

/// 筛选（或兜底）得到的一只候选股
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "StockEntry")]
pub struct ScreenedCandidate {
    pub code: String,
    pub name: String,
    /// 命中时所在的板块
    pub board: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    /// 总市值（元），输出时转为 "N.NN亿"
    pub market_cap: Option<f64>,
    pub policy_title: String,
    pub policy_desc: String,
    pub policy_url: String,
    pub policy_tag: Option<String>,
    pub analysis: String,
}

/// 前端读取的单只股票结构
#[derive(Debug, Clone, Serialize)]
pub struct StockEntry {
    pub code: String,
    pub name: String,
    pub industry: String,
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
    pub pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pb: Option<f64>,
    pub market_cap: String,
    pub policy_title: String,
    pub policy_desc: String,
    pub policy_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_tag: Option<String>,
    pub analysis: String,
    pub f10_url: String,
}

impl From<ScreenedCandidate> for StockEntry {
    fn from(c: ScreenedCandidate) -> Self {
        Self {
            f10_url: detail_url(&c.code),
            market_cap: format_market_cap_yi(c.market_cap),
            pe: c.pe.map(|v| round_to(v, 1)),
            pb: c.pb.map(|v| round_to(v, 2)),
            code: c.code,
            name: c.name,
            industry: c.board,
            price: c.price,
            change_percent: c.change_pct,
            policy_title: c.policy_title,
            policy_desc: c.policy_desc,
            policy_url: c.policy_url,
            policy_tag: c.policy_tag,
            analysis: c.analysis,
        }
    }
}

/// 输出给前端的完整报告（docs/data.json）
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub date: NaiveDate,
    pub policies: Vec<PolicyRecord>,
    /// 至少命中一只股票的板块，按首次出现顺序
    pub industries: Vec<String>,
    pub stocks: Vec<ScreenedCandidate>,
}
